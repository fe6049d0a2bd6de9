//! 1 run あたりの追跡メトリクスと、その値の表現

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// per-seed CSV に出力するメトリクス。並び順は CSV の列順と一致する。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Metric {
    PromotionPrecision,
    MeanTierBRelativeError,
    Promoted,
    TopK,
    HeapUsedBytes,
    SpikeCount,
    AdaptiveSampleCount,
    AdaptiveMean,
    AdaptiveStd,
    AdaptiveLatencyCount,
    AdaptiveLatencyP50,
    AdaptiveLatencyP95,
    AdaptiveLatencyP99,
}

impl Metric {
    pub const ALL: [Metric; 13] = [
        Self::PromotionPrecision,
        Self::MeanTierBRelativeError,
        Self::Promoted,
        Self::TopK,
        Self::HeapUsedBytes,
        Self::SpikeCount,
        Self::AdaptiveSampleCount,
        Self::AdaptiveMean,
        Self::AdaptiveStd,
        Self::AdaptiveLatencyCount,
        Self::AdaptiveLatencyP50,
        Self::AdaptiveLatencyP95,
        Self::AdaptiveLatencyP99,
    ];

    /// seed 間で mean/std を集計する既定のメトリクス
    pub const AGGREGATED: [Metric; 4] = [
        Self::PromotionPrecision,
        Self::MeanTierBRelativeError,
        Self::SpikeCount,
        Self::AdaptiveLatencyP50,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PromotionPrecision => "promotionPrecision",
            Self::MeanTierBRelativeError => "meanTierBRelativeError",
            Self::Promoted => "promoted",
            Self::TopK => "topK",
            Self::HeapUsedBytes => "heapUsedBytes",
            Self::SpikeCount => "spikeCount",
            Self::AdaptiveSampleCount => "adaptiveSampleCount",
            Self::AdaptiveMean => "adaptiveMean",
            Self::AdaptiveStd => "adaptiveStd",
            Self::AdaptiveLatencyCount => "adaptiveLatencyCount",
            Self::AdaptiveLatencyP50 => "adaptiveLatencyP50",
            Self::AdaptiveLatencyP95 => "adaptiveLatencyP95",
            Self::AdaptiveLatencyP99 => "adaptiveLatencyP99",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|m| m.as_str() == raw).ok_or_else(|| {
            let known: Vec<&str> = Self::ALL.iter().map(|m| m.as_str()).collect();
            format!("unknown metric '{raw}' (expected one of: {})", known.join(", "))
        })
    }
}

/// メトリクス値。
///
/// 自前で書き出した値は常に `Number` だが、他のプロデューサが書いた companion JSON では
/// 文字列などが混ざることがあるため、数値に変換できない値も `Text` として保持する。
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(Number),
    Text(String),
}

impl MetricValue {
    /// 有限でない値は JSON で表現できないので `None`
    pub fn float(value: f64) -> Option<Self> {
        Number::from_f64(value).map(Self::Number)
    }

    pub fn integer(value: impl Into<Number>) -> Self {
        Self::Number(value.into())
    }

    /// JSON 値から寛容に変換する。`null` は欠損。
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Number(n) => Some(Self::Number(n.clone())),
            Value::String(s) => Some(Self::Text(s.clone())),
            other => Some(Self::Text(other.to_string())),
        }
    }

    /// 数値化できなければ `None`（集計から除外される）
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// `#[serde(deserialize_with)]` 用。型の合わない値でもレコード全体を失敗させない。
pub(crate) fn lenient_metric<'de, D>(deserializer: D) -> Result<Option<MetricValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(MetricValue::from_json(&value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(metric.as_str().parse::<Metric>(), Ok(metric));
        }
        assert!("heapUsed".parse::<Metric>().is_err());
    }

    #[test]
    fn text_values_convert_only_when_numeric() {
        assert_eq!(MetricValue::Text(" 0.5 ".into()).as_f64(), Some(0.5));
        assert_eq!(MetricValue::Text("n/a".into()).as_f64(), None);
        assert_eq!(MetricValue::from_json(&Value::Null), None);
        assert_eq!(
            MetricValue::from_json(&Value::Bool(true)),
            Some(MetricValue::Text("true".into()))
        );
        assert_eq!(MetricValue::integer(42_i64).as_f64(), Some(42.0));
        assert!(MetricValue::float(f64::NAN).is_none());
    }
}
