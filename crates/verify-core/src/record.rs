//! 1 run 分の検証結果レコードと companion JSON（`verify_<seed>.json`）の読み書き

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{VerifyError, VerifyResult};
use crate::metric::{lenient_metric, Metric, MetricValue};

pub const COMPANION_PREFIX: &str = "verify_";
pub const COMPANION_EXT: &str = "json";

/// ground-truth top-K（キー → 出現回数）。出現順を保持する。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TopKList(Vec<(i64, i64)>);

impl TopKList {
    /// 既存キーは位置を保ったまま回数だけ上書きする
    pub fn insert(&mut self, key: i64, count: i64) {
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = count,
            None => self.0.push((key, count)),
        }
    }

    pub fn get(&self, key: i64) -> Option<i64> {
        self.0.iter().find(|(k, _)| *k == key).map(|(_, count)| *count)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<(i64, i64)> for TopKList {
    fn from_iter<I: IntoIterator<Item = (i64, i64)>>(iter: I) -> Self {
        let mut list = Self::default();
        for (key, count) in iter {
            list.insert(key, count);
        }
        list
    }
}

impl Serialize for TopKList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, count) in &self.0 {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TopKList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TopKVisitor)
    }
}

/// マップ以外（null を含む）は空リスト扱い。整数に変換できないエントリは捨てる。
struct TopKVisitor;

impl<'de> Visitor<'de> for TopKVisitor {
    type Value = TopKList;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of key to count")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<TopKList, A::Error> {
        let mut list = TopKList::default();
        while let Some((key, count)) = map.next_entry::<String, Value>()? {
            let count = match &count {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            };
            if let (Ok(key), Some(count)) = (key.trim().parse::<i64>(), count) {
                list.insert(key, count);
            }
        }
        Ok(list)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<TopKList, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(TopKList::default())
    }

    fn visit_unit<E: de::Error>(self) -> Result<TopKList, E> {
        Ok(TopKList::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<TopKList, E> {
        Ok(TopKList::default())
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<TopKList, E> {
        Ok(TopKList::default())
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<TopKList, E> {
        Ok(TopKList::default())
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<TopKList, E> {
        Ok(TopKList::default())
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<TopKList, E> {
        Ok(TopKList::default())
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<TopKList, E> {
        Ok(TopKList::default())
    }
}

/// 1 run 分の検証結果。
///
/// 各メトリクスは独立に欠損し得る（欠損は 0 ではない）。サマリ行由来の 4 項目と
/// `heapUsedBytes` は常に書き出し、それ以外は値があるときだけ書き出す。
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    #[serde(default, deserialize_with = "lenient_seed")]
    pub seed: String,
    #[serde(default, deserialize_with = "lenient_metric")]
    pub promotion_precision: Option<MetricValue>,
    #[serde(default, deserialize_with = "lenient_metric")]
    pub mean_tier_b_relative_error: Option<MetricValue>,
    #[serde(default, deserialize_with = "lenient_metric")]
    pub promoted: Option<MetricValue>,
    #[serde(default, deserialize_with = "lenient_metric")]
    pub top_k: Option<MetricValue>,
    #[serde(default, deserialize_with = "lenient_metric")]
    pub heap_used_bytes: Option<MetricValue>,
    #[serde(default, deserialize_with = "lenient_metric", skip_serializing_if = "Option::is_none")]
    pub spike_count: Option<MetricValue>,
    #[serde(default, deserialize_with = "lenient_metric", skip_serializing_if = "Option::is_none")]
    pub adaptive_sample_count: Option<MetricValue>,
    #[serde(default, deserialize_with = "lenient_metric", skip_serializing_if = "Option::is_none")]
    pub adaptive_mean: Option<MetricValue>,
    #[serde(default, deserialize_with = "lenient_metric", skip_serializing_if = "Option::is_none")]
    pub adaptive_std: Option<MetricValue>,
    #[serde(default, deserialize_with = "lenient_metric", skip_serializing_if = "Option::is_none")]
    pub adaptive_latency_count: Option<MetricValue>,
    #[serde(default, deserialize_with = "lenient_metric", skip_serializing_if = "Option::is_none")]
    pub adaptive_latency_p50: Option<MetricValue>,
    #[serde(default, deserialize_with = "lenient_metric", skip_serializing_if = "Option::is_none")]
    pub adaptive_latency_p95: Option<MetricValue>,
    #[serde(default, deserialize_with = "lenient_metric", skip_serializing_if = "Option::is_none")]
    pub adaptive_latency_p99: Option<MetricValue>,
    #[serde(default)]
    pub top_k_list: TopKList,
}

fn lenient_seed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

impl RunRecord {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            ..Self::default()
        }
    }

    pub fn get(&self, metric: Metric) -> Option<&MetricValue> {
        self.slot(metric).as_ref()
    }

    fn slot(&self, metric: Metric) -> &Option<MetricValue> {
        match metric {
            Metric::PromotionPrecision => &self.promotion_precision,
            Metric::MeanTierBRelativeError => &self.mean_tier_b_relative_error,
            Metric::Promoted => &self.promoted,
            Metric::TopK => &self.top_k,
            Metric::HeapUsedBytes => &self.heap_used_bytes,
            Metric::SpikeCount => &self.spike_count,
            Metric::AdaptiveSampleCount => &self.adaptive_sample_count,
            Metric::AdaptiveMean => &self.adaptive_mean,
            Metric::AdaptiveStd => &self.adaptive_std,
            Metric::AdaptiveLatencyCount => &self.adaptive_latency_count,
            Metric::AdaptiveLatencyP50 => &self.adaptive_latency_p50,
            Metric::AdaptiveLatencyP95 => &self.adaptive_latency_p95,
            Metric::AdaptiveLatencyP99 => &self.adaptive_latency_p99,
        }
    }

    /// companion JSON を読み込む。seed が埋め込まれていなければファイル名から補う。
    ///
    /// トップレベルはオブジェクトに限る。一旦 `Value` に読むので、重複キーは後の値が残る。
    pub fn load_companion(path: &Path) -> VerifyResult<Self> {
        let bytes = fs::read(path).map_err(|e| VerifyError::io(path, e))?;
        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| VerifyError::json(path, e))?;
        if !value.is_object() {
            return Err(VerifyError::NotAnObject(path.to_path_buf()));
        }
        let mut record: Self =
            serde_json::from_value(value).map_err(|e| VerifyError::json(path, e))?;
        if record.seed.is_empty() {
            record.seed = seed_from_file_name(path);
        }
        Ok(record)
    }

    pub fn companion_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{COMPANION_PREFIX}{}.{COMPANION_EXT}", self.seed))
    }

    /// `dir/verify_<seed>.json` に書き出す。同じ seed のファイルは上書きされる。
    pub fn write_companion(&self, dir: &Path) -> VerifyResult<PathBuf> {
        let path = self.companion_path(dir);
        let json = serde_json::to_string(self).map_err(|e| VerifyError::json(&path, e))?;
        fs::write(&path, json).map_err(|e| VerifyError::io(&path, e))?;
        Ok(path)
    }
}

/// `out_42.log` / `verify_42.json` → `42`。`_` を含まなければ拡張子を除いた名前全体。
pub fn seed_from_file_name(path: &Path) -> String {
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    match stem.split_once('_') {
        Some((_, rest)) => rest.to_owned(),
        None => stem.into_owned(),
    }
}
