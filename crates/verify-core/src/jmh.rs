//! JMH の JSON 出力からベンチ名・モード・スコア・単位・パーセンタイルを取り出す
//!
//! JMH の出力は先頭に `//` や `#` のコメント行が付くことがあるため、それらを除去してから
//! パースする。トップレベルは `{"benchmarks": [...]}` と `[...]` の両方を受け付ける。

use std::path::Path;

use serde_json::Value;

use crate::common::{fmt_float, read_utf8};
use crate::error::{VerifyError, VerifyResult};
use crate::metric::MetricValue;
use crate::percentile::{sorted_samples, standard_percentiles, NOT_APPLICABLE};

pub const UNKNOWN: &str = "unknown";

pub const CSV_HEADER: [&str; 7] = ["benchmark", "mode", "score", "unit", "p50", "p90", "p99"];

/// 1 ベンチマークエントリ分の比較用行
#[derive(Clone, Debug, PartialEq)]
pub struct JmhRow {
    pub benchmark: String,
    pub mode: String,
    pub score: Option<MetricValue>,
    pub unit: String,
    pub p50: Option<f64>,
    pub p90: Option<f64>,
    pub p99: Option<f64>,
}

impl JmhRow {
    fn from_entry(entry: &Value) -> Self {
        let primary = entry.get("primaryMetric").filter(|v| v.is_object());
        let samples = sorted_samples(
            primary
                .and_then(|p| p.get("rawData"))
                .map(flatten_samples)
                .unwrap_or_default(),
        );
        let [p50, p90, p99] = standard_percentiles(&samples);

        Self {
            benchmark: text_field(entry.get("benchmark"), UNKNOWN),
            mode: text_field(entry.get("mode"), UNKNOWN),
            score: primary.and_then(|p| p.get("score")).and_then(MetricValue::from_json),
            unit: text_field(primary.and_then(|p| p.get("scoreUnit")), ""),
            p50,
            p90,
            p99,
        }
    }

    pub fn to_fields(&self) -> [String; 7] {
        let pct = |v: Option<f64>| v.map(fmt_float).unwrap_or_else(|| NOT_APPLICABLE.to_owned());
        [
            self.benchmark.clone(),
            self.mode.clone(),
            self.score
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| NOT_APPLICABLE.to_owned()),
            self.unit.clone(),
            pct(self.p50),
            pct(self.p90),
            pct(self.p99),
        ]
    }
}

fn text_field(value: Option<&Value>, default: &str) -> String {
    match value {
        None | Some(Value::Null) => default.to_owned(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// `rawData` は反復ごとの配列の配列。入れ子を平坦化し、数値化できない要素は捨てる。
fn flatten_samples(value: &Value) -> Vec<f64> {
    fn walk(value: &Value, out: &mut Vec<f64>) {
        match value {
            Value::Array(items) => items.iter().for_each(|item| walk(item, out)),
            Value::Number(n) => out.extend(n.as_f64()),
            Value::String(s) => out.extend(s.trim().parse::<f64>().ok()),
            _ => {}
        }
    }
    let mut out = Vec::new();
    walk(value, &mut out);
    out
}

/// 行頭（空白除去後）が `//` または `#` の行を取り除く
pub fn strip_comment_lines(text: &str) -> String {
    text.lines()
        .filter(|line| {
            let trimmed = line.trim();
            !(trimmed.starts_with("//") || trimmed.starts_with('#'))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `origin` はエラーメッセージ用
pub fn parse_document(text: &str, origin: &Path) -> VerifyResult<Vec<JmhRow>> {
    let cleaned = strip_comment_lines(text);
    let content = cleaned.trim();
    if content.is_empty() {
        return Err(VerifyError::EmptyDocument(origin.to_path_buf()));
    }
    let data: Value = serde_json::from_str(content).map_err(|e| VerifyError::json(origin, e))?;

    let entries = match &data {
        Value::Object(map) => match map.get("benchmarks") {
            None => return Ok(Vec::new()),
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(VerifyError::UnrecognizedShape(origin.to_path_buf())),
        },
        Value::Array(entries) => entries,
        _ => return Err(VerifyError::UnrecognizedShape(origin.to_path_buf())),
    };
    Ok(entries.iter().map(JmhRow::from_entry).collect())
}

/// 不正な UTF-8 は読み込み失敗として扱う
pub fn load_rows(path: &Path) -> VerifyResult<Vec<JmhRow>> {
    let text = read_utf8(path)?;
    parse_document(&text, path)
}
