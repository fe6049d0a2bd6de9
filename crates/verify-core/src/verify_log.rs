//! ベンチマーク実行ログ（`out_<seed>.log`）から検証結果を抽出する
//!
//! ログの書式は安定していないので、文法としては扱わずフィールドごとに独立した
//! パターン検索を行う。見つからないフィールドは `None` のまま残し、抽出全体は失敗させない。

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::metric::MetricValue;
use crate::record::{seed_from_file_name, RunRecord, TopKList};

pub const LOG_PATTERN: &str = "out_*.log";

static VERIFY_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"fluxgate\.benchmark\.verify,.*promotionPrecision=([^,\n]+),meanTierBRelativeError=([^,\n]+),promoted=([^,\n]+),topK=(\S+)",
    )
    .expect("invalid VERIFY_LINE_RE pattern")
});
static HEAP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"heapUsedBytes=(\d+)").expect("invalid HEAP_RE pattern"));
static TOP_K_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"FluxGateLimiterBenchmark: top-\d+ ground-truth keys: \{([^}]*)\}")
        .expect("invalid TOP_K_RE pattern")
});
static SEED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Parameters: .*seed = (\d+)").expect("invalid SEED_RE pattern")
});

/// `fluxgate.benchmark.verify,...` 行の 4 項目。変換できなかった項目は `None`。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VerifySummary {
    pub promotion_precision: Option<f64>,
    pub mean_tier_b_relative_error: Option<f64>,
    pub promoted: Option<i64>,
    pub top_k: Option<i64>,
}

/// 最後に現れたサマリ行を採用する（後の状態が前を上書きする）
pub fn extract_summary(text: &str) -> Option<VerifySummary> {
    let caps = VERIFY_LINE_RE.captures_iter(text).last()?;
    let float = |idx: usize| caps.get(idx).and_then(|m| m.as_str().trim().parse::<f64>().ok());
    let int = |idx: usize| caps.get(idx).and_then(|m| m.as_str().trim().parse::<i64>().ok());
    Some(VerifySummary {
        promotion_precision: float(1),
        mean_tier_b_relative_error: float(2),
        promoted: int(3),
        top_k: int(4),
    })
}

/// 最後に報告されたヒープ使用量
pub fn extract_heap_used_bytes(text: &str) -> Option<u64> {
    let caps = HEAP_RE.captures_iter(text).last()?;
    caps.get(1)?.as_str().parse::<u64>().ok()
}

/// 最後の ground-truth 告知を `TopKList` にする。告知が無ければ空。
pub fn extract_top_k_list(text: &str) -> TopKList {
    TOP_K_RE
        .captures_iter(text)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|body| parse_top_k_pairs(body.as_str()))
        .unwrap_or_default()
}

/// `9955=806, 562=802, ...` を解釈する。整数に変換できないペアだけを捨てる。
pub fn parse_top_k_pairs(body: &str) -> TopKList {
    body.split(',')
        .map(str::trim)
        .filter(|pair| pair.contains('='))
        .filter_map(|pair| {
            let (key, count) = pair.split_once('=')?;
            let key = key.trim().parse::<i64>().ok()?;
            let count = count.trim().parse::<i64>().ok()?;
            Some((key, count))
        })
        .collect()
}

/// `Parameters: ... seed = N` の最初の出現
pub fn extract_seed(text: &str) -> Option<String> {
    SEED_RE.captures(text).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_owned())
}

/// 1 ファイル分のログ本文からレコードを組み立てる。`path` は seed のフォールバック用。
pub fn extract_run_record(text: &str, path: &Path) -> RunRecord {
    let seed = extract_seed(text).unwrap_or_else(|| seed_from_file_name(path));
    let mut record = RunRecord::new(seed);

    match extract_summary(text) {
        Some(summary) => {
            record.promotion_precision = summary.promotion_precision.and_then(MetricValue::float);
            record.mean_tier_b_relative_error =
                summary.mean_tier_b_relative_error.and_then(MetricValue::float);
            record.promoted = summary.promoted.map(MetricValue::integer);
            record.top_k = summary.top_k.map(MetricValue::integer);
        }
        None => log::debug!("no verify summary line in {}", path.display()),
    }
    record.heap_used_bytes = extract_heap_used_bytes(text).map(MetricValue::integer);
    record.top_k_list = extract_top_k_list(text);
    record
}
