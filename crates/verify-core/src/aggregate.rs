//! seed 間のメトリクス集計（平均・標本標準偏差）

use std::collections::HashMap;

use crate::metric::{Metric, MetricValue};
use crate::record::RunRecord;

/// seed をキーにしたレコード集合。挿入順を保持し、同じ seed は後勝ちで置き換える。
#[derive(Debug, Default)]
pub struct RecordSet {
    records: Vec<RunRecord>,
    index: HashMap<String, usize>,
}

impl RecordSet {
    /// 置き換えた場合は以前のレコードを返す
    pub fn insert(&mut self, record: RunRecord) -> Option<RunRecord> {
        match self.index.get(&record.seed) {
            Some(&idx) => Some(std::mem::replace(&mut self.records[idx], record)),
            None => {
                self.index.insert(record.seed.clone(), self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    pub fn records(&self) -> &[RunRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// 1 メトリクス分の集計結果。数値が 1 つも無ければ mean/std とも `None`（空欄）。
#[derive(Clone, Debug, PartialEq)]
pub struct AggregateStat {
    pub metric: Metric,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
}

/// 平均と標本標準偏差（N-1 で割る）。
///
/// 値が 1 つのときの std は 0。「データ不足」と「ばらつき 0」を区別しない点に注意。
pub fn mean_and_std(values: &[f64]) -> (Option<f64>, Option<f64>) {
    if values.is_empty() {
        return (None, None);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (Some(mean), Some(0.0));
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (Some(mean), Some((sum_sq / (n - 1.0)).sqrt()))
}

/// 各メトリクスを独立に集計する。欠損値や数値化できない値は N に数えない。
pub fn aggregate(records: &[RunRecord], metrics: &[Metric]) -> Vec<AggregateStat> {
    metrics
        .iter()
        .map(|&metric| {
            let values: Vec<f64> = records
                .iter()
                .filter_map(|record| record.get(metric).and_then(MetricValue::as_f64))
                .collect();
            let (mean, std) = mean_and_std(&values);
            AggregateStat {
                metric,
                count: values.len(),
                mean,
                std,
            }
        })
        .collect()
}
