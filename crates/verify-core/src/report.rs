//! 下流のプロット処理が読む CSV テーブル
//!
//! - `verify_per_seed.csv`: seed ごとに 1 行、追跡メトリクス全列
//! - `verify_topk.csv`: (seed, key, count) の平坦化
//! - `verify_aggregated.csv`: (metric, mean, std)、集計対象メトリクスごとに必ず 1 行

use std::io::Write;
use std::path::Path;

use crate::aggregate::AggregateStat;
use crate::common::{fmt_opt_float, open_writer, write_csv_row};
use crate::error::{VerifyError, VerifyResult};
use crate::metric::Metric;
use crate::record::RunRecord;

pub const PER_SEED_CSV: &str = "verify_per_seed.csv";
pub const TOP_K_CSV: &str = "verify_topk.csv";
pub const AGGREGATED_CSV: &str = "verify_aggregated.csv";

pub const TOP_K_HEADER: [&str; 3] = ["seed", "key", "count"];
pub const AGGREGATED_HEADER: [&str; 3] = ["metric", "mean", "std"];

pub fn per_seed_header() -> Vec<&'static str> {
    std::iter::once("seed").chain(Metric::ALL.iter().map(|m| m.as_str())).collect()
}

/// 欠損は空欄
pub fn per_seed_row(record: &RunRecord) -> Vec<String> {
    std::iter::once(record.seed.clone())
        .chain(
            Metric::ALL
                .iter()
                .map(|&m| record.get(m).map(ToString::to_string).unwrap_or_default()),
        )
        .collect()
}

pub fn top_k_rows(record: &RunRecord) -> impl Iterator<Item = [String; 3]> + '_ {
    record
        .top_k_list
        .iter()
        .map(|(key, count)| [record.seed.clone(), key.to_string(), count.to_string()])
}

pub fn aggregate_row(stat: &AggregateStat) -> [String; 3] {
    [stat.metric.as_str().to_owned(), fmt_opt_float(stat.mean), fmt_opt_float(stat.std)]
}

fn write_table<R>(
    path: &Path,
    header: &[&str],
    rows: impl IntoIterator<Item = R>,
) -> VerifyResult<()>
where
    R: AsRef<[String]>,
{
    let io_err = |e: std::io::Error| VerifyError::io(path, e);
    let mut writer = open_writer(path).map_err(io_err)?;
    write_csv_row(&mut writer, header).map_err(io_err)?;
    for row in rows {
        write_csv_row(&mut writer, row.as_ref()).map_err(io_err)?;
    }
    writer.flush().map_err(io_err)?;
    writer.close().map_err(io_err)
}

pub fn write_per_seed_csv(path: &Path, records: &[RunRecord]) -> VerifyResult<()> {
    write_table(path, &per_seed_header(), records.iter().map(per_seed_row))
}

pub fn write_top_k_csv(path: &Path, records: &[RunRecord]) -> VerifyResult<()> {
    write_table(path, &TOP_K_HEADER, records.iter().flat_map(top_k_rows))
}

pub fn write_aggregated_csv(path: &Path, stats: &[AggregateStat]) -> VerifyResult<()> {
    write_table(path, &AGGREGATED_HEADER, stats.iter().map(aggregate_row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::MetricValue;

    #[test]
    fn per_seed_row_leaves_absent_metrics_blank() {
        let mut record = RunRecord::new("42");
        record.promoted = Some(MetricValue::integer(3_i64));
        record.adaptive_mean = MetricValue::float(1.5);

        let header = per_seed_header();
        let row = per_seed_row(&record);
        assert_eq!(header.len(), 14);
        assert_eq!(row.len(), header.len());
        assert_eq!(header[0], "seed");
        assert_eq!(row[0], "42");
        let col = |name: &str| &row[header.iter().position(|h| *h == name).unwrap()];
        assert_eq!(col("promoted"), "3");
        assert_eq!(col("adaptiveMean"), "1.5");
        assert_eq!(col("promotionPrecision"), "");
    }

    #[test]
    fn aggregated_csv_has_one_row_per_metric() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(AGGREGATED_CSV);
        let stats = [
            AggregateStat {
                metric: Metric::PromotionPrecision,
                count: 2,
                mean: Some(0.925),
                std: Some(0.5),
            },
            AggregateStat {
                metric: Metric::SpikeCount,
                count: 0,
                mean: None,
                std: None,
            },
        ];
        write_aggregated_csv(&path, &stats).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "metric,mean,std\npromotionPrecision,0.925,0.5\nspikeCount,,\n"
        );
    }

    #[test]
    fn top_k_csv_flattens_every_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TOP_K_CSV);
        let mut a = RunRecord::new("1");
        a.top_k_list = [(10, 3), (11, 2)].into_iter().collect();
        let b = RunRecord::new("2");
        let mut c = RunRecord::new("3");
        c.top_k_list = [(7, 1)].into_iter().collect();

        write_top_k_csv(&path, &[a, b, c]).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "seed,key,count\n1,10,3\n1,11,2\n3,7,1\n"
        );
    }
}
