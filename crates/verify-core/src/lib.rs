//! FluxGate ベンチマークの検証結果を取り込み、集計する。
//!
//! - [`percentile`]: 線形補間パーセンタイル
//! - [`jmh`]: コメント付き JMH JSON → 比較用の行
//! - [`verify_log`]: 実行ログ → [`RunRecord`]
//! - [`aggregate`]: seed 間の平均・標準偏差
//! - [`pipeline`]: 結果ディレクトリ単位のバッチ処理

pub mod aggregate;
pub mod common;
pub mod config;
pub mod error;
pub mod jmh;
pub mod metric;
pub mod percentile;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod verify_log;

pub use aggregate::{aggregate, mean_and_std, AggregateStat, RecordSet};
pub use config::{ExportConfig, ResultsConfig, DEFAULT_RESULTS_DIR};
pub use error::{VerifyError, VerifyResult};
pub use jmh::JmhRow;
pub use metric::{Metric, MetricValue};
pub use percentile::{percentile, sorted_samples, NOT_APPLICABLE};
pub use pipeline::{export, extract_logs, ExportReport, LogExtractionReport, Outcome};
pub use record::{RunRecord, TopKList};
