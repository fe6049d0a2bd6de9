//! パイプライン設定
//!
//! 既定の結果ディレクトリはグローバル状態にせず、設定値として各処理に渡す。

use std::path::{Path, PathBuf};

use crate::error::{VerifyError, VerifyResult};
use crate::metric::Metric;

pub const DEFAULT_RESULTS_DIR: &str = "benchmarks/results";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultsConfig {
    pub results_dir: PathBuf,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self::new(DEFAULT_RESULTS_DIR)
    }
}

impl ResultsConfig {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.results_dir
    }

    pub fn ensure_exists(&self) -> VerifyResult<()> {
        if self.results_dir.is_dir() {
            Ok(())
        } else {
            Err(VerifyError::ResultsDirMissing(self.results_dir.clone()))
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportConfig {
    pub results: ResultsConfig,
    /// 集計対象。出力順もこの順になる。
    pub metrics: Vec<Metric>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self::new(ResultsConfig::default())
    }
}

impl ExportConfig {
    pub fn new(results: ResultsConfig) -> Self {
        Self {
            results,
            metrics: Metric::AGGREGATED.to_vec(),
        }
    }

    /// 空なら既定の集計対象のまま
    pub fn with_metrics(mut self, metrics: Vec<Metric>) -> Self {
        if !metrics.is_empty() {
            self.metrics = metrics;
        }
        self
    }
}
