//! ファイル規約で繋がる 2 段のバッチ処理
//!
//! 1. `out_<seed>.log` → `verify_<seed>.json`
//! 2. `verify_*.json` → per-seed / top-K / 集計 CSV
//!
//! どちらもファイル名の昇順で 1 ファイルずつ処理する。壊れたファイルは警告して飛ばし、
//! 残りの処理は続ける。結果ディレクトリが無い場合だけ全体を失敗させる。

use std::path::{Path, PathBuf};

use crate::aggregate::{aggregate, AggregateStat, RecordSet};
use crate::common::{list_artifacts, read_text};
use crate::config::{ExportConfig, ResultsConfig};
use crate::error::{VerifyError, VerifyResult};
use crate::record::RunRecord;
use crate::report::{
    write_aggregated_csv, write_per_seed_csv, write_top_k_csv, AGGREGATED_CSV, PER_SEED_CSV,
    TOP_K_CSV,
};
use crate::verify_log::{extract_run_record, LOG_PATTERN};

pub const COMPANION_PATTERN: &str = "verify_*.json";

/// 入力ファイルが 1 つも無い場合は何もせず正常終了する
#[derive(Debug)]
pub enum Outcome<T> {
    NothingToDo { dir: PathBuf, pattern: &'static str },
    Completed(T),
}

#[derive(Debug)]
pub struct SkippedArtifact {
    pub path: PathBuf,
    pub error: VerifyError,
}

#[derive(Debug, Default)]
pub struct LogExtractionReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<SkippedArtifact>,
}

#[derive(Debug)]
pub struct ExportReport {
    pub per_seed_csv: PathBuf,
    pub top_k_csv: PathBuf,
    pub aggregated_csv: PathBuf,
    pub records: usize,
    pub stats: Vec<AggregateStat>,
    pub skipped: Vec<SkippedArtifact>,
}

fn skip(path: PathBuf, error: VerifyError) -> SkippedArtifact {
    log::warn!("skipping {}: {error}", path.display());
    SkippedArtifact { path, error }
}

/// 各ログから companion JSON を書き出す。
///
/// 同じ seed のログが複数あれば後に処理したものが上書きする。
pub fn extract_logs(config: &ResultsConfig) -> VerifyResult<Outcome<LogExtractionReport>> {
    config.ensure_exists()?;
    let dir = config.dir();
    let files = list_artifacts(dir, LOG_PATTERN)?;
    if files.is_empty() {
        return Ok(Outcome::NothingToDo {
            dir: dir.to_path_buf(),
            pattern: LOG_PATTERN,
        });
    }

    let mut report = LogExtractionReport::default();
    for path in files {
        let text = match read_text(&path) {
            Ok(text) => text,
            Err(error) => {
                report.skipped.push(skip(path, error));
                continue;
            }
        };
        let record = extract_run_record(&text, &path);
        let written = record.write_companion(dir)?;
        log::debug!("{} -> {}", path.display(), written.display());
        report.written.push(written);
    }
    Ok(Outcome::Completed(report))
}

/// companion JSON を seed ごとにまとめる。seed が衝突したら後勝ち。
pub fn load_records(files: &[PathBuf]) -> (RecordSet, Vec<SkippedArtifact>) {
    let mut records = RecordSet::default();
    let mut skipped = Vec::new();
    for path in files {
        match RunRecord::load_companion(path) {
            Ok(record) => {
                if let Some(previous) = records.insert(record) {
                    log::warn!(
                        "seed {} reported more than once; keeping {}",
                        previous.seed,
                        path.display()
                    );
                }
            }
            Err(error) => skipped.push(skip(path.clone(), error)),
        }
    }
    (records, skipped)
}

fn output_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(name)
}

/// 3 つの CSV を結果ディレクトリに書き出す。
///
/// 全ファイルが壊れていた場合もヘッダ行だけの CSV を書く。
pub fn export(config: &ExportConfig) -> VerifyResult<Outcome<ExportReport>> {
    config.results.ensure_exists()?;
    let dir = config.results.dir();
    let files = list_artifacts(dir, COMPANION_PATTERN)?;
    if files.is_empty() {
        return Ok(Outcome::NothingToDo {
            dir: dir.to_path_buf(),
            pattern: COMPANION_PATTERN,
        });
    }

    let (records, skipped) = load_records(&files);
    log::info!("loaded {} run records ({} skipped)", records.len(), skipped.len());

    let per_seed_csv = output_path(dir, PER_SEED_CSV);
    write_per_seed_csv(&per_seed_csv, records.records())?;

    let top_k_csv = output_path(dir, TOP_K_CSV);
    write_top_k_csv(&top_k_csv, records.records())?;

    let stats = aggregate(records.records(), &config.metrics);
    let aggregated_csv = output_path(dir, AGGREGATED_CSV);
    write_aggregated_csv(&aggregated_csv, &stats)?;

    Ok(Outcome::Completed(ExportReport {
        per_seed_csv,
        top_k_csv,
        aggregated_csv,
        records: records.len(),
        stats,
        skipped,
    }))
}
