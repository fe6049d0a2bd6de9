/// verify_<seed>.json を集計して CSV を書き出す
///
/// 結果ディレクトリに以下を生成する:
///   verify_per_seed.csv   : seed ごとに 1 行
///   verify_topk.csv       : (seed, key, count) の平坦化
///   verify_aggregated.csv : メトリクスごとの mean / std
///
/// 使い方:
///   export_verify [results_dir] [--metric promotionPrecision --metric spikeCount ...]
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use verify_core::common::fmt_opt_float;
use verify_core::{
    export, ExportConfig, Metric, Outcome, ResultsConfig, VerifyError, DEFAULT_RESULTS_DIR,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "verify_*.json を seed 横断で集計し CSV に出力する")]
struct Cli {
    /// 結果ディレクトリ
    #[arg(default_value = DEFAULT_RESULTS_DIR)]
    results_dir: PathBuf,

    /// 集計対象メトリクス（複数指定可、省略時: promotionPrecision,
    /// meanTierBRelativeError, spikeCount, adaptiveLatencyP50）
    #[arg(long = "metric")]
    metrics: Vec<Metric>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            let code = err.downcast_ref::<VerifyError>().map_or(1, VerifyError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = ExportConfig::new(ResultsConfig::new(cli.results_dir)).with_metrics(cli.metrics);
    let report = match export(&config)? {
        Outcome::NothingToDo { dir, pattern } => {
            println!("no {pattern} files found in {}", dir.display());
            return Ok(());
        }
        Outcome::Completed(report) => report,
    };

    println!("wrote: {}", report.per_seed_csv.display());
    println!("wrote: {}", report.top_k_csv.display());
    println!("wrote: {}", report.aggregated_csv.display());
    if !report.skipped.is_empty() {
        let total = report.skipped.len() + report.records;
        log::warn!("{} of {total} file(s) skipped", report.skipped.len());
    }

    println!("runs: {}", report.records);
    for stat in &report.stats {
        println!(
            "{metric}: n={n} mean={mean} std={std}",
            metric = stat.metric,
            n = stat.count,
            mean = fmt_opt_float(stat.mean),
            std = fmt_opt_float(stat.std),
        );
    }
    Ok(())
}
