/// 結果ディレクトリの out_*.log を解析し、verify_<seed>.json を書き出す
///
/// JMH を再実行せずに、既存ログから構造化された検証結果を取り出すためのツール。
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use verify_core::{extract_logs, Outcome, ResultsConfig, VerifyError, DEFAULT_RESULTS_DIR};

#[derive(Parser, Debug)]
#[command(author, version, about = "out_<seed>.log から verify_<seed>.json を生成する")]
struct Cli {
    /// 結果ディレクトリ
    #[arg(default_value = DEFAULT_RESULTS_DIR)]
    results_dir: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            let code = err.downcast_ref::<VerifyError>().map_or(1, VerifyError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = ResultsConfig::new(&cli.results_dir);
    let report = match extract_logs(&config)? {
        Outcome::NothingToDo { dir, pattern } => {
            println!("no {pattern} files found in {}", dir.display());
            return Ok(());
        }
        Outcome::Completed(report) => report,
    };

    for path in &report.written {
        println!("wrote {}", path.display());
    }
    if !report.skipped.is_empty() {
        log::warn!("{} log file(s) could not be read", report.skipped.len());
    }
    Ok(())
}
