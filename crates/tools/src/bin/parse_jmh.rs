/// JMH の JSON 出力を CSV に変換する
///
/// 使い方:
///   parse_jmh results/jmh.json
///   parse_jmh results/jmh.json --output-csv results/jmh.csv
///
/// 出力列: benchmark,mode,score,unit,p50,p90,p99
/// 標準出力にはヘッダ無しで、ファイル出力時はヘッダ付きで書き出す。
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use verify_core::common::{open_writer, write_csv_row};
use verify_core::jmh::{load_rows, CSV_HEADER};
use verify_core::VerifyError;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "JMH の JSON 出力からベンチ名・モード・スコア・単位・p50/p90/p99 を CSV で出力する"
)]
struct Cli {
    /// JMH の結果 JSON（先頭の `//` / `#` コメント行は無視）
    input_json: PathBuf,

    /// 出力CSV（省略時または `-`: 標準出力、ヘッダ無し）
    #[arg(long)]
    output_csv: Option<PathBuf>,
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
    let rows = load_rows(&cli.input_json)?;

    let output = cli.output_csv.as_deref().unwrap_or(Path::new("-"));
    let to_stdout = output == Path::new("-");
    let mut writer = open_writer(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    if !to_stdout {
        write_csv_row(&mut writer, &CSV_HEADER)?;
    }
    for row in &rows {
        write_csv_row(&mut writer, &row.to_fields())?;
    }
    writer.flush()?;
    writer.close()?;

    if !to_stdout {
        println!("wrote {} rows: {}", rows.len(), output.display());
    }
    Ok(())
}
