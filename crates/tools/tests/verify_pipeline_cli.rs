//! parse_verify_logs → export_verify の一連の流れ

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn run(bin: &str, dir: &Path, extra: &[&str]) -> Output {
    Command::new(bin)
        .arg(dir)
        .args(extra)
        .output()
        .unwrap_or_else(|e| panic!("Failed to spawn {bin}: {e}"))
}

fn parse_verify_logs(dir: &Path) -> Output {
    run(env!("CARGO_BIN_EXE_parse_verify_logs"), dir, &[])
}

fn export_verify(dir: &Path, extra: &[&str]) -> Output {
    run(env!("CARGO_BIN_EXE_export_verify"), dir, extra)
}

fn write_log(dir: &Path, name: &str, seed: u64, precision: &str, heap: u64) {
    let text = format!(
        "# Parameters: (mode = verify, seed = {seed})\n\
         [info] fluxgate.benchmark.verify,ts=1,promotionPrecision={precision},\
         meanTierBRelativeError=0.05,promoted=12,topK=3\n\
         [info] FluxGateLimiterBenchmark: top-3 ground-truth keys: {{17=40, 3=22, 8=9}}\n\
         [info] heapUsedBytes={heap}\n"
    );
    fs::write(dir.join(name), text).unwrap();
}

#[test]
fn logs_flow_through_to_csv() {
    let dir = tempfile::tempdir().unwrap();
    write_log(dir.path(), "out_a.log", 101, "0.9", 1024);
    write_log(dir.path(), "out_b.log", 102, "0.95", 2048);

    let output = parse_verify_logs(dir.path());
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(dir.path().join("verify_101.json").exists());
    assert!(dir.path().join("verify_102.json").exists());

    let companion: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("verify_101.json")).unwrap())
            .unwrap();
    assert_eq!(companion["seed"], "101");
    assert_eq!(companion["promoted"], 12);
    assert_eq!(companion["heapUsedBytes"], 1024);
    assert_eq!(companion["topKList"], serde_json::json!({"17": 40, "3": 22, "8": 9}));

    let output = export_verify(dir.path(), &[]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let per_seed = fs::read_to_string(dir.path().join("verify_per_seed.csv")).unwrap();
    let lines: Vec<&str> = per_seed.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("seed,promotionPrecision,meanTierBRelativeError,promoted,topK,"));
    assert!(lines[1].starts_with("101,0.9,0.05,12,3,1024,"));

    let top_k = fs::read_to_string(dir.path().join("verify_topk.csv")).unwrap();
    assert_eq!(top_k.lines().count(), 1 + 6);
    assert_eq!(top_k.lines().nth(1), Some("101,17,40"));

    let aggregated = fs::read_to_string(dir.path().join("verify_aggregated.csv")).unwrap();
    let rows: Vec<&str> = aggregated.lines().collect();
    assert_eq!(rows[0], "metric,mean,std");
    assert_eq!(rows.len(), 5);
    assert!(rows[1].starts_with("promotionPrecision,0.925,0.0353553390593"));
    assert_eq!(rows[3], "spikeCount,,");

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("promotionPrecision: n=2 mean=0.925"));
}

#[test]
fn metric_option_overrides_the_aggregated_set() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("verify_1.json"), r#"{"seed":"1","promoted":4}"#).unwrap();
    fs::write(dir.path().join("verify_2.json"), r#"{"seed":"2","promoted":6}"#).unwrap();

    let output = export_verify(dir.path(), &["--metric", "promoted"]);
    assert!(output.status.success());
    let aggregated = fs::read_to_string(dir.path().join("verify_aggregated.csv")).unwrap();
    assert_eq!(aggregated, "metric,mean,std\npromoted,5.0,1.4142135623730951\n");

    let output = export_verify(dir.path(), &["--metric", "noSuchMetric"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn malformed_companion_does_not_stop_the_export() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("verify_1.json"), "{\"seed\": ").unwrap();
    fs::write(dir.path().join("verify_2.json"), r#"{"seed":"2","spikeCount":7}"#).unwrap();

    let output = export_verify(dir.path(), &[]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("verify_1.json"), "stderr: {stderr}");

    let per_seed = fs::read_to_string(dir.path().join("verify_per_seed.csv")).unwrap();
    assert_eq!(per_seed.lines().count(), 2);
    assert!(per_seed.lines().nth(1).unwrap().starts_with("2,"));
}

#[test]
fn array_companion_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("verify_1.json"), r#"["x", 0.5]"#).unwrap();
    fs::write(dir.path().join("verify_2.json"), r#"{"seed":"2","promoted":3}"#).unwrap();

    let output = export_verify(dir.path(), &["--metric", "promoted"]);
    assert!(output.status.success());
    let per_seed = fs::read_to_string(dir.path().join("verify_per_seed.csv")).unwrap();
    let seeds: Vec<&str> =
        per_seed.lines().skip(1).filter_map(|line| line.split(',').next()).collect();
    assert_eq!(seeds, ["2"]);
    let aggregated = fs::read_to_string(dir.path().join("verify_aggregated.csv")).unwrap();
    assert_eq!(aggregated, "metric,mean,std\npromoted,3.0,0.0\n");
}

#[test]
fn empty_directory_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(parse_verify_logs(dir.path()).status.code(), Some(0));

    let output = export_verify(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("verify_*.json"));
    assert!(!dir.path().join("verify_per_seed.csv").exists());
}

#[test]
fn missing_directory_exits_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    assert_eq!(parse_verify_logs(&missing).status.code(), Some(1));
    assert_eq!(export_verify(&missing, &[]).status.code(), Some(1));
}
