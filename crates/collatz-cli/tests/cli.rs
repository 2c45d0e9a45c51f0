use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

fn collatz() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("collatz"))
}

#[test]
fn help_mentions_core_commands() {
    collatz().arg("--help").assert().success().stdout(
        predicate::str::contains("bench")
            .and(predicate::str::contains("sequence"))
            .and(predicate::str::contains("longest"))
            .and(predicate::str::contains("config-schema")),
    );
}

#[test]
fn sequence_json_reports_trajectory_of_27() {
    let output = collatz()
        .args(["sequence", "27", "--json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["number"].as_u64(), Some(27));
    assert_eq!(v["steps"].as_u64(), Some(111));
    let sequence = v["sequence"].as_array().unwrap();
    assert_eq!(sequence.len(), 112);
    assert_eq!(sequence.first().and_then(|x| x.as_u64()), Some(27));
    assert_eq!(sequence.last().and_then(|x| x.as_u64()), Some(1));
    assert_eq!(v["cache_hit"].as_bool(), Some(false));
}

#[test]
fn sequence_plain_text_shows_the_path() {
    collatz()
        .args(["sequence", "6"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("6 reaches 1 in 8 steps")
                .and(predicate::str::contains("6 -> 3 -> 10")),
        );
}

#[test]
fn sequence_of_zero_is_rejected_with_exit_code_2() {
    collatz()
        .args(["sequence", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid input 0"));
}

#[test]
fn longest_below_ten_is_nine() {
    collatz()
        .args(["longest", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is 9, with 19 steps"));
}

#[test]
fn longest_json_below_one_thousand() {
    let output = collatz()
        .args(["longest", "1000", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["number"].as_u64(), Some(871));
    assert_eq!(v["steps"].as_u64(), Some(178));
}

#[test]
fn longest_requires_a_limit_of_at_least_two() {
    collatz().args(["longest", "1"]).assert().code(2);
}

#[test]
fn bench_json_on_small_range() {
    let output = collatz()
        .args(["bench", "1", "200", "100", "50", "4096", "2", "1", "--json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["range"]["start"].as_u64(), Some(1));
    assert_eq!(v["range"]["end"].as_u64(), Some(200));
    assert_eq!(v["range"]["batch_count"].as_u64(), Some(4));
    assert_eq!(v["cache_size"].as_u64(), Some(100));
    assert_eq!(v["settings"]["sample_size"].as_u64(), Some(2));
    assert_eq!(v["uncached"]["cache_hit_rate"].as_f64(), Some(0.0));
    assert_eq!(v["cached"]["max_steps"].as_u64(), Some(124));
    assert_eq!(v["uncached"]["max_steps"].as_u64(), Some(124));
    assert!(v["cached"]["peak_pressure"].is_string());
}

#[test]
fn bench_plain_text_has_both_configurations() {
    collatz()
        .args(["bench", "1", "50", "100", "25", "4096", "1", "0"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("With cache")
                .and(predicate::str::contains("Without cache"))
                .and(predicate::str::contains("speedup"))
                .and(predicate::str::contains("peak pressure:")),
        );
}

#[test]
fn bench_rejects_inverted_range() {
    collatz()
        .args(["bench", "10", "1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("benchmark over 10..=1 failed"));
}

#[test]
fn bench_reads_settings_from_config_file() {
    let temp = TempDir::new().unwrap();
    let config = temp.child("collatz.toml");
    config
        .write_str(
            r#"
cache_size = 64
batch_size = 10
sample_size = 1
warmup_runs = 0
memory_threshold_mb = "4GB"
"#,
        )
        .unwrap();

    let output = collatz()
        .arg("--config")
        .arg(config.path())
        .args(["bench", "1", "30", "--json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["cache_size"].as_u64(), Some(64));
    assert_eq!(v["range"]["batch_count"].as_u64(), Some(3));
    assert_eq!(v["settings"]["warmup_runs"].as_u64(), Some(0));
}

#[test]
fn positional_arguments_override_config_file() {
    let temp = TempDir::new().unwrap();
    let config = temp.child("collatz.toml");
    config.write_str("cache_size = 64\nbatch_size = 10\n").unwrap();

    let output = collatz()
        .arg("--config")
        .arg(config.path())
        .args(["bench", "1", "30", "32", "15", "4096", "1", "0", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["cache_size"].as_u64(), Some(32));
    assert_eq!(v["range"]["batch_count"].as_u64(), Some(2));
}

#[test]
fn unknown_config_keys_are_warned_about() {
    let temp = TempDir::new().unwrap();
    let config = temp.child("collatz.toml");
    config.write_str("sampel_size = 2\n").unwrap();

    collatz()
        .arg("--config")
        .arg(config.path())
        .args(["sequence", "1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("unknown config key `sampel_size`"));
}

#[test]
fn invalid_config_values_exit_with_code_2() {
    let temp = TempDir::new().unwrap();
    let config = temp.child("collatz.toml");
    config.write_str("cache_size = 0\n").unwrap();

    collatz()
        .arg("--config")
        .arg(config.path())
        .args(["sequence", "1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid config"));
}

#[test]
fn missing_config_file_exits_with_code_2() {
    let temp = TempDir::new().unwrap();
    collatz()
        .arg("--config")
        .arg(temp.path().join("missing.toml"))
        .args(["sequence", "1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to load config"));
}

#[test]
fn config_schema_lists_known_fields() {
    let output = collatz().arg("config-schema").output().unwrap();
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let properties = v["properties"].as_object().unwrap();
    assert!(properties.contains_key("cache_size"));
    assert!(properties.contains_key("memory_threshold_mb"));
    assert!(properties.contains_key("logging"));
}
