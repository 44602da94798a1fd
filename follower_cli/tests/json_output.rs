use assert_cmd::Command;
use tempfile::tempdir;

fn follower() -> Command {
    let mut cmd = Command::cargo_bin("follower").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Last stdout/stderr line that parses as a JSON object.
fn last_json(text: &[u8]) -> serde_json::Value {
    String::from_utf8_lossy(text)
        .lines()
        .rev()
        .find_map(|l| {
            let start = l.find('{')?;
            serde_json::from_str::<serde_json::Value>(&l[start..]).ok()
        })
        .expect("no JSON line in output")
}

#[test]
fn self_check_json_has_both_readings() {
    let out = follower()
        .args(["--json", "self-check", "--sim"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let v = last_json(&out.stdout);
    assert_eq!(v["status"], "ok");
    assert!(v["left"].is_i64());
    assert!(v["right"].is_i64());
}

#[test]
fn run_json_summary_fields() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.csv");
    let out = follower()
        .args(["--json", "run", "--sim", "--telemetry", path.to_str().unwrap()])
        .write_stdin("q\n")
        .output()
        .unwrap();
    assert!(out.status.success());
    let v = last_json(&out.stdout);
    assert_eq!(v["status"], "ok");
    assert!(v["records"].is_u64());
    assert!(v["iterations"].is_u64());
    assert_eq!(v["telemetry"], path.display().to_string());
}

#[test]
fn json_errors_carry_reason_and_exit_code() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("cfg.toml");
    std::fs::write(&cfg, "[control]\nbase_speed = 255\n").unwrap();
    let out = follower()
        .args(["--json", "--config", cfg.to_str().unwrap(), "self-check", "--sim"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
    let line = String::from_utf8_lossy(&out.stderr)
        .lines()
        .rev()
        .find(|l| l.contains("\"reason\""))
        .map(str::to_owned)
        .expect("no structured error on stderr");
    let v: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(v["reason"], "Config");
    assert_eq!(v["exit_code"], 2);
    assert!(v["message"].as_str().unwrap().contains("base_speed"));
}
