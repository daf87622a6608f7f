use std::path::PathBuf;
use std::process::Output;

use pretty_assertions::assert_eq;

fn edgedock(args: &[&str]) -> Output {
    test_bin::get_test_bin("edgedock")
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to start edgedock")
}

fn demo(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn missing_config(dir: &tempfile::TempDir) -> String {
    dir.path().join("none.toml").to_string_lossy().into_owned()
}

#[test]
fn layout_prints_geometry_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let config = missing_config(&dir);
    let out = edgedock(&["--config", &config, "layout", "--width", "1920", "--height", "1080"]);
    assert!(out.status.success());

    let geometry: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(geometry["icon_size"], 64.0);
    assert_eq!(geometry["dock_width"], 1920.0);
    assert_eq!(geometry["position"], "bottom");
    assert_eq!(geometry["shrink"], 1.0);
}

#[test]
fn layout_shrinks_a_crowded_dock() {
    let dir = tempfile::tempdir().unwrap();
    let config = missing_config(&dir);
    let out = edgedock(&["--config", &config, "layout", "--width", "800", "--icons", "40"]);
    assert!(out.status.success());

    let geometry: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert!(geometry["shrink"].as_f64().unwrap() < 1.0);
    assert!(geometry["icon_size"].as_f64().unwrap() < 64.0);
}

#[test]
fn check_config_reports_out_of_range_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("edgedock.toml");
    std::fs::write(&path, "[dock]\nicon_size = 3.0\n").unwrap();

    let out = edgedock(&["check-config", &path.to_string_lossy()]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("icon_size"), "{stdout}");
    assert!(stdout.contains("1 fixable"), "{stdout}");
}

#[test]
fn check_config_rejects_unknown_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("edgedock.toml");
    std::fs::write(&path, "[dock]\nwobble = true\n").unwrap();

    let out = edgedock(&["check-config", &path.to_string_lossy()]);
    assert!(!out.status.success());
}

#[test]
fn simulate_prints_records_then_actions() {
    let dir = tempfile::tempdir().unwrap();
    let config = missing_config(&dir);
    let out = edgedock(&["--config", &config, "simulate", &demo("hide_and_activate.ron")]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let lines: Vec<serde_json::Value> = String::from_utf8_lossy(&out.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let states: Vec<&str> = lines.iter().filter_map(|l| l["state"].as_str()).collect();
    assert_eq!(states.first(), Some(&"shown"));
    assert!(states.contains(&"hidden"));

    let performed: Vec<&serde_json::Value> =
        lines.iter().filter(|l| l.get("performed").is_some()).collect();
    assert_eq!(performed.len(), 1);
    assert_eq!(performed[0]["performed"]["minimize_all"], serde_json::json!([100]));
}

#[test]
fn simulate_fails_on_a_bad_script() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.ron");
    std::fs::write(&path, "(steps: [(event: tick(-1.0))])").unwrap();

    let out = edgedock(&["simulate", &path.to_string_lossy()]);
    assert!(!out.status.success());
}
