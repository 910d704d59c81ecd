use std::{
    env, fs,
    path::PathBuf,
    process::{self, Command, Output},
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn traverse(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_traverse"))
        .args(args)
        .output()
        .expect("failed to invoke the traverse binary")
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_owned)
        .collect()
}

#[test]
fn walled_level_fails_without_repairs() {
    let level = fixture("walled.json");
    let output = traverse(&["--level", level.to_str().expect("utf-8 path")]);

    assert_eq!(output.status.code(), Some(1));
    let lines = stdout_lines(&output);
    assert_eq!(lines[0], "✓ Spawn valid and standable.");
    assert_eq!(lines[1], "✓ World validity pass.");
    assert_eq!(lines[2], "✗ exit unreachable");
    assert!(lines.contains(&"  Stage: base".to_owned()));
}

#[test]
fn repair_plan_opens_the_wall() {
    let level = fixture("walled.json");
    let repairs = fixture("open-wall.json");
    let output = traverse(&[
        "--level",
        level.to_str().expect("utf-8 path"),
        "--repairs",
        repairs.to_str().expect("utf-8 path"),
    ]);

    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        vec![
            "✓ Spawn valid and standable.",
            "✓ World validity pass.",
            "✓ exit feasible",
            "↺ Patch applied: open-wall",
        ]
    );
}

#[test]
fn staged_run_without_targets_passes_every_stage() {
    let level = fixture("walled.json");
    let output = traverse(&["--level", level.to_str().expect("utf-8 path"), "--staged"]);

    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output)[2..],
        [
            "✓ Stage 0 (base)",
            "✓ Stage 1 (anchor)",
            "✓ Stage 2 (anchor, flame)",
            "✓ Stage 3 (anchor, flame, magboots)",
            "✓ Final Stage",
        ]
    );
}

#[test]
fn written_plan_is_sorted_json() {
    let level = fixture("walled.json");
    let repairs = fixture("open-wall.json");
    let written = env::temp_dir().join(format!("traverse-cli-written-{}.json", process::id()));
    let output = traverse(&[
        "--level",
        level.to_str().expect("utf-8 path"),
        "--repairs",
        repairs.to_str().expect("utf-8 path"),
        "--write-repairs",
        written.to_str().expect("utf-8 path"),
    ]);
    assert!(output.status.success());

    let text = fs::read_to_string(&written).expect("plan written");
    let _ = fs::remove_file(&written);
    let plan: serde_json::Value = serde_json::from_str(&text).expect("plan is json");
    assert_eq!(plan["tilePatches"][0]["id"], "open-wall");
    assert_eq!(plan["autoFixes"][0]["ref"], "open-wall");
}

#[test]
fn unknown_unlock_is_reported_on_stderr() {
    let level = fixture("walled.json");
    let output = traverse(&[
        "--level",
        level.to_str().expect("utf-8 path"),
        "--unlock",
        "grapple",
    ]);

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown ability `grapple`"));
}

#[test]
fn disabled_plan_is_not_enabled_by_a_bad_spawn() {
    let level = fixture("floating.json");
    let repairs = fixture("open-wall-disabled.json");
    let written = env::temp_dir().join(format!("traverse-cli-disabled-{}.json", process::id()));
    let output = traverse(&[
        "--level",
        level.to_str().expect("utf-8 path"),
        "--repairs",
        repairs.to_str().expect("utf-8 path"),
        "--write-repairs",
        written.to_str().expect("utf-8 path"),
    ]);

    assert_eq!(output.status.code(), Some(1));
    let lines = stdout_lines(&output);
    assert_eq!(lines[0], "✗ Spawn invalid: tile not standable.");
    assert_eq!(lines[1], "  Suggested spawn override: 0,2.");
    assert!(lines.contains(&"✗ exit unreachable".to_owned()));
    assert!(lines.iter().all(|line| !line.starts_with('↺')));
    assert_eq!(
        lines.last().map(String::as_str),
        Some("✗ Auto-repair exceeded attempts.")
    );

    let text = fs::read_to_string(&written).expect("plan written");
    let _ = fs::remove_file(&written);
    let plan: serde_json::Value = serde_json::from_str(&text).expect("plan is json");
    assert_eq!(plan["enabled"], true);
    assert_eq!(plan["spawnOverride"]["tx"], 0);
    assert_eq!(plan["spawnOverride"]["ty"], 2);
    assert_eq!(plan["tilePatches"][0]["id"], "open-wall");
}

#[test]
fn plan_is_written_even_when_nothing_changes() {
    let level = fixture("walled.json");
    let written = env::temp_dir().join(format!("traverse-cli-empty-{}.json", process::id()));
    let output = traverse(&[
        "--level",
        level.to_str().expect("utf-8 path"),
        "--write-repairs",
        written.to_str().expect("utf-8 path"),
    ]);
    assert_eq!(output.status.code(), Some(1));

    let text = fs::read_to_string(&written).expect("plan written");
    let _ = fs::remove_file(&written);
    let plan: serde_json::Value = serde_json::from_str(&text).expect("plan is json");
    assert_eq!(plan["enabled"], false);
    assert_eq!(plan["spawnOverride"], serde_json::Value::Null);
    assert_eq!(plan["tilePatches"].as_array().map(Vec::len), Some(0));
}
