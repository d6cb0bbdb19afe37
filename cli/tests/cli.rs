use assert_cmd::Command;
use std::{
    fs,
    os::unix::fs::PermissionsExt as _,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

fn script(path: &Path, body: &str) {
    fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// Lays out a fake install tree, mount helper and config under one tempdir.
/// `populate` decides whether the mount helper fills the mount point.
fn setup(populate: bool, tool_exit: i32) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path();

    let install = base.join("RoseTTAFold2NA");
    fs::create_dir(&install).unwrap();
    script(
        &install.join("run_RF2NA.sh"),
        &format!(
            "echo \"$@\" > {}\nexit {tool_exit}",
            base.join("tool-args").display()
        ),
    );

    let mount_helper = base.join("mount.fake");
    let helper_body = if populate {
        "mkdir -p \"$4/bfd\" \"$4/RF2NA_weights\"\necho \"$@\" > \"$4/../mount-args\""
    } else {
        "exit 0"
    };
    script(&mount_helper, helper_body);

    let config = base.join("RF2NA.toml");
    fs::write(
        &config,
        format!(
            r#"
preflight = [["true"]]

[mount]
program = "{helper}"
uri = "s3://test-bucket/db"
mount_point = "{mount}"
max_wait = {{ secs = 0, nanos = 300000000 }}
poll_interval = {{ secs = 0, nanos = 20000000 }}

[tool]
install_dir = "{install}"

[output]
root = "{outputs}"

[notify]
jsonl = "{messages}"

[[link.links]]
source = "bfd"
target = "bfd"
"#,
            helper = mount_helper.display(),
            mount = base.join("ofs").display(),
            install = install.display(),
            outputs = base.join("outputs").display(),
            messages = base.join("messages.jsonl").display(),
        ),
    )
    .unwrap();
    (dir, config)
}

fn rf2na() -> Command {
    let mut cmd = Command::cargo_bin("rf2na").unwrap();
    cmd.env_remove("RF2NA_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn run_end_to_end() {
    let (dir, config) = setup(true, 0);
    let base = dir.path();
    let output = rf2na()
        .args(["run", "--run-name", "demo_1", "-s", "protein:/in/protein.fa"])
        .args(["-s", "dsdna:/in/dna.fa", "--output-directory", "latch:///out"])
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout.trim(),
        format!("{}\tlatch:///out", base.join("outputs").display())
    );

    let args = fs::read_to_string(base.join("tool-args")).unwrap();
    assert_eq!(
        args.trim(),
        format!(
            "{} P:/in/protein.fa D:/in/dna.fa",
            base.join("outputs/demo_1").display()
        )
    );
    let mount_args = fs::read_to_string(base.join("mount-args")).unwrap();
    assert!(mount_args.starts_with("-o mtplus,noatime"));
    assert!(mount_args.contains("s3://test-bucket/db"));
    assert_eq!(
        fs::read_link(base.join("RoseTTAFold2NA/bfd")).unwrap(),
        base.join("ofs/bfd")
    );
    assert!(!base.join("messages.jsonl").exists());
}

#[test]
fn empty_mount_fails_without_running_tool() {
    let (dir, config) = setup(false, 0);
    let base = dir.path();
    rf2na()
        .args(["run", "--run-name", "demo", "-s", "P:/in/protein.fa", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .code(1);

    assert!(!base.join("tool-args").exists());
    assert!(base.join("RoseTTAFold2NA/bfd").symlink_metadata().is_err());
    let messages = fs::read_to_string(base.join("messages.jsonl")).unwrap();
    assert!(messages.contains("\"title\":\"ObjectiveFS Mount failed\""));
    assert!(messages.contains("\"severity\":\"error\""));
    assert!(messages.contains("\"body\":\"Failed mount\""));
}

#[test]
fn tool_failure_exits_nonzero() {
    let (dir, config) = setup(true, 4);
    rf2na()
        .args(["run", "--run-name", "demo", "-s", "rna:/in/rna.fa", "--config"])
        .arg(&config)
        .assert()
        .failure();
    let messages = fs::read_to_string(dir.path().join("messages.jsonl")).unwrap();
    assert!(messages.contains("RoseTTAFold2NA failed with exit code 4"));
}

#[test]
fn invalid_run_name_rejected() {
    let (dir, config) = setup(true, 0);
    rf2na()
        .args(["run", "--run-name", "has space", "-s", "P:/in/p.fa", "--config"])
        .arg(&config)
        .assert()
        .failure();
    assert!(!dir.path().join("outputs").exists());
}

#[test]
fn plan_prints_command() {
    let (dir, config) = setup(true, 0);
    let base = dir.path();
    let output = rf2na()
        .args(["plan", "--run-name", "x", "-s", "PR:/in/pair.fa", "-s", "S:/in/ss.fa"])
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap().trim(),
        format!(
            "{} {} PR:/in/pair.fa S:/in/ss.fa",
            base.join("RoseTTAFold2NA/run_RF2NA.sh").display(),
            base.join("outputs/x").display()
        )
    );
    assert!(!base.join("ofs").exists());
}

#[test]
fn check_config_rejects_bad_timing() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(
        &config,
        "[mount]\nmax_wait = { secs = 1, nanos = 0 }\npoll_interval = { secs = 5, nanos = 0 }\n",
    )
    .unwrap();
    rf2na()
        .args(["check-config", "--config"])
        .arg(&config)
        .assert()
        .failure();
}
