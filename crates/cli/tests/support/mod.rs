#![forbid(unsafe_code)]
#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

pub(crate) fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    std::fs::write(path, body).expect("write fixture");
}

pub(crate) fn ov(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ov"))
        .args(args)
        .env_remove("OV_SOURCE_DIR")
        .env_remove("OV_UPSTREAM_FILE")
        .env_remove("OV_DISABLED_POLICY")
        .env_remove("OV_LOG")
        .output()
        .expect("spawn ov")
}

pub(crate) fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub(crate) fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Source store and upstream snapshot covering every verdict kind.
pub(crate) fn seed_overlay(root: &Path) {
    write(
        root,
        "data/overrides/tasks.json",
        r#"{
  "t-needed": {"minPlayerLevel": 10},
  "t-fixed": {"minPlayerLevel": 10},
  "t-gone": {"minPlayerLevel": 3},
  "t-disabled": {"disabled": true},
  "t-objective": {"objectives": {"obj1": {"count": 4}}}
}"#,
    );
    write(
        root,
        "data/additions/items.yaml",
        "new-item:\n  name: Community item\n",
    );
    write(
        root,
        "upstream.json",
        r#"{"data": {"tasks": [
  {"id": "t-needed", "name": "Debut", "minPlayerLevel": 20},
  {"id": "t-fixed", "name": "Shortage", "minPlayerLevel": 10},
  {"id": "t-disabled", "name": "Old task"},
  {"id": "t-objective", "name": "Gunsmith", "objectives": [{"id": "obj1", "count": 4}]}
]}}"#,
    );
}
