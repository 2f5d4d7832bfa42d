//! Status command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn status_without_installs() {
  let env = TestEnv::new();

  env
    .cmd()
    .arg("status")
    .arg("--install-path")
    .arg(env.game_dir())
    .assert()
    .success()
    .stdout(predicate::str::contains("No composite mods installed"));
}

#[test]
fn status_lists_built_composite() {
  let env = TestEnv::new();
  env.preset("a.dtp", "alpha", "weapons/gun", "10");
  env.build_cmd().assert().success();

  env
    .cmd()
    .arg("status")
    .arg("--install-path")
    .arg(env.game_dir())
    .assert()
    .success()
    .stdout(predicate::str::contains("MergedMods (1 mods, 0 parameters)"));
}

#[test]
fn status_reports_corrupt_composite() {
  let env = TestEnv::new();
  env.write_zip(&env.install_dir().join("Broken_P.pak"), &[("merge.json", "{")]);

  env
    .cmd()
    .arg("status")
    .arg("--install-path")
    .arg(env.game_dir())
    .assert()
    .success()
    .stderr(predicate::str::contains("Broken_P.pak"));
}

#[test]
fn status_json() {
  let env = TestEnv::new();
  env.build_cmd().assert().success();

  let output = env
    .cmd()
    .arg("status")
    .arg("--install-path")
    .arg(env.game_dir())
    .arg("-o")
    .arg("json")
    .output()
    .unwrap();
  assert!(output.status.success());

  let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(status["installed"].as_array().unwrap().len(), 1);
}

#[test]
fn status_missing_game_dir_exits_3() {
  let env = TestEnv::new();

  env
    .cmd()
    .arg("status")
    .arg("--install-path")
    .arg(env.temp.path().join("nowhere"))
    .assert()
    .code(3);
}
