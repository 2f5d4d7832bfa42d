//! Build command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn build_empty_game_succeeds() {
  let env = TestEnv::new();

  env
    .build_cmd()
    .assert()
    .success()
    .stdout(predicate::str::contains("Loaded 0 installed composite mods"))
    .stdout(predicate::str::contains("Installed packed artifact"));

  assert_eq!(env.install_entries(), vec!["MergedMods_P.pak"]);
}

#[test]
fn build_reports_stage_counts() {
  let env = TestEnv::new();
  env.preset("a.dtp", "alpha", "weapons/gun", "10");
  env.preset("b.dtp", "beta", "weapons/missile", "20");

  env
    .build_cmd()
    .assert()
    .success()
    .stdout(predicate::str::contains("Loaded 2 loose presets"))
    .stdout(predicate::str::contains("Queued 3 mods for build"));
}

#[test]
fn unlocatable_game_exits_2() {
  let env = TestEnv::new();

  env
    .cmd()
    .arg("build")
    .assert()
    .code(2)
    .stderr(predicate::str::contains("could not locate"));
}

#[test]
fn missing_game_dir_exits_3() {
  let env = TestEnv::new();

  env
    .cmd()
    .arg("build")
    .arg("--install-path")
    .arg(env.temp.path().join("nowhere"))
    .assert()
    .code(3)
    .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn game_dir_from_env() {
  let env = TestEnv::new();

  env
    .cmd()
    .arg("build")
    .env("PAKMERGE_GAME_DIR", env.game_dir())
    .assert()
    .success();

  assert_eq!(env.install_entries(), vec!["MergedMods_P.pak"]);
}

#[test]
fn game_dir_from_config() {
  let env = TestEnv::new();
  env.write_config(&format!(
    "game_dir = {}\nartifact_name = \"FromConfig\"\n",
    toml_string(&env.game_dir().display().to_string())
  ));

  env.cmd().arg("build").assert().success();

  assert_eq!(env.install_entries(), vec!["FromConfig_P.pak"]);
}

#[test]
fn conflict_exits_4_and_keeps_previous_install() {
  let env = TestEnv::new();
  env.build_cmd().assert().success();

  env.preset("a.dtp", "alpha", "weapons/gun", "10");
  env.preset("b.dtp", "beta", "weapons/gun", "20");

  env
    .build_cmd()
    .assert()
    .code(4)
    .stderr(predicate::str::contains("alpha").and(predicate::str::contains("beta")));

  assert_eq!(env.install_entries(), vec!["MergedMods_P.pak"]);
}

#[test]
fn missing_template_input_exits_4() {
  let env = TestEnv::new();
  env.preset("a.dtp", "alpha", "weapons/gun", "{{damage}}");

  env
    .build_cmd()
    .assert()
    .code(4)
    .stderr(predicate::str::contains("damage"));
}

#[test]
fn clean_build_replaces_previous_files() {
  let env = TestEnv::new();
  env.write_file("game/ProjectWingman/Content/Paks/~pakmerge/stale_P.pak", "stale");

  env.build_cmd().assert().success();

  assert_eq!(env.install_entries(), vec!["MergedMods_P.pak"]);
}

#[test]
fn no_clean_keeps_previous_files() {
  let env = TestEnv::new();
  env.write_file("game/ProjectWingman/Content/Paks/~pakmerge/stale_P.pak", "stale");

  env.build_cmd().arg("--no-clean").assert().success();

  assert_eq!(env.install_entries(), vec!["MergedMods_P.pak", "stale_P.pak"]);
}

#[test]
fn loose_and_name_flags() {
  let env = TestEnv::new();
  env.preset("a.dtp", "alpha", "weapons/gun", "10");

  env
    .build_cmd()
    .arg("--loose")
    .arg("--name")
    .arg("Custom")
    .assert()
    .success()
    .stdout(predicate::str::contains("Installed loose artifact"));

  assert!(env.install_dir().join("Custom").join("merge.json").is_file());
}

#[test]
fn extra_preset_paths_are_positional() {
  let env = TestEnv::new();
  let extra = env.write_file("extra/mine.dtp", r#"{"parameters": {"color": "blue"}}"#);

  env
    .build_cmd()
    .arg(extra.parent().unwrap())
    .assert()
    .success()
    .stdout(predicate::str::contains("Loaded 1 loose presets"))
    .stdout(predicate::str::contains("Building with 1 parameters"));
}

#[test]
fn malformed_preset_warns_but_builds() {
  let env = TestEnv::new();
  env.preset("good.dtp", "alpha", "weapons/gun", "10");
  env.write_file("game/ProjectWingman/Content/Presets/bad.dtp", "{ nope");

  env
    .build_cmd()
    .assert()
    .success()
    .stdout(predicate::str::contains("Loaded 1 loose presets"))
    .stderr(predicate::str::contains("bad.dtp"));
}

#[test]
fn json_output_is_parseable() {
  let env = TestEnv::new();
  env.preset("a.dtp", "alpha", "weapons/gun", "10");

  let output = env.build_cmd().arg("-o").arg("json").output().unwrap();
  assert!(output.status.success());

  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(report["stats"]["loose_presets"], 1);
  assert_eq!(report["kind"], "packed");
}

#[test]
fn held_lock_exits_6() {
  let env = TestEnv::new();
  let _lock = pakmerge_lib::run_lock::RunLock::acquire(&env.paks_dir(), &env.game_dir(), "other").unwrap();

  env.build_cmd().assert().code(6);
}

fn toml_string(s: &str) -> String {
  format!("'{}'", s)
}
