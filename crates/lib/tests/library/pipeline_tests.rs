//! Pipeline ordering, precedence and failure isolation.

use std::fs;

use serde_json::json;

use pakmerge_lib::pipeline::{self, PipelineError, RunOptions, assemble};
use pakmerge_lib::slots::SLOT_MOD_NAME;
use pakmerge_lib::util::hash::hash_directory;

use super::common::*;

fn names(request: &pakmerge_lib::build::BuildRequest) -> Vec<&str> {
  request.mods.iter().map(|m| m.name.as_str()).collect()
}

#[test]
fn empty_game_builds_and_installs_empty_artifact() {
  let game = TestGame::new();

  let report = pipeline::run(&game.context(), &game.builder()).unwrap();

  assert_eq!(report.stats.installed_mods, 0);
  assert_eq!(report.stats.embedded_presets, 0);
  assert_eq!(report.stats.loose_presets, 0);
  assert_eq!(report.stats.parameters, 0);
  assert_eq!(report.stats.slot_patches, 0);
  assert!(report.diagnostics.is_empty());
  assert_eq!(entries(&game.install_dir()), vec!["MergedMods_P.pak"]);
}

#[test]
fn mods_are_ordered_by_source() {
  let game = TestGame::new();
  game.installed_composite("Old_P.pak", &[simple_mod("installed", "a", "k", "1")], &[]);
  game.mod_with_embedded_preset("third_party.pak", &[simple_mod("embedded", "b", "k", "1")], &[]);
  game.loose_preset("user.dtp", &[simple_mod("loose", "c", "k", "1")], &[]);
  game.slot_config(json!([{ "target": "f16", "slot": 1, "skin": "tiger" }]));

  let assembly = assemble(&game.context()).unwrap();

  assert_eq!(names(&assembly.request), vec!["installed", "embedded", "loose", SLOT_MOD_NAME]);
  assert_eq!(assembly.stats.slot_patches, 1);
}

#[test]
fn loose_presets_override_embedded_override_installed() {
  let game = TestGame::new();
  game.installed_composite("Old_P.pak", &[], &[("color", "red"), ("size", "s"), ("only_installed", "x")]);
  game.mod_with_embedded_preset("third_party.pak", &[], &[("color", "green"), ("size", "m")]);
  game.loose_preset("user.dtp", &[], &[("color", "blue")]);

  let inputs = assemble(&game.context()).unwrap().request.template_inputs;

  assert_eq!(inputs["color"], "blue");
  assert_eq!(inputs["size"], "m");
  assert_eq!(inputs["only_installed"], "x");
}

#[test]
fn earlier_installed_composite_wins() {
  let game = TestGame::new();
  game.installed_composite("A_P.pak", &[], &[("color", "red")]);
  game.installed_composite("B_P.pak", &[], &[("color", "blue"), ("size", "l")]);

  let inputs = assemble(&game.context()).unwrap().request.template_inputs;

  assert_eq!(inputs["color"], "red");
  assert_eq!(inputs["size"], "l");
}

#[test]
fn later_loose_file_wins_within_its_layer() {
  let game = TestGame::new();
  game.loose_preset("a.dtp", &[], &[("color", "red")]);
  game.loose_preset("b.dtp", &[], &[("color", "blue")]);

  let inputs = assemble(&game.context()).unwrap().request.template_inputs;
  assert_eq!(inputs["color"], "blue");
}

#[test]
fn extra_preset_paths_are_searched() {
  let game = TestGame::new();
  let extra = game.temp.path().join("extra");
  write_file(&extra.join("x.dtp"), &preset_json(&[simple_mod("extra", "a", "k", "v")], &[]));

  let ctx = game.context_with(RunOptions {
    extra_preset_paths: vec![extra],
    ..RunOptions::default()
  });
  let assembly = assemble(&ctx).unwrap();
  assert_eq!(names(&assembly.request), vec!["extra", SLOT_MOD_NAME]);
}

#[test]
fn shared_mod_is_queued_once() {
  let game = TestGame::new();
  let shared = simple_mod("shared", "a", "k", "v");
  game.installed_composite("Old_P.pak", std::slice::from_ref(&shared), &[]);
  game.loose_preset("user.dtp", &[shared, simple_mod("new", "b", "k", "v")], &[]);

  let assembly = assemble(&game.context()).unwrap();
  assert_eq!(names(&assembly.request), vec!["shared", "new", SLOT_MOD_NAME]);
  assert_eq!(assembly.stats.duplicate_mods, 1);
}

#[test]
fn one_malformed_preset_among_ten_is_skipped() {
  let game = TestGame::new();
  for i in 0..9 {
    game.loose_preset(&format!("p{i}.dtp"), &[], &[("k", "v")]);
  }
  write_file(&game.presets_dir().join("p9.dtp"), b"{ not json");

  let assembly = assemble(&game.context()).unwrap();
  assert_eq!(assembly.stats.loose_presets, 9);
  assert_eq!(assembly.diagnostics.len(), 1);
  assert!(assembly.diagnostics[0].source.ends_with("p9.dtp"));
}

#[test]
fn corrupt_installed_mod_does_not_stop_the_run() {
  let game = TestGame::new();
  write_zip(&game.install_dir().join("Broken_P.pak"), &[("merge.json", b"{".to_vec())]);
  game.loose_preset("user.dtp", &[simple_mod("loose", "a", "k", "v")], &[]);

  let report = pipeline::run(&game.context(), &game.builder()).unwrap();
  assert_eq!(report.diagnostics.len(), 1);
  assert_eq!(report.stats.loose_presets, 1);
  assert_eq!(entries(&game.install_dir()), vec!["MergedMods_P.pak"]);
}

#[test]
fn conflicting_mods_leave_install_target_untouched() {
  let game = TestGame::new();
  game.installed_composite("Old_P.pak", &[], &[]);
  fs::write(game.install_dir().join("notes.txt"), "keep me").unwrap();
  game.loose_preset("a.dtp", &[simple_mod("first", "weapons/gun", "damage", "10")], &[]);
  game.loose_preset("b.dtp", &[simple_mod("second", "weapons/gun", "damage", "20")], &[]);

  let before = hash_directory(&game.install_dir()).unwrap();
  let result = pipeline::run(&game.context(), &game.builder());

  assert!(matches!(result, Err(PipelineError::Build(_))));
  assert_eq!(hash_directory(&game.install_dir()).unwrap(), before);
}

#[test]
fn failed_dispatch_leaves_install_target_untouched() {
  let game = TestGame::new();
  game.installed_composite("Old_P.pak", &[simple_mod("installed", "a", "k", "v")], &[]);

  let before = hash_directory(&game.install_dir()).unwrap();
  let result = pipeline::run(&game.context(), &FailingDispatcher);

  assert!(matches!(result, Err(PipelineError::Build(_))));
  assert_eq!(hash_directory(&game.install_dir()).unwrap(), before);
}

#[test]
fn rebuild_picks_up_previous_composite() {
  let game = TestGame::new();
  game.loose_preset("user.dtp", &[simple_mod("loose", "a", "k", "{{value}}")], &[("value", "1")]);

  let first = pipeline::run(&game.context(), &game.builder()).unwrap();
  let second = pipeline::run(&game.context(), &game.builder()).unwrap();

  assert_eq!(first.stats.installed_mods, 0);
  assert_eq!(second.stats.installed_mods, 1);
  assert_eq!(second.stats.queued_mods, first.stats.queued_mods);
  assert_eq!(second.install.removed.len(), 1);
  assert_eq!(entries(&game.install_dir()), vec!["MergedMods_P.pak"]);
}

#[test]
fn edited_preset_replaces_installed_copy_on_rebuild() {
  let game = TestGame::new();
  let ctx = game.context_with(RunOptions {
    pack: Some(false),
    ..RunOptions::default()
  });
  game.loose_preset("user.dtp", &[simple_mod("loose", "a", "k", "1")], &[]);
  pipeline::run(&ctx, &game.builder()).unwrap();

  game.loose_preset("user.dtp", &[simple_mod("loose", "a", "k", "2")], &[]);
  let report = pipeline::run(&ctx, &game.builder()).unwrap();

  assert_eq!(report.stats.installed_mods, 1);
  assert_eq!(report.stats.duplicate_mods, 1);
  let record: serde_json::Value =
    serde_json::from_slice(&fs::read(report.install.path.join("assets/a.json")).unwrap()).unwrap();
  assert_eq!(record["k"], "2");
}

#[test]
fn installed_mod_without_preset_is_still_queued() {
  let game = TestGame::new();
  game.installed_composite("Old_P.pak", &[simple_mod("orphan", "a", "k", "1")], &[]);
  game.loose_preset("user.dtp", &[simple_mod("loose", "b", "k", "1")], &[]);

  let assembly = assemble(&game.context()).unwrap();
  assert_eq!(names(&assembly.request), vec!["orphan", "loose", SLOT_MOD_NAME]);
  assert_eq!(assembly.stats.duplicate_mods, 0);
}

#[test]
fn skip_clean_keeps_foreign_files() {
  let game = TestGame::new();
  fs::create_dir_all(game.install_dir()).unwrap();
  fs::write(game.install_dir().join("readme.txt"), "hi").unwrap();

  let ctx = game.context_with(RunOptions {
    skip_clean: true,
    ..RunOptions::default()
  });
  pipeline::run(&ctx, &game.builder()).unwrap();

  assert_eq!(entries(&game.install_dir()), vec!["MergedMods_P.pak", "readme.txt"]);
}

#[test]
fn loose_output_installs_a_directory() {
  let game = TestGame::new();
  game.loose_preset("user.dtp", &[simple_mod("loose", "a", "k", "v")], &[]);

  let ctx = game.context_with(RunOptions {
    pack: Some(false),
    ..RunOptions::default()
  });
  let report = pipeline::run(&ctx, &game.builder()).unwrap();

  assert!(report.install.path.is_dir());
  assert!(report.install.path.join("merge.json").is_file());
  assert!(report.install.path.join("assets/a.json").is_file());
}
