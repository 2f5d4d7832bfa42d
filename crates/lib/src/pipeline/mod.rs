//! The merge pipeline: discover, load, merge, compile, build, install.
//!
//! Every stage reads from an immutable [`RunContext`]. Sources that fail on
//! their own (one preset file, one installed mod) are skipped and reported as
//! diagnostics. A build or install failure ends the run before the install
//! target is touched, or with it restored.

mod context;

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

pub use context::{RunContext, RunOptions};

use crate::build::{ArtifactKind, BuildDispatcher, BuildError, BuildRequest};
use crate::discovery::ModDiscovery;
use crate::install::{InstallError, InstallReport, install};
use crate::params::{LayeredParameters, SourceKind};
use crate::preset::PresetLoader;
use crate::slots::{self, SlotConfig};
use crate::types::{Diagnostic, Mod};
use crate::util::hash::{ContentHash, Hashable};

#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("build failed")]
  Build(#[from] BuildError),

  #[error("install failed")]
  Install(#[from] InstallError),

  #[error("failed to fingerprint mod")]
  Fingerprint(#[from] serde_json::Error),
}

/// Counts surfaced for each stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
  pub installed_mods: usize,
  pub embedded_presets: usize,
  pub loose_presets: usize,
  pub parameters: usize,
  pub slot_patches: usize,
  pub queued_mods: usize,
  /// Mods dropped as stale installed copies or because an identical one
  /// was already queued.
  pub duplicate_mods: usize,
}

/// A ready-to-dispatch request plus what it took to assemble it.
#[derive(Debug)]
pub struct Assembly {
  pub request: BuildRequest,
  pub stats: RunStats,
  pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
  pub stats: RunStats,
  pub diagnostics: Vec<Diagnostic>,
  pub kind: ArtifactKind,
  pub content_hash: ContentHash,
  pub install: InstallReport,
}

/// Gather every source and assemble the build request without building.
pub fn assemble(ctx: &RunContext) -> Result<Assembly, PipelineError> {
  let mut stats = RunStats::default();
  let mut diagnostics = Vec::new();
  let mut params = LayeredParameters::new();

  let discovered = ModDiscovery::new(ctx.discovery_dirs())
    .with_preset_extension(ctx.preset_extension())
    .discover();
  diagnostics.extend(discovered.diagnostics);
  stats.installed_mods = discovered.installed.len();
  stats.embedded_presets = discovered.embedded_presets.len();
  info!(count = stats.installed_mods, "loaded installed composite mods");
  info!(count = stats.embedded_presets, "loaded embedded presets");

  let loaded = PresetLoader::new(ctx.preset_dirs().to_vec())
    .with_extension(ctx.preset_extension())
    .load_all();
  diagnostics.extend(loaded.diagnostics);
  stats.loose_presets = loaded.presets.len();
  info!(count = stats.loose_presets, "loaded loose presets");

  let (slot_config, slot_diagnostic) = SlotConfig::load(ctx.slot_config());
  diagnostics.extend(slot_diagnostic);
  let slot_mod = slots::compile(&slot_config);
  stats.slot_patches = slot_mod.patch_count();
  info!(patches = stats.slot_patches, "compiled slot assignments");

  let mut installed_mods = Vec::new();
  let mut installed_inputs = Vec::with_capacity(discovered.installed.len());
  for installed in discovered.installed {
    installed_inputs.push(installed.manifest.template_inputs);
    installed_mods.extend(installed.manifest.mods);
  }
  // Earlier installed composites win over later ones.
  params.extend(SourceKind::InstalledMod, installed_inputs.into_iter().rev());

  let mut fresh = Vec::new();
  for preset in discovered.embedded_presets {
    params.push(SourceKind::EmbeddedPreset, preset.parameters);
    fresh.extend(preset.mods);
  }
  for preset in loaded.presets {
    params.push(SourceKind::LoosePreset, preset.parameters);
    fresh.extend(preset.mods);
  }

  let before = installed_mods.len() + fresh.len() + 1;
  let mut mods = supersede(installed_mods, &fresh);
  mods.extend(fresh);
  mods.push(slot_mod);
  let mods = dedupe(mods)?;
  stats.duplicate_mods = before - mods.len();
  stats.queued_mods = mods.len();

  let template_inputs = params.merged();
  stats.parameters = template_inputs.len();
  info!(parameters = stats.parameters, mods = stats.queued_mods, "assembled build request");

  let request = BuildRequest {
    mods,
    template_inputs,
    name: ctx.artifact_name().to_string(),
    user: ctx.user().to_string(),
    pack: ctx.pack(),
  };

  Ok(Assembly {
    request,
    stats,
    diagnostics,
  })
}

/// Run the whole pipeline and install the result.
pub fn run(ctx: &RunContext, dispatcher: &impl BuildDispatcher) -> Result<RunReport, PipelineError> {
  let Assembly {
    request,
    stats,
    diagnostics,
  } = assemble(ctx)?;

  let artifact = dispatcher.build(request)?;
  let kind = artifact.kind();
  let content_hash = artifact.content_hash().clone();

  let install = install(artifact, ctx.install_dir(), ctx.skip_clean())?;

  Ok(RunReport {
    stats,
    diagnostics,
    kind,
    content_hash,
    install,
  })
}

/// Drop installed copies that a preset supplies again, matched by name, and
/// repeats of a name among the installed composites themselves.
fn supersede(installed: Vec<Mod>, fresh: &[Mod]) -> Vec<Mod> {
  let fresh_names: HashSet<&str> = fresh.iter().map(|m| m.name.as_str()).collect();
  let mut seen = HashSet::new();
  installed
    .into_iter()
    .filter(|m| {
      if fresh_names.contains(m.name.as_str()) {
        debug!(name = %m.name, "installed copy superseded by preset");
        false
      } else if !seen.insert(m.name.clone()) {
        debug!(name = %m.name, "dropping repeated installed mod");
        false
      } else {
        true
      }
    })
    .collect()
}

/// Keep the first occurrence of each distinct mod, preserving order.
fn dedupe(mods: Vec<Mod>) -> Result<Vec<Mod>, PipelineError> {
  let mut seen = HashSet::new();
  let mut unique = Vec::with_capacity(mods.len());
  for m in mods {
    if seen.insert(m.compute_hash()?) {
      unique.push(m);
    } else {
      debug!(name = %m.name, "dropping duplicate mod");
    }
  }
  Ok(unique)
}
