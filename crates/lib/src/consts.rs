//! Names and fixed values shared across the crate.

pub const APP_NAME: &str = "pakmerge";

/// Length of the truncated content hash used to identify mods.
pub const OBJ_HASH_PREFIX_LEN: usize = 20;

/// File extension of preset files, without the leading dot.
pub const PRESET_EXTENSION: &str = "dtp";

/// File extension of packed mod archives.
pub const PAK_EXTENSION: &str = "pak";

/// Suffix the game's loader requires for archives that override base content.
pub const PAK_PATCH_SUFFIX: &str = "_P";

/// Manifest entry written into every composite artifact.
pub const MANIFEST_ENTRY: &str = "merge.json";

/// Current composite manifest format version.
pub const MANIFEST_VERSION: u32 = 1;

/// Archive prefix under which rendered asset records are stored.
pub const ASSETS_PREFIX: &str = "assets/";

/// Archive prefix under which third-party mods ship embedded presets.
pub const EMBEDDED_PRESETS_PREFIX: &str = "presets/";

/// Default display name of the composite artifact.
pub const DEFAULT_ARTIFACT_NAME: &str = "MergedMods";

/// Lock file held for the duration of a build, created in the paks directory.
pub const RUN_LOCK_FILENAME: &str = ".pakmerge.lock";

/// Slot configuration file name used when none is configured.
pub const SLOT_CONFIG_FILENAME: &str = "slots.json";
