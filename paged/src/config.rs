//! Where backing files live and how they are named.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::names::{NameSource, RandomNames};

/// Environment variable overriding the scratch directory.
pub const SCRATCH_DIR_ENV: &str = "PAGED_SCRATCH_DIR";

/// Process-wide default, built on first use.
static SHARED: OnceLock<Scratch> = OnceLock::new();

/// Serializable scratch settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScratchConfig {
    /// Directory for backing files. `None` means the OS temp directory.
    pub dir: Option<PathBuf>,
    /// Prepended to every generated name.
    pub prefix: String,
    /// Appended to every generated name, e.g. `".limbs"`.
    pub extension: String,
}

impl ScratchConfig {
    /// Defaults, with `dir` taken from `PAGED_SCRATCH_DIR` when set.
    pub fn from_env() -> Self {
        let dir = std::env::var_os(SCRATCH_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self {
            dir,
            ..Self::default()
        }
    }

    pub fn resolved_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Resolved scratch settings plus the name generator.
///
/// Cheap to clone; every [`FileStore`](crate::FileStore) keeps one so that
/// copies and siblings land next to it.
#[derive(Clone)]
pub struct Scratch {
    dir: PathBuf,
    prefix: String,
    extension: String,
    names: Arc<dyn NameSource>,
}

impl Scratch {
    pub fn new(config: &ScratchConfig, names: Arc<dyn NameSource>) -> Self {
        Self {
            dir: config.resolved_dir(),
            prefix: config.prefix.clone(),
            extension: config.extension.clone(),
            names,
        }
    }

    /// Random names in `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let config = ScratchConfig {
            dir: Some(dir.into()),
            ..ScratchConfig::default()
        };
        Self::new(&config, Arc::new(RandomNames::new()))
    }

    /// Same directory and affixes, different name source.
    pub fn with_names(mut self, names: Arc<dyn NameSource>) -> Self {
        self.names = names;
        self
    }

    /// The process-wide default: `PAGED_SCRATCH_DIR` is read and the random
    /// name source seeded once, on the first call.
    pub fn shared() -> &'static Scratch {
        SHARED.get_or_init(Scratch::default)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for a fresh backing file.
    pub fn next_path(&self) -> PathBuf {
        let name = self.names.generate();
        self.dir
            .join(format!("{}{}{}", self.prefix, name, self.extension))
    }
}

impl Default for Scratch {
    fn default() -> Self {
        Self::new(&ScratchConfig::from_env(), Arc::new(RandomNames::new()))
    }
}

impl fmt::Debug for Scratch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scratch")
            .field("dir", &self.dir)
            .field("prefix", &self.prefix)
            .field("extension", &self.extension)
            .finish_non_exhaustive()
    }
}
