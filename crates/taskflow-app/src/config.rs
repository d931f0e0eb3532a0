use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::latency::{LatencyProfile, Operation};

const CONFIG_DIR: &str = ".taskflow";
const USER_CONFIG_DIR: &str = "taskflow";
const CONFIG_FILE: &str = "config.toml";
const MAX_DELAY_MS: u64 = 60_000;

/// Top-level configuration loaded from `.taskflow/config.toml`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Simulated latency settings.
    #[serde(default)]
    pub latency: LatencyConfig,
    /// Seed data settings.
    #[serde(default)]
    pub fixtures: FixturesConfig,
}

impl ProjectConfig {
    /// Load the project configuration, falling back to the user-level file
    /// under `user_config_dir` and then to defaults.
    ///
    /// # Errors
    /// Returns an error when a present file cannot be read, parsed or validated.
    pub fn load(workdir: impl AsRef<Path>, user_config_dir: Option<&Path>) -> Result<Self> {
        let workdir = workdir.as_ref();
        let project_path = workdir.join(CONFIG_DIR).join(CONFIG_FILE);
        if project_path.exists() {
            return Self::from_file(&project_path, workdir);
        }

        if let Some(user_dir) = user_config_dir {
            let base = user_dir.join(USER_CONFIG_DIR);
            let user_path = base.join(CONFIG_FILE);
            if user_path.exists() {
                return Self::from_file(&user_path, &base);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a known working directory only.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read, parsed or validated.
    pub fn from_workdir(workdir: impl AsRef<Path>) -> Result<Self> {
        Self::load(workdir, None)
    }

    /// Parse `path`, resolving relative paths against `base`.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path, base: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        let mut config: Self =
            toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        if let Some(dir) = config.fixtures.dir.take() {
            config.fixtures.dir = Some(if dir.is_relative() { base.join(dir) } else { dir });
        }
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for op in Operation::ALL {
            let millis = self.latency.millis(op);
            if millis > MAX_DELAY_MS {
                bail!("latency.{op} = {millis} exceeds the {MAX_DELAY_MS} ms limit");
            }
        }
        Ok(())
    }
}

/// `[latency]` block. Values are milliseconds.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LatencyConfig {
    /// Disable to run every operation without delay.
    pub enabled: bool,
    /// Listing every record.
    pub get_all: u64,
    /// Loading one record.
    pub get_by_id: u64,
    /// Creating a record.
    pub create: u64,
    /// Patching a record.
    pub update: u64,
    /// Deleting a record.
    pub delete: u64,
    /// Derived queries.
    pub query: u64,
    /// Reordering tasks.
    pub reorder: u64,
    /// Overwriting a category count.
    pub update_task_count: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            get_all: Operation::GetAll.reference_millis(),
            get_by_id: Operation::GetById.reference_millis(),
            create: Operation::Create.reference_millis(),
            update: Operation::Update.reference_millis(),
            delete: Operation::Delete.reference_millis(),
            query: Operation::Query.reference_millis(),
            reorder: Operation::Reorder.reference_millis(),
            update_task_count: Operation::UpdateTaskCount.reference_millis(),
        }
    }
}

impl LatencyConfig {
    /// Configured delay for `op` in milliseconds.
    #[must_use]
    pub const fn millis(&self, op: Operation) -> u64 {
        match op {
            Operation::GetAll => self.get_all,
            Operation::GetById => self.get_by_id,
            Operation::Create => self.create,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
            Operation::Query => self.query,
            Operation::Reorder => self.reorder,
            Operation::UpdateTaskCount => self.update_task_count,
        }
    }

    /// Build the runtime profile. A disabled block yields zero delays.
    #[must_use]
    pub fn to_profile(&self) -> LatencyProfile {
        if !self.enabled {
            return LatencyProfile::none();
        }
        Operation::ALL.into_iter().fold(LatencyProfile::none(), |profile, op| {
            profile.with(op, Duration::from_millis(self.millis(op)))
        })
    }
}

/// `[fixtures]` block.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FixturesConfig {
    /// Directory holding `tasks.json` and `categories.json`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}
