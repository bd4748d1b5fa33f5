use config::{Config, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::error::Result;
use crate::rewrite::registry::{RuleSpec, DEFAULT_PRESET};

/// Name of the per-project configuration file looked up in the root directory
pub const PROJECT_CONFIG_FILE: &str = "codeshift.toml";

/// Settings for a migration run, layered from defaults, the user config
/// directory, the project config file and `CODESHIFT_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// File extensions to process (without the leading dot)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Glob patterns (relative to the root) that are never read or written
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Built-in rule set to start from
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Rule and insertion names to switch off
    #[serde(default)]
    pub disabled_rules: Vec<String>,

    /// Custom rules appended after the preset
    #[serde(default)]
    pub rules: Vec<RuleSpec>,

    /// Project config file that contributed to these settings, if any
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

fn default_extensions() -> Vec<String> {
    ["js", "jsx", "ts", "tsx"].iter().map(|s| s.to_string()).collect()
}

fn default_exclude() -> Vec<String> {
    [
        "**/node_modules/**",
        "**/dist/**",
        "**/build/**",
        "**/*.test.tsx",
        "**/*.test.ts",
        "**/back-to-sc*",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude: default_exclude(),
            preset: default_preset(),
            disabled_rules: Vec::new(),
            rules: Vec::new(),
            config_path: None,
        }
    }
}

impl Settings {
    /// Load settings for `root`. An explicit config file must exist; the
    /// project and user config files are optional.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let user_config = ProjectDirs::from("", "", "codeshift")
            .map(|dirs| dirs.config_dir().join("config.toml"));
        Self::load_layers(root, explicit, user_config.as_deref())
    }

    pub(crate) fn load_layers(
        root: &Path,
        explicit: Option<&Path>,
        user_config: Option<&Path>,
    ) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(user_config) = user_config {
            builder = builder.add_source(
                File::from(user_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let project_config = match explicit {
            Some(path) => {
                builder =
                    builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
                Some(path.to_path_buf())
            }
            None => {
                let path = root.join(PROJECT_CONFIG_FILE);
                builder = builder.add_source(
                    File::from(path.as_path())
                        .format(FileFormat::Toml)
                        .required(false),
                );
                path.is_file().then_some(path)
            }
        };

        builder = builder.add_source(
            Environment::with_prefix("CODESHIFT")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("extensions")
                .with_list_parse_key("exclude")
                .with_list_parse_key("disabled_rules"),
        );

        let mut settings: Settings = builder.build()?.try_deserialize()?;
        settings.config_path = project_config;

        tracing::debug!(
            "Loaded settings: preset={}, {} custom rule(s), {} disabled",
            settings.preset,
            settings.rules.len(),
            settings.disabled_rules.len()
        );

        Ok(settings)
    }

    /// Include globs derived from the configured extensions
    pub fn include_globs(&self) -> Vec<String> {
        match self.extensions.as_slice() {
            [] => Vec::new(),
            [ext] => vec![format!("**/*.{}", ext)],
            exts => vec![format!("**/*.{{{}}}", exts.join(","))],
        }
    }
}
