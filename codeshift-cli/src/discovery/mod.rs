use ignore::overrides::{Override, OverrideBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::core::{CodeshiftError, Result, Settings};

/// Build and dependency directories that are never walked, whatever the
/// configured excludes say
pub const ALWAYS_EXCLUDED_DIRS: &[&str] = &["node_modules", "dist", "build", "target", ".git"];

/// Enumerates the files a run should process
pub trait FileDiscovery {
    /// Absolute paths of candidate files under `root`, in a stable order
    fn discover(&self, root: &Path) -> Result<Vec<PathBuf>>;
}

/// Walks a directory tree keeping files that match an include glob and no
/// exclude glob. Globs are relative to the root and use gitignore syntax,
/// including `{a,b}` alternation.
#[derive(Debug, Clone, Default)]
pub struct GlobWalker {
    include: Vec<String>,
    exclude: Vec<String>,

    /// Exact files that are never returned (the tool itself, its config)
    protected: Vec<PathBuf>,
}

impl GlobWalker {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self {
            include,
            exclude,
            protected: Vec::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let mut walker = Self::new(settings.include_globs(), settings.exclude.clone());

        if let Some(config_path) = &settings.config_path {
            walker = walker.protect(config_path.clone());
        }
        if let Ok(exe) = std::env::current_exe() {
            walker = walker.protect(exe);
        }

        walker
    }

    pub fn protect(mut self, path: PathBuf) -> Self {
        let path = path.canonicalize().unwrap_or(path);
        self.protected.push(path);
        self
    }

    fn overrides(&self, root: &Path) -> Result<Override> {
        let mut builder = OverrideBuilder::new(root);

        let add = |builder: &mut OverrideBuilder, glob: String| -> Result<()> {
            builder
                .add(&glob)
                .map_err(|e| CodeshiftError::InvalidGlob {
                    pattern: glob.clone(),
                    message: e.to_string(),
                })?;
            Ok(())
        };

        for glob in &self.include {
            add(&mut builder, glob.clone())?;
        }
        // Later globs win, so excludes go last
        for dir in ALWAYS_EXCLUDED_DIRS {
            add(&mut builder, format!("!**/{}", dir))?;
        }
        for glob in &self.exclude {
            add(&mut builder, format!("!{}", glob))?;
        }

        builder.build().map_err(|e| CodeshiftError::InvalidGlob {
            pattern: self.include.join(", "),
            message: e.to_string(),
        })
    }
}

impl FileDiscovery for GlobWalker {
    fn discover(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let discovery_error = |message: String| CodeshiftError::Discovery {
            root: root.to_path_buf(),
            message,
        };

        let root = root
            .canonicalize()
            .map_err(|e| discovery_error(e.to_string()))?;
        if !root.is_dir() {
            return Err(discovery_error("not a directory".to_string()));
        }

        if self.include.is_empty() {
            return Ok(Vec::new());
        }

        let walker = WalkBuilder::new(&root)
            .standard_filters(false)
            .hidden(true)
            .follow_links(false)
            .overrides(self.overrides(&root)?)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| discovery_error(e.to_string()))?;
            if !entry.file_type().is_some_and(|kind| kind.is_file()) {
                continue;
            }

            let path = entry.into_path();
            if self.protected.iter().any(|protected| *protected == path) {
                tracing::debug!("Skipping protected file: {}", path.display());
                continue;
            }
            files.push(path);
        }

        Ok(files)
    }
}
