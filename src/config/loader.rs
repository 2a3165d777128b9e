// src/config/loader.rs

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::diagnostics::Diagnostics;
use crate::config::merge::Merge;
use crate::config::model::Config;
use crate::errors::{ConfigError, Result};
use crate::fs::{FileSystem, RealFileSystem};

/// File names picked up when a config path is a directory.
const FRAGMENT_PATTERNS: &[&str] = &["*.toml", "*.json"];

/// Reads configuration fragments through a [`FileSystem`].
#[derive(Debug)]
pub struct ConfigLoader<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> ConfigLoader<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    /// Decode one file. `.json` files are parsed as JSON, everything else as
    /// TOML. Errors name the file.
    pub fn load_fragment(&self, path: &Path) -> Result<Config> {
        let contents = self.fs.read_to_string(path)?;
        let document = parse_document(path, &contents)
            .map_err(|e| ConfigError::Decode(format!("{}: {}", path.display(), e.message())))?;
        Config::from_document(document)
            .map_err(|e| ConfigError::Decode(format!("{}: {}", path.display(), e.message())))
    }

    /// Expand a config path into the files to load, in load order.
    ///
    /// A file is returned as is. A directory yields its `*.toml` and
    /// `*.json` entries sorted by file name; subdirectories are not walked.
    pub fn fragment_paths(&self, path: &Path) -> Result<Vec<PathBuf>> {
        if self.fs.is_file(path) {
            return Ok(vec![path.to_path_buf()]);
        }
        if !self.fs.is_dir(path) {
            return Err(ConfigError::Decode(format!(
                "{}: no such file or directory",
                path.display()
            )));
        }

        let patterns = fragment_globs()?;
        let mut files: Vec<PathBuf> = self
            .fs
            .read_dir(path)?
            .into_iter()
            .filter(|p| self.fs.is_file(p))
            .filter(|p| p.file_name().is_some_and(|name| patterns.is_match(name)))
            .collect();
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// Decode every path and merge the fragments in order. The first decode
    /// error is returned as is.
    pub fn build_config(&self, paths: &[PathBuf]) -> Result<Config> {
        let mut config = Config::default();
        for path in paths {
            for file in self.fragment_paths(path)? {
                debug!(file = %file.display(), "loading config fragment");
                let fragment = self.load_fragment(&file)?;
                config = config.merge(&fragment);
            }
        }
        Ok(config)
    }

    /// Build, finalize and validate. Advisories are logged as warnings and
    /// returned alongside the config.
    pub fn load_and_validate(&self, paths: &[PathBuf]) -> Result<(Config, Diagnostics)> {
        let mut config = self.build_config(paths)?;
        let diags = config.finalize();
        for diag in &diags {
            warn!(kind = ?diag.kind, "{diag}");
        }
        config.validate()?;
        info!(
            tasks = config.task.len(),
            warnings = diags.len(),
            "configuration loaded"
        );
        Ok((config, diags))
    }
}

fn fragment_globs() -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in FRAGMENT_PATTERNS {
        builder.add(Glob::new(pattern).map_err(anyhow::Error::from)?);
    }
    Ok(builder.build().map_err(anyhow::Error::from)?)
}

fn parse_document(path: &Path, contents: &str) -> Result<Value> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        return Ok(serde_json::from_str(contents)?);
    }
    let table: toml::Table = toml::from_str(contents)?;
    Ok(serde_json::to_value(table)?)
}

/// [`ConfigLoader::load_fragment`] on the real filesystem.
pub fn load_fragment(path: impl AsRef<Path>) -> Result<Config> {
    ConfigLoader::new(&RealFileSystem).load_fragment(path.as_ref())
}

/// [`ConfigLoader::build_config`] on the real filesystem.
pub fn build_config(paths: &[PathBuf]) -> Result<Config> {
    ConfigLoader::new(&RealFileSystem).build_config(paths)
}

/// [`ConfigLoader::load_and_validate`] on the real filesystem.
pub fn load_and_validate(paths: &[PathBuf]) -> Result<(Config, Diagnostics)> {
    ConfigLoader::new(&RealFileSystem).load_and_validate(paths)
}

/// Config path used when none is given on the command line.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("nia-config.toml")
}
