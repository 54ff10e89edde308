use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumIter};

use crate::config::themes::ThemeRegistry;
use crate::storage::Geometry;

pub mod themes;

const APP_DOMAIN: &str = "io";
const APP_ORG: &str = "StickyDesk";
const APP_NAME: &str = "stickydesk";

pub const CONFIG_ENV: &str = "STICKYDESK_CONFIG";
pub const DATA_ENV: &str = "STICKYDESK_DATA";
pub const NOTES_FILE_NAME: &str = "sticky_notes_data.json";

pub struct ConfigLoader {
    paths: ConfigPaths,
}

impl ConfigLoader {
    pub fn discover() -> Result<Self> {
        let paths = ConfigPaths::discover()?;
        Ok(Self { paths })
    }

    pub fn with_paths(paths: ConfigPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn load_or_init(&self) -> Result<AppConfig> {
        self.paths.ensure_directories()?;
        if !self.paths.config_file.exists() {
            let mut default_cfg = AppConfig::default();
            self.write_default_config(&default_cfg)?;
            default_cfg.post_load(&self.paths)?;
            return Ok(default_cfg);
        }

        self.load()
    }

    pub fn load(&self) -> Result<AppConfig> {
        let raw = fs::read_to_string(&self.paths.config_file)
            .with_context(|| format!("reading config {}", self.paths.config_file.display()))?;
        let mut cfg: AppConfig = toml::from_str(&raw).context("parsing config toml")?;
        cfg.post_load(&self.paths)?;
        Ok(cfg)
    }

    fn write_default_config(&self, cfg: &AppConfig) -> Result<()> {
        let toml = toml::to_string_pretty(cfg).context("serializing default config")?;
        if let Some(parent) = self.paths.config_file.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut file = fs::File::create(&self.paths.config_file)
            .with_context(|| format!("creating config {}", self.paths.config_file.display()))?;
        file.write_all(toml.as_bytes())
            .context("writing default config")?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
    pub data_dir: PathBuf,
    pub notes_file: PathBuf,
    pub state_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl ConfigPaths {
    pub fn discover() -> Result<Self> {
        let override_config = env::var(CONFIG_ENV).ok().map(PathBuf::from);
        let override_data = env::var(DATA_ENV).ok().map(PathBuf::from);

        let project_dirs = ProjectDirs::from(APP_DOMAIN, APP_ORG, APP_NAME)
            .context("resolving XDG project directories")?;

        let config_dir = override_config
            .clone()
            .map(|p| {
                if p.is_dir() {
                    p
                } else {
                    p.parent().map(Path::to_path_buf).unwrap_or(p)
                }
            })
            .unwrap_or_else(|| project_dirs.config_dir().to_path_buf());

        let config_file = override_config
            .filter(|p| p.is_file() || p.extension().is_some())
            .unwrap_or_else(|| config_dir.join("config.toml"));

        let data_dir = override_data.unwrap_or_else(|| project_dirs.data_dir().to_path_buf());
        let state_dir = project_dirs
            .state_dir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| data_dir.join("state"));

        Ok(Self::from_roots(config_dir, config_file, data_dir, state_dir))
    }

    /// Lays out every path beneath a single directory.
    pub fn rooted_at(root: &Path) -> Self {
        let config_dir = root.join("config");
        let config_file = config_dir.join("config.toml");
        Self::from_roots(config_dir, config_file, root.join("data"), root.join("state"))
    }

    fn from_roots(
        config_dir: PathBuf,
        config_file: PathBuf,
        data_dir: PathBuf,
        state_dir: PathBuf,
    ) -> Self {
        let notes_file = data_dir.join(NOTES_FILE_NAME);
        let log_dir = state_dir.join("logs");
        Self {
            config_dir,
            config_file,
            data_dir,
            notes_file,
            state_dir,
            log_dir,
        }
    }

    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [
            &self.config_dir,
            &self.data_dir,
            &self.state_dir,
            &self.log_dir,
        ] {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating application directory {}", dir.display()))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(deserialize_with = "lenient_theme")]
    pub theme: ThemeName,
    pub preview_lines: u16,
    pub toolbar: ToolbarOptions,
    pub window: WindowOptions,
    pub storage: StorageOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            theme: ThemeName::Canary,
            preview_lines: 5,
            toolbar: ToolbarOptions::default(),
            window: WindowOptions::default(),
            storage: StorageOptions::default(),
        }
    }
}

impl AppConfig {
    pub(crate) fn post_load(&mut self, paths: &ConfigPaths) -> Result<()> {
        self.storage
            .resolve(paths)
            .context("resolving storage paths")?;
        if self.preview_lines == 0 {
            tracing::warn!("preview_lines must be at least 1, using 1");
            self.preview_lines = 1;
        }
        self.window.normalize();
        Ok(())
    }

    pub fn preview_lines(&self) -> usize {
        usize::from(self.preview_lines)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolbarOptions {
    pub width: u16,
    pub title: String,
}

impl Default for ToolbarOptions {
    fn default() -> Self {
        Self {
            width: 32,
            title: "Sticky Notes".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowOptions {
    /// Cells from each border where a press starts a resize.
    pub resize_margin: i32,
    pub min_width: i32,
    pub min_height: i32,
    pub default_geometry: Geometry,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            resize_margin: 1,
            min_width: 20,
            min_height: 6,
            default_geometry: Geometry::default(),
        }
    }
}

impl WindowOptions {
    // Chrome needs border + title + body + footer + border.
    const FLOOR_WIDTH: i32 = 16;
    const FLOOR_HEIGHT: i32 = 5;

    fn normalize(&mut self) {
        if self.resize_margin < 1 {
            self.resize_margin = 1;
        }
        self.min_width = self.min_width.max(Self::FLOOR_WIDTH);
        self.min_height = self.min_height.max(Self::FLOOR_HEIGHT);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageOptions {
    #[serde(skip_serializing_if = "path_is_empty")]
    pub notes_file: PathBuf,
    /// Spaces per indentation level in the notes file.
    pub indent: usize,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            notes_file: PathBuf::new(),
            indent: 4,
        }
    }
}

impl StorageOptions {
    pub fn at(notes_file: impl Into<PathBuf>) -> Self {
        Self {
            notes_file: notes_file.into(),
            ..Self::default()
        }
    }

    fn resolve(&mut self, paths: &ConfigPaths) -> Result<()> {
        if self.notes_file.as_os_str().is_empty() {
            self.notes_file = paths.notes_file.clone();
        } else if self.notes_file.is_relative() {
            self.notes_file = paths.data_dir.join(&self.notes_file);
        }
        Ok(())
    }
}

fn path_is_empty(path: &Path) -> bool {
    path.as_os_str().is_empty()
}

#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ThemeName {
    #[default]
    Canary,
    Rose,
    Sky,
    Mint,
}

fn lenient_theme<'de, D>(deserializer: D) -> Result<ThemeName, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(ThemeRegistry::default().lookup(&raw).unwrap_or_else(|| {
        tracing::warn!(theme = %raw, "unknown theme in config, falling back to canary");
        ThemeName::Canary
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn first_run_writes_default_config() -> Result<()> {
        let temp = TempDir::new()?;
        let loader = ConfigLoader::with_paths(ConfigPaths::rooted_at(temp.path()));
        let cfg = loader.load_or_init()?;

        assert!(loader.paths().config_file.exists());
        assert_eq!(cfg.theme, ThemeName::Canary);
        assert_eq!(cfg.preview_lines, 5);
        assert_eq!(cfg.storage.notes_file, loader.paths().notes_file);
        assert_eq!(cfg.window.min_width, 20);
        assert_eq!(cfg.window.min_height, 6);
        Ok(())
    }

    #[test]
    fn partial_config_keeps_defaults_for_missing_sections() -> Result<()> {
        let temp = TempDir::new()?;
        let paths = ConfigPaths::rooted_at(temp.path());
        paths.ensure_directories()?;
        fs::write(
            &paths.config_file,
            "theme = \"sky\"\n\n[window]\nmin_width = 30\n\n[storage]\nnotes_file = \"mine.json\"\n",
        )?;
        let cfg = ConfigLoader::with_paths(paths.clone()).load()?;

        assert_eq!(cfg.theme, ThemeName::Sky);
        assert_eq!(cfg.window.min_width, 30);
        assert_eq!(cfg.window.min_height, 6);
        assert_eq!(cfg.toolbar.width, 32);
        assert_eq!(cfg.storage.notes_file, paths.data_dir.join("mine.json"));
        Ok(())
    }

    #[test]
    fn unknown_theme_falls_back_to_canary() -> Result<()> {
        let temp = TempDir::new()?;
        let paths = ConfigPaths::rooted_at(temp.path());
        paths.ensure_directories()?;
        fs::write(&paths.config_file, "theme = \"plaid\"\n")?;
        let cfg = ConfigLoader::with_paths(paths).load()?;
        assert_eq!(cfg.theme, ThemeName::Canary);
        Ok(())
    }

    #[test]
    fn undersized_window_limits_are_raised_to_chrome_floor() -> Result<()> {
        let temp = TempDir::new()?;
        let paths = ConfigPaths::rooted_at(temp.path());
        paths.ensure_directories()?;
        fs::write(
            &paths.config_file,
            "preview_lines = 0\n\n[window]\nresize_margin = 0\nmin_width = 2\nmin_height = 1\n",
        )?;
        let cfg = ConfigLoader::with_paths(paths).load()?;

        assert_eq!(cfg.preview_lines(), 1);
        assert_eq!(cfg.window.resize_margin, 1);
        assert_eq!(cfg.window.min_width, 16);
        assert_eq!(cfg.window.min_height, 5);
        Ok(())
    }
}
