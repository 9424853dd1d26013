use color_eyre::{
    Result as Res,
    eyre::{WrapErr, eyre},
};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::cmd::{ErrMode, ExecOptions, Superuser};

const APP_DIR: &str = "ef-fop";

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// directory used when `--path` is not given, falls back to the cwd
    pub default_path: Option<PathBuf>,
    pub exec: ExecConfig,
    pub log: LogConfig,
}

/// Options every command descriptor is built with
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ExecConfig {
    pub err: ErrMode,
    pub superuser: Superuser,
    /// argv prefix used to elevate, e.g. `["sudo", "-n"]`
    pub elevate_with: Vec<String>,
}

impl Default for ExecConfig {
    fn default() -> Self {
        let privileged = ExecOptions::privileged();
        Self {
            err: privileged.err,
            superuser: privileged.superuser,
            elevate_with: vec!["sudo".into(), "-n".into()],
        }
    }
}

impl ExecConfig {
    pub fn options(&self) -> ExecOptions {
        ExecOptions {
            err: self.err,
            superuser: self.superuser,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    pub dir: Option<PathBuf>,
    /// `EnvFilter` directive, e.g. `info` or `ef_fop=debug`
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: None,
            level: "info".into(),
        }
    }
}

impl LogConfig {
    pub fn dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| {
            BaseDirs::new()
                .map(|base| base.data_local_dir().join(APP_DIR).join("logs"))
                .unwrap_or_else(|| PathBuf::from("logs"))
        })
    }
}

impl Config {
    pub fn parse_from_str(str: &str) -> Res<Self> {
        toml::from_str(str).map_err(|e| e.into())
    }

    /// `<config_dir>/ef-fop/config.toml`
    pub fn default_file() -> Option<PathBuf> {
        BaseDirs::new().map(|base| base.config_dir().join(APP_DIR).join("config.toml"))
    }

    /// Reads `explicit` if given, otherwise the default file when it exists.
    pub fn load(explicit: Option<&Path>) -> Res<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::default_file() {
                Some(path) if path.is_file() => path,
                _ => return Ok(Self::default()),
            },
        };
        let content = std::fs::read_to_string(&path)
            .wrap_err_with(|| format!("failed to read config '{}'", path.display()))?;
        Self::parse_from_str(&content)
            .map_err(|e| eyre!("invalid config '{}': {e}", path.display()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_empty_config_is_privileged() {
        let config = Config::parse_from_str("").unwrap();
        assert_eq!(config.exec.options(), ExecOptions::privileged());
        assert_eq!(config.exec.elevate_with, vec!["sudo", "-n"]);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_config_parse() {
        let config_file = r#"
            default_path = "/srv"

            [exec]
            superuser = "none"
            elevate_with = ["doas"]

            [log]
            dir = "/var/log/ef"
            level = "debug"
        "#;
        let config = Config::parse_from_str(config_file).unwrap();
        assert_eq!(config.default_path, Some(PathBuf::from("/srv")));
        assert_eq!(config.exec.superuser, Superuser::None);
        assert_eq!(config.exec.err, ErrMode::Message);
        assert_eq!(config.exec.elevate_with, vec!["doas"]);
        assert_eq!(config.log.dir(), PathBuf::from("/var/log/ef"));
    }

    #[test]
    fn test_bad_mode_is_rejected() {
        assert!(Config::parse_from_str("[exec]\nsuperuser = \"always\"").is_err());
    }

    #[test]
    fn test_missing_explicit_file_errors() {
        assert!(Config::load(Some(Path::new("/nonexistent/ef-fop.toml"))).is_err());
    }
}
