use std::{
    path::{Path, PathBuf},
    process::Command,
};

use crate::error::{ConfigError, ConfigResult};

/// Immutable identity bundle for one invocation: which project we are in and
/// who/where we are running. Everything derived from it (`image_name`,
/// `environment_id`) is a pure function of these four fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub project_name: String,
    pub project_dir: PathBuf,
    pub hostname: String,
    pub username: String,
}

impl Context {
    /// Build a context for an explicit project directory.
    ///
    /// The project name is the lowercased directory basename.
    pub fn for_path(path: &Path) -> ConfigResult<Self> {
        let path = path.canonicalize().map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let project_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "root".to_string());

        Ok(Self {
            project_name,
            project_dir: path,
            hostname: detect_hostname().unwrap_or_else(|| "unknown".to_string()),
            username: detect_username().unwrap_or_else(|| "unknown".to_string()),
        })
    }

    pub fn for_cwd() -> ConfigResult<Self> {
        let cwd = std::env::current_dir().map_err(|e| ConfigError::Io {
            path: PathBuf::from("."),
            source: e,
        })?;
        Self::for_path(&cwd)
    }

    /// Container image tag for this project/user pair.
    pub fn image_name(&self) -> String {
        format!("{}-{}", self.project_name, self.username)
    }

    /// Stable identifier for this project on this machine.
    pub fn environment_id(&self) -> String {
        format!("{}__{}", self.project_name, self.hostname)
    }
}

/// Platform-specific directories, discovered once at process start and passed
/// around explicitly so the resolver stays testable with fabricated paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformPaths {
    pub config_dir: PathBuf,
    pub cache_dir: PathBuf,
}

impl PlatformPaths {
    pub fn discover() -> ConfigResult<Self> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::ConfigDirUnavailable)?
            .join("denv");
        let cache_dir = dirs::cache_dir()
            .ok_or(ConfigError::ConfigDirUnavailable)?
            .join("denv");

        Ok(Self {
            config_dir,
            cache_dir,
        })
    }
}

// -------------------- helpers --------------------

fn detect_hostname() -> Option<String> {
    for key in ["HOSTNAME", "COMPUTERNAME"] {
        if let Ok(h) = std::env::var(key) {
            let h = h.trim();
            if !h.is_empty() {
                return Some(short_hostname(h));
            }
        }
    }

    try_hostname_cmd(&["-s"])
        .or_else(|| try_hostname_cmd(&[]))
        .map(|h| short_hostname(&h))
}

fn try_hostname_cmd(args: &[&str]) -> Option<String> {
    let out = Command::new("hostname").args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let s = String::from_utf8_lossy(&out.stdout).trim().to_string();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn short_hostname(h: &str) -> String {
    h.split('.').next().unwrap_or(h).to_string()
}

fn detect_username() -> Option<String> {
    for key in ["USER", "USERNAME", "LOGNAME"] {
        if let Ok(u) = std::env::var(key) {
            let u = u.trim();
            if !u.is_empty() {
                return Some(u.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> Context {
        Context {
            project_name: "widget".to_string(),
            project_dir: PathBuf::from("/work/widget"),
            hostname: "box1".to_string(),
            username: "dev".to_string(),
        }
    }

    #[test]
    fn image_name_combines_project_and_user() {
        assert_eq!(context().image_name(), "widget-dev");
    }

    #[test]
    fn environment_id_combines_project_and_host() {
        assert_eq!(context().environment_id(), "widget__box1");
    }

    #[test]
    fn short_hostname_drops_domain() {
        assert_eq!(short_hostname("box1.example.com"), "box1");
        assert_eq!(short_hostname("box1"), "box1");
    }
}
