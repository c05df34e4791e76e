use std::{collections::BTreeMap, path::PathBuf};

use serde::{Deserialize, Serialize};
use toml::{Table, Value};

use crate::error::{ConfigError, ConfigResult};

/// Fully resolved configuration.
///
/// Validation happens once, on the merged raw tree: `from_table` applies the
/// schema defaults for anything the fragments left unset and rejects values
/// that cannot convert to the declared field type. Unknown top-level keys are
/// ignored for forward compatibility. Defaults are constructed fresh per
/// call, never shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub workdir_from_host: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_port: Option<u16>,

    /// Shell command template; `{image_name}` is replaced at build time.
    pub image_build_command: String,

    pub environment: BTreeMap<String, String>,

    #[serde(rename = "sh_cmd")]
    pub shell_command: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fake_home: Option<FakeHome>,

    pub run_extra_args: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_command: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_command: Option<String>,

    /// `source:target` bind mounts.
    pub bind_paths: Vec<String>,

    /// Consumed by the loader while following fragments; carries no meaning
    /// after resolution.
    pub extra_config_paths: Vec<PathBuf>,

    /// When set, `init` maintains the local override file instead of the
    /// project file.
    pub use_local_config: bool,

    pub hosts: BTreeMap<String, HostParams>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workdir_from_host: true,
            ssh_port: None,
            image_build_command: "docker build . -t {image_name}".to_string(),
            environment: BTreeMap::new(),
            shell_command: "bash".to_string(),
            fake_home: Some(FakeHome::default()),
            run_extra_args: Vec::new(),
            before_command: None,
            after_command: None,
            bind_paths: Vec::new(),
            extra_config_paths: Vec::new(),
            use_local_config: false,
            hosts: BTreeMap::new(),
        }
    }
}

/// Detached home directory mounted into the container in place of the real
/// one, with selected real paths passed through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FakeHome {
    pub root: PathBuf,
    pub real_paths: Vec<String>,
}

impl Default for FakeHome {
    fn default() -> Self {
        Self {
            root: PathBuf::from(".denv/home"),
            real_paths: Vec::new(),
        }
    }
}

/// Per-host parameter bucket (see the host overlay).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostParams {
    pub bind_paths: Vec<String>,
}

impl Config {
    /// Normalize a merged raw tree into a typed configuration.
    pub fn from_table(table: Table) -> ConfigResult<Self> {
        Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Schema {
                message: e.to_string(),
            })
    }

    /// Project the configuration back into a raw tree.
    pub fn to_table(&self) -> ConfigResult<Table> {
        match Value::try_from(self)? {
            Value::Table(t) => Ok(t),
            other => Err(ConfigError::Schema {
                message: format!("configuration serialized to {}, expected table", other.type_str()),
            }),
        }
    }

    /// Like `to_table`, but keeping only fields that differ from the schema
    /// default. This is the "fields explicitly set" projection used when a
    /// sparse override is layered over a full base.
    pub fn to_sparse_table(&self) -> ConfigResult<Table> {
        let full = self.to_table()?;
        let defaults = Self::default().to_table()?;

        let mut out = Table::new();
        for (key, value) in full {
            if defaults.get(&key) != Some(&value) {
                out.insert(key, value);
            }
        }
        Ok(out)
    }

    /// Does this configuration set anything beyond the defaults?
    pub fn is_nontrivial(&self) -> ConfigResult<bool> {
        Ok(!self.to_sparse_table()?.is_empty())
    }
}
