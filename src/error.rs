use std::path::PathBuf;

use thiserror::Error;
use toml::Value;

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Everything that can go wrong while resolving or persisting configuration.
///
/// Loading is strict: a reference to an undefined variable or a kind conflict
/// between fragments aborts the resolution instead of guessing.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {message}")]
    Schema { message: String },

    #[error("undefined variable `{name}` referenced in {path}")]
    UndefinedVariable { name: String, path: PathBuf },

    #[error(
        "conflicting value kinds for `{key}`: {} vs {}",
        .base.type_str(),
        .overlay.type_str()
    )]
    ConflictingTypes {
        key: String,
        base: Value,
        overlay: Value,
    },

    #[error("malformed line {line} in {path}: {content:?}")]
    EnvFile {
        path: PathBuf,
        line: usize,
        content: String,
    },

    #[error("io error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize configuration")]
    Serialize(#[from] toml::ser::Error),

    #[error("platform config directory could not be determined")]
    ConfigDirUnavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicting_types_names_the_key_and_kinds() {
        let err = ConfigError::ConflictingTypes {
            key: "hosts.all.bind_paths".to_string(),
            base: Value::Array(vec![]),
            overlay: Value::String("a:b".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("hosts.all.bind_paths"));
        assert!(msg.contains("array"));
        assert!(msg.contains("string"));
    }

    #[test]
    fn parse_error_names_the_file() {
        let source = "ssh_port = = 1024".parse::<toml::Table>().unwrap_err();
        let err = ConfigError::Parse {
            path: PathBuf::from("/work/widget/denvrc.toml"),
            source,
        };
        assert!(err.to_string().contains("denvrc.toml"));
    }

    #[test]
    fn serialize_errors_convert_via_from() {
        fn fails() -> ConfigResult<String> {
            // A bare string is not a valid top-level TOML document.
            Ok(toml::to_string(&"scalar")?)
        }
        assert!(matches!(fails(), Err(ConfigError::Serialize(_))));
    }
}
