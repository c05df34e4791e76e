use std::{collections::BTreeMap, fs, path::Path};

use tracing::debug;

use crate::context::{Context, PlatformPaths};
use crate::error::{ConfigError, ConfigResult};
use crate::paths::env_file_paths;

pub type EnvMap = BTreeMap<String, String>;

/// Build the environment map used for fragment interpolation.
///
/// Layers, in increasing precedence (later layers overwrite earlier keys):
/// context-derived built-ins, the user-scope env file, the project env file,
/// the project-local env file, then the inherited process environment.
/// Rebuilt from scratch on every resolution.
pub fn build_env_map(ctx: &Context, paths: &PlatformPaths) -> ConfigResult<EnvMap> {
    let mut env = EnvMap::new();

    env.insert("HOSTNAME".to_string(), ctx.hostname.clone());
    env.insert("USER".to_string(), ctx.username.clone());
    env.insert(
        "DENV_PROJECT_ROOT".to_string(),
        ctx.project_dir.to_string_lossy().to_string(),
    );
    env.insert("DENV_PROJECT_NAME".to_string(), ctx.project_name.clone());
    env.insert("DENV_ENVIRONMENT_ID".to_string(), ctx.environment_id());

    for path in env_file_paths(ctx, paths) {
        if path.exists() {
            merge_env_file(&mut env, &path)?;
            debug!(path = %path.display(), "loaded env file");
        } else {
            debug!(path = %path.display(), "env file not found, skipping");
        }
    }

    // Real process environment always wins.
    for (k, v) in std::env::vars() {
        env.insert(k, v);
    }

    Ok(env)
}

fn merge_env_file(env: &mut EnvMap, path: &Path) -> ConfigResult<()> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    for (k, v) in parse_env_text(&text, path)? {
        env.insert(k, v);
    }
    Ok(())
}

/// Parse `NAME=value` lines. Blank lines and `#` comments are skipped, an
/// `export ` prefix is tolerated, and simple surrounding quotes are stripped.
pub fn parse_env_text(text: &str, path: &Path) -> ConfigResult<EnvMap> {
    let mut out = EnvMap::new();

    for (idx, line) in text.lines().enumerate() {
        let mut s = line.trim();
        if s.is_empty() || s.starts_with('#') {
            continue;
        }

        if let Some(rest) = s.strip_prefix("export ") {
            s = rest.trim();
        }

        let Some((k, v)) = s.split_once('=') else {
            return Err(ConfigError::EnvFile {
                path: path.to_path_buf(),
                line: idx + 1,
                content: line.to_string(),
            });
        };

        let key = k.trim().to_string();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        if val.len() >= 2 {
            let bytes = val.as_bytes();
            let first = bytes[0];
            let last = bytes[bytes.len() - 1];
            if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
                val = val[1..val.len() - 1].to_string();
            }
        }

        out.insert(key, val);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(text: &str) -> EnvMap {
        parse_env_text(text, &PathBuf::from("test.env")).unwrap()
    }

    #[test]
    fn parses_simple_pairs() {
        let env = parse("FOO=bar\nBAZ=qux\n");
        assert_eq!(env.get("FOO").map(String::as_str), Some("bar"));
        assert_eq!(env.get("BAZ").map(String::as_str), Some("qux"));
    }

    #[test]
    fn skips_comments_and_blanks() {
        let env = parse("# comment\n\nFOO=bar\n");
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn strips_export_prefix_and_quotes() {
        let env = parse("export A=\"one two\"\nB='three'\n");
        assert_eq!(env.get("A").map(String::as_str), Some("one two"));
        assert_eq!(env.get("B").map(String::as_str), Some("three"));
    }

    #[test]
    fn later_line_wins() {
        let env = parse("FOO=first\nFOO=second\n");
        assert_eq!(env.get("FOO").map(String::as_str), Some("second"));
    }

    #[test]
    fn line_without_equals_is_an_error() {
        let err = parse_env_text("not-a-pair\n", &PathBuf::from("bad.env")).unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile { line: 1, .. }));
    }
}
