use std::{path::Path, sync::OnceLock};

use regex::Regex;
use toml::{Table, Value};

use crate::env::EnvMap;
use crate::error::{ConfigError, ConfigResult};

fn var_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)").unwrap()
    })
}

/// Expand `${NAME}` / `$NAME` references in every string of a fragment tree.
///
/// Strings are substituted and then opportunistically reparsed into a richer
/// TOML value (integer, float, boolean, array) when the result reads as one;
/// table keys are substituted as plain strings, never reparsed. A reference
/// to a name absent from `env` is fatal. Pure function of its inputs.
pub fn expand_table(table: Table, env: &EnvMap, origin: &Path) -> ConfigResult<Table> {
    let mut out = Table::new();
    for (key, value) in table {
        out.insert(expand_str(&key, env, origin)?, expand_value(value, env, origin)?);
    }
    Ok(out)
}

pub fn expand_value(value: Value, env: &EnvMap, origin: &Path) -> ConfigResult<Value> {
    match value {
        Value::String(s) => Ok(reparse_scalar(expand_str(&s, env, origin)?)),
        Value::Table(t) => Ok(Value::Table(expand_table(t, env, origin)?)),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(expand_value(item, env, origin)?);
            }
            Ok(Value::Array(out))
        }
        other => Ok(other),
    }
}

fn expand_str(input: &str, env: &EnvMap, origin: &Path) -> ConfigResult<String> {
    // Fast path
    if !input.contains('$') {
        return Ok(input.to_string());
    }

    let re = var_regex();
    let mut out = String::with_capacity(input.len());
    let mut last = 0;

    for caps in re.captures_iter(input) {
        let m = caps.get(0).unwrap();
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|g| g.as_str())
            .unwrap_or_default();

        let val = env.get(name).ok_or_else(|| ConfigError::UndefinedVariable {
            name: name.to_string(),
            path: origin.to_path_buf(),
        })?;

        out.push_str(&input[last..m.start()]);
        out.push_str(val);
        last = m.end();
    }

    out.push_str(&input[last..]);
    Ok(out)
}

/// Try to reinterpret an expanded string as a native TOML value.
///
/// `"1024"` becomes an integer so that `ssh_port = "$DENV_PORT"` validates;
/// anything that does not parse stays a string.
fn reparse_scalar(s: String) -> Value {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Value::String(s);
    }

    // A bare word can only reparse as itself; skip the roundtrip unless the
    // text can begin a non-string TOML value.
    let first = trimmed.as_bytes()[0];
    let candidate = matches!(first, b'[' | b'{' | b'-' | b'+' | b'"' | b'\'')
        || first.is_ascii_digit()
        || trimmed == "true"
        || trimmed == "false"
        || trimmed.starts_with("inf")
        || trimmed.starts_with("nan");
    if !candidate {
        return Value::String(s);
    }

    match format!("v = {trimmed}").parse::<Table>() {
        Ok(mut table) => table.remove("v").unwrap_or(Value::String(s)),
        Err(_) => Value::String(s),
    }
}
