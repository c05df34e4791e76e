//! Deep merge of raw fragment trees.
//!
//! Merge semantics, per key present in the overlay:
//! - Base value absent or vacant: overlay wins verbatim
//! - Both tables: deep-merge by key (recursive)
//! - Both arrays: UNION (base order, then unseen overlay elements)
//! - Both scalars of one kind: overlay wins
//! - Different kinds: fatal `ConflictingTypes`

use toml::{Table, Value};

use crate::error::{ConfigError, ConfigResult};

/// Fold `overlay` into `base`.
pub fn merge_tables(base: &mut Table, overlay: Table) -> ConfigResult<()> {
    merge_into(base, overlay, "")
}

fn merge_into(base: &mut Table, overlay: Table, prefix: &str) -> ConfigResult<()> {
    for (key, over) in overlay {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match base.get_mut(&key) {
            None => {
                base.insert(key, over);
            }
            Some(slot) if is_vacant(slot) => {
                *slot = over;
            }
            Some(slot) => match (slot, over) {
                (Value::Table(b), Value::Table(o)) => merge_into(b, o, &path)?,
                (Value::Array(b), Value::Array(o)) => {
                    for item in o {
                        if !b.contains(&item) {
                            b.push(item);
                        }
                    }
                }
                (slot, over) if same_kind(slot, &over) => {
                    *slot = over;
                }
                (slot, over) => {
                    return Err(ConfigError::ConflictingTypes {
                        key: path,
                        base: slot.clone(),
                        overlay: over,
                    });
                }
            },
        }
    }
    Ok(())
}

/// A vacant base value never defends its slot: `false`, `0`, `""`, and empty
/// collections are treated as "not really set".
fn is_vacant(v: &Value) -> bool {
    match v {
        Value::Boolean(b) => !*b,
        Value::Integer(i) => *i == 0,
        Value::Float(f) => *f == 0.0,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Table(t) => t.is_empty(),
        Value::Datetime(_) => false,
    }
}

fn same_kind(a: &Value, b: &Value) -> bool {
    // Integers and floats count as one numeric kind.
    if (a.is_integer() || a.is_float()) && (b.is_integer() || b.is_float()) {
        return true;
    }
    std::mem::discriminant(a) == std::mem::discriminant(b)
}
