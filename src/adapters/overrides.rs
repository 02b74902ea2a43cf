//! Path-addressed override values
//!
//! Paths use dot notation with numeric segments for array indexes
//! (`users.0.address.city`). Bracket indexes (`users[0].name`) are accepted on
//! input and normalised to the dot form.

use indexmap::IndexMap;
use serde_json::{Map, Value};

pub const PATH_SEPARATOR: char = '.';

/// Append a segment to an override path; the root path is empty.
pub fn join_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}{}{}", parent, PATH_SEPARATOR, segment)
    }
}

/// Rewrite `a[0].b[1]` as `a.0.b.1`. Wildcards (`[*]`) are left alone.
pub fn normalize_path(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut chars = path.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '[' {
            result.push(ch);
            continue;
        }

        let mut index = String::new();
        let mut closed = false;
        while let Some(&c) = chars.peek() {
            chars.next();
            if c == ']' {
                closed = true;
                break;
            }
            index.push(c);
        }

        if closed && !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()) {
            if !result.is_empty() {
                result.push(PATH_SEPARATOR);
            }
            result.push_str(&index);
        } else {
            result.push('[');
            result.push_str(&index);
            if closed {
                result.push(']');
            }
        }
    }

    result
}

fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit())
}

fn empty_container(as_array: bool) -> Value {
    if as_array {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

/// Deep-set `value` at `path`, creating intermediate containers.
///
/// A missing segment becomes an array when the segment after it is numeric and
/// an object otherwise. Returns `false` without touching anything further when
/// a scalar sits in the way.
pub fn set_by_path(root: &mut Value, path: &str, value: Value) -> bool {
    if path.is_empty() {
        return false;
    }

    let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
    let (last, parents) = match segments.split_last() {
        Some(split) => split,
        None => return false,
    };

    let mut current = root;
    for (i, seg) in parents.iter().enumerate() {
        let next_is_index = is_index(segments[i + 1]);
        current = match current {
            Value::Object(map) => map
                .entry(seg.to_string())
                .or_insert_with(|| empty_container(next_is_index)),
            Value::Array(items) => {
                let Ok(idx) = seg.parse::<usize>() else {
                    return false;
                };
                if idx >= items.len() {
                    items.resize(idx + 1, Value::Null);
                    items[idx] = empty_container(next_is_index);
                }
                &mut items[idx]
            }
            _ => return false,
        };
    }

    match current {
        Value::Object(map) => {
            map.insert(last.to_string(), value);
            true
        }
        Value::Array(items) => {
            let Ok(idx) = last.parse::<usize>() else {
                return false;
            };
            if idx >= items.len() {
                items.resize(idx + 1, Value::Null);
            }
            items[idx] = value;
            true
        }
        _ => false,
    }
}

/// Read the value at `path`, if every segment exists.
pub fn get_by_path<'v>(root: &'v Value, path: &str) -> Option<&'v Value> {
    if path.is_empty() {
        return Some(root);
    }
    path.split(PATH_SEPARATOR).try_fold(root, |current, seg| match current {
        Value::Object(map) => map.get(seg),
        Value::Array(items) => seg.parse::<usize>().ok().and_then(|idx| items.get(idx)),
        _ => None,
    })
}

/// Flat override map keyed by normalised path.
#[derive(Debug, Clone, Default)]
pub struct OverrideStore {
    entries: IndexMap<String, Value>,
}

impl OverrideStore {
    pub fn new(overrides: &IndexMap<String, Value>) -> Self {
        let entries = overrides
            .iter()
            .map(|(path, value)| (normalize_path(path), value.clone()))
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact match for a non-empty path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return None;
        }
        self.entries.get(path)
    }

    /// Whether an override targets `path` itself or anything beneath it.
    pub fn has_at_or_below(&self, path: &str) -> bool {
        self.entries.keys().any(|key| {
            key == path
                || (key.len() > path.len()
                    && key.starts_with(path)
                    && key[path.len()..].starts_with(PATH_SEPARATOR))
        })
    }

    /// Overrides exactly one segment below `prefix`, as (segment, value).
    pub fn direct_children<'s>(&'s self, prefix: &'s str) -> impl Iterator<Item = (&'s str, &'s Value)> + 's {
        self.entries.iter().filter_map(move |(key, value)| {
            let rest = if prefix.is_empty() {
                key.as_str()
            } else {
                key.strip_prefix(prefix)?.strip_prefix(PATH_SEPARATOR)?
            };
            if rest.is_empty() || rest.contains(PATH_SEPARATOR) {
                None
            } else {
                Some((rest, value))
            }
        })
    }

    /// Deep-set every override into `root`.
    pub fn apply_to(&self, root: &mut Value) {
        for (path, value) in &self.entries {
            if !set_by_path(root, path, value.clone()) {
                tracing::debug!("Override '{}' skipped: a scalar value blocks the path", path);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }
}
