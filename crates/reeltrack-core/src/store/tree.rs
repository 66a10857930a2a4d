use serde_json::{Map, Value};

use super::UpdateBatch;
use crate::error::StoreError;

const FORBIDDEN_CHARS: &[char] = &['.', '#', '$', '[', ']'];

/// Split a path into its segments. Outer slashes are ignored, so `""` and `"/"`
/// address the root.
pub(crate) fn split_path(path: &str) -> Result<Vec<String>, StoreError> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    trimmed
        .split('/')
        .map(|segment| {
            if segment.is_empty() {
                Err(invalid(path, "empty segment"))
            } else if segment.contains(FORBIDDEN_CHARS) {
                Err(invalid(path, "segment contains one of . # $ [ ]"))
            } else {
                Ok(segment.to_string())
            }
        })
        .collect()
}

fn invalid(path: &str, reason: &str) -> StoreError {
    StoreError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

/// Children of a node keyed the way paths address them. Arrays, which a
/// realtime-database export produces for small integer keys, are keyed by
/// index with their `null` holes dropped.
pub(crate) fn keyed_children(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        Value::Array(entries) => Some(
            entries
                .into_iter()
                .enumerate()
                .filter(|(_, entry)| !entry.is_null())
                .map(|(index, entry)| (index.to_string(), entry))
                .collect(),
        ),
        _ => None,
    }
}

pub(crate) fn get<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut node = root;
    for segment in segments {
        node = match node {
            Value::Object(map) => map.get(segment)?,
            Value::Array(entries) => entries.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    if is_empty(node) {
        None
    } else {
        Some(node)
    }
}

/// Validate a batch and resolve its paths, rejecting root writes and paths
/// that are ancestors of other paths in the same batch.
pub(crate) fn resolve_batch(batch: UpdateBatch) -> Result<Vec<(Vec<String>, Value)>, StoreError> {
    let mut resolved = Vec::with_capacity(batch.len());
    for (path, value) in batch {
        let segments = split_path(&path)?;
        if segments.is_empty() {
            return Err(invalid(&path, "cannot write the database root"));
        }
        resolved.push((segments, value));
    }

    // After sorting, any overlap shows up between neighbours
    resolved.sort_by(|a, b| a.0.cmp(&b.0));
    for pair in resolved.windows(2) {
        let (first, second) = (&pair[0].0, &pair[1].0);
        if second.starts_with(first) {
            return Err(StoreError::OverlappingPaths {
                ancestor: first.join("/"),
                descendant: second.join("/"),
            });
        }
    }

    Ok(resolved)
}

/// Apply already-resolved writes to `root`.
pub(crate) fn apply(root: &mut Value, writes: Vec<(Vec<String>, Value)>) {
    for (segments, value) in writes {
        let value = normalize(value);
        if value.is_null() {
            remove(root, &segments);
        } else {
            set(root, &segments, value);
        }
    }
}

fn set(node: &mut Value, segments: &[String], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *node = value;
        return;
    };
    coerce_array(node);
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        set(map.entry(first.clone()).or_insert(Value::Null), rest, value);
    }
}

fn remove(root: &mut Value, segments: &[String]) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let Some(Value::Object(map)) = get_mut(root, parents) else {
        return;
    };
    map.remove(last);

    // Drop parents left empty, deepest first
    for depth in (1..segments.len()).rev() {
        let (parent, child) = (&segments[..depth - 1], &segments[depth - 1]);
        if let Some(Value::Object(map)) = get_mut(root, parent) {
            if map.get(child).map(is_empty).unwrap_or(false) {
                map.remove(child);
            } else {
                break;
            }
        }
    }
}

fn get_mut<'a>(root: &'a mut Value, segments: &[String]) -> Option<&'a mut Value> {
    let mut node = root;
    for segment in segments {
        coerce_array(node);
        node = node.as_object_mut()?.get_mut(segment)?;
    }
    coerce_array(node);
    Some(node)
}

/// Writes below an array turn it into the equivalent index-keyed object.
fn coerce_array(node: &mut Value) {
    if node.is_array() {
        let entries = std::mem::take(node);
        *node = Value::Object(keyed_children(entries).unwrap_or_default());
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Strip nulls and empty objects out of a value before storing it.
fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let cleaned: Map<String, Value> = map
                .into_iter()
                .map(|(key, child)| (key, normalize(child)))
                .filter(|(_, child)| !is_empty(child))
                .collect();
            if cleaned.is_empty() {
                Value::Null
            } else {
                Value::Object(cleaned)
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn batch(entries: &[(&str, Value)]) -> UpdateBatch {
        entries
            .iter()
            .map(|(path, value)| (path.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("/users/u1/movies/").unwrap(), vec!["users", "u1", "movies"]);
        assert!(split_path("").unwrap().is_empty());
        assert!(split_path("/").unwrap().is_empty());
        assert!(split_path("users//movies").is_err());
        assert!(split_path("users/u.1").is_err());
        assert!(split_path("users/$id").is_err());
    }

    #[test]
    fn test_apply_creates_intermediate_nodes() {
        let mut root = json!({});
        let writes = resolve_batch(batch(&[("users/u1/movies/550/watched", json!(true))])).unwrap();
        apply(&mut root, writes);
        assert_eq!(root, json!({"users": {"u1": {"movies": {"550": {"watched": true}}}}}));
    }

    #[test]
    fn test_apply_replaces_leaf_with_object() {
        let mut root = json!({"users": "legacy"});
        let writes = resolve_batch(batch(&[("users/u1/name", json!("x"))])).unwrap();
        apply(&mut root, writes);
        assert_eq!(root, json!({"users": {"u1": {"name": "x"}}}));
    }

    #[test]
    fn test_delete_prunes_empty_parents() {
        let mut root = json!({
            "users": {
                "u1": {"movies": {"550": {"title": "Fight Club"}}},
                "u2": {"movies": {}}
            }
        });
        let writes = resolve_batch(batch(&[("users/u1/movies/550", Value::Null)])).unwrap();
        apply(&mut root, writes);
        assert_eq!(root, json!({"users": {"u2": {"movies": {}}}}));
        assert_eq!(get(&root, &split_path("users/u2/movies").unwrap()), None);
    }

    #[test]
    fn test_null_children_are_not_stored() {
        let mut root = json!({});
        let writes = resolve_batch(batch(&[("a", json!({"b": null, "c": {}, "d": 1}))])).unwrap();
        apply(&mut root, writes);
        assert_eq!(root, json!({"a": {"d": 1}}));
    }

    #[test]
    fn test_overlapping_paths_rejected() {
        let result = resolve_batch(batch(&[
            ("users/u1/movies/550", json!({"title": "x"})),
            ("users/u1/movies/550/watched", json!(true)),
        ]));
        assert!(matches!(result, Err(StoreError::OverlappingPaths { .. })));

        let siblings = resolve_batch(batch(&[
            ("users/u1/movies/550/watched", json!(true)),
            ("users/u1/movies/5500/watched", json!(true)),
        ]));
        assert!(siblings.is_ok());
    }

    #[test]
    fn test_equivalent_paths_overlap() {
        let result = resolve_batch(batch(&[("a/b", json!(1)), ("/a/b/", json!(2))]));
        assert!(matches!(result, Err(StoreError::OverlappingPaths { .. })));
    }

    #[test]
    fn test_arrays_are_index_keyed() {
        let mut root = json!({"movies": [null, {"title": "A"}, {"title": "B"}]});
        assert_eq!(get(&root, &split_path("movies/1/title").unwrap()), Some(&json!("A")));
        assert_eq!(get(&root, &split_path("movies/0").unwrap()), None);

        let writes = resolve_batch(batch(&[("movies/2/watched", json!(true))])).unwrap();
        apply(&mut root, writes);
        assert_eq!(
            root,
            json!({"movies": {"1": {"title": "A"}, "2": {"title": "B", "watched": true}}})
        );
    }

    #[test]
    fn test_delete_below_array() {
        let mut root = json!({"movies": [{"title": "A"}, {"title": "B"}]});
        let writes = resolve_batch(batch(&[("movies/0", Value::Null)])).unwrap();
        apply(&mut root, writes);
        assert_eq!(root, json!({"movies": {"1": {"title": "B"}}}));
    }

    #[test]
    fn test_root_write_rejected() {
        let result = resolve_batch(batch(&[("/", json!({"a": 1}))]));
        assert!(matches!(result, Err(StoreError::InvalidPath { .. })));
    }
}
