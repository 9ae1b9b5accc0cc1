//! Utilities for path collection, PDF object helpers, etc.

use crate::{Result, error::PageCatError};
use lopdf::{Document, Object, ObjectId};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Keys never followed when importing a page's object graph.
///
/// `Parent` leads back up to the source page tree and `P` from annotations
/// points at the owning page; following either would drag whole sibling
/// pages into the output.
const SKIPPED_KEYS: &[&[u8]] = &[b"Parent", b"P"];

/// Depth limit when walking up a page tree.
const MAX_TREE_DEPTH: usize = 64;

/// Expand multiple glob patterns into filesystem paths.
///
/// Accepts anything iterable with items that convert to `&str`, e.g.:
/// `&[&str]`, `Vec<String>`, or `Vec<&str>`.
///
/// Patterns are expanded in the order given. An argument without glob
/// metacharacters is passed through unchanged even if it does not exist,
/// so the caller can report it as missing.
///
/// Errors:
/// - Propagates `glob` parse errors.
/// - Propagates filesystem errors from glob iterator.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns.into_iter() {
        let pattern = pattern.as_ref();
        if is_glob_pattern(pattern) {
            resolved_paths.extend(collect_paths_for_pattern(pattern)?);
        } else {
            resolved_paths.push(PathBuf::from(pattern));
        }
    }

    Ok(resolved_paths)
}

/// Check if a string contains glob metacharacters.
pub fn is_glob_pattern(s: &str) -> bool {
    s.chars().any(|c| matches!(c, '*' | '?' | '['))
}

/// Expand a single glob pattern into filesystem paths.
///
/// Pattern examples:
/// - `"**/*.pdf"`
/// - `"./docs/*.pdf"`
fn collect_paths_for_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut resolved_paths = Vec::new();

    let paths = glob::glob(pattern).map_err(|err| PageCatError::Other {
        message: format!("Invalid pattern '{pattern}': {err}"),
    })?;

    for entry in paths {
        let path = entry.map_err(|err| PageCatError::Other {
            message: err.to_string(),
        })?;
        if path.is_file() {
            resolved_paths.push(path);
        }
    }

    Ok(resolved_paths)
}

/// Follow `obj` if it is a reference, otherwise return it unchanged.
///
/// Dangling references resolve to themselves.
pub fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Read a PDF number (integer or real) as `f32`.
pub fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

/// Look up a page attribute, walking up the page tree if the page does not
/// carry it itself.
///
/// Returns a clone of the first value found. References are returned as-is.
pub fn find_inherited(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = page_id;
    let mut visited = BTreeSet::new();

    for _ in 0..MAX_TREE_DEPTH {
        if !visited.insert(current) {
            return None;
        }
        let dict = doc.get_dictionary(current).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value.clone());
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
    }

    None
}

/// Copy every object reachable from `obj` from `source` into `target`.
///
/// Object ids are kept, so `source` must already have been renumbered into
/// a range that does not collide with `target`. `Parent` and `P` entries are
/// not followed, and neither are references to page objects, so a link
/// destination never drags another page into the output. Returns the number
/// of objects copied.
pub fn import_references(target: &mut Document, source: &Document, obj: &Object) -> usize {
    let mut copied = 0;
    let mut pending: Vec<&Object> = vec![obj];

    while let Some(current) = pending.pop() {
        match current {
            Object::Reference(ref_id) => {
                if !target.objects.contains_key(ref_id)
                    && let Ok(referenced) = source.get_object(*ref_id)
                    && !is_page(referenced)
                {
                    target.objects.insert(*ref_id, referenced.clone());
                    copied += 1;
                    pending.push(referenced);
                }
            }
            Object::Dictionary(dict) => {
                for (key, value) in dict.iter() {
                    if !SKIPPED_KEYS.contains(&key.as_slice()) {
                        pending.push(value);
                    }
                }
            }
            Object::Stream(stream) => {
                for (key, value) in stream.dict.iter() {
                    if !SKIPPED_KEYS.contains(&key.as_slice()) {
                        pending.push(value);
                    }
                }
            }
            Object::Array(items) => pending.extend(items.iter()),
            _ => {}
        }
    }

    copied
}

fn is_page(obj: &Object) -> bool {
    obj.as_dict()
        .and_then(|dict| dict.get(b"Type"))
        .and_then(Object::as_name)
        .is_ok_and(|name| name == b"Page")
}

/// Format file size in human-readable format.
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} bytes")
    }
}
