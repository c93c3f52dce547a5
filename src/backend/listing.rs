//! Directory tree reconstruction
//!
//! The search index only knows files, so a directory listing is rebuilt from
//! the file names found under a path prefix.

use std::collections::BTreeMap;

use super::{DirEntry, EntryKind};

/// Build a depth-limited listing of `base` from the files found under it
///
/// `base` is the listed directory without trailing slash (empty for the
/// repository root). Entries are ordered depth-first with siblings sorted by
/// name; a directory is followed by its children. With `max_depth` 2 the
/// listing holds the direct children of `base` and their children.
pub fn build_entries<'a, I>(file_names: I, base: &str, max_depth: usize) -> Vec<DirEntry>
where
    I: IntoIterator<Item = &'a str>,
{
    let base = base.trim_matches('/');
    let mut tree: BTreeMap<Vec<&str>, EntryKind> = BTreeMap::new();

    for file_name in file_names {
        let relative = if base.is_empty() {
            Some(file_name)
        } else {
            file_name
                .strip_prefix(base)
                .and_then(|rest| rest.strip_prefix('/'))
        };
        let Some(relative) = relative else {
            continue;
        };

        let parts: Vec<&str> = relative.split('/').filter(|p| !p.is_empty()).collect();
        if parts.is_empty() {
            continue;
        }

        let file_depth = parts.len() - 1;
        for depth in 0..file_depth.min(max_depth) {
            tree.insert(parts[..=depth].to_vec(), EntryKind::Directory);
        }
        if file_depth < max_depth {
            tree.entry(parts).or_insert(EntryKind::File);
        }
    }

    tree.into_iter()
        .map(|(parts, kind)| DirEntry {
            path: parts.join("/"),
            kind,
            depth: parts.len() - 1,
        })
        .collect()
}
