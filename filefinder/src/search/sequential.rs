use std::path::PathBuf;
use tracing::debug;

use super::scanner::WordMatcher;
use crate::errors::{SearchError, SearchResult};
use crate::tree::FileTree;

/// Single-threaded depth-first search with the same matching rules and error
/// policy as [`find_files`](super::find_files), collecting every match before
/// returning. Serves as the baseline the concurrent engine is measured against.
pub fn find_files_sequential<T: FileTree>(tree: &T, word: &str) -> SearchResult<Vec<PathBuf>> {
    let matcher = WordMatcher::new(word);
    let entries = tree
        .read_dir()
        .map_err(|e| SearchError::io(tree.location(), e))?;

    let mut found = Vec::new();
    let mut stack = vec![(None, PathBuf::new(), entries)];
    while let Some((scope, dir, entries)) = stack.pop() {
        let scope: &T = match &scope {
            Some(sub) => sub,
            None => tree,
        };
        for entry in entries {
            let path = dir.join(&entry.name);
            if entry.is_dir {
                match scope.sub(&entry.name).and_then(|sub| {
                    let entries = sub.read_dir()?;
                    Ok((sub, entries))
                }) {
                    Ok((sub, entries)) => stack.push((Some(sub), path, entries)),
                    Err(e) => debug!("Skipping subtree {}: {}", path.display(), e),
                }
            } else {
                let matched = scope
                    .open(&entry.name)
                    .and_then(|file| matcher.matches_reader(file))
                    .unwrap_or(false);
                if matched {
                    found.push(path);
                }
            }
        }
    }
    Ok(found)
}
