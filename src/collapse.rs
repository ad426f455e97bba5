//! Path collapsing for command labels.
//!
//! Reduces the file paths in a set of command tokens to a short form that
//! still tells them apart: the common directory prefix is stripped when one
//! exists, otherwise each path shrinks to `/.../<parent>/<file>`.
//!
//! Collapsing is a one-shot transform over a whole input set. Running it
//! again on a single already-collapsed path does not reproduce the same
//! output, because the common prefix depends on every path in the set.

use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

/// Marker inserted in place of the elided leading directories.
const ELLIPSIS: &str = "...";

/// Collapse every token that names an existing file.
///
/// Returns a map from each input token to its display form. Tokens that are
/// not existing files map to themselves.
pub fn collapse<'a, I>(tokens: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut collapsed = BTreeMap::new();
    let mut files: Vec<(String, String)> = Vec::new();

    for token in tokens {
        if Path::new(token).is_file() {
            let absolute = absolute_path(Path::new(token)).to_string_lossy().into_owned();
            tracing::debug!(file = %token, absolute = %absolute, "collapsing file token");
            files.push((token.clone(), absolute));
        } else {
            collapsed.insert(token.clone(), token.clone());
        }
    }

    if files.is_empty() {
        return collapsed;
    }

    let absolutes: Vec<&str> = files.iter().map(|(_, abs)| abs.as_str()).collect();
    let prefix = common_dir_prefix(&absolutes);
    tracing::debug!(prefix = %prefix, files = files.len(), "common path prefix");

    // the prefix ends at a separator, so it always fits inside every
    // directory part and never eats a file name
    let strip = files.len() > 1 && !is_trivial_prefix(prefix);
    let prefix_len = prefix.len();

    for (token, absolute) in files {
        let display = if strip {
            absolute[prefix_len..].to_string()
        } else {
            ellipsis_form(&absolute)
        };
        collapsed.insert(token, display);
    }

    collapsed
}

/// Collapse `tokens` and return the distinct display forms, sorted.
pub fn collapse_sorted<'a, I>(tokens: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut out: Vec<String> = collapse(tokens).into_values().collect();
    out.sort();
    out.dedup();
    out
}

/// Longest common prefix of `paths`, cut back to the last separator so it
/// never ends in the middle of a path component.
fn common_dir_prefix<'a>(paths: &[&'a str]) -> &'a str {
    let Some((first, rest)) = paths.split_first() else {
        return "";
    };

    let mut len = first.len();
    for other in rest {
        len = first
            .char_indices()
            .zip(other.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map(|((i, c), _)| i + c.len_utf8())
            .unwrap_or(0)
            .min(len);
    }

    let common = &first[..len];
    match common.rfind(MAIN_SEPARATOR) {
        Some(idx) => &common[..=idx],
        None => "",
    }
}

/// A prefix that carries no information: nothing at all, or just the root.
fn is_trivial_prefix(prefix: &str) -> bool {
    prefix.is_empty() || prefix.chars().all(|c| c == MAIN_SEPARATOR)
}

/// `/.../<parent>/<file>`, or `/.../<file>` for a file directly under the root.
fn ellipsis_form(path: &str) -> String {
    let path = Path::new(path);
    let base = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent = path
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned());

    let sep = MAIN_SEPARATOR;
    match parent {
        Some(parent) => format!("{sep}{ELLIPSIS}{sep}{parent}{sep}{base}"),
        None => format!("{sep}{ELLIPSIS}{sep}{base}"),
    }
}

/// Make `path` absolute against the current directory and fold `.`/`..`
/// lexically, without touching symlinks.
fn absolute_path(path: &Path) -> PathBuf {
    absolute_path_from(path, std::env::current_dir())
}

fn absolute_path_from(path: &Path, cwd: io::Result<PathBuf>) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match cwd {
            Ok(cwd) => cwd.join(path),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "cannot read current directory, leaving path relative"
                );
                path.to_path_buf()
            }
        }
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    /// Create the given relative files under a fresh temp dir and return
    /// their absolute paths as strings.
    fn setup_files(files: &[&str]) -> (TempDir, Vec<String>) {
        let tmp = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for rel in files {
            let full = tmp.path().join(rel);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(&full, "int main() {}").unwrap();
            paths.push(full.to_string_lossy().into_owned());
        }
        (tmp, paths)
    }

    #[test]
    fn non_files_pass_through() {
        let tokens = vec!["-O2".to_string(), "no/such/file.cpp".to_string()];
        let out = collapse(&tokens);
        assert_eq!(out["-O2"], "-O2");
        assert_eq!(out["no/such/file.cpp"], "no/such/file.cpp");
    }

    #[test]
    fn strips_common_directory_across_subdirs() {
        let (_tmp, paths) = setup_files(&["src/core/a.cpp", "src/io/b.cpp"]);
        let out = collapse(&paths);
        assert_eq!(out[&paths[0]], "core/a.cpp");
        assert_eq!(out[&paths[1]], "io/b.cpp");
    }

    #[test]
    fn siblings_collapse_to_file_names() {
        let (_tmp, paths) = setup_files(&["src/a.cpp", "src/b.cpp"]);
        let out = collapse(&paths);
        assert_eq!(out[&paths[0]], "a.cpp");
        assert_eq!(out[&paths[1]], "b.cpp");
    }

    #[test]
    fn prefix_never_splits_a_component() {
        let (_tmp, paths) = setup_files(&["lib_core/x.cpp", "lib_cxx/x.cpp"]);
        let out = collapse(&paths);
        assert_eq!(out[&paths[0]], "lib_core/x.cpp");
        assert_eq!(out[&paths[1]], "lib_cxx/x.cpp");
    }

    #[test]
    fn prefix_is_cut_back_to_a_directory() {
        // "src/a" is a character prefix of "src/ab/c.cpp" but not a directory of it
        let (_tmp, paths) = setup_files(&["src/a", "src/ab/c.cpp"]);
        let out = collapse(&paths);
        assert_eq!(out[&paths[0]], "a");
        assert_eq!(out[&paths[1]], "ab/c.cpp");
    }

    #[test]
    fn collapse_keeps_inputs_usable_after_the_call() {
        let (_tmp, paths) = setup_files(&["one/a.c", "two/b.c"]);
        let out = collapse(paths.iter());
        assert_eq!(out.len(), 2);
        assert!(paths.iter().all(|p| out.contains_key(p)));
        assert_eq!(collapse_sorted(&paths), vec!["one/a.c", "two/b.c"]);
    }

    #[test]
    fn single_file_uses_ellipsis_form() {
        let (_tmp, paths) = setup_files(&["deep/tree/src/main.cpp"]);
        let out = collapse(&paths);
        assert_eq!(out[&paths[0]], "/.../src/main.cpp");
    }

    #[test]
    fn mixed_tokens_keep_flags_and_collapse_files() {
        let (_tmp, mut tokens) = setup_files(&["a/one.c", "b/two.c"]);
        tokens.push("-Wall".to_string());
        let sorted = collapse_sorted(&tokens);
        assert_eq!(sorted, vec!["-Wall", "a/one.c", "b/two.c"]);
    }

    #[test]
    fn outputs_are_unique_suffixes_for_shared_directory() {
        let (_tmp, paths) = setup_files(&[
            "proj/src/a.cpp",
            "proj/src/b.cpp",
            "proj/src/nested/a.cpp",
            "proj/include/a.hpp",
        ]);
        let out = collapse(&paths);
        let displays: HashSet<&String> = out.values().collect();
        assert_eq!(displays.len(), paths.len());
        for path in &paths {
            assert!(path.ends_with(out[path].as_str()), "{} !~ {}", path, out[path]);
        }
    }

    #[test]
    fn rerun_on_collapsed_output_is_not_idempotent() {
        let (tmp, paths) = setup_files(&["src/core/a.cpp", "src/io/b.cpp"]);
        let first = collapse(&paths);
        let resolved = tmp.path().join("src").join(&first[&paths[0]]);
        let again = vec![resolved.to_string_lossy().into_owned()];
        let second = collapse(&again);
        assert_ne!(second[&again[0]], first[&paths[0]]);
        assert_eq!(second[&again[0]], "/.../core/a.cpp");
    }

    #[test]
    fn relative_tokens_resolve_against_cwd() {
        let (_tmp, paths) = setup_files(&["x/a.cpp", "y/b.cpp"]);
        let cwd = std::env::current_dir().unwrap();
        let rel = relative_to(&paths[0], &cwd);
        let tokens = vec![rel.clone(), paths[1].clone()];
        let out = collapse(&tokens);
        assert_eq!(out[&rel], "x/a.cpp");
        assert_eq!(out[&paths[1]], "y/b.cpp");
    }

    /// Spell an absolute path relative to `base` by walking up to the root.
    fn relative_to(path: &str, base: &Path) -> String {
        let depth = base.components().count().saturating_sub(1);
        format!("{}{}", "../".repeat(depth), path.trim_start_matches('/'))
    }

    #[test]
    fn common_dir_prefix_edges() {
        assert_eq!(common_dir_prefix(&[]), "");
        assert_eq!(common_dir_prefix(&["/a/b/c.cpp"]), "/a/b/");
        assert_eq!(common_dir_prefix(&["/a/b/c.cpp", "/x/d.cpp"]), "/");
        assert_eq!(common_dir_prefix(&["/a/bc/1", "/a/bd/2"]), "/a/");
        assert_eq!(common_dir_prefix(&["rel.c", "rem.c"]), "");
    }

    #[test]
    fn ellipsis_form_edges() {
        assert_eq!(ellipsis_form("/usr/src/x.c"), "/.../src/x.c");
        assert_eq!(ellipsis_form("/x.c"), "/.../x.c");
    }

    #[test]
    fn unreadable_cwd_leaves_relative_paths_relative() {
        let gone = Err(io::Error::new(io::ErrorKind::NotFound, "cwd removed"));
        assert_eq!(
            absolute_path_from(Path::new("src/./a.c"), gone),
            PathBuf::from("src/a.c")
        );
        let cwd = Ok(PathBuf::from("/work"));
        assert_eq!(
            absolute_path_from(Path::new("src/a.c"), cwd),
            PathBuf::from("/work/src/a.c")
        );
    }

    #[test]
    fn absolute_path_folds_dot_segments() {
        assert_eq!(
            absolute_path(Path::new("/a/b/../c/./d.c")),
            PathBuf::from("/a/c/d.c")
        );
    }
}
