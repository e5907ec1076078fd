//! Path normalization utilities.
//!
//! Provides consistent path handling across the codebase:
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `resolve_path` - resolve relative paths against the config directory
//! - `to_slash` / `relative_slash` - `/`-separated strings used for pattern
//!   matching and as keys in the generated index, on every platform

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Resolve a configured path (may start with `~`) against a base directory.
///
/// Always returns an absolute path when `base` is absolute.
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    let expanded = PathBuf::from(expanded);
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

/// Join the normal components of a path with `/`.
///
/// `.` components are dropped; the empty path becomes `"."`.
pub fn to_slash(path: &Path) -> String {
    let parts: Vec<_> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            Component::ParentDir => Some("..".into()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// `path` relative to `base` as a `/`-separated string.
///
/// Returns `None` if `path` is not inside `base`.
pub fn relative_slash(path: &Path, base: &Path) -> Option<String> {
    path.strip_prefix(base).ok().map(to_slash)
}

/// Split `dir/name.ext` into (`dir/name`, `ext`).
///
/// Only the last extension is split off: `a.test.md` -> (`a.test`, `md`).
pub fn split_extension(file: &str) -> (&str, &str) {
    let name_start = file.rfind('/').map_or(0, |i| i + 1);
    match file[name_start..].rfind('.') {
        Some(dot) if dot > 0 => {
            let dot = name_start + dot;
            (&file[..dot], &file[dot + 1..])
        }
        _ => (file, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_resolve_path_absolute() {
        let resolved = resolve_path(Path::new("/absolute/path"), Path::new("/base"));
        assert_eq!(resolved, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_resolve_path_relative() {
        let resolved = resolve_path(Path::new("schemas/docs.json"), Path::new("/site"));
        assert_eq!(resolved, PathBuf::from("/site/schemas/docs.json"));
    }

    #[test]
    fn test_to_slash() {
        assert_eq!(to_slash(Path::new("guide/setup.md")), "guide/setup.md");
        assert_eq!(to_slash(Path::new("./intro.mdx")), "intro.mdx");
        assert_eq!(to_slash(Path::new("")), ".");
    }

    #[test]
    fn test_relative_slash() {
        let base = Path::new("/site");
        assert_eq!(
            relative_slash(Path::new("/site/pages/guide/setup.md"), base),
            Some("pages/guide/setup.md".to_string())
        );
        assert_eq!(relative_slash(Path::new("/other/file.md"), base), None);
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("guide/setup.md"), ("guide/setup", "md"));
        assert_eq!(split_extension("a.test.mdx"), ("a.test", "mdx"));
        assert_eq!(split_extension("dir.v2/readme"), ("dir.v2/readme", ""));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
    }
}
