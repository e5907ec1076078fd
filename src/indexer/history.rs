//! Git history lookup.
//!
//! Finds the newest commit reachable from `HEAD` that changed a file: the
//! first commit, walking back, whose tree entry for the path differs from the
//! entry in every parent (or that has no parent). Dates are author dates.
//!
//! Every failure here is recoverable. Entries without history keep their
//! filesystem timestamps.

use crate::collection::{LatestChanges, UpdatedBy};
use crate::utils::date::DateTimeUtc;
use crate::utils::path::{normalize_path, relative_slash};
use gix::ObjectId;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("no git repository above `{}`", .0.display())]
    NoRepository(PathBuf),

    #[error("`{0}` has no committed history")]
    Untracked(String),

    #[error("git error")]
    Git(#[source] Box<dyn std::error::Error + Send + Sync>),
}

fn git<E: std::error::Error + Send + Sync + 'static>(error: E) -> HistoryError {
    HistoryError::Git(Box::new(error))
}

/// Nearest ancestor of `start` (inclusive) containing `.git`.
pub fn find_repository_root(start: &Path) -> Result<PathBuf, HistoryError> {
    let start = normalize_path(start);
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
        .ok_or_else(|| HistoryError::NoRepository(start.clone()))
}

/// An open repository.
pub struct History {
    repo: gix::Repository,
    root: PathBuf,
}

impl History {
    /// Open the repository enclosing `base`.
    pub fn discover(base: &Path) -> Result<Self, HistoryError> {
        let root = find_repository_root(base)?;
        let repo = gix::open(&root).map_err(git)?;
        Ok(Self { repo, root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The newest commit that changed `file`.
    ///
    /// Follows git's default history simplification: at a merge whose
    /// version of the file matches one of its parents, the walk continues
    /// down that parent.
    pub fn latest(&self, file: &Path) -> Result<LatestChanges, HistoryError> {
        let path = relative_slash(&normalize_path(file), &self.root)
            .ok_or_else(|| HistoryError::Untracked(file.display().to_string()))?;
        let untracked = || HistoryError::Untracked(path.clone());

        let head = self.repo.head().map_err(git)?;
        if head.is_unborn() {
            return Err(untracked());
        }
        let mut current = self.repo.head_id().map_err(git)?.detach();
        let Some(entry) = self.entry_at(current, &path)? else {
            return Err(untracked());
        };

        loop {
            let parents: Vec<ObjectId> = self
                .repo
                .find_commit(current)
                .map_err(git)?
                .parent_ids()
                .map(|id| id.detach())
                .collect();

            let mut same = None;
            for parent in parents {
                if self.entry_at(parent, &path)? == Some(entry) {
                    same = Some(parent);
                    break;
                }
            }
            match same {
                Some(parent) => current = parent,
                None => return self.describe(current),
            }
        }
    }

    /// Object id of `path` in the tree of `commit`.
    fn entry_at(&self, commit: ObjectId, path: &str) -> Result<Option<ObjectId>, HistoryError> {
        let commit = self.repo.find_commit(commit).map_err(git)?;
        let mut tree = commit.tree().map_err(git)?;
        let entry = tree.peel_to_entry_by_path(path).map_err(git)?;
        Ok(entry.map(|e| e.object_id()))
    }

    fn describe(&self, id: ObjectId) -> Result<LatestChanges, HistoryError> {
        let commit = self.repo.find_commit(id).map_err(git)?;
        let author = commit.author().map_err(git)?;
        let time = author.time().map_err(git)?;
        let message = commit.message().map_err(git)?;

        Ok(LatestChanges {
            updated_at: DateTimeUtc::from_unix_seconds(time.seconds),
            updated_by: UpdatedBy {
                name: author.name.to_string(),
                email: author.email.to_string(),
            },
            update_message: message.summary().to_string(),
            update_commit: id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::process::Command;
    use tempfile::TempDir;

    /// Run git with a fixed identity and date; `None` if git is unavailable.
    fn git_cmd(dir: &Path, args: &[&str]) -> Option<()> {
        git_cmd_at(dir, "2024-06-15T14:30:45Z", args)
    }

    fn git_cmd_at(dir: &Path, date: &str, args: &[&str]) -> Option<()> {
        let git = which::which("git").ok()?;
        let status = Command::new(git)
            .args(["-c", "user.name=Ada", "-c", "user.email=ada@example.com"])
            .args(["-c", "commit.gpgsign=false", "-c", "init.defaultBranch=main"])
            .args(args)
            .current_dir(dir)
            .env("GIT_AUTHOR_DATE", date)
            .env("GIT_COMMITTER_DATE", date)
            .status()
            .ok()?;
        status.success().then_some(())
    }

    #[test]
    fn test_no_repository() {
        let dir = TempDir::new().unwrap();
        // A temp dir inside a checkout finds the enclosing repository
        match find_repository_root(dir.path()) {
            Ok(root) => assert!(normalize_path(dir.path()).starts_with(root)),
            Err(err) => assert!(matches!(err, HistoryError::NoRepository(_))),
        }
    }

    #[test]
    fn test_find_root_from_subdirectory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::create_dir_all(dir.path().join("pages/guide")).unwrap();
        let root = find_repository_root(&dir.path().join("pages/guide")).unwrap();
        assert_eq!(root, normalize_path(dir.path()));
    }

    #[test]
    fn test_find_root_from_deep_subdirectory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        let deep = (0..80).fold(dir.path().to_path_buf(), |path, _| path.join("d"));
        fs::create_dir_all(&deep).unwrap();
        let root = find_repository_root(&deep).unwrap();
        assert_eq!(root, normalize_path(dir.path()));
    }

    #[test]
    fn test_latest_commit_and_untracked() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        if git_cmd(root, &["init", "-q"]).is_none() {
            return;
        }
        fs::create_dir_all(root.join("pages")).unwrap();
        fs::write(root.join("pages/intro.md"), "---\ntitle: Intro\n---\n").unwrap();
        fs::write(root.join("pages/other.md"), "---\ntitle: Other\n---\n").unwrap();
        git_cmd(root, &["add", "pages/intro.md", "pages/other.md"]).unwrap();
        git_cmd(root, &["commit", "-q", "-m", "Add intro\n\nLonger body"]).unwrap();

        fs::write(root.join("pages/other.md"), "---\ntitle: Other v2\n---\n").unwrap();
        git_cmd(root, &["commit", "-q", "-am", "Update other"]).unwrap();

        fs::write(root.join("pages/draft.md"), "---\ntitle: Draft\n---\n").unwrap();

        let history = History::discover(&root.join("pages")).unwrap();

        let intro = history.latest(&root.join("pages/intro.md")).unwrap();
        assert_eq!(intro.update_message, "Add intro");
        assert_eq!(intro.updated_by.name, "Ada");
        assert_eq!(intro.updated_by.email, "ada@example.com");
        assert_eq!(intro.updated_at.to_iso_string(), "2024-06-15T14:30:45.000Z");
        assert_eq!(intro.update_commit.len(), 40);

        let other = history.latest(&root.join("pages/other.md")).unwrap();
        assert_eq!(other.update_message, "Update other");
        assert_ne!(other.update_commit, intro.update_commit);

        let draft = history.latest(&root.join("pages/draft.md")).unwrap_err();
        assert!(matches!(draft, HistoryError::Untracked(_)));
    }

    #[test]
    fn test_change_on_merged_branch() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        if git_cmd_at(root, "2024-01-01T00:00:00Z", &["init", "-q"]).is_none() {
            return;
        }
        fs::write(root.join("a.md"), "one").unwrap();
        fs::write(root.join("b.md"), "one").unwrap();
        git_cmd_at(root, "2024-01-01T00:00:00Z", &["add", "."]).unwrap();
        git_cmd_at(root, "2024-01-01T00:00:00Z", &["commit", "-q", "-m", "Initial"]).unwrap();

        git_cmd_at(root, "2024-02-01T00:00:00Z", &["checkout", "-q", "-b", "feature"]).unwrap();
        fs::write(root.join("a.md"), "two").unwrap();
        git_cmd_at(root, "2024-02-01T00:00:00Z", &["commit", "-q", "-am", "Edit a on feature"])
            .unwrap();

        git_cmd_at(root, "2024-03-01T00:00:00Z", &["checkout", "-q", "main"]).unwrap();
        fs::write(root.join("b.md"), "two").unwrap();
        git_cmd_at(root, "2024-03-01T00:00:00Z", &["commit", "-q", "-am", "Edit b on main"])
            .unwrap();
        git_cmd_at(
            root,
            "2024-04-01T00:00:00Z",
            &["merge", "-q", "--no-ff", "-m", "Merge feature", "feature"],
        )
        .unwrap();

        let history = History::discover(root).unwrap();
        let a = history.latest(&root.join("a.md")).unwrap();
        assert_eq!(a.update_message, "Edit a on feature");
        assert_eq!(a.updated_at.to_iso_string(), "2024-02-01T00:00:00.000Z");

        let b = history.latest(&root.join("b.md")).unwrap();
        assert_eq!(b.update_message, "Edit b on main");
    }

    #[test]
    fn test_author_date_is_reported() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        if git_cmd(root, &["init", "-q"]).is_none() {
            return;
        }
        fs::write(root.join("a.md"), "one").unwrap();
        git_cmd(root, &["add", "a.md"]).unwrap();
        let status = Command::new(which::which("git").unwrap())
            .args(["-c", "user.name=Ada", "-c", "user.email=ada@example.com"])
            .args(["-c", "commit.gpgsign=false", "commit", "-q", "-m", "Add a"])
            .current_dir(root)
            .env("GIT_AUTHOR_DATE", "2024-01-10T08:00:00Z")
            .env("GIT_COMMITTER_DATE", "2024-05-20T08:00:00Z")
            .status()
            .unwrap();
        assert!(status.success());

        let history = History::discover(root).unwrap();
        let a = history.latest(&root.join("a.md")).unwrap();
        assert_eq!(a.updated_at.to_iso_string(), "2024-01-10T08:00:00.000Z");
    }

    #[test]
    fn test_unborn_head_is_untracked() {
        let dir = TempDir::new().unwrap();
        if git_cmd(dir.path(), &["init", "-q"]).is_none() {
            return;
        }
        fs::write(dir.path().join("a.md"), "x").unwrap();
        let history = History::discover(dir.path()).unwrap();
        let err = history.latest(&dir.path().join("a.md")).unwrap_err();
        assert!(matches!(err, HistoryError::Untracked(_)));
    }
}
