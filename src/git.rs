//! Git commit hash and repository root for the `git` template global.
//!
//! Two interchangeable probes implement [`VcsProbe`]:
//!
//! - [`GitCli`] shells out to `git rev-parse`. Needs the executable.
//! - [`GitRefFiles`] reads `.git/HEAD` and the ref it points to. Works
//!   without git installed (CI images, containers).
//!
//! Neither ever fails: a missing executable, a directory outside any
//! repository, or an unreadable ref all mean "no metadata", and the site
//! renders without the `git` global.

use crate::config::GitStrategy;
use crate::types::GitMetadata;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Source of version-control metadata.
pub trait VcsProbe {
    /// Full hash of the checked-out commit.
    fn probe_commit_hash(&self) -> Option<String>;
    /// Absolute path of the repository's working tree root.
    fn probe_root(&self) -> Option<String>;
}

/// Probe by running the `git` executable in `dir`.
#[derive(Debug, Clone)]
pub struct GitCli {
    dir: PathBuf,
}

impl GitCli {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Whether a working `git` executable is on the `PATH`.
    pub fn is_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .is_ok_and(|o| o.status.success())
    }

    fn rev_parse(&self, arg: &str) -> Option<String> {
        let output = Command::new("git")
            .args(["rev-parse", arg])
            .current_dir(&self.dir)
            .output()
            .ok()
            .filter(|o| o.status.success())?;
        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!text.is_empty()).then_some(text)
    }
}

impl VcsProbe for GitCli {
    fn probe_commit_hash(&self) -> Option<String> {
        self.rev_parse("HEAD")
    }

    fn probe_root(&self) -> Option<String> {
        self.rev_parse("--show-toplevel")
    }
}

/// Probe by reading the repository's ref files directly.
#[derive(Debug, Clone)]
pub struct GitRefFiles {
    dir: PathBuf,
}

impl GitRefFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Walk up from `dir` to the first directory containing `.git`.
    /// Returns `(work_tree_root, git_dir)`.
    fn locate(&self) -> Option<(PathBuf, PathBuf)> {
        let start = self.dir.canonicalize().ok()?;
        start.ancestors().find_map(|root| {
            let dot_git = root.join(".git");
            if dot_git.is_dir() {
                Some((root.to_path_buf(), dot_git))
            } else if dot_git.is_file() {
                // Worktrees and submodules: `.git` is a file with `gitdir: <path>`
                let content = fs::read_to_string(&dot_git).ok()?;
                let target = content.trim().strip_prefix("gitdir:")?.trim();
                Some((root.to_path_buf(), root.join(target)))
            } else {
                None
            }
        })
    }
}

impl VcsProbe for GitRefFiles {
    fn probe_commit_hash(&self) -> Option<String> {
        let (_, git_dir) = self.locate()?;
        let head = fs::read_to_string(git_dir.join("HEAD")).ok()?;
        let head = head.trim();
        match head.strip_prefix("ref:") {
            Some(name) => resolve_ref(&git_dir, name.trim()),
            None => (!head.is_empty()).then(|| head.to_string()),
        }
    }

    fn probe_root(&self) -> Option<String> {
        let (root, _) = self.locate()?;
        Some(root.to_string_lossy().to_string())
    }
}

/// Directory holding shared refs. Linked worktrees name it in a
/// `commondir` file; everywhere else it is `git_dir` itself.
fn common_dir(git_dir: &Path) -> PathBuf {
    match fs::read_to_string(git_dir.join("commondir")) {
        Ok(content) if !content.trim().is_empty() => git_dir.join(content.trim()),
        _ => git_dir.to_path_buf(),
    }
}

/// Resolve a symbolic ref one level: loose ref file in the git dir, then in
/// the common dir, then `packed-refs`.
fn resolve_ref(git_dir: &Path, name: &str) -> Option<String> {
    let common = common_dir(git_dir);
    for dir in [git_dir, common.as_path()] {
        if let Ok(hash) = fs::read_to_string(dir.join(name)) {
            let hash = hash.trim();
            if !hash.is_empty() {
                return Some(hash.to_string());
            }
        }
    }
    let packed = fs::read_to_string(common.join("packed-refs")).ok()?;
    packed
        .lines()
        .filter(|line| !line.starts_with('#') && !line.starts_with('^'))
        .find_map(|line| {
            let (hash, ref_name) = line.split_once(' ')?;
            (ref_name.trim() == name).then(|| hash.to_string())
        })
}

/// Collect metadata from a probe. Both the hash and the root must be known.
pub fn collect(probe: &dyn VcsProbe) -> Option<GitMetadata> {
    let hash = probe.probe_commit_hash()?;
    let root = probe.probe_root()?;
    Some(GitMetadata::new(hash, root))
}

/// Probe `dir` using the configured strategy.
///
/// `Auto` prefers the executable when it is installed and falls back to
/// reading ref files otherwise.
pub fn probe(dir: &Path, strategy: GitStrategy) -> Option<GitMetadata> {
    let metadata = match strategy {
        GitStrategy::Off => return None,
        GitStrategy::Cli => collect(&GitCli::new(dir)),
        GitStrategy::Files => collect(&GitRefFiles::new(dir)),
        GitStrategy::Auto => {
            if GitCli::is_available() {
                collect(&GitCli::new(dir))
            } else {
                debug!("git executable not found, reading ref files");
                collect(&GitRefFiles::new(dir))
            }
        }
    };
    match &metadata {
        Some(git) => debug!(hash = %git.commit.hash, dir = %git.dir, "git metadata found"),
        None => debug!(dir = %dir.display(), "no git metadata"),
    }
    metadata
}
