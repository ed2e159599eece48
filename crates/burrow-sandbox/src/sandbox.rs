//! The sandbox: a fixed root directory plus a tracked working directory.

use std::fs;
use std::path::{Component, Path, PathBuf};

use burrow_types::error::{Result, ShellError};

/// A directory jail.
///
/// The root is canonicalized once at construction and never changes. The
/// working directory is always the root or a descendant of it; `cd` is the
/// only operation that moves it, and it re-validates the target instead of
/// trusting a cached path.
#[derive(Debug)]
pub struct Sandbox {
    root: PathBuf,
    cwd: PathBuf,
}

impl Sandbox {
    /// Create a sandbox rooted at `root`, creating the directory if it
    /// does not exist yet. The working directory starts at the root.
    pub fn new(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        let root = fs::canonicalize(root)?;
        let cwd = root.clone();
        Ok(Self { root, cwd })
    }

    /// The confinement root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The current working directory (always inside the root).
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Map a user-supplied path to an absolute path inside the root.
    ///
    /// Empty input resolves to the current working directory. Relative
    /// input is joined to the cwd, absolute input is taken as-is; both are
    /// then lexically normalized. A result that escapes the root is not an
    /// error: the escaping path is discarded and `root/<basename>` is
    /// substituted instead. This clamp-not-reject policy is deliberate and
    /// matches the shell's user-visible contract; the clamp is logged so
    /// operators can still see attempted escapes.
    ///
    /// Resolution is purely lexical. The target does not have to exist.
    pub fn resolve(&self, raw: &str) -> PathBuf {
        if raw.is_empty() {
            return self.cwd.clone();
        }
        let input = Path::new(raw);
        let joined = if input.is_absolute() {
            input.to_path_buf()
        } else {
            self.cwd.join(input)
        };
        let normalized = normalize(&joined);
        if normalized.starts_with(&self.root) {
            normalized
        } else {
            log::warn!(
                "clamping path outside sandbox root: {} -> root",
                normalized.display()
            );
            match normalized.file_name() {
                Some(name) => self.root.join(name),
                None => self.root.clone(),
            }
        }
    }

    /// Whether `path` is the root or one of its descendants.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }

    /// Move the working directory to `target`.
    ///
    /// The target must exist, be a directory, and sit inside the root;
    /// otherwise an error is returned and the cwd stays where it was.
    pub fn set_cwd(&mut self, target: &Path) -> Result<()> {
        if !target.exists() {
            return Err(ShellError::NotFound(target.display().to_string()));
        }
        if !target.is_dir() {
            return Err(ShellError::NotADirectory(target.display().to_string()));
        }
        // resolve() already clamps, but cd re-checks confinement rather
        // than trusting the caller to have gone through resolve().
        if !self.contains(target) {
            return Err(ShellError::AccessViolation(target.display().to_string()));
        }
        self.cwd = target.to_path_buf();
        Ok(())
    }

    /// Move the working directory back to the root (`cd` with no args).
    pub fn reset_cwd(&mut self) {
        self.cwd = self.root.clone();
    }

    /// The working directory relative to the root, for prompts: `/` at the
    /// root, `/sub/dir` below it.
    pub fn rel_display(&self) -> String {
        match self.cwd.strip_prefix(&self.root) {
            Ok(rel) if rel.as_os_str().is_empty() => "/".to_string(),
            Ok(rel) => format!("/{}", rel.display()),
            Err(_) => "/".to_string(),
        }
    }
}

/// Lexically normalize a path: drop `.`, pop on `..`, collapse separators.
/// No filesystem access and no symlink resolution.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(p) => out.push(p.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {},
            Component::ParentDir => {
                out.pop();
            },
            Component::Normal(name) => out.push(name),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn jail() -> (tempfile::TempDir, Sandbox) {
        let dir = tempfile::tempdir().unwrap();
        let sb = Sandbox::new(dir.path()).unwrap();
        (dir, sb)
    }

    #[test]
    fn new_creates_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("deep/jail");
        let sb = Sandbox::new(&root).unwrap();
        assert!(sb.root().is_dir());
    }

    #[test]
    fn empty_input_resolves_to_cwd() {
        let (_dir, sb) = jail();
        assert_eq!(sb.resolve(""), sb.cwd());
    }

    #[test]
    fn relative_input_joins_cwd() {
        let (_dir, sb) = jail();
        assert_eq!(sb.resolve("a/b.txt"), sb.root().join("a/b.txt"));
    }

    #[test]
    fn dot_segments_collapse() {
        let (_dir, sb) = jail();
        assert_eq!(sb.resolve("a/./b/../c"), sb.root().join("a/c"));
    }

    #[test]
    fn nonexistent_target_still_resolves() {
        let (_dir, sb) = jail();
        let p = sb.resolve("no/such/file.txt");
        assert_eq!(p, sb.root().join("no/such/file.txt"));
    }

    #[test]
    fn parent_escape_clamps_to_root_basename() {
        let (_dir, sb) = jail();
        let p = sb.resolve("../../../etc/passwd");
        assert_eq!(p, sb.root().join("passwd"));
    }

    #[test]
    fn absolute_outside_clamps() {
        let (_dir, sb) = jail();
        let p = sb.resolve("/etc/passwd");
        assert_eq!(p, sb.root().join("passwd"));
    }

    #[test]
    fn absolute_inside_passes_through() {
        let (_dir, sb) = jail();
        let inside = sb.root().join("x.txt");
        let p = sb.resolve(inside.to_str().unwrap());
        assert_eq!(p, inside);
    }

    #[test]
    fn escape_with_no_basename_clamps_to_root() {
        let (_dir, sb) = jail();
        assert_eq!(sb.resolve("/"), sb.root());
    }

    #[test]
    fn set_cwd_missing_target_keeps_cwd() {
        let (_dir, mut sb) = jail();
        let before = sb.cwd().to_path_buf();
        let target = sb.root().join("nope");
        assert!(matches!(
            sb.set_cwd(&target),
            Err(ShellError::NotFound(_))
        ));
        assert_eq!(sb.cwd(), before);
    }

    #[test]
    fn set_cwd_file_target_keeps_cwd() {
        let (_dir, mut sb) = jail();
        let file = sb.root().join("f.txt");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            sb.set_cwd(&file),
            Err(ShellError::NotADirectory(_))
        ));
        assert_eq!(sb.cwd(), sb.root());
    }

    #[test]
    fn set_cwd_outside_root_is_blocked() {
        let (_dir, mut sb) = jail();
        let outside = tempfile::tempdir().unwrap();
        assert!(matches!(
            sb.set_cwd(outside.path()),
            Err(ShellError::AccessViolation(_))
        ));
        assert_eq!(sb.cwd(), sb.root());
    }

    #[test]
    fn set_cwd_then_relative_resolution() {
        let (_dir, mut sb) = jail();
        let sub = sb.root().join("sub");
        fs::create_dir(&sub).unwrap();
        sb.set_cwd(&sub).unwrap();
        assert_eq!(sb.resolve("f.txt"), sub.join("f.txt"));
        assert_eq!(sb.rel_display(), "/sub");
    }

    #[test]
    fn reset_cwd_returns_to_root() {
        let (_dir, mut sb) = jail();
        let sub = sb.root().join("sub");
        fs::create_dir(&sub).unwrap();
        sb.set_cwd(&sub).unwrap();
        sb.reset_cwd();
        assert_eq!(sb.cwd(), sb.root());
        assert_eq!(sb.rel_display(), "/");
    }

    #[test]
    fn normalize_collapses_separators() {
        assert_eq!(normalize(Path::new("/a//b/./c")), PathBuf::from("/a/b/c"));
        assert_eq!(normalize(Path::new("/a/b/../c")), PathBuf::from("/a/c"));
    }

    proptest! {
        // Confinement invariant: whatever the input, the resolved path is
        // the root or a descendant of it, and resolve never panics.
        #[test]
        fn resolve_stays_inside_root(input in "[a-zA-Z0-9_./-]{0,64}") {
            let (_dir, sb) = jail();
            let p = sb.resolve(&input);
            prop_assert!(p.starts_with(sb.root()));
        }

        #[test]
        fn resolve_equals_cwd_iff_empty_from_root(input in "[a-z]{1,8}") {
            let (_dir, sb) = jail();
            prop_assert_eq!(sb.resolve(""), sb.cwd().to_path_buf());
            prop_assert_ne!(sb.resolve(&input), sb.cwd().to_path_buf());
        }

        #[test]
        fn escapes_never_error(depth in 1usize..8) {
            let (_dir, sb) = jail();
            let input = "../".repeat(depth) + "victim";
            let p = sb.resolve(&input);
            prop_assert_eq!(p, sb.root().join("victim"));
        }
    }
}
