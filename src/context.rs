use std::path::{Component, Path, PathBuf};

/// Working state threaded into every operation instead of the process-wide cwd.
#[derive(Debug, Clone)]
pub struct ShellContext {
    pub cwd: PathBuf,
    pub home: PathBuf,
}

impl ShellContext {
    pub fn new(cwd: PathBuf, home: PathBuf) -> Self {
        Self { cwd, home }
    }

    /// Resolves a user-supplied path against the working directory.
    ///
    /// `~` expands to the home directory and `.`/`..` are folded lexically, so the
    /// result is usable for paths that do not exist yet.
    pub fn resolve(&self, raw: &str) -> PathBuf {
        let expanded = if raw == "~" {
            self.home.clone()
        } else if let Some(rest) = raw.strip_prefix("~/") {
            self.home.join(rest)
        } else {
            let path = Path::new(raw);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                self.cwd.join(path)
            }
        };
        normalize(&expanded)
    }

    /// Parent of the working directory; `None` at the filesystem root.
    pub fn parent_dir(&self) -> Option<&Path> {
        self.cwd.parent()
    }

    /// Renders `path` relative to the working directory when that is shorter.
    pub fn display(&self, path: &Path) -> String {
        match pathdiff::diff_paths(path, &self.cwd) {
            Some(rel) if !rel.as_os_str().is_empty() && !rel.starts_with("..") => {
                rel.display().to_string()
            }
            _ => path.display().to_string(),
        }
    }
}

/// Lexically removes `.` and `..` components.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                if !out.pop() && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
