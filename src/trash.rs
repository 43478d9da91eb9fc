use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::context::ShellContext;
use crate::error::{Result, ShellError};
use crate::fs_ops::relocate;
use crate::prompt::Confirm;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SoftDelete {
    Trashed { from: PathBuf, to: PathBuf },
    /// A directory deletion the user did not confirm.
    Declined(PathBuf),
}

/// Soft-delete holding area. Items are keyed by base name only.
pub struct TrashStore {
    dir: PathBuf,
}

impl TrashStore {
    /// `dir` must be absolute; it is created on first use.
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|err| ShellError::io(&self.dir, err))
    }

    /// Moves `raw` into the trash under its base name.
    ///
    /// The filesystem root, the parent of the working directory and the trash itself
    /// (or anything containing it) are refused regardless of `recursive`. Directories
    /// need `recursive` plus a yes from `confirm`.
    pub fn soft_delete(
        &self,
        ctx: &ShellContext,
        raw: &str,
        recursive: bool,
        confirm: &mut dyn Confirm,
    ) -> Result<SoftDelete> {
        self.ensure()?;
        let path = ctx.resolve(raw);
        self.check_protected(ctx, &path)?;

        if fs::symlink_metadata(&path).is_err() {
            return Err(ShellError::NotFound(path));
        }
        let Some(name) = path.file_name() else {
            return Err(ShellError::Safety(path));
        };

        if path.is_dir() {
            if !recursive {
                return Err(ShellError::NeedsRecursive(path));
            }
            if !confirm.confirm_delete(&path) {
                return Ok(SoftDelete::Declined(path));
            }
        }

        let dest = self.dir.join(name);
        if fs::symlink_metadata(&dest).is_ok() {
            return Err(ShellError::AlreadyExists(dest));
        }
        relocate(&path, &dest)?;
        debug!("trashed {} as {}", path.display(), dest.display());
        Ok(SoftDelete::Trashed { from: path, to: dest })
    }

    /// Moves `<trash>/<name>` into the working directory.
    pub fn restore(&self, ctx: &ShellContext, name: &str) -> Result<PathBuf> {
        let src = self.dir.join(name);
        if name.is_empty() || fs::symlink_metadata(&src).is_err() {
            return Err(ShellError::NotInTrash(name.to_string()));
        }
        let dest = ctx.cwd.join(name);
        if fs::symlink_metadata(&dest).is_ok() {
            return Err(ShellError::AlreadyExists(dest));
        }
        relocate(&src, &dest)?;
        debug!("restored {} to {}", src.display(), dest.display());
        Ok(dest)
    }

    fn check_protected(&self, ctx: &ShellContext, path: &Path) -> Result<()> {
        let is_root = path.parent().is_none();
        let is_cwd_parent = ctx.parent_dir() == Some(path);
        let touches_trash = path.starts_with(&self.dir) || self.dir.starts_with(path);
        if is_root || is_cwd_parent || touches_trash {
            return Err(ShellError::Safety(path.to_path_buf()));
        }
        Ok(())
    }
}
