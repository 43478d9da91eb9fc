use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::command::Command;
use crate::context::ShellContext;
use crate::error::{Result, ShellError};
use crate::fs_ops;
use crate::history::HistoryStore;
use crate::prompt::Confirm;
use crate::trash::{SoftDelete, TrashStore};

/// What a single `undo` did.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum UndoOutcome {
    NothingToUndo,
    /// The consumed entry has no inverse.
    NotInvertible(String),
    /// Copy reverted by moving the copy to the trash.
    Removed(PathBuf),
    RemovalDeclined(PathBuf),
    NothingToRemove(PathBuf),
    MovedBack { from: PathBuf, to: PathBuf },
    TargetMissing(PathBuf),
    Restored(PathBuf),
}

/// Single-step undo over the most recent history entry.
///
/// Each call consumes exactly one entry, whether or not the inverse succeeds.
pub struct UndoEngine<'a> {
    pub ctx: &'a ShellContext,
    pub history: &'a HistoryStore,
    pub trash: &'a TrashStore,
}

/// An undo whose inverse action failed, with the entry it consumed.
#[derive(Debug)]
pub struct UndoFailure {
    pub entry: Option<String>,
    pub error: ShellError,
}

impl<'a> UndoEngine<'a> {
    pub fn undo(&self, confirm: &mut dyn Confirm) -> std::result::Result<UndoOutcome, UndoFailure> {
        let entry = match self.history.pop() {
            Ok(Some(entry)) => entry,
            Ok(None) => return Ok(UndoOutcome::NothingToUndo),
            Err(error) => return Err(UndoFailure { entry: None, error }),
        };
        debug!("undoing {:?}", entry);

        if entry.split_whitespace().count() < 2 {
            return Ok(UndoOutcome::NotInvertible(entry));
        }
        let command = match Command::parse(&entry) {
            Ok(Some(command)) => command,
            _ => return Ok(UndoOutcome::NotInvertible(entry)),
        };

        let result = match command {
            Command::Copy {
                src,
                dst,
                recursive,
            } => self.revert_copy(&src, &dst, recursive, confirm),
            Command::Move { src, dst } => self.revert_move(&src, &dst),
            Command::Delete { path, .. } => self.revert_delete(&path),
            _ => return Ok(UndoOutcome::NotInvertible(entry)),
        };
        result.map_err(|error| UndoFailure {
            entry: Some(entry),
            error,
        })
    }

    fn revert_copy(
        &self,
        src: &str,
        dst: &str,
        recursive: bool,
        confirm: &mut dyn Confirm,
    ) -> Result<UndoOutcome> {
        let src_path = self.ctx.resolve(src);
        let mut target = self.ctx.resolve(dst);
        // a plain file copied onto a directory landed inside it
        if !recursive && target.is_dir() {
            if let Some(nested) = nested_entry(&src_path, &target) {
                target = nested;
            }
        }
        // a copy onto its own source was refused, so nothing was written
        if !exists(&target) || (!recursive && fs_ops::same_file(&src_path, &target)) {
            return Ok(UndoOutcome::NothingToRemove(target));
        }

        let raw = target.to_string_lossy().to_string();
        match self.trash.soft_delete(self.ctx, &raw, true, confirm)? {
            SoftDelete::Trashed { from, .. } => Ok(UndoOutcome::Removed(from)),
            SoftDelete::Declined(path) => Ok(UndoOutcome::RemovalDeclined(path)),
        }
    }

    fn revert_move(&self, src: &str, dst: &str) -> Result<UndoOutcome> {
        let src_path = self.ctx.resolve(src);
        let mut target = self.ctx.resolve(dst);
        // the forward move went into an existing directory
        if target.is_dir() && !exists(&src_path) {
            if let Some(nested) = nested_entry(&src_path, &target) {
                target = nested;
            }
        }
        if !exists(&target) {
            return Ok(UndoOutcome::TargetMissing(target));
        }

        let raw_target = target.to_string_lossy().to_string();
        let to = fs_ops::move_path(self.ctx, &raw_target, src)?;
        Ok(UndoOutcome::MovedBack { from: target, to })
    }

    fn revert_delete(&self, path: &str) -> Result<UndoOutcome> {
        let resolved = self.ctx.resolve(path);
        let Some(name) = resolved.file_name().and_then(|name| name.to_str()) else {
            return Ok(UndoOutcome::NotInvertible(format!("rm {}", path)));
        };
        let restored = self.trash.restore(self.ctx, name)?;
        Ok(UndoOutcome::Restored(restored))
    }
}

fn nested_entry(src: &Path, dir: &Path) -> Option<PathBuf> {
    let nested = dir.join(src.file_name()?);
    exists(&nested).then_some(nested)
}

fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::AutoConfirm;

    struct Fixture {
        _dir: tempfile::TempDir,
        ctx: ShellContext,
        history: HistoryStore,
        trash: TrashStore,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let cwd = fs::canonicalize(dir.path()).unwrap();
            Self {
                ctx: ShellContext::new(cwd.clone(), cwd.clone()),
                history: HistoryStore::new(cwd.join(".history")),
                trash: TrashStore::new(cwd.join(".trash")),
                _dir: dir,
            }
        }

        fn engine(&self) -> UndoEngine<'_> {
            UndoEngine {
                ctx: &self.ctx,
                history: &self.history,
                trash: &self.trash,
            }
        }

        fn path(&self, rel: &str) -> PathBuf {
            self.ctx.cwd.join(rel)
        }
    }

    #[test]
    fn empty_history_has_nothing_to_undo() {
        let fx = Fixture::new();
        let outcome = fx.engine().undo(&mut AutoConfirm(true)).unwrap();
        assert_eq!(outcome, UndoOutcome::NothingToUndo);
        assert!(!fx.trash.dir().exists());
    }

    #[test]
    fn copy_is_reverted_by_trashing_destination() {
        let fx = Fixture::new();
        fs::write(fx.path("src.txt"), "content").unwrap();
        fs::write(fx.path("dst.txt"), "content").unwrap();
        fx.history.append("cp src.txt dst.txt").unwrap();

        let outcome = fx.engine().undo(&mut AutoConfirm(true)).unwrap();
        assert_eq!(outcome, UndoOutcome::Removed(fx.path("dst.txt")));
        assert!(!fx.path("dst.txt").exists());
        assert!(fx.path("src.txt").exists());
        assert!(fx.history.last(10).unwrap().is_empty());
    }

    #[test]
    fn copy_into_directory_removes_only_the_copy() {
        let fx = Fixture::new();
        fs::create_dir(fx.path("dir")).unwrap();
        fs::write(fx.path("a.txt"), "a").unwrap();
        fs::write(fx.path("dir/a.txt"), "a").unwrap();
        fs::write(fx.path("dir/keep.txt"), "k").unwrap();
        fx.history.append("cp a.txt dir").unwrap();

        fx.engine().undo(&mut AutoConfirm(true)).unwrap();
        assert!(!fx.path("dir/a.txt").exists());
        assert!(fx.path("dir/keep.txt").exists());
    }

    #[test]
    fn copy_onto_source_is_not_undone_by_trashing_it() {
        let fx = Fixture::new();
        fs::write(fx.path("f.txt"), "precious").unwrap();
        fx.history.append("cp f.txt .").unwrap();

        let outcome = fx.engine().undo(&mut AutoConfirm(true)).unwrap();
        assert_eq!(outcome, UndoOutcome::NothingToRemove(fx.path("f.txt")));
        assert_eq!(fs::read_to_string(fx.path("f.txt")).unwrap(), "precious");
    }

    #[test]
    fn copy_undo_with_missing_destination() {
        let fx = Fixture::new();
        fx.history.append("cp a b").unwrap();
        let outcome = fx.engine().undo(&mut AutoConfirm(true)).unwrap();
        assert_eq!(outcome, UndoOutcome::NothingToRemove(fx.path("b")));
    }

    #[test]
    fn move_is_reverted() {
        let fx = Fixture::new();
        fs::write(fx.path("dst.txt"), "content").unwrap();
        fx.history.append("mv src.txt dst.txt").unwrap();

        let outcome = fx.engine().undo(&mut AutoConfirm(true)).unwrap();
        assert_eq!(
            outcome,
            UndoOutcome::MovedBack {
                from: fx.path("dst.txt"),
                to: fx.path("src.txt"),
            }
        );
        assert_eq!(fs::read_to_string(fx.path("src.txt")).unwrap(), "content");
        assert!(!fx.path("dst.txt").exists());
    }

    #[test]
    fn move_into_directory_is_reverted() {
        let fx = Fixture::new();
        fs::create_dir(fx.path("box")).unwrap();
        fs::write(fx.path("box/f.txt"), "x").unwrap();
        fx.history.append("mv f.txt box").unwrap();

        fx.engine().undo(&mut AutoConfirm(true)).unwrap();
        assert!(fx.path("f.txt").is_file());
        assert!(fx.path("box").is_dir());
        assert!(!fx.path("box/f.txt").exists());
    }

    #[test]
    fn move_undo_reports_missing_target() {
        let fx = Fixture::new();
        fx.history.append("mv a b").unwrap();
        let outcome = fx.engine().undo(&mut AutoConfirm(true)).unwrap();
        assert_eq!(outcome, UndoOutcome::TargetMissing(fx.path("b")));
    }

    #[test]
    fn delete_is_reverted_from_trash() {
        let fx = Fixture::new();
        fs::create_dir(fx.trash.dir()).unwrap();
        fs::write(fx.trash.dir().join("f.txt"), "x").unwrap();
        fx.history.append("rm sub/f.txt").unwrap();

        let outcome = fx.engine().undo(&mut AutoConfirm(true)).unwrap();
        assert_eq!(outcome, UndoOutcome::Restored(fx.path("f.txt")));
    }

    #[test]
    fn failed_inverse_still_consumes_entry() {
        let fx = Fixture::new();
        fx.history.append("ls").unwrap();
        fx.history.append("rm ghost.txt").unwrap();

        let failure = fx.engine().undo(&mut AutoConfirm(true)).unwrap_err();
        assert_eq!(failure.entry.as_deref(), Some("rm ghost.txt"));
        assert!(matches!(failure.error, ShellError::NotInTrash(_)));
        assert_eq!(fx.history.last(10).unwrap(), vec!["ls"]);
    }

    #[test]
    fn other_verbs_are_not_invertible() {
        let fx = Fixture::new();
        fx.history.append("cat notes.txt").unwrap();
        fx.history.append("ls").unwrap();

        let engine = fx.engine();
        assert_eq!(
            engine.undo(&mut AutoConfirm(true)).unwrap(),
            UndoOutcome::NotInvertible("ls".into())
        );
        assert_eq!(
            engine.undo(&mut AutoConfirm(true)).unwrap(),
            UndoOutcome::NotInvertible("cat notes.txt".into())
        );
        assert_eq!(engine.undo(&mut AutoConfirm(true)).unwrap(), UndoOutcome::NothingToUndo);
    }
}
