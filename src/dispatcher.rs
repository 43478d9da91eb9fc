use log::{debug, warn};

use crate::archive;
use crate::audit::AuditLogger;
use crate::command::Command;
use crate::config::StatePaths;
use crate::context::ShellContext;
use crate::error::{Result, ShellError};
use crate::fs_ops;
use crate::history::HistoryStore;
use crate::i18n::I18n;
use crate::prompt::Confirm;
use crate::search::{self, SearchOptions};
use crate::trash::{SoftDelete, TrashStore};
use crate::undo::{UndoEngine, UndoOutcome};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Status {
    /// Blank input; nothing happened.
    Idle,
    Ok,
    /// Completed without effect (cancelled, nothing to do, no matches).
    Notice,
    Failed,
    Exit,
}

/// What the loop shows after one line.
#[derive(Debug, Clone)]
pub struct Reply {
    pub output: Vec<String>,
    pub message: Option<String>,
    pub status: Status,
}

impl Reply {
    fn idle() -> Self {
        Self {
            output: Vec::new(),
            message: None,
            status: Status::Idle,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Settings {
    pub history_default: usize,
    pub restore_on_failed_undo: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_default: 10,
            restore_on_failed_undo: false,
        }
    }
}

struct Executed {
    output: Vec<String>,
    message: Option<String>,
    status: Status,
    // English summary for the audit log
    audit: String,
}

impl Executed {
    fn ok(message: Option<String>, audit: String) -> Self {
        Self {
            output: Vec::new(),
            message,
            status: Status::Ok,
            audit,
        }
    }

    fn output(output: Vec<String>, audit: String) -> Self {
        Self {
            output,
            message: None,
            status: Status::Ok,
            audit,
        }
    }

    fn notice(message: String, audit: String) -> Self {
        Self {
            output: Vec::new(),
            message: Some(message),
            status: Status::Notice,
            audit,
        }
    }
}

/// Parses, validates and routes command lines; the single boundary where failures
/// become user messages and audit `ERROR:` lines.
pub struct Dispatcher {
    ctx: ShellContext,
    history: HistoryStore,
    audit: AuditLogger,
    trash: TrashStore,
    confirm: Box<dyn Confirm>,
    i18n: I18n,
    settings: Settings,
}

impl Dispatcher {
    pub fn new(
        ctx: ShellContext,
        paths: &StatePaths,
        i18n: I18n,
        confirm: Box<dyn Confirm>,
        settings: Settings,
    ) -> Self {
        Self {
            ctx,
            history: HistoryStore::new(paths.history.clone()),
            audit: AuditLogger::new(paths.audit.clone()),
            trash: TrashStore::new(paths.trash.clone()),
            confirm,
            i18n,
            settings,
        }
    }

    pub fn context(&self) -> &ShellContext {
        &self.ctx
    }

    pub fn i18n(&self) -> &I18n {
        &self.i18n
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    pub fn dispatch(&mut self, line: &str) -> Reply {
        let line = line.trim();
        if line.is_empty() {
            return Reply::idle();
        }
        self.audit.record(line);

        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Reply::idle(),
            Err(err) => return self.fail(&err),
        };
        debug!("dispatching {:?}", command);

        // Recorded before running so a command that fails half-way can still be undone.
        if command.verb().is_recorded() {
            if let Err(err) = self.history.append(line) {
                warn!("history entry not written: {}", err);
                self.audit.error(&format!("history not written: {}", err));
            }
        }

        match self.execute(command) {
            Ok(done) => {
                if done.status == Status::Failed {
                    self.audit.error(&done.audit);
                } else {
                    self.audit.success(&done.audit);
                }
                Reply {
                    output: done.output,
                    message: done.message,
                    status: done.status,
                }
            }
            Err(err) => self.fail(&err),
        }
    }

    fn fail(&self, err: &ShellError) -> Reply {
        debug!("{:?} failure: {}", err.kind(), err);
        self.audit.error(&err.to_string());
        Reply {
            output: Vec::new(),
            message: Some(err.localized(&self.i18n)),
            status: Status::Failed,
        }
    }

    fn execute(&mut self, command: Command) -> Result<Executed> {
        let i18n = &self.i18n;
        let ctx = &self.ctx;
        match command {
            Command::List { path, detailed } => {
                let lines = fs_ops::list_dir(ctx, path.as_deref(), detailed)?;
                let shown = path.unwrap_or_else(|| ".".to_string());
                Ok(Executed::output(lines, format!("listed {}", shown)))
            }
            Command::ChangeDir { path } => {
                let target = fs_ops::change_dir(ctx, path.as_deref())?;
                let audit = format!("changed directory to {}", target.display());
                self.ctx.cwd = target;
                Ok(Executed::ok(None, audit))
            }
            Command::Show { path } => {
                let content = fs_ops::read_file(ctx, &path)?;
                let output = vec![content.trim_end_matches('\n').to_string()];
                Ok(Executed::output(output, format!("printed {}", path)))
            }
            Command::Copy {
                src,
                dst,
                recursive,
            } => {
                let target = fs_ops::copy_path(ctx, &src, &dst, recursive)?;
                Ok(Executed::ok(
                    Some(i18n.t_format("copied", &[&src, &ctx.display(&target)])),
                    format!("copied {} to {}", src, target.display()),
                ))
            }
            Command::Move { src, dst } => {
                let target = fs_ops::move_path(ctx, &src, &dst)?;
                Ok(Executed::ok(
                    Some(i18n.t_format("moved", &[&src, &ctx.display(&target)])),
                    format!("moved {} to {}", src, target.display()),
                ))
            }
            Command::Delete { path, recursive } => {
                match self
                    .trash
                    .soft_delete(ctx, &path, recursive, self.confirm.as_mut())?
                {
                    SoftDelete::Trashed { from, to } => Ok(Executed::ok(
                        Some(i18n.t_format("trashed", &[&ctx.display(&from)])),
                        format!("trashed {} as {}", from.display(), to.display()),
                    )),
                    SoftDelete::Declined(from) => Ok(Executed::notice(
                        i18n.t("delete_cancelled"),
                        format!("deletion of {} cancelled", from.display()),
                    )),
                }
            }
            Command::Pack {
                kind,
                folder,
                archive: name,
            } => {
                let written = archive::pack_archive(ctx, kind, &folder, &name)?;
                Ok(Executed::ok(
                    Some(i18n.t_format("packed", &[&ctx.display(&written)])),
                    format!("packed {} into {}", folder, written.display()),
                ))
            }
            Command::Unpack {
                kind,
                archive: name,
            } => {
                let source = archive::unpack_archive(ctx, kind, &name)?;
                Ok(Executed::ok(
                    Some(i18n.t_format("unpacked", &[&name])),
                    format!(
                        "unpacked {} archive {} into {}",
                        kind.as_str(),
                        source.display(),
                        ctx.cwd.display()
                    ),
                ))
            }
            Command::Search {
                pattern,
                path,
                recursive,
                ignore_case,
            } => {
                let options = SearchOptions {
                    recursive,
                    ignore_case,
                };
                let hits = search::search_text(ctx, &pattern, &path, options)?;
                let audit = format!("searched '{}' in {}: {} line(s)", pattern, path, hits.len());
                if hits.is_empty() {
                    Ok(Executed::notice(i18n.t("no_matches"), audit))
                } else {
                    Ok(Executed::output(hits, audit))
                }
            }
            Command::History { count } => {
                let n = count.unwrap_or(self.settings.history_default);
                let entries = self.history.last(n)?;
                let audit = format!("history shown ({} entries)", entries.len());
                // an explicit zero window shows nothing, it does not mean "empty"
                if entries.is_empty() && n > 0 {
                    return Ok(Executed::notice(i18n.t("history_empty"), audit));
                }
                let lines = entries
                    .iter()
                    .enumerate()
                    .map(|(idx, entry)| format!("{:>4}  {}", idx + 1, entry))
                    .collect();
                Ok(Executed::output(lines, audit))
            }
            Command::Undo => self.undo(),
            Command::Help => {
                let mut lines = vec![i18n.t("help_title")];
                for key in [
                    "help_ls",
                    "help_cd",
                    "help_cat",
                    "help_cp",
                    "help_mv",
                    "help_rm",
                    "help_zip",
                    "help_unzip",
                    "help_grep",
                    "help_history",
                    "help_undo",
                    "help_exit",
                ] {
                    lines.push(format!("  {}", i18n.t(key)));
                }
                Ok(Executed::output(lines, "help shown".to_string()))
            }
            Command::Exit => Ok(Executed {
                output: Vec::new(),
                message: Some(i18n.t("exit_message")),
                status: Status::Exit,
                audit: "exit".to_string(),
            }),
        }
    }

    fn undo(&mut self) -> Result<Executed> {
        let engine = UndoEngine {
            ctx: &self.ctx,
            history: &self.history,
            trash: &self.trash,
        };
        let outcome = match engine.undo(self.confirm.as_mut()) {
            Ok(outcome) => outcome,
            Err(failure) => {
                if let (true, Some(entry)) = (self.settings.restore_on_failed_undo, &failure.entry)
                {
                    if let Err(err) = self.history.append(entry) {
                        warn!("could not put back history entry {:?}: {}", entry, err);
                    }
                }
                return Err(failure.error);
            }
        };

        let i18n = &self.i18n;
        let ctx = &self.ctx;
        let shown = |path: &std::path::Path| ctx.display(path);
        let done = match outcome {
            UndoOutcome::NothingToUndo => {
                Executed::notice(i18n.t("nothing_to_undo"), "undo: nothing to undo".to_string())
            }
            UndoOutcome::NotInvertible(entry) => Executed {
                output: Vec::new(),
                message: Some(i18n.t_format("undo_not_invertible", &[&entry])),
                status: Status::Failed,
                audit: format!("undo: '{}' cannot be undone", entry),
            },
            UndoOutcome::Removed(path) => Executed::ok(
                Some(i18n.t_format("undo_removed", &[&shown(&path)])),
                format!("undo: moved {} to the trash", path.display()),
            ),
            UndoOutcome::RemovalDeclined(path) => Executed::notice(
                i18n.t_format("undo_removal_cancelled", &[&shown(&path)]),
                format!("undo: removal of {} cancelled", path.display()),
            ),
            UndoOutcome::NothingToRemove(path) => Executed::notice(
                i18n.t_format("undo_nothing_to_remove", &[&shown(&path)]),
                format!("undo: {} does not exist", path.display()),
            ),
            UndoOutcome::MovedBack { from, to } => Executed::ok(
                Some(i18n.t_format("undo_moved_back", &[&shown(&from), &shown(&to)])),
                format!("undo: moved {} back to {}", from.display(), to.display()),
            ),
            UndoOutcome::TargetMissing(path) => Executed::notice(
                i18n.t_format("undo_target_missing", &[&shown(&path)]),
                format!("undo: target {} not found", path.display()),
            ),
            UndoOutcome::Restored(path) => Executed::ok(
                Some(i18n.t_format("undo_restored", &[&shown(&path)])),
                format!("undo: restored {} from the trash", path.display()),
            ),
        };
        Ok(done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::AutoConfirm;
    use std::fs;
    use std::path::PathBuf;

    struct Fixture {
        _dir: tempfile::TempDir,
        paths: StatePaths,
        shell: Dispatcher,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with(AutoConfirm(true), Settings::default())
        }

        fn with(confirm: AutoConfirm, settings: Settings) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let root = fs::canonicalize(dir.path()).unwrap();
            let cwd = root.join("work");
            fs::create_dir(&cwd).unwrap();
            let paths = StatePaths {
                root: root.clone(),
                history: root.join(".history"),
                audit: root.join("shell.log"),
                trash: root.join(".trash"),
            };
            let shell = Dispatcher::new(
                ShellContext::new(cwd, root.join("home")),
                &paths,
                I18n::new("en"),
                Box::new(confirm),
                settings,
            );
            Self {
                _dir: dir,
                paths,
                shell,
            }
        }

        fn path(&self, rel: &str) -> PathBuf {
            self.shell.context().cwd.join(rel)
        }

        fn run(&mut self, line: &str) -> Reply {
            self.shell.dispatch(line)
        }

        fn history(&self) -> Vec<String> {
            HistoryStore::new(self.paths.history.clone()).last(100).unwrap()
        }

        fn audit_log(&self) -> String {
            fs::read_to_string(&self.paths.audit).unwrap_or_default()
        }
    }

    #[test]
    fn blank_line_is_a_silent_no_op() {
        let mut fx = Fixture::new();
        assert_eq!(fx.run("   ").status, Status::Idle);
        assert!(!fx.paths.audit.exists());
        assert!(fx.history().is_empty());
    }

    #[test]
    fn arity_and_flag_errors_never_touch_the_filesystem() {
        let mut fx = Fixture::new();
        fs::write(fx.path("a.txt"), "a").unwrap();

        for line in [
            "cp a.txt",
            "cp -x a.txt b.txt",
            "mv a.txt",
            "mv a.txt b.txt c.txt",
            "rm",
            "rm a.txt extra",
            "rm -f a.txt",
            "zip a.txt",
            "untar",
            "grep a.txt",
        ] {
            let reply = fx.run(line);
            assert_eq!(reply.status, Status::Failed, "{line}");
        }

        assert_eq!(fs::read_to_string(fx.path("a.txt")).unwrap(), "a");
        assert!(!fx.path("b.txt").exists());
        assert!(!fx.paths.trash.exists());
        assert!(fx.history().is_empty());
        assert_eq!(fx.audit_log().matches("ERROR:").count(), 10);
    }

    #[test]
    fn unknown_command_is_logged_but_not_recorded() {
        let mut fx = Fixture::new();
        let reply = fx.run("unknown_command foo");
        assert_eq!(reply.status, Status::Failed);
        assert_eq!(reply.message.as_deref(), Some("Unknown command: unknown_command"));
        assert!(fx.history().is_empty());
        assert!(fx.audit_log().contains("ERROR: unknown command: unknown_command"));
    }

    #[test]
    fn failing_commands_still_enter_history() {
        let mut fx = Fixture::new();
        let reply = fx.run("cat missing.txt");
        assert_eq!(reply.status, Status::Failed);
        assert_eq!(fx.history(), vec!["cat missing.txt"]);

        let log = fx.audit_log();
        assert!(log.contains("] cat missing.txt\n"));
        assert!(log.contains("ERROR: not found:"));
    }

    #[test]
    fn meta_commands_stay_out_of_history() {
        let mut fx = Fixture::new();
        fx.run("ls");
        fx.run("ls   -l");
        fx.run("history");
        fx.run("help");
        fx.run("undo");
        assert_eq!(fx.history(), vec!["ls"]);
    }

    #[test]
    fn history_shows_last_entries_in_order() {
        let mut fx = Fixture::new();
        fx.run("ls");
        fx.run("cat nope");
        fx.run("ls -l");

        let reply = fx.run("history 2");
        assert_eq!(reply.output, vec!["   1  cat nope", "   2  ls -l"]);
        assert_eq!(fx.run("history abc").output.len(), 3);

        let zero = fx.run("history 0");
        assert_eq!(zero.status, Status::Ok);
        assert!(zero.output.is_empty());
        assert_eq!(zero.message, None);

        let negative = fx.run("history -3");
        assert_eq!(negative.status, Status::Ok);
        assert!(negative.output.is_empty());
    }

    #[test]
    fn history_on_empty_store_says_so() {
        let mut fx = Fixture::new();
        let reply = fx.run("history");
        assert_eq!(reply.status, Status::Notice);
        assert_eq!(reply.message.as_deref(), Some(I18n::new("en").t("history_empty").as_str()));
    }

    #[test]
    fn copy_onto_itself_fails_and_undo_keeps_the_file() {
        let mut fx = Fixture::new();
        fs::write(fx.path("f.txt"), "precious").unwrap();

        for line in ["cp f.txt f.txt", "cp f.txt ."] {
            let reply = fx.run(line);
            assert_eq!(reply.status, Status::Failed, "{line}");
            assert_eq!(fs::read_to_string(fx.path("f.txt")).unwrap(), "precious");
        }
        assert!(fx.audit_log().contains("are the same file"));

        fx.run("undo");
        fx.run("undo");
        assert_eq!(fs::read_to_string(fx.path("f.txt")).unwrap(), "precious");
        assert!(!fx.paths.trash.join("f.txt").exists());
    }

    #[test]
    fn copy_directory_then_undo() {
        let mut fx = Fixture::new();
        fs::create_dir(fx.path("d")).unwrap();
        fs::write(fx.path("d/f.txt"), "f").unwrap();

        assert_eq!(fx.run("cp d d2 -r").status, Status::Ok);
        assert!(fx.path("d2/f.txt").exists());

        assert_eq!(fx.run("undo").status, Status::Ok);
        assert!(!fx.path("d2").exists());
        assert_eq!(fs::read_to_string(fx.path("d/f.txt")).unwrap(), "f");
        assert!(fx.history().is_empty());
    }

    #[test]
    fn copy_file_then_undo_leaves_source() {
        let mut fx = Fixture::new();
        fs::write(fx.path("src.txt"), "content").unwrap();
        fx.run("cp src.txt dst.txt");
        assert!(fx.path("dst.txt").exists());

        fx.run("undo");
        assert!(!fx.path("dst.txt").exists());
        assert_eq!(fs::read_to_string(fx.path("src.txt")).unwrap(), "content");
    }

    #[test]
    fn move_then_undo_restores_source() {
        let mut fx = Fixture::new();
        fs::write(fx.path("src.txt"), "content").unwrap();
        fx.run("mv src.txt dst.txt");
        assert!(!fx.path("src.txt").exists());

        let reply = fx.run("undo");
        assert_eq!(reply.status, Status::Ok);
        assert_eq!(fs::read_to_string(fx.path("src.txt")).unwrap(), "content");
        assert!(!fx.path("dst.txt").exists());
    }

    #[test]
    fn delete_then_undo_restores_into_cwd() {
        let mut fx = Fixture::new();
        fs::write(fx.path("f.txt"), "content").unwrap();

        assert_eq!(fx.run("rm f.txt").status, Status::Ok);
        assert!(!fx.path("f.txt").exists());
        assert!(fx.paths.trash.join("f.txt").exists());

        fx.run("undo");
        assert_eq!(fs::read_to_string(fx.path("f.txt")).unwrap(), "content");
        assert!(!fx.paths.trash.join("f.txt").exists());
    }

    #[test]
    fn undo_with_empty_history() {
        let mut fx = Fixture::new();
        let reply = fx.run("undo");
        assert_eq!(reply.status, Status::Notice);
        assert_eq!(reply.message.as_deref(), Some("Nothing to undo"));
        assert!(!fx.paths.trash.exists());
    }

    #[test]
    fn undo_of_listing_is_not_invertible_and_consumes_entry() {
        let mut fx = Fixture::new();
        fx.run("ls");
        assert_eq!(fx.run("undo").status, Status::Failed);
        assert!(fx.history().is_empty());
        assert!(fx.audit_log().contains("ERROR: undo: 'ls' cannot be undone"));
    }

    #[test]
    fn failed_undo_can_put_the_entry_back() {
        let settings = Settings {
            restore_on_failed_undo: true,
            ..Settings::default()
        };
        let mut fx = Fixture::with(AutoConfirm(true), settings);
        fx.run("rm ghost.txt");
        assert_eq!(fx.run("undo").status, Status::Failed);
        assert_eq!(fx.history(), vec!["rm ghost.txt"]);
    }

    #[test]
    fn protected_paths_fail_with_safety_violation() {
        let mut fx = Fixture::new();
        for line in ["rm /", "rm -r /", "rm ..", "rm -r .."] {
            let reply = fx.run(line);
            assert_eq!(reply.status, Status::Failed, "{line}");
            assert_eq!(
                reply.message.as_deref(),
                Some("Error: deleting the root or the parent directory is forbidden!")
            );
        }
        assert!(fx.audit_log().contains("ERROR: refusing to delete protected path"));
    }

    #[test]
    fn declined_directory_delete_keeps_directory() {
        let mut fx = Fixture::with(AutoConfirm(false), Settings::default());
        fs::create_dir(fx.path("keep")).unwrap();
        let reply = fx.run("rm -r keep");
        assert_eq!(reply.status, Status::Notice);
        assert!(fx.path("keep").is_dir());
        assert!(fx.audit_log().contains("SUCCESS: deletion of"));
    }

    #[test]
    fn change_dir_moves_the_context() {
        let mut fx = Fixture::new();
        fs::create_dir(fx.path("sub")).unwrap();
        fs::write(fx.path("sub/note.txt"), "hello\n").unwrap();

        assert_eq!(fx.run("cd sub").status, Status::Ok);
        let reply = fx.run("cat note.txt");
        assert_eq!(reply.output, vec!["hello"]);

        assert_eq!(fx.run("cd nowhere").status, Status::Failed);
        assert!(fx.shell.context().cwd.ends_with("sub"));
    }

    #[test]
    fn search_and_archives_report_results() {
        let mut fx = Fixture::new();
        fs::create_dir(fx.path("folder")).unwrap();
        fs::write(fx.path("folder/test.txt"), "Test Content").unwrap();

        let hits = fx.run("grep -r -i test content folder");
        assert_eq!(hits.output.len(), 1);
        assert_eq!(fx.run("grep absent folder").message.as_deref(), Some("No matches"));

        assert_eq!(fx.run("zip folder archive.zip").status, Status::Ok);
        assert!(fx.path("archive.zip").exists());
        assert_eq!(fx.run("tar folder archive.tar.gz").status, Status::Ok);
        assert_eq!(fx.run("unzip missing.zip").status, Status::Failed);
    }

    #[test]
    fn exit_ends_the_session() {
        let mut fx = Fixture::new();
        let reply = fx.run("exit");
        assert_eq!(reply.status, Status::Exit);
        assert!(fx.history().is_empty());
    }
}
