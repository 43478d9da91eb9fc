use std::io;
use std::path::{Path, PathBuf};

use crate::i18n::I18n;

/// Coarse classification used when reporting a failure.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ErrorKind {
    /// Bad flags or arity; rejected before any side effect.
    Validation,
    NotFound,
    Permission,
    /// Attempt to delete the filesystem root, the parent of the working directory or the trash.
    Safety,
    /// Wrapped failure from a filesystem primitive.
    Collaborator,
}

#[derive(thiserror::Error, Debug)]
pub enum ShellError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("unsupported flags for {verb}: {}", .flags.join(" "))]
    UnsupportedFlags { verb: &'static str, flags: Vec<String> },

    #[error("{verb} expects {expected} argument(s), got {given}")]
    Arity {
        verb: &'static str,
        expected: &'static str,
        given: usize,
    },

    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not found in trash: {0}")]
    NotInTrash(String),

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("refusing to delete protected path {}", .0.display())]
    Safety(PathBuf),

    #[error("{} is a directory, -r is required", .0.display())]
    NeedsRecursive(PathBuf),

    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("{} is a directory", .0.display())]
    IsADirectory(PathBuf),

    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("I/O error while accessing {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Collaborator(String),
}

impl ShellError {
    /// Classifies an `io::Error` raised while touching `path`.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            io::ErrorKind::AlreadyExists => Self::AlreadyExists(path),
            _ => Self::Io { path, source },
        }
    }

    pub fn collaborator(message: impl Into<String>) -> Self {
        Self::Collaborator(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownCommand(_) | Self::UnsupportedFlags { .. } | Self::Arity { .. } => {
                ErrorKind::Validation
            }
            Self::NotFound(_) | Self::NotInTrash(_) => ErrorKind::NotFound,
            Self::PermissionDenied(_) => ErrorKind::Permission,
            Self::Safety(_) => ErrorKind::Safety,
            Self::NeedsRecursive(_)
            | Self::NotADirectory(_)
            | Self::IsADirectory(_)
            | Self::AlreadyExists(_)
            | Self::Io { .. }
            | Self::Collaborator(_) => ErrorKind::Collaborator,
        }
    }

    /// Message shown to the user in the configured language.
    pub fn localized(&self, i18n: &I18n) -> String {
        match self {
            Self::UnknownCommand(verb) => i18n.t_format("unknown_command", &[verb]),
            Self::UnsupportedFlags { verb, flags } => {
                i18n.t_format("unsupported_flags", &[verb, &flags.join(" ")])
            }
            Self::Arity {
                verb,
                expected,
                given,
            } => i18n.t_format("wrong_arity", &[verb, expected, &given.to_string()]),
            Self::NotFound(path) => i18n.t_format("not_found", &[&path.display().to_string()]),
            Self::NotInTrash(name) => i18n.t_format("not_in_trash", &[name]),
            Self::PermissionDenied(path) => {
                i18n.t_format("permission_denied", &[&path.display().to_string()])
            }
            Self::Safety(_) => i18n.t("safety_violation"),
            Self::NeedsRecursive(path) => {
                i18n.t_format("needs_recursive", &[&path.display().to_string()])
            }
            Self::NotADirectory(path) => {
                i18n.t_format("not_a_directory", &[&path.display().to_string()])
            }
            Self::IsADirectory(path) => {
                i18n.t_format("is_a_directory", &[&path.display().to_string()])
            }
            Self::AlreadyExists(path) => {
                i18n.t_format("already_exists", &[&path.display().to_string()])
            }
            Self::Io { path, source } => i18n.t_format(
                "io_error",
                &[&path.display().to_string(), &source.to_string()],
            ),
            Self::Collaborator(message) => i18n.t_format("collaborator_error", &[message]),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShellError>;
