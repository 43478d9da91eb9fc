//! Parsing of raw input lines into validated commands.

use crate::archive::ArchiveKind;
use crate::error::{Result, ShellError};

pub const FLAG_MARKER: char = '-';

/// Leading token of a command line.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Verb {
    List,
    ChangeDir,
    Show,
    Copy,
    Move,
    Delete,
    Zip,
    Tar,
    Unzip,
    Untar,
    Search,
    History,
    Undo,
    Help,
    Exit,
}

/// Allowed number of positional arguments.
#[derive(Debug, Clone, Copy)]
struct Arity {
    min: usize,
    max: Option<usize>,
    label: &'static str,
}

impl Arity {
    const fn exactly(n: usize, label: &'static str) -> Self {
        Self { min: n, max: Some(n), label }
    }

    const fn between(min: usize, max: usize, label: &'static str) -> Self {
        Self { min, max: Some(max), label }
    }

    const fn at_least(min: usize, label: &'static str) -> Self {
        Self { min, max: None, label }
    }

    fn accepts(&self, n: usize) -> bool {
        n >= self.min && self.max.map_or(true, |max| n <= max)
    }
}

impl Verb {
    pub const ALL: [Verb; 15] = [
        Verb::List,
        Verb::ChangeDir,
        Verb::Show,
        Verb::Copy,
        Verb::Move,
        Verb::Delete,
        Verb::Zip,
        Verb::Tar,
        Verb::Unzip,
        Verb::Untar,
        Verb::Search,
        Verb::History,
        Verb::Undo,
        Verb::Help,
        Verb::Exit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "ls",
            Self::ChangeDir => "cd",
            Self::Show => "cat",
            Self::Copy => "cp",
            Self::Move => "mv",
            Self::Delete => "rm",
            Self::Zip => "zip",
            Self::Tar => "tar",
            Self::Unzip => "unzip",
            Self::Untar => "untar",
            Self::Search => "grep",
            Self::History => "history",
            Self::Undo => "undo",
            Self::Help => "help",
            Self::Exit => "exit",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|verb| verb.as_str() == token)
    }

    pub fn allowed_flags(&self) -> &'static [&'static str] {
        match self {
            Self::List => &["-l"],
            Self::Copy | Self::Delete => &["-r"],
            Self::Search => &["-r", "-i"],
            _ => &[],
        }
    }

    fn arity(&self) -> Arity {
        match self {
            Self::List | Self::ChangeDir | Self::History => Arity::between(0, 1, "0-1"),
            Self::Show | Self::Delete | Self::Unzip | Self::Untar => Arity::exactly(1, "1"),
            Self::Copy | Self::Move | Self::Zip | Self::Tar => Arity::exactly(2, "2"),
            Self::Search => Arity::at_least(2, "2+"),
            Self::Undo | Self::Help | Self::Exit => Arity::exactly(0, "0"),
        }
    }

    /// Meta verbs are never written to history.
    pub fn is_recorded(&self) -> bool {
        !matches!(self, Self::History | Self::Undo | Self::Help | Self::Exit)
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Command {
    List { path: Option<String>, detailed: bool },
    ChangeDir { path: Option<String> },
    Show { path: String },
    Copy { src: String, dst: String, recursive: bool },
    Move { src: String, dst: String },
    Delete { path: String, recursive: bool },
    Pack { kind: ArchiveKind, folder: String, archive: String },
    Unpack { kind: ArchiveKind, archive: String },
    Search { pattern: String, path: String, recursive: bool, ignore_case: bool },
    /// `None` means the configured default window.
    History { count: Option<usize> },
    Undo,
    Help,
    Exit,
}

impl Command {
    /// Parses one input line. Blank input yields `Ok(None)`.
    ///
    /// Flags are validated against the verb before arity; both failures are
    /// reported without any side effect.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let mut tokens = line.split_whitespace();
        let Some(head) = tokens.next() else {
            return Ok(None);
        };
        let verb =
            Verb::from_token(head).ok_or_else(|| ShellError::UnknownCommand(head.to_string()))?;

        let (flags, args): (Vec<&str>, Vec<&str>) =
            tokens.partition(|token| is_flag(verb, token));

        let unsupported: Vec<String> = flags
            .iter()
            .filter(|flag| !verb.allowed_flags().iter().any(|allowed| allowed == *flag))
            .map(|flag| flag.to_string())
            .collect();
        if !unsupported.is_empty() {
            return Err(ShellError::UnsupportedFlags {
                verb: verb.as_str(),
                flags: unsupported,
            });
        }

        let arity = verb.arity();
        if !arity.accepts(args.len()) {
            return Err(ShellError::Arity {
                verb: verb.as_str(),
                expected: arity.label,
                given: args.len(),
            });
        }

        let has = |flag: &str| flags.contains(&flag);
        let arg = |idx: usize| args[idx].to_string();

        let command = match verb {
            Verb::List => Command::List {
                path: args.first().map(|s| s.to_string()),
                detailed: has("-l"),
            },
            Verb::ChangeDir => Command::ChangeDir {
                path: args.first().map(|s| s.to_string()),
            },
            Verb::Show => Command::Show { path: arg(0) },
            Verb::Copy => Command::Copy {
                src: arg(0),
                dst: arg(1),
                recursive: has("-r"),
            },
            Verb::Move => Command::Move {
                src: arg(0),
                dst: arg(1),
            },
            Verb::Delete => Command::Delete {
                path: arg(0),
                recursive: has("-r"),
            },
            Verb::Zip | Verb::Tar => Command::Pack {
                kind: archive_kind(verb),
                folder: arg(0),
                archive: arg(1),
            },
            Verb::Unzip | Verb::Untar => Command::Unpack {
                kind: archive_kind(verb),
                archive: arg(0),
            },
            Verb::Search => {
                let last = args.len() - 1;
                Command::Search {
                    pattern: args[..last].join(" "),
                    path: arg(last),
                    recursive: has("-r"),
                    ignore_case: has("-i"),
                }
            }
            Verb::History => Command::History {
                count: args.first().and_then(|raw| parse_count(raw)),
            },
            Verb::Undo => Command::Undo,
            Verb::Help => Command::Help,
            Verb::Exit => Command::Exit,
        };
        Ok(Some(command))
    }

    pub fn verb(&self) -> Verb {
        match self {
            Self::List { .. } => Verb::List,
            Self::ChangeDir { .. } => Verb::ChangeDir,
            Self::Show { .. } => Verb::Show,
            Self::Copy { .. } => Verb::Copy,
            Self::Move { .. } => Verb::Move,
            Self::Delete { .. } => Verb::Delete,
            Self::Pack { kind: ArchiveKind::Zip, .. } => Verb::Zip,
            Self::Pack { kind: ArchiveKind::TarGz, .. } => Verb::Tar,
            Self::Unpack { kind: ArchiveKind::Zip, .. } => Verb::Unzip,
            Self::Unpack { kind: ArchiveKind::TarGz, .. } => Verb::Untar,
            Self::Search { .. } => Verb::Search,
            Self::History { .. } => Verb::History,
            Self::Undo => Verb::Undo,
            Self::Help => Verb::Help,
            Self::Exit => Verb::Exit,
        }
    }
}

// `history -3` carries a negative count, not a flag.
fn is_flag(verb: Verb, token: &str) -> bool {
    if !token.starts_with(FLAG_MARKER) {
        return false;
    }
    !(verb == Verb::History && token.parse::<i64>().is_ok())
}

fn archive_kind(verb: Verb) -> ArchiveKind {
    match verb {
        Verb::Tar | Verb::Untar => ArchiveKind::TarGz,
        _ => ArchiveKind::Zip,
    }
}

// Numeric counts are clamped at zero; anything else means "use the default".
fn parse_count(raw: &str) -> Option<usize> {
    raw.parse::<i64>().ok().map(|n| n.max(0) as usize)
}
