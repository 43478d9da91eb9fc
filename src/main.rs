mod archive;
mod audit;
mod command;
mod config;
mod context;
mod dispatcher;
mod error;
mod fs_ops;
mod history;
mod i18n;
mod interrupt;
mod prompt;
mod search;
mod shell;
mod trash;
mod undo;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use std::fs;
use std::path::PathBuf;

use config::Config;
use context::ShellContext;
use dispatcher::{Dispatcher, Settings};
use i18n::I18n;
use interrupt::InterruptGate;
use prompt::{AutoConfirm, Confirm, StdinConfirm};
use shell::Shell;

#[derive(Parser)]
#[command(name = "fsh", version)]
#[command(about = "File shell with history, audit log and undo")]
struct Cli {
    /// Directory holding .history, shell.log and .trash (default: the launch directory)
    #[arg(long = "state-dir")]
    state_dir: Option<PathBuf>,

    /// Message language (en, ru)
    #[arg(long)]
    lang: Option<String>,

    /// Run the given command line instead of prompting; may be repeated
    #[arg(short = 'c', long = "command")]
    commands: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = Config::new()?;
    if let Some(lang) = cli.lang.or_else(|| std::env::var("FSH_LANG").ok()) {
        config.display.language = lang;
    }
    if let Some(dir) = cli
        .state_dir
        .or_else(|| std::env::var_os("FSH_STATE_DIR").map(PathBuf::from))
    {
        config.storage.state_dir = dir.to_string_lossy().into_owned();
    }
    let i18n = I18n::new(&config.get_effective_language());

    let cwd = std::env::current_dir()
        .and_then(fs::canonicalize)
        .with_context(|| i18n.t("error_resolve_cwd"))?;
    let home = dirs::home_dir().unwrap_or_else(|| cwd.clone());

    let paths = config.state_paths(&cwd);
    fs::create_dir_all(&paths.root).with_context(|| {
        format!("{}: {}", i18n.t("error_create_state_dir"), paths.root.display())
    })?;
    debug!("state kept under {}", paths.root.display());

    let gate = InterruptGate::new();
    let confirm: Box<dyn Confirm> = if config.behavior.confirm_recursive_delete {
        Box::new(StdinConfirm::new(i18n.t("confirm_delete_dir")).with_gate(gate.clone()))
    } else {
        Box::new(AutoConfirm(true))
    };
    let settings = Settings {
        history_default: config.display.history_default,
        restore_on_failed_undo: config.history.restore_on_failed_undo,
    };

    let dispatcher = Dispatcher::new(ShellContext::new(cwd, home), &paths, i18n, confirm, settings);
    let mut shell = Shell::new(dispatcher, gate);
    shell.install_interrupt_handler()?;

    if cli.commands.is_empty() {
        shell.run()
    } else if shell.run_commands(&cli.commands) {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
