use std::io::{self, Write};

use anyhow::{Context, Result};
use colored::*;
use log::debug;

use crate::audit::AuditLogger;
use crate::dispatcher::{Dispatcher, Reply, Status};
use crate::interrupt::InterruptGate;

/// Read-eval-print loop around a [`Dispatcher`].
pub struct Shell {
    dispatcher: Dispatcher,
    gate: InterruptGate,
}

impl Shell {
    pub fn new(dispatcher: Dispatcher, gate: InterruptGate) -> Self {
        Self { dispatcher, gate }
    }

    /// Ctrl-C at the prompt exits right away; during a command the exit is
    /// deferred until the command has finished.
    pub fn install_interrupt_handler(&self) -> Result<()> {
        let gate = self.gate.clone();
        let farewell = self.dispatcher.i18n().t("exit_message");
        let audit = AuditLogger::new(self.dispatcher.audit().path().to_path_buf());

        ctrlc::set_handler(move || {
            if !gate.on_interrupt() {
                return;
            }
            audit.record("interrupted");
            println!("\n{}", farewell.yellow());
            let _ = io::stdout().flush();
            std::process::exit(130);
        })
        .context("cannot install the Ctrl-C handler")
    }

    pub fn run(&mut self) -> Result<()> {
        let i18n = self.dispatcher.i18n();
        let cwd = self.dispatcher.context().cwd.display().to_string();
        println!("{}", i18n.t("banner").green().bold());
        println!("{}", i18n.t_format("banner_cwd", &[&cwd]).dimmed());

        let mut line = String::new();
        loop {
            let prompt = format!("fsh:{}> ", self.dispatcher.context().cwd.display());
            print!("{}", prompt.cyan().bold());
            io::stdout().flush()?;

            line.clear();
            // stdin is locked per read so confirmation prompts can use it too
            let read = io::stdin()
                .read_line(&mut line)
                .with_context(|| self.dispatcher.i18n().t("error_read_input"))?;
            if read == 0 {
                println!();
                println!("{}", self.dispatcher.i18n().t("exit_message").yellow());
                break;
            }
            if !self.execute(&line).keep_going {
                break;
            }
        }
        Ok(())
    }

    /// Runs `commands` in order without prompting. Returns false if any of them failed.
    pub fn run_commands(&mut self, commands: &[String]) -> bool {
        let mut all_ok = true;
        for command in commands {
            debug!("non-interactive command {:?}", command);
            let step = self.execute(command);
            all_ok &= !step.failed;
            if !step.keep_going {
                break;
            }
        }
        all_ok
    }

    fn execute(&mut self, line: &str) -> Step {
        self.gate.begin_command();
        let reply = self.dispatcher.dispatch(line);
        let interrupted = self.gate.finish_command();

        render(&reply);
        let failed = reply.status == Status::Failed;
        if reply.status == Status::Exit {
            return Step::stop(failed);
        }
        if interrupted {
            self.dispatcher.audit().record("interrupted");
            println!("{}", self.dispatcher.i18n().t("exit_message").yellow());
            return Step::stop(failed);
        }
        Step {
            keep_going: true,
            failed,
        }
    }
}

struct Step {
    keep_going: bool,
    failed: bool,
}

impl Step {
    fn stop(failed: bool) -> Self {
        Self {
            keep_going: false,
            failed,
        }
    }
}

fn render(reply: &Reply) {
    for line in &reply.output {
        println!("{}", line);
    }
    let Some(message) = &reply.message else {
        return;
    };
    match reply.status {
        Status::Ok => println!("{}", message.green()),
        Status::Notice | Status::Exit => println!("{}", message.yellow()),
        Status::Failed => println!("{}", message.red()),
        Status::Idle => {}
    }
}
