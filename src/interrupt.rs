use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

const IDLE: u8 = 0;
const BUSY: u8 = 1;
const PROMPTING: u8 = 2;
const INTERRUPTED: u8 = 3;
const EXITING: u8 = 4;

/// Shared between the Ctrl-C handler and the shell loop.
///
/// Every transition is a single compare-and-swap, so "exit now" and "start a
/// command" can never both win: once the handler has claimed the exit, the
/// loop parks instead of touching the stores, and once a command has started
/// the handler only latches the interrupt.
#[derive(Clone, Default)]
pub struct InterruptGate(Arc<AtomicU8>);

impl InterruptGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called from the signal handler. Returns true when the process may exit right away.
    pub fn on_interrupt(&self) -> bool {
        let mut current = self.0.load(Ordering::SeqCst);
        loop {
            let next = match current {
                IDLE | PROMPTING => EXITING,
                BUSY => INTERRUPTED,
                _ => return false,
            };
            match self
                .0
                .compare_exchange(current, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return next == EXITING,
                Err(actual) => current = actual,
            }
        }
    }

    pub fn begin_command(&self) {
        if let Err(EXITING) = self.swap_from(IDLE, BUSY) {
            halt();
        }
    }

    /// Ends a command. Returns true if Ctrl-C was pressed while it ran.
    pub fn finish_command(&self) -> bool {
        match self.swap_from(BUSY, IDLE) {
            Ok(()) => false,
            Err(INTERRUPTED) => {
                self.0.store(IDLE, Ordering::SeqCst);
                true
            }
            Err(EXITING) => halt(),
            Err(_) => false,
        }
    }

    /// Marks a blocking confirmation read; Ctrl-C during it exits at once.
    pub fn enter_prompt(&self) {
        if let Err(EXITING) = self.swap_from(BUSY, PROMPTING) {
            halt();
        }
    }

    pub fn leave_prompt(&self) {
        if let Err(EXITING) = self.swap_from(PROMPTING, BUSY) {
            halt();
        }
    }

    fn swap_from(&self, from: u8, to: u8) -> std::result::Result<(), u8> {
        self.0
            .compare_exchange(from, to, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
    }
}

// The handler thread owns the exit from here on.
fn halt() -> ! {
    loop {
        std::thread::park();
    }
}
