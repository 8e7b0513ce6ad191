//! Command-bus test doubles.

use parking_lot::Mutex;
use std::sync::Arc;
use uow_core::{Command, CommandBus, UowError, UowResult};

/// A bus that records every dispatched command for later assertions.
#[derive(Default)]
pub struct RecordingBus {
    commands: Arc<Mutex<Vec<Command>>>,
}

impl RecordingBus {
    /// Creates a new recording bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle to the recorded commands, shared with the bus.
    #[must_use]
    pub fn commands(&self) -> Arc<Mutex<Vec<Command>>> {
        self.commands.clone()
    }
}

impl CommandBus for RecordingBus {
    fn dispatch(&mut self, command: Command) -> UowResult<()> {
        self.commands.lock().push(command);
        Ok(())
    }
}

/// A bus that fails after dispatching a fixed number of commands, for
/// exercising mid-commit dispatch failures.
pub struct FailingBus {
    succeed_first: usize,
    dispatched: Arc<Mutex<Vec<Command>>>,
}

impl FailingBus {
    /// Creates a bus that accepts `succeed_first` commands, then fails.
    #[must_use]
    pub fn new(succeed_first: usize) -> Self {
        Self {
            succeed_first,
            dispatched: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns a handle to the successfully dispatched commands.
    #[must_use]
    pub fn dispatched(&self) -> Arc<Mutex<Vec<Command>>> {
        self.dispatched.clone()
    }
}

impl CommandBus for FailingBus {
    fn dispatch(&mut self, command: Command) -> UowResult<()> {
        let mut dispatched = self.dispatched.lock();
        if dispatched.len() >= self.succeed_first {
            return Err(UowError::runtime("persistence layer rejected the command"));
        }
        dispatched.push(command);
        Ok(())
    }
}
