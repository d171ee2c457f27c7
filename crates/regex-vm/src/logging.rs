//! Opt-in execution logging for the VM.
//!
//! Independent of whatever the `log` crate's global logger is set up to
//! do — this is a rolling in-memory trace a caller can inspect after a
//! `run` call to see which bytecode instructions a given input's threads
//! reached, useful when debugging why a pattern didn't match.

/// Logging verbosity for a [`crate::Vm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// No logging.
    #[default]
    None,
    /// One entry per input position processed.
    Steps,
    /// One entry per thread transition within each input position.
    Verbose,
}

/// A single recorded event from a `run` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmEvent {
    /// A new generation (input position) started with this many active
    /// threads.
    Generation { sidx: usize, thread_count: usize },
    /// A literal/any step consumed a byte and advanced a thread.
    Advance { step: usize, sidx: usize },
    /// The match instruction was reached at end of input.
    Matched { sidx: usize },
}

#[derive(Debug, Clone, Default)]
pub struct VmLog {
    pub(crate) level: LogLevel,
    pub(crate) events: Vec<VmEvent>,
}

impl VmLog {
    pub(crate) fn new(level: LogLevel) -> Self {
        Self {
            level,
            events: Vec::new(),
        }
    }

    pub(crate) fn generation(&mut self, sidx: usize, thread_count: usize) {
        if self.level >= LogLevel::Steps {
            self.events.push(VmEvent::Generation { sidx, thread_count });
        }
        log::trace!("vm: generation sidx={sidx} threads={thread_count}");
    }

    pub(crate) fn advance(&mut self, step: usize, sidx: usize) {
        if self.level == LogLevel::Verbose {
            self.events.push(VmEvent::Advance { step, sidx });
        }
    }

    pub(crate) fn matched(&mut self, sidx: usize) {
        if self.level >= LogLevel::Steps {
            self.events.push(VmEvent::Matched { sidx });
        }
        log::debug!("vm: matched at sidx={sidx}");
    }

    /// The recorded events, oldest first. Empty unless a log level above
    /// [`LogLevel::None`] was configured.
    pub fn events(&self) -> &[VmEvent] {
        &self.events
    }
}

impl PartialOrd for LogLevel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogLevel {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        fn rank(level: &LogLevel) -> u8 {
            match level {
                LogLevel::None => 0,
                LogLevel::Steps => 1,
                LogLevel::Verbose => 2,
            }
        }
        rank(self).cmp(&rank(other))
    }
}
