//! Errors the AArch64 backend can produce.

use std::fmt;
use std::io;

/// Failures compiling a bytecode program down to runnable native code.
#[derive(Debug)]
pub enum JitError {
    /// Reserving or permissioning the executable mapping failed.
    MapFailed { size: usize, source: io::Error },
    /// The generated instruction stream didn't fit in the reserved
    /// mapping.
    CodeTooLarge { words: usize, capacity: usize },
    /// The `external-assembler` feature's `clang`/`otool` round trip
    /// failed.
    #[cfg(feature = "external-assembler")]
    AssemblerFailed { stage: &'static str, source: io::Error },
}

impl fmt::Display for JitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JitError::MapFailed { size, source } => {
                write!(f, "failed to map {size} executable bytes: {source}")
            }
            JitError::CodeTooLarge { words, capacity } => write!(
                f,
                "generated code is {words} words, exceeds the {capacity}-word mapping"
            ),
            #[cfg(feature = "external-assembler")]
            JitError::AssemblerFailed { stage, source } => {
                write!(f, "external assembler failed during {stage}: {source}")
            }
        }
    }
}

impl std::error::Error for JitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JitError::MapFailed { source, .. } => Some(source),
            JitError::CodeTooLarge { .. } => None,
            #[cfg(feature = "external-assembler")]
            JitError::AssemblerFailed { source, .. } => Some(source),
        }
    }
}
