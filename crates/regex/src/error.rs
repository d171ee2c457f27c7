//! Top-level error type composing each stage's own error.

use std::fmt;

use regex_bytecode::CompileError;
use regex_parser::ParseError;

/// Anything that can go wrong turning a pattern string into a runnable
/// matcher.
#[derive(Debug)]
pub enum Error {
    Parse(ParseError),
    Compile(CompileError),
    #[cfg(feature = "jit")]
    Jit(regex_aarch64::JitError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "{e}"),
            Error::Compile(e) => write!(f, "{e}"),
            #[cfg(feature = "jit")]
            Error::Jit(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(e) => Some(e),
            Error::Compile(e) => Some(e),
            #[cfg(feature = "jit")]
            Error::Jit(e) => Some(e),
        }
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<CompileError> for Error {
    fn from(e: CompileError) -> Self {
        Error::Compile(e)
    }
}

#[cfg(feature = "jit")]
impl From<regex_aarch64::JitError> for Error {
    fn from(e: regex_aarch64::JitError) -> Self {
        Error::Jit(e)
    }
}
