//! Thompson VM interpreter: the portable default matcher.
//!
//! [`run`] (or [`Vm::run`] for a reusable, log-configurable instance)
//! executes a [`regex_bytecode::Program`] against a null-terminated
//! input with two instruction-offset sets and per-step generation
//! dedup, bounding total work to `O(|input| * |bytecode|)`.

mod logging;
mod plan;
mod vm;

pub use logging::{LogLevel, VmEvent, VmLog};
pub use vm::{run, Vm};
