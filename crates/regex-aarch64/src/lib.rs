//! AArch64 JIT backend: compiles a [`regex_bytecode::Program`] directly
//! to native machine code instead of interpreting it.
//!
//! [`compile`] lowers the program (see [`lower`]) and maps the result
//! into executable memory (see [`loader`]), returning a [`loader::MatchFn`]
//! that runs at native speed. The generated code implements the same
//! Thompson-VM algorithm `regex-vm` interprets — same current/next
//! instruction sets, same per-step generation dedup — just compiled
//! rather than stepped through.

mod encode;
mod error;
#[cfg(feature = "external-assembler")]
mod external_assembler;
mod loader;
mod lower;
mod regs;
mod steps;

pub use error::JitError;
pub use loader::MatchFn;

/// Compile `program` to native AArch64 code and load it into executable
/// memory.
pub fn compile(program: &regex_bytecode::Program) -> Result<MatchFn, JitError> {
    let words = lower::lower(program);
    loader::load(&words)
}

/// Assemble and disassemble `program`'s lowered words through a real
/// toolchain, returning whether the round trip reproduces the same
/// words our direct encoder produced. For development use only — a
/// mismatch means [`encode`] has drifted from the instructions clang
/// actually emits for the same mnemonics.
#[cfg(feature = "external-assembler")]
pub fn check_against_external_assembler(
    program: &regex_bytecode::Program,
) -> Result<bool, JitError> {
    let words = lower::lower(program);
    let roundtripped = external_assembler::round_trip(&words)?;
    Ok(roundtripped == words)
}
