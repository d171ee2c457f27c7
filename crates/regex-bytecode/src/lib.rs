//! Bytecode data model and compiler.
//!
//! A [`Program`] is a flat array of [`Instruction`]s plus a label table;
//! [`compile`] walks a normalized [`regex_ast::Node`] tree and emits one
//! per spec'd shape for each node kind.

mod compiler;
mod error;
mod program;

pub use compiler::{compile, Compiler};
pub use error::CompileError;
pub use program::{Instruction, Label, Program};
