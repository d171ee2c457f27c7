//! A small regex engine: parse a pattern, compile it to Thompson-style
//! bytecode, and run it either on the portable interpreter (`regex-vm`)
//! or, with the `jit` feature on an AArch64 host, on natively compiled
//! code (`regex-aarch64`). Both backends implement the exact same
//! algorithm and agree on every input/pattern pair — see the
//! `vm_and_jit_agree` integration test.
//!
//! ```
//! use regex_engine::compile_bytecode;
//! use std::ffi::CString;
//!
//! let program = compile_bytecode("(hello|world)+").unwrap();
//! let input = CString::new("helloworld").unwrap();
//! assert!(regex_engine::run(&program, &input));
//! ```

mod error;

pub use error::Error;
pub use regex_ast::Node;
pub use regex_bytecode::{Instruction, Program};
#[cfg(feature = "jit")]
pub use regex_aarch64::MatchFn;

use std::ffi::CStr;

/// Parse and normalize `pattern`, then compile it to a [`Program`].
/// Matching that program against an input runs in
/// `O(|input| * |pattern|)` regardless of the pattern's shape.
pub fn compile_bytecode(pattern: &str) -> Result<Program, Error> {
    let node = regex_parser::parse(pattern)?;
    let node = regex_ast::eliminate_single_sequences(node);
    let mut node = node;
    regex_ast::compress_literals(&mut node);
    log::debug!("compiled pattern {pattern:?} to: {node}");
    Ok(regex_bytecode::compile(&node)?)
}

/// Run a compiled program against a null-terminated input on the
/// portable interpreter.
pub fn run(program: &Program, input: &CStr) -> bool {
    regex_vm::run(program, input)
}

/// Parse, compile, and JIT-compile `pattern` for an AArch64 host,
/// returning a callable [`MatchFn`]. Implies [`compile_bytecode`].
#[cfg(feature = "jit")]
pub fn compile_jit(pattern: &str) -> Result<MatchFn, Error> {
    let program = compile_bytecode(pattern)?;
    Ok(regex_aarch64::compile(&program)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn matches(pattern: &str, input: &str) -> bool {
        let program = compile_bytecode(pattern).unwrap();
        run(&program, &CString::new(input).unwrap())
    }

    #[test]
    fn literal_scenario() {
        assert!(matches("123", "123"));
        assert!(!matches("123", "12"));
    }

    #[test]
    fn alternate_scenario() {
        assert!(matches("a|b", "a"));
        assert!(!matches("a|b", "c"));
    }

    #[test]
    fn any_scenario() {
        assert!(matches("a.c", "abc"));
        assert!(!matches("a.c", "ac"));
    }

    #[test]
    fn star_scenario() {
        assert!(matches("1*", ""));
        assert!(matches("1*", "1111"));
        assert!(!matches("1*", "1112"));
    }

    #[test]
    fn group_plus_scenario() {
        assert!(matches("(hello|world)+", "helloworldhello"));
        assert!(!matches("(hello|world)+", "helloworl"));
    }

    #[test]
    fn nested_group_scenario() {
        let pattern = "(hello|world(0|1|2|3)?)+";
        assert!(matches(pattern, "hellohelloworld3"));
        assert!(!matches(pattern, "hellohelloworld4"));
    }

    #[test]
    fn invalid_pattern_reports_offset() {
        let err = compile_bytecode("a)").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
