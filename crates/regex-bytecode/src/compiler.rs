//! The bytecode compiler.
//!
//! Each AST node kind has a fixed emission shape (see the per-node match
//! arms below); labels are handed out in emission order via
//! [`Compiler::create_label`], which records the *current* instruction
//! offset — by the time a `Split`/`Jmp` needs to reference a label, the
//! label has already been created at the right position, so there's no
//! backpatching pass, only filling in the `Split`/`Jmp` instruction's own
//! fields once both of its targets are known.

use regex_ast::{Node, RepeatBound};

use crate::error::CompileError;
use crate::program::{Instruction, Label, Program};

/// Default instruction cap, mirroring the original compiler's fixed
/// 1000-entry program array while staying a configurable soft limit
/// instead of a hard allocation size.
const DEFAULT_MAX_INSTRUCTIONS: usize = 1 << 20;

pub struct Compiler {
    program: Program,
    max_instructions: usize,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            program: Program::default(),
            max_instructions: DEFAULT_MAX_INSTRUCTIONS,
        }
    }

    /// Override the instruction cap enforced during compilation.
    pub fn with_max_instructions(mut self, limit: usize) -> Self {
        self.max_instructions = limit;
        self
    }

    /// Compile a normalized AST into a bytecode [`Program`].
    pub fn compile(mut self, node: &Node) -> Result<Program, CompileError> {
        self.emit_node(node)?;
        self.emit(Instruction::Match)?;
        log::debug!(
            "compiled pattern into {} bytecode instructions",
            self.program.len()
        );
        Ok(self.program)
    }

    fn emit(&mut self, inst: Instruction) -> Result<usize, CompileError> {
        if self.program.instructions.len() >= self.max_instructions {
            return Err(CompileError::CapacityExceeded {
                limit: self.max_instructions,
            });
        }
        let idx = self.program.instructions.len();
        log::trace!("emit[{idx}] = {inst:?}");
        self.program.instructions.push(inst);
        Ok(idx)
    }

    /// Record a label pointing at the next instruction to be emitted.
    fn create_label(&mut self) -> Label {
        let label = Label(self.program.labels.len());
        let target = self.program.instructions.len();
        log::trace!("label {label:?} -> instruction {target}");
        self.program.labels.push(target);
        label
    }

    fn set_split(&mut self, idx: usize, a: Label, b: Label) {
        self.program.instructions[idx] = Instruction::Split(a, b);
    }

    fn set_jmp(&mut self, idx: usize, target: Label) {
        self.program.instructions[idx] = Instruction::Jmp(target);
    }

    fn emit_node(&mut self, node: &Node) -> Result<(), CompileError> {
        match node {
            Node::Literal { text, .. } => {
                self.emit(Instruction::Literal { text: text.clone() })?;
            }
            Node::Any => {
                self.emit(Instruction::Any)?;
            }
            Node::Sequence(items) => {
                for item in items {
                    self.emit_node(item)?;
                }
            }
            Node::Alternate(a, b) => {
                // placeholder targets get overwritten once both branch
                // labels are known.
                let split_idx = self.emit(Instruction::Split(Label(0), Label(0)))?;
                let label_a = self.create_label();
                self.emit_node(a)?;

                let jmp_idx = self.emit(Instruction::Jmp(Label(0)))?;
                let label_b = self.create_label();
                self.emit_node(b)?;

                let label_end = self.create_label();
                self.set_jmp(jmp_idx, label_end);
                self.set_split(split_idx, label_a, label_b);
            }
            Node::Repeat { child, bound } => self.emit_repeat(child, *bound)?,
        }
        Ok(())
    }

    fn emit_repeat(&mut self, child: &Node, bound: RepeatBound) -> Result<(), CompileError> {
        match (bound.min, bound.max) {
            (0, Some(1)) => {
                // SPLIT L_in, L_out / L_in: child / L_out:
                let split_idx = self.emit(Instruction::Split(Label(0), Label(0)))?;
                let label_in = self.create_label();
                self.emit_node(child)?;
                let label_out = self.create_label();
                self.set_split(split_idx, label_in, label_out);
            }
            (0, None) => {
                // L_top: SPLIT L_in, L_out / L_in: child / JMP L_top / L_out:
                let label_top = self.create_label();
                let split_idx = self.emit(Instruction::Split(Label(0), Label(0)))?;
                let label_in = self.create_label();
                self.emit_node(child)?;
                self.emit(Instruction::Jmp(label_top))?;
                let label_out = self.create_label();
                self.set_split(split_idx, label_in, label_out);
            }
            (1, None) => {
                // L_top: child / SPLIT L_top, L_out / L_out:
                let label_top = self.create_label();
                self.emit_node(child)?;
                let split_idx = self.emit(Instruction::Split(Label(0), Label(0)))?;
                let label_out = self.create_label();
                self.set_split(split_idx, label_top, label_out);
            }
            (min, max) => return Err(CompileError::UnsupportedRepeatBound { min, max }),
        }
        Ok(())
    }
}

/// Compile a normalized AST into a bytecode program with the default
/// instruction cap.
pub fn compile(node: &Node) -> Result<Program, CompileError> {
    Compiler::new().compile(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(text: &str) -> Node {
        Node::Literal {
            offset: 0,
            text: text.to_string(),
        }
    }

    #[test]
    fn compiles_literal_then_match() {
        let program = compile(&lit("a")).unwrap();
        assert_eq!(
            program.instructions(),
            &[
                Instruction::Literal { text: "a".into() },
                Instruction::Match,
            ]
        );
    }

    #[test]
    fn compiles_any() {
        let program = compile(&Node::Any).unwrap();
        assert_eq!(program.instructions(), &[Instruction::Any, Instruction::Match]);
    }

    #[test]
    fn compiles_alternate_with_valid_labels() {
        let node = Node::Alternate(Box::new(lit("a")), Box::new(lit("b")));
        let program = compile(&node).unwrap();
        // split, literal a, jmp, literal b, match
        assert_eq!(program.len(), 5);
        match program.instructions()[0] {
            Instruction::Split(a, b) => {
                assert_eq!(program.resolve(a), 1);
                assert_eq!(program.resolve(b), 3);
            }
            _ => panic!("expected split"),
        }
        match program.instructions()[2] {
            Instruction::Jmp(end) => assert_eq!(program.resolve(end), 4),
            _ => panic!("expected jmp"),
        }
        assert_eq!(program.instructions().last(), Some(&Instruction::Match));
    }

    #[test]
    fn compiles_question_mark() {
        let node = Node::Repeat {
            child: Box::new(lit("a")),
            bound: RepeatBound::QUESTION,
        };
        let program = compile(&node).unwrap();
        // split, literal a, match
        assert_eq!(program.len(), 3);
        match program.instructions()[0] {
            Instruction::Split(in_label, out_label) => {
                assert_eq!(program.resolve(in_label), 1);
                assert_eq!(program.resolve(out_label), 2);
            }
            _ => panic!("expected split"),
        }
    }

    #[test]
    fn compiles_star_with_backward_jmp() {
        let node = Node::Repeat {
            child: Box::new(lit("a")),
            bound: RepeatBound::STAR,
        };
        let program = compile(&node).unwrap();
        // split, literal a, jmp(top), match
        assert_eq!(program.len(), 4);
        match program.instructions()[0] {
            Instruction::Split(in_label, out_label) => {
                assert_eq!(program.resolve(in_label), 1);
                assert_eq!(program.resolve(out_label), 3);
            }
            _ => panic!("expected split"),
        }
        match program.instructions()[2] {
            Instruction::Jmp(top) => assert_eq!(program.resolve(top), 0),
            _ => panic!("expected jmp"),
        }
    }

    #[test]
    fn compiles_plus_with_trailing_split() {
        let node = Node::Repeat {
            child: Box::new(lit("a")),
            bound: RepeatBound::PLUS,
        };
        let program = compile(&node).unwrap();
        // literal a, split, match
        assert_eq!(program.len(), 3);
        match program.instructions()[1] {
            Instruction::Split(top, out_label) => {
                assert_eq!(program.resolve(top), 0);
                assert_eq!(program.resolve(out_label), 2);
            }
            _ => panic!("expected split"),
        }
    }

    #[test]
    fn rejects_unsupported_repeat_bound() {
        let node = Node::Repeat {
            child: Box::new(lit("a")),
            bound: regex_ast::RepeatBound { min: 2, max: Some(4) },
        };
        let err = compile(&node).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnsupportedRepeatBound {
                min: 2,
                max: Some(4)
            }
        );
    }

    #[test]
    fn final_instruction_is_always_match() {
        let node = Node::Sequence(vec![lit("a"), lit("b")]);
        let program = compile(&node).unwrap();
        assert_eq!(program.instructions().last(), Some(&Instruction::Match));
    }

    #[test]
    fn enforces_instruction_cap() {
        let node = Node::Repeat {
            child: Box::new(lit("a")),
            bound: RepeatBound::STAR,
        };
        let err = Compiler::new()
            .with_max_instructions(2)
            .compile(&node)
            .unwrap_err();
        assert_eq!(err, CompileError::CapacityExceeded { limit: 2 });
    }
}
