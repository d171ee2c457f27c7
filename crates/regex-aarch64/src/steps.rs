//! Micro-step expansion, mirroring `regex-vm`'s plan builder.
//!
//! The AArch64 backend needs the same one-step-per-input-byte expansion
//! of multi-byte `Literal` instructions that the interpreter does (see
//! `regex-vm`'s module docs) — the generated code's current/next/history
//! arrays are sized and indexed by micro-step, not by bytecode
//! instruction, and a compressed literal becomes a chain of per-byte
//! compare micro-routines, exactly the "longer literals need multiple
//! instructions" the original AArch64 design already called for.

use regex_bytecode::{Instruction, Program};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Step {
    Literal { byte: u8 },
    Any,
    Jmp(usize),
    Split(usize, usize),
    Match,
}

pub(crate) fn build(program: &Program) -> Vec<Step> {
    let instructions = program.instructions();

    let mut instruction_start = Vec::with_capacity(instructions.len());
    let mut count = 0usize;
    for inst in instructions {
        instruction_start.push(count);
        count += match inst {
            Instruction::Literal { text } => text.len().max(1),
            _ => 1,
        };
    }
    let resolve = |label: regex_bytecode::Label| instruction_start[program.resolve(label)];

    let mut steps = Vec::with_capacity(count);
    for inst in instructions {
        match inst {
            Instruction::Literal { text } if text.is_empty() => {
                steps.push(Step::Jmp(steps.len() + 1));
            }
            Instruction::Literal { text } => {
                for byte in text.bytes() {
                    steps.push(Step::Literal { byte });
                }
            }
            Instruction::Any => steps.push(Step::Any),
            Instruction::Match => steps.push(Step::Match),
            Instruction::Jmp(label) => steps.push(Step::Jmp(resolve(*label))),
            Instruction::Split(a, b) => steps.push(Step::Split(resolve(*a), resolve(*b))),
        }
    }
    steps
}
