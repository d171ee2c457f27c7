//! Lowers a [`regex_bytecode::Program`] into a standalone AArch64
//! function body: `fn(*const u8) -> bool`, taking a null-terminated
//! input pointer in `x0` and returning a boolean in `x0`.
//!
//! The overall shape — a prologue that zeroes a history array and seeds
//! the current set, an outer loop over input bytes with an inner loop
//! over the current set dispatching through `br` to per-instruction
//! micro-routines, and a swap-and-advance epilogue per byte — follows
//! the original source's `vm2arm.c` structure directly. What's
//! different here is that labels are resolved with an explicit two-pass
//! fixup table instead of handing textual labels to an external
//! assembler: every branch/`adr` is emitted with a placeholder immediate
//! and recorded, then patched once every label's final word offset is
//! known.

use std::collections::HashMap;

use regex_bytecode::Program;

use crate::encode::{self, Cond};
use crate::regs::Reg;
use crate::steps::{self, Step};

enum Target {
    Named(String),
    Step(usize),
}

enum FixupKind {
    B,
    BCond(Cond),
    Cbz(Reg),
    Adr(Reg),
}

struct Fixup {
    word_idx: usize,
    kind: FixupKind,
    target: Target,
}

struct Emitter {
    words: Vec<u32>,
    named: HashMap<String, usize>,
    step_labels: Vec<usize>,
    fixups: Vec<Fixup>,
}

impl Emitter {
    fn new(step_count: usize) -> Self {
        Self {
            words: Vec::new(),
            named: HashMap::new(),
            step_labels: vec![usize::MAX; step_count],
            fixups: Vec::new(),
        }
    }

    fn emit(&mut self, word: u32) {
        self.words.push(word);
    }

    fn here(&self) -> usize {
        self.words.len()
    }

    fn place_named(&mut self, name: &str) {
        self.named.insert(name.to_string(), self.here());
    }

    fn place_step(&mut self, step: usize) {
        self.step_labels[step] = self.here();
    }

    fn branch_named(&mut self, kind: FixupKind, name: &str) {
        let word_idx = self.here();
        self.emit(0);
        self.fixups.push(Fixup {
            word_idx,
            kind,
            target: Target::Named(name.to_string()),
        });
    }

    fn branch_step(&mut self, kind: FixupKind, step: usize) {
        let word_idx = self.here();
        self.emit(0);
        self.fixups.push(Fixup {
            word_idx,
            kind,
            target: Target::Step(step),
        });
    }

    fn resolve_target(&self, target: &Target) -> usize {
        match target {
            Target::Named(name) => *self
                .named
                .get(name)
                .unwrap_or_else(|| panic!("unresolved label {name}")),
            Target::Step(step) => {
                let idx = self.step_labels[*step];
                assert_ne!(idx, usize::MAX, "step {step} was never placed");
                idx
            }
        }
    }

    fn finish(mut self) -> Vec<u32> {
        for fixup in &self.fixups {
            let target_word = self.resolve_target(&fixup.target);
            let word = match fixup.kind {
                FixupKind::B => encode::b(target_word as i32 - fixup.word_idx as i32),
                FixupKind::BCond(cond) => {
                    encode::b_cond(target_word as i32 - fixup.word_idx as i32, cond)
                }
                FixupKind::Cbz(reg) => {
                    encode::cbz(reg, target_word as i32 - fixup.word_idx as i32)
                }
                FixupKind::Adr(reg) => {
                    encode::adr((target_word as i32 - fixup.word_idx as i32) * 4, reg)
                }
            };
            self.words[fixup.word_idx] = word;
        }
        self.words
    }
}

/// Bytes of stack space the generated function reserves for its own use,
/// beyond the caller's frame: the current/next/history arrays (`8` bytes
/// per micro-step each) plus 16 bytes to save `fp`/`lr`, rounded up to
/// the 16-byte stack alignment AArch64 requires.
fn frame_size(step_count: usize) -> u32 {
    let body = 3 * 8 * step_count as u32;
    (16 + body + 15) & !15
}

/// Emit the machine code for `program`, returning the raw instruction
/// words and the frame size [`crate::loader`] needs to know nothing
/// about — callers just jump to word 0.
pub(crate) fn lower(program: &Program) -> Vec<u32> {
    let steps = steps::build(program);
    let n = steps.len();
    let frame = frame_size(n);
    let next_off = 8 * n as u32;
    let hist_off = 16 * n as u32;

    let mut e = Emitter::new(n);

    // Prologue.
    e.emit(encode::sub_imm(Reg::SP, frame, Reg::SP));
    e.emit(encode::str_imm_sp(frame - 16, Reg::FP));
    e.emit(encode::str_imm_sp(frame - 8, Reg::LR));
    e.emit(encode::mov_reg(Reg::X0, Reg::SPTR));
    e.emit(encode::mov_imm(Reg::X0, 0));
    e.emit(encode::mov_imm(Reg::SIDX, 0));
    e.emit(encode::add_imm(Reg::SP, 0, Reg::CURR_BASE));
    e.emit(encode::mov_imm(Reg::CURR_IDX, 0));
    e.emit(encode::mov_imm(Reg::CURR_LEN, 1));
    e.emit(encode::add_imm(Reg::SP, 0, Reg::NEXT_BASE));
    if next_off > 0 {
        e.emit(encode::add_imm(Reg::NEXT_BASE, next_off, Reg::NEXT_BASE));
    }
    e.emit(encode::mov_imm(Reg::NEXT_IDX, 0));
    e.emit(encode::add_imm(Reg::SP, 0, Reg::HIST_BASE));
    if hist_off > 0 {
        e.emit(encode::add_imm(Reg::HIST_BASE, hist_off, Reg::HIST_BASE));
    }

    // Zero the packed history slots: every slot's both halfwords get set
    // to an all-ones sentinel generation that no real `sidx` ever equals.
    e.emit(encode::mov_imm(Reg::TMP, 0));
    e.place_named("zero_hist_loop");
    e.emit(encode::mov_neg1(Reg::TMP2));
    e.emit(encode::str_reg(Reg::HIST_BASE, Reg::TMP, Reg::TMP2));
    e.emit(encode::add_imm(Reg::TMP, 1, Reg::TMP));
    e.emit(encode::cmp_imm(Reg::TMP, n as u32));
    e.branch_named(FixupKind::BCond(Cond::Lt), "zero_hist_loop");

    // Seed the current set with step 0.
    e.branch_step(FixupKind::Adr(Reg::TMP), 0);
    e.emit(encode::str_imm_sp(0, Reg::TMP));

    // Main loop.
    e.place_named("the_loop");
    e.emit(encode::ldrb_reg(Reg::SPTR, Reg::SIDX, Reg::CHAR));
    e.emit(encode::cmp_imm(Reg::CURR_LEN, 0));
    e.branch_named(FixupKind::BCond(Cond::Eq), "FIN");

    e.place_named("loop_inner");
    e.emit(encode::ldr_reg(Reg::CURR_BASE, Reg::CURR_IDX, Reg::RUN_PC));
    e.emit(encode::br(Reg::RUN_PC));

    e.place_named("bytecode_instr_done");
    e.emit(encode::add_imm(Reg::CURR_IDX, 1, Reg::CURR_IDX));
    e.emit(encode::cmp_reg(Reg::CURR_IDX, Reg::CURR_LEN));
    e.branch_named(FixupKind::BCond(Cond::Lt), "loop_inner");

    // Swap current/next base pointers through TMP, reset current's
    // cursor, carry next's length over as current's new length.
    e.emit(encode::mov_reg(Reg::CURR_BASE, Reg::TMP));
    e.emit(encode::mov_reg(Reg::NEXT_BASE, Reg::CURR_BASE));
    e.emit(encode::mov_reg(Reg::TMP, Reg::NEXT_BASE));
    e.emit(encode::mov_imm(Reg::CURR_IDX, 0));
    e.emit(encode::mov_reg(Reg::NEXT_IDX, Reg::CURR_LEN));
    e.emit(encode::mov_imm(Reg::NEXT_IDX, 0));
    e.emit(encode::add_imm(Reg::SIDX, 1, Reg::SIDX));
    e.emit(encode::cmp_imm(Reg::CHAR, 0));
    e.branch_named(FixupKind::BCond(Cond::Ne), "the_loop");
    e.branch_named(FixupKind::B, "FIN");

    // Per-micro-step routines.
    let mut split_counter = 0usize;
    for (idx, step) in steps.iter().enumerate() {
        e.place_step(idx);
        match step {
            Step::Literal { byte } => {
                e.emit(encode::cmp_imm(Reg::CHAR, *byte as u32));
                e.branch_named(FixupKind::BCond(Cond::Ne), "bytecode_instr_done");
                emit_push_next(&mut e, idx + 1);
                e.branch_named(FixupKind::B, "bytecode_instr_done");
            }
            Step::Any => {
                // The original source's ARM backend pushes unconditionally
                // here, which would let `.` also consume the terminating
                // null; guarded to match the interpreter's `c != 0` rule.
                e.branch_named(FixupKind::Cbz(Reg::CHAR), "bytecode_instr_done");
                emit_push_next(&mut e, idx + 1);
                e.branch_named(FixupKind::B, "bytecode_instr_done");
            }
            Step::Match => {
                e.branch_named(FixupKind::Cbz(Reg::CHAR), "MATCH");
                e.branch_named(FixupKind::B, "bytecode_instr_done");
            }
            Step::Jmp(target) => {
                emit_push_current(&mut e, *target, "bytecode_instr_done");
                e.branch_named(FixupKind::B, "bytecode_instr_done");
            }
            Step::Split(a, b) => {
                let part2 = format!("split_part2_{split_counter}");
                split_counter += 1;
                emit_push_current(&mut e, *a, &part2);
                e.place_named(&part2);
                emit_push_current(&mut e, *b, "bytecode_instr_done");
                e.branch_named(FixupKind::B, "bytecode_instr_done");
            }
        }
    }

    e.place_named("MATCH");
    e.emit(encode::mov_imm(Reg::X0, 1));
    e.place_named("FIN");
    e.emit(encode::ldr_imm_sp(frame - 16, Reg::FP));
    e.emit(encode::ldr_imm_sp(frame - 8, Reg::LR));
    e.emit(encode::add_imm(Reg::SP, frame, Reg::SP));
    e.emit(encode::ret());

    e.finish()
}

/// `hist_next[target]` dedup check then push `target` into the next
/// set — the shared tail of `Literal`/`Any`. The marker stored and
/// compared is the raw, not-yet-incremented `sidx`: every push during
/// this generation (current or next) shares that same value, and it's
/// only the per-slot storage half (here, `target*8+4`) that says which
/// list a given push belongs to, not the marker value itself.
fn emit_push_next(e: &mut Emitter, target: usize) {
    let slot = (target as u32) * 8 + 4;
    e.emit(encode::ldrh_imm(Reg::HIST_BASE, slot, Reg::TMP));
    e.emit(encode::cmp_reg(Reg::TMP, Reg::SIDX));
    e.branch_named(FixupKind::BCond(Cond::Eq), "bytecode_instr_done");
    e.emit(encode::strh_imm(Reg::HIST_BASE, slot, Reg::SIDX));
    e.branch_step(FixupKind::Adr(Reg::TMP), target);
    e.emit(encode::str_reg(Reg::NEXT_BASE, Reg::NEXT_IDX, Reg::TMP));
    e.emit(encode::add_imm(Reg::NEXT_IDX, 1, Reg::NEXT_IDX));
}

/// `hist_current[target]` dedup check then push `target` into the
/// current set at `sidx` — the epsilon-transition push `Jmp`/`Split`
/// use. `on_seen` is where control goes if `target` was already pushed
/// this generation — `bytecode_instr_done` for a plain `Jmp`, or the
/// second target's code for `Split`'s first push, so a duplicate first
/// target doesn't skip trying the second.
fn emit_push_current(e: &mut Emitter, target: usize, on_seen: &str) {
    let slot_hist_off = (target as u32) * 8;
    e.emit(encode::ldrh_imm(Reg::HIST_BASE, slot_hist_off, Reg::TMP));
    e.emit(encode::cmp_reg(Reg::TMP, Reg::SIDX));
    e.branch_named(FixupKind::BCond(Cond::Eq), on_seen);
    e.emit(encode::strh_imm(Reg::HIST_BASE, slot_hist_off, Reg::SIDX));
    e.branch_step(FixupKind::Adr(Reg::TMP), target);
    e.emit(encode::str_reg(Reg::CURR_BASE, Reg::CURR_LEN, Reg::TMP));
    e.emit(encode::add_imm(Reg::CURR_LEN, 1, Reg::CURR_LEN));
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex_ast::{compress_literals, eliminate_single_sequences};
    use regex_bytecode::compile;

    fn lower_pattern(pattern: &str) -> Vec<u32> {
        let node = regex_parser::parse(pattern).unwrap();
        let node = eliminate_single_sequences(node);
        let mut node = node;
        compress_literals(&mut node);
        let program = compile(&node).unwrap();
        lower(&program)
    }

    #[test]
    fn lowering_a_literal_produces_a_nonempty_word_stream() {
        let words = lower_pattern("abc");
        assert!(!words.is_empty());
        // ret is always the final word.
        assert_eq!(*words.last().unwrap(), encode::ret());
    }

    #[test]
    fn frame_size_is_16_byte_aligned() {
        for n in 0..20 {
            assert_eq!(frame_size(n) % 16, 0);
        }
    }

    #[test]
    fn lowering_alternation_does_not_panic_on_label_resolution() {
        let words = lower_pattern("(hello|world(0|1|2|3)?)+");
        assert!(words.len() > 10);
    }
}
