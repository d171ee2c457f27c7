//! AArch64 general-purpose registers, with the fixed role assignments
//! the backend's generated code uses throughout.

/// An AArch64 general-purpose register (`x0`-`x30`, or `sp`/`xzr` at 31
/// depending on instruction context).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reg(u8);

impl Reg {
    pub const fn new(num: u8) -> Self {
        assert!(num <= 31, "register number must be <= 31");
        Self(num)
    }

    pub const fn num(self) -> u8 {
        self.0
    }
}

// Fixed register assignments for the generated `_matchit` function body.
impl Reg {
    /// Caller's argument / the boolean result (`x0`).
    pub const X0: Reg = Reg(0);
    pub const X1: Reg = Reg(1);
    pub const TMP2: Reg = Reg(3);
    pub const TMP: Reg = Reg(4);
    /// Base pointer into the input string.
    pub const SPTR: Reg = Reg(5);
    /// Current input index (doubles as the VM's generation number).
    pub const SIDX: Reg = Reg(6);
    /// Byte at `input[SIDX]`, reloaded once per outer-loop iteration.
    pub const CHAR: Reg = Reg(7);
    pub const CURR_BASE: Reg = Reg(8);
    pub const CURR_LEN: Reg = Reg(9);
    pub const CURR_IDX: Reg = Reg(10);
    /// Holds the micro-routine address fetched from the current set,
    /// branched to via `br`.
    pub const RUN_PC: Reg = Reg(11);
    pub const NEXT_BASE: Reg = Reg(12);
    pub const NEXT_IDX: Reg = Reg(13);
    pub const HIST_BASE: Reg = Reg(14);
    /// Frame pointer.
    pub const FP: Reg = Reg(29);
    /// Link register.
    pub const LR: Reg = Reg(30);
    /// Stack pointer (register index 31 in load/store/add/sub contexts).
    pub const SP: Reg = Reg(31);
    /// Zero register (register index 31 in most other contexts).
    pub const ZR: Reg = Reg(31);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_roles_are_distinct() {
        let roles = [
            Reg::TMP2,
            Reg::TMP,
            Reg::SPTR,
            Reg::SIDX,
            Reg::CHAR,
            Reg::CURR_BASE,
            Reg::CURR_LEN,
            Reg::CURR_IDX,
            Reg::RUN_PC,
            Reg::NEXT_BASE,
            Reg::NEXT_IDX,
            Reg::HIST_BASE,
        ];
        for (i, a) in roles.iter().enumerate() {
            for b in &roles[i + 1..] {
                assert_ne!(a.num(), b.num());
            }
        }
    }
}
