//! Turns a word stream from [`crate::lower`] into an executable,
//! callable function.
//!
//! The original source mapped one fixed-size region as
//! read+write+execute up front and toggled Apple Silicon's per-thread
//! `pthread_jit_write_protect_np` around writing into it. That's tied to
//! the hardened-runtime JIT entitlement macOS grants specifically to
//! Apple Silicon processes, so it doesn't hold up as a general AArch64
//! backend. Here the mapping starts read+write (no execute bit at all),
//! gets written, then [`jit_write_protect`] flips it to read+execute via
//! `mprotect` — ordinary W^X, portable to any POSIX AArch64 target.

use std::ffi::CStr;
use std::io;
use std::ptr;

use crate::error::JitError;

/// A compiled pattern: an executable mapping plus the size to unmap.
pub struct MatchFn {
    ptr: *mut libc::c_void,
    len: usize,
    entry: unsafe extern "C" fn(*const u8) -> bool,
}

// The mapping is read-only/executable after `jit_write_protect(true)` and
// never mutated again; sharing it across threads is sound.
unsafe impl Send for MatchFn {}
unsafe impl Sync for MatchFn {}

impl MatchFn {
    /// Run the compiled pattern against a null-terminated input.
    pub fn call(&self, input: &CStr) -> bool {
        unsafe { (self.entry)(input.as_ptr() as *const u8) }
    }
}

impl Drop for MatchFn {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.ptr, self.len);
        }
    }
}

/// Upper bound on a generated function body, in words: `adr`'s signed
/// 21-bit byte displacement (the tightest-range fixup `lower` emits)
/// can only reach +/-1MiB, so a body that needed a larger mapping
/// couldn't have its internal labels resolved in the first place.
const MAX_WORDS: usize = (1 << 18) - 1;

/// Map `words` into fresh executable memory and return a callable
/// handle. `words` must be a complete function body whose first word is
/// the entry point and which returns via `ret`.
pub(crate) fn load(words: &[u32]) -> Result<MatchFn, JitError> {
    if words.len() > MAX_WORDS {
        return Err(JitError::CodeTooLarge {
            words: words.len(),
            capacity: MAX_WORDS,
        });
    }

    let size = words.len() * std::mem::size_of::<u32>();
    let page = page_size();
    let mapped_len = round_up(size.max(1), page);

    let ptr = executable_mem(mapped_len)?;

    unsafe {
        ptr::copy_nonoverlapping(words.as_ptr() as *const u8, ptr as *mut u8, size);
    }

    jit_write_protect(ptr, mapped_len, true)?;
    icache_invalidate(ptr as *const u8, mapped_len);

    let entry = unsafe { std::mem::transmute::<*mut libc::c_void, unsafe extern "C" fn(*const u8) -> bool>(ptr) };

    Ok(MatchFn {
        ptr,
        len: mapped_len,
        entry,
    })
}

/// `mmap` an anonymous, initially read+write (not executable) region.
fn executable_mem(size: usize) -> Result<*mut libc::c_void, JitError> {
    let ptr = unsafe {
        libc::mmap(
            ptr::null_mut(),
            size,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_ANON | libc::MAP_PRIVATE,
            -1,
            0,
        )
    };
    if ptr == libc::MAP_FAILED {
        return Err(JitError::MapFailed {
            size,
            source: io::Error::last_os_error(),
        });
    }
    Ok(ptr)
}

/// Toggle a mapping between writable-not-executable and
/// executable-not-writable.
fn jit_write_protect(ptr: *mut libc::c_void, len: usize, executable: bool) -> Result<(), JitError> {
    let prot = if executable {
        libc::PROT_READ | libc::PROT_EXEC
    } else {
        libc::PROT_READ | libc::PROT_WRITE
    };
    let rc = unsafe { libc::mprotect(ptr, len, prot) };
    if rc != 0 {
        return Err(JitError::MapFailed {
            size: len,
            source: io::Error::last_os_error(),
        });
    }
    Ok(())
}

fn page_size() -> usize {
    unsafe { libc::sysconf(libc::_SC_PAGESIZE).max(4096) as usize }
}

fn round_up(n: usize, multiple: usize) -> usize {
    (n + multiple - 1) / multiple * multiple
}

/// Flush `len` bytes starting at `ptr` from the data cache and
/// invalidate them in the instruction cache, so the CPU's instruction
/// fetcher sees the bytes we just wrote rather than stale cache lines.
/// AArch64 requires this explicitly; there's no single portable libc
/// call for it, so this is a direct translation of the standard
/// `dc cvau` / `ic ivau` / `dsb ish` / `isb` sequence ARM's own
/// documentation gives for self-modifying code.
#[cfg(target_arch = "aarch64")]
fn icache_invalidate(ptr: *const u8, len: usize) {
    // Real hardware cache line sizes are always >= 16 bytes; querying
    // ctr_el0 for the exact value isn't worth it here since walking at
    // the conservative granularity below is still correct, just
    // possibly a few redundant lines.
    const LINE: usize = 16;
    let start = ptr as usize & !(LINE - 1);
    let end = (ptr as usize + len + LINE - 1) & !(LINE - 1);

    let mut addr = start;
    while addr < end {
        unsafe {
            std::arch::asm!("dc cvau, {0}", in(reg) addr);
        }
        addr += LINE;
    }
    unsafe {
        std::arch::asm!("dsb ish");
    }
    addr = start;
    while addr < end {
        unsafe {
            std::arch::asm!("ic ivau, {0}", in(reg) addr);
        }
        addr += LINE;
    }
    unsafe {
        std::arch::asm!("dsb ish", "isb");
    }
}

#[cfg(not(target_arch = "aarch64"))]
fn icache_invalidate(_ptr: *const u8, _len: usize) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_up_rounds_to_page_multiples() {
        assert_eq!(round_up(1, 4096), 4096);
        assert_eq!(round_up(4096, 4096), 4096);
        assert_eq!(round_up(4097, 4096), 8192);
    }

    #[test]
    fn load_rejects_a_body_past_the_adr_range_before_mapping_anything() {
        let words = vec![0u32; MAX_WORDS + 1];
        let err = load(&words).unwrap_err();
        match err {
            JitError::CodeTooLarge { words, capacity } => {
                assert_eq!(words, MAX_WORDS + 1);
                assert_eq!(capacity, MAX_WORDS);
            }
            other => panic!("expected CodeTooLarge, got {other:?}"),
        }
    }

    // Actually mapping and executing generated code only makes sense on
    // an AArch64 host; covered by `regex` crate's integration tests
    // which run there.
}
