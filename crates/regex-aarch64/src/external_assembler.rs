//! Optional dev-parity path: round-trip the already-lowered instruction
//! words through a real assembler, the way the original source produced
//! machine code in the first place (it only ever emitted mnemonics to a
//! `.s` file and shelled out to `clang`/`otool`; it never had a direct
//! encoder at all). Gated behind the `external-assembler` feature and
//! used to cross-check [`crate::encode`]'s bit patterns during
//! development, not as a production code path.

use std::io::{BufRead, Write};
use std::process::Command;

use crate::error::JitError;

/// Write `words` out as a `.s` file, assemble and disassemble it with
/// `clang`/`otool`, and return the words `otool` reports — which should
/// be identical to `words` themselves, since both ultimately encode the
/// same AArch64 instructions.
pub(crate) fn round_trip(words: &[u32]) -> Result<Vec<u32>, JitError> {
    let dir = std::env::temp_dir();
    let s_path = dir.join("regex_aarch64_dev.s");
    let o_path = dir.join("regex_aarch64_dev.o");
    let txt_path = dir.join("regex_aarch64_dev.txt");

    let mut s_file = std::fs::File::create(&s_path).map_err(|source| JitError::AssemblerFailed {
        stage: "writing .s",
        source,
    })?;
    writeln!(s_file, ".global _matchit").map_err(|source| JitError::AssemblerFailed {
        stage: "writing .s",
        source,
    })?;
    writeln!(s_file, "_matchit:").map_err(|source| JitError::AssemblerFailed {
        stage: "writing .s",
        source,
    })?;
    for word in words {
        writeln!(s_file, ".word 0x{word:08x}").map_err(|source| JitError::AssemblerFailed {
            stage: "writing .s",
            source,
        })?;
    }
    drop(s_file);

    run(
        Command::new("clang").args([
            s_path.to_str().unwrap(),
            "-c",
            "-o",
            o_path.to_str().unwrap(),
        ]),
        "clang",
    )?;

    let output = Command::new("otool")
        .args(["-tX", o_path.to_str().unwrap()])
        .output()
        .map_err(|source| JitError::AssemblerFailed {
            stage: "otool",
            source,
        })?;
    std::fs::write(&txt_path, &output.stdout).map_err(|source| JitError::AssemblerFailed {
        stage: "writing otool output",
        source,
    })?;

    parse_otool_words(&output.stdout)
}

fn run(cmd: &mut Command, stage: &'static str) -> Result<(), JitError> {
    let status = cmd.status().map_err(|source| JitError::AssemblerFailed { stage, source })?;
    if !status.success() {
        return Err(JitError::AssemblerFailed {
            stage,
            source: std::io::Error::new(std::io::ErrorKind::Other, format!("{stage} exited with {status}")),
        });
    }
    Ok(())
}

/// `otool -tX` prints one line per instruction group: an address
/// followed by up to four hex words. We only care about the words.
fn parse_otool_words(stdout: &[u8]) -> Result<Vec<u32>, JitError> {
    let mut words = Vec::new();
    for line in stdout.lines() {
        let line = line.map_err(|source| JitError::AssemblerFailed {
            stage: "parsing otool output",
            source,
        })?;
        let mut fields = line.split_whitespace();
        let Some(_address) = fields.next() else {
            continue;
        };
        for field in fields {
            if let Ok(word) = u32::from_str_radix(field, 16) {
                words.push(word);
            }
        }
    }
    Ok(words)
}
