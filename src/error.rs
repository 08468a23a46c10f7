use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors raised while turning a single instruction into machine code.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EncodeError {
    #[error("unknown computation: `{0}`")]
    UnknownComp(String),

    #[error("unknown destination: `{0}`")]
    UnknownDest(String),

    #[error("unknown jump: `{0}`")]
    UnknownJump(String),

    #[error("address {0} does not fit in 15 bits")]
    AddressOutOfRange(u32),

    #[error("symbol `{0}` was never resolved")]
    UnresolvedSymbol(String),
}

#[derive(Error, Debug)]
pub enum AsmError {
    #[error("input file does not exist: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("expected a `.asm` source file, got extension `{found}` in {}", .path.display())]
    BadExtension { path: PathBuf, found: String },

    #[error("failed to read {}", .0.display())]
    Read(PathBuf, #[source] io::Error),

    #[error("failed to write {}", .0.display())]
    Write(PathBuf, #[source] io::Error),

    #[error("[line {line_nr}] syntax error in `{token}`:\n{message}")]
    Syntax {
        line_nr: usize,
        token: String,
        message: String,
    },

    #[error("[line {line_nr}] symbol `{name}` already defined as {previous}")]
    DuplicateSymbol {
        line_nr: usize,
        name: String,
        previous: u32,
    },

    #[error("[line {line_nr}] {error}")]
    Encode { line_nr: usize, error: EncodeError },
}
