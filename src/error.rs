//! Error types surfaced at the compile/run and file-loading boundaries.
//!
//! Authoring and trace-time conditions are deliberately absent: those are
//! absorbed where they happen and reported through return values.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Compilation failed: {0}")]
    Compile(String),

    #[error("No compiled program available")]
    MissingProgram,

    #[error("Invalid program image: {0}")]
    Hex(#[from] HexError),

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Circuit references unknown component: {0}")]
    UnknownComponent(String),

    #[error("Duplicate component id: {0}")]
    DuplicateComponent(String),

    #[error("Wire joins two pins of the same component: {0}")]
    SameComponentWire(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    #[error("line {line}: invalid hex digits")]
    InvalidDigits { line: usize },

    #[error("line {line}: record shorter than its byte count")]
    Truncated { line: usize },

    #[error("line {line}: data at 0x{address:04X} exceeds flash size {size}")]
    OutOfRange {
        line: usize,
        address: usize,
        size: usize,
    },
}

pub type Result<T> = std::result::Result<T, SimError>;
