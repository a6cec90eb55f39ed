//! Error types for disassembly scanning

use thiserror::Error;

use super::header::HeaderError;

/// Errors that abort a scanner producer
#[derive(Error, Debug)]
pub enum ScanError {
    /// A function summary line lacks a usable `size=` field
    #[error("malformed function header in package {package} at line {line_number}: {line}")]
    MalformedHeader {
        /// Package the header belongs to
        package: String,
        /// 1-based line number in the dump
        line_number: u64,
        /// The offending line
        line: String,
        /// What was wrong with it
        #[source]
        reason: HeaderError,
    },

    /// Reading the dump failed
    #[error("I/O error while reading disassembly: {0}")]
    Io(#[from] std::io::Error),

    /// The process producing the dump exited abnormally
    #[error("dump producer `{program}` failed with {status}")]
    ProducerFailed {
        /// Program that was run
        program: String,
        /// Exit status description
        status: String,
    },
}
