//! Enhanced error types with contextual suggestions
//!
//! Provides structured error types that include:
//! - Actionable error messages
//! - Suggested fixes
//! - Proper exit codes for scripts and CI
//!
//! # Examples
//!
//! ```
//! use compilecmp::error::CompileCmpError;
//!
//! let error = CompileCmpError::ToolMissing { tool: "go".to_string() };
//! assert_eq!(error.exit_code(), 127);
//! assert!(error.suggestion().unwrap().contains("PATH"));
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::git::GitError;
use crate::join::JoinError;
use crate::scanner::{ScanError, Side};
use crate::source::SourceError;

/// compilecmp errors with contextual suggestions
#[derive(Error, Debug)]
pub enum CompileCmpError {
    /// Required tool is not installed
    #[error("Tool not installed: {tool}")]
    ToolMissing {
        /// Tool name
        tool: String,
    },

    /// Explicitly named configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path to config file
        path: PathBuf,
        #[source]
        /// IO error source
        source: std::io::Error,
    },

    /// Configuration file could not be parsed or validated
    #[error("invalid configuration in {path}: {message}")]
    InvalidConfig {
        /// Path to config file
        path: PathBuf,
        /// What was wrong
        message: String,
    },

    /// Input file not found
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to missing file
        path: PathBuf,
    },

    /// Bad combination of arguments
    #[error("{0}")]
    Usage(String),

    /// One of the listings could not be parsed
    #[error("malformed {side} dump")]
    MalformedDump {
        /// Side whose listing was malformed
        side: Side,
        #[source]
        /// Scanner error with package and line context
        source: ScanError,
    },

    /// The process producing a listing failed
    #[error("{side} producer `{program}` exited abnormally ({status})")]
    ProducerFailed {
        /// Side the producer was feeding
        side: Side,
        /// Program that was run
        program: String,
        /// Exit status description
        status: String,
    },

    /// A git ref could not be resolved
    #[error("cannot resolve git ref for the {side} build")]
    Git {
        /// Side whose ref failed
        side: Side,
        #[source]
        /// Git error source
        source: GitError,
    },

    /// Generic I/O error with context
    #[error("I/O error: {context}")]
    Io {
        /// Context about where the error occurred
        context: String,
        #[source]
        /// IO error source
        source: std::io::Error,
    },
}

impl CompileCmpError {
    /// Get actionable suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::ToolMissing { tool } => Some(format!(
                "Install {} or make sure it is on your PATH",
                tool
            )),
            Self::ConfigNotFound { path, .. } => Some(format!(
                "Check the --config path, or create {}",
                path.display()
            )),
            Self::InvalidConfig { .. } => Some(
                "Valid keys: mode, color, [scanner] keyword, placeholder, strip-noise, channel-capacity"
                    .to_string(),
            ),
            Self::FileNotFound { path } => {
                Some(format!("Ensure {} exists and is readable", path.display()))
            }
            Self::Usage(_) => Some("Run 'compilecmp --help' for usage".to_string()),
            Self::MalformedDump { .. } => Some(
                "Input must be a compiler assembly listing, e.g. the output of 'go build -gcflags=-S'"
                    .to_string(),
            ),
            Self::ProducerFailed { .. } => {
                Some("Check the producer's own error output above".to_string())
            }
            Self::Git { .. } => Some(
                "Run inside the git checkout, or pass the token directly with --before-token/--after-token"
                    .to_string(),
            ),
            Self::Io { context, .. } => Some(format!(
                "Check file permissions and that {} is accessible",
                context
            )),
        }
    }

    /// Get appropriate exit code for this error.
    ///
    /// Returns Unix-style exit codes based on the error type, following sysexits.h conventions.
    ///
    /// # Examples
    ///
    /// ```
    /// use compilecmp::error::CompileCmpError;
    ///
    /// let error = CompileCmpError::Usage("both sides read stdin".to_string());
    /// assert_eq!(error.exit_code(), 64);
    /// ```
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ToolMissing { .. } => 127, // Command not found (Unix convention)
            Self::ConfigNotFound { .. } => 66, // EX_NOINPUT (sysexits.h)
            Self::InvalidConfig { .. } => 65, // EX_DATAERR
            Self::FileNotFound { .. } => 66, // EX_NOINPUT
            Self::Usage(_) => 64,            // EX_USAGE
            Self::MalformedDump { .. } => 65, // EX_DATAERR
            Self::ProducerFailed { .. } => 70, // EX_SOFTWARE
            Self::Git { .. } => 65,          // EX_DATAERR
            Self::Io { .. } => 74,           // EX_IOERR
        }
    }

    /// Attach the side to a source startup error
    pub fn from_source(side: Side, error: SourceError) -> Self {
        match error {
            SourceError::Open { path, source } if source.kind() == std::io::ErrorKind::NotFound => {
                Self::FileNotFound { path }
            }
            SourceError::Open { path, source } => Self::Io {
                context: format!("reading {} dump {}", side, path.display()),
                source,
            },
            SourceError::ProgramNotFound(tool) => Self::ToolMissing { tool },
            SourceError::Spawn { program, source } => Self::Io {
                context: format!("starting {} producer {}", side, program),
                source,
            },
            other @ (SourceError::EmptyCommand
            | SourceError::InvalidCommand { .. }
            | SourceError::StdinTwice) => {
                Self::Usage(other.to_string())
            }
        }
    }
}

impl From<JoinError> for CompileCmpError {
    fn from(error: JoinError) -> Self {
        let JoinError::Scan { side, source } = error;
        match source {
            ScanError::ProducerFailed { program, status } => Self::ProducerFailed {
                side,
                program,
                status,
            },
            ScanError::Io(source) => Self::Io {
                context: format!("reading the {} dump", side),
                source,
            },
            source @ ScanError::MalformedHeader { .. } => Self::MalformedDump { side, source },
        }
    }
}

/// Error formatter with colors and structured output
pub struct ErrorFormatter;

impl ErrorFormatter {
    /// Format error with its cause chain and suggestion
    pub fn format(error: &anyhow::Error) -> String {
        use console::style;

        let mut output = String::new();

        // Main error message
        output.push_str(&format!("{} {}\n", style("error:").red().bold(), error));

        // Error chain (caused by)
        let mut source = error.source();
        let mut indent = 1;
        while let Some(err) = source {
            output.push_str(&format!(
                "{}{} {}\n",
                "  ".repeat(indent),
                style("caused by:").yellow(),
                err
            ));
            source = err.source();
            indent += 1;
        }

        if let Some(cc_error) = Self::find(error) {
            if let Some(suggestion) = cc_error.suggestion() {
                output.push_str(&format!(
                    "\n{} {}\n",
                    style("help:").cyan().bold(),
                    suggestion
                ));
            }
        }

        output
    }

    /// Get exit code from error
    pub fn exit_code(error: &anyhow::Error) -> i32 {
        Self::find(error).map_or(1, CompileCmpError::exit_code)
    }

    /// First [`CompileCmpError`] in the chain, context layers included
    fn find(error: &anyhow::Error) -> Option<&CompileCmpError> {
        error
            .chain()
            .find_map(|e| e.downcast_ref::<CompileCmpError>())
    }
}
