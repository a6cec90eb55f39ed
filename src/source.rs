//! Dump sources
//!
//! Each side of a comparison reads its assembly listing from a file, from
//! stdin, or straight from a running compiler. Starting a source spawns a
//! producer task that scans the stream into a bounded channel.

use std::path::PathBuf;
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::scanner::{scan_stream, ScanError, ScanItem, ScannerConfig};

/// Output stream of a child process carrying the listing
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    /// Standard output
    #[default]
    Stdout,
    /// Standard error (where `go build -gcflags=-S` prints)
    Stderr,
}

/// Errors raised while starting a source
#[derive(Error, Debug)]
pub enum SourceError {
    /// The dump file could not be opened
    #[error("cannot open dump file {path}")]
    Open {
        /// File that failed to open
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The producer program is not on PATH
    #[error("program `{0}` not found")]
    ProgramNotFound(String),

    /// The producer program could not be started
    #[error("failed to start `{program}`")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A command line with no program
    #[error("empty producer command")]
    EmptyCommand,

    /// A command line with unbalanced quotes or a dangling escape
    #[error("cannot parse producer command `{line}`: {reason}")]
    InvalidCommand {
        /// Command line as given
        line: String,
        /// What the splitter rejected
        reason: shell_words::ParseError,
    },

    /// Both sides asked for stdin
    #[error("only one side can read from stdin")]
    StdinTwice,
}

/// Where one side's listing comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpSource {
    /// A listing saved to disk
    File(PathBuf),
    /// The process's standard input
    Stdin,
    /// A program whose output is the listing
    Command {
        /// Executable name or path
        program: String,
        /// Arguments
        args: Vec<String>,
        /// Which output stream to scan
        stream: OutputStream,
    },
}

impl DumpSource {
    /// Interpret a positional argument: `-` is stdin, anything else a file
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            DumpSource::Stdin
        } else {
            DumpSource::File(PathBuf::from(arg))
        }
    }

    /// Build a command source from a command line
    ///
    /// The line is split into words the way a POSIX shell would, so quoted
    /// arguments may contain spaces.
    pub fn from_command_line(line: &str, stream: OutputStream) -> Result<Self, SourceError> {
        let words = shell_words::split(line).map_err(|reason| SourceError::InvalidCommand {
            line: line.to_string(),
            reason,
        })?;
        let mut words = words.into_iter();
        let program = words.next().ok_or(SourceError::EmptyCommand)?;
        Ok(DumpSource::Command {
            program,
            args: words.collect(),
            stream,
        })
    }

    /// True for [`DumpSource::Stdin`]
    pub fn is_stdin(&self) -> bool {
        matches!(self, DumpSource::Stdin)
    }

    /// Short human-readable description for log lines
    pub fn describe(&self) -> String {
        match self {
            DumpSource::File(path) => path.display().to_string(),
            DumpSource::Stdin => "<stdin>".to_string(),
            DumpSource::Command { program, args, .. } if args.is_empty() => program.clone(),
            DumpSource::Command { program, args, .. } => format!("{} {}", program, args.join(" ")),
        }
    }

    /// Open the source and start scanning it on a new task
    ///
    /// Returns the receiving end of the package channel and the producer's
    /// handle, which resolves to the number of packages delivered. Must be
    /// called from within a tokio runtime.
    pub async fn start(
        self,
        config: ScannerConfig,
        capacity: usize,
    ) -> Result<(mpsc::Receiver<ScanItem>, JoinHandle<usize>), SourceError> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let description = self.describe();

        let handle = match self {
            DumpSource::File(path) => {
                let file = tokio::fs::File::open(&path)
                    .await
                    .map_err(|source| SourceError::Open { path, source })?;
                spawn_reader(file, config, tx, description)
            }
            DumpSource::Stdin => spawn_reader(tokio::io::stdin(), config, tx, description),
            DumpSource::Command {
                program,
                args,
                stream,
            } => spawn_command(program, args, stream, config, tx)?,
        };
        Ok((rx, handle))
    }
}

/// Reject configurations where both sides read stdin
pub fn check_sources(before: &DumpSource, after: &DumpSource) -> Result<(), SourceError> {
    if before.is_stdin() && after.is_stdin() {
        return Err(SourceError::StdinTwice);
    }
    Ok(())
}

fn spawn_reader<R>(
    reader: R,
    config: ScannerConfig,
    tx: mpsc::Sender<ScanItem>,
    description: String,
) -> JoinHandle<usize>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        log::debug!("scanning {}", description);
        let sent = scan_stream(BufReader::new(reader), config, tx).await;
        log::debug!("{}: {} packages", description, sent);
        sent
    })
}

fn spawn_command(
    program: String,
    args: Vec<String>,
    stream: OutputStream,
    config: ScannerConfig,
    tx: mpsc::Sender<ScanItem>,
) -> Result<JoinHandle<usize>, SourceError> {
    which::which(&program).map_err(|_| SourceError::ProgramNotFound(program.clone()))?;

    let mut command = tokio::process::Command::new(&program);
    command.args(&args).stdin(Stdio::null()).kill_on_drop(true);
    match stream {
        OutputStream::Stdout => command.stdout(Stdio::piped()).stderr(Stdio::inherit()),
        OutputStream::Stderr => command.stdout(Stdio::null()).stderr(Stdio::piped()),
    };

    let mut child = command.spawn().map_err(|source| SourceError::Spawn {
        program: program.clone(),
        source,
    })?;
    let output: Box<dyn AsyncRead + Unpin + Send> = match stream {
        OutputStream::Stdout => match child.stdout.take() {
            Some(out) => Box::new(out),
            None => return Err(missing_pipe(&program)),
        },
        OutputStream::Stderr => match child.stderr.take() {
            Some(err) => Box::new(err),
            None => return Err(missing_pipe(&program)),
        },
    };

    Ok(tokio::spawn(async move {
        log::debug!("scanning output of {}", program);
        let sent = scan_stream(BufReader::new(output), config, tx.clone()).await;

        if tx.is_closed() {
            // Nobody is listening anymore; don't wait for the compiler to finish
            let _ = child.kill().await;
            return sent;
        }

        let failure = match child.wait().await {
            Ok(status) if status.success() => None,
            Ok(status) => Some(ScanError::ProducerFailed {
                program: program.clone(),
                status: status.to_string(),
            }),
            Err(e) => Some(ScanError::Io(e)),
        };
        if let Some(error) = failure {
            log::debug!("{} failed: {}", program, error);
            let _ = tx.send(Err(error)).await;
        }
        log::debug!("{}: {} packages", program, sent);
        sent
    }))
}

fn missing_pipe(program: &str) -> SourceError {
    SourceError::Spawn {
        program: program.to_string(),
        source: std::io::Error::other("output pipe was not captured"),
    }
}
