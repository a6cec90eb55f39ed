//! Merge-join of two package streams
//!
//! Both scanners emit packages in whatever order the compiler happens to
//! produce them, at independent speeds. The join keeps a pending map per
//! side and emits a [`MatchedPair`] as soon as the second half of a pair
//! arrives. Memory is bounded by the number of packages waiting for their
//! partner, not by the size of the whole program.

use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::scanner::{PackageRecord, ScanError, ScanItem, Side};

/// A package present on both sides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPair {
    /// Package from the baseline build
    pub before: PackageRecord,
    /// Package from the build under test
    pub after: PackageRecord,
}

impl MatchedPair {
    /// Package name shared by both halves
    pub fn name(&self) -> &str {
        &self.before.name
    }
}

/// Packages that never found a partner
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unmatched {
    /// Packages only present in the baseline build, sorted
    pub only_before: Vec<String>,
    /// Packages only present in the build under test, sorted
    pub only_after: Vec<String>,
}

impl Unmatched {
    /// True if every package was matched
    pub fn is_empty(&self) -> bool {
        self.only_before.is_empty() && self.only_after.is_empty()
    }
}

/// Errors that abort the join
#[derive(Error, Debug)]
pub enum JoinError {
    /// One of the scanners failed
    #[error("{side} build: {source}")]
    Scan {
        /// Side whose scanner failed
        side: Side,
        /// Underlying scanner error
        #[source]
        source: ScanError,
    },
}

/// Pending-map state of the join
#[derive(Debug, Default)]
pub struct MergeJoin {
    pending_before: HashMap<String, PackageRecord>,
    pending_after: HashMap<String, PackageRecord>,
}

impl MergeJoin {
    /// Create an empty join
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a package from `side`
    ///
    /// Returns the pair if the other side already delivered a package with
    /// the same name; otherwise the package is held until its partner shows
    /// up.
    pub fn offer(&mut self, side: Side, record: PackageRecord) -> Option<MatchedPair> {
        let (own, opposite) = match side {
            Side::Before => (&mut self.pending_before, &mut self.pending_after),
            Side::After => (&mut self.pending_after, &mut self.pending_before),
        };

        match opposite.remove(&record.name) {
            Some(partner) => Some(match side {
                Side::Before => MatchedPair {
                    before: record,
                    after: partner,
                },
                Side::After => MatchedPair {
                    before: partner,
                    after: record,
                },
            }),
            None => {
                if let Some(previous) = own.insert(record.name.clone(), record) {
                    log::warn!(
                        "package {} appeared twice in the {} build, keeping the later one",
                        previous.name,
                        side
                    );
                }
                None
            }
        }
    }

    /// Consume the join, returning the packages that were never matched
    pub fn finish(self) -> Unmatched {
        let mut only_before: Vec<String> = self.pending_before.into_keys().collect();
        let mut only_after: Vec<String> = self.pending_after.into_keys().collect();
        only_before.sort();
        only_after.sort();
        Unmatched {
            only_before,
            only_after,
        }
    }
}

/// Join two scanner channels, calling `on_pair` for each matched package
///
/// Both channels are polled fairly until both are closed. The first scanner
/// error aborts the join; returning drops both receivers, so a producer
/// blocked on a full channel wakes up with a send error and exits.
///
/// Packages present on only one side are logged and returned, not treated
/// as errors.
pub async fn join_streams<F>(
    mut before: mpsc::Receiver<ScanItem>,
    mut after: mpsc::Receiver<ScanItem>,
    mut on_pair: F,
) -> Result<Unmatched, JoinError>
where
    F: FnMut(MatchedPair),
{
    let mut join = MergeJoin::new();
    let mut before_open = true;
    let mut after_open = true;

    while before_open || after_open {
        let (side, item) = tokio::select! {
            item = before.recv(), if before_open => (Side::Before, item),
            item = after.recv(), if after_open => (Side::After, item),
        };

        let record = match item {
            Some(Ok(record)) => record,
            Some(Err(source)) => return Err(JoinError::Scan { side, source }),
            None => {
                log::debug!("{} scanner finished", side);
                match side {
                    Side::Before => before_open = false,
                    Side::After => after_open = false,
                }
                continue;
            }
        };

        if let Some(pair) = join.offer(side, record) {
            log::debug!("matched package {}", pair.name());
            on_pair(pair);
        }
    }

    let unmatched = join.finish();
    for name in &unmatched.only_before {
        log::info!("package {} only in before build", name);
    }
    for name in &unmatched.only_after {
        log::info!("package {} only in after build", name);
    }
    Ok(unmatched)
}
