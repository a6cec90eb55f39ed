//! Async scanner producer
//!
//! Runs a [`PackageScanner`] over a live byte stream and pushes each
//! completed package into a bounded channel. Closing the channel (dropping
//! the sender) signals end of input to the consumer.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

use super::{PackageRecord, PackageScanner, ScanError, ScannerConfig};

/// One message from a scanner producer
pub type ScanItem = Result<PackageRecord, ScanError>;

/// Scan `reader` to completion, sending each package on `tx`
///
/// Errors are delivered in-band as the last item on the channel. If the
/// consumer goes away the producer stops at its next send instead of
/// blocking. Returns the number of packages delivered.
pub async fn scan_stream<R>(reader: R, config: ScannerConfig, tx: mpsc::Sender<ScanItem>) -> usize
where
    R: AsyncBufRead + Unpin,
{
    let mut scanner = PackageScanner::new(config);
    let mut lines = reader.split(b'\n');
    let mut sent = 0;

    loop {
        let line = match lines.next_segment().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                forward_error(&tx, ScanError::Io(e)).await;
                return sent;
            }
        };
        match scanner.feed_line(&line) {
            Ok(Some(package)) => {
                if tx.send(Ok(package)).await.is_err() {
                    log::debug!("consumer closed, stopping scanner after {} packages", sent);
                    return sent;
                }
                sent += 1;
            }
            Ok(None) => {}
            Err(e) => {
                forward_error(&tx, e).await;
                return sent;
            }
        }
    }

    // End of input: flush the package still in progress
    match scanner.finish() {
        Ok(Some(package)) => {
            if tx.send(Ok(package)).await.is_ok() {
                sent += 1;
            }
        }
        Ok(None) => {}
        Err(e) => forward_error(&tx, e).await,
    }
    sent
}

async fn forward_error(tx: &mpsc::Sender<ScanItem>, error: ScanError) {
    log::debug!("scanner stopped: {}", error);
    // The consumer may already be gone, in which case nobody needs the error
    let _ = tx.send(Err(error)).await;
}
