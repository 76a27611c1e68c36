//! Background line readers for runner output channels
//!
//! Piped reads block, so each output channel gets its own task that drains
//! the stream line by line into an unbounded queue. The decoder can then
//! poll without ever touching blocking I/O.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;

/// Spawn a task draining `stream` into an ordered queue of lines.
///
/// Lines arrive with trailing whitespace stripped, strictly in read order.
/// The channel closes when the stream hits end-of-file, which is the
/// consumer's signal that the producer side is gone.
pub fn spawn_line_reader<R>(stream: R) -> mpsc::UnboundedReceiver<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line.trim_end().to_string()).is_err() {
                        // Consumer dropped the run; stop reading.
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::debug!(error = %e, "line reader stopping on read error");
                    break;
                }
            }
        }
        tracing::debug!("line reader closed");
    });
    rx
}
