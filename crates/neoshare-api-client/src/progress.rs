//! Upload progress reporting
//!
//! Wraps an in-memory request body in a `Stream` that reports transfer
//! progress as chunks are handed to the transport. Percent values are
//! 0-100 and monotonic within a single upload.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;

/// Callback invoked with the current percent (0-100) as a body is sent.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

const CHUNK_SIZE: usize = 64 * 1024;

pub(crate) struct ProgressBody {
    chunks: std::vec::IntoIter<Bytes>,
    sent: u64,
    total: u64,
    last_percent: u8,
    on_progress: ProgressFn,
}

impl ProgressBody {
    pub(crate) fn new(data: Vec<u8>, on_progress: ProgressFn) -> Self {
        let total = data.len() as u64;
        let chunks: Vec<Bytes> = if data.is_empty() {
            Vec::new()
        } else {
            Bytes::from(data)
                .chunks(CHUNK_SIZE)
                .map(Bytes::copy_from_slice)
                .collect()
        };
        on_progress(0);
        ProgressBody {
            chunks: chunks.into_iter(),
            sent: 0,
            total,
            last_percent: 0,
            on_progress,
        }
    }
}

impl Stream for ProgressBody {
    type Item = Result<Bytes, std::io::Error>;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.chunks.next() {
            Some(chunk) => {
                this.sent += chunk.len() as u64;
                let percent = if this.total == 0 {
                    100
                } else {
                    ((this.sent * 100) / this.total) as u8
                };
                if percent > this.last_percent {
                    this.last_percent = percent;
                    (this.on_progress)(percent);
                }
                Poll::Ready(Some(Ok(chunk)))
            }
            None => {
                // Empty bodies still finish at 100.
                if this.last_percent < 100 {
                    this.last_percent = 100;
                    (this.on_progress)(100);
                }
                Poll::Ready(None)
            }
        }
    }
}
