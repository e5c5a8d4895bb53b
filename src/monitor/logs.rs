//! Log aggregation
//!
//! Fans every encoder's stdout and stderr into the session event channel,
//! one line per event, tagged with the source label and stream. Readers
//! run until EOF; a dead receiver or a read error ends a reader silently.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::recorder::event::{RecorderEvent, StreamKind};
use crate::recorder::session::ProcessRecord;

pub struct LogAggregator {
    stop_flag: Arc<AtomicBool>,
    readers: Vec<JoinHandle<()>>,
}

impl LogAggregator {
    pub fn new() -> Self {
        Self {
            stop_flag: Arc::new(AtomicBool::new(false)),
            readers: Vec::new(),
        }
    }

    /// Claim the record's stdout and stderr pipes and start one reader
    /// task per stream. Streams already taken elsewhere are skipped.
    pub fn attach(&mut self, record: &mut ProcessRecord, events: broadcast::Sender<RecorderEvent>) {
        let label = record.label().to_string();

        if let Some(stdout) = record.take_stdout() {
            self.readers.push(spawn_reader(
                label.clone(),
                StreamKind::Stdout,
                stdout,
                events.clone(),
                Arc::clone(&self.stop_flag),
            ));
        }
        if let Some(stderr) = record.take_stderr() {
            self.readers.push(spawn_reader(
                label,
                StreamKind::Stderr,
                stderr,
                events,
                Arc::clone(&self.stop_flag),
            ));
        }
    }

    /// Ask all readers to wind down. Readers at EOF are already gone;
    /// the rest exit after their current line.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    pub fn reader_count(&self) -> usize {
        self.readers.len()
    }

    pub fn is_finished(&self) -> bool {
        self.readers.iter().all(JoinHandle::is_finished)
    }
}

impl Default for LogAggregator {
    fn default() -> Self {
        Self::new()
    }
}

fn spawn_reader<R>(
    label: String,
    stream: StreamKind,
    source: R,
    events: broadcast::Sender<RecorderEvent>,
    stop_flag: Arc<AtomicBool>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(source);
        let mut buf = Vec::new();

        while !stop_flag.load(Ordering::SeqCst) {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    // Encoders occasionally emit non-UTF-8 progress bytes.
                    let line = String::from_utf8_lossy(&buf).trim_end().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    tracing::debug!("[{label}/{stream:?}] {line}");
                    if events
                        .send(RecorderEvent::Log {
                            label: label.clone(),
                            stream,
                            line,
                        })
                        .is_err()
                    {
                        break;
                    }
                }
            }
        }
    })
}
