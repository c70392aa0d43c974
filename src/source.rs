//! Line sources feeding the ingestor.
//!
//! The ingestor only ever asks "is there a line right now?" so the rendering
//! loop never blocks on input. A reader thread does the blocking reads and
//! hands complete lines over a channel:
//!
//! ```no_run
//! let (sink, source) = pressureplot::source::line_channel();
//! pressureplot::source::spawn_reader(std::io::BufReader::new(std::io::stdin()), sink);
//! # drop(source);
//! ```

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SendError, Sender, TryRecvError};
use std::thread::JoinHandle;
use std::time::Duration;

/// Outcome of asking a source for its next line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinePoll {
    /// One complete line, without its terminator.
    Line(String),
    /// Nothing available yet; the stream is still open.
    Empty,
    /// The stream ended and every buffered line has been handed out.
    Closed,
}

/// Anything the ingestor can pull lines from.
pub trait LineSource {
    /// Return immediately with the next line or [`LinePoll::Empty`].
    fn try_next_line(&mut self) -> LinePoll;

    /// Wait at most `timeout` for the next line.
    fn wait_next_line(&mut self, timeout: Duration) -> LinePoll;
}

/// Sending half of a line channel. Dropping every sink closes the stream.
#[derive(Clone)]
pub struct LineSink {
    tx: Sender<String>,
}

impl LineSink {
    /// Push one line into the stream.
    pub fn send_line<S: Into<String>>(&self, line: S) -> Result<(), SendError<String>> {
        self.tx.send(line.into())
    }
}

/// Receiving half of a line channel.
pub struct ChannelSource {
    rx: Receiver<String>,
}

impl ChannelSource {
    pub fn new(rx: Receiver<String>) -> Self {
        Self { rx }
    }
}

impl LineSource for ChannelSource {
    fn try_next_line(&mut self) -> LinePoll {
        match self.rx.try_recv() {
            Ok(line) => LinePoll::Line(line),
            Err(TryRecvError::Empty) => LinePoll::Empty,
            Err(TryRecvError::Disconnected) => LinePoll::Closed,
        }
    }

    fn wait_next_line(&mut self, timeout: Duration) -> LinePoll {
        match self.rx.recv_timeout(timeout) {
            Ok(line) => LinePoll::Line(line),
            Err(RecvTimeoutError::Timeout) => LinePoll::Empty,
            Err(RecvTimeoutError::Disconnected) => LinePoll::Closed,
        }
    }
}

/// Create a connected sink/source pair.
pub fn line_channel() -> (LineSink, ChannelSource) {
    let (tx, rx) = mpsc::channel();
    (LineSink { tx }, ChannelSource::new(rx))
}

/// Spawn a thread that reads `reader` line by line and forwards each line to
/// `sink`. Invalid UTF-8 is replaced rather than dropped so the row is still
/// reported (and rejected) by the parser. The thread exits at end of stream,
/// on a read error, or once the receiving side is gone.
pub fn spawn_reader<R>(mut reader: R, sink: LineSink) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => {
                    tracing::debug!("input stream reached end of file");
                    break;
                }
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end_matches(['\n', '\r']);
                    if sink.send_line(line).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::error!("failed to read input stream: {e}");
                    break;
                }
            }
        }
    })
}
