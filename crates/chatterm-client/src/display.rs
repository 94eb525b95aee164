//! Output sinks for rendered lines.

use std::io::{self, Write};

use tokio::sync::mpsc;

/// Receives rendered lines, one per call.
pub trait LineSink: Send {
    /// Show one rendered line. The sink adds the line terminator.
    fn show(&mut self, line: &str) -> io::Result<()>;
}

/// Writes lines to any [`Write`] (stdout in the binary), flushing each one.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
}

impl<W: Write + Send> WriterSink<W> {
    /// Wrap `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Unwrap the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> LineSink for WriterSink<W> {
    fn show(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.writer, "{line}")?;
        self.writer.flush()
    }
}

/// Forwards lines over a channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelSink {
    /// Create a sink and the receiver its lines arrive on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl LineSink for ChannelSink {
    fn show(&mut self, line: &str) -> io::Result<()> {
        self.tx
            .send(line.to_owned())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "line receiver dropped"))
    }
}
