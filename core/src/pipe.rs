//! Bounded in-memory pipe between a producer thread and a blocking reader.
//!
//! # Design
//! The writer batches bytes into frames of at most [`PIPE_CHUNK_SIZE`] and
//! pushes them through a `sync_channel` holding [`PIPE_CAPACITY`] frames, so at
//! most a few chunks are ever buffered no matter how much flows through.
//!
//! The stream only ends cleanly when the writer calls [`PipeWriter::close`].
//! A writer that fails calls [`PipeWriter::close_with_error`] and the reader
//! returns that error; a writer that is dropped without either (a panic, say)
//! makes the reader fail with `UnexpectedEof`. Dropping the reader makes every
//! later write fail with `BrokenPipe`, which also wakes a writer blocked on a
//! full channel. Neither side can be left waiting on the other.
//!
//! A reader given a deadline ([`PipeReader::with_deadline`]) stops waiting for
//! the next frame once it passes and fails with `TimedOut`, so a stalled
//! writer cannot hold the reader past it either.

use std::io::{self, Read, Write};
use std::sync::mpsc::{sync_channel, Receiver, RecvTimeoutError, SyncSender};
use std::time::Instant;

/// Largest frame the writer sends in one message.
pub const PIPE_CHUNK_SIZE: usize = 32 * 1024;

/// Frames that may be queued before the writer blocks.
pub const PIPE_CAPACITY: usize = 4;

enum Frame {
    Data(Vec<u8>),
    Done,
    Fail(io::Error),
}

/// Create a connected writer/reader pair holding at most `capacity` frames.
pub fn pipe(capacity: usize) -> (PipeWriter, PipeReader) {
    let (tx, rx) = sync_channel(capacity);
    let writer = PipeWriter {
        tx,
        buf: Vec::with_capacity(PIPE_CHUNK_SIZE),
    };
    let reader = PipeReader {
        rx,
        current: Vec::new(),
        pos: 0,
        state: ReadState::Open,
        deadline: None,
    };
    (writer, reader)
}

pub struct PipeWriter {
    tx: SyncSender<Frame>,
    buf: Vec<u8>,
}

impl PipeWriter {
    fn send(&self, frame: Frame) -> io::Result<()> {
        self.tx
            .send(frame)
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "pipe reader closed"))
    }

    /// Flush buffered bytes and signal a clean end of stream.
    pub fn close(mut self) -> io::Result<()> {
        self.flush()?;
        self.send(Frame::Done)
    }

    /// Discard buffered bytes and hand `err` to the reader instead of an end
    /// of stream.
    pub fn close_with_error(self, err: io::Error) {
        // A closed reader has nobody left to tell.
        let _ = self.tx.send(Frame::Fail(err));
    }
}

impl Write for PipeWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        let room = PIPE_CHUNK_SIZE - self.buf.len();
        let n = room.min(data.len());
        self.buf.extend_from_slice(&data[..n]);
        if self.buf.len() == PIPE_CHUNK_SIZE {
            self.flush()?;
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let frame = std::mem::replace(&mut self.buf, Vec::with_capacity(PIPE_CHUNK_SIZE));
        self.send(Frame::Data(frame))
    }
}

enum ReadState {
    Open,
    Finished,
    Failed { kind: io::ErrorKind, message: String },
}

pub struct PipeReader {
    rx: Receiver<Frame>,
    current: Vec<u8>,
    pos: usize,
    state: ReadState,
    deadline: Option<Instant>,
}

impl PipeReader {
    /// Fail reads that are still waiting for the writer at `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    fn next_frame(&self) -> Result<Frame, RecvTimeoutError> {
        match self.deadline {
            Some(deadline) => self
                .rx
                .recv_timeout(deadline.saturating_duration_since(Instant::now())),
            None => self.rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        }
    }

    fn fail(&mut self, err: io::Error) -> io::Error {
        self.state = ReadState::Failed {
            kind: err.kind(),
            message: err.to_string(),
        };
        err
    }
}

impl Read for PipeReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        loop {
            if self.pos < self.current.len() {
                let n = (self.current.len() - self.pos).min(out.len());
                out[..n].copy_from_slice(&self.current[self.pos..self.pos + n]);
                self.pos += n;
                return Ok(n);
            }
            match &self.state {
                ReadState::Finished => return Ok(0),
                ReadState::Failed { kind, message } => {
                    return Err(io::Error::new(*kind, message.clone()))
                }
                ReadState::Open => {}
            }
            match self.next_frame() {
                Ok(Frame::Data(data)) => {
                    self.current = data;
                    self.pos = 0;
                }
                Ok(Frame::Done) => self.state = ReadState::Finished,
                Ok(Frame::Fail(err)) => return Err(self.fail(err)),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(self.fail(io::Error::new(
                        io::ErrorKind::TimedOut,
                        "pipe writer produced nothing before the deadline",
                    )))
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(self.fail(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "pipe writer dropped before closing",
                    )))
                }
            }
        }
    }
}
