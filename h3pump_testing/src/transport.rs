//! Scripted [`StreamTransport`] replaying byte chunks.

use std::{
    collections::VecDeque,
    io,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use h3pump::{Fill, NetworkBuffer, PumpError, StreamTransport, error::ErrorCode};

/// How the end of the stream is reported once the peer finished it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FinishMode {
    /// A drained, finished stream returns [`Fill::Finished`].
    #[default]
    Report,
    /// Reads keep returning [`Fill::Empty`] and only
    /// [`StreamTransport::is_stream_finished`] reveals the end, as some QUIC
    /// stacks do.
    Silent,
}

/// Everything the pump did to the transport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportLog {
    /// Number of non-blocking reads.
    pub fills: usize,
    /// Number of times read interest was armed.
    pub interest: usize,
    /// Codes passed to `shutdown_input`.
    pub input_shutdown: Vec<ErrorCode>,
    /// Number of flushes.
    pub flushes: usize,
    /// Code the stream was reset with.
    pub closed: Option<ErrorCode>,
    /// Display form of the failure that reset the stream.
    pub close_cause: Option<String>,
}

#[derive(Debug, Default)]
struct Script {
    chunks: VecDeque<Vec<u8>>,
    fill_limit: Option<usize>,
    finished: bool,
    finish_mode: FinishMode,
    fail_next: Option<io::ErrorKind>,
    log: TransportLog,
}

/// In-memory QUIC stream.
///
/// Clones share state, so a test keeps one clone to script input and
/// inspect the [`TransportLog`] while the pump owns another.
#[derive(Clone, Debug)]
pub struct ScriptedTransport {
    id: u64,
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    /// Create a transport for stream `id` with no input.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id,
            script: Arc::default(),
        }
    }

    /// Report the end of the stream according to `mode`.
    #[must_use]
    pub fn finish_mode(self, mode: FinishMode) -> Self {
        self.script().finish_mode = mode;
        self
    }

    /// Cap every read at `limit` bytes.
    #[must_use]
    pub fn fill_limit(self, limit: usize) -> Self {
        self.script().fill_limit = Some(limit.max(1));
        self
    }

    /// Stream identifier.
    #[must_use]
    pub fn id(&self) -> u64 { self.id }

    /// Queue bytes; each chunk is returned by separate reads.
    pub fn push(&self, chunk: impl Into<Vec<u8>>) {
        let chunk = chunk.into();
        if !chunk.is_empty() {
            self.script().chunks.push_back(chunk);
        }
    }

    /// Mark the stream finished by the peer after the queued bytes.
    pub fn finish(&self) { self.script().finished = true; }

    /// Fail the next read with an error of `kind`.
    pub fn fail_next(&self, kind: io::ErrorKind) { self.script().fail_next = Some(kind); }

    /// Bytes queued but not read yet.
    #[must_use]
    pub fn pending(&self) -> usize { self.script().chunks.iter().map(Vec::len).sum() }

    /// Snapshot of the interactions recorded so far.
    #[must_use]
    pub fn log(&self) -> TransportLog { self.script().log.clone() }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StreamTransport for ScriptedTransport {
    fn stream_id(&self) -> u64 { self.id }

    fn fill(&mut self, buffer: &mut NetworkBuffer) -> io::Result<Fill> {
        let mut script = self.script();
        script.log.fills += 1;
        if let Some(kind) = script.fail_next.take() {
            return Err(io::Error::new(kind, "scripted read failure"));
        }
        if !script.log.input_shutdown.is_empty() {
            return Ok(Fill::Finished);
        }
        let limit = script.fill_limit.unwrap_or(usize::MAX);
        let Some(chunk) = script.chunks.front_mut() else {
            return Ok(match (script.finished, script.finish_mode) {
                (true, FinishMode::Report) => Fill::Finished,
                _ => Fill::Empty,
            });
        };
        let available = chunk.len().min(limit);
        let count = buffer.fill_from(&chunk[..available]);
        chunk.drain(..count);
        if chunk.is_empty() {
            script.chunks.pop_front();
        }
        Ok(Fill::Read(count))
    }

    fn is_stream_finished(&self) -> bool {
        let script = self.script();
        script.finished && script.chunks.is_empty()
    }

    fn fill_interested(&mut self) { self.script().log.interest += 1; }

    fn shutdown_input(&mut self, code: ErrorCode) { self.script().log.input_shutdown.push(code); }

    fn flush(&mut self) { self.script().log.flushes += 1; }

    fn close(&mut self, code: ErrorCode, cause: &PumpError) {
        let mut script = self.script();
        script.log.closed = Some(code);
        script.log.close_cause = Some(cause.to_string());
    }
}
