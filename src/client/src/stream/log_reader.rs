use std::collections::VecDeque;

use futures_util::StreamExt;

use crate::connection::BodyStream;
use crate::error::DockerResult;
use crate::json::{LogMessage, LogMessageType};

const HEADER_LEN: usize = 8;

/// Longest unterminated line held back before it is handed out as is.
pub const MAX_PARTIAL_LINE: usize = 64 * 1024;

const STREAMS: [LogMessageType; 4] = [
    LogMessageType::Stdin,
    LogMessageType::Stdout,
    LogMessageType::Stderr,
    LogMessageType::Raw,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    Undecided,
    Multiplexed,
    Raw,
}

/// Demultiplexes the log stream of attach, logs and exec start.
///
/// Without a TTY the daemon prefixes every chunk of output with an 8 byte
/// header `[stream, 0, 0, 0, size (u32 BE)]`. With a TTY it sends the bytes as
/// they are; such bodies are recognised by their first bytes not forming a
/// valid header and come out as [`LogMessageType::Raw`].
///
/// Lines are assembled per stream, so a line written across several frames
/// comes out once.
pub struct LogMessageReader {
    body: BodyStream,
    buffer: Vec<u8>,
    framing: Framing,
    pending: [Vec<u8>; 4],
    ready: VecDeque<LogMessage>,
    finished: bool,
}

impl LogMessageReader {
    pub fn new(body: BodyStream) -> Self {
        Self {
            body,
            buffer: Vec::new(),
            framing: Framing::Undecided,
            pending: Default::default(),
            ready: VecDeque::new(),
            finished: false,
        }
    }

    /// Next line of output, or `None` once the body is exhausted.
    pub async fn next(&mut self) -> DockerResult<Option<LogMessage>> {
        loop {
            if let Some(message) = self.ready.pop_front() {
                return Ok(Some(message));
            }
            if self.finished {
                return Ok(None);
            }
            match self.body.next().await {
                Some(chunk) => {
                    self.buffer.extend_from_slice(&chunk?);
                    self.drain_buffer();
                }
                None => {
                    self.finished = true;
                    self.flush();
                }
            }
        }
    }

    fn drain_buffer(&mut self) {
        if self.framing == Framing::Undecided {
            if self.buffer.len() < HEADER_LEN {
                return;
            }
            self.framing = if stream_type(&self.buffer).is_some() {
                Framing::Multiplexed
            } else {
                Framing::Raw
            };
        }

        match self.framing {
            Framing::Multiplexed => self.drain_frames(),
            Framing::Raw => self.drain_raw(),
            Framing::Undecided => {}
        }
    }

    fn drain_frames(&mut self) {
        let mut offset = 0;
        while self.buffer.len() - offset >= HEADER_LEN {
            let header = &self.buffer[offset..offset + HEADER_LEN];
            let Some(log_type) = stream_type(header) else {
                // lost sync with the framing; hand out the rest untouched
                self.buffer.drain(..offset);
                self.framing = Framing::Raw;
                self.drain_raw();
                return;
            };
            let size = u32::from_be_bytes([header[4], header[5], header[6], header[7]]) as usize;
            let frame_end = offset + HEADER_LEN + size;
            if self.buffer.len() < frame_end {
                break;
            }
            let payload = self.buffer[offset + HEADER_LEN..frame_end].to_vec();
            self.append(log_type, &payload);
            offset = frame_end;
        }
        self.buffer.drain(..offset);
    }

    fn drain_raw(&mut self) {
        let bytes = std::mem::take(&mut self.buffer);
        self.append(LogMessageType::Raw, &bytes);
    }

    /// Adds output to its stream and emits every line it completes.
    fn append(&mut self, log_type: LogMessageType, bytes: &[u8]) {
        let pending = &mut self.pending[slot(log_type)];
        pending.extend_from_slice(bytes);

        let mut start = 0;
        while let Some(newline) = pending[start..].iter().position(|b| *b == b'\n') {
            let end = start + newline;
            self.ready
                .push_back(LogMessage::new(log_type, line_text(&pending[start..end])));
            start = end + 1;
        }
        pending.drain(..start);

        if pending.len() >= MAX_PARTIAL_LINE {
            let line = std::mem::take(pending);
            self.ready.push_back(LogMessage::new(log_type, line_text(&line)));
        }
    }

    fn flush(&mut self) {
        if self.framing == Framing::Multiplexed {
            self.drain_frames();
            // a truncated frame is still output the caller wants to see
            if self.buffer.len() > HEADER_LEN {
                if let Some(log_type) = stream_type(&self.buffer) {
                    let payload = self.buffer.split_off(HEADER_LEN);
                    self.append(log_type, &payload);
                }
            }
        } else {
            self.drain_raw();
        }
        self.buffer.clear();

        for log_type in STREAMS {
            let rest = std::mem::take(&mut self.pending[slot(log_type)]);
            if !rest.is_empty() {
                self.ready.push_back(LogMessage::new(log_type, line_text(&rest)));
            }
        }
    }
}

fn slot(log_type: LogMessageType) -> usize {
    match log_type {
        LogMessageType::Stdin => 0,
        LogMessageType::Stdout => 1,
        LogMessageType::Stderr => 2,
        LogMessageType::Raw => 3,
    }
}

fn stream_type(header: &[u8]) -> Option<LogMessageType> {
    if header.len() < HEADER_LEN || header[1..4] != [0, 0, 0] {
        return None;
    }
    match header[0] {
        0 => Some(LogMessageType::Stdin),
        1 => Some(LogMessageType::Stdout),
        2 => Some(LogMessageType::Stderr),
        _ => None,
    }
}

fn line_text(line: &[u8]) -> String {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}
