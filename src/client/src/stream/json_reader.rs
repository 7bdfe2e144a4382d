use std::marker::PhantomData;

use futures_util::StreamExt;
use serde::de::DeserializeOwned;

use crate::connection::BodyStream;
use crate::error::{DockerError, DockerResult};

/// Reads a body made of concatenated JSON objects, one object at a time.
///
/// Objects may be separated by newlines or by nothing at all, and may arrive
/// split across any number of chunks. Only the bytes of the object currently
/// being assembled are buffered.
pub struct JsonObjectReader<T> {
    body: BodyStream,
    buffer: Vec<u8>,
    finished: bool,
    _item: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> JsonObjectReader<T> {
    pub fn new(body: BodyStream) -> Self {
        Self {
            body,
            buffer: Vec::new(),
            finished: false,
            _item: PhantomData,
        }
    }

    /// Next complete object, or `None` once the body is exhausted.
    pub async fn next(&mut self) -> DockerResult<Option<T>> {
        loop {
            if let Some(item) = self.parse_buffered()? {
                return Ok(Some(item));
            }
            if self.finished {
                return self.finish();
            }
            match self.body.next().await {
                Some(chunk) => self.buffer.extend_from_slice(&chunk?),
                None => self.finished = true,
            }
        }
    }

    fn parse_buffered(&mut self) -> DockerResult<Option<T>> {
        let mut objects = serde_json::Deserializer::from_slice(&self.buffer).into_iter::<T>();
        match objects.next() {
            Some(Ok(item)) => {
                let consumed = objects.byte_offset();
                self.buffer.drain(..consumed);
                Ok(Some(item))
            }
            Some(Err(e)) if e.is_eof() => Ok(None),
            Some(Err(e)) => Err(DockerError::Json(e)),
            None => {
                // only whitespace left
                self.buffer.clear();
                Ok(None)
            }
        }
    }

    fn finish(&mut self) -> DockerResult<Option<T>> {
        if self.buffer.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        let truncated = String::from_utf8_lossy(&self.buffer).into_owned();
        self.buffer.clear();
        Err(DockerError::StreamProtocol(format!(
            "Docker response stream ended inside a JSON object: {truncated}"
        )))
    }
}
