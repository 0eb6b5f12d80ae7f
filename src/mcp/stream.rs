use axum::body::Bytes;
use futures_util::Stream;

use crate::error::AppError;

/// LineFramer
///
/// Re-frames an upstream event stream line by line: every non-empty line is emitted as
/// `line + "\n\n"`, blank lines are dropped. Chunks may split lines anywhere.
#[derive(Debug, Default)]
pub struct LineFramer {
    pending: Vec<u8>,
}

impl LineFramer {
    /// Feeds a chunk and returns the lines it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Bytes> {
        self.pending.extend_from_slice(chunk);

        let mut framed = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            if let Some(out) = frame(&line[..pos]) {
                framed.push(out);
            }
        }
        framed
    }

    /// Flushes a trailing line that had no terminating newline.
    pub fn finish(&mut self) -> Option<Bytes> {
        let rest = std::mem::take(&mut self.pending);
        frame(&rest)
    }
}

fn frame(line: &[u8]) -> Option<Bytes> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    if line.is_empty() {
        return None;
    }

    let mut out = Vec::with_capacity(line.len() + 2);
    out.extend_from_slice(line);
    out.extend_from_slice(b"\n\n");
    Some(Bytes::from(out))
}

/// Applies `LineFramer` to a chunk stream. Upstream errors end the stream.
pub fn frame_lines<S>(upstream: S) -> impl Stream<Item = Result<Bytes, AppError>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, AppError>> + Send + 'static,
{
    async_stream::try_stream! {
        let mut framer = LineFramer::default();

        for await chunk in upstream {
            for line in framer.push(&chunk?) {
                yield line;
            }
        }

        if let Some(line) = framer.finish() {
            yield line;
        }
    }
}
