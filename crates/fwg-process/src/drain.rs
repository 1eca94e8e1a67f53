//! Concurrent draining of a child's output streams.

use std::io::Write;
use tokio::io::{AsyncRead, AsyncReadExt};

const CHUNK_SIZE: usize = 8192;

/// Bytes of each stream kept in [`crate::ExecutionResult`]. Everything is
/// still forwarded; only the retained copy is capped.
pub(crate) const RETAINED_OUTPUT_LIMIT: usize = 64 * 1024;

/// Which console stream drained output is forwarded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    fn header(self) -> &'static str {
        match self {
            Self::Stdout => "--------- Standard Output :",
            Self::Stderr => "--------- Standard Error :",
        }
    }

    /// Write raw bytes to the matching console stream.
    ///
    /// The stream lock is held for the whole chunk so output from the two
    /// drain tasks never interleaves mid-chunk.
    fn forward(self, bytes: &[u8]) {
        let result = match self {
            Self::Stdout => {
                let mut out = std::io::stdout().lock();
                out.write_all(bytes).and_then(|()| out.flush())
            }
            Self::Stderr => {
                let mut err = std::io::stderr().lock();
                err.write_all(bytes).and_then(|()| err.flush())
            }
        };
        if let Err(e) = result {
            tracing::debug!(stream = ?self, "Console write failed: {e}");
        }
    }

    fn log(self, text: &str) {
        let text = text.trim_end();
        match self {
            Self::Stdout => tracing::info!(target: "fwg::output", "{text}"),
            Self::Stderr => tracing::warn!(target: "fwg::output", "{text}"),
        }
    }
}

/// Read `reader` to EOF, forwarding every chunk to the console untouched.
///
/// Non-blank chunks also go to the logger, preceded once by the stream
/// header. Returns the first [`RETAINED_OUTPUT_LIMIT`] bytes, decoded lossily.
pub(crate) async fn drain_stream<R>(reader: Option<R>, kind: StreamKind) -> String
where
    R: AsyncRead + Unpin,
{
    drain_with(reader, kind, RETAINED_OUTPUT_LIMIT, |bytes| kind.forward(bytes)).await
}

async fn drain_with<R, F>(
    reader: Option<R>,
    kind: StreamKind,
    limit: usize,
    mut forward: F,
) -> String
where
    R: AsyncRead + Unpin,
    F: FnMut(&[u8]),
{
    let Some(mut reader) = reader else {
        return String::new();
    };

    let mut retained = Vec::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut header_written = false;

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                tracing::debug!(stream = ?kind, "Read failed, stopping drain: {e}");
                break;
            }
        };
        let bytes = &buf[..n];
        forward(bytes);

        let text = String::from_utf8_lossy(bytes);
        if !text.trim().is_empty() {
            if !header_written {
                tracing::info!(target: "fwg::output", "{}", kind.header());
                header_written = true;
            }
            kind.log(&text);
        }

        let room = limit.saturating_sub(retained.len());
        retained.extend_from_slice(&bytes[..n.min(room)]);
    }

    String::from_utf8_lossy(&retained).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn drain_collecting<R>(reader: R, limit: usize) -> (String, Vec<u8>)
    where
        R: AsyncRead + Unpin,
    {
        let mut forwarded = Vec::new();
        let retained = drain_with(Some(reader), StreamKind::Stdout, limit, |bytes| {
            forwarded.extend_from_slice(bytes)
        })
        .await;
        (retained, forwarded)
    }

    #[tokio::test]
    async fn test_drain_none_is_empty() {
        let out = drain_stream::<&[u8]>(None, StreamKind::Stdout).await;
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_drain_collects_everything() {
        let input: &[u8] = b"first line\nsecond line\n";
        let out = drain_stream(Some(input), StreamKind::Stdout).await;
        assert_eq!(out, "first line\nsecond line\n");
    }

    #[tokio::test]
    async fn test_multibyte_char_across_chunk_boundary_survives() {
        let mut input = vec![b'a'; CHUNK_SIZE - 1];
        input.extend_from_slice("é\n".as_bytes());

        let (retained, forwarded) = drain_collecting(&input[..], RETAINED_OUTPUT_LIMIT).await;

        assert_eq!(forwarded, input, "console gets the exact bytes");
        assert!(retained.ends_with("aé\n"));
        assert!(!retained.contains('\u{FFFD}'));
    }

    #[tokio::test]
    async fn test_binary_output_forwarded_verbatim() {
        let input: Vec<u8> = (0..=255u8).cycle().take(CHUNK_SIZE * 2 + 17).collect();
        let (_, forwarded) = drain_collecting(&input[..], RETAINED_OUTPUT_LIMIT).await;
        assert_eq!(forwarded, input);
    }

    #[tokio::test]
    async fn test_blank_chunks_are_forwarded() {
        let reader = (&b"a\n"[..]).chain(&b"\n"[..]).chain(&b"b\n"[..]);
        let (retained, forwarded) = drain_collecting(reader, RETAINED_OUTPUT_LIMIT).await;
        assert_eq!(forwarded, b"a\n\nb\n");
        assert_eq!(retained, "a\n\nb\n");
    }

    #[tokio::test]
    async fn test_retained_output_is_capped() {
        let input = vec![b'x'; 100];
        let (retained, forwarded) = drain_collecting(&input[..], 10).await;
        assert_eq!(retained, "x".repeat(10));
        assert_eq!(forwarded.len(), 100, "forwarding is never capped");
    }
}
