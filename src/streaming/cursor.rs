//! Resumable, pull-based file transfer.
//!
//! # Responsibilities
//! - Read a file in fixed-size chunks, one chunk per cycle
//! - Hand each chunk to a writer (`step`) or to hyper as a body stream
//! - Close the file as soon as the transfer ends, however it ends
//!
//! # Design Decisions
//! - Every chunk except the last is exactly `chunk_size` bytes; short reads
//!   from the OS are topped up before a chunk is emitted
//! - The file handle lives inside the cursor, so dropping the cursor (or the
//!   body built from it) releases it on client disconnect too
//! - I/O errors end the transfer; they are never retried

use std::io;
use std::path::Path;

use axum::body::{Body, Bytes};
use futures_util::stream;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::observability::metrics;

/// A file transfer in progress.
#[derive(Debug)]
pub struct StreamCursor {
    file: Option<File>,
    chunk_size: usize,
    chunks: usize,
    bytes: u64,
    error: Option<io::Error>,
}

impl StreamCursor {
    /// Open `path` for chunked transfer.
    pub async fn open(path: impl AsRef<Path>, chunk_size: usize) -> io::Result<Self> {
        let file = File::open(path.as_ref()).await?;
        Ok(Self::from_file(file, chunk_size))
    }

    pub fn from_file(file: File, chunk_size: usize) -> Self {
        Self {
            file: Some(file),
            chunk_size: chunk_size.max(1),
            chunks: 0,
            bytes: 0,
            error: None,
        }
    }

    /// Whether the underlying file is still held.
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    pub fn chunks_sent(&self) -> usize {
        self.chunks
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes
    }

    /// The error that ended the transfer, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    /// Next chunk, or `None` once the file is exhausted.
    pub async fn read_chunk(&mut self) -> io::Result<Option<Bytes>> {
        let Some(file) = self.file.as_mut() else {
            return Ok(None);
        };

        let mut buf = vec![0u8; self.chunk_size];
        let filled = match fill(file, &mut buf).await {
            Ok(n) => n,
            Err(e) => {
                self.release();
                return Err(e);
            }
        };

        if filled < self.chunk_size {
            self.release();
        }
        if filled == 0 {
            return Ok(None);
        }

        buf.truncate(filled);
        self.chunks += 1;
        self.bytes += filled as u64;
        metrics::record_stream_bytes(filled);
        Ok(Some(Bytes::from(buf)))
    }

    /// One transfer cycle: read a chunk and write it to `writer`.
    ///
    /// Returns `true` while there is more to send. A `false` return after an
    /// I/O failure leaves the error in [`StreamCursor::take_error`].
    pub async fn step<W>(&mut self, writer: &mut W) -> bool
    where
        W: AsyncWrite + Unpin,
    {
        let chunk = match self.read_chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => return false,
            Err(e) => {
                self.fail(e);
                return false;
            }
        };

        if let Err(e) = writer.write_all(&chunk).await {
            self.release();
            self.fail(e);
            return false;
        }
        self.is_open()
    }

    /// Drive `step` until the transfer ends.
    pub async fn copy_to<W>(mut self, writer: &mut W) -> io::Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        while self.step(writer).await {}
        match self.take_error() {
            Some(e) => Err(e),
            None => Ok(self.bytes_sent()),
        }
    }

    /// Response body pulled by hyper one chunk at a time.
    pub fn into_body(self) -> Body {
        let chunks = stream::unfold(self, |mut cursor| async move {
            match cursor.read_chunk().await {
                Ok(Some(chunk)) => Some((Ok(chunk), cursor)),
                Ok(None) => {
                    tracing::debug!(
                        chunks = cursor.chunks,
                        bytes = cursor.bytes,
                        "Stream complete"
                    );
                    None
                }
                Err(e) => {
                    tracing::warn!(error = %e, bytes = cursor.bytes, "Stream aborted");
                    Some((Err(e), cursor))
                }
            }
        });
        Body::from_stream(chunks)
    }

    fn release(&mut self) {
        self.file = None;
    }

    fn fail(&mut self, error: io::Error) {
        tracing::warn!(error = %error, bytes = self.bytes, "Stream aborted");
        self.error = Some(error);
    }
}

/// Read until `buf` is full or EOF.
async fn fill<R>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]).await {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaming::DEFAULT_CHUNK_SIZE;
    use std::io::Write;

    fn fixture(len: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let content: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        file.write_all(&content).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_cycles_match_chunk_count() {
        for len in [0, 1, 4095, 4096, 4097, 10_000, 3 * 4096] {
            let file = fixture(len);
            let mut cursor = StreamCursor::open(file.path(), DEFAULT_CHUNK_SIZE).await.unwrap();
            let mut out = Vec::new();

            let mut cycles = 0;
            loop {
                let before = cursor.chunks_sent();
                let more = cursor.step(&mut out).await;
                if cursor.chunks_sent() > before {
                    cycles += 1;
                }
                if !more {
                    break;
                }
            }

            assert_eq!(cycles, len.div_ceil(DEFAULT_CHUNK_SIZE), "len {}", len);
            assert_eq!(out, std::fs::read(file.path()).unwrap(), "len {}", len);
            assert!(!cursor.is_open());
            assert!(cursor.take_error().is_none());
        }
    }

    #[tokio::test]
    async fn test_chunks_are_full_until_the_last() {
        let file = fixture(9_000);
        let mut cursor = StreamCursor::open(file.path(), DEFAULT_CHUNK_SIZE).await.unwrap();

        let mut sizes = Vec::new();
        while let Some(chunk) = cursor.read_chunk().await.unwrap() {
            sizes.push(chunk.len());
        }
        assert_eq!(sizes, vec![4096, 4096, 808]);
    }

    #[tokio::test]
    async fn test_read_error_releases_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut cursor = StreamCursor::open(dir.path(), DEFAULT_CHUNK_SIZE).await.unwrap();
        let mut out = Vec::new();

        assert!(!cursor.step(&mut out).await);
        assert!(!cursor.is_open());
        assert!(cursor.take_error().is_some());
        assert!(out.is_empty());
    }

    /// Writer whose peer has gone away.
    struct Disconnected;

    impl AsyncWrite for Disconnected {
        fn poll_write(
            self: std::pin::Pin<&mut Self>,
            _: &mut std::task::Context<'_>,
            _: &[u8],
        ) -> std::task::Poll<io::Result<usize>> {
            std::task::Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(
            self: std::pin::Pin<&mut Self>,
            _: &mut std::task::Context<'_>,
        ) -> std::task::Poll<io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: std::pin::Pin<&mut Self>,
            _: &mut std::task::Context<'_>,
        ) -> std::task::Poll<io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_write_error_releases_file_and_halts() {
        let file = fixture(3 * 4096);
        let mut cursor = StreamCursor::open(file.path(), DEFAULT_CHUNK_SIZE).await.unwrap();

        assert!(!cursor.step(&mut Disconnected).await);
        assert!(!cursor.is_open());
        assert_eq!(cursor.chunks_sent(), 1);
        assert_eq!(cursor.bytes_sent(), 4096);
        assert_eq!(cursor.take_error().unwrap().kind(), io::ErrorKind::BrokenPipe);

        // Nothing further is read once the transfer has halted.
        assert!(!cursor.step(&mut Vec::<u8>::new()).await);
        assert_eq!(cursor.chunks_sent(), 1);
    }

    #[tokio::test]
    async fn test_copy_to_surfaces_write_error() {
        let file = fixture(5_000);
        let cursor = StreamCursor::open(file.path(), 1024).await.unwrap();
        let err = cursor.copy_to(&mut Disconnected).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[tokio::test]
    async fn test_body_round_trip() {
        let file = fixture(20_000);
        let cursor = StreamCursor::open(file.path(), DEFAULT_CHUNK_SIZE).await.unwrap();

        let body = cursor.into_body();
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        assert_eq!(bytes.as_ref(), std::fs::read(file.path()).unwrap().as_slice());
    }

    #[tokio::test]
    async fn test_copy_to_reports_total() {
        let file = fixture(5_000);
        let cursor = StreamCursor::open(file.path(), 1024).await.unwrap();
        let mut out = Vec::new();
        assert_eq!(cursor.copy_to(&mut out).await.unwrap(), 5_000);
    }
}
