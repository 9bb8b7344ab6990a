//! File-backed audio chunk source.

use std::path::PathBuf;

use bytes::{Bytes, BytesMut};
use futures_util::Stream;
use tokio::io::AsyncReadExt;

/// Default buffer size for file reads.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Lazily reads a file as a sequence of fixed-size byte buffers.
///
/// Every call to [`stream`](FileChunkSource::stream) reopens the file and
/// starts over at offset zero, so a source can back a retried call; it is
/// not resumable mid-stream. The open handle is owned by the returned
/// stream and released when the stream is dropped, so cancelling between
/// reads leaks nothing and never yields a partial buffer.
#[derive(Debug, Clone)]
pub struct FileChunkSource {
    path: PathBuf,
    chunk_size: usize,
}

impl FileChunkSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Sets the buffer size. Panics if `chunk_size` is zero.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk_size must be positive");
        self.chunk_size = chunk_size;
        self
    }

    /// Opens the file and yields non-empty buffers in file order. Each
    /// buffer is `chunk_size` bytes except possibly the last; an empty
    /// file yields no buffers.
    pub fn stream(&self) -> impl Stream<Item = crate::Result<Bytes>> + Send + 'static {
        let path = self.path.clone();
        let chunk_size = self.chunk_size;

        async_stream::try_stream! {
            let mut file = tokio::fs::File::open(&path).await?;
            loop {
                let mut buf = BytesMut::with_capacity(chunk_size);
                while buf.len() < chunk_size {
                    let read = file.read_buf(&mut buf).await?;
                    if read == 0 {
                        break;
                    }
                }
                if buf.is_empty() {
                    break;
                }
                yield buf.freeze();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use std::io::Write;

    async fn collect(source: &FileChunkSource) -> Vec<Bytes> {
        source
            .stream()
            .map(|chunk| chunk.expect("read must succeed"))
            .collect()
            .await
    }

    fn file_with(len: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        file.write_all(&data).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn yields_ceil_n_over_c_buffers() {
        let file = file_with(10);
        let source = FileChunkSource::new(file.path()).chunk_size(4);

        let chunks = collect(&source).await;
        assert_eq!(
            chunks.iter().map(|c| c.len()).collect::<Vec<_>>(),
            vec![4, 4, 2]
        );
    }

    #[tokio::test]
    async fn exact_multiple_has_full_final_buffer() {
        let file = file_with(8);
        let source = FileChunkSource::new(file.path()).chunk_size(4);

        let chunks = collect(&source).await;
        assert_eq!(
            chunks.iter().map(|c| c.len()).collect::<Vec<_>>(),
            vec![4, 4]
        );
    }

    #[tokio::test]
    async fn empty_file_yields_no_buffers() {
        let file = file_with(0);
        let source = FileChunkSource::new(file.path()).chunk_size(4);
        assert!(collect(&source).await.is_empty());
    }

    #[tokio::test]
    async fn chunks_preserve_file_order_and_content() {
        let file = file_with(300);
        let source = FileChunkSource::new(file.path()).chunk_size(128);

        let chunks = collect(&source).await;
        let joined: Vec<u8> = chunks.iter().flat_map(|c| c.iter().copied()).collect();
        let expected: Vec<u8> = (0..300).map(|i| (i % 251) as u8).collect();
        assert_eq!(joined, expected);
    }

    #[tokio::test]
    async fn restream_restarts_at_offset_zero() {
        let file = file_with(10);
        let source = FileChunkSource::new(file.path()).chunk_size(4);

        let first = collect(&source).await;
        let second = collect(&source).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn dropping_mid_stream_is_clean() {
        let file = file_with(1024);
        let source = FileChunkSource::new(file.path()).chunk_size(16);

        let mut stream = Box::pin(source.stream());
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.len(), 16);
        drop(stream);

        // The handle was released with the stream; the file reopens fine.
        assert_eq!(collect(&source).await.len(), 64);
    }

    #[tokio::test]
    async fn missing_file_surfaces_io_error() {
        let source = FileChunkSource::new("/nonexistent/audio.raw");
        let mut stream = Box::pin(source.stream());
        let error = stream.next().await.unwrap().unwrap_err();
        assert!(matches!(error, crate::Error::Io(_)));
    }
}
