mod local;
mod stdout;

pub use local::LocalFileWriter;
pub use stdout::StdoutWriter;

use async_trait::async_trait;
use std::io;

/// Trait for sequential writing to an archive destination
#[async_trait]
pub trait WriteSink: Send {
    /// Write the whole buffer to the sink
    async fn write_all(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Flush any buffered data to the underlying destination
    async fn flush(&mut self) -> io::Result<()>;

    /// Get the total number of bytes written so far
    fn bytes_written(&self) -> u64;
}

/// In-memory sink, mostly useful for tests and for callers that want the
/// archive bytes back
#[async_trait]
impl WriteSink for Vec<u8> {
    async fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.extend_from_slice(buf);
        Ok(())
    }

    async fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn bytes_written(&self) -> u64 {
        self.len() as u64
    }
}
