use super::WriteSink;
use async_trait::async_trait;
use std::io;
use tokio::io::{AsyncWriteExt, Stdout};

/// Standard output writer, for piping archives to other tools
pub struct StdoutWriter {
    stdout: Stdout,
    written: u64,
}

impl StdoutWriter {
    pub fn new() -> Self {
        Self {
            stdout: tokio::io::stdout(),
            written: 0,
        }
    }
}

impl Default for StdoutWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WriteSink for StdoutWriter {
    async fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.stdout.write_all(buf).await?;
        self.written += buf.len() as u64;
        Ok(())
    }

    async fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush().await
    }

    fn bytes_written(&self) -> u64 {
        self.written
    }
}
