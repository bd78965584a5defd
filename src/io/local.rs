use super::WriteSink;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};

/// Local file writer.
///
/// Bytes go to a temporary file next to the destination, which only replaces
/// the destination when [`LocalFileWriter::persist`] is called. Dropping the
/// writer removes the temporary file and leaves any existing file untouched.
pub struct LocalFileWriter {
    file: BufWriter<fs::File>,
    temp: TempPath,
    path: PathBuf,
    written: u64,
}

impl LocalFileWriter {
    /// Prepare to write `path`, creating parent directories as needed.
    pub async fn create(path: &Path) -> Result<Self> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;

        let mut builder = tempfile::Builder::new();
        builder.prefix(".storezip-").suffix(".tmp");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o644));
        }
        let (file, temp) = builder
            .tempfile_in(parent)
            .with_context(|| format!("failed to create a temporary file in {}", parent.display()))?
            .into_parts();

        Ok(Self {
            file: BufWriter::new(fs::File::from_std(file)),
            temp,
            path: path.to_path_buf(),
            written: 0,
        })
    }

    /// Final destination of the archive.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and move the finished file to its destination.
    pub async fn persist(mut self) -> Result<PathBuf> {
        self.flush()
            .await
            .with_context(|| format!("failed to write {}", self.temp.display()))?;

        let Self { file, temp, path, .. } = self;
        drop(file);
        temp.persist(&path)
            .with_context(|| format!("failed to move archive into {}", path.display()))?;
        Ok(path)
    }
}

#[async_trait]
impl WriteSink for LocalFileWriter {
    async fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.file.write_all(buf).await?;
        self.written += buf.len() as u64;
        Ok(())
    }

    async fn flush(&mut self) -> io::Result<()> {
        self.file.flush().await?;
        self.file.get_mut().sync_all().await
    }

    fn bytes_written(&self) -> u64 {
        self.written
    }
}
