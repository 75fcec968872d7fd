use crate::OUTPUT_MAGIC_HEADER;
use crate::source::SourceFile;
use crate::utils::{fence_len_for, get_language_tag};
use anyhow::{Context, Result};
use log::debug;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

/// Emits the round-trip document: one path line and one fenced block per file.
pub struct MarkdownWriter<W: AsyncWrite + Unpin> {
    writer: BufWriter<W>,
}

impl<W: AsyncWrite + Unpin> MarkdownWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: BufWriter::new(inner),
        }
    }

    pub async fn write_header(&mut self) -> Result<()> {
        self.writer
            .write_all(OUTPUT_MAGIC_HEADER.as_bytes())
            .await
            .context("Failed to write document header")
    }

    pub async fn write_entry(&mut self, file: &SourceFile) -> Result<()> {
        let rel_path = file.display_path();
        let lang = get_language_tag(&file.rel_path);
        let fence = "`".repeat(fence_len_for(&file.content));

        debug!("Writing file: {rel_path}");

        self.writer
            .write_all(format!("{rel_path}\n{fence}{lang}\n").as_bytes())
            .await
            .with_context(|| format!("Failed to write opening code fence for {rel_path}"))?;

        self.writer
            .write_all(file.content.as_bytes())
            .await
            .with_context(|| format!("Failed to write content of {rel_path}"))?;

        // The newline before the closing fence belongs to the fence, not the content.
        self.writer
            .write_all(format!("\n{fence}\n\n").as_bytes())
            .await
            .with_context(|| format!("Failed to write closing code fence for {rel_path}"))?;

        Ok(())
    }

    pub async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await.context("Failed to flush output")
    }
}
