//! Download destinations that can throw away a partial copy

use async_trait::async_trait;
use std::io;
use tokio::io::{AsyncSeekExt, AsyncWrite};

/// A byte sink for [`TransferClient::download`](crate::TransferClient::download).
///
/// When a transfer fails, `discard` is called so the sink holds nothing from
/// it. For a sink that was not empty beforehand, `discard` drops the earlier
/// contents too.
#[async_trait]
pub trait DownloadSink: AsyncWrite + Unpin + Send {
    async fn discard(&mut self) -> io::Result<()>;
}

#[async_trait]
impl DownloadSink for Vec<u8> {
    async fn discard(&mut self) -> io::Result<()> {
        self.clear();
        Ok(())
    }
}

#[async_trait]
impl DownloadSink for io::Cursor<Vec<u8>> {
    async fn discard(&mut self) -> io::Result<()> {
        self.get_mut().clear();
        self.set_position(0);
        Ok(())
    }
}

#[async_trait]
impl DownloadSink for tokio::fs::File {
    async fn discard(&mut self) -> io::Result<()> {
        self.set_len(0).await?;
        self.rewind().await?;
        Ok(())
    }
}
