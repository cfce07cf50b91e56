/*!
 * `filedrop upload`
 */

use crate::cli_style::{print_success, transfer_bar};
use anyhow::{Context, Result};
use filedrop_connect::TransferClient;
use filedrop_core::TransferProgress;
use std::path::Path;
use tracing::debug;

/// Upload `path` with a progress bar and print the new identifier
pub async fn upload(client: &TransferClient, path: &Path) -> Result<String> {
    let total = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Cannot read {}", path.display()))?
        .len();

    debug!(
        "Uploading {} ({} bytes, {} byte chunks)",
        path.display(),
        total,
        client.chunk_size()
    );

    let bar = transfer_bar(total, "Uploading");
    let progress = bar.clone();

    let result = client
        .upload_file(path, move |p: TransferProgress| {
            progress.set_position(p.bytes_transferred)
        })
        .await;

    let file_id = match result {
        Ok(file_id) => {
            bar.finish_and_clear();
            file_id
        }
        Err(e) => {
            bar.abandon();
            return Err(e).with_context(|| format!("Upload of {} failed", path.display()));
        }
    };

    print_success(&format!("Uploaded {}", path.display()));
    println!("{}", file_id);
    Ok(file_id)
}
