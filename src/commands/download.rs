/*!
 * `filedrop download`
 */

use crate::cli_style::{format_bytes, print_success, transfer_bar};
use anyhow::{Context, Result};
use filedrop_connect::TransferClient;
use filedrop_core::{FileMetadata, TransferProgress};
use std::path::{Path, PathBuf};

/// Where a download lands when no output path is given: the final component
/// of the stored filename, or the identifier when the filename has none.
pub fn default_output_path(metadata: &FileMetadata) -> PathBuf {
    Path::new(&metadata.filename)
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&metadata.file_id))
}

/// Download `file_id` to `output` (or the stored filename) with a progress bar
pub async fn download(
    client: &TransferClient,
    file_id: &str,
    output: Option<PathBuf>,
) -> Result<PathBuf> {
    let metadata = client
        .stat(file_id)
        .await
        .with_context(|| format!("Cannot download {}", file_id))?;
    let output = output.unwrap_or_else(|| default_output_path(&metadata));

    let bar = transfer_bar(metadata.size, "Downloading");
    let progress = bar.clone();

    let result = client
        .download_file(file_id, &output, move |p: TransferProgress| {
            progress.set_position(p.bytes_transferred)
        })
        .await;

    match result {
        Ok(metadata) => {
            bar.finish_and_clear();
            print_success(&format!(
                "Downloaded {} ({}) to {}",
                metadata.filename,
                format_bytes(metadata.size),
                output.display()
            ));
            Ok(output)
        }
        Err(e) => {
            bar.abandon();
            Err(e).with_context(|| format!("Download of {} failed", file_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn metadata(filename: &str) -> FileMetadata {
        FileMetadata {
            file_id: "0123abcd".to_string(),
            filename: filename.to_string(),
            size: 0,
            content_type: "text/plain".to_string(),
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(default_output_path(&metadata("a.txt")), PathBuf::from("a.txt"));
        assert_eq!(
            default_output_path(&metadata("nested/dir/b.txt")),
            PathBuf::from("b.txt")
        );
        assert_eq!(default_output_path(&metadata("..")), PathBuf::from("0123abcd"));
        assert_eq!(default_output_path(&metadata("")), PathBuf::from("0123abcd"));
    }
}
