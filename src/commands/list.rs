/*!
 * `filedrop list`
 */

use crate::cli_style::{file_table, format_bytes, print_info};
use anyhow::{Context, Result};
use filedrop_connect::TransferClient;
use filedrop_core::FileMetadata;

pub async fn list(client: &TransferClient) -> Result<Vec<FileMetadata>> {
    let files = client.list().await.context("Cannot list files")?;

    if files.is_empty() {
        print_info("No files on the server");
        return Ok(files);
    }

    println!("{}", file_table(&files));
    let total: u64 = files.iter().map(|f| f.size).sum();
    print_info(&format!("{} file(s), {}", files.len(), format_bytes(total)));
    Ok(files)
}
