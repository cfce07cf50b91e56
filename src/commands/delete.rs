/*!
 * `filedrop delete`
 */

use crate::cli_style::{file_label, print_info, print_success};
use anyhow::{bail, Context, Result};
use dialoguer::{theme::ColorfulTheme, Confirm, Select};
use filedrop_connect::TransferClient;
use tracing::debug;

/// Delete `file_id`, or a file picked interactively when it is `None`.
///
/// Returns `false` when nothing was deleted because the user backed out.
pub async fn delete(client: &TransferClient, file_id: Option<String>, yes: bool) -> Result<bool> {
    let (file_id, label) = match file_id {
        Some(file_id) => {
            let label = file_id.clone();
            (file_id, label)
        }
        None => {
            let files = client.list().await.context("Cannot list files")?;
            if files.is_empty() {
                print_info("No files on the server");
                return Ok(false);
            }

            let labels: Vec<String> = files.iter().map(file_label).collect();
            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("Which file do you want to delete?")
                .default(0)
                .items(&labels)
                .interact_opt()?;

            match selection {
                Some(index) => (files[index].file_id.clone(), files[index].filename.clone()),
                None => {
                    print_info("Nothing deleted");
                    return Ok(false);
                }
            }
        }
    };

    if !yes
        && !Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete {}?", label))
            .default(false)
            .interact()?
    {
        print_info("Nothing deleted");
        return Ok(false);
    }

    debug!("Deleting {}", file_id);
    if !client
        .delete(&file_id)
        .await
        .with_context(|| format!("Cannot delete {}", file_id))?
    {
        bail!("File not found: {}", file_id);
    }

    print_success(&format!("Deleted {}", label));
    Ok(true)
}
