/*!
 * Subcommand implementations
 *
 * Each command takes a connected [`TransferClient`](filedrop_connect::TransferClient)
 * and prints its own output; errors are returned to `main` for reporting.
 */

pub mod delete;
pub mod download;
pub mod list;
pub mod upload;

pub use delete::delete;
pub use download::{default_output_path, download};
pub use list::list;
pub use upload::upload;
