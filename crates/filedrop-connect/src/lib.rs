//! Filedrop Connect: client-side transfers against a filedrop server
//!
//! [`TransferClient`] wraps the generated gRPC client and adds what a caller
//! needs around the raw streams:
//!
//! - uploads split a byte source into chunk frames behind a metadata frame
//! - downloads resolve the expected size through the listing, check it, and
//!   discard the [`DownloadSink`] when a transfer fails
//! - both report [`TransferProgress`](filedrop_core::TransferProgress) after
//!   every chunk
//!
//! # Example
//!
//! ```rust,no_run
//! use filedrop_connect::TransferClient;
//!
//! async fn example() -> Result<(), filedrop_connect::ClientError> {
//!     let client = TransferClient::connect("http://localhost:50051").await?;
//!
//!     for file in client.list().await? {
//!         println!("{} {} ({} bytes)", file.file_id, file.filename, file.size);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod sink;

pub use client::TransferClient;
pub use error::{ClientError, Result};
pub use sink::DownloadSink;
