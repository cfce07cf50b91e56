//! filedrop server library.
//!
//! Exposes the chunked transfer pipelines over gRPC, plus an HTTP polling API
//! and a WebSocket push channel. Every transport shares one registry through
//! [`AppState`].

pub mod config;
pub mod error;
pub mod grpc;
pub mod http;
pub mod logging;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use grpc::FileServiceImpl;
pub use state::{AppState, FileEvent, UploadGuard, UploadStats};
