//! Server configuration (command line with environment fallbacks)

use clap::Parser;
use filedrop_core::DEFAULT_CHUNK_SIZE;
use std::net::SocketAddr;
use std::path::PathBuf;

/// filedrop server - chunked file transfer over gRPC with an HTTP API.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct ServerConfig {
    /// gRPC port
    #[arg(long, env = "GRPC_PORT", default_value = "50051")]
    pub grpc_port: u16,

    /// HTTP / WebSocket port
    #[arg(long, env = "HTTP_PORT", default_value = "3005")]
    pub http_port: u16,

    /// Bind address (default: all interfaces)
    #[arg(short, long, default_value = "0.0.0.0")]
    pub bind: String,

    /// Directory where uploaded bytes are written
    #[arg(short, long, env = "FILEDROP_UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// Size in bytes of outbound download chunks
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl ServerConfig {
    pub fn grpc_addr(&self) -> anyhow::Result<SocketAddr> {
        parse_addr(&self.bind, self.grpc_port)
    }

    pub fn http_addr(&self) -> anyhow::Result<SocketAddr> {
        parse_addr(&self.bind, self.http_port)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.chunk_size == 0 {
            anyhow::bail!("Chunk size must be greater than zero");
        }
        if self.grpc_port != 0 && self.grpc_port == self.http_port {
            anyhow::bail!("gRPC and HTTP ports must differ");
        }
        Ok(())
    }
}

fn parse_addr(bind: &str, port: u16) -> anyhow::Result<SocketAddr> {
    use anyhow::Context;
    format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Failed to parse bind address {}:{}", bind, port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::parse_from(["filedrop-server"]);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_addresses() {
        let config = ServerConfig::parse_from([
            "filedrop-server",
            "--bind",
            "127.0.0.1",
            "--grpc-port",
            "6000",
            "--http-port",
            "6001",
        ]);
        assert_eq!(config.grpc_addr().unwrap().to_string(), "127.0.0.1:6000");
        assert_eq!(config.http_addr().unwrap().to_string(), "127.0.0.1:6001");
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = ServerConfig::parse_from(["filedrop-server", "--chunk-size", "0"]);
        assert!(config.validate().is_err());

        config.chunk_size = 1024;
        config.bind = "not an address".to_string();
        assert!(config.grpc_addr().is_err());
    }
}
