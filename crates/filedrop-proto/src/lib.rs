/// Generated gRPC protocol definitions for filedrop.
///
/// This crate provides the protocol buffer definitions and generated code
/// shared by the transfer server and the transfer client.
pub mod filedrop {
    pub mod v1 {
        tonic::include_proto!("filedrop.v1");
    }
}

/// Encoded file descriptor set, used to serve gRPC reflection.
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("filedrop_descriptor");

// Re-export commonly used types for convenience
pub use filedrop::v1::*;
