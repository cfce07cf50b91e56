/*!
 * filedrop - command line client for filedrop servers
 *
 * The binary is a thin shell over [`commands`]; transfers themselves live in
 * `filedrop-connect`.
 */

pub mod cli;
pub mod cli_style;
pub mod commands;
pub mod logging;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
