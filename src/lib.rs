//! Portbind - a UPnP port mapping manager
//!
//! This library provides the core functionality for Portbind, an interactive
//! console tool that opens, closes, queries and persists port mappings on the
//! local router through the UPnP IGD protocol.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod binding;
pub mod cli;
pub mod command;
pub mod config;
pub mod console;
pub mod gateway;
pub mod registry;

use binding::Binding;

/// Result type alias for Portbind operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Portbind operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Port number outside the mappable range
    #[error("Invalid port number: {0}. Accepted range: 0-65535.")]
    PortOutOfRange(u32),

    /// Binding already present in the registry
    #[error("Binding already exists.")]
    DuplicateBinding(Binding),

    /// Position past the end of the registry
    #[error("Index out of range. Bindings registered: {len}.")]
    IndexOutOfRange {
        /// The rejected zero-based position
        index: usize,
        /// Number of bindings currently registered
        len: usize,
    },

    /// File could not be read or written
    #[error("{0}")]
    Io(String),

    /// Config contents could not be decoded
    #[error("{0}")]
    Parse(String),

    /// No UPnP gateway answered discovery
    #[error("No UPnP gateway found on this network")]
    NoGateway,

    /// The gateway rejected or failed a mapping operation
    #[error("{0}")]
    Gateway(String),
}

/// Initialize the Portbind library with logging
///
/// Log records go to stderr so they never interleave with console
/// responses on stdout. `RUST_LOG` overrides the default `warn` level.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests;
