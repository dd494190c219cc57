//! Port binding value objects
//!
//! A [`Binding`] is an immutable (protocol, port) pair. It carries no
//! liveness state of its own; whether the mapping is currently held by the
//! gateway is re-checked on demand through a [`GatewayClient`].

use crate::console;
use crate::gateway::GatewayClient;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// Transport protocol of a port mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    /// Transmission Control Protocol
    TCP,
    /// User Datagram Protocol
    UDP,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::TCP => write!(f, "TCP"),
            Protocol::UDP => write!(f, "UDP"),
        }
    }
}

impl FromStr for Protocol {
    type Err = Error;

    /// Parses a protocol token, case-insensitively
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Protocol::TCP),
            "udp" => Ok(Protocol::UDP),
            other => Err(Error::Parse(format!("Unknown protocol: {}", other))),
        }
    }
}

/// A (protocol, port) pair tracked by the registry
///
/// Two bindings are equal when both fields match. Serializes as
/// `{"protocol":"TCP","port":8080}` in the persisted config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// Transport protocol of the mapping
    pub protocol: Protocol,
    /// External port number
    pub port: u16,
}

impl Binding {
    /// Creates a binding for the given pair
    pub fn new(protocol: Protocol, port: u16) -> Self {
        Self { protocol, port }
    }

    /// Asks the gateway to open this mapping
    ///
    /// # Returns
    /// `Ok(())` once the gateway accepted the mapping, or a gateway error
    /// fit for reporting to the user.
    pub fn connect<G: GatewayClient>(&self, gateway: &G) -> Result<()> {
        gateway.open_mapping(self.protocol, self.port).map_err(|e| {
            warn!("Mapping request failed for {}: {}", self, e);
            Error::Gateway(format!(
                "Failed to open {} port: {}",
                self.protocol, self.port
            ))
        })?;

        info!("Opened {} port {}", self.protocol, self.port);
        Ok(())
    }

    /// Asks the gateway to drop this mapping
    ///
    /// Best effort: the outcome comes back as a report line, never as an
    /// error, so shutdown can keep closing the remaining bindings.
    pub fn close_mapping<G: GatewayClient>(&self, gateway: &G) -> String {
        match gateway.close_mapping(self.protocol, self.port) {
            Ok(()) => {
                info!("Closed {} port {}", self.protocol, self.port);
                console::response(&format!(
                    "Successfully closed {} port: {}",
                    self.protocol, self.port
                ))
            }
            Err(e) => {
                warn!("Close request failed for {}: {}", self, e);
                console::error(&format!(
                    "Failed to close {} port: {}",
                    self.protocol, self.port
                ))
            }
        }
    }

    /// Checks whether the gateway currently holds this mapping
    ///
    /// The probe is informational; a gateway failure reads as closed.
    pub fn is_open<G: GatewayClient>(&self, gateway: &G) -> bool {
        match gateway.is_mapped(self.protocol, self.port) {
            Ok(open) => open,
            Err(e) => {
                warn!("Mapping check failed for {}: {}", self, e);
                false
            }
        }
    }

    /// Describes the binding together with its live open state
    pub fn describe<G: GatewayClient>(&self, gateway: &G) -> String {
        format!(
            "{}: {} Open: {}",
            self.protocol,
            self.port,
            self.is_open(gateway)
        )
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.protocol, self.port)
    }
}
