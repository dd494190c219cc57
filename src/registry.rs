//! Binding registry and lifecycle management
//!
//! The registry is the single owner of all tracked bindings: an
//! insertion-ordered list with uniqueness on the (protocol, port) pair. It
//! drives every mapping operation against the gateway client it owns, and
//! leaves itself unchanged whenever an operation fails.

use crate::binding::{Binding, Protocol};
use crate::console;
use crate::gateway::GatewayClient;
use crate::{Error, Result};
use tracing::{debug, info};

/// Outcome of a bulk open
pub struct BulkOpen {
    /// Number of bindings appended to the registry
    pub added: usize,
    /// Per-binding report lines, in processing order
    pub reports: Vec<String>,
}

/// Insertion-ordered collection of unique bindings
pub struct BindingRegistry<G> {
    gateway: G,
    bindings: Vec<Binding>,
}

impl<G: GatewayClient> BindingRegistry<G> {
    /// Creates an empty registry around a gateway client
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            bindings: Vec::new(),
        }
    }

    /// The gateway this registry drives
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Registered bindings, in insertion order
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Number of registered bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Looks up a registered binding by pair
    pub fn find(&self, protocol: Protocol, port: u16) -> Option<&Binding> {
        self.bindings
            .iter()
            .find(|b| b.protocol == protocol && b.port == port)
    }

    /// Opens a new mapping and registers it
    ///
    /// # Returns
    /// The success report line. The registry is left unchanged when the
    /// port is out of range, the pair is already registered, or the
    /// gateway declines the mapping.
    pub fn open(&mut self, protocol: Protocol, port: u32) -> Result<String> {
        let port = checked_port(port)?;

        let binding = Binding::new(protocol, port);
        if self.find(protocol, port).is_some() {
            return Err(Error::DuplicateBinding(binding));
        }

        binding.connect(&self.gateway)?;
        self.bindings.push(binding);
        debug!("Registered {}", binding);

        Ok(open_report(&binding))
    }

    /// Opens and registers every binding from a loaded config
    ///
    /// Pairs already registered are skipped. Everything else is appended
    /// even when the gateway declines the mapping: a reloaded config still
    /// repopulates the registry while the router holds the mappings from a
    /// previous session.
    pub fn open_all(&mut self, incoming: Vec<Binding>) -> BulkOpen {
        let mut added = 0;
        let mut reports = Vec::new();

        for binding in incoming {
            if self.find(binding.protocol, binding.port).is_some() {
                debug!("Skipping already registered binding {}", binding);
                continue;
            }

            match binding.connect(&self.gateway) {
                Ok(()) => reports.push(open_report(&binding)),
                Err(e) => reports.push(console::error(&e.to_string())),
            }
            self.bindings.push(binding);
            added += 1;
        }

        info!("Registered {} bindings from config", added);
        BulkOpen { added, reports }
    }

    /// Closes a mapping by pair
    ///
    /// A registered pair is deregistered and closed. An unregistered pair
    /// is still closed against the gateway directly, which covers mappings
    /// left behind by earlier sessions or other programs.
    pub fn close(&mut self, protocol: Protocol, port: u32) -> Result<String> {
        let port = checked_port(port)?;

        match self.position(protocol, port) {
            Some(index) => {
                let binding = self.bindings.remove(index);
                info!("Deregistered {}", binding);
                Ok(format!(
                    "{} and removed it from config.",
                    binding.close_mapping(&self.gateway)
                ))
            }
            None => match self.gateway.close_mapping(protocol, port) {
                Ok(()) => Ok(console::response(&format!(
                    "Successfully closed port {}:{}",
                    protocol, port
                ))),
                Err(e) => {
                    debug!("Forced close failed for {}:{}: {}", protocol, port, e);
                    Err(Error::Gateway(format!(
                        "Could not close port {}:{}",
                        protocol, port
                    )))
                }
            },
        }
    }

    /// Closes and deregisters the binding at a zero-based position
    pub fn close_index(&mut self, index: usize) -> Result<String> {
        if index >= self.bindings.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.bindings.len(),
            });
        }

        let binding = self.bindings.remove(index);
        info!("Deregistered {}", binding);
        Ok(binding.close_mapping(&self.gateway))
    }

    /// Reports a pair's registration and live open state
    ///
    /// An unregistered pair is still probed against the gateway, without
    /// creating an entry.
    pub fn query(&self, protocol: Protocol, port: u32) -> Result<String> {
        let port = checked_port(port)?;

        match self.find(protocol, port) {
            Some(binding) => Ok(console::response(&format!(
                "Binding registered as {}",
                binding.describe(&self.gateway)
            ))),
            None => {
                let probe = Binding::new(protocol, port);
                Ok(console::response(&format!(
                    "Binding unregistered. Port open: {}",
                    probe.is_open(&self.gateway)
                )))
            }
        }
    }

    /// Closes every registered mapping. Entries stay registered.
    ///
    /// Shutdown path: each outcome is reported, and a failed close never
    /// stops the remaining bindings from being processed.
    pub fn close_all(&self) -> Vec<String> {
        self.bindings
            .iter()
            .map(|binding| binding.close_mapping(&self.gateway))
            .collect()
    }

    fn position(&self, protocol: Protocol, port: u16) -> Option<usize> {
        self.bindings
            .iter()
            .position(|b| b.protocol == protocol && b.port == port)
    }
}

/// Port range check shared by all pair-taking operations
fn checked_port(port: u32) -> Result<u16> {
    u16::try_from(port).map_err(|_| Error::PortOutOfRange(port))
}

fn open_report(binding: &Binding) -> String {
    console::response(&format!(
        "Successfully opened {} port: {}",
        binding.protocol, binding.port
    ))
}
