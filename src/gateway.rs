//! Gateway discovery and control through UPnP IGD
//!
//! Discovery uses SSDP (Simple Service Discovery Protocol) to find an IGD
//! device on the local network, then SOAP to drive its WANIPConnection
//! service. Everything behind [`GatewayClient`] does blocking network I/O;
//! commands resolve one at a time, so no work is deferred to a runtime.

use crate::binding::Protocol;
use crate::{Error, Result};
use igd_next::{Gateway, GetGenericPortMappingEntryError, PortMappingProtocol, SearchOptions};
use std::net::{IpAddr, SocketAddr, UdpSocket};
use std::time::Duration;
use tracing::{debug, info};

/// Default timeout for gateway discovery
pub const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Lease duration requested for each mapping, in seconds. Zero keeps the
/// mapping until it is explicitly removed.
const LEASE_DURATION_SECS: u32 = 0;

/// Boundary to the router's port mapping control service
///
/// The registry talks to the gateway only through this trait, which keeps
/// the binding lifecycle testable without a router on the network.
pub trait GatewayClient {
    /// Asks the gateway to map an external port onto this host
    fn open_mapping(&self, protocol: Protocol, port: u16) -> Result<()>;

    /// Asks the gateway to drop a mapping
    fn close_mapping(&self, protocol: Protocol, port: u16) -> Result<()>;

    /// Checks whether the gateway currently holds a mapping for the pair
    fn is_mapped(&self, protocol: Protocol, port: u16) -> Result<bool>;

    /// LAN address of this host, as used for mappings
    fn local_address(&self) -> IpAddr;

    /// Public address reported by the gateway. Queried live, never cached.
    fn external_address(&self) -> Result<IpAddr>;

    /// Address of the gateway device itself
    fn gateway_address(&self) -> IpAddr;
}

/// Production gateway client backed by a discovered UPnP IGD device
pub struct UpnpGateway {
    gateway: Gateway,
    local_ip: IpAddr,
}

impl UpnpGateway {
    /// Searches the local network for an IGD gateway
    ///
    /// This doubles as the availability check: it is called once at startup
    /// and a failure means no mapping operation can ever succeed.
    ///
    /// # Arguments
    /// * `timeout` - How long to wait for an SSDP answer
    pub fn discover(timeout: Duration) -> Result<Self> {
        debug!("Searching for UPnP IGD gateway...");
        let gateway = igd_next::search_gateway(SearchOptions {
            timeout: Some(timeout),
            ..Default::default()
        })
        .map_err(|e| {
            debug!("UPnP gateway search failed: {}", e);
            Error::NoGateway
        })?;

        let local_ip = local_ip_for(&gateway)?;
        info!("Found UPnP gateway at {}", gateway.addr);

        Ok(Self { gateway, local_ip })
    }
}

impl GatewayClient for UpnpGateway {
    fn open_mapping(&self, protocol: Protocol, port: u16) -> Result<()> {
        // Description format: "portbind-{protocol}-{port}"
        let description = format!("portbind-{}-{}", protocol, port);
        let local_addr = SocketAddr::new(self.local_ip, port);

        debug!("Adding port mapping: {} -> {}", local_addr, port);
        self.gateway
            .add_port(
                upnp_protocol(protocol),
                port,
                local_addr,
                LEASE_DURATION_SECS,
                &description,
            )
            .map_err(|e| Error::Gateway(format!("AddPortMapping failed: {}", e)))
    }

    fn close_mapping(&self, protocol: Protocol, port: u16) -> Result<()> {
        debug!("Removing port mapping: {} {}", protocol, port);
        self.gateway
            .remove_port(upnp_protocol(protocol), port)
            .map_err(|e| Error::Gateway(format!("DeletePortMapping failed: {}", e)))
    }

    fn is_mapped(&self, protocol: Protocol, port: u16) -> Result<bool> {
        let wanted = upnp_protocol(protocol);

        // Walk the gateway's mapping table until the index runs off the end.
        let mut index = 0;
        loop {
            match self.gateway.get_generic_port_mapping_entry(index) {
                Ok(entry) => {
                    if entry.enabled && entry.protocol == wanted && entry.external_port == port {
                        return Ok(true);
                    }
                    index += 1;
                }
                Err(GetGenericPortMappingEntryError::SpecifiedArrayIndexInvalid) => {
                    return Ok(false);
                }
                Err(e) => {
                    return Err(Error::Gateway(format!(
                        "GetGenericPortMappingEntry failed: {}",
                        e
                    )));
                }
            }
        }
    }

    fn local_address(&self) -> IpAddr {
        self.local_ip
    }

    fn external_address(&self) -> Result<IpAddr> {
        self.gateway
            .get_external_ip()
            .map_err(|e| Error::Gateway(format!("GetExternalIPAddress failed: {}", e)))
    }

    fn gateway_address(&self) -> IpAddr {
        self.gateway.addr.ip()
    }
}

fn upnp_protocol(protocol: Protocol) -> PortMappingProtocol {
    match protocol {
        Protocol::TCP => PortMappingProtocol::TCP,
        Protocol::UDP => PortMappingProtocol::UDP,
    }
}

/// Get the local IP address used to reach the gateway
///
/// Connects a UDP socket toward the gateway to let the OS pick the
/// LAN-facing interface. No data is sent.
fn local_ip_for(gateway: &Gateway) -> Result<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0")
        .map_err(|e| Error::Gateway(format!("Failed to create socket: {}", e)))?;

    socket
        .connect(gateway.addr)
        .map_err(|e| Error::Gateway(format!("Failed to connect: {}", e)))?;

    let local_addr = socket
        .local_addr()
        .map_err(|e| Error::Gateway(format!("Failed to get local address: {}", e)))?;

    Ok(local_addr.ip())
}
