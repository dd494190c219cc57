//! Shared test support

use crate::binding::Protocol;
use crate::gateway::GatewayClient;
use crate::{Error, Result};
use std::cell::{Cell, RefCell};
use std::net::{IpAddr, Ipv4Addr};

/// Scriptable stand-in for a UPnP gateway.
///
/// The mapping table lives behind a `RefCell` so tests can keep inspecting
/// the fake after handing it to a registry that borrows it immutably.
#[derive(Default)]
pub struct FakeGateway {
    mappings: RefCell<Vec<(Protocol, u16)>>,
    fail_open: Cell<bool>,
    fail_query: Cell<bool>,
    open_calls: Cell<usize>,
    close_calls: Cell<usize>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a router-side mapping, as if another program had created it.
    pub fn with_mapping(self, protocol: Protocol, port: u16) -> Self {
        self.mappings.borrow_mut().push((protocol, port));
        self
    }

    /// Makes every subsequent open request fail.
    pub fn refuse_opens(&self) {
        self.fail_open.set(true);
    }

    /// Makes every subsequent mapping-table lookup fail.
    pub fn refuse_queries(&self) {
        self.fail_query.set(true);
    }

    pub fn mapped(&self, protocol: Protocol, port: u16) -> bool {
        self.mappings.borrow().contains(&(protocol, port))
    }

    pub fn open_calls(&self) -> usize {
        self.open_calls.get()
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.get()
    }
}

impl GatewayClient for FakeGateway {
    fn open_mapping(&self, protocol: Protocol, port: u16) -> Result<()> {
        self.open_calls.set(self.open_calls.get() + 1);
        if self.fail_open.get() {
            return Err(Error::Gateway(
                "AddPortMapping failed: 718 ConflictInMappingEntry".to_string(),
            ));
        }
        self.mappings.borrow_mut().push((protocol, port));
        Ok(())
    }

    fn close_mapping(&self, protocol: Protocol, port: u16) -> Result<()> {
        self.close_calls.set(self.close_calls.get() + 1);
        let mut mappings = self.mappings.borrow_mut();
        match mappings.iter().position(|&entry| entry == (protocol, port)) {
            Some(index) => {
                mappings.remove(index);
                Ok(())
            }
            None => Err(Error::Gateway(
                "DeletePortMapping failed: 714 NoSuchEntryInArray".to_string(),
            )),
        }
    }

    fn is_mapped(&self, protocol: Protocol, port: u16) -> Result<bool> {
        if self.fail_query.get() {
            return Err(Error::Gateway(
                "GetGenericPortMappingEntry failed: 501 ActionFailed".to_string(),
            ));
        }
        Ok(self.mapped(protocol, port))
    }

    fn local_address(&self) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(192, 168, 1, 23))
    }

    fn external_address(&self) -> Result<IpAddr> {
        Ok(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 10)))
    }

    fn gateway_address(&self) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1))
    }
}
