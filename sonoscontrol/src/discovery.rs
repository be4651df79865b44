use std::io;
use std::net::IpAddr;

use sonosupnp::ssdp::{SsdpClient, SsdpResponse};
use tracing::{debug, info, warn};

use crate::config::ControllerConfig;
use crate::description::resolve_device_name;
use crate::errors::ControlError;
use crate::model::Device;
use crate::transport::HttpTransport;

/// Source of the addresses that answer a presence search.
///
/// Implementations never fail: a fault ends the search early and the
/// addresses gathered so far are returned.
pub trait DeviceSearch: Send + Sync {
    /// Addresses of the speakers that replied, in arrival order.
    fn search(&self, config: &ControllerConfig) -> Vec<IpAddr>;
}

/// SSDP M-SEARCH over the real network.
#[derive(Debug, Clone, Copy, Default)]
pub struct SsdpDeviceSearch;

impl DeviceSearch for SsdpDeviceSearch {
    fn search(&self, config: &ControllerConfig) -> Vec<IpAddr> {
        let mut responses = Vec::new();

        if let Err(err) = run_ssdp_search(config, &mut responses) {
            let err = ControlError::Discovery(err);
            warn!(
                "SSDP search aborted after {} replies: {}",
                responses.len(),
                err
            );
        }

        responses.iter().map(|r| r.from.ip()).collect()
    }
}

// The client (and its socket) is dropped on every return path.
fn run_ssdp_search(config: &ControllerConfig, out: &mut Vec<SsdpResponse>) -> io::Result<()> {
    let client = SsdpClient::new()?;
    search_with(&client, config, out)
}

fn search_with(
    client: &SsdpClient,
    config: &ControllerConfig,
    out: &mut Vec<SsdpResponse>,
) -> io::Result<()> {
    client.send_msearch(&config.search_target, config.mx)?;

    let marker = config.vendor_marker.as_str();
    client.collect_responses(config.discovery_window(), |data| data.contains(marker), out)
}

/// Runs one search and names every speaker that answered.
///
/// Several replies from the same address produce a single device, kept at
/// the position of its first reply.
pub fn discover_devices(
    search: &dyn DeviceSearch,
    transport: &dyn HttpTransport,
    config: &ControllerConfig,
) -> Vec<Device> {
    let mut addresses = search.search(config);
    dedup_in_order(&mut addresses);

    let devices: Vec<Device> = addresses
        .into_iter()
        .map(|ip| {
            let address = ip.to_string();
            let name = resolve_device_name(transport, config, &address);
            debug!("Discovered '{}' at {}", name, address);
            Device::new(name, address)
        })
        .collect();

    info!("Discovery found {} speaker(s)", devices.len());
    devices
}

/// First device of `roster` named exactly `name`.
///
/// With duplicate names the earliest reply wins; the ambiguity is logged.
pub fn find_device(roster: Vec<Device>, name: &str) -> Result<Device, ControlError> {
    let mut matches = roster.into_iter().filter(|d| d.name == name);

    let first = matches.next().ok_or_else(|| ControlError::not_found(name))?;

    let others: Vec<String> = matches.map(|d| d.address).collect();
    if !others.is_empty() {
        warn!(
            "Several speakers are named '{}': using {}, ignoring {}",
            name,
            first.address,
            others.join(", ")
        );
    }

    Ok(first)
}

fn dedup_in_order(addresses: &mut Vec<IpAddr>) {
    let mut seen = Vec::with_capacity(addresses.len());
    addresses.retain(|ip| {
        if seen.contains(ip) {
            false
        } else {
            seen.push(*ip);
            true
        }
    });
}
