//! # Module SSDP - Simple Service Discovery Protocol
//!
//! Control point side of SSDP: a single M-SEARCH is multicast and the unicast
//! `HTTP/1.1 200 OK` replies are collected on the same ephemeral socket.
//!
//! ## Constants SSDP
//!
//! - **Multicast Address**: 239.255.255.250:1900
//! - **Max-Age**: 1800 secondes (used when a reply carries no CACHE-CONTROL)

mod client;

pub use client::{SsdpClient, SsdpResponse, msearch_message, parse_response};

/// Adresse multicast SSDP
pub const SSDP_MULTICAST_ADDR: &str = "239.255.255.250";

/// Port SSDP
pub const SSDP_PORT: u16 = 1900;

/// Durée de validité par défaut des annonces (en secondes)
pub const MAX_AGE: u32 = 1800;

/// Search target of Sonos players.
pub const ZONE_PLAYER_ST: &str = "urn:schemas-upnp-org:device:ZonePlayer:1";

/// MX hint sent with M-SEARCH requests.
pub const DEFAULT_MX: u32 = 3;
