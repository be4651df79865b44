//! # sonosupnp
//!
//! UPnP plumbing used by the Sonos control client:
//!
//! - [`ssdp`] : M-SEARCH emission and collection of unicast search replies
//! - [`soap`] : construction of SOAP action requests and parsing of responses/faults
//! - [`xml`]  : tolerant extraction of element texts from device documents
//!
//! Nothing here knows about speaker names or playback semantics; that lives
//! in the `sonoscontrol` crate.

pub mod soap;
pub mod ssdp;
pub mod xml;
