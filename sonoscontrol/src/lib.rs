//! # sonoscontrol
//!
//! Blocking control client for Sonos speakers on the local network.
//!
//! ```no_run
//! use sonoscontrol::{ControllerConfig, SonosController};
//!
//! let controller = SonosController::new(ControllerConfig::default());
//! for device in controller.list_devices() {
//!     println!("{} ({})", device.name, device.address);
//! }
//! controller.set_volume("Living Room", 25);
//! if let Some(track) = controller.query_now_playing("Living Room") {
//!     println!("{} - {}", track.artist, track.title);
//! }
//! ```

pub mod avtransport_client;
pub mod config;
pub mod controller;
pub mod description;
pub mod discovery;
pub mod errors;
pub mod logging;
pub mod model;
pub mod rendering_control_client;
pub mod soap_client;
pub mod transport;

pub use avtransport_client::AvTransportClient;
pub use config::ControllerConfig;
pub use controller::SonosController;
pub use discovery::{DeviceSearch, SsdpDeviceSearch};
pub use errors::ControlError;
pub use logging::init_logging;
pub use model::{Device, TrackInfo, UNKNOWN};
pub use rendering_control_client::{RenderingControlClient, clamp_volume};
pub use soap_client::invoke_upnp_action;
pub use transport::{HttpResponse, HttpTransport, UreqTransport};
