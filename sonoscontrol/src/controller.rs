//! Public surface of the control client.
//!
//! Every operation is a fresh, blocking discover-then-act round trip: the
//! roster is never cached, so a command addresses whatever currently answers
//! under the requested name. Failures are logged with their reason and
//! reported as `false` / `None`.

use tracing::{info, warn};

use crate::avtransport_client::AvTransportClient;
use crate::config::ControllerConfig;
use crate::discovery::{DeviceSearch, SsdpDeviceSearch, discover_devices, find_device};
use crate::errors::ControlError;
use crate::model::{Device, TrackInfo};
use crate::rendering_control_client::{MASTER_CHANNEL, RenderingControlClient, clamp_volume};
use crate::transport::{HttpTransport, UreqTransport};

/// AVTransport / RenderingControl instance addressed by every action.
pub const INSTANCE_ID: u32 = 0;

pub struct SonosController<S = SsdpDeviceSearch, T = UreqTransport> {
    config: ControllerConfig,
    search: S,
    transport: T,
}

impl SonosController<SsdpDeviceSearch, UreqTransport> {
    /// Controller talking to the real network.
    pub fn new(config: ControllerConfig) -> Self {
        Self::with_parts(config, SsdpDeviceSearch, UreqTransport)
    }
}

impl Default for SonosController<SsdpDeviceSearch, UreqTransport> {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}

impl<S, T> SonosController<S, T>
where
    S: DeviceSearch,
    T: HttpTransport,
{
    pub fn with_parts(config: ControllerConfig, search: S, transport: T) -> Self {
        Self {
            config,
            search,
            transport,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs a discovery and returns the speakers that answered, in arrival
    /// order.
    pub fn list_devices(&self) -> Vec<Device> {
        discover_devices(&self.search, &self.transport, &self.config)
    }

    /// Speaker currently answering under `name`.
    pub fn resolve(&self, name: &str) -> Option<Device> {
        match self.try_resolve(name) {
            Ok(device) => Some(device),
            Err(err) => {
                warn!("{}", err);
                None
            }
        }
    }

    pub fn play(&self, name: &str) -> bool {
        self.run("Play", name, |device| self.av_transport(device).play(INSTANCE_ID))
            .is_some()
    }

    pub fn pause(&self, name: &str) -> bool {
        self.run("Pause", name, |device| self.av_transport(device).pause(INSTANCE_ID))
            .is_some()
    }

    pub fn stop(&self, name: &str) -> bool {
        self.run("Stop", name, |device| self.av_transport(device).stop(INSTANCE_ID))
            .is_some()
    }

    /// Sets the master volume; `level` is clamped to `0..=100`.
    pub fn set_volume(&self, name: &str, level: i32) -> bool {
        let volume = clamp_volume(level);
        if i32::from(volume) != level {
            info!("Requested volume {} clamped to {}", level, volume);
        }

        self.run("SetVolume", name, |device| {
            self.rendering_control(device)
                .set_volume(INSTANCE_ID, MASTER_CHANNEL, volume)
        })
        .is_some()
    }

    /// Title, artist and album of the current track.
    pub fn query_now_playing(&self, name: &str) -> Option<TrackInfo> {
        self.run("GetPositionInfo", name, |device| {
            self.av_transport(device).get_position_info(INSTANCE_ID)
        })
    }

    fn try_resolve(&self, name: &str) -> Result<Device, ControlError> {
        find_device(self.list_devices(), name)
    }

    fn run<R, F>(&self, action: &str, name: &str, op: F) -> Option<R>
    where
        F: FnOnce(&Device) -> Result<R, ControlError>,
    {
        let result = self.try_resolve(name).and_then(|device| {
            let outcome = op(&device);
            if outcome.is_ok() {
                info!("{} succeeded on '{}' ({})", action, name, device.address);
            }
            outcome
        });

        match result {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("{} on '{}' failed: {}", action, name, err);
                None
            }
        }
    }

    fn av_transport(&self, device: &Device) -> AvTransportClient<'_> {
        AvTransportClient::new(
            &self.transport,
            self.config.avtransport_url(&device.address),
            self.config.http_timeout(),
        )
    }

    fn rendering_control(&self, device: &Device) -> RenderingControlClient<'_> {
        RenderingControlClient::new(
            &self.transport,
            self.config.rendering_control_url(&device.address),
            self.config.http_timeout(),
        )
    }
}
