use std::time::Duration;

use crate::errors::ControlError;
use crate::soap_client::{ensure_ok, invoke_upnp_action};
use crate::transport::HttpTransport;

pub const RENDERING_CONTROL_SERVICE: &str = "urn:schemas-upnp-org:service:RenderingControl:1";
pub const MASTER_CHANNEL: &str = "Master";

pub const MIN_VOLUME: u8 = 0;
pub const MAX_VOLUME: u8 = 100;

/// Brings any requested level into `[MIN_VOLUME, MAX_VOLUME]`.
pub fn clamp_volume(level: i32) -> u8 {
    level.clamp(MIN_VOLUME as i32, MAX_VOLUME as i32) as u8
}

pub struct RenderingControlClient<'a> {
    transport: &'a dyn HttpTransport,
    pub control_url: String,
    pub service_type: String,
    timeout: Duration,
}

impl<'a> RenderingControlClient<'a> {
    pub fn new(transport: &'a dyn HttpTransport, control_url: String, timeout: Duration) -> Self {
        Self {
            transport,
            control_url,
            service_type: RENDERING_CONTROL_SERVICE.to_string(),
            timeout,
        }
    }

    /// RenderingControl:1: SetVolume
    pub fn set_volume(
        &self,
        instance_id: u32,
        channel: &str,
        volume: u8,
    ) -> Result<(), ControlError> {
        let instance_id_str = instance_id.to_string();
        let volume_str = volume.min(MAX_VOLUME).to_string();
        let args = [
            ("InstanceID", instance_id_str.as_str()),
            ("Channel", channel),
            ("DesiredVolume", volume_str.as_str()),
        ];

        let call_result = invoke_upnp_action(
            self.transport,
            &self.control_url,
            &self.service_type,
            "SetVolume",
            &args,
            self.timeout,
        )?;

        ensure_ok("SetVolume", &call_result)
    }
}
