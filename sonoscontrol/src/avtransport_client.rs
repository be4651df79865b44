use std::time::Duration;

use sonosupnp::xml::scan_element_texts;

use crate::errors::ControlError;
use crate::model::TrackInfo;
use crate::soap_client::{ensure_ok, invoke_upnp_action};
use crate::transport::HttpTransport;

pub const AVTRANSPORT_SERVICE: &str = "urn:schemas-upnp-org:service:AVTransport:1";

const TITLE_TAG: &str = "dc:title";
const CREATOR_TAG: &str = "dc:creator";
const ALBUM_TAG: &str = "upnp:album";
const TRACK_METADATA_TAG: &str = "TrackMetaData";

pub struct AvTransportClient<'a> {
    transport: &'a dyn HttpTransport,
    pub control_url: String,
    pub service_type: String,
    timeout: Duration,
}

impl<'a> AvTransportClient<'a> {
    pub fn new(transport: &'a dyn HttpTransport, control_url: String, timeout: Duration) -> Self {
        Self {
            transport,
            control_url,
            service_type: AVTRANSPORT_SERVICE.to_string(),
            timeout,
        }
    }

    /// AVTransport:1: Play (Speed 1)
    pub fn play(&self, instance_id: u32) -> Result<(), ControlError> {
        let instance_id_str = instance_id.to_string();
        self.call("Play", &[("InstanceID", instance_id_str.as_str()), ("Speed", "1")])
            .map(|_| ())
    }

    /// AVTransport:1: Pause
    pub fn pause(&self, instance_id: u32) -> Result<(), ControlError> {
        let instance_id_str = instance_id.to_string();
        self.call("Pause", &[("InstanceID", instance_id_str.as_str())])
            .map(|_| ())
    }

    /// AVTransport:1: Stop
    pub fn stop(&self, instance_id: u32) -> Result<(), ControlError> {
        let instance_id_str = instance_id.to_string();
        self.call("Stop", &[("InstanceID", instance_id_str.as_str())])
            .map(|_| ())
    }

    /// AVTransport:1: GetPositionInfo, reduced to the current track's
    /// title, artist and album.
    pub fn get_position_info(&self, instance_id: u32) -> Result<TrackInfo, ControlError> {
        let instance_id_str = instance_id.to_string();
        let raw_body = self.call("GetPositionInfo", &[("InstanceID", instance_id_str.as_str())])?;
        Ok(parse_track_info(&raw_body))
    }

    fn call(&self, action: &str, args: &[(&str, &str)]) -> Result<String, ControlError> {
        let call_result = invoke_upnp_action(
            self.transport,
            &self.control_url,
            &self.service_type,
            action,
            args,
            self.timeout,
        )?;

        ensure_ok(action, &call_result)?;
        Ok(call_result.raw_body)
    }
}

/// Extracts title/artist/album from a GetPositionInfo body.
///
/// The fields are looked up both directly in the body and inside the
/// escaped DIDL-Lite document carried by `TrackMetaData`.
pub fn parse_track_info(raw_body: &str) -> TrackInfo {
    let mut fields = scan_element_texts(
        raw_body,
        &[TITLE_TAG, CREATOR_TAG, ALBUM_TAG],
        &[TRACK_METADATA_TAG],
    );

    TrackInfo::from_fields(
        fields.remove(TITLE_TAG),
        fields.remove(CREATOR_TAG),
        fields.remove(ALBUM_TAG),
    )
}
