//! Tolerant extraction of element texts.
//!
//! Device documents are read with a streaming, non-validating reader: the
//! text of the first occurrence of each wanted element is kept, attributes
//! and whitespace are ignored, and a parse error simply ends the scan with
//! whatever was found so far. A first occurrence that is empty counts as
//! missing; later occurrences are not consulted.
//!
//! Elements listed as *nested* carry track metadata (e.g. `TrackMetaData`
//! holding DIDL-Lite). Their children are scanned like the rest of the
//! document, and when the metadata arrives as escaped text instead, that
//! text is unescaped and scanned in turn.
//!
//! Wanted names containing a `:` match the qualified name exactly
//! (`dc:title`); names without a prefix match the local name, so
//! `friendlyName` also matches `<d:friendlyName>`.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::Event;
use tracing::trace;

const MAX_NESTING: usize = 2;

/// Scans `xml` for the first text of each element in `wanted`, descending
/// into the metadata carried by elements in `nested`.
///
/// The returned map is keyed by the wanted name as given and never holds
/// empty values.
pub fn scan_element_texts(
    xml: &str,
    wanted: &[&str],
    nested: &[&str],
) -> HashMap<String, String> {
    let mut found = HashMap::new();
    scan_into(xml, wanted, nested, &mut found, 0);
    found.retain(|_, text| !text.is_empty());
    found
}

/// Text of the first element named `tag`, `None` when it is absent or empty.
pub fn first_element_text(xml: &str, tag: &str) -> Option<String> {
    scan_element_texts(xml, &[tag], &[]).remove(tag)
}

struct Capture {
    key: String,
    depth: usize,
    raw: String,
}

impl Capture {
    fn open(key: &str) -> Self {
        Self {
            key: key.to_string(),
            depth: 0,
            raw: String::new(),
        }
    }
}

fn matches_name(wanted: &str, qname: &str) -> bool {
    if wanted.contains(':') {
        wanted == qname
    } else {
        let local = qname.rsplit(':').next().unwrap_or(qname);
        wanted == local
    }
}

/// Wanted name matching `qname` that has not been seen yet.
fn unseen_wanted<'w>(
    wanted: &[&'w str],
    qname: &str,
    found: &HashMap<String, String>,
) -> Option<&'w str> {
    wanted
        .iter()
        .copied()
        .find(|w| matches_name(w, qname) && !found.contains_key(*w))
}

// `value` collects the text of a wanted element. `metadata` stays open for
// the whole nested element so its escaped text can be rescanned, while its
// child elements are still matched against `wanted`.
fn scan_into(
    xml: &str,
    wanted: &[&str],
    nested: &[&str],
    found: &mut HashMap<String, String>,
    level: usize,
) {
    let mut reader = Reader::from_str(xml);
    let mut value: Option<Capture> = None;
    let mut metadata: Option<Capture> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if let Some(meta) = metadata.as_mut() {
                    meta.depth += 1;
                }
                if let Some(open) = value.as_mut() {
                    open.depth += 1;
                    continue;
                }
                let qname = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if let Some(key) = unseen_wanted(wanted, &qname, found) {
                    value = Some(Capture::open(key));
                } else if metadata.is_none() {
                    if let Some(key) = nested.iter().find(|n| matches_name(n, &qname)) {
                        metadata = Some(Capture::open(key));
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                if value.is_none() {
                    let qname = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    if let Some(key) = unseen_wanted(wanted, &qname, found) {
                        found.insert(key.to_string(), String::new());
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(open) = text_sink(&mut value, &mut metadata) {
                    match t.decode() {
                        Ok(text) => open.raw.push_str(&text),
                        Err(err) => trace!("Undecodable text in <{}>: {}", open.key, err),
                    }
                }
            }
            Ok(Event::GeneralRef(r)) => {
                if let Some(open) = text_sink(&mut value, &mut metadata) {
                    if let Ok(name) = r.decode() {
                        open.raw.push('&');
                        open.raw.push_str(&name);
                        open.raw.push(';');
                    }
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(open) = text_sink(&mut value, &mut metadata) {
                    if let Ok(text) = c.decode() {
                        open.raw.push_str(&escape(&*text));
                    }
                }
            }
            Ok(Event::End(_)) => {
                if closes(&mut value) {
                    if let Some(done) = value.take() {
                        found
                            .entry(done.key.clone())
                            .or_insert_with(|| element_text(&done));
                    }
                }
                if closes(&mut metadata) {
                    if let Some(done) = metadata.take() {
                        rescan_metadata(&done, wanted, nested, found, level);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                trace!(
                    "XML scan stopped at byte {}: {}",
                    reader.buffer_position(),
                    err
                );
                break;
            }
            _ => {}
        }
    }
}

/// Accounts for an end tag; true when it closes the capture itself.
fn closes(capture: &mut Option<Capture>) -> bool {
    match capture {
        Some(open) if open.depth > 0 => {
            open.depth -= 1;
            false
        }
        Some(_) => true,
        None => false,
    }
}

/// Capture receiving character data: the open value, or the metadata
/// element's own text outside of its children.
fn text_sink<'c>(
    value: &'c mut Option<Capture>,
    metadata: &'c mut Option<Capture>,
) -> Option<&'c mut Capture> {
    match value {
        Some(open) => Some(open),
        None => metadata.as_mut().filter(|meta| meta.depth == 0),
    }
}

fn element_text(capture: &Capture) -> String {
    match unescape(&capture.raw) {
        Ok(text) => text.trim().to_string(),
        Err(_) => capture.raw.trim().to_string(),
    }
}

fn rescan_metadata(
    capture: &Capture,
    wanted: &[&str],
    nested: &[&str],
    found: &mut HashMap<String, String>,
    level: usize,
) {
    let text = element_text(capture);
    if text.starts_with('<') && level < MAX_NESTING {
        scan_into(&text, wanted, nested, found, level + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACK_TAGS: [&str; 3] = ["dc:title", "dc:creator", "upnp:album"];

    #[test]
    fn first_text_of_plain_element() {
        let xml = "<root><device><friendlyName>Living Room</friendlyName></device></root>";
        assert_eq!(first_element_text(xml, "friendlyName").as_deref(), Some("Living Room"));
    }

    #[test]
    fn first_occurrence_wins() {
        let xml = "<root><device><friendlyName>Kitchen</friendlyName>\
                   <deviceList><device><friendlyName>Kitchen - Media Renderer</friendlyName>\
                   </device></deviceList></device></root>";
        assert_eq!(first_element_text(xml, "friendlyName").as_deref(), Some("Kitchen"));
    }

    #[test]
    fn tolerates_attributes_whitespace_and_prefixes() {
        let xml = "<d:root xmlns:d=\"urn:x\">\
                   <d:friendlyName lang=\"en\">\n  Office  \n</d:friendlyName></d:root>";
        assert_eq!(first_element_text(xml, "friendlyName").as_deref(), Some("Office"));
    }

    #[test]
    fn unescapes_entities() {
        let xml = "<root><friendlyName>Tom &amp; Jerry&#39;s Room</friendlyName></root>";
        assert_eq!(
            first_element_text(xml, "friendlyName").as_deref(),
            Some("Tom & Jerry's Room")
        );
    }

    #[test]
    fn empty_element_counts_as_missing() {
        assert_eq!(first_element_text("<root><friendlyName/></root>", "friendlyName"), None);
        assert_eq!(
            first_element_text("<root><friendlyName>  </friendlyName></root>", "friendlyName"),
            None
        );
    }

    #[test]
    fn missing_element_is_none() {
        let xml = "<root><modelName>One</modelName></root>";
        assert_eq!(first_element_text(xml, "friendlyName"), None);
    }

    #[test]
    fn malformed_input_keeps_what_was_found() {
        let xml = "<a><dc:title>Song A</dc:title><dc:creator>Artist B</oops>";
        let found = scan_element_texts(xml, &TRACK_TAGS, &[]);
        assert_eq!(found.get("dc:title").map(String::as_str), Some("Song A"));
        assert!(!found.contains_key("upnp:album"));
    }

    #[test]
    fn unprefixed_fragment_without_namespace_declarations() {
        let xml = "<dc:title>Song A</dc:title><dc:creator>Artist B</dc:creator>";
        let found = scan_element_texts(xml, &TRACK_TAGS, &[]);
        assert_eq!(found.get("dc:title").map(String::as_str), Some("Song A"));
        assert_eq!(found.get("dc:creator").map(String::as_str), Some("Artist B"));
        assert_eq!(found.get("upnp:album"), None);
    }

    #[test]
    fn descends_into_escaped_metadata() {
        let xml = "<u:GetPositionInfoResponse><Track>1</Track><TrackMetaData>\
            &lt;DIDL-Lite xmlns:dc=&quot;http://purl.org/dc/elements/1.1/&quot;&gt;\
            &lt;item&gt;&lt;dc:title&gt;Blue in Green&lt;/dc:title&gt;\
            &lt;dc:creator&gt;Miles Davis&lt;/dc:creator&gt;\
            &lt;upnp:album&gt;Kind of Blue&lt;/upnp:album&gt;&lt;/item&gt;&lt;/DIDL-Lite&gt;\
            </TrackMetaData></u:GetPositionInfoResponse>";

        let found = scan_element_texts(xml, &TRACK_TAGS, &["TrackMetaData"]);
        assert_eq!(found.get("dc:title").map(String::as_str), Some("Blue in Green"));
        assert_eq!(found.get("dc:creator").map(String::as_str), Some("Miles Davis"));
        assert_eq!(found.get("upnp:album").map(String::as_str), Some("Kind of Blue"));
    }

    #[test]
    fn ignores_non_xml_metadata() {
        let xml = "<r><TrackMetaData>NOT_IMPLEMENTED</TrackMetaData></r>";
        assert!(scan_element_texts(xml, &TRACK_TAGS, &["TrackMetaData"]).is_empty());
    }

    #[test]
    fn reads_structural_metadata_children() {
        let xml = "<u:GetPositionInfoResponse><Track>1</Track><TrackMetaData>\
            <DIDL-Lite><item><dc:title>Song A</dc:title><dc:creator>Artist B</dc:creator>\
            <upnp:album>Album C</upnp:album></item></DIDL-Lite></TrackMetaData>\
            <TrackURI>x-file-cifs://nas/a.flac</TrackURI></u:GetPositionInfoResponse>";

        let found = scan_element_texts(xml, &TRACK_TAGS, &["TrackMetaData"]);
        assert_eq!(found.get("dc:title").map(String::as_str), Some("Song A"));
        assert_eq!(found.get("dc:creator").map(String::as_str), Some("Artist B"));
        assert_eq!(found.get("upnp:album").map(String::as_str), Some("Album C"));
    }

    #[test]
    fn empty_first_occurrence_hides_later_ones() {
        let xml = "<root><device><friendlyName></friendlyName><deviceList><device>\
                   <friendlyName>Kitchen - Media Renderer</friendlyName>\
                   </device></deviceList></device></root>";
        assert_eq!(first_element_text(xml, "friendlyName"), None);

        let xml = "<root><friendlyName/><friendlyName>Kitchen</friendlyName></root>";
        assert_eq!(first_element_text(xml, "friendlyName"), None);
    }
}
