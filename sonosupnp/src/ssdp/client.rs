/*!
The SSDP client is a *control point*. It never binds to UDP port 1900.

* M-SEARCH is sent from an ephemeral port (bind 0.0.0.0:0).
* Devices answer with unicast `HTTP/1.1 200 OK` datagrams addressed to that
  same ephemeral port, so replies are read back from the sending socket.

The socket is owned by the client and closed when the client is dropped.
*/

use super::{MAX_AGE, SSDP_MULTICAST_ADDR, SSDP_PORT};
use socket2::{Domain, Protocol, Socket, Type};
use std::collections::HashMap;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

const RECV_BUFFER_SIZE: usize = 8192;
const MULTICAST_TTL: u32 = 2;

/// A unicast reply to an M-SEARCH.
///
/// `raw` always holds the full datagram; the header fields are filled when
/// present and are only used for diagnostics.
#[derive(Debug, Clone)]
pub struct SsdpResponse {
    pub from: SocketAddr,
    pub raw: String,
    pub st: Option<String>,
    pub usn: Option<String>,
    pub location: Option<String>,
    pub server: Option<String>,
    pub max_age: u32,
}

/// Sends M-SEARCH requests and reads the unicast replies.
pub struct SsdpClient {
    socket: UdpSocket,
    target: SocketAddr,
}

impl SsdpClient {
    /// Binds an ephemeral port with a multicast TTL of 2.
    pub fn new() -> io::Result<Self> {
        let socket2 = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket2.set_reuse_address(true)?;

        let bind_addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0));
        socket2.bind(&bind_addr.into())?;

        let socket: UdpSocket = socket2.into();
        socket.set_multicast_ttl_v4(MULTICAST_TTL)?;

        debug!("SSDP client bound on {}", socket.local_addr()?);

        Ok(Self {
            socket,
            target: multicast_target(),
        })
    }

    /// Uses an already bound socket and sends searches to `target` instead of
    /// the multicast group.
    pub fn from_socket(socket: UdpSocket, target: SocketAddr) -> Self {
        Self { socket, target }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Sends one M-SEARCH for `st`.
    pub fn send_msearch(&self, st: &str, mx: u32) -> io::Result<()> {
        let msg = msearch_message(st, mx);

        match self.socket.send_to(msg.as_bytes(), self.target) {
            Ok(_) => {
                info!("M-SEARCH sent to {} (ST={}, MX={})", self.target, st, mx.max(1));
                trace!("M-SEARCH payload:\n{}", msg);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to send M-SEARCH to {}: {}", self.target, e);
                Err(e)
            }
        }
    }

    /// Collects replies until `window` has elapsed.
    ///
    /// Each receive blocks until a datagram arrives or the remaining window
    /// runs out; the first timeout ends the collection. Datagrams rejected by
    /// `accept` are dropped. Accepted replies are pushed to `out` as they
    /// arrive, so on a socket error `out` still holds everything received
    /// before the fault.
    pub fn collect_responses<F>(
        &self,
        window: Duration,
        mut accept: F,
        out: &mut Vec<SsdpResponse>,
    ) -> io::Result<()>
    where
        F: FnMut(&str) -> bool,
    {
        let deadline = Instant::now() + window;
        let mut buf = [0u8; RECV_BUFFER_SIZE];

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            self.socket.set_read_timeout(Some(remaining))?;

            match self.socket.recv_from(&mut buf) {
                Ok((n, from)) => {
                    let data = String::from_utf8_lossy(&buf[..n]);
                    if !accept(&data) {
                        trace!("Ignoring SSDP reply from {}", from);
                        continue;
                    }
                    let response = parse_response(&data, from);
                    debug!(
                        "SSDP reply {}: st={:?} usn={:?} location={:?} server={:?} max_age={}",
                        from,
                        response.st,
                        response.usn,
                        response.location,
                        response.server,
                        response.max_age
                    );
                    out.push(response);
                }
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                    ) =>
                {
                    break;
                }
                Err(e) => {
                    warn!("SSDP client read error: {}", e);
                    return Err(e);
                }
            }
        }

        debug!("SSDP collection window closed with {} replies", out.len());
        Ok(())
    }
}

fn multicast_target() -> SocketAddr {
    let group: Ipv4Addr = SSDP_MULTICAST_ADDR.parse().unwrap_or(Ipv4Addr::new(239, 255, 255, 250));
    SocketAddr::V4(SocketAddrV4::new(group, SSDP_PORT))
}

/// Builds the M-SEARCH request. MX is raised to 1 when lower.
pub fn msearch_message(st: &str, mx: u32) -> String {
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
         HOST: {}:{}\r\n\
         MAN: \"ssdp:discover\"\r\n\
         MX: {}\r\n\
         ST: {}\r\n\
         \r\n",
        SSDP_MULTICAST_ADDR,
        SSDP_PORT,
        mx.max(1),
        st
    )
}

/// Parses a search reply; missing headers are left empty.
pub fn parse_response(data: &str, from: SocketAddr) -> SsdpResponse {
    let mut lines = data.lines();
    if let Some(first_line) = lines.next() {
        let upper = first_line.trim().to_ascii_uppercase();
        if !(upper.starts_with("HTTP/") && upper.contains(" 200")) {
            trace!("Unexpected SSDP status line from {}: {}", from, first_line.trim());
        }
    }
    let headers = parse_headers(lines);

    SsdpResponse {
        from,
        raw: data.to_string(),
        st: headers.get("ST").cloned(),
        usn: headers.get("USN").cloned(),
        location: headers.get("LOCATION").cloned(),
        server: headers.get("SERVER").cloned(),
        max_age: parse_max_age(headers.get("CACHE-CONTROL")),
    }
}

/// Header block of a reply, names upper-cased. Stops at the first blank
/// line; lines without a name or a value are skipped.
fn parse_headers<'a>(lines: impl Iterator<Item = &'a str>) -> HashMap<String, String> {
    lines
        .map(str::trim)
        .take_while(|line| !line.is_empty())
        .filter_map(|line| {
            // LOCATION values contain ':' themselves
            let (name, value) = line.split_once(':')?;
            let (name, value) = (name.trim(), value.trim());
            if name.is_empty() || value.is_empty() {
                trace!("Skipping SSDP header line '{}'", line);
                return None;
            }
            Some((name.to_ascii_uppercase(), value.to_string()))
        })
        .collect()
}

/// `max-age` directive of a CACHE-CONTROL value, [`MAX_AGE`] when absent.
fn parse_max_age(cache_control: Option<&String>) -> u32 {
    cache_control
        .and_then(|value| {
            value.split(',').find_map(|directive| {
                let (key, age) = directive.split_once('=')?;
                if !key.trim().eq_ignore_ascii_case("max-age") {
                    return None;
                }
                age.trim().parse::<u32>().ok()
            })
        })
        .unwrap_or(MAX_AGE)
}
