//! SNTP over the host network, standing in for the radio link.

use std::net::UdpSocket;
use std::time::Duration;

use hydra_core::clock_sync::{NetError, NetworkLink};
use log::{debug, info};

const NTP_SERVER: &str = "pool.ntp.org:123";
const NTP_PACKET_LEN: usize = 48;
/// LI 0, version 3, mode 3 (client).
const NTP_CLIENT_HEADER: u8 = 0x1B;
/// Seconds between 1900-01-01 and 1970-01-01.
const NTP_UNIX_OFFSET: u64 = 2_208_988_800;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Extracts unix seconds from the transmit timestamp of a server reply.
pub fn parse_ntp_reply(reply: &[u8]) -> Result<u64, NetError> {
    if reply.len() < NTP_PACKET_LEN {
        return Err(NetError::BadResponse);
    }
    let mut seconds = [0u8; 4];
    seconds.copy_from_slice(&reply[40..44]);
    let ntp_secs = u64::from(u32::from_be_bytes(seconds));
    ntp_secs.checked_sub(NTP_UNIX_OFFSET).ok_or(NetError::BadResponse)
}

pub fn ntp_request() -> [u8; NTP_PACKET_LEN] {
    let mut packet = [0u8; NTP_PACKET_LEN];
    packet[0] = NTP_CLIENT_HEADER;
    packet
}

#[derive(Default)]
pub struct SntpLink {
    ssid: Option<String>,
}

impl NetworkLink for SntpLink {
    fn is_connected(&mut self) -> bool {
        self.ssid.is_some()
    }

    fn connect(&mut self, ssid: &str, _password: &str) -> Result<(), NetError> {
        if ssid.is_empty() {
            return Err(NetError::Connect);
        }
        info!("Joined {} (host network)", ssid);
        self.ssid = Some(ssid.to_string());
        Ok(())
    }

    fn fetch_time(&mut self) -> Result<u64, NetError> {
        let socket = UdpSocket::bind("0.0.0.0:0").map_err(|_| NetError::Connect)?;
        socket
            .set_read_timeout(Some(REQUEST_TIMEOUT))
            .map_err(|_| NetError::Connect)?;
        socket
            .send_to(&ntp_request(), NTP_SERVER)
            .map_err(|_| NetError::Connect)?;

        let mut reply = [0u8; NTP_PACKET_LEN];
        let (len, from) = socket.recv_from(&mut reply).map_err(|_| NetError::Timeout)?;
        debug!("{} byte NTP reply from {}", len, from);
        parse_ntp_reply(&reply[..len])
    }

    fn disconnect(&mut self) {
        if let Some(ssid) = self.ssid.take() {
            info!("Left {}", ssid);
        }
    }
}
