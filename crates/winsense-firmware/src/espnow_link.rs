//! ESP-NOW link to the gateway
//!
//! Each message travels as one ESP-NOW frame holding the postcard encoding of
//! a [`Frame`]. Delivery is reported by the ESP-NOW send callback, which is
//! the acknowledgement the reporter sees.

use esp_radio::esp_now::{EspNow, EspNowError, EspNowWifiInterface, PeerInfo};
use log::warn;
use serde::Serialize;

use winsense_core::protocol::{Message, Transport, TransportError};

/// Node id, child id, kind and a full payload fit comfortably
const FRAME_CAPACITY: usize = 48;

#[derive(Serialize)]
struct Frame<'m> {
    node_id: u8,
    parent_node_id: u8,
    message: &'m Message,
}

pub struct EspNowLink<'d> {
    esp_now: EspNow<'d>,
    gateway: [u8; 6],
    node_id: u8,
    parent_node_id: u8,
}

impl<'d> EspNowLink<'d> {
    /// Register the gateway as a peer and wrap the ESP-NOW interface.
    pub fn new(
        mut esp_now: EspNow<'d>,
        gateway: [u8; 6],
        node_id: u8,
        parent_node_id: u8,
    ) -> Result<Self, EspNowError> {
        if !esp_now.peer_exists(&gateway) {
            esp_now.add_peer(PeerInfo {
                interface: EspNowWifiInterface::Sta,
                peer_address: gateway,
                lmk: None,
                channel: None,
                encrypt: false,
            })?;
        }

        Ok(Self {
            esp_now,
            gateway,
            node_id,
            parent_node_id,
        })
    }
}

impl Transport for EspNowLink<'_> {
    async fn send(&mut self, message: &Message) -> Result<(), TransportError> {
        let frame = Frame {
            node_id: self.node_id,
            parent_node_id: self.parent_node_id,
            message,
        };

        let mut buf = [0u8; FRAME_CAPACITY];
        let bytes = postcard::to_slice(&frame, &mut buf).map_err(|_| TransportError::Encode)?;

        self.esp_now
            .send_async(&self.gateway, bytes)
            .await
            .map_err(|e| {
                warn!("ESP-NOW send to {:02x?} failed: {:?}", self.gateway, e);
                match e {
                    EspNowError::SendFailed => TransportError::NotAcknowledged,
                    _ => TransportError::Link("esp-now"),
                }
            })
    }
}
