//! Message model and the transport capability used to reach the gateway
//!
//! Messages carry the sensor-network vocabulary (presentation types, value
//! types, internal types) with their numeric codes. Framing, routing and
//! addressing belong to whatever implements [`Transport`].

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

/// Largest payload a single network message can carry
pub const MAX_PAYLOAD_SIZE: usize = 25;

/// Child id used for node-level messages (battery level, sketch info)
pub const NODE_SENSOR_ID: u8 = 255;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    #[error("message was not acknowledged by the next hop")]
    NotAcknowledged,
    #[error("link error: {0}")]
    Link(&'static str),
    #[error("payload does not fit in 25 bytes")]
    PayloadTooLarge,
    #[error("payload could not be encoded")]
    Encode,
}

/// Sensor types announced during presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorKind {
    /// Door or window contact
    Door,
    Motion,
    /// Voltage/current/impedance meter
    Multimeter,
}

impl SensorKind {
    pub const fn code(self) -> u8 {
        match self {
            Self::Door => 0,
            Self::Motion => 1,
            Self::Multimeter => 30,
        }
    }
}

/// Value types carried by set messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    Percentage,
    /// Contact tripped, "1" or "0"
    Tripped,
    Voltage,
}

impl ValueKind {
    pub const fn code(self) -> u8 {
        match self {
            Self::Percentage => 3,
            Self::Tripped => 16,
            Self::Voltage => 38,
        }
    }
}

/// Node-level internal message types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InternalKind {
    BatteryLevel,
    SketchName,
    SketchVersion,
}

impl InternalKind {
    pub const fn code(self) -> u8 {
        match self {
            Self::BatteryLevel => 0,
            Self::SketchName => 11,
            Self::SketchVersion => 12,
        }
    }
}

/// Command class of a message together with its type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    Presentation(SensorKind),
    Set(ValueKind),
    Internal(InternalKind),
}

impl MessageKind {
    pub const fn command_code(self) -> u8 {
        match self {
            Self::Presentation(_) => 0,
            Self::Set(_) => 1,
            Self::Internal(_) => 3,
        }
    }

    pub const fn type_code(self) -> u8 {
        match self {
            Self::Presentation(kind) => kind.code(),
            Self::Set(kind) => kind.code(),
            Self::Internal(kind) => kind.code(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    Text(String<MAX_PAYLOAD_SIZE>),
    /// Opaque binary value
    Custom(Vec<u8, MAX_PAYLOAD_SIZE>),
    Level(u8),
}

impl Payload {
    pub fn text(value: &str) -> Result<Self, TransportError> {
        String::try_from(value)
            .map(Self::Text)
            .map_err(|_| TransportError::PayloadTooLarge)
    }

    pub fn custom(bytes: &[u8]) -> Result<Self, TransportError> {
        Vec::from_slice(bytes)
            .map(Self::Custom)
            .map_err(|_| TransportError::PayloadTooLarge)
    }

    /// Binary payload holding the wire encoding of an `f32`
    pub fn float(value: f32) -> Result<Self, TransportError> {
        let mut buf = [0u8; MAX_PAYLOAD_SIZE];
        let used = postcard::to_slice(&value, &mut buf).map_err(|_| TransportError::Encode)?;
        Self::custom(used)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub child_id: u8,
    pub kind: MessageKind,
    pub payload: Payload,
}

impl Message {
    pub fn presentation(child_id: u8, kind: SensorKind) -> Self {
        Self {
            child_id,
            kind: MessageKind::Presentation(kind),
            payload: Payload::Text(String::new()),
        }
    }

    pub fn set_text(child_id: u8, kind: ValueKind, value: &str) -> Result<Self, TransportError> {
        Ok(Self {
            child_id,
            kind: MessageKind::Set(kind),
            payload: Payload::text(value)?,
        })
    }

    pub fn set_custom(child_id: u8, kind: ValueKind, bytes: &[u8]) -> Result<Self, TransportError> {
        Ok(Self {
            child_id,
            kind: MessageKind::Set(kind),
            payload: Payload::custom(bytes)?,
        })
    }

    pub fn set_float(child_id: u8, kind: ValueKind, value: f32) -> Result<Self, TransportError> {
        Ok(Self {
            child_id,
            kind: MessageKind::Set(kind),
            payload: Payload::float(value)?,
        })
    }

    pub fn battery_level(percent: u8) -> Self {
        Self {
            child_id: NODE_SENSOR_ID,
            kind: MessageKind::Internal(InternalKind::BatteryLevel),
            payload: Payload::Level(percent.min(100)),
        }
    }

    pub fn sketch_name(name: &str) -> Result<Self, TransportError> {
        Ok(Self {
            child_id: NODE_SENSOR_ID,
            kind: MessageKind::Internal(InternalKind::SketchName),
            payload: Payload::text(name)?,
        })
    }

    pub fn sketch_version(version: &str) -> Result<Self, TransportError> {
        Ok(Self {
            child_id: NODE_SENSOR_ID,
            kind: MessageKind::Internal(InternalKind::SketchVersion),
            payload: Payload::text(version)?,
        })
    }
}

/// Capability for delivering messages to the gateway.
///
/// Implementors provide [`Transport::send`]; the presentation and battery
/// helpers are built on it. Nothing in this crate retries a failed send.
pub trait Transport {
    /// Deliver one message, reporting whether the next hop accepted it.
    fn send(&mut self, message: &Message) -> impl Future<Output = Result<(), TransportError>>;

    /// Register a child sensor with the controller.
    fn present(
        &mut self,
        child_id: u8,
        kind: SensorKind,
    ) -> impl Future<Output = Result<(), TransportError>> {
        async move { self.send(&Message::presentation(child_id, kind)).await }
    }

    /// Report the node's battery level in percent.
    fn send_battery_level(
        &mut self,
        percent: u8,
    ) -> impl Future<Output = Result<(), TransportError>> {
        async move { self.send(&Message::battery_level(percent)).await }
    }

    /// Announce sketch name and version. Both are sent even if the first fails.
    fn send_sketch_info(
        &mut self,
        name: &str,
        version: &str,
    ) -> impl Future<Output = Result<(), TransportError>> {
        async move {
            let name_result = match Message::sketch_name(name) {
                Ok(message) => self.send(&message).await,
                Err(e) => Err(e),
            };
            let version_result = match Message::sketch_version(version) {
                Ok(message) => self.send(&message).await,
                Err(e) => Err(e),
            };
            name_result.and(version_result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec as StdVec;

    #[derive(Default)]
    struct RecordingTransport {
        sent: StdVec<Message>,
        reject: Option<InternalKind>,
    }

    impl Transport for RecordingTransport {
        async fn send(&mut self, message: &Message) -> Result<(), TransportError> {
            self.sent.push(message.clone());
            match (message.kind, self.reject) {
                (MessageKind::Internal(kind), Some(reject)) if kind == reject => {
                    Err(TransportError::NotAcknowledged)
                }
                _ => Ok(()),
            }
        }
    }

    #[test]
    fn test_float_payload_is_little_endian_f32() {
        let message = Message::set_float(2, ValueKind::Voltage, 1.803).unwrap();
        assert_eq!(message.kind.command_code(), 1);
        assert_eq!(message.kind.type_code(), 38);
        assert_eq!(
            message.payload,
            Payload::custom(&1.803_f32.to_le_bytes()).unwrap()
        );
    }

    #[test]
    fn test_oversized_text_is_rejected() {
        let long = "this text is longer than one payload";
        assert_eq!(
            Message::set_text(1, ValueKind::Tripped, long),
            Err(TransportError::PayloadTooLarge)
        );
        assert_eq!(
            Message::set_custom(2, ValueKind::Voltage, &[0u8; MAX_PAYLOAD_SIZE + 1]),
            Err(TransportError::PayloadTooLarge)
        );
    }

    #[test]
    fn test_battery_level_is_node_message() {
        let message = Message::battery_level(42);
        assert_eq!(message.child_id, NODE_SENSOR_ID);
        assert_eq!(message.kind.command_code(), 3);
        assert_eq!(message.kind.type_code(), 0);
        assert_eq!(message.payload, Payload::Level(42));
        assert_eq!(Message::battery_level(180).payload, Payload::Level(100));
    }

    #[test]
    fn test_presentation_codes() {
        let door = Message::presentation(1, SensorKind::Door);
        let meter = Message::presentation(2, SensorKind::Multimeter);
        assert_eq!((door.kind.command_code(), door.kind.type_code()), (0, 0));
        assert_eq!((meter.kind.command_code(), meter.kind.type_code()), (0, 30));
    }

    #[test]
    fn test_kind_codes_match_gateway_table() {
        assert_eq!(SensorKind::Motion.code(), 1);
        assert_eq!(ValueKind::Percentage.code(), 3);
        assert_eq!(ValueKind::Tripped.code(), 16);
        assert_eq!(ValueKind::Voltage.code(), 38);
        assert_eq!(InternalKind::SketchVersion.code(), 12);

        let level = Message::set_text(3, ValueKind::Percentage, "74").unwrap();
        assert_eq!((level.kind.command_code(), level.kind.type_code()), (1, 3));
    }

    #[test]
    fn test_sketch_info_sends_both_even_if_name_fails() {
        let mut transport = RecordingTransport {
            reject: Some(InternalKind::SketchName),
            ..Default::default()
        };

        let result =
            embassy_futures::block_on(transport.send_sketch_info("WindowSensor 1", "1.0"));

        assert_eq!(result, Err(TransportError::NotAcknowledged));
        assert_eq!(transport.sent.len(), 2);
        assert_eq!(
            transport.sent[1].kind,
            MessageKind::Internal(InternalKind::SketchVersion)
        );
        assert_eq!(transport.sent[1].payload, Payload::text("1.0").unwrap());
    }

    #[test]
    fn test_provided_helpers_go_through_send() {
        let mut transport = RecordingTransport::default();

        embassy_futures::block_on(async {
            transport.present(1, SensorKind::Door).await.unwrap();
            transport.send_battery_level(77).await.unwrap();
        });

        assert_eq!(transport.sent[0], Message::presentation(1, SensorKind::Door));
        assert_eq!(transport.sent[1], Message::battery_level(77));
    }
}
