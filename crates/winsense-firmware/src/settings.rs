//! Per-device settings baked in by `build.rs` from `.env`

use thiserror_no_std::Error;

pub const NODE_ID: &str = env!("WINSENSE_NODE_ID");
pub const GATEWAY_MAC: &str = env!("WINSENSE_GATEWAY_MAC");

/// 1 MΩ / 470 kΩ divider on a 12-bit conversion at 2.5 dB attenuation
/// (~1.25 V full scale): 1.25 / 4095 * 1470 / 470.
pub const BATTERY_VOLTS_PER_BIT: f32 = 0.000_954_7;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsError {
    #[error("node id is not a number in 0-255")]
    NodeId,
    #[error("gateway MAC is not of the form aa:bb:cc:dd:ee:ff")]
    GatewayMac,
}

pub fn node_id() -> Result<u8, SettingsError> {
    NODE_ID.parse().map_err(|_| SettingsError::NodeId)
}

pub fn gateway_mac() -> Result<[u8; 6], SettingsError> {
    let mut mac = [0u8; 6];
    let mut octets = GATEWAY_MAC.split(':');

    for byte in mac.iter_mut() {
        let octet = octets.next().ok_or(SettingsError::GatewayMac)?;
        *byte = u8::from_str_radix(octet, 16).map_err(|_| SettingsError::GatewayMac)?;
    }

    if octets.next().is_some() {
        return Err(SettingsError::GatewayMac);
    }

    Ok(mac)
}
