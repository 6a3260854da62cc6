//! Per-device settings are read from `.env` (or the environment) at build
//! time and baked into the binary.

use std::env;

const DEFAULT_NODE_ID: &str = "21";
const DEFAULT_GATEWAY_MAC: &str = "ff:ff:ff:ff:ff:ff";

fn main() {
    println!("cargo:rerun-if-changed=.env");
    println!("cargo:rerun-if-env-changed=WINSENSE_NODE_ID");
    println!("cargo:rerun-if-env-changed=WINSENSE_GATEWAY_MAC");

    // A missing .env just means defaults
    let _ = dotenvy::dotenv();

    let node_id = env::var("WINSENSE_NODE_ID").unwrap_or_else(|_| DEFAULT_NODE_ID.into());
    if let Err(e) = node_id.parse::<u8>() {
        panic!("WINSENSE_NODE_ID={node_id:?} is not a node id (0-255): {e}");
    }

    let gateway_mac =
        env::var("WINSENSE_GATEWAY_MAC").unwrap_or_else(|_| DEFAULT_GATEWAY_MAC.into());
    let octets = gateway_mac
        .split(':')
        .filter(|octet| octet.len() == 2 && u8::from_str_radix(octet, 16).is_ok())
        .count();
    if octets != 6 || gateway_mac.len() != 17 {
        panic!("WINSENSE_GATEWAY_MAC={gateway_mac:?} is not of the form aa:bb:cc:dd:ee:ff");
    }

    println!("cargo:rustc-env=WINSENSE_NODE_ID={node_id}");
    println!("cargo:rustc-env=WINSENSE_GATEWAY_MAC={gateway_mac}");

    println!("cargo:rustc-link-arg=-Tlinkall.x");
}
