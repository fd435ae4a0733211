//! # Device Identity
//!
//! A [`DeviceHandle`] names the one printer this deployment talks to. It is
//! a Bluetooth address in the usual `XX:XX:XX:XX:XX:XX` form, validated
//! once when configuration is loaded and never changed afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PrintError;

/// Address of the bench printer the stock receipt was written for.
pub const DEFAULT_ADDRESS: &str = "74:F0:7D:E5:91:F7";

/// Bluetooth address of the target printer.
///
/// Stored upper-case so comparisons against `/proc/net/rfcomm` and
/// `rfcomm -a` output are stable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceHandle(String);

impl DeviceHandle {
    /// Parse and normalize an address.
    ///
    /// ## Example
    ///
    /// ```
    /// use sppcore::DeviceHandle;
    ///
    /// let device = DeviceHandle::new("74:f0:7d:e5:91:f7")?;
    /// assert_eq!(device.address(), "74:F0:7D:E5:91:F7");
    /// # Ok::<(), sppcore::PrintError>(())
    /// ```
    pub fn new(address: &str) -> Result<Self, PrintError> {
        let address = address.trim();
        if !is_valid_mac(address) {
            return Err(PrintError::Config(format!(
                "Invalid device address '{}'. Expected XX:XX:XX:XX:XX:XX",
                address
            )));
        }
        Ok(Self(address.to_uppercase()))
    }

    /// The normalized address string.
    pub fn address(&self) -> &str {
        &self.0
    }
}

impl Default for DeviceHandle {
    fn default() -> Self {
        Self(DEFAULT_ADDRESS.to_string())
    }
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DeviceHandle {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for DeviceHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DeviceHandle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(&raw).map_err(serde::de::Error::custom)
    }
}

/// Validate a Bluetooth MAC address format (XX:XX:XX:XX:XX:XX).
pub fn is_valid_mac(mac: &str) -> bool {
    let parts: Vec<&str> = mac.split(':').collect();
    if parts.len() != 6 {
        return false;
    }
    parts
        .iter()
        .all(|part| part.len() == 2 && part.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_mac_addresses() {
        assert!(is_valid_mac("00:11:22:33:44:55"));
        assert!(is_valid_mac("AA:BB:CC:DD:EE:FF"));
        assert!(is_valid_mac("aa:bb:cc:dd:ee:ff"));
        assert!(is_valid_mac("74:F0:7D:E5:91:F7"));
    }

    #[test]
    fn test_invalid_mac_addresses() {
        assert!(!is_valid_mac("00:11:22:33:44")); // too short
        assert!(!is_valid_mac("00:11:22:33:44:55:66")); // too long
        assert!(!is_valid_mac("00-11-22-33-44-55")); // wrong separator
        assert!(!is_valid_mac("GG:HH:II:JJ:KK:LL")); // invalid hex
        assert!(!is_valid_mac("0:11:22:33:44:555")); // uneven octets
        assert!(!is_valid_mac(""));
    }

    #[test]
    fn test_handle_normalizes_case() {
        let device: DeviceHandle = "74:f0:7d:e5:91:f7".parse().unwrap();
        assert_eq!(device.address(), "74:F0:7D:E5:91:F7");
        assert_eq!(device.to_string(), "74:F0:7D:E5:91:F7");
    }

    #[test]
    fn test_handle_rejects_garbage() {
        let err = DeviceHandle::new("printer").unwrap_err();
        assert!(matches!(err, PrintError::Config(_)));
    }

    #[test]
    fn test_handle_serde() {
        let device: DeviceHandle = serde_json::from_str("\"00:11:62:ab:cd:ef\"").unwrap();
        assert_eq!(device.address(), "00:11:62:AB:CD:EF");
        assert_eq!(
            serde_json::to_string(&device).unwrap(),
            "\"00:11:62:AB:CD:EF\""
        );
        assert!(serde_json::from_str::<DeviceHandle>("\"nope\"").is_err());
    }
}
