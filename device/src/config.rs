use crate::gpio::Pin;

/// Reported firmware version
pub const FIRMWARE_VERSION: &str = "1.0.1";

/// Initial device configuration builder
///
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub(crate) radio_mode: String,
    pub(crate) known_networks: Vec<String>,
    pub(crate) gpio_channels: Vec<Pin>,
    pub(crate) firmware_version: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            radio_mode: "station".into(),
            known_networks: ["testAP", "PrettyFlyForAWIFI", "NewAdventuresInWIFI"]
                .into_iter()
                .map(String::from)
                .collect(),
            gpio_channels: [4, 5, 9].to_vec(),
            firmware_version: FIRMWARE_VERSION.into(),
        }
    }
}

impl DeviceConfig {
    /// Set the radio mode the device boots in, "station" or "ap".
    pub fn radio_mode(self, radio_mode: impl Into<String>) -> Self {
        Self {
            radio_mode: radio_mode.into(),
            ..self
        }
    }

    /// Set the list of networks a scan reports
    pub fn known_networks<I, S>(self, known_networks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known_networks: known_networks.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    /// Set the GPIO pins the device exposes
    pub fn gpio_channels(self, gpio_channels: impl Into<Vec<Pin>>) -> Self {
        Self {
            gpio_channels: gpio_channels.into(),
            ..self
        }
    }

    pub fn firmware_version(self, firmware_version: impl Into<String>) -> Self {
        Self {
            firmware_version: firmware_version.into(),
            ..self
        }
    }
}
