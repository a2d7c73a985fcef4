use std::collections::BTreeMap;
use std::sync::Arc;

pub use futures::lock::{Mutex, MutexGuard};
pub use serde_json::Value;

pub mod config;
pub mod gpio;

pub use config::{DeviceConfig, FIRMWARE_VERSION};
use gpio::{Pin, PinName};

/// Device state shared between all connected clients
pub type SharedDevice = Arc<Mutex<DeviceState>>;

/// In-memory state of a simulated wifiswitch.
///
/// Lives for as long as the process does, nothing is written to flash.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceState {
    radio_mode: String,
    known_networks: Vec<String>,
    gpio_channels: Vec<Pin>,
    gpio_values: BTreeMap<PinName, Value>,
    firmware_version: String,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new(DeviceConfig::default())
    }
}

impl DeviceState {
    pub fn new(config: DeviceConfig) -> Self {
        DeviceState {
            radio_mode: config.radio_mode,
            known_networks: config.known_networks,
            gpio_channels: config.gpio_channels,
            gpio_values: BTreeMap::new(),
            firmware_version: config.firmware_version,
        }
    }

    /// Wrap the state for sharing between sessions
    pub fn into_shared(self) -> SharedDevice {
        Arc::new(Mutex::new(self))
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> DeviceState {
        self.clone()
    }

    pub fn radio_mode(&self) -> &str {
        &self.radio_mode
    }

    pub fn set_radio_mode(&mut self, radio_mode: impl Into<String>) {
        self.radio_mode = radio_mode.into();
        log::info!("RADIO MODE = {}", self.radio_mode);
    }

    /// Networks reported by a scan
    pub fn known_networks(&self) -> &[String] {
        &self.known_networks
    }

    /// Pins exposed by the device, in configuration order
    pub fn gpio_channels(&self) -> &[Pin] {
        &self.gpio_channels
    }

    /// Every pin value written so far, in numeric order
    pub fn gpio_values(&self) -> &BTreeMap<PinName, Value> {
        &self.gpio_values
    }

    /// Value last written under the pin name `name`
    pub fn gpio(&self, name: &str) -> Option<&Value> {
        PinName::parse(name).and_then(|name| self.gpio_values.get(&name))
    }

    /// Set the value of a pin.
    ///
    /// Pins outside of [`Self::gpio_channels`] are stored as well.
    pub fn set_gpio(&mut self, pin: impl Into<PinName>, value: impl Into<Value>) {
        let (pin, value) = (pin.into(), value.into());
        log::debug!("GPIO{} = {}", pin, value);
        self.gpio_values.insert(pin, value);
    }

    pub fn firmware_version(&self) -> &str {
        &self.firmware_version
    }
}
