//! Command dispatch.
//!
//! Every known envelope type maps to a typed request. Optional fields are
//! filled with fixed defaults before the reply is built, so replies always
//! carry concrete values even for sparse requests. Station and access point
//! fields that are present are echoed as received, whatever their JSON type.

use serde::Deserialize;
use serde_json::{Map, Value};
use wifiswitch_device::{gpio::PinName, DeviceState};

use crate::common::{errors::Error, messages::Envelope};

pub const DEFAULT_SSID: &str = "OhMyWIFI";
pub const DEFAULT_HOSTNAME: &str = "testswitch";
pub const DEFAULT_IP: &str = "500.500.500.500";
pub const DEFAULT_CHANNEL: u32 = 9;

/// `fw` request, `mode` is the only writable property
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FirmwareRequest {
    pub mode: Option<String>,
}

/// `station` request
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StationRequest {
    pub ssid: Option<Value>,
    pub hostname: Option<Value>,
    pub ip: Option<Value>,
    /// Write only, never echoed
    pub passwd: Option<Value>,
}

/// `ap` request
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AccessPointRequest {
    pub ssid: Option<Value>,
    pub hostname: Option<Value>,
    pub channel: Option<Value>,
    /// Write only, never echoed
    pub passwd: Option<Value>,
}

/// `gpio` request, pin number to value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpioRequest {
    pub values: Map<String, Value>,
}

/// Station settings after default substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationSettings {
    pub ssid: Value,
    pub hostname: Value,
    pub ip: Value,
}

/// Access point settings after default substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPointSettings {
    pub ssid: Value,
    pub hostname: Value,
    pub channel: Value,
}

impl StationRequest {
    pub fn with_defaults(self) -> StationSettings {
        StationSettings {
            ssid: self.ssid.unwrap_or_else(|| DEFAULT_SSID.into()),
            hostname: self.hostname.unwrap_or_else(|| DEFAULT_HOSTNAME.into()),
            ip: self.ip.unwrap_or_else(|| DEFAULT_IP.into()),
        }
    }
}

impl AccessPointRequest {
    pub fn with_defaults(self) -> AccessPointSettings {
        AccessPointSettings {
            ssid: self.ssid.unwrap_or_else(|| DEFAULT_SSID.into()),
            hostname: self.hostname.unwrap_or_else(|| DEFAULT_HOSTNAME.into()),
            channel: self.channel.unwrap_or_else(|| DEFAULT_CHANNEL.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Firmware(FirmwareRequest),
    Networks,
    Station(StationRequest),
    AccessPoint(AccessPointRequest),
    Gpio(GpioRequest),
}

impl Command {
    /// Interpret an envelope as a command.
    pub fn from_envelope(envelope: &Envelope) -> Result<Self, Error> {
        let fields = || Value::Object(envelope.fields().clone());
        Ok(match envelope.kind() {
            "fw" => Command::Firmware(serde_json::from_value(fields())?),
            "networks" => Command::Networks,
            "station" => Command::Station(serde_json::from_value(fields())?),
            "ap" => Command::AccessPoint(serde_json::from_value(fields())?),
            "gpio" => Command::Gpio(GpioRequest {
                values: envelope.fields().clone(),
            }),
            other => return Err(Error::UnknownCommand(other.to_string())),
        })
    }

    /// Apply the command to the device and build the reply
    pub fn execute(self, device: &mut DeviceState) -> Envelope {
        match self {
            Command::Firmware(request) => {
                if let Some(mode) = request.mode {
                    device.set_radio_mode(mode);
                }
                Envelope::new("fw")
                    .with("mode", device.radio_mode())
                    .with("ver", device.firmware_version())
            }
            Command::Networks => Envelope::new("networks").with("ssids", device.known_networks()),
            Command::Station(request) => {
                let settings = request.with_defaults();
                Envelope::new("station")
                    .with("ssid", settings.ssid)
                    .with("hostname", settings.hostname)
                    .with("ip", settings.ip)
            }
            Command::AccessPoint(request) => {
                let settings = request.with_defaults();
                Envelope::new("ap")
                    .with("ssid", settings.ssid)
                    .with("hostname", settings.hostname)
                    .with("channel", settings.channel)
            }
            Command::Gpio(request) => {
                for (name, value) in request.values {
                    match PinName::parse(&name) {
                        Some(pin) => device.set_gpio(pin, value),
                        None => log::debug!("Ignoring non-pin gpio field {:?}", name),
                    }
                }
                gpio_state(device)
            }
        }
    }
}

/// Full GPIO state: the exposed channels merged with every known pin value
pub fn gpio_state(device: &DeviceState) -> Envelope {
    device.gpio_values().iter().fold(
        Envelope::new("gpio").with("gpios", device.gpio_channels()),
        |envelope, (pin, value)| envelope.with(pin.as_str(), value.clone()),
    )
}

/// Handle one inbound envelope.
///
/// Returns the reply to send, or an error if nothing should be sent.
pub fn handle(envelope: &Envelope, device: &mut DeviceState) -> Result<Envelope, Error> {
    let command = Command::from_envelope(envelope)?;
    log::trace!("Executing {:?}", command);
    Ok(command.execute(device))
}
