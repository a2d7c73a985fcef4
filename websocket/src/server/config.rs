use std::time::Duration;

use wifiswitch_device::gpio::Pin;

use crate::PROTOCOL;

/// Shortest push timer period
pub const MIN_PUSH_INTERVAL: Duration = Duration::from_millis(1);

/// Server configuration builder
///
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Time between unsolicited GPIO pushes
    pub push_interval: Duration,
    /// Pin toggled by the push timer
    pub push_pin: Pin,
    /// WebSocket sub-protocol to negotiate
    pub protocol: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            push_interval: Duration::from_millis(3333),
            push_pin: 5,
            protocol: PROTOCOL.to_string(),
        }
    }
}

impl ServerConfig {
    /// Set the push timer period, at least [`MIN_PUSH_INTERVAL`]
    pub fn push_interval(mut self, push_interval: Duration) -> Self {
        self.push_interval = push_interval.max(MIN_PUSH_INTERVAL);
        self
    }

    pub fn push_pin(mut self, push_pin: Pin) -> Self {
        self.push_pin = push_pin;
        self
    }

    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{ServerConfig, MIN_PUSH_INTERVAL};

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.push_interval, Duration::from_millis(3333));
        assert_eq!(config.push_pin, 5);
        assert_eq!(config.protocol, "wifiswitch");
    }

    #[test]
    fn zero_interval_is_raised() {
        let config = ServerConfig::default().push_interval(Duration::ZERO);
        assert_eq!(config.push_interval, MIN_PUSH_INTERVAL);
        let config = config.push_interval(Duration::from_millis(50));
        assert_eq!(config.push_interval, Duration::from_millis(50));
    }
}
