pub mod common;
pub mod server;

/// Port the firmware's web server listens on
pub const STANDARD_PORT: u16 = 8080;

/// WebSocket sub-protocol spoken by the wifiswitch web interface
pub const PROTOCOL: &str = "wifiswitch";
