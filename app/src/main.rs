use std::time::Duration;

use async_std::{future::timeout, io};
use clap::Parser;
use wifiswitch_device::{gpio::Pin, DeviceState};
use wifiswitch_websocket::{
    server::{origin::AllowAnyOrigin, Server, ServerConfig},
    STANDARD_PORT,
};

/// Mock wifiswitch device for testing the web interface
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(default_value = "0.0.0.0")]
    ip: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = STANDARD_PORT)]
    port: u16,

    /// Milliseconds between unsolicited GPIO pushes
    #[arg(long, default_value_t = 3333, value_parser = clap::value_parser!(u64).range(1..))]
    push_interval: u64,

    /// GPIO pin toggled by the push timer
    #[arg(long, default_value_t = 5)]
    push_pin: Pin,

    /// Log level
    #[arg(short, long, default_value_t = log::LevelFilter::Info)]
    log_level: log::LevelFilter,

    /// Kill server after timeout (useful for coverage testing)
    #[arg(short, long)]
    timeout: Option<u64>,
}

#[async_std::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    femme::with_level(args.log_level);

    let device = DeviceState::default().into_shared();
    let config = ServerConfig::default()
        .push_interval(Duration::from_millis(args.push_interval))
        .push_pin(args.push_pin);

    let server = Server::new(config, device, AllowAnyOrigin).accept((args.ip.clone(), args.port));

    log::info!("Running server on port {}:{}...", args.ip, args.port);
    if let Some(t) = args.timeout {
        match timeout(Duration::from_millis(t), server).await {
            Ok(res) => res,
            Err(_) => {
                log::info!("Timeout reached, stopping");
                Ok(())
            }
        }
    } else {
        server.await
    }
}
