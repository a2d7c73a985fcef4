use std::io;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use async_std::sync::Arc;
use tide::listener::ToListener;
use tide::{Middleware, Next, Request, Response, StatusCode};
use tide_websockets::{WebSocket, WebSocketConnection};
use wifiswitch_device::SharedDevice;

use crate::common::errors::Error;

pub mod config;
pub mod dispatch;
pub mod origin;
pub mod session;

pub use config::ServerConfig;
use origin::OriginPolicy;
use session::Session;

/// wifiswitch WebSocket server.
///
/// Any plain HTTP request is answered with 404, upgrade requests are checked
/// against the origin policy and handed to a new [`Session`].
pub struct Server<P> {
    config: ServerConfig,
    device: SharedDevice,
    policy: P,
    id_counter: AtomicU32,
    num_sessions: AtomicUsize,
}

impl<P> Server<P>
where
    P: OriginPolicy,
{
    pub fn new(config: ServerConfig, device: SharedDevice, policy: P) -> Arc<Self> {
        Arc::new(Server {
            config,
            device,
            policy,
            id_counter: AtomicU32::new(0),
            num_sessions: AtomicUsize::new(0),
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn device(&self) -> &SharedDevice {
        &self.device
    }

    /// Number of currently open sessions
    pub fn num_sessions(&self) -> usize {
        self.num_sessions.load(Ordering::SeqCst)
    }

    /// Apply the origin policy to a handshake
    pub fn admit(&self, origin: Option<&str>) -> Result<(), Error> {
        if self.policy.is_allowed(origin) {
            Ok(())
        } else {
            Err(Error::OriginRejected(origin.map(str::to_string)))
        }
    }

    fn next_id(&self) -> u32 {
        self.id_counter.fetch_add(1, Ordering::SeqCst).wrapping_add(1)
    }

    /// Build the HTTP application serving this device
    pub fn app(self: Arc<Self>) -> tide::Server<Arc<Self>> {
        let protocol = self.config.protocol.clone();
        let mut app = tide::with_state(self);
        for path in ["/", "/*"] {
            app.at(path)
                .with(OriginGuard)
                .with(
                    WebSocket::new(|request: Request<Arc<Self>>, connection| async move {
                        let server = request.state().clone();
                        server.serve(request, connection).await
                    })
                    .with_protocols(&[protocol.as_str()]),
                )
                .all(not_found::<Arc<Self>>);
        }
        app
    }

    /// Start accepting connections on `addr`
    ///
    pub async fn accept(self: Arc<Self>, addr: impl ToListener<Arc<Self>>) -> Result<(), io::Error> {
        self.app().listen(addr).await
    }

    async fn serve(
        &self,
        request: Request<Arc<Self>>,
        connection: WebSocketConnection,
    ) -> tide::Result<()> {
        let peer = request.remote().unwrap_or("<unknown>").to_string();
        let origin = request.header("Origin").map(|value| value.as_str().to_string());
        let session = Session::new(
            self.next_id(),
            peer,
            origin,
            self.device.clone(),
            self.config.clone(),
        );

        let id = session.id();
        let active = self.num_sessions.fetch_add(1, Ordering::SeqCst) + 1;
        log::debug!("Session {} started, {} open", id, active);
        let res = session.run(connection).await;
        let active = self.num_sessions.fetch_sub(1, Ordering::SeqCst) - 1;
        log::debug!("Session {} ended, {} open", id, active);
        res
    }
}

fn is_upgrade<S>(request: &Request<S>) -> bool {
    request
        .header("Upgrade")
        .map_or(false, |value| value.as_str().eq_ignore_ascii_case("websocket"))
}

/// Refuses WebSocket handshakes from origins the policy does not allow
struct OriginGuard;

#[async_trait::async_trait]
impl<P> Middleware<Arc<Server<P>>> for OriginGuard
where
    P: OriginPolicy,
{
    async fn handle(
        &self,
        request: Request<Arc<Server<P>>>,
        next: Next<'_, Arc<Server<P>>>,
    ) -> tide::Result {
        if is_upgrade(&request) {
            let origin = request.header("Origin").map(|value| value.as_str());
            if let Err(err) = request.state().admit(origin) {
                log::warn!(peer = request.remote().unwrap_or("<unknown>"); "Connection rejected: {}", err);
                return Ok(Response::new(StatusCode::Forbidden));
            }
        }
        Ok(next.run(request).await)
    }
}

async fn not_found<S>(request: Request<S>) -> tide::Result {
    log::info!("Received request for {}", request.url());
    Ok(Response::new(StatusCode::NotFound))
}
