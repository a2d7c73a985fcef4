use async_std::stream;
use futures::{select, StreamExt};
use tide_websockets::WebSocketConnection;
use wifiswitch_device::{gpio::Pin, SharedDevice};

use crate::common::{
    errors::Error,
    messages::{CloseReason, Envelope, Frame},
};
use crate::server::{config::ServerConfig, dispatch};

/// Lifecycle of a client connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Handshake received, not yet accepted
    Connecting,
    /// Exchanging messages, push timer running
    Open,
    /// Peer or transport closed the connection
    Closed,
    /// Handshake refused
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Accepted,
    Rejected,
    Disconnected,
}

impl SessionState {
    /// State after `event`. Closed and Rejected are terminal.
    pub fn on(self, event: SessionEvent) -> SessionState {
        match (self, event) {
            (SessionState::Connecting, SessionEvent::Accepted) => SessionState::Open,
            (SessionState::Connecting, SessionEvent::Rejected) => SessionState::Rejected,
            (SessionState::Connecting | SessionState::Open, SessionEvent::Disconnected) => {
                SessionState::Closed
            }
            (state, _) => state,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Closed | SessionState::Rejected)
    }
}

/// Set `pin` to a random level and build the push message announcing it
pub async fn push_gpio(device: &SharedDevice, pin: Pin) -> Envelope {
    let level = u8::from(rand::random::<bool>());
    device.lock().await.set_gpio(pin, level);
    Envelope::new("gpio").with(pin.to_string(), level)
}

/// One accepted client.
///
/// All device state lives in the shared device, a session only owns its
/// push timer while it runs.
pub struct Session {
    id: u32,
    peer: String,
    origin: Option<String>,
    state: SessionState,
    device: SharedDevice,
    config: ServerConfig,
}

impl Session {
    pub fn new(
        id: u32,
        peer: impl Into<String>,
        origin: Option<String>,
        device: SharedDevice,
        config: ServerConfig,
    ) -> Self {
        Self {
            id,
            peer: peer.into(),
            origin,
            state: SessionState::Connecting,
            device,
            config,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, event: SessionEvent) {
        let next = self.state.on(event);
        log::trace!(peer = self.peer.as_str(); "Session {} {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
    }

    pub fn open(&mut self) {
        self.transition(SessionEvent::Accepted);
        log::info!(peer = self.peer.as_str();
            "Connection {} accepted from origin {}", self.id, self.origin().unwrap_or("<none>")
        );
    }

    pub fn close(&mut self, reason: Option<&CloseReason>) {
        self.transition(SessionEvent::Disconnected);
        match reason {
            Some(reason) => log::info!(peer = self.peer.as_str();
                "Peer {} disconnected: {} {}", self.peer, reason.code, reason.description
            ),
            None => log::info!(peer = self.peer.as_str(); "Peer {} disconnected", self.peer),
        }
    }

    /// Handle one inbound frame while open.
    ///
    /// Returns the encoded reply, if any.
    pub async fn handle_frame(&self, frame: Frame) -> Result<Option<String>, Error> {
        if self.state != SessionState::Open {
            log::debug!(peer = self.peer.as_str(); "Dropping {} frame, session is {:?}", frame.kind(), self.state);
            return Ok(None);
        }
        match frame {
            Frame::Text(text) => {
                log::debug!(peer = self.peer.as_str(); "Received {}", text);
                let envelope = Envelope::decode(&text)?;
                let reply = {
                    let mut device = self.device.lock().await;
                    dispatch::handle(&envelope, &mut device)?
                };
                let reply = reply.encode();
                log::debug!(peer = self.peer.as_str(); "Sending {}", reply);
                Ok(Some(reply))
            }
            Frame::Binary(_) => Err(Error::UnsupportedFrame("binary")),
            Frame::Ping | Frame::Pong | Frame::Close(_) => Ok(None),
        }
    }

    /// Unsolicited GPIO push for the configured pin
    pub async fn push(&self) -> Envelope {
        push_gpio(&self.device, self.config.push_pin).await
    }

    /// Serve the connection until the peer or the transport closes it.
    ///
    /// Inbound frames and push timer ticks are handled one at a time by this
    /// task: every reply or push is sent before the next state change is
    /// made. The timer stops with the loop.
    pub async fn run(mut self, connection: WebSocketConnection) -> tide::Result<()> {
        self.open();

        let mut inbound = connection.clone().fuse();
        let mut ticks = stream::interval(self.config.push_interval).fuse();
        let mut reason = None;
        let result: tide::Result<()> = loop {
            let outgoing = select! {
                message = inbound.next() => match message {
                    Some(Ok(message)) => {
                        let frame = match Frame::from(message) {
                            Frame::Close(close) => {
                                reason = close;
                                break Ok(());
                            }
                            frame => frame,
                        };
                        match self.handle_frame(frame).await {
                            Ok(reply) => reply,
                            Err(err) => {
                                log::warn!(peer = self.peer.as_str(); "{}", err);
                                None
                            }
                        }
                    }
                    Some(Err(err)) => break Err(err.into()),
                    None => break Ok(()),
                },
                _ = ticks.next() => {
                    let message = self.push().await.encode();
                    log::debug!(peer = self.peer.as_str(); "Pushing {}", message);
                    Some(message)
                },
            };
            if let Some(message) = outgoing {
                if let Err(err) = connection.send_string(message).await {
                    break Err(err.into());
                }
            }
        };

        self.close(reason.as_ref());
        if let Err(err) = &result {
            log::warn!(peer = self.peer.as_str(); "Connection {} error: {}", self.id, err);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use wifiswitch_device::DeviceState;

    use super::*;

    fn session() -> Session {
        Session::new(
            1,
            "127.0.0.1:5000",
            Some("http://localhost".into()),
            DeviceState::default().into_shared(),
            ServerConfig::default(),
        )
    }

    fn text(s: &str) -> Frame {
        Frame::Text(s.to_string())
    }

    fn parse(reply: Option<String>) -> Value {
        serde_json::from_str(&reply.expect("reply")).unwrap()
    }

    #[test]
    fn transitions() {
        use SessionEvent as E;
        use SessionState as S;

        assert_eq!(S::Connecting.on(E::Accepted), S::Open);
        assert_eq!(S::Connecting.on(E::Rejected), S::Rejected);
        assert_eq!(S::Connecting.on(E::Disconnected), S::Closed);
        assert_eq!(S::Open.on(E::Disconnected), S::Closed);
        assert_eq!(S::Open.on(E::Accepted), S::Open);
        assert_eq!(S::Open.on(E::Rejected), S::Open);
        for event in [E::Accepted, E::Rejected, E::Disconnected] {
            assert_eq!(S::Closed.on(event), S::Closed);
            assert_eq!(S::Rejected.on(event), S::Rejected);
        }
        assert!(S::Closed.is_terminal());
        assert!(S::Rejected.is_terminal());
        assert!(!S::Open.is_terminal());
    }

    #[test]
    fn open_and_close() {
        let mut session = session();
        assert_eq!(session.state(), SessionState::Connecting);
        session.open();
        assert_eq!(session.state(), SessionState::Open);
        session.close(Some(&CloseReason {
            code: 1000,
            description: "bye".into(),
        }));
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(session.peer(), "127.0.0.1:5000");
        assert_eq!(session.origin(), Some("http://localhost"));
    }

    #[async_std::test]
    async fn frames_before_open_are_dropped() {
        let session = session();
        let reply = session.handle_frame(text(r#"{"type":"fw"}"#)).await.unwrap();
        assert_eq!(reply, None);
    }

    #[async_std::test]
    async fn end_to_end_scenario() {
        let mut session = session();
        session.open();

        let reply = session
            .handle_frame(text(r#"{"type":"fw","mode":"ap"}"#))
            .await
            .unwrap();
        assert_eq!(parse(reply), json!({"type": "fw", "mode": "ap", "ver": "1.0.1"}));

        let reply = session.handle_frame(text(r#"{"type":"gpio","4":1}"#)).await.unwrap();
        let reply = parse(reply);
        assert_eq!(reply["4"], json!(1));
        assert_eq!(reply["gpios"], json!([4, 5, 9]));
    }

    #[async_std::test]
    async fn malformed_then_valid() {
        let mut session = session();
        session.open();

        assert!(matches!(
            session.handle_frame(text("not json")).await,
            Err(Error::MalformedMessage(_))
        ));
        assert_eq!(session.state(), SessionState::Open);

        let reply = session.handle_frame(text(r#"{"type":"networks"}"#)).await.unwrap();
        assert_eq!(parse(reply)["type"], json!("networks"));
    }

    #[async_std::test]
    async fn unsupported_and_control_frames() {
        let mut session = session();
        session.open();

        assert!(matches!(
            session.handle_frame(Frame::Binary(vec![0, 1])).await,
            Err(Error::UnsupportedFrame("binary"))
        ));
        assert_eq!(session.handle_frame(Frame::Ping).await.unwrap(), None);
        assert!(matches!(
            session.handle_frame(text(r#"{"type":"reboot"}"#)).await,
            Err(Error::UnknownCommand(_))
        ));
    }

    #[async_std::test]
    async fn push_sets_one_pin() {
        let session = session();
        for _ in 0..16 {
            let push = session.push().await;
            assert_eq!(push.kind(), "gpio");
            assert_eq!(push.fields().len(), 1);
            let level = push.get("5").cloned().expect("pin 5");
            assert!(level == json!(0) || level == json!(1), "{level}");
            assert_eq!(session.device.lock().await.gpio("5"), Some(&level));
        }
    }

    #[async_std::test]
    async fn push_is_visible_to_gpio_reply() {
        let mut session = session();
        session.open();
        let push = session.push().await;
        let reply = parse(session.handle_frame(text(r#"{"type":"gpio"}"#)).await.unwrap());
        assert_eq!(Some(&reply["5"]), push.get("5"));
    }
}
