use thiserror::Error;

/// Errors raised while serving a client.
///
/// All of these are local to one message or one handshake, none of them
/// close the session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Handshake refused by the origin policy
    #[error("origin {} rejected", .0.as_deref().unwrap_or("<none>"))]
    OriginRejected(Option<String>),
    /// Text frame could not be decoded as an envelope
    #[error("malformed message: {0}")]
    MalformedMessage(String),
    /// Only text frames carry envelopes
    #[error("unsupported {0} frame")]
    UnsupportedFrame(&'static str),
    /// Envelope decoded but its type is not a known command
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedMessage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn display() {
        assert_eq!(
            Error::OriginRejected(Some("http://evil".into())).to_string(),
            "origin http://evil rejected"
        );
        assert_eq!(
            Error::OriginRejected(None).to_string(),
            "origin <none> rejected"
        );
        assert_eq!(
            Error::UnsupportedFrame("binary").to_string(),
            "unsupported binary frame"
        );
        assert_eq!(
            Error::UnknownCommand("reboot".into()).to_string(),
            "unknown command \"reboot\""
        );
    }
}
