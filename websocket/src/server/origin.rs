/// Decides whether a WebSocket handshake from `origin` may be accepted.
pub trait OriginPolicy: Send + Sync + 'static {
    /// `origin` is the value of the `Origin` header, if the client sent one
    fn is_allowed(&self, origin: Option<&str>) -> bool;
}

/// Accept every origin
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAnyOrigin;

impl OriginPolicy for AllowAnyOrigin {
    fn is_allowed(&self, _origin: Option<&str>) -> bool {
        true
    }
}

impl<F> OriginPolicy for F
where
    F: Fn(Option<&str>) -> bool + Send + Sync + 'static,
{
    fn is_allowed(&self, origin: Option<&str>) -> bool {
        self(origin)
    }
}

#[cfg(test)]
mod tests {
    use super::{AllowAnyOrigin, OriginPolicy};

    #[test]
    fn allow_any() {
        assert!(AllowAnyOrigin.is_allowed(None));
        assert!(AllowAnyOrigin.is_allowed(Some("http://example.com")));
    }

    #[test]
    fn closure_policy() {
        let policy = |origin: Option<&str>| origin == Some("http://wifiswitch.local");
        assert!(policy.is_allowed(Some("http://wifiswitch.local")));
        assert!(!policy.is_allowed(Some("http://example.com")));
        assert!(!policy.is_allowed(None));
    }
}
