use serde_json::{Map, Value};
use tide_websockets::Message;

use crate::common::errors::Error;

/// Name of the discriminator field present in every envelope
pub const TYPE_FIELD: &str = "type";

/// One JSON message exchanged with a client, in either direction.
///
/// `{"type": "<kind>", ...fields}`
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    kind: String,
    fields: Map<String, Value>,
}

impl Envelope {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: Map::new(),
        }
    }

    /// Add a field, builder style
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add or replace a field.
    ///
    /// The discriminator cannot be replaced through here.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        if key != TYPE_FIELD {
            self.fields.insert(key, value.into());
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// All fields except the discriminator
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Parse a text frame.
    ///
    /// The payload must be a JSON object with a string `type`.
    pub fn decode(text: &str) -> Result<Self, Error> {
        let mut fields = match serde_json::from_str(text)? {
            Value::Object(fields) => fields,
            _ => return Err(Error::MalformedMessage("not a JSON object".to_string())),
        };
        match fields.remove(TYPE_FIELD) {
            Some(Value::String(kind)) => Ok(Self { kind, fields }),
            Some(_) => Err(Error::MalformedMessage("type is not a string".to_string())),
            None => Err(Error::MalformedMessage("missing type".to_string())),
        }
    }

    /// Serialize to a text frame, discriminator first
    pub fn encode(&self) -> String {
        let mut object = Map::with_capacity(self.fields.len() + 1);
        object.insert(TYPE_FIELD.to_string(), Value::String(self.kind.clone()));
        object.extend(self.fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        Value::Object(object).to_string()
    }
}

/// Close code and description sent by the peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseReason {
    pub code: u16,
    pub description: String,
}

/// An inbound WebSocket message, independent of the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
    Ping,
    Pong,
    Close(Option<CloseReason>),
}

impl Frame {
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Text(_) => "text",
            Frame::Binary(_) => "binary",
            Frame::Ping => "ping",
            Frame::Pong => "pong",
            Frame::Close(_) => "close",
        }
    }
}

impl From<Message> for Frame {
    fn from(message: Message) -> Self {
        match message {
            Message::Text(text) => Frame::Text(text),
            Message::Binary(data) => Frame::Binary(data),
            Message::Ping(_) => Frame::Ping,
            Message::Pong(_) => Frame::Pong,
            Message::Close(frame) => Frame::Close(frame.map(|frame| CloseReason {
                code: frame.code.into(),
                description: frame.reason.into_owned(),
            })),
        }
    }
}
