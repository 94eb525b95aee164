//! Inbound and outbound frames.
//!
//! Inbound text is held as an [`InboundFrame`]: the decoded [`FrameHeader`]
//! plus the raw text, so the payload can be decoded later into whatever
//! type the dispatch branch expects. Outbound frames are a closed [`Request`]
//! enum tagged by `msg` on the wire.

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    FrameHeader,
    errors::{ProtocolError, Result},
    payloads::{Connect, MethodCall, Pong, Subscribe},
};

/// A decoded inbound frame.
///
/// Holds the discriminator and the raw JSON text. The payload is decoded on
/// demand via [`InboundFrame::payload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundFrame {
    /// Coarse discriminator decoded from the frame.
    pub header: FrameHeader,
    raw: String,
}

impl InboundFrame {
    /// Decode the discriminator of a text frame.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::JsonDecode` if the text is not a JSON object.
    pub fn decode(text: impl Into<String>) -> Result<Self> {
        let raw = text.into();
        let header: FrameHeader = serde_json::from_str(&raw).map_err(|e| ProtocolError::decode(&e))?;
        Ok(Self { header, raw })
    }

    /// Decode the full frame into a typed payload.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::JsonDecode` if the frame does not match `T`.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.raw).map_err(|e| ProtocolError::decode(&e))
    }
}

/// Every frame the client sends.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "msg", rename_all = "lowercase")]
pub enum Request {
    /// Protocol handshake.
    Connect(Connect),
    /// Keep-alive reply.
    Pong(Pong),
    /// Remote method call (login, room catalog).
    Method(MethodCall),
    /// Collection subscription.
    Sub(Subscribe),
}

impl Request {
    /// Serialize to frame text.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::JsonEncode` if serialization fails.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ProtocolError::encode(&e))
    }

    /// Correlation ID carried by this request, if it expects a reply.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Method(call) => Some(&call.id),
            Self::Sub(sub) => Some(&sub.id),
            Self::Connect(_) | Self::Pong(_) => None,
        }
    }
}
