//! Websocket transport.
//!
//! Thin layer over `tokio-tungstenite`: dials the backend and splits the
//! connection into a write half (owned by the write task) and a read half
//! (owned by the read task). Protocol logic stays in the Sans-IO session.

use futures::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{
        Message,
        protocol::{CloseFrame, frame::coding::CloseCode},
    },
};
use tracing::debug;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Dialling the backend failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Reading a frame failed.
    #[error("read failed: {0}")]
    Read(String),

    /// Writing a frame failed.
    #[error("write failed: {0}")]
    Write(String),

    /// HTTP request failed.
    #[error("http error: {0}")]
    Http(String),
}

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Write half of the connection.
pub type FrameSink = SplitSink<Socket, Message>;

/// Read half of the connection.
pub type FrameStream = SplitStream<Socket>;

/// What the read half produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A text frame
    Text(String),
    /// The peer closed the connection or the stream ended
    Closed,
}

/// Dial `url` and split the connection.
pub async fn connect(url: &str) -> Result<(FrameSink, FrameStream), TransportError> {
    let (socket, response) =
        connect_async(url).await.map_err(|e| TransportError::Connection(e.to_string()))?;
    debug!(url, status = %response.status(), "websocket connected");
    Ok(socket.split())
}

/// Wait for the next text frame, skipping control and binary frames.
pub async fn next_frame(stream: &mut FrameStream) -> Result<Inbound, TransportError> {
    loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => return Ok(Inbound::Text(text.as_str().to_owned())),
            Some(Ok(Message::Close(frame))) => {
                debug!(?frame, "peer closed connection");
                return Ok(Inbound::Closed);
            },
            Some(Ok(_)) => {},
            Some(Err(e)) => return Err(TransportError::Read(e.to_string())),
            None => return Ok(Inbound::Closed),
        }
    }
}

/// Send a text frame.
pub async fn send_text(sink: &mut FrameSink, text: String) -> Result<(), TransportError> {
    sink.send(Message::Text(text.into())).await.map_err(|e| TransportError::Write(e.to_string()))
}

/// Send a normal-closure close frame.
pub async fn send_close(sink: &mut FrameSink) -> Result<(), TransportError> {
    let frame = CloseFrame { code: CloseCode::Normal, reason: "".into() };
    sink.send(Message::Close(Some(frame))).await.map_err(|e| TransportError::Write(e.to_string()))
}
