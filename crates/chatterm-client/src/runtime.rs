//! Async runtime
//!
//! Two tasks share one websocket connection:
//!
//! - The read task owns the [`Session`] and the read half. It feeds frames
//!   into the session, executes the actions that come out, and routes message
//!   batches through the catalog to the display.
//! - The write task (the caller of [`run`]) owns the write half. It is the
//!   only writer: outbound frames from the read task and the close frame all
//!   go through it. It also owns the interrupt.
//!
//! Shutdown on interrupt:
//!
//! ```text
//! interrupt ──► write task ──watch──► read task: Interrupt (phase bookkeeping)
//!               sends close(1000)
//!               waits on read task ≤ grace, then aborts it
//! ```
//!
//! The wait is bounded even when the read task is busy in a lazy room fetch
//! or a display write and never looks at the shutdown notice.

use std::io;

use chatterm_core::{
    RoomSource, Session, SessionAction, SessionConfig, SessionError, SessionEvent, SystemEnv, route,
};
use chatterm_render::{RenderStyle, render};
use thiserror::Error;
use tokio::{
    sync::{mpsc, watch},
    task::JoinError,
    time::{Duration, Instant, sleep_until},
};
use tracing::{debug, error, info, warn};

use crate::{
    config::ClientConfig,
    display::LineSink,
    rest::Authorize,
    store::TokenStore,
    transport::{self, FrameStream, Inbound, TransportError},
};

/// Runtime errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Writing to the display failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The session ended with a fatal error.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// The read task panicked or was cancelled.
    #[error("read task failed: {0}")]
    Task(String),
}

enum Flow {
    Continue,
    Done(Option<SessionError>),
}

/// Connect, run the session until it terminates, and return how it ended.
///
/// `interrupt` resolves when the user asks to quit (ctrl-c in the binary).
/// A clean shutdown returns `Ok(())`; a fatal session error is returned as
/// [`RuntimeError::Session`].
pub async fn run<S, T, L, I>(
    config: ClientConfig,
    source: S,
    mut store: T,
    sink: L,
    interrupt: I,
) -> Result<(), RuntimeError>
where
    S: RoomSource + Authorize + 'static,
    T: TokenStore + 'static,
    L: LineSink + 'static,
    I: Future<Output = ()>,
{
    let url = config.websocket_url();
    info!(url, "connecting");
    let (mut frames_out, frames_in) = match transport::connect(&url).await {
        Ok(halves) => halves,
        Err(e) => {
            // a bad host makes any cached token useless
            if let Err(clear) = store.clear() {
                warn!(error = %clear, "failed to clear token store");
            }
            return Err(e.into());
        },
    };

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let session = Session::new(
        SystemEnv::new(),
        SessionConfig { host: config.host.clone(), login: config.login.clone() },
    );
    let reader = ReadTask {
        session,
        frames: frames_in,
        source,
        store,
        sink,
        style: config.style.clone(),
        outbound: outbound_tx,
        shutdown: shutdown_rx,
        interrupted: false,
        grace: config.shutdown_grace,
        deadline: None,
    };
    let mut read_handle = tokio::spawn(reader.run());

    tokio::pin!(interrupt);
    loop {
        tokio::select! {
            result = &mut read_handle => return join_result(result),
            () = &mut interrupt => break,
            Some(text) = outbound_rx.recv() => {
                if let Err(e) = transport::send_text(&mut frames_out, text).await {
                    error!(error = %e, "write failed");
                    read_handle.abort();
                    return Err(e.into());
                }
            },
        }
    }

    info!("interrupt received, closing");
    if shutdown_tx.send(true).is_err() {
        debug!("read task already gone");
    }
    // peer may have closed first; the read task settles it
    if let Err(e) = transport::send_close(&mut frames_out).await {
        warn!(error = %e, "close frame not sent");
    }

    match tokio::time::timeout(config.shutdown_grace, &mut read_handle).await {
        Ok(result) => join_result(result),
        Err(_) => {
            warn!(grace = ?config.shutdown_grace, "read task still busy, aborting");
            read_handle.abort();
            Ok(())
        },
    }
}

fn join_result(result: Result<Result<(), RuntimeError>, JoinError>) -> Result<(), RuntimeError> {
    result.map_err(|e| RuntimeError::Task(e.to_string()))?
}

/// Read side of the connection. Sole owner of the session.
struct ReadTask<S, T, L> {
    session: Session<SystemEnv>,
    frames: FrameStream,
    source: S,
    store: T,
    sink: L,
    style: RenderStyle,
    outbound: mpsc::UnboundedSender<String>,
    shutdown: watch::Receiver<bool>,
    interrupted: bool,
    grace: Duration,
    deadline: Option<Instant>,
}

impl<S, T, L> ReadTask<S, T, L>
where
    S: RoomSource + Authorize,
    T: TokenStore,
    L: LineSink,
{
    async fn run(mut self) -> Result<(), RuntimeError> {
        let mut actions = self.session.handle(SessionEvent::Start)?;
        loop {
            for action in actions {
                if let Flow::Done(error) = self.execute(action).await? {
                    info!(phase = ?self.session.phase(), "session ended");
                    return error.map_or(Ok(()), |e| Err(e.into()));
                }
            }
            let event = self.next_event().await;
            actions = match self.session.handle(event) {
                Ok(actions) => actions,
                Err(e) if !e.is_fatal() => {
                    warn!(error = %e, "event rejected by session");
                    Vec::new()
                },
                Err(e) => return Err(e.into()),
            };
        }
    }

    async fn next_event(&mut self) -> SessionEvent {
        let deadline = self.deadline;
        // shutdown first: the notice is sent before the close frame, so the
        // peer's close reply must not be seen as a lost connection
        tokio::select! {
            biased;
            _ = self.shutdown.changed(), if !self.interrupted => {
                self.interrupted = true;
                SessionEvent::Interrupt
            },
            inbound = transport::next_frame(&mut self.frames) => match inbound {
                Ok(Inbound::Text(text)) => SessionEvent::FrameReceived(text),
                Ok(Inbound::Closed) => SessionEvent::TransportClosed,
                Err(e) => SessionEvent::TransportError(e.to_string()),
            },
            () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                SessionEvent::GraceElapsed
            },
        }
    }

    async fn execute(&mut self, action: SessionAction) -> Result<Flow, RuntimeError> {
        match action {
            SessionAction::Send(request) => match request.encode() {
                Ok(text) => self.enqueue(text),
                Err(e) => warn!(error = %e, "dropping unencodable request"),
            },
            // the write task sends the close frame; only the grace timer is ours
            SessionAction::Close => self.deadline = Some(Instant::now() + self.grace),
            SessionAction::PersistToken(token) => {
                self.source.authorize(&token.user_id, &token.token);
                if let Err(e) = self.store.persist(token) {
                    warn!(error = %e, "failed to persist token");
                }
            },
            SessionAction::ClearToken => {
                if let Err(e) = self.store.clear() {
                    warn!(error = %e, "failed to clear token store");
                }
            },
            SessionAction::Route(batch) => {
                let records = route(batch, self.session.catalog_mut(), &self.source).await;
                for record in &records {
                    self.sink.show(&render(record, &self.style))?;
                }
            },
            SessionAction::Terminate { error } => return Ok(Flow::Done(error)),
        }
        Ok(Flow::Continue)
    }

    fn enqueue(&self, text: String) {
        if self.outbound.send(text).is_err() {
            debug!("write task gone, dropping outbound frame");
        }
    }
}
