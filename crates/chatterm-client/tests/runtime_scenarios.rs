//! End-to-end runtime scenarios against a scripted in-process backend
//!
//! The backend speaks just enough of the realtime protocol to drive one
//! session: handshake, login, room catalog, subscription and a message batch.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use chatterm_client::{
    Authorize, ChannelSink, ClientConfig, MemoryTokenStore, RuntimeError, Security, TokenStore,
    run,
};
use chatterm_core::{CachedToken, CatalogError, RoomSource, SessionError};
use chatterm_proto::payloads::{LoginRequest, RoomRecord};
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::{
    net::TcpListener,
    sync::{Notify, oneshot},
    task::JoinHandle,
};
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Room source that knows one extra room and records authorizations.
#[derive(Clone, Default)]
struct StubSource {
    fetched: Arc<Mutex<Vec<String>>>,
    authorized: Arc<Mutex<Option<(String, String)>>>,
}

impl RoomSource for StubSource {
    async fn fetch_room(&self, room_id: &str) -> Result<Option<RoomRecord>, CatalogError> {
        self.fetched.lock().unwrap().push(room_id.to_owned());
        Ok((room_id == "r9").then(|| RoomRecord {
            id: "r9".into(),
            fname: Some("ops".into()),
            ..RoomRecord::default()
        }))
    }
}

impl Authorize for StubSource {
    fn authorize(&mut self, user_id: &str, token: &str) {
        *self.authorized.lock().unwrap() = Some((user_id.to_owned(), token.to_owned()));
    }
}

/// Room source whose lookups hang far past any shutdown grace.
#[derive(Default)]
struct StallingSource {
    started: Arc<Notify>,
}

impl RoomSource for StallingSource {
    async fn fetch_room(&self, _room_id: &str) -> Result<Option<RoomRecord>, CatalogError> {
        self.started.notify_one();
        tokio::time::sleep(Duration::from_secs(8)).await;
        Ok(None)
    }
}

impl Authorize for StallingSource {
    fn authorize(&mut self, _user_id: &str, _token: &str) {}
}

#[derive(Clone, Copy)]
enum Script {
    /// Full happy path; answers the client's close
    Happy,
    /// Happy path, then stops reading so the close is never answered
    Silent,
    /// Rejects the login
    RejectLogin,
}

fn message(id: &str, rid: &str, text: &str, sent: i64, updated: i64) -> Value {
    json!({
        "_id": id,
        "rid": rid,
        "msg": text,
        "ts": {"$date": sent},
        "_updatedAt": {"$date": updated},
        "u": {"_id": "u2", "username": "mary", "name": "Mary Ann Smith"}
    })
}

fn respond(script: Script, request: &Value) -> Vec<Value> {
    let id = request["id"].clone();
    match (request["msg"].as_str(), request["method"].as_str()) {
        (Some("connect"), _) => vec![json!({"msg": "connected", "session": "s1"})],
        (Some("method"), Some("login")) => match script {
            Script::RejectLogin => vec![json!({
                "msg": "result",
                "id": id,
                "error": {"error": 403, "reason": "User not found"}
            })],
            Script::Happy | Script::Silent => vec![json!({
                "msg": "result",
                "id": id,
                "result": {"id": "u1", "token": "tok", "tokenExpires": {"$date": 1_800_000_000_000_i64}}
            })],
        },
        (Some("method"), Some("rooms/get")) => vec![json!({
            "msg": "result",
            "id": id,
            "result": {"update": [{"_id": "r1", "name": "general"}]}
        })],
        (Some("sub"), _) => vec![
            json!({"msg": "ready", "subs": [id]}),
            json!({
                "msg": "changed",
                "collection": "stream-room-messages",
                "fields": {
                    "eventName": "__my_messages__",
                    "args": [
                        message("m1", "r1", "hello @bob", 1_000, 1_000),
                        message("m2", "r1", "edited", 1_000, 5_000),
                        message("m3", "r9", "deploy #42", 2_000, 2_000),
                    ]
                }
            }),
        ],
        _ => Vec::new(),
    }
}

/// Serve one connection. Resolves to the close code the client sent, if any.
async fn backend(script: Script) -> (String, JoinHandle<Option<u16>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();

    let handle = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(tcp).await.unwrap();
        let mut close_code = None;

        while let Some(frame) = ws.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    let request: Value = serde_json::from_str(text.as_str()).unwrap();
                    let subscribed = request["msg"] == "sub";
                    for reply in respond(script, &request) {
                        if ws.send(Message::Text(reply.to_string().into())).await.is_err() {
                            return close_code;
                        }
                    }
                    if subscribed && matches!(script, Script::Silent) {
                        // hold the socket open without reading
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        return None;
                    }
                },
                Ok(Message::Close(frame)) => close_code = frame.map(|f| u16::from(f.code)),
                Ok(_) => {},
                Err(_) => break,
            }
        }
        close_code
    });

    (host, handle)
}

fn config(host: String) -> ClientConfig {
    ClientConfig {
        host,
        security: Security::Plain,
        login: LoginRequest::Ldap { username: "ann".into(), password: "pw".into() },
        shutdown_grace: Duration::from_millis(200),
        ..ClientConfig::default()
    }
}

#[tokio::test]
async fn streams_messages_then_closes_cleanly() {
    let (host, server) = backend(Script::Happy).await;
    let source = StubSource::default();
    let store = MemoryTokenStore::new();
    let (sink, mut lines) = ChannelSink::channel();
    let (quit_tx, quit_rx) = oneshot::channel::<()>();

    let interrupt = async move {
        let _ = quit_rx.await;
    };
    let watcher = async move {
        let first = lines.recv().await.unwrap();
        let second = lines.recv().await.unwrap();
        quit_tx.send(()).unwrap();
        (first, second)
    };

    let (result, (first, second)) =
        tokio::join!(run(config(host.clone()), source.clone(), store.clone(), sink, interrupt), watcher);

    result.unwrap();

    // bulk-loaded room, edit suppressed, then the lazily fetched room
    assert!(first.contains(" general "));
    assert!(first.contains("Mary AS"));
    assert!(first.contains("hello"));
    assert!(second.contains(" ops "));
    assert!(second.contains("deploy"));
    assert!(!first.contains("edited") && !second.contains("edited"));

    assert_eq!(*source.fetched.lock().unwrap(), vec!["r9".to_owned()]);
    assert_eq!(*source.authorized.lock().unwrap(), Some(("u1".to_owned(), "tok".to_owned())));

    let token = store.current().unwrap();
    assert_eq!(token.host, host);
    assert_eq!(token.user_id, "u1");
    assert_eq!(token.expires_at, Some(1_800_000_000_000));

    assert_eq!(server.await.unwrap(), Some(1000));
}

#[tokio::test]
async fn unanswered_close_ends_after_grace() {
    let (host, _server) = backend(Script::Silent).await;
    let (sink, mut lines) = ChannelSink::channel();
    let (quit_tx, quit_rx) = oneshot::channel::<()>();

    let interrupt = async move {
        let _ = quit_rx.await;
    };
    let watcher = async move {
        lines.recv().await.unwrap();
        quit_tx.send(()).unwrap();
    };

    let started = tokio::time::Instant::now();
    let (result, ()) = tokio::join!(
        run(config(host), StubSource::default(), MemoryTokenStore::new(), sink, interrupt),
        watcher
    );

    result.unwrap();
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn interrupt_during_stalled_fetch_is_bounded() {
    let (host, server) = backend(Script::Happy).await;
    let source = StallingSource::default();
    let started = Arc::clone(&source.started);
    let (sink, _lines) = ChannelSink::channel();
    let (quit_tx, quit_rx) = oneshot::channel::<()>();

    let interrupt = async move {
        let _ = quit_rx.await;
    };
    // the unknown room r9 in the first batch blocks the read task in a fetch
    let watcher = async move {
        started.notified().await;
        quit_tx.send(()).unwrap();
    };

    let begun = tokio::time::Instant::now();
    let (result, ()) =
        tokio::join!(run(config(host), source, MemoryTokenStore::new(), sink, interrupt), watcher);

    result.unwrap();
    assert!(begun.elapsed() < Duration::from_secs(3), "shutdown took {:?}", begun.elapsed());

    // the close frame went out even though the read task never saw the interrupt
    let code = tokio::time::timeout(Duration::from_secs(5), server).await.unwrap().unwrap();
    assert_eq!(code, Some(1000));
}

#[tokio::test]
async fn rejected_login_clears_token_and_fails() {
    let (host, _server) = backend(Script::RejectLogin).await;
    let mut store = MemoryTokenStore::new();
    store
        .persist(CachedToken {
            host: host.clone(),
            user_id: "u1".into(),
            token: "stale".into(),
            expires_at: None,
        })
        .unwrap();
    let (sink, _lines) = ChannelSink::channel();

    let result =
        run(config(host), StubSource::default(), store.clone(), sink, std::future::pending()).await;

    match result {
        Err(RuntimeError::Session(SessionError::Authentication { reason })) => {
            assert_eq!(reason, "User not found");
        },
        other => panic!("expected authentication failure, got {other:?}"),
    }
    assert_eq!(store.current(), None);
}

#[tokio::test]
async fn dial_failure_clears_token() {
    // reserve a port, then free it so nothing is listening
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();
    drop(listener);

    let mut store = MemoryTokenStore::new();
    store
        .persist(CachedToken {
            host: host.clone(),
            user_id: "u1".into(),
            token: "t".into(),
            expires_at: None,
        })
        .unwrap();
    let (sink, _lines) = ChannelSink::channel();

    let result =
        run(config(host), StubSource::default(), store.clone(), sink, std::future::pending()).await;

    assert!(matches!(result, Err(RuntimeError::Transport(_))));
    assert_eq!(store.current(), None);
}
