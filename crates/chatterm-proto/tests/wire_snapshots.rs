//! Snapshot tests for outbound frame shapes
//!
//! The backend matches on exact field names, so every request kind is pinned
//! as a JSON snapshot.

#![allow(clippy::unwrap_used)]

use chatterm_proto::{
    Request,
    payloads::{Connect, LoginRequest, MethodCall, Ping, Pong, Subscribe},
};

fn json(req: &Request) -> serde_json::Value {
    serde_json::from_str(&req.encode().unwrap()).unwrap()
}

#[test]
fn connect_request() {
    insta::assert_json_snapshot!(json(&Request::Connect(Connect::default())), @r#"
    {
      "msg": "connect",
      "support": [
        "1"
      ],
      "version": "1"
    }
    "#);
}

#[test]
fn ldap_login_request() {
    let login = LoginRequest::Ldap { username: "alice".into(), password: "pw".into() };
    insta::assert_json_snapshot!(json(&Request::Method(MethodCall::login("AbCdE", login))), @r#"
    {
      "id": "AbCdE",
      "method": "login",
      "msg": "method",
      "params": [
        {
          "ldap": true,
          "ldapOptions": {},
          "ldapPass": "pw",
          "username": "alice"
        }
      ]
    }
    "#);
}

#[test]
fn rooms_request() {
    insta::assert_json_snapshot!(json(&Request::Method(MethodCall::rooms("qWeRt"))), @r#"
    {
      "id": "qWeRt",
      "method": "rooms/get",
      "msg": "method",
      "params": [
        {
          "$date": 0
        }
      ]
    }
    "#);
}

#[test]
fn subscribe_request() {
    insta::assert_json_snapshot!(json(&Request::Sub(Subscribe::room_messages("zXcVb"))), @r#"
    {
      "id": "zXcVb",
      "msg": "sub",
      "name": "stream-room-messages",
      "params": [
        "__my_messages__",
        false
      ]
    }
    "#);
}

#[test]
fn pong_echoes_ping_id() {
    let with_id = Pong::reply_to(&Ping { id: Some("p1".into()) });
    assert_eq!(Request::Pong(with_id).encode().unwrap(), r#"{"msg":"pong","id":"p1"}"#);
    assert_eq!(Request::Pong(Pong::default()).encode().unwrap(), r#"{"msg":"pong"}"#);
}
