//! Remote method calls and results.
//!
//! The client calls two methods: `login` (either with LDAP credentials or a
//! resume token) and `rooms/get` (the bulk room catalog). Both replies arrive
//! as `{"msg":"result"}` frames correlated by ID, carrying either `result` or
//! `error`.

use serde::{Deserialize, Serialize};

use super::Timestamp;

/// Login method name.
pub const METHOD_LOGIN: &str = "login";

/// Room catalog method name.
pub const METHOD_ROOMS_GET: &str = "rooms/get";

/// Method call request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodCall {
    /// Correlation ID.
    pub id: String,
    /// Method name.
    pub method: String,
    /// Positional parameters.
    pub params: Vec<MethodParam>,
}

impl MethodCall {
    /// Login call with the given credentials.
    pub fn login(id: impl Into<String>, login: LoginRequest) -> Self {
        Self { id: id.into(), method: METHOD_LOGIN.to_owned(), params: vec![login.into_param()] }
    }

    /// Bulk room catalog call, requesting every room since the epoch.
    pub fn rooms(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            method: METHOD_ROOMS_GET.to_owned(),
            params: vec![MethodParam::Since(Timestamp::from_millis(0))],
        }
    }
}

/// A single positional method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MethodParam {
    /// LDAP credentials.
    Ldap(LdapLogin),
    /// Resume token.
    Resume(ResumeLogin),
    /// Lower time bound.
    Since(Timestamp),
}

/// LDAP login parameter.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct LdapLogin {
    /// Always `true`.
    pub ldap: bool,
    /// Directory username.
    pub username: String,
    /// Directory password.
    #[serde(rename = "ldapPass")]
    pub password: String,
    /// Extra LDAP options, always empty.
    #[serde(rename = "ldapOptions")]
    pub options: serde_json::Map<String, serde_json::Value>,
}

/// Resume-token login parameter.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ResumeLogin {
    /// Previously issued token.
    pub resume: String,
}

impl std::fmt::Debug for LdapLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapLogin").field("username", &self.username).finish_non_exhaustive()
    }
}

impl std::fmt::Debug for ResumeLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResumeLogin").finish_non_exhaustive()
    }
}

/// Ready-made login payload.
///
/// Built by the binary from flags or the token cache and handed to the
/// session as-is. The session never inspects which variant it carries.
#[derive(Clone, PartialEq, Eq)]
pub enum LoginRequest {
    /// Log in with directory credentials.
    Ldap {
        /// Directory username.
        username: String,
        /// Directory password.
        password: String,
    },
    /// Resume a previous session.
    Resume {
        /// Previously issued token.
        token: String,
    },
}

impl LoginRequest {
    /// Convert to the wire parameter.
    pub fn into_param(self) -> MethodParam {
        match self {
            Self::Ldap { username, password } => MethodParam::Ldap(LdapLogin {
                ldap: true,
                username,
                password,
                options: serde_json::Map::new(),
            }),
            Self::Resume { token } => MethodParam::Resume(ResumeLogin { resume: token }),
        }
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ldap { username, .. } => {
                f.debug_struct("Ldap").field("username", username).finish_non_exhaustive()
            },
            Self::Resume { .. } => f.debug_struct("Resume").finish_non_exhaustive(),
        }
    }
}

/// Reply to a method call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MethodResult<T> {
    /// Correlation ID of the call.
    pub id: String,
    /// Successful result.
    pub result: Option<T>,
    /// Failure details.
    pub error: Option<ErrorPayload>,
}

/// Error object inside a failed result.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ErrorPayload {
    /// Error code, either numeric or a short string.
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    /// Short reason.
    #[serde(default)]
    pub reason: Option<String>,
    /// Long message.
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorPayload {
    /// Best available human-readable description.
    pub fn describe(&self) -> String {
        self.reason
            .clone()
            .or_else(|| self.message.clone())
            .or_else(|| self.error.as_ref().map(ToString::to_string))
            .unwrap_or_else(|| "unspecified error".to_owned())
    }
}

/// Successful login result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResult {
    /// Authenticated user ID.
    pub id: String,
    /// Session token, reusable for resume logins.
    pub token: String,
    /// Token expiry.
    #[serde(rename = "tokenExpires", default)]
    pub token_expires: Option<Timestamp>,
    /// Login type reported by the backend.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Successful room catalog result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RoomsResult {
    /// Rooms the user belongs to.
    #[serde(alias = "rooms", default)]
    pub update: Vec<RoomRecord>,
}

/// Room as it appears on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecord {
    /// Room ID.
    #[serde(rename = "_id")]
    pub id: String,
    /// Plain name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Friendly name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fname: Option<String>,
    /// Topic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Read-only flag.
    #[serde(rename = "ro", default)]
    pub read_only: bool,
    /// Member usernames.
    #[serde(default)]
    pub usernames: Vec<String>,
}

/// REST single-room response (`rooms.info`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RoomInfo {
    /// The room, absent if the backend does not know it.
    #[serde(default)]
    pub room: Option<RoomRecord>,
    /// Backend success flag.
    #[serde(default)]
    pub success: Option<bool>,
}
