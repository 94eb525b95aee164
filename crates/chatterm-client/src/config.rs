//! Client runtime configuration.

use std::time::Duration;

use chatterm_proto::payloads::LoginRequest;
use chatterm_render::{Palette, RenderStyle, StyleError, parse_color};

/// Time allowed for the read side to finish after a close is requested.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Timeout for a single REST room lookup.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Websocket endpoint path on the backend host.
pub const WEBSOCKET_PATH: &str = "/websocket";

/// Whether to use TLS for the websocket and REST connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Security {
    /// `wss://` and `https://`
    #[default]
    Tls,
    /// `ws://` and `http://`, for local development servers
    Plain,
}

/// Configuration for one client run.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend host, optionally with port (e.g. `chat.example.com`)
    pub host: String,
    /// Transport security
    pub security: Security,
    /// Ready-made login payload
    pub login: LoginRequest,
    /// Rendering style
    pub style: RenderStyle,
    /// Shutdown grace period
    pub shutdown_grace: Duration,
    /// REST request timeout
    pub http_timeout: Duration,
}

impl ClientConfig {
    /// Websocket URL for the configured host.
    pub fn websocket_url(&self) -> String {
        let scheme = match self.security {
            Security::Tls => "wss",
            Security::Plain => "ws",
        };
        format!("{scheme}://{}{WEBSOCKET_PATH}", self.host)
    }

    /// Base URL for REST calls.
    pub fn rest_base(&self) -> String {
        let scheme = match self.security {
            Security::Tls => "https",
            Security::Plain => "http",
        };
        format!("{scheme}://{}", self.host)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost:3000".to_string(),
            security: Security::Tls,
            login: LoginRequest::Resume { token: String::new() },
            style: RenderStyle::default(),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

/// Pick the login method from the supplied credentials.
///
/// A resume token wins over LDAP credentials. Returns `None` when neither a
/// token nor a complete username/password pair is available.
pub fn login_request(
    token: Option<String>,
    username: Option<String>,
    password: Option<String>,
) -> Option<LoginRequest> {
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        return Some(LoginRequest::Resume { token });
    }
    match (username, password) {
        (Some(username), Some(password)) if !username.is_empty() => {
            Some(LoginRequest::Ldap { username, password })
        },
        _ => None,
    }
}

/// User overrides for the rendering style. Unset fields keep the defaults.
#[derive(Debug, Clone, Default)]
pub struct StyleOptions {
    /// Sender name palette
    pub text_colors: Vec<String>,
    /// Room badge palette
    pub highlight_colors: Vec<String>,
    /// Code color
    pub code: Option<String>,
    /// Mention background
    pub notify: Option<String>,
    /// Ticket reference color
    pub ticket: Option<String>,
    /// Room column width
    pub room_width: Option<usize>,
    /// Sender column width
    pub sender_width: Option<usize>,
}

impl StyleOptions {
    /// Apply the overrides to the default style.
    pub fn build(self) -> Result<RenderStyle, StyleError> {
        let mut style = RenderStyle::default();
        if !self.text_colors.is_empty() {
            style.text_palette = Palette::parse(&self.text_colors)?;
        }
        if !self.highlight_colors.is_empty() {
            style.highlight_palette = Palette::parse(&self.highlight_colors)?;
        }
        if let Some(spec) = &self.code {
            style.code = parse_color(spec)?;
        }
        if let Some(spec) = &self.notify {
            style.notify = parse_color(spec)?;
        }
        if let Some(spec) = &self.ticket {
            style.ticket = parse_color(spec)?;
        }
        if let Some(width) = self.room_width {
            style.room_width = width;
        }
        if let Some(width) = self.sender_width {
            style.sender_width = width;
        }
        Ok(style)
    }
}
