//! Chatterm binary.
//!
//! # Usage
//!
//! ```bash
//! # Resume a session with a saved token
//! CHATTERM_TOKEN=... chatterm --host chat.example.com
//!
//! # LDAP login against a local development server
//! CHATTERM_PASSWORD=... chatterm --host 127.0.0.1:3000 --plain --username ann
//! ```

use std::io;

use chatterm_client::{
    ClientConfig, MemoryTokenStore, RestRoomSource, Security, StyleOptions, WriterSink,
    login_request, run,
};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Realtime chat in the terminal
#[derive(Parser, Debug)]
#[command(name = "chatterm")]
#[command(about = "Stream chat messages from every joined room into the terminal")]
#[command(version)]
struct Args {
    /// Backend host, with optional port
    #[arg(long, env = "CHATTERM_HOST")]
    host: String,

    /// Use ws:// and http:// instead of TLS
    #[arg(long)]
    plain: bool,

    /// LDAP username
    #[arg(short, long, env = "CHATTERM_USER")]
    username: Option<String>,

    /// LDAP password
    #[arg(long, env = "CHATTERM_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Resume token from an earlier login (preferred over username/password)
    #[arg(long, env = "CHATTERM_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Sender name palette (256-color indices or #rrggbb)
    #[arg(long, value_delimiter = ',')]
    text_colors: Vec<String>,

    /// Room badge palette (256-color indices or #rrggbb)
    #[arg(long, value_delimiter = ',')]
    highlight_colors: Vec<String>,

    /// Code color
    #[arg(long)]
    code_color: Option<String>,

    /// Mention background color
    #[arg(long)]
    notify_color: Option<String>,

    /// Ticket reference color
    #[arg(long)]
    ticket_color: Option<String>,

    /// Room column width
    #[arg(long)]
    room_width: Option<usize>,

    /// Sender column width
    #[arg(long)]
    sender_width: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // stdout carries the chat lines
    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let Some(login) = login_request(args.token, args.username, args.password) else {
        return Err("no credentials: pass --token, or --username with --password".into());
    };

    let style = StyleOptions {
        text_colors: args.text_colors,
        highlight_colors: args.highlight_colors,
        code: args.code_color,
        notify: args.notify_color,
        ticket: args.ticket_color,
        room_width: args.room_width,
        sender_width: args.sender_width,
    }
    .build()?;

    let config = ClientConfig {
        host: args.host,
        security: if args.plain { Security::Plain } else { Security::Tls },
        login,
        style,
        ..ClientConfig::default()
    };

    tracing::info!(host = %config.host, "chatterm starting");

    let source = RestRoomSource::new(config.rest_base(), config.http_timeout)?;
    let sink = WriterSink::new(io::stdout());
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    run(config, source, MemoryTokenStore::new(), sink, interrupt).await?;

    Ok(())
}
