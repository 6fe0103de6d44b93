//! slirc-presence - connect to an IRC server and log presence changes.
//!
//! Usage: `slirc-presence [config.toml]`

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use futures_util::{SinkExt, StreamExt};
use slirc_presence::config::{Config, validate};
use slirc_presence::connection::{Connection, ConnectionState, IrcEvent, Transport};
use slirc_presence::presence::{LogSink, NickSet, PresenceManager};
use slirc_presence::telemetry::spans;
use slirc_presence::{ChannelLister, ServerCapabilities, TransportError};
use slirc_wire::{Isupport, LineCodec, Message, Numeric, command};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{Instrument, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// ERR_NICKNAMEINUSE; only relevant during registration.
const ERR_NICKNAMEINUSE: u16 = 433;

type Reader = FramedRead<OwnedReadHalf, LineCodec>;
type Writer = FramedWrite<OwnedWriteHalf, LineCodec>;

/// Transport feeding the socket writer task.
struct ChannelTransport {
    tx: mpsc::UnboundedSender<String>,
}

impl Transport for ChannelTransport {
    fn send_raw(&self, line: String) -> Result<(), TransportError> {
        self.tx.send(line).map_err(|_| TransportError::Closed)
    }
}

/// What registration told us about the server.
struct Registration {
    nick: String,
    server: Option<String>,
    isupport: Isupport,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        bail!("{} configuration error(s) in {}", errors.len(), config_path);
    }

    info!(
        server = %config.server.address,
        nick = %config.server.nick,
        watched = config.presence.watch.len(),
        "Starting slirc-presence"
    );

    let span = spans::connection(&config.server.address, &config.server.nick);
    run(config).instrument(span).await
}

async fn run(config: Config) -> anyhow::Result<()> {
    let stream = TcpStream::connect(&config.server.address)
        .await
        .with_context(|| format!("failed to connect to {}", config.server.address))?;
    let (read_half, write_half) = stream.into_split();
    let mut reader = FramedRead::new(read_half, LineCodec::new());
    let mut writer = FramedWrite::new(write_half, LineCodec::new());

    // Phase 1: registration, sequential on the raw framed halves
    if let Some(password) = &config.server.password {
        writer.send(command::pass(password)).await?;
    }
    writer.send(command::nick(&config.server.nick)).await?;
    writer
        .send(command::user(config.server.username(), &config.server.realname))
        .await?;

    let registration = register(&mut reader, &mut writer, &config.server.nick).await?;
    let capabilities = ServerCapabilities::from_isupport(&registration.isupport);
    info!(
        nick = %registration.nick,
        server = registration.server.as_deref().unwrap_or("?"),
        "Registered"
    );

    // Phase 2: presence engine over an outgoing queue
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let writer_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if let Err(e) = writer.send(line).await {
                warn!(error = %e, "Write error");
                break;
            }
        }
    });

    let state = ConnectionState::new(registration.nick, capabilities);
    if let Some(server) = &registration.server {
        state.set_server_identity_once(server);
    }
    let transport = Arc::new(ChannelTransport { tx: tx.clone() });
    let conn = Arc::new(Connection::new(transport, state));

    let watch_list = Arc::new(NickSet::new());
    let presence = PresenceManager::new(
        Arc::clone(&conn),
        Arc::new(LogSink),
        &config.presence,
        watch_list,
    );
    info!(strategy = ?presence.strategy(), fallback = presence.has_fallback_poller(), "Presence tracking");

    for nick in &config.presence.watch {
        if let Err(e) = presence.add_nick_watch(nick) {
            warn!(nick = %nick, error = %e, code = e.error_code(), "Cannot watch nick");
        }
    }

    let lister = Arc::new(ChannelLister::new(Arc::clone(&conn), &config.channel_list));
    {
        let lister = Arc::clone(&lister);
        tokio::spawn(async move {
            match lister.list().await {
                Ok(channels) => info!(count = channels.len(), "Channel list received"),
                Err(e) => warn!(error = %e, "Channel list failed"),
            }
        });
    }

    // Phase 3: read loop
    loop {
        tokio::select! {
            result = reader.next() => {
                match result {
                    Some(Ok(line)) => {
                        let msg = match line.parse::<Message>() {
                            Ok(msg) => msg,
                            Err(e) => {
                                debug!(error = %e, "Unparsable line");
                                continue;
                            }
                        };
                        if msg.command == "PING" {
                            let _ = tx.send(command::pong(msg.arg(0).unwrap_or_default()));
                            continue;
                        }
                        if let Some(event) = IrcEvent::from_message(&msg) {
                            conn.dispatch(&event);
                        }
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "Read error");
                        conn.dispatch(&IrcEvent::ClientError { reason: e.to_string() });
                        break;
                    }
                    None => {
                        info!("Server closed the connection");
                        conn.dispatch(&IrcEvent::ClientError { reason: "connection closed".into() });
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, quitting");
                let _ = conn.send(command::quit("slirc-presence"));
                let nick = conn.state().nick();
                conn.dispatch(&IrcEvent::Quit { source: nick, reason: None });
                break;
            }
        }
    }

    // Let the writer flush QUIT; in-flight queries may still hold the queue.
    drop(presence);
    drop(tx);
    if tokio::time::timeout(Duration::from_secs(2), writer_task).await.is_err() {
        debug!("Writer did not drain in time");
    }
    Ok(())
}

/// Read until end of MOTD, answering PINGs and collecting ISUPPORT.
async fn register(
    reader: &mut Reader,
    writer: &mut Writer,
    requested_nick: &str,
) -> anyhow::Result<Registration> {
    let mut registration = Registration {
        nick: requested_nick.to_string(),
        server: None,
        isupport: Isupport::new(),
    };

    while let Some(line) = reader.next().await {
        let line = line?;
        let msg = match line.parse::<Message>() {
            Ok(msg) => msg,
            Err(e) => {
                debug!(error = %e, "Unparsable line during registration");
                continue;
            }
        };

        if msg.command == "PING" {
            writer.send(command::pong(msg.arg(0).unwrap_or_default())).await?;
            continue;
        }
        if msg.command == "ERROR" {
            bail!("server refused registration: {}", msg.arg(0).unwrap_or_default());
        }

        match msg.code() {
            Some(ERR_NICKNAMEINUSE) => bail!("nick already in use"),
            Some(code) => match Numeric::from_code(code) {
                Some(Numeric::RPL_WELCOME) => {
                    registration.nick = msg.arg(0).unwrap_or_default().to_string();
                    registration.server = msg.prefix.as_ref().map(ToString::to_string);
                }
                Some(Numeric::RPL_ISUPPORT) => registration.isupport.extend_from_args(&msg.params),
                Some(Numeric::RPL_ENDOFMOTD | Numeric::ERR_NOMOTD) => return Ok(registration),
                _ => {}
            },
            None => {}
        }
    }

    bail!("connection closed during registration")
}
