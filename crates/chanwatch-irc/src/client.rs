//! TCP line transport.
//!
//! `connect` dials the server, registers, and splits the socket into a read
//! task and a write task. Parsed frames come out of a bounded channel in
//! arrival order; outbound frames go in through [`IrcSender`].

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::command::Command;
use crate::message::Message;
use crate::Outbound;

/// Capacity of the inbound frame channel. The reader waits when the
/// dispatcher falls this far behind.
const INBOUND_CAPACITY: usize = 256;

/// Connection settings for the collector's IRC link.
#[derive(Debug, Clone)]
pub struct ConnectConfig {
    /// Server address (host:port).
    pub server_addr: String,
    pub nick: String,
    /// Username (ident).
    pub user: String,
    pub realname: String,
}

impl ConnectConfig {
    pub fn new(server_addr: impl Into<String>, nick: impl Into<String>) -> Self {
        let nick = nick.into();
        Self {
            server_addr: server_addr.into(),
            user: nick.clone(),
            realname: nick.clone(),
            nick,
        }
    }
}

/// Cloneable handle that queues frames for the write task.
#[derive(Clone)]
pub struct IrcSender {
    tx: mpsc::UnboundedSender<Message>,
}

impl IrcSender {
    pub fn new(tx: mpsc::UnboundedSender<Message>) -> Self {
        Self { tx }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl Outbound for IrcSender {
    fn send(&self, message: Message) {
        if self.tx.send(message).is_err() {
            warn!("IRC connection closed, dropping outbound frame");
        }
    }
}

/// Dial the server, send NICK/USER, and start the read and write tasks.
///
/// The returned receiver closes when the server hangs up.
pub async fn connect(config: &ConnectConfig) -> Result<(IrcSender, mpsc::Receiver<Message>)> {
    let stream = TcpStream::connect(&config.server_addr)
        .await
        .with_context(|| format!("TCP connect to {} failed", config.server_addr))?;
    stream.set_nodelay(true)?;
    info!("Connected to IRC server {}", config.server_addr);

    let (reader, mut writer) = stream.into_split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();
    let (in_tx, in_rx) = mpsc::channel(INBOUND_CAPACITY);

    let sender = IrcSender::new(out_tx);
    sender.send(Message::new(Command::Nick, vec![config.nick.clone()], ""));
    sender.send(Message::new(
        Command::User,
        vec![config.user.clone(), "0".into(), "*".into()],
        config.realname.clone(),
    ));

    let writer_task = tokio::spawn(async move {
        while let Some(message) = out_rx.recv().await {
            let line = format!("{}\r\n", message);
            trace!("-> {}", line.trim_end());
            if let Err(e) = writer.write_all(line.as_bytes()).await {
                warn!("IRC write failed: {}", e);
                break;
            }
        }
    });

    let server_addr = config.server_addr.clone();
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => {
                    info!("IRC server {} closed the connection", server_addr);
                    break;
                }
                Ok(_) => {
                    // Not every client sends UTF-8
                    let line = String::from_utf8_lossy(&buf);
                    trace!("<- {}", line.trim_end());
                    match Message::parse(&line) {
                        Some(message) => {
                            if in_tx.send(message).await.is_err() {
                                break;
                            }
                        }
                        None => debug!("Unparseable IRC line: {:?}", line),
                    }
                }
                Err(e) => {
                    warn!("IRC read failed: {}", e);
                    break;
                }
            }
        }

        // Close the outbound queue so IrcSender::is_closed reports the dead link
        writer_task.abort();
    });

    Ok((sender, in_rx))
}
