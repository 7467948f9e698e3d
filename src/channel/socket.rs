//! WebSocket connection to the lobby channel.

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{Instrument, debug, error, info, info_span, instrument, warn};

use super::{ChannelError, LobbyEvent, Register};

/// What the channel reader hands to its consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSignal {
    /// A well-formed lobby event.
    Event(LobbyEvent),
    /// The channel ended; no further signals follow.
    Closed {
        /// Close frame reason or transport error text.
        reason: String,
    },
}

/// Sends the register message over the lobby channel.
pub trait Registrar: Send + Sync {
    /// Registers interest in `id`.
    fn register(&self, id: &str) -> Result<(), ChannelError>;
}

/// Outbound half of a connected lobby channel.
#[derive(Debug, Clone)]
pub struct LobbySender {
    outbound: mpsc::UnboundedSender<Register>,
}

impl Registrar for LobbySender {
    #[instrument(skip(self))]
    fn register(&self, id: &str) -> Result<(), ChannelError> {
        info!("Registering over lobby channel");
        self.outbound
            .send(Register::new(id.to_string()))
            .map_err(|_| ChannelError::Closed)
    }
}

/// Connects to the lobby channel at `url`.
///
/// Spawns one reader task that decodes inbound frames and one writer task
/// that encodes register messages. Malformed frames are logged and dropped.
#[instrument]
pub async fn connect(
    url: &str,
) -> Result<(LobbySender, mpsc::UnboundedReceiver<ChannelSignal>), ChannelError> {
    info!("Connecting to lobby channel");
    let (stream, response) = connect_async(url)
        .await
        .map_err(|e| ChannelError::connect(e.to_string()))?;
    debug!(status = %response.status(), "Lobby channel handshake complete");

    let (mut sink, mut source) = stream.split();
    let (signal_tx, signal_rx) = mpsc::unbounded_channel();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Register>();

    tokio::spawn(
        async move {
            while let Some(register) = outbound_rx.recv().await {
                let frame = register.to_frame();
                debug!(frame = %frame, "Sending lobby frame");
                if let Err(e) = sink.send(Message::Text(frame)).await {
                    error!(error = %e, "Failed to send lobby frame");
                    break;
                }
            }
            let _ = sink.close().await;
            debug!("Lobby writer finished");
        }
        .instrument(info_span!("lobby_writer")),
    );

    tokio::spawn(
        async move {
            let reason = loop {
                match source.next().await {
                    Some(Ok(Message::Text(text))) => match LobbyEvent::parse(&text) {
                        Ok(event) => {
                            debug!(?event, "Lobby event received");
                            if signal_tx.send(ChannelSignal::Event(event)).is_err() {
                                break "consumer dropped".to_string();
                            }
                        }
                        Err(e) => warn!(error = %e, frame = %text, "Ignoring lobby frame"),
                    },
                    Some(Ok(Message::Close(frame))) => {
                        break frame
                            .map(|f| f.reason.to_string())
                            .filter(|r| !r.is_empty())
                            .unwrap_or_else(|| "closed by server".to_string());
                    }
                    Some(Ok(other)) => debug!(?other, "Ignoring non-text lobby frame"),
                    Some(Err(e)) => break e.to_string(),
                    None => break "stream ended".to_string(),
                }
            };
            warn!(reason = %reason, "Lobby channel closed");
            let _ = signal_tx.send(ChannelSignal::Closed { reason });
        }
        .instrument(info_span!("lobby_reader")),
    );

    info!("Lobby channel connected");
    Ok((
        LobbySender {
            outbound: outbound_tx,
        },
        signal_rx,
    ))
}
