use std::sync::Arc;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use huddle_core::{ClientSignal, ServerSignal};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{error, info, warn};
use url::Url;

use crate::error::{MeshError, Result};
use crate::signaling::{SignalingLink, SignalingOutput};

/// Relay connection over a websocket carrying JSON signals.
#[derive(Clone)]
pub struct WsSignaling {
    tx: mpsc::UnboundedSender<ClientSignal>,
}

impl WsSignaling {
    /// Connect to the relay. `token` is passed as the `token` query parameter.
    pub async fn connect(url: &str, token: Option<&str>, buffer: usize) -> Result<SignalingLink> {
        let url = relay_url(url, token)?;

        let (socket, _) = connect_async(url.as_str())
            .await
            .map_err(|e| MeshError::Signaling(e.to_string()))?;
        info!("Signaling connected");

        let (mut sender, mut receiver) = socket.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ClientSignal>();
        let (in_tx, in_rx) = mpsc::channel(buffer);

        let mut send_task = tokio::spawn(async move {
            while let Some(signal) = out_rx.recv().await {
                let json = match serde_json::to_string(&signal) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to serialize signal message: {}", e);
                        continue;
                    }
                };
                if sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            let _ = sender.close().await;
        });

        let mut recv_task = tokio::spawn(async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ServerSignal>(&text) {
                        Ok(signal) => {
                            if in_tx.send(signal).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Invalid signal from relay: {:?}", e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        });

        tokio::spawn(async move {
            tokio::select! {
                _ = (&mut send_task) => recv_task.abort(),
                _ = (&mut recv_task) => send_task.abort(),
            };
            info!("Signaling disconnected");
        });

        Ok(SignalingLink::new(Arc::new(WsSignaling { tx: out_tx }), in_rx))
    }
}

fn relay_url(base: &str, token: Option<&str>) -> Result<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| MeshError::Signaling(format!("invalid relay url {base}: {e}")))?;
    if let Some(token) = token {
        url.query_pairs_mut().append_pair("token", token);
    }
    Ok(url)
}

#[async_trait]
impl SignalingOutput for WsSignaling {
    async fn send(&self, signal: ClientSignal) -> Result<()> {
        self.tx.send(signal).map_err(|_| MeshError::SignalingClosed)
    }
}
