use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use pacer_core::emitter::EmitterHandle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::message::{WsControl, WsEvent};

pub(crate) struct WsConnection {
    _handle: JoinHandle<()>,
}

impl WsConnection {
    pub fn new(emitter: EmitterHandle, web_socket: WebSocket) -> Self {
        //websocket message sender and receiver
        let (mut ws_tx, mut ws_rx) = web_socket.split();

        //live reading receiver for this observer
        let mut readings_rx = emitter.subscribe();

        let connection_id = Uuid::new_v4();
        info!("observer {} connected", connection_id);

        let send_task = tokio::spawn(async move {
            loop {
                match readings_rx.recv().await {
                    Ok(reading) => {
                        let event = WsEvent::pacemaker_data(reading);
                        match serde_json::to_string(&event) {
                            Ok(json) => {
                                if ws_tx.send(Message::Text(json)).await.is_err() {
                                    break;
                                }
                            }
                            Err(err) => {
                                warn!("could not serialize reading: {}", err);
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(
                            "observer {} lagged, skipped {} readings",
                            connection_id, skipped
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            debug!("websocket send task is done!");
        });

        let handle = tokio::spawn(async move {
            while let Some(Ok(message)) = ws_rx.next().await {
                match message {
                    Message::Text(text) => match serde_json::from_str::<WsControl>(&text) {
                        Ok(WsControl::Start) => {
                            if emitter.start().await.is_err() {
                                warn!("emitter is gone, closing websocket");
                                break;
                            }
                        }
                        Ok(WsControl::Stop) => {
                            if emitter.stop().await.is_err() {
                                warn!("emitter is gone, closing websocket");
                                break;
                            }
                        }
                        Err(err) => {
                            warn!("could not parse control signal {:?}: {}", text, err);
                        }
                    },
                    Message::Close(frame_opt) => {
                        debug!(
                            "closing websocket because we received close frame: {:?}",
                            frame_opt
                        );
                    }
                    message => {
                        warn!("unexpected message type! {:?}", message)
                    }
                }
            }
            //emission is one shared simulation: any observer going away halts
            //it for every observer
            info!("observer {} disconnected, stopping emission", connection_id);
            let _ = emitter.stop().await;
            send_task.abort();
            debug!("websocket is closing");
        });

        WsConnection { _handle: handle }
    }
}
