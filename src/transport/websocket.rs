//! WebSocket transport
//!
//! Implements the subscription side of the relay. Responsibilities:
//! - Accept TCP/WebSocket connections
//! - Create a `Client` for each connection and register it with the `Broker`
//! - Send the welcome acknowledgement to the new subscriber only
//! - Translate protocol JSON into broker subscribe/unsubscribe operations,
//!   acknowledging each to that subscriber only
//! - Run cleanup exactly once when either direction of the connection ends
//!
//! Each connection gets an unbounded channel the broker pushes envelopes
//! through; a dedicated task drains it into the socket, which preserves
//! publish order per subscriber.

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn;
use tokio::sync::mpsc;
use tokio::sync::mpsc::UnboundedSender;
use tokio_tungstenite::accept_async;
use tracing::{info, warn};
use tungstenite::protocol::Message as WsMessage;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::broker::{Broker, drone_room};
use crate::client::Client;
use crate::transport::message::{CAPABILITIES, ClientMessage, ServerMessage};

pub async fn start_websocket_server(addr: &str, broker: Arc<Mutex<Broker>>) {
    let listener = TcpListener::bind(addr).await.expect("Can't bind");

    info!("WebSocket server listening on ws://{addr}");

    while let Ok((stream, _)) = listener.accept().await {
        let broker = broker.clone();
        tokio::spawn(handle_connection(stream, broker));
    }
}

async fn handle_connection(stream: TcpStream, broker: Arc<Mutex<Broker>>) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake error: {e}");
            return;
        }
    };
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();
    let client = Client::new(tx.clone());
    let client_id = client.id.clone();

    // Register before anything else so publishes can reach us immediately.
    {
        let mut broker = match broker.lock() {
            Ok(guard) => guard,
            Err(e) => {
                warn!("broker unavailable, dropping connection: {e}");
                return;
            }
        };
        broker.register_client(client);
    }
    info!(client = %client_id, "client connected");

    send_to(&tx, &ServerMessage::Connected {
        message: "Connected to Drone Location Service".to_string(),
        client_id: client_id.clone(),
        capabilities: CAPABILITIES.iter().map(|c| c.to_string()).collect(),
        timestamp: chrono::Utc::now().timestamp_millis(),
    });

    let cleanup_called = Arc::new(AtomicBool::new(false));
    let do_cleanup = {
        let broker = broker.clone();
        let client_id = client_id.clone();
        let cleanup_called = cleanup_called.clone();

        move || {
            if !cleanup_called.swap(true, Ordering::SeqCst) {
                if let Ok(mut broker) = broker.lock() {
                    broker.cleanup_client(&client_id);
                }
            }
        }
    };

    // Forward broker envelopes and protocol acks to the socket.
    {
        let client_id = client_id.clone();
        let do_cleanup = do_cleanup.clone();

        spawn(async move {
            while let Some(msg) = rx.recv().await {
                if let Err(e) = ws_sender.send(msg).await {
                    warn!(client = %client_id, "failed to send message: {e}");
                    break;
                }
            }

            do_cleanup();
            info!(client = %client_id, "send loop closed");
        });
    }

    while let Some(Ok(msg)) = ws_receiver.next().await {
        if !msg.is_text() {
            continue;
        }
        let text = match msg.to_text() {
            Ok(text) => text,
            Err(_) => continue,
        };

        match serde_json::from_str::<ClientMessage>(text) {
            Ok(ClientMessage::SubscribeToDrone { serial_number }) => {
                let room = drone_room(&serial_number);
                if let Ok(mut broker) = broker.lock() {
                    broker.subscribe(&room, client_id.clone());
                }
                info!(client = %client_id, room = %room, "subscribed");

                send_to(&tx, &ServerMessage::Subscribed {
                    message: format!("Subscribed to {}", describe_drone(&serial_number)),
                    room,
                });
            }
            Ok(ClientMessage::UnsubscribeFromDrone { serial_number }) => {
                let room = drone_room(&serial_number);
                if let Ok(mut broker) = broker.lock() {
                    broker.unsubscribe(&room, &client_id);
                }
                info!(client = %client_id, room = %room, "unsubscribed");

                send_to(&tx, &ServerMessage::Unsubscribed { room });
            }
            Ok(ClientMessage::SubscribeToTopic { topic }) => {
                if let Ok(mut broker) = broker.lock() {
                    broker.subscribe(&topic, client_id.clone());
                }
                info!(client = %client_id, room = %topic, "subscribed");

                send_to(&tx, &ServerMessage::Subscribed {
                    message: format!("Subscribed to {topic}"),
                    room: topic,
                });
            }
            Ok(ClientMessage::UnsubscribeFromTopic { topic }) => {
                if let Ok(mut broker) = broker.lock() {
                    broker.unsubscribe(&topic, &client_id);
                }
                info!(client = %client_id, room = %topic, "unsubscribed");

                send_to(&tx, &ServerMessage::Unsubscribed { room: topic });
            }
            Ok(ClientMessage::Ping { data }) => {
                send_to(&tx, &ServerMessage::Pong {
                    data,
                    server_time: chrono::Utc::now().timestamp_millis(),
                    client_id: client_id.clone(),
                });
            }
            Err(err) => {
                warn!(
                    client = %client_id,
                    "invalid client message: {err} | {}",
                    &text.chars().take(100).collect::<String>()
                );
                send_to(&tx, &ServerMessage::Error {
                    message: "invalid message".to_string(),
                });
            }
        }
    }

    info!(client = %client_id, "client disconnected");
    do_cleanup();
}

fn send_to(tx: &UnboundedSender<WsMessage>, msg: &ServerMessage) {
    match serde_json::to_string(msg) {
        Ok(json) => {
            let _ = tx.send(WsMessage::text(json));
        }
        Err(e) => warn!("failed to serialize server message: {e}"),
    }
}

fn describe_drone(serial: &str) -> String {
    if serial == "all" {
        "all drones".to_string()
    } else {
        format!("drone {serial}")
    }
}
