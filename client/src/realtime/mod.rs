//! Live change subscription over the service's realtime WebSocket.
//!
//! [`subscribe`] opens the socket, joins the per-user channel, and pumps
//! decoded [`store::ChangeEvent`]s into a [`ChangeFeed`]. The connection
//! follows the feed's lifetime: once the receiving side is dropped the
//! pump notices the closed channel, sends a leave frame, and shuts the
//! socket down. Heartbeats go out every 30 seconds to keep the server
//! from reaping the connection.

pub mod protocol;

use store::{ChangeFeed, ChangeSender};

use crate::config::Config;
use crate::error::ClientError;
use crate::session::Session;

pub use protocol::Frame;

/// Heartbeat period expected by the service.
const HEARTBEAT_SECS: u64 = 30;

/// Open a change subscription for the session's user.
pub async fn subscribe(config: &Config, session: &Session) -> Result<ChangeFeed, ClientError> {
    let (sender, feed) = ChangeFeed::channel();
    connect(config, session, sender).await?;
    Ok(feed)
}

/// Channel join frame, carrying the session's token so row-level
/// authorization applies to the subscription as well.
fn join_frame(session: &Session) -> Frame {
    let user_id = session.user_id();
    let mut frame = Frame::join(&protocol::tasks_topic(user_id), user_id, 1);
    frame.payload["access_token"] = session.access_token.clone().into();
    frame
}

#[cfg(not(target_arch = "wasm32"))]
async fn connect(
    config: &Config,
    session: &Session,
    sender: ChangeSender,
) -> Result<(), ClientError> {
    use futures::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::Message;

    let (socket, _) = tokio_tungstenite::connect_async(config.realtime_url())
        .await
        .map_err(|e| ClientError::Transport(e.to_string()))?;
    let (mut write, mut read) = socket.split();

    let topic = protocol::tasks_topic(session.user_id());
    write
        .send(Message::Text(join_frame(session).encode()))
        .await
        .map_err(|e| ClientError::Transport(e.to_string()))?;

    tokio::spawn(async move {
        let mut heartbeat =
            tokio::time::interval(std::time::Duration::from_secs(HEARTBEAT_SECS));
        heartbeat.tick().await; // the first tick fires immediately
        let mut reference: u64 = 1;
        loop {
            tokio::select! {
                message = read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            let Some(event) =
                                Frame::decode(&text).and_then(|f| f.change_event())
                            else {
                                continue;
                            };
                            if !sender.send(event) {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            tracing::debug!("realtime socket closed by server");
                            return;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::warn!("realtime socket error: {e}");
                            return;
                        }
                    }
                }
                _ = heartbeat.tick() => {
                    if sender.is_closed() {
                        break;
                    }
                    reference += 1;
                    let frame = Frame::heartbeat(reference);
                    if write.send(Message::Text(frame.encode())).await.is_err() {
                        return;
                    }
                }
            }
        }
        // Subscriber gone; leave the channel and drop the socket.
        reference += 1;
        let leave = Frame::leave(&topic, reference);
        let _ = write.send(Message::Text(leave.encode())).await;
        let _ = write.close().await;
    });
    Ok(())
}

#[cfg(target_arch = "wasm32")]
async fn connect(
    config: &Config,
    session: &Session,
    sender: ChangeSender,
) -> Result<(), ClientError> {
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    let socket = web_sys::WebSocket::new(&config.realtime_url())
        .map_err(|_| ClientError::Transport("failed to open realtime socket".into()))?;

    // Join once the socket is open; messages sent earlier are dropped by
    // the browser.
    let join = join_frame(session).encode();
    let open_socket = socket.clone();
    let onopen = Closure::<dyn FnMut()>::new(move || {
        if open_socket.send_with_str(&join).is_err() {
            tracing::warn!("failed to join realtime channel");
        }
    });
    socket.set_onopen(Some(onopen.as_ref().unchecked_ref()));
    onopen.forget();

    let message_sender = sender.clone();
    let message_socket = socket.clone();
    let onmessage = Closure::<dyn FnMut(web_sys::MessageEvent)>::new(
        move |message: web_sys::MessageEvent| {
            let Some(text) = message.data().as_string() else {
                return;
            };
            let Some(event) = Frame::decode(&text).and_then(|f| f.change_event()) else {
                return;
            };
            if !message_sender.send(event) {
                let _ = message_socket.close();
            }
        },
    );
    socket.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget();

    // Heartbeat loop; doubles as the liveness check that closes the
    // socket once the feed is dropped.
    let topic = protocol::tasks_topic(session.user_id());
    wasm_bindgen_futures::spawn_local(async move {
        let mut reference: u64 = 1;
        loop {
            gloo_timers::future::sleep(std::time::Duration::from_secs(HEARTBEAT_SECS)).await;
            if socket.ready_state() == web_sys::WebSocket::CLOSED {
                return;
            }
            if sender.is_closed() {
                reference += 1;
                let _ = socket.send_with_str(&Frame::leave(&topic, reference).encode());
                let _ = socket.close();
                return;
            }
            reference += 1;
            let _ = socket.send_with_str(&Frame::heartbeat(reference).encode());
        }
    });
    Ok(())
}
