use super::*;
use crate::debate::Rejection;
use crate::dto::ClientAction;
use crate::dto::ServerMessage;
use crate::matchroom::Command;
use crate::types::Seat;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use tokio::sync::mpsc::unbounded_channel;

/// Process-wide connection counter. A fresh id per bridge lets the room
/// tell a stale disconnect apart from the session that replaced it.
static CONNS: AtomicU64 = AtomicU64::new(1);

/// Pumps frames between one WebSocket session and the room's queue.
/// Inbound text parses into a ClientAction; outbound strings are room
/// broadcasts. Parse failures are answered on this session alone, and the
/// bridge always reports its own disconnect on the way out.
pub fn bridge(
    handle: Arc<RoomHandle>,
    seat: Seat,
    mut session: actix_ws::Session,
    mut stream: actix_ws::MessageStream,
) {
    use futures::StreamExt;
    let conn = CONNS.fetch_add(1, Ordering::Relaxed);
    let (link, mut rx) = unbounded_channel();
    if handle
        .commands
        .send(Command::Connect { seat, conn, link })
        .is_err()
    {
        log::warn!("room {} already closed, dropping session", handle.id);
        return;
    }
    log::info!("session {} attached to room {} seat {}", conn, handle.id, seat);
    let commands = handle.commands.clone();
    actix_web::rt::spawn(async move {
        'sesh: loop {
            tokio::select! {
                biased;
                msg = rx.recv() => match msg {
                    Some(json) => if session.text(json).await.is_err() { break 'sesh },
                    None => break 'sesh,
                },
                msg = stream.next() => match msg {
                    Some(Ok(actix_ws::Message::Text(text))) => match serde_json::from_str::<ClientAction>(&text) {
                        Ok(action) => if commands.send(Command::Action { seat, action }).is_err() { break 'sesh },
                        Err(e) => {
                            let reply = ServerMessage::Rejected {
                                reason: Rejection::InvalidAction,
                                detail: e.to_string(),
                            };
                            if session.text(reply.json()).await.is_err() { break 'sesh }
                        }
                    },
                    Some(Ok(actix_ws::Message::Close(_))) => break 'sesh,
                    Some(Err(_)) => break 'sesh,
                    None => break 'sesh,
                    _ => continue 'sesh,
                },
            }
        }
        let _ = commands.send(Command::Disconnect { seat, conn });
    });
}
