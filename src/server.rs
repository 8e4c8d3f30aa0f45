#![cfg(feature = "std")]

use log::{debug, info, warn};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::common::SessionId;
use crate::config::Rules;
use crate::protocol::{Message, PROTOCOL_VERSION};
use crate::room::RoomHandle;
use crate::transport::tcp::TcpTransport;
use crate::transport::Transport;

/// Bridge one connected client to `room`.
///
/// Performs the version handshake, joins the room, then forwards commands
/// in and event batches out until either side goes away. Losing the
/// transport counts as leaving the match.
pub async fn serve_session<T: Transport>(
    mut transport: T,
    room: RoomHandle,
    session: SessionId,
    rules: Rules,
) -> anyhow::Result<()> {
    greet(&mut transport, session, rules).await?;
    play_session(transport, room, session).await
}

/// Version handshake: expect `Hello`, answer with `Welcome`.
async fn greet<T: Transport>(transport: &mut T, session: SessionId, rules: Rules) -> anyhow::Result<()> {
    match transport.recv().await? {
        Message::Hello { version } if version == PROTOCOL_VERSION => {}
        Message::Hello { version } => {
            return Err(anyhow::anyhow!(
                "Protocol version mismatch: client {}, server {}",
                version,
                PROTOCOL_VERSION
            ));
        }
        other => return Err(anyhow::anyhow!("Expected Hello, got {:?}", other)),
    }
    transport
        .send(Message::Welcome {
            version: PROTOCOL_VERSION,
            session,
            rules,
        })
        .await
}

async fn play_session<T: Transport>(mut transport: T, room: RoomHandle, session: SessionId) -> anyhow::Result<()> {
    let (outbox, mut batches) = mpsc::unbounded_channel();
    room.connect(session, outbox)?;

    loop {
        tokio::select! {
            incoming = transport.recv() => match incoming {
                Ok(Message::Command(command)) => {
                    if room.submit(session, command).is_err() {
                        break;
                    }
                }
                Ok(other) => debug!("session {} sent unexpected {:?}", session, other),
                Err(e) => {
                    info!("session {} disconnected: {}", session, e);
                    let _ = room.disconnect(session);
                    return Ok(());
                }
            },
            batch = batches.recv() => match batch {
                Some(events) => {
                    if let Err(e) = transport.send(Message::Events(events)).await {
                        let _ = room.disconnect(session);
                        return Err(e);
                    }
                }
                None => break,
            },
        }
    }
    debug!("session {} finished", session);
    Ok(())
}

/// Accept TCP connections forever. Clients are seated two per room once
/// their handshake succeeds; session ids come from a counter starting at 1.
pub async fn run_server(listener: TcpListener, rules: Rules) -> anyhow::Result<()> {
    rules
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid rules: {}", e))?;
    info!("listening on {}", listener.local_addr()?);

    let (ready_tx, mut ready_rx) = mpsc::unbounded_channel::<(SessionId, TcpTransport)>();
    let mut next_session = 1u64;
    let mut open: Option<RoomHandle> = None;
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, addr) = accepted?;
                let session = SessionId(next_session);
                next_session += 1;
                info!("session {} connected from {}", session, addr);

                let ready = ready_tx.clone();
                let rules = rules.clone();
                tokio::spawn(async move {
                    let mut transport = TcpTransport::new(stream);
                    match greet(&mut transport, session, rules).await {
                        Ok(()) => {
                            let _ = ready.send((session, transport));
                        }
                        Err(e) => warn!("session {} failed the handshake: {}", session, e),
                    }
                });
            }
            Some((session, transport)) = ready_rx.recv() => {
                let room = match open.take() {
                    Some(room) if !room.is_closed() => room,
                    _ => {
                        let (room, task) = RoomHandle::spawn(rules.clone())?;
                        tokio::spawn(async move {
                            if let Ok(snapshot) = task.await {
                                info!("room finished: phase {:?}, winner {:?}", snapshot.phase, snapshot.winner);
                            }
                        });
                        open = Some(room.clone());
                        room
                    }
                };
                tokio::spawn(async move {
                    if let Err(e) = play_session(transport, room, session).await {
                        warn!("session {} ended with error: {}", session, e);
                    }
                });
            }
        }
    }
}
