//! Static dispatch from inbound commands to session operations.
//!
//! Every handler validates before it mutates, and any refusal goes back to the
//! sending connection only. A command may only name a player seated through
//! the connection that sent it.

use chrono::Utc;
use tracing::{debug, info};
use tricktaker_protocol::{Card, ClientToServer, ServerToClient};
use uuid::Uuid;

use crate::broadcast::{self, send_to};
use crate::declaration::{self, DeclareOutcome};
use crate::error::{GameError, GameResult};
use crate::lifecycle::{self, ContinueOutcome, DisconnectOutcome};
use crate::session::{Outbox, Player};
use crate::tricks::{self, PlayOutcome};
use crate::AppState;

/// A seat this connection holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    pub code: String,
    pub name: String,
}

/// Per-socket context handed to every handler.
#[derive(Debug)]
pub struct Connection {
    pub id: Uuid,
    pub tx: Outbox,
    pub seats: Vec<Seat>,
}

impl Connection {
    pub fn new(id: Uuid, tx: Outbox) -> Self {
        Connection {
            id,
            tx,
            seats: vec![],
        }
    }
}

pub fn route_cmd(cmd: ClientToServer, state: &AppState, conn: &mut Connection) {
    debug!(conn = %conn.id, ?cmd, "command");

    let result = match cmd {
        ClientToServer::CreateSession { player_name } => create_session(state, conn, player_name),
        ClientToServer::JoinSession { code, player_name } => {
            join_session(state, conn, &code, player_name)
        }
        ClientToServer::SetHandSizeCeiling {
            code,
            player_name,
            ceiling,
        } => set_ceiling(state, conn.id, &code, &player_name, ceiling),
        ClientToServer::StartSession { code, player_name } => {
            start_session(state, conn.id, &code, &player_name)
        }
        ClientToServer::Declare {
            code,
            player_name,
            amount,
        } => declare(state, conn.id, &code, &player_name, amount),
        ClientToServer::PlayCard {
            code,
            player_name,
            card,
        } => play_card(state, conn.id, &code, &player_name, card),
        ClientToServer::Continue { code, player_name } => {
            continue_play(state, conn.id, &code, &player_name)
        }
        ClientToServer::DestroySession { code, player_name } => {
            destroy_session(state, conn.id, &code, &player_name)
        }
        ClientToServer::ListSessions => {
            send_to(
                &conn.tx,
                ServerToClient::SessionList {
                    sessions: state.store.list_open(),
                },
            );
            Ok(())
        }
    };

    if let Err(err) = result {
        debug!(conn = %conn.id, error = %err, "command rejected");
        send_to(&conn.tx, err.to_message());
    }
}

fn create_session(state: &AppState, conn: &mut Connection, player_name: String) -> GameResult<()> {
    let player_name = player_name.trim().to_string();
    let admin = Player::new(player_name.clone(), conn.id, conn.tx.clone());
    let code = state.store.create(admin)?;
    info!(code = %code, admin = %player_name, "session created");

    send_to(&conn.tx, ServerToClient::SessionCreated { code: code.clone() });
    state.store.with_session(&code, |s| {
        broadcast::broadcast_player_list(s);
        Ok(())
    })?;
    conn.seats.push(Seat {
        code,
        name: player_name,
    });
    Ok(())
}

fn join_session(
    state: &AppState,
    conn: &mut Connection,
    code: &str,
    player_name: String,
) -> GameResult<()> {
    let player_name = player_name.trim().to_string();
    let code = code.trim();
    if player_name.is_empty() || code.is_empty() {
        return Err(GameError::BlankName);
    }

    state.store.with_session(code, |s| {
        s.add_player(Player::new(player_name.clone(), conn.id, conn.tx.clone()))?;
        info!(code = %code, player = %player_name, players = s.players.len(), "player joined");
        broadcast::send_joined(s, &conn.tx, &player_name);
        broadcast::broadcast_player_list(s);
        Ok(())
    })?;
    conn.seats.push(Seat {
        code: code.to_string(),
        name: player_name,
    });
    Ok(())
}

fn set_ceiling(
    state: &AppState,
    conn: Uuid,
    code: &str,
    player_name: &str,
    ceiling: i64,
) -> GameResult<()> {
    state.store.with_session(code, |s| {
        s.require_seat(player_name, conn)?;
        let ceiling = lifecycle::set_ceiling(s, player_name, ceiling)?;
        broadcast::broadcast(s, ServerToClient::CeilingUpdated { ceiling });
        Ok(())
    })
}

fn start_session(state: &AppState, conn: Uuid, code: &str, player_name: &str) -> GameResult<()> {
    state.store.with_session(code, |s| {
        s.require_seat(player_name, conn)?;
        lifecycle::start_session(s, player_name, &mut rand::thread_rng())?;
        broadcast::broadcast_hand_started(s);
        broadcast::broadcast_player_list(s);
        Ok(())
    })
}

fn declare(
    state: &AppState,
    conn: Uuid,
    code: &str,
    player_name: &str,
    amount: i64,
) -> GameResult<()> {
    state.store.with_session(code, |s| {
        s.require_seat(player_name, conn)?;
        let outcome = declaration::declare(s, player_name, amount)?;
        let recorded = s.player(player_name)?.declared_rounds.unwrap_or_default();
        broadcast::broadcast(
            s,
            ServerToClient::DeclarationRecorded {
                player_name: player_name.to_string(),
                amount: recorded,
            },
        );
        match outcome {
            DeclareOutcome::Next { player } => {
                broadcast::broadcast(s, ServerToClient::NextToDeclare { player_name: player });
            }
            DeclareOutcome::Complete { leader } => {
                info!(code = %s.code, leader = %leader, "declarations complete");
                broadcast::broadcast(s, ServerToClient::DeclarationsComplete { leader });
            }
        }
        broadcast::broadcast_player_list(s);
        Ok(())
    })
}

fn play_card(
    state: &AppState,
    conn: Uuid,
    code: &str,
    player_name: &str,
    card: Card,
) -> GameResult<()> {
    state.store.with_session(code, |s| {
        s.require_seat(player_name, conn)?;
        let outcome = tricks::play_card(s, player_name, card)?;
        broadcast::broadcast_card_played(s);
        broadcast::send_hand_update(s, player_name);
        match outcome {
            PlayOutcome::NextTurn { player } => broadcast::broadcast_next_turn(s, &player),
            PlayOutcome::TrickComplete {
                winner,
                tricks_won,
                trick,
            } => {
                info!(code = %s.code, winner = %winner, tricks_won, "trick finished");
                broadcast::broadcast_trick_finished(s, &winner, tricks_won, trick);
                broadcast::broadcast_player_list(s);
            }
        }
        Ok(())
    })
}

fn continue_play(state: &AppState, conn: Uuid, code: &str, player_name: &str) -> GameResult<()> {
    state.store.with_session(code, |s| {
        s.require_seat(player_name, conn)?;
        match lifecycle::continue_play(s, player_name, &mut rand::thread_rng())? {
            ContinueOutcome::Waiting { ready, total } => {
                broadcast::send_to_player(s, player_name, ServerToClient::WaitingForOthers { ready, total });
            }
            ContinueOutcome::NextTrick { leader } => {
                broadcast::broadcast_next_turn(s, &leader);
            }
            ContinueOutcome::NextHand { .. } => {
                broadcast::broadcast_hand_reset(s);
                broadcast::broadcast_player_list(s);
            }
            ContinueOutcome::GameOver { winner, scoreboard } => {
                broadcast::broadcast(s, ServerToClient::GameOver { winner, scoreboard });
            }
        }
        Ok(())
    })
}

fn destroy_session(state: &AppState, conn: Uuid, code: &str, player_name: &str) -> GameResult<()> {
    let age = state.store.with_session(code, |s| {
        s.require_seat(player_name, conn)?;
        s.require_admin(player_name)?;
        broadcast::broadcast_session_destroyed(s, format!("{player_name} closed the session"));
        Ok(Utc::now() - s.created_at)
    })?;
    state.store.destroy(code);
    info!(code = %code, age_secs = age.num_seconds(), "session destroyed");
    Ok(())
}

/// Releases every seat a closed connection held.
pub fn disconnect(state: &AppState, conn: &Connection) {
    for seat in &conn.seats {
        let Ok(session) = state.store.get(&seat.code) else {
            continue;
        };
        let outcome = {
            let mut s = session.lock();
            let outcome = lifecycle::disconnect(&mut s, conn.id);
            match &outcome {
                DisconnectOutcome::LeftLobby {
                    session_empty: false,
                    ..
                } => broadcast::broadcast_player_list(&s),
                DisconnectOutcome::Aborted { name } => {
                    broadcast::broadcast_session_destroyed(&s, format!("{name} disconnected"))
                }
                _ => {}
            }
            outcome
        };
        match outcome {
            DisconnectOutcome::LeftLobby {
                session_empty: true,
                ..
            }
            | DisconnectOutcome::Aborted { .. } => {
                state.store.destroy(&seat.code);
                info!(code = %seat.code, player = %seat.name, "session closed after disconnect");
            }
            DisconnectOutcome::LeftLobby { name, .. } => {
                info!(code = %seat.code, player = %name, "player left lobby");
            }
            DisconnectOutcome::NotSeated => {}
        }
    }
}
