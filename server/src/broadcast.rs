use tracing::trace;
use tricktaker_protocol::{ServerToClient, TrickPlay};

use crate::session::{Outbox, Session};

/// Delivery is best-effort: a closed outbox means the socket is going away and
/// its close handler will deal with the seat.
pub fn send_to(tx: &Outbox, msg: ServerToClient) {
    let _ = tx.send(msg);
}

pub fn send_to_player(s: &Session, name: &str, msg: ServerToClient) {
    if let Some(p) = s.players.iter().find(|p| p.name == name) {
        send_to(&p.tx, msg);
    }
}

pub fn broadcast(s: &Session, msg: ServerToClient) {
    trace!(code = %s.code, ?msg, "broadcast");
    for p in s.players.iter() {
        send_to(&p.tx, msg.clone());
    }
}

pub fn broadcast_player_list(s: &Session) {
    broadcast(
        s,
        ServerToClient::PlayerListUpdated {
            players: s.public_players(),
        },
    );
}

pub fn send_joined(s: &Session, tx: &Outbox, your_name: &str) {
    send_to(
        tx,
        ServerToClient::Joined {
            code: s.code.clone(),
            your_name: your_name.to_string(),
            players: s.public_players(),
            ceiling: s.hand_size_ceiling,
        },
    );
}

/// Each player sees only their own cards.
pub fn broadcast_hand_started(s: &Session) {
    let leader = s.current_player().name.clone();
    for p in s.players.iter() {
        send_to(
            &p.tx,
            ServerToClient::HandStarted {
                hand_number: s.current_hand_number,
                hand_size: s.current_hand_size(),
                leader: leader.clone(),
                your_hand: p.hand.clone(),
            },
        );
    }
}

pub fn broadcast_hand_reset(s: &Session) {
    let leader = s.current_player().name.clone();
    let scoreboard = s.scoreboard_lines();
    for p in s.players.iter() {
        send_to(
            &p.tx,
            ServerToClient::HandReset {
                hand_number: s.current_hand_number,
                hand_size: s.current_hand_size(),
                leader: leader.clone(),
                your_hand: p.hand.clone(),
                scoreboard: scoreboard.clone(),
            },
        );
    }
}

pub fn broadcast_next_turn(s: &Session, player: &str) {
    broadcast(
        s,
        ServerToClient::NextTurn {
            player_name: player.to_string(),
            hand_number: s.current_hand_number,
        },
    );
}

pub fn broadcast_card_played(s: &Session) {
    broadcast(
        s,
        ServerToClient::CardPlayed {
            trick: s.trick.clone(),
        },
    );
}

pub fn send_hand_update(s: &Session, name: &str) {
    if let Some(p) = s.players.iter().find(|p| p.name == name) {
        send_to(
            &p.tx,
            ServerToClient::HandUpdated {
                hand: p.hand.clone(),
            },
        );
    }
}

pub fn broadcast_trick_finished(s: &Session, winner: &str, tricks_won: u32, trick: Vec<TrickPlay>) {
    broadcast(
        s,
        ServerToClient::TrickFinished {
            winner: winner.to_string(),
            tricks_won,
            trick,
        },
    );
}

pub fn broadcast_session_destroyed(s: &Session, reason: impl Into<String>) {
    broadcast(
        s,
        ServerToClient::SessionDestroyed {
            code: s.code.clone(),
            reason: reason.into(),
        },
    );
}
