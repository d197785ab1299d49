use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tricktaker_protocol::{
    Card, Phase, PublicPlayer, ScoreLine, ServerToClient, SessionInfo, TrickPlay,
};
use uuid::Uuid;

use crate::error::{GameError, GameResult};
use crate::hand_size::{self, DEFAULT_CEILING};

pub type Outbox = mpsc::UnboundedSender<ServerToClient>;

#[derive(Debug)]
pub struct Player {
    pub name: String,
    /// Connection the player joined from.
    pub conn: Uuid,
    pub tx: Outbox,
    pub hand: Vec<Card>,
    pub declared_rounds: Option<u32>,
    pub actual_rounds_won: u32,
    pub score: u32,
    pub ready_for_next_round: bool,
}

impl Player {
    pub fn new(name: String, conn: Uuid, tx: Outbox) -> Self {
        Player {
            name,
            conn,
            tx,
            hand: vec![],
            declared_rounds: None,
            actual_rounds_won: 0,
            score: 0,
            ready_for_next_round: false,
        }
    }

    pub fn public(&self, admin: &str) -> PublicPlayer {
        PublicPlayer {
            name: self.name.clone(),
            is_admin: self.name == admin,
            cards_in_hand: self.hand.len(),
            declared: self.declared_rounds,
            tricks_won: self.actual_rounds_won,
            score: self.score,
            ready: self.ready_for_next_round,
        }
    }
}

#[derive(Debug)]
pub struct Session {
    pub code: String,
    pub admin: String,
    /// Join order; also the turn order.
    pub players: Vec<Player>,
    pub started: bool,
    pub phase: Phase,
    pub hand_size_ceiling: u32,
    pub current_hand_number: u32,
    pub starting_player_index: usize,
    pub current_turn_index: usize,
    pub decks_required: usize,
    pub deck: Vec<Card>,
    pub trick: Vec<TrickPlay>,
    pub trick_winner: Option<String>,
    pub scoreboard: BTreeMap<String, u32>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(code: String, admin: Player) -> Self {
        Session {
            code,
            admin: admin.name.clone(),
            players: vec![admin],
            started: false,
            phase: Phase::Lobby,
            hand_size_ceiling: DEFAULT_CEILING,
            current_hand_number: 0,
            starting_player_index: 0,
            current_turn_index: 0,
            decks_required: 1,
            deck: vec![],
            trick: vec![],
            trick_winner: None,
            scoreboard: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Appends a player at the end of the turn order.
    pub fn add_player(&mut self, player: Player) -> GameResult<&Player> {
        if player.name.trim().is_empty() {
            return Err(GameError::BlankName);
        }
        if self.started {
            return Err(GameError::GameAlreadyStarted);
        }
        if self.players.iter().any(|p| p.name == player.name) {
            return Err(GameError::DuplicateName);
        }
        self.players.push(player);
        Ok(&self.players[self.players.len() - 1])
    }

    pub fn player_index(&self, name: &str) -> GameResult<usize> {
        self.players
            .iter()
            .position(|p| p.name == name)
            .ok_or(GameError::PlayerNotFound)
    }

    pub fn player(&self, name: &str) -> GameResult<&Player> {
        self.player_index(name).map(|i| &self.players[i])
    }

    /// Fails `PlayerNotFound` unless `name` holds a seat here through connection `conn`.
    pub fn require_seat(&self, name: &str, conn: Uuid) -> GameResult<usize> {
        let idx = self.player_index(name)?;
        if self.players[idx].conn != conn {
            return Err(GameError::PlayerNotFound);
        }
        Ok(idx)
    }

    pub fn require_admin(&self, name: &str) -> GameResult<()> {
        self.player(name)?;
        if self.admin != name {
            return Err(GameError::NotAdmin);
        }
        Ok(())
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current_turn_index]
    }

    /// Fails `NotYourTurn` unless `name` is the player expected to act.
    pub fn require_turn(&self, name: &str) -> GameResult<usize> {
        let idx = self.player_index(name)?;
        if idx != self.current_turn_index {
            return Err(GameError::NotYourTurn);
        }
        Ok(idx)
    }

    /// Cards dealt to each player in the hand in progress.
    pub fn current_hand_size(&self) -> u32 {
        hand_size::hand_size(self.hand_size_ceiling, self.current_hand_number).unwrap_or(0)
    }

    pub fn public_players(&self) -> Vec<PublicPlayer> {
        self.players.iter().map(|p| p.public(&self.admin)).collect()
    }

    /// Cumulative scores in turn order.
    pub fn scoreboard_lines(&self) -> Vec<ScoreLine> {
        self.players
            .iter()
            .map(|p| ScoreLine {
                player_name: p.name.clone(),
                score: self.scoreboard.get(&p.name).copied().unwrap_or(p.score),
            })
            .collect()
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            code: self.code.clone(),
            admin: self.admin.clone(),
            player_count: self.players.len(),
            ceiling: self.hand_size_ceiling,
        }
    }
}
