//! Session lifecycle: configuration, start, the continue barrier between
//! tricks and hands, and what happens when a player drops.

use rand::Rng;
use tracing::{info, warn};
use tricktaker_protocol::{Phase, ScoreLine};
use uuid::Uuid;

use crate::deck;
use crate::error::{GameError, GameResult};
use crate::hand_size;
use crate::scoring;
use crate::session::Session;
use crate::tricks::hand_exhausted;
use crate::turns::{all_ready, mark_ready, next_index, ready_count, reset_ready};

pub const MIN_PLAYERS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContinueOutcome {
    /// Barrier still open.
    Waiting { ready: usize, total: usize },
    /// Trick cleared; the previous trick's winner leads.
    NextTrick { leader: String },
    /// Hand scored and a new one dealt.
    NextHand { hand_number: u32, leader: String },
    GameOver {
        winner: String,
        scoreboard: Vec<ScoreLine>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// The connection held no seat here.
    NotSeated,
    /// Removed from the lobby. `session_empty` means nobody is left.
    LeftLobby { name: String, session_empty: bool },
    /// The game cannot go on without the player.
    Aborted { name: String },
}

/// Admin-only, before start.
pub fn set_ceiling(s: &mut Session, name: &str, ceiling: i64) -> GameResult<u32> {
    s.require_admin(name)?;
    if s.started {
        return Err(GameError::GameAlreadyStarted);
    }
    let ceiling = hand_size::validate_ceiling(ceiling)?;
    s.hand_size_ceiling = ceiling;
    info!(code = %s.code, ceiling, "ceiling updated");
    Ok(ceiling)
}

/// Locks the roster, picks who leads the first hand and deals it. Returns the
/// name of the first player to declare.
pub fn start_session<R: Rng + ?Sized>(
    s: &mut Session,
    name: &str,
    rng: &mut R,
) -> GameResult<String> {
    s.require_admin(name)?;
    if s.started || s.phase != Phase::Lobby {
        return Err(GameError::GameAlreadyStarted);
    }
    if s.players.len() < MIN_PLAYERS {
        return Err(GameError::NotEnoughPlayers);
    }

    let n = s.players.len();
    s.decks_required = deck::decks_required(n, hand_size::peak(s.hand_size_ceiling) as usize);
    s.starting_player_index = rng.gen_range(0..n);
    s.current_hand_number = 1;
    deal_hand(s, rng)?;
    s.started = true;

    let leader = s.current_player().name.clone();
    info!(
        code = %s.code,
        players = n,
        ceiling = s.hand_size_ceiling,
        decks = s.decks_required,
        leader = %leader,
        "session started"
    );
    Ok(leader)
}

/// Shuffles a fresh pool, deals the current hand and opens declarations.
pub fn deal_hand<R: Rng + ?Sized>(s: &mut Session, rng: &mut R) -> GameResult<()> {
    let size = s.current_hand_size() as usize;
    let mut pool = deck::build_deck(s.decks_required);
    deck::shuffle(&mut pool, rng);
    let hands = deck::deal(&mut pool, s.players.len(), size)?;

    for (p, hand) in s.players.iter_mut().zip(hands) {
        p.hand = hand;
        p.declared_rounds = None;
        p.actual_rounds_won = 0;
    }
    s.deck = pool;
    s.trick.clear();
    s.trick_winner = None;
    s.phase = Phase::Declaring;
    s.current_turn_index = s.starting_player_index;
    reset_ready(s);
    info!(
        code = %s.code,
        hand = s.current_hand_number,
        size,
        undealt = s.deck.len(),
        "hand dealt"
    );
    Ok(())
}

/// Ready-barrier step after a trick. Repeated calls from the same player count once.
pub fn continue_play<R: Rng + ?Sized>(
    s: &mut Session,
    name: &str,
    rng: &mut R,
) -> GameResult<ContinueOutcome> {
    if s.phase != Phase::HandComplete {
        return Err(GameError::WrongPhase);
    }
    let idx = s.player_index(name)?;
    mark_ready(s, idx);
    if !all_ready(s) {
        return Ok(ContinueOutcome::Waiting {
            ready: ready_count(s),
            total: s.players.len(),
        });
    }

    reset_ready(s);
    s.trick.clear();

    if !hand_exhausted(s) {
        let leader = s.trick_winner.clone().ok_or(GameError::WrongPhase)?;
        s.current_turn_index = s.player_index(&leader)?;
        s.phase = Phase::Playing;
        return Ok(ContinueOutcome::NextTrick { leader });
    }

    scoring::apply_hand_scores(s);

    if scoring::is_game_over(s) {
        s.phase = Phase::GameOver;
        let winner = scoring::determine_game_winner(s)
            .map(|p| p.name.clone())
            .ok_or(GameError::PlayerNotFound)?;
        info!(code = %s.code, winner = %winner, "game over");
        return Ok(ContinueOutcome::GameOver {
            winner,
            scoreboard: s.scoreboard_lines(),
        });
    }

    s.current_hand_number += 1;
    s.starting_player_index = next_index(s.starting_player_index, s.players.len());
    deal_hand(s, rng)?;
    Ok(ContinueOutcome::NextHand {
        hand_number: s.current_hand_number,
        leader: s.current_player().name.clone(),
    })
}

/// Applies a dropped connection to the session.
///
/// Lobby seats are simply vacated, handing the admin role down the join order
/// when needed. Once cards are dealt a missing hand makes every remaining
/// trick unplayable, so the session is aborted instead of left waiting.
pub fn disconnect(s: &mut Session, conn: Uuid) -> DisconnectOutcome {
    let Some(idx) = s.players.iter().position(|p| p.conn == conn) else {
        return DisconnectOutcome::NotSeated;
    };
    let name = s.players[idx].name.clone();

    if s.started {
        warn!(code = %s.code, player = %name, "player dropped mid-game, aborting session");
        return DisconnectOutcome::Aborted { name };
    }

    s.players.remove(idx);
    if s.admin == name {
        if let Some(next) = s.players.first() {
            s.admin = next.name.clone();
            info!(code = %s.code, admin = %s.admin, "admin handed over");
        }
    }
    DisconnectOutcome::LeftLobby {
        name,
        session_empty: s.players.is_empty(),
    }
}
