use tracing::debug;
use tricktaker_protocol::Phase;

use crate::error::{GameError, GameResult};
use crate::session::Session;
use crate::turns::{advance_turn, last_index};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclareOutcome {
    /// Someone still has to declare.
    Next { player: String },
    /// Everyone has declared; `leader` plays the first card.
    Complete { leader: String },
}

/// Sum of bids recorded so far this hand.
pub fn declared_total(s: &Session) -> u32 {
    s.players.iter().filter_map(|p| p.declared_rounds).sum()
}

/// Records `name`'s bid of `amount` tricks.
///
/// The player declaring last may not bring the table total to exactly the
/// number of cards in the hand.
pub fn declare(s: &mut Session, name: &str, amount: i64) -> GameResult<DeclareOutcome> {
    if s.phase != Phase::Declaring {
        return Err(GameError::WrongPhase);
    }
    let idx = s.require_turn(name)?;

    let max = s.players[idx].hand.len() as u32;
    if amount < 0 || amount > max as i64 {
        return Err(GameError::InvalidDeclaration { max });
    }
    let amount = amount as u32;

    let hand_size = s.current_hand_size();
    let is_last = idx == last_index(s.starting_player_index, s.players.len());
    if is_last && declared_total(s) + amount == hand_size {
        return Err(GameError::LastPlayerRestriction { hand_size });
    }

    let p = &mut s.players[idx];
    p.declared_rounds = Some(amount);
    p.actual_rounds_won = 0;
    debug!(code = %s.code, player = %name, amount, "declaration recorded");

    advance_turn(s);

    if s.players.iter().all(|p| p.declared_rounds.is_some()) {
        s.phase = Phase::Playing;
        Ok(DeclareOutcome::Complete {
            leader: s.current_player().name.clone(),
        })
    } else {
        Ok(DeclareOutcome::Next {
            player: s.current_player().name.clone(),
        })
    }
}
