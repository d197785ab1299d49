use tracing::debug;
use tricktaker_protocol::{Card, Phase, Suit, TrickPlay};

use crate::error::{GameError, GameResult};
use crate::session::Session;
use crate::turns::{advance_turn, reset_ready};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Trick still open; `player` is up.
    NextTurn { player: String },
    /// Last card of the trick went down. The session now waits on the ready barrier.
    TrickComplete {
        winner: String,
        tricks_won: u32,
        trick: Vec<TrickPlay>,
    },
}

/// Ordering key for a card inside a trick. The ace of hearts beats everything,
/// then rank, then hearts over other suits, then the greater suit code.
fn strength(card: &Card) -> (bool, u8, bool, char) {
    (
        card.is_ace_of_hearts(),
        card.rank.value(),
        card.suit == Suit::Hearts,
        card.suit.code(),
    )
}

/// Winner of a trick. With several aces of hearts (multi-deck pools) the last
/// one played takes it; any other identical cards go to the earliest play.
pub fn determine_trick_winner(trick: &[TrickPlay]) -> Option<&str> {
    let mut best: Option<&TrickPlay> = None;
    for play in trick {
        match best {
            Some(b)
                if !play.card.is_ace_of_hearts()
                    && strength(&play.card) <= strength(&b.card) => {}
            _ => best = Some(play),
        }
    }
    best.map(|p| p.player_name.as_str())
}

/// True once every card dealt this hand has been played.
pub fn hand_exhausted(s: &Session) -> bool {
    s.players.iter().all(|p| p.hand.is_empty())
}

/// Plays `card` from `name`'s hand into the open trick.
pub fn play_card(s: &mut Session, name: &str, card: Card) -> GameResult<PlayOutcome> {
    if s.phase != Phase::Playing {
        return Err(GameError::CannotPlayDuringDeclarations);
    }
    let idx = s.require_turn(name)?;
    let pos = s.players[idx]
        .hand
        .iter()
        .position(|c| *c == card)
        .ok_or_else(|| GameError::CardNotInHand(card.to_string()))?;

    s.players[idx].hand.remove(pos);
    s.trick.push(TrickPlay {
        player_name: name.to_string(),
        card,
    });
    debug!(code = %s.code, player = %name, %card, "card played");

    if s.trick.len() < s.players.len() {
        advance_turn(s);
        return Ok(PlayOutcome::NextTurn {
            player: s.current_player().name.clone(),
        });
    }

    let winner = determine_trick_winner(&s.trick)
        .map(str::to_string)
        .ok_or(GameError::WrongPhase)?;
    let widx = s.player_index(&winner)?;
    s.players[widx].actual_rounds_won += 1;
    let tricks_won = s.players[widx].actual_rounds_won;
    s.trick_winner = Some(winner.clone());
    s.phase = Phase::HandComplete;
    reset_ready(s);

    Ok(PlayOutcome::TrickComplete {
        winner,
        tricks_won,
        trick: s.trick.clone(),
    })
}
