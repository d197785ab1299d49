use rand::seq::SliceRandom;
use rand::Rng;
use tricktaker_protocol::{Card, Rank, Suit};

use crate::error::{GameError, GameResult};

pub const CARDS_PER_DECK: usize = 52;

/// `decks` standard decks back to back, in a fixed order (rank-major, suits H D S C).
pub fn build_deck(decks: usize) -> Vec<Card> {
    let mut cards = Vec::with_capacity(decks * CARDS_PER_DECK);
    for _ in 0..decks {
        for rank in Rank::ALL {
            for suit in Suit::ALL {
                cards.push(Card::new(rank, suit));
            }
        }
    }
    cards
}

/// Fisher-Yates, in place.
pub fn shuffle<R: Rng + ?Sized>(cards: &mut [Card], rng: &mut R) {
    cards.shuffle(rng);
}

/// Smallest number of decks that can cover every player's biggest hand.
pub fn decks_required(num_players: usize, peak_hand_size: usize) -> usize {
    (num_players * peak_hand_size).div_ceil(CARDS_PER_DECK).max(1)
}

/// Pops `cards_per_player` cards off the top of `deck` for each player in turn.
/// Nothing is taken when the deck cannot cover the whole deal.
pub fn deal(
    deck: &mut Vec<Card>,
    num_players: usize,
    cards_per_player: usize,
) -> GameResult<Vec<Vec<Card>>> {
    let needed = num_players * cards_per_player;
    if deck.len() < needed {
        return Err(GameError::InsufficientCards {
            needed,
            available: deck.len(),
        });
    }

    let mut hands = Vec::with_capacity(num_players);
    for _ in 0..num_players {
        let start = deck.len() - cards_per_player;
        let mut hand = deck.split_off(start);
        hand.reverse();
        hands.push(hand);
    }
    Ok(hands)
}
