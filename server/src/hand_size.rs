//! How many cards each hand deals.
//!
//! Hand sizes climb `1, 3, 5, ...` up to the session's ceiling, repeat the
//! ceiling once, then walk back down to a single card. Once the ceiling is
//! fixed, the length of the game is fixed too.

use crate::error::{GameError, GameResult};

pub const DEFAULT_CEILING: u32 = 1;
pub const MAX_CEILING: u32 = 51;

/// Accepts odd ceilings in `1..=MAX_CEILING`.
pub fn validate_ceiling(ceiling: i64) -> GameResult<u32> {
    if ceiling < 1 || ceiling > MAX_CEILING as i64 || ceiling % 2 == 0 {
        return Err(GameError::InvalidCeiling(ceiling));
    }
    Ok(ceiling as u32)
}

/// Cards dealt in 1-based hand `hand_number`, or `None` once the sequence is exhausted.
pub fn hand_size(ceiling: u32, hand_number: u32) -> Option<u32> {
    if hand_number == 0 {
        return None;
    }
    let c = ceiling as i64;
    let step = 2 * hand_number as i64 - 1;
    let size = if step <= c {
        step
    } else if step > c + 2 {
        c - (step - 2 - c)
    } else {
        c
    };
    (size >= 1).then_some(size as u32)
}

/// Number of hands a game with this ceiling lasts.
pub fn total_hands(ceiling: u32) -> u32 {
    let mut n = 0;
    while hand_size(ceiling, n + 1).is_some() {
        n += 1;
    }
    n
}

/// True when no hand follows `hand_number`.
pub fn is_final_hand(ceiling: u32, hand_number: u32) -> bool {
    hand_size(ceiling, hand_number + 1).is_none()
}

/// Largest hand the sequence ever deals.
pub fn peak(ceiling: u32) -> u32 {
    (1..=total_hands(ceiling))
        .filter_map(|n| hand_size(ceiling, n))
        .max()
        .unwrap_or(0)
}
