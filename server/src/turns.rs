//! Turn rotation and the ready barrier shared by every phase.

use crate::session::Session;

/// Next seat clockwise.
pub fn next_index(i: usize, n: usize) -> usize {
    (i + 1) % n
}

/// Seat that acts last in a rotation led by `start`.
pub fn last_index(start: usize, n: usize) -> usize {
    (start + n - 1) % n
}

pub fn advance_turn(s: &mut Session) {
    s.current_turn_index = next_index(s.current_turn_index, s.players.len());
}

/// Marks `idx` ready. Returns false if the player had already checked in.
pub fn mark_ready(s: &mut Session, idx: usize) -> bool {
    let p = &mut s.players[idx];
    let fresh = !p.ready_for_next_round;
    p.ready_for_next_round = true;
    fresh
}

pub fn ready_count(s: &Session) -> usize {
    s.players.iter().filter(|p| p.ready_for_next_round).count()
}

pub fn all_ready(s: &Session) -> bool {
    s.players.iter().all(|p| p.ready_for_next_round)
}

pub fn reset_ready(s: &mut Session) {
    for p in s.players.iter_mut() {
        p.ready_for_next_round = false;
    }
}
