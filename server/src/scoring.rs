use tracing::info;

use crate::hand_size;
use crate::session::{Player, Session};

pub const EXACT_BID_BONUS: u32 = 10;

/// Points for one hand: a trick apiece, plus the bonus when the bid was hit exactly.
pub fn hand_points(declared: Option<u32>, won: u32) -> u32 {
    match declared {
        Some(d) if d == won => EXACT_BID_BONUS + won,
        _ => won,
    }
}

/// Folds this hand's results into every player's total and clears the per-hand tallies.
pub fn apply_hand_scores(s: &mut Session) {
    for p in s.players.iter_mut() {
        let delta = hand_points(p.declared_rounds, p.actual_rounds_won);
        p.score += delta;
        s.scoreboard.insert(p.name.clone(), p.score);
        info!(
            code = %s.code,
            player = %p.name,
            declared = ?p.declared_rounds,
            won = p.actual_rounds_won,
            delta,
            total = p.score,
            "hand scored"
        );
        p.declared_rounds = None;
        p.actual_rounds_won = 0;
    }
}

/// True once the hand just scored was the last one the ceiling allows.
pub fn is_game_over(s: &Session) -> bool {
    hand_size::is_final_hand(s.hand_size_ceiling, s.current_hand_number)
}

/// Highest total; ties go to whoever joined first.
pub fn determine_game_winner(s: &Session) -> Option<&Player> {
    s.players.iter().fold(None, |best: Option<&Player>, p| match best {
        Some(b) if p.score <= b.score => Some(b),
        _ => Some(p),
    })
}
