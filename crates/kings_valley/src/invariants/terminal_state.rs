//! Terminal state consistency.

use super::Invariant;
use crate::engine::MatchEngine;
use crate::rules;
use crate::types::MatchStatus;

/// Invariant: a match is finished exactly when a king sits on the center,
/// and the recorded winner is that king's owner.
pub struct TerminalStateInvariant;

impl Invariant<MatchEngine> for TerminalStateInvariant {
    fn holds(engine: &MatchEngine) -> bool {
        let on_board = rules::winner(engine.board());
        let finished = engine.status() == MatchStatus::Finished;
        finished == engine.winner().is_some() && engine.winner() == on_board
    }

    fn description() -> &'static str {
        "Finished iff a king occupies the center, and the winner is its owner"
    }
}
