//! Alternating turn invariant: sides alternate 1, 2, 1, 2, ...

use super::Invariant;
use crate::engine::MatchEngine;
use crate::types::{MatchStatus, Side};

/// Invariant: the move log alternates sides starting with side One, and the
/// turn pointer agrees with it.
///
/// While a match is running the pointer names the side after the last
/// mover. A finished match keeps the pointer on the winning mover.
pub struct AlternatingTurnInvariant;

impl Invariant<MatchEngine> for AlternatingTurnInvariant {
    fn holds(engine: &MatchEngine) -> bool {
        let log = engine.move_log();

        if log.first().is_some_and(|first| first.mover != Side::One) {
            return false;
        }
        if log.windows(2).any(|pair| pair[0].mover == pair[1].mover) {
            return false;
        }

        match (engine.status(), log.last()) {
            (MatchStatus::Finished, Some(last)) => engine.current_turn() == last.mover,
            (MatchStatus::Finished, None) => false,
            (_, Some(last)) => engine.current_turn() == last.mover.opponent(),
            (_, None) => engine.current_turn() == Side::One,
        }
    }

    fn description() -> &'static str {
        "Sides alternate turns (1, 2, 1, 2, ...)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;

    #[test]
    fn test_new_match_holds() {
        let engine = MatchEngine::create("m".into(), "CODE01".into(), "Alice");
        assert!(AlternatingTurnInvariant::holds(&engine));
    }

    #[test]
    fn test_single_move_holds() {
        let mut engine = MatchEngine::create("m".into(), "CODE01".into(), "Alice");
        let alice = engine.players()[0].id.clone();
        engine.join("Bob").unwrap();
        engine
            .apply_move(&alice, Position::new(4, 4), Position::new(1, 4))
            .unwrap();
        assert!(AlternatingTurnInvariant::holds(&engine));
        assert_eq!(engine.current_turn(), Side::Two);
    }
}
