//! Concurrency and lifecycle tests for the match registry.

use kings_valley::{MatchError, MatchStatus, Position, Side};
use kings_valley_server::{MatchRegistry, ScriptedJoinCodes};
use std::collections::HashSet;
use std::sync::Barrier;

fn pos(row: i32, col: i32) -> Position {
    Position::new(row, col)
}

/// Creates and joins a match, returning (match id, alice id, bob id).
fn started(registry: &MatchRegistry) -> (String, String, String) {
    let created = registry.create_match("Alice").expect("Create failed");
    let joined = registry
        .join_match(&created.join_code, "Bob")
        .expect("Join failed");
    (created.match_id, created.creator.id, joined.player.id)
}

fn submit(
    registry: &MatchRegistry,
    match_id: &str,
    player: &str,
    from: Position,
    to: Position,
) -> Result<Option<Side>, MatchError> {
    registry.with_match(match_id, |engine| engine.apply_move(player, from, to))
}

#[test]
fn test_racing_legal_and_illegal_moves() {
    for _ in 0..50 {
        let registry = MatchRegistry::new();
        let (id, alice, _) = started(&registry);
        let barrier = Barrier::new(2);

        let (legal, illegal) = std::thread::scope(|s| {
            let legal = s.spawn(|| {
                barrier.wait();
                submit(&registry, &id, &alice, pos(4, 0), pos(1, 0))
            });
            let illegal = s.spawn(|| {
                barrier.wait();
                submit(&registry, &id, &alice, pos(4, 0), pos(2, 0))
            });
            (legal.join().unwrap(), illegal.join().unwrap())
        });

        assert_eq!(legal, Ok(None));
        assert!(illegal.is_err());
        registry
            .with_match(&id, |engine| {
                assert_eq!(engine.move_log().len(), 1);
                assert_eq!(engine.current_turn(), Side::Two);
                assert_eq!(engine.board().at(pos(1, 0)).unwrap().map(|p| p.owner), Some(Side::One));
                assert_eq!(engine.board().at(pos(4, 0)).unwrap(), None);
                Ok(())
            })
            .unwrap();
    }
}

#[test]
fn test_racing_legal_moves_apply_exactly_once() {
    for _ in 0..50 {
        let registry = MatchRegistry::new();
        let (id, alice, _) = started(&registry);
        let barrier = Barrier::new(2);

        let results = std::thread::scope(|s| {
            let handles: Vec<_> = [(pos(4, 0), pos(1, 0)), (pos(4, 4), pos(1, 4))]
                .into_iter()
                .map(|(from, to)| {
                    let (registry, id, alice, barrier) = (&registry, &id, &alice, &barrier);
                    s.spawn(move || {
                        barrier.wait();
                        submit(registry, id, alice, from, to)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .collect::<Vec<_>>()
        });

        let accepted = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(accepted, 1, "results: {results:?}");
        assert!(results.contains(&Err(MatchError::NotYourTurn(Side::Two))));
        registry
            .with_match(&id, |engine| {
                assert_eq!(engine.move_log().len(), 1);
                Ok(())
            })
            .unwrap();
    }
}

#[test]
fn test_racing_joins_seat_one_player() {
    let registry = MatchRegistry::new();
    let created = registry.create_match("Alice").unwrap();
    let barrier = Barrier::new(4);

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = ["Bob", "Carol", "Dave", "Erin"]
            .into_iter()
            .map(|name| {
                let (registry, code, barrier) = (&registry, &created.join_code, &barrier);
                s.spawn(move || {
                    barrier.wait();
                    registry.join_match(code, name)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for result in results.iter().filter(|r| r.is_err()) {
        assert!(matches!(result, Err(MatchError::NotFound(_))));
    }
    registry
        .with_match(&created.match_id, |engine| {
            assert_eq!(engine.players().len(), 2);
            assert_eq!(engine.status(), MatchStatus::InProgress);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_parallel_creations_get_distinct_codes() {
    let registry = MatchRegistry::with_generator(ScriptedJoinCodes::new([
        "AAAAAA", "BBBBBB", "CCCCCC", "DDDDDD", "EEEEEE", "FFFFFF", "GGGGGG", "HHHHHH",
    ]));
    let codes: Vec<String> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = &registry;
                s.spawn(move || registry.create_match(&format!("player{i}")).unwrap().join_code)
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    let unique: HashSet<_> = codes.iter().collect();
    assert_eq!(unique.len(), 8);
    assert_eq!(registry.len(), 8);
}

#[test]
fn test_unknown_code_and_id() {
    let registry = MatchRegistry::new();
    assert!(matches!(
        registry.join_match("NOPE00", "Bob"),
        Err(MatchError::NotFound(_))
    ));
    assert!(matches!(
        registry.with_match("missing", |_| Ok(())),
        Err(MatchError::NotFound(_))
    ));
}

#[test]
fn test_started_match_code_no_longer_joinable() {
    let registry = MatchRegistry::new();
    let created = registry.create_match("Alice").unwrap();
    registry.join_match(&created.join_code, "Bob").unwrap();
    assert_eq!(
        registry.join_match(&created.join_code, "Carol").unwrap_err(),
        MatchError::NotFound(created.join_code.clone())
    );
}

#[test]
fn test_finished_match_code_is_reusable() {
    let registry = MatchRegistry::with_generator(ScriptedJoinCodes::new(["AAAAAA"]));
    let (id, alice, bob) = started(&registry);

    let script = [
        (&alice, pos(4, 1), pos(1, 1)),
        (&bob, pos(0, 0), pos(3, 0)),
        (&alice, pos(4, 3), pos(1, 3)),
        (&bob, pos(3, 0), pos(0, 0)),
        (&alice, pos(1, 3), pos(1, 2)),
        (&bob, pos(0, 0), pos(3, 0)),
    ];
    for (player, from, to) in script {
        submit(&registry, &id, player, from, to).unwrap();
    }
    assert_eq!(
        submit(&registry, &id, &alice, pos(4, 2), pos(2, 2)),
        Ok(Some(Side::One))
    );

    let next = registry.create_match("Carol").unwrap();
    assert_eq!(next.join_code, "AAAAAA");
    assert_eq!(registry.resolve_code("AAAAAA"), Some(next.match_id));
}
