//! Exploration tests.
//!
//! These tests run the full explore → next loop against the duel engine
//! and check the shape of what gets enumerated.

use std::collections::HashSet;

use encounter_explorer::games::duel::{Combatant, Duel, DuelBuilder, MoveSpec};
use encounter_explorer::{
    BattleEngine, Enumerator, ExplorerConfig, ExplorerError, ExplorerRunner, Path, RollError,
    SideId,
};

fn unit(name: &str, speed: u32, moves: usize) -> Combatant {
    (1..=moves).fold(
        Combatant::new(name, 200).with_stats(10, 10, speed),
        |unit, i| unit.with_move(MoveSpec::new(format!("Move{i}"), 10).with_crit(false)),
    )
}

/// No preview, no variance, no crits, sure hits, no speed ties.
fn quiet_duel(p1_moves: usize, p2_moves: usize) -> Duel {
    DuelBuilder::new()
        .team(SideId::new(0), vec![unit("Alpha", 20, p1_moves)])
        .team(SideId::new(1), vec![unit("Beta", 10, p2_moves)])
        .team_preview(false)
        .damage_variance(false)
        .build()
}

fn runner(duel: &Duel, config: ExplorerConfig) -> ExplorerRunner<Duel> {
    ExplorerRunner::from_engine(duel, config).unwrap()
}

/// Test that two options per side at depth 1 give exactly four paths.
#[test]
fn test_two_by_two_choices_give_four_paths() {
    let runner = runner(&quiet_duel(2, 2), ExplorerConfig::new().with_depth(1));

    let results = runner.run_collect().unwrap();
    let paths: Vec<String> = results.iter().map(|r| r.path.to_string()).collect();

    assert_eq!(
        paths,
        vec!["([0];[0])<>", "([0];[1])<>", "([1];[0])<>", "([1];[1])<>"]
    );
    assert!(results.iter().all(|r| !r.ended));
    assert!(results.iter().all(|r| r.rejected_choices == 0));
}

/// Test the single-option case enumerates exactly one path.
#[test]
fn test_single_option_is_terminal() {
    let runner = runner(&quiet_duel(1, 1), ExplorerConfig::new().with_depth(1));

    let results = runner.run_collect().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].path.to_string(), "([0];[0])<>");
    assert!(Enumerator::new().next(&results[0].path).is_none());
}

/// Test that summary counts match and the run reports exhaustion.
#[test]
fn test_run_summary() {
    let runner = runner(&quiet_duel(2, 3), ExplorerConfig::new().with_depth(1));

    let mut seen = 0;
    let summary = runner.run(|_| seen += 1).unwrap();

    assert_eq!(seen, 6);
    assert_eq!(summary.explored, 6);
    assert_eq!(summary.ended, 0);
    assert!(summary.exhausted);
}

/// Test that `max_results` stops the run early.
#[test]
fn test_max_results_caps_run() {
    let config = ExplorerConfig::new().with_depth(2).with_max_results(5);
    let runner = runner(&quiet_duel(2, 2), config);

    let summary = runner.run(|_| {}).unwrap();
    assert_eq!(summary.explored, 5);
    assert!(!summary.exhausted);
}

/// Test that depth 2 explores both rounds' choices.
#[test]
fn test_depth_two_multiplies_rounds() {
    let runner = runner(&quiet_duel(2, 2), ExplorerConfig::new().with_depth(2));

    let results = runner.run_collect().unwrap();
    assert_eq!(results.len(), 16);
    assert!(results.iter().all(|r| r.path.len() == 2));

    let unique: HashSet<String> = results.iter().map(|r| r.path.to_string()).collect();
    assert_eq!(unique.len(), 16);
}

/// Test that every active unit gets its own choice slot at depth 2.
#[test]
fn test_two_actives_per_side_enumerates_every_slot() {
    let duel = DuelBuilder::new()
        .team(SideId::new(0), vec![unit("A", 40, 2), unit("B", 30, 2)])
        .team(SideId::new(1), vec![unit("C", 20, 2), unit("D", 10, 2)])
        .actives_per_side(2)
        .team_preview(false)
        .damage_variance(false)
        .build();
    let runner = runner(&duel, ExplorerConfig::new().with_depth(2));

    let results = runner.run_collect().unwrap();
    assert_eq!(results.len(), 256);
    let paths: Vec<String> = results.iter().map(|r| r.path.to_string()).collect();
    let unique: HashSet<&String> = paths.iter().collect();
    assert_eq!(unique.len(), 256);

    assert_eq!(paths[0], "([0,0];[0,0])<>|([0,0];[0,0])<>");
    assert_eq!(paths[1], "([0,0];[0,0])<>|([0,0];[0,1])<>");
    // exhausting the second slot of p1 resets it and every p2 slot
    assert_eq!(paths[127], "([0,1];[1,1])<>|([1,1];[1,1])<>");
    assert_eq!(paths[128], "([1,0];[0,0])<>|([0,0];[0,0])<>");
    assert_eq!(paths[255], "([1,1];[1,1])<>|([1,1];[1,1])<>");

    assert_eq!(results[0].narration[0], "|move|p1a: A|Move1|p2a: C");
    assert!(results[255]
        .narration
        .contains(&"|move|p1b: B|Move2|p2b: D".to_string()));

    for result in results.iter().step_by(37) {
        runner.verify_replay(result).unwrap();
    }
}

/// Test that a two-way speed tie is explored in its first order only.
#[test]
fn test_speed_tie_has_single_order() {
    let duel = DuelBuilder::new()
        .team(SideId::new(0), vec![unit("Alpha", 10, 1)])
        .team(SideId::new(1), vec![unit("Beta", 10, 1)])
        .team_preview(false)
        .damage_variance(false)
        .build();

    let results = runner(&duel, ExplorerConfig::new().with_depth(1)).run_collect().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].path.to_string(), "([0];[0])<[0]>");
    assert_eq!(results[0].narration[0], "|move|p1a: Alpha|Move1|p2a: Beta");
}

/// Test that damage rolls are collapsed to 0, 7 and 15.
#[test]
fn test_damage_rolls_collapse() {
    let duel = DuelBuilder::new()
        .team(SideId::new(0), vec![unit("Alpha", 20, 1)])
        .team(SideId::new(1), vec![unit("Beta", 10, 1)])
        .team_preview(false)
        .build();
    let runner = runner(&duel, ExplorerConfig::new().with_depth(1));

    let results = runner.run_collect().unwrap();
    let paths: Vec<String> = results.iter().map(|r| r.path.to_string()).collect();

    assert_eq!(paths.len(), 9);
    assert_eq!(&paths[..4], &["([0];[0])<0,0>", "([0];[0])<0,7>", "([0];[0])<0,15>", "([0];[0])<7,0>"]);
    assert_eq!(paths[8], "([0];[0])<15,15>");
}

/// Test that turning collapse off enumerates every damage roll.
#[test]
fn test_damage_rolls_without_collapse() {
    let duel = DuelBuilder::new()
        .team(SideId::new(0), vec![unit("Alpha", 20, 1)])
        .team(SideId::new(1), vec![unit("Beta", 10, 1)])
        .team_preview(false)
        .build();
    let config = ExplorerConfig::new().with_depth(1).with_damage_collapse(false);

    let results = runner(&duel, config).run_collect().unwrap();
    assert_eq!(results.len(), 256);
}

/// Test that coin-flip paths carry probabilities summing to one.
#[test]
fn test_probabilities_cover_outcomes() {
    let coin = |name: &str, speed| {
        Combatant::new(name, 200)
            .with_stats(10, 10, speed)
            .with_move(MoveSpec::new("Flip", 10).with_accuracy(50).with_crit(false))
    };
    let duel = DuelBuilder::new()
        .team(SideId::new(0), vec![coin("Alpha", 20)])
        .team(SideId::new(1), vec![coin("Beta", 10)])
        .team_preview(false)
        .damage_variance(false)
        .build();

    let results = runner(&duel, ExplorerConfig::new().with_depth(1)).run_collect().unwrap();
    assert_eq!(results.len(), 4);

    let total: f64 = results.iter().map(|r| r.probability()).sum();
    assert!((total - 1.0).abs() < 1e-9);
}

/// Test that every result replays to identical narration.
#[test]
fn test_replay_is_deterministic() {
    let duel = DuelBuilder::new().build();
    let config = ExplorerConfig::new().with_depth(2).with_max_results(40);
    let runner = runner(&duel, config);

    let results = runner.run_collect().unwrap();
    assert_eq!(results.len(), 40);
    for result in &results {
        runner.verify_replay(result).unwrap();
    }
}

/// Test that replay catches narration that does not match.
#[test]
fn test_replay_detects_divergence() {
    let runner = runner(&quiet_duel(2, 2), ExplorerConfig::new().with_depth(1));
    let mut result = runner.explore(Path::new()).unwrap();
    let line = result.narration.len();
    result.narration.push("|extra".to_string());

    match runner.verify_replay(&result) {
        Err(ExplorerError::NarrationDiverged {
            line: at,
            expected,
            actual,
        }) => {
            assert_eq!(at, line);
            assert_eq!(expected.as_deref(), Some("|extra"));
            assert_eq!(actual, None);
        }
        other => panic!("expected divergence, got {other:?}"),
    }
}

/// Test that exploring a finished path again reproduces it.
#[test]
fn test_explore_seed_reproduces_result() {
    let duel = DuelBuilder::new().team_preview(false).build();
    let runner = runner(&duel, ExplorerConfig::new().with_depth(1));

    let first = runner.explore(Path::new()).unwrap();
    let next = Enumerator::new().next(&first.path).unwrap();
    let second = runner.explore(next.clone()).unwrap();
    let again = runner.explore(second.path.clone()).unwrap();

    assert_eq!(again.path, second.path);
    assert_eq!(again.narration, second.narration);
    assert_ne!(second.path, first.path);
}

/// Test that draws past the record fail when generation is disabled.
#[test]
fn test_unknown_roll_without_generation() {
    let duel = DuelBuilder::new().team_preview(false).build();
    let config = ExplorerConfig::new().with_depth(1).with_new_rolls(false);

    let err = runner(&duel, config).explore(Path::new()).unwrap_err();
    assert!(matches!(err.as_roll_error(), Some(RollError::UnknownRoll { index: 0, .. })));
}

/// Test that a path from a different engine is rejected.
#[test]
fn test_mismatched_seed_is_fatal() {
    let duel = DuelBuilder::new().team_preview(false).build();
    let runner = runner(&duel, ExplorerConfig::new().with_depth(1));
    let coin_path = {
        let coin = |name: &str, speed| {
            Combatant::new(name, 200)
                .with_stats(10, 10, speed)
                .with_move(MoveSpec::new("Flip", 10).with_accuracy(50).with_crit(false))
                .with_move(MoveSpec::new("Flop", 10).with_accuracy(50).with_crit(false))
        };
        let other = DuelBuilder::new()
            .team(SideId::new(0), vec![coin("Alpha", 20)])
            .team(SideId::new(1), vec![coin("Beta", 10)])
            .team_preview(false)
            .damage_variance(false)
            .build();
        ExplorerRunner::<Duel>::from_engine(&other, ExplorerConfig::new())
            .unwrap()
            .explore(Path::new())
            .unwrap()
            .path
    };

    // the coin duel records an accuracy chance first, the default duel asks for a crit
    let err = runner.explore(coin_path).unwrap_err();
    assert!(matches!(err.as_roll_error(), Some(RollError::Mismatch { index: 0, .. })));
}

/// Test that team preview is handled without becoming a round.
#[test]
fn test_preview_is_not_a_round() {
    let duel = DuelBuilder::new().build();
    assert_eq!(duel.clone().take_requests().len(), 2);
    let runner = runner(&duel, ExplorerConfig::new().with_depth(1));

    let result = runner.explore(Path::new()).unwrap();
    assert_eq!(result.path.len(), 1);
    // narration from before the snapshot is not replayed
    assert_eq!(result.narration[0], "|start");
}

/// Test that results carry a restorable snapshot of the final state.
#[test]
fn test_result_snapshot_restores() {
    let runner = runner(&quiet_duel(2, 2), ExplorerConfig::new().with_depth(1));
    let result = runner.explore(Path::new()).unwrap();

    let mut restored = Duel::restore(&result.snapshot).unwrap();
    assert!(!restored.ended());
    assert_eq!(restored.turn(), 2);
    assert_eq!(restored.take_requests().len(), 2);
}

/// Test that a fight to the finish reports ended results.
#[test]
fn test_ended_results() {
    let glass = |name: &str, speed| {
        Combatant::new(name, 5)
            .with_stats(10, 10, speed)
            .with_move(MoveSpec::new("Strike", 40).with_crit(false))
    };
    let duel = DuelBuilder::new()
        .team(SideId::new(0), vec![glass("Alpha", 20)])
        .team(SideId::new(1), vec![glass("Beta", 10)])
        .team_preview(false)
        .damage_variance(false)
        .build();

    let results = runner(&duel, ExplorerConfig::new().with_depth(3)).run_collect().unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].ended);
    assert_eq!(results[0].narration.last().map(String::as_str), Some("|win|p1"));
}
