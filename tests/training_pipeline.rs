//! Tests for the self-play trainer and its observers

use std::{
    sync::{Arc, Mutex, mpsc},
    thread,
};

use teeter::{
    EngineConfig, LearnerConfig, QLearningAgent, SelfPlayTrainer, Side, TrainingConfig,
    pipeline::{
        CallbackObserver, HeuristicOpponent, IdlePolicy, JsonlObserver, MetricsObserver,
        Observation, TrainingProgress,
    },
};
use tempfile::tempdir;

fn short_config(episodes: usize, seed: u64) -> TrainingConfig {
    TrainingConfig {
        num_episodes: episodes,
        seed: Some(seed),
        progress_interval: 5,
        engine: EngineConfig {
            max_steps: 240,
            ..EngineConfig::default()
        },
        ..TrainingConfig::default()
    }
}

#[test]
fn test_twenty_episodes_are_all_counted() {
    let mut trainer = SelfPlayTrainer::new(short_config(20, 42));
    let mut agent = QLearningAgent::new(LearnerConfig::default());

    let result = trainer.run_training(&mut agent, 20, |_| {}).unwrap();

    let stats = result.stats;
    assert_eq!(stats.total_games, 20);
    assert_eq!(stats.wins + stats.losses + stats.draws, 20);
    assert!(!result.cancelled);
    assert!(agent.q_table_size() > 0);
    assert!(agent.exploration_rate() < 1.0);
    assert!(stats.average_game_time > 0.0);
}

#[test]
fn test_progress_snapshots_carry_agent_state() {
    let mut trainer = SelfPlayTrainer::new(short_config(12, 9));
    let mut agent = QLearningAgent::new(LearnerConfig::default());
    let mut snapshots: Vec<TrainingProgress> = Vec::new();

    trainer
        .run_training(&mut agent, 12, |progress| snapshots.push(*progress))
        .unwrap();

    let completed: Vec<_> = snapshots.iter().map(|p| p.episodes_completed).collect();
    assert_eq!(completed, vec![5, 10, 12]);
    for pair in snapshots.windows(2) {
        assert!(pair[1].exploration_rate <= pair[0].exploration_rate);
        assert!(pair[1].q_table_size >= pair[0].q_table_size);
    }
    let last = snapshots.last().unwrap();
    assert_eq!(last.stats.total_games, 12);
    assert_eq!(last.exploration_rate, agent.exploration_rate());
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let run = || {
        let mut trainer = SelfPlayTrainer::new(short_config(15, 77));
        let mut agent = QLearningAgent::new(LearnerConfig::default());
        let result = trainer.run(&mut agent).unwrap();
        (result.stats, agent.q_table().clone())
    };

    let (stats_a, table_a) = run();
    let (stats_b, table_b) = run();
    assert_eq!(stats_a, stats_b);
    assert_eq!(table_a, table_b);
}

#[test]
fn test_cancellation_from_another_thread_keeps_partial_table() {
    let (tx, rx) = mpsc::channel();
    let mut trainer = SelfPlayTrainer::new(TrainingConfig {
        progress_interval: 1,
        ..short_config(1_000_000, 3)
    })
    .with_opponent(Box::new(IdlePolicy));
    let token = trainer.cancellation_token();

    let handle = thread::spawn(move || {
        let mut agent = QLearningAgent::new(LearnerConfig::default());
        let result = trainer
            .run_training(&mut agent, 1_000_000, |progress| {
                let _ = tx.send(progress.episodes_completed);
            })
            .unwrap();
        (result, agent)
    });

    rx.recv().unwrap();
    token.cancel();
    let (result, agent) = handle.join().unwrap();

    assert!(result.cancelled);
    assert!(result.episodes_completed() < 1_000_000);
    assert_eq!(
        result.stats.wins + result.stats.losses + result.stats.draws,
        result.episodes_completed()
    );
    assert_eq!(result.q_table_size, agent.q_table_size());
    assert!(agent.q_table_size() > 0);
}

#[test]
fn test_learner_on_side_one() {
    let config = TrainingConfig {
        learner_side: Side::One,
        ..short_config(8, 5)
    };
    let mut trainer =
        SelfPlayTrainer::new(config).with_opponent(Box::new(HeuristicOpponent::new()));
    let mut agent = QLearningAgent::new(LearnerConfig::default());

    let result = trainer.run(&mut agent).unwrap();
    assert_eq!(result.episodes_completed(), 8);
    assert_eq!(trainer.opponent_name(), "Heuristic");
}

#[test]
fn test_evaluation_does_not_change_the_agent() {
    let mut trainer = SelfPlayTrainer::new(short_config(10, 21));
    let mut agent = QLearningAgent::new(LearnerConfig::default());
    trainer.run(&mut agent).unwrap();

    let table = agent.q_table().clone();
    let epsilon = agent.exploration_rate();

    let mut evaluator = SelfPlayTrainer::new(short_config(10, 22));
    let result = evaluator.evaluate(&agent, 10).unwrap();

    assert_eq!(result.episodes_completed(), 10);
    assert_eq!(agent.q_table(), &table);
    assert_eq!(agent.exploration_rate(), epsilon);
}

#[test]
fn test_observers_see_every_episode() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("observations.jsonl");
    let calls = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&calls);

    let mut trainer = SelfPlayTrainer::new(short_config(6, 13))
        .with_observer(Box::new(JsonlObserver::new(&path).unwrap().with_steps()))
        .with_observer(Box::new(MetricsObserver::new()))
        .with_observer(Box::new(CallbackObserver::new(move |_: &TrainingProgress| {
            *counter.lock().unwrap() += 1;
        })));
    let mut agent = QLearningAgent::new(LearnerConfig::default());
    trainer.run(&mut agent).unwrap();

    // Progress at 5 and at the end (6)
    assert_eq!(*calls.lock().unwrap(), 2);

    let contents = std::fs::read_to_string(&path).unwrap();
    let observations: Vec<Observation> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(observations.len(), 6);
    for (i, observation) in observations.iter().enumerate() {
        assert_eq!(observation.episode, i);
        assert_eq!(observation.steps.len() as u32, observation.total_steps);
    }
}
