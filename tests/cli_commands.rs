use clap::Parser;
use tempfile::tempdir;
use teeter::{
    TrainingResult,
    cli::{
        commands::{evaluate, reset, status, train},
        ledger::{SkillLevel, TrainingLedger},
    },
    q_learning::{SavedQAgent, table_file},
};

#[test]
fn train_writes_table_ledger_snapshot_and_summary() {
    let tmp = tempdir().unwrap();
    let table = tmp.path().join("qtable.txt");
    let ledger = tmp.path().join("ai_stats.dat");
    let snapshot = tmp.path().join("agent.msgpack");
    let summary = tmp.path().join("summary.json");
    let progress = tmp.path().join("progress.csv");

    let args = train::TrainArgs::parse_from([
        "teeter-train",
        "--episodes",
        "6",
        "--seed",
        "42",
        "--progress-interval",
        "2",
        "--no-progress",
        "--table",
        table.to_str().unwrap(),
        "--ledger",
        ledger.to_str().unwrap(),
        "--snapshot",
        snapshot.to_str().unwrap(),
        "--summary",
        summary.to_str().unwrap(),
        "--progress-csv",
        progress.to_str().unwrap(),
    ]);
    train::execute(args).expect("training should succeed");

    let saved_table = table_file::load(&table).unwrap().expect("table file written");
    assert!(!saved_table.is_empty());

    let ledger_after = TrainingLedger::load(&ledger).unwrap();
    assert_eq!(ledger_after.games_played, 6);
    assert_eq!(ledger_after.skill_level(), SkillLevel::Beginner);

    let saved = SavedQAgent::load_from_file(&snapshot).unwrap();
    assert_eq!(saved.metadata.episodes_trained, Some(6));
    assert_eq!(saved.metadata.seed, Some(42));
    assert_eq!(saved.q_table(), &saved_table);
    let restored = saved.to_agent().unwrap();
    assert!(restored.exploration_rate() < 1.0);

    let result = TrainingResult::load(&summary).unwrap();
    assert_eq!(result.stats.total_games, 6);
    assert!(!result.cancelled);

    let csv = std::fs::read_to_string(&progress).unwrap();
    // header + rows at 2, 4, 6
    assert_eq!(csv.lines().count(), 4);
}

#[test]
fn ledger_accumulates_across_runs() {
    let tmp = tempdir().unwrap();
    let table = tmp.path().join("qtable.txt");
    let ledger = tmp.path().join("ai_stats.dat");

    for episodes in ["3", "4"] {
        let args = train::TrainArgs::parse_from([
            "teeter-train",
            "-e",
            episodes,
            "--seed",
            "1",
            "--no-progress",
            "--table",
            table.to_str().unwrap(),
            "--ledger",
            ledger.to_str().unwrap(),
        ]);
        train::execute(args).unwrap();
    }

    assert_eq!(TrainingLedger::load(&ledger).unwrap().games_played, 7);
}

#[test]
fn evaluate_status_and_reset_after_training() {
    let tmp = tempdir().unwrap();
    let table = tmp.path().join("qtable.txt");
    let ledger = tmp.path().join("ai_stats.dat");
    let report = tmp.path().join("report.json");

    let args = train::TrainArgs::parse_from([
        "teeter-train",
        "-e",
        "5",
        "--seed",
        "9",
        "--no-progress",
        "--table",
        table.to_str().unwrap(),
        "--ledger",
        ledger.to_str().unwrap(),
    ]);
    train::execute(args).unwrap();
    let table_before = std::fs::read_to_string(&table).unwrap();

    let args = evaluate::EvaluateArgs::parse_from([
        "teeter-evaluate",
        "--table",
        table.to_str().unwrap(),
        "--episodes",
        "4",
        "--seed",
        "10",
        "--export",
        report.to_str().unwrap(),
    ]);
    evaluate::execute(args).expect("evaluation should succeed");

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(parsed["stats"]["total_games"], 4);
    assert_eq!(parsed["opponent"], "Heuristic");
    assert_eq!(std::fs::read_to_string(&table).unwrap(), table_before);

    let args = status::StatusArgs::parse_from([
        "teeter-status",
        "--table",
        table.to_str().unwrap(),
        "--ledger",
        ledger.to_str().unwrap(),
    ]);
    status::execute(args).unwrap();

    let args = reset::ResetArgs::parse_from([
        "teeter-reset",
        "--table",
        table.to_str().unwrap(),
        "--ledger",
        ledger.to_str().unwrap(),
    ]);
    reset::execute(args).unwrap();
    assert!(!table.exists());
    assert!(!ledger.exists());
    assert_eq!(TrainingLedger::load(&ledger).unwrap(), TrainingLedger::default());
}

#[test]
fn train_rejects_bad_config_file() {
    let tmp = tempdir().unwrap();
    let config = tmp.path().join("config.json");
    std::fs::write(&config, r#"{ "progress_interval": 0 }"#).unwrap();

    let args = train::TrainArgs::parse_from([
        "teeter-train",
        "--config",
        config.to_str().unwrap(),
        "--table",
        tmp.path().join("qtable.txt").to_str().unwrap(),
    ]);
    assert!(train::execute(args).is_err());
}
