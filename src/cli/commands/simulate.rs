//! Simulate command - Play one episode and print a step-by-step trace

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use crate::{
    app::{AgentConfig, App},
    beam::{EngineConfig, EpisodeEngine, EpisodeResult, PlayerAction, Side},
    cli::{
        config::{DEFAULT_TABLE_PATH, OpponentKind, parse_side},
        output::{format_number, print_kv, print_section, print_subsection},
    },
    pipeline::{EpisodeOutcome, training::actions_for},
    ports::Policy,
    q_learning::discretize::ball_state_key,
};

#[derive(Parser, Debug)]
#[command(about = "Play one episode and trace it", allow_negative_numbers = true)]
pub struct SimulateArgs {
    /// Q-table file driving the agent
    #[arg(long, default_value = DEFAULT_TABLE_PATH)]
    pub table: PathBuf,

    /// Opponent on the other side
    #[arg(long, short = 'o', value_enum, default_value_t = OpponentKind::Heuristic)]
    pub opponent: OpponentKind,

    /// Side the agent controls (`1` or `2`)
    #[arg(long, default_value = "2")]
    pub side: String,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Exploration rate used while simulating
    #[arg(long, default_value_t = 0.0)]
    pub epsilon: f64,

    /// Step cap for the episode
    #[arg(long, default_value_t = EngineConfig::DEFAULT_MAX_STEPS)]
    pub max_steps: u32,

    /// Print every n-th step (the final step is always printed)
    #[arg(long, default_value_t = 30)]
    pub every: u32,

    /// Write every step to a CSV file
    #[arg(long)]
    pub trace_csv: Option<PathBuf>,
}

/// One row of the episode trace
#[derive(Debug, Clone, Serialize)]
pub struct TraceRow {
    pub step: u32,
    pub time: f64,
    pub state: String,
    /// Agent's best stored value for `state`, when it has one
    pub state_value: Option<f64>,
    pub agent_action: PlayerAction,
    pub opponent_action: PlayerAction,
    pub ball1_position: f64,
    pub ball1_velocity: f64,
    pub ball2_position: f64,
    pub ball2_velocity: f64,
    pub beam_angle: f64,
}

/// Play one episode between `agent` on `side` and `opponent`
///
/// Returns the final result and a row per step.
pub fn run_episode(
    engine: &mut EpisodeEngine,
    agent: &mut dyn Policy,
    opponent: &mut dyn Policy,
    side: Side,
) -> (EpisodeResult, Vec<TraceRow>) {
    engine.reset();
    let mut rows = Vec::new();

    loop {
        let board = engine.board();
        let state = ball_state_key(board.ball(side));
        let state_value = agent
            .action_values(board, side)
            .and_then(|values| values.into_iter().map(|(_, q)| q).reduce(f64::max));
        let opponent_action = opponent.select_action(board, side.opponent());
        let agent_action = agent.select_action(board, side);

        let [side_one, side_two] = actions_for(side, agent_action, opponent_action);
        engine.step(side_one, side_two);

        let ball1 = engine.ball(Side::One);
        let ball2 = engine.ball(Side::Two);
        rows.push(TraceRow {
            step: engine.elapsed_steps(),
            time: engine.elapsed_time(),
            state: state.to_string(),
            state_value,
            agent_action,
            opponent_action,
            ball1_position: ball1.position,
            ball1_velocity: ball1.velocity,
            ball2_position: ball2.position,
            ball2_velocity: ball2.velocity,
            beam_angle: engine.beam().angle,
        });

        let result = engine.result();
        if result.is_terminal() {
            return (result, rows);
        }
    }
}

pub fn execute(args: SimulateArgs) -> Result<()> {
    let side = parse_side(&args.side, "--side")?;
    let app = App::new();

    let mut agent = app
        .load_agent(AgentConfig::new(), &args.table)
        .with_context(|| format!("Failed to load Q-table {}", args.table.display()))?;
    agent.set_exploration_rate(args.epsilon);
    if let Some(seed) = args.seed {
        agent.set_rng_seed(seed);
    }
    let mut opponent = args.opponent.build(args.seed.map(|seed| seed.wrapping_add(1)));

    let mut engine = EpisodeEngine::with_config(EngineConfig {
        max_steps: args.max_steps,
        ..EngineConfig::default()
    });
    let (result, rows) = run_episode(&mut engine, &mut agent, opponent.as_mut(), side);

    print_section("Simulation");
    print_kv("Agent side", &side.to_string());
    print_kv("Opponent", opponent.name());
    print_kv("Known states", &format_number(agent.q_table_size()));

    print_subsection("Trace");
    println!(
        "{:>5} {:>7} {:>7} {:>8} {:>9} {:>9} {:>8} {:>8} {:>8}",
        "step", "time", "state", "value", "agent", "opponent", "ball 1", "ball 2", "angle"
    );

    let every = args.every.max(1);
    let last = rows.len().saturating_sub(1);
    for (i, row) in rows.iter().enumerate() {
        if row.step % every != 0 && i != last {
            continue;
        }
        let value = row
            .state_value
            .map_or_else(|| "-".to_string(), |q| format!("{q:.2}"));
        println!(
            "{:>5} {:>7.2} {:>7} {:>8} {:>9} {:>9} {:>8.3} {:>8.3} {:>8.2}",
            row.step,
            row.time,
            row.state,
            value,
            row.agent_action.as_str(),
            row.opponent_action.as_str(),
            row.ball1_position,
            row.ball2_position,
            row.beam_angle
        );
    }

    if let Some(path) = &args.trace_csv {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        for row in &rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }

    let outcome = EpisodeOutcome::for_side(&result, side);
    print_subsection("Result");
    print_kv("Status", &format!("{:?}", result.status));
    print_kv("Agent outcome", &format!("{outcome:?}"));
    print_kv("Steps", &format_number(result.elapsed_steps as usize));
    print_kv("Time", &format!("{:.2}s", result.elapsed_time));

    Ok(())
}
