//! Property-style checks of the beam physics and episode engine

use rand::{Rng, SeedableRng, rngs::StdRng};
use teeter::{
    BallState, BeamState, EngineConfig, EpisodeEngine, EpisodeStatus, PhysicsBoard, PlayerAction,
    Side,
};

fn random_action(rng: &mut StdRng) -> PlayerAction {
    PlayerAction::ALL[rng.random_range(0..PlayerAction::ALL.len())]
}

#[test]
fn test_positions_stay_on_beam_until_fall() {
    let mut rng = StdRng::seed_from_u64(2024);

    for _ in 0..40 {
        let mut board = PhysicsBoard::new();
        let mut fallen = [false, false];

        for _ in 0..600 {
            board.update(random_action(&mut rng), random_action(&mut rng), 0.0167);

            for (i, side) in [Side::One, Side::Two].into_iter().enumerate() {
                let ball = board.ball(side);
                if fallen[i] {
                    assert!(ball.has_fallen, "fall must be permanent until reset");
                }
                if !ball.has_fallen {
                    assert!(ball.position.abs() <= 1.0, "position {}", ball.position);
                } else {
                    assert!(!ball.is_on_beam);
                }
                fallen[i] = ball.has_fallen;
            }
        }
    }
}

#[test]
fn test_beam_angle_is_bounded() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut board = PhysicsBoard::new();
    let limit = board.constants().max_angle;

    for step in 0..5000 {
        // Long pushes in one direction load the beam as hard as possible
        let action = if (step / 200) % 2 == 0 {
            PlayerAction::MoveRight
        } else {
            random_action(&mut rng)
        };
        board.update(action, action, 0.0167);
        assert!(board.beam().angle.abs() <= limit);
        if board.has_fallen(Side::One) && board.has_fallen(Side::Two) {
            board.reset();
        }
    }
}

#[test]
fn test_identical_inputs_reproduce_identical_states() {
    let mut rng = StdRng::seed_from_u64(99);
    let actions: Vec<_> = (0..900)
        .map(|_| (random_action(&mut rng), random_action(&mut rng)))
        .collect();

    let mut a = PhysicsBoard::new();
    let mut b = PhysicsBoard::new();
    for &(one, two) in &actions {
        a.update(one, two, 0.0167);
        b.update(one, two, 0.0167);
    }
    assert_eq!(a, b);
}

#[test]
fn test_first_idle_step_barely_moves_the_balls() {
    let mut engine = EpisodeEngine::new();
    let before = [engine.ball(Side::One).position, engine.ball(Side::Two).position];
    assert_eq!(before, [-0.3, 0.3]);

    engine.step(PlayerAction::None, PlayerAction::None);

    assert!((engine.ball(Side::One).position - before[0]).abs() < 1e-9);
    assert!((engine.ball(Side::Two).position - before[1]).abs() < 1e-9);
    assert_eq!(engine.result().status, EpisodeStatus::InProgress);
}

#[test]
fn test_result_becomes_terminal_exactly_once() {
    let mut rng = StdRng::seed_from_u64(5);

    for _ in 0..20 {
        let mut engine = EpisodeEngine::with_config(EngineConfig {
            max_steps: 400,
            ..EngineConfig::default()
        });
        assert_eq!(engine.result().status, EpisodeStatus::InProgress);

        let mut steps = 0;
        while !engine.result().is_terminal() {
            engine.step(random_action(&mut rng), random_action(&mut rng));
            steps += 1;
            assert!(steps <= 400);
        }

        let result = engine.result();
        match result.status {
            EpisodeStatus::Side1Wins => {
                assert_eq!(result.winner, Some(Side::One));
                assert!(engine.board().has_fallen(Side::Two));
                assert!(!engine.board().has_fallen(Side::One));
            }
            EpisodeStatus::Side2Wins => {
                assert_eq!(result.winner, Some(Side::Two));
                assert!(engine.board().has_fallen(Side::One));
            }
            EpisodeStatus::BothFell => {
                assert_eq!(result.winner, None);
                assert!(engine.board().has_fallen(Side::One));
                assert!(engine.board().has_fallen(Side::Two));
            }
            EpisodeStatus::TimeExpired => assert_eq!(result.elapsed_steps, 400),
            EpisodeStatus::InProgress => unreachable!(),
        }

        engine.reset();
        assert_eq!(engine.result().status, EpisodeStatus::InProgress);
        assert_eq!(engine.elapsed_steps(), 0);
    }
}

#[test]
fn test_both_fallen_dominates() {
    let mut engine = EpisodeEngine::from_state(
        EngineConfig::default(),
        BallState::moving(-0.99, -0.5),
        BallState::moving(0.99, 0.5),
        BeamState::default(),
    );

    for _ in 0..100 {
        if engine.result().is_terminal() {
            break;
        }
        engine.step(PlayerAction::MoveLeft, PlayerAction::MoveRight);
    }

    assert!(engine.board().has_fallen(Side::One));
    assert!(engine.board().has_fallen(Side::Two));
    let result = engine.result();
    assert_eq!(result.status, EpisodeStatus::BothFell);
    assert_eq!(result.winner, None);
}
