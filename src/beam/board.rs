//! Beam and two-ball physics

use serde::{Deserialize, Serialize};

use super::{
    action::{PlayerAction, Side},
    ball::BallState,
};

/// Tuning constants for the beam simulation
///
/// Horizontal quantities marked "per second" are scaled by the step's `dt`;
/// the remaining factors are applied once per step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConstants {
    /// Horizontal impulse per second of MoveLeft/MoveRight input
    pub move_speed: f64,
    /// Downhill acceleration per second at a 90 degree tilt
    pub beam_gravity_factor: f64,
    /// Per-step velocity retention while on the beam
    pub friction: f64,
    /// Maximum horizontal speed per second
    pub max_velocity: f64,
    /// Half-length of the beam in normalized units
    pub edge_position: f64,
    /// Torque contributed by a resting ball per unit of offset
    pub weight_coefficient: f64,
    /// Extra torque per unit of offset and landing impact
    pub impact_coefficient: f64,
    /// Per-step angle retention (pull back to level)
    pub beam_damping: f64,
    /// Tilt limit in degrees
    pub max_angle: f64,
    /// Per-step retention of landing impact
    pub impact_decay: f64,
    /// Landing impact per unit of vertical speed at touchdown
    pub landing_impact_scale: f64,
    /// Vertical launch velocity of a jump
    pub jump_velocity: f64,
    /// Vertical speed lost per step while airborne
    pub gravity: f64,
    /// Ball radius in normalized beam units
    pub ball_radius: f64,
    /// Fraction of the overlap each ball is pushed back on collision
    pub push_factor: f64,
    /// Fraction of the other ball's velocity taken on collision
    pub velocity_exchange: f64,
    /// Beam shake per unit of speed the first ball hands over on collision
    pub collision_impact: f64,
    /// Distance from center each ball starts at
    pub start_offset: f64,
}

impl Default for PhysicsConstants {
    fn default() -> Self {
        Self {
            move_speed: 0.18,
            beam_gravity_factor: 0.6,
            friction: 0.98,
            max_velocity: 1.2,
            edge_position: 1.0,
            weight_coefficient: 0.5,
            impact_coefficient: 0.3,
            beam_damping: 0.95,
            max_angle: BeamState::MAX_ANGLE,
            impact_decay: 0.8,
            landing_impact_scale: 15.0,
            jump_velocity: 0.25,
            gravity: 0.012,
            ball_radius: 0.045,
            push_factor: 0.25,
            velocity_exchange: 0.5,
            collision_impact: 1.0,
            start_offset: 0.3,
        }
    }
}

/// Tilt of the beam
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BeamState {
    /// Angle in degrees, positive tilts the right end down
    pub angle: f64,
}

impl BeamState {
    /// Default tilt limit in degrees
    pub const MAX_ANGLE: f64 = 40.0;

    /// Angle in radians
    pub fn radians(&self) -> f64 {
        self.angle.to_radians()
    }
}

/// Two balls on one beam, advanced in fixed or variable time steps
///
/// Given identical inputs and `dt` sequences the simulation is reproducible
/// bit for bit; it holds no randomness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsBoard {
    balls: [BallState; 2],
    beam: BeamState,
    constants: PhysicsConstants,
}

impl PhysicsBoard {
    /// Create a board at the starting layout with default constants
    pub fn new() -> Self {
        Self::with_constants(PhysicsConstants::default())
    }

    /// Create a board at the starting layout with custom constants
    pub fn with_constants(constants: PhysicsConstants) -> Self {
        let mut board = Self {
            balls: [BallState::default(); 2],
            beam: BeamState::default(),
            constants,
        };
        board.reset();
        board
    }

    /// Create a board from explicit ball and beam states
    ///
    /// The beam angle is clamped to the tilt limit.
    pub fn from_state(
        side_one: BallState,
        side_two: BallState,
        beam: BeamState,
        constants: PhysicsConstants,
    ) -> Self {
        let angle = beam.angle.clamp(-constants.max_angle, constants.max_angle);
        Self {
            balls: [side_one, side_two],
            beam: BeamState { angle },
            constants,
        }
    }

    /// Put side one left of center, side two right of center, beam level
    pub fn reset(&mut self) {
        let offset = self.constants.start_offset;
        self.balls = [BallState::at(-offset), BallState::at(offset)];
        self.beam = BeamState::default();
    }

    /// Ball controlled by `side`
    pub fn ball(&self, side: Side) -> &BallState {
        &self.balls[Self::index(side)]
    }

    /// Current beam state
    pub fn beam(&self) -> &BeamState {
        &self.beam
    }

    /// Physics constants in use
    pub fn constants(&self) -> &PhysicsConstants {
        &self.constants
    }

    /// Whether the ball of `side` has left the beam
    pub fn has_fallen(&self, side: Side) -> bool {
        self.ball(side).has_fallen
    }

    /// Advance the simulation by `dt` seconds with one input per side
    pub fn update(&mut self, side_one: PlayerAction, side_two: PlayerAction, dt: f64) {
        let constants = self.constants;

        Self::apply_input(&mut self.balls[0], side_one, dt, &constants);
        Self::apply_input(&mut self.balls[1], side_two, dt, &constants);

        self.update_beam();

        let angle = self.beam.radians();
        for ball in &mut self.balls {
            Self::integrate_ball(ball, angle, dt, &constants);
        }

        self.resolve_collision();
        self.check_falls();
    }

    fn index(side: Side) -> usize {
        match side {
            Side::One => 0,
            Side::Two => 1,
        }
    }

    fn apply_input(
        ball: &mut BallState,
        action: PlayerAction,
        dt: f64,
        constants: &PhysicsConstants,
    ) {
        if ball.has_fallen {
            return;
        }

        match action {
            PlayerAction::MoveLeft if ball.is_on_beam => {
                ball.velocity -= constants.move_speed * dt;
            }
            PlayerAction::MoveRight if ball.is_on_beam => {
                ball.velocity += constants.move_speed * dt;
            }
            PlayerAction::Jump => {
                ball.jump(constants.jump_velocity);
            }
            _ => {}
        }
    }

    fn update_beam(&mut self) {
        let c = &self.constants;
        let torque: f64 = self
            .balls
            .iter()
            .filter(|ball| ball.rests_on_beam())
            .map(|ball| {
                ball.position * c.weight_coefficient
                    + ball.position * ball.landing_impact * c.impact_coefficient
            })
            .sum();

        let angle = (self.beam.angle + torque) * c.beam_damping;
        self.beam.angle = angle.clamp(-c.max_angle, c.max_angle);
    }

    fn integrate_ball(ball: &mut BallState, angle: f64, dt: f64, c: &PhysicsConstants) {
        if ball.has_fallen {
            return;
        }

        ball.landing_impact *= c.impact_decay;

        if ball.is_airborne() {
            ball.vertical_velocity -= c.gravity;
            ball.vertical_position += ball.vertical_velocity;

            if ball.vertical_position <= 0.0 {
                ball.vertical_position = 0.0;
                ball.landing_impact = ball.vertical_velocity.abs() * c.landing_impact_scale;
                ball.vertical_velocity = 0.0;
                ball.is_on_beam = true;
            }
        }

        if ball.is_on_beam {
            ball.acceleration = angle.sin() * c.beam_gravity_factor * dt;
            ball.velocity += ball.acceleration;
            ball.velocity *= c.friction;

            let max_velocity = c.max_velocity * dt;
            ball.velocity = ball.velocity.clamp(-max_velocity, max_velocity);
        }

        // Velocity is already per-step; it carries through a jump
        ball.position += ball.velocity;
    }

    fn resolve_collision(&mut self) {
        let c = self.constants;
        let [first, second] = &mut self.balls;

        if !first.rests_on_beam() || !second.rests_on_beam() {
            return;
        }

        let distance = (first.position - second.position).abs();
        let collision_distance = c.ball_radius * 2.0;
        if distance >= collision_distance {
            return;
        }

        let push = (collision_distance - distance) * c.push_factor;
        if first.position < second.position {
            first.position -= push;
            second.position += push;
        } else {
            first.position += push;
            second.position -= push;
        }

        let first_velocity = first.velocity;
        first.velocity = second.velocity * c.velocity_exchange;
        second.velocity = first_velocity * c.velocity_exchange;

        // Measured after the exchange: the first ball's speed lost to the second
        let impact = (first_velocity - second.velocity).abs() * c.collision_impact;
        first.landing_impact += impact;
        second.landing_impact += impact;
    }

    fn check_falls(&mut self) {
        let edge = self.constants.edge_position;
        for ball in &mut self.balls {
            if !ball.has_fallen && ball.position.abs() > edge {
                ball.has_fallen = true;
                ball.is_on_beam = false;
            }
        }
    }
}

impl Default for PhysicsBoard {
    fn default() -> Self {
        Self::new()
    }
}
