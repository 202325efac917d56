//! Newtype wrappers for improved type safety and domain modeling.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Number of position zones along the beam.
pub const ZONE_COUNT: u8 = 5;

/// Number of velocity direction bins.
pub const VELOCITY_BINS: u8 = 3;

/// Number of danger levels.
pub const DANGER_LEVELS: u8 = 3;

/// Discretized ball state used to index the Q-table.
///
/// A key is the composite of three independent bins:
/// - zone: 0 (far left) to 4 (far right)
/// - velocity direction: 0 (moving left), 1 (stopped), 2 (moving right)
/// - danger: 0 (safe), 1 (caution), 2 (danger)
///
/// Its text form is `zone_velocity_danger`, e.g. `2_1_0` for a resting ball
/// at the center. The text form never contains `|`, so it can be written
/// directly into the pipe-delimited table format.
///
/// # Examples
///
/// ```
/// use teeter::types::StateKey;
///
/// let key: StateKey = "2_1_0".parse().unwrap();
/// assert_eq!(key.zone(), 2);
/// assert_eq!(key.to_string(), "2_1_0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StateKey {
    zone: u8,
    velocity: u8,
    danger: u8,
}

impl StateKey {
    /// Create a key, validating each bin is in range.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidStateKey`] if any bin is out of range.
    pub fn new(zone: u8, velocity: u8, danger: u8) -> Result<Self, crate::Error> {
        if zone < ZONE_COUNT && velocity < VELOCITY_BINS && danger < DANGER_LEVELS {
            Ok(Self {
                zone,
                velocity,
                danger,
            })
        } else {
            Err(crate::Error::InvalidStateKey {
                key: format!("{zone}_{velocity}_{danger}"),
            })
        }
    }

    /// Create from bins already known to be in range.
    pub(crate) const fn from_bins(zone: u8, velocity: u8, danger: u8) -> Self {
        Self {
            zone,
            velocity,
            danger,
        }
    }

    pub fn zone(&self) -> u8 {
        self.zone
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    pub fn danger(&self) -> u8 {
        self.danger
    }

    /// Every key the discretizer can produce.
    pub fn all() -> impl Iterator<Item = StateKey> {
        (0..ZONE_COUNT).flat_map(|zone| {
            (0..VELOCITY_BINS).flat_map(move |velocity| {
                (0..DANGER_LEVELS).map(move |danger| Self::from_bins(zone, velocity, danger))
            })
        })
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.zone, self.velocity, self.danger)
    }
}

impl FromStr for StateKey {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || crate::Error::InvalidStateKey { key: s.to_string() };

        let mut parts = s.split('_');
        let mut next_bin = || -> Result<u8, crate::Error> {
            parts
                .next()
                .and_then(|part| part.parse::<u8>().ok())
                .ok_or_else(invalid)
        };

        let zone = next_bin()?;
        let velocity = next_bin()?;
        let danger = next_bin()?;
        if parts.next().is_some() {
            return Err(invalid());
        }

        Self::new(zone, velocity, danger).map_err(|_| invalid())
    }
}

impl TryFrom<String> for StateKey {
    type Error = crate::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StateKey> for String {
    fn from(key: StateKey) -> Self {
        key.to_string()
    }
}
