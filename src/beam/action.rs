//! Discrete player inputs and side identifiers

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// One of the two competitors on the beam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// Starts left of center
    One,
    /// Starts right of center
    Two,
}

impl Side {
    /// Get the other side
    pub fn opponent(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::One => write!(f, "1"),
            Side::Two => write!(f, "2"),
        }
    }
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "one" | "p1" | "player1" | "left" => Ok(Side::One),
            "2" | "two" | "p2" | "player2" | "right" => Ok(Side::Two),
            _ => Err(Error::InvalidSide {
                value: value.to_string(),
            }),
        }
    }
}

/// Player input for a single physics step
///
/// The declaration order is the fixed enumeration order used to break ties
/// between equal Q-values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerAction {
    MoveLeft,
    MoveRight,
    Jump,
    None,
}

impl PlayerAction {
    /// All actions in enumeration order
    pub const ALL: [PlayerAction; 4] = [
        PlayerAction::MoveLeft,
        PlayerAction::MoveRight,
        PlayerAction::Jump,
        PlayerAction::None,
    ];

    /// Name used in persisted Q-tables
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerAction::MoveLeft => "MoveLeft",
            PlayerAction::MoveRight => "MoveRight",
            PlayerAction::Jump => "Jump",
            PlayerAction::None => "None",
        }
    }

    /// Horizontal move that pushes a ball at `position` back toward center
    pub fn toward_center(position: f64) -> PlayerAction {
        if position > 0.0 {
            PlayerAction::MoveLeft
        } else {
            PlayerAction::MoveRight
        }
    }

    /// Horizontal move that opposes the given velocity
    pub fn against(velocity: f64) -> PlayerAction {
        if velocity > 0.0 {
            PlayerAction::MoveLeft
        } else {
            PlayerAction::MoveRight
        }
    }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayerAction {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        PlayerAction::ALL
            .into_iter()
            .find(|action| action.as_str() == name)
            .ok_or_else(|| Error::InvalidAction {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names_parse_back() {
        for action in PlayerAction::ALL {
            assert_eq!(action.as_str().parse::<PlayerAction>().unwrap(), action);
        }
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        assert!(matches!(
            "Dance".parse::<PlayerAction>(),
            Err(Error::InvalidAction { .. })
        ));
        assert!("moveleft".parse::<PlayerAction>().is_err());
    }

    #[test]
    fn test_toward_center() {
        assert_eq!(PlayerAction::toward_center(0.9), PlayerAction::MoveLeft);
        assert_eq!(PlayerAction::toward_center(-0.9), PlayerAction::MoveRight);
    }

    #[test]
    fn test_side_parsing() {
        assert_eq!("1".parse::<Side>().unwrap(), Side::One);
        assert_eq!("P2".parse::<Side>().unwrap(), Side::Two);
        assert!("3".parse::<Side>().is_err());
        assert_eq!(Side::One.opponent(), Side::Two);
    }
}
