//! Q-table implementation for temporal difference learning

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{beam::PlayerAction, types::StateKey};

/// Q-table mapping (state, action) pairs to Q-values
///
/// Absent pairs read as [`QTable::DEFAULT_VALUE`]. The table only grows while
/// learning; [`QTable::clear`] is the single way to shrink it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<QEntry>", into = "Vec<QEntry>")]
pub struct QTable {
    /// Q-values: (state, action) -> Q-value
    q_values: HashMap<(StateKey, PlayerAction), f64>,
}

impl QTable {
    /// Value of every unseen state-action pair
    pub const DEFAULT_VALUE: f64 = 0.0;

    /// Create an empty Q-table
    pub fn new() -> Self {
        Self::default()
    }

    /// Get Q-value for a state-action pair
    pub fn get(&self, state: &StateKey, action: PlayerAction) -> f64 {
        self.q_values
            .get(&(*state, action))
            .copied()
            .unwrap_or(Self::DEFAULT_VALUE)
    }

    /// Stored Q-value, `None` if the pair was never written
    pub fn stored(&self, state: &StateKey, action: PlayerAction) -> Option<f64> {
        self.q_values.get(&(*state, action)).copied()
    }

    /// Set Q-value for a state-action pair
    pub fn set(&mut self, state: StateKey, action: PlayerAction, value: f64) {
        self.q_values.insert((state, action), value);
    }

    /// Get maximum Q-value over all actions in a state
    pub fn max_q(&self, state: &StateKey) -> f64 {
        PlayerAction::ALL
            .iter()
            .map(|&action| self.get(state, action))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Maximum over the actions actually stored for `state`, 0 when none are
    pub fn max_stored_q(&self, state: &StateKey) -> f64 {
        PlayerAction::ALL
            .iter()
            .filter_map(|&action| self.stored(state, action))
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    /// Select greedy action (highest Q-value)
    ///
    /// Ties go to the earliest action in [`PlayerAction::ALL`].
    pub fn greedy_action(&self, state: &StateKey) -> PlayerAction {
        let mut best = PlayerAction::ALL[0];
        let mut best_q = self.get(state, best);
        for &action in &PlayerAction::ALL[1..] {
            let q = self.get(state, action);
            if q > best_q {
                best = action;
                best_q = q;
            }
        }
        best
    }

    /// Move Q(s,a) a fraction `learning_rate` of the way toward `target`
    ///
    /// Q(s,a) ← Q(s,a) + α[target - Q(s,a)]
    pub fn update_toward(
        &mut self,
        state: StateKey,
        action: PlayerAction,
        target: f64,
        learning_rate: f64,
    ) {
        let current_q = self.get(&state, action);
        let new_q = current_q + learning_rate * (target - current_q);
        self.set(state, action, new_q);
    }

    /// Action values for a state, in enumeration order
    pub fn action_values(&self, state: &StateKey) -> Vec<(PlayerAction, f64)> {
        PlayerAction::ALL
            .iter()
            .map(|&action| (action, self.get(state, action)))
            .collect()
    }

    /// Stored entries sorted by state then action
    pub fn entries(&self) -> Vec<(StateKey, PlayerAction, f64)> {
        let mut entries: Vec<_> = self
            .q_values
            .iter()
            .map(|(&(state, action), &value)| (state, action, value))
            .collect();
        entries.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        entries
    }

    /// Remove every stored value
    pub fn clear(&mut self) {
        self.q_values.clear();
    }

    /// Number of distinct states with at least one stored value
    pub fn state_count(&self) -> usize {
        self.q_values
            .keys()
            .map(|(state, _)| state)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Get total number of Q-values stored
    pub fn size(&self) -> usize {
        self.q_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q_values.is_empty()
    }
}

/// One stored value, the serialized unit of a [`QTable`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QEntry {
    pub state: StateKey,
    pub action: PlayerAction,
    pub value: f64,
}

impl From<Vec<QEntry>> for QTable {
    fn from(entries: Vec<QEntry>) -> Self {
        entries
            .into_iter()
            .map(|entry| (entry.state, entry.action, entry.value))
            .collect()
    }
}

impl From<QTable> for Vec<QEntry> {
    fn from(table: QTable) -> Self {
        table
            .entries()
            .into_iter()
            .map(|(state, action, value)| QEntry {
                state,
                action,
                value,
            })
            .collect()
    }
}

impl FromIterator<(StateKey, PlayerAction, f64)> for QTable {
    fn from_iter<I: IntoIterator<Item = (StateKey, PlayerAction, f64)>>(iter: I) -> Self {
        let mut table = QTable::new();
        for (state, action, value) in iter {
            table.set(state, action, value);
        }
        table
    }
}
