//! Action-Value Table
//!
//! Sparse Q-table keyed by discrete state. Entries are created zeroed on first
//! visit and kept in visit order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::rl::core::{Action, DiscreteState, NUM_ACTIONS};

/// Action values of one state, indexed by [`Action::to_index`]
pub type ActionValues = [f64; NUM_ACTIONS];

/// One row of the table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QEntry {
    pub state: DiscreteState,
    pub values: ActionValues,
}

/// Insertion-ordered sparse Q-table
#[derive(Debug, Clone, Default)]
pub struct QTable {
    index: HashMap<DiscreteState, usize>,
    entries: Vec<QEntry>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a zeroed row for `state` unless one exists; returns its index
    pub fn ensure(&mut self, state: DiscreteState) -> usize {
        if let Some(&idx) = self.index.get(&state) {
            return idx;
        }
        let idx = self.entries.len();
        self.entries.push(QEntry {
            state,
            values: [0.0; NUM_ACTIONS],
        });
        self.index.insert(state, idx);
        idx
    }

    pub fn get(&self, state: &DiscreteState) -> Option<&ActionValues> {
        self.index.get(state).map(|&idx| &self.entries[idx].values)
    }

    pub fn contains(&self, state: &DiscreteState) -> bool {
        self.index.contains_key(state)
    }

    /// Greedy action; ties go to the lowest action index
    pub fn best_action(&self, state: &DiscreteState) -> Action {
        let values = self.get(state).copied().unwrap_or([0.0; NUM_ACTIONS]);
        argmax(&values)
    }

    /// Largest action value of `state`, zero for unseen states
    pub fn max_value(&self, state: &DiscreteState) -> f64 {
        self.get(state)
            .map(|values| values.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            .unwrap_or(0.0)
    }

    /// Bellman update: `Q[s][a] = (1-α)Q[s][a] + α(r + γ max Q[s'])`
    ///
    /// Both states are materialized first. Returns the new value.
    pub fn update(
        &mut self,
        state: DiscreteState,
        action: Action,
        reward: f64,
        next_state: DiscreteState,
        learning_rate: f64,
        discount_factor: f64,
    ) -> f64 {
        let idx = self.ensure(state);
        self.ensure(next_state);

        let target = reward + discount_factor * self.max_value(&next_state);
        let slot = &mut self.entries[idx].values[action.to_index()];
        *slot = (1.0 - learning_rate) * *slot + learning_rate * target;
        *slot
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rows in first-visit order
    pub fn entries(&self) -> &[QEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &QEntry> {
        self.entries.iter()
    }
}

fn argmax(values: &ActionValues) -> Action {
    let mut best = Action::ALL[0];
    for action in Action::ALL.into_iter().skip(1) {
        if values[action.to_index()] > values[best.to_index()] {
            best = action;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(trend: u8) -> DiscreteState {
        DiscreteState::new(trend, 0, 0, 0.25, 0)
    }

    #[test]
    fn test_lazy_zero_init() {
        let mut table = QTable::new();
        assert!(table.is_empty());
        assert!(table.get(&s(0)).is_none());

        let idx = table.ensure(s(0));
        assert_eq!(idx, 0);
        assert_eq!(table.get(&s(0)), Some(&[0.0, 0.0]));
        assert_eq!(table.ensure(s(0)), 0);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_ties_resolve_to_sell() {
        let mut table = QTable::new();
        table.ensure(s(0));
        assert_eq!(table.best_action(&s(0)), Action::Sell);
        assert_eq!(table.best_action(&s(1)), Action::Sell);

        table.update(s(0), Action::Buy, 1.0, s(1), 0.5, 0.9);
        assert_eq!(table.best_action(&s(0)), Action::Buy);
    }

    #[test]
    fn test_argmax_over_negative_rows() {
        assert_eq!(argmax(&[-1.0, -0.5]), Action::Buy);
        assert_eq!(argmax(&[-0.5, -1.0]), Action::Sell);
        assert_eq!(argmax(&[-0.5, -0.5]), Action::Sell);
    }

    #[test]
    fn test_zero_learning_rate_is_idempotent() {
        let mut table = QTable::new();
        table.update(s(0), Action::Sell, 4.0, s(1), 1.0, 0.0);
        table.update(s(1), Action::Buy, 10.0, s(1), 1.0, 0.0);
        let before = *table.get(&s(0)).unwrap();

        for reward in [-100.0, 0.0, 55.5] {
            let v = table.update(s(0), Action::Sell, reward, s(1), 0.0, 0.9);
            assert_eq!(v, before[0]);
        }
        assert_eq!(table.get(&s(0)), Some(&before));
    }

    #[test]
    fn test_bellman_update_value() {
        let mut table = QTable::new();
        table.update(s(1), Action::Buy, 2.0, s(1), 1.0, 0.0);

        // 0.5 * 0 + 0.5 * (1 + 0.5 * 2)
        let v = table.update(s(0), Action::Sell, 1.0, s(1), 0.5, 0.5);
        assert_eq!(v, 1.0);
        assert_eq!(table.max_value(&s(0)), 1.0);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut table = QTable::new();
        table.update(s(1), Action::Sell, 0.0, s(0), 0.1, 0.1);
        table.ensure(s(1));

        let order: Vec<u8> = table.iter().map(|e| e.state.trend).collect();
        assert_eq!(order, vec![1, 0]);
    }
}
