//! Action Space
//!
//! The agent controls one directional position with two actions.

use serde::{Deserialize, Serialize};

/// Number of discrete actions
pub const NUM_ACTIONS: usize = 2;

/// Discrete action chosen by the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    /// Go (or stay) short
    Sell = 0,
    /// Go (or stay) long
    Buy = 1,
}

impl Action {
    /// Convert from action index
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Sell),
            1 => Some(Self::Buy),
            _ => None,
        }
    }

    /// Convert to action index
    pub fn to_index(self) -> usize {
        self as usize
    }

    /// Every action, ordered by index
    pub const ALL: [Action; NUM_ACTIONS] = [Action::Sell, Action::Buy];

    /// Get all possible actions, ordered by index
    pub fn all() -> &'static [Action] {
        &Self::ALL
    }

    /// Whether taking this action from `position` closes the open exposure
    pub fn closes(self, position: Position) -> bool {
        matches!(
            (self, position),
            (Action::Buy, Position::Short) | (Action::Sell, Position::Long)
        )
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Sell => write!(f, "Sell"),
            Action::Buy => write!(f, "Buy"),
        }
    }
}

/// Directional exposure held by the trading engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Short,
    Long,
}

impl Position {
    pub fn opposite(self) -> Self {
        match self {
            Position::Short => Position::Long,
            Position::Long => Position::Short,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::Short => write!(f, "Short"),
            Position::Long => write!(f, "Long"),
        }
    }
}
