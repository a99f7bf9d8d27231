//! Profit Reconciliation
//!
//! Recomputes realized profit without any transaction-fee model.
//!
//! Total profit is treated as a share count bought at the last trade price
//! and revalued at the current price whenever a Long position is closed or
//! the episode truncates while Long. Closing a Short leaves total profit
//! untouched: short-side profit is not reconciled.

use super::action::{Action, Position};

/// Information needed to reconcile profit after a step
#[derive(Debug, Clone, Copy)]
pub struct ProfitTransition {
    /// Action the agent took
    pub action: Action,
    /// Position held before the action was applied
    pub position: Position,
    /// Price at the tick the action lands on
    pub current_price: f64,
    /// Price at the last trade tick
    pub last_trade_price: f64,
    /// Whether this step ends the episode by truncation
    pub truncated: bool,
    /// Total profit before this step
    pub total_profit: f64,
}

/// Return the total profit after this step
pub fn reconcile_profit(t: &ProfitTransition) -> f64 {
    let trade = t.action.closes(t.position);

    if (trade || t.truncated) && t.position == Position::Long {
        let shares = t.total_profit / t.last_trade_price;
        return shares * t.current_price;
    }

    t.total_profit
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition(action: Action, position: Position, truncated: bool) -> ProfitTransition {
        ProfitTransition {
            action,
            position,
            current_price: 120.0,
            last_trade_price: 100.0,
            truncated,
            total_profit: 1.0,
        }
    }

    #[test]
    fn test_closing_long_revalues_profit() {
        let profit = reconcile_profit(&transition(Action::Sell, Position::Long, false));
        assert!((profit - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_truncation_while_long_revalues_profit() {
        let profit = reconcile_profit(&transition(Action::Buy, Position::Long, true));
        assert!((profit - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_holding_long_keeps_profit() {
        let profit = reconcile_profit(&transition(Action::Buy, Position::Long, false));
        assert_eq!(profit, 1.0);
    }

    #[test]
    fn test_short_closure_is_not_reconciled() {
        // Documented asymmetry: only Long closures revalue profit
        let closing = reconcile_profit(&transition(Action::Buy, Position::Short, false));
        assert_eq!(closing, 1.0);

        let truncated = reconcile_profit(&transition(Action::Sell, Position::Short, true));
        assert_eq!(truncated, 1.0);
    }
}
