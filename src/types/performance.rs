use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

/// Direction of the recommendation a trade was opened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSide {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeOutcome {
    Win,
    Loss,
    Breakeven,
}

impl TradeOutcome {
    /// WIN above +1%, LOSS below -1%, otherwise BREAKEVEN.
    pub fn from_pnl_pct(pnl_pct: f64) -> Self {
        if pnl_pct > 1.0 {
            Self::Win
        } else if pnl_pct < -1.0 {
            Self::Loss
        } else {
            Self::Breakeven
        }
    }
}

/// A closed trade as recorded by the recommendation tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosedTrade {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub entry_price: f64,
    pub exit_price: f64,
    pub position_size_pct: f64,
    pub exit_date: DateTime<Utc>,
    pub profit_loss_pct: f64,
    pub outcome: TradeOutcome,
}

impl ClosedTrade {
    /// Close a position and derive its P&L and outcome.
    pub fn close(
        side: TradeSide,
        entry_price: f64,
        exit_price: f64,
        position_size_pct: f64,
        exit_date: DateTime<Utc>,
    ) -> Self {
        let profit_loss_pct = if entry_price > 0.0 {
            match side {
                TradeSide::Buy => (exit_price - entry_price) / entry_price * 100.0,
                TradeSide::Sell => (entry_price - exit_price) / entry_price * 100.0,
                TradeSide::Hold => 0.0,
            }
        } else {
            0.0
        };

        Self {
            id: Uuid::new_v4(),
            symbol: None,
            entry_price,
            exit_price,
            position_size_pct,
            exit_date,
            profit_loss_pct,
            outcome: TradeOutcome::from_pnl_pct(profit_loss_pct),
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
}

/// Deepest peak-to-trough decline of an equity sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawdownReport {
    /// Zero or negative.
    pub max_drawdown_pct: f64,
    pub max_drawdown_value: f64,
    pub peak_value: f64,
    pub trough_value: f64,
    pub peak_index: Option<usize>,
    pub trough_index: Option<usize>,
    pub peak_date: Option<DateTime<Utc>>,
    pub trough_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WinLossStats {
    pub avg_win: f64,
    pub avg_loss: f64,
    pub win_loss_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub total_trades: usize,
    pub win_rate: f64,
    pub total_return_pct: f64,
    pub avg_return_per_trade: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
    #[serde(serialize_with = "serialize_unbounded")]
    pub profit_factor: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown_pct: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub win_loss_ratio: f64,
    pub expectancy: f64,
    pub total_profit: f64,
    pub final_capital: f64,
}

impl PerformanceMetrics {
    pub fn empty(initial_capital: f64) -> Self {
        Self {
            total_trades: 0,
            win_rate: 0.0,
            total_return_pct: 0.0,
            avg_return_per_trade: 0.0,
            best_trade: 0.0,
            worst_trade: 0.0,
            profit_factor: 0.0,
            sharpe_ratio: 0.0,
            sortino_ratio: 0.0,
            max_drawdown_pct: 0.0,
            avg_win: 0.0,
            avg_loss: 0.0,
            win_loss_ratio: 0.0,
            expectancy: 0.0,
            total_profit: 0.0,
            final_capital: initial_capital,
        }
    }
}

/// JSON has no infinity; render it as `"inf"`.
pub fn serialize_unbounded<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_infinite() {
        serializer.serialize_str(if *value > 0.0 { "inf" } else { "-inf" })
    } else {
        serializer.serialize_f64(*value)
    }
}
