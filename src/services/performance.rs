//! Performance metrics over a closed-trade log.
//!
//! Every function is total: empty or single-element input yields zeros (or
//! the documented sentinel) instead of an error.

use crate::services::signals::indicators::math::{mean, std_sample};
use crate::types::{
    ClosedTrade, DrawdownReport, EquityPoint, PerformanceMetrics, TradeOutcome, WinLossStats,
};
use chrono::{Duration, Utc};
use tracing::debug;

/// Profit factor of a log with profits and no losses.
pub const PROFIT_FACTOR_UNBOUNDED: f64 = f64::INFINITY;

const TRADING_DAYS: f64 = 252.0;

pub struct PerformanceCalculator;

impl PerformanceCalculator {
    /// Percentage of trades closed as WIN.
    pub fn win_rate(trades: &[ClosedTrade]) -> f64 {
        if trades.is_empty() {
            return 0.0;
        }
        let wins = trades
            .iter()
            .filter(|t| t.outcome == TradeOutcome::Win)
            .count();
        wins as f64 / trades.len() as f64 * 100.0
    }

    /// Gross profit over gross loss, in P&L percentage points.
    pub fn profit_factor(trades: &[ClosedTrade]) -> f64 {
        let gross_profit: f64 = trades
            .iter()
            .map(|t| t.profit_loss_pct)
            .filter(|p| *p > 0.0)
            .sum();
        let gross_loss: f64 = trades
            .iter()
            .map(|t| t.profit_loss_pct)
            .filter(|p| *p < 0.0)
            .sum::<f64>()
            .abs();

        if gross_loss == 0.0 {
            return if gross_profit > 0.0 {
                PROFIT_FACTOR_UNBOUNDED
            } else {
                0.0
            };
        }
        gross_profit / gross_loss
    }

    fn excess_returns(returns: &[f64], risk_free_rate: f64) -> Vec<f64> {
        let daily_rf = risk_free_rate / TRADING_DAYS;
        returns.iter().map(|r| r - daily_rf).collect()
    }

    /// Annualized mean over sample deviation of excess returns.
    pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
        if returns.len() < 2 {
            return 0.0;
        }
        let excess = Self::excess_returns(returns, risk_free_rate);
        match std_sample(&excess) {
            Some(std) if std > 0.0 => mean(&excess) / std * TRADING_DAYS.sqrt(),
            _ => 0.0,
        }
    }

    /// Like Sharpe, with only the negative excess returns in the denominator.
    pub fn sortino_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
        if returns.len() < 2 {
            return 0.0;
        }
        let excess = Self::excess_returns(returns, risk_free_rate);
        let downside: Vec<f64> = excess.iter().copied().filter(|r| *r < 0.0).collect();
        match std_sample(&downside) {
            Some(std) if std > 0.0 => mean(&excess) / std * TRADING_DAYS.sqrt(),
            _ => 0.0,
        }
    }

    /// Deepest decline from a running maximum, as a (non-positive) percentage.
    pub fn max_drawdown(values: &[f64]) -> DrawdownReport {
        if values.len() < 2 {
            return DrawdownReport::default();
        }

        let mut running_max = f64::NEG_INFINITY;
        let mut trough_index = 0;
        let mut max_drawdown_pct = 0.0;
        for (i, &value) in values.iter().enumerate() {
            running_max = running_max.max(value);
            let drawdown = if running_max > 0.0 {
                (value - running_max) / running_max * 100.0
            } else {
                0.0
            };
            if drawdown < max_drawdown_pct {
                max_drawdown_pct = drawdown;
                trough_index = i;
            }
        }

        let mut peak_index = 0;
        for (i, &value) in values[..=trough_index].iter().enumerate() {
            if value > values[peak_index] {
                peak_index = i;
            }
        }

        let peak_value = values[peak_index];
        let trough_value = values[trough_index];
        DrawdownReport {
            max_drawdown_pct,
            max_drawdown_value: peak_value - trough_value,
            peak_value,
            trough_value,
            peak_index: Some(peak_index),
            trough_index: Some(trough_index),
            peak_date: None,
            trough_date: None,
        }
    }

    /// [`Self::max_drawdown`] over an equity curve, with peak and trough dates.
    pub fn max_drawdown_of_curve(curve: &[EquityPoint]) -> DrawdownReport {
        let values: Vec<f64> = curve.iter().map(|p| p.equity).collect();
        let mut report = Self::max_drawdown(&values);
        report.peak_date = report.peak_index.map(|i| curve[i].timestamp);
        report.trough_date = report.trough_index.map(|i| curve[i].timestamp);
        report
    }

    pub fn average_win_loss(trades: &[ClosedTrade]) -> WinLossStats {
        let wins: Vec<f64> = trades
            .iter()
            .map(|t| t.profit_loss_pct)
            .filter(|p| *p > 0.0)
            .collect();
        let losses: Vec<f64> = trades
            .iter()
            .map(|t| t.profit_loss_pct)
            .filter(|p| *p < 0.0)
            .map(f64::abs)
            .collect();

        let avg_win = mean(&wins);
        let avg_loss = mean(&losses);
        WinLossStats {
            avg_win,
            avg_loss,
            win_loss_ratio: if avg_loss > 0.0 { avg_win / avg_loss } else { 0.0 },
        }
    }

    /// Expected P&L percentage per trade.
    ///
    /// Wins and losses are split by the sign of the P&L, as in
    /// [`Self::average_win_loss`]; zero-P&L trades count toward neither side.
    pub fn expectancy(trades: &[ClosedTrade]) -> f64 {
        if trades.is_empty() {
            return 0.0;
        }
        let total = trades.len() as f64;
        let wins = trades.iter().filter(|t| t.profit_loss_pct > 0.0).count() as f64;
        let losses = trades.iter().filter(|t| t.profit_loss_pct < 0.0).count() as f64;
        let stats = Self::average_win_loss(trades);
        wins / total * stats.avg_win - losses / total * stats.avg_loss
    }

    /// Compounding equity curve in exit order.
    ///
    /// Each trade moves `position_size_pct` of the current equity by its P&L
    /// percentage. The curve opens one day before the first exit.
    pub fn build_equity_curve(trades: &[ClosedTrade], initial_capital: f64) -> Vec<EquityPoint> {
        let mut ordered: Vec<&ClosedTrade> = trades.iter().collect();
        ordered.sort_by_key(|t| t.exit_date);

        let Some(first) = ordered.first() else {
            return vec![EquityPoint {
                timestamp: Utc::now(),
                equity: initial_capital,
            }];
        };

        let mut curve = Vec::with_capacity(ordered.len() + 1);
        curve.push(EquityPoint {
            timestamp: first.exit_date - Duration::days(1),
            equity: initial_capital,
        });

        let mut equity = initial_capital;
        for trade in ordered {
            equity += equity * (trade.position_size_pct / 100.0) * (trade.profit_loss_pct / 100.0);
            curve.push(EquityPoint {
                timestamp: trade.exit_date,
                equity,
            });
        }
        curve
    }

    pub fn comprehensive_metrics(
        trades: &[ClosedTrade],
        initial_capital: f64,
        risk_free_rate: f64,
    ) -> PerformanceMetrics {
        if trades.is_empty() {
            return PerformanceMetrics::empty(initial_capital);
        }

        let returns: Vec<f64> = trades.iter().map(|t| t.profit_loss_pct).collect();
        let curve = Self::build_equity_curve(trades, initial_capital);
        let final_capital = curve.last().map(|p| p.equity).unwrap_or(initial_capital);
        let total_return_pct = if initial_capital > 0.0 {
            (final_capital - initial_capital) / initial_capital * 100.0
        } else {
            0.0
        };
        let stats = Self::average_win_loss(trades);

        debug!(
            "Metrics over {} trades: final capital {:.2}",
            trades.len(),
            final_capital
        );

        PerformanceMetrics {
            total_trades: trades.len(),
            win_rate: Self::win_rate(trades),
            total_return_pct,
            avg_return_per_trade: mean(&returns),
            best_trade: returns.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            worst_trade: returns.iter().copied().fold(f64::INFINITY, f64::min),
            profit_factor: Self::profit_factor(trades),
            sharpe_ratio: Self::sharpe_ratio(&returns, risk_free_rate),
            sortino_ratio: Self::sortino_ratio(&returns, risk_free_rate),
            max_drawdown_pct: Self::max_drawdown_of_curve(&curve).max_drawdown_pct,
            avg_win: stats.avg_win,
            avg_loss: stats.avg_loss,
            win_loss_ratio: stats.win_loss_ratio,
            expectancy: Self::expectancy(trades),
            total_profit: final_capital - initial_capital,
            final_capital,
        }
    }
}
