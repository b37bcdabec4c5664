use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// The root configuration structure for the entire application.
///
/// Every section has documented defaults, so a missing `config.toml` yields a
/// fully usable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub valuation: ValuationSettings,
    #[serde(default)]
    pub risk: RiskSettings,
    #[serde(default)]
    pub scenarios: ScenarioSettings,
}

/// Parameters for discounting and the IRR root-finder.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValuationSettings {
    /// Weighted average cost of capital, annual, in percent. Default 12%.
    pub wacc_pct: Decimal,
    /// Initial guess handed to the IRR solver, annual, in percent.
    pub irr_initial_guess_pct: Decimal,
    /// The solver stops once |NPV| falls below this value.
    pub irr_tolerance: f64,
    /// Hard cap on Newton-Raphson iterations.
    pub irr_max_iterations: u32,
}

impl Default for ValuationSettings {
    fn default() -> Self {
        Self {
            wacc_pct: dec!(12),
            irr_initial_guess_pct: dec!(12),
            irr_tolerance: 0.01,
            irr_max_iterations: 100,
        }
    }
}

/// Thresholds for the risk classifier and the alert stream.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    /// DSCR below this is a medium indicator (and a dashboard warning).
    pub dscr_warning_threshold: Decimal,
    /// DSCR below this is a high indicator.
    pub dscr_critical_threshold: Decimal,
    /// Share of loss-making months above which risk is medium.
    pub loss_month_warning_share: Decimal,
    /// Share of loss-making months above which risk is high.
    pub loss_month_critical_share: Decimal,
    /// Consecutive loss months that trigger the loss-streak alert.
    pub loss_streak_alert_months: u32,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            dscr_warning_threshold: dec!(1.2),
            dscr_critical_threshold: dec!(1.0),
            loss_month_warning_share: dec!(0.5),
            loss_month_critical_share: dec!(0.8),
            loss_streak_alert_months: 3,
        }
    }
}

/// Factor sets used for the standard sensitivity comparison.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScenarioSettings {
    /// Revenue multiplier of the generated "optimistic" scenario.
    pub optimistic_revenue_factor: Decimal,
    /// Revenue multiplier of the generated "pessimistic" scenario.
    pub pessimistic_revenue_factor: Decimal,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            optimistic_revenue_factor: dec!(1.2),
            pessimistic_revenue_factor: dec!(0.8),
        }
    }
}
