use crate::solver::IrrResult;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A comprehensive, standardized report of a projection's bank-grade
/// indicators.
///
/// This struct is the final output of the `ValuationAnalyzer` and serves as
/// the data transfer object for valuation results throughout the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationReport {
    // I. Discounted metrics
    /// Net present value of the monthly cash flows at the configured WACC.
    pub npv: Decimal,
    /// Internal rate of return with its convergence flag.
    pub irr: IrrResult,
    /// Months until the discounted cash flows recover the initial
    /// investment; the horizon length when they never do.
    pub discounted_payback_months: u32,

    // II. Timing metrics (1-based month indices)
    /// First month the running cash-flow sum turns positive; the horizon
    /// length when it never does.
    pub payback_months: u32,
    /// First month cumulative net income turns positive; the horizon length
    /// when it never does.
    pub break_even_month: u32,
    /// First month with a positive cash balance, if any.
    pub cash_generation_start: Option<u32>,

    // III. Ratios (unweighted means across all months)
    pub gross_margin_avg_pct: Decimal,
    pub ebitda_margin_avg_pct: Decimal,
    pub debt_to_equity_avg: Decimal,
    pub current_ratio_avg: Decimal,
    /// Minimum debt service coverage ratio across debt-service months;
    /// `None` for a project that carries no debt.
    pub dscr_min: Option<Decimal>,

    // IV. Cash metrics
    /// Deepest negative cash balance, as a positive funding requirement.
    pub peak_funding_need: Decimal,
    /// Net profit over total costs, in percent; 0 when there are no costs.
    pub roi_pct: Decimal,
}

impl ValuationReport {
    /// Creates a new, zeroed-out ValuationReport.
    pub fn new() -> Self {
        Self {
            npv: Decimal::ZERO,
            irr: IrrResult {
                rate_pct: 0.0,
                converged: false,
                iterations: 0,
            },
            discounted_payback_months: 0,
            payback_months: 0,
            break_even_month: 0,
            cash_generation_start: None,
            gross_margin_avg_pct: Decimal::ZERO,
            ebitda_margin_avg_pct: Decimal::ZERO,
            debt_to_equity_avg: Decimal::ZERO,
            current_ratio_avg: Decimal::ZERO,
            dscr_min: None,
            peak_funding_need: Decimal::ZERO,
            roi_pct: Decimal::ZERO,
        }
    }
}

impl Default for ValuationReport {
    fn default() -> Self {
        Self::new()
    }
}
