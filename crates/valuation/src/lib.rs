//! # Valuation Analyzer
//!
//! Derives bank-grade indicators (NPV, IRR, payback, coverage and margin
//! ratios, funding need) from a computed monthly series. This is a pure
//! logic crate: it consumes the series, it never produces or stores one.

use configuration::ValuationSettings;
use core_types::{Loan, MonthlyFinancialOutput};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

// Declare the modules that constitute this crate.
pub mod error;
pub mod report;
pub mod solver;

// Re-export the key components to create a clean, public-facing API.
pub use error::ValuationError;
pub use report::ValuationReport;
pub use solver::{IrrResult, IrrSolverConfig};

/// A stateless analyzer deriving profitability and risk indicators from a
/// monthly financial series.
#[derive(Debug, Clone)]
pub struct ValuationAnalyzer {
    settings: ValuationSettings,
}

impl ValuationAnalyzer {
    /// Creates a new `ValuationAnalyzer` with the given valuation settings.
    pub fn new(settings: ValuationSettings) -> Self {
        Self { settings }
    }

    /// The main entry point for deriving valuation metrics.
    ///
    /// # Arguments
    ///
    /// * `series` - The full monthly series, in chronological order.
    /// * `loans` - The project's loans, used to derive outstanding principal.
    /// * `initial_investment` - The externally supplied outlay the discounted
    ///   payback is measured against.
    pub fn analyze(
        &self,
        series: &[MonthlyFinancialOutput],
        loans: &[Loan],
        initial_investment: Decimal,
    ) -> Result<ValuationReport, ValuationError> {
        if series.is_empty() {
            return Err(ValuationError::NotEnoughData(
                "the monthly series is empty".to_string(),
            ));
        }

        let mut report = ValuationReport::new();
        let cash_flows: Vec<f64> = series
            .iter()
            .map(|row| row.cash_flow.to_f64().unwrap_or(0.0))
            .collect();

        self.calculate_discounted_metrics(&cash_flows, initial_investment, &mut report);
        self.calculate_timing_metrics(series, &mut report);
        self.calculate_ratios(series, loans, &mut report);
        self.calculate_cash_metrics(series, &mut report);

        Ok(report)
    }

    /// NPV at the configured WACC, the IRR solve, and the discounted payback.
    fn calculate_discounted_metrics(
        &self,
        cash_flows: &[f64],
        initial_investment: Decimal,
        report: &mut ValuationReport,
    ) {
        let wacc = self.settings.wacc_pct.to_f64().unwrap_or(12.0) / 100.0;

        let npv = solver::npv(cash_flows, wacc);
        report.npv = Decimal::from_f64(npv).unwrap_or(Decimal::ZERO).round_dp(2);

        let config = IrrSolverConfig {
            initial_guess: self.settings.irr_initial_guess_pct.to_f64().unwrap_or(12.0) / 100.0,
            tolerance: self.settings.irr_tolerance,
            max_iterations: self.settings.irr_max_iterations,
        };
        report.irr = solver::solve_irr(cash_flows, &config);

        // Discounted payback: first month the discounted running sum covers
        // the initial investment; horizon length when it never does.
        let target = initial_investment.to_f64().unwrap_or(0.0);
        let monthly = 1.0 + wacc / 12.0;
        let mut discounted_sum = 0.0;
        report.discounted_payback_months = cash_flows.len() as u32;
        for (i, cf) in cash_flows.iter().enumerate() {
            discounted_sum += cf / monthly.powi(i as i32 + 1);
            if discounted_sum - target > 0.0 {
                report.discounted_payback_months = i as u32 + 1;
                break;
            }
        }
    }

    /// Payback, break-even and cash-generation start, with the horizon
    /// length as the never-reached sentinel for the first two.
    fn calculate_timing_metrics(
        &self,
        series: &[MonthlyFinancialOutput],
        report: &mut ValuationReport,
    ) {
        let horizon = series.len() as u32;

        report.payback_months = horizon;
        let mut running_cash_flow = Decimal::ZERO;
        for (i, row) in series.iter().enumerate() {
            running_cash_flow += row.cash_flow;
            if running_cash_flow > Decimal::ZERO {
                report.payback_months = i as u32 + 1;
                break;
            }
        }

        report.break_even_month = horizon;
        let mut cumulative_net_income = Decimal::ZERO;
        for (i, row) in series.iter().enumerate() {
            cumulative_net_income += row.net_income;
            if cumulative_net_income > Decimal::ZERO {
                report.break_even_month = i as u32 + 1;
                break;
            }
        }

        report.cash_generation_start = series
            .iter()
            .position(|row| row.cash_balance > Decimal::ZERO)
            .map(|i| i as u32 + 1);
    }

    /// Margin, leverage and coverage ratios as plain unweighted means across
    /// all months; months of very different revenue weigh the same, a
    /// simplification the callers of this report rely on.
    fn calculate_ratios(
        &self,
        series: &[MonthlyFinancialOutput],
        loans: &[Loan],
        report: &mut ValuationReport,
    ) {
        let months = Decimal::from(series.len());
        let mut gross_margin_sum = Decimal::ZERO;
        let mut ebitda_margin_sum = Decimal::ZERO;
        let mut debt_to_equity_sum = Decimal::ZERO;
        let mut current_ratio_sum = Decimal::ZERO;
        let mut cumulative_net_income = Decimal::ZERO;
        let mut dscr_min: Option<Decimal> = None;

        for row in series {
            gross_margin_sum += row.gross_margin_pct;

            if !row.revenue.is_zero() {
                ebitda_margin_sum += row.ebitda / row.revenue * Decimal::ONE_HUNDRED;
            }

            cumulative_net_income += row.net_income;
            let outstanding = outstanding_debt(loans, row);
            if cumulative_net_income > Decimal::ZERO {
                debt_to_equity_sum += outstanding / cumulative_net_income;
            }

            let current_liabilities = row.opex_total + row.loan_payments;
            if !current_liabilities.is_zero() {
                current_ratio_sum += row.cash_balance / current_liabilities;
            }

            if row.loan_payments > Decimal::ZERO {
                let dscr = row.ebitda / row.loan_payments;
                dscr_min = Some(match dscr_min {
                    Some(current) => current.min(dscr),
                    None => dscr,
                });
            }
        }

        report.gross_margin_avg_pct = (gross_margin_sum / months).round_dp(2);
        report.ebitda_margin_avg_pct = (ebitda_margin_sum / months).round_dp(2);
        report.debt_to_equity_avg = (debt_to_equity_sum / months).round_dp(2);
        report.current_ratio_avg = (current_ratio_sum / months).round_dp(2);
        report.dscr_min = dscr_min.map(|d| d.round_dp(2));
    }

    /// Peak funding need, and ROI as net profit over total costs.
    fn calculate_cash_metrics(
        &self,
        series: &[MonthlyFinancialOutput],
        report: &mut ValuationReport,
    ) {
        let lowest_balance = series
            .iter()
            .map(|row| row.cash_balance)
            .fold(Decimal::ZERO, |lowest, balance| lowest.min(balance));
        report.peak_funding_need = lowest_balance.abs();

        let net_profit: Decimal = series.iter().map(|row| row.net_income).sum();
        let total_costs: Decimal = series
            .iter()
            .map(|row| row.cogs + row.opex_total + row.depreciation)
            .sum();
        report.roi_pct = if total_costs.is_zero() {
            Decimal::ZERO
        } else {
            (net_profit / total_costs * Decimal::ONE_HUNDRED).round_dp(2)
        };
    }
}

/// Principal outstanding across all loans in the given month. Loans that have
/// not started yet contribute nothing; fully repaid loans likewise.
fn outstanding_debt(loans: &[Loan], row: &MonthlyFinancialOutput) -> Decimal {
    let month = row.month_key();
    loans
        .iter()
        .map(|loan| {
            let start = core_types::MonthKey {
                year: loan.start_year,
                month: loan.start_month,
            };
            if month.months_since(&start) < 0 {
                return Decimal::ZERO;
            }
            let elapsed = month.months_since(&loan.first_payment_month());
            let payments_made = (elapsed + 1).clamp(0, loan.duration_months as i64) as u32;
            amortization::outstanding_principal(
                loan.principal_amount,
                loan.interest_rate,
                loan.duration_months,
                payments_made,
            )
        })
        .sum()
}
