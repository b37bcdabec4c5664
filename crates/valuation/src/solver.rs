//! Discounting and the Newton-Raphson IRR root-finder.

use serde::{Deserialize, Serialize};

/// Parameters of the IRR root-finder.
///
/// The historical defaults (12% guess, |NPV| < 0.01, 100 iterations) are kept
/// as `Default` but every knob is a parameter rather than a constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrSolverConfig {
    /// Initial annual rate guess as a fraction (0.12 = 12%).
    pub initial_guess: f64,
    /// The solver stops once |NPV| falls below this value.
    pub tolerance: f64,
    /// Hard cap on Newton iterations.
    pub max_iterations: u32,
}

impl Default for IrrSolverConfig {
    fn default() -> Self {
        Self {
            initial_guess: 0.12,
            tolerance: 0.01,
            max_iterations: 100,
        }
    }
}

/// The outcome of an IRR solve.
///
/// The numeric value is always the solver's final iterate, even when the
/// iteration cap was hit; callers must consult `converged` before treating
/// the rate as exact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrResult {
    /// Internal rate of return, annual, in percent.
    pub rate_pct: f64,
    /// True if |NPV| dropped below the tolerance within the iteration cap.
    pub converged: bool,
    /// Newton iterations actually performed.
    pub iterations: u32,
}

/// Net present value of a monthly cash-flow series under an annual rate,
/// discounted with monthly compounding: `Σ cf[i] / (1 + rate/12)^(i+1)`.
pub fn npv(cash_flows: &[f64], annual_rate: f64) -> f64 {
    let monthly = 1.0 + annual_rate / 12.0;
    cash_flows
        .iter()
        .enumerate()
        .map(|(i, cf)| cf / monthly.powi(i as i32 + 1))
        .sum()
}

/// Analytic derivative of [`npv`] with respect to the annual rate.
fn npv_derivative(cash_flows: &[f64], annual_rate: f64) -> f64 {
    let monthly = 1.0 + annual_rate / 12.0;
    cash_flows
        .iter()
        .enumerate()
        .map(|(i, cf)| {
            let periods = i as f64 + 1.0;
            -cf * periods / 12.0 / monthly.powi(i as i32 + 2)
        })
        .sum()
}

/// Finds the annual rate at which the NPV of the series is zero.
///
/// Newton's iteration `r_{n+1} = r_n - NPV(r_n) / NPV'(r_n)` starting from
/// `config.initial_guess`. The solve is best-effort: a vanishing derivative,
/// a rate that walks past the discounting pole at -1200%, or an exhausted
/// iteration cap all end the search with `converged = false` and the last
/// usable iterate.
pub fn solve_irr(cash_flows: &[f64], config: &IrrSolverConfig) -> IrrResult {
    let mut rate = config.initial_guess;

    for iteration in 0..config.max_iterations {
        let value = npv(cash_flows, rate);
        if value.abs() < config.tolerance {
            return IrrResult {
                rate_pct: rate * 100.0,
                converged: true,
                iterations: iteration,
            };
        }

        let derivative = npv_derivative(cash_flows, rate);
        if derivative.abs() < 1e-12 {
            return IrrResult {
                rate_pct: rate * 100.0,
                converged: false,
                iterations: iteration,
            };
        }

        let next = rate - value / derivative;
        // The discount factor 1 + r/12 must stay positive; a step past the
        // pole (or a non-finite iterate) cannot be recovered from.
        if !next.is_finite() || 1.0 + next / 12.0 <= 0.0 {
            return IrrResult {
                rate_pct: rate * 100.0,
                converged: false,
                iterations: iteration,
            };
        }
        rate = next;
    }

    IrrResult {
        rate_pct: rate * 100.0,
        converged: false,
        iterations: config.max_iterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn npv_discounts_with_monthly_compounding() {
        // A single flow of 1120 one month out at 12% annual: 1120 / 1.01.
        let value = npv(&[1120.0], 0.12);
        assert!((value - 1120.0 / 1.01).abs() < 1e-9);
    }

    #[test]
    fn npv_is_strictly_decreasing_in_the_rate_for_positive_series() {
        let flows: Vec<f64> = std::iter::repeat(250.0).take(36).collect();
        let mut previous = f64::MAX;
        for step in 0..10 {
            let rate = 0.02 + step as f64 * 0.03;
            let value = npv(&flows, rate);
            assert!(value < previous, "NPV must fall as the rate rises");
            previous = value;
        }
    }

    #[test]
    fn irr_zeroes_the_npv_when_converged() {
        // Investment of 10,000 followed by 24 months of 500.
        let mut flows = vec![-10000.0];
        flows.extend(std::iter::repeat(500.0).take(24));

        let result = solve_irr(&flows, &IrrSolverConfig::default());
        assert!(result.converged);
        assert!(npv(&flows, result.rate_pct / 100.0).abs() < 0.01);
        assert!(result.rate_pct > 0.0);
    }

    #[test]
    fn unconverged_solve_reports_its_flag_and_final_iterate() {
        let flows = vec![-10000.0, 300.0, 300.0];
        let config = IrrSolverConfig {
            max_iterations: 2,
            ..Default::default()
        };
        let result = solve_irr(&flows, &config);
        assert!(!result.converged);
        assert!(result.rate_pct.is_finite());
        assert_eq!(result.iterations, 2);
    }
}
