//! Pure loan and depreciation arithmetic.
//!
//! Everything in this crate is a total function over its inputs: degenerate
//! parameters (zero duration, zero rate, zero useful life) resolve to
//! `Decimal::ZERO` or the documented fallback instead of failing, so callers
//! never have to guard a month computation against a panic.

use rust_decimal::{Decimal, MathematicalOps};

/// The constant monthly payment of an annuity loan.
///
/// With a positive monthly rate `r = annual_rate_pct / 100 / 12` the payment
/// is `principal * r * (1+r)^n / ((1+r)^n - 1)`. A zero (or negative) rate
/// degrades to straight principal repayment, `principal / n`.
pub fn monthly_loan_payment(
    principal: Decimal,
    annual_rate_pct: Decimal,
    duration_months: u32,
) -> Decimal {
    if duration_months == 0 {
        return Decimal::ZERO;
    }
    let months = Decimal::from(duration_months);
    let monthly_rate = annual_rate_pct / Decimal::ONE_HUNDRED / Decimal::from(12);

    if monthly_rate <= Decimal::ZERO {
        return principal / months;
    }

    let factor = (Decimal::ONE + monthly_rate).powi(duration_months as i64);
    principal * monthly_rate * factor / (factor - Decimal::ONE)
}

/// Total interest paid over the life of an annuity loan.
pub fn total_interest(principal: Decimal, annual_rate_pct: Decimal, duration_months: u32) -> Decimal {
    let payment = monthly_loan_payment(principal, annual_rate_pct, duration_months);
    payment * Decimal::from(duration_months) - principal
}

/// Principal still outstanding after `payments_made` annuity payments.
///
/// Closed form: `principal * ((1+r)^n - (1+r)^k) / ((1+r)^n - 1)`. With a
/// zero rate the balance declines linearly. Fully paid loans report zero.
pub fn outstanding_principal(
    principal: Decimal,
    annual_rate_pct: Decimal,
    duration_months: u32,
    payments_made: u32,
) -> Decimal {
    if duration_months == 0 || payments_made >= duration_months {
        return Decimal::ZERO;
    }
    let monthly_rate = annual_rate_pct / Decimal::ONE_HUNDRED / Decimal::from(12);

    if monthly_rate <= Decimal::ZERO {
        let remaining = Decimal::from(duration_months - payments_made);
        return principal * remaining / Decimal::from(duration_months);
    }

    let growth = Decimal::ONE + monthly_rate;
    let full_term = growth.powi(duration_months as i64);
    let elapsed = growth.powi(payments_made as i64);
    principal * (full_term - elapsed) / (full_term - Decimal::ONE)
}

/// Straight-line monthly depreciation of an asset down to its residual value.
///
/// `(amount - residual_value) / (depreciation_years * 12)`; an asset with no
/// useful life depreciates nothing.
pub fn monthly_depreciation(
    amount: Decimal,
    residual_value: Decimal,
    depreciation_years: u32,
) -> Decimal {
    if depreciation_years == 0 {
        return Decimal::ZERO;
    }
    (amount - residual_value) / Decimal::from(depreciation_years * 12)
}
