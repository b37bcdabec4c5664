use core_types::{CalculationSummary, MonthlyFinancialOutput};
use rust_decimal::Decimal;

/// Folds a computed monthly series into the horizon-level summary cached
/// alongside it.
pub fn summarize(series: &[MonthlyFinancialOutput]) -> CalculationSummary {
    let months = series.len();

    let total_revenue: Decimal = series.iter().map(|row| row.revenue).sum();
    let total_cogs: Decimal = series.iter().map(|row| row.cogs).sum();
    let total_opex: Decimal = series.iter().map(|row| row.opex_total).sum();
    let total_depreciation: Decimal = series.iter().map(|row| row.depreciation).sum();
    let net_income: Decimal = series.iter().map(|row| row.net_income).sum();
    let cash_flow: Decimal = series.iter().map(|row| row.cash_flow).sum();
    let gross_margin = total_revenue - total_cogs;

    let pct_of_revenue = |amount: Decimal| {
        if total_revenue.is_zero() {
            Decimal::ZERO
        } else {
            (amount / total_revenue * Decimal::ONE_HUNDRED).round_dp(2)
        }
    };

    let monthly_average = |total: Decimal| {
        if months == 0 {
            Decimal::ZERO
        } else {
            (total / Decimal::from(months)).round_dp(2)
        }
    };

    let mut break_even_month = None;
    let mut cumulative_net_income = Decimal::ZERO;
    for (i, row) in series.iter().enumerate() {
        cumulative_net_income += row.net_income;
        if cumulative_net_income > Decimal::ZERO {
            break_even_month = Some(i as u32 + 1);
            break;
        }
    }

    CalculationSummary {
        months_calculated: months as u32,
        total_revenue,
        total_cogs,
        gross_margin,
        total_opex,
        total_depreciation,
        net_income,
        cash_flow,
        gross_margin_pct: pct_of_revenue(gross_margin),
        net_margin_pct: pct_of_revenue(net_income),
        avg_monthly_revenue: monthly_average(total_revenue),
        avg_monthly_opex: monthly_average(total_opex),
        avg_monthly_depreciation: monthly_average(total_depreciation),
        profitability: net_income > Decimal::ZERO,
        break_even_month,
    }
}
