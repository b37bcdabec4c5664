use crate::error::ProjectionError;
use core_types::{
    MonthKey, MonthlyFinancialOutput, ProjectInputs, Scenario, ScenarioFactors,
};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;
use uuid::Uuid;

pub mod error;

/// A stateless calculator that turns a project's input snapshot into its
/// month-by-month financial statement series.
///
/// The calculation is a pure chronological fold over the projection horizon:
/// identical inputs always produce an identical series, and once the
/// preconditions hold the series is always fully populated. Every division
/// inside a month is zero-guarded rather than raised.
#[derive(Debug, Default)]
pub struct ProjectionCalculator {}

impl ProjectionCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the full monthly series for a project under an optional
    /// scenario.
    ///
    /// # Arguments
    ///
    /// * `inputs` - The immutable input snapshot (project, products, sales,
    ///   opex, capex, loans).
    /// * `scenario` - An optional assumption set; unset factors default to 1.0.
    ///
    /// # Errors
    ///
    /// Fails before any month is computed when the project has no products
    /// or no sales projections.
    pub fn calculate(
        &self,
        inputs: &ProjectInputs,
        scenario: Option<&Scenario>,
    ) -> Result<Vec<MonthlyFinancialOutput>, ProjectionError> {
        // --- 1. Preconditions ---
        if inputs.products.is_empty() {
            return Err(ProjectionError::NoProducts);
        }
        if inputs.sales.is_empty() {
            return Err(ProjectionError::NoSalesProjections);
        }

        // --- 2. Resolve the run context once ---
        let factors = ScenarioFactors::for_scenario(scenario);
        let scenario_id = scenario.map(|s| s.scenario_id);
        let volumes = index_volumes(inputs);

        let months = inputs.project.horizon_years * 12;
        tracing::debug!(
            project_id = %inputs.project.project_id,
            scenario = scenario.map(|s| s.name.as_str()).unwrap_or("base"),
            months,
            "calculating monthly projection"
        );

        // --- 3. Chronological fold over the horizon ---
        let mut series = Vec::with_capacity(months as usize);
        let mut cash_balance = Decimal::ZERO;

        for month in inputs.project.start_month().horizon(inputs.project.horizon_years) {
            let row = self.calculate_month(inputs, &volumes, &factors, month);

            // Carry the balance on the rounded flow so that
            // cash_balance(t) = cash_balance(t-1) + cash_flow(t) holds exactly.
            cash_balance += row.cash_flow;

            series.push(MonthlyFinancialOutput {
                project_id: inputs.project.project_id,
                scenario_id,
                cash_balance,
                ..row
            });
        }

        Ok(series)
    }

    /// Computes one month of the series. Monetary fields are rounded to whole
    /// currency units only here, after all additions.
    fn calculate_month(
        &self,
        inputs: &ProjectInputs,
        volumes: &HashMap<(Uuid, i32, u32), Decimal>,
        factors: &ScenarioFactors,
        month: MonthKey,
    ) -> MonthlyFinancialOutput {
        // --- Revenue / COGS ---
        let mut revenue = Decimal::ZERO;
        let mut cogs = Decimal::ZERO;
        for product in &inputs.products {
            let volume = volumes
                .get(&(product.product_id, month.year, month.month))
                .copied()
                .unwrap_or(Decimal::ZERO);
            revenue += volume * product.unit_price * factors.revenue;
            cogs += volume * product.unit_cost * factors.cost;
        }

        // --- Operating expenses ---
        let mut opex_total = Decimal::ZERO;
        for item in &inputs.opex {
            if item.start_year <= month.year && item.frequency.applies_in(month.month) {
                opex_total += item.amount * factors.opex;
            }
        }

        // --- Depreciation ---
        let mut depreciation = Decimal::ZERO;
        for item in &inputs.capex {
            if item.depreciates_in(month.year) {
                depreciation += amortization::monthly_depreciation(
                    item.amount * factors.capex,
                    item.residual_value,
                    item.depreciation_years,
                );
            }
        }

        // --- Loan payments ---
        let mut loan_payments = Decimal::ZERO;
        for loan in &inputs.loans {
            if loan.payment_due_in(month) {
                loan_payments += amortization::monthly_loan_payment(
                    loan.principal_amount,
                    loan.interest_rate,
                    loan.duration_months,
                );
            }
        }

        // --- Derived figures ---
        let gross_margin = revenue - cogs;
        let gross_margin_pct = if revenue.is_zero() {
            Decimal::ZERO
        } else {
            (gross_margin / revenue * Decimal::ONE_HUNDRED).round_dp(2)
        };
        let ebitda = gross_margin - opex_total;
        let ebit = ebitda - depreciation;
        // No taxation is modelled, so net income equals EBIT.
        let net_income = ebit;
        let cash_flow = net_income + depreciation - loan_payments;

        MonthlyFinancialOutput {
            project_id: inputs.project.project_id,
            scenario_id: None,
            year: month.year,
            month: month.month,
            revenue: round_money(revenue),
            cogs: round_money(cogs),
            gross_margin: round_money(gross_margin),
            gross_margin_pct,
            opex_total: round_money(opex_total),
            depreciation: round_money(depreciation),
            ebitda: round_money(ebitda),
            ebit: round_money(ebit),
            net_income: round_money(net_income),
            loan_payments: round_money(loan_payments),
            cash_flow: round_money(cash_flow),
            cash_balance: Decimal::ZERO,
        }
    }
}

/// Builds the sparse volume lookup. Entries for the same (product, month)
/// accumulate; anything absent is a volume of zero.
fn index_volumes(inputs: &ProjectInputs) -> HashMap<(Uuid, i32, u32), Decimal> {
    let mut volumes: HashMap<(Uuid, i32, u32), Decimal> = HashMap::new();
    for sale in &inputs.sales {
        *volumes
            .entry((sale.product_id, sale.year, sale.month))
            .or_insert(Decimal::ZERO) += sale.volume;
    }
    volumes
}

/// Rounds a monetary amount to the nearest whole currency unit.
fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::{
        CapexItem, ExpenseFrequency, Loan, OpexItem, Product, Project, SalesProjection,
    };
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn base_inputs() -> ProjectInputs {
        let product_id = Uuid::new_v4();
        ProjectInputs {
            project: Project {
                project_id: Uuid::new_v4(),
                name: "bakery".to_string(),
                start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                horizon_years: 1,
            },
            products: vec![Product {
                product_id,
                name: "loaf".to_string(),
                unit_price: dec!(100),
                unit_cost: dec!(40),
                unit_label: "piece".to_string(),
            }],
            sales: vec![SalesProjection {
                product_id,
                year: 2026,
                month: 1,
                volume: dec!(50),
            }],
            opex: vec![],
            capex: vec![],
            loans: vec![],
        }
    }

    #[test]
    fn single_sale_month_produces_reference_figures() {
        let series = ProjectionCalculator::new()
            .calculate(&base_inputs(), None)
            .unwrap();

        assert_eq!(series.len(), 12);
        let first = &series[0];
        assert_eq!(first.revenue, dec!(5000));
        assert_eq!(first.cogs, dec!(2000));
        assert_eq!(first.gross_margin, dec!(3000));
        assert_eq!(first.gross_margin_pct, dec!(60.00));
        assert_eq!(first.opex_total, Decimal::ZERO);
        assert_eq!(first.depreciation, Decimal::ZERO);
        assert_eq!(first.ebitda, dec!(3000));
        assert_eq!(first.ebit, dec!(3000));
        assert_eq!(first.net_income, dec!(3000));
        assert_eq!(first.cash_flow, dec!(3000));
        assert_eq!(first.cash_balance, dec!(3000));

        // Months without a matching sales entry default to zero volume and
        // simply carry the balance forward.
        let second = &series[1];
        assert_eq!(second.revenue, Decimal::ZERO);
        assert_eq!(second.gross_margin_pct, Decimal::ZERO);
        assert_eq!(second.cash_balance, dec!(3000));
    }

    #[test]
    fn missing_products_block_the_run() {
        let mut inputs = base_inputs();
        inputs.products.clear();
        let err = ProjectionCalculator::new().calculate(&inputs, None);
        assert!(matches!(err, Err(ProjectionError::NoProducts)));
    }

    #[test]
    fn missing_sales_block_the_run() {
        let mut inputs = base_inputs();
        inputs.sales.clear();
        let err = ProjectionCalculator::new().calculate(&inputs, None);
        assert!(matches!(err, Err(ProjectionError::NoSalesProjections)));
    }

    #[test]
    fn opex_frequencies_fire_on_their_months() {
        let mut inputs = base_inputs();
        inputs.opex = vec![
            OpexItem {
                name: "rent".to_string(),
                amount: dec!(1000),
                frequency: ExpenseFrequency::Monthly,
                start_year: 2026,
            },
            OpexItem {
                name: "accounting".to_string(),
                amount: dec!(300),
                frequency: ExpenseFrequency::Quarterly,
                start_year: 2026,
            },
            OpexItem {
                name: "insurance".to_string(),
                amount: dec!(1200),
                frequency: ExpenseFrequency::Yearly,
                start_year: 2026,
            },
        ];

        let series = ProjectionCalculator::new().calculate(&inputs, None).unwrap();
        // January: all three fire.
        assert_eq!(series[0].opex_total, dec!(2500));
        // February: monthly only.
        assert_eq!(series[1].opex_total, dec!(1000));
        // April (quarter month): monthly + quarterly.
        assert_eq!(series[3].opex_total, dec!(1300));
    }

    #[test]
    fn opex_respects_start_year() {
        let mut inputs = base_inputs();
        inputs.project.horizon_years = 2;
        inputs.opex = vec![OpexItem {
            name: "marketing".to_string(),
            amount: dec!(500),
            frequency: ExpenseFrequency::Monthly,
            start_year: 2027,
        }];

        let series = ProjectionCalculator::new().calculate(&inputs, None).unwrap();
        assert_eq!(series[11].opex_total, Decimal::ZERO); // Dec 2026
        assert_eq!(series[12].opex_total, dec!(500)); // Jan 2027
    }

    #[test]
    fn loan_payments_start_after_grace_and_stop_after_duration() {
        let mut inputs = base_inputs();
        inputs.project.horizon_years = 3;
        inputs.loans = vec![Loan {
            name: "startup loan".to_string(),
            principal_amount: dec!(120000),
            interest_rate: Decimal::ZERO,
            duration_months: 12,
            start_year: 2026,
            start_month: 1,
            grace_period_months: 6,
        }];

        let series = ProjectionCalculator::new().calculate(&inputs, None).unwrap();
        // Grace period: January..June 2026, no payments.
        assert_eq!(series[0].loan_payments, Decimal::ZERO);
        assert_eq!(series[5].loan_payments, Decimal::ZERO);
        // 12 zero-rate payments of 10,000 from July 2026 through June 2027.
        assert_eq!(series[6].loan_payments, dec!(10000));
        assert_eq!(series[17].loan_payments, dec!(10000));
        assert_eq!(series[18].loan_payments, Decimal::ZERO);

        // Loan payments reduce cash flow but not net income.
        assert_eq!(series[6].net_income, Decimal::ZERO);
        assert_eq!(series[6].cash_flow, dec!(-10000));
    }

    #[test]
    fn capex_depreciates_only_inside_its_window() {
        let mut inputs = base_inputs();
        inputs.project.horizon_years = 4;
        inputs.capex = vec![CapexItem {
            name: "oven".to_string(),
            amount: dec!(24000),
            purchase_year: 2027,
            depreciation_years: 2,
            residual_value: Decimal::ZERO,
        }];

        let series = ProjectionCalculator::new().calculate(&inputs, None).unwrap();
        assert_eq!(series[0].depreciation, Decimal::ZERO); // 2026
        assert_eq!(series[12].depreciation, dec!(1000)); // 2027
        assert_eq!(series[35].depreciation, dec!(1000)); // 2028
        assert_eq!(series[36].depreciation, Decimal::ZERO); // 2029

        // Depreciation lowers net income but returns to cash flow.
        assert_eq!(series[12].net_income, dec!(-1000));
        assert_eq!(series[12].cash_flow, Decimal::ZERO);
    }

    #[test]
    fn scenario_factors_scale_revenue_and_cost_independently() {
        let inputs = base_inputs();
        let scenario = Scenario {
            scenario_id: Uuid::new_v4(),
            name: "optimistic".to_string(),
            revenue_factor: Some(dec!(1.2)),
            cost_factor: Some(dec!(0.9)),
            opex_factor: None,
            capex_factor: None,
        };

        let series = ProjectionCalculator::new()
            .calculate(&inputs, Some(&scenario))
            .unwrap();
        assert_eq!(series[0].revenue, dec!(6000));
        assert_eq!(series[0].cogs, dec!(1800));
        assert_eq!(series[0].scenario_id, Some(scenario.scenario_id));
    }

    #[test]
    fn cash_balance_is_the_running_sum_of_cash_flows() {
        let mut inputs = base_inputs();
        inputs.opex = vec![OpexItem {
            name: "rent".to_string(),
            amount: dec!(700),
            frequency: ExpenseFrequency::Monthly,
            start_year: 2026,
        }];

        let series = ProjectionCalculator::new().calculate(&inputs, None).unwrap();
        let mut expected = Decimal::ZERO;
        for row in &series {
            expected += row.cash_flow;
            assert_eq!(row.cash_balance, expected);
        }
    }

    #[test]
    fn identical_inputs_yield_identical_series() {
        let inputs = base_inputs();
        let calculator = ProjectionCalculator::new();
        let first = calculator.calculate(&inputs, None).unwrap();
        let second = calculator.calculate(&inputs, None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn duplicate_sales_entries_accumulate() {
        let mut inputs = base_inputs();
        let product_id = inputs.products[0].product_id;
        inputs.sales.push(SalesProjection {
            product_id,
            year: 2026,
            month: 1,
            volume: dec!(10),
        });

        let series = ProjectionCalculator::new().calculate(&inputs, None).unwrap();
        assert_eq!(series[0].revenue, dec!(6000));
    }
}
