//! # Scenario Comparator / Sensitivity Engine
//!
//! Re-runs the monthly projection under alternative assumption sets and
//! compares the outcomes. Every run is an independent pure computation, so
//! the fan-out happens in parallel across CPU cores.

use crate::error::ScenarioError;
use configuration::ValuationSettings;
use core_types::{ProjectInputs, Scenario};
use projection::ProjectionCalculator;
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use valuation::{IrrResult, ValuationAnalyzer};

pub mod error;
pub mod generator;

pub use generator::standard_scenarios;

/// Summary metrics of one scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMetrics {
    pub total_revenue: Decimal,
    pub net_income: Decimal,
    pub npv: Decimal,
    pub irr: IrrResult,
    pub dscr_min: Option<Decimal>,
}

/// One compared scenario with its metrics. The base case is named `base`
/// and carries no scenario id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub scenario_id: Option<Uuid>,
    pub metrics: ScenarioMetrics,
}

/// Spread of a metric across the compared set: population variance, i.e.
/// the mean of squared deviations with divisor N.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceReport {
    pub revenue: Decimal,
    pub net_income: Decimal,
    pub npv: Decimal,
}

/// The full result of a comparison run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    /// All outcomes in input order, the base case first.
    pub outcomes: Vec<ScenarioOutcome>,
    pub variance: VarianceReport,
    /// Name of the outcome with the highest NPV (first one on ties).
    pub best_case: String,
    /// Name of the outcome with the lowest NPV (first one on ties).
    pub worst_case: String,
}

/// Compares a project's base case against alternative scenarios.
pub struct ScenarioComparator {
    calculator: ProjectionCalculator,
    analyzer: ValuationAnalyzer,
}

impl ScenarioComparator {
    pub fn new(valuation_settings: ValuationSettings) -> Self {
        Self {
            calculator: ProjectionCalculator::new(),
            analyzer: ValuationAnalyzer::new(valuation_settings),
        }
    }

    /// Runs the base case plus every given scenario and aggregates the
    /// comparison. Runs are independent and execute in parallel.
    pub fn compare(
        &self,
        inputs: &ProjectInputs,
        scenarios: &[Scenario],
        initial_investment: Decimal,
    ) -> Result<ScenarioComparison, ScenarioError> {
        let mut runs: Vec<(String, Option<&Scenario>)> = Vec::with_capacity(scenarios.len() + 1);
        runs.push(("base".to_string(), None));
        for scenario in scenarios {
            runs.push((scenario.name.clone(), Some(scenario)));
        }

        tracing::debug!(runs = runs.len(), "comparing scenarios");

        let outcomes: Result<Vec<ScenarioOutcome>, ScenarioError> = runs
            .par_iter()
            .map(|(name, scenario)| self.run_one(inputs, name, *scenario, initial_investment))
            .collect();
        let outcomes = outcomes?;

        let best_case = extreme_by_npv(&outcomes, |candidate, best| candidate > best);
        let worst_case = extreme_by_npv(&outcomes, |candidate, worst| candidate < worst);

        let variance = VarianceReport {
            revenue: population_variance(outcomes.iter().map(|o| o.metrics.total_revenue)),
            net_income: population_variance(outcomes.iter().map(|o| o.metrics.net_income)),
            npv: population_variance(outcomes.iter().map(|o| o.metrics.npv)),
        };

        Ok(ScenarioComparison {
            outcomes,
            variance,
            best_case,
            worst_case,
        })
    }

    fn run_one(
        &self,
        inputs: &ProjectInputs,
        name: &str,
        scenario: Option<&Scenario>,
        initial_investment: Decimal,
    ) -> Result<ScenarioOutcome, ScenarioError> {
        let series = self.calculator.calculate(inputs, scenario)?;
        let report = self
            .analyzer
            .analyze(&series, &inputs.loans, initial_investment)?;

        Ok(ScenarioOutcome {
            name: name.to_string(),
            scenario_id: scenario.map(|s| s.scenario_id),
            metrics: ScenarioMetrics {
                total_revenue: series.iter().map(|row| row.revenue).sum(),
                net_income: series.iter().map(|row| row.net_income).sum(),
                npv: report.npv,
                irr: report.irr,
                dscr_min: report.dscr_min,
            },
        })
    }
}

/// Name of the outcome whose NPV wins under `beats`; ties keep the earlier
/// outcome, so the comparison is deterministic in input order.
fn extreme_by_npv(
    outcomes: &[ScenarioOutcome],
    beats: impl Fn(Decimal, Decimal) -> bool,
) -> String {
    let mut winner = &outcomes[0];
    for outcome in &outcomes[1..] {
        if beats(outcome.metrics.npv, winner.metrics.npv) {
            winner = outcome;
        }
    }
    winner.name.clone()
}

/// Mean of squared deviations with divisor N (population variance).
fn population_variance(values: impl Iterator<Item = Decimal> + Clone) -> Decimal {
    let count = values.clone().count();
    if count == 0 {
        return Decimal::ZERO;
    }
    let n = Decimal::from(count);
    let mean: Decimal = values.clone().sum::<Decimal>() / n;
    values.map(|v| (v - mean) * (v - mean)).sum::<Decimal>() / n
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::{Product, Project, SalesProjection};
    use rust_decimal_macros::dec;

    fn inputs() -> ProjectInputs {
        let product_id = Uuid::new_v4();
        ProjectInputs {
            project: Project {
                project_id: Uuid::new_v4(),
                name: "cafe".to_string(),
                start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                horizon_years: 1,
            },
            products: vec![Product {
                product_id,
                name: "espresso".to_string(),
                unit_price: dec!(4),
                unit_cost: dec!(1),
                unit_label: "cup".to_string(),
            }],
            sales: (1..=12)
                .map(|month| SalesProjection {
                    product_id,
                    year: 2026,
                    month,
                    volume: dec!(1000),
                })
                .collect(),
            opex: vec![],
            capex: vec![],
            loans: vec![],
        }
    }

    fn scenario(name: &str, revenue_factor: Decimal) -> Scenario {
        Scenario {
            scenario_id: Uuid::new_v4(),
            name: name.to_string(),
            revenue_factor: Some(revenue_factor),
            cost_factor: None,
            opex_factor: None,
            capex_factor: None,
        }
    }

    fn comparator() -> ScenarioComparator {
        ScenarioComparator::new(ValuationSettings::default())
    }

    #[test]
    fn optimistic_and_pessimistic_npvs_straddle_the_base_case() {
        let scenarios = vec![scenario("optimistic", dec!(1.2)), scenario("pessimistic", dec!(0.8))];
        let comparison = comparator()
            .compare(&inputs(), &scenarios, Decimal::ZERO)
            .unwrap();

        let npv_of = |name: &str| {
            comparison
                .outcomes
                .iter()
                .find(|o| o.name == name)
                .unwrap()
                .metrics
                .npv
        };
        assert!(npv_of("pessimistic") < npv_of("base"));
        assert!(npv_of("base") < npv_of("optimistic"));

        assert_eq!(comparison.best_case, "optimistic");
        assert_eq!(comparison.worst_case, "pessimistic");
        assert!(comparison.variance.npv > Decimal::ZERO);
    }

    #[test]
    fn base_case_runs_even_without_scenarios() {
        let comparison = comparator().compare(&inputs(), &[], Decimal::ZERO).unwrap();
        assert_eq!(comparison.outcomes.len(), 1);
        assert_eq!(comparison.best_case, "base");
        assert_eq!(comparison.worst_case, "base");
        assert_eq!(comparison.variance.npv, Decimal::ZERO);
    }

    #[test]
    fn ties_resolve_to_the_first_encountered_outcome() {
        // A scenario with neutral factors reproduces the base case exactly.
        let neutral = scenario("neutral", dec!(1.0));
        let comparison = comparator()
            .compare(&inputs(), &[neutral], Decimal::ZERO)
            .unwrap();
        assert_eq!(comparison.best_case, "base");
        assert_eq!(comparison.worst_case, "base");
    }

    #[test]
    fn scenario_outcomes_carry_their_identity() {
        let optimistic = scenario("optimistic", dec!(1.2));
        let expected_id = optimistic.scenario_id;
        let comparison = comparator()
            .compare(&inputs(), &[optimistic], Decimal::ZERO)
            .unwrap();
        assert_eq!(comparison.outcomes[1].scenario_id, Some(expected_id));
        assert_eq!(comparison.outcomes[0].scenario_id, None);
    }

    #[test]
    fn population_variance_uses_divisor_n() {
        let values = [dec!(2), dec!(4), dec!(4), dec!(4), dec!(5), dec!(5), dec!(7), dec!(9)];
        let variance = population_variance(values.iter().copied());
        assert_eq!(variance, dec!(4));
    }
}
