use crate::enums::ExpenseFrequency;
use crate::month::MonthKey;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The business project a financial plan is built for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: Uuid,
    pub name: String,
    /// First day covered by the projection; only its year/month matter.
    pub start_date: NaiveDate,
    /// Number of years the projection covers (12 months each).
    pub horizon_years: u32,
}

impl Project {
    /// The first month of the projection horizon.
    pub fn start_month(&self) -> MonthKey {
        MonthKey::from_date(self.start_date)
    }
}

/// A product or service sold by the project. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: Decimal,
    pub unit_cost: Decimal,
    /// Display label for one unit (e.g., "piece", "hour").
    pub unit_label: String,
}

/// Projected sales volume of one product in one month.
///
/// The series is sparse: a missing entry means a volume of zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesProjection {
    pub product_id: Uuid,
    pub year: i32,
    pub month: u32,
    pub volume: Decimal,
}

/// A recurring operating expense, active from `start_year` onward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpexItem {
    pub name: String,
    pub amount: Decimal,
    pub frequency: ExpenseFrequency,
    pub start_year: i32,
}

/// A capital expenditure depreciated straight-line over its useful life.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapexItem {
    pub name: String,
    pub amount: Decimal,
    pub purchase_year: i32,
    pub depreciation_years: u32,
    pub residual_value: Decimal,
}

impl CapexItem {
    /// True while the asset is still being depreciated: from the purchase
    /// year until `depreciation_years` whole years have elapsed.
    pub fn depreciates_in(&self, year: i32) -> bool {
        year >= self.purchase_year && (year - self.purchase_year) < self.depreciation_years as i32
    }
}

/// An annuity loan. Repayment starts once the grace period has elapsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub name: String,
    pub principal_amount: Decimal,
    /// Annual interest rate in percent (e.g., `12` for 12%).
    pub interest_rate: Decimal,
    pub duration_months: u32,
    pub start_year: i32,
    pub start_month: u32,
    pub grace_period_months: u32,
}

impl Loan {
    /// The first month in which a payment is due.
    pub fn first_payment_month(&self) -> MonthKey {
        MonthKey {
            year: self.start_year,
            month: self.start_month,
        }
        .plus_months(self.grace_period_months)
    }

    /// True if an annuity payment is due in the given month: the month lies
    /// within `duration_months` of the end of the grace period.
    pub fn payment_due_in(&self, month: MonthKey) -> bool {
        let elapsed = month.months_since(&self.first_payment_month());
        elapsed >= 0 && elapsed < self.duration_months as i64
    }
}

/// A persisted alternative assumption set. Unset factors fall back to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub scenario_id: Uuid,
    pub name: String,
    pub revenue_factor: Option<Decimal>,
    pub cost_factor: Option<Decimal>,
    pub opex_factor: Option<Decimal>,
    pub capex_factor: Option<Decimal>,
}

/// The multiplicative adjustments one projection run is computed under.
///
/// This is resolved once per run from an optional [`Scenario`]; the rest of
/// the pipeline never deals with unset factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFactors {
    pub revenue: Decimal,
    pub cost: Decimal,
    pub opex: Decimal,
    pub capex: Decimal,
}

impl Default for ScenarioFactors {
    fn default() -> Self {
        Self {
            revenue: Decimal::ONE,
            cost: Decimal::ONE,
            opex: Decimal::ONE,
            capex: Decimal::ONE,
        }
    }
}

impl ScenarioFactors {
    /// Resolves the factors for a run: every factor the scenario leaves
    /// unset (or the absence of a scenario altogether) defaults to 1.0.
    pub fn for_scenario(scenario: Option<&Scenario>) -> Self {
        let base = Self::default();
        match scenario {
            None => base,
            Some(s) => Self {
                revenue: s.revenue_factor.unwrap_or(base.revenue),
                cost: s.cost_factor.unwrap_or(base.cost),
                opex: s.opex_factor.unwrap_or(base.opex),
                capex: s.capex_factor.unwrap_or(base.capex),
            },
        }
    }
}

/// The full input snapshot one calculation run consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInputs {
    pub project: Project,
    pub products: Vec<Product>,
    pub sales: Vec<SalesProjection>,
    #[serde(default)]
    pub opex: Vec<OpexItem>,
    #[serde(default)]
    pub capex: Vec<CapexItem>,
    #[serde(default)]
    pub loans: Vec<Loan>,
}

/// One month of the computed financial statement series.
///
/// Keyed by (project, scenario, year, month). Monetary fields are rounded to
/// whole currency units; `cash_balance` is the running accumulation of
/// `cash_flow` across the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFinancialOutput {
    pub project_id: Uuid,
    pub scenario_id: Option<Uuid>,
    pub year: i32,
    pub month: u32,
    pub revenue: Decimal,
    pub cogs: Decimal,
    pub gross_margin: Decimal,
    /// Gross margin as a percentage of revenue; 0 when revenue is 0.
    pub gross_margin_pct: Decimal,
    pub opex_total: Decimal,
    pub depreciation: Decimal,
    pub ebitda: Decimal,
    pub ebit: Decimal,
    pub net_income: Decimal,
    pub loan_payments: Decimal,
    pub cash_flow: Decimal,
    pub cash_balance: Decimal,
}

impl MonthlyFinancialOutput {
    /// The month this row belongs to.
    pub fn month_key(&self) -> MonthKey {
        MonthKey {
            year: self.year,
            month: self.month,
        }
    }
}

/// Horizon-level aggregation of a stored monthly series, cached alongside it
/// for the status endpoint of the owning web layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationSummary {
    pub months_calculated: u32,
    pub total_revenue: Decimal,
    pub total_cogs: Decimal,
    pub gross_margin: Decimal,
    pub total_opex: Decimal,
    pub total_depreciation: Decimal,
    pub net_income: Decimal,
    pub cash_flow: Decimal,
    pub gross_margin_pct: Decimal,
    pub net_margin_pct: Decimal,
    pub avg_monthly_revenue: Decimal,
    pub avg_monthly_opex: Decimal,
    pub avg_monthly_depreciation: Decimal,
    /// True when the horizon closes with a positive total net income.
    pub profitability: bool,
    /// First month (1-based) cumulative net income turns positive, if ever.
    pub break_even_month: Option<u32>,
}
