pub mod enums;
pub mod error;
pub mod month;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{AlertSeverity, ExpenseFrequency, RiskLevel};
pub use error::CoreError;
pub use month::MonthKey;
pub use structs::{
    CalculationSummary, CapexItem, Loan, MonthlyFinancialOutput, OpexItem, Product, Project,
    ProjectInputs, SalesProjection, Scenario, ScenarioFactors,
};
