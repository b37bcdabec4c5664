use serde::{Deserialize, Serialize};

/// How often an operating expense recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseFrequency {
    Monthly,
    Quarterly,
    Yearly,
}

impl ExpenseFrequency {
    /// Returns true if an expense with this frequency is charged in the given
    /// calendar month (1-12). Quarterly expenses fall due in January, April,
    /// July and October; yearly expenses in January.
    pub fn applies_in(&self, month: u32) -> bool {
        match self {
            ExpenseFrequency::Monthly => true,
            ExpenseFrequency::Quarterly => matches!(month, 1 | 4 | 7 | 10),
            ExpenseFrequency::Yearly => month == 1,
        }
    }
}

/// The aggregate risk classification of a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Severity of a dashboard alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Error,
}
