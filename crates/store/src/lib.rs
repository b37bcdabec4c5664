//! The persistence port for computed calculations.
//!
//! The engine talks to storage exclusively through the [`ProjectionStore`]
//! trait. Its central contract is **atomic replacement**: a new run swaps in
//! the complete series and summary for its (project, scenario) key in one
//! step, so no reader can ever observe the window between a delete and an
//! insert. Database-backed implementations live with the owning application;
//! [`MemoryStore`] is the in-process implementation used by the engine's
//! tests and the CLI.

use chrono::{DateTime, Utc};
use core_types::{CalculationSummary, MonthlyFinancialOutput};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

pub mod error;

pub use error::StoreError;

/// What the status endpoint reports about a stored calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationStatus {
    pub last_calculated_at: DateTime<Utc>,
    pub months_calculated: u32,
    pub summary: CalculationSummary,
}

/// Storage abstraction for calculation results, keyed by
/// (project_id, scenario_id).
pub trait ProjectionStore: Send + Sync {
    /// Atomically replaces everything stored for the key with the new run.
    /// Prior rows are superseded wholesale; partial merges do not exist.
    fn replace_calculation(
        &self,
        project_id: Uuid,
        scenario_id: Option<Uuid>,
        series: Vec<MonthlyFinancialOutput>,
        summary: CalculationSummary,
    ) -> Result<(), StoreError>;

    /// The ordered monthly series of the stored calculation.
    fn get_series(
        &self,
        project_id: Uuid,
        scenario_id: Option<Uuid>,
    ) -> Result<Vec<MonthlyFinancialOutput>, StoreError>;

    /// Timestamp and cached summary, or `None` when nothing is stored.
    fn get_status(
        &self,
        project_id: Uuid,
        scenario_id: Option<Uuid>,
    ) -> Result<Option<CalculationStatus>, StoreError>;

    /// Removes the stored calculation for the key.
    fn delete_calculation(
        &self,
        project_id: Uuid,
        scenario_id: Option<Uuid>,
    ) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
struct StoredCalculation {
    series: Vec<MonthlyFinancialOutput>,
    summary: CalculationSummary,
    calculated_at: DateTime<Utc>,
}

/// In-process [`ProjectionStore`] backed by a map behind a read-write lock.
/// Replacement swaps one map entry, which makes the atomicity contract
/// trivially true.
#[derive(Debug, Default)]
pub struct MemoryStore {
    calculations: RwLock<HashMap<(Uuid, Option<Uuid>), StoredCalculation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectionStore for MemoryStore {
    fn replace_calculation(
        &self,
        project_id: Uuid,
        scenario_id: Option<Uuid>,
        series: Vec<MonthlyFinancialOutput>,
        summary: CalculationSummary,
    ) -> Result<(), StoreError> {
        let mut calculations = self
            .calculations
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        calculations.insert(
            (project_id, scenario_id),
            StoredCalculation {
                series,
                summary,
                calculated_at: Utc::now(),
            },
        );
        Ok(())
    }

    fn get_series(
        &self,
        project_id: Uuid,
        scenario_id: Option<Uuid>,
    ) -> Result<Vec<MonthlyFinancialOutput>, StoreError> {
        let calculations = self
            .calculations
            .read()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        calculations
            .get(&(project_id, scenario_id))
            .map(|stored| stored.series.clone())
            .ok_or(StoreError::NotFound {
                project_id,
                scenario_id,
            })
    }

    fn get_status(
        &self,
        project_id: Uuid,
        scenario_id: Option<Uuid>,
    ) -> Result<Option<CalculationStatus>, StoreError> {
        let calculations = self
            .calculations
            .read()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(calculations
            .get(&(project_id, scenario_id))
            .map(|stored| CalculationStatus {
                last_calculated_at: stored.calculated_at,
                months_calculated: stored.series.len() as u32,
                summary: stored.summary.clone(),
            }))
    }

    fn delete_calculation(
        &self,
        project_id: Uuid,
        scenario_id: Option<Uuid>,
    ) -> Result<(), StoreError> {
        let mut calculations = self
            .calculations
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        calculations
            .remove(&(project_id, scenario_id))
            .map(|_| ())
            .ok_or(StoreError::NotFound {
                project_id,
                scenario_id,
            })
    }
}
