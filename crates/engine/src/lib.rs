//! # Calculation Engine
//!
//! The orchestrator behind the web layer's trigger/status/delete endpoints.
//! A run validates preconditions, computes the monthly series, atomically
//! replaces whatever was stored for the (project, scenario) key and caches
//! the derived summary. Triggering is idempotent: an existing calculation is
//! returned as-is unless the caller forces a recalculation.

use core_types::{CalculationSummary, ProjectInputs, Scenario};
use projection::ProjectionCalculator;
use store::{CalculationStatus, ProjectionStore};
use uuid::Uuid;

pub mod error;
pub mod summary;

pub use error::EngineError;
pub use summary::summarize;

/// The outcome handed back to the caller of a trigger request.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationOutcome {
    pub summary: CalculationSummary,
    /// False when an existing calculation was reused instead of recomputed.
    pub recalculated: bool,
}

/// Owns the projection calculator and the storage port.
pub struct CalculationEngine<S: ProjectionStore> {
    calculator: ProjectionCalculator,
    store: S,
}

impl<S: ProjectionStore> CalculationEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            calculator: ProjectionCalculator::new(),
            store,
        }
    }

    /// Access to the underlying store, for consumers that read the series
    /// back (valuation, risk, dashboards).
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Triggers a calculation run.
    ///
    /// Unless `force` is set, a key that already holds a calculation is left
    /// untouched and its cached summary is returned. A forced (or first) run
    /// recomputes the full series and atomically supersedes all prior rows
    /// for the key.
    pub fn run_calculation(
        &self,
        inputs: &ProjectInputs,
        scenario: Option<&Scenario>,
        force: bool,
    ) -> Result<CalculationOutcome, EngineError> {
        let project_id = inputs.project.project_id;
        let scenario_id = scenario.map(|s| s.scenario_id);

        if !force {
            if let Some(status) = self.store.get_status(project_id, scenario_id)? {
                tracing::info!(%project_id, ?scenario_id, "reusing existing calculation");
                return Ok(CalculationOutcome {
                    summary: status.summary,
                    recalculated: false,
                });
            }
        }

        let series = self.calculator.calculate(inputs, scenario)?;
        let summary = summary::summarize(&series);
        tracing::info!(
            %project_id,
            ?scenario_id,
            months = summary.months_calculated,
            "calculation complete, persisting series"
        );

        self.store
            .replace_calculation(project_id, scenario_id, series, summary.clone())?;

        Ok(CalculationOutcome {
            summary,
            recalculated: true,
        })
    }

    /// Last calculation timestamp and cached summary for the key, if any.
    pub fn status(
        &self,
        project_id: Uuid,
        scenario_id: Option<Uuid>,
    ) -> Result<Option<CalculationStatus>, EngineError> {
        Ok(self.store.get_status(project_id, scenario_id)?)
    }

    /// Removes the stored calculation for the key.
    pub fn delete_calculation(
        &self,
        project_id: Uuid,
        scenario_id: Option<Uuid>,
    ) -> Result<(), EngineError> {
        self.store.delete_calculation(project_id, scenario_id)?;
        tracing::info!(%project_id, ?scenario_id, "calculation deleted");
        Ok(())
    }
}
