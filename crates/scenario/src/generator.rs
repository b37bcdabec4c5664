use configuration::ScenarioSettings;
use core_types::Scenario;
use uuid::Uuid;

/// Builds the standard sensitivity set compared against the base case:
/// an optimistic and a pessimistic revenue assumption.
pub fn standard_scenarios(settings: &ScenarioSettings) -> Vec<Scenario> {
    vec![
        Scenario {
            scenario_id: Uuid::new_v4(),
            name: "optimistic".to_string(),
            revenue_factor: Some(settings.optimistic_revenue_factor),
            cost_factor: None,
            opex_factor: None,
            capex_factor: None,
        },
        Scenario {
            scenario_id: Uuid::new_v4(),
            name: "pessimistic".to_string(),
            revenue_factor: Some(settings.pessimistic_revenue_factor),
            cost_factor: None,
            opex_factor: None,
            capex_factor: None,
        },
    ]
}
