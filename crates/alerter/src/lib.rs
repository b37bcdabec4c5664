//! Coarse alert stream for dashboards.
//!
//! Where the `risk` crate classifies a projection as a whole, this scanner
//! emits one actionable alert per rule so a dashboard can point the user at
//! the months that need attention. Delivery (websocket, e-mail, UI badge)
//! belongs to the owning web layer.

use configuration::RiskSettings;
use core_types::{AlertSeverity, MonthKey, MonthlyFinancialOutput, RiskLevel};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The rule an alert originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    NegativeCashBalance,
    LowDebtServiceCoverage,
    ConsecutiveLosses,
}

/// A single dashboard alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub impact: RiskLevel,
    pub message: String,
    /// First month the rule fired in.
    pub first_month: MonthKey,
    /// Number of months matching the rule.
    pub occurrences: u32,
}

/// Walks a monthly series and produces the alert stream.
#[derive(Debug, Clone)]
pub struct AlertScanner {
    settings: RiskSettings,
}

impl AlertScanner {
    pub fn new(settings: RiskSettings) -> Self {
        Self { settings }
    }

    /// Scans the full series. At most one alert is emitted per rule.
    pub fn scan(&self, series: &[MonthlyFinancialOutput]) -> Vec<Alert> {
        let mut alerts = Vec::new();

        if let Some(alert) = self.scan_negative_cash(series) {
            alerts.push(alert);
        }
        if let Some(alert) = self.scan_debt_coverage(series) {
            alerts.push(alert);
        }
        if let Some(alert) = self.scan_loss_streak(series) {
            alerts.push(alert);
        }

        alerts
    }

    fn scan_negative_cash(&self, series: &[MonthlyFinancialOutput]) -> Option<Alert> {
        let negatives: Vec<&MonthlyFinancialOutput> = series
            .iter()
            .filter(|row| row.cash_balance < Decimal::ZERO)
            .collect();
        let first = negatives.first()?;
        Some(Alert {
            kind: AlertKind::NegativeCashBalance,
            severity: AlertSeverity::Warning,
            impact: RiskLevel::High,
            message: format!(
                "Cash balance turns negative in {}/{}; plan additional funding.",
                first.month, first.year
            ),
            first_month: first.month_key(),
            occurrences: negatives.len() as u32,
        })
    }

    fn scan_debt_coverage(&self, series: &[MonthlyFinancialOutput]) -> Option<Alert> {
        let strained: Vec<&MonthlyFinancialOutput> = series
            .iter()
            .filter(|row| {
                row.loan_payments > Decimal::ZERO
                    && row.ebitda / row.loan_payments < self.settings.dscr_warning_threshold
            })
            .collect();
        let first = strained.first()?;
        Some(Alert {
            kind: AlertKind::LowDebtServiceCoverage,
            severity: AlertSeverity::Warning,
            impact: RiskLevel::Medium,
            message: format!(
                "Debt service coverage drops below {} in {}/{}.",
                self.settings.dscr_warning_threshold, first.month, first.year
            ),
            first_month: first.month_key(),
            occurrences: strained.len() as u32,
        })
    }

    /// Fires once a run of loss-making months reaches the configured length.
    /// The streak counter resets on any profitable month.
    fn scan_loss_streak(&self, series: &[MonthlyFinancialOutput]) -> Option<Alert> {
        let threshold = self.settings.loss_streak_alert_months;
        let mut streak: u32 = 0;
        let mut longest: u32 = 0;
        let mut trigger_month: Option<MonthKey> = None;

        for row in series {
            if row.net_income < Decimal::ZERO {
                streak += 1;
                if streak == threshold && trigger_month.is_none() {
                    trigger_month = Some(row.month_key());
                }
                longest = longest.max(streak);
            } else {
                streak = 0;
            }
        }

        let month = trigger_month?;
        Some(Alert {
            kind: AlertKind::ConsecutiveLosses,
            severity: AlertSeverity::Error,
            impact: RiskLevel::High,
            message: format!(
                "{longest} consecutive loss-making months starting around {}/{}.",
                month.month, month.year
            ),
            first_month: month,
            occurrences: longest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn row(month: u32, net_income: Decimal, cash_balance: Decimal) -> MonthlyFinancialOutput {
        MonthlyFinancialOutput {
            project_id: Uuid::nil(),
            scenario_id: None,
            year: 2026,
            month,
            revenue: Decimal::ZERO,
            cogs: Decimal::ZERO,
            gross_margin: Decimal::ZERO,
            gross_margin_pct: Decimal::ZERO,
            opex_total: Decimal::ZERO,
            depreciation: Decimal::ZERO,
            ebitda: net_income,
            ebit: net_income,
            net_income,
            loan_payments: Decimal::ZERO,
            cash_flow: net_income,
            cash_balance,
        }
    }

    fn scanner() -> AlertScanner {
        AlertScanner::new(RiskSettings::default())
    }

    #[test]
    fn healthy_series_raises_no_alerts() {
        let series: Vec<_> = (1..=12).map(|m| row(m, dec!(500), dec!(500))).collect();
        assert!(scanner().scan(&series).is_empty());
    }

    #[test]
    fn negative_cash_month_raises_a_high_impact_warning() {
        let mut series: Vec<_> = (1..=12).map(|m| row(m, dec!(500), dec!(500))).collect();
        series[3].cash_balance = dec!(-200);
        series[4].cash_balance = dec!(-100);

        let alerts = scanner().scan(&series);
        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.kind, AlertKind::NegativeCashBalance);
        assert_eq!(alert.severity, AlertSeverity::Warning);
        assert_eq!(alert.impact, RiskLevel::High);
        assert_eq!(alert.first_month, MonthKey::new(2026, 4).unwrap());
        assert_eq!(alert.occurrences, 2);
    }

    #[test]
    fn strained_debt_coverage_raises_a_medium_warning() {
        let mut series: Vec<_> = (1..=12).map(|m| row(m, dec!(500), dec!(500))).collect();
        series[6].ebitda = dec!(1100);
        series[6].loan_payments = dec!(1000); // DSCR 1.1

        let alerts = scanner().scan(&series);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::LowDebtServiceCoverage);
        assert_eq!(alerts[0].impact, RiskLevel::Medium);
    }

    #[test]
    fn three_consecutive_loss_months_raise_an_error() {
        // Losses in months 2-3 (reset by month 4) and 5-8.
        let incomes = [500, -100, -100, 500, -100, -100, -100, -100, 500, 500, 500, 500];
        let series: Vec<_> = incomes
            .iter()
            .enumerate()
            .map(|(i, &inc)| row(i as u32 + 1, Decimal::from(inc), dec!(1000)))
            .collect();

        let alerts = scanner().scan(&series);
        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.kind, AlertKind::ConsecutiveLosses);
        assert_eq!(alert.severity, AlertSeverity::Error);
        // The streak reaches three in month 7 and runs to four months total.
        assert_eq!(alert.first_month, MonthKey::new(2026, 7).unwrap());
        assert_eq!(alert.occurrences, 4);
    }

    #[test]
    fn interrupted_losses_do_not_accumulate_into_a_streak() {
        let incomes = [-100, 500, -100, 500, -100, 500, -100, 500, -100, 500, -100, 500];
        let series: Vec<_> = incomes
            .iter()
            .enumerate()
            .map(|(i, &inc)| row(i as u32 + 1, Decimal::from(inc), dec!(1000)))
            .collect();
        assert!(scanner().scan(&series).is_empty());
    }
}
