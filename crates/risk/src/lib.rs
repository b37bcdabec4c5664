use crate::error::RiskError;
use configuration::RiskSettings;
use core_types::{MonthlyFinancialOutput, RiskLevel};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod error;

/// The individual threshold breach that contributed to a risk level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskIndicator {
    pub severity: RiskLevel,
    pub detail: String,
}

/// The outcome of scanning a monthly series against the risk thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub indicators: Vec<RiskIndicator>,
}

/// Classifies a projection's riskiness from its monthly series.
///
/// Aggregation: any high indicator makes the whole assessment high; more
/// than one medium indicator makes it medium; anything else is low.
#[derive(Debug, Clone)]
pub struct RiskDetector {
    settings: RiskSettings,
}

impl RiskDetector {
    /// Creates a new `RiskDetector` with the given thresholds.
    pub fn new(settings: RiskSettings) -> Result<Self, RiskError> {
        // Validate that the thresholds are logical.
        if settings.dscr_critical_threshold > settings.dscr_warning_threshold {
            return Err(RiskError::InvalidThresholds(
                "critical DSCR threshold cannot exceed the warning threshold".to_string(),
            ));
        }
        for share in [
            settings.loss_month_warning_share,
            settings.loss_month_critical_share,
        ] {
            if share < Decimal::ZERO || share > Decimal::ONE {
                return Err(RiskError::InvalidLossShare(share));
            }
        }
        Ok(Self { settings })
    }

    /// Scans the full series and classifies the aggregate risk.
    pub fn assess(&self, series: &[MonthlyFinancialOutput]) -> RiskAssessment {
        let mut indicators = Vec::new();

        // --- 1. Debt service coverage ---
        if let Some(dscr_min) = min_dscr(series) {
            if dscr_min < self.settings.dscr_critical_threshold {
                indicators.push(RiskIndicator {
                    severity: RiskLevel::High,
                    detail: format!(
                        "minimum DSCR {dscr_min:.2} falls below {}",
                        self.settings.dscr_critical_threshold
                    ),
                });
            } else if dscr_min < self.settings.dscr_warning_threshold {
                indicators.push(RiskIndicator {
                    severity: RiskLevel::Medium,
                    detail: format!(
                        "minimum DSCR {dscr_min:.2} falls below {}",
                        self.settings.dscr_warning_threshold
                    ),
                });
            }
        }

        // --- 2. Cash position ---
        let negative_cash_months = series
            .iter()
            .filter(|row| row.cash_balance < Decimal::ZERO)
            .count();
        if negative_cash_months > 0 {
            indicators.push(RiskIndicator {
                severity: RiskLevel::High,
                detail: format!("{negative_cash_months} month(s) with a negative cash balance"),
            });
        }

        // --- 3. Sustained losses ---
        if !series.is_empty() {
            let loss_months = series
                .iter()
                .filter(|row| row.net_income < Decimal::ZERO)
                .count();
            let loss_share = Decimal::from(loss_months) / Decimal::from(series.len());
            if loss_share > self.settings.loss_month_critical_share {
                indicators.push(RiskIndicator {
                    severity: RiskLevel::High,
                    detail: format!("{loss_months} of {} months are loss-making", series.len()),
                });
            } else if loss_share > self.settings.loss_month_warning_share {
                indicators.push(RiskIndicator {
                    severity: RiskLevel::Medium,
                    detail: format!("{loss_months} of {} months are loss-making", series.len()),
                });
            }
        }

        RiskAssessment {
            level: aggregate_level(&indicators),
            indicators,
        }
    }
}

/// Minimum DSCR across months that actually carry debt service.
fn min_dscr(series: &[MonthlyFinancialOutput]) -> Option<Decimal> {
    series
        .iter()
        .filter(|row| row.loan_payments > Decimal::ZERO)
        .map(|row| row.ebitda / row.loan_payments)
        .min()
}

fn aggregate_level(indicators: &[RiskIndicator]) -> RiskLevel {
    if indicators.iter().any(|i| i.severity == RiskLevel::High) {
        return RiskLevel::High;
    }
    let mediums = indicators
        .iter()
        .filter(|i| i.severity == RiskLevel::Medium)
        .count();
    if mediums > 1 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn row(net_income: Decimal, cash_balance: Decimal) -> MonthlyFinancialOutput {
        MonthlyFinancialOutput {
            project_id: Uuid::nil(),
            scenario_id: None,
            year: 2026,
            month: 1,
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

    fn detector() -> RiskDetector {
        RiskDetector::new(RiskSettings::default()).unwrap()
    }

    #[test]
    fn healthy_series_is_low_risk() {
        let series: Vec<_> = (0..12).map(|i| row(dec!(1000), dec!(1000) * Decimal::from(i + 1))).collect();
        let assessment = detector().assess(&series);
        assert_eq!(assessment.level, RiskLevel::Low);
        assert!(assessment.indicators.is_empty());
    }

    #[test]
    fn critical_dscr_alone_forces_high_risk() {
        // Every other signal is healthy; only the coverage is weak.
        let mut series: Vec<_> = (0..12).map(|i| row(dec!(1000), dec!(1000) * Decimal::from(i + 1))).collect();
        series[5].ebitda = dec!(900);
        series[5].loan_payments = dec!(1000); // DSCR 0.9
        let assessment = detector().assess(&series);
        assert_eq!(assessment.level, RiskLevel::High);
    }

    #[test]
    fn borderline_dscr_is_a_medium_indicator() {
        let mut series: Vec<_> = (0..12).map(|i| row(dec!(1000), dec!(1000) * Decimal::from(i + 1))).collect();
        series[5].ebitda = dec!(1100);
        series[5].loan_payments = dec!(1000); // DSCR 1.1
        let assessment = detector().assess(&series);
        // A single medium indicator does not escalate beyond low.
        assert_eq!(assessment.level, RiskLevel::Low);
        assert_eq!(assessment.indicators.len(), 1);
        assert_eq!(assessment.indicators[0].severity, RiskLevel::Medium);
    }

    #[test]
    fn two_medium_indicators_escalate_to_medium() {
        // Borderline DSCR plus 7 of 12 loss months (share > 0.5, <= 0.8),
        // balances kept positive so no high indicator interferes.
        let mut series: Vec<_> = (0..12)
            .map(|i| {
                let income = if i < 7 { dec!(-100) } else { dec!(2000) };
                row(income, dec!(5000))
            })
            .collect();
        series[11].ebitda = dec!(1100);
        series[11].loan_payments = dec!(1000);
        let assessment = detector().assess(&series);
        assert_eq!(assessment.level, RiskLevel::Medium);
        assert_eq!(assessment.indicators.len(), 2);
    }

    #[test]
    fn negative_cash_balance_is_always_high() {
        let mut series: Vec<_> = (0..12).map(|i| row(dec!(1000), dec!(1000) * Decimal::from(i + 1))).collect();
        series[2].cash_balance = dec!(-1);
        let assessment = detector().assess(&series);
        assert_eq!(assessment.level, RiskLevel::High);
    }

    #[test]
    fn pervasive_losses_are_high_risk() {
        // 11 of 12 months loss-making: share > 0.8.
        let series: Vec<_> = (0..12)
            .map(|i| {
                let income = if i == 0 { dec!(50000) } else { dec!(-100) };
                row(income, dec!(5000))
            })
            .collect();
        let assessment = detector().assess(&series);
        assert_eq!(assessment.level, RiskLevel::High);
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let mut settings = RiskSettings::default();
        settings.dscr_critical_threshold = dec!(2.0);
        assert!(RiskDetector::new(settings).is_err());
    }
}
