use crate::domain::config::AnalysisConfig;
use crate::domain::correlation::CorrelationAnalysis;
use crate::domain::metrics::Metric;
use crate::domain::state::{PerformanceState, PerformanceStateKind, TiltAnalysis};
use crate::domain::thresholds::AdaptiveThresholdTable;
use crate::domain::types::{MatchMetricVector, Severity, Significance};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertType {
    #[serde(rename = "tilt-risk")]
    TiltRisk,
    #[serde(rename = "mechanical-risk")]
    MechanicalRisk,
    #[serde(rename = "trend-risk")]
    TrendRisk,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictiveAlert {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: Severity,
    pub metric: Metric,
    pub evidence: String,
    pub prediction: String,
    pub recommended_action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictiveWarnings {
    pub alerts: Vec<PredictiveAlert>,
    /// Highest alert severity, `None` when there are no alerts
    pub risk_level: Option<Severity>,
    pub state_context: PerformanceStateKind,
}

/// Everything the warning system reads; all of it already computed.
pub struct WarningInput<'a> {
    pub matches: &'a [MatchMetricVector],
    pub tilt: &'a TiltAnalysis,
    pub state: &'a PerformanceState,
    pub correlation: &'a CorrelationAnalysis,
    pub thresholds: &'a AdaptiveThresholdTable,
}

pub struct PredictiveWarningSystem {
    trend_window: usize,
}

impl PredictiveWarningSystem {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            trend_window: config.trend_window,
        }
    }

    pub fn evaluate(&self, input: &WarningInput<'_>) -> PredictiveWarnings {
        let mut alerts = Vec::new();
        alerts.extend(self.tilt_risk(input));
        alerts.extend(self.mechanical_risks(input));
        alerts.extend(self.trend_risks(input));

        PredictiveWarnings {
            risk_level: alerts.iter().map(|a| a.severity).max(),
            alerts,
            state_context: input.state.state,
        }
    }

    fn tilt_risk(&self, input: &WarningInput<'_>) -> Option<PredictiveAlert> {
        let tilt = input.tilt;
        if !tilt.active {
            return None;
        }

        let severity = if input.state.state == PerformanceStateKind::TiltCascade {
            Severity::High
        } else {
            tilt.severity
        };
        let latest = input
            .matches
            .iter()
            .rev()
            .find_map(|m| m.get(Metric::Rating))
            .unwrap_or(0.0);

        Some(PredictiveAlert {
            alert_type: AlertType::TiltRisk,
            severity,
            metric: Metric::Rating,
            evidence: format!(
                "Rating {:.2} in the latest match, {} matches below baseline",
                latest, tilt.cascade_length
            ),
            prediction: format!(
                "Continuing to queue is likely to extend the cascade past {} matches",
                tilt.cascade_length
            ),
            recommended_action: tilt.recommended_action.clone(),
        })
    }

    fn mechanical_risks(&self, input: &WarningInput<'_>) -> Vec<PredictiveAlert> {
        input
            .correlation
            .primary_performance_drivers
            .iter()
            .filter_map(|driver| {
                let value = input
                    .matches
                    .iter()
                    .rev()
                    .find_map(|m| m.get(driver.metric))?;
                if !input.thresholds.below_solid(driver.metric, value) {
                    return None;
                }
                let solid = input.thresholds.get(driver.metric)?.solid;

                let severity = if driver.significance == Significance::High
                    || input.state.state == PerformanceStateKind::MechanicalInconsistency
                {
                    Severity::High
                } else {
                    Severity::Moderate
                };

                Some(PredictiveAlert {
                    alert_type: AlertType::MechanicalRisk,
                    severity,
                    metric: driver.metric,
                    evidence: format!(
                        "{} {:.2} is below the {} solid level of {:.2}",
                        driver.metric.label(),
                        value,
                        input.thresholds.tier,
                        solid
                    ),
                    prediction: format!(
                        "{} drives rating for this player (r = {:.2}); rating will stay depressed until it recovers",
                        driver.metric.label(),
                        driver.coefficient
                    ),
                    recommended_action: format!(
                        "Prioritise {} drills before the next session",
                        driver.metric.label()
                    ),
                })
            })
            .collect()
    }

    fn trend_risks(&self, input: &WarningInput<'_>) -> Vec<PredictiveAlert> {
        input
            .correlation
            .surprising_findings
            .iter()
            .filter_map(|finding| {
                let metric = finding.metric;
                if self.trend_window < 2 || input.matches.len() < self.trend_window {
                    return None;
                }
                // Every one of the trailing matches must carry the metric
                let recent: Vec<f64> = input.matches[input.matches.len() - self.trend_window..]
                    .iter()
                    .map(|m| m.get(metric))
                    .collect::<Option<_>>()?;
                if !recent.windows(2).all(|w| metric.is_worse(w[1], w[0])) {
                    return None;
                }

                let severity = if input.state.state == PerformanceStateKind::BaselineNormal {
                    Severity::Low
                } else {
                    Severity::Moderate
                };
                let series = recent
                    .iter()
                    .map(|v| format!("{:.2}", v))
                    .collect::<Vec<_>>()
                    .join(" -> ");

                Some(PredictiveAlert {
                    alert_type: AlertType::TrendRisk,
                    severity,
                    metric,
                    evidence: format!("{} over the last {} matches: {}", metric.label(), recent.len(), series),
                    prediction: format!(
                        "{} is worsening and behaves unusually for this player; expect it to keep pulling on results",
                        metric.label()
                    ),
                    recommended_action: finding.recommendation.clone(),
                })
            })
            .collect()
    }
}
