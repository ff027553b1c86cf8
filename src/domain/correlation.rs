use crate::domain::config::AnalysisConfig;
use crate::domain::metrics::Metric;
use crate::domain::performance::stats::Stats;
use crate::domain::types::{MatchMetricVector, Significance};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationResult {
    pub coefficient: f64,
    pub p_value: f64,
    pub significance: Significance,
    pub sample_size: usize,
    pub confidence_interval: (f64, f64),
}

impl CorrelationResult {
    /// Result reported when the sample is too small for a stable statistic.
    pub fn insufficient(sample_size: usize) -> Self {
        Self {
            coefficient: 0.0,
            p_value: 1.0,
            significance: Significance::Low,
            sample_size,
            confidence_interval: (0.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceDriver {
    pub metric: Metric,
    pub coefficient: f64,
    pub significance: Significance,
    pub impact: String,
    pub correlation: CorrelationResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurprisingFinding {
    pub metric: Metric,
    pub coefficient: f64,
    pub expected_direction: String,
    pub explanation: String,
    pub recommendation: String,
    pub correlation: CorrelationResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationAnalysis {
    pub correlations: BTreeMap<Metric, CorrelationResult>,
    pub primary_performance_drivers: Vec<PerformanceDriver>,
    pub surprising_findings: Vec<SurprisingFinding>,
    /// Metrics with fewer paired samples than required
    pub insufficient_metrics: Vec<Metric>,
}

/// Correlates each candidate metric with match rating across the window.
pub struct CorrelationAnalyzer {
    min_samples: usize,
    high_p: f64,
    moderate_p: f64,
    top_k: usize,
    surprising_min: f64,
    ci_z: f64,
}

impl CorrelationAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            min_samples: config.correlation_min_samples,
            high_p: config.high_significance_p,
            moderate_p: config.moderate_significance_p,
            top_k: config.top_drivers,
            surprising_min: config.surprising_min_coefficient,
            ci_z: config.ci_z,
        }
    }

    pub fn significance(&self, p_value: f64) -> Significance {
        if p_value < self.high_p {
            Significance::High
        } else if p_value < self.moderate_p {
            Significance::Moderate
        } else {
            Significance::Low
        }
    }

    /// Correlation of `metric` against rating over matches carrying both.
    pub fn correlate(&self, matches: &[MatchMetricVector], metric: Metric) -> CorrelationResult {
        let (xs, ys): (Vec<f64>, Vec<f64>) = matches
            .iter()
            .filter_map(|m| Some((m.get(metric)?, m.get(Metric::Rating)?)))
            .unzip();

        let n = xs.len();
        if n < self.min_samples {
            return CorrelationResult::insufficient(n);
        }

        let coefficient = Stats::pearson(&xs, &ys);
        let p_value = Stats::correlation_p_value(coefficient, n);
        CorrelationResult {
            coefficient,
            p_value,
            significance: self.significance(p_value),
            sample_size: n,
            confidence_interval: Stats::correlation_interval(coefficient, n, self.ci_z),
        }
    }

    pub fn analyze(&self, matches: &[MatchMetricVector]) -> CorrelationAnalysis {
        let correlations: BTreeMap<Metric, CorrelationResult> = Metric::CORRELATION_CANDIDATES
            .iter()
            .map(|&metric| (metric, self.correlate(matches, metric)))
            .collect();

        let insufficient_metrics = correlations
            .iter()
            .filter(|(_, c)| c.sample_size < self.min_samples)
            .map(|(&m, _)| m)
            .collect();

        CorrelationAnalysis {
            primary_performance_drivers: self.primary_drivers(&correlations),
            surprising_findings: self.surprising_findings(&correlations),
            correlations,
            insufficient_metrics,
        }
    }

    fn primary_drivers(&self, correlations: &BTreeMap<Metric, CorrelationResult>) -> Vec<PerformanceDriver> {
        let mut ranked: Vec<(&Metric, &CorrelationResult)> = correlations
            .iter()
            .filter(|(_, c)| c.significance >= Significance::Moderate)
            .collect();
        // Stable sort keeps metric order for equal |r|
        ranked.sort_by(|a, b| b.1.coefficient.abs().total_cmp(&a.1.coefficient.abs()));

        ranked
            .into_iter()
            .take(self.top_k)
            .map(|(&metric, c)| PerformanceDriver {
                metric,
                coefficient: c.coefficient,
                significance: c.significance,
                impact: driver_impact(metric, c.coefficient),
                correlation: c.clone(),
            })
            .collect()
    }

    fn surprising_findings(
        &self,
        correlations: &BTreeMap<Metric, CorrelationResult>,
    ) -> Vec<SurprisingFinding> {
        correlations
            .iter()
            .filter(|(_, c)| c.sample_size >= self.min_samples)
            .filter(|(_, c)| c.coefficient.abs() >= self.surprising_min)
            .filter(|(m, c)| c.coefficient * m.expected_correlation_sign() < 0.0)
            .map(|(&metric, c)| {
                let (explanation, recommendation) = surprise_text(metric, c.coefficient);
                SurprisingFinding {
                    metric,
                    coefficient: c.coefficient,
                    expected_direction: if metric.expected_correlation_sign() > 0.0 {
                        "positive".to_string()
                    } else {
                        "negative".to_string()
                    },
                    explanation,
                    recommendation,
                    correlation: c.clone(),
                }
            })
            .collect()
    }
}

fn strength_word(r: f64) -> &'static str {
    match r.abs() {
        a if a >= 0.7 => "strongly",
        a if a >= 0.4 => "moderately",
        _ => "weakly",
    }
}

fn driver_impact(metric: Metric, r: f64) -> String {
    let direction = if r >= 0.0 { "rises" } else { "falls" };
    format!(
        "Rating {} {} as {} increases (r = {:.2})",
        strength_word(r),
        direction,
        metric.label(),
        r
    )
}

fn surprise_text(metric: Metric, r: f64) -> (String, String) {
    let explanation = match metric {
        Metric::HeadshotPct => format!(
            "Higher headshot percentage goes with lower rating here (r = {:.2}); likely chasing headshots over trading and positioning",
            r
        ),
        Metric::Adr => format!(
            "Damage does not convert into rating (r = {:.2}); damage is landing without finishing kills",
            r
        ),
        Metric::Kast => format!(
            "Round involvement moves against rating (r = {:.2}); passive survival may be inflating KAST",
            r
        ),
        Metric::KillDeath => format!(
            "K/D moves against rating (r = {:.2}); kills may be coming in low-impact rounds",
            r
        ),
        Metric::ReactionTime => format!(
            "Slower reactions go with better ratings (r = {:.2}); patience and positioning may matter more than raw speed",
            r
        ),
        Metric::Preaim => format!(
            "Worse crosshair placement goes with better ratings (r = {:.2}); aggressive entries may trade placement for impact",
            r
        ),
        Metric::SprayAccuracy => format!(
            "Spray accuracy moves against rating (r = {:.2}); long sprays may be replacing repositioning",
            r
        ),
        Metric::UtilityEfficiency => format!(
            "Utility efficiency moves against rating (r = {:.2}); utility may be used for stat padding rather than round wins",
            r
        ),
        Metric::Rating => format!("Rating is compared against itself (r = {:.2})", r),
    };

    let recommendation = match metric {
        Metric::HeadshotPct | Metric::Preaim | Metric::ReactionTime | Metric::SprayAccuracy => {
            format!(
                "Review demos of your best matches to see what replaces {} when you win",
                metric.label()
            )
        }
        _ => format!(
            "Focus on converting {} into round wins instead of raw volume",
            metric.label()
        ),
    };

    (explanation, recommendation)
}
