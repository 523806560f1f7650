//! Scoring and issue prioritization.

use discform_core::{AnalysisConfig, Result, ScoringConfig};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::events::{EventKind, EventSlots, KeyEvent};
use crate::form_errors::{ErrorInstance, FormErrorKind, FormErrorLog};
use crate::metrics::{HeadlineMetrics, MetricKind, Rating, SupplementaryMetrics};

/// Issue priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    High,
    Medium,
    Low,
}

impl IssueSeverity {
    pub fn from_value(severity: f64, scoring: &ScoringConfig) -> Self {
        if severity >= scoring.high_severity {
            IssueSeverity::High
        } else if severity >= scoring.medium_severity {
            IssueSeverity::Medium
        } else {
            IssueSeverity::Low
        }
    }

    pub fn penalty(&self, scoring: &ScoringConfig) -> u32 {
        match self {
            IssueSeverity::High => scoring.high_penalty,
            IssueSeverity::Medium => scoring.medium_penalty,
            IssueSeverity::Low => scoring.low_penalty,
        }
    }
}

/// What raised an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSource {
    Metric(MetricKind),
    FormError(FormErrorKind),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub title: String,
    pub level: IssueSeverity,
    /// 0-100
    pub severity: f64,
    pub description: String,
    pub source: IssueSource,
}

impl Issue {
    fn new(
        source: IssueSource,
        title: &str,
        severity: f64,
        description: &str,
        scoring: &ScoringConfig,
    ) -> Self {
        let severity = severity.clamp(0.0, 100.0);
        Self {
            title: title.to_string(),
            level: IssueSeverity::from_value(severity, scoring),
            severity,
            description: description.to_string(),
            source,
        }
    }
}

/// Every issue in the analysis, most severe first.
///
/// Headline metrics below a good rating contribute `100 - score`; each form
/// error kind with instances contributes its aggregate severity.
pub fn collect_issues(
    metrics: &HeadlineMetrics,
    errors: &FormErrorLog,
    config: &AnalysisConfig,
) -> Vec<Issue> {
    let scoring = &config.scoring;

    let metric_issues = metrics
        .iter()
        .filter(|(_, metric)| metric.rating != Rating::Good)
        .map(|(kind, metric)| {
            Issue::new(
                IssueSource::Metric(kind),
                kind.name(),
                100.0 - metric.score,
                &metric.text,
                scoring,
            )
        });

    let error_issues = errors.kinds().filter_map(|kind| {
        let severity = errors.aggregate_severity(kind, &config.form_errors)?;
        Some(Issue::new(
            IssueSource::FormError(kind),
            kind.title(),
            severity,
            kind.description(),
            scoring,
        ))
    });

    let mut issues: Vec<Issue> = metric_issues.chain(error_issues).collect();
    issues.sort_by(|a, b| {
        b.severity
            .partial_cmp(&a.severity)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.title.cmp(&b.title))
    });
    issues
}

/// 100 minus the per-level penalty of every issue, floored at zero
pub fn issue_score(issues: &[Issue], scoring: &ScoringConfig) -> u8 {
    let penalty: u32 = issues.iter().map(|i| i.level.penalty(scoring)).sum();
    100u32.saturating_sub(penalty) as u8
}

/// Coaching band for the overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackBand {
    Excellent,
    Good,
    NeedsWork,
    RecommendCoaching,
}

impl FeedbackBand {
    pub fn from_score(score: u8, scoring: &ScoringConfig) -> Self {
        if score >= scoring.excellent_score {
            FeedbackBand::Excellent
        } else if score >= scoring.good_score {
            FeedbackBand::Good
        } else if score >= scoring.needs_work_score {
            FeedbackBand::NeedsWork
        } else {
            FeedbackBand::RecommendCoaching
        }
    }

    /// How many issues the band shows
    pub fn issue_limit(&self, scoring: &ScoringConfig) -> usize {
        let [excellent, good, needs_work, coaching] = scoring.issues_per_band;
        match self {
            FeedbackBand::Excellent => excellent,
            FeedbackBand::Good => good,
            FeedbackBand::NeedsWork => needs_work,
            FeedbackBand::RecommendCoaching => coaching,
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            FeedbackBand::Excellent => "Excellent throw. Keep polishing the details below.",
            FeedbackBand::Good => "Good throw with a few things to tighten up.",
            FeedbackBand::NeedsWork => "A solid base, but several parts of the form need work.",
            FeedbackBand::RecommendCoaching => {
                "The fundamentals need attention; consider working with a coach."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub band: FeedbackBand,
    pub headline: String,
}

/// Mean of the five headline scores, rounded
pub fn overall_score(metrics: &HeadlineMetrics) -> u8 {
    metrics.mean_score().round().clamp(0.0, 100.0) as u8
}

fn overall_rating(score: u8, scoring: &ScoringConfig) -> Rating {
    if score >= scoring.good_score {
        Rating::Good
    } else if score >= scoring.needs_work_score {
        Rating::Warning
    } else {
        Rating::Error
    }
}

/// Complete analysis of one throw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub overall_score: u8,
    pub overall_rating: Rating,
    pub metrics: HeadlineMetrics,
    pub supplementary: SupplementaryMetrics,
    pub key_events: BTreeMap<EventKind, Option<KeyEvent>>,
    pub form_errors: BTreeMap<FormErrorKind, Vec<ErrorInstance>>,
    /// Top issues for the feedback band
    pub issues: Vec<Issue>,
    pub total_issue_count: usize,
    /// Penalty-based score over all issues
    pub issue_score: u8,
    pub feedback: Feedback,
    pub frames_analyzed: usize,
    pub frames_skipped: usize,
}

impl AnalysisResult {
    pub fn build(
        metrics: HeadlineMetrics,
        supplementary: SupplementaryMetrics,
        events: &EventSlots,
        errors: &FormErrorLog,
        frames_analyzed: usize,
        frames_skipped: usize,
        config: &AnalysisConfig,
    ) -> Self {
        let scoring = &config.scoring;
        let overall_score = overall_score(&metrics);
        let band = FeedbackBand::from_score(overall_score, scoring);

        let mut issues = collect_issues(&metrics, errors, config);
        let total_issue_count = issues.len();
        let issue_score = issue_score(&issues, scoring);
        issues.truncate(band.issue_limit(scoring));

        Self {
            overall_score,
            overall_rating: overall_rating(overall_score, scoring),
            metrics,
            supplementary,
            key_events: events.to_map(),
            form_errors: errors.to_map(),
            issues,
            total_issue_count,
            issue_score,
            feedback: Feedback {
                band,
                headline: band.headline().to_string(),
            },
            frames_analyzed,
            frames_skipped,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Result of finalizing a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Analyzed(Box<AnalysisResult>),
    /// No frame had a usable keypoint
    Undetectable { frames_skipped: usize },
}

impl AnalysisOutcome {
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            AnalysisOutcome::Analyzed(result) => Some(result),
            AnalysisOutcome::Undetectable { .. } => None,
        }
    }

    pub fn is_undetectable(&self) -> bool {
        matches!(self, AnalysisOutcome::Undetectable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form_errors::ErrorMeasure;
    use crate::metrics::MetricScore;

    fn metric(kind: MetricKind, score: f64, rating: Rating) -> MetricScore {
        MetricScore {
            score,
            rating,
            text: kind.text(rating).to_string(),
        }
    }

    fn metrics(scores: [f64; 5]) -> HeadlineMetrics {
        let rate = |s: f64| {
            if s > 75.0 {
                Rating::Good
            } else if s > 50.0 {
                Rating::Warning
            } else {
                Rating::Error
            }
        };
        HeadlineMetrics {
            posture: metric(MetricKind::Posture, scores[0], rate(scores[0])),
            balance: metric(MetricKind::Balance, scores[1], rate(scores[1])),
            hip_rotation: metric(MetricKind::HipRotation, scores[2], rate(scores[2])),
            arm: metric(MetricKind::Arm, scores[3], rate(scores[3])),
            follow_through: metric(MetricKind::FollowThrough, scores[4], rate(scores[4])),
        }
    }

    #[test]
    fn test_overall_is_rounded_mean() {
        let m = metrics([100.0, 90.0, 80.0, 71.0, 60.0]);
        assert_eq!(overall_score(&m), 80);
        assert_eq!(overall_rating(80, &ScoringConfig::default()), Rating::Good);
    }

    #[test]
    fn test_issue_levels_and_ordering() {
        let config = AnalysisConfig::default();
        let m = metrics([100.0, 20.0, 55.0, 60.0, 100.0]);
        let mut errors = FormErrorLog::new();
        errors.record(FormErrorKind::EarlyRelease, 0.1, ErrorMeasure::Timing(0.1));
        errors.record(FormErrorKind::NoseUp, 0.2, ErrorMeasure::Severity(45.0));

        let issues = collect_issues(&m, &errors, &config);
        let titles: Vec<&str> = issues.iter().map(|i| i.title.as_str()).collect();
        // Balance 80, early release 70, hip rotation 45 and nose-up 45 tie by title, arm 40
        assert_eq!(
            titles,
            vec!["Balance", "Early release", "Hip rotation", "Nose-up release", "Arm extension"]
        );
        assert_eq!(issues[0].level, IssueSeverity::High);
        assert_eq!(issues[1].level, IssueSeverity::High);
        assert_eq!(issues[4].level, IssueSeverity::Medium);

        // 15 + 15 + 10 + 10 + 10
        assert_eq!(issue_score(&issues, &config.scoring), 40);
    }

    #[test]
    fn test_issue_score_saturates() {
        let scoring = ScoringConfig::default();
        let issue = Issue::new(
            IssueSource::FormError(FormErrorKind::Rounding),
            "Rounding",
            90.0,
            "",
            &scoring,
        );
        let issues = vec![issue; 8];
        assert_eq!(issue_score(&issues, &scoring), 0);
        assert_eq!(issue_score(&[], &scoring), 100);
    }

    #[test]
    fn test_feedback_band_caps_issues() {
        let config = AnalysisConfig::default();
        let m = metrics([40.0, 20.0, 30.0, 45.0, 10.0]);
        let mut errors = FormErrorLog::new();
        errors.record(FormErrorKind::Rounding, 0.1, ErrorMeasure::Severity(50.0));
        errors.record(FormErrorKind::AllArm, 0.1, ErrorMeasure::Severity(30.0));

        let result = AnalysisResult::build(
            m,
            SupplementaryMetrics::default(),
            &EventSlots::new(),
            &errors,
            10,
            0,
            &config,
        );

        assert_eq!(result.overall_score, 29);
        assert_eq!(result.feedback.band, FeedbackBand::RecommendCoaching);
        assert_eq!(result.total_issue_count, 7);
        assert_eq!(result.issues.len(), 5);
        assert_eq!(result.overall_rating, Rating::Error);
        assert!(result.to_json().unwrap().contains("\"recommend_coaching\""));
    }

    #[test]
    fn test_band_cut_points() {
        let scoring = ScoringConfig::default();
        assert_eq!(FeedbackBand::from_score(85, &scoring), FeedbackBand::Excellent);
        assert_eq!(FeedbackBand::from_score(84, &scoring), FeedbackBand::Good);
        assert_eq!(FeedbackBand::from_score(50, &scoring), FeedbackBand::NeedsWork);
        assert_eq!(FeedbackBand::from_score(49, &scoring), FeedbackBand::RecommendCoaching);
        assert_eq!(FeedbackBand::Excellent.issue_limit(&scoring), 2);
    }
}
