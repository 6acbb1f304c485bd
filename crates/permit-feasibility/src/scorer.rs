//! Feasibility scoring over the reasoning service.
//!
//! Score, issues, and recommendations are three separate calls so one
//! failing never blocks the other two. Failures fall back to defaults and are
//! reported as degradation reasons; this stage never aborts a run.

use crate::extract::{extract_bullets, extract_issues, extract_score};
use crate::prompts::{issues_prompt, recommendations_prompt, score_prompt};
use permit_core::{
    Component, FeasibilityScore, ProjectMetadata, ReasoningService, ServiceError, StageOutcome,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Score used when the service gives no usable number
pub const DEFAULT_SCORE: u8 = 75;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeasibilityReport {
    pub score: FeasibilityScore,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

pub struct FeasibilityScorer {
    reasoning: Arc<dyn ReasoningService>,
    timeout: Duration,
}

impl FeasibilityScorer {
    pub fn new(reasoning: Arc<dyn ReasoningService>, timeout: Duration) -> Self {
        Self { reasoning, timeout }
    }

    /// Score a design. `low_confidence` issues (from ingestion) are appended
    /// after the service's own issues.
    pub async fn score(
        &self,
        components: &[Component],
        metadata: &ProjectMetadata,
        low_confidence: &[String],
    ) -> StageOutcome<FeasibilityReport> {
        let score_prompt = score_prompt(components, metadata);
        let issues_prompt = issues_prompt(components, metadata);
        let recommendations_prompt = recommendations_prompt(components, metadata);

        let (score_text, issues_text, recommendations_text) = tokio::join!(
            self.ask(&score_prompt),
            self.ask(&issues_prompt),
            self.ask(&recommendations_prompt),
        );

        let mut reasons = Vec::new();

        let score = match score_text {
            Ok(text) => match extract_score(&text) {
                Some(value) => FeasibilityScore {
                    value,
                    estimated: false,
                },
                None => {
                    reasons.push("score response contained no number".to_string());
                    estimated()
                }
            },
            Err(err) => {
                reasons.push(format!("score unavailable: {}", err));
                estimated()
            }
        };

        let mut issues = match issues_text {
            Ok(text) => extract_issues(&text),
            Err(err) => {
                reasons.push(format!("issues unavailable: {}", err));
                Vec::new()
            }
        };
        issues.extend(low_confidence.iter().cloned());

        let recommendations = match recommendations_text {
            Ok(text) => extract_bullets(&text),
            Err(err) => {
                reasons.push(format!("recommendations unavailable: {}", err));
                Vec::new()
            }
        };

        if score.estimated {
            issues.push(format!(
                "Feasibility score is an estimate ({}); manual review recommended",
                DEFAULT_SCORE
            ));
        }

        for reason in &reasons {
            tracing::warn!(%reason, "feasibility scoring degraded");
        }
        tracing::info!(
            score = score.value,
            estimated = score.estimated,
            issues = issues.len(),
            "feasibility scored"
        );

        StageOutcome::from_reasons(
            FeasibilityReport {
                score,
                issues,
                recommendations,
            },
            reasons,
        )
    }

    async fn ask(&self, prompt: &str) -> Result<String, ServiceError> {
        match tokio::time::timeout(self.timeout, self.reasoning.complete(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(ServiceError::Timeout(format!(
                "reasoning service did not answer within {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}

fn estimated() -> FeasibilityScore {
    FeasibilityScore {
        value: DEFAULT_SCORE,
        estimated: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use permit_core::ServiceResult;

    /// Answers by prompt kind; `None` means the call fails.
    struct ScriptedReasoning {
        score: Option<&'static str>,
        issues: Option<&'static str>,
        recommendations: Option<&'static str>,
    }

    #[async_trait]
    impl ReasoningService for ScriptedReasoning {
        async fn complete(&self, prompt: &str) -> ServiceResult<String> {
            let answer = if prompt.contains("from 0 to 100") {
                self.score
            } else if prompt.contains("List the concrete problems") {
                self.issues
            } else {
                self.recommendations
            };
            answer
                .map(str::to_string)
                .ok_or_else(|| ServiceError::Transport("connection reset".to_string()))
        }
    }

    fn scorer(reasoning: ScriptedReasoning) -> FeasibilityScorer {
        FeasibilityScorer::new(Arc::new(reasoning), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_service_score_is_not_estimated() {
        let outcome = scorer(ScriptedReasoning {
            score: Some("75 - solid design"),
            issues: Some("No issues found."),
            recommendations: Some("- Add a monitoring gateway"),
        })
        .score(&[], &ProjectMetadata::default(), &[])
        .await;

        assert!(!outcome.is_degraded());
        let report = outcome.value();
        assert_eq!(report.score.value, 75);
        assert!(!report.score.estimated);
        assert!(report.issues.is_empty());
        assert_eq!(report.recommendations, vec!["Add a monitoring gateway"]);
    }

    #[tokio::test]
    async fn test_unreachable_service_defaults_to_estimated_75() {
        let outcome = scorer(ScriptedReasoning {
            score: None,
            issues: None,
            recommendations: None,
        })
        .score(&[], &ProjectMetadata::default(), &[])
        .await;

        assert!(outcome.is_degraded());
        assert_eq!(outcome.reasons().len(), 3);
        let report = outcome.value();
        assert_eq!(report.score.value, DEFAULT_SCORE);
        assert!(report.score.estimated);
        assert!(report.recommendations.is_empty());
        assert_eq!(report.issues.len(), 1);
    }

    #[tokio::test]
    async fn test_calls_fail_independently() {
        let outcome = scorer(ScriptedReasoning {
            score: Some("Rating: 58"),
            issues: None,
            recommendations: Some("* Relocate the disconnect"),
        })
        .score(
            &[],
            &ProjectMetadata::default(),
            &["Low confidence: quantity for row 3 (XR100) was missing; assumed 1".to_string()],
        )
        .await;

        let report = outcome.value();
        assert_eq!(report.score.value, 58);
        assert!(!report.score.estimated);
        assert_eq!(report.issues.len(), 1);
        assert!(report.issues[0].starts_with("Low confidence"));
        assert_eq!(report.recommendations.len(), 1);
        assert_eq!(outcome.reasons().len(), 1);
    }

    #[tokio::test]
    async fn test_numberless_score_is_estimated() {
        let outcome = scorer(ScriptedReasoning {
            score: Some("It depends on the roof."),
            issues: Some("- Roof age unknown"),
            recommendations: Some(""),
        })
        .score(&[], &ProjectMetadata::default(), &[])
        .await;

        assert_eq!(outcome.value().score.value, DEFAULT_SCORE);
        assert!(outcome.value().score.estimated);
    }
}
