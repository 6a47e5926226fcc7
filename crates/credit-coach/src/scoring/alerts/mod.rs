//! Rule-based risk alerts.
//!
//! Each rule in [`RISK_RULES`] is evaluated on its own against one derived snapshot. A rule
//! whose predicate or description template fails is logged and skipped; the rest of the
//! batch still reports.

mod rules;
mod snapshot;
mod template;

pub use rules::{Comparator, NamedPredicate, RiskRule, RuleCondition, RuleError, RISK_RULES};
pub use snapshot::{DerivedSnapshot, FinancialProfileSnapshot, SnapshotField};
pub use template::{render, TemplateContext, TemplateError, TemplateValue};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Position in the reporting order (high first).
    pub fn rank(&self) -> u8 {
        match self {
            Severity::High => 0,
            Severity::Medium => 1,
            Severity::Low => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

/// Alert produced by a rule that fired during one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggeredAlert {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub rule: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Number of triggered alerts per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, thiserror::Error)]
enum RuleFailure {
    #[error("predicate failed: {0}")]
    Predicate(#[from] RuleError),
    #[error("description failed: {0}")]
    Template(#[from] TemplateError),
}

/// Evaluates the built-in catalog, stamping alerts with the current time.
pub fn evaluate_alerts(snapshot: &FinancialProfileSnapshot) -> Vec<TriggeredAlert> {
    evaluate_rules(&RISK_RULES, snapshot, Utc::now())
}

/// Evaluates the built-in catalog with a fixed generation timestamp.
pub fn evaluate_alerts_at(
    snapshot: &FinancialProfileSnapshot,
    created_at: DateTime<Utc>,
) -> Vec<TriggeredAlert> {
    evaluate_rules(&RISK_RULES, snapshot, created_at)
}

/// Evaluates `rules` in order and returns the triggered alerts sorted high, medium, low.
/// Alerts of equal severity keep catalog order.
pub fn evaluate_rules(
    rules: &[RiskRule],
    snapshot: &FinancialProfileSnapshot,
    created_at: DateTime<Utc>,
) -> Vec<TriggeredAlert> {
    let derived = snapshot.derive();
    let context = derived.template_context();

    let mut alerts: Vec<TriggeredAlert> = rules
        .iter()
        .filter_map(
            |rule| match apply_rule(rule, &derived, &context, created_at) {
                Ok(alert) => alert,
                Err(err) => {
                    warn!(rule = rule.id, error = %err, "skipping risk rule");
                    None
                }
            },
        )
        .collect();

    alerts.sort_by_key(|alert| alert.severity.rank());
    alerts
}

fn apply_rule(
    rule: &RiskRule,
    snapshot: &DerivedSnapshot,
    context: &TemplateContext,
    created_at: DateTime<Utc>,
) -> Result<Option<TriggeredAlert>, RuleFailure> {
    if !rule.condition.evaluate(snapshot)? {
        return Ok(None);
    }

    let description = render(rule.template, context)?;

    Ok(Some(TriggeredAlert {
        id: rule.id.to_string(),
        title: rule.title.to_string(),
        description,
        severity: rule.severity,
        rule: rule.rule.to_string(),
        created_at,
        is_active: true,
    }))
}

pub fn alert_counts(alerts: &[TriggeredAlert]) -> AlertCounts {
    alerts
        .iter()
        .fold(AlertCounts::default(), |mut counts, alert| {
            match alert.severity {
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
            }
            counts
        })
}
