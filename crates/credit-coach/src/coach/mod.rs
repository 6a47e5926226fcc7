//! Per-user coaching services layered over the scoring core.
//!
//! The record store and the credential verifier are collaborators behind
//! [`CoachRepository`] and [`IdentityResolver`]; the binary wires in concrete
//! implementations and the tests wire in memory-backed ones.

pub mod domain;
pub mod identity;
pub mod repository;
pub mod router;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{
    ComparisonQuery, CreditScoreRecord, CreditScoreSubmission, EmploymentType, FinancialProfile,
    LoanRecord, LoanStatus, LoanStatusUpdate, LoanSubmission, OnboardingRequest,
    PlaygroundRequest, ProfileUpdate, SimulateRequest, UserAccount, UserId, ValidationError,
};
pub use identity::{bearer_token, resolve_subject, IdentityResolver, TokenClaims};
pub use repository::{CoachRepository, RepositoryError};
pub use router::coach_router;
pub use service::{estimated_score, CoachService, CoachServiceError};
pub use views::{
    CurrentScoreView, LoanComparison, PlaygroundOutcome, ProfileView, RiskAlertsView,
    ScoreHistoryView, ScoreTrendPoint,
};
