use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use super::domain::{
    validate_chi_inputs, ComparisonQuery, CreditScoreRecord, CreditScoreSubmission,
    FinancialProfile, LoanRecord, LoanStatus, LoanSubmission, OnboardingRequest,
    PlaygroundRequest, ProfileUpdate, SimulateRequest, UserId, ValidationError,
};
use super::identity::{resolve_subject, IdentityResolver};
use super::repository::{CoachRepository, RepositoryError};
use super::views::{
    CurrentScoreView, LoanComparison, PlaygroundOutcome, ProfileView, RiskAlertsView,
    ScoreHistoryView, ScoreTrendPoint,
};
use crate::scoring::{
    alert_counts, calculate_chi, calculate_emi, calculate_emi_to_income_ratio, compare_tenures,
    evaluate_alerts, loan_recommendation, risk_level, round_to, simulate_action,
    simulation_actions, ChiInputs, ChiResult, FinancialProfileSnapshot, LoanTerms,
    SimulationAction, SimulationError, SimulationResult, TriggeredAlert,
};

pub const DEFAULT_CREDIT_SCORE: u32 = 742;
pub const DEFAULT_MONTHLY_INCOME: f64 = 85_000.0;
pub const DEFAULT_EXISTING_EMIS: f64 = 12_000.0;
pub const DEFAULT_ACTIVE_LOANS: u32 = 2;
/// Score assumed by the alert engine when no score has been recorded.
pub const ALERT_FALLBACK_SCORE: u32 = 700;
/// Number of monthly score records shown in history and used for the trend.
pub const SCORE_HISTORY_WINDOW: usize = 6;

/// Service composing the scoring core with the record store and identity collaborators.
///
/// Calculator operations (CHI, playground, comparison, simulator) degrade to the
/// built-in defaults when the store cannot be read; record views and writes surface
/// store failures to the caller.
pub struct CoachService<R, I> {
    repository: Arc<R>,
    identity: Arc<I>,
    default_subject: UserId,
}

impl<R, I> CoachService<R, I>
where
    R: CoachRepository + 'static,
    I: IdentityResolver + 'static,
{
    pub fn new(repository: Arc<R>, identity: Arc<I>, default_subject: UserId) -> Self {
        Self {
            repository,
            identity,
            default_subject,
        }
    }

    /// Subject for a request carrying the given `Authorization` header value.
    pub fn subject(&self, authorization: Option<&str>) -> UserId {
        resolve_subject(
            self.identity.as_ref(),
            authorization,
            &self.default_subject,
            Utc::now(),
        )
    }

    pub fn current_chi(&self, user: &UserId) -> ChiResult {
        let credit_score = self.latest_score_or_default(user);
        let (income, emis, loans) = match self.stored_profile(user) {
            Some(profile) => (
                profile.monthly_income,
                profile.existing_emis,
                profile.active_loans,
            ),
            None => (
                DEFAULT_MONTHLY_INCOME,
                DEFAULT_EXISTING_EMIS,
                DEFAULT_ACTIVE_LOANS,
            ),
        };
        let emi_ratio = if income > 0.0 {
            emis / income * 100.0
        } else {
            0.0
        };

        ChiInputs {
            credit_score,
            emi_to_income_ratio: emi_ratio,
            active_loans: loans,
            missed_payments: 0,
        }
        .evaluate()
    }

    pub fn calculate_chi(&self, inputs: ChiInputs) -> Result<ChiResult, CoachServiceError> {
        validate_chi_inputs(&inputs)?;
        Ok(inputs.evaluate())
    }

    /// Quotes a prospective loan and its effect on the health index.
    pub fn playground(
        &self,
        user: &UserId,
        request: PlaygroundRequest,
    ) -> Result<PlaygroundOutcome, CoachServiceError> {
        request.validate()?;

        let profile = self.stored_profile(user);
        let monthly_income = request
            .monthly_income
            .or(profile.as_ref().map(|p| p.monthly_income))
            .unwrap_or(DEFAULT_MONTHLY_INCOME);
        let existing_emis = request
            .existing_emis
            .or(profile.as_ref().map(|p| p.existing_emis))
            .unwrap_or(DEFAULT_EXISTING_EMIS);
        let active_loans = request
            .active_loans
            .or(profile.as_ref().map(|p| p.active_loans))
            .unwrap_or(DEFAULT_ACTIVE_LOANS);
        let credit_score = match request.credit_score {
            Some(score) => score,
            None => self.latest_score_or_default(user),
        };

        let quote = LoanTerms::new(
            request.loan_amount,
            request.interest_rate,
            request.tenure_months,
        )
        .quote();
        let new_total_emi = existing_emis + quote.emi;
        let current_ratio = calculate_emi_to_income_ratio(existing_emis, monthly_income);
        let new_emi_ratio = calculate_emi_to_income_ratio(new_total_emi, monthly_income);

        let current_chi = calculate_chi(credit_score, current_ratio, active_loans, 0);
        let new_chi = calculate_chi(
            credit_score,
            new_emi_ratio,
            active_loans.saturating_add(1),
            0,
        );

        Ok(PlaygroundOutcome {
            emi: quote.emi,
            total_interest: quote.total_interest,
            total_payment: quote.total_payment,
            new_total_emi,
            new_emi_ratio: round_to(new_emi_ratio, 2),
            current_chi,
            new_chi,
            chi_change: new_chi as i32 - current_chi as i32,
            risk_level: risk_level(new_chi),
            recommendation: loan_recommendation(new_emi_ratio),
        })
    }

    pub fn compare(&self, user: &UserId, query: ComparisonQuery) -> LoanComparison {
        let profile = self.stored_profile(user);
        let income = query
            .monthly_income
            .or(profile.as_ref().map(|p| p.monthly_income))
            .unwrap_or(DEFAULT_MONTHLY_INCOME);
        let emis = query
            .existing_emis
            .or(profile.as_ref().map(|p| p.existing_emis))
            .unwrap_or(DEFAULT_EXISTING_EMIS);

        LoanComparison {
            loan_amount: query.loan_amount,
            interest_rate: query.interest_rate,
            options: compare_tenures(query.loan_amount, query.interest_rate, income, emis),
        }
    }

    /// Evaluates the risk rules against the stored profile. Users without a profile
    /// have nothing to evaluate and get an empty report.
    pub fn risk_alerts(&self, user: &UserId) -> Result<RiskAlertsView, CoachServiceError> {
        let Some(profile) = self.repository.profile(user)? else {
            debug!(user = %user, "no financial profile; skipping risk evaluation");
            return Ok(RiskAlertsView::empty());
        };

        let scores = self.repository.recent_scores(user, SCORE_HISTORY_WINDOW)?;
        let credit_score = scores
            .first()
            .map(|record| record.score)
            .unwrap_or(ALERT_FALLBACK_SCORE);
        let score_trend = match (scores.first(), scores.last()) {
            (Some(latest), Some(oldest)) if scores.len() > 1 => {
                latest.score as i32 - oldest.score as i32
            }
            _ => 0,
        };

        let snapshot = FinancialProfileSnapshot {
            credit_score,
            monthly_income: profile.monthly_income,
            monthly_expenses: profile.monthly_expenses,
            existing_emis: profile.existing_emis,
            credit_utilization: profile.credit_utilization,
            active_loans: profile.active_loans,
            missed_payments: 0,
            score_trend,
        };
        let alerts = evaluate_alerts(&snapshot);
        let counts = alert_counts(&alerts);

        Ok(RiskAlertsView { alerts, counts })
    }

    pub fn risk_alert(
        &self,
        user: &UserId,
        alert_id: &str,
    ) -> Result<TriggeredAlert, CoachServiceError> {
        self.risk_alerts(user)?
            .alerts
            .into_iter()
            .find(|alert| alert.id == alert_id)
            .ok_or(CoachServiceError::NotFound("risk alert"))
    }

    pub fn simulation_actions(&self) -> &'static [SimulationAction] {
        simulation_actions()
    }

    pub fn simulate(
        &self,
        user: &UserId,
        request: SimulateRequest,
    ) -> Result<SimulationResult, CoachServiceError> {
        let current_score = match request.current_score {
            Some(score) => score,
            None => self.latest_score_or_default(user) as i32,
        };
        Ok(simulate_action(&request.action_id, current_score)?)
    }

    pub fn score_history(&self, user: &UserId) -> Result<ScoreHistoryView, CoachServiceError> {
        let records = self.repository.recent_scores(user, SCORE_HISTORY_WINDOW)?;
        let current_score = records
            .first()
            .map(|record| record.score)
            .unwrap_or(DEFAULT_CREDIT_SCORE);
        let trend = records.iter().rev().map(ScoreTrendPoint::from).collect();

        Ok(ScoreHistoryView {
            trend,
            current_score,
        })
    }

    pub fn current_score(&self, user: &UserId) -> Result<CurrentScoreView, CoachServiceError> {
        let score = self
            .repository
            .recent_scores(user, 1)?
            .first()
            .map(|record| record.score)
            .unwrap_or(DEFAULT_CREDIT_SCORE);
        Ok(CurrentScoreView { score })
    }

    pub fn add_score(
        &self,
        user: &UserId,
        submission: CreditScoreSubmission,
    ) -> Result<CreditScoreRecord, CoachServiceError> {
        submission.validate()?;
        let record = CreditScoreRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user.clone(),
            score: submission.score,
            month: submission.month,
            year: submission.year,
            recorded_at: Utc::now(),
        };
        let stored = self.repository.insert_score(record)?;
        info!(user = %user, score = stored.score, "credit score recorded");
        Ok(stored)
    }

    /// Profile with derived ratios; a blank profile is created on first access.
    pub fn profile(&self, user: &UserId) -> Result<ProfileView, CoachServiceError> {
        let account = self
            .repository
            .user(user)?
            .ok_or(CoachServiceError::NotFound("user"))?;
        let profile = self.profile_or_create(user, Utc::now())?;
        let credit_score = self
            .repository
            .recent_scores(user, 1)?
            .first()
            .map(|record| record.score);

        let emi_to_income_ratio = if profile.monthly_income > 0.0 {
            round_to(profile.existing_emis / profile.monthly_income * 100.0, 2)
        } else {
            0.0
        };
        let disposable_income = round_to(
            profile.monthly_income - profile.monthly_expenses - profile.existing_emis,
            2,
        );

        Ok(ProfileView::new(
            &account,
            profile,
            credit_score,
            emi_to_income_ratio,
            disposable_income,
        ))
    }

    /// Stores the onboarding answers, marks the account onboarded, and seeds an
    /// estimated score for the current month when none exists yet.
    pub fn onboard(
        &self,
        user: &UserId,
        request: OnboardingRequest,
    ) -> Result<ProfileView, CoachServiceError> {
        request.validate()?;
        let mut account = self
            .repository
            .user(user)?
            .ok_or(CoachServiceError::NotFound("user"))?;

        let now = Utc::now();
        let mut profile = self
            .repository
            .profile(user)?
            .unwrap_or_else(|| FinancialProfile::empty(new_id(), user.clone(), now));
        if request.name.is_some() {
            profile.name = request.name;
        }
        profile.age = Some(request.age);
        profile.employment_type = Some(request.employment_type);
        profile.monthly_income = request.monthly_income;
        profile.monthly_expenses = request.monthly_expenses;
        profile.existing_emis = request.existing_emis.unwrap_or(0.0);
        profile.credit_utilization = request
            .credit_utilization
            .unwrap_or(FinancialProfile::DEFAULT_UTILIZATION);
        profile.active_loans = request.active_loans.unwrap_or(0);
        profile.updated_at = now;
        let profile = self.repository.save_profile(profile)?;

        account.is_onboarded = true;
        self.repository.save_user(account)?;

        self.seed_estimated_score(user, profile.credit_utilization, now)?;
        info!(user = %user, "onboarding completed");

        self.profile(user)
    }

    pub fn update_profile(
        &self,
        user: &UserId,
        update: ProfileUpdate,
    ) -> Result<ProfileView, CoachServiceError> {
        update.validate()?;
        let now = Utc::now();
        let mut profile = self.profile_or_create(user, now)?;
        update.apply(&mut profile);
        profile.updated_at = now;
        self.repository.save_profile(profile)?;
        info!(user = %user, "profile updated");

        self.profile(user)
    }

    pub fn loans(&self, user: &UserId) -> Result<Vec<LoanRecord>, CoachServiceError> {
        Ok(self.repository.loans(user)?)
    }

    /// Records a loan with its computed EMI and bumps the profile's active loan count.
    pub fn create_loan(
        &self,
        user: &UserId,
        submission: LoanSubmission,
    ) -> Result<LoanRecord, CoachServiceError> {
        submission.validate()?;
        let now = Utc::now();
        let loan = LoanRecord {
            id: new_id(),
            user_id: user.clone(),
            emi_amount: calculate_emi(
                submission.principal_amount,
                submission.interest_rate,
                submission.tenure_months,
            ),
            loan_type: submission.loan_type,
            principal_amount: submission.principal_amount,
            interest_rate: submission.interest_rate,
            tenure_months: submission.tenure_months,
            start_date: submission.start_date.unwrap_or(now),
            status: LoanStatus::Active,
            created_at: now,
        };
        let stored = self.repository.insert_loan(loan)?;

        if let Some(mut profile) = self.repository.profile(user)? {
            profile.active_loans = profile.active_loans.saturating_add(1);
            profile.updated_at = now;
            self.repository.save_profile(profile)?;
        }
        info!(user = %user, loan = %stored.id, emi = stored.emi_amount, "loan recorded");

        Ok(stored)
    }

    pub fn update_loan_status(
        &self,
        user: &UserId,
        loan_id: &str,
        status: LoanStatus,
    ) -> Result<LoanRecord, CoachServiceError> {
        Ok(self.repository.update_loan_status(user, loan_id, status)?)
    }

    pub fn delete_account(&self, user: &UserId) -> Result<(), CoachServiceError> {
        self.repository.delete_user(user)?;
        info!(user = %user, "account deleted");
        Ok(())
    }

    fn stored_profile(&self, user: &UserId) -> Option<FinancialProfile> {
        match self.repository.profile(user) {
            Ok(profile) => profile,
            Err(err) => {
                debug!(user = %user, error = %err, "profile unavailable; using defaults");
                None
            }
        }
    }

    fn latest_score_or_default(&self, user: &UserId) -> u32 {
        match self.repository.recent_scores(user, 1) {
            Ok(records) => records
                .first()
                .map(|record| record.score)
                .unwrap_or(DEFAULT_CREDIT_SCORE),
            Err(err) => {
                debug!(user = %user, error = %err, "score history unavailable; using default");
                DEFAULT_CREDIT_SCORE
            }
        }
    }

    fn profile_or_create(
        &self,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> Result<FinancialProfile, CoachServiceError> {
        match self.repository.profile(user)? {
            Some(profile) => Ok(profile),
            None => {
                let profile = FinancialProfile::empty(new_id(), user.clone(), now);
                info!(user = %user, "created default financial profile");
                Ok(self.repository.save_profile(profile)?)
            }
        }
    }

    fn seed_estimated_score(
        &self,
        user: &UserId,
        utilization: u32,
        now: DateTime<Utc>,
    ) -> Result<(), CoachServiceError> {
        let month = now.format("%b").to_string();
        let year = now.year();
        if self.repository.score_for_month(user, &month, year)?.is_some() {
            return Ok(());
        }

        let record = CreditScoreRecord {
            id: new_id(),
            user_id: user.clone(),
            score: estimated_score(utilization),
            month,
            year,
            recorded_at: now,
        };
        self.repository.insert_score(record)?;
        Ok(())
    }
}

/// Initial score estimate from credit utilization: two points per percent below 30%.
pub fn estimated_score(credit_utilization: u32) -> u32 {
    let estimate = 700 + (30 - i64::from(credit_utilization)) * 2;
    estimate.clamp(300, 900) as u32
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Error raised by the coach service.
#[derive(Debug, thiserror::Error)]
pub enum CoachServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("{0} not found")]
    NotFound(&'static str),
}
