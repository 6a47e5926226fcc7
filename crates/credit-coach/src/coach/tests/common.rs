use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::coach::domain::{
    CreditScoreRecord, EmploymentType, FinancialProfile, LoanRecord, LoanStatus,
    OnboardingRequest, PlaygroundRequest, UserAccount, UserId,
};
use crate::coach::identity::{IdentityResolver, TokenClaims};
use crate::coach::repository::{CoachRepository, RepositoryError};
use crate::coach::{coach_router, CoachService};

pub(super) const DEMO_TOKEN: &str = "demo-token";

pub(super) fn user_id() -> UserId {
    UserId::from("1")
}

pub(super) fn account(id: &str) -> UserAccount {
    UserAccount {
        id: UserId::from(id),
        email: format!("user{id}@example.com"),
        is_active: true,
        is_onboarded: false,
        created_at: month_start(1),
    }
}

pub(super) fn month_start(month: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, month, 1, 0, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn profile(user: &str) -> FinancialProfile {
    let mut profile =
        FinancialProfile::empty(format!("profile-{user}"), UserId::from(user), month_start(1));
    profile.name = Some("Priya".to_string());
    profile.age = Some(29);
    profile.employment_type = Some(EmploymentType::Salaried);
    profile.monthly_income = 85_000.0;
    profile.monthly_expenses = 35_000.0;
    profile.existing_emis = 40_000.0;
    profile.credit_utilization = 65;
    profile.active_loans = 4;
    profile
}

pub(super) fn score(user: &str, value: u32, month: u32) -> CreditScoreRecord {
    let recorded_at = month_start(month);
    CreditScoreRecord {
        id: format!("score-{user}-{month}"),
        user_id: UserId::from(user),
        score: value,
        month: recorded_at.format("%b").to_string(),
        year: 2025,
        recorded_at,
    }
}

pub(super) fn playground_request() -> PlaygroundRequest {
    PlaygroundRequest {
        loan_amount: 500_000.0,
        interest_rate: 10.5,
        tenure_months: 60,
        monthly_income: None,
        monthly_expenses: None,
        existing_emis: None,
        credit_score: None,
        active_loans: None,
    }
}

pub(super) fn onboarding_request() -> OnboardingRequest {
    OnboardingRequest {
        name: Some("Arjun".to_string()),
        age: 31,
        employment_type: EmploymentType::Freelancer,
        monthly_income: 60_000.0,
        monthly_expenses: 20_000.0,
        existing_emis: Some(6_000.0),
        credit_utilization: Some(20),
        active_loans: Some(1),
    }
}

pub(super) type MemoryService = CoachService<MemoryRepository, StaticIdentity>;

pub(super) fn build_service() -> (MemoryService, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    repository
        .save_user(account("1"))
        .expect("seed default user");
    let service = CoachService::new(
        repository.clone(),
        Arc::new(StaticIdentity::with_token(DEMO_TOKEN, "1")),
        user_id(),
    );
    (service, repository)
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    coach_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    users: Arc<Mutex<HashMap<UserId, UserAccount>>>,
    profiles: Arc<Mutex<HashMap<UserId, FinancialProfile>>>,
    scores: Arc<Mutex<Vec<CreditScoreRecord>>>,
    loans: Arc<Mutex<Vec<LoanRecord>>>,
}

impl MemoryRepository {
    pub(super) fn score_count(&self, user: &UserId) -> usize {
        self.scores
            .lock()
            .expect("repository mutex poisoned")
            .iter()
            .filter(|record| &record.user_id == user)
            .count()
    }
}

impl CoachRepository for MemoryRepository {
    fn user(&self, id: &UserId) -> Result<Option<UserAccount>, RepositoryError> {
        let guard = self.users.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn save_user(&self, user: UserAccount) -> Result<UserAccount, RepositoryError> {
        let mut guard = self.users.lock().expect("repository mutex poisoned");
        guard.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    fn delete_user(&self, id: &UserId) -> Result<(), RepositoryError> {
        if self
            .users
            .lock()
            .expect("repository mutex poisoned")
            .remove(id)
            .is_none()
        {
            return Err(RepositoryError::NotFound);
        }
        self.profiles
            .lock()
            .expect("repository mutex poisoned")
            .remove(id);
        self.scores
            .lock()
            .expect("repository mutex poisoned")
            .retain(|record| &record.user_id != id);
        self.loans
            .lock()
            .expect("repository mutex poisoned")
            .retain(|loan| &loan.user_id != id);
        Ok(())
    }

    fn profile(&self, user: &UserId) -> Result<Option<FinancialProfile>, RepositoryError> {
        let guard = self.profiles.lock().expect("repository mutex poisoned");
        Ok(guard.get(user).cloned())
    }

    fn save_profile(&self, profile: FinancialProfile) -> Result<FinancialProfile, RepositoryError> {
        let mut guard = self.profiles.lock().expect("repository mutex poisoned");
        guard.insert(profile.user_id.clone(), profile.clone());
        Ok(profile)
    }

    fn insert_score(
        &self,
        record: CreditScoreRecord,
    ) -> Result<CreditScoreRecord, RepositoryError> {
        let mut guard = self.scores.lock().expect("repository mutex poisoned");
        guard.push(record.clone());
        Ok(record)
    }

    fn recent_scores(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<CreditScoreRecord>, RepositoryError> {
        let guard = self.scores.lock().expect("repository mutex poisoned");
        let mut records: Vec<CreditScoreRecord> = guard
            .iter()
            .rev()
            .filter(|record| &record.user_id == user)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        records.truncate(limit);
        Ok(records)
    }

    fn score_for_month(
        &self,
        user: &UserId,
        month: &str,
        year: i32,
    ) -> Result<Option<CreditScoreRecord>, RepositoryError> {
        let guard = self.scores.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .find(|record| &record.user_id == user && record.month == month && record.year == year)
            .cloned())
    }

    fn insert_loan(&self, loan: LoanRecord) -> Result<LoanRecord, RepositoryError> {
        let mut guard = self.loans.lock().expect("repository mutex poisoned");
        guard.push(loan.clone());
        Ok(loan)
    }

    fn loans(&self, user: &UserId) -> Result<Vec<LoanRecord>, RepositoryError> {
        let guard = self.loans.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .rev()
            .filter(|loan| &loan.user_id == user)
            .cloned()
            .collect())
    }

    fn update_loan_status(
        &self,
        user: &UserId,
        loan_id: &str,
        status: LoanStatus,
    ) -> Result<LoanRecord, RepositoryError> {
        let mut guard = self.loans.lock().expect("repository mutex poisoned");
        let loan = guard
            .iter_mut()
            .find(|loan| &loan.user_id == user && loan.id == loan_id)
            .ok_or(RepositoryError::NotFound)?;
        loan.status = status;
        Ok(loan.clone())
    }
}

pub(super) struct UnavailableRepository;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl CoachRepository for UnavailableRepository {
    fn user(&self, _id: &UserId) -> Result<Option<UserAccount>, RepositoryError> {
        offline()
    }

    fn save_user(&self, _user: UserAccount) -> Result<UserAccount, RepositoryError> {
        offline()
    }

    fn delete_user(&self, _id: &UserId) -> Result<(), RepositoryError> {
        offline()
    }

    fn profile(&self, _user: &UserId) -> Result<Option<FinancialProfile>, RepositoryError> {
        offline()
    }

    fn save_profile(&self, _profile: FinancialProfile) -> Result<FinancialProfile, RepositoryError> {
        offline()
    }

    fn insert_score(
        &self,
        _record: CreditScoreRecord,
    ) -> Result<CreditScoreRecord, RepositoryError> {
        offline()
    }

    fn recent_scores(
        &self,
        _user: &UserId,
        _limit: usize,
    ) -> Result<Vec<CreditScoreRecord>, RepositoryError> {
        offline()
    }

    fn score_for_month(
        &self,
        _user: &UserId,
        _month: &str,
        _year: i32,
    ) -> Result<Option<CreditScoreRecord>, RepositoryError> {
        offline()
    }

    fn insert_loan(&self, _loan: LoanRecord) -> Result<LoanRecord, RepositoryError> {
        offline()
    }

    fn loans(&self, _user: &UserId) -> Result<Vec<LoanRecord>, RepositoryError> {
        offline()
    }

    fn update_loan_status(
        &self,
        _user: &UserId,
        _loan_id: &str,
        _status: LoanStatus,
    ) -> Result<LoanRecord, RepositoryError> {
        offline()
    }
}

#[derive(Default)]
pub(super) struct StaticIdentity {
    tokens: HashMap<String, TokenClaims>,
}

impl StaticIdentity {
    pub(super) fn with_token(token: &str, subject: &str) -> Self {
        let issued_at = Utc::now();
        let mut tokens = HashMap::new();
        tokens.insert(
            token.to_string(),
            TokenClaims {
                sub: UserId::from(subject),
                issued_at,
                expires_at: issued_at + Duration::minutes(30),
            },
        );
        Self { tokens }
    }
}

impl IdentityResolver for StaticIdentity {
    fn resolve(&self, token: &str) -> Option<TokenClaims> {
        self.tokens.get(token).cloned()
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
