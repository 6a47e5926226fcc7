use chrono::{Duration, Utc};
use credit_coach::coach::{
    CoachRepository, CreditScoreRecord, FinancialProfile, IdentityResolver, LoanRecord,
    LoanStatus, RepositoryError, TokenClaims, UserAccount, UserId,
};
use credit_coach::config::IdentityConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local record store keyed by subject.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCoachRepository {
    users: Arc<Mutex<HashMap<UserId, UserAccount>>>,
    profiles: Arc<Mutex<HashMap<UserId, FinancialProfile>>>,
    scores: Arc<Mutex<Vec<CreditScoreRecord>>>,
    loans: Arc<Mutex<Vec<LoanRecord>>>,
}

impl CoachRepository for InMemoryCoachRepository {
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
        let removed = self
            .users
            .lock()
            .expect("repository mutex poisoned")
            .remove(id);
        if removed.is_none() {
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
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
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
        // Stable sort keeps the later insert first when timestamps tie.
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
        if guard.iter().any(|existing| existing.id == loan.id) {
            return Err(RepositoryError::Conflict);
        }
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

/// Opaque bearer tokens registered in memory with a fixed lifetime.
pub(crate) struct InMemoryIdentity {
    tokens: Mutex<HashMap<String, TokenClaims>>,
    ttl: Duration,
}

impl InMemoryIdentity {
    pub(crate) fn new(ttl_minutes: u32) -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
            ttl: Duration::minutes(i64::from(ttl_minutes)),
        }
    }

    /// Builds the resolver and registers the configured demo token, if any.
    pub(crate) fn from_config(config: &IdentityConfig) -> Self {
        let identity = Self::new(config.token_ttl_minutes);
        if let Some(token) = &config.demo_token {
            identity.issue(token, UserId(config.default_user_id.clone()));
        }
        identity
    }

    pub(crate) fn issue(&self, token: &str, subject: UserId) -> TokenClaims {
        let issued_at = Utc::now();
        let claims = TokenClaims {
            sub: subject,
            issued_at,
            expires_at: issued_at + self.ttl,
        };
        self.tokens
            .lock()
            .expect("identity mutex poisoned")
            .insert(token.to_string(), claims.clone());
        claims
    }
}

impl IdentityResolver for InMemoryIdentity {
    fn resolve(&self, token: &str) -> Option<TokenClaims> {
        self.tokens
            .lock()
            .expect("identity mutex poisoned")
            .get(token)
            .cloned()
    }
}

/// Ensures the fallback subject has an account so profile routes work out of the box.
pub(crate) fn seed_default_user<R>(repository: &R, user: &UserId) -> Result<(), RepositoryError>
where
    R: CoachRepository,
{
    if repository.user(user)?.is_none() {
        repository.save_user(UserAccount {
            id: user.clone(),
            email: format!("user{}@example.com", user),
            is_active: true,
            is_onboarded: false,
            created_at: Utc::now(),
        })?;
    }
    Ok(())
}
