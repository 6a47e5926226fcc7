use super::domain::{
    CreditScoreRecord, FinancialProfile, LoanRecord, LoanStatus, UserAccount, UserId,
};

/// Storage abstraction so the coach service can be exercised in isolation.
pub trait CoachRepository: Send + Sync {
    fn user(&self, id: &UserId) -> Result<Option<UserAccount>, RepositoryError>;
    fn save_user(&self, user: UserAccount) -> Result<UserAccount, RepositoryError>;
    /// Removes the account together with its profile, scores, and loans.
    fn delete_user(&self, id: &UserId) -> Result<(), RepositoryError>;

    fn profile(&self, user: &UserId) -> Result<Option<FinancialProfile>, RepositoryError>;
    fn save_profile(&self, profile: FinancialProfile) -> Result<FinancialProfile, RepositoryError>;

    fn insert_score(&self, record: CreditScoreRecord)
        -> Result<CreditScoreRecord, RepositoryError>;
    /// Most recent records first.
    fn recent_scores(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<CreditScoreRecord>, RepositoryError>;
    fn score_for_month(
        &self,
        user: &UserId,
        month: &str,
        year: i32,
    ) -> Result<Option<CreditScoreRecord>, RepositoryError>;

    fn insert_loan(&self, loan: LoanRecord) -> Result<LoanRecord, RepositoryError>;
    /// Newest loans first.
    fn loans(&self, user: &UserId) -> Result<Vec<LoanRecord>, RepositoryError>;
    fn update_loan_status(
        &self,
        user: &UserId,
        loan_id: &str,
        status: LoanStatus,
    ) -> Result<LoanRecord, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
