use std::sync::Arc;

use super::common::*;
use crate::coach::domain::{
    ComparisonQuery, CreditScoreSubmission, LoanStatus, LoanSubmission, ProfileUpdate,
    SimulateRequest, UserId,
};
use crate::coach::repository::{CoachRepository, RepositoryError};
use crate::coach::{estimated_score, CoachService, CoachServiceError};
use crate::scoring::{AlertCounts, ChiInputs, RiskLevel, SimulationError};

#[test]
fn current_chi_uses_defaults_without_records() {
    let (service, _) = build_service();

    let result = service.current_chi(&user_id());

    assert_eq!(result.chi_score, 86);
    assert_eq!(result.risk_level, RiskLevel::Low);
    assert_eq!(result.breakdown.credit_score.value, 742);
    assert_eq!(result.breakdown.active_loans.value, 2);
}

#[test]
fn current_chi_prefers_stored_profile_and_latest_score() {
    let (service, repository) = build_service();
    repository.save_profile(profile("1")).expect("profile saved");
    repository.insert_score(score("1", 650, 1)).expect("score saved");
    repository.insert_score(score("1", 780, 2)).expect("score saved");

    let result = service.current_chi(&user_id());

    assert_eq!(result.breakdown.credit_score.value, 780);
    assert_eq!(result.breakdown.active_loans.value, 4);
    assert_eq!(result.chi_score, 75);
}

#[test]
fn calculate_chi_rejects_out_of_range_inputs() {
    let (service, _) = build_service();
    let inputs = ChiInputs {
        credit_score: 950,
        emi_to_income_ratio: 10.0,
        active_loans: 1,
        missed_payments: 0,
    };

    match service.calculate_chi(inputs) {
        Err(CoachServiceError::Validation(err)) => assert_eq!(err.field, "credit_score"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn playground_with_defaults_matches_reference_quote() {
    let (service, _) = build_service();

    let outcome = service
        .playground(&user_id(), playground_request())
        .expect("playground succeeds");

    assert_eq!(outcome.emi, 10_746.95);
    assert_eq!(outcome.total_interest, 144_817.0);
    assert_eq!(outcome.total_payment, 644_817.0);
    assert_eq!(outcome.new_total_emi, 22_746.95);
    assert_eq!(outcome.new_emi_ratio, 26.76);
    assert_eq!(outcome.current_chi, 86);
    assert_eq!(outcome.new_chi, 80);
    assert_eq!(outcome.chi_change, -6);
    assert_eq!(outcome.risk_level, RiskLevel::Low);
    assert_eq!(
        outcome.recommendation,
        "This loan fits well within your budget. You have healthy financial headroom."
    );
}

#[test]
fn playground_reads_profile_unless_overridden() {
    let (service, repository) = build_service();
    repository.save_profile(profile("1")).expect("profile saved");
    repository.insert_score(score("1", 780, 3)).expect("score saved");

    let outcome = service
        .playground(&user_id(), playground_request())
        .expect("playground succeeds");
    assert_eq!(outcome.current_chi, 75);
    assert_eq!(outcome.new_chi, 69);
    assert_eq!(outcome.risk_level, RiskLevel::Medium);
    assert_eq!(outcome.new_emi_ratio, 59.7);

    let mut request = playground_request();
    request.existing_emis = Some(12_000.0);
    request.active_loans = Some(2);
    request.credit_score = Some(742);
    let overridden = service
        .playground(&user_id(), request)
        .expect("playground succeeds");
    assert_eq!(overridden.current_chi, 86);
    assert_eq!(overridden.new_chi, 80);
}

#[test]
fn playground_validates_ranges() {
    let (service, _) = build_service();
    let mut request = playground_request();
    request.interest_rate = 0.5;

    match service.playground(&user_id(), request) {
        Err(CoachServiceError::Validation(err)) => assert_eq!(err.field, "interest_rate"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn comparison_lists_every_tenure() {
    let (service, _) = build_service();

    let comparison = service.compare(
        &user_id(),
        ComparisonQuery {
            loan_amount: 500_000.0,
            interest_rate: 10.5,
            monthly_income: Some(100_000.0),
            existing_emis: Some(0.0),
        },
    );

    let tenures: Vec<u32> = comparison
        .options
        .iter()
        .map(|option| option.tenure_months)
        .collect();
    assert_eq!(tenures, vec![12, 24, 36, 48, 60, 72, 84]);
    assert_eq!(comparison.options[4].emi, 10_746.95);
    assert_eq!(comparison.options[4].emi_ratio, 10.75);
    assert!(comparison
        .options
        .windows(2)
        .all(|pair| pair[0].emi > pair[1].emi));
}

#[test]
fn risk_alerts_are_empty_without_profile() {
    let (service, _) = build_service();

    let view = service.risk_alerts(&user_id()).expect("alerts load");

    assert!(view.alerts.is_empty());
    assert_eq!(view.counts, AlertCounts::default());
}

#[test]
fn risk_alerts_use_score_trend_from_history() {
    let (service, repository) = build_service();
    repository.save_profile(profile("1")).expect("profile saved");
    repository.insert_score(score("1", 700, 1)).expect("score saved");
    repository.insert_score(score("1", 720, 2)).expect("score saved");
    repository.insert_score(score("1", 744, 3)).expect("score saved");

    let view = service.risk_alerts(&user_id()).expect("alerts load");
    let ids: Vec<&str> = view.alerts.iter().map(|alert| alert.id.as_str()).collect();

    assert_eq!(
        ids,
        vec![
            "high_emi_burden",
            "high_credit_utilization",
            "multiple_active_loans",
            "low_disposable_income",
            "score_improvement",
        ]
    );
    assert_eq!(
        view.counts,
        AlertCounts {
            high: 1,
            medium: 3,
            low: 1
        }
    );
    assert!(view.alerts[4].description.contains("improved by 44 points"));
}

#[test]
fn single_risk_alert_lookup() {
    let (service, repository) = build_service();
    repository.save_profile(profile("1")).expect("profile saved");

    let alert = service
        .risk_alert(&user_id(), "multiple_active_loans")
        .expect("alert triggered");
    assert_eq!(alert.title, "Multiple Active Loans");

    assert!(matches!(
        service.risk_alert(&user_id(), "low_credit_score"),
        Err(CoachServiceError::NotFound(_))
    ));
}

#[test]
fn simulate_falls_back_to_latest_then_default_score() {
    let (service, repository) = build_service();
    let request = |action: &str| SimulateRequest {
        action_id: action.to_string(),
        current_score: None,
    };

    let result = service
        .simulate(&user_id(), request("close_loan"))
        .expect("simulation runs");
    assert_eq!(result.current_score, 742);
    assert_eq!(result.projected_score, 757);

    repository.insert_score(score("1", 650, 2)).expect("score saved");
    let result = service
        .simulate(&user_id(), request("miss_emi"))
        .expect("simulation runs");
    assert_eq!(result.projected_score, 615);

    match service.simulate(&user_id(), request("unknown_id")) {
        Err(CoachServiceError::Simulation(SimulationError::UnknownAction(id))) => {
            assert_eq!(id, "unknown_id")
        }
        other => panic!("expected unknown action, got {other:?}"),
    }
}

#[test]
fn score_history_returns_last_six_oldest_first() {
    let (service, repository) = build_service();

    let empty = service.score_history(&user_id()).expect("history loads");
    assert!(empty.trend.is_empty());
    assert_eq!(empty.current_score, 742);

    for month in 1..=8 {
        repository
            .insert_score(score("1", 700 + month * 5, month))
            .expect("score saved");
    }

    let history = service.score_history(&user_id()).expect("history loads");
    let scores: Vec<u32> = history.trend.iter().map(|point| point.score).collect();
    assert_eq!(scores, vec![715, 720, 725, 730, 735, 740]);
    assert_eq!(history.trend[0].month, "Mar");
    assert_eq!(history.current_score, 740);
    assert_eq!(
        service.current_score(&user_id()).expect("score loads").score,
        740
    );
}

#[test]
fn add_score_validates_range() {
    let (service, repository) = build_service();

    let stored = service
        .add_score(
            &user_id(),
            CreditScoreSubmission {
                score: 768,
                month: "Feb".to_string(),
                year: 2025,
            },
        )
        .expect("score recorded");
    assert_eq!(stored.score, 768);
    assert_eq!(repository.score_count(&user_id()), 1);

    let rejected = service.add_score(
        &user_id(),
        CreditScoreSubmission {
            score: 299,
            month: "Feb".to_string(),
            year: 2025,
        },
    );
    assert!(matches!(rejected, Err(CoachServiceError::Validation(_))));
}

#[test]
fn profile_is_created_on_first_access() {
    let (service, repository) = build_service();

    let view = service.profile(&user_id()).expect("profile loads");

    assert_eq!(view.monthly_income, 0.0);
    assert_eq!(view.credit_utilization, 30);
    assert_eq!(view.emi_to_income_ratio, 0.0);
    assert_eq!(view.disposable_income, 0.0);
    assert_eq!(view.credit_score, None);
    assert!(repository
        .profile(&user_id())
        .expect("profile lookup")
        .is_some());
}

#[test]
fn profile_requires_user_record() {
    let (service, _) = build_service();

    assert!(matches!(
        service.profile(&UserId::from("99")),
        Err(CoachServiceError::NotFound("user"))
    ));
}

#[test]
fn onboarding_marks_user_and_seeds_one_score() {
    let (service, repository) = build_service();

    let view = service
        .onboard(&user_id(), onboarding_request())
        .expect("onboarding succeeds");

    assert!(view.is_onboarded);
    assert_eq!(view.name.as_deref(), Some("Arjun"));
    assert_eq!(view.emi_to_income_ratio, 10.0);
    assert_eq!(view.disposable_income, 34_000.0);
    assert_eq!(view.credit_score, Some(720));

    service
        .onboard(&user_id(), onboarding_request())
        .expect("repeat onboarding succeeds");
    assert_eq!(repository.score_count(&user_id()), 1);
}

#[test]
fn onboarding_rejects_minors() {
    let (service, _) = build_service();
    let mut request = onboarding_request();
    request.age = 17;

    match service.onboard(&user_id(), request) {
        Err(CoachServiceError::Validation(err)) => assert_eq!(err.field, "age"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn estimated_score_is_clamped_linear_in_utilization() {
    assert_eq!(estimated_score(0), 760);
    assert_eq!(estimated_score(30), 700);
    assert_eq!(estimated_score(100), 560);
}

#[test]
fn update_profile_recomputes_derived_figures() {
    let (service, repository) = build_service();
    repository.save_profile(profile("1")).expect("profile saved");

    let view = service
        .update_profile(
            &user_id(),
            ProfileUpdate {
                existing_emis: Some(17_000.0),
                ..ProfileUpdate::default()
            },
        )
        .expect("update succeeds");

    assert_eq!(view.existing_emis, 17_000.0);
    assert_eq!(view.monthly_income, 85_000.0);
    assert_eq!(view.emi_to_income_ratio, 20.0);
    assert_eq!(view.disposable_income, 33_000.0);
}

#[test]
fn loans_are_recorded_and_counted() {
    let (service, repository) = build_service();
    repository.save_profile(profile("1")).expect("profile saved");

    let loan = service
        .create_loan(
            &user_id(),
            LoanSubmission {
                loan_type: "personal".to_string(),
                principal_amount: 500_000.0,
                interest_rate: 10.5,
                tenure_months: 60,
                start_date: None,
            },
        )
        .expect("loan recorded");

    assert_eq!(loan.emi_amount, 10_746.95);
    assert_eq!(loan.status, LoanStatus::Active);
    assert_eq!(
        repository
            .profile(&user_id())
            .expect("profile lookup")
            .expect("profile exists")
            .active_loans,
        5
    );

    let closed = service
        .update_loan_status(&user_id(), &loan.id, LoanStatus::Closed)
        .expect("status updated");
    assert_eq!(closed.status, LoanStatus::Closed);
    assert_eq!(service.loans(&user_id()).expect("loans load").len(), 1);

    assert!(matches!(
        service.update_loan_status(&user_id(), "missing", LoanStatus::Closed),
        Err(CoachServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn delete_account_removes_dependent_records() {
    let (service, repository) = build_service();
    repository.save_profile(profile("1")).expect("profile saved");
    repository.insert_score(score("1", 700, 1)).expect("score saved");

    service.delete_account(&user_id()).expect("account deleted");

    assert_eq!(repository.score_count(&user_id()), 0);
    assert!(repository
        .profile(&user_id())
        .expect("profile lookup")
        .is_none());
    assert!(matches!(
        service.profile(&user_id()),
        Err(CoachServiceError::NotFound("user"))
    ));
}

#[test]
fn calculators_degrade_to_defaults_when_store_is_down() {
    let service = CoachService::new(
        Arc::new(UnavailableRepository),
        Arc::new(StaticIdentity::default()),
        user_id(),
    );

    assert_eq!(service.current_chi(&user_id()).chi_score, 86);
    assert_eq!(
        service
            .playground(&user_id(), playground_request())
            .expect("playground succeeds")
            .new_chi,
        80
    );
    assert!(matches!(
        service.risk_alerts(&user_id()),
        Err(CoachServiceError::Repository(RepositoryError::Unavailable(_)))
    ));
}

#[test]
fn subject_resolves_bearer_tokens() {
    let repository = Arc::new(MemoryRepository::default());
    let service = CoachService::new(
        repository,
        Arc::new(StaticIdentity::with_token("token-2", "2")),
        user_id(),
    );

    assert_eq!(service.subject(Some("Bearer token-2")), UserId::from("2"));
    assert_eq!(service.subject(Some("token-2")), UserId::from("2"));
    assert_eq!(service.subject(Some("Bearer stale")), user_id());
    assert_eq!(service.subject(None), user_id());
}
