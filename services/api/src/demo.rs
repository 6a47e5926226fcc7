use crate::infra::{seed_default_user, InMemoryCoachRepository, InMemoryIdentity};
use chrono::{Datelike, Months, Utc};
use clap::Args;
use credit_coach::coach::{
    CoachRepository, CoachService, CreditScoreRecord, EmploymentType, LoanSubmission,
    OnboardingRequest, PlaygroundRequest, SimulateRequest, UserId,
};
use credit_coach::error::AppError;
use credit_coach::scoring::{
    alert_counts, evaluate_alerts, format_inr, simulate_action, simulation_actions, ChiInputs,
    ChiResult, FinancialProfileSnapshot, LoanTerms, SimulationResult, TriggeredAlert,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ChiArgs {
    /// Bureau credit score (300-900)
    #[arg(long, value_parser = clap::value_parser!(u32).range(300..=900))]
    pub(crate) credit_score: u32,
    /// Total EMIs as a percentage of monthly income
    #[arg(long)]
    pub(crate) emi_ratio: f64,
    /// Number of open loans
    #[arg(long)]
    pub(crate) active_loans: u32,
    /// Missed payments over the trailing 12 months
    #[arg(long, default_value_t = 0)]
    pub(crate) missed_payments: u32,
}

#[derive(Args, Debug)]
pub(crate) struct EmiArgs {
    /// Loan principal in rupees
    #[arg(long)]
    pub(crate) amount: f64,
    /// Annual interest rate in percent
    #[arg(long)]
    pub(crate) rate: f64,
    /// Tenure in months
    #[arg(long)]
    pub(crate) tenure: u32,
}

#[derive(Args, Debug)]
pub(crate) struct SimulateArgs {
    /// Action identifier, e.g. close_loan or miss_emi
    #[arg(long)]
    pub(crate) action: String,
    /// Current credit score
    #[arg(long, default_value_t = 742)]
    pub(crate) score: i32,
}

#[derive(Args, Debug)]
pub(crate) struct AlertsArgs {
    #[arg(long, value_parser = clap::value_parser!(u32).range(300..=900))]
    pub(crate) credit_score: u32,
    #[arg(long)]
    pub(crate) income: f64,
    #[arg(long)]
    pub(crate) expenses: f64,
    #[arg(long)]
    pub(crate) emis: f64,
    /// Credit utilization percentage (0-100)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    pub(crate) utilization: u32,
    #[arg(long)]
    pub(crate) loans: u32,
    /// Score change over the last six months
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub(crate) trend: i32,
}

pub(crate) fn run_chi(args: ChiArgs) -> Result<(), AppError> {
    let result = ChiInputs {
        credit_score: args.credit_score,
        emi_to_income_ratio: args.emi_ratio,
        active_loans: args.active_loans,
        missed_payments: args.missed_payments,
    }
    .evaluate();
    print!("{}", render_chi(&result));
    Ok(())
}

pub(crate) fn run_emi(args: EmiArgs) -> Result<(), AppError> {
    print!(
        "{}",
        render_emi(&LoanTerms::new(args.amount, args.rate, args.tenure))
    );
    Ok(())
}

pub(crate) fn run_simulation(args: SimulateArgs) -> Result<(), AppError> {
    match simulate_action(&args.action, args.score) {
        Ok(result) => {
            print!("{}", render_simulation(&result));
            Ok(())
        }
        Err(err) => {
            eprintln!("Available actions:");
            for action in simulation_actions() {
                eprintln!("  {:<20} {:+} ({})", action.id, action.impact, action.title);
            }
            Err(err.into())
        }
    }
}

pub(crate) fn run_alerts(args: AlertsArgs) -> Result<(), AppError> {
    let snapshot = FinancialProfileSnapshot {
        credit_score: args.credit_score,
        monthly_income: args.income,
        monthly_expenses: args.expenses,
        existing_emis: args.emis,
        credit_utilization: args.utilization,
        active_loans: args.loans,
        missed_payments: 0,
        score_trend: args.trend,
    };
    print!("{}", render_alerts(&evaluate_alerts(&snapshot)));
    Ok(())
}

pub(crate) fn render_chi(result: &ChiResult) -> String {
    let breakdown = &result.breakdown;
    let mut out = format!(
        "Credit Health Index: {} ({} risk)\n",
        result.chi_score,
        result.risk_level.label()
    );
    for (label, score, max, weight) in [
        (
            "Credit score",
            breakdown.credit_score.component_score,
            breakdown.credit_score.max_score,
            &breakdown.credit_score.weight,
        ),
        (
            "EMI ratio",
            breakdown.emi_ratio.component_score,
            breakdown.emi_ratio.max_score,
            &breakdown.emi_ratio.weight,
        ),
        (
            "Active loans",
            breakdown.active_loans.component_score,
            breakdown.active_loans.max_score,
            &breakdown.active_loans.weight,
        ),
        (
            "Payment history",
            breakdown.missed_payments.component_score,
            breakdown.missed_payments.max_score,
            &breakdown.missed_payments.weight,
        ),
    ] {
        out.push_str(&format!("  {label:<16} {score:>5.1} / {max} ({weight})\n"));
    }
    out
}

pub(crate) fn render_emi(terms: &LoanTerms) -> String {
    let quote = terms.quote();
    [
        format!(
            "Loan of {} at {}% for {} months",
            format_inr(terms.principal),
            terms.annual_rate,
            terms.tenure_months
        ),
        format!("  Monthly EMI:    {} ({:.2})", format_inr(quote.emi), quote.emi),
        format!("  Total interest: {}", format_inr(quote.total_interest)),
        format!("  Total payment:  {}", format_inr(quote.total_payment)),
    ]
    .iter()
    .map(|line| format!("{line}\n"))
    .collect()
}

pub(crate) fn render_simulation(result: &SimulationResult) -> String {
    format!(
        "Score {} -> {} ({:+})\n  {}\n  Alternative: {}\n",
        result.current_score,
        result.projected_score,
        result.impact,
        result.explanation,
        result.alternative
    )
}

pub(crate) fn render_alerts(alerts: &[TriggeredAlert]) -> String {
    let counts = alert_counts(alerts);
    let mut out = format!(
        "Risk alerts: {} high, {} medium, {} low\n",
        counts.high, counts.medium, counts.low
    );
    for alert in alerts {
        out.push_str(&format!(
            "  [{}] {}: {}\n",
            alert.severity.label(),
            alert.title,
            alert.description
        ));
    }
    out
}

/// Runs one user through the service end to end against the in-memory store.
pub(crate) fn run_demo() -> Result<(), AppError> {
    let user = UserId::from("1");
    let repository = Arc::new(InMemoryCoachRepository::default());
    if let Err(err) = seed_default_user(repository.as_ref(), &user) {
        println!("Repository unavailable: {err}");
        return Ok(());
    }
    let identity = Arc::new(InMemoryIdentity::new(30));
    let service = CoachService::new(repository.clone(), identity, user.clone());

    println!("Credit coach demo");

    let onboarding = OnboardingRequest {
        name: Some("Priya".to_string()),
        age: 29,
        employment_type: EmploymentType::Salaried,
        monthly_income: 85_000.0,
        monthly_expenses: 35_000.0,
        existing_emis: Some(12_000.0),
        credit_utilization: Some(45),
        active_loans: Some(2),
    };
    match service.onboard(&user, onboarding) {
        Ok(profile) => println!(
            "  Onboarded {}: income {}, disposable {}, EMI ratio {:.2}%",
            profile.name.as_deref().unwrap_or("user"),
            format_inr(profile.monthly_income),
            format_inr(profile.disposable_income),
            profile.emi_to_income_ratio
        ),
        Err(err) => {
            println!("  Onboarding rejected: {err}");
            return Ok(());
        }
    }

    seed_score_history(repository.as_ref(), &user);

    println!("\nCurrent health");
    print!("{}", render_chi(&service.current_chi(&user)));

    println!("\nLoan playground");
    let request = PlaygroundRequest {
        loan_amount: 500_000.0,
        interest_rate: 10.5,
        tenure_months: 60,
        monthly_income: None,
        monthly_expenses: None,
        existing_emis: None,
        credit_score: None,
        active_loans: None,
    };
    match service.playground(&user, request) {
        Ok(outcome) => {
            println!(
                "  EMI {} | CHI {} -> {} ({:+}) | new EMI ratio {:.2}%",
                format_inr(outcome.emi),
                outcome.current_chi,
                outcome.new_chi,
                outcome.chi_change,
                outcome.new_emi_ratio
            );
            println!("  {}", outcome.recommendation);
        }
        Err(err) => println!("  Playground unavailable: {err}"),
    }

    let loan = LoanSubmission {
        loan_type: "personal".to_string(),
        principal_amount: 500_000.0,
        interest_rate: 10.5,
        tenure_months: 60,
        start_date: None,
    };
    match service.create_loan(&user, loan) {
        Ok(record) => println!(
            "  Recorded {} loan with EMI {}",
            record.loan_type,
            format_inr(record.emi_amount)
        ),
        Err(err) => println!("  Loan rejected: {err}"),
    }

    println!();
    match service.risk_alerts(&user) {
        Ok(view) => print!("{}", render_alerts(&view.alerts)),
        Err(err) => println!("Risk alerts unavailable: {err}"),
    }

    println!("\nWhat if I close a loan?");
    let request = SimulateRequest {
        action_id: "close_loan".to_string(),
        current_score: None,
    };
    match service.simulate(&user, request) {
        Ok(result) => print!("{}", render_simulation(&result)),
        Err(err) => println!("  Simulation unavailable: {err}"),
    }

    Ok(())
}

fn seed_score_history<R: CoachRepository>(repository: &R, user: &UserId) {
    let now = Utc::now();
    for (months_back, score) in [(5u32, 698u32), (4, 705), (3, 716), (2, 722), (1, 731)] {
        let Some(recorded_at) = now.checked_sub_months(Months::new(months_back)) else {
            continue;
        };
        let record = CreditScoreRecord {
            id: format!("demo-score-{months_back}"),
            user_id: user.clone(),
            score,
            month: recorded_at.format("%b").to_string(),
            year: recorded_at.year(),
            recorded_at,
        };
        if let Err(err) = repository.insert_score(record) {
            println!("  Score history unavailable: {err}");
            return;
        }
    }
}
