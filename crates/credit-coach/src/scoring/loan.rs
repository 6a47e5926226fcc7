use serde::{Deserialize, Serialize};

use super::round_to;

/// Tenures (in months) offered by the loan comparison view.
pub const COMPARISON_TENURES: [u32; 7] = [12, 24, 36, 48, 60, 72, 84];

/// Monthly installment for a fixed-payment loan, rounded to two decimals.
///
/// Returns `0.0` when the principal or tenure is not positive and falls back to an
/// unrounded straight-line split when the loan is interest free. No input is rejected;
/// callers that need stricter ranges validate before calling.
pub fn calculate_emi(principal: f64, annual_rate: f64, tenure_months: u32) -> f64 {
    if principal <= 0.0 || tenure_months == 0 {
        return 0.0;
    }

    if annual_rate <= 0.0 {
        return principal / f64::from(tenure_months);
    }

    let monthly_rate = annual_rate / 12.0 / 100.0;
    let growth = (1.0 + monthly_rate).powf(f64::from(tenure_months));
    if !growth.is_finite() {
        // Very long tenures converge on paying the monthly interest alone.
        return round_to(principal * monthly_rate, 2);
    }
    let emi = principal * monthly_rate * growth / (growth - 1.0);

    round_to(emi, 2)
}

/// Interest paid over the tenure. The value is signed: an understated `emi` yields a
/// negative result and it is up to the caller to pass a consistent installment.
pub fn calculate_total_interest(principal: f64, emi: f64, tenure_months: u32) -> f64 {
    round_to(emi * f64::from(tenure_months) - principal, 2)
}

/// EMI as a percentage of monthly income. Zero or negative income is the worst case (100).
pub fn calculate_emi_to_income_ratio(emi: f64, monthly_income: f64) -> f64 {
    if monthly_income <= 0.0 {
        return 100.0;
    }
    round_to(emi / monthly_income * 100.0, 2)
}

/// Affordability guidance selected by the post-loan EMI-to-income ratio.
pub fn loan_recommendation(emi_ratio: f64) -> &'static str {
    if emi_ratio > 50.0 {
        "This EMI is very high relative to your income. Consider a smaller loan amount or longer tenure to reduce monthly payments."
    } else if emi_ratio > 40.0 {
        "Consider extending tenure to reduce EMI. This loan may strain your monthly budget."
    } else if emi_ratio > 30.0 {
        "This loan is affordable but leaves less room for savings. Consider a smaller amount if possible."
    } else {
        "This loan fits well within your budget. You have healthy financial headroom."
    }
}

/// Terms of a single loan calculation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: f64,
    pub annual_rate: f64,
    pub tenure_months: u32,
}

impl LoanTerms {
    pub fn new(principal: f64, annual_rate: f64, tenure_months: u32) -> Self {
        Self {
            principal,
            annual_rate,
            tenure_months,
        }
    }

    pub fn emi(&self) -> f64 {
        calculate_emi(self.principal, self.annual_rate, self.tenure_months)
    }

    pub fn quote(&self) -> LoanQuote {
        let emi = self.emi();
        let total_interest = calculate_total_interest(self.principal, emi, self.tenure_months);

        LoanQuote {
            emi,
            total_interest,
            total_payment: self.principal + total_interest,
        }
    }
}

/// Repayment figures derived from [`LoanTerms`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoanQuote {
    pub emi: f64,
    pub total_interest: f64,
    pub total_payment: f64,
}

/// One row of the tenure comparison table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TenureOption {
    pub tenure_months: u32,
    pub emi: f64,
    pub total_interest: f64,
    pub total_payment: f64,
    pub emi_ratio: f64,
}

/// Quotes the loan across [`COMPARISON_TENURES`], including the resulting EMI burden.
pub fn compare_tenures(
    principal: f64,
    annual_rate: f64,
    monthly_income: f64,
    existing_emis: f64,
) -> Vec<TenureOption> {
    COMPARISON_TENURES
        .iter()
        .map(|&tenure_months| {
            let quote = LoanTerms::new(principal, annual_rate, tenure_months).quote();
            TenureOption {
                tenure_months,
                emi: quote.emi,
                total_interest: quote.total_interest,
                total_payment: quote.total_payment,
                emi_ratio: calculate_emi_to_income_ratio(existing_emis + quote.emi, monthly_income),
            }
        })
        .collect()
}

/// Formats a rupee amount with thousands separators and no minor units, e.g. `₹1,50,000`
/// is rendered as `₹150,000`.
pub fn format_inr(amount: f64) -> String {
    let whole = amount.abs().round_ties_even() as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if amount < 0.0 {
        format!("-₹{grouped}")
    } else {
        format!("₹{grouped}")
    }
}
