use serde::{Deserialize, Serialize};

pub const MIN_CREDIT_SCORE: i32 = 300;
pub const MAX_CREDIT_SCORE: i32 = 900;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

/// What-if action with a fixed score impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimulationAction {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub impact: i32,
    pub direction: Direction,
    pub explanation: &'static str,
    pub alternative: &'static str,
}

static SIMULATION_ACTIONS: [SimulationAction; 6] = [
    SimulationAction {
        id: "miss_emi",
        title: "Miss 1 EMI",
        description: "See the impact of missing a single EMI payment",
        impact: -35,
        direction: Direction::Down,
        explanation: "Missing one EMI may reduce your score by ~30-40 points. Payment history accounts for 35% of your credit score.",
        alternative: "Set up auto-debit or extend tenure by 6 months to reduce EMI if you're tight on cash.",
    },
    SimulationAction {
        id: "increase_util",
        title: "Increase Utilization",
        description: "Use more of your available credit limit",
        impact: -25,
        direction: Direction::Down,
        explanation: "Increasing utilization above 70% signals credit dependency. Each 10% increase above 30% costs ~5-10 points.",
        alternative: "Request a credit limit increase instead, or spread expenses across multiple cards.",
    },
    SimulationAction {
        id: "extend_tenure",
        title: "Extend Tenure",
        description: "Increase your loan repayment period",
        impact: 5,
        direction: Direction::Up,
        explanation: "Extending tenure lowers your EMI-to-income ratio, which can slightly improve your credit health index.",
        alternative: "Consider this option if you need immediate cash flow relief.",
    },
    SimulationAction {
        id: "close_loan",
        title: "Close a Loan",
        description: "Pay off and close an existing loan",
        impact: 15,
        direction: Direction::Up,
        explanation: "Closing a loan reduces your debt burden and may improve your score by 10-20 points over 2-3 months.",
        alternative: "Prioritize closing high-interest loans first for maximum impact.",
    },
    SimulationAction {
        id: "reduce_utilization",
        title: "Reduce Utilization to 30%",
        description: "Pay down credit card balances",
        impact: 20,
        direction: Direction::Up,
        explanation: "Reducing utilization below 30% is optimal. Each 10% reduction below 50% can add 5-10 points.",
        alternative: "If you can't pay down, request a credit limit increase to lower the ratio.",
    },
    SimulationAction {
        id: "new_credit_inquiry",
        title: "Apply for New Credit",
        description: "Submit a new loan or credit card application",
        impact: -10,
        direction: Direction::Down,
        explanation: "Each hard inquiry reduces your score by 5-15 points temporarily. Multiple inquiries in short time have bigger impact.",
        alternative: "Space out credit applications by at least 6 months when possible.",
    },
];

pub fn simulation_actions() -> &'static [SimulationAction] {
    &SIMULATION_ACTIONS
}

pub fn simulation_action(action_id: &str) -> Option<&'static SimulationAction> {
    SIMULATION_ACTIONS
        .iter()
        .find(|action| action.id == action_id)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationResult {
    pub current_score: i32,
    pub projected_score: i32,
    pub impact: i32,
    pub direction: Direction,
    pub explanation: &'static str,
    pub alternative: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimulationError {
    #[error("Simulation action '{0}' not found")]
    UnknownAction(String),
}

/// Applies the action's impact to `current_score`, clamping the projection to 300..=900.
pub fn simulate_action(
    action_id: &str,
    current_score: i32,
) -> Result<SimulationResult, SimulationError> {
    let action = simulation_action(action_id)
        .ok_or_else(|| SimulationError::UnknownAction(action_id.to_string()))?;

    let projected_score = current_score
        .saturating_add(action.impact)
        .clamp(MIN_CREDIT_SCORE, MAX_CREDIT_SCORE);

    Ok(SimulationResult {
        current_score,
        projected_score,
        impact: action.impact,
        direction: action.direction,
        explanation: action.explanation,
        alternative: action.alternative,
    })
}
