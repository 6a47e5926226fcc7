use crate::demo::{
    run_alerts, run_chi, run_demo, run_emi, run_simulation, AlertsArgs, ChiArgs, EmiArgs,
    SimulateArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use credit_coach::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Credit Coach",
    about = "Run the credit health API or explore its calculators from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Compute the Credit Health Index with its component breakdown
    Chi(ChiArgs),
    /// Quote the monthly installment and total interest for a loan
    Emi(EmiArgs),
    /// Project a credit score after a what-if action
    Simulate(SimulateArgs),
    /// Evaluate the risk rules against a financial profile
    Alerts(AlertsArgs),
    /// Walk a sample user through onboarding, loan planning, and alerts
    Demo,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Chi(args) => run_chi(args),
        Command::Emi(args) => run_emi(args),
        Command::Simulate(args) => run_simulation(args),
        Command::Alerts(args) => run_alerts(args),
        Command::Demo => run_demo(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["credit-coach-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_calculator_arguments() {
        let cli = Cli::try_parse_from([
            "credit-coach-api",
            "emi",
            "--amount",
            "500000",
            "--rate",
            "10.5",
            "--tenure",
            "60",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Emi(args)) => {
                assert_eq!(args.amount, 500_000.0);
                assert_eq!(args.tenure, 60);
            }
            other => panic!("expected emi command, got {other:?}"),
        }
    }
}
