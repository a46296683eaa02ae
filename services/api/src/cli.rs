use crate::demo::{
    run_demo, run_survey_filters, run_survey_report, DemoArgs, SurveyFiltersArgs,
    SurveyReportArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use dealer_csi::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Dealer CSI",
    about = "Post-delivery customer satisfaction reporting for the dealership back office",
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
    /// Build satisfaction reports from an exported survey feed
    Survey {
        #[command(subcommand)]
        command: SurveyCommand,
    },
    /// Walk through a report built from a synthetic survey feed
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum SurveyCommand {
    /// Print the satisfaction report for one filter selection
    Report(SurveyReportArgs),
    /// List the delivery years and months available for filtering
    Filters(SurveyFiltersArgs),
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
        Command::Survey {
            command: SurveyCommand::Report(args),
        } => run_survey_report(args),
        Command::Survey {
            command: SurveyCommand::Filters(args),
        } => run_survey_filters(args),
        Command::Demo(args) => run_demo(args),
    }
}
