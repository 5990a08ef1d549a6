mod browser;
mod cards;
mod catalog;
mod chat_bar;
mod cli;
mod error;
mod filters;
mod fmt;
mod logging;
mod mock;
mod models;
mod selection;
mod settings;
mod sorting;
mod store;
#[cfg(test)]
mod test_utils;
mod tui;

use clap::Parser;

use cli::dashboard::{Dashboard, SessionState};
use cli::{Cli, Commands, RunContext};

fn main() {
    logging::init_logging();
    let cli = Cli::parse();
    let ctx = RunContext::new(&cli);

    let result = match cli.command {
        None => run_dashboard(ctx, None),
        Some(Commands::Dashboard { variant }) => run_dashboard(ctx, variant),
        Some(Commands::Browse { filters, sort }) => cli::browse::run(&ctx, &filters, &sort),
        Some(Commands::List { filters, sort, json }) => cli::list::run(&ctx, &filters, &sort, json),
        Some(Commands::Periods {
            granularity,
            last,
            json,
        }) => cli::periods::run(granularity, last, json, ctx.today),
        Some(Commands::Accounts) => {
            cli::accounts::run();
            Ok(())
        }
        Some(Commands::Categories { all }) => {
            cli::categories::run(all);
            Ok(())
        }
        Some(Commands::Completions { shell }) => cli::completions(shell),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run_dashboard(ctx: RunContext, variant: Option<cards::DashboardVariant>) -> error::Result<()> {
    let mut settings = ctx.settings.clone();
    if let Some(v) = variant {
        settings.dashboard_variant = v;
    }
    let mut session = SessionState::default();
    let dashboard =
        Dashboard::new(ctx.store(), ctx.today, settings, &mut session).persist_settings(true);
    cli::dashboard::run(dashboard)
}
