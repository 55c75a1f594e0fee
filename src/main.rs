use crate::cli::Command;
use crate::config::Config;
use crate::context::AppContext;
use crate::router::respond;
use crate::scheduler::Scheduler;
use astra::Server;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod context;
mod cycle;
mod db;
mod domain;
mod errors;
mod mailer;
mod responses;
mod router;
mod scheduler;
mod scraper;
mod spreadsheets;
mod templates;
mod tracker;

#[cfg(test)]
mod tests;

fn main() {
    let command = match cli::parse_args(std::env::args().skip(1)) {
        Ok(Command::Help) => {
            println!("{}", cli::HELP);
            return;
        }
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e.public_message());
            std::process::exit(2);
        }
    };

    // Configuration first: it carries LOG_LEVEL and loads .env
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let ctx = match AppContext::start(config) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            eprintln!("{}", e.public_message());
            std::process::exit(1);
        }
    };

    let result = match command {
        Command::Serve => serve(ctx),
        Command::StartDaemon => daemon(ctx),
        other => cli::run(other, &ctx),
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "command failed");
        eprintln!("{}", e.public_message());
        std::process::exit(1);
    }
}

/// Dashboard in the foreground, scheduler in the background.
fn serve(ctx: AppContext) -> Result<(), errors::AppError> {
    let addr = ctx.config.listen_addr;
    let scheduler = Scheduler::start(ctx.clone(), ctx.config.cycle_interval)?;

    tracing::info!(%addr, "dashboard listening");
    println!("Starting server at http://{addr}");

    let server = Server::bind(&addr).max_workers(8);
    let result = server.serve(move |req, _info| respond(req, &ctx));

    let cycles = scheduler.stop();
    tracing::info!(cycles, "server shut down");

    result.map_err(|e| errors::AppError::Internal(format!("server ended with error: {e}")))
}

/// Scheduler only; runs until the process is killed. Each product's writes
/// are committed on their own, so an abrupt stop loses at most the check in
/// flight.
fn daemon(ctx: AppContext) -> Result<(), errors::AppError> {
    let interval = ctx.config.cycle_interval;
    println!(
        "Price checks every {}s. Press Ctrl+C to stop.",
        interval.as_secs()
    );
    let cycles = Scheduler::start(ctx, interval)?.join();
    tracing::info!(cycles, "daemon exited");
    Ok(())
}
