// src/cli.rs
use std::path::PathBuf;

use rust_decimal::Decimal;

use crate::context::AppContext;
use crate::cycle::{CheckOutcome, CycleReport};
use crate::errors::AppError;
use crate::mailer::templates::money;
use crate::spreadsheets::ExportFormat;
use crate::tracker::{self, AddProduct, DEFAULT_EXPORT_DAYS};

pub const HELP: &str = include_str!("cli_help.txt");

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Serve,
    StartDaemon,
    AddProduct(AddProduct),
    ListProducts { all: bool },
    CheckProduct(i64),
    CheckAll,
    ProcessNotifications,
    Statistics,
    TestScraping(String),
    TestEmail,
    ExportHistory {
        product_id: i64,
        format: ExportFormat,
        days: i64,
        out: Option<PathBuf>,
    },
    DeleteProduct { product_id: i64, force: bool },
    Help,
}

/// Parses everything after the program name. No arguments means `serve`.
pub fn parse_args<I>(args: I) -> Result<Command, AppError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let Some(cmd) = args.next() else {
        return Ok(Command::Serve);
    };

    let command = match cmd.as_str() {
        "serve" => Command::Serve,
        "start-daemon" => Command::StartDaemon,
        "add-product" => {
            let url = positional(&mut args, "URL")?;
            let threshold_price = positional(&mut args, "THRESHOLD")?
                .parse::<Decimal>()
                .map_err(|_| usage("THRESHOLD must be a number"))?;
            let mut name = None;
            let mut check_interval_secs = None;
            while let Some(a) = args.next() {
                match a.as_str() {
                    "--name" => name = Some(value(&mut args, "--name")?),
                    "--interval" => {
                        let v = value(&mut args, "--interval")?;
                        check_interval_secs = Some(
                            v.parse::<i64>()
                                .map_err(|_| usage("--interval must be a whole number of seconds"))?,
                        );
                    }
                    other => return Err(usage(&format!("Unknown arg: {other}"))),
                }
            }
            Command::AddProduct(AddProduct {
                url,
                threshold_price,
                name,
                check_interval_secs,
            })
        }
        "list-products" => {
            let mut all = false;
            for a in args.by_ref() {
                match a.as_str() {
                    "--all" | "-a" => all = true,
                    other => return Err(usage(&format!("Unknown arg: {other}"))),
                }
            }
            Command::ListProducts { all }
        }
        "check-product" => Command::CheckProduct(product_id(&mut args)?),
        "check-all" => Command::CheckAll,
        "process-notifications" => Command::ProcessNotifications,
        "statistics" => Command::Statistics,
        "test-scraping" => Command::TestScraping(positional(&mut args, "URL")?),
        "test-email" => Command::TestEmail,
        "export-history" => {
            let product_id = product_id(&mut args)?;
            let mut format = ExportFormat::default();
            let mut days = DEFAULT_EXPORT_DAYS;
            let mut out = None;
            while let Some(a) = args.next() {
                match a.as_str() {
                    "--format" => format = value(&mut args, "--format")?.parse()?,
                    "--days" => {
                        days = value(&mut args, "--days")?
                            .parse::<i64>()
                            .ok()
                            .filter(|d| *d > 0)
                            .ok_or_else(|| usage("--days must be a positive integer"))?;
                    }
                    "-o" | "--out" => out = Some(PathBuf::from(value(&mut args, "--out")?)),
                    other => return Err(usage(&format!("Unknown arg: {other}"))),
                }
            }
            Command::ExportHistory {
                product_id,
                format,
                days,
                out,
            }
        }
        "delete-product" => {
            let product_id = product_id(&mut args)?;
            let mut force = false;
            for a in args.by_ref() {
                match a.as_str() {
                    "--force" | "-f" => force = true,
                    other => return Err(usage(&format!("Unknown arg: {other}"))),
                }
            }
            Command::DeleteProduct { product_id, force }
        }
        "-h" | "--help" | "help" => Command::Help,
        other => return Err(usage(&format!("Unknown command: {other}"))),
    };

    if let Some(extra) = args.next() {
        return Err(usage(&format!("Unexpected argument: {extra}")));
    }
    Ok(command)
}

fn usage(msg: &str) -> AppError {
    AppError::BadRequest(format!("{msg} (see --help)"))
}

fn positional(args: &mut impl Iterator<Item = String>, what: &str) -> Result<String, AppError> {
    args.next().ok_or_else(|| usage(&format!("Missing {what}")))
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, AppError> {
    args.next()
        .ok_or_else(|| usage(&format!("Missing value for {flag}")))
}

fn product_id(args: &mut impl Iterator<Item = String>) -> Result<i64, AppError> {
    positional(args, "ID")?
        .parse::<i64>()
        .map_err(|_| usage("ID must be a whole number"))
}

/// Runs a one-shot command. `serve` and `start-daemon` are long-running and
/// handled by `main`.
pub fn run(cmd: Command, ctx: &AppContext) -> Result<(), AppError> {
    let currency = ctx.config.currency_symbol.as_str();

    match cmd {
        Command::Serve | Command::StartDaemon => Err(AppError::Internal(
            "long-running commands are started by main".into(),
        )),
        Command::Help => {
            println!("{HELP}");
            Ok(())
        }
        Command::AddProduct(req) => {
            let added = tracker::add_product(ctx, req)?;
            let verb = if added.existed { "Updated" } else { "Added" };
            println!(
                "{verb} product {}: {} at {} (alert below {})",
                added.product.id,
                added.product.name,
                money(currency, added.initial_price),
                money(currency, added.product.threshold_price)
            );
            Ok(())
        }
        Command::ListProducts { all } => {
            let products = tracker::list_products(ctx, all)?;
            if products.is_empty() {
                println!("No products tracked.");
            }
            for p in products {
                let price = p
                    .current_price
                    .map(|c| money(currency, c))
                    .unwrap_or_else(|| "N/A".into());
                let flag = if p.is_below_threshold() { " *" } else { "" };
                let state = if p.is_active { "" } else { " (inactive)" };
                println!(
                    "{:>4}  {:<8}  {:>12}  {:>12}{flag}  {}{state}",
                    p.id,
                    p.site.as_str(),
                    price,
                    money(currency, p.threshold_price),
                    p.name
                );
            }
            Ok(())
        }
        Command::CheckProduct(id) => {
            let outcome = tracker::check_product(ctx, id)?;
            print_outcome(id, &outcome, currency);
            match outcome {
                CheckOutcome::ScrapeFailed { error } => Err(AppError::BadRequest(format!(
                    "Could not check product {id}: {error}"
                ))),
                _ => Ok(()),
            }
        }
        Command::CheckAll => {
            let report = tracker::check_all(ctx)?;
            print_report(&report);
            Ok(())
        }
        Command::ProcessNotifications => {
            let r = tracker::process_pending_notifications(ctx)?;
            println!(
                "Processed {} pending notification(s): {} email(s) sent, {} failed",
                r.processed, r.emails_sent, r.failed
            );
            Ok(())
        }
        Command::Statistics => {
            let s = tracker::statistics(ctx)?;
            println!("Active products:        {}", s.active_products);
            println!("Products with drops:    {}", s.products_with_drops);
            println!("Notifications sent:     {}", s.notifications_sent);
            println!("Pending notifications:  {}", s.pending_notifications);
            println!("Average drop:           {:.2}%", s.avg_drop_percent);
            println!("Price observations:     {}", s.observations);
            Ok(())
        }
        Command::TestScraping(url) => {
            let d = tracker::test_scraping(ctx, &url);
            if let Some(err) = &d.error {
                return Err(AppError::BadRequest(err.clone()));
            }
            for o in &d.outcomes {
                match (&o.product, &o.error) {
                    (Some(p), _) => println!(
                        "{:<14} ok      {} at {}",
                        o.strategy,
                        p.name,
                        money(currency, p.price)
                    ),
                    (None, Some(e)) => println!("{:<14} failed  {e}", o.strategy),
                    (None, None) => println!("{:<14} failed", o.strategy),
                }
            }
            match d.recommended {
                Some(s) => {
                    println!("Recommended strategy: {s}");
                    Ok(())
                }
                None => Err(AppError::BadRequest(
                    "No strategy could read this page".into(),
                )),
            }
        }
        Command::TestEmail => {
            let t = tracker::test_email(ctx);
            println!("Configuration valid: {}", t.config_valid);
            println!("Connection:          {}", t.connection_ok);
            println!("Authentication:      {}", t.auth_ok);
            println!("Test email sent:     {}", t.test_sent);
            match t.error {
                Some(e) if !t.test_sent => Err(AppError::BadRequest(e)),
                _ => Ok(()),
            }
        }
        Command::ExportHistory {
            product_id,
            format,
            days,
            out,
        } => {
            let file = tracker::export_history(ctx, product_id, days, format)?;
            let path = out.unwrap_or_else(|| PathBuf::from(&file.filename));
            std::fs::write(&path, &file.bytes).map_err(|e| {
                AppError::Export(format!("could not write {}: {e}", path.display()))
            })?;
            println!("Wrote {} ({} bytes)", path.display(), file.bytes.len());
            Ok(())
        }
        Command::DeleteProduct { product_id, force } => {
            if !force {
                let p = tracker::get_product(ctx, product_id)?;
                return Err(AppError::BadRequest(format!(
                    "Refusing to stop tracking '{}' without --force",
                    p.name
                )));
            }
            tracker::deactivate_product(ctx, product_id)?;
            println!("Product {product_id} deactivated; its history is kept.");
            Ok(())
        }
    }
}

fn print_outcome(id: i64, outcome: &CheckOutcome, currency: &str) {
    match outcome {
        CheckOutcome::Skipped => println!("Product {id} is inactive; not checked."),
        CheckOutcome::ScrapeFailed { .. } => {}
        CheckOutcome::Checked {
            product_name,
            old_price,
            new_price,
            dropped,
            notification,
            ..
        } => {
            let old = old_price
                .map(|p| money(currency, p))
                .unwrap_or_else(|| "N/A".into());
            println!("{product_name}: {old} -> {}", money(currency, *new_price));
            if *dropped {
                match notification {
                    Some(n) if n.sent => println!("Price drop! Alert sent."),
                    _ => println!("Price drop! Alert could not be sent; it stays pending."),
                }
            }
        }
    }
}

fn print_report(r: &CycleReport) {
    println!(
        "Checked {}, drops {}, failed {}, skipped {}, email failures {}",
        r.checked, r.dropped, r.failed, r.skipped, r.notifications_failed
    );
    for e in &r.errors {
        println!("  [{}] {}: {}", e.product_id, e.product_name, e.message);
    }
}
