// src/tests/cli_tests.rs

use std::path::PathBuf;

use crate::cli::{parse_args, run, Command};
use crate::spreadsheets::ExportFormat;
use crate::tests::utils::*;

fn parse(args: &[&str]) -> Result<Command, crate::errors::AppError> {
    parse_args(args.iter().map(|s| s.to_string()))
}

#[test]
fn no_arguments_means_serve() {
    assert_eq!(parse(&[]).unwrap(), Command::Serve);
    assert_eq!(parse(&["start-daemon"]).unwrap(), Command::StartDaemon);
}

#[test]
fn add_product_with_options() {
    match parse(&[
        "add-product",
        "https://www.amazon.in/dp/X",
        "999.99",
        "--name",
        "Kettle",
        "--interval",
        "600",
    ])
    .unwrap()
    {
        Command::AddProduct(req) => {
            assert_eq!(req.url, "https://www.amazon.in/dp/X");
            assert_eq!(req.threshold_price, dec("999.99"));
            assert_eq!(req.name.as_deref(), Some("Kettle"));
            assert_eq!(req.check_interval_secs, Some(600));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn export_history_defaults_and_flags() {
    assert_eq!(
        parse(&["export-history", "3"]).unwrap(),
        Command::ExportHistory {
            product_id: 3,
            format: ExportFormat::Csv,
            days: 30,
            out: None,
        }
    );
    assert_eq!(
        parse(&["export-history", "3", "--format", "xlsx", "--days", "7", "--out", "h.xlsx"]).unwrap(),
        Command::ExportHistory {
            product_id: 3,
            format: ExportFormat::Xlsx,
            days: 7,
            out: Some(PathBuf::from("h.xlsx")),
        }
    );
}

#[test]
fn flags_and_positionals_are_checked() {
    assert_eq!(
        parse(&["list-products", "--all"]).unwrap(),
        Command::ListProducts { all: true }
    );
    assert_eq!(
        parse(&["delete-product", "4", "--force"]).unwrap(),
        Command::DeleteProduct {
            product_id: 4,
            force: true
        }
    );

    for bad in [
        vec!["add-product", "https://www.amazon.in/dp/X"],
        vec!["add-product", "https://www.amazon.in/dp/X", "cheap"],
        vec!["check-product", "seven"],
        vec!["export-history", "1", "--days", "0"],
        vec!["export-history", "1", "--format", "pdf"],
        vec!["check-all", "extra"],
        vec!["frobnicate"],
    ] {
        let err = parse(&bad).unwrap_err();
        assert_eq!(err.status(), 400, "{bad:?}");
    }
}

#[test]
fn delete_without_force_refuses() {
    let app = test_app();
    let id = seed_product(&app.ctx.db, &amazon_url(1), "100", None);

    let err = run(
        Command::DeleteProduct {
            product_id: id,
            force: false,
        },
        &app.ctx,
    )
    .unwrap_err();
    assert!(err.public_message().contains("--force"));
    assert_eq!(tracker_active(&app), 1);

    run(
        Command::DeleteProduct {
            product_id: id,
            force: true,
        },
        &app.ctx,
    )
    .unwrap();
    assert_eq!(tracker_active(&app), 0);
}

fn tracker_active(app: &TestApp) -> usize {
    crate::tracker::list_products(&app.ctx, false).unwrap().len()
}

#[test]
fn export_history_writes_the_file() {
    let app = test_app();
    let id = seed_product(&app.ctx.db, &amazon_url(2), "100", Some("120"));
    let out = app._dir.path().join("history.json");

    run(
        Command::ExportHistory {
            product_id: id,
            format: ExportFormat::Json,
            days: 30,
            out: Some(out.clone()),
        },
        &app.ctx,
    )
    .unwrap();

    let written = std::fs::read_to_string(out).unwrap();
    assert!(written.contains("\"120\""));
}

#[test]
fn failed_manual_check_is_an_error() {
    let app = test_app();
    let url = amazon_url(3);
    let id = seed_product(&app.ctx.db, &url, "100", None);
    app.scraper.fail(&url, crate::scraper::ScraperError::MissingPrice);

    assert!(run(Command::CheckProduct(id), &app.ctx).is_err());
}
