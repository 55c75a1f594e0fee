use std::collections::HashMap;
use std::io::Read;

use astra::{Request, Response};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::context::AppContext;
use crate::errors::AppError;
use crate::responses::{
    file_response, html_response, json_error_response, json_response, json_status, redirect,
    ResultResp,
};
use crate::spreadsheets::ExportFormat;
use crate::templates::pages::{self, DashboardVm, DiagnosticsVm, ProductVm};
use crate::tracker::{self, AddProduct, DEFAULT_EXPORT_DAYS};

/// Largest request body read from a client.
const MAX_BODY: u64 = 64 * 1024;

/// Dispatches one request. `/api/...` routes always answer with JSON, errors
/// included; the rest return `Err` for the caller to render as a page.
pub fn handle(mut req: Request, ctx: &AppContext) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let query = parse_query(&req);
    let segs: Vec<&str> = path.trim_matches('/').split('/').collect();

    if segs.first() == Some(&"api") {
        let body = read_body(&mut req);
        return Ok(api_reply(&method, &segs[1..], &query, body, ctx));
    }

    match (method.as_str(), segs.as_slice()) {
        ("GET", [""]) => dashboard(ctx, query.get("notice").cloned()),

        ("POST", ["products"]) => {
            let form = parse_form(&read_body(&mut req)?);
            let added = tracker::add_product(ctx, add_request_from_form(&form)?)?;
            redirect(&format!("/products/{}", added.product.id))
        }

        ("GET", ["products", id]) => {
            let id = parse_id(id)?;
            let days = parse_days(&query, DEFAULT_EXPORT_DAYS)?;
            let vm = ProductVm {
                product: tracker::get_product(ctx, id)?,
                history: tracker::price_history(ctx, id, days)?,
                notifications: tracker::product_notifications(ctx, id)?,
                total_observations: tracker::observation_count(ctx, id)?,
                days,
                currency: ctx.config.currency_symbol.clone(),
            };
            html_response(pages::product_page(&vm))
        }

        ("POST", ["products", id, "check"]) => {
            let id = parse_id(id)?;
            let product = tracker::get_product(ctx, id)?;
            let outcome = tracker::check_product(ctx, id)?;
            html_response(pages::check_result_page(
                &product,
                &outcome,
                &ctx.config.currency_symbol,
            ))
        }

        ("POST", ["products", id, "deactivate"]) => {
            tracker::deactivate_product(ctx, parse_id(id)?)?;
            redirect("/?notice=Product+deactivated")
        }

        ("GET", ["products", id, "export"]) => {
            let format = match query.get("format") {
                Some(f) => f.parse::<ExportFormat>()?,
                None => ExportFormat::default(),
            };
            let days = parse_days(&query, DEFAULT_EXPORT_DAYS)?;
            file_response(tracker::export_history(ctx, parse_id(id)?, days, format)?)
        }

        ("POST", ["check-all"]) => {
            let report = tracker::check_all(ctx)?;
            html_response(pages::cycle_result_page(&report))
        }

        ("GET", ["diagnostics"]) => html_response(pages::diagnostics_page(&diagnostics_vm(ctx))),

        ("POST", ["diagnostics", "scrape"]) => {
            let form = parse_form(&read_body(&mut req)?);
            let url = required(&form, "url")?;
            let vm = DiagnosticsVm {
                scrape: Some(tracker::test_scraping(ctx, url)),
                ..diagnostics_vm(ctx)
            };
            html_response(pages::diagnostics_page(&vm))
        }

        ("POST", ["diagnostics", "email"]) => {
            let vm = DiagnosticsVm {
                email: Some(tracker::test_email(ctx)),
                ..diagnostics_vm(ctx)
            };
            html_response(pages::diagnostics_page(&vm))
        }

        _ => Err(AppError::NotFound(format!("No page at {path}"))),
    }
}

/// Renders any error from `handle` so the server always has a response.
pub fn respond(req: Request, ctx: &AppContext) -> Response {
    handle(req, ctx).unwrap_or_else(crate::responses::html_error_response)
}

fn dashboard(ctx: &AppContext, notice: Option<String>) -> ResultResp {
    let vm = DashboardVm {
        stats: tracker::statistics(ctx)?,
        products: tracker::list_products(ctx, false)?,
        currency: ctx.config.currency_symbol.clone(),
        notice,
    };
    html_response(pages::dashboard_page(&vm))
}

fn diagnostics_vm(ctx: &AppContext) -> DiagnosticsVm {
    DiagnosticsVm {
        database_ok: ctx.db.ping().is_ok(),
        strategies: ctx.scraper.strategy_names(),
        email_configured: ctx.config.mail.is_valid(),
        ..DiagnosticsVm::default()
    }
}

/// Runs an API route on an already-read body. Every failure, including
/// reading the body, becomes a JSON error.
pub(crate) fn api_reply(
    method: &str,
    segs: &[&str],
    query: &HashMap<String, String>,
    body: Result<Vec<u8>, AppError>,
    ctx: &AppContext,
) -> Response {
    body.and_then(|body| api(method, segs, query, &body, ctx))
        .unwrap_or_else(json_error_response)
}

#[derive(Deserialize)]
struct AddProductBody {
    url: String,
    threshold_price: Decimal,
    name: Option<String>,
    check_interval: Option<i64>,
}

#[derive(Deserialize)]
struct ScrapeBody {
    url: String,
}

fn api(
    method: &str,
    segs: &[&str],
    query: &HashMap<String, String>,
    body: &[u8],
    ctx: &AppContext,
) -> ResultResp {
    match (method, segs) {
        ("GET", ["products"]) => {
            let all = query.get("all").is_some_and(|v| v == "1" || v == "true");
            let products = tracker::list_products(ctx, all)?;
            json_response(&json!({ "success": true, "products": products }))
        }

        ("POST", ["products"]) => {
            let b: AddProductBody = parse_json(body)?;
            let added = tracker::add_product(
                ctx,
                AddProduct {
                    url: b.url,
                    threshold_price: b.threshold_price,
                    name: b.name,
                    check_interval_secs: b.check_interval,
                },
            )?;
            json_status(
                201,
                &json!({
                    "success": true,
                    "product_id": added.product.id,
                    "product": added.product,
                    "initial_price": added.initial_price,
                    "existed": added.existed,
                }),
            )
        }

        ("DELETE", ["products", id]) => {
            tracker::deactivate_product(ctx, parse_id(id)?)?;
            json_response(&json!({ "success": true }))
        }

        ("POST", ["products", id, "check"]) => {
            let outcome = tracker::check_product(ctx, parse_id(id)?)?;
            json_response(&json!({ "success": true, "result": outcome }))
        }

        ("GET", ["products", id, "history"]) => {
            let days = parse_days(query, DEFAULT_EXPORT_DAYS)?;
            let history = tracker::price_history(ctx, parse_id(id)?, days)?;
            json_response(&json!({ "success": true, "history": history }))
        }

        ("GET", ["products", id, "chart"]) => {
            let id = parse_id(id)?;
            let days = parse_days(query, DEFAULT_EXPORT_DAYS)?;
            let product = tracker::get_product(ctx, id)?;
            let history = tracker::price_history(ctx, id, days)?;
            if history.is_empty() {
                return Err(AppError::NotFound("No price history available".into()));
            }
            let timestamps: Vec<String> =
                history.iter().map(|o| o.observed_at.to_rfc3339()).collect();
            let prices: Vec<Decimal> = history.iter().map(|o| o.price).collect();
            json_response(&json!({
                "success": true,
                "chart": {
                    "title": format!("Price History - {}", product.name),
                    "timestamps": timestamps,
                    "prices": prices,
                    "threshold_price": product.threshold_price,
                }
            }))
        }

        ("GET", ["notifications"]) => {
            let limit = match query.get("limit") {
                Some(v) => v
                    .parse::<i64>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| AppError::BadRequest("limit must be a positive integer".into()))?,
                None => 50,
            };
            let notifications = tracker::recent_notifications(ctx, limit)?;
            json_response(&json!({ "success": true, "notifications": notifications }))
        }

        ("POST", ["notifications", "process"]) => {
            let report = tracker::process_pending_notifications(ctx)?;
            json_response(&json!({ "success": true, "result": report }))
        }

        ("POST", ["check-all"]) => {
            let report = tracker::check_all(ctx)?;
            json_response(&json!({ "success": true, "result": report }))
        }

        ("POST", ["test-scraping"]) => {
            let b: ScrapeBody = parse_json(body)?;
            if b.url.trim().is_empty() {
                return Err(AppError::BadRequest("URL is required".into()));
            }
            let diagnosis = tracker::test_scraping(ctx, &b.url);
            json_response(&json!({ "success": diagnosis.recommended.is_some(), "result": diagnosis }))
        }

        ("POST", ["test-email"]) => {
            let result = tracker::test_email(ctx);
            json_response(&json!({ "success": result.test_sent, "result": result }))
        }

        ("GET", ["statistics"]) => json_response(&tracker::statistics(ctx)?),

        _ => Err(AppError::NotFound(format!(
            "No API route for {method} /api/{}",
            segs.join("/")
        ))),
    }
}

fn read_body(req: &mut Request) -> Result<Vec<u8>, AppError> {
    let mut buf = Vec::new();
    req.body_mut()
        .reader()
        .take(MAX_BODY)
        .read_to_end(&mut buf)
        .map_err(|e| AppError::BadRequest(format!("could not read request body: {e}")))?;
    Ok(buf)
}

fn parse_query(req: &Request) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| parse_form(q.as_bytes()))
        .unwrap_or_default()
}

fn parse_form(body: &[u8]) -> HashMap<String, String> {
    url::form_urlencoded::parse(body).into_owned().collect()
}

fn parse_json<T: for<'de> Deserialize<'de>>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Missing required fields: {e}")))
}

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::NotFound(format!("No product with id '{raw}'")))
}

fn parse_days(query: &HashMap<String, String>, default: i64) -> Result<i64, AppError> {
    match query.get("days") {
        Some(v) => v
            .parse::<i64>()
            .ok()
            .filter(|d| *d > 0)
            .ok_or_else(|| AppError::BadRequest("days must be a positive integer".into())),
        None => Ok(default),
    }
}

fn required<'a>(form: &'a HashMap<String, String>, key: &str) -> Result<&'a str, AppError> {
    form.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("Missing required field: {key}")))
}

fn add_request_from_form(form: &HashMap<String, String>) -> Result<AddProduct, AppError> {
    let url = required(form, "url")?.to_string();
    let threshold_price = required(form, "threshold_price")?
        .parse::<Decimal>()
        .map_err(|_| AppError::BadRequest("Threshold price must be a number".into()))?;
    let check_interval_secs = match form.get("check_interval").map(|v| v.trim()) {
        Some(v) if !v.is_empty() => Some(
            v.parse::<i64>()
                .map_err(|_| AppError::BadRequest("Check interval must be a whole number".into()))?,
        ),
        _ => None,
    };

    Ok(AddProduct {
        url,
        threshold_price,
        name: form.get("name").cloned(),
        check_interval_secs,
    })
}
