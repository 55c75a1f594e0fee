// src/tests/router_tests.rs

use std::io::Read;

use astra::{Body, Request, Response};
use http::Method;

use crate::responses::ResultResp;
use crate::errors::AppError;
use crate::router::{api_reply, handle, respond};
use crate::tests::utils::*;

fn request(method: Method, uri: &str, body: &str, content_type: &str) -> Request {
    http::Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", content_type)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request {
    request(Method::GET, uri, "", "text/plain")
}

fn form(uri: &str, body: &str) -> Request {
    request(Method::POST, uri, body, "application/x-www-form-urlencoded")
}

fn json_post(uri: &str, body: &str) -> Request {
    request(Method::POST, uri, body, "application/json")
}

fn body_string(resp: Response) -> String {
    let mut body = String::new();
    resp.into_body().reader().read_to_string(&mut body).unwrap();
    body
}

fn body_json(resp: Response) -> serde_json::Value {
    serde_json::from_str(&body_string(resp)).unwrap()
}

fn err_status(result: ResultResp) -> u16 {
    match result {
        Ok(resp) => panic!("expected an error, got {}", resp.status()),
        Err(e) => e.status(),
    }
}

#[test]
fn dashboard_lists_active_products() {
    let app = test_app();
    seed_product(&app.ctx.db, &amazon_url(1), "1000", Some("1200"));

    let resp = handle(get("/"), &app.ctx).unwrap();

    assert_eq!(resp.status(), 200);
    let html = body_string(resp);
    assert!(html.contains("Dashboard"));
    assert!(html.contains(&format!("Product at {}", amazon_url(1))));
    assert!(html.contains("₹1200.00"));
}

#[test]
fn form_add_redirects_to_the_product_page() {
    let app = test_app();
    let url = amazon_url(2);
    app.scraper.price(&url, "1499");

    let body = format!(
        "url={}&threshold_price=1200&name=Kettle",
        url::form_urlencoded::byte_serialize(url.as_bytes()).collect::<String>()
    );
    let resp = handle(form("/products", &body), &app.ctx).unwrap();

    assert_eq!(resp.status(), 303);
    let location = resp.headers()["Location"].to_str().unwrap().to_string();
    assert!(location.starts_with("/products/"));

    let page = handle(get(&location), &app.ctx).unwrap();
    assert_eq!(page.status(), 200);
    let html = body_string(page);
    assert!(html.contains("Kettle"));
    assert!(html.contains("₹1499.00"));
    assert!(html.contains("<th>Checks recorded</th><td>1</td>"));
}

#[test]
fn form_add_with_bad_threshold_is_rejected() {
    let app = test_app();
    let status = err_status(handle(
        form("/products", "url=https%3A%2F%2Fwww.amazon.in%2Fdp%2FX&threshold_price=abc"),
        &app.ctx,
    ));
    assert_eq!(status, 400);
}

#[test]
fn unknown_pages_render_a_404_page() {
    let app = test_app();
    let resp = respond(get("/nope"), &app.ctx);
    assert_eq!(resp.status(), 404);
    assert!(body_string(resp).contains("Error 404"));

    let resp = respond(get("/products/abc"), &app.ctx);
    assert_eq!(resp.status(), 404);
}

#[test]
fn check_page_shows_the_drop() {
    let app = test_app();
    let url = amazon_url(3);
    let id = seed_product(&app.ctx.db, &url, "1000", Some("1200"));
    app.scraper.price(&url, "950");

    let resp = handle(
        request(Method::POST, &format!("/products/{id}/check"), "", "text/plain"),
        &app.ctx,
    )
    .unwrap();

    let html = body_string(resp);
    assert!(html.contains("Price drop detected"));
    assert!(html.contains("Alert email sent"));
}

#[test]
fn deactivate_then_dashboard_no_longer_lists_it() {
    let app = test_app();
    let url = amazon_url(4);
    let id = seed_product(&app.ctx.db, &url, "1000", None);

    let resp = handle(
        request(Method::POST, &format!("/products/{id}/deactivate"), "", "text/plain"),
        &app.ctx,
    )
    .unwrap();
    assert_eq!(resp.status(), 303);

    let html = body_string(handle(get("/?notice=Product+deactivated"), &app.ctx).unwrap());
    assert!(html.contains("Product deactivated"));
    assert!(!html.contains(&url));
}

#[test]
fn export_downloads_an_attachment() {
    let app = test_app();
    let id = seed_product(&app.ctx.db, &amazon_url(5), "1000", Some("1200"));

    let resp = handle(get(&format!("/products/{id}/export?format=csv&days=7")), &app.ctx).unwrap();

    assert_eq!(resp.status(), 200);
    let disposition = resp.headers()["Content-Disposition"].to_str().unwrap().to_string();
    assert!(disposition.contains(&format!("price_history_{id}.csv")));
    assert!(body_string(resp).starts_with("Date,Price\n"));

    let bad = err_status(handle(get(&format!("/products/{id}/export?format=pdf")), &app.ctx));
    assert_eq!(bad, 400);
}

#[test]
fn check_all_page_summarises_the_cycle() {
    let app = test_app();
    let url = amazon_url(6);
    seed_product(&app.ctx.db, &url, "1000", Some("1200"));
    app.scraper.fail(&url, crate::scraper::ScraperError::Timeout);

    let html = body_string(
        handle(request(Method::POST, "/check-all", "", "text/plain"), &app.ctx).unwrap(),
    );
    assert!(html.contains("Price check finished"));
    assert!(html.contains("Timed out"));
}

#[test]
fn diagnostics_page_reports_database_and_strategies() {
    let app = test_app();
    let html = body_string(handle(get("/diagnostics"), &app.ctx).unwrap());
    assert!(html.contains("Reachable: <span class=\"ok\">yes</span>"));
    assert!(html.contains("Strategies, in order: fake"));
}

#[test]
fn diagnostics_email_test_shows_the_result() {
    let app = test_app();
    let html = body_string(
        handle(request(Method::POST, "/diagnostics/email", "", "text/plain"), &app.ctx).unwrap(),
    );
    assert!(html.contains("Test email sent"));
    assert!(html.contains("fake"));
}

#[test]
fn api_lists_and_adds_products() {
    let app = test_app();
    let url = amazon_url(7);
    app.scraper.price(&url, "2000");

    let resp = handle(
        json_post(
            "/api/products",
            &format!(r#"{{"url": "{url}", "threshold_price": 1500}}"#),
        ),
        &app.ctx,
    )
    .unwrap();
    assert_eq!(resp.status(), 201);
    let created = body_json(resp);
    assert_eq!(created["success"], true);
    assert_eq!(created["initial_price"], "2000");

    let list = body_json(handle(get("/api/products"), &app.ctx).unwrap());
    assert_eq!(list["products"].as_array().unwrap().len(), 1);
}

#[test]
fn api_errors_are_json_with_status() {
    let app = test_app();

    let resp = handle(json_post("/api/products", "{}"), &app.ctx).unwrap();
    assert_eq!(resp.status(), 400);
    let body = body_json(resp);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("Missing required fields"));

    let resp = handle(
        request(Method::DELETE, "/api/products/999", "", "text/plain"),
        &app.ctx,
    )
    .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = handle(get("/api/unknown"), &app.ctx).unwrap();
    assert_eq!(resp.status(), 404);
}

#[test]
fn api_history_and_chart() {
    let app = test_app();
    let id = seed_product(&app.ctx.db, &amazon_url(8), "1000", Some("1200"));

    let history = body_json(handle(get(&format!("/api/products/{id}/history?days=7")), &app.ctx).unwrap());
    assert_eq!(history["history"].as_array().unwrap().len(), 1);

    let chart = body_json(handle(get(&format!("/api/products/{id}/chart")), &app.ctx).unwrap());
    assert_eq!(chart["chart"]["prices"][0], "1200");
    assert_eq!(chart["chart"]["threshold_price"], "1000");

    let empty = seed_product(&app.ctx.db, &amazon_url(9), "1000", None);
    let resp = handle(get(&format!("/api/products/{empty}/chart")), &app.ctx).unwrap();
    assert_eq!(resp.status(), 404);
}

#[test]
fn api_statistics_and_notifications() {
    let app = test_app();
    let url = amazon_url(10);
    seed_product(&app.ctx.db, &url, "1000", Some("1200"));
    app.scraper.price(&url, "900");
    app.notifier.set_succeed(false);

    let cycle = body_json(handle(json_post("/api/check-all", ""), &app.ctx).unwrap());
    assert_eq!(cycle["result"]["dropped"], 1);
    assert_eq!(cycle["result"]["notifications_failed"], 1);

    let stats = body_json(handle(get("/api/statistics"), &app.ctx).unwrap());
    assert_eq!(stats["pending_notifications"], 1);

    app.notifier.set_succeed(true);
    let processed = body_json(handle(json_post("/api/notifications/process", ""), &app.ctx).unwrap());
    assert_eq!(processed["result"]["emails_sent"], 1);

    let recent = body_json(handle(get("/api/notifications?limit=5"), &app.ctx).unwrap());
    let list = recent["notifications"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["event"]["email_sent"], true);
}

#[test]
fn api_test_scraping_requires_a_url() {
    let app = test_app();
    let resp = handle(json_post("/api/test-scraping", r#"{"url": " "}"#), &app.ctx).unwrap();
    assert_eq!(resp.status(), 400);

    let url = amazon_url(11);
    app.scraper.price(&url, "10");
    let ok = body_json(
        handle(json_post("/api/test-scraping", &format!(r#"{{"url": "{url}"}}"#)), &app.ctx).unwrap(),
    );
    assert_eq!(ok["success"], true);
    assert_eq!(ok["result"]["recommended"], "fake");
}

#[test]
fn unreadable_api_body_is_answered_with_json() {
    let app = test_app();
    let resp = api_reply(
        "POST",
        &["products"],
        &Default::default(),
        Err(AppError::BadRequest("could not read request body: reset".into())),
        &app.ctx,
    );

    assert_eq!(resp.status(), 400);
    assert_eq!(resp.headers()["Content-Type"], "application/json");
    let body = body_string(resp);
    assert!(body.contains(r#""success":false"#));
    assert!(body.contains("could not read request body"));
}
