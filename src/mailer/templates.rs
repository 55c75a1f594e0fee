// src/mailer/templates.rs
//! Email bodies. Each message goes out as HTML with a plain-text twin.

use chrono::{DateTime, Utc};
use maud::{html, Markup, DOCTYPE};
use rust_decimal::Decimal;

use crate::domain::drop_percent;
use crate::mailer::DropAlert;

pub struct EmailContent {
    pub subject: String,
    pub html: String,
    pub text: String,
}

pub fn money(currency: &str, amount: Decimal) -> String {
    format!("{currency}{amount:.2}")
}

fn pct(old: Decimal, new: Decimal) -> String {
    format!("{:.1}", drop_percent(old, new))
}

fn email_shell(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head { meta charset="utf-8"; title { (title) } }
            body style="font-family: Arial, sans-serif; background: #f4f4f4; padding: 20px;" {
                div style="max-width: 600px; margin: 0 auto; background: white; padding: 30px; border-radius: 10px;" {
                    (body)
                }
            }
        }
    }
}

pub fn drop_alert(alert: &DropAlert<'_>, currency: &str, now: DateTime<Utc>) -> EmailContent {
    let saved = alert.old_price - alert.new_price;
    let stamp = now.format("%Y-%m-%d %H:%M:%S UTC").to_string();

    let html = email_shell(
        "Price Drop Alert",
        html! {
            h1 style="text-align: center;" { "Price Drop Alert!" }
            div style="background: #ff6b6b; color: white; padding: 20px; border-radius: 8px; text-align: center;" {
                h2 { "Price dropped by " (pct(alert.old_price, alert.new_price)) "%" }
                p { "You save " (money(currency, saved)) }
            }
            div style="background: #f8f9fa; padding: 20px; border-radius: 8px; margin: 20px 0;" {
                h3 { (alert.product_name) }
                p style="text-decoration: line-through; color: #6c757d;" {
                    "Old price: " (money(currency, alert.old_price))
                }
                p style="color: #28a745; font-weight: bold;" {
                    "New price: " (money(currency, alert.new_price))
                }
                p { strong { "Threshold: " } (money(currency, alert.threshold_price)) }
            }
            p style="text-align: center;" {
                a href=(alert.url) style="background: #007bff; color: white; padding: 12px 24px; text-decoration: none; border-radius: 5px;" {
                    "View Product"
                }
            }
            p style="color: #6c757d; font-size: 0.9em; text-align: center;" { "Sent " (stamp) }
        },
    );

    let text = format!(
        "Price Drop Alert!\n\n\
         Product: {name}\n\
         Old Price: {old}\n\
         New Price: {new}\n\
         Price Drop: {saved} ({pct}%)\n\
         Threshold Price: {threshold}\n\n\
         View Product: {url}\n\n\
         Sent {stamp}\n",
        name = alert.product_name,
        old = money(currency, alert.old_price),
        new = money(currency, alert.new_price),
        saved = money(currency, saved),
        pct = pct(alert.old_price, alert.new_price),
        threshold = money(currency, alert.threshold_price),
        url = alert.url,
    );

    EmailContent {
        subject: format!("Price Drop Alert: {}", alert.product_name),
        html: html.into_string(),
        text,
    }
}

pub fn summary(alerts: &[DropAlert<'_>], currency: &str, now: DateTime<Utc>) -> EmailContent {
    let stamp = now.format("%Y-%m-%d %H:%M:%S UTC").to_string();

    let html = email_shell(
        "Price Tracker Summary",
        html! {
            h1 { "Price Tracker Summary" }
            p { "You have " (alerts.len()) " price drop(s) to review." }
            @for a in alerts {
                div style="border: 1px solid #ddd; margin: 10px 0; padding: 15px; border-radius: 5px;" {
                    h4 { (a.product_name) }
                    p {
                        span style="text-decoration: line-through; color: #6c757d;" { (money(currency, a.old_price)) }
                        " → "
                        span style="color: #28a745; font-weight: bold;" { (money(currency, a.new_price)) }
                        " (" (pct(a.old_price, a.new_price)) "% drop)"
                    }
                    p { a href=(a.url) { "View Product" } }
                }
            }
            p style="color: #6c757d; font-size: 0.9em;" { "Sent " (stamp) }
        },
    );

    let mut text = format!(
        "Price Tracker Summary\n\nYou have {} price drop(s) to review.\n\n",
        alerts.len()
    );
    for a in alerts {
        text.push_str(&format!(
            "Product: {}\nOld Price: {} -> New Price: {} ({}% drop)\nView Product: {}\n\n",
            a.product_name,
            money(currency, a.old_price),
            money(currency, a.new_price),
            pct(a.old_price, a.new_price),
            a.url
        ));
    }
    text.push_str(&format!("Sent {stamp}\n"));

    EmailContent {
        subject: format!("Price Tracker Summary - {} Price Drops", alerts.len()),
        html: html.into_string(),
        text,
    }
}

pub fn self_test(now: DateTime<Utc>) -> EmailContent {
    let stamp = now.format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let text = format!(
        "This is a test email from your Price Tracker.\n\n\
         If you received it, email notifications are configured correctly.\n\n\
         Sent {stamp}\n"
    );
    let html = email_shell(
        "Price Tracker Test",
        html! {
            h2 { "Price Tracker test email" }
            p { "If you received this, email notifications are configured correctly." }
            p style="color: #6c757d;" { "Sent " (stamp) }
        },
    );

    EmailContent {
        subject: "Price Tracker - Test Email".to_string(),
        html: html.into_string(),
        text,
    }
}
