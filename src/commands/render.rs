//! Terminal rendering of view updates, records and conversations.

use colored::Colorize;
use prettytable::{row, Table};
use serde::Serialize;

use crate::api::{ApiFailure, ApiResponse};
use crate::error::Result;
use crate::models::{ChatMessage, Role, UrlRecord, UserProfile};
use crate::views::chat::{format_message, MessageLine};
use crate::views::{Route, ToastLevel, ViewEffect, ViewUpdate};

/// Command that continues where a navigation would lead in the browser.
pub fn next_step(route: &Route) -> Option<String> {
    match route {
        Route::Home | Route::NotFound => None,
        Route::Login { .. } => Some("linklens login --email <email>".to_string()),
        Route::Register => Some("linklens register --username <name> --email <email>".to_string()),
        Route::VerifyEmail { email } => Some(format!("linklens verify --email {} <code>", email)),
        Route::ForgotPassword => Some("linklens forgot-password".to_string()),
        Route::Analyze => Some("linklens analyze <url>".to_string()),
        Route::Dashboard => Some("linklens list".to_string()),
        Route::Chat { id } => Some(format!("linklens chat {}", id)),
    }
}

/// Print toasts, field errors and navigation hints.
pub fn print_update(update: &ViewUpdate) {
    for (field, message) in update.field_errors.iter() {
        eprintln!("  {} {}: {}", "!".red().bold(), field, message);
    }
    for effect in &update.effects {
        match effect {
            ViewEffect::Toast(toast) if toast.level == ToastLevel::Error => {
                eprintln!("{}", toast.render())
            }
            ViewEffect::Toast(toast) => println!("{}", toast.render()),
            ViewEffect::Navigate { route, .. } => {
                if let Some(hint) = next_step(route) {
                    println!("{} {}", "next:".dimmed(), hint);
                }
            }
            ViewEffect::Reload { .. } => println!("{}", "Reloading...".dimmed()),
        }
    }
}

/// Whether the action behind `update` failed.
pub fn update_failed(update: &ViewUpdate) -> bool {
    !update.is_valid() || update.toasts().any(|t| t.level == ToastLevel::Error)
}

/// Pretty-print `value` as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print input rejected before any request, in the `--json` shape.
///
/// Always reports failure.
pub fn print_rejected(message: &str) -> Result<bool> {
    print_json(&ApiResponse::<()>::Failure(ApiFailure::generic(message)))?;
    Ok(false)
}

fn created(record: &UrlRecord) -> String {
    record
        .created_at
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Print records as a table under `heading`.
pub fn print_records(records: &[UrlRecord], heading: &str) {
    let mut table = Table::new();
    table.add_row(row!["ID", "Title", "URL", "Analyzed"]);
    for record in records {
        table.add_row(row![
            record.id,
            record.short_title(40),
            crate::models::truncate_chars(&record.original_url, 50),
            created(record)
        ]);
    }

    println!("\n{} ({}):\n", heading.bold(), records.len());
    table.printstd();
    println!();
}

/// Print every detail of one record.
pub fn print_record(record: &UrlRecord) {
    println!("{}", record.short_title(80).bold());
    println!("{} {}", "URL:".dimmed(), record.original_url);
    println!("{} {}", "ID:".dimmed(), record.id);
    println!("{} {}", "Analyzed:".dimmed(), created(record));

    if let Some(description) = &record.metadata.description {
        println!("{} {}", "Description:".dimmed(), description);
    }
    if let Some(keywords) = &record.metadata.keywords {
        println!("{} {}", "Keywords:".dimmed(), keywords);
    }
    if !record.summary.is_empty() {
        println!("\n{}\n{}", "Summary".bold(), record.summary);
    }
    if !record.headings.is_empty() {
        println!("\n{}", "Headings".bold());
        for heading in record.headings.iter().take(10) {
            println!("  - {}", heading);
        }
    }
}

/// Print the signed-in user's profile card.
pub fn print_profile(user: &UserProfile) {
    let mut table = Table::new();
    table.add_row(row!["Username", user.username]);
    table.add_row(row!["Email", user.email]);
    table.add_row(row!["Plan", user.plan_label()]);
    table.add_row(row!["Status", user.status_label()]);
    if let Some(created_at) = user.created_at {
        table.add_row(row!["Member since", created_at.format("%Y-%m-%d")]);
    }
    table.printstd();
}

/// Print one chat message with bullets and truncation notices styled.
pub fn print_message(message: &ChatMessage) {
    let speaker = match message.role {
        Role::User => "you".cyan().bold(),
        Role::Assistant => "ai".green().bold(),
    };
    if message.loading {
        println!("{} {}", speaker, "...".dimmed());
        return;
    }

    println!("{}", speaker);
    for line in format_message(&message.content) {
        match line {
            MessageLine::Bullet(item) => println!("  • {}", item),
            MessageLine::TruncationNotice(notice) => println!("  {}", notice.yellow().italic()),
            MessageLine::Text(text) => println!("  {}", text),
        }
    }
}
