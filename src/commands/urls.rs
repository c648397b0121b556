//! Commands for analyzed pages.

use super::render::{
    print_json, print_record, print_records, print_rejected, print_update, update_failed,
};
use super::Context;
use crate::api::ApiResponse;
use crate::error::Result;
use crate::validation::{validate_url, Field};
use crate::views::analyze::AnalyzeController;
use crate::views::dashboard::Dashboard;
use crate::views::{Route, Toast, ViewEffect, ViewUpdate};

pub async fn analyze(ctx: &Context, url: &str, open_chat: bool) -> Result<bool> {
    if ctx.json {
        if let Err(errors) = validate_url(url) {
            let message = errors.get(Field::Url).unwrap_or("Please enter a valid URL");
            return print_rejected(message);
        }
        let response = ctx.api.analyze_url(url.trim()).await;
        print_json(&response)?;
        return Ok(response.is_success());
    }
    if !ctx.require_login(&Route::Analyze) {
        return Ok(false);
    }

    let mut view = AnalyzeController::new(ctx.api.clone(), ctx.ui());
    let update = view.submit(url).await;
    if let Some(record) = view.last_record() {
        print_record(record);
        println!();
    }

    let target = match update.navigation() {
        Some(Route::Chat { id }) if open_chat => Some(id.clone()),
        _ => None,
    };
    match target {
        Some(id) => {
            // The chat opens right away, so only the toasts are shown.
            print_update(&ViewUpdate {
                effects: update.toasts().cloned().map(ViewEffect::Toast).collect(),
                field_errors: update.field_errors.clone(),
            });
            super::chat::interactive(ctx, &id).await
        }
        None => {
            print_update(&update);
            Ok(!update_failed(&update))
        }
    }
}

pub async fn show(ctx: &Context, id: &str) -> Result<bool> {
    let id = id.trim();
    if id.is_empty() {
        if ctx.json {
            return print_rejected("Invalid URL ID");
        }
        eprintln!("{}", Toast::error("Invalid URL ID").render());
        return Ok(false);
    }
    let response = ctx.api.get_url(id).await;
    if ctx.json {
        print_json(&response)?;
        return Ok(response.is_success());
    }
    match response {
        ApiResponse::Success(record) => {
            print_record(&record);
            Ok(true)
        }
        ApiResponse::Failure(failure) => {
            eprintln!("{}", Toast::error(failure.message).render());
            Ok(false)
        }
    }
}

pub async fn list(ctx: &Context) -> Result<bool> {
    if ctx.json {
        let response = ctx.api.list_urls().await;
        print_json(&response)?;
        return Ok(response.is_success());
    }
    if !ctx.require_login(&Route::Dashboard) {
        return Ok(false);
    }

    let mut dashboard = Dashboard::new(ctx.api.clone(), ctx.ui());
    let update = dashboard.load().await;
    print_update(&update);
    if update_failed(&update) {
        return Ok(false);
    }
    if dashboard.visible().is_empty() {
        println!("You haven't analyzed any URLs yet. Try `linklens analyze <url>`.");
    } else {
        print_records(dashboard.visible(), "Your Analyzed URLs");
    }
    Ok(true)
}

pub async fn search(ctx: &Context, query: &str) -> Result<bool> {
    if ctx.json {
        // A blank search shows every record.
        let query = query.trim();
        let response = if query.is_empty() {
            ctx.api.list_urls().await
        } else {
            ctx.api.search_urls(query).await
        };
        print_json(&response)?;
        return Ok(response.is_success());
    }
    if !ctx.require_login(&Route::Dashboard) {
        return Ok(false);
    }

    let mut dashboard = Dashboard::new(ctx.api.clone(), ctx.ui());
    let update = dashboard.search(query).await;
    print_update(&update);
    if update_failed(&update) {
        return Ok(false);
    }
    if !dashboard.visible().is_empty() {
        print_records(dashboard.visible(), "Search Results");
    }
    Ok(true)
}

pub async fn delete(ctx: &Context, id: &str) -> Result<bool> {
    if ctx.json {
        let id = id.trim();
        if id.is_empty() {
            return print_rejected("Invalid URL ID");
        }
        let response = ctx.api.delete_url(id).await;
        print_json(&response)?;
        return Ok(response.is_success());
    }

    let mut dashboard = Dashboard::new(ctx.api.clone(), ctx.ui());
    let loaded = dashboard.load().await;
    if update_failed(&loaded) {
        print_update(&loaded);
        // A rejected credential stops here. Other listing failures fall
        // through to the delete, which then asks for a reload.
        if ctx.api.session().credential().is_none() {
            return Ok(false);
        }
    }

    let update = dashboard.delete(id).await;
    print_update(&update);
    if update.reloads() {
        let reloaded = dashboard.load().await;
        print_update(&reloaded);
    }
    if update_failed(&update) {
        return Ok(false);
    }
    if !dashboard.visible().is_empty() {
        print_records(dashboard.visible(), "Your Analyzed URLs");
    }
    Ok(true)
}
