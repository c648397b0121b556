//! Chat commands: one-shot questions, history and the interactive chat.
//!
//! The interactive chat runs a readline loop. Each line is sent as a
//! question about the page; lines starting with `/` are local commands.

use std::time::Instant;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use super::render::{print_json, print_message, print_rejected, print_update, update_failed};
use super::Context;
use crate::error::Result;
use crate::views::chat::ChatView;
use crate::views::{Route, ToastCenter, ViewUpdate};

const HELP: &str = "Type a question about the page and press Enter.
  /history  show the conversation so far
  /notices  show recent notifications
  /dismiss  hide notification <n> from /notices
  /clear    hide every notification
  /help     show this help
  /exit     leave the chat";

fn print_truncation_warning(view: &ChatView) {
    if view.content_truncated() {
        println!(
            "{}",
            "Note: the page is large; answers are based on a portion of its content.".yellow()
        );
    }
}

pub async fn ask(ctx: &Context, id: &str, question: &str) -> Result<bool> {
    if ctx.json {
        if id.trim().is_empty() {
            return print_rejected("Invalid URL ID");
        }
        if question.trim().is_empty() {
            return print_rejected("Please enter a question");
        }
        let response = ctx.api.ask_question(id.trim(), question).await;
        print_json(&response)?;
        return Ok(response.is_success());
    }
    if !ctx.require_login(&Route::Chat { id: id.to_string() }) {
        return Ok(false);
    }

    let mut view = ChatView::new(ctx.api.clone(), ctx.ui(), id);
    let update = view.send(question).await;
    if let Some(reply) = view.messages().last() {
        print_message(reply);
    }
    print_update(&update);
    print_truncation_warning(&view);
    Ok(!update_failed(&update))
}

pub async fn history(ctx: &Context, id: &str) -> Result<bool> {
    if ctx.json {
        let response = ctx.api.chat_history(id).await;
        print_json(&response)?;
        return Ok(response.is_success());
    }
    if !ctx.require_login(&Route::Chat { id: id.to_string() }) {
        return Ok(false);
    }

    let mut view = ChatView::new(ctx.api.clone(), ctx.ui(), id);
    let update = view.load().await;
    print_update(&update);
    if update_failed(&update) {
        return Ok(false);
    }
    if view.messages().is_empty() {
        println!("No messages yet. Ask something with `linklens ask {} <question>`.", id);
    }
    for message in view.messages() {
        print_message(message);
    }
    print_truncation_warning(&view);
    Ok(true)
}

/// Remember the toasts of `update` so `/notices` can show them again.
fn remember_toasts(center: &mut ToastCenter, update: &ViewUpdate) {
    for toast in update.toasts() {
        center.push(toast.clone());
    }
}

/// Hide the `/notices` entry numbered `arg` (1-based).
fn dismiss_notice(notices: &mut ToastCenter, arg: &str, now: Instant) -> bool {
    let target = arg
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| notices.active(now).get(index).map(|notice| notice.id));
    match target {
        Some(id) => notices.dismiss(id),
        None => false,
    }
}

/// Interactive chat about record `id`.
pub async fn interactive(ctx: &Context, id: &str) -> Result<bool> {
    if !ctx.require_login(&Route::Chat { id: id.to_string() }) {
        return Ok(false);
    }

    let mut notices = ToastCenter::new(ctx.config.ui.toast_duration());
    let mut view = ChatView::new(ctx.api.clone(), ctx.ui(), id);
    let update = view.load().await;
    print_update(&update);
    if update_failed(&update) {
        return Ok(false);
    }
    remember_toasts(&mut notices, &update);

    if let Some(record) = view.record() {
        println!("{} {}", "Chatting about".bold(), record.short_title(60).bold());
        println!("{}", record.original_url.dimmed());
    }
    for message in view.messages() {
        print_message(message);
    }
    print_truncation_warning(&view);
    println!("{}", "Type /help for commands.".dimmed());

    let mut rl = DefaultEditor::new()?;
    loop {
        match rl.readline("you> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match trimmed {
                    "/exit" | "/quit" => break,
                    "/help" => {
                        println!("{}", HELP);
                        continue;
                    }
                    "/history" => {
                        for message in view.messages() {
                            print_message(message);
                        }
                        continue;
                    }
                    "/notices" => {
                        let active = notices.active(Instant::now());
                        if active.is_empty() {
                            println!("{}", "No recent notifications.".dimmed());
                        }
                        for (n, notice) in active.iter().enumerate() {
                            println!("{:>2}. {}", n + 1, notice.toast.render());
                        }
                        continue;
                    }
                    "/clear" => {
                        let cleared = notices.drain().len();
                        println!("{}", format!("Cleared {} notification(s).", cleared).dimmed());
                        continue;
                    }
                    command if command.starts_with("/dismiss") => {
                        let arg = command.trim_start_matches("/dismiss");
                        if !dismiss_notice(&mut notices, arg, Instant::now()) {
                            println!("{}", "Usage: /dismiss <number from /notices>".dimmed());
                        }
                        continue;
                    }
                    _ => {}
                }

                let was_truncated = view.content_truncated();
                let update = view.send(trimmed).await;
                if let Some(reply) = view.messages().last() {
                    print_message(reply);
                }
                print_update(&update);
                remember_toasts(&mut notices, &update);
                if !was_truncated {
                    print_truncation_warning(&view);
                }
                if update.navigation().is_some() {
                    // Credential rejected; the session is already cleared.
                    return Ok(false);
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                tracing::error!("Readline error: {}", err);
                return Err(err.into());
            }
        }
    }
    Ok(true)
}
