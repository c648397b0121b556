//! Account commands.

use std::time::Instant;

use chrono::Utc;
use colored::Colorize;

use super::prompt::{read_line, read_secret, secret_or_prompt, value_or_prompt};
use super::render::{print_json, print_profile, print_update, update_failed};
use super::Context;
use crate::error::Result;
use crate::validation::{LoginForm, RegistrationForm};
use crate::views::auth::{AuthController, ForgotPasswordFlow, ResendCooldown, ResetStep};
use crate::views::{Route, Toast, ViewUpdate};

fn controller(ctx: &Context) -> AuthController {
    AuthController::new(ctx.api.clone(), ctx.ui())
}

fn report(update: &ViewUpdate) -> bool {
    print_update(update);
    !update_failed(update)
}

/// Address to verify: the flag, else the pending registration.
fn verification_email(auth: &AuthController, email: Option<String>) -> Option<String> {
    match auth.verification_target(email.as_deref()) {
        Ok(email) => Some(email),
        Err(Route::Dashboard) => {
            println!("{}", Toast::info("You are already signed in").render());
            None
        }
        Err(_) => {
            eprintln!(
                "{}",
                Toast::error("No pending verification; pass --email").render()
            );
            None
        }
    }
}

pub async fn register(
    ctx: &Context,
    username: String,
    email: String,
    password: Option<String>,
) -> Result<bool> {
    let (password, confirm_password) = match password {
        Some(password) => (password.clone(), password),
        None => (
            read_secret("Password: ")?,
            read_secret("Confirm password: ")?,
        ),
    };
    let form = RegistrationForm {
        username,
        email,
        password,
        confirm_password,
    };
    Ok(report(&controller(ctx).register(&form).await))
}

pub async fn verify(ctx: &Context, email: Option<String>, code: &str) -> Result<bool> {
    let auth = controller(ctx);
    let Some(email) = verification_email(&auth, email) else {
        return Ok(false);
    };
    Ok(report(&auth.verify_email(&email, code).await))
}

pub async fn resend_code(ctx: &Context, email: Option<String>) -> Result<bool> {
    let auth = controller(ctx);
    let Some(email) = verification_email(&auth, email) else {
        return Ok(false);
    };
    // Each run is a new process: the cooldown is carried through the store.
    let now = Instant::now();
    let last_sent = auth.session().code_sent_at(&email);
    let mut cooldown = ResendCooldown::since(last_sent, Utc::now(), now);
    let was_ready = cooldown.is_ready(now);
    let update = auth.resend_code(&email, &mut cooldown, now).await;
    if was_ready && !cooldown.is_ready(now) {
        auth.session().record_code_sent(&email, Utc::now());
    }
    Ok(report(&update))
}

pub async fn login(ctx: &Context, email: &str, password: Option<String>) -> Result<bool> {
    let password = secret_or_prompt(password, "Password: ")?;
    let form = LoginForm {
        email: email.to_string(),
        password,
    };
    let auth = controller(ctx);
    let update = auth.login(&form, None).await;
    let ok = report(&update);
    if ok {
        if let Some(user) = auth.session().user() {
            println!("Signed in as {}", user.username.bold());
        }
    }
    Ok(ok)
}

pub fn logout(ctx: &Context) -> bool {
    controller(ctx).logout();
    println!("{}", Toast::success("Logged out").render());
    true
}

pub async fn whoami(ctx: &Context) -> Result<bool> {
    if ctx.json {
        let response = ctx.api.current_user().await;
        print_json(&response)?;
        return Ok(response.is_success());
    }
    if !ctx.require_login(&Route::Dashboard) {
        return Ok(false);
    }

    let auth = controller(ctx);
    let update = auth.restore().await;
    match auth.session().user() {
        Some(user) => {
            print_profile(&user);
            Ok(true)
        }
        None => {
            print_update(&update.with(Toast::error("Your session is no longer valid")));
            Ok(false)
        }
    }
}

/// Walk through the three reset steps, repeating a step until it succeeds.
pub async fn forgot_password(ctx: &Context, email: Option<String>) -> Result<bool> {
    let mut flow = ForgotPasswordFlow::new(ctx.api.clone(), ctx.ui());
    let mut email = email;

    loop {
        let update = match flow.step().clone() {
            ResetStep::RequestCode => {
                let address = value_or_prompt(email.take(), "Email: ")?;
                flow.request_code(&address).await
            }
            ResetStep::VerifyCode { email } => {
                let otp = read_line(&format!("Code sent to {}: ", email))?;
                flow.verify_code(&otp).await
            }
            ResetStep::NewPassword { .. } => {
                let new_password = read_secret("New password: ")?;
                let confirm = read_secret("Confirm new password: ")?;
                flow.reset_password(&new_password, &confirm).await
            }
            ResetStep::Completed => return Ok(true),
        };
        print_update(&update);
    }
}
