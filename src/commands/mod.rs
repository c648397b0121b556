/*!
Command handlers for the CLI

Each handler builds the matching view controller, runs one action and
renders the resulting [`ViewUpdate`](crate::views::ViewUpdate). Handlers
return `Ok(true)` when the action succeeded and `Ok(false)` when it failed in
a way already reported to the user; `Err` is reserved for local failures such
as an unreadable credential store.

- `account`: register, verify, login, logout, whoami, password reset
- `urls`: analyze, show, list, search, delete
- `chat`: ask, history and the interactive chat
*/

use crate::api::ApiClient;
use crate::cli::Commands;
use crate::config::{Config, UiConfig};
use crate::error::Result;
use crate::session::Session;
use crate::views::{Route, Toast, ViewUpdate};

pub mod account;
pub mod chat;
pub mod prompt;
pub mod render;
pub mod urls;

/// Everything a command handler needs.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    pub api: ApiClient,
    /// Print raw results as JSON instead of rendering them
    pub json: bool,
}

impl Context {
    /// Open the configured session store and build the API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be located or the base
    /// URL is unusable.
    pub fn new(config: Config, json: bool) -> Result<Self> {
        let session = Session::from_config(&config.session)?;
        Self::with_session(config, session, json)
    }

    /// Build a context over an existing session.
    pub fn with_session(config: Config, session: Session, json: bool) -> Result<Self> {
        let api = ApiClient::new(&config, session)?;
        Ok(Self { config, api, json })
    }

    pub fn ui(&self) -> UiConfig {
        self.config.ui.clone()
    }

    pub fn session(&self) -> &Session {
        self.api.session()
    }

    /// Report and return `false` when `page` needs a session and no
    /// credential is stored.
    pub fn require_login(&self, page: &Route) -> bool {
        if !page.requires_auth() || self.session().credential().is_some() {
            return true;
        }
        let redirect = page.path().trim_start_matches('/').to_string();
        render::print_update(
            &ViewUpdate::none()
                .with(Toast::warning("Please log in to continue"))
                .with(crate::views::ViewEffect::navigate(Route::Login {
                    redirect: Some(redirect),
                })),
        );
        false
    }
}

/// Run one CLI command.
pub async fn run(ctx: Context, command: Commands) -> Result<bool> {
    match command {
        Commands::Register {
            username,
            email,
            password,
        } => account::register(&ctx, username, email, password).await,
        Commands::Verify { email, code } => account::verify(&ctx, email, &code).await,
        Commands::ResendCode { email } => account::resend_code(&ctx, email).await,
        Commands::Login { email, password } => account::login(&ctx, &email, password).await,
        Commands::Logout => Ok(account::logout(&ctx)),
        Commands::Whoami => account::whoami(&ctx).await,
        Commands::ForgotPassword { email } => account::forgot_password(&ctx, email).await,
        Commands::Analyze { url, chat } => urls::analyze(&ctx, &url, chat).await,
        Commands::Show { id } => urls::show(&ctx, &id).await,
        Commands::List => urls::list(&ctx).await,
        Commands::Search { query } => urls::search(&ctx, &query).await,
        Commands::Delete { id } => urls::delete(&ctx, &id).await,
        Commands::Ask { id, question } => chat::ask(&ctx, &id, &question).await,
        Commands::History { id } => chat::history(&ctx, &id).await,
        Commands::Chat { id } => chat::interactive(&ctx, &id).await,
    }
}
