//! Command-line interface definition for linklens
//!
//! This module defines the CLI structure using clap's derive API. Every
//! subcommand maps onto one page action of the service's web front-end.

use clap::{Parser, Subcommand};

/// linklens - analyze web pages and chat about them
///
/// Submits URLs to the URL analyzer service, browses the analyzed pages and
/// asks questions about their content.
#[derive(Parser, Debug, Clone)]
#[command(name = "linklens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override the API base URL
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Print raw `{success, data | error}` results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create an account (a verification code is emailed)
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        /// Password for scripts; prompted for without echo when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Confirm an account with the emailed code
    Verify {
        /// Account email; defaults to the pending registration
        #[arg(short, long)]
        email: Option<String>,

        /// Six-digit code
        code: String,
    },

    /// Email a new verification code
    ResendCode {
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,

        /// Password for scripts; prompted for without echo when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Sign out and forget the stored credential
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Reset a forgotten password (interactive)
    ForgotPassword {
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Analyze a URL
    Analyze {
        url: String,

        /// Open a chat about the page once analysis finishes
        #[arg(long)]
        chat: bool,
    },

    /// Show an analyzed page
    Show { id: String },

    /// List analyzed pages
    List,

    /// Search analyzed pages
    Search { query: String },

    /// Delete an analyzed page
    Delete { id: String },

    /// Ask one question about an analyzed page
    Ask { id: String, question: String },

    /// Print the conversation about an analyzed page
    History { id: String },

    /// Chat about an analyzed page (interactive)
    Chat { id: String },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            api_base: None,
            json: false,
            command: Commands::List,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(!cli.json);
        assert!(matches!(cli.command, Commands::List));
    }

    #[test]
    fn test_cli_parse_login() {
        let cli = Cli::try_parse_from(["linklens", "login", "--email", "ada@example.com"]).unwrap();
        if let Commands::Login { email, password } = cli.command {
            assert_eq!(email, "ada@example.com");
            assert_eq!(password, None);
        } else {
            panic!("Expected Login command");
        }
    }

    #[test]
    fn test_cli_parse_analyze_with_chat() {
        let cli = Cli::try_parse_from(["linklens", "analyze", "https://example.com", "--chat"])
            .unwrap();
        if let Commands::Analyze { url, chat } = cli.command {
            assert_eq!(url, "https://example.com");
            assert!(chat);
        } else {
            panic!("Expected Analyze command");
        }
    }

    #[test]
    fn test_cli_parse_ask() {
        let cli = Cli::try_parse_from(["linklens", "ask", "abc", "What is this page about?"])
            .unwrap();
        if let Commands::Ask { id, question } = cli.command {
            assert_eq!(id, "abc");
            assert_eq!(question, "What is this page about?");
        } else {
            panic!("Expected Ask command");
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["linklens", "list", "--json", "--verbose"]).unwrap();
        assert!(cli.json);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_parse_resend_code() {
        let cli = Cli::try_parse_from(["linklens", "resend-code"]).unwrap();
        assert!(matches!(cli.command, Commands::ResendCode { email: None }));
    }

    #[test]
    fn test_cli_verify_requires_code() {
        assert!(Cli::try_parse_from(["linklens", "verify"]).is_err());
    }
}
