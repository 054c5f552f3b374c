use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::config::{AuthMethod, DEFAULT_ENDPOINT, TrainerConfig};

/// Header carrying the server's CSRF token on REST requests.
pub const CSRF_HEADER: &str = "X-CSRF-Token";

#[derive(Debug, Parser)]
#[command(name = "ava-trainer")]
#[command(bin_name = "ava-trainer")]
#[command(about = "Tag training sentences and watch live conversations for Ava", long_about = None)]
pub struct TrainerCli {
    /// Base URL of the Ava server
    #[arg(long, env = "AVA_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Bearer token sent with every request
    #[arg(long, env = "AVA_AUTH_TOKEN")]
    pub auth_token: Option<String>,

    /// CSRF token sent with every request
    #[arg(long, env = "AVA_CSRF_TOKEN")]
    pub csrf_token: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: TrainerCommand,
}

#[derive(Debug, Subcommand)]
pub enum TrainerCommand {
    /// Tag sentences in the terminal
    Tag {
        /// Tag this sentence instead of the next one needing work
        #[arg(long)]
        sentence_id: Option<u64>,

        /// Assignment the tagged sentence is submitted under
        #[arg(long)]
        assignment_id: Option<String>,
    },

    /// Print conversation messages as they arrive
    Feed {
        /// Trainer whose conversations to follow
        #[arg(long, env = "AVA_USER_ID")]
        user_id: u64,
    },
}

impl TrainerCli {
    /// The configuration described by the parsed arguments.
    pub fn config(&self) -> TrainerConfig {
        let mut config = TrainerConfig::new(&self.endpoint);

        if let Some(token) = &self.auth_token {
            config = config.with_auth(AuthMethod::Bearer(token.clone()));
        }
        if let Some(token) = &self.csrf_token {
            config = config.with_header(CSRF_HEADER, token);
        }
        if let Some(seconds) = self.timeout {
            config = config.with_timeout(Duration::from_secs(seconds));
        }
        if let TrainerCommand::Feed { user_id } = self.command {
            config = config.with_user_id(user_id);
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_with_tokens() {
        let cli = TrainerCli::try_parse_from([
            "ava-trainer",
            "--endpoint",
            "https://ava.example.com",
            "--auth-token",
            "secret",
            "--csrf-token",
            "csrf",
            "--timeout",
            "5",
            "tag",
            "--sentence-id",
            "12",
        ])
        .unwrap();

        assert!(matches!(
            cli.command,
            TrainerCommand::Tag {
                sentence_id: Some(12),
                assignment_id: None
            }
        ));

        let config = cli.config();
        assert_eq!(config.endpoint, "https://ava.example.com");
        assert_eq!(config.auth_method, AuthMethod::Bearer("secret".into()));
        assert_eq!(
            config.headers,
            vec![(CSRF_HEADER.to_string(), "csrf".to_string())]
        );
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.user_id, None);
    }

    #[test]
    fn feed_sets_user_id() {
        let cli = TrainerCli::try_parse_from(["ava-trainer", "feed", "--user-id", "42"]).unwrap();
        let config = cli.config();
        assert_eq!(config.user_id, Some(42));
        assert_eq!(config.auth_method, AuthMethod::None);
        assert!(config.headers.is_empty());
    }

    #[test]
    fn subcommand_is_required() {
        assert!(TrainerCli::try_parse_from(["ava-trainer"]).is_err());
    }
}
