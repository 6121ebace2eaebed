//! Token command: mint an HS256 bearer token for calling the API

use std::path::PathBuf;

use anyhow::{Result, bail};
use assessments_core::AuthConfig;
use assessments_core::auth::{TokenRequest, issue_token};
use clap::Args;

use crate::config::ConfigLoader;

/// Longest lifetime a minted token may have (seven days)
const MAX_TTL_MINUTES: i64 = 7 * 24 * 60;

/// Arguments for the token command
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Subject (`sub` claim) of the token
    #[arg(long)]
    pub subject: String,

    /// Email claim
    #[arg(long)]
    pub email: Option<String>,

    /// Display name claim
    #[arg(long)]
    pub name: Option<String>,

    /// Role to grant (repeatable)
    #[arg(long = "role")]
    pub roles: Vec<String>,

    /// Token lifetime in minutes
    #[arg(long, default_value_t = 60)]
    pub ttl_minutes: i64,

    /// Additional config file, applied over user and project config
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Run the token command
pub fn run(args: TokenArgs) -> Result<()> {
    let config = ConfigLoader::load(args.config.as_deref())?;
    let token = mint(&config.auth, args)?;
    println!("{token}");
    Ok(())
}

fn mint(auth: &AuthConfig, args: TokenArgs) -> Result<String> {
    if auth.secret.is_empty() {
        bail!("auth.secret is not configured");
    }
    if !(1..=MAX_TTL_MINUTES).contains(&args.ttl_minutes) {
        bail!("--ttl-minutes must be between 1 and {MAX_TTL_MINUTES}");
    }
    let Some(ttl) = chrono::Duration::try_minutes(args.ttl_minutes) else {
        bail!("--ttl-minutes out of range");
    };

    let request = TokenRequest {
        subject: args.subject,
        email: args.email,
        name: args.name,
        roles: args.roles,
        ttl,
    };
    Ok(issue_token(auth, request)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assessments_core::JwtValidator;

    fn args(ttl_minutes: i64) -> TokenArgs {
        TokenArgs {
            subject: "teacher-1".into(),
            email: Some("t1@school.test".into()),
            name: None,
            roles: vec!["instructor".into()],
            ttl_minutes,
            config: None,
        }
    }

    #[test]
    fn test_minted_token_validates() {
        let auth = AuthConfig::new("cli-secret").with_required_role("instructor");
        let token = mint(&auth, args(5)).unwrap();

        let identity = JwtValidator::new(auth).validate(&token).unwrap();
        assert_eq!(identity.subject, "teacher-1");
        assert_eq!(identity.email.as_deref(), Some("t1@school.test"));
        assert!(identity.has_role("instructor"));
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        assert!(mint(&AuthConfig::default(), args(5)).is_err());
    }

    #[test]
    fn test_ttl_outside_bounds_is_an_error() {
        let auth = AuthConfig::new("cli-secret");
        assert!(mint(&auth, args(0)).is_err());
        assert!(mint(&auth, args(i64::MAX)).is_err());
        assert!(mint(&auth, args(MAX_TTL_MINUTES + 1)).is_err());
        assert!(mint(&auth, args(MAX_TTL_MINUTES)).is_ok());
    }
}
