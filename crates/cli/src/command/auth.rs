// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ragchat login|register|logout|whoami|status`.

use std::io::BufRead;
use std::time::Duration;

use ragchat::token::{self, Claims};
use ragchat::ChatClient;

use super::report;

#[derive(Debug, clap::Args)]
pub struct CredentialsArgs {
    /// Account username.
    pub username: String,
    /// Password. Read from the first line of stdin when omitted.
    #[arg(long, env = "RAGCHAT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl CredentialsArgs {
    fn password(&self) -> anyhow::Result<String> {
        match &self.password {
            Some(p) => Ok(p.clone()),
            None => read_password(std::io::stdin().lock()),
        }
    }
}

/// First line of `input`, without its line ending. Must be non-empty.
pub(crate) fn read_password(mut input: impl BufRead) -> anyhow::Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    let password = line.trim_end_matches(['\n', '\r']);
    if password.is_empty() {
        anyhow::bail!("no password given (use --password, RAGCHAT_PASSWORD, or stdin)");
    }
    Ok(password.to_owned())
}

pub async fn login(client: &ChatClient, args: &CredentialsArgs) -> i32 {
    let password = match args.password() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e:#}");
            return 2;
        }
    };
    match client.login(&args.username, &password).await {
        Ok(()) => {
            println!("Logged in as {}.", args.username);
            0
        }
        Err(e) => report(&e),
    }
}

pub async fn register(client: &ChatClient, args: &CredentialsArgs) -> i32 {
    let password = match args.password() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e:#}");
            return 2;
        }
    };
    match client.register(&args.username, &password).await {
        Ok(()) => {
            let name = &args.username;
            println!("Registered {name}. Run `ragchat login {name}` to sign in.");
            0
        }
        Err(e) => report(&e),
    }
}

pub async fn logout(client: &ChatClient) -> i32 {
    client.logout().await;
    println!("Logged out.");
    0
}

pub async fn whoami(client: &ChatClient) -> i32 {
    if let Err(e) = client.ensure_session().await {
        return report(&e);
    }
    match client.my_info().await {
        Ok(me) => {
            let name = me.display_name();
            match (&me.username, name.is_empty()) {
                (Some(user), false) if *user != name => println!("{name} ({user})"),
                (Some(user), true) => println!("{user}"),
                _ => println!("{name}"),
            }
            0
        }
        Err(e) => report(&e),
    }
}

/// Describe the stored session relative to `now` (epoch seconds).
pub(crate) fn describe_session(
    access: Option<&str>,
    has_refresh: bool,
    now: u64,
    skew_secs: u64,
) -> String {
    let Some(access) = access else {
        return "not logged in".to_owned();
    };
    let claims = token::decode(access);
    let skew = Duration::from_secs(skew_secs);
    let valid = claims.as_ref().is_some_and(|c| c.is_valid_at(now, skew));
    match claims.as_ref().and_then(Claims::expires_at) {
        Some(exp) if valid => {
            format!("logged in, access token expires in {}s", exp.saturating_sub(now))
        }
        Some(_) if has_refresh => "access token expired, will renew on next call".to_owned(),
        Some(_) => "access token expired, no refresh token".to_owned(),
        None if has_refresh => "logged in, access token expiry unknown".to_owned(),
        None => "access token unreadable, no refresh token".to_owned(),
    }
}

pub fn status(client: &ChatClient) -> i32 {
    let tokens = client.tokens();
    let now = token::claims::epoch_secs();
    let access = tokens.access_token();
    let line = describe_session(
        access.as_deref(),
        tokens.refresh_token().is_some(),
        now,
        client.config().expiry_skew_secs,
    );
    println!("api:     {}", client.config().api_url);
    println!("tokens:  {}", client.config().token_path().display());
    println!("session: {line}");
    if access.is_some() {
        0
    } else {
        3
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
