// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ragchat profile`.

use ragchat::{ChatClient, UserProfile};

use super::report;

#[derive(Debug, clap::Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: Option<ProfileCommand>,
}

#[derive(Debug, clap::Subcommand)]
pub enum ProfileCommand {
    /// Print the profile as JSON (default).
    Show,
    /// Change profile fields. Unset flags are left unchanged.
    Update(UpdateArgs),
}

#[derive(Debug, Default, clap::Args)]
pub struct UpdateArgs {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    /// Date of birth, YYYY-MM-DD.
    #[arg(long)]
    pub dob: Option<String>,
}

impl UpdateArgs {
    pub(crate) fn to_profile(&self) -> UserProfile {
        UserProfile {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            dob: self.dob.clone(),
            ..Default::default()
        }
    }
}

fn print_profile(profile: &UserProfile) -> i32 {
    match serde_json::to_string_pretty(profile) {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

pub async fn run(client: &ChatClient, args: &ProfileArgs) -> i32 {
    let result = match &args.command {
        None | Some(ProfileCommand::Show) => client.my_info().await,
        Some(ProfileCommand::Update(update)) => {
            let profile = update.to_profile();
            if profile == UserProfile::default() {
                eprintln!("error: nothing to update");
                return 2;
            }
            client.update_my_info(&profile).await
        }
    };
    match result {
        Ok(profile) => print_profile(&profile),
        Err(e) => report(&e),
    }
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
