use caseprep_core::Notice;

use crate::auth::{clear_stored_session, load_stored_session, SupabaseAuthService};
use crate::cli::AuthCommands;
use crate::commands::common::report_notices;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

pub async fn run_auth(command: AuthCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        AuthCommands::Login {
            profile,
            email,
            password,
        } => {
            let config = CliProfilesConfig::load().map_err(CliError::Config)?;
            let profile_name = config.resolve_profile_name(profile.as_deref().or(global_profile));
            let backend_config = config
                .profile(&profile_name)
                .cloned()
                .unwrap_or_default()
                .backend_config()?
                .ok_or_else(|| {
                    CliError::Config(format!(
                        "Profile '{profile_name}' has no Supabase project. Run `caseprep config init --profile {profile_name} --supabase-url <url> --supabase-anon-key <key>` first."
                    ))
                })?;
            let auth_service = SupabaseAuthService::new(&profile_name, &backend_config)
                .map_err(|error| CliError::Auth(error.to_string()))?;
            let session = match auth_service.sign_in(&email, &password).await {
                Ok(session) => session,
                Err(error) => {
                    report_notices(&[Notice::sign_in_failed(error.to_string())]);
                    return Err(CliError::Auth(error.to_string()));
                }
            };
            report_notices(&[Notice::signed_in()]);
            let email_label = session.user.email.as_deref().unwrap_or("(no email)");
            println!("Signed in profile '{profile_name}' as {email_label}");
            Ok(())
        }
        AuthCommands::Status { profile } => {
            let config = CliProfilesConfig::load().map_err(CliError::Config)?;
            let profile_name = config.resolve_profile_name(profile.as_deref().or(global_profile));
            let Some(backend_config) = config
                .profile(&profile_name)
                .cloned()
                .unwrap_or_default()
                .backend_config()?
            else {
                println!("Profile '{profile_name}' uses the local database.");
                return Ok(());
            };

            let service = SupabaseAuthService::new(&profile_name, &backend_config)
                .map_err(|error| CliError::Auth(error.to_string()))?;
            let session = service
                .restore_session()
                .await
                .map_err(|error| CliError::Auth(error.to_string()))?;

            if let Some(session) = session {
                let email_label = session.user.email.as_deref().unwrap_or("(no email)");
                println!(
                    "Profile '{}' is signed in as {} (expires_at={})",
                    profile_name, email_label, session.expires_at
                );
            } else {
                println!("Profile '{profile_name}' is not signed in.");
            }
            Ok(())
        }
        AuthCommands::Logout { profile } => {
            let config = CliProfilesConfig::load().map_err(CliError::Config)?;
            let profile_name = config.resolve_profile_name(profile.as_deref().or(global_profile));
            let backend_config = config
                .profile(&profile_name)
                .cloned()
                .unwrap_or_default()
                .backend_config()?;

            let stored_session = load_stored_session(&profile_name)
                .map_err(|error| CliError::Auth(error.to_string()))?;

            match (backend_config, stored_session) {
                (Some(backend_config), Some(session)) => {
                    let service = SupabaseAuthService::new(&profile_name, &backend_config)
                        .map_err(|error| CliError::Auth(error.to_string()))?;
                    service
                        .sign_out(&session.access_token)
                        .await
                        .map_err(|error| CliError::Auth(error.to_string()))?;
                }
                _ => clear_stored_session(&profile_name)
                    .map_err(|error| CliError::Auth(error.to_string()))?,
            }

            println!("Signed out profile '{profile_name}'");
            Ok(())
        }
    }
}
