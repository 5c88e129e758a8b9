use std::env;

use caseprep_core::config::BackendConfig;

use crate::cli::ConfigCommands;
use crate::config_profiles::{normalize_text_option, CliProfile, CliProfilesConfig};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            profile,
            supabase_url,
            supabase_anon_key,
            table,
            no_activate,
        } => run_config_init(
            profile.as_deref().or(global_profile),
            supabase_url,
            supabase_anon_key,
            table,
            no_activate,
        ),
    }
}

pub fn run_config_init(
    profile_name: Option<&str>,
    supabase_url: Option<String>,
    supabase_anon_key: Option<String>,
    table: Option<String>,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);
    let existing_profile = config.profile(&profile_name).cloned().unwrap_or_default();

    let merged = merge_profile(
        &existing_profile,
        supabase_url,
        supabase_anon_key,
        table,
        |name| env::var(name).ok(),
    )?;
    *config.profile_mut_or_default(&profile_name) = merged;

    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }

    let path = config.save().map_err(CliError::Config)?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );

    let profile = config
        .profiles
        .get(&profile_name)
        .ok_or_else(|| CliError::Config("Failed to persist profile".to_string()))?;
    let mut missing_fields = Vec::new();
    if profile.supabase_url().is_none() {
        missing_fields.push("supabase_url");
    }
    if profile.supabase_anon_key().is_none() {
        missing_fields.push("supabase_anon_key");
    }
    if missing_fields.is_empty() {
        println!(
            "Hosted profile '{profile_name}' is ready. Run `caseprep auth login --email <email> --password <password>`."
        );
    } else {
        println!(
            "Profile '{}' uses the local database (missing: {})",
            profile_name,
            missing_fields.join(", ")
        );
    }

    Ok(())
}

/// Explicit values win, then the environment, then what the profile had
pub fn merge_profile(
    existing: &CliProfile,
    supabase_url: Option<String>,
    supabase_anon_key: Option<String>,
    table: Option<String>,
    env_lookup: impl Fn(&str) -> Option<String>,
) -> Result<CliProfile, CliError> {
    let supabase_url = normalize_text_option(supabase_url)
        .or_else(|| normalize_text_option(env_lookup("SUPABASE_URL")))
        .or_else(|| existing.supabase_url());
    let supabase_anon_key = normalize_text_option(supabase_anon_key)
        .or_else(|| normalize_text_option(env_lookup("SUPABASE_ANON_KEY")))
        .or_else(|| existing.supabase_anon_key());
    let table = normalize_text_option(table)
        .or_else(|| normalize_text_option(env_lookup("CASEPREP_TABLE")))
        .or_else(|| existing.table());

    if let (Some(url), Some(key)) = (supabase_url.as_ref(), supabase_anon_key.as_ref()) {
        BackendConfig::new(url.clone(), key.clone(), table.clone())?;
    } else if let Some(url) = supabase_url.as_ref() {
        if !caseprep_core::util::is_http_url(url) {
            return Err(CliError::Config(
                "supabase_url must include http:// or https://".to_string(),
            ));
        }
    }

    Ok(CliProfile {
        supabase_url,
        supabase_anon_key,
        table,
    })
}
