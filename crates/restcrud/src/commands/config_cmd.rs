//! Config subcommand handlers.

use std::io::IsTerminal;
use std::str::FromStr;

use dialoguer::Select;
use secrecy::SecretString;
use serde::Serialize;
use strum::IntoEnumIterator;
use tabled::Tabled;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, DEFAULT_PROFILE, Preset, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of the config with plaintext tokens masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some("****".into());
        }
    }
    cfg
}

fn format_config(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# cannot render config: {e}"))
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Preset from `--preset`, a picker on a terminal, or the default.
fn choose_preset(requested: Option<&str>) -> Result<Preset, CliError> {
    if let Some(name) = requested {
        return Preset::from_str(name).map_err(|_| CliError::Validation {
            field: "preset".into(),
            reason: format!(
                "unknown preset '{name}'. Valid presets: {}",
                Preset::iter().map(|p| p.to_string()).collect::<Vec<_>>().join(", ")
            ),
        });
    }

    if !std::io::stdin().is_terminal() {
        return Ok(Preset::default());
    }

    let presets: Vec<Preset> = Preset::iter().collect();
    let labels: Vec<String> = presets
        .iter()
        .map(|p| format!("{:<16} {}", p.to_string(), p.description()))
        .collect();
    let selection = Select::new()
        .with_prompt("Backend preset")
        .items(&labels)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    Ok(presets[selection])
}

#[derive(Clone, Serialize, Tabled)]
struct PresetRow {
    #[tabled(rename = "Preset")]
    name: String,
    #[tabled(rename = "Base URL")]
    base_url: String,
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Description")]
    description: String,
}

fn preset_rows() -> Vec<PresetRow> {
    Preset::iter()
        .map(|preset| PresetRow {
            name: preset.to_string(),
            base_url: preset.spec().base_url.unwrap_or_default(),
            resource: preset.default_resource().to_owned(),
            description: preset.description().to_owned(),
        })
        .collect()
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_file(global).display().to_string(), false);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = redacted(&config::load(global)?);
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                "config".into()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Init { preset, force } => {
            let mut cfg = config::load(global)?;
            let name = global
                .profile
                .clone()
                .unwrap_or_else(|| DEFAULT_PROFILE.into());

            if cfg.profiles.contains_key(&name) && !force {
                return Err(CliError::Validation {
                    field: "profile".into(),
                    reason: format!("profile '{name}' already exists (use --force to replace it)"),
                });
            }

            let preset = choose_preset(preset.as_deref())?;
            let first = cfg.profiles.is_empty();
            cfg.profiles.insert(name.clone(), Profile::from_preset(preset));
            if first || cfg.default_profile.is_none() {
                cfg.default_profile = Some(name.clone());
            }
            config::save(global, &cfg)?;

            tracing::info!(profile = %name, %preset, "profile initialised");
            if !global.quiet {
                let msg = format!("✓ Profile '{name}' created from preset {preset}");
                eprintln!("{}", output::success(&msg, &global.color));
                eprintln!("  Config path: {}", config::config_file(global).display());
            }
            Ok(())
        }

        ConfigCommand::Presets => {
            let rows = preset_rows();
            let out = output::render_list(
                &global.output,
                &rows,
                PresetRow::clone,
                |row| row.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load(global)?;
            let default = cfg.default_profile.as_deref().unwrap_or(DEFAULT_PROFILE);
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: restcrud config init");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load(global)?;
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: cfg.profile_names(),
                    name,
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save(global, &cfg)?;
            if !global.quiet {
                let msg = format!("✓ Default profile set to '{name}'");
                eprintln!("{}", output::success(&msg, &global.color));
            }
            Ok(())
        }

        ConfigCommand::SetToken => {
            let cfg = config::load(global)?;
            let name = config::active_profile_name(global, &cfg);

            let token = rpassword::prompt_password(format!("Bearer token for '{name}': "))
                .map_err(prompt_err)?;
            if token.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "token".into(),
                    reason: "token cannot be empty".into(),
                });
            }

            restcrud_config::store_token(&name, &SecretString::from(token.trim().to_owned()))?;
            if !global.quiet {
                let msg = format!("✓ Token stored in system keyring for '{name}'");
                eprintln!("{}", output::success(&msg, &global.color));
            }
            Ok(())
        }

        ConfigCommand::ClearToken => {
            let cfg = config::load(global)?;
            let name = config::active_profile_name(global, &cfg);
            let removed = restcrud_config::clear_token(&name)?;
            if !global.quiet {
                if removed {
                    let msg = format!("✓ Token removed for '{name}'");
                    eprintln!("{}", output::success(&msg, &global.color));
                } else {
                    eprintln!("No stored token for '{name}'");
                }
            }
            Ok(())
        }
    }
}
