//! Settings inspection and editing command

use super::Session;
use anyhow::{anyhow, Context, Result};
use clap::Subcommand;
use colored::Colorize;
use scene_browser_core::config::{FilterCategory, FilterRules};
use scene_browser_core::BrowserSettings;
use tracing::{info, warn};

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsAction {
    /// Print the current settings as JSON
    Show,

    /// Change a single setting
    Set { key: String, value: String },

    /// Set the filter rules of an asset category
    Filter {
        /// general, token or portrait
        category: FilterCategory,
        #[arg(long, default_value = "")]
        include: String,
        #[arg(long, default_value = "")]
        exclude: String,
        /// Takes precedence over include and exclude
        #[arg(long, default_value = "")]
        regex: String,
    },

    /// Restore default settings
    Reset,
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(anyhow!("Expected a boolean for '{}', got '{}'", key, value)),
    }
}

/// Apply `key = value` to `settings`
fn apply_setting(settings: &mut BrowserSettings, key: &str, value: &str) -> Result<()> {
    match key {
        "disable_caching" => settings.disable_caching = parse_bool(key, value)?,
        "filter_msrd" => settings.filter_msrd = parse_bool(key, value)?,
        "keyword_search" => settings.keyword_search = parse_bool(key, value)?,
        "run_search_on_path" => settings.run_search_on_path = parse_bool(key, value)?,
        "disable_automatic_popup" => settings.disable_automatic_popup = parse_bool(key, value)?,
        "debug" => settings.debug = parse_bool(key, value)?,
        "excluded_keywords" => settings.excluded_keywords = value.to_string(),
        "token_filter" => settings.token_filter = value.to_string(),
        "portrait_filter" => settings.portrait_filter = value.to_string(),
        "max_walk_depth" => {
            settings.max_walk_depth = value
                .parse()
                .with_context(|| format!("Expected a number for '{}', got '{}'", key, value))?
        }
        _ => return Err(anyhow!("Unknown setting: {}", key)),
    }
    Ok(())
}

pub async fn settings_command(session: Session, action: SettingsAction) -> Result<()> {
    let engine = &session.engine;
    let mut settings = engine.settings().await;

    match action {
        SettingsAction::Show => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            return Ok(());
        }
        SettingsAction::Set { key, value } => apply_setting(&mut settings, &key, &value)?,
        SettingsAction::Filter {
            category,
            include,
            exclude,
            regex,
        } => {
            let rules = FilterRules {
                include,
                exclude,
                regex,
            };
            if let Err(e) = rules.validate() {
                warn!("{}; the regex will be ignored", e);
            }
            settings.set_filter(category, rules);
        }
        SettingsAction::Reset => settings = BrowserSettings::default(),
    }

    if let Some(outcome) = engine.update_settings(settings).await? {
        info!("Cache rebuild after settings change: {:?}", outcome);
    }
    println!(
        "{} {}",
        "Saved settings to".green(),
        session.config.settings_path.display()
    );
    Ok(())
}
