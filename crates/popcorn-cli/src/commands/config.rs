use super::prompts;
use crate::output::Output;
use crate::ConfigCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use popcorn_config::{resolve_api_key_with_source, ApiKeySource, Config, CredentialStore, PathManager, OMDB_API_KEY_ENV};
use serde_json::json;

pub fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    match cmd {
        ConfigCommands::Show { full } => show_config(&path_manager, full, output),
        ConfigCommands::SetApiKey { key } => set_api_key(&path_manager, key, output),
        ConfigCommands::ClearApiKey => clear_api_key(&path_manager, output),
        ConfigCommands::Init { force } => init_config(&path_manager, force, output),
    }
}

fn load_credentials(path_manager: &PathManager) -> Result<CredentialStore> {
    let mut cred_store = CredentialStore::new(path_manager.credentials_file());
    cred_store
        .load()
        .map_err(|e| eyre!("Failed to load credentials: {}", e))?;
    Ok(cred_store)
}

fn show_config(path_manager: &PathManager, full: bool, output: &Output) -> Result<()> {
    let config_file = path_manager.config_file();
    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Defaults are in use. Run 'popcorn config init' to write them to disk.");
    }

    let config = Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    let cred_store = load_credentials(path_manager)?;

    let resolved = resolve_api_key_with_source(&cred_store);
    let api_key = resolved.as_ref().map(|(key, _)| key.as_str());
    let key_origin = resolved.as_ref().map(|(_, source)| source.label()).unwrap_or("not set");
    let api_key_display = match api_key {
        Some(key) if full => key.to_string(),
        Some(key) => mask_string(key),
        None => "<not set>".to_string(),
    };
    let key_updated = cred_store
        .get_omdb_api_key_updated()
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string());

    if !output.is_human() {
        output.json(&json!({
            "config_file": config_file.display().to_string(),
            "credentials_file": path_manager.credentials_file().display().to_string(),
            "storage_dir": path_manager.storage_dir().display().to_string(),
            "config": config,
            "omdb_api_key": api_key_display,
            "omdb_api_key_source": key_origin,
            "omdb_api_key_updated": key_updated,
        }));
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }

    let mut info_table = Table::new();
    info_table.set_header(vec![
        Cell::new("Config File").add_attribute(comfy_table::Attribute::Bold),
        Cell::new(config_file.display().to_string()),
    ]);
    info_table.add_row(vec![Cell::new("Storage"), Cell::new(path_manager.storage_dir().display().to_string())]);
    info_table.add_row(vec![Cell::new("Logs"), Cell::new(path_manager.log_dir().display().to_string())]);
    info_table.load_preset(comfy_table::presets::UTF8_FULL);
    info_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    println!("{}", info_table);
    println!();

    let mut omdb_table = Table::new();
    omdb_table.set_header(vec![
        Cell::new("OMDb Configuration").fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold),
    ]);
    omdb_table.add_row(vec![Cell::new("Base URL"), Cell::new(&config.omdb.base_url)]);
    omdb_table.add_row(vec![
        Cell::new("API Key"),
        Cell::new(if api_key.is_some() {
            format!("{} {}", "✓".green(), api_key_display)
        } else {
            format!("{} {}", "✗".red(), api_key_display)
        }),
    ]);
    omdb_table.add_row(vec![Cell::new("Key Source"), Cell::new(key_origin)]);
    if let Some(updated) = &key_updated {
        omdb_table.add_row(vec![Cell::new("Key Updated"), Cell::new(updated)]);
    }
    omdb_table.load_preset(comfy_table::presets::UTF8_FULL);
    omdb_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    println!("{}", omdb_table);
    println!();

    let mut app_table = Table::new();
    app_table.set_header(vec![
        Cell::new("Watched List & Browse").fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold),
    ]);
    app_table.add_row(vec![Cell::new("Storage Key"), Cell::new(&config.storage.watched_key)]);
    app_table.add_row(vec![Cell::new("Results Shown"), Cell::new(config.browse.max_results_shown)]);
    app_table.load_preset(comfy_table::presets::UTF8_FULL);
    app_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    println!("{}", app_table);

    Ok(())
}

fn set_api_key(path_manager: &PathManager, key: Option<String>, output: &Output) -> Result<()> {
    let key = match key {
        Some(key) => key,
        None => prompts::prompt_password("OMDb API key")?,
    };
    validate_api_key(&key).map_err(|e| eyre!("{}", e))?;

    let mut cred_store = load_credentials(path_manager)?;
    cred_store.set_omdb_api_key(key.trim().to_string());
    cred_store
        .save()
        .map_err(|e| eyre!("Failed to save credentials: {}", e))?;

    output.success(format!("OMDb API key saved to {}", path_manager.credentials_file().display()));
    if let Some((_, ApiKeySource::Environment)) = resolve_api_key_with_source(&cred_store) {
        output.warn(format!("{} is set and takes precedence over the stored key", OMDB_API_KEY_ENV));
    }
    Ok(())
}

fn clear_api_key(path_manager: &PathManager, output: &Output) -> Result<()> {
    let mut cred_store = load_credentials(path_manager)?;
    if !cred_store.clear_omdb_api_key() {
        output.info("No OMDb API key stored");
    } else {
        cred_store
            .save()
            .map_err(|e| eyre!("Failed to save credentials: {}", e))?;
        output.success(format!("OMDb API key removed from {}", path_manager.credentials_file().display()));
    }

    if let Some((_, ApiKeySource::Environment)) = resolve_api_key_with_source(&cred_store) {
        output.warn(format!("{} is still set and will be used", OMDB_API_KEY_ENV));
    }
    Ok(())
}

fn init_config(path_manager: &PathManager, force: bool, output: &Output) -> Result<()> {
    let config_file = path_manager.config_file();
    if config_file.exists() && !force {
        output.warn(format!("Configuration already exists at: {}", config_file.display()));
        output.info("Use --force to overwrite it with defaults.");
        return Ok(());
    }

    path_manager
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create directories: {}", e))?;
    Config::default()
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to write config to {}: {}", config_file.display(), e))?;

    output.success(format!("Wrote default configuration to {}", config_file.display()));
    Ok(())
}

/// Validates the shape of an OMDb API key (short alphanumeric token)
fn validate_api_key(input: &str) -> Result<(), &'static str> {
    let key = input.trim();
    if key.is_empty() {
        return Err("API key cannot be empty");
    }
    if !key.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("API key may only contain letters and digits");
    }
    Ok(())
}

fn mask_string(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.is_empty() {
        return "<not set>".to_string();
    }
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}
