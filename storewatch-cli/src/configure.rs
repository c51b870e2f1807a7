use anyhow::{Context, Result};
use inquire::{Password, PasswordDisplayMode, Text};
use std::path::{Path, PathBuf};
use storewatch_core::Config;

/// Prompt for the API key and database path, then save the config file.
///
/// Works on the file contents only; environment overrides are never written back.
pub fn run() -> Result<()> {
    let path = Config::config_file_path()?;
    let current_db = Config::load_file(&path)?.database_path()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let db_path = Text::new("Database file:")
        .with_default(&current_db.display().to_string())
        .prompt()
        .context("Failed to read database path")?;

    save_answers(&path, &api_key, &db_path)?;

    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn save_answers(path: &Path, api_key: &str, db_path: &str) -> Result<()> {
    let mut config = Config::load_file(path)?;
    config.set_api_key(api_key.trim().to_string());
    config.database_path = Some(PathBuf::from(db_path.trim()));
    config.save_to(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use storewatch_core::config::{ENV_DATABASE, ENV_PROVIDER_URL};

    #[test]
    fn env_overrides_stay_out_of_the_saved_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = \"OLD\"\nconcurrency = 2\n").unwrap();

        // What every other command sees with these variables set.
        let mut effective = Config::load_file(&path).unwrap();
        effective.apply_env(|key| match key {
            k if k == ENV_PROVIDER_URL => Some("http://localhost:9999".to_string()),
            k if k == ENV_DATABASE => Some("/tmp/env.db".to_string()),
            _ => None,
        });
        assert_eq!(effective.provider_url.as_deref(), Some("http://localhost:9999"));

        save_answers(&path, " NEW ", "/data/shops.db").unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(!text.contains("provider_url"));
        assert!(!text.contains("localhost:9999"));
        assert!(!text.contains("env.db"));

        let saved = Config::load_file(&path).unwrap();
        assert_eq!(saved.api_key().unwrap(), "NEW");
        assert_eq!(saved.database_path, Some(PathBuf::from("/data/shops.db")));
        assert_eq!(saved.concurrency, 2);
        assert!(saved.provider_url.is_none());
    }

    #[test]
    fn first_save_creates_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storewatch").join("config.toml");

        save_answers(&path, "KEY", "shops.db").unwrap();

        let saved = Config::load_file(&path).unwrap();
        assert_eq!(saved.api_key().unwrap(), "KEY");
        assert_eq!(saved.database_path, Some(PathBuf::from("shops.db")));
    }
}
