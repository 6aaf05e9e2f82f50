use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Credentials file structure
///
/// Format:
/// ```toml
/// [postgres.profile_name]
/// password = "your_postgres_password_here"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Credentials {
    #[serde(default)]
    pub postgres: HashMap<String, CredentialProfile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CredentialProfile {
    pub password: String,
}

/// Default credentials file path: ~/.config/voice_audio_api/credentials.toml
/// None when HOME is not set
pub fn get_credentials_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("voice_audio_api")
            .join("credentials.toml"),
    )
}

/// Load credentials from the default location
/// Returns None if the file doesn't exist
pub fn load_credentials(
) -> Result<Option<Credentials>, Box<dyn std::error::Error + Send + Sync>> {
    let creds_path = match get_credentials_path() {
        Some(path) => path,
        None => return Ok(None),
    };

    if !creds_path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&creds_path)?;
    let credentials: Credentials = toml::from_str(&content)?;

    Ok(Some(credentials))
}

/// Get the postgres password for a profile
pub fn get_postgres_password(
    credentials: &Option<Credentials>,
    profile: &str,
) -> Result<String, String> {
    match credentials {
        Some(creds) => creds
            .postgres
            .get(profile)
            .map(|p| p.password.clone())
            .ok_or_else(|| {
                format!(
                    "Credential profile '[postgres.{}]' not found in credentials file",
                    profile
                )
            }),
        None => Err(match get_credentials_path() {
            Some(path) => format!("Credentials file not found. Expected at: {}", path.display()),
            None => "Credentials file not found: HOME is not set".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_lookup_by_profile() {
        let creds: Credentials = toml::from_str(
            r#"
            [postgres.main]
            password = "hunter2"
            "#,
        )
        .unwrap();
        let creds = Some(creds);

        assert_eq!(get_postgres_password(&creds, "main").unwrap(), "hunter2");
        let err = get_postgres_password(&creds, "other").unwrap_err();
        assert!(err.contains("[postgres.other]"), "{}", err);
    }

    #[test]
    fn test_missing_credentials_file_is_an_error() {
        assert!(get_postgres_password(&None, "main").is_err());
    }
}
