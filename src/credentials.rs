//! Keyring helpers for the streaming client secret.

use keyring::Entry;

const STREAMING_SERVICE_NAME: &str = "trackscope.streaming.spotify";
/// Takes precedence over the keyring when set and non-empty.
pub const CLIENT_SECRET_ENV_VAR: &str = "TRACKSCOPE_CLIENT_SECRET";

fn streaming_entry(client_id: &str) -> Result<Entry, String> {
    Entry::new(STREAMING_SERVICE_NAME, client_id)
        .map_err(|err| format!("failed to create keyring entry: {err}"))
}

/// Saves the client secret for `client_id` into the OS keyring.
pub fn set_client_secret(client_id: &str, secret: &str) -> Result<(), String> {
    let entry = streaming_entry(client_id)?;
    entry
        .set_password(secret)
        .map_err(|err| format!("failed to set keyring password: {err}"))
}

pub fn get_client_secret(client_id: &str) -> Result<Option<String>, String> {
    let entry = streaming_entry(client_id)?;
    match entry.get_password() {
        Ok(secret) => Ok(Some(secret)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(err) => Err(format!("failed to get keyring password: {err}")),
    }
}

pub fn delete_client_secret(client_id: &str) -> Result<(), String> {
    let entry = streaming_entry(client_id)?;
    match entry.delete_password() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(err) => Err(format!("failed to delete keyring password: {err}")),
    }
}

fn secret_from_env_value(value: Option<String>) -> Option<String> {
    value
        .map(|secret| secret.trim().to_string())
        .filter(|secret| !secret.is_empty())
}

/// Resolves the client secret: environment override first, then the keyring.
pub fn resolve_client_secret(client_id: &str) -> Result<Option<String>, String> {
    if let Some(secret) = secret_from_env_value(std::env::var(CLIENT_SECRET_ENV_VAR).ok()) {
        return Ok(Some(secret));
    }
    if client_id.trim().is_empty() {
        return Ok(None);
    }
    get_client_secret(client_id)
}

#[cfg(test)]
mod tests {
    use super::secret_from_env_value;

    #[test]
    fn test_env_override_ignores_blank_values() {
        assert_eq!(secret_from_env_value(None), None);
        assert_eq!(secret_from_env_value(Some("   ".to_string())), None);
        assert_eq!(
            secret_from_env_value(Some(" s3cret \n".to_string())).as_deref(),
            Some("s3cret")
        );
    }
}
