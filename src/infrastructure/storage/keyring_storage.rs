use crate::application::ports::secure_storage::SecureStorage;
use async_trait::async_trait;
use keyring::Entry;
use tracing::debug;

const SERVICE_NAME: &str = "picktrack";

/// OS keychain-backed secure storage for the session token.
pub struct KeyringSecureStorage {
    service: String,
}

impl KeyringSecureStorage {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Entry::new(&self.service, key)?)
    }
}

impl Default for KeyringSecureStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecureStorage for KeyringSecureStorage {
    async fn store(
        &self,
        key: &str,
        value: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        debug!("SecureStorage: storing key={key}");
        self.entry(key)?.set_password(value)?;
        Ok(())
    }

    async fn retrieve(
        &self,
        key: &str,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match self.entry(key)?.delete_credential() {
            // Already gone is fine.
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(Box::new(e)),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.retrieve(key).await?.is_some())
    }
}
