pub mod keyring_storage;

pub use keyring_storage::KeyringSecureStorage;
