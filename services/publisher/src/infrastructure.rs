// Infrastructure layer modules
pub mod asset_repository;
pub mod config;
pub mod logging;
pub mod object_store;
pub mod secret_store;
pub mod text_generator;

// Re-exports
pub use asset_repository::{AssetRepository, DynamoAssetRepository, RepositoryError};
pub use config::{ConfigError, PublisherConfig};
pub use logging::init_logging;
pub use object_store::{ObjectStore, ObjectStoreError, S3ObjectStore};
pub use secret_store::{SecretStore, SecretStoreError, SsmSecretStore};
pub use text_generator::{OpenAiClient, TextGenerator, TextGeneratorError};
