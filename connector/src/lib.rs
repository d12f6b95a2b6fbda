pub mod address;
pub mod cache;
pub mod config;
pub mod connector;
pub mod error;
pub mod resolver;

pub use address::AddressFormatter;
pub use cache::{DirectoryCacheService, EntityCache, Keyed};
pub use config::{ConnectorConfig, DeletedGroupPolicy};
pub use connector::DirectoryConnector;
pub use error::{ConnectorError, ConnectorResult};
pub use resolver::SyncPolicyResolver;
