pub mod client;
pub mod error;
pub mod settings;
pub mod types;

pub use client::DirectoryClient;
pub use error::{DirectoryError, DirectoryResult};
pub use settings::GroupSettings;
pub use types::{DirectoryGroup, DirectoryMember, DirectoryUser, MemberRole, UserName};
