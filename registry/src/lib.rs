pub mod client;
pub mod error;
pub mod types;

pub use client::RegistryClient;
pub use error::{RegistryError, RegistryResult};
pub use types::{
    GroupMember, MemberType, RegistryGroup, Stem, StemScope, Subject, SyncMarker, TREE_SEPARATOR,
    parent_name
};
