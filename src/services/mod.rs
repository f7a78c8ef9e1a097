//! Collaborator services

pub mod directory;
pub mod user_service;

pub use directory::{DirectoryUser, InMemoryUserService};
pub use user_service::{CertificationError, UserService};
