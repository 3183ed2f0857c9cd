//! Client-side authentication session.
//!
//! This crate provides:
//! - The single `Session` snapshot views render from
//! - `SessionStore`, which owns login/register/logout/restore transitions
//! - Durable credential persistence behind the `CredentialStore` trait

pub mod credentials;
pub mod error;
pub mod session;
pub mod store;

pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore, CREDENTIAL_KEY};
pub use error::{SessionError, SessionResult, StorageError, StorageResult};
pub use session::{Session, SessionStatus};
pub use store::SessionStore;
