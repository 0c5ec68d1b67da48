//! `calendify-users`: who is calling.
//!
//! Users are identified by a UUIDv7 id. They reach the service either through
//! an API token (only its SHA-256 digest is stored) or through an external
//! identity `(provider, subject)` asserted by a trusted upstream proxy.

pub mod db;
pub mod error;
pub mod identity;
pub mod resolver;
pub mod tokens;
pub mod types;

pub use error::{Result, UserError};
pub use resolver::{ResolvedUser, UserResolver};
pub use types::{ApiToken, IssuedToken, User, UserIdentity};
