//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports from the [`secrecy`] crate. `SecretString` implements
//! `Debug` with redaction, so structs deriving `Debug` around a secret
//! cannot leak it via `{:?}` or tracing fields. Values are zeroized on
//! drop.
//!
//! Use `SecretString` for connection strings that may embed credentials
//! (the Redis URL is the one such value in this service).

pub use secrecy::{ExposeSecret, SecretString};
