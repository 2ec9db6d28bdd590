//! Credential handling.
//!
//! Logins are moved out of the parsed configuration into [`Credentials`]
//! before a connection is opened, so the password lives in exactly one
//! zeroizing container for the rest of the run.

mod credentials;

pub use credentials::Credentials;
