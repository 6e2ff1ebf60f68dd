//! # PIX Models
//!
//! Wire types for the Efí PIX REST API.
//!
//! ## Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`error`] | Provider error details (`ApiError`, `FieldError`) and the `ProviderDiagnostics` accessor |
//! | [`charge`] | Charges (`cob`) and their nested value types |
//! | [`key`] | Random (EVP) keys |
//! | [`webhook`] | Webhook registrations and listings |
//!
//! Every response payload composes an [`ApiError`] so failed calls can
//! surface provider diagnostics next to the generic error.

pub mod charge;
pub mod error;
pub mod key;
pub mod webhook;

// Re-export all public types at crate root for convenience.
pub use charge::*;
pub use error::*;
pub use key::*;
pub use webhook::*;
