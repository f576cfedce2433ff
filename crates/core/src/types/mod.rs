//! Core types for Nalan Jewel.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{format_amount, format_dollars, format_table_dollars};
pub use status::*;
