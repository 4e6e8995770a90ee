//! chainread-providers — built-in endpoint lists for common EVM chains.
//!
//! # Quick start
//! ```rust
//! use chainread_providers::public;
//!
//! let polygon = public::chain("polygon").unwrap();
//! assert_eq!(polygon.chain_id, 137);
//! ```

pub mod public;
