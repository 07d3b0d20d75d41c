//! ragfuse-core
//!
//! Shared types, errors, configuration, tokenizer and chunk store for the
//! hybrid retrieval engine.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod corpus;
pub mod error;
pub mod ranking;
pub mod store;
pub mod tokenize;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
