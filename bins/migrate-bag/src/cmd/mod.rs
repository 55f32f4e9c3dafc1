pub mod config;
pub mod error;
pub mod layout;
pub mod migrate;
pub mod rules;
