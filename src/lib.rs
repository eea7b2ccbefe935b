//! Marginal-ROAS estimation and budget reallocation for advertising campaigns.
//!
//! Data flows one way: [`data::simulate`] produces daily records, which
//! [`analysis::aggregate`] and [`analysis::marginal`] summarise per campaign,
//! and [`analysis::allocate`] ranks into budget recommendations.

pub mod analysis;
pub mod api;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;

pub use error::ConfigError;
