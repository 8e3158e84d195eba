pub mod common;
pub mod conditional;
pub mod configuration;
pub mod context;
pub mod manifest;
pub mod project;

use super::error::DomainError;
