//! Route handlers organized by resource

pub mod contacts;
pub mod health;
