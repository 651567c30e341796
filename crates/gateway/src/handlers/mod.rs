//! API handlers module

pub mod classify;
pub mod health;
