//! Wire types shared by the Herald crates.

pub mod api;
pub mod models;
