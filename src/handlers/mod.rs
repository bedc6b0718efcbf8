// src/handlers/mod.rs

pub mod health;
pub mod notes;
pub mod question;
pub mod quiz_result;
pub mod stats;
