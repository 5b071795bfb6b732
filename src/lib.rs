// src/lib.rs

pub mod api;
pub mod assessment;
pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod mood;
pub mod state;
pub mod store;

pub use error::{Error, Result};
pub use state::AppState;
