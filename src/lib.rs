// src/lib.rs

pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod models;
pub mod platforms;
pub mod repositories;
pub mod services;
pub mod tasks;

pub use db::Database;
pub use error::Error;
