// src/config.rs

use std::env;

use crate::Error;

/// Runtime configuration, read from the environment (a `.env` file is
/// loaded by the binary before this runs).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bot_token: String,
    /// Scheduler tick period in seconds. Coarse is fine; sub-second
    /// precision is not a goal.
    pub tick_secs: u64,
    /// Path to the quiz question bank JSON, if any.
    pub question_bank: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| Error::Parse("DATABASE_URL is not set".into()))?;
        let bot_token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| Error::Parse("TELEGRAM_BOT_TOKEN is not set".into()))?;

        let tick_secs = match env::var("SCHEDULER_TICK_SECS") {
            Ok(v) => v
                .parse::<u64>()
                .map_err(|e| Error::Parse(format!("SCHEDULER_TICK_SECS: {}", e)))?,
            Err(_) => 60,
        };

        Ok(Self {
            database_url,
            bot_token,
            tick_secs,
            question_bank: env::var("QUESTION_BANK_PATH").ok(),
        })
    }
}
