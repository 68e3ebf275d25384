use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::tunables::DEFAULT_TRACKING_FLOOR;

/// Driver configuration loaded from environment variables.
/// Every variable has a default; only malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub novelty_dir: PathBuf,
    pub locale: String,
    pub tracking_floor: f32,
    pub select_k: usize,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let tracking_floor = match std::env::var("COPYFIT_TRACKING_FLOOR") {
            Ok(raw) => raw
                .parse::<f32>()
                .context("COPYFIT_TRACKING_FLOOR must be a number")?,
            Err(_) => DEFAULT_TRACKING_FLOOR,
        };
        if tracking_floor > 0.0 {
            anyhow::bail!("COPYFIT_TRACKING_FLOOR must be <= 0, got {tracking_floor}");
        }

        Ok(Config {
            novelty_dir: PathBuf::from(env_or("COPYFIT_NOVELTY_DIR", ".copyfit/novelty")),
            locale: env_or("COPYFIT_LOCALE", "en"),
            tracking_floor,
            select_k: parse_select_k(&env_or("COPYFIT_SELECT_K", "3"))?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn parse_select_k(raw: &str) -> Result<usize> {
    let k = raw
        .parse::<usize>()
        .context("COPYFIT_SELECT_K must be a positive integer")?;
    if k == 0 {
        anyhow::bail!("COPYFIT_SELECT_K must be a positive integer, got 0");
    }
    Ok(k)
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
