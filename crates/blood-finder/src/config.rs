use std::path::PathBuf;

use crate::criteria::OrderingPolicy;
use crate::error::AppError;
use crate::feedback::NOTABLE_STOCK_UNITS;

/// Application configuration loaded explicitly from environment variables.
///
/// Everything is optional; without a catalog path the bundled sample
/// catalog is served.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON file with the hospital catalog. `None` uses the bundled sample.
    pub catalog_path: Option<PathBuf>,
    /// Groups above this many units are read out for a single hospital.
    pub notable_stock: u32,
    pub ordering: OrderingPolicy,
    /// Match known catalog locations in transcripts before the leftover-word
    /// rule. On unless explicitly disabled.
    pub location_gazetteer: bool,
    /// Serve MCP over TCP on this address instead of stdio.
    pub tcp_listen_addr: Option<String>,
    /// Read transcripts line by line from stdin instead of serving MCP.
    pub console: bool,
}

impl Config {
    /// Optional:
    /// - `BLOOD_FINDER_CATALOG_PATH`
    /// - `BLOOD_FINDER_NOTABLE_STOCK` (default: 5)
    /// - `BLOOD_FINDER_ORDERING` (`last-writer-wins` | `discard-stale`)
    /// - `BLOOD_FINDER_LOCATION_GAZETTEER` (default: true)
    /// - `BLOOD_FINDER_CONSOLE` (default: false)
    /// - `MCP_TCP_LISTEN_ADDR`
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let catalog_path = var("BLOOD_FINDER_CATALOG_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        if let Some(path) = &catalog_path {
            if !path.exists() {
                return Err(AppError::Config(format!(
                    "catalog file not found: {}",
                    path.display()
                )));
            }
        }

        let notable_stock = match var("BLOOD_FINDER_NOTABLE_STOCK") {
            Some(raw) => raw.trim().parse::<u32>().map_err(|_| {
                AppError::Config(format!(
                    "BLOOD_FINDER_NOTABLE_STOCK must be a non-negative integer, got '{raw}'"
                ))
            })?,
            None => NOTABLE_STOCK_UNITS,
        };

        let ordering = var("BLOOD_FINDER_ORDERING")
            .map(|raw| raw.parse::<OrderingPolicy>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            catalog_path,
            notable_stock,
            ordering,
            location_gazetteer: parse_flag(&var, "BLOOD_FINDER_LOCATION_GAZETTEER", true)?,
            tcp_listen_addr: var("MCP_TCP_LISTEN_ADDR").filter(|a| !a.trim().is_empty()),
            console: parse_flag(&var, "BLOOD_FINDER_CONSOLE", false)?,
        })
    }
}

fn parse_flag(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: bool,
) -> Result<bool, AppError> {
    let Some(raw) = var(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Ok(default),
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::Config(format!(
            "{key} must be true or false, got '{raw}'"
        ))),
    }
}
