//! Stage timing configuration parsed from environment variables.
//!
//! Every knob is optional; unset or unparsable values fall back to the
//! dashboard defaults. Values that parse but cannot drive a stage (an
//! increment of 0 or above 100, a tick of 0 ms) are rejected.

use std::time::Duration;

use tracing::warn;

use crate::stage::{MAX_PERCENT, MAX_TICK, Stage, StageTiming};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be between 1 and 100, got {value}")]
    InvalidIncrement { var: String, value: u64 },
    #[error("{var} must be between 1 and 60000 ms, got {value}")]
    InvalidTick { var: String, value: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageConfig {
    pub upload: StageTiming,
    pub verify: StageTiming,
    pub tokenize: StageTiming,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            upload: StageTiming::default_for(Stage::Upload),
            verify: StageTiming::default_for(Stage::Verify),
            tokenize: StageTiming::default_for(Stage::Tokenize),
        }
    }
}

impl StageConfig {
    /// Build stage timings from environment variables.
    ///
    /// Optional, per stage (`UPLOAD`, `VERIFY`, `TOKENIZE`):
    /// - `STAGE_<NAME>_INCREMENT`: percent added per tick (1-100)
    /// - `STAGE_<NAME>_TICK_MS`: tick interval in milliseconds
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            upload: timing_from(&lookup, Stage::Upload)?,
            verify: timing_from(&lookup, Stage::Verify)?,
            tokenize: timing_from(&lookup, Stage::Tokenize)?,
        })
    }

    #[must_use]
    pub fn timing(&self, stage: Stage) -> StageTiming {
        match stage {
            Stage::Upload => self.upload,
            Stage::Verify => self.verify,
            Stage::Tokenize => self.tokenize,
        }
    }
}

fn timing_from<L>(lookup: &L, stage: Stage) -> Result<StageTiming, ConfigError>
where
    L: Fn(&str) -> Option<String>,
{
    let defaults = StageTiming::default_for(stage);
    let name = stage.as_str().to_ascii_uppercase();

    let increment_var = format!("STAGE_{name}_INCREMENT");
    let increment = lookup_parse(lookup, &increment_var, u64::from(defaults.increment));
    let increment = match u8::try_from(increment) {
        Ok(i) if (1..=MAX_PERCENT).contains(&i) => i,
        _ => return Err(ConfigError::InvalidIncrement { var: increment_var, value: increment }),
    };

    let tick_var = format!("STAGE_{name}_TICK_MS");
    let default_tick_ms = u64::try_from(defaults.tick.as_millis()).unwrap_or(u64::MAX);
    let tick_ms = lookup_parse(lookup, &tick_var, default_tick_ms);
    let tick = Duration::from_millis(tick_ms);
    if tick.is_zero() || tick > MAX_TICK {
        return Err(ConfigError::InvalidTick { var: tick_var, value: tick_ms });
    }

    Ok(StageTiming::new(increment, tick))
}

fn lookup_parse<L, T>(lookup: &L, key: &str, default: T) -> T
where
    L: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    raw.trim().parse::<T>().unwrap_or_else(|_| {
        warn!(key, value = %raw, "ignoring unparsable stage setting");
        default
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
