use anyhow::{Result, bail};
use serde::Deserialize;

/// Motor speed readings used by the playground when nothing else is given.
/// `2` and `3000` are deliberate outliers.
pub const DEFAULT_SAMPLES: [i64; 8] = [2050, 2055, 2048, 2, 2051, 2058, 2050, 3000];

/// Sigma multiplier for the acceptance band.
pub const DEFAULT_WIN: f64 = 1.1;

/// Inputs for the truncated-mean playground.
///
/// Stored as a JSON object on disk, every field optional:
/// ```json
/// {
///   "samples": [2050, 2055, 2048, 2, 2051, 2058, 2050, 3000],
///   "win": 1.1
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TruncMeanConfig {
    pub samples: Vec<i64>,
    pub win: f64,
}

impl Default for TruncMeanConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES.to_vec(),
            win: DEFAULT_WIN,
        }
    }
}

impl TruncMeanConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Applies command-line overrides on top of the loaded values.
    pub fn with_overrides(mut self, samples: Option<Vec<i64>>, win: Option<f64>) -> Self {
        if let Some(samples) = samples {
            self.samples = samples;
        }
        if let Some(win) = win {
            self.win = win;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.samples.is_empty() {
            bail!("config must contain at least one sample");
        }
        if !self.win.is_finite() {
            bail!("win must be a finite number, got {}", self.win);
        }
        Ok(())
    }
}
