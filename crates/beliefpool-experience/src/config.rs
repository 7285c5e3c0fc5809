//! Experience pool configuration

use std::collections::BTreeMap;
use std::path::Path;

use beliefpool_common::{BeliefPoolError, Result, DEFAULT_MAX_SIZE, DEFAULT_SAMPLE_SIZE};
use serde::{Deserialize, Serialize};

/// Environment variable prefix, e.g. `BELIEFPOOL_STATE_SIZE=32`
pub const ENV_PREFIX: &str = "BELIEFPOOL";

/// Settings fixed at construction of a belief experience pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceSettings {
    /// Dataset name reported to consumers
    pub name: String,
    /// Latent state dimensionality (required, no default)
    pub state_size: Option<usize>,
    /// Ring buffer capacity
    pub max_size: usize,
    /// Independent rollouts sampled per incoming sequence
    pub sample_size: usize,
    /// Seed for the Gaussian sampler; entropy when unset
    pub seed: Option<u64>,
    /// Capacity of the fault broadcast channel
    pub fault_capacity: usize,
}

impl Default for ExperienceSettings {
    fn default() -> Self {
        Self {
            name: "belief".to_string(),
            state_size: None,
            max_size: DEFAULT_MAX_SIZE,
            sample_size: DEFAULT_SAMPLE_SIZE,
            seed: None,
            fault_capacity: 64,
        }
    }
}

impl ExperienceSettings {
    /// Defaults with the required state size filled in
    pub fn new(state_size: usize) -> Self {
        Self {
            state_size: Some(state_size),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load settings from `.env`, an optional settings file and
    /// `BELIEFPOOL_*` environment variables (highest priority)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        let settings: Self = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| BeliefPoolError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the pool cannot run with
    pub fn validate(&self) -> Result<()> {
        match self.state_size {
            None => return Err(BeliefPoolError::Config("state_size is required".into())),
            Some(0) => return Err(BeliefPoolError::Config("state_size must be positive".into())),
            Some(_) => {}
        }
        if self.max_size == 0 {
            return Err(BeliefPoolError::Config("max_size must be positive".into()));
        }
        if self.sample_size == 0 {
            return Err(BeliefPoolError::Config("sample_size must be positive".into()));
        }
        if self.fault_capacity == 0 {
            return Err(BeliefPoolError::Config("fault_capacity must be positive".into()));
        }
        Ok(())
    }

    /// Validated state size
    pub fn state_size(&self) -> Result<usize> {
        self.validate()?;
        self.state_size
            .ok_or_else(|| BeliefPoolError::Config("state_size is required".into()))
    }

    /// Settings as published dataset properties
    pub fn properties(&self) -> BTreeMap<String, String> {
        let mut props = BTreeMap::new();
        if let Some(state_size) = self.state_size {
            props.insert("stateSize".to_string(), state_size.to_string());
        }
        props.insert("maxSize".to_string(), self.max_size.to_string());
        props.insert("sampleSize".to_string(), self.sample_size.to_string());
        if let Some(seed) = self.seed {
            props.insert("seed".to_string(), seed.to_string());
        }
        props
    }
}
