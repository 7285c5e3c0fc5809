//! BeliefPool demo runner
//!
//! Feeds randomly generated episodes through a state belief adapter backed
//! by synthetic models and reports buffer statistics.
//!
//! ```text
//! BELIEFPOOL_STATE_SIZE=8 beliefpool [settings.toml]
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use rand::Rng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use beliefpool_common::{RawSequence, RawTransition, Vector, VERSION};
use beliefpool_experience::{
    ExperienceSettings, InMemoryPool, InferenceModel, StateBeliefAdapter, SyntheticModel,
};

const EPISODES: usize = 20;
const EPISODE_STEPS: usize = 50;
const OBSERVATION_SIZE: usize = 4;
const ACTION_SIZE: usize = 2;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();

    info!("Starting BeliefPool v{}", VERSION);

    let path = std::env::args().nth(1).map(PathBuf::from);
    let settings = ExperienceSettings::load(path.as_deref())?;
    info!("Loaded configuration: {:?}", settings);

    let state_size = settings.state_size()?;
    let pool =
        Arc::new(InMemoryPool::new("demo", vec![ACTION_SIZE]).with_max_sequences(EPISODES));
    let posterior: Arc<dyn InferenceModel> = Arc::new(SyntheticModel::posterior(state_size));
    let prior: Arc<dyn InferenceModel> = Arc::new(SyntheticModel::prior(state_size));

    let adapter = StateBeliefAdapter::new(settings, pool, posterior, Some(prior))?;
    let mut faults = adapter.subscribe_faults();

    let mut rng = rand::thread_rng();
    for _ in 0..EPISODES {
        adapter.add_sequence(random_episode(&mut rng)).await?;
    }
    adapter.flush().await?;

    while let Ok(fault) = faults.try_recv() {
        info!(sequence_id = %fault.sequence_id, kind = ?fault.kind, "Fault: {}", fault.message);
    }

    let snapshot = adapter.metrics().snapshot();
    info!("Metrics: {}", serde_json::to_string(&snapshot)?);
    info!("Dataset: {}", serde_json::to_string(&adapter.descriptor())?);

    adapter.shutdown().await?;
    info!("Shutting down BeliefPool");
    Ok(())
}

fn random_episode<R: Rng>(rng: &mut R) -> RawSequence {
    let mut transitions: Vec<RawTransition> = (0..EPISODE_STEPS)
        .map(|_| {
            let observation: Vec<f32> = (0..OBSERVATION_SIZE)
                .map(|_| rng.gen_range(-1.0..1.0))
                .collect();
            let mut action = vec![0.0; ACTION_SIZE];
            action[rng.gen_range(0..ACTION_SIZE)] = 1.0;
            RawTransition::new(
                Vector::from(observation),
                Vector::from(action),
                Vector::zeros(1),
                rng.gen_range(0.0..1.0),
            )
        })
        .collect();
    if let Some(last) = transitions.pop() {
        transitions.push(last.terminal());
    }
    RawSequence::new(transitions)
}
