use anyhow::Result;
use occupancy_publisher::{
    clock::SystemClock,
    config::CONFIG_PATH,
    generator::ReadingGenerator,
    observability,
    pipeline,
    publishers::PubSubRestPublisher,
};
use rand::{rngs::StdRng, SeedableRng};
use station_client::domain::STATION_IDS;
use std::path::Path;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Resolve the local offset while the process is still single-threaded.
    let clock = SystemClock::local();
    let generator = ReadingGenerator::new(StdRng::from_entropy(), clock);

    let mut stdout = std::io::stdout().lock();
    let ids = pipeline::run_from_config(
        Path::new(CONFIG_PATH),
        PubSubRestPublisher::connect,
        generator,
        &STATION_IDS,
        &mut stdout,
    )
    .await?;

    tracing::info!(published = ids.len(), "all station readings published");
    Ok(())
}
