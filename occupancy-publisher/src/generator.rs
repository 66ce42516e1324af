use rand::Rng;
use station_client::domain::{StationReading, CHARGER_TOTAL, MAX_IN_USE};

use crate::{
    clock::{format_updated, Clock},
    pipeline::PublisherError,
};

/// Builds synthetic readings from an explicit random source and clock.
pub struct ReadingGenerator<R, C> {
    rng: R,
    clock: C,
}

impl<R: Rng, C: Clock> ReadingGenerator<R, C> {
    pub fn new(rng: R, clock: C) -> Self {
        Self { rng, clock }
    }

    /// One reading for `station_id`; `charger_in_use` is uniform over `0..=MAX_IN_USE`.
    pub fn generate(&mut self, station_id: u32) -> Result<StationReading, PublisherError> {
        let charger_in_use = self.rng.gen_range(0..=MAX_IN_USE);
        let updated = format_updated(self.clock.now())
            .map_err(|e| PublisherError::Encode(format!("failed to format timestamp: {e}")))?;

        Ok(StationReading {
            station_id,
            charger_in_use,
            charger_total: CHARGER_TOTAL,
            updated,
        })
    }
}
