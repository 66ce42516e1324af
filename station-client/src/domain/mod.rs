pub mod station_reading;

pub use station_reading::{StationReading, CHARGER_TOTAL, MAX_IN_USE, STATION_IDS};
