use serde::{Deserialize, Serialize};

/// Stations that receive a synthetic reading on every run, in publish order.
pub const STATION_IDS: [u32; 10] = [40, 48, 58, 60, 61, 62, 64, 70, 71, 72];

/// Every station is modeled with two chargers.
pub const CHARGER_TOTAL: u32 = 2;

/// Upper bound of the synthetic `charger_in_use` draw. Kept separate from
/// `CHARGER_TOTAL`: readings are not required to respect the total.
pub const MAX_IN_USE: u32 = 2;

/// One occupancy snapshot for a station.
///
/// Field declaration order is the wire order of the JSON payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationReading {
    pub station_id: u32,
    pub charger_in_use: u32,
    pub charger_total: u32,
    /// Local wall-clock time of generation, e.g. `2024-05-01 08:30:00.123456`.
    pub updated: String,
}

impl StationReading {
    /// UTF-8 JSON body handed to the messaging backend.
    pub fn to_payload(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_payload(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}
