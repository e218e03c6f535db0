//! A small, fixed observation dataset for tests.
//!
//! Shaped so that the interesting cases are all present:
//! - `USC00519281` has the most rows overall but only two inside the
//!   lookback window, while `USC00513117` has more rows inside it.
//! - Two dates are reported by more than one station.
//! - One row sits a day before the window start, one exactly on it.
//! - `USC00511918` has no measurements at all.
//! - Some precipitation readings are null.

use std::path::Path;

use climate_common::{ClimateError, ClimateResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use storage::ClimateStore;

/// Most recent measurement date in the fixture.
pub const MAX_DATE: &str = "2017-08-23";

/// First day of the lookback window ending at [`MAX_DATE`].
pub const WINDOW_START: &str = "2016-08-23";

/// Earliest measurement date in the fixture.
pub const EARLIEST_DATE: &str = "2015-06-01";

/// Station with the most measurement rows.
pub const MOST_ACTIVE_STATION: &str = "USC00519281";

/// A station row.
#[derive(Debug, Clone, Copy)]
pub struct StationFixture {
    pub station: &'static str,
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
}

/// A measurement row.
#[derive(Debug, Clone, Copy)]
pub struct MeasurementFixture {
    pub station: &'static str,
    pub date: &'static str,
    pub prcp: Option<f64>,
    pub tobs: f64,
}

pub const STATIONS: &[StationFixture] = &[
    StationFixture {
        station: "USC00519397",
        name: "WAIKIKI 717.2, HI US",
        latitude: 21.2716,
        longitude: -157.8168,
        elevation: 3.0,
    },
    StationFixture {
        station: "USC00513117",
        name: "KANEOHE 838.1, HI US",
        latitude: 21.4234,
        longitude: -157.8015,
        elevation: 14.6,
    },
    StationFixture {
        station: "USC00519281",
        name: "WAIHEE 837.5, HI US",
        latitude: 21.45167,
        longitude: -157.84889,
        elevation: 32.9,
    },
    StationFixture {
        station: "USC00511918",
        name: "HONOLULU OBSERVATORY 702.2, HI US",
        latitude: 21.3152,
        longitude: -157.9992,
        elevation: 0.9,
    },
];

const fn m(
    station: &'static str,
    date: &'static str,
    prcp: Option<f64>,
    tobs: f64,
) -> MeasurementFixture {
    MeasurementFixture {
        station,
        date,
        prcp,
        tobs,
    }
}

pub const MEASUREMENTS: &[MeasurementFixture] = &[
    m("USC00519281", "2015-06-01", Some(0.0), 71.0),
    m("USC00519281", "2015-09-15", Some(0.12), 74.0),
    m("USC00519281", "2016-01-10", Some(0.5), 65.0),
    m("USC00519281", "2016-08-22", Some(0.05), 76.0),
    m("USC00519281", "2016-08-23", Some(0.7), 77.0),
    m("USC00519281", "2017-08-23", Some(0.08), 79.0),
    m("USC00513117", "2016-08-23", Some(0.15), 78.0),
    m("USC00513117", "2016-12-25", None, 68.0),
    m("USC00513117", "2017-03-01", Some(0.25), 70.0),
    m("USC00513117", "2017-08-20", Some(0.02), 81.0),
    m("USC00519397", "2017-08-21", None, 80.0),
    m("USC00519397", "2017-08-23", Some(0.0), 82.0),
];

/// Insert the fixture dataset into a store whose schema already exists.
pub async fn seed_store(store: &ClimateStore) -> ClimateResult<()> {
    for s in STATIONS {
        sqlx::query(
            "INSERT INTO station (station, name, latitude, longitude, elevation) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(s.station)
        .bind(s.name)
        .bind(s.latitude)
        .bind(s.longitude)
        .bind(s.elevation)
        .execute(store.pool())
        .await
        .map_err(|e| ClimateError::DatabaseError(format!("Seeding stations failed: {}", e)))?;
    }

    for r in MEASUREMENTS {
        sqlx::query("INSERT INTO measurement (station, date, prcp, tobs) VALUES (?1, ?2, ?3, ?4)")
            .bind(r.station)
            .bind(r.date)
            .bind(r.prcp)
            .bind(r.tobs)
            .execute(store.pool())
            .await
            .map_err(|e| {
                ClimateError::DatabaseError(format!("Seeding measurements failed: {}", e))
            })?;
    }

    Ok(())
}

/// In-memory store loaded with the fixture dataset.
pub async fn seeded_store() -> ClimateResult<ClimateStore> {
    let store = ClimateStore::open_memory().await?;
    seed_store(&store).await?;
    Ok(store)
}

/// Write the fixture dataset to a new SQLite file at `path`.
pub async fn create_fixture_database(path: &Path) -> ClimateResult<()> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| ClimateError::DatabaseError(format!("Connection failed: {}", e)))?;

    let store = ClimateStore::from_pool(pool.clone());
    store.create_schema().await?;
    seed_store(&store).await?;
    pool.close().await;

    Ok(())
}

/// Mean of the fixture `tobs` values whose date satisfies `keep`.
pub fn expected_avg(keep: impl Fn(&str) -> bool) -> Option<f64> {
    let values: Vec<f64> = MEASUREMENTS
        .iter()
        .filter(|r| keep(r.date))
        .map(|r| r.tobs)
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
