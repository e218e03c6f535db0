//! Observation store backed by SQLite.

use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::{debug, info};

use climate_common::{
    format_date, ClimateError, ClimateResult, LookbackWindow, PrecipitationSeries, Station,
    TemperatureObservation, TemperatureSummary,
};

use crate::schema::{SCHEMA_SQL, TABLES};

/// Pool sizing for [`ClimateStore::connect`].
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            max_connections: 8,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Connection pool over the observation database.
///
/// The store itself never runs queries for a request. Handlers take a
/// [`StoreSession`] per request, which holds one pooled connection until it
/// is dropped.
#[derive(Debug, Clone)]
pub struct ClimateStore {
    pool: SqlitePool,
}

impl ClimateStore {
    /// Open the database at `database_url` read-only.
    ///
    /// Fails if the database cannot be opened; the file is never created.
    pub async fn connect(database_url: &str, options: &StoreOptions) -> ClimateResult<Self> {
        let connect_options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| ClimateError::ConfigError(format!("Invalid database URL: {}", e)))?
            .read_only(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.acquire_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| ClimateError::DatabaseError(format!("Connection failed: {}", e)))?;

        info!(
            max_connections = options.max_connections,
            "Connected to observation database"
        );

        Ok(Self { pool })
    }

    /// Open an in-memory database with the schema created (for testing).
    pub async fn open_memory() -> ClimateResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| ClimateError::ConfigError(e.to_string()))?;

        // Every connection to :memory: is a separate database, so the pool
        // must hold exactly one connection and never recycle it.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| ClimateError::DatabaseError(format!("Connection failed: {}", e)))?;

        let store = Self { pool };
        store.create_schema().await?;
        Ok(store)
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Underlying pool, for fixture loading.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the declared tables if they do not exist. Only meaningful on
    /// writable fixture databases.
    pub async fn create_schema(&self) -> ClimateResult<()> {
        for statement in SCHEMA_SQL.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| {
                        ClimateError::DatabaseError(format!("Schema creation failed: {}", e))
                    })?;
            }
        }
        Ok(())
    }

    /// Check every declared table and column exists in the database.
    pub async fn verify_schema(&self) -> ClimateResult<()> {
        for table in TABLES {
            let present: Vec<String> = sqlx::query_scalar(&format!(
                "SELECT name FROM pragma_table_info('{}')",
                table.name
            ))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ClimateError::DatabaseError(format!("Schema query failed: {}", e)))?;

            if present.is_empty() {
                return Err(ClimateError::SchemaMismatch(format!(
                    "table '{}' not found",
                    table.name
                )));
            }

            let missing = table.missing_columns(&present);
            if !missing.is_empty() {
                return Err(ClimateError::SchemaMismatch(format!(
                    "table '{}' is missing columns: {}",
                    table.name,
                    missing.join(", ")
                )));
            }

            debug!(table = table.name, columns = present.len(), "Verified table");
        }

        Ok(())
    }

    /// Round-trip a trivial query over a pooled connection.
    pub async fn ping(&self) -> ClimateResult<()> {
        let mut session = self.session().await?;
        sqlx::query("SELECT 1")
            .execute(&mut *session.conn)
            .await
            .map_err(|e| ClimateError::DatabaseError(format!("Ping failed: {}", e)))?;
        Ok(())
    }

    /// Acquire a connection for the duration of one request.
    pub async fn session(&self) -> ClimateResult<StoreSession> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| ClimateError::DatabaseError(format!("Acquire failed: {}", e)))?;
        Ok(StoreSession { conn })
    }
}

/// The station with the most measurement rows and its row count.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StationActivity {
    pub station: String,
    pub observations: i64,
}

#[derive(Debug, FromRow)]
struct StationRow {
    station: String,
    name: String,
    latitude: f64,
    longitude: f64,
    elevation: f64,
}

impl From<StationRow> for Station {
    fn from(row: StationRow) -> Self {
        Self {
            id: row.station,
            name: row.name,
            latitude: row.latitude,
            longitude: row.longitude,
            elevation: row.elevation,
        }
    }
}

type SummaryRow = (Option<f64>, Option<f64>, Option<f64>);

#[derive(Debug, FromRow)]
struct ObservationRow {
    date: String,
    tobs: f64,
}

/// One request's exclusive connection. Returned to the pool on drop.
pub struct StoreSession {
    conn: PoolConnection<Sqlite>,
}

impl StoreSession {
    /// Most recent measurement date, or `None` for an empty table.
    pub async fn max_date(&mut self) -> ClimateResult<Option<String>> {
        sqlx::query_scalar::<_, Option<String>>("SELECT MAX(date) FROM measurement")
            .fetch_one(&mut *self.conn)
            .await
            .map_err(|e| ClimateError::DatabaseError(format!("Query failed: {}", e)))
    }

    /// The 365-day window ending at the most recent measurement.
    pub async fn lookback_window(&mut self) -> ClimateResult<Option<LookbackWindow>> {
        match self.max_date().await? {
            Some(raw) => LookbackWindow::from_stored_max(&raw).map(Some),
            None => Ok(None),
        }
    }

    /// Precipitation by date from `start` onward, across all stations.
    ///
    /// Rows are read in `(date, station)` order, so when several stations
    /// report the same date the highest station id wins.
    pub async fn precipitation_since(
        &mut self,
        start: NaiveDate,
    ) -> ClimateResult<PrecipitationSeries> {
        let rows: Vec<(String, Option<f64>)> = sqlx::query_as(
            "SELECT date, prcp FROM measurement \
             WHERE date >= ?1 \
             ORDER BY date ASC, station ASC",
        )
        .bind(format_date(start))
        .fetch_all(&mut *self.conn)
        .await
        .map_err(|e| ClimateError::DatabaseError(format!("Query failed: {}", e)))?;

        debug!(start = %start, rows = rows.len(), "Fetched precipitation rows");

        Ok(rows.into_iter().collect())
    }

    /// Precipitation over the lookback window. Empty if there is no data.
    pub async fn recent_precipitation(&mut self) -> ClimateResult<PrecipitationSeries> {
        match self.lookback_window().await? {
            Some(window) => self.precipitation_since(window.start).await,
            None => Ok(PrecipitationSeries::new()),
        }
    }

    /// All stations ordered by id.
    pub async fn stations(&mut self) -> ClimateResult<Vec<Station>> {
        let rows = sqlx::query_as::<_, StationRow>(
            "SELECT station, name, latitude, longitude, elevation \
             FROM station ORDER BY station ASC",
        )
        .fetch_all(&mut *self.conn)
        .await
        .map_err(|e| ClimateError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(rows.into_iter().map(Station::from).collect())
    }

    /// Station with the most measurement rows over the whole table.
    /// Ties go to the lowest station id.
    pub async fn most_active_station(&mut self) -> ClimateResult<Option<StationActivity>> {
        sqlx::query_as::<_, StationActivity>(
            "SELECT station, COUNT(*) AS observations FROM measurement \
             GROUP BY station \
             ORDER BY observations DESC, station ASC \
             LIMIT 1",
        )
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(|e| ClimateError::DatabaseError(format!("Query failed: {}", e)))
    }

    /// Temperature readings for one station from `start` onward, by date.
    pub async fn temperature_observations(
        &mut self,
        station: &str,
        start: NaiveDate,
    ) -> ClimateResult<Vec<TemperatureObservation>> {
        let rows = sqlx::query_as::<_, ObservationRow>(
            "SELECT date, tobs FROM measurement \
             WHERE station = ?1 AND date >= ?2 AND tobs IS NOT NULL \
             ORDER BY date ASC",
        )
        .bind(station)
        .bind(format_date(start))
        .fetch_all(&mut *self.conn)
        .await
        .map_err(|e| ClimateError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|r| TemperatureObservation {
                date: r.date,
                tobs: r.tobs,
            })
            .collect())
    }

    /// Temperature readings of the most active station over the lookback
    /// window. Activity is counted over the whole table, not the window.
    pub async fn most_active_station_temperatures(
        &mut self,
    ) -> ClimateResult<Vec<TemperatureObservation>> {
        let Some(window) = self.lookback_window().await? else {
            return Ok(Vec::new());
        };
        let Some(active) = self.most_active_station().await? else {
            return Ok(Vec::new());
        };

        debug!(
            station = %active.station,
            observations = active.observations,
            window_start = %window.start,
            "Selected most active station"
        );

        self.temperature_observations(&active.station, window.start)
            .await
    }

    /// Min/max/avg temperature over all stations for dates in
    /// `start..=end`, or from `start` onward when `end` is `None`.
    ///
    /// An empty or inverted range yields an all-`None` summary.
    pub async fn temperature_summary(
        &mut self,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> ClimateResult<TemperatureSummary> {
        let row = match end {
            Some(end) => {
                sqlx::query_as::<_, SummaryRow>(
                    "SELECT CAST(MIN(tobs) AS REAL), CAST(MAX(tobs) AS REAL), AVG(tobs) \
                     FROM measurement WHERE date >= ?1 AND date <= ?2",
                )
                .bind(format_date(start))
                .bind(format_date(end))
                .fetch_one(&mut *self.conn)
                .await
            }
            None => {
                sqlx::query_as::<_, SummaryRow>(
                    "SELECT CAST(MIN(tobs) AS REAL), CAST(MAX(tobs) AS REAL), AVG(tobs) \
                     FROM measurement WHERE date >= ?1",
                )
                .bind(format_date(start))
                .fetch_one(&mut *self.conn)
                .await
            }
        }
        .map_err(|e| ClimateError::DatabaseError(format!("Query failed: {}", e)))?;

        let (min_temp, max_temp, avg_temp) = row;
        let summary = TemperatureSummary {
            min_temp,
            max_temp,
            avg_temp,
        };
        if summary.is_empty() {
            debug!(start = %start, end = ?end, "No readings in summary range");
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    async fn seeded() -> ClimateStore {
        let store = ClimateStore::open_memory().await.unwrap();

        for (code, name) in [("USC00511918", "HONOLULU"), ("USC00519281", "WAIHEE")] {
            sqlx::query(
                "INSERT INTO station (station, name, latitude, longitude, elevation) \
                 VALUES (?1, ?2, 21.3, -157.8, 3.0)",
            )
            .bind(code)
            .bind(name)
            .execute(store.pool())
            .await
            .unwrap();
        }

        let rows: &[(&str, &str, Option<f64>, f64)] = &[
            ("USC00519281", "2016-08-22", Some(0.10), 60.0),
            ("USC00519281", "2016-08-23", Some(0.20), 70.0),
            ("USC00519281", "2017-08-23", None, 80.0),
            ("USC00511918", "2017-08-23", Some(0.30), 75.0),
        ];
        for (station, date, prcp, tobs) in rows {
            sqlx::query(
                "INSERT INTO measurement (station, date, prcp, tobs) VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(*station)
            .bind(*date)
            .bind(*prcp)
            .bind(*tobs)
            .execute(store.pool())
            .await
            .unwrap();
        }

        store
    }

    #[tokio::test]
    async fn test_verify_schema_on_memory_store() {
        let store = ClimateStore::open_memory().await.unwrap();
        store.verify_schema().await.unwrap();
        store.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_verify_schema_reports_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.sqlite");
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        sqlx::query("CREATE TABLE measurement (station TEXT, date TEXT, prcp FLOAT)")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;

        let url = format!("sqlite://{}", path.display());
        let store = ClimateStore::connect(&url, &StoreOptions::default())
            .await
            .unwrap();
        let err = store.verify_schema().await.unwrap_err();
        match err {
            ClimateError::SchemaMismatch(msg) => assert!(msg.contains("tobs")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connect_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("absent.sqlite").display());
        let err = ClimateStore::connect(&url, &StoreOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClimateError::DatabaseError(_)));
    }

    #[tokio::test]
    async fn test_recent_precipitation_window_and_overwrite() {
        let store = seeded().await;
        let mut session = store.session().await.unwrap();

        let series = session.recent_precipitation().await.unwrap();
        // 2016-08-22 is 366 days before the max date
        assert_eq!(series.len(), 2);
        assert_eq!(series.get("2016-08-23"), Some(&Some(0.20)));
        // USC00519281 sorts after USC00511918 and its null wins
        assert_eq!(series.get("2017-08-23"), Some(&None));
    }

    #[tokio::test]
    async fn test_most_active_station_temperatures() {
        let store = seeded().await;
        let mut session = store.session().await.unwrap();

        let active = session.most_active_station().await.unwrap().unwrap();
        assert_eq!(active.station, "USC00519281");
        assert_eq!(active.observations, 3);

        let tobs = session.most_active_station_temperatures().await.unwrap();
        let dates: Vec<&str> = tobs.iter().map(|o| o.date.as_str()).collect();
        assert_eq!(dates, vec!["2016-08-23", "2017-08-23"]);
    }

    #[tokio::test]
    async fn test_most_active_tie_goes_to_lowest_id() {
        let store = ClimateStore::open_memory().await.unwrap();
        for station in ["USC00519397", "USC00513117"] {
            sqlx::query(
                "INSERT INTO measurement (station, date, prcp, tobs) \
                 VALUES (?1, '2017-01-01', 0.0, 65.0)",
            )
            .bind(station)
            .execute(store.pool())
            .await
            .unwrap();
        }

        let mut session = store.session().await.unwrap();
        let active = session.most_active_station().await.unwrap().unwrap();
        assert_eq!(active.station, "USC00513117");
    }

    #[tokio::test]
    async fn test_temperature_summary_inclusive_bounds() {
        let store = seeded().await;
        let mut session = store.session().await.unwrap();

        let summary = session
            .temperature_summary(day("2016-08-23"), Some(day("2017-08-23")))
            .await
            .unwrap();
        assert_eq!(summary.min_temp, Some(70.0));
        assert_eq!(summary.max_temp, Some(80.0));
        assert_eq!(summary.avg_temp, Some(75.0));

        let open_ended = session
            .temperature_summary(day("2016-08-22"), None)
            .await
            .unwrap();
        assert_eq!(open_ended.min_temp, Some(60.0));
        assert_eq!(open_ended.max_temp, Some(80.0));
    }

    #[tokio::test]
    async fn test_temperature_summary_inverted_range_is_empty() {
        let store = seeded().await;
        let mut session = store.session().await.unwrap();

        let summary = session
            .temperature_summary(day("2017-08-23"), Some(day("2016-08-23")))
            .await
            .unwrap();
        assert!(summary.is_empty());
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = ClimateStore::open_memory().await.unwrap();
        let mut session = store.session().await.unwrap();

        assert_eq!(session.max_date().await.unwrap(), None);
        assert!(session.recent_precipitation().await.unwrap().is_empty());
        assert!(session.most_active_station_temperatures().await.unwrap().is_empty());
        assert!(session.stations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stations_sorted_by_id() {
        let store = seeded().await;
        let mut session = store.session().await.unwrap();

        let stations = session.stations().await.unwrap();
        let ids: Vec<&str> = stations.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["USC00511918", "USC00519281"]);
        assert_eq!(stations[0].name, "HONOLULU");
    }

    #[tokio::test]
    async fn test_session_returns_connection_to_pool() {
        let store = seeded().await;
        {
            let mut session = store.session().await.unwrap();
            session.stations().await.unwrap();
        }
        // The memory pool has a single connection; this would time out if
        // the first session had leaked it.
        let mut session = store.session().await.unwrap();
        assert!(session.max_date().await.unwrap().is_some());
    }
}
