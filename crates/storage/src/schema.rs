//! Table declarations for the observation dataset.
//!
//! The dataset is produced elsewhere; these declarations name the columns
//! the queries rely on so a mismatched database is rejected at startup
//! instead of on the first request.

/// A table and the columns this service reads from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

impl TableDef {
    /// Declared columns absent from `present`. SQLite identifiers are
    /// case-insensitive, so the comparison is too.
    pub fn missing_columns(&self, present: &[String]) -> Vec<&'static str> {
        self.columns
            .iter()
            .copied()
            .filter(|col| !present.iter().any(|p| p.eq_ignore_ascii_case(col)))
            .collect()
    }
}

/// Daily readings, one row per station per date.
pub const MEASUREMENT: TableDef = TableDef {
    name: "measurement",
    columns: &["station", "date", "prcp", "tobs"],
};

/// Station metadata. `station` holds the code measurements refer to.
pub const STATION: TableDef = TableDef {
    name: "station",
    columns: &["station", "name", "latitude", "longitude", "elevation"],
};

pub const TABLES: &[TableDef] = &[MEASUREMENT, STATION];

/// DDL matching the declarations above. Only used to build fixture and
/// in-memory databases; production databases are never modified.
pub(crate) const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS station (
    id INTEGER PRIMARY KEY,
    station TEXT NOT NULL,
    name TEXT NOT NULL,
    latitude FLOAT NOT NULL,
    longitude FLOAT NOT NULL,
    elevation FLOAT NOT NULL
);

CREATE TABLE IF NOT EXISTS measurement (
    id INTEGER PRIMARY KEY,
    station TEXT NOT NULL,
    date TEXT NOT NULL,
    prcp FLOAT,
    tobs FLOAT
);

CREATE INDEX IF NOT EXISTS idx_measurement_date ON measurement(date);
CREATE INDEX IF NOT EXISTS idx_measurement_station ON measurement(station)
"#;
