//! CSV-backed coordinate table.
//!
//! The table must carry a header row. Column names are matched
//! case-insensitively, and the names used by common country-centroid
//! datasets (`Country_Name`, `Latitude`, `Longitude`) are accepted
//! alongside the canonical `name`, `latitude`, `longitude`.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use covid_map_case_models::CountryCoordinate;

use crate::CoordinateError;

/// Accepted header names for the country name column.
const NAME_COLUMNS: &[&str] = &["name", "country_name", "country"];

/// Accepted header names for the latitude column.
const LATITUDE_COLUMNS: &[&str] = &["latitude", "lat"];

/// Accepted header names for the longitude column.
const LONGITUDE_COLUMNS: &[&str] = &["longitude", "lon", "lng"];

/// Country coordinates in file order, indexed by exact country name.
#[derive(Debug, Clone, Default)]
pub struct CoordinateTable {
    entries: Vec<CountryCoordinate>,
    index: BTreeMap<String, usize>,
}

impl CoordinateTable {
    /// Looks up a country by exact, case-sensitive name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CountryCoordinate> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Number of distinct countries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in file order.
    pub fn iter(&self) -> impl Iterator<Item = &CountryCoordinate> {
        self.entries.iter()
    }

    /// Appends an entry. Returns `false` (and keeps the existing entry)
    /// if the name is already present.
    pub fn insert(&mut self, coordinate: CountryCoordinate) -> bool {
        if self.index.contains_key(&coordinate.name) {
            return false;
        }
        self.index
            .insert(coordinate.name.clone(), self.entries.len());
        self.entries.push(coordinate);
        true
    }
}

impl From<Vec<CountryCoordinate>> for CoordinateTable {
    fn from(coordinates: Vec<CountryCoordinate>) -> Self {
        let mut table = Self::default();
        for coordinate in coordinates {
            table.insert(coordinate);
        }
        table
    }
}

/// Loads the coordinate table from a CSV file.
///
/// # Errors
///
/// Returns [`CoordinateError::NotFound`] if `path` does not exist, and the
/// errors of [`parse_coordinates`] if its contents are unusable.
pub fn load_coordinates(path: &Path) -> Result<CoordinateTable, CoordinateError> {
    let file = std::fs::File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CoordinateError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            CoordinateError::Io(e)
        }
    })?;

    let table = parse_coordinates(file, &path.display().to_string())?;
    log::info!(
        "Loaded {} country coordinates from {}",
        table.len(),
        path.display()
    );
    Ok(table)
}

/// Parses a coordinate table from any CSV reader.
///
/// `origin` labels the data in error messages.
///
/// # Errors
///
/// Returns [`CoordinateError::MissingColumn`] if the header row lacks a
/// name, latitude, or longitude column, [`CoordinateError::InvalidValue`]
/// for an empty name or a non-finite coordinate, and
/// [`CoordinateError::Csv`] for malformed CSV.
pub fn parse_coordinates(
    reader: impl Read,
    origin: &str,
) -> Result<CoordinateTable, CoordinateError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let name_idx = find_column(&headers, NAME_COLUMNS, "name", origin)?;
    let lat_idx = find_column(&headers, LATITUDE_COLUMNS, "latitude", origin)?;
    let lng_idx = find_column(&headers, LONGITUDE_COLUMNS, "longitude", origin)?;

    let mut table = CoordinateTable::default();

    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);
        let cell = |idx: usize| record.get(idx).unwrap_or_default();

        let name = cell(name_idx);
        if name.is_empty() {
            return Err(CoordinateError::InvalidValue {
                origin: origin.to_owned(),
                line,
                column: "name",
                value: String::new(),
            });
        }

        let latitude = parse_degrees(cell(lat_idx), "latitude", line, origin)?;
        let longitude = parse_degrees(cell(lng_idx), "longitude", line, origin)?;

        let inserted = table.insert(CountryCoordinate {
            name: name.to_owned(),
            latitude,
            longitude,
        });
        if !inserted {
            log::warn!("{origin}: line {line}: duplicate country '{name}', keeping first entry");
        }
    }

    Ok(table)
}

fn find_column(
    headers: &csv::StringRecord,
    aliases: &[&str],
    column: &'static str,
    origin: &str,
) -> Result<usize, CoordinateError> {
    headers
        .iter()
        .position(|h| aliases.iter().any(|a| h.eq_ignore_ascii_case(a)))
        .ok_or_else(|| CoordinateError::MissingColumn {
            origin: origin.to_owned(),
            column,
        })
}

fn parse_degrees(
    raw: &str,
    column: &'static str,
    line: u64,
    origin: &str,
) -> Result<f64, CoordinateError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CoordinateError::InvalidValue {
            origin: origin.to_owned(),
            line,
            column,
            value: raw.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALIASED_CSV: &str = "\
Country_Code,Latitude,Longitude,Country_Name
AD,42.546245,1.601554,Andorra
AE,23.424076,53.847818,United Arab Emirates
AF,33.93911,67.709953,Afghanistan
";

    #[test]
    fn parses_aliased_headers_and_drops_extra_columns() {
        let table = parse_coordinates(ALIASED_CSV.as_bytes(), "test").unwrap();
        assert_eq!(table.len(), 3);
        let andorra = table.get("Andorra").unwrap();
        assert!((andorra.latitude - 42.546_245).abs() < f64::EPSILON);
        assert!((andorra.longitude - 1.601_554).abs() < f64::EPSILON);
        let names: Vec<&str> = table.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Andorra", "United Arab Emirates", "Afghanistan"]
        );
    }

    #[test]
    fn parses_canonical_headers() {
        let csv = "name,latitude,longitude\nAlpha,1.0,2.0\nBeta,3.0,4.0\n";
        let table = parse_coordinates(csv.as_bytes(), "test").unwrap();
        assert_eq!(table.len(), 2);
        assert!((table.get("Beta").unwrap().longitude - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let csv = "name,latitude,longitude\nAlpha,1.0,2.0\n";
        let table = parse_coordinates(csv.as_bytes(), "test").unwrap();
        assert!(table.get("Alpha").is_some());
        assert!(table.get("alpha").is_none());
    }

    #[test]
    fn rejects_missing_column() {
        let csv = "name,latitude\nAlpha,1.0\n";
        let err = parse_coordinates(csv.as_bytes(), "test").unwrap_err();
        assert!(matches!(
            err,
            CoordinateError::MissingColumn {
                column: "longitude",
                ..
            }
        ));
    }

    #[test]
    fn rejects_unparseable_latitude() {
        let csv = "name,latitude,longitude\nAlpha,north,2.0\n";
        let err = parse_coordinates(csv.as_bytes(), "test").unwrap_err();
        match err {
            CoordinateError::InvalidValue {
                line,
                column,
                value,
                ..
            } => {
                assert_eq!(line, 2);
                assert_eq!(column, "latitude");
                assert_eq!(value, "north");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn keeps_first_duplicate() {
        let csv = "name,latitude,longitude\nAlpha,1.0,2.0\nAlpha,9.0,9.0\n";
        let table = parse_coordinates(csv.as_bytes(), "test").unwrap();
        assert_eq!(table.len(), 1);
        assert!((table.get("Alpha").unwrap().latitude - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_coordinates(Path::new("/nonexistent/countries.csv")).unwrap_err();
        assert!(matches!(err, CoordinateError::NotFound { .. }));
    }

    #[test]
    fn builds_from_vec() {
        let table = CoordinateTable::from(vec![
            CountryCoordinate {
                name: "Alpha".to_owned(),
                latitude: 1.0,
                longitude: 2.0,
            },
            CountryCoordinate {
                name: "Alpha".to_owned(),
                latitude: 5.0,
                longitude: 6.0,
            },
        ]);
        assert_eq!(table.len(), 1);
        assert!(!table.is_empty());
    }
}
