//! Streaming catalog parser.
//!
//! Turns a delimited byte stream into a lazy sequence of [`RawRow`]s:
//!
//! - the header is validated once against the required column set (order free)
//! - rows with the wrong field count are skipped and counted, never fatal
//! - stream failures (truncated gzip, dropped connection) abort the run
//!
//! No astrophysical interpretation happens here; see `normalize`.

use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::io::source::CatalogStream;

/// Column names understood by the normalizer.
pub mod columns {
    pub const ID: &str = "id";
    pub const PROPER: &str = "proper";
    pub const HIP: &str = "hip";
    pub const HD: &str = "hd";
    pub const HR: &str = "hr";
    pub const GLIESE: &str = "gl";
    pub const BAYER_FLAMSTEED: &str = "bf";
    /// Distance in parsecs (HYG convention, `100000` = unknown).
    pub const DIST_PC: &str = "dist";
    /// Distance in light-years.
    pub const DIST_LY: &str = "dist_ly";
    /// Parallax in arcseconds.
    pub const PARALLAX: &str = "parallax";
    pub const MAG: &str = "mag";
    pub const ABSMAG: &str = "absmag";
    pub const SPECT: &str = "spect";
    pub const LUM: &str = "lum";
    pub const MASS: &str = "mass";
    pub const TEMP: &str = "temp";
    /// B-V colour index.
    pub const COLOR_INDEX: &str = "ci";

    pub const NAMED_BY_ANCIENTS: &str = "named_by_ancients";
    pub const ACTIVE_MISSION: &str = "active_mission";
    pub const PLANNED_MISSION: &str = "planned_mission";
    pub const WIKI_PAGEVIEWS: &str = "wiki_pageviews";
    pub const WIKIDATA_SITELINKS: &str = "wikidata_sitelinks";
    pub const HABITABLE: &str = "habitable";
    pub const SOLAR_SYSTEM: &str = "solar_system";
}

/// Columns that must all be present in the header.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    columns::PROPER,
    columns::HIP,
    columns::HD,
    columns::MAG,
    columns::ABSMAG,
    columns::SPECT,
    columns::LUM,
    columns::MASS,
];

/// At least one of these must be present.
pub const DISTANCE_COLUMNS: [&str; 3] = [columns::DIST_PC, columns::DIST_LY, columns::PARALLAX];

/// Malformed rows beyond this count are logged at debug level only.
pub const MALFORMED_WARN_LIMIT: u64 = 20;

type HeaderIndex = Arc<HashMap<String, usize>>;

/// One catalog row, addressed by column name.
///
/// Values are trimmed; empty cells read as absent.
#[derive(Debug, Clone)]
pub struct RawRow {
    header: HeaderIndex,
    record: StringRecord,
    line: u64,
}

impl RawRow {
    /// Build a row from `(column, value)` pairs. Mostly useful for tests and for
    /// re-serializing normalized objects.
    pub fn from_pairs<K: AsRef<str>, V: AsRef<str>>(pairs: &[(K, V)]) -> Self {
        let mut header = HashMap::with_capacity(pairs.len());
        let mut record = StringRecord::with_capacity(64, pairs.len());
        for (idx, (k, v)) in pairs.iter().enumerate() {
            header.insert(normalize_header_name(k.as_ref()), idx);
            record.push_field(v.as_ref());
        }
        Self {
            header: Arc::new(header),
            record,
            line: 0,
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        let idx = self.header.get(column)?;
        self.record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.header.contains_key(column)
    }

    /// 1-based line number in the source (0 for synthesized rows).
    pub fn line(&self) -> u64 {
        self.line
    }

    /// `(column, value)` pairs in header order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut cols: Vec<(&String, &usize)> = self.header.iter().collect();
        cols.sort_by_key(|(_, idx)| **idx);
        cols.into_iter()
            .map(|(name, idx)| (name.clone(), self.record.get(*idx).unwrap_or("").to_string()))
            .collect()
    }
}

/// Lazy iterator of catalog rows.
///
/// Yields `Err` only for fatal stream failures; after that it is exhausted.
pub struct CatalogReader<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
    header: HeaderIndex,
    width: usize,
    compressed: bool,
    remote: Option<String>,
    row_limit: Option<u64>,
    rows_read: u64,
    malformed: u64,
    done: bool,
}

impl<R: Read> std::fmt::Debug for CatalogReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogReader")
            .field("header", &self.header)
            .field("width", &self.width)
            .field("compressed", &self.compressed)
            .field("remote", &self.remote)
            .field("row_limit", &self.row_limit)
            .field("rows_read", &self.rows_read)
            .field("malformed", &self.malformed)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<R: Read> CatalogReader<R> {
    /// Read and validate the header of a local stream.
    ///
    /// `compressed` only affects how stream errors are classified.
    pub fn new(reader: R, compressed: bool) -> Result<Self, EngineError> {
        Self::with_remote(reader, compressed, None)
    }

    /// Like [`CatalogReader::new`], for a stream downloaded from `remote`.
    pub fn with_remote(reader: R, compressed: bool, remote: Option<String>) -> Result<Self, EngineError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| classify_csv_error(e, compressed, remote.as_deref()))?
            .clone();
        let header = build_header_map(&headers);
        validate_header(&header)?;
        debug!(columns = headers.len(), "catalog header validated");

        Ok(Self {
            records: reader.into_records(),
            header: Arc::new(header),
            width: headers.len(),
            compressed,
            remote,
            row_limit: None,
            rows_read: 0,
            malformed: 0,
            done: false,
        })
    }

    /// Stop after `limit` data rows, malformed ones included.
    pub fn with_row_limit(mut self, limit: Option<u64>) -> Self {
        self.row_limit = limit;
        self
    }

    /// Data rows consumed so far, including malformed ones.
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Rows skipped for field-count or encoding problems.
    pub fn malformed_rows(&self) -> u64 {
        self.malformed
    }

    fn note_malformed(&mut self, err: EngineError) {
        self.malformed += 1;
        if self.malformed <= MALFORMED_WARN_LIMIT {
            warn!("{err}");
        } else {
            debug!("{err}");
        }
    }
}

impl<R: Read> Iterator for CatalogReader<R> {
    type Item = Result<RawRow, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if self.row_limit.is_some_and(|limit| self.rows_read >= limit) {
                self.done = true;
                return None;
            }
            let Some(result) = self.records.next() else {
                self.done = true;
                return None;
            };
            match result {
                Ok(record) => {
                    self.rows_read += 1;
                    let line = record.position().map(|p| p.line()).unwrap_or(0);
                    if record.len() != self.width {
                        self.note_malformed(EngineError::RowMalformed {
                            line,
                            reason: format!("expected {} fields, found {}", self.width, record.len()),
                        });
                        continue;
                    }
                    return Some(Ok(RawRow {
                        header: Arc::clone(&self.header),
                        record,
                        line,
                    }));
                }
                Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                    self.done = true;
                    return Some(Err(classify_csv_error(e, self.compressed, self.remote.as_deref())));
                }
                Err(e) => {
                    // Invalid UTF-8 and similar record-level problems.
                    self.rows_read += 1;
                    let line = e.position().map(|p| p.line()).unwrap_or(0);
                    self.note_malformed(EngineError::RowMalformed {
                        line,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }
}

impl CatalogReader<Box<dyn Read + Send>> {
    /// Wrap an opened source, carrying over how its failures are classified.
    pub fn from_stream(stream: CatalogStream) -> Result<Self, EngineError> {
        Self::with_remote(stream.reader, stream.compressed, stream.remote)
    }
}

/// Stream errors from a download are transport failures unless the bytes
/// arrived and only the gzip payload is broken.
fn classify_csv_error(err: csv::Error, compressed: bool, remote: Option<&str>) -> EngineError {
    let from_transport = match err.kind() {
        csv::ErrorKind::Io(io) => io.get_ref().is_some_and(|inner| inner.is::<reqwest::Error>()),
        _ => return EngineError::Csv(err),
    };
    let io = std::io::Error::from(err);
    match remote {
        Some(url) if from_transport || !compressed => EngineError::DownloadFailure {
            url: url.to_string(),
            source: Box::new(io),
        },
        _ if compressed => EngineError::DecompressionFailure(io),
        _ => EngineError::io("<catalog stream>", io),
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn validate_header(header: &HashMap<String, usize>) -> Result<(), EngineError> {
    let mut missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !header.contains_key(**c))
        .map(|c| c.to_string())
        .collect();
    if !DISTANCE_COLUMNS.iter().any(|c| header.contains_key(*c)) {
        missing.push(DISTANCE_COLUMNS.join("|"));
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(EngineError::SchemaMismatch { missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "id,proper,hip,hd,dist,mag,absmag,spect,lum,mass";

    fn reader(text: &str) -> CatalogReader<&[u8]> {
        CatalogReader::new(text.as_bytes(), false).unwrap()
    }

    #[test]
    fn yields_rows_keyed_by_header() {
        let text = format!("{HEADER}\n1,Sirius,32349,48915,2.64,-1.46,1.43,A1V,22.8,2.06\n");
        let mut r = reader(&text);
        let row = r.next().unwrap().unwrap();
        assert_eq!(row.get("proper"), Some("Sirius"));
        assert_eq!(row.get("spect"), Some("A1V"));
        assert_eq!(row.line(), 2);
        assert!(r.next().is_none());
        assert_eq!(r.rows_read(), 1);
        assert_eq!(r.malformed_rows(), 0);
    }

    #[test]
    fn column_order_is_not_assumed() {
        let text = "mass,lum,spect,absmag,mag,parallax,hd,hip,proper\n\
                    2.0,22,A1V,1.4,-1.4,0.379,48915,32349,Sirius\n";
        let row = reader(text).next().unwrap().unwrap();
        assert_eq!(row.get("parallax"), Some("0.379"));
        assert_eq!(row.get("hip"), Some("32349"));
    }

    #[test]
    fn header_names_are_case_and_bom_insensitive() {
        let text = "\u{feff}PROPER,Hip,HD,Dist,MAG,AbsMag,Spect,Lum,Mass\n\
                    Vega,91262,172167,7.68,0.03,0.6,A0V,40,2.1\n";
        let row = reader(text).next().unwrap().unwrap();
        assert_eq!(row.get("proper"), Some("Vega"));
    }

    #[test]
    fn missing_columns_are_reported_together() {
        let err = CatalogReader::new("proper,hip,mag\n".as_bytes(), false).err().unwrap();
        match err {
            EngineError::SchemaMismatch { missing } => {
                assert!(missing.contains(&"hd".to_string()));
                assert!(missing.contains(&"mass".to_string()));
                assert!(missing.contains(&"dist|dist_ly|parallax".to_string()));
                assert!(!missing.contains(&"proper".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn wrong_field_count_rows_are_skipped_and_counted() {
        let text = format!(
            "{HEADER}\n\
             1,Sirius,32349,48915,2.64,-1.46,1.43,A1V,22.8,2.06\n\
             2,broken,row\n\
             3,Vega,91262,172167,7.68,0.03,0.6,A0V,40,2.1\n"
        );
        let mut r = reader(&text);
        let names: Vec<String> = r
            .by_ref()
            .map(|row| row.unwrap().get("proper").unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Sirius", "Vega"]);
        assert_eq!(r.rows_read(), 3);
        assert_eq!(r.malformed_rows(), 1);
    }

    #[test]
    fn empty_cells_read_as_absent() {
        let text = format!("{HEADER}\n7,,,,  ,,,,,\n");
        let row = reader(&text).next().unwrap().unwrap();
        assert_eq!(row.get("proper"), None);
        assert_eq!(row.get("dist"), None);
        assert_eq!(row.get("id"), Some("7"));
        assert!(row.has_column("mass"));
        assert!(!row.has_column("temp"));
    }

    #[test]
    fn truncated_gzip_is_a_decompression_failure() {
        use flate2::Compression;
        use flate2::write::GzEncoder;
        use std::io::Write;

        let mut body = String::from(HEADER);
        body.push('\n');
        for i in 0..2000 {
            body.push_str(&format!("{i},,{i},,10,5,5,G2V,1,1\n"));
        }
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(body.as_bytes()).unwrap();
        let mut gz = enc.finish().unwrap();
        gz.truncate(gz.len() / 2);

        let raw = Box::new(std::io::Cursor::new(gz));
        let stream = crate::io::source::wrap_stream(raw, "t.gz".to_string(), None).unwrap();
        let r = CatalogReader::from_stream(stream).unwrap();
        let results: Vec<_> = r.collect();
        let last = results.last().unwrap();
        assert!(matches!(last, Err(EngineError::DecompressionFailure(_))));
        assert!(results[..results.len() - 1].iter().all(|r| r.is_ok()));
    }

    #[test]
    fn row_limit_counts_malformed_rows() {
        let text = format!(
            "{HEADER}\n\
             1,Sirius,32349,48915,2.64,-1.46,1.43,A1V,22.8,2.06\n\
             2,broken,row\n\
             3,Vega,91262,172167,7.68,0.03,0.6,A0V,40,2.1\n\
             4,Deneb,102098,197345,677,1.25,-8.38,A2Ia,196000,19\n"
        );
        let mut r = reader(&text).with_row_limit(Some(3));
        let names: Vec<String> = r
            .by_ref()
            .map(|row| row.unwrap().get("proper").unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Sirius", "Vega"]);
        assert_eq!(r.rows_read(), 3);
        assert_eq!(r.malformed_rows(), 1);
    }

    #[test]
    fn plain_remote_read_errors_are_download_failures() {
        let err = csv::Error::from(std::io::Error::other("connection reset"));
        let classified = classify_csv_error(err, false, Some("http://example.org/hyg.csv"));
        assert!(matches!(classified, EngineError::DownloadFailure { .. }), "{classified:?}");

        let err = csv::Error::from(std::io::Error::other("bad deflate block"));
        let classified = classify_csv_error(err, true, Some("http://example.org/hyg.csv.gz"));
        assert!(matches!(classified, EngineError::DecompressionFailure(_)), "{classified:?}");

        let err = csv::Error::from(std::io::Error::other("disk gone"));
        assert!(matches!(classify_csv_error(err, false, None), EngineError::Io { .. }));
    }

    #[test]
    fn from_pairs_round_trips_through_to_pairs() {
        let row = RawRow::from_pairs(&[("proper", "Sol"), ("hip", "")]);
        assert_eq!(row.get("proper"), Some("Sol"));
        assert_eq!(row.get("hip"), None);
        assert_eq!(
            row.to_pairs(),
            vec![
                ("proper".to_string(), "Sol".to_string()),
                ("hip".to_string(), String::new())
            ]
        );
    }
}
