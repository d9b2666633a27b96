use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::grid::{Accessor, CellValue, ColumnDef, ColumnKind, Grid, NumberFormat, Row};

/// Detected file format
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    /// TOML grid definition: columns plus rows or a data file
    Grid,
    /// Bare CSV with a header row; column kinds are inferred
    Csv,
    Tsv,
}

impl FileFormat {
    fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "toml" => Some(FileFormat::Grid),
            "csv" => Some(FileFormat::Csv),
            "tsv" => Some(FileFormat::Tsv),
            _ => None,
        }
    }

    fn delimiter(&self) -> u8 {
        match self {
            FileFormat::Tsv => b'\t',
            _ => b',',
        }
    }
}

#[derive(Debug)]
pub enum LoadError {
    Io { path: PathBuf, source: io::Error },
    Toml { path: PathBuf, source: toml::de::Error },
    Csv { path: PathBuf, source: csv::Error },
    NoColumns(PathBuf),
    DuplicateKey(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            LoadError::Toml { path, source } => {
                write!(f, "Invalid grid file {}: {}", path.display(), source)
            }
            LoadError::Csv { path, source } => {
                write!(f, "Invalid data file {}: {}", path.display(), source)
            }
            LoadError::NoColumns(path) => write!(f, "{} defines no columns", path.display()),
            LoadError::DuplicateKey(key) => write!(f, "Column key '{}' is used twice", key),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Toml { source, .. } => Some(source),
            LoadError::Csv { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<LoadError> for io::Error {
    fn from(e: LoadError) -> io::Error {
        let kind = match &e {
            LoadError::Io { source, .. } => source.kind(),
            _ => io::ErrorKind::InvalidData,
        };
        io::Error::new(kind, e.to_string())
    }
}

/// Result of loading a file, including any warnings
pub struct LoadResult {
    pub grid: Grid,
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GridFile {
    columns: Vec<ColumnEntry>,
    #[serde(default)]
    rows: Vec<Row>,
    /// CSV file with a header row, relative to the grid file
    data: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct ColumnEntry {
    key: String,
    header: Option<String>,
    #[serde(rename = "type")]
    kind: Option<ColumnKind>,
    format: Option<NumberFormat>,
    trigger_text: Option<String>,
    /// `{key}` template computed from the rest of the row
    derive: Option<String>,
}

pub struct FileIO {
    pub file_path: Option<PathBuf>,
    format: Option<FileFormat>,
    default_trigger: Option<String>,
}

impl FileIO {
    pub fn new(file_path: Option<PathBuf>) -> Self {
        let format = file_path.as_deref().and_then(FileFormat::from_extension);
        Self { file_path, format, default_trigger: None }
    }

    /// Trigger label for popper columns that don't name one
    pub fn with_default_trigger(mut self, text: impl Into<String>) -> Self {
        self.default_trigger = Some(text.into());
        self
    }

    pub fn file_name(&self) -> String {
        self.file_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }

    /// Load the grid, returning warnings about anything that was adjusted
    pub fn load_grid(&self) -> Result<LoadResult, LoadError> {
        let Some(path) = self.file_path.as_ref() else {
            return Ok(LoadResult { grid: scratch_grid(), warnings: Vec::new() });
        };

        let result = match self.format {
            Some(FileFormat::Grid) => self.read_grid_file(path),
            Some(format @ (FileFormat::Csv | FileFormat::Tsv)) => read_bare_csv(path, format.delimiter()),
            // unknown extensions are assumed to be CSV
            None => read_bare_csv(path, b','),
        }?;

        info!(
            file = %path.display(),
            rows = result.grid.row_count(),
            cols = result.grid.col_count(),
            warnings = result.warnings.len(),
            "grid loaded"
        );
        for w in &result.warnings {
            warn!(file = %path.display(), "{}", w);
        }
        Ok(result)
    }

    fn read_grid_file(&self, path: &Path) -> Result<LoadResult, LoadError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
        let file: GridFile = toml::from_str(&content)
            .map_err(|source| LoadError::Toml { path: path.to_path_buf(), source })?;

        if file.columns.is_empty() {
            return Err(LoadError::NoColumns(path.to_path_buf()));
        }
        let columns = file
            .columns
            .into_iter()
            .map(|entry| self.column_from_entry(entry))
            .collect::<Vec<_>>();
        check_unique_keys(&columns)?;

        let mut warnings = Vec::new();
        let mut rows = file.rows;

        if let Some(data) = file.data {
            let data_path = match path.parent() {
                Some(dir) => dir.join(&data),
                None => data,
            };
            let (headers, records) = read_records(&data_path, b',')?;
            let missing: Vec<&str> = columns
                .iter()
                .filter(|c| c.accessor.is_none() && !headers.contains(&c.key))
                .map(|c| c.key.as_str())
                .collect();
            if !missing.is_empty() {
                warnings.push(format!("Data file has no column for: {}", missing.join(", ")));
            }
            rows.extend(records.into_iter().map(|r| row_from_record(&headers, r)));
        }

        // store every value the way its column kind expects
        for row in rows.iter_mut() {
            for column in columns.iter().filter(|c| c.accessor.is_none()) {
                if let Some(value) = row.get_mut(&column.key) {
                    *value = value.coerce(column.kind);
                }
            }
        }

        let known: HashSet<&str> = columns.iter().map(|c| c.key.as_str()).collect();
        let mut extra: Vec<&str> = rows
            .iter()
            .flat_map(|r| r.keys())
            .map(|k| k.as_str())
            .filter(|k| !known.contains(k))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        if !extra.is_empty() {
            extra.sort();
            warnings.push(format!("Keys without a column are kept but hidden: {}", extra.join(", ")));
        }

        if rows.is_empty() {
            warnings.push("Grid has no rows".to_string());
        }

        Ok(LoadResult { grid: Grid::new(columns, rows), warnings })
    }

    fn column_from_entry(&self, entry: ColumnEntry) -> ColumnDef {
        let kind = entry.kind.unwrap_or(ColumnKind::Text);
        let header = entry.header.unwrap_or_else(|| entry.key.clone());
        let mut column = ColumnDef::new(entry.key, header, kind);

        if let Some(format) = entry.format {
            column = column.with_format(format);
        }
        match entry.trigger_text.or_else(|| self.default_trigger.clone()) {
            Some(text) if kind == ColumnKind::Popper => column = column.with_trigger(text),
            _ => {}
        }
        if let Some(template) = entry.derive {
            column = column.with_accessor(Accessor::Template(template));
        }
        column
    }
}

/// One empty text cell
fn scratch_grid() -> Grid {
    let column = ColumnDef::new("value", "Value", ColumnKind::Text);
    let row = Row::from([("value".to_string(), CellValue::empty(ColumnKind::Text))]);
    Grid::new(vec![column], vec![row])
}

fn check_unique_keys(columns: &[ColumnDef]) -> Result<(), LoadError> {
    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column.key.as_str()) {
            return Err(LoadError::DuplicateKey(column.key.clone()));
        }
    }
    Ok(())
}

fn read_records(path: &Path, delim: u8) -> Result<(Vec<String>, Vec<Vec<String>>), LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
    let reader = BufReader::new(file);

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delim)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Fields)
        .from_reader(reader);

    let csv_err = |source| LoadError::Csv { path: path.to_path_buf(), source };
    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut records = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(csv_err)?;
        records.push(record.iter().map(|s| s.to_string()).collect());
    }
    Ok((headers, records))
}

/// Short records leave their trailing keys unset
fn row_from_record(headers: &[String], record: Vec<String>) -> Row {
    headers
        .iter()
        .cloned()
        .zip(record.into_iter().map(CellValue::Text))
        .collect()
}

/// Number if every non-empty value parses, boolean if every value is
/// true/false, otherwise text
fn infer_kind(records: &[Vec<String>], col: usize) -> ColumnKind {
    let values: Vec<&str> = records
        .iter()
        .filter_map(|r| r.get(col))
        .map(|s| s.as_str())
        .filter(|s| !s.is_empty())
        .collect();
    if values.is_empty() {
        return ColumnKind::Text;
    }
    if values.iter().all(|v| matches!(v.to_lowercase().as_str(), "true" | "false")) {
        ColumnKind::Boolean
    } else if values.iter().all(|v| v.parse::<f64>().map(|n| n.is_finite()).unwrap_or(false)) {
        ColumnKind::Number
    } else {
        ColumnKind::Text
    }
}

fn read_bare_csv(path: &Path, delim: u8) -> Result<LoadResult, LoadError> {
    if !path.exists() {
        return Ok(LoadResult {
            grid: scratch_grid(),
            warnings: vec![format!("New file: {}", path.display())],
        });
    }

    let (headers, records) = read_records(path, delim)?;
    if headers.is_empty() {
        return Err(LoadError::NoColumns(path.to_path_buf()));
    }
    let columns: Vec<ColumnDef> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| ColumnDef::new(h.clone(), h.clone(), infer_kind(&records, i)))
        .collect();
    check_unique_keys(&columns)?;

    let mut warnings = Vec::new();
    if records.iter().any(|r| r.len() != headers.len()) {
        warnings.push(format!("Ragged rows padded to {} columns", headers.len()));
    }

    let rows = records
        .into_iter()
        .map(|r| {
            let mut row = row_from_record(&headers, r);
            for column in &columns {
                let value = row
                    .get(&column.key)
                    .map(|v| v.coerce(column.kind))
                    .unwrap_or_else(|| CellValue::empty(column.kind));
                row.insert(column.key.clone(), value);
            }
            row
        })
        .collect();

    Ok(LoadResult { grid: Grid::new(columns, rows), warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::Coordinate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_extension(Path::new("grid.toml")), Some(FileFormat::Grid));
        assert_eq!(FileFormat::from_extension(Path::new("test.CSV")), Some(FileFormat::Csv));
        assert_eq!(FileFormat::from_extension(Path::new("test.tsv")), Some(FileFormat::Tsv));
        assert_eq!(FileFormat::from_extension(Path::new("test.txt")), None);
    }

    #[test]
    fn test_no_file_is_single_empty_cell() {
        let result = FileIO::new(None).load_grid().unwrap();
        assert_eq!(result.grid.row_count(), 1);
        assert_eq!(result.grid.col_count(), 1);
        assert_eq!(result.grid.display_value(Coordinate::ORIGIN), Some(CellValue::from("")));
    }

    #[test]
    fn test_grid_file_with_inline_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "people.toml",
            r#"
[[columns]]
key = "name"
header = "Name"

[[columns]]
key = "salary"
type = "number"
format = "currency"

[[columns]]
key = "bio"
type = "popper"

[[columns]]
key = "greeting"
derive = "Hi {name}"

[[rows]]
name = "Ada"
salary = 1200
bio = "Rust | 5"

[[rows]]
name = "Bob"
salary = "oops"
"#,
        );

        let result = FileIO::new(Some(path)).with_default_trigger("More").load_grid().unwrap();
        let grid = result.grid;
        assert_eq!(grid.col_count(), 4);
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.column(1).unwrap().header, "salary");
        assert_eq!(grid.column(2).unwrap().trigger_label(), "More");
        assert_eq!(grid.display_value(Coordinate::new(0, 1)), Some(CellValue::Number(1200.0)));
        assert_eq!(grid.display_value(Coordinate::new(1, 1)), Some(CellValue::Number(0.0)));
        assert_eq!(grid.display_value(Coordinate::new(1, 3)), Some(CellValue::from("Hi Bob")));
        assert!(!grid.column(3).unwrap().is_editable());
    }

    #[test]
    fn test_grid_file_with_csv_data() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "rows.csv", "name,active\nAda,yes\nBob,no\n");
        let path = write_file(
            dir.path(),
            "grid.toml",
            r#"
data = "rows.csv"

[[columns]]
key = "name"

[[columns]]
key = "active"
type = "boolean"

[[columns]]
key = "age"
type = "number"
"#,
        );

        let result = FileIO::new(Some(path)).load_grid().unwrap();
        assert_eq!(result.grid.row_count(), 2);
        assert_eq!(result.grid.display_value(Coordinate::new(0, 1)), Some(CellValue::Boolean(true)));
        assert_eq!(result.grid.display_value(Coordinate::new(1, 1)), Some(CellValue::Boolean(false)));
        assert_eq!(result.grid.display_value(Coordinate::new(1, 2)), Some(CellValue::Number(0.0)));
        assert!(result.warnings.iter().any(|w| w.contains("age")));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "dup.toml", "[[columns]]\nkey = \"a\"\n[[columns]]\nkey = \"a\"\n");
        let err = FileIO::new(Some(path)).load_grid().err().unwrap();
        assert!(matches!(err, LoadError::DuplicateKey(ref k) if k == "a"));
    }

    #[test]
    fn test_bad_toml_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "bad.toml", "columns = 3\n");
        let err = FileIO::new(Some(path)).load_grid().err().unwrap();
        assert!(matches!(err, LoadError::Toml { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_bare_csv_infers_kinds() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "name,age,active").unwrap();
        writeln!(file, "Ada,36,true").unwrap();
        writeln!(file, "Bob,41").unwrap();

        let result = FileIO::new(Some(file.path().to_path_buf())).load_grid().unwrap();
        let kinds: Vec<ColumnKind> = result.grid.columns().iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ColumnKind::Text, ColumnKind::Number, ColumnKind::Boolean]);
        assert_eq!(result.grid.display_value(Coordinate::new(1, 2)), Some(CellValue::Boolean(false)));
        assert!(result.warnings[0].contains("Ragged"));
    }

    #[test]
    fn test_missing_csv_is_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileIO::new(Some(dir.path().join("new.csv"))).load_grid().unwrap();
        assert_eq!(result.grid.col_count(), 1);
        assert!(result.warnings[0].starts_with("New file"));
    }
}
