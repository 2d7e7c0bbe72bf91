//! CSV sidecar inlining.
//!
//! The CSV parsing library itself is a black-box collaborator; this module
//! is the thin adapter between `csv::Reader` and the
//! typed first-success column resolution (int64, then float64, then string)
//! the builder needs.

use std::path::Path;

use crate::Error;

/// Row/column shape of a CSV file, as read by the sizing pre-pass. The
/// builder re-reads the same file and must see the same shape — a CSV file
/// that grew between the two passes is a fatal error, not silently handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvShape {
    pub columns: Vec<String>,
    pub rows: usize,
}

pub fn probe(path: &Path) -> Result<CsvShape, Error> {
    let mut reader = csv::Reader::from_path(path)?;
    let columns: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
    let rows = reader.records().count();
    Ok(CsvShape { columns, rows })
}

/// One CSV column's resolved cell values. `None` represents an empty cell
/// (emitted as SYMBOL `"Missing"` regardless of the column's resolved type).
#[derive(Debug, Clone)]
pub enum Column {
    Long(Vec<Option<i64>>),
    Double(Vec<Option<f64>>),
    Str(Vec<Option<String>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Long(v) => v.len(),
            Column::Double(v) => v.len(),
            Column::Str(v) => v.len(),
        }
    }
}

/// Read every column of `path` and resolve each independently via the
/// int64 -> float64 -> string attempt chain.
pub fn load_columns(path: &Path) -> Result<Vec<(String, Column)>, Error> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record.map_err(|e| Error::MalformedInput(e.to_string()))?;
        for (i, cell) in record.iter().enumerate() {
            if let Some(col) = raw.get_mut(i) {
                col.push(cell.to_string());
            }
        }
    }
    let mut out = Vec::with_capacity(headers.len());
    for (name, cells) in headers.into_iter().zip(raw.into_iter()) {
        let resolved = resolve_column(&cells)
            .ok_or_else(|| Error::MalformedInput(format!("failed to handle csv column: '{name}'")))?;
        out.push((name, resolved));
    }
    Ok(out)
}

fn resolve_column(cells: &[String]) -> Option<Column> {
    if let Some(v) = try_column(cells, |s| s.parse::<i64>().ok()) {
        return Some(Column::Long(v));
    }
    if let Some(v) = try_column(cells, |s| s.parse::<f64>().ok()) {
        return Some(Column::Double(v));
    }
    try_column(cells, |s| Some(s.to_string())).map(Column::Str)
}

fn try_column<T>(cells: &[String], parse: impl Fn(&str) -> Option<T>) -> Option<Vec<Option<T>>> {
    let mut out = Vec::with_capacity(cells.len());
    for cell in cells {
        if cell.is_empty() {
            out.push(None);
            continue;
        }
        match parse(cell) {
            Some(v) => out.push(Some(v)),
            None => return None,
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "{contents}").unwrap();
        f
    }

    #[test]
    fn resolves_int_and_string_columns() {
        let f = write_csv("id,name\n1,alice\n2,bob\n");
        let shape = probe(f.path()).unwrap();
        assert_eq!(shape.columns, vec!["id", "name"]);
        assert_eq!(shape.rows, 2);

        let cols = load_columns(f.path()).unwrap();
        assert_eq!(cols.len(), 2);
        match &cols[0].1 {
            Column::Long(v) => assert_eq!(v, &vec![Some(1), Some(2)]),
            other => panic!("expected Long column, got {other:?}"),
        }
        match &cols[1].1 {
            Column::Str(v) => {
                assert_eq!(v, &vec![Some("alice".to_string()), Some("bob".to_string())])
            }
            other => panic!("expected Str column, got {other:?}"),
        }
    }

    #[test]
    fn empty_cell_becomes_missing() {
        let f = write_csv("id\n1\n\n3\n");
        let cols = load_columns(f.path()).unwrap();
        match &cols[0].1 {
            Column::Long(v) => assert_eq!(v, &vec![Some(1), None, Some(3)]),
            other => panic!("expected Long column, got {other:?}"),
        }
    }

    #[test]
    fn falls_back_to_float_then_string() {
        let f = write_csv("x\n1.5\n2.25\n");
        let cols = load_columns(f.path()).unwrap();
        match &cols[0].1 {
            Column::Double(v) => assert_eq!(v, &vec![Some(1.5), Some(2.25)]),
            other => panic!("expected Double column, got {other:?}"),
        }
    }
}
