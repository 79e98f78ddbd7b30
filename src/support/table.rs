//! Numeric delimited text tables.
//!
//! Lab instruments and the weather logger exchange plain text files where each
//! line is a row of numbers separated by commas and/or whitespace. Lines that
//! start with `#` are comments (the header written by [`write_rows`] is one).

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Errors that can occur while reading a numeric table.
#[derive(Debug, Error)]
pub enum TableError {
    /// The file could not be read.
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A cell could not be parsed as a number.
    #[error("line {line}: `{cell}` is not a number")]
    NotANumber { line: usize, cell: String },

    /// A row has a different number of columns than the first row.
    #[error("line {line}: expected {expected} columns, found {found}")]
    Ragged {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A requested column does not exist.
    #[error("column {index} requested from a table with {width} columns")]
    MissingColumn { index: usize, width: usize },
}

/// A rectangular table of `f64` values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    rows: Vec<Vec<f64>>,
    width: usize,
}

impl Table {
    /// Parses a table from text, ignoring the first `skip_rows` lines.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if a cell is not numeric or rows are ragged.
    ///
    /// # Example
    ///
    /// ```
    /// use physlab::support::table::Table;
    ///
    /// let table = Table::parse("# f,V\n1000, 0.5\n2000 0.7\n", 0).unwrap();
    /// assert_eq!(table.len(), 2);
    /// assert_eq!(table.column(1).unwrap(), vec![0.5, 0.7]);
    /// ```
    pub fn parse(text: &str, skip_rows: usize) -> Result<Self, TableError> {
        let mut table = Self::default();

        for (index, line) in text.lines().enumerate().skip(skip_rows) {
            let line_number = index + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let row = line
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|cell| !cell.is_empty())
                .map(|cell| {
                    cell.parse::<f64>().map_err(|_| TableError::NotANumber {
                        line: line_number,
                        cell: cell.to_owned(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            if table.rows.is_empty() {
                table.width = row.len();
            } else if row.len() != table.width {
                return Err(TableError::Ragged {
                    line: line_number,
                    expected: table.width,
                    found: row.len(),
                });
            }
            table.rows.push(row);
        }

        Ok(table)
    }

    /// Reads and parses a table from a file.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Io`] if the file cannot be read, or any error
    /// from [`Table::parse`].
    pub fn read(path: impl AsRef<Path>, skip_rows: usize) -> Result<Self, TableError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_owned(),
            source,
        })?;
        let table = Self::parse(&text, skip_rows)?;
        tracing::debug!(path = %path.display(), rows = table.len(), "read table");
        Ok(table)
    }

    /// Returns a copy of column `index`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::MissingColumn`] if the table is narrower.
    pub fn column(&self, index: usize) -> Result<Vec<f64>, TableError> {
        if index >= self.width {
            return Err(TableError::MissingColumn {
                index,
                width: self.width,
            });
        }
        Ok(self.rows.iter().map(|row| row[index]).collect())
    }

    /// Returns column `index`, or zeros if the table is narrower.
    #[must_use]
    pub fn column_or_zeros(&self, index: usize) -> Vec<f64> {
        self.column(index)
            .unwrap_or_else(|_| vec![0.0; self.rows.len()])
    }

    /// Returns the rows of the table.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }
}

/// Writes rows as comma separated values with a `# ` prefixed header line.
///
/// Every value is written with `precision` decimals.
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn write_rows<'a, W, I>(
    writer: &mut W,
    header: &str,
    rows: I,
    precision: usize,
) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a [f64]>,
{
    writeln!(writer, "# {header}")?;
    for row in rows {
        let line = row
            .iter()
            .map(|value| format!("{value:.precision$}"))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(writer, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_separators_and_exponents() {
        let text = "1.200000E+01, 2.022373E-08\n1.3e2\t1.95e-7\n";
        let table = Table::parse(text, 0).unwrap();

        assert_eq!(table.width(), 2);
        assert_eq!(table.column(0).unwrap(), vec![12.0, 130.0]);
        assert_eq!(table.column(1).unwrap(), vec![2.022373e-8, 1.95e-7]);
    }

    #[test]
    fn skips_rows_and_comments() {
        let text = "Temp,Humidity,Lux\n# comment\n\n70.0,40.0,100.0\n";
        let table = Table::parse(text, 1).unwrap();
        assert_eq!(table.rows(), &[vec![70.0, 40.0, 100.0]]);
    }

    #[test]
    fn reports_bad_cells_with_line_numbers() {
        let err = Table::parse("1,2\n3,x\n", 0).unwrap_err();
        assert!(matches!(err, TableError::NotANumber { line: 2, ref cell } if cell == "x"));

        let err = Table::parse("1,2\n3\n", 0).unwrap_err();
        assert!(matches!(
            err,
            TableError::Ragged {
                line: 2,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn missing_columns() {
        let table = Table::parse("1,2\n", 0).unwrap();
        assert!(matches!(
            table.column(3),
            Err(TableError::MissingColumn { index: 3, width: 2 })
        ));
        assert_eq!(table.column_or_zeros(3), vec![0.0]);
    }

    #[test]
    fn writes_fixed_precision() {
        let rows = [vec![70.04, 41.0, 120.55], vec![68.0, 39.96, 0.0]];
        let mut out = Vec::new();
        write_rows(&mut out, "Temp,Humidity,Lux", rows.iter().map(Vec::as_slice), 1).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "# Temp,Humidity,Lux\n70.0,41.0,120.5\n68.0,40.0,0.0\n");

        let table = Table::parse(&text, 0).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("amp.txt");
        fs::write(&path, "1000,0.1\n2000,0.2\n").unwrap();

        let table = Table::read(&path, 0).unwrap();
        assert_eq!(table.column(0).unwrap(), vec![1000.0, 2000.0]);

        let missing = Table::read(dir.path().join("nope.txt"), 0);
        assert!(matches!(missing, Err(TableError::Io { .. })));
    }
}
