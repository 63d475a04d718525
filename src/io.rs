//! Reading the initial live cells, and writing the final ones.
//!
//! Both files hold one `row,col` pair per line.

use crate::error::{Error, Result};
use crate::grid::Grid;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::{Path, PathBuf};

const INPUT_SUFFIX: &str = ".csv";
const OUTPUT_MARKER: &str = "_parallel.csv";

/// Lazily yields the live cells listed in a file.
pub struct CellReader<R> {
    path: PathBuf,
    lines: Lines<R>,
    line: usize,
}

impl<R: BufRead> CellReader<R> {
    pub fn new(path: impl Into<PathBuf>, reader: R) -> Self {
        Self {
            path: path.into(),
            lines: reader.lines(),
            line: 0,
        }
    }
}

impl<R: BufRead> Iterator for CellReader<R> {
    type Item = Result<(usize, usize)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(e) => return Some(Err(Error::io(&self.path, e))),
            };
            self.line += 1;

            match parse_cell(self.line, &text) {
                Ok(None) => continue,
                Ok(Some(cell)) => return Some(Ok(cell)),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Open a file of live cells for reading.
pub fn read_cells(path: &Path) -> Result<CellReader<BufReader<File>>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    Ok(CellReader::new(path, BufReader::new(file)))
}

/// Parse one `row,col` record. Blank lines yield `None`.
pub fn parse_cell(line: usize, text: &str) -> Result<Option<(usize, usize)>> {
    let text = text.trim();

    if text.is_empty() {
        return Ok(None);
    }
    let malformed = |message: String| Error::Parse { line, message };
    let mut fields = text.split(',').map(str::trim);

    let mut coordinate = |name: &str| -> Result<usize> {
        let field = fields
            .next()
            .ok_or_else(|| malformed(format!("missing {} in {:?}", name, text)))?;
        field
            .parse()
            .map_err(|e| malformed(format!("bad {} {:?}: {}", name, field, e)))
    };
    let row = coordinate("row")?;
    let col = coordinate("column")?;

    if fields.next().is_some() {
        return Err(malformed(format!("expected two fields in {:?}", text)));
    }
    Ok(Some((row, col)))
}

/// Where the result of running `generations` generations on `input` goes:
/// `life.csv` becomes `life.10_parallel.csv`.
pub fn output_path(input: &Path, generations: u64) -> PathBuf {
    let name = input.to_string_lossy();
    let stem = name.strip_suffix(INPUT_SUFFIX).unwrap_or(&*name);
    PathBuf::from(format!("{}.{}{}", stem, generations, OUTPUT_MARKER))
}

/// Write one `row,col` line per live cell, in row-major order.
pub fn write_cells_to<W: Write>(mut writer: W, grid: &Grid) -> std::io::Result<()> {
    for (row, col) in grid.alive_cells() {
        writeln!(writer, "{},{}", row, col)?;
    }
    writer.flush()
}

pub fn write_cells(path: &Path, grid: &Grid) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    write_cells_to(BufWriter::new(file), grid).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cell_works() {
        assert_eq!(parse_cell(1, "3,4").unwrap(), Some((3, 4)));
        assert_eq!(parse_cell(1, " 3 , 4 \r").unwrap(), Some((3, 4)));
        assert_eq!(parse_cell(1, "   ").unwrap(), None);
    }

    #[test]
    fn malformed_records_report_their_line() {
        for text in &["3", "a,4", "3,b", "-1,2", "1,2,3", "1.5,2"] {
            match parse_cell(7, text) {
                Err(Error::Parse { line, .. }) => assert_eq!(line, 7),
                other => panic!("{:?} parsed as {:?}", text, other),
            }
        }
    }

    #[test]
    fn reader_skips_blank_lines_and_counts_them() {
        let data = "0,1\n\n2,2\nx,1\n";
        let cells: Vec<_> = CellReader::new("mem", data.as_bytes()).collect();
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0].as_ref().unwrap(), &(0, 1));
        assert_eq!(cells[1].as_ref().unwrap(), &(2, 2));
        assert!(matches!(cells[2], Err(Error::Parse { line: 4, .. })));
    }

    #[test]
    fn output_path_strips_the_input_suffix() {
        assert_eq!(
            output_path(Path::new("data/glider.csv"), 100),
            PathBuf::from("data/glider.100_parallel.csv")
        );
        assert_eq!(
            output_path(Path::new("glider"), 3),
            PathBuf::from("glider.3_parallel.csv")
        );
    }

    #[test]
    fn written_cells_are_row_major_lines() {
        let grid = Grid::from_cells(2, 3, vec![Ok((1, 0)), Ok((0, 2))]).unwrap();
        let mut buffer = Vec::new();
        write_cells_to(&mut buffer, &grid).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "0,2\n1,0\n");
    }

    #[test]
    fn missing_input_is_an_io_error() {
        let result = read_cells(Path::new("/nonexistent/gridlife/input.csv"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
