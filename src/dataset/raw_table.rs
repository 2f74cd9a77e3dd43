use super::convert::Cell;

/// Column-major cells under their header names, as read from a source and
/// before any column is typed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RawTable {
    /// Header names, in source order. Not necessarily unique.
    pub headers: Vec<String>,
    /// One vector of cells per header, each `num_rows` long.
    pub columns: Vec<Vec<Cell>>,
    pub num_rows: usize,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        let columns = vec![Vec::new(); headers.len()];
        Self {
            headers,
            columns,
            num_rows: 0,
        }
    }

    /// Append one record. Short records are padded with `Cell::Empty`,
    /// cells beyond the header width are ignored.
    pub fn push_row(&mut self, row: impl IntoIterator<Item = Cell>) {
        let mut row = row.into_iter();
        for column in self.columns.iter_mut() {
            column.push(row.next().unwrap_or(Cell::Empty));
        }
        self.num_rows += 1;
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Remove a column by index, returning its header and cells.
    pub fn remove_column(&mut self, idx: usize) -> (String, Vec<Cell>) {
        (self.headers.remove(idx), self.columns.remove(idx))
    }
}
