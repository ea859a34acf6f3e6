//! Rectangular cell ranges.

/// A rectangle of cells, both corners inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub from_row: usize,
    pub from_cell: usize,
    pub to_row: usize,
    pub to_cell: usize,
}

impl CellRange {
    /// Creates a range, ordering the corners.
    pub fn new(from_row: usize, from_cell: usize, to_row: usize, to_cell: usize) -> Self {
        Self {
            from_row: from_row.min(to_row),
            from_cell: from_cell.min(to_cell),
            to_row: from_row.max(to_row),
            to_cell: from_cell.max(to_cell),
        }
    }

    /// Whole rows `from_row..=to_row` across `columns` columns.
    pub fn rows(from_row: usize, to_row: usize, columns: usize) -> Self {
        Self::new(from_row, 0, to_row, columns.saturating_sub(1))
    }

    pub fn is_single_row(&self) -> bool {
        self.from_row == self.to_row
    }

    pub fn is_single_cell(&self) -> bool {
        self.is_single_row() && self.from_cell == self.to_cell
    }

    pub fn contains(&self, row: usize, cell: usize) -> bool {
        row >= self.from_row && row <= self.to_row && cell >= self.from_cell && cell <= self.to_cell
    }

    pub fn row_count(&self) -> usize {
        self.to_row - self.from_row + 1
    }
}

impl std::fmt::Display for CellRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_single_cell() {
            write!(f, "({}:{})", self.from_row, self.from_cell)
        } else {
            write!(
                f,
                "({}:{} - {}:{})",
                self.from_row, self.from_cell, self.to_row, self.to_cell
            )
        }
    }
}

/// Sorted, deduplicated rows as coalesced whole-row ranges.
pub fn rows_to_ranges(rows: &[usize], columns: usize) -> Vec<CellRange> {
    let mut sorted = rows.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut ranges: Vec<CellRange> = Vec::new();
    for row in sorted {
        match ranges.last_mut() {
            Some(last) if last.to_row + 1 == row => last.to_row = row,
            _ => ranges.push(CellRange::rows(row, row, columns)),
        }
    }
    ranges
}

/// Every row covered by `ranges`, ascending and without duplicates.
pub fn ranges_to_rows(ranges: &[CellRange]) -> Vec<usize> {
    let mut rows: Vec<usize> = ranges
        .iter()
        .flat_map(|r| r.from_row..=r.to_row)
        .collect();
    rows.sort_unstable();
    rows.dedup();
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_orders_corners() {
        let range = CellRange::new(5, 3, 1, 0);
        assert_eq!((range.from_row, range.to_row), (1, 5));
        assert_eq!((range.from_cell, range.to_cell), (0, 3));
        assert!(range.contains(3, 2));
        assert!(!range.contains(6, 0));
    }

    #[test]
    fn test_rows_to_ranges_coalesces() {
        let ranges = rows_to_ranges(&[5, 1, 2, 3, 7, 2], 4);
        assert_eq!(
            ranges,
            vec![
                CellRange::rows(1, 3, 4),
                CellRange::rows(5, 5, 4),
                CellRange::rows(7, 7, 4),
            ]
        );
        assert!(ranges.iter().all(|r| r.from_cell == 0 && r.to_cell == 3));
    }

    #[test]
    fn test_ranges_to_rows() {
        let ranges = vec![CellRange::rows(4, 5, 2), CellRange::rows(0, 1, 2)];
        assert_eq!(ranges_to_rows(&ranges), vec![0, 1, 4, 5]);
    }

    #[test]
    fn test_display() {
        assert_eq!(CellRange::new(1, 2, 1, 2).to_string(), "(1:2)");
        assert_eq!(CellRange::rows(1, 2, 3).to_string(), "(1:0 - 2:2)");
    }
}
