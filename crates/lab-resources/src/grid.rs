//! Equally spaced item grids for plates, tip racks, and tube racks.
//!
//! Items are laid out column-major (all of column 1 top to bottom, then
//! column 2, ...), matching how multi-channel heads address labware. Row
//! letters run A.. from the back of the labware (highest y), columns 1..
//! from the left.

use lab_core::Coordinate;

/// Geometry of an equally spaced grid of items inside a container.
///
/// `dx`/`dy`/`dz` locate the bottom-left item corner of the grid inside the
/// container; `item_size_x`/`item_size_y` are the pitch between items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub num_items_x: usize,
    pub num_items_y: usize,
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    pub item_size_x: f64,
    pub item_size_y: f64,
}

impl GridSpec {
    /// Number of items in the grid.
    pub fn num_items(&self) -> usize {
        self.num_items_x * self.num_items_y
    }

    /// Location of the item at `(row, col)` relative to the container.
    ///
    /// Row 0 ("A") is the back row, so its y offset is the largest.
    pub fn location(&self, row: usize, col: usize) -> Coordinate {
        Coordinate::new(
            self.dx + col as f64 * self.item_size_x,
            self.dy + (self.num_items_y - row - 1) as f64 * self.item_size_y,
            self.dz,
        )
    }

    /// Iterate `(identifier, location)` pairs in column-major order.
    pub fn positions(&self) -> impl Iterator<Item = (String, Coordinate)> + '_ {
        (0..self.num_items_x).flat_map(move |col| {
            (0..self.num_items_y).map(move |row| (identifier(row, col), self.location(row, col)))
        })
    }

    /// Column-major linear index of `(row, col)`.
    pub fn index(&self, row: usize, col: usize) -> usize {
        col * self.num_items_y + row
    }
}

/// Build a well identifier like `"A1"` from zero-based row and column.
pub fn identifier(row: usize, col: usize) -> String {
    // Labware never exceeds 32 rows in practice, single letter suffices.
    let letter = (b'A' + row as u8) as char;
    format!("{}{}", letter, col + 1)
}

/// Parse `"A1"`-style identifiers into zero-based `(row, col)`.
pub fn parse_identifier(id: &str) -> Option<(usize, usize)> {
    let mut chars = id.chars();
    let letter = chars.next()?;
    if !letter.is_ascii_uppercase() {
        return None;
    }
    let row = (letter as u8 - b'A') as usize;
    let col: usize = chars.as_str().parse().ok()?;
    if col == 0 {
        return None;
    }
    Some((row, col - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_roundtrip() {
        assert_eq!(identifier(0, 0), "A1");
        assert_eq!(identifier(7, 11), "H12");
        assert_eq!(parse_identifier("A1"), Some((0, 0)));
        assert_eq!(parse_identifier("H12"), Some((7, 11)));
        assert_eq!(parse_identifier("a1"), None);
        assert_eq!(parse_identifier("A0"), None);
        assert_eq!(parse_identifier(""), None);
    }

    #[test]
    fn test_column_major_order() {
        let spec = GridSpec {
            num_items_x: 3,
            num_items_y: 2,
            dx: 0.0,
            dy: 0.0,
            dz: 0.0,
            item_size_x: 9.0,
            item_size_y: 9.0,
        };
        let ids: Vec<String> = spec.positions().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["A1", "B1", "A2", "B2", "A3", "B3"]);
        assert_eq!(spec.index(1, 2), 5);
    }

    #[test]
    fn test_row_a_is_back_row() {
        let spec = GridSpec {
            num_items_x: 1,
            num_items_y: 8,
            dx: 7.2,
            dy: 5.3,
            dz: -50.5,
            item_size_x: 9.0,
            item_size_y: 9.0,
        };
        let a1 = spec.location(0, 0);
        let h1 = spec.location(7, 0);
        assert!(a1.y > h1.y);
        assert_eq!(h1.y, 5.3);
        assert_eq!(a1.z, -50.5);
    }
}
