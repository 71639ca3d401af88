//! Two-dimensional keyboard navigation over a one-dimensional item list.
//!
//! Items fill rows left to right, `columns` per row; the last row may be
//! partial. Every function returns the target index, or `None` when the
//! move is a no-op.

/// Direction of a grid navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// One row up.
    Up,
    /// One row down.
    Down,
    /// One item back.
    Left,
    /// One item forward.
    Right,
}

/// Target of moving from `index` in `direction`.
///
/// Requires `index < len` and `columns > 0`.
pub fn step(direction: Direction, index: usize, len: usize, columns: usize, wrap: bool) -> Option<usize> {
    if len == 0 || columns == 0 || index >= len {
        return None;
    }
    match direction {
        Direction::Up => up(index, len, columns, wrap),
        Direction::Down => down(index, len, columns, wrap),
        Direction::Left => left(index, len, wrap),
        Direction::Right => right(index, len, wrap),
    }
}

fn up(index: usize, len: usize, columns: usize, wrap: bool) -> Option<usize> {
    if index >= columns {
        return Some(index - columns);
    }
    if !wrap {
        return None;
    }
    // Same column in the last row, clamped when the last row is partial.
    let last_row_start = (len - 1) / columns * columns;
    let target = (last_row_start + index % columns).min(len - 1);
    (target != index).then_some(target)
}

fn down(index: usize, len: usize, columns: usize, wrap: bool) -> Option<usize> {
    if index + columns < len {
        return Some(index + columns);
    }
    if !wrap {
        return None;
    }
    let target = index % columns;
    (target != index).then_some(target)
}

fn left(index: usize, len: usize, wrap: bool) -> Option<usize> {
    if index > 0 {
        Some(index - 1)
    } else if wrap && len > 1 {
        Some(len - 1)
    } else {
        None
    }
}

fn right(index: usize, len: usize, wrap: bool) -> Option<usize> {
    if index + 1 < len {
        Some(index + 1)
    } else if wrap && len > 1 {
        Some(0)
    } else {
        None
    }
}

/// Zero-based row of `index`.
pub fn row_of(index: usize, columns: usize) -> usize {
    index / columns.max(1)
}

/// Zero-based column of `index`.
pub fn column_of(index: usize, columns: usize) -> usize {
    index % columns.max(1)
}

/// Number of rows needed for `len` items.
pub fn row_count(len: usize, columns: usize) -> usize {
    len.div_ceil(columns.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_wraps_to_first() {
        assert_eq!(step(Direction::Right, 5, 6, 3, true), Some(0));
        assert_eq!(step(Direction::Right, 5, 6, 3, false), None);
    }

    #[test]
    fn left_wraps_to_last() {
        assert_eq!(step(Direction::Left, 0, 6, 3, true), Some(5));
        assert_eq!(step(Direction::Left, 0, 6, 3, false), None);
    }

    #[test]
    fn up_wraps_to_same_column_in_last_row() {
        // 3 columns, 8 items: rows [0 1 2] [3 4 5] [6 7]
        assert_eq!(step(Direction::Up, 1, 8, 3, true), Some(7));
        // Column 2 has no item in the last row: clamp to the last item.
        assert_eq!(step(Direction::Up, 2, 8, 3, true), Some(7));
        assert_eq!(step(Direction::Up, 0, 8, 3, true), Some(6));
        assert_eq!(step(Direction::Up, 1, 8, 3, false), None);
    }

    #[test]
    fn down_wraps_to_same_column_in_first_row() {
        assert_eq!(step(Direction::Down, 7, 8, 3, true), Some(1));
        assert_eq!(step(Direction::Down, 5, 8, 3, true), Some(2));
        assert_eq!(step(Direction::Down, 5, 8, 3, false), None);
    }

    #[test]
    fn vertical_moves_inside_the_grid() {
        assert_eq!(step(Direction::Down, 1, 8, 3, false), Some(4));
        assert_eq!(step(Direction::Up, 4, 8, 3, false), Some(1));
    }

    #[test]
    fn single_item_never_moves() {
        for direction in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            assert_eq!(step(direction, 0, 1, 3, true), None);
        }
    }

    #[test]
    fn row_and_column_helpers() {
        assert_eq!(row_of(7, 3), 2);
        assert_eq!(column_of(7, 3), 1);
        assert_eq!(row_count(7, 3), 3);
        assert_eq!(row_count(0, 3), 0);
    }
}
