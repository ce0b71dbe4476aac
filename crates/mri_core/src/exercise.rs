//! Threshold window count over sorted points. Unrelated to the MRI flow and
//! kept for regression: the recursive search runs, but its position never
//! reaches the final answer.

use thiserror::Error;

/// Frame budget of the original interpreter's recursion limit.
pub const MAX_DEPTH: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("points must not be empty")]
    Empty,
    #[error("search index {0} is outside the points")]
    IndexOutOfRange(isize),
    #[error("search did not converge within {MAX_DEPTH} levels")]
    RecursionLimit,
}

pub fn solve(threshold: i64, points: &[i64]) -> Result<usize, SearchError> {
    let (first, last) = match (points.first(), points.last()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => return Err(SearchError::Empty),
    };
    // Widened so an extreme threshold compares instead of overflowing.
    let key = i128::from(threshold) + i128::from(first);
    if key > i128::from(last) {
        return Ok(points.len());
    }
    search(points, 0, points.len() as isize - 1, key, 0)?;
    // The position found above is discarded; only the length survives.
    let ans = points.len();
    Ok((ans + 2) / 2)
}

fn search(
    points: &[i64],
    low: isize,
    high: isize,
    key: i128,
    depth: usize,
) -> Result<(), SearchError> {
    if depth >= MAX_DEPTH {
        return Err(SearchError::RecursionLimit);
    }
    let mid = (low + high).div_euclid(2);
    let value = i128::from(at(points, mid)?);
    if value == key {
        Ok(())
    } else if value >= key {
        search(points, low, mid - 1, key, depth + 1)
    } else {
        search(points, mid + 1, high, key, depth + 1)
    }
}

/// Indexing where negative positions count from the end.
fn at(points: &[i64], idx: isize) -> Result<i64, SearchError> {
    let len = points.len() as isize;
    let resolved = if idx < 0 { idx + len } else { idx };
    if resolved < 0 || resolved >= len {
        return Err(SearchError::IndexOutOfRange(idx));
    }
    Ok(points[resolved as usize])
}
