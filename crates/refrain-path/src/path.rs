//! Alignment path types produced by path-family extraction.

use serde::{Deserialize, Serialize};

/// A single path coordinate.
///
/// `x` is the query-relative column (score-matrix column minus one, so the
/// timeline column is `query.start() + x`), `y` is the timeline row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathPoint {
    /// Query-relative column.
    pub x: usize,
    /// Timeline row.
    pub y: usize,
}

/// An alignment path stored in reverse traversal order.
///
/// The first point is the chronological end of the path, the last point its
/// chronological start. Use [`chronological`][Path::chronological] to walk it
/// forward in time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Path(Vec<PathPoint>);

impl Path {
    /// Create a path from points in end-to-start order.
    pub(crate) fn new(points: Vec<PathPoint>) -> Self {
        Self(points)
    }

    /// Return the points in end-to-start order.
    #[must_use]
    pub fn points(&self) -> &[PathPoint] {
        &self.0
    }

    /// Return the chronological end of the path (first stored point).
    #[must_use]
    pub fn end(&self) -> Option<PathPoint> {
        self.0.first().copied()
    }

    /// Return the chronological start of the path (last stored point).
    #[must_use]
    pub fn start(&self) -> Option<PathPoint> {
        self.0.last().copied()
    }

    /// Iterate points from the chronological start to the end.
    pub fn chronological(&self) -> impl DoubleEndedIterator<Item = PathPoint> + '_ {
        self.0.iter().rev().copied()
    }

    /// Return the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the path contains no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn push(&mut self, point: PathPoint) {
        self.0.push(point);
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathPoint;
    type IntoIter = std::slice::Iter<'a, PathPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Paths in discovery order: bottom of the score matrix to the top, i.e.
/// latest repetition first. Never contains an empty path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathFamily(Vec<Path>);

impl PathFamily {
    pub(crate) fn new(paths: Vec<Path>) -> Self {
        debug_assert!(paths.iter().all(|p| !p.is_empty()));
        Self(paths)
    }

    /// Return the paths in discovery order.
    #[must_use]
    pub fn paths(&self) -> &[Path] {
        &self.0
    }

    /// Return the number of paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if no path was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the paths.
    pub fn iter(&self) -> std::slice::Iter<'_, Path> {
        self.0.iter()
    }

    /// Keep only the paths at `indices`, in the given order.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds.
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> Self {
        Self(indices.iter().map(|&i| self.0[i].clone()).collect())
    }
}

impl<'a> IntoIterator for &'a PathFamily {
    type Item = &'a Path;
    type IntoIter = std::slice::Iter<'a, Path>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Path> for PathFamily {
    /// Collect paths, dropping empty ones.
    fn from_iter<I: IntoIterator<Item = Path>>(iter: I) -> Self {
        Self(iter.into_iter().filter(|p| !p.is_empty()).collect())
    }
}
