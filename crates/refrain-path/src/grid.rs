//! Fixed-size 2-D buffer for visualization output.

/// Row-major grid of `width * height` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Copy + Default> Grid<T> {
    /// Create a grid filled with `T::default()`.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![T::default(); width * height],
        }
    }

    /// Set every cell to `f(x, y)`.
    pub fn fill<F>(&mut self, mut f: F)
    where
        F: FnMut(usize, usize) -> T,
    {
        for y in 0..self.height {
            for x in 0..self.width {
                self.cells[y * self.width + x] = f(x, y);
            }
        }
    }

    /// Return the cell at `(x, y)`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<T> {
        (x < self.width && y < self.height).then(|| self.cells[y * self.width + x])
    }

    /// Set the cell at `(x, y)`. Returns false, leaving the grid untouched,
    /// when the coordinate lies outside the grid.
    pub fn set(&mut self, x: usize, y: usize, value: T) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.cells[y * self.width + x] = value;
        true
    }

    /// Return the number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Return the number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Return all cells, row-major.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }
}
