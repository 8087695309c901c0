use generic_array::typenum::Unsigned;
use generic_array::{ArrayLength, GenericArray};
use std::fmt::{Display, Formatter};
use std::ops::{Deref, Index, IndexMut};

/// Row and column increments used to walk a [`Grid`].
pub type Step = (isize, isize);

/// Index struct to access elements in the [`Grid`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd)]
pub struct GridIndex {
    row: usize,
    col: usize,
}

impl From<(usize, usize)> for GridIndex {
    fn from(value: (usize, usize)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl Display for GridIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl GridIndex {
    /// Constructs a new [`GridIndex`].
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Converts a row-major flat index into a [`GridIndex`] for a grid with `cols` columns.
    pub fn from_flat(index: usize, cols: usize) -> Self {
        Self::new(index / cols, index % cols)
    }

    /// Returns value of `self.col`
    pub fn col(&self) -> usize {
        self.col
    }

    /// Returns value of `self.row`
    pub fn row(&self) -> usize {
        self.row
    }

    /// Returns the row-major flat index for a grid with `cols` columns.
    pub fn to_flat(&self, cols: usize) -> usize {
        self.col + self.row * cols
    }

    /// Returns new instance of [`GridIndex`] moved by `step`, wrapping around
    /// a `rows` x `cols` grid in both directions.
    pub fn wrapping_step(&self, step: Step, rows: usize, cols: usize) -> Self {
        Self::new(
            wrap(self.row, step.0, rows),
            wrap(self.col, step.1, cols),
        )
    }
}

fn wrap(value: usize, delta: isize, len: usize) -> usize {
    (value as isize + delta).rem_euclid(len as isize) as usize
}

/// Two-dimensional fixed-length array that stores values and allows to mutate them.
/// Length of array is defined by generic parameters `R` and `C`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T, R: ArrayLength, C: ArrayLength> {
    contents: GenericArray<GenericArray<T, C>, R>,
}

impl<T: Default, R: ArrayLength, C: ArrayLength> Default for Grid<T, R, C> {
    fn default() -> Self {
        Self {
            contents: Default::default(),
        }
    }
}

impl<T, R: ArrayLength, C: ArrayLength> Deref for Grid<T, R, C> {
    type Target = [GenericArray<T, C>];

    fn deref(&self) -> &Self::Target {
        self.contents.as_slice()
    }
}

impl<T: Display, R: ArrayLength, C: ArrayLength> Display for Grid<T, R, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, row) in self.deref().iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            for val in row {
                write!(f, "{}", val)?;
            }
        }
        Ok(())
    }
}

impl<T, R: ArrayLength, C: ArrayLength> Index<GridIndex> for Grid<T, R, C> {
    type Output = T;

    fn index(&self, index: GridIndex) -> &Self::Output {
        &self.contents[index.row()][index.col()]
    }
}

impl<T, R: ArrayLength, C: ArrayLength> IndexMut<GridIndex> for Grid<T, R, C> {
    fn index_mut(&mut self, index: GridIndex) -> &mut Self::Output {
        &mut self.contents[index.row()][index.col()]
    }
}

impl<T, R: ArrayLength, C: ArrayLength> Grid<T, R, C> {
    /// Number of rows.
    pub fn rows() -> usize {
        R::to_usize()
    }

    /// Number of columns.
    pub fn cols() -> usize {
        C::to_usize()
    }

    /// Total number of cells.
    pub fn cell_count() -> usize {
        Self::rows() * Self::cols()
    }

    /// Returns `true` if `index` points inside the grid.
    pub fn in_bounds(index: GridIndex) -> bool {
        index.row() < Self::rows() && index.col() < Self::cols()
    }

    /// Converts a row-major flat index into a [`GridIndex`], [`None`] if it is out of range.
    pub fn position(flat: usize) -> Option<GridIndex> {
        if flat < Self::cell_count() {
            Some(GridIndex::from_flat(flat, Self::cols()))
        } else {
            None
        }
    }

    /// Converts a [`GridIndex`] into its row-major flat index.
    pub fn flat(index: GridIndex) -> usize {
        index.to_flat(Self::cols())
    }

    /// Bounds-checked access.
    pub fn get(&self, index: GridIndex) -> Option<&T> {
        if Self::in_bounds(index) {
            Some(&self[index])
        } else {
            None
        }
    }

    /// Returns an iterator to indexed grid elements row by row
    pub fn all_indexed(&self) -> impl Iterator<Item = (GridIndex, &T)> {
        self.contents.iter().enumerate().flat_map(|(row, cols)| {
            cols.iter()
                .enumerate()
                .map(move |(col, val)| (GridIndex::new(row, col), val))
        })
    }

    /// Returns an endless iterator that starts with `start` and moves by `step`
    /// on each iteration, wrapping around the grid edges.
    pub fn wrapping_iter(&self, start: GridIndex, step: Step) -> WrappingGridIterator<T, R, C> {
        WrappingGridIterator {
            current: start,
            step,
            grid: self,
        }
    }
}

/// An iterator that yields the current [`GridIndex`] and the element, then
/// moves by a fixed [`Step`] modulo the [`Grid`] dimensions.
/// Never ends on its own, use [`Iterator::take`] to bound it.
pub struct WrappingGridIterator<'a, T, R: ArrayLength, C: ArrayLength> {
    current: GridIndex,
    step: Step,
    grid: &'a Grid<T, R, C>,
}

impl<'a, T, R: ArrayLength, C: ArrayLength> Iterator for WrappingGridIterator<'a, T, R, C> {
    type Item = (GridIndex, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let old_current = self.current;
        let item = self.grid.get(old_current)?;
        self.current = old_current.wrapping_step(self.step, R::to_usize(), C::to_usize());
        Some((old_current, item))
    }
}
