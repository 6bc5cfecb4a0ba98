//! Flat indexing of an N-dimensional tensor grid.
//!
//! Direction 0 varies fastest: the flat index of the coordinate tuple
//! `(c₀, …, c_{N-1})` is `Σ cᵢ · spacingᵢ` with `spacing₀ = 1` and
//! `spacingᵢ = spacingᵢ₋₁ · dimᵢ₋₁`.

use ql_core::{ensure, errors::Result};

/// Dimensions, spacings and total size of a tensor grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FdmLinearOpLayout {
    dim: Vec<usize>,
    spacing: Vec<usize>,
    size: usize,
}

impl FdmLinearOpLayout {
    /// Create a layout; every extent must be at least one.
    pub fn new(dim: Vec<usize>) -> Result<Self> {
        ensure!(!dim.is_empty(), "layout needs at least one direction");
        ensure!(
            dim.iter().all(|&d| d > 0),
            "all layout extents must be positive, got {dim:?}"
        );
        let mut spacing = Vec::with_capacity(dim.len());
        let mut size = 1usize;
        for &d in &dim {
            spacing.push(size);
            size *= d;
        }
        Ok(Self { dim, spacing, size })
    }

    /// Extent per direction.
    pub fn dim(&self) -> &[usize] {
        &self.dim
    }

    /// Flat-index stride per direction.
    pub fn spacing(&self) -> &[usize] {
        &self.spacing
    }

    /// Total number of grid points.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of directions.
    pub fn dimensions(&self) -> usize {
        self.dim.len()
    }

    /// Flat index of a coordinate tuple.
    pub fn index(&self, coordinates: &[usize]) -> usize {
        coordinates
            .iter()
            .zip(&self.spacing)
            .map(|(c, s)| c * s)
            .sum()
    }

    /// Coordinates of a flat index.
    pub fn coordinates(&self, mut index: usize) -> Vec<usize> {
        let mut coordinates = vec![0; self.dim.len()];
        for (c, &d) in coordinates.iter_mut().zip(&self.dim) {
            *c = index % d;
            index /= d;
        }
        coordinates
    }

    /// Iterator positioned at the first grid point.
    pub fn begin(&self) -> FdmLinearOpIterator {
        FdmLinearOpIterator::new(self.dim.clone())
    }

    /// Iterate over all grid points in flat-index order.
    pub fn iter(&self) -> impl Iterator<Item = FdmLinearOpIterator> + '_ {
        let mut it = self.begin();
        (0..self.size).map(move |_| {
            let current = it.clone();
            it.increment();
            current
        })
    }

    /// Flat index of the neighbour `offset` steps away along `direction`.
    ///
    /// Offsets that leave the grid are reflected at the edges, so the
    /// result is always a valid index.
    pub fn neighbourhood(&self, iter: &FdmLinearOpIterator, direction: usize, offset: isize) -> usize {
        let coordinate = iter.coordinates()[direction];
        let shifted = self.reflect(coordinate, offset, self.dim[direction]);
        iter.index() + shifted * self.spacing[direction] - coordinate * self.spacing[direction]
    }

    /// Flat index of the neighbour offset along two directions at once.
    pub fn neighbourhood2(
        &self,
        iter: &FdmLinearOpIterator,
        d1: usize,
        off1: isize,
        d2: usize,
        off2: isize,
    ) -> usize {
        let c1 = iter.coordinates()[d1];
        let c2 = iter.coordinates()[d2];
        let n1 = self.reflect(c1, off1, self.dim[d1]);
        let n2 = self.reflect(c2, off2, self.dim[d2]);
        iter.index() + n1 * self.spacing[d1] + n2 * self.spacing[d2]
            - c1 * self.spacing[d1]
            - c2 * self.spacing[d2]
    }

    fn reflect(&self, coordinate: usize, offset: isize, extent: usize) -> usize {
        let last = extent as isize - 1;
        let mut n = coordinate as isize + offset;
        if n < 0 {
            n = -n;
        } else if n > last {
            n = last - (n - last);
        }
        n.clamp(0, last) as usize
    }
}

/// A position on a tensor grid: flat index plus coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FdmLinearOpIterator {
    index: usize,
    dim: Vec<usize>,
    coordinates: Vec<usize>,
}

impl FdmLinearOpIterator {
    fn new(dim: Vec<usize>) -> Self {
        let coordinates = vec![0; dim.len()];
        Self {
            index: 0,
            dim,
            coordinates,
        }
    }

    /// Flat index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Coordinate tuple.
    pub fn coordinates(&self) -> &[usize] {
        &self.coordinates
    }

    /// Advance to the next flat index, carrying like an odometer.
    pub fn increment(&mut self) {
        self.index += 1;
        for (c, &d) in self.coordinates.iter_mut().zip(&self.dim) {
            *c += 1;
            if *c < d {
                break;
            }
            *c = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spacing_and_size() {
        let layout = FdmLinearOpLayout::new(vec![5, 7, 8]).unwrap();
        assert_eq!(layout.spacing(), &[1, 5, 35]);
        assert_eq!(layout.size(), 280);
        assert_eq!(layout.index(&[1, 2, 3]), 1 + 10 + 105);
        assert_eq!(layout.coordinates(116), vec![1, 2, 3]);
    }

    #[test]
    fn iteration_visits_every_point_in_order() {
        let layout = FdmLinearOpLayout::new(vec![3, 2]).unwrap();
        let seen: Vec<_> = layout.iter().map(|it| it.coordinates().to_vec()).collect();
        assert_eq!(seen.len(), 6);
        assert_eq!(seen[0], vec![0, 0]);
        assert_eq!(seen[2], vec![2, 0]);
        assert_eq!(seen[3], vec![0, 1]);
        assert!(layout.iter().enumerate().all(|(i, it)| it.index() == i));
    }

    #[test]
    fn neighbourhood_reflects_at_the_edges() {
        let layout = FdmLinearOpLayout::new(vec![5, 7, 8]).unwrap();
        let mut it = layout.begin();
        for _ in 0..layout.index(&[0, 6, 2]) {
            it.increment();
        }
        assert_eq!(it.coordinates(), &[0, 6, 2]);

        // one step up in direction 0
        assert_eq!(layout.neighbourhood(&it, 0, 1), layout.index(&[1, 6, 2]));
        // stepping below zero mirrors to |c - n|
        assert_eq!(layout.neighbourhood(&it, 0, -2), layout.index(&[2, 6, 2]));
        // stepping past the end mirrors to dim - 1 - (c + n - (dim - 1))
        assert_eq!(layout.neighbourhood(&it, 1, 2), layout.index(&[0, 4, 2]));
        assert_eq!(
            layout.neighbourhood2(&it, 0, -1, 1, 1),
            layout.index(&[1, 5, 2])
        );
    }

    #[test]
    fn zero_extent_is_rejected() {
        assert!(FdmLinearOpLayout::new(vec![4, 0]).is_err());
        assert!(FdmLinearOpLayout::new(vec![]).is_err());
    }
}
