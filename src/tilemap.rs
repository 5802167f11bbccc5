use crate::error::{Result, TerrainError};

/// A 2D row-major grid. Out-of-range coordinates are a caller bug; nothing wraps.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

/// Scalar elevation grid used by every pipeline stage.
pub type Heightfield = Tilemap<f32>;

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Build a map by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self { width, height, data }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height, "({x}, {y}) outside {}x{}", self.width, self.height);
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn same_dimensions<U>(&self, other: &Tilemap<U>) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Raw row-major storage.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| (idx % width, idx / width, val))
    }
}

impl Tilemap<f32> {
    /// Smallest and largest value in the map. `None` for an empty map.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        if self.data.is_empty() {
            return None;
        }
        let mut min_h = f32::MAX;
        let mut max_h = f32::MIN;
        for &h in &self.data {
            if h < min_h { min_h = h; }
            if h > max_h { max_h = h; }
        }
        Some((min_h, max_h))
    }

    /// Fail fast on an empty grid or any non-finite cell.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(TerrainError::EmptyHeightfield { width: self.width, height: self.height });
        }
        match self.iter().find(|(_, _, h)| !h.is_finite()) {
            Some((x, y, _)) => Err(TerrainError::NonFiniteHeight { x, y }),
            None => Ok(()),
        }
    }

    /// Rescale values in place to the 0.0-1.0 range.
    ///
    /// A flat map has no range to stretch, so its value is clamped into
    /// [0, 1] instead. Applying this twice is the same as applying it once.
    pub fn normalize(&mut self) {
        let Some((min_val, max_val)) = self.min_max() else {
            return;
        };

        let range = max_val - min_val;
        if range < 0.0001 {
            for h in self.data.iter_mut() {
                *h = h.clamp(0.0, 1.0);
            }
            return;
        }

        if min_val == 0.0 && max_val == 1.0 {
            return;
        }

        for h in self.data.iter_mut() {
            *h = ((*h - min_val) / range).clamp(0.0, 1.0);
        }
    }

    /// Map `min_val..max_val` onto `0..1` without clamping.
    ///
    /// Used to carry another map's normalization over to this one. A
    /// degenerate range leaves the map untouched, as `normalize` would.
    pub fn rescale(&mut self, min_val: f32, max_val: f32) {
        let range = max_val - min_val;
        if range < 0.0001 || (min_val == 0.0 && max_val == 1.0) {
            return;
        }
        for h in self.data.iter_mut() {
            *h = (*h - min_val) / range;
        }
    }
}
