//! Dense score map over template placements.

/// Row-major map of scores indexed by placement top-left `(x, y)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreMap {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl ScoreMap {
    /// Wraps a row-major buffer of `width * height` scores.
    ///
    /// Returns `None` when the buffer length does not match the shape.
    pub fn from_vec(data: Vec<f32>, width: usize, height: usize) -> Option<Self> {
        if width.checked_mul(height)? != data.len() {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// Returns the number of placement columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of placement rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the score at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Returns the raw row-major scores.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Returns the location and value of the global maximum.
    ///
    /// Ties resolve to the first position in row-major order. Returns `None`
    /// for an empty map.
    pub fn argmax(&self) -> Option<(usize, usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (idx, &value) in self.data.iter().enumerate() {
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((idx, value)),
            }
        }
        best.map(|(idx, value)| (idx % self.width, idx / self.width, value))
    }

    /// Zeroes the square of Chebyshev radius `radius` centered on `(x, y)`.
    ///
    /// The square is clamped to the map on every side, so centers on edges
    /// and corners shrink the zeroed region instead of reaching outside it.
    pub fn suppress(&mut self, x: usize, y: usize, radius: usize) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = x.saturating_add(radius).min(self.width - 1);
        let y1 = y.saturating_add(radius).min(self.height - 1);
        if x0 > x1 || y0 > y1 {
            return;
        }
        for row in y0..=y1 {
            let start = row * self.width;
            self.data[start + x0..=start + x1].fill(0.0);
        }
    }
}
