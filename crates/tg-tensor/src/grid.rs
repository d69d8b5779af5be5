//! Evenly and geometrically spaced coordinate descriptors.

use tg_core::{errors::Result, Real};

/// Relative slack used when counting how many steps fit in a range.
const COUNT_EPS: Real = 1.0e-10;

/// Largest number of points `from_width` will generate.
pub const MAX_WIDTH_POINTS: usize = 1 << 24;

/// A grid of `npoints` coordinates from `start` to `end`, spaced linearly or
/// logarithmically.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UniformGrid {
    start: Real,
    end: Real,
    npoints: usize,
    log: bool,
}

impl UniformGrid {
    /// `npoints` linearly spaced coordinates, both end points included.
    pub fn linear(start: Real, end: Real, npoints: usize) -> Result<Self> {
        tg_core::ensure_arg!(npoints >= 1, "uniform grid needs at least one point");
        tg_core::ensure_arg!(
            start.is_finite() && end.is_finite(),
            "uniform grid bounds must be finite, got [{start}, {end}]"
        );
        Ok(Self {
            start,
            end,
            npoints,
            log: false,
        })
    }

    /// `npoints` geometrically spaced coordinates, both end points included.
    ///
    /// `start` and `end` must be nonzero and share a sign.
    pub fn log(start: Real, end: Real, npoints: usize) -> Result<Self> {
        tg_core::ensure_arg!(npoints >= 1, "uniform grid needs at least one point");
        tg_core::ensure_arg!(
            start * end > 0.0 && (start * end).is_finite(),
            "logarithmic grid bounds must be nonzero with the same sign, got [{start}, {end}]"
        );
        Ok(Self {
            start,
            end,
            npoints,
            log: true,
        })
    }

    /// Grid starting at `begin` and stepping by `width` (added, or
    /// multiplied when `log` is set) for as long as `end` is not passed.
    ///
    /// Widths that would need more than [`MAX_WIDTH_POINTS`] points are
    /// rejected.
    pub fn from_width(begin: Real, end: Real, width: Real, log: bool) -> Result<Self> {
        let steps = if log {
            tg_core::ensure_arg!(
                width > 0.0 && width != 1.0,
                "logarithmic grid ratio must be positive and not 1, got {width}"
            );
            tg_core::ensure_arg!(
                begin * end > 0.0,
                "logarithmic grid bounds must be nonzero with the same sign, got [{begin}, {end}]"
            );
            (end / begin).ln() / width.ln()
        } else {
            tg_core::ensure_arg!(width != 0.0, "grid width must be nonzero");
            (end - begin) / width
        };
        tg_core::ensure_arg!(
            steps.is_finite() && steps > -COUNT_EPS,
            "grid width {width} does not lead from {begin} towards {end}"
        );
        let steps = (steps + COUNT_EPS).floor();
        tg_core::ensure_arg!(
            steps < MAX_WIDTH_POINTS as Real,
            "grid width {width} gives {steps} steps from {begin} to {end}, more than {MAX_WIDTH_POINTS} points"
        );
        let n = steps.max(0.0) as usize;
        let last = if log {
            begin * width.powi(n as i32)
        } else {
            begin + n as Real * width
        };
        Ok(Self {
            start: begin,
            end: last,
            npoints: n + 1,
            log,
        })
    }

    /// Number of points.
    pub fn npoints(&self) -> usize {
        self.npoints
    }

    /// First coordinate.
    pub fn start(&self) -> Real {
        self.start
    }

    /// Last coordinate.
    pub fn end(&self) -> Real {
        self.end
    }

    /// `true` for a geometric grid.
    pub fn is_log(&self) -> bool {
        self.log
    }

    /// Coordinate `k`.
    pub fn value(&self, k: usize) -> Real {
        if self.npoints == 1 {
            return self.start;
        }
        if k + 1 == self.npoints {
            return self.end;
        }
        let t = k as Real / (self.npoints - 1) as Real;
        if self.log {
            self.start * (self.end / self.start).powf(t)
        } else {
            self.start + (self.end - self.start) * t
        }
    }

    /// All coordinates.
    pub fn values(&self) -> Vec<Real> {
        (0..self.npoints).map(|k| self.value(k)).collect()
    }
}
