//! Uniform-grid spatial index over focal-plane points.
//!
//! Buckets a fixed point set into an `nx × ny` grid spanning the set's
//! bounding box and answers circle queries by scanning the overlapped
//! cell range. Query results are deterministic: cell-row-major order,
//! insertion order within a cell.

use crate::geom::Vec2;

/// Spatial index over a fixed set of 2D points.
#[derive(Debug, Clone)]
pub struct FpRaster {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    inv_dx: f64,
    inv_dy: f64,
    nx: usize,
    ny: usize,
    cells: Vec<Vec<usize>>,
    loc: Vec<Vec2>,
}

impl FpRaster {
    /// Build a raster with `nx × ny` cells over the bounding box of
    /// `loc`.
    ///
    /// Degenerate boxes (all points sharing an x or y coordinate) are
    /// padded by `1e-9`.
    ///
    /// # Panics
    ///
    /// Panics if `loc` is empty or a cell count is zero; an index over
    /// nothing cannot answer queries.
    pub fn new(loc: Vec<Vec2>, nx: usize, ny: usize) -> Self {
        assert!(nx > 0 && ny > 0, "bad raster cell counts {nx}x{ny}");
        assert!(!loc.is_empty(), "raster input point set is empty");

        let mut x0 = loc[0].x;
        let mut x1 = loc[0].x;
        let mut y0 = loc[0].y;
        let mut y1 = loc[0].y;
        for p in &loc[1..] {
            x0 = x0.min(p.x);
            x1 = x1.max(p.x);
            y0 = y0.min(p.y);
            y1 = y1.max(p.y);
        }
        if x0 == x1 {
            x1 += 1e-9;
        }
        if y0 == y1 {
            y1 += 1e-9;
        }
        let inv_dx = nx as f64 / (x1 - x0);
        let inv_dy = ny as f64 / (y1 - y0);

        let mut raster = Self {
            x0,
            y0,
            x1,
            y1,
            inv_dx,
            inv_dy,
            nx,
            ny,
            cells: vec![Vec::new(); nx * ny],
            loc,
        };
        for i in 0..raster.loc.len() {
            let cell = raster.cell_of(raster.loc[i]);
            raster.cells[cell].push(i);
        }
        raster
    }

    fn index_x(&self, x: f64) -> usize {
        (((x - self.x0) * self.inv_dx) as i64).clamp(0, self.nx as i64 - 1) as usize
    }

    fn index_y(&self, y: f64) -> usize {
        (((y - self.y0) * self.inv_dy) as i64).clamp(0, self.ny as i64 - 1) as usize
    }

    fn cell_of(&self, pos: Vec2) -> usize {
        self.index_x(pos.x) + self.nx * self.index_y(pos.y)
    }

    /// Indices of all points within Euclidean distance `rad` of
    /// `center` (boundary inclusive).
    pub fn query(&self, center: Vec2, rad: f64) -> Vec<usize> {
        let mut res = Vec::new();
        if center.x < self.x0 - rad
            || center.x > self.x1 + rad
            || center.y < self.y0 - rad
            || center.y > self.y1 + rad
        {
            return res;
        }
        let rsq = rad * rad;
        let i0 = self.index_x(center.x - rad);
        let i1 = self.index_x(center.x + rad);
        let j0 = self.index_y(center.y - rad);
        let j1 = self.index_y(center.y + rad);
        for j in j0..=j1 {
            for i in i0..=i1 {
                for &k in &self.cells[i + self.nx * j] {
                    if center.dsq(&self.loc[k]) <= rsq {
                        res.push(k);
                    }
                }
            }
        }
        res
    }

    /// Whether any point lies within `rad` of `center`.
    pub fn any_in(&self, center: Vec2, rad: f64) -> bool {
        if center.x < self.x0 - rad
            || center.x > self.x1 + rad
            || center.y < self.y0 - rad
            || center.y > self.y1 + rad
        {
            return false;
        }
        let rsq = rad * rad;
        let i0 = self.index_x(center.x - rad);
        let i1 = self.index_x(center.x + rad);
        let j0 = self.index_y(center.y - rad);
        let j1 = self.index_y(center.y + rad);
        for j in j0..=j1 {
            for i in i0..=i1 {
                for &k in &self.cells[i + self.nx * j] {
                    if center.dsq(&self.loc[k]) <= rsq {
                        return true;
                    }
                }
            }
        }
        false
    }
}
