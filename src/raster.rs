use crate::params::Grid;
use crate::profile::{RadialProfile, OVER_SAMPLING};
use crate::slice::Liveness;
use ndarray::Array2;
use unchecked_index::get_unchecked;

/// Resamples a radial profile onto an `[ny, nx]` plane centered at `((nx-1)/2, (ny-1)/2)`,
/// by linear interpolation between the two table entries bracketing each pixel radius.
///
/// `liveness` is checked after every row. Returns `None` if it was cleared; the partially
/// filled plane is dropped. Interpolated values are not clamped.
///
/// Panics if the profile is too short to bracket the plane corners, see `Grid::max_radius`.
pub fn rasterize(profile: &RadialProfile, grid: &Grid, liveness: &Liveness) -> Option<Array2<f64>> {
    let (x0, y0) = grid.center();
    let corner = (x0 * x0 + y0 * y0).sqrt();
    let last_index = (corner * OVER_SAMPLING as f64).floor() as usize + 1;
    assert!(
        last_index < profile.len(),
        "radial profile of {} samples cannot cover a {}x{} plane",
        profile.len(),
        grid.nx,
        grid.ny
    );

    let r = profile.radius();
    let h = profile.intensity();
    let os = OVER_SAMPLING as f64;

    let mut plane = Array2::zeros([grid.ny, grid.nx]);
    for (y, mut row) in plane.outer_iter_mut().enumerate() {
        let dy = y as f64 - y0;
        for (x, e) in row.iter_mut().enumerate() {
            let dx = x as f64 - x0;
            let r_pixel = (dx * dx + dy * dy).sqrt();
            let index = (r_pixel * os).floor() as usize;
            debug_assert!(index + 1 < h.len());
            // index + 1 <= last_index, checked above
            unsafe {
                let h0 = *get_unchecked(h, index);
                let h1 = *get_unchecked(h, index + 1);
                *e = h0 + (h1 - h0) * (r_pixel - *get_unchecked(r, index)) * os;
            }
        }
        if !liveness.is_live() {
            return None;
        }
    }
    Some(plane)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn linear_profile(grid: &Grid) -> RadialProfile {
        let len = grid.max_radius() * OVER_SAMPLING;
        RadialProfile::from_intensity(
            (0..len)
                .map(|n| 1.0 + 3.0 * n as f64 / OVER_SAMPLING as f64)
                .collect(),
        )
    }

    #[test]
    fn nodes_are_reproduced_exactly() {
        let grid = Grid::new(7, 5, 3, 100.0, 200.0);
        let profile = RadialProfile::from_intensity(
            (0..grid.max_radius() * OVER_SAMPLING)
                .map(|n| ((n * 7919) % 13) as f64 + 0.25)
                .collect(),
        );
        let plane = rasterize(&profile, &grid, &Liveness::new()).unwrap();
        assert_eq!(plane.shape(), &[5, 7]);

        // center (3, 2) sits on node 0, (3 +- 1, 2) and (3, 2 +- 1) on node 2, (3 +- 2, 2) on node 4
        assert_eq!(plane[[2, 3]], profile.intensity()[0]);
        assert_eq!(plane[[2, 4]], profile.intensity()[2]);
        assert_eq!(plane[[1, 3]], profile.intensity()[2]);
        assert_eq!(plane[[2, 1]], profile.intensity()[4]);
        assert_eq!(plane[[0, 3]], profile.intensity()[4]);
    }

    #[test]
    fn linear_profile_is_interpolated_linearly() {
        let grid = Grid::new(8, 6, 3, 100.0, 200.0);
        let plane = rasterize(&linear_profile(&grid), &grid, &Liveness::new()).unwrap();
        let (x0, y0) = grid.center();
        for ((y, x), &v) in plane.indexed_iter() {
            let r = ((x as f64 - x0).powi(2) + (y as f64 - y0).powi(2)).sqrt();
            assert_relative_eq!(v, 1.0 + 3.0 * r, max_relative = 1e-12);
        }
    }

    #[test]
    fn plane_is_radially_symmetric() {
        let grid = Grid::new(6, 6, 3, 100.0, 200.0);
        let profile = RadialProfile::from_intensity(
            (0..grid.max_radius() * OVER_SAMPLING)
                .map(|n| (-(n as f64) * 0.3).exp())
                .collect(),
        );
        let plane = rasterize(&profile, &grid, &Liveness::new()).unwrap();
        for ((y, x), &v) in plane.indexed_iter() {
            assert_eq!(v, plane[[5 - y, 5 - x]]);
            assert_eq!(v, plane[[x, y]]);
        }
    }

    #[test]
    fn aborted_raster_yields_nothing() {
        let grid = Grid::new(6, 6, 3, 100.0, 200.0);
        let liveness = Liveness::new();
        liveness.abort();
        assert!(rasterize(&linear_profile(&grid), &grid, &liveness).is_none());
    }

    #[test]
    #[should_panic]
    fn short_profile_is_rejected() {
        let grid = Grid::new(16, 16, 3, 100.0, 200.0);
        let profile = RadialProfile::from_intensity(vec![0.0; 8]);
        let _ = rasterize(&profile, &grid, &Liveness::new());
    }
}
