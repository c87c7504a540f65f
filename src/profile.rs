use crate::params::{Grid, OpticalParameters};
use crate::simpson::integrate;
use crate::slice::Liveness;

/// Radial samples per pixel.
pub const OVER_SAMPLING: usize = 2;

/// Radial intensity lookup table of one plane, sampled every `1/OVER_SAMPLING` pixel from the center.
#[derive(Clone, Debug)]
pub struct RadialProfile {
    radius: Vec<f64>,
    intensity: Vec<f64>,
}

impl RadialProfile {
    /// Wraps precomputed intensities, sample `n` sitting at radius `n / OVER_SAMPLING`.
    pub fn from_intensity(intensity: Vec<f64>) -> Self {
        let radius = (0..intensity.len())
            .map(|n| n as f64 / OVER_SAMPLING as f64)
            .collect();
        RadialProfile { radius, intensity }
    }

    /// Integrates the diffraction pattern at every sample radius out to `grid.max_radius()`.
    ///
    /// `p` must already carry the defocus of the plane. Returns `None` as soon as `liveness`
    /// is cleared; the partial table is dropped.
    pub fn sample(p: &OpticalParameters, grid: &Grid, liveness: &Liveness) -> Option<Self> {
        let len = grid.max_radius() * OVER_SAMPLING;
        let mut intensity = vec![0.0; len];
        for (n, h) in intensity.iter_mut().enumerate() {
            let r = n as f64 / OVER_SAMPLING as f64;
            *h = integrate(p, r * grid.res_lateral * 1e-9);
            if !liveness.is_live() {
                return None;
            }
        }
        Some(RadialProfile::from_intensity(intensity))
    }

    /// Sample radii in pixels.
    pub fn radius(&self) -> &[f64] {
        &self.radius
    }

    pub fn intensity(&self) -> &[f64] {
        &self.intensity
    }

    pub fn len(&self) -> usize {
        self.intensity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intensity.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Accuracy;

    #[test]
    fn table_covers_plane_with_margin() {
        let grid = Grid::new(6, 4, 3, 100.0, 200.0);
        let p = OpticalParameters::default().with_accuracy(Accuracy::Draft);
        let profile = RadialProfile::sample(&p, &grid, &Liveness::new()).unwrap();

        assert_eq!(profile.len(), grid.max_radius() * OVER_SAMPLING);
        assert_eq!(profile.radius[0], 0.0);
        assert_eq!(profile.radius[3], 1.5);

        // farthest pixel is a corner
        let (x0, y0) = grid.center();
        let corner = (x0 * x0 + y0 * y0).sqrt();
        assert!(((corner * OVER_SAMPLING as f64).floor() as usize + 1) < profile.len());
    }

    #[test]
    fn samples_match_integrator() {
        let grid = Grid::new(4, 4, 3, 80.0, 200.0);
        let p = OpticalParameters::default()
            .with_accuracy(Accuracy::Draft)
            .with_defocus(200e-9);
        let profile = RadialProfile::sample(&p, &grid, &Liveness::new()).unwrap();
        for n in 0..profile.len() {
            let r = n as f64 / OVER_SAMPLING as f64;
            assert_eq!(profile.intensity[n], integrate(&p, r * grid.res_lateral * 1e-9));
        }
    }

    #[test]
    fn aborted_sampling_yields_nothing() {
        let grid = Grid::new(8, 8, 3, 100.0, 200.0);
        let liveness = Liveness::new();
        liveness.abort();
        let p = OpticalParameters::default().with_accuracy(Accuracy::Draft);
        assert!(RadialProfile::sample(&p, &grid, &liveness).is_none());
    }
}
