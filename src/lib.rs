#![allow(non_snake_case)]

use ndarray::parallel::prelude::{IntoParallelIterator, ParallelIterator};
use ndarray::{Array3, ArrayView2, Axis};
use std::time::Instant;

pub mod bessel;
mod error;
pub mod integrand;
mod params;
pub mod profile;
pub mod raster;
pub mod simpson;
mod slice;

pub use crate::error::{PsfError, Result};
pub use crate::params::{Accuracy, Grid, OpticalParameters};
pub use crate::slice::{Liveness, Monitor, Silent, SliceState, SliceTask, PROGRESS_BUDGET};

/// Vectorial PSF of a high-NA microscope after Richards & Wolf, with the phase aberration
/// of a stratified immersion/coverslip/specimen system (Török & Varga).
///
/// Each plane of the volume is an independent [`SliceTask`]: the diffraction integral is
/// evaluated on an oversampled radial grid, then interpolated onto the pixel grid.
#[derive(Clone, Debug)]
pub struct RichardsWolf {
    optics: OpticalParameters,
    grid: Grid,
}

impl RichardsWolf {
    pub const FULL_NAME: &'static str = "Richards & Wolf 3D Optical Model";
    pub const SHORT_NAME: &'static str = "RW";

    /// Fails if the grid is too small for the model, see [`Grid::check_size`].
    pub fn new(optics: OpticalParameters, grid: Grid) -> Result<Self> {
        grid.check_size()?;
        Ok(RichardsWolf { optics, grid })
    }

    pub fn description() -> &'static str {
        "Vectorial model of the focal field. The phase aberration follows the Gibson & Lanni \
         optical path difference. The three electric field components are integrated independently."
    }

    pub fn optics(&self) -> &OpticalParameters {
        &self.optics
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// One pending task per plane, plane `z` at defocus `res_axial * (z - (nz-1)/2)`.
    pub fn tasks(&self) -> Vec<SliceTask> {
        (0..self.grid.nz)
            .map(|z| SliceTask::new(z, self.grid, &self.optics))
            .collect()
    }

    /// Computes every plane in parallel and assembles the volume.
    ///
    /// Planes whose task was cancelled through `liveness` are left at zero.
    pub fn generate<M: Monitor>(&self, liveness: &Liveness, monitor: &M) -> Volume {
        let start = Instant::now();
        log::info!(
            "{}: {}x{}x{} volume, NA {}, ni {}, accuracy {}",
            Self::SHORT_NAME,
            self.grid.nx,
            self.grid.ny,
            self.grid.nz,
            self.optics.na(),
            self.optics.ni(),
            self.optics.accuracy()
        );

        let tasks: Vec<SliceTask> = self
            .tasks()
            .into_par_iter()
            .map(|mut task| {
                task.process(liveness, monitor);
                task
            })
            .collect();

        let volume = Volume::assemble(&self.grid, tasks);
        log::info!(
            "{}: {} of {} planes computed in {:.2}s",
            Self::SHORT_NAME,
            volume.completed(),
            self.grid.nz,
            start.elapsed().as_secs_f64()
        );
        volume
    }
}

/// PSF intensity volume, indexed `[z, y, x]`.
#[derive(Clone, Debug)]
pub struct Volume {
    pub values: Array3<f64>,
    /// Lateral and axial sample pitch in nanometres.
    pub pitch: (f64, f64),
    /// Final state of the task behind each plane.
    pub states: Vec<SliceState>,
}

impl Volume {
    fn assemble(grid: &Grid, tasks: Vec<SliceTask>) -> Self {
        let mut values = Array3::zeros([grid.nz, grid.ny, grid.nx]);
        let mut states = Vec::with_capacity(tasks.len());
        for mut task in tasks {
            if let Some(plane) = task.take_plane() {
                values.index_axis_mut(Axis(0), task.z()).assign(&plane);
            }
            states.push(task.state());
        }
        Volume {
            values,
            pitch: (grid.res_lateral, grid.res_axial),
            states,
        }
    }

    pub fn plane(&self, z: usize) -> ArrayView2<f64> {
        self.values.index_axis(Axis(0), z)
    }

    /// Number of planes that were fully computed.
    pub fn completed(&self) -> usize {
        self.states
            .iter()
            .filter(|&&s| s == SliceState::Completed)
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.completed() == self.states.len()
    }

    pub fn max(&self) -> f64 {
        self.values.iter().fold(0.0, |max, &v| v.max(max))
    }

    /// Position `(y, x)` and value of the brightest pixel of plane `z`, first in row-major order on ties.
    pub fn peak(&self, z: usize) -> ((usize, usize), f64) {
        self.plane(z)
            .indexed_iter()
            .fold(((0, 0), f64::NEG_INFINITY), |best, (idx, &v)| {
                if v > best.1 {
                    (idx, v)
                } else {
                    best
                }
            })
    }

    /// Pitch weighted sum of plane `z`, in intensity units times nm^2.
    pub fn intensity_integral(&self, z: usize) -> f64 {
        self.plane(z).sum() * self.pitch.0 * self.pitch.0
    }
}

/// Radius of Airy pattern from the central peak to the first minimum
///
/// * na - numerical aperture
/// * lambda - wavelength of light
pub fn airy_radius(na: f64, lambda: f64) -> f64 {
    1.22 * 0.5 * lambda / na
}
