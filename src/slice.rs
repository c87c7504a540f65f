use crate::params::{Grid, OpticalParameters};
use crate::profile::RadialProfile;
use crate::raster::rasterize;
use ndarray::Array2;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Share of the total progress budget reported by the slice computations, in percent.
pub const PROGRESS_BUDGET: f64 = 90.0;

/// Cooperative cancellation flag shared by every task of a run.
///
/// The caller clears it with [`Liveness::abort`]; tasks only read it.
#[derive(Clone, Debug)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Liveness(Arc::new(AtomicBool::new(true)))
    }

    pub fn abort(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    pub fn is_live(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// Receives progress increments, in percent of the whole run, with a short label.
pub trait Monitor: Sync {
    fn increment(&self, percent: f64, label: &str);
}

impl<F: Fn(f64, &str) + Sync> Monitor for F {
    fn increment(&self, percent: f64, label: &str) {
        self(percent, label)
    }
}

/// Discards progress reports.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl Monitor for Silent {
    fn increment(&self, _percent: f64, _label: &str) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SliceState {
    Pending,
    Running,
    Completed,
    Cancelled,
}

/// Computation of one plane of the volume.
///
/// A task owns its plane buffer until it is taken, so tasks never share output memory.
/// A task runs at most once: processing a task that is no longer pending does nothing.
#[derive(Clone, Debug)]
pub struct SliceTask {
    z: usize,
    grid: Grid,
    params: OpticalParameters,
    state: SliceState,
    plane: Option<Array2<f64>>,
}

impl SliceTask {
    pub fn new(z: usize, grid: Grid, params: &OpticalParameters) -> Self {
        SliceTask {
            z,
            grid,
            params: params.with_defocus(grid.defocus(z)),
            state: SliceState::Pending,
            plane: None,
        }
    }

    pub fn z(&self) -> usize {
        self.z
    }

    /// Defocus of this plane in metres.
    pub fn defocus(&self) -> f64 {
        self.params.defocus()
    }

    pub fn state(&self) -> SliceState {
        self.state
    }

    /// Builds the radial profile and rasterizes it into this task's plane.
    ///
    /// Progress of `PROGRESS_BUDGET / nz` percent is reported once the plane is written.
    pub fn process<M: Monitor + ?Sized>(&mut self, liveness: &Liveness, monitor: &M) -> SliceState {
        if self.state != SliceState::Pending {
            return self.state;
        }
        self.state = SliceState::Running;

        let plane = RadialProfile::sample(&self.params, &self.grid, liveness)
            .and_then(|profile| rasterize(&profile, &self.grid, liveness));

        match plane {
            Some(plane) => {
                self.plane = Some(plane);
                self.state = SliceState::Completed;
                monitor.increment(
                    PROGRESS_BUDGET / self.grid.nz as f64,
                    &format!("{} / {}", self.z, self.grid.nz),
                );
                log::debug!("plane {} (defocus {:e} m) completed", self.z, self.defocus());
            }
            None => {
                self.state = SliceState::Cancelled;
                log::debug!("plane {} cancelled", self.z);
            }
        }
        self.state
    }

    /// Hands over the computed plane, `[ny, nx]`. `None` unless the task completed.
    pub fn take_plane(&mut self) -> Option<Array2<f64>> {
        self.plane.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Accuracy;
    use std::sync::Mutex;

    fn small() -> (Grid, OpticalParameters) {
        (
            Grid::new(6, 6, 3, 100.0, 200.0),
            OpticalParameters::default().with_accuracy(Accuracy::Draft),
        )
    }

    #[test]
    fn completes_and_reports() {
        let (grid, optics) = small();
        let mut task = SliceTask::new(2, grid, &optics);
        assert_eq!(task.state(), SliceState::Pending);
        assert!((task.defocus() - 200e-9).abs() < 1e-15);

        let reports = Mutex::new(Vec::new());
        let monitor = |percent: f64, label: &str| {
            reports.lock().unwrap().push((percent, label.to_string()));
        };
        assert_eq!(task.process(&Liveness::new(), &monitor), SliceState::Completed);

        let reports = reports.into_inner().unwrap();
        assert_eq!(reports.len(), 1);
        assert!((reports[0].0 - 30.0).abs() < 1e-12);
        assert_eq!(reports[0].1, "2 / 3");

        let plane = task.take_plane().unwrap();
        assert_eq!(plane.shape(), &[6, 6]);
        assert!(task.take_plane().is_none());
    }

    #[test]
    fn cancelled_task_has_no_plane() {
        let (grid, optics) = small();
        let liveness = Liveness::new();
        liveness.abort();
        let mut task = SliceTask::new(0, grid, &optics);
        assert_eq!(task.process(&liveness, &Silent), SliceState::Cancelled);
        assert!(task.take_plane().is_none());
    }

    #[test]
    fn tasks_run_once() {
        let (grid, optics) = small();
        let liveness = Liveness::new();
        liveness.abort();
        let mut task = SliceTask::new(1, grid, &optics);
        task.process(&liveness, &Silent);

        // no retry after the flag is restored on a fresh token
        assert_eq!(task.process(&Liveness::new(), &Silent), SliceState::Cancelled);
        assert!(task.take_plane().is_none());
    }

    #[test]
    fn liveness_is_shared_between_clones() {
        let a = Liveness::new();
        let b = a.clone();
        assert!(b.is_live());
        a.abort();
        assert!(!b.is_live());
    }
}
