use crate::error::{PsfError, Result};
use std::f64::consts::PI;
use strum_macros::{Display, EnumString};

/// Stopping level of the Simpson integrator.
///
/// Each level sets the number of consecutive refinements that must agree to within
/// the relative tolerance before an integral is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Accuracy {
    Good,
    Better,
    Best,
    Draft,
}

impl Accuracy {
    /// Maps a selector index (0 = Good, 1 = Better, 2 = Best) onto a level. Anything else is `Draft`.
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Accuracy::Good,
            1 => Accuracy::Better,
            2 => Accuracy::Best,
            _ => Accuracy::Draft,
        }
    }

    /// Number of consecutive stable refinements required.
    pub fn required_stable(self) -> usize {
        match self {
            Accuracy::Draft => 3,
            Accuracy::Good => 5,
            Accuracy::Better => 7,
            Accuracy::Best => 9,
        }
    }
}

impl Default for Accuracy {
    fn default() -> Self {
        Accuracy::Good
    }
}

/// Physical description of the objective, immersion, coverslip and specimen for one PSF run.
///
/// All lengths are in metres. Derived values (`alpha`, `k`, `kni`) are kept in step
/// with the inputs by the constructor and the `with_*` setters, so fields are read only
/// outside the crate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OpticalParameters {
    pub(crate) ni: f64,
    pub(crate) ns: f64,
    pub(crate) ng: f64,
    pub(crate) na: f64,
    pub(crate) wavelength: f64,
    pub(crate) ti0: f64,
    pub(crate) ti: f64,
    pub(crate) tg0: f64,
    pub(crate) tg: f64,
    pub(crate) particle_axial_position: f64,
    pub(crate) accuracy: Accuracy,
    pub(crate) alpha: f64,
    pub(crate) k: f64,
    pub(crate) kni: f64,
}

fn check_positive(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(PsfError::InvalidOptics(format!(
            "{} must be positive and finite, got {}",
            name, value
        )))
    }
}

impl OpticalParameters {
    /// Index matched optics: specimen and coverslip share the immersion index `ni`.
    ///
    /// * `ni` - refractive index of the immersion medium
    /// * `na` - numerical aperture of the objective. Values above `ni` are clamped to `ni`.
    /// * `wavelength` - emission wavelength in metres
    pub fn new(ni: f64, na: f64, wavelength: f64) -> Result<Self> {
        let ni = check_positive("ni", ni)?;
        let wavelength = check_positive("wavelength", wavelength)?;
        if !na.is_finite() || na < 0.0 {
            return Err(PsfError::InvalidOptics(format!(
                "numerical aperture must be non-negative and finite, got {}",
                na
            )));
        }

        let mut ratio = na / ni;
        if ratio > 1.0 {
            log::warn!(
                "numerical aperture {} exceeds immersion index {}, clamping aperture angle to 90 degrees",
                na,
                ni
            );
            ratio = 1.0;
        }

        let k = 2.0 * PI / wavelength;
        Ok(OpticalParameters {
            ni,
            ns: ni,
            ng: ni,
            na,
            wavelength,
            ti0: 150e-6,
            ti: 150e-6,
            tg0: 170e-6,
            tg: 170e-6,
            particle_axial_position: 0.0,
            accuracy: Accuracy::default(),
            alpha: ratio.asin(),
            k,
            kni: k * ni,
        })
    }

    /// Specimen index `ns`. Above `ni` the critical angle no longer limits the integral.
    pub fn with_specimen_index(mut self, ns: f64) -> Result<Self> {
        self.ns = check_positive("ns", ns)?;
        if self.ns > self.ni {
            log::warn!(
                "specimen index {} exceeds immersion index {}, clamping critical angle to 90 degrees",
                self.ns,
                self.ni
            );
        }
        Ok(self)
    }

    pub fn with_coverslip_index(mut self, ng: f64) -> Result<Self> {
        self.ng = check_positive("ng", ng)?;
        Ok(self)
    }

    /// Design working distance of the immersion layer. Resets the actual distance to match.
    pub fn with_working_distance(mut self, ti0: f64) -> Self {
        self.ti0 = ti0;
        self.ti = ti0;
        self
    }

    /// Actual and design coverslip thickness.
    pub fn with_coverslip_thickness(mut self, tg: f64, tg0: f64) -> Self {
        self.tg = tg;
        self.tg0 = tg0;
        self
    }

    /// Axial position of the point source below the coverslip.
    pub fn with_particle_position(mut self, z: f64) -> Self {
        self.particle_axial_position = z;
        self
    }

    pub fn with_accuracy(mut self, accuracy: Accuracy) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Moves the focal plane by `defocus` metres, expressed as a change of the immersion thickness.
    pub fn with_defocus(mut self, defocus: f64) -> Self {
        self.ti = self.ti0 + defocus;
        self
    }

    /// Upper limit of the angular integral: the aperture angle, or the critical angle
    /// of the immersion/specimen interface if that is smaller.
    pub fn integration_limit(&self) -> f64 {
        let critical = (self.ns / self.ni).min(1.0).asin();
        self.alpha.min(critical)
    }

    pub fn ni(&self) -> f64 {
        self.ni
    }

    pub fn ns(&self) -> f64 {
        self.ns
    }

    pub fn ng(&self) -> f64 {
        self.ng
    }

    pub fn na(&self) -> f64 {
        self.na
    }

    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    pub fn accuracy(&self) -> Accuracy {
        self.accuracy
    }

    /// Maximal half-aperture angle, `asin(NA/ni)`.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Actual and design coverslip thickness, `(tg, tg0)`. Recorded but not part of the phase term.
    pub fn coverslip_thickness(&self) -> (f64, f64) {
        (self.tg, self.tg0)
    }

    /// Current defocus, `ti - ti0`.
    pub fn defocus(&self) -> f64 {
        self.ti - self.ti0
    }
}

impl Default for OpticalParameters {
    fn default() -> Self {
        let k = 2.0 * PI / 600e-9;
        OpticalParameters {
            ni: 1.5,
            ns: 1.5,
            ng: 1.5,
            na: 1.4,
            wavelength: 600e-9,
            ti0: 150e-6,
            ti: 150e-6,
            tg0: 170e-6,
            tg: 170e-6,
            particle_axial_position: 0.0,
            accuracy: Accuracy::Good,
            alpha: (1.4f64 / 1.5).asin(),
            k,
            kni: k * 1.5,
        }
    }
}

/// Output volume dimensions in pixels and sampling pitch in nanometres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub res_lateral: f64,
    pub res_axial: f64,
}

impl Grid {
    pub fn new(nx: usize, ny: usize, nz: usize, res_lateral: f64, res_axial: f64) -> Self {
        Grid {
            nx,
            ny,
            nz,
            res_lateral,
            res_axial,
        }
    }

    /// Rejects volumes too small for the model: `nz >= 3`, `nx >= 4`, `ny >= 4`.
    pub fn check_size(&self) -> Result<()> {
        if self.nz < 3 {
            return Err(PsfError::InvalidGeometry {
                axis: "nz",
                min: 3,
                value: self.nz,
            });
        }
        if self.nx < 4 {
            return Err(PsfError::InvalidGeometry {
                axis: "nx",
                min: 4,
                value: self.nx,
            });
        }
        if self.ny < 4 {
            return Err(PsfError::InvalidGeometry {
                axis: "ny",
                min: 4,
                value: self.ny,
            });
        }
        Ok(())
    }

    /// Center of a plane in pixels, `((nx-1)/2, (ny-1)/2)`.
    pub fn center(&self) -> (f64, f64) {
        ((self.nx as f64 - 1.0) / 2.0, (self.ny as f64 - 1.0) / 2.0)
    }

    /// Defocus in metres of plane `z`, zero at the middle plane.
    pub fn defocus(&self, z: usize) -> f64 {
        self.res_axial * 1e-9 * (z as f64 - (self.nz as f64 - 1.0) / 2.0)
    }

    /// Distance in pixels from the plane center past its farthest corner, plus one sample of margin.
    pub fn max_radius(&self) -> usize {
        let (x0, y0) = self.center();
        let dx = self.nx as f64 - x0;
        let dy = self.ny as f64 - y0;
        (dx * dx + dy * dy).sqrt().ceil() as usize + 1
    }
}

impl Default for Grid {
    fn default() -> Self {
        Grid::new(128, 128, 65, 100.0, 250.0)
    }
}
