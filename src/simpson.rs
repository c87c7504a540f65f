use crate::integrand::integrand;
use crate::params::OpticalParameters;
use num_complex::Complex;

/// Relative change between consecutive refinements that counts as stable.
pub const TOLERANCE: f64 = 1e-1;

/// Hard cap on the number of grid refinements.
pub const MAX_ITERATIONS: usize = 10_000;

/// Result of one radial integration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Integral {
    /// `(|I0|^2 + 2|I1|^2 + |I2|^2) * del^2` for the final composite Simpson sums.
    pub intensity: f64,
    /// Number of grids evaluated, including the initial three point grid.
    pub iterations: usize,
    /// False if the iteration cap was hit before enough stable refinements were seen.
    pub converged: bool,
}

/// Radial intensity at `r` metres from the optical axis.
pub fn integrate(p: &OpticalParameters, r: f64) -> f64 {
    integrate_detailed(p, r).intensity
}

/// Composite Simpson integration of the three partial integrals over `[0, b]`, doubling the
/// number of sub-intervals until the combined intensity changes by less than [`TOLERANCE`]
/// for `K` consecutive refinements, `K` being set by the accuracy level.
///
/// Every refinement folds the previous odd samples into the even sum, so only the new
/// midpoints are evaluated.
pub fn integrate_detailed(p: &OpticalParameters, r: f64) -> Integral {
    let required = p.accuracy.required_stable();
    let zero = Complex::new(0.0, 0.0);

    let a = 0.0;
    let b = p.integration_limit();
    let mut n: usize = 2;
    let mut del = b / 2.0;

    let value_a = integrand(p, a, r);
    let value_b = integrand(p, b, r);
    let mut sum_odd = integrand(p, b / 2.0, r);
    let mut sum_even = [zero; 3];

    let combine = |sum_even: &[Complex<f64>; 3], sum_odd: &[Complex<f64>; 3], del: f64| {
        let mut sums = [zero; 3];
        for m in 0..3 {
            sums[m] = value_a[m] + sum_even[m] * 2.0 + sum_odd[m] * 4.0 + value_b[m];
        }
        (sums[0].norm_sqr() + 2.0 * sums[1].norm_sqr() + sums[2].norm_sqr()) * del * del
    };

    let mut cur = combine(&sum_even, &sum_odd, del);
    let mut prev = cur;
    let mut stable = 0;
    let mut iterations = 1;

    while stable < required && iterations < MAX_ITERATIONS {
        n = match n.checked_mul(2) {
            Some(n) => n,
            None => break,
        };
        iterations += 1;
        del /= 2.0;

        for m in 0..3 {
            sum_even[m] += sum_odd[m];
            sum_odd[m] = zero;
        }
        for k in (1..n).step_by(2) {
            let value = integrand(p, k as f64 * del, r);
            for m in 0..3 {
                sum_odd[m] += value[m];
            }
        }

        cur = combine(&sum_even, &sum_odd, del);

        let difference = if prev == 0.0 {
            ((prev - cur) / 1e-5).abs()
        } else {
            ((prev - cur) / cur).abs()
        };
        if difference <= TOLERANCE {
            stable += 1;
        } else {
            stable = 0;
        }
        prev = cur;
    }

    let converged = stable >= required;
    if !converged {
        log::debug!(
            "integral at r = {:e} m not stable after {} refinements, keeping last estimate",
            r,
            iterations
        );
    }

    Integral {
        intensity: cur,
        iterations,
        converged,
    }
}
