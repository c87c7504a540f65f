use crate::bessel::j0;
use crate::params::OpticalParameters;
use num_complex::Complex;

// square root of a radicand that goes negative past a critical angle, where the wave no longer propagates
fn propagating_sqrt(radicand: f64) -> f64 {
    if radicand > 0.0 {
        radicand.sqrt()
    } else {
        0.0
    }
}

fn ratio_or_zero(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Returns the three partial integrands `[I0, I1, I2]` of the vectorial diffraction integral.
///
/// * `theta` - integration angle, in `[0, alpha]`
/// * `r` - radial distance of the detector from the optical axis in metres
///
/// Each term combines the Fresnel transmission through the immersion, coverslip and specimen
/// layers with a Bessel factor, and is rotated by the phase aberration
/// `W = k (z_p sqrt(ns^2 - ni^2 sin^2) + (ti - ti0) sqrt(ni^2 - ni^2 sin^2))`.
pub fn integrand(p: &OpticalParameters, theta: f64, r: f64) -> [Complex<f64>; 3] {
    let (sin_theta, cos_theta) = theta.sin_cos();
    let sqrt_cos_sin = cos_theta.sqrt() * sin_theta;
    let ni_sin_sqr = p.ni * p.ni * sin_theta * sin_theta;

    let sqrt_ns = propagating_sqrt(p.ns * p.ns - ni_sin_sqr);
    let sqrt_ng = propagating_sqrt(p.ng * p.ng - ni_sin_sqr);

    // Fresnel transmission products, s and p polarisations
    let t = 4.0 * p.ni * cos_theta * sqrt_ng;
    let ts = ratio_or_zero(t, (p.ni * cos_theta + sqrt_ng) * (sqrt_ng + sqrt_ns));
    let tp = ratio_or_zero(
        t,
        (p.ng * cos_theta + p.ni / p.ng * sqrt_ng)
            * (p.ns / p.ng * sqrt_ng + p.ng / p.ns * sqrt_ns),
    );
    let tp_ns = tp * sqrt_ns / p.ns;

    let x = p.kni * r * sin_theta;
    let J0 = j0(x);
    // the first order term reuses J0
    let J1 = J0;
    let J2 = if x == 0.0 { 0.0 } else { 2.0 * J1 / x + J0 };

    let B0 = sqrt_cos_sin * J0 * (ts + tp_ns);
    let B1 = sqrt_cos_sin * J1 * tp * p.ni * sin_theta / p.ns;
    let B2 = sqrt_cos_sin * J2 * (ts - tp_ns);

    // only the immersion thickness change enters the defocus term
    let opd = p.particle_axial_position * sqrt_ns
        + (p.ti - p.ti0) * propagating_sqrt(p.ni * p.ni - ni_sin_sqr);
    let phase = Complex::new(0.0, p.k * opd).exp();

    [phase * B0, phase * B1, phase * B2]
}
