/// Bessel function of the first kind, order 0.
///
/// Rational approximation below |x| = 8 and the asymptotic phase/amplitude form above it.
/// Absolute error is of order 1e-8 over the whole real line.
pub fn j0(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 8.0 {
        let y = x * x;
        let num = 57568490574.0
            + y * (-13362590354.0
                + y * (651619640.7 + y * (-11214424.18 + y * (77392.33017 + y * (-184.9052456)))));
        let den = 57568490411.0
            + y * (1029532985.0 + y * (9494680.718 + y * (59272.64853 + y * (267.8532712 + y))));
        num / den
    } else {
        let z = 8.0 / ax;
        let y = z * z;
        let xx = ax - 0.785398164;
        let p = 1.0
            + y * (-0.1098628627e-2
                + y * (0.2734510407e-4 + y * (-0.2073370639e-5 + y * 0.2093887211e-6)));
        let q = -0.1562499995e-1
            + y * (0.1430488765e-3
                + y * (-0.6911147651e-5 + y * (0.7621095161e-6 - y * 0.934935152e-7)));
        (0.636619772 / ax).sqrt() * (xx.cos() * p - z * xx.sin() * q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn j0_reference_values() {
        assert_abs_diff_eq!(j0(0.0), 1.0, epsilon = 1e-7);
        assert_abs_diff_eq!(j0(1.0), 0.765_197_686_557_966_6, epsilon = 1e-7);
        assert_abs_diff_eq!(j0(5.0), -0.177_596_771_314_338_3, epsilon = 1e-7);
        assert_abs_diff_eq!(j0(10.0), -0.245_935_764_451_348_3, epsilon = 1e-7);
        assert_abs_diff_eq!(j0(50.0), 0.055_812_327_669_251_6, epsilon = 1e-7);
    }

    #[test]
    fn j0_is_even() {
        for &x in &[0.3, 2.5, 7.9, 8.1, 31.0] {
            assert_eq!(j0(x), j0(-x));
        }
    }

    #[test]
    fn j0_first_zero() {
        let first_zero = 2.404_825_557_695_773;
        assert_abs_diff_eq!(j0(first_zero), 0.0, epsilon = 1e-7);
        assert!(j0(first_zero - 0.01) > 0.0);
        assert!(j0(first_zero + 0.01) < 0.0);
    }
}
