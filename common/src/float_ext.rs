pub trait FloatExt {
    fn approximately_eq(self, other: Self) -> bool;

    /// Round half away from zero to `digits` decimal places.
    fn round_to(self, digits: u32) -> Self;
}

impl FloatExt for f32 {
    fn approximately_eq(self, other: Self) -> bool {
        (self - other).abs() < crate::EPSILON as f32
    }

    fn round_to(self, digits: u32) -> Self {
        (self as f64).round_to(digits) as f32
    }
}

impl FloatExt for f64 {
    fn approximately_eq(self, other: Self) -> bool {
        (self - other).abs() < crate::EPSILON
    }

    fn round_to(self, digits: u32) -> Self {
        if !self.is_finite() {
            return self;
        }
        let scale = 10f64.powi(digits as i32);
        (self * scale).round() / scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f32_approximately_eq() {
        assert!(1.0_f32.approximately_eq(1.0));
        assert!((0.1_f32 + 0.2_f32).approximately_eq(0.3));
        assert!(!1.0_f32.approximately_eq(1.001));
    }

    #[test]
    fn f64_nan_is_never_equal() {
        assert!(!f64::NAN.approximately_eq(f64::NAN));
        assert!(!f64::NAN.approximately_eq(0.0));
    }

    #[test]
    fn f64_round_to_digits() {
        assert!(0.21787.round_to(3).approximately_eq(0.218));
        assert!(1.25.round_to(1).approximately_eq(1.3));
        assert!((-1.25_f64).round_to(1).approximately_eq(-1.3));
        assert!(7.0.round_to(0).approximately_eq(7.0));
    }

    #[test]
    fn f64_round_to_keeps_non_finite() {
        assert!(f64::NAN.round_to(2).is_nan());
        assert_eq!(f64::INFINITY.round_to(2), f64::INFINITY);
    }

    #[test]
    fn f32_round_to_digits() {
        assert!(3.14159_f32.round_to(2).approximately_eq(3.14));
    }
}
