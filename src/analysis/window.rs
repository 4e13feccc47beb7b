//! Analysis window functions.

use std::f32::consts::PI;

/// Classic Blackman window (alpha = 0.16)
pub fn blackman_window(index: usize, size: usize) -> f32 {
    const A0: f32 = 0.42;
    const A1: f32 = 0.5;
    const A2: f32 = 0.08;

    let phase = 2.0 * PI * index as f32 / size as f32;
    A0 - A1 * phase.cos() + A2 * (2.0 * phase).cos()
}

/// Pre-computed window coefficients
pub fn blackman_coefficients(size: usize) -> Vec<f32> {
    (0..size).map(|i| blackman_window(i, size)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blackman_window() {
        let size = 2048;

        // Blackman window is ~0 at the start and 1 at the center
        assert!(blackman_window(0, size).abs() < 1e-6);
        assert!((blackman_window(size / 2, size) - 1.0).abs() < 1e-5);

        let coefficients = blackman_coefficients(size);
        assert_eq!(coefficients.len(), size);
        assert!(coefficients.iter().all(|&c| (-1e-6..=1.0 + 1e-6).contains(&c)));
    }
}
