//! Feedback matrix for the FDN reverb.
//!
//! Hadamard sign pattern: entry `(i, j)` is positive when
//! `popcount(i & j)` is even, negative otherwise, scaled by `1/sqrt(n)`
//! so the mix conserves energy. Requires `n` to be a power of two.

/// Build the normalized Hadamard-sign matrix, flattened row-major.
pub fn hadamard_sign(n: usize) -> Vec<f32> {
    assert!(n > 0 && (n & (n - 1)) == 0, "n must be power of 2, got {n}");
    let scale = 1.0 / (n as f32).sqrt();
    let mut m = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            m[i * n + j] = if (i & j).count_ones() % 2 == 0 {
                scale
            } else {
                -scale
            };
        }
    }
    m
}
