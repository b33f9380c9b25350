//! In-place radix-2 Cooley-Tukey FFT used by the spectrogram front-end.

use std::f64::consts::PI;

/// Performs an in-place radix-2 FFT.
/// `real` and `imag` must share the same power-of-2 length.
pub fn fft(real: &mut [f64], imag: &mut [f64]) {
    let n = real.len();
    debug_assert_eq!(n, imag.len());
    if n <= 1 {
        return;
    }

    // Bit-reversal permutation.
    let mut j = 0usize;
    for i in 0..n - 1 {
        if i < j {
            real.swap(i, j);
            imag.swap(i, j);
        }
        let mut k = n >> 1;
        while k <= j {
            j -= k;
            k >>= 1;
        }
        j += k;
    }

    // Butterfly passes.
    let mut size = 2;
    while size <= n {
        let half = size >> 1;
        let angle = -2.0 * PI / size as f64;
        let step_r = angle.cos();
        let step_i = angle.sin();

        let mut start = 0;
        while start < n {
            let (mut w_r, mut w_i) = (1.0, 0.0);
            for k in 0..half {
                let u = start + k;
                let v = u + half;

                let t_r = w_r * real[v] - w_i * imag[v];
                let t_i = w_r * imag[v] + w_i * real[v];

                real[v] = real[u] - t_r;
                imag[v] = imag[u] - t_i;
                real[u] += t_r;
                imag[u] += t_i;

                let next_r = w_r * step_r - w_i * step_i;
                let next_i = w_r * step_i + w_i * step_r;
                w_r = next_r;
                w_i = next_i;
            }
            start += size;
        }
        size <<= 1;
    }
}
