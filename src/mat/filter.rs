//! Separable Gaussian smoothing
//!
//! The kernel follows the usual vision-library construction: for
//! `sigma <= 0` the kernel sizes 1, 3, 5 and 7 use fixed binomial tables and
//! larger sizes derive sigma from the size. Borders are mirrored without
//! repeating the edge sample (`gfedcb|abcdefgh|gfedcba`).

use crate::{
    error::{BridgeError, BridgeResult},
    mat::Mat,
};

/// Widest kernel accepted by [`gaussian_kernel`]
pub const MAX_KSIZE: usize = 2049;

const SMALL_KERNELS: [&[f64]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
];

/// Sigma used for a kernel of `ksize` taps when none is given
pub fn sigma_for_ksize(ksize: usize) -> f64 {
    0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1-D Gaussian weights
///
/// # Errors
///
/// [`BridgeError::InvalidParameter`] for an even or zero `ksize`, or one
/// wider than [`MAX_KSIZE`].
///
/// # Examples
///
/// ```
/// use pixmat::mat::filter::gaussian_kernel;
///
/// assert_eq!(gaussian_kernel(3, 0.0).unwrap(), vec![0.25, 0.5, 0.25]);
///
/// let wide = gaussian_kernel(11, 0.0).unwrap();
/// assert!((wide.iter().sum::<f64>() - 1.0).abs() < 1e-12);
/// ```
pub fn gaussian_kernel(ksize: usize, sigma: f64) -> BridgeResult<Vec<f64>> {
    if ksize == 0 || ksize % 2 == 0 {
        return Err(BridgeError::InvalidParameter {
            parameter: "ksize".to_string(),
            reason:    format!("Kernel size must be a positive odd number, got {}", ksize),
        });
    }
    if ksize > MAX_KSIZE {
        return Err(BridgeError::InvalidParameter {
            parameter: "ksize".to_string(),
            reason:    format!("Kernel size {} exceeds the maximum of {}", ksize, MAX_KSIZE),
        });
    }
    if sigma <= 0.0 && ksize <= 7 {
        return Ok(SMALL_KERNELS[ksize / 2].to_vec());
    }

    let sigma = if sigma > 0.0 { sigma } else { sigma_for_ksize(ksize) };
    let scale = -0.5 / (sigma * sigma);
    let center = (ksize / 2) as f64;
    let weights: Vec<f64> = (0..ksize)
        .map(|i| {
            let x = i as f64 - center;
            (scale * x * x).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    Ok(weights.into_iter().map(|w| w / sum).collect())
}

fn reflect_101(index: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let i = index.rem_euclid(period);
    if i < len as isize { i as usize } else { (period - i) as usize }
}

/// Blurs `mat` in place with a `ksize` x `ksize` Gaussian kernel
///
/// `sigma <= 0` derives sigma from the kernel size. Results are rounded and
/// saturated to the matrix depth. An empty matrix is left untouched.
///
/// # Errors
///
/// [`BridgeError::InvalidParameter`] for an even, zero or oversized `ksize`.
pub fn gaussian_blur(mat: &mut Mat<'_>, ksize: usize, sigma: f64) -> BridgeResult<()> {
    let kernel = gaussian_kernel(ksize, sigma)?;
    if mat.is_empty() {
        return Ok(());
    }

    let rows = mat.rows();
    let cols = mat.cols();
    let channels = mat.channels();
    let depth = mat.elem_type().depth_bytes();
    let radius = (ksize / 2) as isize;

    let mut src = Vec::with_capacity(mat.total() * channels);
    for r in 0..rows {
        let row = mat.row(r);
        match depth {
            1 => src.extend(row.iter().map(|&v| v as f32)),
            _ => src.extend(
                row.chunks_exact(2)
                    .map(|w| u16::from_ne_bytes([w[0], w[1]]) as f32),
            ),
        }
    }

    let kernel: Vec<f32> = kernel.into_iter().map(|w| w as f32).collect();
    let stride = cols * channels;

    let mut horizontal = vec![0f32; src.len()];
    for r in 0..rows {
        let line = &src[r * stride..(r + 1) * stride];
        for c in 0..cols {
            for ch in 0..channels {
                let mut acc = 0f32;
                for (k, w) in kernel.iter().enumerate() {
                    let x = reflect_101(c as isize + k as isize - radius, cols);
                    acc += w * line[x * channels + ch];
                }
                horizontal[r * stride + c * channels + ch] = acc;
            }
        }
    }

    let max = if depth == 1 { u8::MAX as f32 } else { u16::MAX as f32 };
    for r in 0..rows {
        let mut out = Vec::with_capacity(stride);
        for i in 0..stride {
            let mut acc = 0f32;
            for (k, w) in kernel.iter().enumerate() {
                let y = reflect_101(r as isize + k as isize - radius, rows);
                acc += w * horizontal[y * stride + i];
            }
            out.push(acc.round().clamp(0.0, max));
        }

        let dst = mat.row_mut(r);
        match depth {
            1 => dst
                .iter_mut()
                .zip(&out)
                .for_each(|(d, v)| *d = *v as u8),
            _ => dst
                .chunks_exact_mut(2)
                .zip(&out)
                .for_each(|(d, v)| d.copy_from_slice(&(*v as u16).to_ne_bytes())),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mat::ElemType;

    #[test]
    fn test_small_kernel_tables() {
        assert_eq!(gaussian_kernel(1, 0.0).unwrap(), vec![1.0]);
        assert_eq!(gaussian_kernel(5, 0.0).unwrap(), vec![
            1.0 / 16.0,
            4.0 / 16.0,
            6.0 / 16.0,
            4.0 / 16.0,
            1.0 / 16.0
        ]);
        assert_eq!(gaussian_kernel(7, -1.0).unwrap().len(), 7);
    }

    #[test]
    fn test_derived_sigma() {
        assert!((sigma_for_ksize(9) - 1.7).abs() < 1e-12);

        let kernel = gaussian_kernel(9, 0.0).unwrap();
        assert_eq!(kernel.len(), 9);
        assert!((kernel[0] - kernel[8]).abs() < 1e-15);
        assert!(kernel[4] > kernel[3]);
    }

    #[test]
    fn test_explicit_sigma_skips_tables() {
        let kernel = gaussian_kernel(3, 2.0).unwrap();
        assert_ne!(kernel, vec![0.25, 0.5, 0.25]);
        assert!((kernel.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_even_ksize() {
        let mut mat = Mat::new(3, 3, ElemType::U8C1);
        for ksize in [0, 2, 4] {
            assert!(matches!(
                gaussian_blur(&mut mat, ksize, 0.0),
                Err(BridgeError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn test_reflect_101() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(-7, 3), 1);
        assert_eq!(reflect_101(3, 1), 0);
        assert_eq!(reflect_101(-1_000_001, 4), 1);
        assert_eq!(reflect_101(isize::MAX, 2), 1);
    }

    #[test]
    fn test_rejects_oversized_ksize() {
        assert_eq!(gaussian_kernel(MAX_KSIZE, 0.0).unwrap().len(), MAX_KSIZE);

        let mut mat = Mat::from_vec(1, 1, ElemType::U8C1, vec![7], 1).unwrap();
        for ksize in [MAX_KSIZE + 2, usize::MAX] {
            assert!(matches!(
                gaussian_blur(&mut mat, ksize, 0.0),
                Err(BridgeError::InvalidParameter { .. })
            ));
        }
        assert_eq!(mat.row(0), &[7]);
    }

    #[test]
    fn test_constant_image_unchanged() {
        let mut mat = Mat::from_vec(4, 4, ElemType::U8C3, vec![77; 48], 12).unwrap();
        gaussian_blur(&mut mat, 5, 0.0).unwrap();
        assert!(mat.data().iter().all(|&b| b == 77));
    }

    #[test]
    fn test_impulse_spreads_symmetrically() {
        let mut mat = Mat::new(7, 7, ElemType::U8C1);
        mat.row_mut(3)[3] = 255;
        gaussian_blur(&mut mat, 3, 0.0).unwrap();

        // 255 * 0.5 * 0.5
        assert_eq!(mat.pixel(3, 3), &[64]);
        assert_eq!(mat.pixel(3, 2), mat.pixel(3, 4));
        assert_eq!(mat.pixel(2, 3), mat.pixel(4, 3));
        assert_eq!(mat.pixel(2, 2), mat.pixel(4, 4));
        assert_eq!(mat.pixel(0, 0), &[0]);
    }

    #[test]
    fn test_u16_depth() {
        let mut data = Vec::new();
        for v in [0u16, 65535, 0] {
            data.extend_from_slice(&v.to_ne_bytes());
        }
        let mut mat = Mat::from_vec(1, 3, ElemType::U16C1, data, 6).unwrap();
        gaussian_blur(&mut mat, 3, 0.0).unwrap();

        // Reflected left border sees 65535 on both sides
        assert_eq!(mat.pixel_u16(0, 0).unwrap(), vec![32768]);
        assert_eq!(mat.pixel_u16(0, 1).unwrap(), vec![32768]);
    }

    #[test]
    fn test_blur_detaches_view() {
        let bytes = vec![0u8, 0, 255, 0, 0];
        let mut mat = Mat::view(1, 5, ElemType::U8C1, &bytes, 5).unwrap();
        gaussian_blur(&mut mat, 3, 0.0).unwrap();
        assert_eq!(mat.row(0), &[0, 64, 128, 64, 0]);
        assert_eq!(bytes, vec![0, 0, 255, 0, 0]);
    }
}
