//! Integration tests for the Gaussian blur entry points
//!
//! Checks the behavioural properties of the blur rather than exact pixel
//! values: identity for non-positive radii, determinism, symmetry and
//! smoothing that grows with the radius.

mod common;

use common::{noise_image, solid_image, variance};
use pixmat::{
    blur::{blur_kernel_size, gaussian_blur_image, gaussian_blur_mat, gaussian_blur_pixmap},
    buffer::{ImageBuffer, Pixmap},
    convert::image_to_mat,
    image_mat::ImageMat,
    mat::{ElemType, Mat},
    model::PixelFormat,
};

#[test]
fn test_kernel_size_is_two_r_plus_one() {
    for radius in 1..20 {
        assert_eq!(blur_kernel_size(radius), Some(radius as usize * 2 + 1));
    }
}

#[test]
fn test_non_positive_radius_is_identity() {
    let img = noise_image(16, 16, PixelFormat::Rgb888, 1);

    for radius in [0, -1, -100] {
        let out = gaussian_blur_image(&img, radius);
        assert_eq!(out.bits(), img.bits());

        let mat = gaussian_blur_mat(image_to_mat(&img), radius);
        assert_eq!(mat.clone_owned().data(), image_to_mat(&img).clone_owned().data());

        let pixmap = Pixmap::from_image(&img);
        assert_eq!(gaussian_blur_pixmap(&pixmap, radius).image().bits(), pixmap.image().bits());

        let mut wrapper = ImageMat::from_image(img.clone());
        wrapper.gaussian_blur(radius);
        assert_eq!(wrapper.image().bits(), img.bits());
    }
}

#[test]
fn test_blur_is_deterministic() {
    let img = noise_image(32, 24, PixelFormat::Argb32, 2);
    let a = gaussian_blur_image(&img, 3);
    let b = gaussian_blur_image(&img, 3);
    assert_eq!(a.bits(), b.bits());
}

#[test]
fn test_variance_decreases_with_radius() {
    let img = noise_image(128, 128, PixelFormat::Grayscale8, 3);
    let mut previous = variance(&image_to_mat(&img));

    for radius in 1..=5 {
        let blurred = gaussian_blur_image(&img, radius);
        let current = variance(&image_to_mat(&blurred));
        assert!(
            current < previous,
            "radius {}: variance {} did not drop below {}",
            radius,
            current,
            previous
        );
        previous = current;
    }
}

#[test]
fn test_extent_grows_with_radius() {
    let mut img = ImageBuffer::new(41, 1, PixelFormat::Grayscale8);
    img.pixel_mut(20, 0).unwrap()[0] = 255;

    let reach = |radius: i32| {
        let out = gaussian_blur_image(&img, radius);
        (0..41u32)
            .filter(|&x| out.pixel(x, 0).unwrap()[0] > 0)
            .count()
    };
    assert!(reach(1) < reach(3));
    assert!(reach(3) < reach(6));
}

#[test]
fn test_impulse_blur_is_symmetric() {
    let mut mat = Mat::new(21, 21, ElemType::U8C3);
    mat.row_mut(10)[30..33].copy_from_slice(&[255, 128, 64]);
    let mat = gaussian_blur_mat(mat, 4);

    for d in 1..=8 {
        assert_eq!(mat.pixel(10, 10 - d), mat.pixel(10, 10 + d));
        assert_eq!(mat.pixel(10 - d, 10), mat.pixel(10 + d, 10));
        assert_eq!(mat.pixel(10 - d, 10 - d), mat.pixel(10 + d, 10 + d));
    }
}

#[test]
fn test_constant_image_is_fixed_point() {
    let img = solid_image(9, 9, PixelFormat::Rgb888, &[10, 200, 90]);
    let out = gaussian_blur_image(&img, 6);
    assert_eq!(out.packed_rows(), img.packed_rows());
}

#[test]
fn test_blur_sixteen_bit() {
    let words = [1000u16, 20000, 40000, 65535];
    let pixel: Vec<u8> = words.iter().flat_map(|w| w.to_ne_bytes()).collect();
    let img = solid_image(5, 5, PixelFormat::Rgba64, &pixel);

    let out = gaussian_blur_image(&img, 2);
    assert_eq!(out.format(), PixelFormat::Rgba64);
    assert_eq!(out.packed_rows(), img.packed_rows());
}

#[test]
fn test_blur_view_leaves_source_alone() {
    let img = noise_image(10, 10, PixelFormat::Argb32, 4);
    let before = img.bits().to_vec();

    let mat = gaussian_blur_mat(image_to_mat(&img), 2);
    assert!(!mat.is_view());
    assert_eq!(img.bits(), before.as_slice());
}

#[test]
fn test_wrapper_blur_chains() {
    let img = noise_image(20, 20, PixelFormat::Rgb888, 5);
    let mut once = ImageMat::from_image(img.clone());
    once.gaussian_blur(1);

    let mut twice = ImageMat::from_image(img.clone());
    twice.gaussian_blur(1).gaussian_blur(1);

    let v0 = variance(&image_to_mat(&img));
    let v1 = variance(&image_to_mat(once.image()));
    let v2 = variance(&image_to_mat(twice.image()));
    assert!(v2 < v1 && v1 < v0);
    assert_eq!(twice.image().format(), PixelFormat::Rgb888);
}
