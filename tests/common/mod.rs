//! Shared test utilities for integration tests

#![allow(dead_code)]

use std::{
    io,
    sync::{Arc, Mutex},
};

use pixmat::{buffer::ImageBuffer, mat::Mat, model::PixelFormat};
use tracing_subscriber::fmt::MakeWriter;

/// Deterministic xorshift byte stream
pub struct Noise(u64);

impl Noise {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub fn next_byte(&mut self) -> u8 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        (self.0 >> 24) as u8
    }

    pub fn bytes(&mut self, len: usize) -> Vec<u8> {
        (0..len).map(|_| self.next_byte()).collect()
    }
}

/// Buffer of `format` filled with pseudo-random bytes
pub fn noise_image(width: u32, height: u32, format: PixelFormat, seed: u64) -> ImageBuffer {
    let len = format.min_bytes_per_line(width) * height as usize;
    let packed = Noise::new(seed).bytes(len);
    ImageBuffer::from_packed(width, height, format, &packed).unwrap()
}

/// Buffer of `format` where every pixel has the same bytes
pub fn solid_image(width: u32, height: u32, format: PixelFormat, pixel: &[u8]) -> ImageBuffer {
    let packed: Vec<u8> = pixel
        .iter()
        .copied()
        .cycle()
        .take(pixel.len() * (width * height) as usize)
        .collect();
    ImageBuffer::from_packed(width, height, format, &packed).unwrap()
}

/// Population variance of every 8-bit sample in the matrix
pub fn variance(mat: &Mat<'_>) -> f64 {
    let samples: Vec<f64> = (0..mat.rows())
        .flat_map(|r| mat.row(r).iter().map(|&v| v as f64))
        .collect();
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

/// In-memory log sink shared between the subscriber and the test
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Runs `f` with a debug-level subscriber on this thread and returns the
/// formatted log output
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .with_writer(buffer.clone())
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, buffer.contents())
}

/// Lines logged at WARN level
pub fn warnings(logs: &str) -> Vec<&str> {
    logs.lines().filter(|line| line.contains("WARN")).collect()
}
