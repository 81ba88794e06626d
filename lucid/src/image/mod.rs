//! Image buffers and the RGB pixel type.

mod stats;

pub use stats::ImageStats;

use std::ops::{Add, Index, IndexMut, Mul, Sub};

use bytemuck::{Pod, Zeroable};

use crate::error::{Error, Result};
use crate::simd;

/// Rec. 601 luma weights.
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Three-channel color with normalized channels.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    #[inline]
    pub const fn gray(v: f32) -> Self {
        Self { r: v, g: v, b: v }
    }

    #[inline]
    pub fn luminance(&self) -> f32 {
        LUMA_R * self.r + LUMA_G * self.g + LUMA_B * self.b
    }

    /// Every channel clamped to [0, 1].
    #[inline]
    pub fn clamped(&self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
        }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }

    /// Four-lane view `[r, g, b, 0]` for the batch kernels.
    #[inline]
    pub fn to_lanes(&self) -> [f32; 4] {
        [self.r, self.g, self.b, 0.0]
    }

    #[inline]
    pub fn from_lanes(lanes: [f32; 4]) -> Self {
        Self::new(lanes[0], lanes[1], lanes[2])
    }
}

impl Add for Rgb {
    type Output = Rgb;

    #[inline]
    fn add(self, rhs: Rgb) -> Rgb {
        Rgb::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl Sub for Rgb {
    type Output = Rgb;

    #[inline]
    fn sub(self, rhs: Rgb) -> Rgb {
        Rgb::new(self.r - rhs.r, self.g - rhs.g, self.b - rhs.b)
    }
}

impl Mul<f32> for Rgb {
    type Output = Rgb;

    #[inline]
    fn mul(self, rhs: f32) -> Rgb {
        Rgb::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}

/// Dense row-major 2D buffer.
///
/// Dimensions are fixed at construction. Indexing outside the image panics;
/// use [`Image::get_clamped`] for neighborhood reads that may cross the border.
#[derive(Debug, Clone, PartialEq)]
pub struct Image<T> {
    pixels: Vec<T>,
    width: usize,
    height: usize,
}

impl<T> Image<T> {
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<T>) -> Self {
        assert_eq!(
            pixels.len(),
            width * height,
            "pixels length must equal width * height"
        );
        Self {
            pixels,
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &T {
        debug_assert!(self.contains(x, y));
        &self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        debug_assert!(self.contains(x, y));
        &mut self.pixels[y * self.width + x]
    }

    /// Pixel at `(x, y)` with both coordinates clamped into the image.
    #[inline]
    pub fn get_clamped(&self, x: isize, y: isize) -> &T {
        debug_assert!(!self.is_empty());
        let cx = x.clamp(0, self.width as isize - 1) as usize;
        let cy = y.clamp(0, self.height as isize - 1) as usize;
        &self.pixels[cy * self.width + cx]
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        let start = y * self.width;
        &self.pixels[start..start + self.width]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let start = y * self.width;
        &mut self.pixels[start..start + self.width]
    }

    #[inline]
    pub fn pixels(&self) -> &[T] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [T] {
        &mut self.pixels
    }

    #[inline]
    pub fn into_pixels(self) -> Vec<T> {
        self.pixels
    }

    /// New image of the same size with `f` applied to every pixel.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Image<U> {
        Image {
            pixels: self.pixels.iter().map(f).collect(),
            width: self.width,
            height: self.height,
        }
    }
}

impl<T: Clone> Image<T> {
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            pixels: vec![value; width * height],
            width,
            height,
        }
    }
}

impl<T: Default + Clone> Image<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, T::default())
    }
}

impl<T> Index<(usize, usize)> for Image<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        &self.pixels[y * self.width + x]
    }
}

impl<T> IndexMut<(usize, usize)> for Image<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Self::Output {
        &mut self.pixels[y * self.width + x]
    }
}

impl Image<Rgb> {
    /// Decode packed 8-bit RGB into normalized floats.
    pub fn from_rgb8(width: usize, height: usize, bytes: &[u8]) -> Result<Self> {
        let expected = width * height * 3;
        if bytes.len() != expected {
            return Err(Error::PixelCount {
                expected,
                actual: bytes.len(),
            });
        }

        let mut image = Self::new(width, height);
        simd::u8_to_f32_normalized(bytes, image.channels_mut());
        Ok(image)
    }

    /// Encode to packed 8-bit RGB, rounding and saturating each channel.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.len() * 3];
        simd::f32_normalized_to_u8(self.channels(), &mut bytes);
        bytes
    }

    /// Interleaved channel view.
    #[inline]
    pub fn channels(&self) -> &[f32] {
        bytemuck::cast_slice(&self.pixels)
    }

    #[inline]
    pub fn channels_mut(&mut self) -> &mut [f32] {
        bytemuck::cast_slice_mut(&mut self.pixels)
    }

    pub fn luminance(&self) -> Image<f32> {
        self.map(Rgb::luminance)
    }

    pub fn clamp_in_place(&mut self) {
        for v in self.channels_mut() {
            *v = v.clamp(0.0, 1.0);
        }
    }
}
