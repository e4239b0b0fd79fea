#![allow(dead_code)]

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageFormat, Rgb, RgbImage};
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

pub fn noise_image(width: u32, height: u32, seed: u32) -> RgbImage {
    let mut state = seed | 1;
    RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state & 0xFF) as u8
        };
        Rgb([next(), next(), next()])
    })
}

pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

pub fn png_bytes(image: RgbImage) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

pub fn jpeg_bytes(image: &RgbImage, quality: u8) -> Vec<u8> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .encode(image.as_raw(), image.width(), image.height(), ExtendedColorType::Rgb8)
        .unwrap();
    buffer
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    File::create(&path).unwrap().write_all(bytes).unwrap();
    path
}

/// A directory with two real images, one corrupt JPEG and a text file.
pub fn create_mixed_upload(dir: &Path) -> Vec<PathBuf> {
    vec![
        write_file(dir, "a.png", &png_bytes(noise_image(160, 120, 7))),
        write_file(dir, "b.jpg", &jpeg_bytes(&gradient_image(200, 150), 95)),
        write_file(dir, "broken.jpg", b"\xFF\xD8\xFFnot really a jpeg"),
        write_file(dir, "notes.txt", b"not an image"),
    ]
}
