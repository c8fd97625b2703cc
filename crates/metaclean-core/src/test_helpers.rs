//! Builders for in-memory test images.

use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;

/// A small gradient so encoders have something non-trivial to compress.
fn gradient(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 31 % 256) as u8, (y * 17 % 256) as u8, ((x + y) * 7 % 256) as u8])
    });
    DynamicImage::ImageRgb8(img)
}

fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), ImageFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), ImageFormat::Jpeg)
}

pub fn tiff_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), ImageFormat::Tiff)
}

pub fn webp_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), ImageFormat::WebP)
}

pub fn gif_bytes() -> Vec<u8> {
    encode(&gradient(2, 2), ImageFormat::Gif)
}

/// Degrees/minutes/seconds rationals for one axis, with its hemisphere letter.
pub type GpsAxis = (u8, [(u32, u32); 3]);

/// Big-endian TIFF structure holding only a GPS IFD with lat/lon and refs.
pub fn gps_exif_raw(latitude: GpsAxis, longitude: GpsAxis) -> Vec<u8> {
    fn entry(out: &mut Vec<u8>, tag: u16, typ: u16, count: u32, value: [u8; 4]) {
        out.extend_from_slice(&tag.to_be_bytes());
        out.extend_from_slice(&typ.to_be_bytes());
        out.extend_from_slice(&count.to_be_bytes());
        out.extend_from_slice(&value);
    }
    const ASCII: u16 = 2;
    const LONG: u16 = 4;
    const RATIONAL: u16 = 5;
    // Layout: header(8) IFD0(2+12+4) GPS IFD(2+4*12+4) lat(24) lon(24)
    const GPS_IFD: u32 = 26;
    const LAT_DATA: u32 = 80;
    const LON_DATA: u32 = 104;

    let mut out = Vec::new();
    out.extend_from_slice(b"MM\x00\x2a");
    out.extend_from_slice(&8u32.to_be_bytes());

    out.extend_from_slice(&1u16.to_be_bytes());
    entry(&mut out, 0x8825, LONG, 1, GPS_IFD.to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes());

    out.extend_from_slice(&4u16.to_be_bytes());
    entry(&mut out, 0x0001, ASCII, 2, [latitude.0, 0, 0, 0]);
    entry(&mut out, 0x0002, RATIONAL, 3, LAT_DATA.to_be_bytes());
    entry(&mut out, 0x0003, ASCII, 2, [longitude.0, 0, 0, 0]);
    entry(&mut out, 0x0004, RATIONAL, 3, LON_DATA.to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes());

    for (num, denom) in latitude.1.iter().chain(longitude.1.iter()) {
        out.extend_from_slice(&num.to_be_bytes());
        out.extend_from_slice(&denom.to_be_bytes());
    }
    debug_assert_eq!(out.len(), 128);
    out
}

/// Insert an APP1 Exif segment right after the SOI marker of a fresh JPEG.
pub fn jpeg_with_exif(tiff: &[u8]) -> Vec<u8> {
    let jpeg = jpeg_bytes(8, 8);
    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(tiff);

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// A JPEG whose EXIF carries the given decimal position.
pub fn jpeg_with_gps(latitude: f64, longitude: f64) -> Vec<u8> {
    fn axis(value: f64, positive: u8, negative: u8) -> GpsAxis {
        let hemisphere = if value < 0.0 { negative } else { positive };
        let value = value.abs();
        let degrees = value.trunc();
        let minutes = ((value - degrees) * 60.0).trunc();
        let seconds = ((value - degrees) * 60.0 - minutes) * 60.0;
        (
            hemisphere,
            [
                (degrees as u32, 1),
                (minutes as u32, 1),
                ((seconds * 10_000.0).round() as u32, 10_000),
            ],
        )
    }
    jpeg_with_exif(&gps_exif_raw(
        axis(latitude, b'N', b'S'),
        axis(longitude, b'E', b'W'),
    ))
}
