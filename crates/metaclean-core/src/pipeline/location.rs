//! GPS location extraction from EXIF metadata.

use exif::{Exif, In, Reader, Tag, Value};
use std::io::Cursor;

use crate::types::Coordinate;

/// Extracts a geographic position from an encoded image.
pub trait LocationExtractor: Send + Sync {
    /// Return the position recorded in `data`, or `None` when there is none.
    ///
    /// Never fails: unreadable metadata is the same as absent metadata.
    fn extract(&self, data: &[u8]) -> Option<Coordinate>;
}

/// [`LocationExtractor`] reading the EXIF GPS IFD.
///
/// Works on any container `kamadak-exif` understands: JPEG, TIFF, PNG, WebP
/// and HEIF.
pub struct ExifLocationExtractor;

impl LocationExtractor for ExifLocationExtractor {
    fn extract(&self, data: &[u8]) -> Option<Coordinate> {
        let mut cursor = Cursor::new(data);
        let exif = Reader::new().read_from_container(&mut cursor).ok()?;

        let latitude = get_gps_coord(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, b'S')?;
        let longitude = get_gps_coord(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, b'W')?;
        Some(Coordinate::new(latitude, longitude))
    }
}

/// Get GPS coordinate, converting from degrees/minutes/seconds to decimal.
///
/// `negative_ref` is the hemisphere letter that flips the sign (`S` or `W`).
fn get_gps_coord(exif: &Exif, coord_tag: Tag, ref_tag: Tag, negative_ref: u8) -> Option<f64> {
    let coord = exif.get_field(coord_tag, In::PRIMARY)?;
    let reference = exif.get_field(ref_tag, In::PRIMARY)?;

    let degrees = parse_gps_rationals(&coord.value)?;
    let hemisphere = match &reference.value {
        Value::Ascii(parts) => parts.first().and_then(|p| p.first()).copied()?,
        _ => return None,
    };

    let sign = if hemisphere.eq_ignore_ascii_case(&negative_ref) {
        -1.0
    } else {
        1.0
    };
    Some(sign * degrees)
}

/// Parse GPS rationals (degrees, minutes, seconds) to decimal degrees.
fn parse_gps_rationals(value: &Value) -> Option<f64> {
    match value {
        Value::Rational(rationals) if rationals.len() >= 3 => {
            if rationals.iter().take(3).any(|r| r.denom == 0) {
                return None;
            }
            let degrees = rationals[0].to_f64();
            let minutes = rationals[1].to_f64();
            let seconds = rationals[2].to_f64();
            Some(degrees + minutes / 60.0 + seconds / 3600.0)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{jpeg_bytes, jpeg_with_exif, jpeg_with_gps, png_bytes};

    #[test]
    fn test_extract_north_east() {
        let data = jpeg_with_gps(48.8584, 2.2945);
        assert_eq!(
            ExifLocationExtractor.extract(&data),
            Some(Coordinate::new(48.8584, 2.2945))
        );
    }

    #[test]
    fn test_extract_south_west_is_negative() {
        let data = jpeg_with_gps(-33.8568, -151.2153);
        assert_eq!(
            ExifLocationExtractor.extract(&data),
            Some(Coordinate::new(-33.8568, -151.2153))
        );
    }

    #[test]
    fn test_extract_without_exif() {
        assert!(ExifLocationExtractor.extract(&jpeg_bytes(8, 8)).is_none());
        assert!(ExifLocationExtractor.extract(&png_bytes(8, 8)).is_none());
    }

    #[test]
    fn test_extract_from_garbage() {
        assert!(ExifLocationExtractor.extract(b"").is_none());
        assert!(ExifLocationExtractor.extract(b"not an image").is_none());
    }

    #[test]
    fn test_extract_with_zero_denominator() {
        let data = jpeg_with_exif(&crate::test_helpers::gps_exif_raw(
            (b'N', [(48, 1), (51, 1), (30, 0)]),
            (b'E', [(2, 1), (17, 1), (40, 1)]),
        ));
        assert!(ExifLocationExtractor.extract(&data).is_none());
    }

    #[test]
    fn test_parse_gps_rationals() {
        let value = Value::Rational(vec![(10, 1).into(), (30, 1).into(), (36, 1).into()]);
        let parsed = parse_gps_rationals(&value).unwrap();
        assert!((parsed - 10.51).abs() < 1e-9);

        assert!(parse_gps_rationals(&Value::Rational(vec![(10, 1).into()])).is_none());
        assert!(parse_gps_rationals(&Value::Short(vec![1, 2, 3])).is_none());
    }
}
