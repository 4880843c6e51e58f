//! Uncompressed BMP loading.
//!
//! Only true-colour bitmaps are supported: 24 or 32 bits per pixel, no
//! compression. The on-disk layout is two packed little-endian headers —
//! a 14-byte file header whose `BM` magic identifies the format and whose
//! final field is the offset of the pixel data, followed by a 40-byte info
//! header carrying the dimensions, bit depth and compression type — and
//! then rows of B,G,R(,A) bytes, each row padded to a multiple of four
//! bytes. A negative height means the rows are stored top-down; a positive
//! height means bottom-up. The output is normalised to top-down RGBA
//! either way.

use std::fmt;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::geometry::Mesh;

const FILE_HEADER_SIZE: usize = 14;
const INFO_HEADER_SIZE: usize = 40;
const BMP_MAGIC: u16 = 0x4D42;

/// A true-colour pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// A decoded bitmap: top-down rows of RGBA pixels.
#[derive(Debug)]
pub struct Bitmap {
    pub width: i32,
    pub height: i32,
    pub pixels: Vec<Rgba>,
}

impl Bitmap {
    /// Builds a bitmap directly from pixels (top-down row-major order).
    ///
    /// # Panics
    /// Panics if the pixel count does not match the dimensions.
    pub fn from_pixels(width: i32, height: i32, pixels: Vec<Rgba>) -> Self {
        assert_eq!(pixels.len(), (width * height) as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Texel at (x, y), counting rows from the top.
    #[inline]
    pub fn texel(&self, x: i32, y: i32) -> Rgba {
        self.pixels[(y * self.width + x) as usize]
    }
}

#[derive(Debug)]
pub enum BitmapLoadError {
    Io(std::io::Error),
    /// The `BM` magic number is missing.
    NotABitmap,
    /// The compression type field is non-zero.
    Compressed,
    /// Bits per pixel other than 24 or 32.
    UnsupportedDepth(u16),
    /// Width or height of zero (or negative width).
    InvalidDimensions,
    /// The file ends before the headers or the pixel data do.
    Truncated,
}

impl fmt::Display for BitmapLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "bitmap i/o error: {err}"),
            Self::NotABitmap => write!(f, "missing BM magic number"),
            Self::Compressed => write!(f, "compressed bitmaps are not supported"),
            Self::UnsupportedDepth(bpp) => {
                write!(f, "{bpp} bits per pixel is not true colour (24 or 32)")
            }
            Self::InvalidDimensions => write!(f, "bitmap dimensions are invalid"),
            Self::Truncated => write!(f, "file is shorter than its headers claim"),
        }
    }
}

impl std::error::Error for BitmapLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BitmapLoadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn read_i32(data: &[u8], offset: usize) -> i32 {
    read_u32(data, offset) as i32
}

/// Decode a BMP image from raw file bytes.
pub fn parse_bitmap(data: &[u8]) -> Result<Bitmap, BitmapLoadError> {
    if data.len() < FILE_HEADER_SIZE + INFO_HEADER_SIZE {
        return Err(BitmapLoadError::Truncated);
    }

    if read_u16(data, 0) != BMP_MAGIC {
        return Err(BitmapLoadError::NotABitmap);
    }
    let rgb_offset = read_u32(data, 10) as usize;

    // Info header fields, offset from the start of the file.
    let width = read_i32(data, 18);
    let height = read_i32(data, 22);
    let bits_per_pixel = read_u16(data, 28);
    let compression_type = read_u32(data, 30);

    if compression_type != 0 {
        return Err(BitmapLoadError::Compressed);
    }
    if bits_per_pixel != 24 && bits_per_pixel != 32 {
        return Err(BitmapLoadError::UnsupportedDepth(bits_per_pixel));
    }
    if width <= 0 || height == 0 {
        return Err(BitmapLoadError::InvalidDimensions);
    }

    let abs_height = height.unsigned_abs() as usize;
    let width_px = width as usize;

    let bytes_per_pixel = bits_per_pixel as usize / 8;
    let line_bytes = width_px * bytes_per_pixel;
    let row_bytes = line_bytes.div_ceil(4) * 4;

    let rows = data
        .get(rgb_offset..rgb_offset + row_bytes * abs_height)
        .ok_or(BitmapLoadError::Truncated)?;

    let mut pixels = Vec::with_capacity(width_px * abs_height);

    for out_row in 0..abs_height {
        // Positive height stores rows bottom-up; flip so the output is
        // always top-down.
        let src_row = if height < 0 {
            out_row
        } else {
            abs_height - 1 - out_row
        };
        let row = &rows[src_row * row_bytes..];

        for x in 0..width_px {
            let texel = &row[x * bytes_per_pixel..];
            pixels.push(Rgba {
                r: texel[2],
                g: texel[1],
                b: texel[0],
                a: if bytes_per_pixel == 4 { texel[3] } else { 255 },
            });
        }
    }

    Ok(Bitmap {
        width,
        height: abs_height as i32,
        pixels,
    })
}

/// Load and decode a BMP file.
pub fn load_bitmap_from_file(path: impl AsRef<Path>) -> Result<Bitmap, BitmapLoadError> {
    let path = path.as_ref();
    let bitmap = parse_bitmap(&fs::read(path)?)?;
    debug!(
        path = %path.display(),
        width = bitmap.width,
        height = bitmap.height,
        "loaded bitmap"
    );
    Ok(bitmap)
}

/// Point every triangle of a mesh at the given bitmap. The mesh's texture
/// coordinates are assumed to already be in place.
pub fn attach_texture<'b>(mesh: &mut Mesh<'b>, bitmap: &'b Bitmap) {
    for triangle in &mut mesh.triangles {
        triangle.bitmap = Some(bitmap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Assemble a BMP byte stream from raw pixel rows (given top-down,
    /// already padded).
    fn build_bmp(width: i32, height: i32, bpp: u16, compression: u32, rows: &[u8]) -> Vec<u8> {
        let mut data = Vec::new();

        // File header.
        data.extend_from_slice(&BMP_MAGIC.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes()); // file size (unread)
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&54u32.to_le_bytes()); // pixel data offset

        // Info header.
        data.extend_from_slice(&40u32.to_le_bytes());
        data.extend_from_slice(&width.to_le_bytes());
        data.extend_from_slice(&height.to_le_bytes());
        data.extend_from_slice(&1u16.to_le_bytes()); // planes
        data.extend_from_slice(&bpp.to_le_bytes());
        data.extend_from_slice(&compression.to_le_bytes());
        data.extend_from_slice(&[0u8; 20]); // image size, dpi, palette fields

        data.extend_from_slice(rows);
        data
    }

    #[test]
    fn decodes_24_bit_bottom_up_with_padding() {
        // 2x2, rows are 6 bytes of B,G,R padded to 8. Stored bottom-up:
        // file row 0 is the image's bottom row.
        #[rustfmt::skip]
        let rows = [
            255, 0, 0,   0, 255, 0,   0, 0, // bottom: blue, green
            0, 0, 255,   255, 255, 255, 0, 0, // top: red, white
        ];
        let bitmap = parse_bitmap(&build_bmp(2, 2, 24, 0, &rows)).unwrap();

        assert_eq!((bitmap.width, bitmap.height), (2, 2));
        assert_eq!(bitmap.texel(0, 0), Rgba { r: 255, g: 0, b: 0, a: 255 });
        assert_eq!(bitmap.texel(1, 0), Rgba { r: 255, g: 255, b: 255, a: 255 });
        assert_eq!(bitmap.texel(0, 1), Rgba { r: 0, g: 0, b: 255, a: 255 });
        assert_eq!(bitmap.texel(1, 1), Rgba { r: 0, g: 255, b: 0, a: 255 });
    }

    #[test]
    fn decodes_32_bit_top_down() {
        // Negative height: rows already top-down, no padding at 4 bytes
        // per pixel.
        let rows = [
            10, 20, 30, 40, // top-left, B,G,R,A
            50, 60, 70, 80,
        ];
        let bitmap = parse_bitmap(&build_bmp(1, -2, 32, 0, &rows)).unwrap();

        assert_eq!((bitmap.width, bitmap.height), (1, 2));
        assert_eq!(bitmap.texel(0, 0), Rgba { r: 30, g: 20, b: 10, a: 40 });
        assert_eq!(bitmap.texel(0, 1), Rgba { r: 70, g: 60, b: 50, a: 80 });
    }

    #[test]
    fn rejects_wrong_magic() {
        let mut data = build_bmp(1, 1, 24, 0, &[0, 0, 0, 0]);
        data[0] = b'X';
        assert!(matches!(
            parse_bitmap(&data),
            Err(BitmapLoadError::NotABitmap)
        ));
    }

    #[test]
    fn rejects_compressed_data() {
        let data = build_bmp(1, 1, 24, 1, &[0, 0, 0, 0]);
        assert!(matches!(
            parse_bitmap(&data),
            Err(BitmapLoadError::Compressed)
        ));
    }

    #[test]
    fn rejects_palette_depths() {
        let data = build_bmp(1, 1, 8, 0, &[0, 0, 0, 0]);
        assert!(matches!(
            parse_bitmap(&data),
            Err(BitmapLoadError::UnsupportedDepth(8))
        ));
    }

    #[test]
    fn rejects_truncated_pixel_data() {
        let data = build_bmp(4, 4, 24, 0, &[0, 0, 0]);
        assert!(matches!(parse_bitmap(&data), Err(BitmapLoadError::Truncated)));
    }

    #[test]
    fn attach_texture_reaches_every_triangle() {
        use crate::geometry::{Point, Triangle};
        use crate::math::vec4;

        let bitmap = Bitmap::from_pixels(1, 1, vec![Rgba::default()]);
        let point = Point::new(vec4(0.0, 0.0, 0.0, 1.0));
        let mut mesh = Mesh {
            triangles: vec![Triangle::new([point; 3]), Triangle::new([point; 3])],
        };

        attach_texture(&mut mesh, &bitmap);
        assert!(mesh.triangles.iter().all(|t| t.bitmap.is_some()));
    }
}
