use crate::bmpdepth::BmpDepth;
use crate::error::Result;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::Write;

//===========================================================================//

// The signature that all PNG files start with.
pub(crate) const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G'];

// The size of a BITMAPINFOHEADER struct, in bytes.
const BMP_INFO_HEADER_LEN: u32 = 40;

// The size of the BITMAPFILEHEADER that standalone .bmp files start with.
const BMP_FILE_HEADER_LEN: u32 = 14;

// Compression value for BI_BITFIELDS, which puts three channel masks right
// after the info header.
const BI_BITFIELDS: u32 = 3;

//===========================================================================//

/// Encodes `width * height` RGBA pixels as a PNG stream.  Fully opaque
/// images are written as RGB.  Returns the bits-per-pixel and the data.
pub(crate) fn encode_png(
    width: u32,
    height: u32,
    rgba_data: &[u8],
) -> Result<(u16, Vec<u8>)> {
    let expected_len = (width as u64) * (height as u64) * 4;
    if rgba_data.len() as u64 != expected_len {
        malformed!(
            "Invalid RGBA data length (was {}, but must be {} for {}x{} image)",
            rgba_data.len(),
            expected_len,
            width,
            height
        );
    }
    let has_alpha = rgba_data.chunks_exact(4).any(|px| px[3] != u8::MAX);
    let mut data = Vec::new();
    let mut encoder = png::Encoder::new(&mut data, width, height);
    encoder.set_depth(png::BitDepth::Eight);
    let bits_per_pixel = if has_alpha {
        encoder.set_color(png::ColorType::Rgba);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba_data)?;
        writer.finish()?;
        32
    } else {
        encoder.set_color(png::ColorType::Rgb);
        let mut writer = encoder.write_header()?;
        let mut rgb_data =
            Vec::<u8>::with_capacity((rgba_data.len() / 4) * 3);
        for px in rgba_data.chunks_exact(4) {
            rgb_data.extend_from_slice(&px[..3]);
        }
        writer.write_image_data(&rgb_data)?;
        writer.finish()?;
        24
    };
    Ok((bits_per_pixel, data))
}

/// Reads the pixel size out of a PNG stream's IHDR chunk.
pub(crate) fn png_dimensions(data: &[u8]) -> Result<(u32, u32)> {
    let decoder = png::Decoder::new(data);
    match decoder.read_info() {
        Ok(reader) => Ok((reader.info().width, reader.info().height)),
        Err(error) => malformed!("Malformed PNG data: {}", error),
    }
}

//===========================================================================//

struct DibInfo {
    width: u32,
    height: u32,
    depth: BmpDepth,
    compression: u32,
    colors_used: u32,
}

fn read_dib_info(mut data: &[u8]) -> Result<DibInfo> {
    let header_len = data.read_u32::<LittleEndian>()?;
    if header_len != BMP_INFO_HEADER_LEN {
        malformed!(
            "Invalid BMP header size (was {}, must be {})",
            header_len,
            BMP_INFO_HEADER_LEN
        );
    }
    let width = data.read_i32::<LittleEndian>()?;
    if width < 1 {
        malformed!("Invalid BMP width (was {}, but must be at least 1)", width);
    }
    let height = data.read_i32::<LittleEndian>()?;
    if height % 2 != 0 {
        // The height counts the rows of both the colour data and the AND
        // mask, so it must be even.
        malformed!(
            "Invalid height field in BMP header \
             (was {}, but must be divisible by 2)",
            height
        );
    }
    let height = height / 2;
    if height < 1 {
        malformed!(
            "Invalid BMP height (was {}, but must be at least 1)",
            height
        );
    }
    let _planes = data.read_u16::<LittleEndian>()?;
    let bits_per_pixel = data.read_u16::<LittleEndian>()?;
    let depth = match BmpDepth::from_bits_per_pixel(bits_per_pixel) {
        Some(depth) => depth,
        None => {
            malformed!("Unsupported BMP bits-per-pixel ({})", bits_per_pixel)
        }
    };
    let compression = data.read_u32::<LittleEndian>()?;
    let _image_size = data.read_u32::<LittleEndian>()?;
    let _horz_ppm = data.read_i32::<LittleEndian>()?;
    let _vert_ppm = data.read_i32::<LittleEndian>()?;
    let colors_used = data.read_u32::<LittleEndian>()?;
    Ok(DibInfo {
        width: width as u32,
        height: height as u32,
        depth,
        compression,
        colors_used,
    })
}

/// Reads the pixel size out of a headerless DIB, undoing the doubled height.
pub(crate) fn dib_dimensions(data: &[u8]) -> Result<(u32, u32)> {
    let info = read_dib_info(data)?;
    Ok((info.width, info.height))
}

/// Turns a headerless DIB payload into a standalone BMP file.  The AND mask
/// is left in place after the pixel rows, where BMP readers ignore it.
pub(crate) fn dib_to_bmp_file(data: &[u8]) -> Result<Vec<u8>> {
    let info = read_dib_info(data)?;
    let mut pixel_offset = BMP_FILE_HEADER_LEN
        + BMP_INFO_HEADER_LEN
        + 4 * info.depth.palette_len(info.colors_used) as u32;
    if info.compression == BI_BITFIELDS {
        pixel_offset += 12;
    }
    if pixel_offset - BMP_FILE_HEADER_LEN > data.len() as u32 {
        malformed!(
            "DIB payload too short for its color table \
             (was {} bytes, but needs at least {})",
            data.len(),
            pixel_offset - BMP_FILE_HEADER_LEN
        );
    }
    let file_len = BMP_FILE_HEADER_LEN as usize + data.len();
    let mut file = Vec::<u8>::with_capacity(file_len);
    file.write_all(b"BM")?;
    file.write_u32::<LittleEndian>(file_len as u32)?;
    file.write_u16::<LittleEndian>(0)?; // reserved
    file.write_u16::<LittleEndian>(0)?; // reserved
    file.write_u32::<LittleEndian>(pixel_offset)?;
    file.write_all(&data[..8])?;
    file.write_i32::<LittleEndian>(info.height as i32)?;
    file.write_all(&data[12..])?;
    debug_assert_eq!(file.len(), file_len);
    Ok(file)
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{dib_dimensions, dib_to_bmp_file, encode_png, png_dimensions};
    use crate::error::Error;

    // A 2x2, 1-bpp DIB: info header, two palette entries, colour rows, mask.
    const DIB_1BPP: &[u8] = b"\
        \x28\x00\x00\x00\x02\x00\x00\x00\x04\x00\x00\x00\
        \x01\x00\x01\x00\x00\x00\x00\x00\x00\x00\x00\x00\
        \x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\
        \x00\x00\x00\x00\
        \
        \x55\x00\x55\x00\xff\xff\xff\x00\
        \
        \xc0\x00\x00\x00\
        \x40\x00\x00\x00\
        \
        \x40\x00\x00\x00\
        \x00\x00\x00\x00";

    #[test]
    fn opaque_image_encodes_as_rgb() {
        let rgba = [10u8, 20, 30, 255].repeat(3 * 2);
        let (bits_per_pixel, data) = encode_png(3, 2, &rgba).unwrap();
        assert_eq!(bits_per_pixel, 24);
        assert!(data.starts_with(super::PNG_SIGNATURE));
        assert_eq!(png_dimensions(&data).unwrap(), (3, 2));
    }

    #[test]
    fn translucent_image_encodes_as_rgba() {
        let mut rgba = [10u8, 20, 30, 255].repeat(4);
        rgba[7] = 0;
        let (bits_per_pixel, data) = encode_png(2, 2, &rgba).unwrap();
        assert_eq!(bits_per_pixel, 32);
        assert_eq!(png_dimensions(&data).unwrap(), (2, 2));
    }

    #[test]
    fn wrong_rgba_length_is_rejected() {
        let result = encode_png(2, 2, &[0u8; 15]);
        assert!(matches!(result, Err(Error::Malformed(_))));
    }

    #[test]
    fn garbage_is_not_png() {
        let result = png_dimensions(b"\x89PNG but not really");
        assert!(matches!(result, Err(Error::Malformed(_))));
    }

    #[test]
    fn dib_height_is_halved() {
        assert_eq!(dib_dimensions(DIB_1BPP).unwrap(), (2, 2));
    }

    #[test]
    fn dib_with_odd_height_is_rejected() {
        let mut dib = DIB_1BPP.to_vec();
        dib[8] = 3;
        assert!(matches!(dib_dimensions(&dib), Err(Error::Malformed(_))));
    }

    #[test]
    fn dib_becomes_bmp_file() {
        let bmp = dib_to_bmp_file(DIB_1BPP).unwrap();
        assert_eq!(&bmp[..2], b"BM");
        assert_eq!(bmp.len(), 14 + DIB_1BPP.len());
        // File size, then pixel data offset past header and 2-color palette.
        assert_eq!(&bmp[2..6], &(bmp.len() as u32).to_le_bytes());
        assert_eq!(&bmp[10..14], &(14u32 + 40 + 8).to_le_bytes());
        // Height is the real height, no longer doubled.
        assert_eq!(&bmp[22..26], &2i32.to_le_bytes());
        assert_eq!(&bmp[26..], &DIB_1BPP[12..]);
    }
}

//===========================================================================//
