//! Lossless PNG output for composed surfaces.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use neschr_core::Surface;

use crate::error::ExportError;

/// Encode `surface` as an 8-bit RGBA PNG held in memory.
pub fn encode_png(surface: &Surface) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_png_to(&mut buf, surface)?;
    Ok(buf)
}

/// Encode `surface` into the file at `path`, replacing it if present.
pub fn write_png(surface: &Surface, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|err| ExportError::io(path, err))?;
    let mut writer = BufWriter::new(file);
    write_png_to(&mut writer, surface)?;
    writer.flush().map_err(|err| ExportError::io(path, err))?;
    tracing::trace!(path = %path.display(), "wrote PNG");
    Ok(())
}

fn write_png_to<W: Write>(sink: W, surface: &Surface) -> Result<(), ExportError> {
    let mut encoder = png::Encoder::new(sink, surface.width(), surface.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&surface.to_rgba8())?;
    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use neschr_core::Color;

    #[test]
    fn encoded_stream_has_png_signature_and_size() {
        let surface = Surface::new(3, 2, Color::rgb(10, 20, 30));
        let bytes = encode_png(&surface).expect("encode");

        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        // IHDR width/height, big endian.
        assert_eq!(&bytes[16..20], &3u32.to_be_bytes());
        assert_eq!(&bytes[20..24], &2u32.to_be_bytes());
    }

    #[test]
    fn decodes_back_to_the_same_pixels() {
        let mut surface = Surface::new(2, 2, Color::TRANSPARENT);
        surface.set(1, 1, Color::rgb(200, 100, 50));
        let bytes = encode_png(&surface).expect("encode");

        let decoder = png::Decoder::new(std::io::Cursor::new(bytes));
        let mut reader = decoder.read_info().expect("read info");
        let mut out = vec![0; 2 * 2 * 4];
        let info = reader.next_frame(&mut out).expect("frame");

        assert_eq!((info.width, info.height), (2, 2));
        assert_eq!(&out[..info.buffer_size()], surface.to_rgba8().as_slice());
    }
}
