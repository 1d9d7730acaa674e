use crate::container::{IconContainer, IconEntry};
use crate::error::{Error, Result};
use crate::restype::ResourceType;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

//===========================================================================//

/// Keeps the requested sizes that fit inside a `width` x `height` source,
/// in the caller's order, dropping zeros and repeats.
pub fn select_resolutions(
    width: u32,
    height: u32,
    requested: &[u32],
) -> Vec<u32> {
    let max_size = width.min(height);
    let mut sizes = Vec::with_capacity(requested.len());
    for &size in requested {
        if size == 0 || size > max_size {
            debug!("Skipping {}x{} (source is {}x{})", size, size, width, height);
            continue;
        }
        if !sizes.contains(&size) {
            sizes.push(size);
        }
    }
    sizes
}

// Encodes one resized raster, naming the requested resolution on failure.
fn encode_resized(
    resolution: u32,
    width: u32,
    height: u32,
    rgba_data: &[u8],
) -> Result<IconEntry> {
    IconEntry::encode_png(width, height, rgba_data).map_err(|error| {
        Error::Encode { resolution, source: Box::new(error) }
    })
}

/// Parses an icon container from bytes.  See [`IconContainer::decode`].
pub fn decode(bytes: &[u8]) -> Result<IconContainer> {
    IconContainer::decode(bytes)
}

//===========================================================================//

/// Builds multi-resolution icons out of a single source image.
#[derive(Clone, Copy, Debug)]
pub struct IconEncoder {
    filter: FilterType,
    min_source_size: u32,
}

impl Default for IconEncoder {
    fn default() -> IconEncoder {
        IconEncoder::new()
    }
}

impl IconEncoder {
    /// Creates an encoder that resamples with Lanczos3 and accepts sources
    /// of any size.
    pub fn new() -> IconEncoder {
        IconEncoder { filter: FilterType::Lanczos3, min_source_size: 0 }
    }

    /// Sets the resampling filter used to shrink the source.
    pub fn with_filter(mut self, filter: FilterType) -> IconEncoder {
        self.filter = filter;
        self
    }

    /// Rejects sources whose width or height is below `min_source_size`.
    pub fn with_min_source_size(mut self, min_source_size: u32) -> IconEncoder {
        self.min_source_size = min_source_size;
        self
    }

    /// Resizes `source` to each usable resolution and collects the results
    /// into a container, one PNG entry per size.
    pub fn build(
        &self,
        source: &DynamicImage,
        resolutions: &[u32],
    ) -> Result<IconContainer> {
        let (width, height) = source.dimensions();
        if width < self.min_source_size || height < self.min_source_size {
            return Err(Error::SourceTooSmall {
                width,
                height,
                minimum: self.min_source_size,
            });
        }
        let sizes = select_resolutions(width, height, resolutions);
        if sizes.is_empty() {
            return Err(Error::EmptyResolutionSet);
        }
        let mut container = IconContainer::new(ResourceType::Icon);
        for size in sizes {
            // Keeps the aspect ratio, so non-square sources give
            // non-square entries that fit within size x size.
            let resized = source.resize(size, size, self.filter).to_rgba8();
            let (w, h) = resized.dimensions();
            let entry = encode_resized(size, w, h, resized.as_raw())?;
            debug!(
                "Encoded {}x{} entry ({} bytes, {} bpp)",
                w,
                h,
                entry.data().len(),
                entry.directory().bits_per_pixel
            );
            container.add_entry(entry);
        }
        Ok(container)
    }

    /// Encodes `source` at each usable resolution and returns the ICO bytes.
    pub fn encode(
        &self,
        source: &DynamicImage,
        resolutions: &[u32],
    ) -> Result<Vec<u8>> {
        self.build(source, resolutions)?.to_bytes()
    }

    /// Like [`IconEncoder::encode`], but also writes the bytes to `path`.
    pub fn encode_to_path<P: AsRef<Path>>(
        &self,
        source: &DynamicImage,
        resolutions: &[u32],
        path: P,
    ) -> Result<Vec<u8>> {
        let container = self.build(source, resolutions)?;
        let bytes = container.to_bytes()?;
        fs::write(path.as_ref(), &bytes)?;
        info!(
            "Wrote {} ({} resolutions, {} bytes)",
            path.as_ref().display(),
            container.entries().len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{encode_resized, select_resolutions, IconEncoder};
    use crate::error::Error;
    use image::DynamicImage;

    #[test]
    fn no_upscaling() {
        let sizes = select_resolutions(64, 64, &[256, 128, 64, 48, 16]);
        assert_eq!(sizes, vec![64, 48, 16]);
    }

    #[test]
    fn smaller_edge_limits_sizes() {
        let sizes = select_resolutions(300, 40, &[16, 32, 48, 64]);
        assert_eq!(sizes, vec![16, 32]);
    }

    #[test]
    fn zeros_and_repeats_are_dropped() {
        let sizes = select_resolutions(100, 100, &[0, 32, 16, 32, 0, 16]);
        assert_eq!(sizes, vec![32, 16]);
    }

    #[test]
    fn small_source_is_rejected() {
        let source = DynamicImage::new_rgba8(128, 300);
        let encoder = IconEncoder::new().with_min_source_size(256);
        let result = encoder.build(&source, &[16]);
        assert!(matches!(
            result,
            Err(Error::SourceTooSmall { width: 128, height: 300, minimum: 256 })
        ));
    }

    #[test]
    fn encode_failure_names_resolution() {
        let result = encode_resized(48, 48, 48, &[0u8; 12]);
        match result {
            Err(Error::Encode { resolution, source }) => {
                assert_eq!(resolution, 48);
                assert!(matches!(*source, Error::Malformed(_)));
            }
            other => panic!("expected encode error, got {:?}", other),
        }
        let message = encode_resized(32, 2, 2, &[]).unwrap_err().to_string();
        assert!(message.starts_with("Failed to encode 32x32 image"), "{}", message);
    }

    #[test]
    fn empty_request_is_empty_resolution_set() {
        let source = DynamicImage::new_rgba8(32, 32);
        let result = IconEncoder::new().build(&source, &[]);
        assert!(matches!(result, Err(Error::EmptyResolutionSet)));
    }
}

//===========================================================================//
