use std::io;

//===========================================================================//

/// Errors produced while building, reading, or writing icon containers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// None of the requested resolutions fit inside the source image.
    #[error("No usable resolutions (all exceed the source image or none were given)")]
    EmptyResolutionSet,

    /// The buffer is too short to hold the 6-byte container header.
    #[error("Truncated ICONDIR header (have {len} bytes, need 6)")]
    TruncatedHeader {
        /// Total length of the buffer.
        len: usize,
    },

    /// The buffer ends before directory entry `index` is complete.
    #[error("Truncated ICONDIRENTRY {index} (buffer is only {len} bytes)")]
    TruncatedDirectory {
        /// Zero-based index of the incomplete entry.
        index: usize,
        /// Total length of the buffer.
        len: usize,
    },

    /// The payload range of entry `index` lies outside the buffer.
    #[error(
        "Payload of entry {index} out of range \
         (offset {offset} + size {size} exceeds buffer length {len})"
    )]
    PayloadOutOfRange {
        /// Zero-based index of the offending entry.
        index: usize,
        /// Declared payload offset.
        offset: u32,
        /// Declared payload size.
        size: u32,
        /// Total length of the buffer.
        len: usize,
    },

    /// Encoding the image for one resolution failed.
    #[error("Failed to encode {resolution}x{resolution} image: {source}")]
    Encode {
        /// The resolution that could not be encoded.
        resolution: u32,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// The source image is smaller than the configured minimum.
    #[error(
        "Source image is {width}x{height}, \
         but must be at least {minimum}x{minimum}"
    )]
    SourceTooSmall {
        /// Source width in pixels.
        width: u32,
        /// Source height in pixels.
        height: u32,
        /// Configured minimum edge length.
        minimum: u32,
    },

    /// More entries than the 16-bit count field can describe.
    #[error("Too many entries in container (was {0}, but max is 65535)")]
    TooManyEntries(usize),

    /// Structurally invalid header fields or payload data.
    #[error("{0}")]
    Malformed(String),

    /// PNG payload encoding failed.
    #[error("PNG encoding error: {0}")]
    Png(#[from] png::EncodingError),

    /// Reading or writing failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The source image could not be opened or decoded.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// The configuration file could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

/// Shorthand for results carrying an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

//===========================================================================//
