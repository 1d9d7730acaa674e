use crate::error::{Error, Result};
use crate::payload::{self, PNG_SIGNATURE};
use crate::restype::ResourceType;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Serialize, Serializer};
use std::io::{Read, Write};
use tracing::warn;

//===========================================================================//

/// Size of the ICONDIR header, in bytes.
pub const HEADER_LEN: usize = 6;

/// Size of one ICONDIRENTRY record, in bytes.
pub const DIRECTORY_ENTRY_LEN: usize = 16;

//===========================================================================//

/// The fixed 6-byte preamble of an icon container.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct ContainerHeader {
    /// Always zero.
    pub reserved: u16,
    /// 1 for icons, 2 for cursors.
    pub image_type: u16,
    /// Number of directory entries that follow.
    pub entry_count: u16,
}

impl ContainerHeader {
    fn read(mut reader: &[u8]) -> Result<ContainerHeader> {
        if reader.len() < HEADER_LEN {
            return Err(Error::TruncatedHeader { len: reader.len() });
        }
        Ok(ContainerHeader {
            reserved: reader.read_u16::<LittleEndian>()?,
            image_type: reader.read_u16::<LittleEndian>()?,
            entry_count: reader.read_u16::<LittleEndian>()?,
        })
    }

    fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u16::<LittleEndian>(self.reserved)?;
        writer.write_u16::<LittleEndian>(self.image_type)?;
        writer.write_u16::<LittleEndian>(self.entry_count)?;
        Ok(())
    }
}

//===========================================================================//

/// One 16-byte record describing where an embedded image lives.  When
/// serialized, width and height are reported in pixels (0 becomes 256).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct DirectoryEntry {
    /// Width byte as stored; 0 means 256 (or more).
    #[serde(serialize_with = "serialize_dimension")]
    pub width: u8,
    /// Height byte as stored; 0 means 256 (or more).
    #[serde(serialize_with = "serialize_dimension")]
    pub height: u8,
    /// Palette size, or 0 for true-colour images.
    pub color_count: u8,
    /// Reserved byte, normally 0.
    pub reserved: u8,
    /// Colour planes (icons) or hotspot x (cursors).
    pub planes: u16,
    /// Bits per pixel (icons) or hotspot y (cursors).
    pub bits_per_pixel: u16,
    /// Length of the payload in bytes.
    pub data_size: u32,
    /// Absolute offset of the payload from the start of the container.
    pub data_offset: u32,
}

impl DirectoryEntry {
    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        dimension(self.width)
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        dimension(self.height)
    }

    /// Returns the byte range of the payload, or `None` if it does not fit
    /// inside a buffer of `len` bytes.
    pub fn payload_range(&self, len: usize) -> Option<std::ops::Range<usize>> {
        let start = self.data_offset as usize;
        let end = start.checked_add(self.data_size as usize)?;
        if end > len {
            None
        } else {
            Some(start..end)
        }
    }

    fn read(mut reader: &[u8]) -> Result<DirectoryEntry> {
        Ok(DirectoryEntry {
            width: reader.read_u8()?,
            height: reader.read_u8()?,
            color_count: reader.read_u8()?,
            reserved: reader.read_u8()?,
            planes: reader.read_u16::<LittleEndian>()?,
            bits_per_pixel: reader.read_u16::<LittleEndian>()?,
            data_size: reader.read_u32::<LittleEndian>()?,
            data_offset: reader.read_u32::<LittleEndian>()?,
        })
    }

    fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.width)?;
        writer.write_u8(self.height)?;
        writer.write_u8(self.color_count)?;
        writer.write_u8(self.reserved)?;
        writer.write_u16::<LittleEndian>(self.planes)?;
        writer.write_u16::<LittleEndian>(self.bits_per_pixel)?;
        writer.write_u32::<LittleEndian>(self.data_size)?;
        writer.write_u32::<LittleEndian>(self.data_offset)?;
        Ok(())
    }
}

fn dimension(byte: u8) -> u32 {
    if byte == 0 {
        256
    } else {
        byte as u32
    }
}

fn serialize_dimension<S: Serializer>(
    byte: &u8,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u32(dimension(*byte))
}

// A width/height byte of zero indicates a size of 256 or more.
fn dimension_byte(size: u32) -> u8 {
    if size > 255 {
        0
    } else {
        size as u8
    }
}

//===========================================================================//

/// One image in a container: its directory record and its raw payload.
#[derive(Clone, Debug)]
pub struct IconEntry {
    directory: DirectoryEntry,
    data: Vec<u8>,
}

impl IconEntry {
    /// Encodes `width * height` RGBA pixels (row-major, top to bottom) as a
    /// PNG entry.
    pub fn encode_png(
        width: u32,
        height: u32,
        rgba_data: &[u8],
    ) -> Result<IconEntry> {
        let (bits_per_pixel, data) =
            payload::encode_png(width, height, rgba_data)?;
        let data_size = match u32::try_from(data.len()) {
            Ok(size) => size,
            Err(_) => malformed!("PNG payload of {} bytes is too large", data.len()),
        };
        let directory = DirectoryEntry {
            width: dimension_byte(width),
            height: dimension_byte(height),
            color_count: 0,
            reserved: 0,
            planes: 0,
            bits_per_pixel,
            data_size,
            data_offset: 0,
        };
        Ok(IconEntry { directory, data })
    }

    /// Returns the directory record for this entry.
    pub fn directory(&self) -> &DirectoryEntry {
        &self.directory
    }

    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.directory.width()
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.directory.height()
    }

    /// Returns the raw, encoded image data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns true if the payload is a PNG stream, or false if it is a DIB.
    pub fn is_png(&self) -> bool {
        self.data.starts_with(PNG_SIGNATURE)
    }

    /// Decodes just enough of the payload to learn its actual pixel size,
    /// which may exceed 256 where the directory only says "0".
    pub fn payload_dimensions(&self) -> Result<(u32, u32)> {
        if self.is_png() {
            payload::png_dimensions(&self.data)
        } else {
            payload::dib_dimensions(&self.data)
        }
    }

    /// Converts the payload into a standalone image file.  Returns the file
    /// contents and the matching extension.
    pub fn to_image_file(&self) -> Result<(Vec<u8>, &'static str)> {
        if self.is_png() {
            Ok((self.data.clone(), "png"))
        } else {
            Ok((payload::dib_to_bmp_file(&self.data)?, "bmp"))
        }
    }
}

//===========================================================================//

/// A collection of images; the contents of a single ICO or CUR file.
#[derive(Debug)]
pub struct IconContainer {
    restype: ResourceType,
    entries: Vec<IconEntry>,
    rejected: Vec<Error>,
}

impl IconContainer {
    /// Creates a new, empty container.
    pub fn new(resource_type: ResourceType) -> IconContainer {
        IconContainer {
            restype: resource_type,
            entries: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// Returns the type of resource stored in this container.
    pub fn resource_type(&self) -> ResourceType {
        self.restype
    }

    /// Returns the header describing this container.
    pub fn header(&self) -> ContainerHeader {
        ContainerHeader {
            reserved: 0,
            image_type: self.restype.number(),
            entry_count: self.entries.len().min(u16::MAX as usize) as u16,
        }
    }

    /// Returns the entries, in on-disk order.
    pub fn entries(&self) -> &[IconEntry] {
        &self.entries
    }

    /// Returns the errors for entries that were dropped while decoding.
    pub fn rejected(&self) -> &[Error] {
        &self.rejected
    }

    /// Appends an entry.  Its offset is assigned by [`IconContainer::layout`]
    /// when the container is written.
    pub fn add_entry(&mut self, entry: IconEntry) {
        self.entries.push(entry);
    }

    /// Total size of the serialized container, in bytes.
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN
            + DIRECTORY_ENTRY_LEN * self.entries.len()
            + self.entries.iter().map(|e| e.data.len()).sum::<usize>()
    }

    /// Returns the directory records as they will be written: payloads laid
    /// out contiguously after the directory, in entry order.
    pub fn layout(&self) -> Result<Vec<DirectoryEntry>> {
        if self.entries.len() > (u16::MAX as usize) {
            return Err(Error::TooManyEntries(self.entries.len()));
        }
        let offsets = layout_offsets(self.entries.iter().map(|e| e.data.len()))?;
        Ok(self
            .entries
            .iter()
            .zip(offsets)
            .map(|(entry, (data_offset, data_size))| DirectoryEntry {
                data_size,
                data_offset,
                ..entry.directory
            })
            .collect())
    }

    /// Parses a container from an in-memory buffer.  Truncated headers or
    /// directories abort the parse; entries whose payload lies outside the
    /// buffer are dropped and recorded in [`IconContainer::rejected`].
    pub fn decode(bytes: &[u8]) -> Result<IconContainer> {
        let header = ContainerHeader::read(bytes)?;
        if header.reserved != 0 {
            malformed!(
                "Invalid reserved field value in ICONDIR \
                 (was {}, but must be 0)",
                header.reserved
            );
        }
        let restype = match ResourceType::from_number(header.image_type) {
            Some(restype) => restype,
            None => malformed!("Invalid resource type ({})", header.image_type),
        };
        let num_entries = header.entry_count as usize;
        let mut directory = Vec::<DirectoryEntry>::with_capacity(num_entries);
        for index in 0..num_entries {
            let start = HEADER_LEN + DIRECTORY_ENTRY_LEN * index;
            let record = match bytes.get(start..start + DIRECTORY_ENTRY_LEN) {
                Some(record) => record,
                None => {
                    return Err(Error::TruncatedDirectory {
                        index,
                        len: bytes.len(),
                    })
                }
            };
            directory.push(DirectoryEntry::read(record)?);
        }
        let mut container = IconContainer::new(restype);
        for (index, entry) in directory.into_iter().enumerate() {
            match entry.payload_range(bytes.len()) {
                Some(range) => {
                    let data = bytes[range].to_vec();
                    container.entries.push(IconEntry { directory: entry, data });
                }
                None => {
                    let error = Error::PayloadOutOfRange {
                        index,
                        offset: entry.data_offset,
                        size: entry.data_size,
                        len: bytes.len(),
                    };
                    warn!("Skipping entry: {}", error);
                    container.rejected.push(error);
                }
            }
        }
        Ok(container)
    }

    /// Reads an ICO or CUR file into memory.
    pub fn read<R: Read>(mut reader: R) -> Result<IconContainer> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        IconContainer::decode(&bytes)
    }

    /// Writes the container out, laying payloads out contiguously after the
    /// directory regardless of the offsets it was decoded with.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        let directory = self.layout()?;
        self.header().write(&mut writer)?;
        for record in directory.iter() {
            record.write(&mut writer)?;
        }
        for entry in self.entries.iter() {
            writer.write_all(&entry.data)?;
        }
        Ok(())
    }

    /// Serializes the container into a new buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.encoded_len());
        self.write(&mut bytes)?;
        Ok(bytes)
    }
}

// Returns `(data_offset, data_size)` for payloads of the given lengths placed
// back to back after the header and directory.
fn layout_offsets<I>(lengths: I) -> Result<Vec<(u32, u32)>>
where
    I: ExactSizeIterator<Item = usize>,
{
    let count = lengths.len();
    let too_large = || {
        Error::Malformed(format!(
            "Payloads of {} entries do not fit in a 4 GiB container",
            count
        ))
    };
    let mut data_offset = u32::try_from(HEADER_LEN + DIRECTORY_ENTRY_LEN * count)
        .map_err(|_| too_large())?;
    let mut spans = Vec::with_capacity(count);
    for len in lengths {
        let data_size = u32::try_from(len).map_err(|_| too_large())?;
        spans.push((data_offset, data_size));
        data_offset = data_offset.checked_add(data_size).ok_or_else(too_large)?;
    }
    Ok(spans)
}

//===========================================================================//


//===========================================================================//
