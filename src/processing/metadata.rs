//! Source metadata capture and EXIF orientation handling.
//!
//! EXIF and ICC bytes are captured at decode time, before any pixel
//! transformation, and copied verbatim to every derivative when requested.
//! The one exception is the orientation tag: the pipeline bakes the rotation
//! into the pixels, so the tag is neutralized here to keep viewers from
//! rotating the derivatives a second time.

/// Raw metadata captured from a source before normalization.
#[derive(Debug, Clone, Default)]
pub struct SourceMetadata {
    /// Raw EXIF payload (TIFF-structured, orientation already neutralized).
    pub exif: Option<Vec<u8>>,
    /// Raw ICC color profile bytes.
    pub icc: Option<Vec<u8>>,
}

impl SourceMetadata {
    pub fn is_empty(&self) -> bool {
        self.exif.is_none() && self.icc.is_none()
    }
}

const ORIENTATION_TAG: u16 = 0x0112;
const TYPE_SHORT: u16 = 3;

/// Rewrites the IFD0 orientation entry (tag 0x0112) to 1 ("upright") in place.
///
/// Accepts the payload with or without the leading `Exif\0\0` identifier.
/// Malformed or truncated buffers are left untouched; carrying the original
/// bytes unmodified is preferable to corrupting them.
pub fn neutralize_orientation(exif: &mut [u8]) {
    let offset = if exif.starts_with(b"Exif\0\0") { 6 } else { 0 };
    if let Some((value_offset, big_endian)) = orientation_value_offset(&exif[offset..]) {
        let value: [u8; 2] = if big_endian { [0, 1] } else { [1, 0] };
        exif[offset + value_offset..offset + value_offset + 2].copy_from_slice(&value);
    }
}

/// Locates the 2-byte value of the IFD0 orientation entry inside a TIFF
/// structure. Returns the byte offset of the value and the endianness.
fn orientation_value_offset(tiff: &[u8]) -> Option<(usize, bool)> {
    let big_endian = match tiff.get(0..4)? {
        [0x4d, 0x4d, 0x00, 0x2a] => true,
        [0x49, 0x49, 0x2a, 0x00] => false,
        _ => return None,
    };

    let read_u16 = |at: usize| -> Option<u16> {
        let b = tiff.get(at..at + 2)?;
        Some(if big_endian {
            u16::from_be_bytes([b[0], b[1]])
        } else {
            u16::from_le_bytes([b[0], b[1]])
        })
    };
    let read_u32 = |at: usize| -> Option<u32> {
        let b = tiff.get(at..at + 4)?;
        Some(if big_endian {
            u32::from_be_bytes([b[0], b[1], b[2], b[3]])
        } else {
            u32::from_le_bytes([b[0], b[1], b[2], b[3]])
        })
    };

    let ifd0 = read_u32(4)? as usize;
    let entry_count = read_u16(ifd0)? as usize;
    for i in 0..entry_count {
        let entry = ifd0 + 2 + i * 12;
        if read_u16(entry)? == ORIENTATION_TAG && read_u16(entry + 2)? == TYPE_SHORT {
            // SHORT with count 1: the value lives in the first two bytes of
            // the 4-byte value field at entry offset 8.
            tiff.get(entry + 8..entry + 10)?;
            return Some((entry + 8, big_endian));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal little-endian TIFF with a single IFD0 entry: orientation = 6.
    fn little_endian_exif(orientation: u8) -> Vec<u8> {
        vec![
            0x49, 0x49, 0x2a, 0x00, // II*\0
            0x08, 0x00, 0x00, 0x00, // IFD0 at offset 8
            0x01, 0x00, // one entry
            0x12, 0x01, // tag 0x0112
            0x03, 0x00, // type SHORT
            0x01, 0x00, 0x00, 0x00, // count 1
            orientation, 0x00, 0x00, 0x00, // value
        ]
    }

    #[test]
    fn little_endian_orientation_is_reset_to_upright() {
        let mut exif = little_endian_exif(6);
        neutralize_orientation(&mut exif);
        assert_eq!(&exif[18..20], &[1, 0]);
    }

    #[test]
    fn big_endian_orientation_is_reset_to_upright() {
        let mut exif = vec![
            0x4d, 0x4d, 0x00, 0x2a, // MM\0*
            0x00, 0x00, 0x00, 0x08, // IFD0 at offset 8
            0x00, 0x01, // one entry
            0x01, 0x12, // tag 0x0112
            0x00, 0x03, // type SHORT
            0x00, 0x00, 0x00, 0x01, // count 1
            0x00, 0x08, 0x00, 0x00, // value 8
        ];
        neutralize_orientation(&mut exif);
        assert_eq!(&exif[18..20], &[0, 1]);
    }

    #[test]
    fn exif_identifier_prefix_is_handled() {
        let mut exif = b"Exif\0\0".to_vec();
        exif.extend(little_endian_exif(3));
        neutralize_orientation(&mut exif);
        assert_eq!(&exif[24..26], &[1, 0]);
    }

    #[test]
    fn truncated_buffer_is_left_untouched() {
        let mut exif = little_endian_exif(6);
        exif.truncate(12);
        let before = exif.clone();
        neutralize_orientation(&mut exif);
        assert_eq!(exif, before);
    }

    #[test]
    fn garbage_buffer_is_left_untouched() {
        let mut exif = vec![0xde, 0xad, 0xbe, 0xef, 0x00, 0x00, 0x00, 0x00];
        let before = exif.clone();
        neutralize_orientation(&mut exif);
        assert_eq!(exif, before);
    }
}
