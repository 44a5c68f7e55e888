// Parser combinators using nom for the frame layout

use super::bcd::TIME_FIELD_BYTES;
use nom::{bytes::complete::take, number::complete::u8 as parse_u8, IResult};

/// Length of the trailing tag region of every frame
pub const TAG_REGION_BYTES: usize = 8;

/// Raw fields of a tag region: quality bytes followed by the packed time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTag {
    pub quality_high: u8,
    pub quality_low: u8,
    pub time: [u8; TIME_FIELD_BYTES],
}

/// Parse the 6-byte packed time field
pub fn parse_time_field(input: &[u8]) -> IResult<&[u8], [u8; TIME_FIELD_BYTES]> {
    let (input, bytes) = take(TIME_FIELD_BYTES)(input)?;
    let mut field = [0u8; TIME_FIELD_BYTES];
    field.copy_from_slice(bytes);
    Ok((input, field))
}

/// Parse an 8-byte tag region
pub fn parse_tag(input: &[u8]) -> IResult<&[u8], RawTag> {
    let (input, quality_high) = parse_u8(input)?;
    let (input, quality_low) = parse_u8(input)?;
    let (input, time) = parse_time_field(input)?;
    Ok((
        input,
        RawTag {
            quality_high,
            quality_low,
            time,
        },
    ))
}

/// Split a raw frame into (data region, tag region)
pub fn parse_frame(input: &[u8], data_region_bytes: usize) -> IResult<&[u8], (&[u8], RawTag)> {
    let (input, data) = take(data_region_bytes)(input)?;
    let (input, tag) = parse_tag(input)?;
    Ok((input, (data, tag)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag() {
        let data = [0xAA, 0xBB, 0x12, 0x34, 0x56, 0x00, 0x00, 0x00];
        let (rest, tag) = parse_tag(&data).unwrap();
        assert!(rest.is_empty());
        assert_eq!(tag.quality_high, 0xAA);
        assert_eq!(tag.quality_low, 0xBB);
        assert_eq!(tag.time, [0x12, 0x34, 0x56, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_parse_tag_too_short() {
        assert!(parse_tag(&[0xAA, 0xBB, 0x12]).is_err());
    }

    #[test]
    fn test_parse_frame() {
        let frame = [
            0x00, 0x01, 0x00, 0x02, 0xAA, 0xBB, 0x12, 0x34, 0x56, 0x00, 0x00, 0x00,
        ];
        let (rest, (data, tag)) = parse_frame(&frame, 4).unwrap();
        assert!(rest.is_empty());
        assert_eq!(data, &[0x00, 0x01, 0x00, 0x02]);
        assert_eq!(tag.quality_low, 0xBB);
    }
}
