//! Removal of run-dependent values from rendered PDF bytes.
//!
//! The PDF writer stamps every document with the current time and random identifiers.  These
//! segments are overwritten in place with fixed values of the same length, so the cross-reference
//! table stays valid and identical input always produces identical bytes.

use std::ops::Range;

/// Digits written over every timestamp, `1970-01-01 00:00:00`.
const FIXED_TIMESTAMP: &[u8] = b"19700101000000";

/// Delimiters of the timestamps written by the PDF writer.
const DATE_SEGMENTS: &[(&[u8], &[u8])] = &[
    (b"/CreationDate(", b")"),
    (b"/ModDate(", b")"),
    (b"<xmp:CreateDate>", b"</xmp:CreateDate>"),
    (b"<xmp:ModifyDate>", b"</xmp:ModifyDate>"),
    (b"<xmp:MetadataDate>", b"</xmp:MetadataDate>"),
];

/// Delimiters of the random document identifiers.
const ID_SEGMENTS: &[(&[u8], &[u8])] = &[
    (b"/ID[", b"]"),
    (b"<xmpMM:DocumentID>", b"</xmpMM:DocumentID>"),
    (b"<xmpMM:InstanceID>", b"</xmpMM:InstanceID>"),
    (b"<xmpMM:VersionID>", b"</xmpMM:VersionID>"),
];

/// Overwrites creation dates and document identifiers in `bytes`.
pub fn normalize_metadata(bytes: &mut [u8]) {
    for (start, end) in DATE_SEGMENTS {
        for range in segments(bytes, start, end) {
            stamp(&mut bytes[range]);
        }
    }

    for (start, end) in ID_SEGMENTS {
        for range in segments(bytes, start, end) {
            blank(&mut bytes[range]);
        }
    }
}

/// Finds the byte ranges enclosed by `start` and `end`.
fn segments(data: &[u8], start: &[u8], end: &[u8]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut offset = 0;

    while let Some(found) = find(&data[offset..], start) {
        let content_start = offset + found + start.len();
        let Some(length) = find(&data[content_start..], end) else {
            break;
        };
        ranges.push(content_start..content_start + length);
        offset = content_start + length + end.len();
    }

    ranges
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn stamp(segment: &mut [u8]) {
    let mut digits = FIXED_TIMESTAMP.iter().copied().chain(std::iter::repeat(b'0'));
    for byte in segment.iter_mut().filter(|byte| byte.is_ascii_digit()) {
        *byte = digits.next().unwrap_or(b'0');
    }
}

fn blank(segment: &mut [u8]) {
    for byte in segment.iter_mut() {
        if !matches!(
            *byte,
            b'<' | b'>' | b'(' | b')' | b'/' | b' ' | b'\n' | b'\r' | b'\t'
        ) {
            *byte = b'0';
        }
    }
}
