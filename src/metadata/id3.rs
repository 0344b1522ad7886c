//! Minimal ID3v2 text-frame reader.
//!
//! Walks the frames of the tag at the start of a file without going through
//! the tag library, so files whose tags it rejects can still yield a title.
//! Only text frames (`T???`, `TXXX` excluded) are collected.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::tags::RawFrames;

const HEADER_LEN: usize = 10;
const FLAG_EXTENDED_HEADER: u8 = 0x40;

/// Text frames of the ID3v2 tag of `path`, or `None` when it has none.
pub fn read_text_frames(path: &Path) -> Option<RawFrames> {
    let mut file = File::open(path).ok()?;
    let mut header = [0u8; HEADER_LEN];
    file.read_exact(&mut header).ok()?;
    if !header.starts_with(b"ID3") {
        return None;
    }

    let version = header[3];
    let flags = header[5];
    let size = synchsafe(&header[6..10]);
    let mut body = vec![0u8; size];
    file.read_exact(&mut body).ok()?;

    let start = if flags & FLAG_EXTENDED_HEADER != 0 && version >= 3 {
        extended_header_len(&body, version)?
    } else {
        0
    };
    Some(parse_frames(&body[start.min(body.len())..], version))
}

fn synchsafe(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .fold(0usize, |acc, &b| (acc << 7) | usize::from(b & 0x7f))
}

fn big_endian(bytes: &[u8]) -> usize {
    bytes.iter().fold(0usize, |acc, &b| (acc << 8) | usize::from(b))
}

fn extended_header_len(body: &[u8], version: u8) -> Option<usize> {
    let raw = body.get(0..4)?;
    Some(if version == 4 {
        // v2.4 counts the size field itself.
        synchsafe(raw)
    } else {
        big_endian(raw) + 4
    })
}

/// v2.2 uses three-letter ids; map the ones we care about to their v2.3 names.
fn modern_id(id: &str) -> Option<&str> {
    Some(match id {
        "TT2" => "TIT2",
        "TP1" => "TPE1",
        "TAL" => "TALB",
        _ if id.len() == 4 => id,
        _ => return None,
    })
}

fn parse_frames(body: &[u8], version: u8) -> RawFrames {
    let (id_len, header_len) = if version == 2 { (3, 6) } else { (4, 10) };
    let mut frames = RawFrames::new();
    let mut pos = 0;

    while pos + header_len <= body.len() {
        let id_bytes = &body[pos..pos + id_len];
        if id_bytes.iter().all(|&b| b == 0) {
            break;
        }
        let Ok(id) = std::str::from_utf8(id_bytes) else {
            break;
        };
        let size_bytes = &body[pos + id_len..pos + id_len + if version == 2 { 3 } else { 4 }];
        let size = if version == 4 {
            synchsafe(size_bytes)
        } else {
            big_endian(size_bytes)
        };

        let data_start = pos + header_len;
        let data_end = data_start + size;
        if size == 0 || data_end > body.len() {
            break;
        }

        if let Some(id) = modern_id(id).filter(|id| id.starts_with('T') && *id != "TXXX") {
            let text = decode_text(&body[data_start..data_end]);
            if !text.is_empty() {
                frames.entry(id.to_string()).or_insert(text);
            }
        }
        pos = data_end;
    }
    frames
}

/// Decode a text frame payload: one encoding byte, then the text.
fn decode_text(payload: &[u8]) -> String {
    let Some((&encoding, bytes)) = payload.split_first() else {
        return String::new();
    };
    let text: String = match encoding {
        0 => bytes.iter().map(|&b| char::from(b)).collect(),
        1 => match bytes {
            [0xFE, 0xFF, rest @ ..] => utf16(rest, true),
            [0xFF, 0xFE, rest @ ..] => utf16(rest, false),
            _ => utf16(bytes, false),
        },
        2 => utf16(bytes, true),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };
    // Multi-value frames are NUL separated; the first value is enough.
    text.split('\0').next().unwrap_or_default().trim().to_string()
}

fn utf16(bytes: &[u8], big: bool) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|p| {
            if big {
                u16::from_be_bytes([p[0], p[1]])
            } else {
                u16::from_le_bytes([p[0], p[1]])
            }
        })
        .take_while(|&u| u != 0)
        .collect();
    String::from_utf16_lossy(&units)
}
