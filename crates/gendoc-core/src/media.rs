use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use crate::error::GendocError;

/// Height inline images are scaled down to so they fit into a line of text.
pub const INLINE_IMAGE_HEIGHT: u32 = 22;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct EmbeddedImage {
    pub mime: &'static str,
    pub width: u32,
    pub height: u32,
    /// Base64 encoded file contents.
    #[serde(skip)]
    pub data: String,
}

impl EmbeddedImage {
    pub fn load(path: &Path) -> Result<Self, GendocError> {
        let bytes = fs::read(path).map_err(|err| GendocError::io(path, err))?;
        Self::from_bytes(&bytes).ok_or_else(|| GendocError::Image {
            path: path.to_path_buf(),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (mime, width, height) = sniff(bytes)?;
        Some(Self {
            mime,
            width,
            height,
            data: STANDARD.encode(bytes),
        })
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.data)
    }

    /// Scales the declared size down proportionally so it is at most
    /// `max_height` pixels high. The image data itself is left untouched.
    pub fn fit_height(mut self, max_height: u32) -> Self {
        if self.height > max_height {
            self.width = ((u64::from(self.width) * u64::from(max_height)) / u64::from(self.height))
                as u32;
            self.height = max_height;
        }
        self
    }
}

/// Detects the image format from its header and reads its pixel size.
pub fn sniff(bytes: &[u8]) -> Option<(&'static str, u32, u32)> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        return Some(("image/png", be32(bytes, 16)?, be32(bytes, 20)?));
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return Some((
            "image/gif",
            u32::from(le16(bytes, 6)?),
            u32::from(le16(bytes, 8)?),
        ));
    }
    if bytes.starts_with(b"BM") {
        let width = le32(bytes, 18)? as i32;
        let height = le32(bytes, 22)? as i32;
        return Some(("image/bmp", width.unsigned_abs(), height.unsigned_abs()));
    }
    if bytes.starts_with(&[0xff, 0xd8]) {
        return jpeg_size(bytes).map(|(w, h)| ("image/jpeg", w, h));
    }
    if bytes.len() > 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return webp_size(bytes).map(|(w, h)| ("image/webp", w, h));
    }
    None
}

fn jpeg_size(bytes: &[u8]) -> Option<(u32, u32)> {
    let mut pos = 2;
    loop {
        while *bytes.get(pos)? != 0xff {
            pos += 1;
        }
        while *bytes.get(pos)? == 0xff {
            pos += 1;
        }
        let marker = *bytes.get(pos)?;
        pos += 1;
        match marker {
            0xd8 | 0x01 | 0xd0..=0xd7 => continue,
            0xc0..=0xcf if !matches!(marker, 0xc4 | 0xc8 | 0xcc) => {
                let height = be16(bytes, pos + 3)?;
                let width = be16(bytes, pos + 5)?;
                return Some((u32::from(width), u32::from(height)));
            }
            _ => pos += usize::from(be16(bytes, pos)?),
        }
    }
}

fn webp_size(bytes: &[u8]) -> Option<(u32, u32)> {
    match bytes.get(12..16)? {
        b"VP8 " => Some((
            u32::from(le16(bytes, 26)? & 0x3fff),
            u32::from(le16(bytes, 28)? & 0x3fff),
        )),
        b"VP8L" => {
            let b = bytes.get(21..25)?;
            let width = 1 + (((u32::from(b[1]) & 0x3f) << 8) | u32::from(b[0]));
            let height = 1
                + (((u32::from(b[3]) & 0x0f) << 10)
                    | (u32::from(b[2]) << 2)
                    | ((u32::from(b[1]) & 0xc0) >> 6));
            Some((width, height))
        }
        b"VP8X" => Some((1 + le24(bytes, 24)?, 1 + le24(bytes, 27)?)),
        _ => None,
    }
}

fn be16(bytes: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_be_bytes(bytes.get(at..at + 2)?.try_into().ok()?))
}

fn be32(bytes: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_be_bytes(bytes.get(at..at + 4)?.try_into().ok()?))
}

fn le16(bytes: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_le_bytes(bytes.get(at..at + 2)?.try_into().ok()?))
}

fn le24(bytes: &[u8], at: usize) -> Option<u32> {
    let b = bytes.get(at..at + 3)?;
    Some(u32::from(b[0]) | (u32::from(b[1]) << 8) | (u32::from(b[2]) << 16))
}

fn le32(bytes: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_le_bytes(bytes.get(at..at + 4)?.try_into().ok()?))
}
