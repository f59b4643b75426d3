//! Minimal layered PSD codec: 8-bit RGB with transparency, raw (uncompressed) channels.
//!
//! The writer emits a file Photoshop-compatible readers open as a layered RGB document:
//!
//! 1. file header (`8BPS`, version 1, 4 channels, depth 8, RGB)
//! 2. empty colour-mode data and image resources
//! 3. layer and mask information: one record per layer (bottom first) with a Unicode
//!    (`luni`) name, followed by raw planar channel data
//! 4. the flattened composite as raw planar R, G, B, A
//!
//! The reader understands what the writer produces plus positive layer offsets and extra
//! channels (masks are skipped). Compressed channel data is rejected.

use crate::codec::boundary::{
    DecodedDocument, DecodedLayer, DocumentHeader, DocumentReader, DocumentWriter, EncodeLayer,
};
use crate::document::blend::BlendMode;
use crate::foundation::core::Canvas;
use crate::foundation::error::{LayerstackError, LayerstackResult};
use crate::pixel::buffer::{CHANNELS, PixelBuffer};

/// Largest width or height a version-1 PSD file can hold.
pub const MAX_PSD_DIMENSION: u32 = 30_000;

/// File extension used for documents written by [`PsdCodec`].
pub const PSD_EXTENSION: &str = "psd";

const SIGNATURE: &[u8; 4] = b"8BPS";
const RESOURCE_SIGNATURE: &[u8; 4] = b"8BIM";
const COLOR_MODE_RGB: u16 = 3;
const COMPRESSION_RAW: u16 = 0;
const CHANNEL_IDS: [i16; 4] = [0, 1, 2, -1];

/// Layered PSD writer/reader.
#[derive(Clone, Copy, Debug, Default)]
pub struct PsdCodec;

impl PsdCodec {
    /// Create a codec.
    pub fn new() -> Self {
        Self
    }
}

impl DocumentWriter for PsdCodec {
    fn encode_layered_document(
        &mut self,
        header: &DocumentHeader,
        layers: &[EncodeLayer<'_>],
        composite: &PixelBuffer,
    ) -> LayerstackResult<Vec<u8>> {
        let canvas = header.canvas;
        check_dimensions(canvas)?;
        if composite.size() != canvas {
            return Err(LayerstackError::codec(format!(
                "composite is {}x{} but canvas is {}x{}",
                composite.width(),
                composite.height(),
                canvas.width,
                canvas.height
            )));
        }
        let count = i16::try_from(layers.len())
            .map_err(|_| LayerstackError::codec("too many layers for a PSD file"))?;

        let mut out = Vec::with_capacity(64 + composite.as_bytes().len() * 2);
        out.extend_from_slice(SIGNATURE);
        put_u16(&mut out, 1);
        out.extend_from_slice(&[0u8; 6]);
        put_u16(&mut out, CHANNELS as u16);
        put_u32(&mut out, canvas.height);
        put_u32(&mut out, canvas.width);
        put_u16(&mut out, 8);
        put_u16(&mut out, COLOR_MODE_RGB);

        // Colour-mode data and image resources.
        put_u32(&mut out, 0);
        put_u32(&mut out, 0);

        let layer_info = encode_layer_info(count, layers)?;
        let mut lmi = Vec::with_capacity(layer_info.len() + 8);
        put_len(&mut lmi, layer_info.len())?;
        lmi.extend_from_slice(&layer_info);
        // Global layer mask info.
        put_u32(&mut lmi, 0);
        put_len(&mut out, lmi.len())?;
        out.extend_from_slice(&lmi);

        put_u16(&mut out, COMPRESSION_RAW);
        for c in 0..CHANNELS {
            push_plane(&mut out, composite, c);
        }
        Ok(out)
    }
}

fn encode_layer_info(count: i16, layers: &[EncodeLayer<'_>]) -> LayerstackResult<Vec<u8>> {
    let mut info = Vec::new();
    put_i16(&mut info, count);

    for l in layers {
        let size = l.pixels.size();
        check_dimensions(size)?;
        let plane_len = u32::try_from(size.pixel_count() + 2)
            .map_err(|_| LayerstackError::codec("layer channel too large"))?;

        put_i32(&mut info, 0);
        put_i32(&mut info, 0);
        put_i32(&mut info, size.height as i32);
        put_i32(&mut info, size.width as i32);

        put_u16(&mut info, CHANNEL_IDS.len() as u16);
        for id in CHANNEL_IDS {
            put_i16(&mut info, id);
            put_u32(&mut info, plane_len);
        }

        info.extend_from_slice(RESOURCE_SIGNATURE);
        info.extend_from_slice(&l.blend_mode.psd_key());
        info.push(l.opacity);
        info.push(0); // clipping: base
        info.push(0); // flags: visible
        info.push(0); // filler

        let extra = encode_layer_extra(l.name)?;
        put_len(&mut info, extra.len())?;
        info.extend_from_slice(&extra);
    }

    for l in layers {
        for c in 0..CHANNELS {
            put_u16(&mut info, COMPRESSION_RAW);
            push_plane(&mut info, l.pixels, c);
        }
    }

    if info.len() % 2 != 0 {
        info.push(0);
    }
    Ok(info)
}

fn encode_layer_extra(name: &str) -> LayerstackResult<Vec<u8>> {
    let mut extra = Vec::new();
    // Layer mask and blending ranges.
    put_u32(&mut extra, 0);
    put_u32(&mut extra, 0);

    let legacy: Vec<u8> = name
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c as u8 } else { b'?' })
        .take(255)
        .collect();
    extra.push(legacy.len() as u8);
    extra.extend_from_slice(&legacy);
    pad_to(&mut extra, 1 + legacy.len(), 4);

    let units: Vec<u16> = name.encode_utf16().collect();
    let mut luni = Vec::with_capacity(4 + units.len() * 2);
    put_len(&mut luni, units.len())?;
    for u in units {
        put_u16(&mut luni, u);
    }
    let unpadded = luni.len();
    pad_to(&mut luni, unpadded, 4);

    extra.extend_from_slice(RESOURCE_SIGNATURE);
    extra.extend_from_slice(b"luni");
    put_len(&mut extra, luni.len())?;
    extra.extend_from_slice(&luni);
    Ok(extra)
}

impl DocumentReader for PsdCodec {
    fn decode_layered_document(&mut self, bytes: &[u8]) -> LayerstackResult<DecodedDocument> {
        let mut r = ByteReader::new(bytes);

        if r.take(4)? != SIGNATURE {
            return Err(LayerstackError::codec("missing 8BPS signature"));
        }
        let version = r.u16()?;
        if version != 1 {
            return Err(LayerstackError::codec(format!(
                "unsupported PSD version {version}"
            )));
        }
        r.skip(6)?;
        let _channels = r.u16()?;
        let height = r.u32()?;
        let width = r.u32()?;
        let depth = r.u16()?;
        if depth != 8 {
            return Err(LayerstackError::codec(format!(
                "unsupported bit depth {depth}"
            )));
        }
        let mode = r.u16()?;
        if mode != COLOR_MODE_RGB {
            return Err(LayerstackError::codec(format!(
                "unsupported colour mode {mode}"
            )));
        }
        let canvas = Canvas::new(width, height);

        let color_data_len = r.u32()? as usize;
        r.skip(color_data_len)?;
        let resources_len = r.u32()? as usize;
        r.skip(resources_len)?;

        let lmi_len = r.u32()? as usize;
        if lmi_len == 0 {
            return Ok(DecodedDocument {
                canvas,
                layers: Vec::new(),
            });
        }
        let layer_info_len = r.u32()? as usize;
        if layer_info_len == 0 {
            return Ok(DecodedDocument {
                canvas,
                layers: Vec::new(),
            });
        }

        let count = r.i16()?.unsigned_abs() as usize;
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            records.push(read_layer_record(&mut r)?);
        }

        let mut layers = Vec::with_capacity(count);
        for rec in records {
            layers.push(read_layer_pixels(&mut r, rec)?);
        }

        Ok(DecodedDocument { canvas, layers })
    }
}

struct LayerRecord {
    top: i32,
    left: i32,
    bottom: i32,
    right: i32,
    channels: Vec<(i16, usize)>,
    blend_mode: BlendMode,
    opacity: u8,
    name: String,
}

fn read_layer_record(r: &mut ByteReader<'_>) -> LayerstackResult<LayerRecord> {
    let top = r.i32()?;
    let left = r.i32()?;
    let bottom = r.i32()?;
    let right = r.i32()?;

    let n = r.u16()? as usize;
    let mut channels = Vec::with_capacity(n);
    for _ in 0..n {
        let id = r.i16()?;
        let len = r.u32()? as usize;
        channels.push((id, len));
    }

    if r.take(4)? != RESOURCE_SIGNATURE {
        return Err(LayerstackError::codec("layer record missing 8BIM signature"));
    }
    let key = r.take(4)?;
    let blend_mode = BlendMode::from_psd_key(key).ok_or_else(|| {
        LayerstackError::codec(format!(
            "unsupported blend key '{}'",
            String::from_utf8_lossy(key)
        ))
    })?;
    let opacity = r.u8()?;
    let _clipping = r.u8()?;
    let _flags = r.u8()?;
    let _filler = r.u8()?;

    let extra_len = r.u32()? as usize;
    let extra_end = r.pos + extra_len;
    let mask_len = r.u32()? as usize;
    r.skip(mask_len)?;
    let ranges_len = r.u32()? as usize;
    r.skip(ranges_len)?;

    let name_len = r.u8()? as usize;
    let mut name: String = r.take(name_len)?.iter().map(|&b| char::from(b)).collect();
    let consumed = 1 + name_len;
    r.skip((4 - consumed % 4) % 4)?;

    while r.pos + 12 <= extra_end {
        let sig = r.take(4)?;
        if sig != RESOURCE_SIGNATURE && sig != b"8B64" {
            break;
        }
        let key = r.take(4)?;
        let len = r.u32()? as usize;
        let data = r.take(len)?;
        if key == b"luni" {
            name = decode_unicode_name(data)?;
        }
    }
    r.seek(extra_end)?;

    Ok(LayerRecord {
        top,
        left,
        bottom,
        right,
        channels,
        blend_mode,
        opacity,
        name,
    })
}

fn decode_unicode_name(data: &[u8]) -> LayerstackResult<String> {
    let mut r = ByteReader::new(data);
    let count = r.u32()? as usize;
    let mut units = Vec::with_capacity(count);
    for _ in 0..count {
        units.push(r.u16()?);
    }
    let s = String::from_utf16(&units)
        .map_err(|e| LayerstackError::codec(format!("invalid unicode layer name: {e}")))?;
    Ok(s.trim_end_matches('\0').to_string())
}

fn read_layer_pixels(r: &mut ByteReader<'_>, rec: LayerRecord) -> LayerstackResult<DecodedLayer> {
    if rec.top < 0 || rec.left < 0 {
        return Err(LayerstackError::codec(format!(
            "layer '{}' has negative offset ({}, {})",
            rec.name, rec.left, rec.top
        )));
    }
    if rec.right < rec.left || rec.bottom < rec.top {
        return Err(LayerstackError::codec(format!(
            "layer '{}' has an invalid rectangle (top {}, left {}, bottom {}, right {})",
            rec.name, rec.top, rec.left, rec.bottom, rec.right
        )));
    }
    // Both corners are non-negative and ordered, so the differences cannot overflow.
    let layer_w = (rec.right - rec.left) as usize;
    let layer_h = (rec.bottom - rec.top) as usize;
    let full = Canvas::new(rec.right as u32, rec.bottom as u32);
    check_dimensions_allow_empty(full)?;

    let mut planes: [Option<&[u8]>; CHANNELS] = [None; CHANNELS];
    for &(id, len) in &rec.channels {
        if len < 2 {
            return Err(LayerstackError::codec(format!(
                "layer '{}' channel {id} is truncated",
                rec.name
            )));
        }
        let compression = r.u16()?;
        let data = r.take(len - 2)?;
        let slot = match id {
            0 => Some(0),
            1 => Some(1),
            2 => Some(2),
            -1 => Some(3),
            _ => None,
        };
        let Some(slot) = slot else {
            continue;
        };
        if compression != COMPRESSION_RAW {
            return Err(LayerstackError::codec(format!(
                "layer '{}' channel {id} uses unsupported compression {compression}",
                rec.name
            )));
        }
        if data.len() != layer_w * layer_h {
            return Err(LayerstackError::codec(format!(
                "layer '{}' channel {id} has {} bytes, expected {}",
                rec.name,
                data.len(),
                layer_w * layer_h
            )));
        }
        planes[slot] = Some(data);
    }

    let full_w = full.width as usize;
    let mut rgba = vec![0u8; full.pixel_count() * CHANNELS];
    let (left, top) = (rec.left as usize, rec.top as usize);
    for y in 0..layer_h {
        for x in 0..layer_w {
            let src = y * layer_w + x;
            let dst = ((top + y) * full_w + (left + x)) * CHANNELS;
            for (c, plane) in planes.iter().enumerate() {
                rgba[dst + c] = match plane {
                    Some(p) => p[src],
                    None if c == 3 => u8::MAX,
                    None => 0,
                };
            }
        }
    }

    Ok(DecodedLayer {
        pixels: PixelBuffer::from_rgba8(full.width, full.height, rgba)?,
        name: rec.name,
        blend_mode: rec.blend_mode,
        opacity: rec.opacity,
    })
}

fn check_dimensions(size: Canvas) -> LayerstackResult<()> {
    if size.is_empty() {
        return Err(LayerstackError::codec(format!(
            "cannot encode a {}x{} image",
            size.width, size.height
        )));
    }
    check_dimensions_allow_empty(size)
}

fn check_dimensions_allow_empty(size: Canvas) -> LayerstackResult<()> {
    if size.width > MAX_PSD_DIMENSION || size.height > MAX_PSD_DIMENSION {
        return Err(LayerstackError::codec(format!(
            "{}x{} exceeds the PSD limit of {MAX_PSD_DIMENSION} pixels per side",
            size.width, size.height
        )));
    }
    Ok(())
}

fn push_plane(out: &mut Vec<u8>, pixels: &PixelBuffer, channel: usize) {
    out.extend(
        pixels
            .as_bytes()
            .chunks_exact(CHANNELS)
            .map(|px| px[channel]),
    );
}

fn pad_to(out: &mut Vec<u8>, len: usize, align: usize) {
    let pad = (align - len % align) % align;
    out.extend(std::iter::repeat_n(0u8, pad));
}

fn put_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn put_i16(out: &mut Vec<u8>, v: i16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn put_i32(out: &mut Vec<u8>, v: i32) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn put_len(out: &mut Vec<u8>, len: usize) -> LayerstackResult<()> {
    let v = u32::try_from(len)
        .map_err(|_| LayerstackError::codec("section exceeds 4 GiB"))?;
    put_u32(out, v);
    Ok(())
}

struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> LayerstackResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                LayerstackError::codec(format!(
                    "unexpected end of data: need {n} bytes at offset {}",
                    self.pos
                ))
            })?;
        let out = &self.data[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn skip(&mut self, n: usize) -> LayerstackResult<()> {
        self.take(n).map(|_| ())
    }

    fn seek(&mut self, pos: usize) -> LayerstackResult<()> {
        if pos > self.data.len() {
            return Err(LayerstackError::codec(format!(
                "offset {pos} is past the end of data"
            )));
        }
        self.pos = pos;
        Ok(())
    }

    fn u8(&mut self) -> LayerstackResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> LayerstackResult<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn i16(&mut self) -> LayerstackResult<i16> {
        let b = self.take(2)?;
        Ok(i16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> LayerstackResult<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn i32(&mut self) -> LayerstackResult<i32> {
        let b = self.take(4)?;
        Ok(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/codec/psd.rs"]
mod tests;
