/// Map a unit-range value to 8 bits, rounding to nearest. NaN maps to 0.
pub(crate) fn unit_to_u8(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub(crate) fn u8_to_unit(v: u8) -> f32 {
    f32::from(v) / 255.0
}

pub(crate) fn u16_to_u8(v: u16) -> u8 {
    ((u32::from(v) * 255 + 32767) / 65535) as u8
}
