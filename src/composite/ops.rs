use crate::document::blend::BlendMode;

/// Straight-alpha RGBA in `[0, 1]` used while accumulating a composite.
pub type RgbaF32 = [f32; 4];

type Rgb = [f32; 3];

/// Composite one straight-alpha RGBA8 source pixel onto an accumulator pixel.
///
/// `opacity` scales the source alpha. The blended colour `B(Cb, Cs)` is mixed with the source by
/// backdrop alpha before source-over, so any mode over a transparent backdrop yields the source:
///
/// ```text
/// sa   = src_a * opacity
/// Cs'  = (1 - ab) * Cs + ab * B(Cb, Cs)
/// outA = sa + ab * (1 - sa)
/// outC = (Cs' * sa + Cb * ab * (1 - sa)) / outA
/// ```
pub fn composite_pixel(dst: &mut RgbaF32, src: [u8; 4], mode: BlendMode, opacity: f32) {
    let sa = (f32::from(src[3]) / 255.0) * opacity.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }

    let cs = [
        f32::from(src[0]) / 255.0,
        f32::from(src[1]) / 255.0,
        f32::from(src[2]) / 255.0,
    ];
    let cb = [dst[0], dst[1], dst[2]];
    let ab = dst[3];

    let mixed = if ab > 0.0 && mode != BlendMode::Normal {
        let b = blend_rgb(mode, cb, cs);
        [
            (1.0 - ab) * cs[0] + ab * b[0],
            (1.0 - ab) * cs[1] + ab * b[1],
            (1.0 - ab) * cs[2] + ab * b[2],
        ]
    } else {
        cs
    };

    let out_a = sa + ab * (1.0 - sa);
    if out_a <= 0.0 {
        *dst = [0.0; 4];
        return;
    }
    for i in 0..3 {
        dst[i] = ((mixed[i] * sa + cb[i] * ab * (1.0 - sa)) / out_a).clamp(0.0, 1.0);
    }
    dst[3] = out_a.clamp(0.0, 1.0);
}

/// Blend backdrop `cb` with source `cs` under `mode`. Inputs and outputs are in `[0, 1]`.
pub fn blend_rgb(mode: BlendMode, cb: Rgb, cs: Rgb) -> Rgb {
    match mode {
        BlendMode::DarkerColor => {
            if lum(cs) < lum(cb) {
                cs
            } else {
                cb
            }
        }
        BlendMode::LighterColor => {
            if lum(cs) > lum(cb) {
                cs
            } else {
                cb
            }
        }
        BlendMode::Hue => set_lum(set_sat(cs, sat(cb)), lum(cb)),
        BlendMode::Saturation => set_lum(set_sat(cb, sat(cs)), lum(cb)),
        BlendMode::Color => set_lum(cs, lum(cb)),
        BlendMode::Luminosity => set_lum(cb, lum(cs)),
        separable => [
            blend_channel(separable, cb[0], cs[0]),
            blend_channel(separable, cb[1], cs[1]),
            blend_channel(separable, cb[2], cs[2]),
        ],
    }
}

fn blend_channel(mode: BlendMode, cb: f32, cs: f32) -> f32 {
    let v = match mode {
        BlendMode::Normal => cs,
        BlendMode::Darken => cb.min(cs),
        BlendMode::Multiply => cb * cs,
        BlendMode::ColorBurn => color_burn(cb, cs),
        BlendMode::LinearBurn => cb + cs - 1.0,
        BlendMode::Lighten => cb.max(cs),
        BlendMode::Screen => screen(cb, cs),
        BlendMode::ColorDodge => color_dodge(cb, cs),
        BlendMode::LinearDodge => cb + cs,
        BlendMode::Overlay => hard_light(cs, cb),
        BlendMode::SoftLight => soft_light(cb, cs),
        BlendMode::HardLight => hard_light(cb, cs),
        BlendMode::VividLight => {
            if cs <= 0.5 {
                color_burn(cb, 2.0 * cs)
            } else {
                color_dodge(cb, 2.0 * (cs - 0.5))
            }
        }
        BlendMode::LinearLight => cb + 2.0 * cs - 1.0,
        BlendMode::PinLight => {
            if cs <= 0.5 {
                cb.min(2.0 * cs)
            } else {
                cb.max(2.0 * cs - 1.0)
            }
        }
        BlendMode::HardMix => {
            if cb + cs >= 1.0 {
                1.0
            } else {
                0.0
            }
        }
        BlendMode::Difference => (cb - cs).abs(),
        BlendMode::Exclusion => cb + cs - 2.0 * cb * cs,
        BlendMode::Subtract => cb - cs,
        BlendMode::Divide => {
            if cs <= 0.0 {
                if cb <= 0.0 { 0.0 } else { 1.0 }
            } else {
                cb / cs
            }
        }
        BlendMode::DarkerColor
        | BlendMode::LighterColor
        | BlendMode::Hue
        | BlendMode::Saturation
        | BlendMode::Color
        | BlendMode::Luminosity => cs,
    };
    v.clamp(0.0, 1.0)
}

fn screen(cb: f32, cs: f32) -> f32 {
    cb + cs - cb * cs
}

fn hard_light(cb: f32, cs: f32) -> f32 {
    if cs <= 0.5 {
        cb * 2.0 * cs
    } else {
        screen(cb, 2.0 * cs - 1.0)
    }
}

fn color_dodge(cb: f32, cs: f32) -> f32 {
    if cb <= 0.0 {
        0.0
    } else if cs >= 1.0 {
        1.0
    } else {
        (cb / (1.0 - cs)).min(1.0)
    }
}

fn color_burn(cb: f32, cs: f32) -> f32 {
    if cb >= 1.0 {
        1.0
    } else if cs <= 0.0 {
        0.0
    } else {
        1.0 - ((1.0 - cb) / cs).min(1.0)
    }
}

fn soft_light(cb: f32, cs: f32) -> f32 {
    if cs <= 0.5 {
        cb - (1.0 - 2.0 * cs) * cb * (1.0 - cb)
    } else {
        let d = if cb <= 0.25 {
            ((16.0 * cb - 12.0) * cb + 4.0) * cb
        } else {
            cb.sqrt()
        };
        cb + (2.0 * cs - 1.0) * (d - cb)
    }
}

fn lum(c: Rgb) -> f32 {
    0.3 * c[0] + 0.59 * c[1] + 0.11 * c[2]
}

fn clip_color(c: Rgb) -> Rgb {
    let l = lum(c);
    let n = c[0].min(c[1]).min(c[2]);
    let x = c[0].max(c[1]).max(c[2]);
    let mut out = c;
    if n < 0.0 {
        for v in &mut out {
            *v = l + (*v - l) * l / (l - n);
        }
    }
    if x > 1.0 {
        for v in &mut out {
            *v = l + (*v - l) * (1.0 - l) / (x - l);
        }
    }
    out
}

fn set_lum(c: Rgb, l: f32) -> Rgb {
    let d = l - lum(c);
    clip_color([c[0] + d, c[1] + d, c[2] + d]).map(|v| v.clamp(0.0, 1.0))
}

fn sat(c: Rgb) -> f32 {
    c[0].max(c[1]).max(c[2]) - c[0].min(c[1]).min(c[2])
}

fn set_sat(c: Rgb, s: f32) -> Rgb {
    let mut idx = [0usize, 1, 2];
    idx.sort_by(|&a, &b| c[a].total_cmp(&c[b]));
    let [lo, mid, hi] = idx;

    let mut out = [0.0f32; 3];
    if c[hi] > c[lo] {
        out[mid] = (c[mid] - c[lo]) * s / (c[hi] - c[lo]);
        out[hi] = s;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/composite/ops.rs"]
mod tests;
