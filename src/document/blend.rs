use std::fmt;
use std::str::FromStr;

use crate::foundation::error::LayerstackError;

/// How a layer's colour combines with the composite beneath it.
///
/// The set mirrors the raster layer modes of the layered-document format. Pass-through (group
/// only) and dissolve (random) are not representable.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlendMode {
    /// Source replaces backdrop.
    #[default]
    Normal,
    /// Per-channel minimum.
    Darken,
    /// Per-channel product.
    Multiply,
    /// Darkens backdrop by increasing contrast.
    ColorBurn,
    /// Sum minus one, clamped.
    LinearBurn,
    /// Whole colour with the lower luminosity.
    DarkerColor,
    /// Per-channel maximum.
    Lighten,
    /// Inverse product of inverses.
    Screen,
    /// Brightens backdrop by decreasing contrast.
    ColorDodge,
    /// Clamped sum.
    LinearDodge,
    /// Whole colour with the higher luminosity.
    LighterColor,
    /// Multiply or screen depending on the backdrop.
    Overlay,
    /// Soft darken/lighten depending on the source.
    SoftLight,
    /// Multiply or screen depending on the source.
    HardLight,
    /// Colour burn or dodge depending on the source.
    VividLight,
    /// Linear burn or dodge depending on the source.
    LinearLight,
    /// Darken or lighten depending on the source.
    PinLight,
    /// Threshold of the vivid-light result.
    HardMix,
    /// Absolute difference.
    Difference,
    /// Lower-contrast difference.
    Exclusion,
    /// Backdrop minus source, clamped.
    Subtract,
    /// Backdrop divided by source, clamped.
    Divide,
    /// Source hue with backdrop saturation and luminosity.
    Hue,
    /// Source saturation with backdrop hue and luminosity.
    Saturation,
    /// Source hue and saturation with backdrop luminosity.
    Color,
    /// Source luminosity with backdrop hue and saturation.
    Luminosity,
}

impl BlendMode {
    /// Every mode, in the order the layered-document format lists them.
    pub const ALL: [BlendMode; 26] = [
        Self::Normal,
        Self::Darken,
        Self::Multiply,
        Self::ColorBurn,
        Self::LinearBurn,
        Self::DarkerColor,
        Self::Lighten,
        Self::Screen,
        Self::ColorDodge,
        Self::LinearDodge,
        Self::LighterColor,
        Self::Overlay,
        Self::SoftLight,
        Self::HardLight,
        Self::VividLight,
        Self::LinearLight,
        Self::PinLight,
        Self::HardMix,
        Self::Difference,
        Self::Exclusion,
        Self::Subtract,
        Self::Divide,
        Self::Hue,
        Self::Saturation,
        Self::Color,
        Self::Luminosity,
    ];

    /// Canonical upper-snake-case name, e.g. `"SOFT_LIGHT"`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Darken => "DARKEN",
            Self::Multiply => "MULTIPLY",
            Self::ColorBurn => "COLOR_BURN",
            Self::LinearBurn => "LINEAR_BURN",
            Self::DarkerColor => "DARKER_COLOR",
            Self::Lighten => "LIGHTEN",
            Self::Screen => "SCREEN",
            Self::ColorDodge => "COLOR_DODGE",
            Self::LinearDodge => "LINEAR_DODGE",
            Self::LighterColor => "LIGHTER_COLOR",
            Self::Overlay => "OVERLAY",
            Self::SoftLight => "SOFT_LIGHT",
            Self::HardLight => "HARD_LIGHT",
            Self::VividLight => "VIVID_LIGHT",
            Self::LinearLight => "LINEAR_LIGHT",
            Self::PinLight => "PIN_LIGHT",
            Self::HardMix => "HARD_MIX",
            Self::Difference => "DIFFERENCE",
            Self::Exclusion => "EXCLUSION",
            Self::Subtract => "SUBTRACT",
            Self::Divide => "DIVIDE",
            Self::Hue => "HUE",
            Self::Saturation => "SATURATION",
            Self::Color => "COLOR",
            Self::Luminosity => "LUMINOSITY",
        }
    }

    /// Four-byte blend key stored in layered-document layer records.
    pub fn psd_key(self) -> [u8; 4] {
        *match self {
            Self::Normal => b"norm",
            Self::Darken => b"dark",
            Self::Multiply => b"mul ",
            Self::ColorBurn => b"idiv",
            Self::LinearBurn => b"lbrn",
            Self::DarkerColor => b"dkCl",
            Self::Lighten => b"lite",
            Self::Screen => b"scrn",
            Self::ColorDodge => b"div ",
            Self::LinearDodge => b"lddg",
            Self::LighterColor => b"lgCl",
            Self::Overlay => b"over",
            Self::SoftLight => b"sLit",
            Self::HardLight => b"hLit",
            Self::VividLight => b"vLit",
            Self::LinearLight => b"lLit",
            Self::PinLight => b"pLit",
            Self::HardMix => b"hMix",
            Self::Difference => b"diff",
            Self::Exclusion => b"smud",
            Self::Subtract => b"fsub",
            Self::Divide => b"fdiv",
            Self::Hue => b"hue ",
            Self::Saturation => b"sat ",
            Self::Color => b"colr",
            Self::Luminosity => b"lum ",
        }
    }

    /// Inverse of [`BlendMode::psd_key`].
    pub fn from_psd_key(key: &[u8]) -> Option<Self> {
        Some(match key {
            b"norm" => Self::Normal,
            b"dark" => Self::Darken,
            b"mul " => Self::Multiply,
            b"idiv" => Self::ColorBurn,
            b"lbrn" => Self::LinearBurn,
            b"dkCl" => Self::DarkerColor,
            b"lite" => Self::Lighten,
            b"scrn" => Self::Screen,
            b"div " => Self::ColorDodge,
            b"lddg" => Self::LinearDodge,
            b"lgCl" => Self::LighterColor,
            b"over" => Self::Overlay,
            b"sLit" => Self::SoftLight,
            b"hLit" => Self::HardLight,
            b"vLit" => Self::VividLight,
            b"lLit" => Self::LinearLight,
            b"pLit" => Self::PinLight,
            b"hMix" => Self::HardMix,
            b"diff" => Self::Difference,
            b"smud" => Self::Exclusion,
            b"fsub" => Self::Subtract,
            b"fdiv" => Self::Divide,
            b"hue " => Self::Hue,
            b"sat " => Self::Saturation,
            b"colr" => Self::Color,
            b"lum " => Self::Luminosity,
            _ => return None,
        })
    }

    /// `true` for modes computed per channel.
    pub fn is_separable(self) -> bool {
        !matches!(
            self,
            Self::DarkerColor
                | Self::LighterColor
                | Self::Hue
                | Self::Saturation
                | Self::Color
                | Self::Luminosity
        )
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlendMode {
    type Err = LayerstackError;

    /// Case-insensitive; `_`, `-` and spaces are ignored (`"soft light"` == `"SOFT_LIGHT"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .map(|c| c.to_ascii_uppercase())
            .collect();
        Ok(match key.as_str() {
            "NORMAL" => Self::Normal,
            "DARKEN" => Self::Darken,
            "MULTIPLY" => Self::Multiply,
            "COLORBURN" => Self::ColorBurn,
            "LINEARBURN" => Self::LinearBurn,
            "DARKERCOLOR" => Self::DarkerColor,
            "LIGHTEN" => Self::Lighten,
            "SCREEN" => Self::Screen,
            "COLORDODGE" => Self::ColorDodge,
            "LINEARDODGE" => Self::LinearDodge,
            "LIGHTERCOLOR" => Self::LighterColor,
            "OVERLAY" => Self::Overlay,
            "SOFTLIGHT" => Self::SoftLight,
            "HARDLIGHT" => Self::HardLight,
            "VIVIDLIGHT" => Self::VividLight,
            "LINEARLIGHT" => Self::LinearLight,
            "PINLIGHT" => Self::PinLight,
            "HARDMIX" => Self::HardMix,
            "DIFFERENCE" => Self::Difference,
            "EXCLUSION" => Self::Exclusion,
            "SUBTRACT" => Self::Subtract,
            "DIVIDE" => Self::Divide,
            "HUE" => Self::Hue,
            "SATURATION" => Self::Saturation,
            "COLOR" => Self::Color,
            "LUMINOSITY" => Self::Luminosity,
            _ => return Err(LayerstackError::unknown_blend_mode(s)),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/blend.rs"]
mod tests;
