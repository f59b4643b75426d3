/// Canvas extents in pixels, anchored at the origin.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Build a canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Component-wise maximum of two canvases.
    pub fn union(self, other: Self) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    /// `true` when either dimension is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// `true` when `other` fits inside this canvas.
    pub fn contains(self, other: Self) -> bool {
        self.width >= other.width && self.height >= other.height
    }

    /// Number of pixels covered.
    pub fn pixel_count(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }
}

impl From<(u32, u32)> for Canvas {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}
