use glam::Vec3;

/// One component of a movement intent: back, still, or forward along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    Negative,
    #[default]
    Zero,
    Positive,
}

impl Axis {
    /// Combine a positive and a negative key state. Both held cancels out.
    pub fn from_keys(positive: bool, negative: bool) -> Self {
        match (positive, negative) {
            (true, false) => Self::Positive,
            (false, true) => Self::Negative,
            _ => Self::Zero,
        }
    }

    pub fn value(self) -> f32 {
        match self {
            Self::Negative => -1.0,
            Self::Zero => 0.0,
            Self::Positive => 1.0,
        }
    }
}

/// Per-frame movement request: forward/back, right/left, up/down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MovementIntent {
    pub forward: Axis,
    pub right: Axis,
    pub up: Axis,
}

impl MovementIntent {
    pub const NONE: Self = Self {
        forward: Axis::Zero,
        right: Axis::Zero,
        up: Axis::Zero,
    };

    pub fn new(forward: Axis, right: Axis, up: Axis) -> Self {
        Self { forward, right, up }
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::NONE
    }

    /// Weights as a vector `(forward, right, up)`, each in {-1, 0, 1}.
    pub fn weights(&self) -> Vec3 {
        Vec3::new(self.forward.value(), self.right.value(), self.up.value())
    }
}

/// Drawable surface size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    /// Zero-sized surfaces (minimised windows) are clamped to 1x1.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl Default for SurfaceSize {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}
