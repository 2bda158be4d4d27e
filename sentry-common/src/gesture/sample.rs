use alloc::vec::Vec;

/// One angular-rate reading, rad/s.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Sample {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn from_axes(axes: [f32; 3]) -> Self {
        Self::new(axes[0], axes[1], axes[2])
    }

    pub const fn axes(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// Filtered samples in capture order. Length depends on how many data-ready
/// events fit in the capture window.
pub type Sequence = Vec<Sample>;
