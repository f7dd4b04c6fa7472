//! # Block Light Module
//!
//! Packed four-channel light value carried by every voxel: three colour channels
//! from glowing blocks plus one sunlight channel.

/// Lowest value of any light component.
pub const LIGHT_COMPONENT_MIN: u8 = 0;
/// Highest value of any light component.
pub const LIGHT_COMPONENT_MAX: u8 = 15;

/// Number of light channels per voxel.
pub const LIGHT_CHANNEL_COUNT: usize = 4;
/// Index of the sunlight channel.
pub const SUN_CHANNEL: usize = 3;

/// A packed light value: 4 bits each for red, green, blue and sun.
///
/// Bit layout, least significant first: `r | g << 4 | b << 8 | sun << 12`.
#[repr(transparent)]
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct BlockLight(u16);

impl BlockLight {
    /// Completely dark.
    pub const DARK: BlockLight = BlockLight(0);
    /// Open sky: full sunlight, no colour.
    pub const SKY: BlockLight = BlockLight((LIGHT_COMPONENT_MAX as u16) << 12);

    /// Packs four components, clamping each to `[LIGHT_COMPONENT_MIN, LIGHT_COMPONENT_MAX]`.
    pub fn new(r: u8, g: u8, b: u8, sun: u8) -> Self {
        let c = |v: u8| v.clamp(LIGHT_COMPONENT_MIN, LIGHT_COMPONENT_MAX) as u16;
        BlockLight(c(r) | c(g) << 4 | c(b) << 8 | c(sun) << 12)
    }

    /// Only sunlight, no colour.
    pub fn sun_only(sun: u8) -> Self {
        BlockLight::new(0, 0, 0, sun)
    }

    /// Reads channel `channel` (0 = red .. 3 = sun).
    #[inline]
    pub fn get(self, channel: usize) -> u8 {
        debug_assert!(channel < LIGHT_CHANNEL_COUNT);
        ((self.0 >> (channel * 4)) & 0xF) as u8
    }

    /// Returns a copy with channel `channel` replaced by `value` (clamped).
    #[inline]
    pub fn with(self, channel: usize, value: u8) -> Self {
        debug_assert!(channel < LIGHT_CHANNEL_COUNT);
        let shift = channel * 4;
        let value = value.min(LIGHT_COMPONENT_MAX) as u16;
        BlockLight((self.0 & !(0xF << shift)) | (value << shift))
    }

    /// Red component
    pub fn r(self) -> u8 {
        self.get(0)
    }

    /// Green component
    pub fn g(self) -> u8 {
        self.get(1)
    }

    /// Blue component
    pub fn b(self) -> u8 {
        self.get(2)
    }

    /// Sunlight component
    pub fn sun(self) -> u8 {
        self.get(SUN_CHANNEL)
    }

    /// True if every channel is zero.
    pub fn is_dark(self) -> bool {
        self.0 == 0
    }

    /// Per-channel maximum of two light values.
    pub fn max(self, other: BlockLight) -> BlockLight {
        let mut out = self;
        for c in 0..LIGHT_CHANNEL_COUNT {
            out = out.with(c, self.get(c).max(other.get(c)));
        }
        out
    }

    /// Normalised `[r, g, b, sun]`, each component divided by `LIGHT_COMPONENT_MAX`.
    pub fn to_rgba(self) -> [f32; 4] {
        let n = |v: u8| v as f32 / LIGHT_COMPONENT_MAX as f32;
        [n(self.r()), n(self.g()), n(self.b()), n(self.sun())]
    }
}

impl std::fmt::Debug for BlockLight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BlockLight(r: {}, g: {}, b: {}, sun: {})",
            self.r(),
            self.g(),
            self.b(),
            self.sun()
        )
    }
}
