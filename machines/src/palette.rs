//! The four LCD shades and the two ways of showing them.

/// Display mode flipped by the display-mode toggle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Palette {
    /// Tinted to look like the green DMG screen.
    #[default]
    Corrected,
    /// Plain grey ramp.
    Raw,
}

const CORRECTED: [[u8; 4]; 4] = [
    [0xE0, 0xF8, 0xD0, 0xFF],
    [0x88, 0xC0, 0x70, 0xFF],
    [0x34, 0x68, 0x56, 0xFF],
    [0x08, 0x18, 0x20, 0xFF],
];

const RAW: [[u8; 4]; 4] = [
    [0xFF, 0xFF, 0xFF, 0xFF],
    [0xAA, 0xAA, 0xAA, 0xFF],
    [0x55, 0x55, 0x55, 0xFF],
    [0x00, 0x00, 0x00, 0xFF],
];

impl Palette {
    pub fn toggled(self) -> Self {
        match self {
            Self::Corrected => Self::Raw,
            Self::Raw => Self::Corrected,
        }
    }

    /// RGBA for shade 0 (lightest) to 3 (darkest).
    pub fn rgba(self, shade: u8) -> [u8; 4] {
        let table = match self {
            Self::Corrected => &CORRECTED,
            Self::Raw => &RAW,
        };
        table[(shade & 3) as usize]
    }
}
