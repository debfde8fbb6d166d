//! Viewport presets the preview pane can emulate.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewportPreset {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl ViewportPreset {
    /// CSS width of the emulated surface.
    pub fn css_width(self) -> &'static str {
        match self {
            ViewportPreset::Desktop => "100%",
            ViewportPreset::Tablet => "768px",
            ViewportPreset::Mobile => "375px",
        }
    }

    /// Device width in pixels. `None` fills the pane.
    pub fn width(self) -> Option<u32> {
        match self {
            ViewportPreset::Desktop => None,
            ViewportPreset::Tablet => Some(768),
            ViewportPreset::Mobile => Some(375),
        }
    }

    pub fn all() -> [ViewportPreset; 3] {
        [
            ViewportPreset::Desktop,
            ViewportPreset::Tablet,
            ViewportPreset::Mobile,
        ]
    }
}
