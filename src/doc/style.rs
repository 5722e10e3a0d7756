//! Style value types folded by the override-tag evaluator.

/// A color in the script's `&HBBGGRR&` byte order.
///
/// The blue channel sits in the low byte, matching what a hex literal in an
/// override tag parses to. [`Color::to_rgb`] swaps into the packed-RGB32
/// order the compositor writes.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    /// Build from red/green/blue components.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(u32::from(r) | u32::from(g) << 8 | u32::from(b) << 16)
    }

    /// Swap the red and blue channels into framebuffer order.
    pub(crate) fn to_rgb(self) -> u32 {
        let c = self.0;
        ((c & 0xff0000) >> 16) + (c & 0xff00) + ((c & 0xff) << 16)
    }
}

/// Numpad-style screen alignment, `1..=9`.
///
/// `1` is bottom-left, `5` dead center, `9` top-right, following the
/// on-screen keypad layout.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct Alignment(u8);

impl Alignment {
    /// Validate a numpad code.
    pub fn new(n: u8) -> Option<Self> {
        (1..=9).contains(&n).then_some(Self(n))
    }

    /// The raw numpad code.
    pub fn numpad(self) -> u8 {
        self.0
    }

    /// Convert a legacy SSA `\a` code (1..=11) to numpad form.
    pub fn from_legacy(n: u8) -> Option<Self> {
        if !(1..=11).contains(&n) {
            return None;
        }
        let v = (((n - 1) & 3) + 1)
            + if n & 4 != 0 { 6 } else { 0 }
            + if n & 8 != 0 { 3 } else { 0 };
        Self::new(v)
    }

    /// 1 = left column, 2 = center, 0 = right.
    pub(crate) fn column(self) -> u8 {
        self.0 % 3
    }

    pub(crate) fn is_bottom(self) -> bool {
        self.0 <= 3
    }

    pub(crate) fn is_middle(self) -> bool {
        (4..=6).contains(&self.0)
    }
}

impl Default for Alignment {
    fn default() -> Self {
        Self(2)
    }
}

/// How the outline/shadow region around a word is produced.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
pub enum BorderStyle {
    /// Dilate the glyph region by the outline width.
    #[default]
    Outline,
    /// Paint a filled box behind the word instead.
    OpaqueBox,
}

/// Line wrapping behavior, selected per event by `\q`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
pub enum WrapStyle {
    /// Balance lines toward equal widths, upper line wider.
    #[default]
    Smart,
    /// Break at the last word that fits.
    EndOfLine,
    /// Only break on explicit `\n`/`\N`.
    None,
    /// Like `Smart` but the lower line is wider.
    SmartLower,
}

impl WrapStyle {
    pub(crate) fn from_code(n: i32) -> Option<Self> {
        match n {
            0 => Some(Self::Smart),
            1 => Some(Self::EndOfLine),
            2 => Some(Self::None),
            3 => Some(Self::SmartLower),
            _ => None,
        }
    }

    /// Whether a soft `\n` collapses to a space under this mode.
    pub(crate) fn collapses_soft_breaks(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Coordinate space for positions, margins and rect clips.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
pub enum RelativeTo {
    /// The whole destination surface.
    #[default]
    Screen,
    /// The active video rectangle inside the surface.
    Video,
}

/// Event/style margins in script pixels; a zero entry falls back to the
/// style's margin.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
pub struct Margins {
    /// Left margin.
    pub left: i32,
    /// Right margin.
    pub right: i32,
    /// Top margin.
    pub top: i32,
    /// Bottom margin.
    pub bottom: i32,
}

impl Margins {
    /// Uniform margins on all sides.
    pub fn uniform(m: i32) -> Self {
        Self { left: m, right: m, top: m, bottom: m }
    }
}

/// The resolved visual state of a run of text.
///
/// A fresh value is produced for every run by folding override tags over the
/// event's base style; nothing holds one mutably across consumers. Length
/// fields (outline, shadow, spacing, size) are in script pixels until the
/// subtitle assembly scales them into the 1/8-pixel layout space.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StyleState {
    /// Font family name.
    pub font_name: String,
    /// Font size in script pixels.
    pub font_size: f64,
    /// Weight, 400 = normal, 700 = bold.
    pub font_weight: i32,
    /// Italic flag.
    pub italic: bool,
    /// Underline flag.
    pub underline: bool,
    /// Strikeout flag.
    pub strikeout: bool,
    /// Font character set / encoding hint (`\fe`).
    pub charset: i32,
    /// Primary, secondary, outline and shadow colors.
    pub colors: [Color; 4],
    /// Transparency per color slot, 0 = opaque, 255 = invisible.
    pub alpha: [u8; 4],
    /// Horizontal outline width.
    pub outline_width_x: f64,
    /// Vertical outline width.
    pub outline_width_y: f64,
    /// Horizontal shadow offset.
    pub shadow_depth_x: f64,
    /// Vertical shadow offset.
    pub shadow_depth_y: f64,
    /// Horizontal scale percentage, 100 = unscaled.
    pub font_scale_x: f64,
    /// Vertical scale percentage.
    pub font_scale_y: f64,
    /// Extra spacing between characters.
    pub font_spacing: f64,
    /// Rotation about the x axis, degrees.
    pub font_angle_x: f64,
    /// Rotation about the y axis, degrees.
    pub font_angle_y: f64,
    /// Rotation in the screen plane, degrees.
    pub font_angle_z: f64,
    /// Horizontal shear factor (`\fax`).
    pub font_shift_x: f64,
    /// Vertical shear factor (`\fay`).
    pub font_shift_y: f64,
    /// Outline vs. opaque-box rendering.
    pub border_style: BorderStyle,
    /// Number of 3x3 box-blur passes (`\be`).
    pub box_blur: i32,
    /// Gaussian blur level (`\blur`), approximated by repeated box passes.
    pub gaussian_blur: f64,
    /// Screen alignment.
    pub alignment: Alignment,
    /// Default margins.
    pub margins: Margins,
    /// Coordinate space for placement and clipping.
    pub relative_to: RelativeTo,
}

impl Default for StyleState {
    fn default() -> Self {
        Self {
            font_name: "Arial".into(),
            font_size: 18.0,
            font_weight: 400,
            italic: false,
            underline: false,
            strikeout: false,
            charset: 1,
            colors: [
                Color(0x00ffffff),
                Color(0x0000ffff),
                Color(0),
                Color(0),
            ],
            alpha: [0, 0, 0, 0x80],
            outline_width_x: 2.0,
            outline_width_y: 2.0,
            shadow_depth_x: 3.0,
            shadow_depth_y: 3.0,
            font_scale_x: 100.0,
            font_scale_y: 100.0,
            font_spacing: 0.0,
            font_angle_x: 0.0,
            font_angle_y: 0.0,
            font_angle_z: 0.0,
            font_shift_x: 0.0,
            font_shift_y: 0.0,
            border_style: BorderStyle::Outline,
            box_blur: 0,
            gaussian_blur: 0.0,
            alignment: Alignment::default(),
            margins: Margins::uniform(10),
            relative_to: RelativeTo::Screen,
        }
    }
}

impl StyleState {
    /// Total blur passes to run over a word's coverage buffer.
    ///
    /// `\blur` maps to one box pass per whole level; repeated box filtering
    /// converges on a gaussian, and the original pipeline never pins a true
    /// kernel, so this is the documented approximation.
    pub(crate) fn blur_passes(&self) -> i32 {
        let gaussian = self.gaussian_blur.ceil() as i32;
        (self.box_blur + gaussian).clamp(0, 8)
    }
}
