use crate::feq;

/// A color.
///
/// Represented with red-green-blue (RGB) values. Each value ranges from 0.0
/// to 1.0 inclusive; values outside that range are clamped on output.
///
/// # Examples
///
/// ```
/// # use cull_trace::color::Color;
/// let orange = Color::rgb(0.8, 0.2, 0.0);
/// assert_eq!(orange.to_rgb8(), [204, 51, 0]);
/// ```
#[derive(Copy, Clone, Debug, Default, PartialOrd)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Colors are compared component-wise with `feq`.
impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.r, other.r) &&
            feq(self.g, other.g) &&
            feq(self.b, other.b)
    }
}

impl From<[f32; 3]> for Color {
    fn from(v: [f32; 3]) -> Color {
        Color { r: v[0], g: v[1], b: v[2] }
    }
}

impl Color {
    pub fn rgb(r: f32, g: f32, b: f32) -> Color {
        Color { r, g, b }
    }

    /// The color black, shown where a ray hits nothing.
    pub fn black() -> Color {
        Color { r: 0.0, g: 0.0, b: 0.0 }
    }

    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }

    /// Quantises the color to 8 bits per channel.
    pub fn to_rgb8(&self) -> [u8; 3] {
        let quantise = |v: f32| (v * 255.0).clamp(0.0, 255.0).round() as u8;

        [quantise(self.r), quantise(self.g), quantise(self.b)]
    }
}

#[test]
fn quantise_clamps_out_of_range() {
    let c = Color::rgb(1.5, -0.2, 0.5);

    assert_eq!(c.to_rgb8(), [255, 0, 128]);
}

#[test]
fn colors_compare_approximately() {
    assert_eq!(Color::rgb(0.2, 0.5, 0.0), Color::from([0.20001, 0.5, 0.0]));
    assert_ne!(Color::rgb(0.2, 0.5, 0.0), Color::black());
}
