use serde::{Deserialize, Serialize};

/// An sRGB colour with components in `[0, 1]`.
///
/// Serialises as a `#rrggbb` string and parses either that form or one of the
/// CSS names in [`Color::from_name`], so scene config files can say
/// `"orange"` or `"#b1e1ff"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("unknown colour name {0:?}")]
    UnknownName(String),
    #[error("invalid hex colour {0:?}")]
    InvalidHex(String),
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::rgb(channel(16), channel(8), channel(0))
    }

    pub fn to_hex(&self) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// CSS colour keywords used by the demo scene.
    pub fn from_name(name: &str) -> Option<Self> {
        let hex = match name.to_ascii_lowercase().as_str() {
            "orange" => 0xffa500,
            "blue" => 0x0000ff,
            "red" => 0xff0000,
            "green" => 0x008000,
            "yellow" => 0xffff00,
            "white" => 0xffffff,
            "black" => 0x000000,
            "gray" | "grey" => 0x808080,
            _ => return None,
        };
        Some(Self::from_hex(hex))
    }

    /// Parse `#rrggbb`, `0xrrggbb` or a CSS name.
    pub fn parse(s: &str) -> Result<Self, ColorParseError> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("0x"));
        match digits {
            Some(d) if d.len() == 6 => u32::from_str_radix(d, 16)
                .map(Self::from_hex)
                .map_err(|_| ColorParseError::InvalidHex(s.to_string())),
            Some(_) => Err(ColorParseError::InvalidHex(s.to_string())),
            None => Self::from_name(trimmed).ok_or_else(|| ColorParseError::UnknownName(s.to_string())),
        }
    }

    fn srgb_to_linear(c: f32) -> f32 {
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }

    /// Linear RGBA for writing into an sRGB render target.
    pub fn to_linear_rgba(&self, alpha: f32) -> [f32; 4] {
        [
            Self::srgb_to_linear(self.r),
            Self::srgb_to_linear(self.g),
            Self::srgb_to_linear(self.b),
            alpha,
        ]
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        format!("#{:06x}", c.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip_keeps_value() {
        assert_eq!(Color::from_hex(0xb1e1ff).to_hex(), 0xb1e1ff);
        assert_eq!(Color::from_hex(0xb97a20).to_hex(), 0xb97a20);
    }

    #[test]
    fn named_colours() {
        assert_eq!(Color::from_name("orange").unwrap().to_hex(), 0xffa500);
        assert_eq!(Color::from_name("Blue").unwrap().to_hex(), 0x0000ff);
        assert!(Color::from_name("chartreuse-ish").is_none());
    }

    #[test]
    fn parse_forms() {
        assert_eq!(Color::parse("#ffffff").unwrap(), Color::WHITE);
        assert_eq!(Color::parse("0x000000").unwrap(), Color::BLACK);
        assert_eq!(Color::parse(" orange ").unwrap().to_hex(), 0xffa500);
        assert!(matches!(Color::parse("#fff"), Err(ColorParseError::InvalidHex(_))));
        assert!(matches!(Color::parse("#gggggg"), Err(ColorParseError::InvalidHex(_))));
        assert!(matches!(Color::parse("mauve"), Err(ColorParseError::UnknownName(_))));
    }

    #[test]
    fn serde_uses_hex_strings() {
        let json = serde_json::to_string(&Color::from_hex(0xb1e1ff)).unwrap();
        assert_eq!(json, "\"#b1e1ff\"");
        let back: Color = serde_json::from_str("\"blue\"").unwrap();
        assert_eq!(back.to_hex(), 0x0000ff);
    }

    #[test]
    fn linear_conversion_endpoints() {
        assert_eq!(Color::BLACK.to_linear_rgba(1.0), [0.0, 0.0, 0.0, 1.0]);
        let white = Color::WHITE.to_linear_rgba(0.5);
        assert!((white[0] - 1.0).abs() < 1e-6);
        assert_eq!(white[3], 0.5);
    }
}
