use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// ARGB カラー
///
/// 設定ファイルでは `#RRGGBB` または `#AARRGGBB` で書く。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { a: 255, r, g, b }
    }

    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    pub const fn from_argb_u32(v: u32) -> Self {
        Self {
            a: (v >> 24) as u8,
            r: (v >> 16) as u8,
            g: (v >> 8) as u8,
            b: v as u8,
        }
    }

    pub const fn to_argb_u32(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// チャンネルごとの線形補間。t は 0.0〜1.0 にクランプされる
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let mix = |from: u8, to: u8| (from as f32 + (to as f32 - from as f32) * t).round() as u8;
        Color {
            a: mix(self.a, other.a),
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color {0:?}, expected #RRGGBB or #AARRGGBB")]
pub struct ParseColorError(String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let value = u32::from_str_radix(hex, 16).map_err(|_| err())?;
        match hex.len() {
            6 => Ok(Color::from_argb_u32(0xFF00_0000 | value)),
            8 => Ok(Color::from_argb_u32(value)),
            _ => Err(err()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.a, self.r, self.g, self.b)
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// 角度の逸脱量を good〜bad のグラデーションに変換
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviationColorizer {
    pub good: Color,
    pub bad: Color,
}

impl DeviationColorizer {
    pub fn new(good: Color, bad: Color) -> Self {
        Self { good, bad }
    }

    /// `deviation / tolerance` を 0.0〜1.0 に飽和させて補間する
    ///
    /// tolerance が正でない値はルール読み込み時に弾かれている前提。
    /// 万一来た場合は bad 側に倒す。
    pub fn color_for(&self, deviation: f32, tolerance: f32) -> Color {
        let fraction = if tolerance > 0.0 && !deviation.is_nan() {
            (deviation / tolerance).clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.good.lerp(self.bad, fraction)
    }
}

impl Default for DeviationColorizer {
    fn default() -> Self {
        Self::new(Color::GREEN, Color::RED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rgb_and_argb() {
        assert_eq!("#00FF00".parse::<Color>().unwrap(), Color::GREEN);
        assert_eq!("#80ff0000".parse::<Color>().unwrap(), Color::argb(0x80, 255, 0, 0));
        assert!("00FF00".parse::<Color>().is_err());
        assert!("#00FF0".parse::<Color>().is_err());
        assert!("#GG0000".parse::<Color>().is_err());
        assert!("#+0FF00".parse::<Color>().is_err());
    }

    #[test]
    fn test_parse_error_message() {
        let err = "#12".parse::<Color>().unwrap_err();
        assert_eq!(err.to_string(), "invalid color \"#12\", expected #RRGGBB or #AARRGGBB");
        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn test_display_roundtrip() {
        for color in [Color::YELLOW, Color::argb(0x40, 1, 2, 3)] {
            assert_eq!(color.to_string().parse::<Color>().unwrap(), color);
        }
        assert_eq!(Color::WHITE.to_string(), "#FFFFFF");
    }

    #[test]
    fn test_argb_u32() {
        assert_eq!(Color::RED.to_argb_u32(), 0xFFFF_0000);
        assert_eq!(Color::from_argb_u32(0xFF00_FF00), Color::GREEN);
    }

    #[test]
    fn test_lerp_endpoints_and_midpoint() {
        assert_eq!(Color::GREEN.lerp(Color::RED, 0.0), Color::GREEN);
        assert_eq!(Color::GREEN.lerp(Color::RED, 1.0), Color::RED);
        assert_eq!(Color::GREEN.lerp(Color::RED, 0.5), Color::rgb(128, 128, 0));
        assert_eq!(Color::GREEN.lerp(Color::RED, 5.0), Color::RED);
    }

    #[test]
    fn test_colorizer_endpoints() {
        let c = DeviationColorizer::default();
        assert_eq!(c.color_for(0.0, 30.0), Color::GREEN);
        assert_eq!(c.color_for(30.0, 30.0), Color::RED);
        assert_eq!(c.color_for(75.0, 30.0), Color::RED);
    }

    #[test]
    fn test_colorizer_monotonic() {
        let c = DeviationColorizer::default();
        let mut prev = c.color_for(0.0, 30.0);
        for i in 1..=30 {
            let next = c.color_for(i as f32, 30.0);
            assert!(next.r >= prev.r && next.g <= prev.g, "{} -> {}", prev, next);
            prev = next;
        }
    }

    #[test]
    fn test_colorizer_degenerate_tolerance() {
        let c = DeviationColorizer::default();
        assert_eq!(c.color_for(0.0, 0.0), Color::RED);
        assert_eq!(c.color_for(f32::NAN, 30.0), Color::RED);
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Color::YELLOW).unwrap();
        assert_eq!(json, "\"#FFFF00\"");
        let color: Color = serde_json::from_str("\"#FF0000\"").unwrap();
        assert_eq!(color, Color::RED);
    }
}
