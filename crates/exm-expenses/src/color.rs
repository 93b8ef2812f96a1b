use std::fmt;
use std::str::FromStr;

use thiserror::Error as ThisError;

#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("colour {0:?} does not start with '#'")]
    MissingHash(String),
    #[error("colour {0:?} must have 6 or 8 hex digits")]
    Length(String),
    #[error("colour {0:?} contains a non-hex digit")]
    Digit(String),
}

/// A display colour parsed from `#RRGGBB` or `#AARRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub alpha: u8,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            alpha: 0xFF,
            red,
            green,
            blue,
        }
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let hex = value
            .strip_prefix('#')
            .ok_or_else(|| ColorError::MissingHash(value.to_string()))?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::Digit(value.to_string()));
        }
        let bits =
            u32::from_str_radix(hex, 16).map_err(|_| ColorError::Length(value.to_string()))?;
        let [a, r, g, b] = bits.to_be_bytes();
        match hex.len() {
            6 => Ok(Color::rgb(r, g, b)),
            8 => Ok(Color {
                alpha: a,
                red: r,
                green: g,
                blue: b,
            }),
            _ => Err(ColorError::Length(value.to_string())),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alpha == 0xFF {
            write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
        } else {
            write!(
                f,
                "#{:02X}{:02X}{:02X}{:02X}",
                self.alpha, self.red, self.green, self.blue
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rgb() {
        let red: Color = "#FF0000".parse().unwrap();
        assert_eq!(red, Color::rgb(0xFF, 0, 0));
        assert_eq!(red.to_string(), "#FF0000");

        let teal: Color = "#008080".parse().unwrap();
        assert_eq!(teal, Color::rgb(0, 0x80, 0x80));
        assert_eq!("#3f51b5".parse::<Color>().unwrap(), Color::rgb(0x3F, 0x51, 0xB5));
    }

    #[test]
    fn test_parse_argb() {
        let faded: Color = "#80FF0000".parse().unwrap();
        assert_eq!(faded.alpha, 0x80);
        assert_eq!(faded.red, 0xFF);
        assert_eq!(faded.to_string(), "#80FF0000");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "FF0000".parse::<Color>(),
            Err(ColorError::MissingHash("FF0000".to_string()))
        );
        assert_eq!(
            "#FF00".parse::<Color>(),
            Err(ColorError::Length("#FF00".to_string()))
        );
        assert_eq!(
            "#".parse::<Color>(),
            Err(ColorError::Length("#".to_string()))
        );
        assert_eq!(
            "#GG0000".parse::<Color>(),
            Err(ColorError::Digit("#GG0000".to_string()))
        );
        assert_eq!(
            "#FF00000000".parse::<Color>(),
            Err(ColorError::Length("#FF00000000".to_string()))
        );
    }
}
