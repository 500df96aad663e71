use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lower bound accepted for `processing.shapes.min_area_px`.
pub const MIN_AREA_PX_MIN: f64 = 45.0;
/// Upper bound accepted for `processing.shapes.min_area_px`.
pub const MIN_AREA_PX_MAX: f64 = 100.0;

macro_rules! wire_enum {
    ($name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim().to_ascii_lowercase().as_str() {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: value.to_string(),
                    }),
                }
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
}

wire_enum!(OutputFormat { Png => "png", Svg => "svg" });

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        self.as_str()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Cheap trial call; the service always answers with a raster.
    #[default]
    Preview,
    /// Full-cost call; may produce vector output. Never sticky.
    Production,
}

wire_enum!(Mode { Preview => "preview", Production => "production" });

/// What the UI may offer for a given mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModePolicy {
    pub svg_allowed: bool,
    pub forced_format: Option<OutputFormat>,
}

impl Mode {
    pub fn policy(self) -> ModePolicy {
        match self {
            Mode::Preview => ModePolicy {
                svg_allowed: false,
                forced_format: Some(OutputFormat::Png),
            },
            Mode::Production => ModePolicy {
                svg_allowed: true,
                forced_format: None,
            },
        }
    }

    /// Format that is actually requested and expected back in this mode.
    pub fn effective_format(self, selected: OutputFormat) -> OutputFormat {
        self.policy().forced_format.unwrap_or(selected)
    }

    /// Mode to arm for the next request once an attempt in `self` has finished.
    pub fn after_attempt(self) -> Mode {
        Mode::Preview
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AntiAliasingMode {
    #[default]
    AntiAliased,
    Aliased,
}

wire_enum!(AntiAliasingMode { AntiAliased => "anti_aliased", Aliased => "aliased" });

/// A lowercase `#rrggbb` color.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaletteColor(String);

impl PaletteColor {
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(format!("#{r:02x}{g:02x}{b:02x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaletteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
