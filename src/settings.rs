//! Appearance settings
//!
//! [`Settings`] is plain state owned by the application. Nothing here touches
//! a UI: [`Settings::apply`] returns the style set a front end should push,
//! and chart builders read fonts, colors and the palette directly.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

lazy_static::lazy_static! {
    static ref HEX_COLOR: Regex = Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$")
        .expect("hex color pattern compiles");
}

pub const FONT_FAMILIES: [&str; 6] = [
    "Arial",
    "Times New Roman",
    "Courier New",
    "Calibri",
    "Helvetica",
    "Verdana",
];

pub const FONT_SIZES: [u32; 6] = [10, 12, 14, 16, 18, 20];

pub const DEFAULT_FONT_FAMILY: &str = "Calibri";
pub const DEFAULT_FONT_SIZE: u32 = 12;

pub const DEFAULT_PALETTE: [&str; 5] = ["#636EFA", "#EF553B", "#00CC96", "#AB63FA", "#FFA15A"];

/// Named CSS colors accepted besides hex codes
const NAMED_COLORS: [&str; 24] = [
    "black", "white", "red", "green", "blue", "yellow", "orange", "purple", "pink", "brown",
    "gray", "grey", "cyan", "magenta", "navy", "teal", "olive", "maroon", "lime", "aqua",
    "silver", "gold", "indigo", "violet",
];

/// Colors of one theme preset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeColors {
    pub background: &'static str,
    pub text: &'static str,
    pub button: &'static str,
    pub chart_title: &'static str,
    pub axis_label: &'static str,
}

pub const LIGHT_THEME: ThemeColors = ThemeColors {
    background: "#f0f0f0",
    text: "#333333",
    button: "#5bc0de",
    chart_title: "#1a1a1a",
    axis_label: "#1a1a1a",
};

pub const DARK_THEME: ThemeColors = ThemeColors {
    background: "#2b2b2b",
    text: "#ffffff",
    button: "#6c757d",
    chart_title: "#ffffff",
    axis_label: "#ffffff",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    fn colors(self) -> ThemeColors {
        match self {
            ThemeMode::Light => LIGHT_THEME,
            ThemeMode::Dark => DARK_THEME,
        }
    }
}

/// Which color setting to change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTarget {
    Background,
    Text,
    Button,
    ChartTitle,
    AxisLabel,
}

impl FromStr for ColorTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "background" | "bg" => Ok(ColorTarget::Background),
            "text" => Ok(ColorTarget::Text),
            "button" => Ok(ColorTarget::Button),
            "charttitle" | "title" => Ok(ColorTarget::ChartTitle),
            "axislabel" | "axis" => Ok(ColorTarget::AxisLabel),
            other => Err(Error::InvalidInput(format!("unknown color setting: {}", other))),
        }
    }
}

impl fmt::Display for ColorTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColorTarget::Background => "background",
            ColorTarget::Text => "text",
            ColorTarget::Button => "button",
            ColorTarget::ChartTitle => "chart title",
            ColorTarget::AxisLabel => "axis label",
        };
        write!(f, "{}", name)
    }
}

/// Whether `value` is a `#rgb`/`#rrggbb` code or a known color name
pub fn is_valid_color(value: &str) -> bool {
    let value = value.trim();
    HEX_COLOR.is_match(value) || NAMED_COLORS.contains(&value.to_lowercase().as_str())
}

/// Parse a comma-separated palette; empty text yields the default palette
pub fn parse_palette(text: &str) -> Result<Vec<String>> {
    let colors: Vec<String> = text
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    if colors.is_empty() {
        return Ok(DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect());
    }
    if let Some(bad) = colors.iter().find(|c| !is_valid_color(c)) {
        return Err(Error::InvalidValue(format!("invalid palette color: {}", bad)));
    }
    Ok(colors)
}

/// Widget styles a front end pushes after [`Settings::apply`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedStyle {
    pub font: (String, u32),
    pub frame_background: String,
    pub label_foreground: String,
    pub button_background: String,
    pub button_foreground: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub font_family: String,
    pub font_size: u32,
    pub background_color: String,
    pub text_color: String,
    pub button_color: String,
    pub chart_title_color: String,
    pub axis_label_color: String,
    pub palette: Vec<String>,
    pub theme: ThemeMode,
}

impl Default for Settings {
    fn default() -> Self {
        let mut settings = Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            background_color: String::new(),
            text_color: String::new(),
            button_color: String::new(),
            chart_title_color: String::new(),
            axis_label_color: String::new(),
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            theme: ThemeMode::Light,
        };
        settings.load_theme(ThemeMode::Light);
        settings
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Style set reflecting the current state
    pub fn apply(&self) -> AppliedStyle {
        AppliedStyle {
            font: (self.font_family.clone(), self.font_size),
            frame_background: self.background_color.clone(),
            label_foreground: self.text_color.clone(),
            button_background: self.button_color.clone(),
            button_foreground: self.text_color.clone(),
        }
    }

    /// Restore every setting to its default
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Switch between the light and dark presets, returning the new mode
    ///
    /// Font and palette are kept; all five theme colors are replaced.
    pub fn toggle_theme(&mut self) -> ThemeMode {
        let next = match self.theme {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        };
        self.load_theme(next);
        next
    }

    fn load_theme(&mut self, mode: ThemeMode) {
        let colors = mode.colors();
        self.background_color = colors.background.to_string();
        self.text_color = colors.text.to_string();
        self.button_color = colors.button.to_string();
        self.chart_title_color = colors.chart_title.to_string();
        self.axis_label_color = colors.axis_label.to_string();
        self.theme = mode;
    }

    pub fn set_color(&mut self, target: ColorTarget, value: &str) -> Result<()> {
        let value = value.trim();
        if !is_valid_color(value) {
            return Err(Error::InvalidValue(format!("invalid color: {}", value)));
        }
        let slot = match target {
            ColorTarget::Background => &mut self.background_color,
            ColorTarget::Text => &mut self.text_color,
            ColorTarget::Button => &mut self.button_color,
            ColorTarget::ChartTitle => &mut self.chart_title_color,
            ColorTarget::AxisLabel => &mut self.axis_label_color,
        };
        *slot = value.to_string();
        Ok(())
    }

    /// Set font family and size; both must come from the offered lists
    pub fn set_font(&mut self, family: &str, size: u32) -> Result<()> {
        let family = FONT_FAMILIES
            .iter()
            .find(|f| f.eq_ignore_ascii_case(family.trim()))
            .ok_or_else(|| Error::InvalidValue(format!("unsupported font family: {}", family)))?;
        if !FONT_SIZES.contains(&size) {
            return Err(Error::InvalidValue(format!(
                "font size must be one of {:?}, got {}",
                FONT_SIZES, size
            )));
        }
        self.font_family = family.to_string();
        self.font_size = size;
        Ok(())
    }

    pub fn set_palette(&mut self, text: &str) -> Result<()> {
        self.palette = parse_palette(text)?;
        Ok(())
    }

    /// Palette color for series `index`, cycling
    pub fn palette_color(&self, index: usize) -> &str {
        if self.palette.is_empty() {
            return DEFAULT_PALETTE[index % DEFAULT_PALETTE.len()];
        }
        &self.palette[index % self.palette.len()]
    }

    /// Font size of chart titles
    pub fn title_font_size(&self) -> u32 {
        self.font_size + 8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.font_family, "Calibri");
        assert_eq!(settings.font_size, 12);
        assert_eq!(settings.background_color, "#f0f0f0");
        assert_eq!(settings.button_color, "#5bc0de");
        assert_eq!(settings.palette.len(), 5);
        assert_eq!(settings.palette[0], "#636EFA");
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut settings = Settings::default();
        settings.set_font("verdana", 18).unwrap();
        settings.set_color(ColorTarget::ChartTitle, "#ff0000").unwrap();
        settings.set_palette("red, blue").unwrap();
        settings.toggle_theme();
        assert_ne!(settings, Settings::default());

        settings.reset();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_toggle_theme_round_trip() {
        let mut settings = Settings::default();
        assert_eq!(settings.toggle_theme(), ThemeMode::Dark);
        assert_eq!(settings.background_color, "#2b2b2b");
        assert_eq!(settings.chart_title_color, "#ffffff");
        assert_eq!(settings.toggle_theme(), ThemeMode::Light);
        assert_eq!(settings.text_color, "#333333");
    }

    #[test]
    fn test_color_validation() {
        assert!(is_valid_color("#abc"));
        assert!(is_valid_color("#A1B2C3"));
        assert!(is_valid_color("Navy"));
        assert!(!is_valid_color("#abcd"));
        assert!(!is_valid_color("blurple"));

        let mut settings = Settings::default();
        assert!(settings.set_color(ColorTarget::Text, "nope").is_err());
        assert_eq!(settings.text_color, "#333333");
    }

    #[test]
    fn test_font_validation() {
        let mut settings = Settings::default();
        assert!(settings.set_font("Comic Sans", 12).is_err());
        assert!(settings.set_font("Arial", 13).is_err());
        settings.set_font("times new roman", 20).unwrap();
        assert_eq!(settings.font_family, "Times New Roman");
        assert_eq!(settings.title_font_size(), 28);
    }

    #[test]
    fn test_palette_parsing() {
        assert_eq!(parse_palette("  ").unwrap().len(), 5);
        assert_eq!(
            parse_palette("#111, red,,").unwrap(),
            vec!["#111".to_string(), "red".to_string()]
        );
        assert!(parse_palette("#111, zzz").is_err());

        let mut settings = Settings::default();
        settings.set_palette("red,blue").unwrap();
        assert_eq!(settings.palette_color(3), "blue");
    }

    #[test]
    fn test_apply_is_pure() {
        let settings = Settings::default();
        let style = settings.apply();
        assert_eq!(style.font, ("Calibri".to_string(), 12));
        assert_eq!(style.frame_background, "#f0f0f0");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_color_target_parsing() {
        assert_eq!("chart-title".parse::<ColorTarget>().unwrap(), ColorTarget::ChartTitle);
        assert_eq!("Axis Label".parse::<ColorTarget>().unwrap(), ColorTarget::AxisLabel);
        assert!("sidebar".parse::<ColorTarget>().is_err());
    }
}
