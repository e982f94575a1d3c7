// Theme module - Color constants and color helpers
//
// Chrome colors for panels and text, plus the helpers that turn scene
// colors and emphasis into terminal colors. Node and edge colors
// themselves come from the status style table.

use crate::scene::Rgb;
use ratatui::style::Color;

/// Primary accent color - used for borders, titles and key hints
/// RGB: (187, 154, 247)
pub const NEON_PURPLE: Color = Color::Rgb(187, 154, 247);

/// Warning indicator - used for non-default settings and reduced animation
/// RGB: (255, 158, 100)
pub const PUMPKIN_ORANGE: Color = Color::Rgb(255, 158, 100);

/// Danger indicator - used for threats and very high frame rates
/// RGB: (247, 118, 142)
pub const BLOOD_RED: Color = Color::Rgb(247, 118, 142);

/// Healthy indicator - used for enabled toggles and default settings
/// RGB: (158, 206, 106)
pub const TOXIC_GREEN: Color = Color::Rgb(158, 206, 106);

/// Neutral text
/// RGB: (169, 177, 214)
pub const BONE_WHITE: Color = Color::Rgb(169, 177, 214);

/// Map background that dim nodes fade toward
pub const MAP_SHADOW: Rgb = (20, 20, 32);

/// Ratio toward the full status color at zero emphasis
const MIN_BRIGHTNESS: f32 = 0.45;

pub fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Interpolate between two RGB colors based on a ratio (0.0 ~ 1.0)
///
/// # Arguments
/// * `color1` - Starting color as (r, g, b) tuple
/// * `color2` - Ending color as (r, g, b) tuple
/// * `ratio` - Interpolation ratio (0.0 = color1, 1.0 = color2)
pub fn interpolate_color(color1: Rgb, color2: Rgb, ratio: f32) -> Color {
    let ratio = ratio.clamp(0.0, 1.0);
    let r = (color1.0 as f32 + (color2.0 as f32 - color1.0 as f32) * ratio) as u8;
    let g = (color1.1 as f32 + (color2.1 as f32 - color1.1 as f32) * ratio) as u8;
    let b = (color1.2 as f32 + (color2.2 as f32 - color1.2 as f32) * ratio) as u8;
    Color::Rgb(r, g, b)
}

/// Terminal color for a node at the given emphasis
///
/// Emphasis runs 0.0 to about 0.5; brightness rises with it so a pulsing
/// node visibly breathes while resting nodes stay at a fixed level.
pub fn emphasis_color(base: Rgb, emphasis: f32) -> Color {
    let ratio = MIN_BRIGHTNESS + (1.0 - MIN_BRIGHTNESS) * (emphasis * 2.0).clamp(0.0, 1.0);
    interpolate_color(MAP_SHADOW, base, ratio)
}

/// Get color for the frame-rate ceiling relative to its default
///
/// Color coding:
/// - Green (TOXIC_GREEN): default or lower (normal load)
/// - Orange (PUMPKIN_ORANGE): above default
/// - Red (BLOOD_RED): more than 1.5x default
///
/// If recently_changed is true, returns a brighter version of the color
pub fn frame_rate_color(target_fps: u32, default_fps: u32, recently_changed: bool) -> Color {
    let base_color = if target_fps <= default_fps {
        TOXIC_GREEN
    } else if target_fps as f32 > default_fps as f32 * 1.5 {
        BLOOD_RED
    } else {
        PUMPKIN_ORANGE
    };

    // If recently changed, make the color brighter
    if recently_changed {
        match base_color {
            Color::Rgb(r, g, b) => {
                // Increase brightness by 20%
                let r = ((r as f32 * 1.2).min(255.0)) as u8;
                let g = ((g as f32 * 1.2).min(255.0)) as u8;
                let b = ((b as f32 * 1.2).min(255.0)) as u8;
                Color::Rgb(r, g, b)
            }
            _ => base_color,
        }
    } else {
        base_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_color_endpoints() {
        assert_eq!(interpolate_color((0, 0, 0), (200, 100, 50), 0.0), Color::Rgb(0, 0, 0));
        assert_eq!(interpolate_color((0, 0, 0), (200, 100, 50), 1.0), Color::Rgb(200, 100, 50));
        assert_eq!(interpolate_color((0, 0, 0), (200, 100, 50), 7.0), Color::Rgb(200, 100, 50));
    }

    #[test]
    fn test_emphasis_brightens() {
        let base = (255, 0, 64);
        let brightness = |c: Color| match c {
            Color::Rgb(r, g, b) => r as u32 + g as u32 + b as u32,
            _ => 0,
        };
        let dim = brightness(emphasis_color(base, 0.1));
        let bright = brightness(emphasis_color(base, 0.5));
        assert!(bright > dim);
        assert_eq!(emphasis_color(base, 0.5), to_color(base));
    }

    #[test]
    fn test_frame_rate_color() {
        assert_eq!(frame_rate_color(30, 30, false), TOXIC_GREEN);
        assert_eq!(frame_rate_color(10, 30, false), TOXIC_GREEN);
        assert_eq!(frame_rate_color(40, 30, false), PUMPKIN_ORANGE);
        assert_eq!(frame_rate_color(60, 30, false), BLOOD_RED);
        assert_ne!(frame_rate_color(30, 30, true), TOXIC_GREEN);
    }
}
