//! Heading annotation wrapper

use crate::config::HydrationConfig;
use crate::helpers::escape_html;

const GOLDEN_RATIO_CONJUGATE: f64 = 0.618033988749895;
const BASE_HUE: f64 = 0.12;

/// Colour for the `index`-th heading of a container
///
/// Hues advance by the golden ratio conjugate so neighbouring headings never
/// share a colour.
pub fn palette_color(index: usize) -> String {
    let hue = (BASE_HUE + index as f64 * GOLDEN_RATIO_CONJUGATE).fract();
    let (r, g, b) = hsl_to_rgb(hue, 0.65, 0.55);
    format!("#{:02x}{:02x}{:02x}bb", r, g, b)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    let channel = |mut t: f64| {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        let v = if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        };
        (v * 255.0).round().clamp(0.0, 255.0) as u8
    };

    (
        channel(h + 1.0 / 3.0),
        channel(h),
        channel(h - 1.0 / 3.0),
    )
}

/// One decorated heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingAnnotation {
    pub index: usize,
    pub color: String,
    pub text: String,
}

impl HeadingAnnotation {
    pub fn new(index: usize, text: &str, config: &HydrationConfig) -> Self {
        let color = config
            .color
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| palette_color(index));
        Self {
            index,
            color,
            text: text.to_string(),
        }
    }

    /// Wrapper markup around the heading's existing inner HTML
    pub fn wrap(&self, inner_html: &str, config: &HydrationConfig) -> String {
        let color = escape_html(&self.color);
        format!(
            r#"<span class="highlighter" data-annotation="highlight" data-color="{color}" data-stroke-width="{stroke}" data-animation-duration="{duration}" data-padding="{padding}" style="--highlight-color: {color}; --highlight-padding: {padding}px; --highlight-duration: {duration}ms">{inner}</span>"#,
            color = color,
            stroke = config.stroke_width,
            duration = config.animation_duration,
            padding = config.padding,
            inner = inner_html,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_is_hex_with_alpha() {
        let color = palette_color(0);
        assert_eq!(color.len(), 9);
        assert!(color.starts_with('#'));
        assert!(color.ends_with("bb"));
    }

    #[test]
    fn test_neighbouring_colors_differ() {
        let colors: Vec<String> = (0..12).map(palette_color).collect();
        for pair in colors.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
        assert_eq!(palette_color(3), palette_color(3));
    }

    #[test]
    fn test_explicit_color_wins() {
        let config = HydrationConfig {
            color: Some("#32bc4dbb".to_string()),
            ..Default::default()
        };
        let a = HeadingAnnotation::new(0, "One", &config);
        let b = HeadingAnnotation::new(1, "Two", &config);
        assert_eq!(a.color, "#32bc4dbb");
        assert_eq!(b.color, "#32bc4dbb");
    }

    #[test]
    fn test_wrap_carries_settings() {
        let config = HydrationConfig::default();
        let html = HeadingAnnotation::new(0, "Intro", &config).wrap("Intro", &config);
        assert!(html.starts_with(r#"<span class="highlighter""#));
        assert!(html.contains(r#"data-stroke-width="2""#));
        assert!(html.contains(r#"data-animation-duration="800""#));
        assert!(html.contains(r#"data-padding="4""#));
        assert!(html.ends_with("Intro</span>"));
    }

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), (255, 0, 0));
        assert_eq!(hsl_to_rgb(1.0 / 3.0, 1.0, 0.5), (0, 255, 0));
        assert_eq!(hsl_to_rgb(2.0 / 3.0, 1.0, 0.5), (0, 0, 255));
    }
}
