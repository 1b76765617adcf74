//! Soil pattern colors.
//!
//! Colors are written in the template's `$BBGGRR` notation: a `$` sigil
//! followed by the blue, green and red channels as uppercase hex.

/// Top layer of every borehole.
pub const GREY: &str = "$808080";

/// Bottom layer of a borehole with two or more layers, RGB(255, 229, 180).
pub const PASTEL_YELLOW: &str = "$B4E5FF";

const PINK: (f64, f64, f64) = (255.0, 209.0, 220.0);
const YELLOW: (f64, f64, f64) = (255.0, 229.0, 180.0);

/// Colors for the layers of one borehole, top to bottom.
///
/// The top layer is grey, the bottom layer pastel yellow and the layers in
/// between run from pastel pink towards pastel yellow.
pub fn assign_colors(layer_count: usize) -> Vec<String> {
    match layer_count {
        0 => Vec::new(),
        1 => vec![GREY.to_string()],
        _ => {
            let intermediates = layer_count - 2;
            let mut colors = Vec::with_capacity(layer_count);
            colors.push(GREY.to_string());
            for j in 0..intermediates {
                let f = if intermediates > 1 {
                    j as f64 / intermediates as f64
                } else {
                    0.0
                };
                colors.push(interpolate(f));
            }
            colors.push(PASTEL_YELLOW.to_string());
            colors
        }
    }
}

fn interpolate(f: f64) -> String {
    let channel = |from: f64, to: f64| (from + f * (to - from)).round_ties_even() as u8;
    let r = channel(PINK.0, YELLOW.0);
    let g = channel(PINK.1, YELLOW.1);
    let b = channel(PINK.2, YELLOW.2);
    bgr_hex(r, g, b)
}

/// Format an RGB color as `$BBGGRR`.
pub fn bgr_hex(r: u8, g: u8, b: u8) -> String {
    format!("${:02X}{:02X}{:02X}", b, g, r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_layers() {
        assert!(assign_colors(0).is_empty());
    }

    #[test]
    fn test_single_layer_is_grey() {
        assert_eq!(assign_colors(1), vec!["$808080"]);
    }

    #[test]
    fn test_two_layers() {
        assert_eq!(assign_colors(2), vec!["$808080", "$B4E5FF"]);
    }

    #[test]
    fn test_single_intermediate_is_pink() {
        assert_eq!(assign_colors(3), vec!["$808080", "$DCD1FF", "$B4E5FF"]);
    }

    #[test]
    fn test_gradient() {
        let colors = assign_colors(5);
        assert_eq!(colors.len(), 5);
        assert_eq!(colors[0], GREY);
        assert_eq!(colors[4], PASTEL_YELLOW);
        // f = 0, 1/3, 2/3
        assert_eq!(colors[1], "$DCD1FF");
        assert_eq!(colors[2], "$CFD8FF");
        assert_eq!(colors[3], "$C1DEFF");
        for color in &colors[1..4] {
            assert!(color.starts_with('$'));
            assert_eq!(&color[5..7], "FF");
        }
    }

    #[test]
    fn test_bgr_hex() {
        assert_eq!(bgr_hex(255, 229, 180), PASTEL_YELLOW);
        assert_eq!(bgr_hex(1, 2, 3), "$030201");
    }
}
