//! Color temperature conversions

use palette::{FromColor, LinSrgb, Yxy};

/// Return the whitepoint for a given color temperature
///
/// # Parameters
///
/// * `t`: temperature in Kelvin
fn kelvin_to_rgbf32(t: f32) -> LinSrgb {
    let t = f64::from(t);

    // http://www.tannerhelland.com/4435/convert-temperature-rgb-algorithm-code/
    //
    // Check bounds on temperature, then scale
    let t = t.max(1000.0).min(40000.0) / 100.0;

    let r = if t <= 66.0 {
        255.0
    } else {
        329.698_727_446 * (t - 60.0).powf(-0.133_204_759_2)
    };

    let g = if t <= 66.0 {
        99.470_802_586_1 * t.ln() - 161.119_568_166_1
    } else {
        288.122_169_528_3 * (t - 60.0).powf(-0.075_514_849_2)
    };

    let b = if t >= 66.0 {
        255.0
    } else if t <= 19.0 {
        0.0
    } else {
        138.517_731_223_1 * (t - 10.0).ln() - 305.044_792_730_7
    };

    LinSrgb::from_components((
        (r.max(0.0).min(255.0) / 255.0) as f32,
        (g.max(0.0).min(255.0) / 255.0) as f32,
        (b.max(0.0).min(255.0) / 255.0) as f32,
    ))
}

/// Return the CIE 1931 xy chromaticity point for a given color temperature
///
/// Deterministic and total over the 1000K to 40000K domain; values outside it
/// are clamped to the nearest bound.
///
/// # Parameters
///
/// * `t`: temperature in Kelvin
pub fn color_temperature_to_xy(t: i32) -> (f32, f32) {
    let yxy: Yxy = Yxy::from_color(kelvin_to_rgbf32(t as f32));
    (yxy.x, yxy.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candle_light_is_red_heavy() {
        let rgb = kelvin_to_rgbf32(2000.0);

        assert_eq!(rgb.red, 1.0);
        assert!(rgb.green < rgb.red);
        assert!(rgb.blue < rgb.green);
    }

    #[test]
    fn daylight_is_near_white() {
        let rgb = kelvin_to_rgbf32(6500.0);

        assert!(rgb.red > 0.95);
        assert!(rgb.green > 0.95);
        assert!(rgb.blue > 0.95);
    }

    #[test]
    fn xy_points_stay_in_gamut() {
        for t in (1000..=40000).step_by(500) {
            let (x, y) = color_temperature_to_xy(t);

            assert!(x.is_finite() && y.is_finite(), "xy not finite at {}K", t);
            assert!(x > 0.0 && x < 1.0, "x out of range at {}K", t);
            assert!(y > 0.0 && y < 1.0, "y out of range at {}K", t);
            assert!(x + y < 1.0, "xy outside the diagram at {}K", t);
        }
    }

    #[test]
    fn warmer_temperatures_sit_further_red() {
        let (warm_x, _) = color_temperature_to_xy(2700);
        let (cool_x, _) = color_temperature_to_xy(6500);

        assert!(warm_x > cool_x);
    }

    #[test]
    fn conversion_is_deterministic() {
        assert_eq!(color_temperature_to_xy(3850), color_temperature_to_xy(3850));
    }
}
