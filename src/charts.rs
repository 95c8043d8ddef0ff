//! Chart rendering
//!
//! Rasterizes the two dashboard charts into PNG bytes:
//! - horizontal bars for a feature importance report
//! - overlaid Gaussian density curves for the accepted/rejected split
//!
//! Charts carry no text; titles and labels travel next to the image in the
//! JSON response.

use std::io::Cursor;

use base64::Engine;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use crate::models::ImportanceReport;

pub const WIDTH: u32 = 800;
pub const HEIGHT: u32 = 500;
const MARGIN: u32 = 40;

/// Points sampled along the x axis of a density curve
const DENSITY_SAMPLES: usize = 400;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([60, 60, 60]);
const POSITIVE_BAR: Rgb<u8> = Rgb([31, 119, 180]);
const NEGATIVE_BAR: Rgb<u8> = Rgb([214, 39, 40]);
pub const ACCEPTED_CURVE: Rgb<u8> = Rgb([44, 160, 44]);
pub const REJECTED_CURVE: Rgb<u8> = Rgb([214, 39, 40]);

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("no numeric values to plot")]
    NoData,

    #[error("value {0} cannot be plotted")]
    NonFinite(f64),

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Base64 (standard alphabet, padded) for embedding in JSON
pub fn encode_base64(png: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(png)
}

/// Horizontal bar chart, first feature on top, bars grow from the zero line.
pub fn importance_bars(report: &ImportanceReport) -> Result<Vec<u8>, ChartError> {
    if let Some(bad) = report.values.iter().find(|v| !v.is_finite()) {
        return Err(ChartError::NonFinite(*bad));
    }

    let mut img = canvas();
    let (left, top, right, bottom) = plot_area();

    if !report.is_empty() {
        let lo = report.values.iter().cloned().fold(0.0_f64, f64::min);
        let hi = report.values.iter().cloned().fold(0.0_f64, f64::max);
        let span = if hi > lo { hi - lo } else { 1.0 };
        let to_x = |v: f64| left + ((v - lo) / span * (right - left) as f64).round() as u32;

        let row = (bottom - top) as f64 / report.len() as f64;
        let thickness = (row * 0.7).max(1.0);
        let zero = to_x(0.0);

        for (i, value) in report.values.iter().enumerate() {
            let y0 = top as f64 + row * i as f64 + (row - thickness) / 2.0;
            let y1 = y0 + thickness;
            let x = to_x(*value);
            let color = if *value < 0.0 { NEGATIVE_BAR } else { POSITIVE_BAR };
            fill_rect(&mut img, zero.min(x), y0 as u32, zero.max(x), y1 as u32, color);
        }

        draw_line(&mut img, (zero as i64, top as i64), (zero as i64, bottom as i64), AXIS);
    }

    draw_axes(&mut img);
    encode_png(img)
}

/// Overlaid density curves for the two target classes.
///
/// Either class may be empty, but not both.
pub fn density_comparison(accepted: &[f64], rejected: &[f64]) -> Result<Vec<u8>, ChartError> {
    if let Some(bad) = accepted.iter().chain(rejected).find(|v| !v.is_finite()) {
        return Err(ChartError::NonFinite(*bad));
    }
    if accepted.is_empty() && rejected.is_empty() {
        return Err(ChartError::NoData);
    }

    let classes: Vec<(&[f64], f64, Rgb<u8>)> = [(accepted, ACCEPTED_CURVE), (rejected, REJECTED_CURVE)]
        .into_iter()
        .filter(|(values, _)| !values.is_empty())
        .map(|(values, color)| (values, scott_bandwidth(values), color))
        .collect();

    let widest = classes.iter().map(|(_, bw, _)| *bw).fold(0.0_f64, f64::max);
    let all = || classes.iter().flat_map(|(values, _, _)| values.iter().cloned());
    let x_min = all().fold(f64::INFINITY, f64::min) - 3.0 * widest;
    let x_max = all().fold(f64::NEG_INFINITY, f64::max) + 3.0 * widest;
    let step = (x_max - x_min) / (DENSITY_SAMPLES - 1) as f64;

    let curves: Vec<(Vec<f64>, Rgb<u8>)> = classes
        .iter()
        .map(|(values, bw, color)| {
            let ys = (0..DENSITY_SAMPLES)
                .map(|i| gaussian_kde(values, *bw, x_min + step * i as f64))
                .collect();
            (ys, *color)
        })
        .collect();

    let peak = curves
        .iter()
        .flat_map(|(ys, _)| ys.iter().cloned())
        .fold(0.0_f64, f64::max);
    let peak = if peak > 0.0 { peak } else { 1.0 };

    let mut img = canvas();
    let (left, top, right, bottom) = plot_area();
    let to_px = |i: usize, y: f64| {
        let px = left as f64 + i as f64 / (DENSITY_SAMPLES - 1) as f64 * (right - left) as f64;
        let py = bottom as f64 - y / peak * (bottom - top) as f64;
        (px.round() as i64, py.round() as i64)
    };

    // Shade first so neither curve line is painted over
    for (ys, color) in &curves {
        for (i, y) in ys.iter().enumerate() {
            let (px, py) = to_px(i, *y);
            for row in py.max(top as i64)..bottom as i64 {
                blend(&mut img, px, row, *color);
            }
        }
    }

    for (ys, color) in &curves {
        for i in 1..ys.len() {
            let from = to_px(i - 1, ys[i - 1]);
            let to = to_px(i, ys[i]);
            draw_line(&mut img, from, to, *color);
            draw_line(&mut img, (from.0, from.1 - 1), (to.0, to.1 - 1), *color);
        }
    }

    draw_axes(&mut img);
    encode_png(img)
}

/// Scott's rule: `sd * n^(-1/5)`, with a floor for degenerate samples
pub fn scott_bandwidth(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let sd = if values.len() > 1 {
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
    } else {
        0.0
    };

    let bw = sd * n.powf(-0.2);
    if bw > 0.0 {
        bw
    } else {
        (mean.abs() * 0.1).max(1e-3)
    }
}

pub fn gaussian_kde(values: &[f64], bandwidth: f64, x: f64) -> f64 {
    let norm = 1.0 / (values.len() as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    values
        .iter()
        .map(|v| {
            let z = (x - v) / bandwidth;
            (-0.5 * z * z).exp()
        })
        .sum::<f64>()
        * norm
}

fn canvas() -> RgbImage {
    RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND)
}

fn plot_area() -> (u32, u32, u32, u32) {
    (MARGIN, MARGIN, WIDTH - MARGIN, HEIGHT - MARGIN)
}

fn draw_axes(img: &mut RgbImage) {
    let (left, top, right, bottom) = plot_area();
    draw_line(img, (left as i64, top as i64), (left as i64, bottom as i64), AXIS);
    draw_line(img, (left as i64, bottom as i64), (right as i64, bottom as i64), AXIS);
}

fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
    for y in y0..=y1.min(img.height() - 1) {
        for x in x0..=x1.min(img.width() - 1) {
            img.put_pixel(x, y, color);
        }
    }
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// 50% mix of `color` over the current pixel
fn blend(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        let px = img.get_pixel_mut(x as u32, y as u32);
        for c in 0..3 {
            px.0[c] = ((px.0[c] as u16 + color.0[c] as u16 * 3) / 4) as u8;
        }
    }
}

// Bresenham
fn draw_line(img: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put(img, x, y, color);
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn encode_png(img: RgbImage) -> Result<Vec<u8>, ChartError> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImportanceScope;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn report(values: Vec<f64>) -> ImportanceReport {
        ImportanceReport {
            scope: ImportanceScope::Global,
            names: (0..values.len()).map(|i| format!("f{}", i)).collect(),
            values,
        }
    }

    fn decode(png: &[u8]) -> RgbImage {
        image::load_from_memory(png).unwrap().to_rgb8()
    }

    #[test]
    fn test_bars_produce_png() {
        let png = importance_bars(&report(vec![0.4, 0.1, 0.25])).unwrap();
        assert!(png.starts_with(PNG_MAGIC));

        let img = decode(&png);
        assert_eq!(img.dimensions(), (WIDTH, HEIGHT));
        assert!(img.pixels().any(|p| *p == POSITIVE_BAR));
        assert!(!img.pixels().any(|p| *p == NEGATIVE_BAR));
    }

    #[test]
    fn test_negative_contributions_use_their_own_color() {
        let png = importance_bars(&report(vec![0.3, -0.2])).unwrap();
        let img = decode(&png);
        assert!(img.pixels().any(|p| *p == NEGATIVE_BAR));
    }

    #[test]
    fn test_empty_report_still_renders() {
        let png = importance_bars(&report(vec![])).unwrap();
        assert!(!encode_base64(&png).is_empty());
    }

    #[test]
    fn test_all_zero_values_render() {
        assert!(importance_bars(&report(vec![0.0, 0.0])).is_ok());
    }

    #[test]
    fn test_non_finite_value_fails() {
        assert!(matches!(
            importance_bars(&report(vec![f64::NAN])),
            Err(ChartError::NonFinite(_))
        ));
    }

    #[test]
    fn test_density_draws_both_classes() {
        let png = density_comparison(&[1.0, 1.5, 2.0, 2.2], &[3.0, 3.5, 4.1]).unwrap();
        let img = decode(&png);
        assert!(img.pixels().any(|p| *p == ACCEPTED_CURVE));
        assert!(img.pixels().any(|p| *p == REJECTED_CURVE));
    }

    #[test]
    fn test_density_with_one_empty_class() {
        let png = density_comparison(&[], &[5.0, 5.0, 5.0]).unwrap();
        let img = decode(&png);
        assert!(img.pixels().any(|p| *p == REJECTED_CURVE));
        assert!(!img.pixels().any(|p| *p == ACCEPTED_CURVE));
    }

    #[test]
    fn test_density_without_data_fails() {
        assert!(matches!(density_comparison(&[], &[]), Err(ChartError::NoData)));
    }

    #[test]
    fn test_kde_integrates_to_one() {
        let values = [0.0, 1.0, 2.0, 2.5];
        let bw = scott_bandwidth(&values);
        let step = 0.01;
        let area: f64 = (-1000..1500)
            .map(|i| gaussian_kde(&values, bw, i as f64 * step) * step)
            .sum();
        assert!((area - 1.0).abs() < 1e-3, "area was {}", area);
    }

    #[test]
    fn test_bandwidth_floor_for_constant_sample() {
        assert_eq!(scott_bandwidth(&[4.0, 4.0]), 0.4);
        assert_eq!(scott_bandwidth(&[0.0]), 1e-3);
    }
}
