//! Word-cloud layout
//!
//! Words are placed largest first. Each word starts at the maximum font
//! size scaled by its weight relative to the previous word, then shrinks
//! until a free spot turns up along a spiral around the canvas center.
//! Layout stops at the first word that does not fit even at the minimum
//! size. Text measurement is injected so the layout is independent of any
//! drawing backend.

use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::WordCloudConfig;
use crate::error::EdaError;

/// Font-size decrement when a word does not fit.
const FONT_STEP: u32 = 2;

/// Radius gained per radian along the placement spiral, in pixels.
const SPIRAL_PITCH: f64 = 1.3;

/// Approximate arc length between spiral probes, in pixels.
const SPIRAL_STEP: f64 = 4.0;

/// One word with its final size and bounding box (top-left origin).
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub text: String,
    pub font_size: u32,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    /// Rotated 90° counter-clockwise.
    pub vertical: bool,
}

impl PlacedWord {
    fn bounds(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            w: self.width as i32,
            h: self.height as i32,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Rect {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
}

impl Rect {
    fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

/// Lay out `frequencies` on a `canvas` of (width, height) pixels.
///
/// `measure(text, font_size)` returns the unrotated (width, height) of the
/// rendered text. Non-positive and non-finite weights are ignored; if none
/// remain the result is `EdaError::EmptyFrequencies`.
pub fn layout<F>(
    frequencies: &[(String, f64)],
    canvas: (u32, u32),
    options: &WordCloudConfig,
    mut measure: F,
) -> crate::Result<Vec<PlacedWord>>
where
    F: FnMut(&str, u32) -> crate::Result<(u32, u32)>,
{
    let mut words: Vec<(&str, f64)> = frequencies
        .iter()
        .filter(|(_, weight)| weight.is_finite() && *weight > 0.0)
        .map(|(text, weight)| (text.as_str(), *weight))
        .collect();

    if words.is_empty() {
        return Err(EdaError::EmptyFrequencies.into());
    }

    words.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    let max_weight = words[0].1;

    let mut rng = StdRng::seed_from_u64(options.seed);
    let min_size = options.min_font_size.max(1);
    let scaling = options.relative_scaling;

    let mut placed: Vec<PlacedWord> = Vec::with_capacity(words.len());
    let mut font_size = options.max_font_size as f64;
    let mut last_freq = 1.0;

    for (text, weight) in words {
        let freq = weight / max_weight;
        if scaling != 0.0 {
            font_size = ((scaling * (freq / last_freq) + (1.0 - scaling)) * font_size).round();
        }

        let vertical = rng.gen::<f64>() >= options.prefer_horizontal;
        let mut size = (font_size as u32).min(options.max_font_size);

        let spot = loop {
            if size < min_size {
                break None;
            }
            let (w, h) = measure(text, size)?;
            let (w, h) = if vertical { (h, w) } else { (w, h) };
            if let Some(rect) = find_spot(w, h, canvas, &placed, &mut rng) {
                break Some((size, rect));
            }
            size = size.saturating_sub(FONT_STEP);
        };

        let Some((size, rect)) = spot else {
            break;
        };

        placed.push(PlacedWord {
            text: text.to_string(),
            font_size: size,
            x: rect.x,
            y: rect.y,
            width: rect.w as u32,
            height: rect.h as u32,
            vertical,
        });
        font_size = size as f64;
        last_freq = freq;
    }

    if placed.is_empty() {
        return Err(EdaError::EmptyChart(format!(
            "word cloud: no word fits a {}x{} canvas",
            canvas.0, canvas.1
        ))
        .into());
    }

    Ok(placed)
}

/// Walk an Archimedean spiral out from the canvas center and return the
/// first position where a `w`×`h` box fits without overlap.
fn find_spot(w: u32, h: u32, canvas: (u32, u32), placed: &[PlacedWord], rng: &mut StdRng) -> Option<Rect> {
    let (width, height) = canvas;
    if w == 0 || h == 0 || w > width || h > height {
        return None;
    }

    let max_x = (width - w) as f64;
    let max_y = (height - h) as f64;
    let (cx, cy) = (max_x / 2.0, max_y / 2.0);
    let aspect = height as f64 / width as f64;
    let max_radius = cx.hypot(cy / aspect.max(f64::EPSILON)) + SPIRAL_STEP;
    let phase = rng.gen_range(0.0..TAU);

    let mut theta: f64 = 0.0;
    loop {
        let radius = SPIRAL_PITCH * theta;
        if radius > max_radius {
            return None;
        }

        let x = cx + radius * (theta + phase).cos();
        let y = cy + radius * (theta + phase).sin() * aspect;

        if (0.0..=max_x).contains(&x) && (0.0..=max_y).contains(&y) {
            let candidate = Rect {
                x: x.round() as i32,
                y: y.round() as i32,
                w: w as i32,
                h: h as i32,
            };
            if !placed.iter().any(|p| p.bounds().intersects(&candidate)) {
                return Some(candidate);
            }
        }

        theta += (SPIRAL_STEP / radius.max(1.0)).min(0.5);
    }
}
