//! Rasterizes a band into a titled RGBA preview with a vertical colour bar.

use std::path::Path;

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use super::DisplayRange;
use super::colormap::Colormap;
use super::font::{ADVANCE, draw_text, draw_text_vertical, text_height, text_width};
use crate::error::Result;
use crate::readers::MaskedBand;

const FIG_WIDTH_IN: f64 = 8.0;
const FIG_HEIGHT_IN: f64 = 6.0;
const TICKS: usize = 5;
/// Smallest dpi the layout is laid out for; lower values are raised to it.
pub const MIN_DPI: u32 = 20;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Everything needed to draw one preview besides the pixels.
#[derive(Debug, Clone)]
pub struct Figure {
    pub title: String,
    pub unit_label: String,
    pub range: DisplayRange,
    pub colormap: Colormap,
    pub dpi: u32,
}

/// Pixel layout of the canvas for a given dpi.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Layout {
    width: u32,
    height: u32,
    margin: u32,
    scale: u32,
    tick_len: u32,
    plot: Area,
    bar: Area,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Area {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

impl Layout {
    fn new(dpi: u32, label_chars: usize) -> Self {
        let dpi = dpi.max(MIN_DPI);
        let width = ((FIG_WIDTH_IN * dpi as f64).round() as u32).max(1);
        let height = ((FIG_HEIGHT_IN * dpi as f64).round() as u32).max(1);
        let margin = (dpi / 12).max(2);
        let scale = (dpi / 60).max(1);

        let title_h = text_height(scale) + 2 * margin;
        let bar_w = (dpi / 7).max(4);
        let tick_len = (dpi / 36).max(2);
        let label_w = label_chars as u32 * ADVANCE * scale;
        let side = margin + bar_w + tick_len + margin + label_w + margin + text_height(scale) + margin;

        let plot = Area {
            x: margin,
            y: title_h,
            w: width.saturating_sub(margin + side).max(1),
            h: height.saturating_sub(title_h + margin).max(1),
        };
        let bar = Area {
            x: plot.x + plot.w + margin,
            y: plot.y,
            w: bar_w,
            h: plot.h,
        };

        Self {
            width,
            height,
            margin,
            scale,
            tick_len,
            plot,
            bar,
        }
    }
}

/// Tick label with a precision matched to the span of the range.
fn format_tick(value: f64, span: f64) -> String {
    let decimals = if span >= 20.0 {
        0
    } else if span >= 2.0 {
        1
    } else if span >= 0.2 {
        2
    } else {
        4
    };
    let text = format!("{:.*}", decimals, value);
    // "-0" and "-0.0" read badly next to a colour bar
    if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
        text[1..].to_string()
    } else {
        text
    }
}

fn tick_values(range: &DisplayRange) -> Vec<f64> {
    (0..TICKS)
        .map(|i| range.min + (range.max - range.min) * i as f64 / (TICKS - 1) as f64)
        .collect()
}

/// Renders `band` into an RGBA canvas of 8 x 6 inches at `figure.dpi`.
///
/// The raster keeps its aspect ratio and uses nearest-neighbour scaling.
/// Invalid pixels are transparent.
pub fn render(band: &MaskedBand, figure: &Figure) -> RgbaImage {
    let span = figure.range.max - figure.range.min;
    let labels: Vec<String> = tick_values(&figure.range)
        .into_iter()
        .map(|v| format_tick(v, span))
        .collect();
    let label_chars = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let layout = Layout::new(figure.dpi, label_chars);

    let mut img = RgbaImage::from_pixel(layout.width, layout.height, WHITE);

    draw_title(&mut img, &layout, &figure.title);
    draw_raster(&mut img, &layout, band, figure);
    draw_colorbar(&mut img, &layout, figure, &labels);

    img
}

/// Renders and saves a PNG, creating parent directories.
pub fn save_png(band: &MaskedBand, figure: &Figure, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    render(band, figure).save(path)?;
    Ok(())
}

fn draw_title(img: &mut RgbaImage, layout: &Layout, title: &str) {
    let scale = layout.scale;
    let max_chars = (layout.width.saturating_sub(2 * layout.margin) / (ADVANCE * scale)) as usize;
    let title: String = title.chars().take(max_chars).collect();
    let w = text_width(&title, scale);
    let x = layout.width.saturating_sub(w) / 2;
    draw_text(img, x as i64, layout.margin as i64, &title, scale, INK);
}

fn draw_raster(img: &mut RgbaImage, layout: &Layout, band: &MaskedBand, figure: &Figure) {
    let (w, h) = band.shape();
    if w == 0 || h == 0 {
        return;
    }

    let plot = layout.plot;
    let zoom = (plot.w as f64 / w as f64).min(plot.h as f64 / h as f64);
    let out_w = ((w as f64 * zoom).floor() as u32).clamp(1, plot.w);
    let out_h = ((h as f64 * zoom).floor() as u32).clamp(1, plot.h);
    let x0 = plot.x + (plot.w - out_w) / 2;
    let y0 = plot.y + (plot.h - out_h) / 2;
    let span = figure.range.max - figure.range.min;

    for oy in 0..out_h {
        let row = (((oy as f64 + 0.5) / zoom) as usize).min(h - 1);
        for ox in 0..out_w {
            let col = (((ox as f64 + 0.5) / zoom) as usize).min(w - 1);
            let pixel = match band.get(row * w + col) {
                Some(v) => {
                    let t = (v as f64 - figure.range.min) / span;
                    let [r, g, b] = figure.colormap.evaluate(t);
                    Rgba([r, g, b, 255])
                }
                None => CLEAR,
            };
            img.put_pixel(x0 + ox, y0 + oy, pixel);
        }
    }
}

fn draw_colorbar(img: &mut RgbaImage, layout: &Layout, figure: &Figure, labels: &[String]) {
    let bar = layout.bar;
    if bar.x + bar.w >= layout.width {
        return;
    }

    for dy in 0..bar.h {
        let t = if bar.h > 1 {
            1.0 - dy as f64 / (bar.h - 1) as f64
        } else {
            0.5
        };
        let [r, g, b] = figure.colormap.evaluate(t);
        let row = Rect::at(bar.x as i32, (bar.y + dy) as i32).of_size(bar.w, 1);
        draw_filled_rect_mut(img, row, Rgba([r, g, b, 255]));
    }
    let outline = Rect::at(bar.x as i32, bar.y as i32).of_size(bar.w, bar.h);
    draw_hollow_rect_mut(img, outline, INK);

    let scale = layout.scale;
    let tick_len = layout.tick_len;
    let label_x = bar.x + bar.w + tick_len + layout.margin / 2;
    let glyph_h = text_height(scale) as i64;

    for (i, label) in labels.iter().enumerate() {
        let frac = i as f64 / (labels.len().max(2) - 1) as f64;
        let y = bar.y + ((1.0 - frac) * (bar.h - 1) as f64).round() as u32;
        if tick_len > 0 {
            let start = ((bar.x + bar.w) as f32, y as f32);
            let end = ((bar.x + bar.w + tick_len - 1) as f32, y as f32);
            draw_line_segment_mut(img, start, end, INK);
        }
        draw_text(img, label_x as i64, y as i64 - glyph_h / 2, label, scale, INK);
    }

    let label_w = labels
        .iter()
        .map(|l| text_width(l, scale))
        .max()
        .unwrap_or(0);
    let unit_x = label_x + label_w + layout.margin;
    let unit_len = text_width(&figure.unit_label, scale);
    let unit_y = bar.y + bar.h / 2 + unit_len / 2;
    draw_text_vertical(img, unit_x as i64, unit_y as i64, &figure.unit_label, scale, INK);
}
