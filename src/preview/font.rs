//! 5x7 bitmap glyphs for titles and colour-bar labels.
//!
//! Lowercase letters are drawn with the uppercase glyphs. Characters without
//! a glyph render as `?`.

use image::{Rgba, RgbaImage};

pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;
/// Horizontal advance per character, in glyph pixels.
pub const ADVANCE: u32 = GLYPH_WIDTH + 1;

const UNKNOWN: [u8; 7] = [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04];

fn glyph(c: char) -> [u8; 7] {
    match c.to_ascii_uppercase() {
        ' ' => [0x00; 7],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '+' => [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        '_' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '/' => [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00],
        '(' => [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02],
        ')' => [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08],
        _ => UNKNOWN,
    }
}

/// Width in canvas pixels of `text` drawn at `scale`.
pub fn text_width(text: &str, scale: u32) -> u32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        0
    } else {
        (n * ADVANCE - 1) * scale
    }
}

pub fn text_height(scale: u32) -> u32 {
    GLYPH_HEIGHT * scale
}

fn put(img: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

fn fill_cell(img: &mut RgbaImage, x: i64, y: i64, scale: u32, color: Rgba<u8>) {
    for dy in 0..scale as i64 {
        for dx in 0..scale as i64 {
            put(img, x + dx, y + dy, color);
        }
    }
}

/// Draws `text` left to right with its top-left corner at (x, y).
/// Pixels falling outside the canvas are clipped.
pub fn draw_text(img: &mut RgbaImage, x: i64, y: i64, text: &str, scale: u32, color: Rgba<u8>) {
    let step = (ADVANCE * scale) as i64;
    for (i, c) in text.chars().enumerate() {
        let bits = glyph(c);
        let origin = x + i as i64 * step;
        for (row, line) in bits.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if line & (0x10 >> col) != 0 {
                    fill_cell(
                        img,
                        origin + (col * scale) as i64,
                        y + (row as u32 * scale) as i64,
                        scale,
                        color,
                    );
                }
            }
        }
    }
}

/// Draws `text` rotated a quarter turn counter-clockwise, reading bottom to
/// top. (x, y) is the bottom-left corner of the rotated run.
pub fn draw_text_vertical(
    img: &mut RgbaImage,
    x: i64,
    y: i64,
    text: &str,
    scale: u32,
    color: Rgba<u8>,
) {
    let step = (ADVANCE * scale) as i64;
    let s = scale as i64;
    for (i, c) in text.chars().enumerate() {
        let bits = glyph(c);
        let along = i as i64 * step;
        for (row, line) in bits.iter().enumerate() {
            for col in 0..GLYPH_WIDTH as i64 {
                if line & (0x10 >> col) != 0 {
                    fill_cell(img, x + row as i64 * s, y - along - (col + 1) * s, scale, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn ink(img: &RgbaImage) -> usize {
        img.pixels().filter(|p| p.0[3] == 255).count()
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("", 3), 0);
        assert_eq!(text_width("A", 1), 5);
        assert_eq!(text_width("-12.5", 2), (5 * 6 - 1) * 2);
    }

    #[test]
    fn test_lowercase_matches_uppercase() {
        assert_eq!(glyph('v'), glyph('V'));
        assert_eq!(glyph('~'), UNKNOWN);
    }

    #[test]
    fn test_draw_is_clipped_and_scaled() {
        let mut img = RgbaImage::new(40, 20);
        draw_text(&mut img, 0, 0, "1", 1, BLACK);
        let one = ink(&img);
        assert_eq!(one, 10);

        let mut img = RgbaImage::new(40, 20);
        draw_text(&mut img, 0, 0, "1", 2, BLACK);
        assert_eq!(ink(&img), one * 4);

        let mut img = RgbaImage::new(4, 4);
        draw_text(&mut img, -2, -2, "8888", 3, BLACK);
        assert!(ink(&img) <= 16);
    }

    #[test]
    fn test_vertical_has_same_ink() {
        let mut flat = RgbaImage::new(60, 60);
        draw_text(&mut flat, 2, 2, "DB", 1, BLACK);
        let mut upright = RgbaImage::new(60, 60);
        draw_text_vertical(&mut upright, 2, 50, "DB", 1, BLACK);
        assert_eq!(ink(&flat), ink(&upright));
    }
}
