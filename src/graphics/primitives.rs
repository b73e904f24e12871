//! Drawing primitives over a [`Framebuffer`]
//!
//! Plain functions that only go through [`Framebuffer::set_pixel`] and
//! [`Framebuffer::pixel`], so they behave the same for every bit depth and clip
//! the same way. Lengths and sizes that are zero or negative draw nothing.
//!
//! Rasterization is integer only: the same inputs always produce the same
//! pixels.

use core::ops::RangeInclusive;

use super::font::Font;
use super::framebuffer::Framebuffer;

/// Set a single pixel
pub fn pixel(fb: &mut Framebuffer, x: i32, y: i32, color: u8) {
    fb.set_pixel(x, y, color);
}

/// Horizontal run of `len` pixels starting at (x, y)
pub fn hline(fb: &mut Framebuffer, x: i32, y: i32, len: i32, color: u8) {
    if y < 0 || y >= i32::from(fb.height()) {
        return;
    }
    let start = x.max(0);
    let end = x.saturating_add(len).min(i32::from(fb.width()));
    for px in start..end {
        fb.set_pixel(px, y, color);
    }
}

/// Vertical run of `len` pixels starting at (x, y)
pub fn vline(fb: &mut Framebuffer, x: i32, y: i32, len: i32, color: u8) {
    if x < 0 || x >= i32::from(fb.width()) {
        return;
    }
    let start = y.max(0);
    let end = y.saturating_add(len).min(i32::from(fb.height()));
    for py in start..end {
        fb.set_pixel(x, py, color);
    }
}

/// Line from (x1, y1) to (x2, y2) inclusive, Bresenham.
///
/// Only the steps that land on the framebuffer's major axis are walked, so
/// far off-screen endpoints cost no more than on-screen ones.
pub fn line(fb: &mut Framebuffer, x1: i32, y1: i32, x2: i32, y2: i32, color: u8) {
    let (x1, y1, x2, y2) = (i64::from(x1), i64::from(y1), i64::from(x2), i64::from(y2));
    let (dx, dy) = ((x2 - x1).abs(), (y2 - y1).abs());
    let sx = if x1 < x2 { 1 } else { -1 };
    let sy = if y1 < y2 { 1 } else { -1 };
    let x_major = dx >= dy;
    let (major, minor) = if x_major { (dx, dy) } else { (dy, dx) };
    let (first, step, extent) = if x_major {
        (x1, sx, i64::from(fb.width()))
    } else {
        (y1, sy, i64::from(fb.height()))
    };

    let (lo, hi) = if step > 0 {
        ((-first).max(0), major.min(extent - 1 - first))
    } else {
        ((first - (extent - 1)).max(0), major.min(first))
    };
    for k in lo..=hi {
        // rounded minor offset after k major steps, same pixels as the
        // incremental error term
        let off = if major == 0 {
            0
        } else {
            let num = 2 * i128::from(k) * i128::from(minor) + i128::from(major);
            (num / (2 * i128::from(major))) as i64
        };
        if x_major {
            plot(fb, x1 + sx * k, y1 + sy * off, color);
        } else {
            plot(fb, x1 + sx * off, y1 + sy * k, color);
        }
    }
}

/// Rectangle with top left corner (x, y).
///
/// The outline touches each boundary pixel exactly once, `2w + 2h - 4` pixels
/// for `w, h > 1`.
pub fn rect(fb: &mut Framebuffer, x: i32, y: i32, w: i32, h: i32, color: u8, filled: bool) {
    if w <= 0 || h <= 0 {
        return;
    }
    if filled {
        fill_rect(fb, x, y, w, h, color);
        return;
    }

    hline(fb, x, y, w, color);
    if h > 1 {
        hline(fb, x, y.saturating_add(h - 1), w, color);
    }
    // sides without the corners already drawn
    vline(fb, x, y.saturating_add(1), h - 2, color);
    if w > 1 {
        vline(fb, x.saturating_add(w - 1), y.saturating_add(1), h - 2, color);
    }
}

/// Every pixel of the rectangle, clipped to the framebuffer
pub fn fill_rect(fb: &mut Framebuffer, x: i32, y: i32, w: i32, h: i32, color: u8) {
    if w <= 0 || h <= 0 {
        return;
    }
    let y_end = y.saturating_add(h).min(i32::from(fb.height()));
    for py in y.max(0)..y_end {
        hline(fb, x, py, w, color);
    }
}

/// Circle of radius `r` around (cx, cy), midpoint algorithm.
///
/// Octant points are computed per row from the midpoint decision term
/// `x^2 - x + y^2 < r^2`, so only rows and columns inside the framebuffer
/// are visited whatever the radius.
pub fn circle(fb: &mut Framebuffer, cx: i32, cy: i32, r: i32, color: u8, filled: bool) {
    if r < 0 {
        return;
    }
    if r == 0 {
        fb.set_pixel(cx, cy, color);
        return;
    }
    let (w, h) = (i64::from(fb.width()), i64::from(fb.height()));
    let (cx, cy, r) = (i64::from(cx), i64::from(cy), i64::from(r));
    if cx + r < 0 || cx - r >= w || cy + r < 0 || cy - r >= h {
        return;
    }

    let r2 = i128::from(r) * i128::from(r);
    // half width of the octant row at offset y
    let x_at = |y: i64| {
        let y2 = i128::from(y) * i128::from(y);
        last_true(r, |x| x * x - x + y2 < r2)
    };
    // last row of the first octant
    let y_max = last_true(r, |y| 2 * y * y - y < r2);

    if filled {
        for t in offsets_on_screen(cy, h, r).into_iter().flatten() {
            let half = if t <= y_max {
                x_at(t)
            } else {
                let t = i128::from(t);
                last_true(y_max, |y| y * y < r2 - t * t + t)
            };
            span(fb, cx - half, cx + half, cy + t, color);
            span(fb, cx - half, cx + half, cy - t, color);
        }
        return;
    }

    let rows = offsets_on_screen(cy, h, y_max);
    let cols = offsets_on_screen(cx, w, y_max);
    for y in rows.into_iter().chain(cols).flatten() {
        let x = x_at(y);
        for (px, py) in [
            (x, y),
            (y, x),
            (-y, x),
            (-x, y),
            (-x, -y),
            (-y, -x),
            (y, -x),
            (x, -y),
        ] {
            plot(fb, cx + px, cy + py, color);
        }
    }
}

/// Offsets `d` in `0..=max` with `c + d` or `c - d` inside `0..extent`
fn offsets_on_screen(c: i64, extent: i64, max: i64) -> [RangeInclusive<i64>; 2] {
    [
        (-c).max(0)..=max.min(extent - 1 - c),
        (c - (extent - 1)).max(0)..=max.min(c),
    ]
}

/// Largest `v` in `0..=hi` for which `pred` holds, `pred` true at 0 and
/// monotone
fn last_true(hi: i64, pred: impl Fn(i128) -> bool) -> i64 {
    let (mut lo, mut hi) = (0, hi);
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if pred(i128::from(mid)) {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    lo
}

fn plot(fb: &mut Framebuffer, x: i64, y: i64, color: u8) {
    if let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) {
        fb.set_pixel(x, y, color);
    }
}

/// Inclusive horizontal span in wide coordinates, clipped before narrowing
fn span(fb: &mut Framebuffer, x0: i64, x1: i64, y: i64, color: u8) {
    if y < 0 || y >= i64::from(fb.height()) {
        return;
    }
    let start = x0.max(0);
    let end = x1.min(i64::from(fb.width()) - 1);
    if start <= end {
        hline(fb, start as i32, y as i32, (end - start + 1) as i32, color);
    }
}

/// Draw `s` with its first cell's top left corner at (x, y).
///
/// Only the glyphs' set bits are drawn, the background is left as is.
/// Characters the font has no glyph for leave a blank cell. Returns the x
/// where the next character would go.
pub fn text(fb: &mut Framebuffer, s: &str, x: i32, y: i32, color: u8, font: &Font) -> i32 {
    let advance = i32::from(font.width);
    let mut cursor = x;

    for c in s.chars() {
        if let Some(glyph) = font.glyph(c) {
            for (row, bits) in glyph.iter().take(usize::from(font.height)).enumerate() {
                for col in 0..font.width.min(8) {
                    if bits & (0x80 >> col) != 0 {
                        fb.set_pixel(
                            cursor.saturating_add(i32::from(col)),
                            y.saturating_add(row as i32),
                            color,
                        );
                    }
                }
            }
        }
        cursor = cursor.saturating_add(advance);
    }
    cursor
}

/// Copy `src` into `dst` with its top left corner at (x, y), clipped to `dst`.
///
/// With `transparent` set, source pixels of that index are skipped and the
/// destination keeps its value.
pub fn blit(dst: &mut Framebuffer, src: &Framebuffer, x: i32, y: i32, transparent: Option<u8>) {
    blit_mapped(dst, src, x, y, transparent, |index| index);
}

/// Like [`blit`], but each source index is looked up in `palette` first.
///
/// Indices past the end of `palette` are copied unchanged. The transparent key
/// is compared against the source index, before the lookup.
pub fn blit_with_palette(
    dst: &mut Framebuffer,
    src: &Framebuffer,
    x: i32,
    y: i32,
    transparent: Option<u8>,
    palette: &[u8],
) {
    blit_mapped(dst, src, x, y, transparent, |index| {
        palette.get(usize::from(index)).copied().unwrap_or(index)
    });
}

fn blit_mapped<F>(
    dst: &mut Framebuffer,
    src: &Framebuffer,
    x: i32,
    y: i32,
    transparent: Option<u8>,
    map: F,
) where
    F: Fn(u8) -> u8,
{
    // source rows/columns that land inside dst
    let col_start = x.saturating_neg().max(0);
    let col_end = i32::from(src.width()).min(i32::from(dst.width()).saturating_sub(x));
    let row_start = y.saturating_neg().max(0);
    let row_end = i32::from(src.height()).min(i32::from(dst.height()).saturating_sub(y));

    for sy in row_start..row_end {
        for sx in col_start..col_end {
            let index = src.pixel(sx, sy);
            if transparent == Some(index) {
                continue;
            }
            dst.set_pixel(x + sx, y + sy, map(index));
        }
    }
}
