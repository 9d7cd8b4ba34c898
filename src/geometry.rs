//! Pure placement math for scaling, cropping and padding.
//!
//! Rectangles use a lower-left origin: `y` grows upward. Raster buffers
//! from the `image` crate grow downward, so rectangles are flipped with
//! [`Rect::to_raster`] only at the moment pixels are touched.
//!
//! All fit/fill arithmetic is done in integers so that the floor rounding
//! is exact.

use crate::error::Result;

/// Largest padding fraction the padding search will try.
pub const MAX_PADDING: f64 = 0.5;

/// Padding increment per retry, in hundredths.
const PADDING_STEPS: u32 = 50;

/// Pixel extent of an image or box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Size of an `image` crate buffer.
    pub fn of<I: image::GenericImageView>(image: &I) -> Self {
        let (width, height) = image.dimensions();
        Self { width, height }
    }
}

/// Axis-aligned rectangle in lower-left-origin coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at the origin covering `size`.
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn min_x(&self) -> i64 {
        self.x
    }

    pub fn max_x(&self) -> i64 {
        self.x + self.width as i64
    }

    pub fn min_y(&self) -> i64 {
        self.y
    }

    pub fn max_y(&self) -> i64 {
        self.y + self.height as i64
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.min_x() >= self.min_x()
            && other.max_x() <= self.max_x()
            && other.min_y() >= self.min_y()
            && other.max_y() <= self.max_y()
    }

    /// Overlapping region, `None` when the rectangles do not overlap.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.min_x().max(other.min_x());
        let x1 = self.max_x().min(other.max_x());
        let y0 = self.min_y().max(other.min_y());
        let y1 = self.max_y().min(other.max_y());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Rect::new(x0, y0, (x1 - x0) as u32, (y1 - y0) as u32))
    }

    /// Shrink by `dx` on the left and right and `dy` on the bottom and top.
    pub fn inset(&self, dx: u32, dy: u32) -> Rect {
        Rect::new(
            self.x + dx as i64,
            self.y + dy as i64,
            self.width.saturating_sub(dx.saturating_mul(2)),
            self.height.saturating_sub(dy.saturating_mul(2)),
        )
    }

    /// Same rectangle with a top-left origin inside a canvas of `canvas_height`.
    pub fn to_raster(&self, canvas_height: u32) -> Rect {
        Rect::new(
            self.x,
            canvas_height as i64 - self.max_y(),
            self.width,
            self.height,
        )
    }
}

/// Largest size with the aspect ratio of `src` that fits inside `dst`.
///
/// The width is tried first; if the derived height overflows, the height is
/// pinned and the width derived instead. Both derivations round down.
pub fn aspect_fit(src: Size, dst: Size) -> Size {
    if src.is_empty() {
        return Size::default();
    }

    let (sw, sh) = (src.width as u64, src.height as u64);
    let mut width = dst.width as u64;
    let mut height = sh * width / sw;

    if height > dst.height as u64 {
        height = dst.height as u64;
        width = sw * height / sh;
    }

    Size::new(width as u32, height as u32)
}

/// Aspect-fit `src` into `dst` and center the result, offsets rounded down.
pub fn aspect_fit_centered(src: Size, dst: Rect) -> Rect {
    let placed = aspect_fit(src, dst.size());
    Rect::new(
        dst.x + ((dst.width - placed.width) / 2) as i64,
        dst.y + ((dst.height - placed.height) / 2) as i64,
        placed.width,
        placed.height,
    )
}

/// Result of scaling a source so it covers a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillCrop {
    /// Size the whole source is scaled to.
    pub scaled: Size,
    /// The box-sized window inside the scaled source that is kept.
    pub window: Rect,
}

/// Scale `src` to cover `dst` entirely and pick the centered crop window.
pub fn fill(src: Size, dst: Size) -> FillCrop {
    if src.is_empty() {
        return FillCrop {
            scaled: Size::default(),
            window: Rect::from_size(Size::default()),
        };
    }

    let (sw, sh) = (src.width as u64, src.height as u64);
    let mut width = dst.width as u64;
    let mut height = sh * width / sw;

    if height < dst.height as u64 {
        height = dst.height as u64;
        width = sw * height / sh;
    }

    let scaled = Size::new(width as u32, height as u32);
    let window = Rect::new(
        ((scaled.width - dst.width) / 2) as i64,
        ((scaled.height - dst.height) / 2) as i64,
        dst.width,
        dst.height,
    );

    FillCrop { scaled, window }
}

/// Decompose `outer` minus `used` into non-overlapping strips.
///
/// Left and right strips span the full height of `outer`; bottom and top
/// strips are limited to the column `used` occupies. `used` is clipped to
/// `outer` first.
pub fn rect_remainder(outer: Rect, used: Rect) -> Vec<Rect> {
    let used = match outer.intersection(&used) {
        Some(r) => r,
        None => {
            return if outer.is_empty() { vec![] } else { vec![outer] };
        }
    };

    let mut strips = Vec::with_capacity(4);

    if used.min_x() > outer.min_x() {
        strips.push(Rect::new(
            outer.x,
            outer.y,
            (used.min_x() - outer.min_x()) as u32,
            outer.height,
        ));
    }
    if used.max_x() < outer.max_x() {
        strips.push(Rect::new(
            used.max_x(),
            outer.y,
            (outer.max_x() - used.max_x()) as u32,
            outer.height,
        ));
    }
    if used.min_y() > outer.min_y() {
        strips.push(Rect::new(
            used.x,
            outer.y,
            used.width,
            (used.min_y() - outer.min_y()) as u32,
        ));
    }
    if used.max_y() < outer.max_y() {
        strips.push(Rect::new(
            used.x,
            used.max_y(),
            used.width,
            (outer.max_y() - used.max_y()) as u32,
        ));
    }

    strips
}

/// The drawable area of a `canvas` after insetting it by `padding`
/// (a fraction of each side).
pub fn padding_inset(canvas: Size, padding: f64) -> Rect {
    let full = Rect::from_size(canvas);
    if padding <= 0.0 || canvas.is_empty() {
        return full;
    }

    let (w, h) = (canvas.width as f64, canvas.height as f64);
    let mut dw = w * padding;
    let mut dh = h * padding;
    // keep the inset proportional to the canvas on both axes
    if dw > dh {
        dh = dw * h / w;
    } else {
        dw = dh * w / h;
    }

    full.inset(dw.floor() as u32, dh.floor() as u32)
}

/// Outcome of [`search_padding`].
#[derive(Debug, Clone, PartialEq)]
pub struct PaddingSearch<T> {
    /// The last candidate produced; the only one a caller should commit.
    pub accepted: T,
    pub padding: f64,
    pub size: u64,
    pub attempts: u32,
    pub within_limit: bool,
}

/// Trade padding for encoded size.
///
/// Calls `attempt` with padding 0.00, 0.01, ... 0.50 until the returned
/// size is at most `size_limit`. After the 0.50 attempt the oversized
/// candidate is accepted, so at most 51 attempts are made. With no limit a
/// single attempt at zero padding is made.
pub fn search_padding<T, F>(size_limit: Option<u64>, mut attempt: F) -> Result<PaddingSearch<T>>
where
    F: FnMut(f64) -> Result<(T, u64)>,
{
    let mut step = 0u32;
    loop {
        let padding = step as f64 / 100.0;
        let (candidate, size) = attempt(padding)?;
        let within_limit = size_limit.map_or(true, |limit| size <= limit);

        if within_limit || step >= PADDING_STEPS {
            return Ok(PaddingSearch {
                accepted: candidate,
                padding,
                size,
                attempts: step + 1,
                within_limit,
            });
        }

        step += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_aspect_fit_square() {
        assert_eq!(
            aspect_fit(Size::new(1200, 1200), Size::new(300, 300)),
            Size::new(300, 300)
        );
    }

    #[test]
    fn test_aspect_fit_wide_and_tall() {
        assert_eq!(
            aspect_fit(Size::new(400, 200), Size::new(100, 100)),
            Size::new(100, 50)
        );
        assert_eq!(
            aspect_fit(Size::new(200, 400), Size::new(100, 100)),
            Size::new(50, 100)
        );
    }

    #[test]
    fn test_aspect_fit_rounds_down() {
        // 200/300 * 90 = 60 exactly in integers; 7/3 * 10 = 23.33 -> 23
        assert_eq!(
            aspect_fit(Size::new(300, 200), Size::new(90, 90)),
            Size::new(90, 60)
        );
        assert_eq!(
            aspect_fit(Size::new(3, 7), Size::new(10, 10)),
            Size::new(4, 10)
        );
    }

    #[test]
    fn test_aspect_fit_bounds_property() {
        let sources = [(1, 1), (3, 7), (1000, 3), (640, 480), (17, 1920), (999, 1000)];
        let boxes = [(1, 1), (16, 16), (300, 100), (206, 618), (1024, 768)];
        for &(sw, sh) in &sources {
            for &(dw, dh) in &boxes {
                let fit = aspect_fit(Size::new(sw, sh), Size::new(dw, dh));
                assert!(fit.width <= dw && fit.height <= dh, "{:?} in {}x{}", fit, dw, dh);
                assert!(
                    fit.width == dw || fit.height == dh,
                    "{}x{} in {}x{} gave {:?}",
                    sw,
                    sh,
                    dw,
                    dh,
                    fit
                );
            }
        }
    }

    #[test]
    fn test_aspect_fit_empty_source() {
        assert_eq!(aspect_fit(Size::new(0, 10), Size::new(5, 5)), Size::default());
    }

    #[test]
    fn test_aspect_fit_centered() {
        let placed = aspect_fit_centered(Size::new(400, 200), Rect::new(10, 20, 100, 100));
        assert_eq!(placed, Rect::new(10, 45, 100, 50));

        // odd leftover rounds the offset down
        let placed = aspect_fit_centered(Size::new(2, 1), Rect::new(0, 0, 10, 9));
        assert_eq!(placed, Rect::new(0, 2, 10, 5));
    }

    #[test]
    fn test_fill_wide_source() {
        let crop = fill(Size::new(100, 50), Size::new(30, 30));
        assert_eq!(crop.scaled, Size::new(60, 30));
        assert_eq!(crop.window, Rect::new(15, 0, 30, 30));
    }

    #[test]
    fn test_fill_tall_source() {
        let crop = fill(Size::new(50, 101), Size::new(20, 20));
        assert_eq!(crop.scaled, Size::new(20, 40));
        assert_eq!(crop.window, Rect::new(0, 10, 20, 20));
    }

    #[test]
    fn test_fill_covers_and_centers_property() {
        let sources = [(1, 1), (3, 7), (1000, 3), (640, 480), (17, 1920), (1024, 1024)];
        let boxes = [(1, 1), (16, 16), (40, 30), (120, 120), (1024, 1024)];
        for &(sw, sh) in &sources {
            for &(dw, dh) in &boxes {
                let crop = fill(Size::new(sw, sh), Size::new(dw, dh));
                assert!(crop.scaled.width >= dw && crop.scaled.height >= dh);
                assert!(Rect::from_size(crop.scaled).contains(&crop.window));
                assert_eq!(crop.window.size(), Size::new(dw, dh));

                let left = crop.window.min_x();
                let right = crop.scaled.width as i64 - crop.window.max_x();
                assert!((left - right).abs() <= 1);
                let bottom = crop.window.min_y();
                let top = crop.scaled.height as i64 - crop.window.max_y();
                assert!((bottom - top).abs() <= 1);
            }
        }
    }

    fn assert_reconstructs(outer: Rect, used: Rect) {
        let strips = rect_remainder(outer, used);
        let clipped = outer.intersection(&used);
        let mut pieces: Vec<Rect> = strips.clone();
        if let Some(c) = clipped {
            pieces.push(c);
        }

        let total: u64 = pieces.iter().map(Rect::area).sum();
        assert_eq!(total, outer.area(), "areas differ for {:?} - {:?}", outer, used);

        for (i, a) in pieces.iter().enumerate() {
            assert!(outer.contains(a));
            for b in pieces.iter().skip(i + 1) {
                assert!(a.intersection(b).is_none(), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_rect_remainder_centered() {
        let outer = Rect::new(0, 0, 100, 80);
        let used = Rect::new(10, 20, 50, 30);
        let strips = rect_remainder(outer, used);
        assert_eq!(
            strips,
            vec![
                Rect::new(0, 0, 10, 80),
                Rect::new(60, 0, 40, 80),
                Rect::new(10, 0, 50, 20),
                Rect::new(10, 50, 50, 30),
            ]
        );
        assert_reconstructs(outer, used);
    }

    #[test]
    fn test_rect_remainder_full_coverage() {
        let outer = Rect::new(5, 5, 10, 10);
        assert!(rect_remainder(outer, outer).is_empty());
    }

    #[test]
    fn test_rect_remainder_property() {
        let outer = Rect::new(-3, 4, 40, 25);
        for x in [-3, 0, 10, 36] {
            for y in [4, 9, 28] {
                for (w, h) in [(1, 1), (4, 1), (1, 1), (3, 1)] {
                    let used = Rect::new(x, y, w, h);
                    if outer.contains(&used) {
                        assert_reconstructs(outer, used);
                    }
                }
            }
        }
        assert_reconstructs(outer, Rect::new(0, 10, 37, 19));
    }

    #[test]
    fn test_rect_remainder_disjoint() {
        let outer = Rect::new(0, 0, 10, 10);
        assert_eq!(rect_remainder(outer, Rect::new(20, 20, 5, 5)), vec![outer]);
    }

    #[test]
    fn test_to_raster_flips_y() {
        let r = Rect::new(2, 0, 4, 3);
        assert_eq!(r.to_raster(10), Rect::new(2, 7, 4, 3));
        assert_eq!(Rect::new(0, 7, 4, 3).to_raster(10), Rect::new(0, 0, 4, 3));
    }

    #[test]
    fn test_padding_inset() {
        assert_eq!(padding_inset(Size::new(618, 618), 0.0), Rect::new(0, 0, 618, 618));
        assert_eq!(padding_inset(Size::new(618, 618), 0.01), Rect::new(6, 6, 606, 606));
        assert_eq!(padding_inset(Size::new(300, 100), 0.1), Rect::new(30, 10, 240, 80));
    }

    #[test]
    fn test_padding_inset_shrinks_monotonically() {
        let canvas = Size::new(618, 618);
        let mut previous = padding_inset(canvas, 0.0);
        for step in 1..=50 {
            let current = padding_inset(canvas, step as f64 / 100.0);
            assert!(current.width < previous.width);
            assert!(current.height < previous.height);
            previous = current;
        }
    }

    #[test]
    fn test_search_padding_no_limit_single_attempt() {
        let mut calls = 0;
        let result = search_padding(None, |p| {
            calls += 1;
            Ok((p, 10_000_000))
        })
        .unwrap();
        assert_eq!(calls, 1);
        assert_eq!(result.padding, 0.0);
        assert!(result.within_limit);
    }

    #[test]
    fn test_search_padding_stops_when_small_enough() {
        let mut seen = Vec::new();
        let result = search_padding(Some(500_000), |p| {
            seen.push(p);
            // shrinks by 50k per percent of padding
            let size = 700_000 - (p * 100.0).round() as u64 * 50_000;
            Ok(((), size))
        })
        .unwrap();

        assert_eq!(result.attempts, 5);
        assert!((result.padding - 0.04).abs() < 1e-9);
        assert_eq!(result.size, 500_000);
        assert!(result.within_limit);
        for pair in seen.windows(2) {
            assert!((pair[1] - pair[0] - 0.01).abs() < 1e-9);
        }
    }

    #[test]
    fn test_search_padding_gives_up_after_half() {
        let mut attempts = 0;
        let result = search_padding(Some(500_000), |p| {
            attempts += 1;
            Ok((p, 900_000))
        })
        .unwrap();

        assert_eq!(attempts, 51);
        assert_eq!(result.attempts, 51);
        assert!((result.padding - MAX_PADDING).abs() < 1e-9);
        assert!(!result.within_limit);
    }

    #[test]
    fn test_search_padding_propagates_errors() {
        let result: Result<PaddingSearch<()>> = search_padding(Some(1), |_| {
            Err(crate::error::ImpError::validation("boom"))
        });
        assert!(result.is_err());
    }
}
