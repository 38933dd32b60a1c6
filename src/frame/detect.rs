//! Border detection and cropping

use image::{imageops, DynamicImage, GenericImageView, Pixel, Primitive};

use super::observer::{DetectionObserver, NullObserver};
use super::types::{Edge, Frame, FrameDetection};
use super::{BlankPolicy, CropOptions, ScanStrategy};

/// Full scale of an expanded channel value
const CHANNEL_MAX: f32 = 65535.0;

/// Detect the frame of `image` and return the cropped result
pub fn detect_and_crop(image: &DynamicImage, options: &CropOptions) -> DynamicImage {
    FrameDetector::detect_and_crop(image, options)
}

// ============================================================
// Color matching
// ============================================================

/// Compares pixels against the control color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorMatcher {
    control: [u32; 3],
    tolerance: u32,
}

impl ColorMatcher {
    pub fn new(control: [u32; 3], tolerance: u32) -> Self {
        Self { control, tolerance }
    }

    pub fn control(&self) -> [u32; 3] {
        self.control
    }

    /// Red, green and blue of `pixel` scaled to 0..=65535.
    ///
    /// 8-bit values map to `v * 257`, 16-bit values are kept, float values
    /// are scaled from `[0, 1]`.
    pub fn expand<P>(pixel: &P) -> [u32; 3]
    where
        P: Pixel,
        P::Subpixel: Into<f32>,
    {
        let max: f32 = <P::Subpixel as Primitive>::DEFAULT_MAX_VALUE.into();
        pixel.to_rgb().0.map(|channel| {
            let value: f32 = channel.into();
            ((value / max).clamp(0.0, 1.0) * CHANNEL_MAX).round() as u32
        })
    }

    /// Sum of absolute channel differences
    pub fn distance(a: [u32; 3], b: [u32; 3]) -> u32 {
        a.iter().zip(b.iter()).map(|(x, y)| x.abs_diff(*y)).sum()
    }

    /// Whether `color` counts as border
    pub fn matches_color(&self, color: [u32; 3]) -> bool {
        Self::distance(color, self.control) <= self.tolerance
    }

    pub fn matches<P>(&self, pixel: &P) -> bool
    where
        P: Pixel,
        P::Subpixel: Into<f32>,
    {
        self.matches_color(Self::expand(pixel))
    }
}

// ============================================================
// Frame Detector
// ============================================================

/// Uniform border detector
pub struct FrameDetector;

impl FrameDetector {
    /// Detect the frame of `image`, then crop to it
    pub fn detect_and_crop(image: &DynamicImage, options: &CropOptions) -> DynamicImage {
        let detection = Self::detect(image, options);
        Self::crop(image, &detection)
    }

    /// Detect the frame of a decoded image
    pub fn detect(image: &DynamicImage, options: &CropOptions) -> FrameDetection {
        Self::detect_with_observer(image, options, &mut NullObserver)
    }

    /// Detect the frame, reporting intermediate rectangles to `observer`
    pub fn detect_with_observer(
        image: &DynamicImage,
        options: &CropOptions,
        observer: &mut dyn DetectionObserver,
    ) -> FrameDetection {
        // Dispatch on the concrete buffer so deep images keep their precision
        match image {
            DynamicImage::ImageLuma8(buf) => Self::detect_view(buf, options, observer),
            DynamicImage::ImageLumaA8(buf) => Self::detect_view(buf, options, observer),
            DynamicImage::ImageRgb8(buf) => Self::detect_view(buf, options, observer),
            DynamicImage::ImageRgba8(buf) => Self::detect_view(buf, options, observer),
            DynamicImage::ImageLuma16(buf) => Self::detect_view(buf, options, observer),
            DynamicImage::ImageLumaA16(buf) => Self::detect_view(buf, options, observer),
            DynamicImage::ImageRgb16(buf) => Self::detect_view(buf, options, observer),
            DynamicImage::ImageRgba16(buf) => Self::detect_view(buf, options, observer),
            DynamicImage::ImageRgb32F(buf) => Self::detect_view(buf, options, observer),
            DynamicImage::ImageRgba32F(buf) => Self::detect_view(buf, options, observer),
            other => Self::detect_view(&other.to_rgba16(), options, observer),
        }
    }

    /// Detect the frame of any image view
    pub fn detect_view<I>(
        image: &I,
        options: &CropOptions,
        observer: &mut dyn DetectionObserver,
    ) -> FrameDetection
    where
        I: GenericImageView,
        <I::Pixel as Pixel>::Subpixel: Into<f32>,
    {
        let control = if image.width() == 0 || image.height() == 0 {
            [0; 3]
        } else {
            ColorMatcher::expand(&image.get_pixel(0, 0))
        };
        Self::detect_with_control(image, control, options, observer)
    }

    /// Detect the frame against a given control color instead of the
    /// pixel at (0, 0)
    pub fn detect_with_control<I>(
        image: &I,
        control: [u32; 3],
        options: &CropOptions,
        observer: &mut dyn DetectionObserver,
    ) -> FrameDetection
    where
        I: GenericImageView,
        <I::Pixel as Pixel>::Subpixel: Into<f32>,
    {
        let (width, height) = image.dimensions();
        let bounds = Frame::from_dimensions(width, height);
        let matcher = ColorMatcher::new(control, options.tolerance);
        observer.on_image(width, height, control);

        let mut content = bounds;
        let mut found_any = false;
        for edge in Edge::all() {
            let region = match options.strategy {
                ScanStrategy::Independent => bounds,
                ScanStrategy::Sequential => content,
            };
            let found = Self::scan_edge(image, &region, edge, &matcher);
            if let Some(position) = found {
                content.set_edge(edge, position);
                found_any = true;
            }
            observer.on_edge(edge, found.is_some(), &content);
        }

        let blank = !found_any;
        if blank && options.blank_policy == BlankPolicy::Collapse {
            content = bounds.collapsed_to_center();
        }
        observer.on_content(&content, blank);

        let frame = content.expand(options.margin).intersect(&bounds);
        observer.on_frame(&frame, options.margin);

        FrameDetection {
            image_size: (width, height),
            control,
            content,
            frame,
            blank,
        }
    }

    /// Copy the detected frame into a new RGBA image.
    ///
    /// Sources deeper than 8 bits per channel give RGBA16, others RGBA8.
    pub fn crop(image: &DynamicImage, detection: &FrameDetection) -> DynamicImage {
        let frame = detection.frame;
        let x = u32::try_from(frame.min_x).unwrap_or(0);
        let y = u32::try_from(frame.min_y).unwrap_or(0);
        let (width, height) = frame.size();

        let color = image.color();
        if color.bytes_per_pixel() > color.channel_count() {
            DynamicImage::ImageRgba16(image.crop_imm(x, y, width, height).into_rgba16())
        } else {
            DynamicImage::ImageRgba8(imageops::crop_imm(image, x, y, width, height).to_image())
        }
    }

    /// Position of the new edge, or `None` when every line in `region`
    /// matches the control color
    fn scan_edge<I>(image: &I, region: &Frame, edge: Edge, matcher: &ColorMatcher) -> Option<i64>
    where
        I: GenericImageView,
        <I::Pixel as Pixel>::Subpixel: Into<f32>,
    {
        let rows = || region.min_y..region.max_y;
        let cols = || region.min_x..region.max_x;
        match edge {
            Edge::Top => rows().find(|&y| !Self::row_matches(image, region, y, matcher)),
            Edge::Bottom => rows()
                .rev()
                .find(|&y| !Self::row_matches(image, region, y, matcher))
                .map(|y| y + 1),
            Edge::Left => cols().find(|&x| !Self::column_matches(image, region, x, matcher)),
            Edge::Right => cols()
                .rev()
                .find(|&x| !Self::column_matches(image, region, x, matcher))
                .map(|x| x + 1),
        }
    }

    fn row_matches<I>(image: &I, region: &Frame, y: i64, matcher: &ColorMatcher) -> bool
    where
        I: GenericImageView,
        <I::Pixel as Pixel>::Subpixel: Into<f32>,
    {
        (region.min_x..region.max_x)
            .all(|x| matcher.matches(&image.get_pixel(x as u32, y as u32)))
    }

    fn column_matches<I>(image: &I, region: &Frame, x: i64, matcher: &ColorMatcher) -> bool
    where
        I: GenericImageView,
        <I::Pixel as Pixel>::Subpixel: Into<f32>,
    {
        (region.min_y..region.max_y)
            .all(|y| matcher.matches(&image.get_pixel(x as u32, y as u32)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::observer::{DetectionEvent, RecordingObserver};
    use image::{ImageBuffer, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    /// `width` x `height` image of `border` with a `fill` block inset by `inset`
    fn framed(width: u32, height: u32, inset: u32, border: Rgb<u8>, fill: Rgb<u8>) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            let inside = x >= inset && y >= inset && x < width - inset && y < height - inset;
            if inside {
                fill
            } else {
                border
            }
        })
    }

    /// Image with distinct border widths per side
    fn framed_asymmetric(top: u32, bottom: u32, left: u32, right: u32) -> RgbImage {
        let (width, height) = (60, 40);
        RgbImage::from_fn(width, height, |x, y| {
            let inside = y >= top && y < height - bottom && x >= left && x < width - right;
            if inside {
                Rgb([200, 30, 30])
            } else {
                BLACK
            }
        })
    }

    /// Deterministic noise, so property checks don't need a rand dependency
    fn noisy(width: u32, height: u32, seed: u32) -> RgbImage {
        let mut state = seed.wrapping_mul(2_654_435_761).max(1);
        RgbImage::from_fn(width, height, |x, y| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let border = x < 3 || y < 5 || x + 7 >= width || y + 2 >= height;
            if border {
                Rgb([10, 10, 10])
            } else {
                let v = (state % 256) as u8;
                Rgb([v, v.wrapping_add(40), v / 2])
            }
        })
    }

    fn detect_rgb(image: RgbImage, options: &CropOptions) -> FrameDetection {
        FrameDetector::detect(&DynamicImage::ImageRgb8(image), options)
    }

    #[test]
    fn test_expand_scales_to_16_bit() {
        assert_eq!(ColorMatcher::expand(&Rgb([255u8, 0, 1])), [65535, 0, 257]);
        assert_eq!(ColorMatcher::expand(&Rgb([1000u16, 2, 3])), [1000, 2, 3]);
        assert_eq!(
            ColorMatcher::expand(&Rgb([1.0f32, 0.5, -0.2])),
            [65535, 32768, 0]
        );
        assert_eq!(ColorMatcher::expand(&Luma([128u8])), [32896, 32896, 32896]);
    }

    #[test]
    fn test_distance_ignores_alpha() {
        let matcher = ColorMatcher::new([0, 0, 0], 0);
        assert!(matcher.matches(&Rgba([0u8, 0, 0, 0])));
        assert!(matcher.matches(&Rgba([0u8, 0, 0, 255])));
        assert_eq!(ColorMatcher::distance([10, 20, 30], [30, 20, 10]), 40);
    }

    #[test]
    fn test_tolerance_is_inclusive() {
        let matcher = ColorMatcher::new([0, 0, 0], 257 * 3);
        assert!(matcher.matches(&Rgb([1u8, 1, 1])));
        assert!(!matcher.matches(&Rgb([1u8, 1, 2])));
    }

    #[test]
    fn test_black_border_white_interior() {
        let image = DynamicImage::ImageRgb8(framed(100, 100, 10, BLACK, WHITE));
        let cropped = detect_and_crop(&image, &CropOptions::exact());

        assert_eq!(cropped.dimensions(), (80, 80));
        let rgba = cropped.to_rgba8();
        assert!(rgba.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn test_margin_reintroduces_border() {
        let image = DynamicImage::ImageRgb8(framed(100, 100, 10, BLACK, WHITE));
        let options = CropOptions::builder().margin(5).tolerance(0).build();
        let cropped = detect_and_crop(&image, &options).to_rgba8();

        assert_eq!(cropped.dimensions(), (90, 90));
        for (x, y, pixel) in cropped.enumerate_pixels() {
            let ring = x < 5 || y < 5 || x >= 85 || y >= 85;
            let expected = if ring {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            };
            assert_eq!(*pixel, expected, "pixel at ({x}, {y})");
        }
    }

    #[test]
    fn test_single_pixel_image() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([12, 34, 56])));
        for margin in [0, 1, 50] {
            let options = CropOptions::builder().margin(margin).tolerance(0).build();
            let cropped = detect_and_crop(&image, &options).to_rgba8();
            assert_eq!(cropped.dimensions(), (1, 1));
            assert_eq!(*cropped.get_pixel(0, 0), Rgba([12, 34, 56, 255]));
        }
    }

    #[test]
    fn test_zero_sized_image() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        let detection = FrameDetector::detect(&image, &CropOptions::default());
        assert!(detection.blank);
        assert_eq!(detection.frame, Frame::EMPTY);
        assert_eq!(FrameDetector::crop(&image, &detection).dimensions(), (0, 0));
    }

    #[test]
    fn test_border_width_per_side() {
        let detection = detect_rgb(framed_asymmetric(3, 7, 11, 2), &CropOptions::exact());
        assert_eq!(detection.content, Frame::new(11, 3, 58, 33));
        assert_eq!(detection.frame, detection.content);

        let trimmed = detection.trimmed();
        assert_eq!(
            (trimmed.top, trimmed.bottom, trimmed.left, trimmed.right),
            (3, 7, 11, 2)
        );
    }

    #[test]
    fn test_scan_edge_each_direction() {
        let image = framed_asymmetric(3, 7, 11, 2);
        let matcher = ColorMatcher::new([0, 0, 0], 0);
        let bounds = Frame::from_dimensions(60, 40);

        let found: Vec<_> = Edge::all()
            .into_iter()
            .map(|edge| FrameDetector::scan_edge(&image, &bounds, edge, &matcher))
            .collect();
        assert_eq!(found, vec![Some(3), Some(33), Some(11), Some(58)]);

        let blank = RgbImage::from_pixel(8, 8, BLACK);
        let bounds = Frame::from_dimensions(8, 8);
        for edge in Edge::all() {
            assert_eq!(FrameDetector::scan_edge(&blank, &bounds, edge, &matcher), None);
        }
    }

    #[test]
    fn test_no_border_keeps_image() {
        let image = framed(30, 20, 0, BLACK, WHITE);
        let detection = detect_rgb(image, &CropOptions::exact());
        // Control pixel is white here, content spans everything
        assert!(detection.blank);
        assert!(detection.is_full_image());
    }

    #[test]
    fn test_blank_keep_full() {
        let image = RgbImage::from_pixel(40, 30, Rgb([90, 90, 90]));
        let options = CropOptions::builder().margin(4).tolerance(0).build();
        let detection = detect_rgb(image, &options);

        assert!(detection.blank);
        assert_eq!(detection.content, Frame::from_dimensions(40, 30));
        assert_eq!(detection.output_size(), (40, 30));
    }

    #[test]
    fn test_blank_collapse_leaves_margin() {
        for (width, height) in [(40, 30), (41, 29), (7, 100)] {
            for margin in [0u32, 3, 10, 200] {
                let image = RgbImage::from_pixel(width, height, Rgb([90, 90, 90]));
                let options = CropOptions::builder()
                    .margin(margin)
                    .tolerance(0)
                    .blank_policy(BlankPolicy::Collapse)
                    .build();
                let detection = detect_rgb(image, &options);

                assert!(detection.blank);
                assert!(detection.content.is_empty());
                assert_eq!(
                    detection.output_size(),
                    ((2 * margin).min(width), (2 * margin).min(height)),
                    "{width}x{height} margin {margin}"
                );
            }
        }
    }

    #[test]
    fn test_collapse_ignored_when_content_exists() {
        let options = CropOptions::builder()
            .margin(0)
            .tolerance(0)
            .blank_policy(BlankPolicy::Collapse)
            .build();
        let detection = detect_rgb(framed(50, 50, 5, BLACK, WHITE), &options);
        assert!(!detection.blank);
        assert_eq!(detection.content, Frame::new(5, 5, 45, 45));
    }

    #[test]
    fn test_large_tolerance_keeps_full_image() {
        let options = CropOptions::builder().margin(3).tolerance(u32::MAX).build();
        let detection = detect_rgb(framed(50, 50, 5, BLACK, WHITE), &options);
        assert!(detection.blank);
        assert!(detection.is_full_image());
    }

    #[test]
    fn test_tolerance_absorbs_near_border() {
        let near_black = Rgb([2, 1, 0]);
        let mut image = framed(50, 50, 10, BLACK, WHITE);
        for x in 0..50 {
            image.put_pixel(x, 4, near_black);
        }

        let strict = detect_rgb(image.clone(), &CropOptions::exact());
        assert_eq!(strict.content.min_y, 4);

        let loose = CropOptions::builder().margin(0).tolerance(3 * 257).build();
        let detection = detect_rgb(image, &loose);
        assert_eq!(detection.content.min_y, 10);
    }

    #[test]
    fn test_strategies_agree() {
        let sequential = CropOptions::builder()
            .margin(0)
            .tolerance(0)
            .strategy(ScanStrategy::Sequential)
            .build();

        let cases = vec![
            framed(100, 100, 10, BLACK, WHITE),
            framed_asymmetric(1, 0, 5, 9),
            framed_asymmetric(0, 0, 0, 0),
            noisy(64, 48, 7),
            noisy(13, 90, 42),
            RgbImage::from_pixel(9, 9, WHITE),
        ];
        for image in cases {
            let a = detect_rgb(image.clone(), &CropOptions::exact());
            let b = detect_rgb(image, &sequential);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_sequential_narrows_before_columns() {
        let options = CropOptions::builder()
            .margin(0)
            .tolerance(0)
            .strategy(ScanStrategy::Sequential)
            .build();
        let mut observer = RecordingObserver::new();
        FrameDetector::detect_with_observer(
            &DynamicImage::ImageRgb8(framed_asymmetric(3, 7, 11, 2)),
            &options,
            &mut observer,
        );

        let frames = observer.edge_frames();
        assert_eq!(frames[0], (Edge::Top, Frame::new(0, 3, 60, 40)));
        assert_eq!(frames[1], (Edge::Bottom, Frame::new(0, 3, 60, 33)));
        assert_eq!(frames[2], (Edge::Left, Frame::new(11, 3, 60, 33)));
        assert_eq!(frames[3], (Edge::Right, Frame::new(11, 3, 58, 33)));
    }

    #[test]
    fn test_observer_receives_all_stages() {
        let mut observer = RecordingObserver::new();
        let options = CropOptions::builder().margin(2).tolerance(0).build();
        FrameDetector::detect_with_observer(
            &DynamicImage::ImageRgb8(framed(20, 20, 4, BLACK, WHITE)),
            &options,
            &mut observer,
        );

        assert_eq!(observer.events.len(), 7);
        assert_eq!(
            observer.events[0],
            DetectionEvent::Image {
                width: 20,
                height: 20,
                control: [0, 0, 0],
            }
        );
        assert_eq!(
            observer.events[5],
            DetectionEvent::Content {
                content: Frame::new(4, 4, 16, 16),
                blank: false,
            }
        );
        assert_eq!(
            observer.events[6],
            DetectionEvent::Final {
                frame: Frame::new(2, 2, 18, 18),
                margin: 2,
            }
        );
    }

    #[test]
    fn test_idempotent_with_same_control() {
        let image = DynamicImage::ImageRgb8(framed(60, 60, 8, BLACK, WHITE));
        let first = FrameDetector::detect(&image, &CropOptions::exact());
        let cropped = FrameDetector::crop(&image, &first);
        assert_eq!(cropped.dimensions(), (44, 44));

        let second = FrameDetector::detect_with_control(
            &cropped.to_rgba8(),
            first.control,
            &CropOptions::exact(),
            &mut NullObserver,
        );
        assert!(!second.blank);
        assert!(second.is_full_image());
    }

    #[test]
    fn test_control_override_on_empty_image() {
        let detection = FrameDetector::detect_with_control(
            &RgbImage::new(0, 5),
            [0, 0, 0],
            &CropOptions::default(),
            &mut NullObserver,
        );
        assert!(detection.blank);
        assert_eq!(detection.frame, Frame::EMPTY);
    }

    #[test]
    fn test_monotonic_in_tolerance() {
        // Concentric rings that get brighter toward the center
        let image = RgbImage::from_fn(80, 80, |x, y| {
            let ring = x.min(y).min(79 - x).min(79 - y);
            let v = (ring * 6).min(255) as u8;
            Rgb([v, v, v])
        });

        let mut previous: Option<Frame> = None;
        for tolerance in [0u32, 257, 3 * 257 * 6, 3 * 257 * 30, 3 * 257 * 100] {
            let options = CropOptions::builder().margin(0).tolerance(tolerance).build();
            let detection = detect_rgb(image.clone(), &options);
            assert!(!detection.blank, "tolerance {tolerance}");
            if let Some(larger) = previous {
                assert!(
                    larger.contains_frame(&detection.content),
                    "tolerance {tolerance}: {} not within {}",
                    detection.content,
                    larger
                );
            }
            previous = Some(detection.content);
        }
    }

    #[test]
    fn test_margin_never_exceeds_bounds() {
        let image = noisy(37, 23, 3);
        let bounds = Frame::from_dimensions(37, 23);
        for margin in [0u32, 1, 2, 5, 17, 1000, u32::MAX] {
            let options = CropOptions::builder().margin(margin).tolerance(0).build();
            let detection = detect_rgb(image.clone(), &options);
            assert!(bounds.contains_frame(&detection.frame), "margin {margin}");
            assert!(detection.frame.contains_frame(&detection.content));
        }
    }

    #[test]
    fn test_sixteen_bit_precision() {
        // 1-unit difference in 16-bit is invisible in 8-bit but still content
        let image: ImageBuffer<Rgb<u16>, Vec<u16>> = ImageBuffer::from_fn(20, 20, |x, y| {
            if (5..15).contains(&x) && (5..15).contains(&y) {
                Rgb([1, 0, 0])
            } else {
                Rgb([0, 0, 0])
            }
        });
        let dynamic = DynamicImage::ImageRgb16(image);

        let detection = FrameDetector::detect(&dynamic, &CropOptions::exact());
        assert_eq!(detection.content, Frame::new(5, 5, 15, 15));

        let loose = CropOptions::builder().margin(0).tolerance(1).build();
        assert!(FrameDetector::detect(&dynamic, &loose).blank);

        let cropped = FrameDetector::crop(&dynamic, &detection);
        assert!(matches!(cropped, DynamicImage::ImageRgba16(_)));
        assert_eq!(cropped.dimensions(), (10, 10));
    }

    #[test]
    fn test_rgba_source_keeps_alpha() {
        let image = RgbaImage::from_fn(10, 10, |x, y| {
            if (2..8).contains(&x) && (2..8).contains(&y) {
                Rgba([255, 0, 0, 128])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        let cropped =
            detect_and_crop(&DynamicImage::ImageRgba8(image), &CropOptions::exact()).to_rgba8();
        assert_eq!(cropped.dimensions(), (6, 6));
        assert_eq!(*cropped.get_pixel(0, 0), Rgba([255, 0, 0, 128]));
    }

    #[test]
    fn test_grayscale_source_is_opaque_rgba() {
        let image = ImageBuffer::from_fn(10, 10, |x, _| {
            if x < 3 {
                Luma([0u8])
            } else {
                Luma([200u8])
            }
        });
        let cropped = detect_and_crop(&DynamicImage::ImageLuma8(image), &CropOptions::exact());
        assert!(matches!(cropped, DynamicImage::ImageRgba8(_)));
        let rgba = cropped.to_rgba8();
        assert_eq!(rgba.dimensions(), (7, 10));
        assert_eq!(*rgba.get_pixel(0, 0), Rgba([200, 200, 200, 255]));
    }
}
