pub mod candidates;
pub mod circles;
pub mod classify;
pub mod color;
pub mod field;
pub mod holes;
pub mod hough;
pub mod kmeans;
pub mod preprocessing;
pub mod region_growing;
pub mod regions;

use image::RgbImage;

use crate::config::LocalizerConfig;
use crate::error::{LocalizeError, Result};
use crate::models::{BallsLocalization, FieldLocalization};
use crate::pipeline::DebugSink;

/// Find and classify the balls lying on a previously localized field.
///
/// Stages, each reported to `sink`:
/// 1. blur and restrict the frame to the field
/// 2. threshold felt, shadow and rail colors into the surface mask
/// 3. grow the surface from its own pixels, close gaps, repair holes
/// 4. detect ball-sized circles on the surface boundary and filter them
/// 5. classify the survivors
pub fn localize_balls(
    frame: &RgbImage,
    field: &FieldLocalization,
    config: &LocalizerConfig,
    sink: &dyn DebugSink,
) -> Result<BallsLocalization> {
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return Err(LocalizeError::EmptyFrame);
    }
    if field.mask.dimensions() != (width, height) {
        return Err(LocalizeError::DimensionMismatch {
            frame_width: width,
            frame_height: height,
            mask_width: field.mask.width(),
            mask_height: field.mask.height(),
        });
    }

    let blurred = preprocessing::apply_blur(frame, config.preprocess.blur_sigma);
    let masked = preprocessing::apply_mask(&blurred, &field.mask);
    sink.frame("masked_frame", &masked);
    let hsv = color::to_hsv(&masked);

    let candidates = candidates::build_candidate_masks(&hsv, &field.mask, &config.candidates);
    sink.mask("felt", &candidates.felt);
    sink.mask("shadows", &candidates.shadows);
    sink.mask("rail_colors", &candidates.colors);
    sink.mask("candidates", &candidates.combined);

    let mut surface = candidates.combined;
    let seeds = region_growing::seed_points(&surface);
    region_growing::grow_regions(&hsv, &mut surface, &seeds, &config.region_growing);
    sink.mask("region_growing", &surface);

    let mut surface = preprocessing::close_gaps(&surface, config.region_growing.closing_radius);
    holes::repair(&mut surface, &config.holes);
    sink.mask("surface", &surface);
    log::debug!(
        "surface claims {} of {} pixels",
        preprocessing::count_foreground(&surface),
        width as usize * height as usize
    );

    let detected = hough::detect_circles(&surface, &config.hough);
    let circles = circles::filter_candidates(detected, &surface, field, &config.filters);

    classify::classify_balls(&masked, &hsv, &surface, &circles, &config.classifier)
}
