use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::detection::color::HsvRange;
use crate::detection::region_growing::Neighborhood;

/// Every tunable of the field and ball localizers.
///
/// Missing sections or fields in a JSON document fall back to the defaults
/// below, so a config file only needs to list what it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizerConfig {
    pub field: FieldConfig,
    pub preprocess: PreprocessConfig,
    pub candidates: CandidateConfig,
    pub region_growing: RegionGrowingConfig,
    pub holes: HoleRepairConfig,
    pub hough: HoughConfig,
    pub filters: CircleFilterConfig,
    pub classifier: ClassifierConfig,
}

impl LocalizerConfig {
    /// Load a JSON config file.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_json_str(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Table-surface extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Gaussian sigma applied before clustering. Zero disables blurring.
    pub blur_sigma: f32,
    /// Number of k-means color clusters.
    pub clusters: usize,
    /// Lloyd iterations per attempt.
    pub max_iterations: usize,
    /// Independent k-means++ restarts; the most compact result wins.
    pub attempts: usize,
    /// Stop iterating once no center moves more than this (HSV units).
    pub epsilon: f32,
    /// Fit clusters on every n-th pixel in both directions.
    pub sample_stride: u32,
    /// Seed of the k-means++ initialization.
    pub seed: u64,
    /// L1 radius of the speckle-removing opening.
    pub open_radius: u8,
    /// L-infinity radius of the gap-filling closing.
    pub close_radius: u8,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Minimum Hough votes for a rail line.
    pub line_votes: u32,
    /// Non-maximum suppression radius in Hough space.
    pub line_suppression: u32,
    /// Lines closer than this in rho (pixels) are merged...
    pub merge_rho: f32,
    /// ...when also closer than this in theta (radians).
    pub merge_theta: f32,
    /// Report the two side pockets in addition to the four corners.
    pub side_pockets: bool,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.0,
            clusters: 4,
            max_iterations: 10,
            attempts: 3,
            epsilon: 1.0,
            sample_stride: 2,
            seed: 0x00b1_11a2,
            open_radius: 2,
            close_radius: 10,
            canny_low: 50.0,
            canny_high: 150.0,
            line_votes: 120,
            line_suppression: 8,
            merge_rho: 25.0,
            merge_theta: 0.2,
            side_pockets: true,
        }
    }
}

/// Smoothing applied to the frame before ball masking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Gaussian sigma. Zero disables blurring.
    pub blur_sigma: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self { blur_sigma: 1.0 }
    }
}

/// Offsets of an asymmetric HSV range around a reference color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvBand {
    pub below: [u8; 3],
    pub above: [u8; 3],
}

impl HsvBand {
    pub const fn new(below: [u8; 3], above: [u8; 3]) -> Self {
        Self { below, above }
    }
}

/// Felt, shadow and rail-color thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateConfig {
    /// Radius of the disk at the frame center sampled for the felt color.
    pub felt_sample_radius: u32,
    /// Value drop from felt to shadow color.
    pub shadow_value_offset: u8,
    /// Range around the felt color.
    pub felt_band: HsvBand,
    /// Range around the shadow color.
    pub shadow_band: HsvBand,
    /// Lower bound relative to the felt color, upper bound relative to the shadow color.
    pub color_band: HsvBand,
    /// Structuring-element size limiting the shadow mask to the rails.
    pub shadow_depth: u32,
    /// Structuring-element size limiting the color mask to the rails.
    pub color_depth: u32,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            felt_sample_radius: 100,
            shadow_value_offset: 90,
            felt_band: HsvBand::new([5, 80, 50], [5, 60, 15]),
            shadow_band: HsvBand::new([3, 30, 80], [3, 100, 40]),
            color_band: HsvBand::new([10, 255, 150], [10, 255, 255]),
            shadow_depth: 50,
            color_depth: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionGrowingConfig {
    /// Per-channel (H, S, V) tolerance to the region's seed color.
    pub tolerance: [u8; 3],
    /// Maximum distance in steps from the seed. `None` grows until the
    /// tolerance alone stops the region.
    pub max_depth: Option<u32>,
    pub connectivity: Neighborhood,
    /// L-infinity radius of the closing applied after growing. Zero skips it.
    pub closing_radius: u8,
}

impl Default for RegionGrowingConfig {
    fn default() -> Self {
        Self {
            tolerance: [3, 6, 4],
            max_depth: None,
            connectivity: Neighborhood::Four,
            closing_radius: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoleRepairConfig {
    /// Enclosed background regions smaller than this many pixels are filled.
    pub small_hole_area: u32,
    /// A pixel known to lie outside the table.
    pub exterior_seed: (u32, u32),
}

impl Default for HoleRepairConfig {
    fn default() -> Self {
        Self {
            small_hole_area: 90,
            exterior_seed: (0, 0),
        }
    }
}

/// Hough-gradient circle detection restricted to ball-sized radii.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughConfig {
    pub min_radius: u32,
    pub max_radius: u32,
    pub min_center_distance: f32,
    /// Minimum 3x3-summed accumulator votes for a center.
    pub min_votes: u32,
    /// Fraction of the circumference that must be backed by edge pixels.
    pub min_edge_coverage: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Sigma of the blur applied to the mask before taking gradients.
    pub gradient_sigma: f32,
}

impl Default for HoughConfig {
    fn default() -> Self {
        Self {
            min_radius: 8,
            max_radius: 16,
            min_center_distance: 15.0,
            min_votes: 25,
            min_edge_coverage: 0.3,
            canny_low: 50.0,
            canny_high: 100.0,
            gradient_sigma: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleFilterConfig {
    /// Minimum share of the disk that must be unclaimed (ball) pixels.
    pub min_ball_coverage: f32,
    /// Structuring-element size of the field erosion used for the bound check.
    pub field_margin: u32,
    /// Minimum distance between a ball center and any pocket.
    pub hole_distance: f32,
    /// Dedup: maximum (x, y, r) distance for two circles to be compared.
    pub neighborhood: f32,
    /// Dedup: maximum vertical gap.
    pub vertical_distance: f32,
    /// Dedup: minimum radius difference.
    pub radius_gap: f32,
}

impl Default for CircleFilterConfig {
    fn default() -> Self {
        Self {
            min_ball_coverage: 0.60,
            field_margin: 20,
            hole_distance: 27.0,
            neighborhood: 25.0,
            vertical_distance: 25.0,
            radius_gap: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub cue_white: HsvRange,
    /// Ratio lead above which the whitest circle is taken without a tie-break.
    pub cue_margin: f32,
    pub black: HsvRange,
    pub black_min_ratio: f32,
    pub stripe_white: HsvRange,
    /// White blobs narrower than this are treated as glints.
    pub min_glint_diameter: f32,
    pub stripe_min_ratio: f32,
    pub stripe_max_ratio: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            cue_white: HsvRange::new([20, 0, 180], [110, 100, 255]),
            cue_margin: 0.1,
            black: HsvRange::new([35, 1, 0], [140, 255, 90]),
            black_min_ratio: 0.5,
            stripe_white: HsvRange::new([0, 0, 95], [120, 100, 255]),
            min_glint_diameter: 8.0,
            stripe_min_ratio: 0.17,
            stripe_max_ratio: 0.81,
        }
    }
}
