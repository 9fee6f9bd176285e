pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod render;

pub use config::LocalizerConfig;
pub use error::LocalizeError;
pub use models::{
    BallLocalization, BallsLocalization, BoundingBox, Circle, FieldLocalization, FrameLocalization,
    Label, Line, Point,
};
pub use pipeline::{DebugDir, DebugSink, Localizer, NoDebug};
