// Each test binary compiles this module separately and uses a subset of it.
#![allow(dead_code, unused_imports)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from billiards_vision for tests
pub use billiards_vision::models::{HsvImage, Mask, BACKGROUND, FOREGROUND};
pub use billiards_vision::{Circle, FieldLocalization, LocalizeError, Localizer, LocalizerConfig, Point};
