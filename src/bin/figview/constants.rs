/// Minimum figure scale (always a positive lower bound).
pub const SCALE_MIN: f32 = 0.2;

/// Maximum figure scale.
pub const SCALE_MAX: f32 = 10.0;

/// Default zoom speed multiplier per scroll/keyboard step.
pub const DEFAULT_ZOOM_SPEED: f32 = 1.2;

/// Default pan speed multiplier applied to drag deltas.
pub const DEFAULT_PAN_SPEED: f32 = 1.0;

/// Default figure viewport height in logical pixels.
pub const DEFAULT_FIGURE_HEIGHT: f32 = 320.0;

/// Minimum and maximum figure viewport heights a document may request.
pub const FIGURE_HEIGHT_MIN: f32 = 120.0;
pub const FIGURE_HEIGHT_MAX: f32 = 720.0;

/// Horizontal padding around the document column.
pub const DOCUMENT_MARGIN: f32 = 24.0;

/// Maximum width of the document column.
pub const DOCUMENT_MAX_WIDTH: f32 = 860.0;

/// Relative viewBox drift that triggers a vector re-raster.
pub const VECTOR_RERASTER_EPSILON: f32 = 1e-3;
