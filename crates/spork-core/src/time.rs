/// Nominal frame duration in milliseconds (60 Hz).
pub const FRAME_MS: f64 = 16.667;

/// Largest frame multiple a single tick may integrate.
pub const MAX_FRAME_MULTIPLE: f32 = 3.0;

/// Convert a wall-clock gap into a frame multiple, clamped to `[0, max_multiple]`.
///
/// Negative or non-finite gaps (clock going backwards, first frame after a
/// resume) collapse to zero so a bad timestamp never moves an entity.
pub fn frame_delta(elapsed_ms: f64, frame_ms: f64, max_multiple: f32) -> f32 {
    if !elapsed_ms.is_finite() || elapsed_ms <= 0.0 || frame_ms <= 0.0 {
        return 0.0;
    }
    ((elapsed_ms / frame_ms) as f32).min(max_multiple)
}
