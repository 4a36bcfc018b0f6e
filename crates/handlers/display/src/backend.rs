use crate::error::DisplayError;
use crate::mode::Resolution;
use std::fmt::Debug;

/// Zoom percentages offered by common desktop environments, smallest first.
pub const ZOOM_LEVELS: [u32; 9] = [100, 125, 150, 175, 200, 225, 250, 300, 350];

/// Access to the primary display.
pub trait DisplayBackend: Debug + Send + Sync {
    /// Current zoom as a percentage.
    ///
    /// # Errors
    /// Returns [`DisplayError::NotAttached`] if there is no display.
    fn zoom(&self) -> Result<u32, DisplayError>;

    /// Supported zoom percentages, smallest first.
    ///
    /// # Errors
    /// Returns [`DisplayError::NotAttached`] if there is no display.
    fn zoom_levels(&self) -> Result<Vec<u32>, DisplayError>;

    /// # Errors
    /// Returns [`DisplayError::UnsupportedZoom`] if `percent` is not a supported level.
    fn set_zoom(&self, percent: u32) -> Result<(), DisplayError>;

    /// # Errors
    /// Returns [`DisplayError::NotAttached`] if there is no display.
    fn resolution(&self) -> Result<Resolution, DisplayError>;

    /// Available resolutions, in the order the display reports them.
    ///
    /// # Errors
    /// Returns [`DisplayError::NotAttached`] if there is no display.
    fn resolutions(&self) -> Result<Vec<Resolution>, DisplayError>;

    /// # Errors
    /// Returns [`DisplayError::UnsupportedMode`] if the display does not offer `resolution`.
    fn set_resolution(&self, resolution: Resolution) -> Result<(), DisplayError>;
}
