use crate::backend::{DisplayBackend, ZOOM_LEVELS};
use crate::error::DisplayError;
use crate::mode::Resolution;
use parking_lot::RwLock;
use tracing::debug;

#[derive(Debug)]
struct State {
    attached: bool,
    zoom: u32,
    zoom_levels: Vec<u32>,
    resolution: Resolution,
    resolutions: Vec<Resolution>,
}

/// In-memory [`DisplayBackend`].
///
/// Starts attached at 100% zoom on the first offered resolution. Detaching it makes
/// every call fail as if the display had been unplugged.
#[derive(Debug)]
pub struct VirtualDisplay {
    state: RwLock<State>,
}

impl Default for VirtualDisplay {
    fn default() -> Self {
        Self::new([
            Resolution::new(1920, 1080),
            Resolution::new(1600, 900),
            Resolution::new(1366, 768),
            Resolution::new(1280, 720),
            Resolution::new(1024, 768),
        ])
    }
}

impl VirtualDisplay {
    /// A display offering `resolutions`, currently set to the first of them.
    ///
    /// Repeated modes keep their first position. An empty list falls back to a single
    /// 1024x768 mode.
    #[must_use]
    pub fn new(resolutions: impl IntoIterator<Item = Resolution>) -> Self {
        let mut modes: Vec<Resolution> = Vec::new();
        for resolution in resolutions {
            if !modes.contains(&resolution) {
                modes.push(resolution);
            }
        }
        if modes.is_empty() {
            modes.push(Resolution::new(1024, 768));
        }
        let state = State {
            attached: true,
            zoom: ZOOM_LEVELS[0],
            zoom_levels: ZOOM_LEVELS.to_vec(),
            resolution: modes[0],
            resolutions: modes,
        };
        Self { state: RwLock::new(state) }
    }

    pub fn attach(&self) {
        self.state.write().attached = true;
    }

    pub fn detach(&self) {
        self.state.write().attached = false;
    }

    fn read<T>(&self, f: impl FnOnce(&State) -> T) -> Result<T, DisplayError> {
        let state = self.state.read();
        if !state.attached {
            return Err(not_attached());
        }
        Ok(f(&state))
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut State) -> Result<T, DisplayError>,
    ) -> Result<T, DisplayError> {
        let mut state = self.state.write();
        if !state.attached {
            return Err(not_attached());
        }
        f(&mut state)
    }
}

fn not_attached() -> DisplayError {
    DisplayError::NotAttached { message: "virtual display".into(), context: None }
}

impl DisplayBackend for VirtualDisplay {
    fn zoom(&self) -> Result<u32, DisplayError> {
        self.read(|s| s.zoom)
    }

    fn zoom_levels(&self) -> Result<Vec<u32>, DisplayError> {
        self.read(|s| s.zoom_levels.clone())
    }

    fn set_zoom(&self, percent: u32) -> Result<(), DisplayError> {
        self.write(|s| {
            if !s.zoom_levels.contains(&percent) {
                return Err(DisplayError::UnsupportedZoom {
                    message: format!("{percent}%").into(),
                    context: None,
                });
            }
            debug!(from = s.zoom, to = percent, "Zoom changed");
            s.zoom = percent;
            Ok(())
        })
    }

    fn resolution(&self) -> Result<Resolution, DisplayError> {
        self.read(|s| s.resolution)
    }

    fn resolutions(&self) -> Result<Vec<Resolution>, DisplayError> {
        self.read(|s| s.resolutions.clone())
    }

    fn set_resolution(&self, resolution: Resolution) -> Result<(), DisplayError> {
        self.write(|s| {
            if !s.resolutions.contains(&resolution) {
                return Err(DisplayError::UnsupportedMode {
                    message: resolution.to_string().into(),
                    context: None,
                });
            }
            debug!(from = %s.resolution, to = %resolution, "Resolution changed");
            s.resolution = resolution;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_mode() {
        let display = VirtualDisplay::default();
        assert_eq!(display.resolution().unwrap(), Resolution::new(1920, 1080));
        assert_eq!(display.zoom().unwrap(), 100);
    }

    #[test]
    fn repeated_modes_keep_first_position() {
        let display = VirtualDisplay::new([
            Resolution::new(1280, 720),
            Resolution::new(800, 600),
            Resolution::new(1280, 720),
            Resolution::new(800, 600),
        ]);
        assert_eq!(
            display.resolutions().unwrap(),
            vec![Resolution::new(1280, 720), Resolution::new(800, 600)]
        );
        assert_eq!(display.resolution().unwrap(), Resolution::new(1280, 720));
    }

    #[test]
    fn rejects_unsupported_values() {
        let display = VirtualDisplay::new([Resolution::new(800, 600)]);
        assert!(matches!(display.set_zoom(110), Err(DisplayError::UnsupportedZoom { .. })));
        assert!(matches!(
            display.set_resolution(Resolution::new(640, 480)),
            Err(DisplayError::UnsupportedMode { .. })
        ));
        assert_eq!(display.resolution().unwrap(), Resolution::new(800, 600));
    }

    #[test]
    fn detached_display_fails_every_call() {
        let display = VirtualDisplay::default();
        display.detach();
        assert!(matches!(display.zoom(), Err(DisplayError::NotAttached { .. })));
        assert!(matches!(display.set_zoom(125), Err(DisplayError::NotAttached { .. })));
        display.attach();
        assert!(display.set_zoom(125).is_ok());
    }
}
