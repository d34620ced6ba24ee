use crate::config::SliderConfig;

/// Vertical zoom slider. Position 0 is the top of the track (most zoomed
/// in) and `track_length` the bottom (most zoomed out).
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomSlider {
    config: SliderConfig,

    /// Handle position along the track
    position: f64,

    /// Handle position when the current drag gesture started
    baseline: f64,

    grabbed: bool,
}

impl ZoomSlider {
    pub fn new(config: SliderConfig) -> Self {
        Self {
            config,
            position: config.track_length,
            baseline: config.track_length,
            grabbed: false,
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    /// Handle position as a fraction of the track
    pub fn normalized(&self) -> f64 {
        self.position / self.config.track_length
    }

    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    pub fn is_grabbed(&self) -> bool {
        self.grabbed
    }

    pub fn config(&self) -> &SliderConfig {
        &self.config
    }

    /// Zoom percentage before easing: `1 - position / track`, never zero
    pub fn percent(&self) -> f64 {
        let percent = 1.0 - self.position / self.config.track_length;
        if percent == 0.0 {
            self.config.min_percent
        } else {
            percent
        }
    }

    /// Move the handle, clamped to `[1, track_length]`; returns the new percent
    pub fn set_position(&mut self, position: f64) -> f64 {
        self.position = position.clamp(1.0, self.config.track_length);
        self.percent()
    }

    /// Move the handle one click step; negative directions zoom in
    pub fn step(&mut self, direction: f64) -> f64 {
        self.set_position(self.position + self.config.click_step * direction)
    }

    /// Start a drag gesture at the current handle position
    pub fn grab(&mut self) {
        self.grabbed = true;
        self.baseline = self.position;
    }

    /// Place the handle `delta` away from where the gesture started
    pub fn drag_by(&mut self, delta: f64) -> f64 {
        self.set_position(self.baseline + delta)
    }

    /// End the gesture and keep the handle position as the next baseline
    pub fn release(&mut self) {
        self.grabbed = false;
        self.baseline = self.position;
    }

    /// Place the handle for an externally changed zoom.
    ///
    /// `zoom_percent` is the un-eased `0..=1` position of the scale; the
    /// square root undoes the slider's squared easing.
    pub fn sync_to_zoom(&mut self, zoom_percent: f64) {
        let track = self.config.track_length;
        self.position = track - track * zoom_percent.clamp(0.0, 1.0).sqrt();
    }
}

impl Default for ZoomSlider {
    fn default() -> Self {
        Self::new(SliderConfig::default())
    }
}
