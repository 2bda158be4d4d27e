use crate::gesture::correlation::DEFAULT_MATCH_THRESHOLD;

#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SentryConfig {
    pub capture_duration_ms: f64,
    /// Seconds of "RECORDING IN n" before each capture.
    pub countdown_secs: u8,
    pub match_threshold: f32,
    /// How long the result message stays up before the idle screen returns.
    pub result_display_ms: u32,
    /// Zero the moving average before every capture instead of letting the
    /// previous window's history carry over.
    pub reset_filter_per_capture: bool,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            capture_duration_ms: 5000.0,
            countdown_secs: 3,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            result_display_ms: 1500,
            reset_filter_per_capture: false,
        }
    }
}
