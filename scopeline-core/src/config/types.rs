//! Configuration type definitions

pub use scopeline_hal::SerialConfig;

/// RGB565 green
pub const DEFAULT_FOREGROUND: u16 = 0x07E0;
/// RGB565 black
pub const DEFAULT_BACKGROUND: u16 = 0x0000;

/// What a single-shot acquisition does once its segment is consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OneShotPolicy {
    /// Stay stopped until explicitly restarted
    #[default]
    Halt,
    /// Re-arm and trigger another capture
    Restart,
}

/// How consecutive segments join on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TraceMode {
    /// Every segment starts with an isolated point
    #[default]
    Segmented,
    /// A segment's first point joins the previous segment's last point
    Continuous,
}

/// Acquisition behaviour
///
/// With a single-segment ring the acquisition is single-shot and
/// `one_shot` applies; otherwise it is continuous and `pause_on_wrap`
/// applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AcquisitionConfig {
    /// Horizontal slots across the screen
    pub segments_per_screen: u16,
    /// Restart from segment zero after each full sweep
    pub pause_on_wrap: bool,
    pub one_shot: OneShotPolicy,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            segments_per_screen: 16,
            pause_on_wrap: true,
            one_shot: OneShotPolicy::Halt,
        }
    }
}

/// Display geometry and colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// Panel width in pixels
    ///
    /// Must match the panel in one orientation (320x240 or 240x320 for the
    /// ILI9341); the pair selects that orientation. Any other size is drawn
    /// at the panel's real size with a warning at boot.
    pub width: u16,
    pub height: u16,
    /// Trace color (RGB565)
    pub foreground: u16,
    /// Background color (RGB565)
    pub background: u16,
    pub trace: TraceMode,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            foreground: DEFAULT_FOREGROUND,
            background: DEFAULT_BACKGROUND,
            trace: TraceMode::Segmented,
        }
    }
}

/// Converter reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdcConfig {
    /// Reference voltage in millivolts
    pub vref_mv: u16,
}

impl Default for AdcConfig {
    fn default() -> Self {
        Self { vref_mv: 3300 }
    }
}

/// Complete scope configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScopeConfig {
    pub acquisition: AcquisitionConfig,
    pub display: DisplayConfig,
    pub serial: SerialConfig,
    pub adc: AdcConfig,
}
