//! Build estimator: LED count and power draw from physical fan parameters

/// Current draw of a single LED at full white, in ampere.
const AMPERE_PER_LED: f64 = 0.06;
/// LED strip supply voltage.
const LED_VOLTAGE: f64 = 5.0;
/// Rotation sensor clock, in Hz.
const CLOCK_HZ: f64 = 2000.0;

/// Physical parameters of a fan build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FanBuild {
    /// Number of blades carrying LED strips.
    pub blades: u32,
    /// LED strip density, LEDs per meter.
    pub leds_per_m: u32,
    /// Rotation speed.
    pub rpm: f64,
    /// Blade radius in cm.
    pub radius_cm: u32,
    /// Whether blades mirror each other, doubling pixel passes per ring.
    pub mirror: bool,
}

/// Electrical and geometric figures derived from a [`FanBuild`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildEstimate {
    /// Total LED count across all blades.
    pub total_leds: u32,
    /// Supply current at full white, in ampere.
    pub total_ampere: f64,
    /// Supply power at full white, in watt.
    pub total_watts: f64,
    /// Passes per rotation over any given ring.
    pub pixel_density: u32,
    /// Number of displayable rings.
    pub rings: f64,
    /// Radial distance between rings, in cm.
    pub ring_distance_cm: f64,
    /// Passes of one fixed pixel position per second.
    pub pixel_passes_per_s: f64,
    /// Passes of any blade over a fixed position per second.
    pub any_pixel_passes_per_s: f64,
    /// Tangential speed at the blade tip, m/s.
    pub outside_speed_m_s: f64,
    /// Blade tip travel per sensor clock tick, in cm.
    pub outside_motion_cm_per_tick: f64,
    /// Lightness density at the outermost ring, passes per meter.
    pub outside_pixel_lightness: f64,
}

impl FanBuild {
    /// Derive the build figures. Pure arithmetic, no I/O.
    pub fn estimate(&self) -> BuildEstimate {
        let total_leds = self.blades * self.radius_cm * self.leds_per_m / 100;
        let total_ampere = AMPERE_PER_LED * total_leds as f64;
        let pixel_density: u32 = if self.mirror { 2 } else { 1 };

        let rings = total_leds as f64 * if self.mirror { 0.5 } else { 1.0 };
        let circumference_cm = 2.0 * std::f64::consts::PI * self.radius_cm as f64;
        let outside_speed_m_s = circumference_cm / 100.0 * (self.rpm / 60.0);

        BuildEstimate {
            total_leds,
            total_ampere,
            total_watts: total_ampere * LED_VOLTAGE,
            pixel_density,
            rings,
            ring_distance_cm: self.radius_cm as f64 / rings,
            pixel_passes_per_s: self.rpm / 60.0 * pixel_density as f64,
            any_pixel_passes_per_s: self.rpm / 60.0 * self.blades as f64,
            outside_speed_m_s,
            outside_motion_cm_per_tick: outside_speed_m_s / CLOCK_HZ * 100.0,
            outside_pixel_lightness: pixel_density as f64 / (circumference_cm / 100.0),
        }
    }
}
