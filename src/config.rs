use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

pub const BIAS_MIN: u8 = 1;
pub const BIAS_MAX: u8 = 10;
pub const UNBIASED: u8 = 5;

pub const SPEED_MIN: u8 = 1;
pub const SPEED_MAX: u8 = 10;

/// Keeps the `pins * pins` grid small enough to allocate and every column in `i32`.
pub const MAX_PINS: usize = 1023;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// half-width and row count; the lattice is square
    pub pins: usize,
    pub pin_radius: f32,
    pub margin_space: f32,
    /// sub-frames per pin-to-pin move
    pub key_frame_steps: u32,
    pub bar_graph_height: f32,
    pub funnel_exit_y: f32,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            pins: 5,
            pin_radius: 10.0,
            margin_space: 70.0,
            key_frame_steps: 5,
            bar_graph_height: 140.0,
            funnel_exit_y: 30.0,
        }
    }
}

impl MachineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.pins == 0 {
            return Err(ConfigError::NoPins(self.pins));
        }
        if self.pins > MAX_PINS {
            return Err(ConfigError::TooManyPins {
                pins: self.pins,
                max: MAX_PINS,
            });
        }
        if self.pins % 2 == 0 {
            return Err(ConfigError::EvenPins(self.pins));
        }
        if self.key_frame_steps == 0 {
            return Err(ConfigError::NoKeyFrames);
        }
        for (name, value) in [
            ("pin_radius", self.pin_radius),
            ("margin_space", self.margin_space),
            ("bar_graph_height", self.bar_graph_height),
        ] {
            // also rejects NaN
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub is_running: bool,
    pub speed: u8,
    /// Draws at or below this value send the bean left (1..=10, 5 is fair).
    pub bias: u8,
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            is_running: true,
            speed: 5,
            bias: UNBIASED,
            seed: 0xB3A_4D1E,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if !(BIAS_MIN..=BIAS_MAX).contains(&self.bias) {
            return Err(ConfigError::BiasOutOfRange(self.bias));
        }
        if !(SPEED_MIN..=SPEED_MAX).contains(&self.speed) {
            return Err(ConfigError::SpeedOutOfRange(self.speed));
        }
        Ok(())
    }

    /// Period between animation ticks: `1000 / (speed * 10)` milliseconds.
    pub fn frame_delay(&self) -> Duration {
        let speed = self.speed.clamp(SPEED_MIN, SPEED_MAX) as u32;
        Duration::from_secs(1) / (speed * 10)
    }

    pub fn is_unbiased(&self) -> bool {
        self.bias == UNBIASED
    }

    pub fn set_speed(&mut self, speed: i32) {
        self.speed = speed.clamp(SPEED_MIN as i32, SPEED_MAX as i32) as u8;
    }

    pub fn set_bias(&mut self, bias: i32) {
        self.bias = bias.clamp(BIAS_MIN as i32, BIAS_MAX as i32) as u8;
    }

    pub fn toggle_running(&mut self) {
        self.is_running = !self.is_running;
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub machine: MachineConfig,
    pub settings: Settings,
}

pub fn load_config(path: &Path) -> Result<ConfigFile> {
    let s = fs::read_to_string(path)?;
    let cfg: ConfigFile = serde_json::from_str(&s)?;
    cfg.machine.validate()?;
    cfg.settings.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        MachineConfig::default().validate().unwrap();
        Settings::default().validate().unwrap();
    }

    #[test]
    fn frame_delay_follows_speed() {
        let mut s = Settings::default();
        assert_eq!(s.frame_delay(), Duration::from_millis(20));
        s.set_speed(10);
        assert_eq!(s.frame_delay(), Duration::from_millis(10));
        s.set_speed(1);
        assert_eq!(s.frame_delay(), Duration::from_millis(100));
    }

    #[test]
    fn setters_clamp_into_range() {
        let mut s = Settings::default();
        s.set_bias(42);
        assert_eq!(s.bias, BIAS_MAX);
        s.set_bias(-3);
        assert_eq!(s.bias, BIAS_MIN);
        s.set_speed(0);
        assert_eq!(s.speed, SPEED_MIN);
    }

    #[test]
    fn rejects_bad_machines() {
        let even = MachineConfig {
            pins: 4,
            ..Default::default()
        };
        assert!(matches!(even.validate(), Err(ConfigError::EvenPins(4))));

        let empty = MachineConfig {
            pins: 0,
            ..Default::default()
        };
        assert!(matches!(empty.validate(), Err(ConfigError::NoPins(0))));

        let still = MachineConfig {
            key_frame_steps: 0,
            ..Default::default()
        };
        assert!(matches!(still.validate(), Err(ConfigError::NoKeyFrames)));

        let flat = MachineConfig {
            margin_space: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            flat.validate(),
            Err(ConfigError::NonPositive {
                name: "margin_space",
                ..
            })
        ));
    }

    #[test]
    fn rejects_bias_outside_scale() {
        let s = Settings {
            bias: 0,
            ..Default::default()
        };
        assert!(matches!(s.validate(), Err(ConfigError::BiasOutOfRange(0))));
    }

    #[test]
    fn rejects_speed_outside_scale() {
        for speed in [0, 11] {
            let s = Settings {
                speed,
                ..Default::default()
            };
            assert!(matches!(s.validate(), Err(ConfigError::SpeedOutOfRange(v)) if v == speed));
        }
    }

    #[test]
    fn rejects_oversized_lattice() {
        let huge = MachineConfig {
            pins: 4_294_967_297,
            ..Default::default()
        };
        assert!(matches!(
            huge.validate(),
            Err(ConfigError::TooManyPins { max: MAX_PINS, .. })
        ));

        let widest = MachineConfig {
            pins: MAX_PINS,
            ..Default::default()
        };
        widest.validate().unwrap();
    }

    fn write_config(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("galton.json");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn load_config_reads_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, r#"{ "machine": { "pins": 9 }, "settings": { "speed": 8 } }"#);
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.machine.pins, 9);
        assert_eq!(cfg.settings.speed, 8);
        assert_eq!(cfg.settings.bias, UNBIASED);
    }

    #[test]
    fn load_config_validates_what_it_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, r#"{ "machine": { "pins": 4 } }"#);
        assert!(matches!(load_config(&path), Err(ConfigError::EvenPins(4))));

        let path = write_config(&dir, r#"{ "settings": { "bias": 11 } }"#);
        assert!(matches!(load_config(&path), Err(ConfigError::BiasOutOfRange(11))));
    }

    #[test]
    fn load_config_surfaces_io_and_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert!(matches!(load_config(&missing), Err(ConfigError::Io(_))));

        let path = write_config(&dir, "{ \"machine\": ");
        assert!(matches!(load_config(&path), Err(ConfigError::Json(_))));
    }

    #[test]
    fn partial_config_file_uses_defaults() {
        let cfg: ConfigFile =
            serde_json::from_str(r#"{ "machine": { "pins": 7 }, "settings": { "bias": 3 } }"#)
                .unwrap();
        assert_eq!(cfg.machine.pins, 7);
        assert_eq!(cfg.machine.key_frame_steps, 5);
        assert_eq!(cfg.settings.bias, 3);
        assert!(cfg.settings.is_running);
    }
}
