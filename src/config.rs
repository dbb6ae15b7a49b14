use log::warn;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::ops::Range;
use std::path::Path;

use crate::engine::EngineParameters;
use crate::error::{ConfigError, ParameterError};
use crate::note::NoteConfig;
use crate::pedal::DEFAULT_SOFTEN_FACTOR;

/// Upper bound on the physical strip length.
pub const MAX_LEDS: usize = 1 << 16;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StripConfig {
    pub pin: i32,
    pub dma: i32,
    pub brightness: u8,
    /// Physical LED count; derived from the note layout when absent.
    pub led_count: Option<usize>,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            pin: 18,
            dma: 10,
            brightness: 255,
            led_count: None,
        }
    }
}

/// Startup configuration of the daemon, read from a JSON file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Substring of the MIDI input port name to connect to.
    pub midi_port: String,
    pub udp_bind: Option<String>,
    pub note_min: u8,
    pub note_max: u8,
    pub tick_interval_ms: u64,
    pub leds_per_note: usize,
    /// Explicit LED ranges per note; overrides `leds_per_note`.
    pub notes: Vec<NoteConfig>,
    pub strip: StripConfig,
    pub engine: EngineParameters,
    pub soften_factor: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            midi_port: "Digital Piano".to_string(),
            udp_bind: Some("0.0.0.0:10000".to_string()),
            note_min: 21,
            note_max: 108,
            tick_interval_ms: 20,
            leds_per_note: 1,
            notes: Vec::new(),
            strip: StripConfig::default(),
            engine: EngineParameters::default(),
            soften_factor: DEFAULT_SOFTEN_FACTOR,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match Self::load(path) {
            Err(ConfigError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                warn!("{} not found, using default configuration", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.note_min > self.note_max || self.note_max > 0x7F {
            return Err(ConfigError::NoteRange {
                min: self.note_min,
                max: self.note_max,
            });
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::TickInterval);
        }
        if !(self.soften_factor > 0.0 && self.soften_factor <= 1.0) {
            return Err(ParameterError::SoftenFactor(self.soften_factor).into());
        }
        self.engine.validate()?;

        let notes = (self.note_max - self.note_min) as usize + 1;
        if self.notes.is_empty()
            && !matches!(self.leds_per_note.checked_mul(notes), Some(n) if n <= MAX_LEDS)
        {
            return Err(ConfigError::LedsPerNote {
                leds_per_note: self.leds_per_note,
                notes,
                max: MAX_LEDS,
            });
        }

        let count = self.strip.led_count.unwrap_or(MAX_LEDS).min(MAX_LEDS);
        for note in &self.notes {
            let leds = note.leds();
            if leds.start > leds.end || leds.end > count {
                return Err(ConfigError::LedRange {
                    midi: note.midi,
                    start: leds.start,
                    end: leds.end,
                    count,
                });
            }
        }
        Ok(())
    }

    /// Physical LEDs for every engine slot, in note order.
    ///
    /// Notes missing from an explicit layout get an empty range.
    pub fn led_layout(&self) -> Vec<Range<usize>> {
        (self.note_min..=self.note_max)
            .enumerate()
            .map(|(slot, midi)| {
                if self.notes.is_empty() {
                    let per = self.leds_per_note;
                    slot.saturating_mul(per)..(slot + 1).saturating_mul(per)
                } else {
                    self.notes
                        .iter()
                        .find(|n| n.midi == midi)
                        .map(NoteConfig::leds)
                        .unwrap_or(0..0)
                }
            })
            .collect()
    }

    pub fn led_count(&self) -> usize {
        self.strip.led_count.unwrap_or_else(|| {
            self.led_layout()
                .iter()
                .map(|range| range.end)
                .max()
                .unwrap_or(0)
        })
    }
}
