//! Per-note light voices driven by note events and a render tick.

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::color::Hsv;
use crate::envelope::AdsrEnvelope;
use crate::error::ParameterError;
use crate::mapper::{ColorMapper, Mapper, CHANNELS};
use crate::note_colors::NoteColorMap;
use crate::pedal::NoteSink;

/// Channel used by the single-voice operations.
pub const DEFAULT_CHANNEL: u8 = 0;

/// Live-tunable parameters. Changes apply to notes triggered afterwards.
///
/// Times are in the same unit as the timestamps passed to
/// [`LightEngine::tick`] (milliseconds in the daemon).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParameters {
    pub attack_time: u64,
    pub decay_time: u64,
    pub sustain_level: f32,
    pub release_time: u64,
    pub color_mapper: Mapper,
    pub note_color_map: NoteColorMap,
    pub fixed_hue: u8,
    pub ignore_velocity: bool,
    pub base_brightness: u8,
}

impl Default for EngineParameters {
    fn default() -> Self {
        Self {
            attack_time: 80,
            decay_time: 3000,
            sustain_level: 0.0,
            release_time: 400,
            color_mapper: Mapper::Palette,
            note_color_map: NoteColorMap::Newton1704,
            fixed_hue: 0x00,
            ignore_velocity: true,
            base_brightness: 0x00,
        }
    }
}

impl EngineParameters {
    pub fn validate(&self) -> Result<(), ParameterError> {
        if !(0.0..=1.0).contains(&self.sustain_level) {
            return Err(ParameterError::SustainLevel(self.sustain_level));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
struct Voice {
    envelope: AdsrEnvelope,
    color: Hsv,
}

/// Turns note events into per-note colors for a contiguous note range.
///
/// LED slot `i` belongs to note `note_min + i`. Only [`tick`](Self::tick)
/// writes to the LED buffer, and it only touches slots whose envelope is
/// still sounding.
#[derive(Debug, Clone)]
pub struct LightEngine {
    note_min: u8,
    note_max: u8,
    voices: Vec<Voice>,
    mapper: ColorMapper,
    params: EngineParameters,
}

impl Default for LightEngine {
    fn default() -> Self {
        Self::new(0x00, 0x7F)
    }
}

impl LightEngine {
    pub fn new(note_min: u8, note_max: u8) -> Self {
        let mut engine = Self {
            note_min: 0,
            note_max: 0,
            voices: Vec::new(),
            mapper: ColorMapper::new(),
            params: EngineParameters::default(),
        };
        engine.configure(note_min, note_max);
        engine
    }

    /// Reallocate one voice per note in `note_min..=note_max` and reset
    /// every parameter to its default.
    ///
    /// Notes are masked to 0-127; a reversed range is swapped.
    pub fn configure(&mut self, note_min: u8, note_max: u8) {
        let (mut min, mut max) = (note_min & 0x7F, note_max & 0x7F);
        if min > max {
            warn!("note range {min}..={max} is reversed, swapping");
            std::mem::swap(&mut min, &mut max);
        }
        self.note_min = min;
        self.note_max = max;
        self.voices = vec![Voice::default(); (max - min) as usize + 1];
        self.reset_all_controllers();
        debug!("light engine configured for notes {min}..={max}");
    }

    pub fn note_min(&self) -> u8 {
        self.note_min
    }

    pub fn note_max(&self) -> u8 {
        self.note_max
    }

    /// Number of LED slots [`tick`](Self::tick) writes to.
    pub fn led_count(&self) -> usize {
        self.voices.len()
    }

    fn slot(&self, note: u8) -> Option<usize> {
        (self.note_min..=self.note_max)
            .contains(&note)
            .then(|| (note - self.note_min) as usize)
    }

    pub fn note_on(&mut self, note: u8, velocity: u8) {
        self.channel_note_on(DEFAULT_CHANNEL, note, velocity);
    }

    pub fn note_off(&mut self, note: u8) {
        self.channel_note_off(DEFAULT_CHANNEL, note);
    }

    /// Color the note with `channel`'s mapping and restart its envelope.
    /// Notes outside the configured range are ignored.
    pub fn channel_note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        let Some(slot) = self.slot(note) else {
            trace!(
                "ignoring note on {note}, outside {}..={}",
                self.note_min,
                self.note_max
            );
            return;
        };
        // Ignore-velocity is applied per channel by the mapper.
        let p = self.params;
        let voice = &mut self.voices[slot];
        voice.color = self.mapper.map(channel, note, velocity);
        voice
            .envelope
            .note_on(p.attack_time, p.decay_time, p.sustain_level, p.release_time);
    }

    pub fn channel_note_off(&mut self, _channel: u8, note: u8) {
        if let Some(slot) = self.slot(note) {
            self.voices[slot].envelope.note_off();
        }
    }

    /// Release every voice and blank its color.
    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            voice.envelope.note_off();
            voice.color = Hsv::BLACK;
        }
    }

    /// Restore every tunable parameter to its default. Sounding notes keep
    /// their envelopes and colors.
    pub fn reset_all_controllers(&mut self) {
        self.params = EngineParameters::default();
        self.mapper.reset_all();
        for channel in 0..CHANNELS as u8 {
            self.mapper.set_note_range(channel, self.note_min, self.note_max);
        }
        self.sync_mapper();
    }

    /// Replace every parameter at once.
    pub fn set_parameters(&mut self, params: EngineParameters) -> Result<(), ParameterError> {
        params.validate()?;
        self.params = params;
        self.sync_mapper();
        Ok(())
    }

    pub fn parameters(&self) -> &EngineParameters {
        &self.params
    }

    /// Engine-wide color settings apply to every channel.
    fn sync_mapper(&mut self) {
        let p = self.params;
        for channel in 0..CHANNELS as u8 {
            self.mapper.set_mapper(channel, p.color_mapper);
            self.mapper.set_note_color_map(channel, p.note_color_map);
            self.mapper.set_fixed_hue(channel, p.fixed_hue);
            self.mapper.set_ignore_velocity(channel, p.ignore_velocity);
        }
    }

    /// Per-channel overrides of the color settings.
    pub fn mapper_mut(&mut self) -> &mut ColorMapper {
        &mut self.mapper
    }

    pub fn mapper(&self) -> &ColorMapper {
        &self.mapper
    }

    pub fn attack_time(&self) -> u64 {
        self.params.attack_time
    }

    pub fn set_attack_time(&mut self, attack_time: u64) {
        self.params.attack_time = attack_time;
    }

    pub fn decay_time(&self) -> u64 {
        self.params.decay_time
    }

    pub fn set_decay_time(&mut self, decay_time: u64) {
        self.params.decay_time = decay_time;
    }

    pub fn sustain_level(&self) -> f32 {
        self.params.sustain_level
    }

    pub fn set_sustain_level(&mut self, sustain_level: f32) -> Result<(), ParameterError> {
        if !(0.0..=1.0).contains(&sustain_level) {
            return Err(ParameterError::SustainLevel(sustain_level));
        }
        self.params.sustain_level = sustain_level;
        Ok(())
    }

    pub fn release_time(&self) -> u64 {
        self.params.release_time
    }

    pub fn set_release_time(&mut self, release_time: u64) {
        self.params.release_time = release_time;
    }

    pub fn color_mapper(&self) -> Mapper {
        self.params.color_mapper
    }

    pub fn set_color_mapper(&mut self, mapper: Mapper) {
        self.params.color_mapper = mapper;
        self.sync_mapper();
    }

    pub fn note_color_map(&self) -> NoteColorMap {
        self.params.note_color_map
    }

    pub fn set_note_color_map(&mut self, map: NoteColorMap) {
        self.params.note_color_map = map;
        self.sync_mapper();
    }

    pub fn fixed_hue(&self) -> u8 {
        self.params.fixed_hue
    }

    pub fn set_fixed_hue(&mut self, hue: u8) {
        self.params.fixed_hue = hue;
        self.sync_mapper();
    }

    pub fn ignore_velocity(&self) -> bool {
        self.params.ignore_velocity
    }

    pub fn set_ignore_velocity(&mut self, state: bool) {
        self.params.ignore_velocity = state;
        self.sync_mapper();
    }

    pub fn base_brightness(&self) -> u8 {
        self.params.base_brightness
    }

    pub fn set_base_brightness(&mut self, value: u8) {
        self.params.base_brightness = value;
    }

    /// Envelope output of `note`, or `None` outside the range.
    pub fn intensity(&self, note: u8) -> Option<f32> {
        self.slot(note).map(|slot| self.voices[slot].envelope.output())
    }

    pub fn is_sounding(&self, note: u8) -> bool {
        self.slot(note)
            .is_some_and(|slot| !self.voices[slot].envelope.is_idle())
    }

    pub fn active_notes(&self) -> usize {
        self.voices.iter().filter(|v| !v.envelope.is_idle()).count()
    }

    /// Advance every sounding voice to `time` and write its color to `leds`.
    ///
    /// Idle voices are skipped and their slots left untouched. The written
    /// value never drops below the base brightness.
    pub fn tick(&mut self, time: u64, leds: &mut [Hsv]) {
        let base = self.params.base_brightness;
        for (slot, voice) in self.voices.iter_mut().enumerate() {
            if voice.envelope.is_idle() {
                continue;
            }
            voice.envelope.tick(time);
            let brightness = (voice.envelope.output() * voice.color.v as f32)
                .round()
                .clamp(0.0, 255.0) as u8;
            if let Some(led) = leds.get_mut(slot) {
                *led = voice.color.with_value(brightness.max(base));
            }
        }
    }
}

impl NoteSink for LightEngine {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        self.channel_note_on(channel, note, velocity);
    }

    fn note_off(&mut self, channel: u8, note: u8) {
        self.channel_note_off(channel, note);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn engine(min: u8, max: u8) -> (LightEngine, Vec<Hsv>) {
        let engine = LightEngine::new(min, max);
        let leds = vec![Hsv::BLACK; engine.led_count()];
        (engine, leds)
    }

    #[test]
    fn configure_allocates_one_slot_per_note() {
        let (engine, leds) = engine(60, 72);
        assert_eq!(leds.len(), 13);
        assert_eq!(engine.mapper().note_min(5), 60);
        assert_eq!(engine.mapper().note_max(5), 72);

        let engine = LightEngine::new(72, 60);
        assert_eq!((engine.note_min(), engine.note_max()), (60, 72));
    }

    #[test]
    fn out_of_range_notes_are_ignored() {
        let (mut engine, mut leds) = engine(60, 72);
        engine.note_on(59, 100);
        engine.note_on(73, 100);
        engine.note_off(73);
        engine.tick(1, &mut leds);
        assert_eq!(engine.active_notes(), 0);
        assert!(leds.iter().all(|led| *led == Hsv::BLACK));
    }

    #[test]
    fn note_lights_its_slot() {
        let (mut engine, mut leds) = engine(60, 72);
        engine.set_attack_time(0);
        engine.note_on(62, 100);
        engine.tick(1, &mut leds);
        assert_eq!(leds[2], NoteColorMap::Newton1704.color(62));
        assert_eq!(leds[0], Hsv::BLACK);
    }

    #[test]
    fn velocity_scales_when_not_ignored() {
        let (mut engine, mut leds) = engine(60, 72);
        engine.set_attack_time(0);
        engine.set_ignore_velocity(false);
        engine.note_on(60, 64);
        engine.tick(1, &mut leds);
        assert_eq!(leds[0].v, 129);
    }

    #[test]
    fn per_channel_velocity_override() {
        let (mut engine, mut leds) = engine(60, 72);
        engine.set_attack_time(0);
        assert!(engine.ignore_velocity());
        engine.mapper_mut().set_ignore_velocity(0, false);
        engine.note_on(60, 64);
        engine.tick(1, &mut leds);
        assert_eq!(leds[0].v, 129);

        // other channels still follow the engine-wide setting
        NoteSink::note_on(&mut engine, 1, 61, 64);
        engine.tick(2, &mut leds);
        assert_eq!(leds[1].v, 255);
    }

    #[test]
    fn base_brightness_floor() {
        let (mut engine, mut leds) = engine(60, 72);
        engine.set_base_brightness(10);
        engine.note_on(60, 100);
        engine.tick(1, &mut leds);
        assert_eq!(leds[0].v, 10);
    }

    #[test]
    fn idle_slots_are_not_rewritten() {
        let (mut engine, mut leds) = engine(60, 72);
        leds[4] = Hsv::new(1, 2, 3);
        engine.note_on(60, 100);
        engine.tick(1, &mut leds);
        assert_eq!(leds[4], Hsv::new(1, 2, 3));
    }

    #[test]
    fn all_notes_off_silences_everything() {
        let (mut engine, mut leds) = engine(60, 72);
        engine.set_sustain_level(0.5).unwrap();
        for note in 60..=72 {
            engine.note_on(note, 100);
        }
        engine.tick(1, &mut leds);
        engine.tick(200, &mut leds);
        engine.all_notes_off();
        engine.tick(201, &mut leds);
        assert!(leds.iter().all(|led| led.v == 0));
        engine.tick(1000, &mut leds);
        assert_eq!(engine.active_notes(), 0);
    }

    #[test]
    fn parameter_changes_apply_to_new_notes_only() {
        let (mut engine, mut leds) = engine(60, 72);
        engine.note_on(60, 100);
        engine.tick(1, &mut leds);
        engine.set_attack_time(1000);
        engine.note_on(61, 100);
        engine.tick(2, &mut leds);
        engine.tick(81, &mut leds);
        assert_abs_diff_eq!(engine.intensity(60).unwrap(), 1.0, epsilon = 1e-6);
        assert!(engine.intensity(61).unwrap() < 0.1);
    }

    #[test]
    fn reset_restores_defaults_without_touching_voices() {
        let (mut engine, mut leds) = engine(60, 72);
        engine.set_color_mapper(Mapper::FixedColor);
        engine.set_fixed_hue(99);
        engine.set_base_brightness(20);
        engine.set_sustain_level(1.0).unwrap();
        engine.note_on(60, 100);
        engine.tick(1, &mut leds);

        engine.reset_all_controllers();
        assert_eq!(engine.parameters(), &EngineParameters::default());
        assert_eq!(engine.mapper().mapper(0), Mapper::Palette);
        assert_eq!(engine.mapper().note_min(0), 60);
        assert!(engine.is_sounding(60));
        engine.tick(200, &mut leds);
        assert_eq!(leds[0].h, 99);
    }

    #[test]
    fn rejects_invalid_sustain_level() {
        let (mut engine, _) = engine(0, 127);
        assert!(engine.set_sustain_level(1.5).is_err());
        assert_eq!(engine.sustain_level(), 0.0);
        let params = EngineParameters {
            sustain_level: -0.1,
            ..EngineParameters::default()
        };
        assert!(engine.set_parameters(params).is_err());
    }

    #[test]
    fn channel_mapping_is_used_for_sink_events() {
        let (mut engine, mut leds) = engine(0, 127);
        engine.set_attack_time(0);
        engine.mapper_mut().set_mapper(9, Mapper::FixedColor);
        engine.mapper_mut().set_fixed_hue(9, 200);
        NoteSink::note_on(&mut engine, 9, 36, 127);
        engine.tick(1, &mut leds);
        assert_eq!(leds[36].h, 200);
    }

    #[test]
    fn short_led_buffer_does_not_panic() {
        let (mut engine, _) = engine(60, 72);
        let mut leds = vec![Hsv::BLACK; 2];
        engine.note_on(72, 100);
        engine.tick(1, &mut leds);
        assert!(engine.is_sounding(72));
    }
}
