//! Note to color mapping, parameterised per MIDI channel.

use serde::{Deserialize, Serialize};

use crate::color::{scale_by_velocity, Hsv};
use crate::note_colors::NoteColorMap;

/// Number of independent MIDI channels.
pub const CHANNELS: usize = 16;

/// Strategy used to turn a note into a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mapper {
    /// Hue and saturation from a historical [`NoteColorMap`].
    #[default]
    Palette,
    /// Continuous hue gradient across the channel's note range.
    Rainbow,
    /// One configured hue for every note.
    FixedColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelParameters {
    pub note_min: u8,
    pub note_max: u8,
    pub mapper: Mapper,
    pub note_color_map: NoteColorMap,
    pub fixed_hue: u8,
    pub ignore_velocity: bool,
}

impl Default for ChannelParameters {
    fn default() -> Self {
        Self {
            note_min: 0x00,
            note_max: 0x7F,
            mapper: Mapper::Palette,
            note_color_map: NoteColorMap::Newton1704,
            fixed_hue: 0x00,
            ignore_velocity: true,
        }
    }
}

impl ChannelParameters {
    fn contains(&self, note: u8) -> bool {
        (self.note_min..=self.note_max).contains(&note)
    }
}

/// Maps `(channel, note, velocity)` to an [`Hsv`] color.
///
/// Channels are masked to 0-15 and notes/velocities to 0-127, so every
/// input is accepted. Notes outside the channel's range map to black.
#[derive(Debug, Clone, Default)]
pub struct ColorMapper {
    channels: [ChannelParameters; CHANNELS],
}

fn ch(channel: u8) -> usize {
    (channel & 0x0F) as usize
}

impl ColorMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parameters(&self, channel: u8) -> &ChannelParameters {
        &self.channels[ch(channel)]
    }

    pub fn note_min(&self, channel: u8) -> u8 {
        self.channels[ch(channel)].note_min
    }

    pub fn set_note_min(&mut self, channel: u8, note_min: u8) {
        self.channels[ch(channel)].note_min = note_min & 0x7F;
    }

    pub fn note_max(&self, channel: u8) -> u8 {
        self.channels[ch(channel)].note_max
    }

    pub fn set_note_max(&mut self, channel: u8, note_max: u8) {
        self.channels[ch(channel)].note_max = note_max & 0x7F;
    }

    pub fn set_note_range(&mut self, channel: u8, note_min: u8, note_max: u8) {
        self.set_note_min(channel, note_min);
        self.set_note_max(channel, note_max);
    }

    pub fn mapper(&self, channel: u8) -> Mapper {
        self.channels[ch(channel)].mapper
    }

    pub fn set_mapper(&mut self, channel: u8, mapper: Mapper) {
        self.channels[ch(channel)].mapper = mapper;
    }

    pub fn note_color_map(&self, channel: u8) -> NoteColorMap {
        self.channels[ch(channel)].note_color_map
    }

    pub fn set_note_color_map(&mut self, channel: u8, note_color_map: NoteColorMap) {
        self.channels[ch(channel)].note_color_map = note_color_map;
    }

    pub fn fixed_hue(&self, channel: u8) -> u8 {
        self.channels[ch(channel)].fixed_hue
    }

    pub fn set_fixed_hue(&mut self, channel: u8, fixed_hue: u8) {
        self.channels[ch(channel)].fixed_hue = fixed_hue;
    }

    pub fn is_ignore_velocity(&self, channel: u8) -> bool {
        self.channels[ch(channel)].ignore_velocity
    }

    pub fn set_ignore_velocity(&mut self, channel: u8, state: bool) {
        self.channels[ch(channel)].ignore_velocity = state;
    }

    /// Restore a channel's parameters to their defaults.
    pub fn reset(&mut self, channel: u8) {
        self.channels[ch(channel)] = ChannelParameters::default();
    }

    pub fn reset_all(&mut self) {
        self.channels = [ChannelParameters::default(); CHANNELS];
    }

    pub fn map(&self, channel: u8, note: u8, velocity: u8) -> Hsv {
        let params = &self.channels[ch(channel)];
        let note = note & 0x7F;
        if !params.contains(note) {
            return Hsv::BLACK;
        }
        let velocity = if params.ignore_velocity { 0x7F } else { velocity & 0x7F };

        match params.mapper {
            Mapper::Palette => {
                let color = params.note_color_map.color(note);
                color.with_value(scale_by_velocity(color.v, velocity))
            }
            Mapper::Rainbow => {
                let span = (params.note_max - params.note_min) as f32 + 1.0;
                let hue = ((note - params.note_min) as f32 * (255.0 / span))
                    .round()
                    .clamp(0.0, 255.0) as u8;
                Hsv::new(hue, 0xFF, scale_by_velocity(0xFF, velocity))
            }
            Mapper::FixedColor => {
                Hsv::new(params.fixed_hue, 0xFF, scale_by_velocity(0xFF, velocity))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rainbow(min: u8, max: u8) -> ColorMapper {
        let mut mapper = ColorMapper::new();
        mapper.set_mapper(0, Mapper::Rainbow);
        mapper.set_note_range(0, min, max);
        mapper.set_ignore_velocity(0, false);
        mapper
    }

    #[test]
    fn defaults() {
        let mapper = ColorMapper::new();
        assert_eq!(mapper.note_min(3), 0);
        assert_eq!(mapper.note_max(3), 127);
        assert_eq!(mapper.mapper(3), Mapper::Palette);
        assert_eq!(mapper.note_color_map(3), NoteColorMap::Newton1704);
        assert!(mapper.is_ignore_velocity(3));
    }

    #[test]
    fn rainbow_spans_the_note_range() {
        let mapper = rainbow(0, 127);
        assert_eq!(mapper.map(0, 0, 127).h, 0);
        assert!(mapper.map(0, 127, 127).h >= 250);

        let mapper = rainbow(60, 72);
        assert_eq!(mapper.map(0, 60, 127), Hsv::new(0, 255, 255));
        let top = mapper.map(0, 72, 127).h;
        assert!(top > mapper.map(0, 71, 127).h);
        assert_eq!(top, 235);
    }

    #[test]
    fn velocity_scales_value() {
        let mapper = rainbow(0, 127);
        assert_eq!(mapper.map(0, 10, 0).v, 0);
        assert_eq!(mapper.map(0, 10, 64).v, 129);
        assert_eq!(mapper.map(0, 10, 127).v, 255);
    }

    #[test]
    fn ignore_velocity_forces_full_value() {
        let mut mapper = rainbow(0, 127);
        mapper.set_ignore_velocity(0, true);
        assert_eq!(mapper.map(0, 10, 1).v, 255);
        assert_eq!(mapper.map(0, 10, 1), mapper.map(0, 10, 127));
    }

    #[test]
    fn notes_outside_range_are_black() {
        let mapper = rainbow(60, 72);
        assert_eq!(mapper.map(0, 59, 127), Hsv::BLACK);
        assert_eq!(mapper.map(0, 73, 127), Hsv::BLACK);
    }

    #[test]
    fn palette_scales_table_value() {
        let mut mapper = ColorMapper::new();
        mapper.set_ignore_velocity(0, false);
        let full = NoteColorMap::Newton1704.color(62);
        assert_eq!(mapper.map(0, 62, 127), full);
        assert_eq!(mapper.map(0, 62, 0), full.with_value(0));
    }

    #[test]
    fn fixed_color_uses_configured_hue() {
        let mut mapper = ColorMapper::new();
        mapper.set_mapper(2, Mapper::FixedColor);
        mapper.set_fixed_hue(2, 100);
        assert_eq!(mapper.map(2, 5, 50), Hsv::new(100, 255, 255));
        // other channels keep the palette
        assert_eq!(mapper.map(1, 60, 127), NoteColorMap::Newton1704.color(60));
    }

    #[test]
    fn channels_are_masked_and_independent() {
        let mut mapper = ColorMapper::new();
        mapper.set_fixed_hue(0x13, 42);
        assert_eq!(mapper.fixed_hue(3), 42);
        assert_eq!(mapper.fixed_hue(4), 0);
        mapper.reset(3);
        assert_eq!(mapper.fixed_hue(3), 0);
    }
}
