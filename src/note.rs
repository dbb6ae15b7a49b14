use serde::Deserialize;
use std::ops::Range;
use std::str;

/// MIDI controller numbers the daemon reacts to.
pub mod controller {
    pub const DAMPER_PEDAL: u8 = 64;
    pub const SOSTENUTO_PEDAL: u8 = 66;
    pub const SOFT_PEDAL: u8 = 67;
    pub const ALL_SOUND_OFF: u8 = 120;
    pub const RESET_ALL_CONTROLLERS: u8 = 121;
    pub const ALL_NOTES_OFF: u8 = 123;
}

/// Which physical LEDs light up for one note.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NoteConfig {
    #[serde(default)]
    pub name: String,
    pub midi: u8,
    pub led_range: (usize, usize),
}

impl NoteConfig {
    pub fn leds(&self) -> Range<usize> {
        self.led_range.0..self.led_range.1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEvent {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
}

impl NoteEvent {
    /// Decode a raw MIDI channel message. Anything that is not a note or
    /// controller message yields `None`.
    pub fn from_bytes(message: &[u8]) -> Option<Self> {
        if message.len() < 3 {
            return None;
        }
        let channel = message[0] & 0x0F;
        let note = message[1] & 0x7F;
        let value = message[2] & 0x7F;

        match message[0] & 0xF0 {
            0x90 if value > 0 => Some(NoteEvent::NoteOn { channel, note, velocity: value }),
            0x90 | 0x80 => Some(NoteEvent::NoteOff { channel, note }),
            0xB0 => Some(NoteEvent::ControlChange {
                channel,
                controller: note,
                value,
            }),
            _ => None,
        }
    }

    /// Decode the UDP text protocol.
    ///
    /// `"55 125;"` is a note with velocity (0 means note off).
    /// `"364 64;"` is controller 64 with value 64: the first number carries
    /// the value offset by 300.
    pub fn from_udp_message(buf: &[u8]) -> Option<Self> {
        let msg = str::from_utf8(buf).ok()?;
        let parts: Vec<&str> = msg
            .trim()
            .trim_end_matches(';')
            .split_whitespace()
            .collect();
        let [first, second] = parts.as_slice() else {
            return None;
        };

        if let (Ok(note), Ok(velocity)) = (first.parse::<u8>(), second.parse::<u8>()) {
            if note > 0x7F || velocity > 0x7F {
                return None;
            }
            return Some(if velocity == 0 {
                NoteEvent::NoteOff { channel: 0, note }
            } else {
                NoteEvent::NoteOn { channel: 0, note, velocity }
            });
        }

        let value = first.parse::<u16>().ok()?.checked_sub(300)?;
        let controller = second.parse::<u8>().ok()?;
        if value > 0x7F || controller > 0x7F {
            return None;
        }
        Some(NoteEvent::ControlChange {
            channel: 0,
            controller,
            value: value as u8,
        })
    }
}
