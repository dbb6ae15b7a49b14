//! Historical note-to-color theories.
//!
//! Each theory assigns a color to the twelve pitch classes, starting at C.
//! The table is read-only reference data indexed by (theory, note mod 12).

use serde::{Deserialize, Serialize};

use crate::color::Hsv;

/// A named note-to-color theory, tagged with its year of publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteColorMap {
    Aeppli1940,
    Belmont1944,
    Bertrand1734,
    Bishop1893,
    Field1816,
    Helmholtz1910,
    Jameson1844,
    Klein1930,
    #[default]
    Newton1704,
    Rimington1893,
    Scriabin1911,
    Seemann1881,
    Zieverink2004,
}

impl NoteColorMap {
    pub const ALL: [NoteColorMap; 13] = [
        NoteColorMap::Aeppli1940,
        NoteColorMap::Belmont1944,
        NoteColorMap::Bertrand1734,
        NoteColorMap::Bishop1893,
        NoteColorMap::Field1816,
        NoteColorMap::Helmholtz1910,
        NoteColorMap::Jameson1844,
        NoteColorMap::Klein1930,
        NoteColorMap::Newton1704,
        NoteColorMap::Rimington1893,
        NoteColorMap::Scriabin1911,
        NoteColorMap::Seemann1881,
        NoteColorMap::Zieverink2004,
    ];

    /// Full-brightness color of `note` under this theory.
    pub fn color(self, note: u8) -> Hsv {
        COLOR_DATA[self as usize][((note & 0x7F) % 12) as usize]
    }
}

const fn c(h: u8, s: u8, v: u8) -> Hsv {
    Hsv::new(h, s, v)
}

//                 C                 C#                D                 D#                E                 F                 F#                G                 G#                A                 A#                B
#[rustfmt::skip]
static COLOR_DATA: [[Hsv; 12]; 13] = [
    /* Aeppli */    [c(0, 255, 255),   c(0, 0, 0),       c(32, 255, 255),  c(0, 0, 0),       c(64, 255, 255),  c(0, 0, 0),       c(96, 255, 255),  c(0, 0, 0),       c(128, 255, 255), c(160, 255, 255), c(0, 0, 0),       c(192, 255, 255)],
    /* Belmont */   [c(0, 255, 255),   c(16, 255, 255),  c(32, 255, 255),  c(48, 255, 255),  c(64, 255, 255),  c(80, 255, 255),  c(96, 255, 255),  c(128, 255, 255), c(160, 255, 255), c(176, 255, 255), c(192, 255, 255), c(224, 255, 255)],
    /* Bertrand */  [c(160, 255, 255), c(136, 255, 255), c(96, 255, 255),  c(80, 200, 160),  c(64, 255, 255),  c(48, 255, 255),  c(32, 255, 255),  c(0, 255, 255),   c(240, 255, 200), c(192, 255, 255), c(208, 160, 200), c(176, 255, 200)],
    /* Bishop */    [c(0, 255, 255),   c(16, 255, 240),  c(32, 255, 255),  c(44, 255, 255),  c(64, 255, 255),  c(80, 255, 255),  c(96, 255, 255),  c(120, 255, 255), c(136, 255, 255), c(176, 255, 255), c(168, 255, 200), c(192, 255, 255)],
    /* Field */     [c(160, 255, 255), c(0, 0, 0),       c(192, 255, 255), c(0, 0, 0),       c(0, 255, 255),   c(32, 255, 255),  c(0, 0, 0),       c(64, 255, 255),  c(0, 0, 0),       c(96, 255, 255),  c(0, 0, 0),       c(0, 0, 0)],
    /* Helmholtz */ [c(64, 255, 255),  c(96, 255, 255),  c(120, 255, 255), c(144, 255, 255), c(176, 255, 255), c(192, 255, 255), c(248, 255, 220), c(0, 255, 255),   c(0, 255, 220),   c(0, 255, 190),   c(16, 255, 255),  c(32, 255, 255)],
    /* Jameson */   [c(0, 255, 255),   c(16, 255, 255),  c(32, 255, 255),  c(48, 255, 255),  c(64, 255, 255),  c(96, 255, 255),  c(128, 255, 255), c(160, 255, 255), c(184, 255, 255), c(208, 255, 255), c(200, 255, 220), c(192, 255, 255)],
    /* Klein */     [c(0, 255, 180),   c(0, 255, 255),   c(16, 255, 255),  c(32, 255, 255),  c(64, 255, 255),  c(80, 255, 255),  c(96, 255, 255),  c(128, 255, 255), c(160, 255, 255), c(176, 255, 255), c(192, 255, 255), c(192, 255, 160)],
    /* Newton */    [c(0, 255, 255),   c(16, 255, 255),  c(32, 255, 255),  c(48, 255, 255),  c(64, 255, 255),  c(96, 255, 255),  c(128, 255, 255), c(160, 255, 255), c(168, 255, 255), c(176, 255, 255), c(184, 255, 255), c(192, 255, 255)],
    /* Rimington */ [c(0, 255, 200),   c(240, 255, 255), c(24, 255, 255),  c(32, 255, 255),  c(64, 255, 255),  c(80, 255, 255),  c(96, 255, 255),  c(120, 255, 255), c(136, 255, 255), c(176, 255, 255), c(160, 255, 200), c(192, 255, 255)],
    /* Scriabin */  [c(0, 255, 255),   c(192, 255, 255), c(64, 255, 255),  c(200, 80, 200),  c(144, 96, 255),  c(0, 255, 160),   c(160, 255, 255), c(32, 255, 255),  c(208, 255, 255), c(96, 255, 255),  c(216, 96, 200),  c(152, 120, 255)],
    /* Seemann */   [c(248, 255, 160), c(0, 255, 255),   c(32, 255, 255),  c(48, 255, 255),  c(64, 255, 255),  c(96, 255, 255),  c(128, 255, 255), c(160, 255, 255), c(176, 255, 255), c(192, 255, 255), c(20, 220, 100),  c(0, 0, 0)],
    /* Zieverink */ [c(80, 255, 255),  c(96, 255, 255),  c(128, 255, 255), c(160, 255, 255), c(176, 255, 255), c(192, 255, 255), c(168, 255, 180), c(0, 255, 160),   c(0, 255, 255),   c(32, 255, 255),  c(64, 255, 255),  c(64, 120, 255)],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newton_spans_the_spectrum() {
        assert_eq!(NoteColorMap::Newton1704.color(60), Hsv::new(0, 255, 255));
        assert_eq!(NoteColorMap::Newton1704.color(64).h, 64);
        assert_eq!(NoteColorMap::Newton1704.color(71).h, 192);
    }

    #[test]
    fn octaves_share_a_color() {
        for map in NoteColorMap::ALL {
            for pitch in 0..12u8 {
                assert_eq!(map.color(pitch), map.color(pitch + 48));
            }
        }
    }

    #[test]
    fn out_of_range_note_is_masked() {
        assert_eq!(
            NoteColorMap::Scriabin1911.color(0x80 | 62),
            NoteColorMap::Scriabin1911.color(62)
        );
    }

    #[test]
    fn discriminants_index_the_table() {
        for (i, map) in NoteColorMap::ALL.iter().enumerate() {
            assert_eq!(*map as usize, i);
        }
    }
}
