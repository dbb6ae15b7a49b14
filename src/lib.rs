//! Piano-style note lighting for addressable LED strips.
//!
//! Incoming note events pass through optional pedal emulators
//! ([`pedal::DamperPedal`], [`pedal::SostenutoPedal`], [`pedal::SoftPedal`])
//! into a [`LightEngine`], which keeps one ADSR envelope and one color per
//! note. A periodic [`LightEngine::tick`] writes the current color of every
//! sounding note into an HSV buffer owned by the caller.
//!
//! ```
//! use piano_pedal_lights::pedal::{DamperPedal, NoteSink, Pedal};
//! use piano_pedal_lights::{Hsv, LightEngine};
//!
//! let mut damper = DamperPedal::new(LightEngine::new(60, 72));
//! let mut leds = vec![Hsv::BLACK; 13];
//!
//! damper.note_on(0, 60, 100);
//! damper.press(0);
//! damper.note_off(0, 60); // held by the pedal
//! damper.downstream_mut().tick(1, &mut leds);
//! assert!(damper.downstream().is_sounding(60));
//! ```

pub mod color;
pub mod config;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod led;
pub mod mapper;
pub mod note;
pub mod note_colors;
pub mod pedal;
pub mod pipeline;

pub use color::{Hsv, Rgb};
pub use config::Config;
pub use engine::{EngineParameters, LightEngine};
pub use envelope::{AdsrEnvelope, EnvelopeState};
pub use mapper::{ColorMapper, Mapper};
pub use note_colors::NoteColorMap;
pub use pipeline::Pipeline;
