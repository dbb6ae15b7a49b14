//! The daemon's event path: soft → sostenuto → damper → light engine.

use log::{debug, info, trace};

use crate::color::Hsv;
use crate::engine::LightEngine;
use crate::note::{controller, NoteEvent};
use crate::pedal::{DamperPedal, NoteSink, Pedal, SoftPedal, SostenutoPedal};

pub type PedalChain = SoftPedal<SostenutoPedal<DamperPedal<LightEngine>>>;

/// Routes decoded MIDI events through the pedal chain into the engine.
#[derive(Debug)]
pub struct Pipeline {
    chain: PedalChain,
}

impl Pipeline {
    pub fn new(engine: LightEngine) -> Self {
        Self {
            chain: SoftPedal::new(SostenutoPedal::new(DamperPedal::new(engine))),
        }
    }

    pub fn soft(&mut self) -> &mut PedalChain {
        &mut self.chain
    }

    pub fn sostenuto(&mut self) -> &mut SostenutoPedal<DamperPedal<LightEngine>> {
        self.chain.downstream_mut()
    }

    pub fn damper(&mut self) -> &mut DamperPedal<LightEngine> {
        self.chain.downstream_mut().downstream_mut()
    }

    pub fn engine(&self) -> &LightEngine {
        self.chain.downstream().downstream().downstream()
    }

    pub fn engine_mut(&mut self) -> &mut LightEngine {
        self.chain.downstream_mut().downstream_mut().downstream_mut()
    }

    pub fn handle(&mut self, event: NoteEvent) {
        match event {
            NoteEvent::NoteOn { channel, note, velocity } => {
                trace!("note on {channel}:{note} velocity {velocity}");
                self.chain.note_on(channel, note, velocity);
            }
            NoteEvent::NoteOff { channel, note } => {
                trace!("note off {channel}:{note}");
                self.chain.note_off(channel, note);
            }
            NoteEvent::ControlChange { channel, controller, value } => {
                self.control_change(channel, controller, value);
            }
        }
    }

    fn control_change(&mut self, channel: u8, number: u8, value: u8) {
        match number {
            controller::DAMPER_PEDAL => self.damper().set_from_controller(channel, value),
            controller::SOSTENUTO_PEDAL => self.sostenuto().set_from_controller(channel, value),
            controller::SOFT_PEDAL => self.chain.set_from_controller(channel, value),
            controller::ALL_SOUND_OFF | controller::ALL_NOTES_OFF => {
                info!("all notes off");
                self.engine_mut().all_notes_off();
            }
            controller::RESET_ALL_CONTROLLERS => {
                info!("resetting all controllers");
                self.engine_mut().reset_all_controllers();
            }
            other => debug!("ignoring controller {other} on channel {channel}"),
        }
    }

    pub fn tick(&mut self, time: u64, leds: &mut [Hsv]) {
        self.engine_mut().tick(time, leds);
    }
}
