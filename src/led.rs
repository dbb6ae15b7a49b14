use log::trace;
use std::ops::Range;

use crate::color::{Hsv, Rgb};
use crate::error::OutputError;

/// Sink for one frame of physical pixels.
pub trait LedOutput {
    fn render(&mut self, pixels: &[Rgb]) -> Result<(), OutputError>;
}

impl<O: LedOutput + ?Sized> LedOutput for Box<O> {
    fn render(&mut self, pixels: &[Rgb]) -> Result<(), OutputError> {
        (**self).render(pixels)
    }
}

/// Output that only traces lit pixels; used when no strip is attached.
#[derive(Debug, Default)]
pub struct LogOutput {
    last_lit: usize,
}

impl LedOutput for LogOutput {
    fn render(&mut self, pixels: &[Rgb]) -> Result<(), OutputError> {
        let lit = pixels.iter().filter(|p| **p != Rgb::default()).count();
        if lit != self.last_lit {
            trace!("{lit} of {} pixels lit", pixels.len());
            self.last_lit = lit;
        }
        Ok(())
    }
}

/// Expands per-note colors onto the physical LEDs of each note.
pub struct LedStrip<O> {
    layout: Vec<Range<usize>>,
    pixels: Vec<Rgb>,
    output: O,
}

impl<O: LedOutput> LedStrip<O> {
    pub fn new(layout: Vec<Range<usize>>, led_count: usize, output: O) -> Self {
        Self {
            layout,
            pixels: vec![Rgb::default(); led_count],
            output,
        }
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn show(&mut self, slots: &[Hsv]) -> Result<(), OutputError> {
        self.pixels.fill(Rgb::default());
        for (color, leds) in slots.iter().zip(&self.layout) {
            let rgb = color.to_rgb();
            let end = leds.end.min(self.pixels.len());
            let start = leds.start.min(end);
            self.pixels[start..end].fill(rgb);
        }
        self.output.render(&self.pixels)
    }
}

#[cfg(feature = "ws281x")]
pub use ws281x::Ws281xOutput;

#[cfg(feature = "ws281x")]
mod ws281x {
    use super::LedOutput;
    use crate::color::Rgb;
    use crate::config::StripConfig;
    use crate::error::OutputError;

    pub struct Ws281xOutput {
        controller: rs_ws281x::Controller,
    }

    impl Ws281xOutput {
        pub fn new(strip: &StripConfig, led_count: usize) -> Result<Self, OutputError> {
            let channel = rs_ws281x::ChannelBuilder::new()
                .pin(strip.pin)
                .count(led_count as i32)
                .brightness(strip.brightness)
                .strip_type(rs_ws281x::StripType::Ws2812)
                .build();

            let controller = rs_ws281x::ControllerBuilder::new()
                .dma(strip.dma)
                .channel(0, channel)
                .build()
                .map_err(|e| OutputError::Init(format!("{e:?}")))?;

            Ok(Self { controller })
        }
    }

    impl LedOutput for Ws281xOutput {
        fn render(&mut self, pixels: &[Rgb]) -> Result<(), OutputError> {
            let leds = self.controller.leds_mut(0);
            for (led, pixel) in leds.iter_mut().zip(pixels) {
                *led = pixel.to_bgrw();
            }
            self.controller
                .render()
                .map_err(|e| OutputError::Render(format!("{e:?}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Capture(Vec<Vec<Rgb>>);

    impl LedOutput for Capture {
        fn render(&mut self, pixels: &[Rgb]) -> Result<(), OutputError> {
            self.0.push(pixels.to_vec());
            Ok(())
        }
    }

    #[test]
    fn expands_slots_onto_their_leds() {
        let mut strip = LedStrip::new(vec![0..2, 2..2, 3..5], 5, Capture::default());
        let red = Hsv::new(0, 255, 255);
        strip.show(&[red, red, Hsv::BLACK]).unwrap();

        let frame = &strip.output().0[0];
        let r = Rgb::new(255, 0, 0);
        assert_eq!(frame, &vec![r, r, Rgb::default(), Rgb::default(), Rgb::default()]);
    }

    #[test]
    fn clears_between_frames_and_clips_layout() {
        let mut strip = LedStrip::new(vec![0..1, 3..9], 4, Capture::default());
        let blue = Hsv::new(170, 255, 255);
        strip.show(&[blue, blue]).unwrap();
        strip.show(&[Hsv::BLACK, Hsv::BLACK]).unwrap();

        let frames = &strip.output().0;
        assert_eq!(frames[0][3], blue.to_rgb());
        assert!(frames[1].iter().all(|p| *p == Rgb::default()));
    }

    #[test]
    fn log_output_never_fails() {
        let mut out = LogOutput::default();
        assert!(out.render(&[Rgb::new(1, 1, 1)]).is_ok());
    }
}
