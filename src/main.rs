use log::{error, info, warn};
use midir::{Ignore, MidiInput};
use piano_pedal_lights::led::{LedOutput, LedStrip};
use piano_pedal_lights::note::NoteEvent;
use piano_pedal_lights::{Config, Hsv, LightEngine, Pipeline};
use std::error::Error;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration, Instant};

const DEFAULT_CONFIG_PATH: &str = "piano_lights.json";

async fn start_udp_listener(
    bind: String,
    note_tx: mpsc::Sender<NoteEvent>,
) -> std::io::Result<()> {
    let socket = UdpSocket::bind(&bind).await?;
    info!("Listening for UDP messages on {bind}...");

    let mut buf = [0u8; 64];

    loop {
        let (len, addr) = socket.recv_from(&mut buf).await?;
        match NoteEvent::from_udp_message(&buf[..len]) {
            Some(event) => {
                if note_tx.send(event).await.is_err() {
                    return Ok(());
                }
            }
            None => warn!(
                "Invalid UDP message from {addr}: {:?}",
                String::from_utf8_lossy(&buf[..len])
            ),
        }
    }
}

fn start_midi_listener(port_match: String, tx: mpsc::Sender<NoteEvent>) {
    std::thread::spawn(move || {
        let mut midi_in = match MidiInput::new("piano-pedal-lights") {
            Ok(midi_in) => midi_in,
            Err(e) => {
                error!("Couldn't create MIDI input: {e}");
                return;
            }
        };
        midi_in.ignore(Ignore::All);

        let ports = midi_in.ports();
        let port = ports.iter().find(|p| {
            midi_in
                .port_name(p)
                .map(|name| name.contains(&port_match))
                .unwrap_or(false)
        });

        let Some(port) = port else {
            warn!("No MIDI port matching '{port_match}', MIDI input disabled");
            return;
        };

        let port_name = midi_in.port_name(port).unwrap_or_else(|_| "<unknown>".to_string());
        info!("Connecting to MIDI device: {port_name}");

        let _conn = match midi_in.connect(
            port,
            "piano-pedal-lights-in",
            move |_, message, _| {
                if let Some(event) = NoteEvent::from_bytes(message) {
                    let _ = tx.blocking_send(event);
                }
            },
            (),
        ) {
            Ok(conn) => conn,
            Err(e) => {
                error!("Failed to connect to {port_name}: {e}");
                return;
            }
        };

        info!("Listening for MIDI input from {port_name}...");

        loop {
            std::thread::sleep(std::time::Duration::from_secs(1));
        }
    });
}

fn build_output(config: &Config) -> Result<Box<dyn LedOutput>, Box<dyn Error>> {
    #[cfg(feature = "ws281x")]
    {
        let output =
            piano_pedal_lights::led::Ws281xOutput::new(&config.strip, config.led_count())?;
        Ok(Box::new(output))
    }
    #[cfg(not(feature = "ws281x"))]
    {
        warn!(
            "Built without the ws281x feature; {} LEDs will only be logged",
            config.led_count()
        );
        Ok(Box::new(piano_pedal_lights::led::LogOutput::default()))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load_or_default(&path)?;

    let mut engine = LightEngine::new(config.note_min, config.note_max);
    engine.set_parameters(config.engine)?;
    let mut pipeline = Pipeline::new(engine);
    pipeline.soft().set_soften_factor(config.soften_factor)?;

    let mut leds = vec![Hsv::BLACK; pipeline.engine().led_count()];
    let mut strip = LedStrip::new(
        config.led_layout(),
        config.led_count(),
        build_output(&config)?,
    );

    let (tx, mut rx) = mpsc::channel(100);
    start_midi_listener(config.midi_port.clone(), tx.clone());

    if let Some(bind) = config.udp_bind.clone() {
        tokio::spawn(async move {
            if let Err(e) = start_udp_listener(bind, tx).await {
                error!("UDP listener error: {e}");
            }
        });
    }

    let interval = Duration::from_millis(config.tick_interval_ms);
    let start = Instant::now();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!("Rendering every {} ms", config.tick_interval_ms);
    loop {
        while let Ok(event) = rx.try_recv() {
            pipeline.handle(event);
        }

        let now = start.elapsed().as_millis() as u64;
        pipeline.tick(now, &mut leds);
        strip.show(&leds)?;

        tokio::select! {
            _ = sleep(interval) => {}
            _ = &mut shutdown => break,
        }
    }

    info!("Shutting down, clearing strip");
    pipeline.engine_mut().all_notes_off();
    leds.fill(Hsv::BLACK);
    strip.show(&leds)?;
    Ok(())
}
