//! Cycles through sorting algorithms on a strip drawn in the terminal.
//!
//! Usage: `cargo run --example terminal_show [config.toml] [runs]`

use std::io::Write;

use blinksort::{
    run_random_algorithm, Color, MemoryStrip, OutputDevice, PacingEngine, ShowConfig, Telemetry,
};

/// Prints one ANSI line per transmitted frame.
struct TerminalStrip {
    strip: MemoryStrip,
}

impl OutputDevice for TerminalStrip {
    fn len(&self) -> usize {
        self.strip.len()
    }

    fn set_pixel(&mut self, index: usize, color: Color) {
        self.strip.set_pixel(index, color);
    }

    fn is_busy(&mut self) -> bool {
        self.strip.is_busy()
    }

    fn begin_transmit(&mut self) {
        self.strip.begin_transmit();
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "\r{}", self.strip.ansi_line());
        let _ = out.flush();
    }

    fn intensity(&self) -> u8 {
        self.strip.intensity()
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let mut show = match args.next() {
        Some(path) => ShowConfig::load_or_default(path),
        None => ShowConfig::default(),
    };
    let runs: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(3);

    // keep the line inside a terminal
    show.strip.length = show.strip.length.min(100);
    let device = TerminalStrip {
        strip: MemoryStrip::new(show.strip.length).with_intensity(show.strip.intensity),
    };
    let telemetry = Telemetry::new().on_algorithm_name(|name| println!("\n{name}"));
    let mut engine = match PacingEngine::new(device, show.pacing.clone()) {
        Ok(engine) => engine.with_telemetry(telemetry),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    let mut rng = rand::rng();
    for _ in 0..runs {
        let report = run_random_algorithm(&mut engine, &show, &mut rng);
        println!(
            "\n{}: {} comparisons, {} flashes, {:?}, {} mismatches",
            report.name, report.comparisons, report.events, report.elapsed, report.mismatches
        );
    }
    engine.blank();
    println!();
}
