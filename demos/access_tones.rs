//! Renders the access cues of one unpaced run into a WAV file.
//!
//! Usage: `cargo run --example access_tones [algorithm] [out.wav]`

use blinksort::algorithms::find;
use blinksort::{MemoryStrip, PacingConfig, PacingEngine, Telemetry, ToneRecorder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let name = args.next().unwrap_or_else(|| "Quick Sort (LR ptrs)".to_string());
    let path = args.next().unwrap_or_else(|| "access_tones.wav".to_string());
    let algo = find(&name).ok_or_else(|| format!("unknown algorithm: {name}"))?;

    let len = 64;
    let recorder = ToneRecorder::new(len, 44_100, 8)?.with_max_seconds(120).shared();
    let telemetry = Telemetry::new().on_access_sound(ToneRecorder::hook(&recorder));
    let mut engine =
        PacingEngine::new(MemoryStrip::new(len), PacingConfig::unpaced())?.with_telemetry(telemetry);

    let report = engine.run(algo);
    println!("{report:?}");

    // settle cues are part of the show
    let recorder = recorder.borrow();
    recorder.write_wav(&path)?;
    println!("wrote {} blips to {path} ({} dropped)", recorder.blips(), recorder.dropped());
    Ok(())
}
