//! Paced sorting-algorithm visualization on addressable light strips.
//!
//! Algorithms sort a buffer of [`Item`]s through an instrumented
//! [`SortArray`]. Every access and comparison is reported to an
//! [`EventSink`]; the [`Renderer`] sink turns them into paced flashes on an
//! [`OutputDevice`], and the [`PacingEngine`] drives a run from shuffle to
//! validation.

pub mod algorithms;
pub mod array;
pub mod audio;
pub mod cancel;
pub mod color;
pub mod config;
pub mod device;
pub mod engine;
pub mod error;
#[doc(hidden)]
pub mod harness;
#[doc(hidden)]
pub mod invariant_ppt;
pub mod item;
pub mod render;
pub mod sink;
pub mod telemetry;

pub use algorithms::{Algorithm, SortFn, ALGORITHMS};
pub use array::{Operand, SortArray};
pub use audio::ToneRecorder;
pub use cancel::CancelToken;
pub use color::{hsv, Color, HUE_MAX};
pub use config::{PacingConfig, ShowConfig, StripConfig};
pub use device::{MemoryStrip, OutputDevice};
pub use engine::{run_random_algorithm, PacingEngine, Phase, RunReport};
pub use error::{ConfigError, CueError, EngineError};
pub use item::{Item, Value, BLACK};
pub use render::{RenderStats, Renderer, MAX_FRAME_DROP};
pub use sink::{Event, EventLog, EventSink, NullSink, Slot};
pub use telemetry::Telemetry;
