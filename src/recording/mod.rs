//! Frame archiving.
//!
//! Periodic captures are numbered from 1 and written under `frames/`;
//! on-demand captures are named by wall-clock time under `results/`.

mod layout;
mod recorder;

pub use layout::OutputLayout;
pub use recorder::{Recorder, RecorderState, TickOutcome};
