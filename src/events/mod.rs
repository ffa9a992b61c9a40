//! # Events Module
//!
//! Progress reporting decoupled from presentation.
//!
//! The pipeline emits [`Event`]s through a crossbeam channel; the CLI drains
//! them on its own thread to drive a progress bar. Library callers that do not
//! care pass [`null_sender`].
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Analyze(AnalyzeEvent::Progress(p)) = event {
//!             println!("Analyzed {}/{}", p.completed, p.total);
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
