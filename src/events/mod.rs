//! # Events Module
//!
//! Event-driven progress reporting.
//!
//! ## Design
//! The engine emits events through channels, allowing any UI to
//! subscribe and display progress. The clustering sweep itself only
//! knows about a `(processed, total)` callback; [`EventSender::progress_for`]
//! bridges the two.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Cluster(ClusterEvent::Progress(p)) = event {
//!             println!("Clustered {}/{}", p.processed, p.total);
//!         }
//!     }
//! });
//!
//! let clusters = strategy.cluster(&mut sender.progress_for(strategy.kind()));
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
