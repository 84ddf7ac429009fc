//! Diorama Reconcile - Capture and apply
//!
//! `CaptureEngine` turns a live scene into a snapshot. `ApplyEngine` makes a
//! live scene match a snapshot with the fewest spawns, despawns and updates,
//! and hands the image bindings it found back to the caller for loading.

mod apply;
mod capture;
mod environment;
mod placement;

pub use apply::{ApplyEngine, ApplyOptions, ApplyReport, ApplyWarning, Reconciled};
pub use capture::CaptureEngine;
pub use environment::{EnvironmentApplier, EnvironmentChange};
pub use placement::{PlacementBounds, PlacementRules};
