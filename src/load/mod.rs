//! Bulk load of the RDF feed into the graph store
//!
//! [`LoadCoordinator`] drives a single sweep: open the container, walk the
//! inner archive in order, decode each record and hand it to a
//! [`GraphStore`](crate::store::GraphStore). [`OneShotTrigger`] decides
//! whether a given invocation loads at all.

pub mod coordinator;
pub mod progress;
pub mod trigger;

pub use coordinator::{LoadCoordinator, LoadOptions, LoadOutcome, LoadReport, RunState};
pub use progress::{LoadProgress, LoadStats};
pub use trigger::{OneShotTrigger, TriggerError};
