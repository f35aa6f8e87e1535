//! In-memory driver backends.
//!
//! [`MockDriver`] is a scripted DOM for unit tests of probes and the wait
//! engine. [`SimulatedCarList`] models the car list application itself
//! (fixture, filter, sort, edit, create, render latency and stale handles) so
//! the full scenario catalog can run without a browser or HTTP server.

pub mod car_list;
mod driver;

pub use car_list::{CarRecord, SimulatedCarList, SimulationTiming};
pub use driver::{MockDriver, MockElement};
