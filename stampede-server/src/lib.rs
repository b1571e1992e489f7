//! Stampede server
//!
//! Wires configuration, the engine connector and the REST router together
//! and runs the HTTP listener until a shutdown signal arrives.

pub mod startup;

pub use startup::{build_connector, dispatch_settings, shutdown_signal, Server};
