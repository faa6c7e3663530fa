// Threshold alerts
pub mod alerts;

// Domain-specific error types
pub mod errors;

// Alert notification fan-out
pub mod events;

// Bounded price history
pub mod history;

// Port interfaces
pub mod ports;

// Core value and event types
pub mod types;
