//! Erraroo Core - Domain logic for client-side error reporting
//!
//! This crate contains:
//! - **Domain types** - `RawFrame`/`StackFrame`, `CapturedError`/`ErrorReport`,
//!   `LogBuffer`, `SessionId`, `RouteError`
//! - **Configuration** - `HostEnvironment`, `ReporterOptions`, `ReporterConfig`
//! - **Gate** - the one-time activation sequence and enabled decision
//! - **Port definitions** - traits for the transport and the host application
//!
//! # Architecture
//!
//! The domain module is pure: it never performs I/O. Ports define the trait
//! interfaces that the telemetry and capture crates, or the host itself,
//! implement.

pub mod config;
pub mod domain;
pub mod gate;
pub mod ports;
