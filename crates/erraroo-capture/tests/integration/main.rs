//! Integration tests for erraroo-capture
//!
//! Drives the controller through a fake host application and records every
//! envelope with an in-memory transport.


mod test_capture;
mod test_timing;
