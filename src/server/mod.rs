//! HTTP trigger
//!
//! Endpoints:
//! - `GET /health` - liveness
//! - `GET /` - run a scan and return the HTML report
//! - `GET /api/scan` - run a scan and return the JSON document
//!
//! Every request runs an independent scan; nothing is cached.

mod scan_server;
pub mod handlers;
mod types;

pub use scan_server::{router, ScanServer};
pub use types::{ApiResponse, Empty};
