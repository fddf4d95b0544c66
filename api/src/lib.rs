//! HTTP command intake.
//!
//! Two endpoints, one per setpoint, mirroring what the dashboard posts:
//! `POST /set-temperature {"temperature": <number|string>}` and
//! `POST /set-humidity {"humidity": <number|string>}`. A missing or null
//! value is a 400; a failed submission is a 500; CORS is wide open so the
//! dashboard can be served from anywhere. `GET /metrics` exposes the
//! Prometheus registry when enabled.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{ApiServer, ApiState};
