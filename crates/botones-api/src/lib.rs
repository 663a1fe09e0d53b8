//! botones-api — typed client for the fixed set of public HTTP services the
//! bot consumes: geocoding + weather (open-meteo), dictionary lookups
//! (dictionaryapi.dev), translation (MyMemory), URL shortening (is.gd),
//! QR rendering (goqr) and page screenshots (s-shot).
//!
//! All endpoints are keyless and read-only. Every call carries a bounded
//! timeout, and failures are typed: transport/status/decode errors are never
//! confused with a structured "no result" ([`ApiError::NoMatch`]), which is
//! the only condition that triggers an alternate-parameter retry.

pub mod client;
pub mod error;
pub mod lookup;
pub mod weather;
pub mod web;

pub use client::ApiClient;
pub use error::{ApiError, Result};
pub use lookup::{DictionaryEntry, Translation};
pub use weather::{weather_code_description, WeatherReport};
