//! Track and playlist models plus the small formatting helpers the views
//! need (ISO-8601 durations, HTML entities in titles).

mod display;
mod duration;
mod model;

pub use display::decode_html_entities;
pub use duration::{format_seconds, parse_iso8601_seconds};
pub use model::*;

#[cfg(test)]
mod tests;
