//! URL builders for the NWS points API and RIDGE still images.
//!
//! Plain string substitution. Nothing here validates coordinates or station
//! ids; a malformed input produces a malformed URL that fails at fetch time.

/// National Weather Service API base URL
pub const NWS_API_BASE: &str = "https://api.weather.gov";

/// Base for RIDGE standard reflectivity stills
pub const RIDGE_STANDARD_BASE: &str = "https://radar.weather.gov/ridge/standard";

/// User agent for all outbound requests; api.weather.gov rejects anonymous clients.
pub const USER_AGENT: &str = concat!("radar-nowcast/", env!("CARGO_PKG_VERSION"));

pub fn points_url(latitude: &str, longitude: &str) -> String {
    points_url_at(NWS_API_BASE, latitude, longitude)
}

pub fn points_url_at(base: &str, latitude: &str, longitude: &str) -> String {
    format!("{}/points/{},{}", base.trim_end_matches('/'), latitude, longitude)
}

pub fn radar_image_url(station: &str) -> String {
    radar_image_url_at(RIDGE_STANDARD_BASE, station)
}

pub fn radar_image_url_at(base: &str, station: &str) -> String {
    format!("{}/{}_0.gif", base.trim_end_matches('/'), station)
}
