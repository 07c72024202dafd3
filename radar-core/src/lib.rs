//! Core library for the `radar` CLI.
//!
//! This crate defines:
//! - URL builders for the NWS points API and RIDGE still images
//! - The radar image tool (fetch, validate, base64-encode, attach guidance)
//! - Station lookup from coordinates
//! - The agent boundary and the relay that joins tool and agent
//! - Configuration & credentials handling
//!
//! It is used by `radar-cli`, but can also be reused by other binaries or services.

pub mod agent;
pub mod config;
pub mod fetch;
mod http;
pub mod model;
pub mod relay;
pub mod station;
pub mod urls;

pub use agent::{AgentId, AgentSettings, NowcastAgent};
pub use config::{AgentCredentials, Config};
pub use fetch::{RADAR_GUIDANCE, RadarImageFetcher, extract_radar_id};
pub use model::{Nowcast, RadarImage, RadarImageResult, RadarMedia, RadarRequest};
pub use relay::Relay;
pub use station::{NwsStationResolver, StaticStationResolver, StationResolver};
pub use urls::{points_url, radar_image_url};
