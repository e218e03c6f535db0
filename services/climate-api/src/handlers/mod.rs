//! HTTP request handlers for the climate API.

pub mod landing;
pub mod precipitation;
pub mod stations;
pub mod tobs;
pub mod temperature;
pub mod health;
