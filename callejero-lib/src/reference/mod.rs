//! Constant reference tables for Spanish regions and provinces.
//!
//! Regions are the autonomous communities and cities (`CCOM`), provinces carry the code used
//! as `cpro` throughout the street directory (`CODPRO`). Both tables are compiled in and never
//! read from a snapshot.

mod tables;

pub use tables::{PROVINCES, Province, REGIONS, Region};

/// Number of regions.
pub const REGION_COUNT: usize = 19;

/// Number of provinces.
pub const PROVINCE_COUNT: usize = 52;

/// Provinces of the given region, in code order.
pub fn provinces_in_region(region: u8) -> impl Iterator<Item = &'static Province> {
    PROVINCES.iter().filter(move |p| p.region_code() == region)
}
