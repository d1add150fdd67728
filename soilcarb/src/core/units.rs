//! Conversions for raw values sampled from geospatial products.
//!
//! The constants are kept exactly as the model was calibrated with them.

/// Bulk density of mineral soil assumed by the SOC conversion (g/cm³).
pub const SOIL_DENSITY_G_CM3: f64 = 2.65;

/// OpenLandMap organic-carbon band value (5 × g/kg) to mg/cm³.
pub fn soc_from_openlandmap(raw: f64) -> f64 {
    raw / 5.0 * 1000.0 / SOIL_DENSITY_G_CM3
}

/// MODIS land-surface temperature (scaled Kelvin, factor 0.02) to °C.
pub fn celsius_from_modis_lst(raw: f64) -> f64 {
    raw * 0.02 - 273.15
}

/// Kelvin to °C, as used for CMIP6 `tasmax` projections.
pub fn celsius_from_kelvin(kelvin: f64) -> f64 {
    kelvin - 273.15
}
