use serde::{Deserialize, Serialize};

/// Mean Earth radius used by web-map engines for mercator math (meters).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;
/// Circumference of the mean-radius sphere (meters).
pub const EARTH_CIRCUMFERENCE_M: f64 = 2.0 * std::f64::consts::PI * EARTH_RADIUS_M;

/// Geographic position in degrees.
///
/// Serialized as a `[lng, lat]` pair, the way map styles and configs write it.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl From<[f64; 2]> for LngLat {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(v: LngLat) -> Self {
        [v.lng, v.lat]
    }
}

pub fn circumference_at_latitude(lat_deg: f64) -> f64 {
    EARTH_CIRCUMFERENCE_M * lat_deg.to_radians().cos()
}

pub fn mercator_x_from_lng(lng_deg: f64) -> f64 {
    (180.0 + lng_deg) / 360.0
}

pub fn mercator_y_from_lat(lat_deg: f64) -> f64 {
    let lat = lat_deg.to_radians();
    (180.0 - (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln().to_degrees()) / 360.0
}

pub fn mercator_z_from_altitude(altitude_m: f64, lat_deg: f64) -> f64 {
    altitude_m / circumference_at_latitude(lat_deg)
}

pub fn lat_from_mercator_y(y: f64) -> f64 {
    let y2 = 180.0 - y * 360.0;
    (y2.to_radians().exp().atan()).to_degrees() * 2.0 - 90.0
}

/// Scale factor of the mercator projection at a latitude.
pub fn mercator_scale(lat_deg: f64) -> f64 {
    1.0 / lat_deg.to_radians().cos()
}

/// Position in the map engine's normalized mercator space.
///
/// The whole world spans `[0, 1]` on x and y (y grows southwards); z is the
/// altitude in the same units at the coordinate's latitude.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MercatorCoordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl MercatorCoordinate {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_lng_lat(lng_lat: LngLat, altitude_m: f64) -> Self {
        Self::new(
            mercator_x_from_lng(lng_lat.lng),
            mercator_y_from_lat(lng_lat.lat),
            mercator_z_from_altitude(altitude_m, lng_lat.lat),
        )
    }

    pub fn to_lng_lat(self) -> LngLat {
        LngLat::new(self.x * 360.0 - 180.0, lat_from_mercator_y(self.y))
    }

    /// Number of mercator units covering one meter at this coordinate.
    pub fn meter_in_mercator_units(self) -> f64 {
        (1.0 / EARTH_CIRCUMFERENCE_M) * mercator_scale(lat_from_mercator_y(self.y))
    }

    pub fn as_vec3(self) -> super::Vec3 {
        super::Vec3::new(self.x, self.y, self.z)
    }
}
