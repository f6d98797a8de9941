use foundation::math::LngLat;
use serde::{Deserialize, Serialize};

use crate::components::BuildingId;

pub const DEFAULT_ORIGIN: LngLat = LngLat::new(55.366_446_152_995_36, 25.238_684_295_814_07);
pub const DEFAULT_MODEL_URL: &str = "./assets/models/ec3.glb";

/// Placement and source of the overlay model.
///
/// `rotate` holds radians about X, Y and Z. `mesh_scale` is a multiplier on
/// top of the meters-to-mercator factor at `origin`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayOptions {
    pub mesh_scale: f64,
    pub building_id: BuildingId,
    pub origin: LngLat,
    pub altitude: f64,
    pub rotate: [f64; 3],
    pub model_url: String,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            mesh_scale: 1.0,
            building_id: BuildingId::new("ec3"),
            origin: DEFAULT_ORIGIN,
            altitude: 0.0,
            rotate: [std::f64::consts::FRAC_PI_2, 0.0, std::f64::consts::FRAC_PI_2],
            model_url: DEFAULT_MODEL_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_ORIGIN, OverlayOptions};
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_place_ec3_at_the_site() {
        let o = OverlayOptions::default();
        assert_eq!(o.building_id.as_str(), "ec3");
        assert_eq!(o.origin, DEFAULT_ORIGIN);
        assert_eq!(o.mesh_scale, 1.0);
        assert_eq!(o.model_url, "./assets/models/ec3.glb");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let o: OverlayOptions =
            serde_json::from_str(r#"{"buildingId":"tower","meshScale":2.5}"#).expect("parse");
        assert_eq!(o.building_id.as_str(), "tower");
        assert_eq!(o.mesh_scale, 2.5);
        assert_eq!(o.rotate, OverlayOptions::default().rotate);
    }
}
