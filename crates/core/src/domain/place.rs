use serde::{Deserialize, Serialize};

pub const UNKNOWN_PLACE_NAME: &str = "Unknown Spot";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
    #[serde(rename = "link")]
    pub external_link: String,
}

impl Place {
    /// Maps a raw venue into the reply shape. Blank names become
    /// [`UNKNOWN_PLACE_NAME`] and the link is synthesized from the coordinates.
    pub fn from_venue(name: Option<&str>, latitude: f64, longitude: f64) -> Self {
        let name = name
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(UNKNOWN_PLACE_NAME)
            .to_string();

        Self { name, latitude, longitude, external_link: map_link(latitude, longitude) }
    }
}

pub fn map_link(latitude: f64, longitude: f64) -> String {
    format!(
        "https://www.openstreetmap.org/?mlat={latitude}&mlon={longitude}#map=18/{latitude}/{longitude}"
    )
}

#[cfg(test)]
mod tests {
    use super::{Place, UNKNOWN_PLACE_NAME};

    #[test]
    fn missing_or_blank_name_becomes_unknown_spot() {
        assert_eq!(Place::from_venue(None, 1.0, 2.0).name, UNKNOWN_PLACE_NAME);
        assert_eq!(Place::from_venue(Some("   "), 1.0, 2.0).name, UNKNOWN_PLACE_NAME);
        assert_eq!(Place::from_venue(Some("Luigi's"), 1.0, 2.0).name, "Luigi's");
    }

    #[test]
    fn link_points_at_venue_coordinates() {
        let place = Place::from_venue(Some("Cafe"), 21.5, 72.25);

        assert_eq!(
            place.external_link,
            "https://www.openstreetmap.org/?mlat=21.5&mlon=72.25#map=18/21.5/72.25"
        );
    }

    #[test]
    fn serializes_with_short_wire_names() {
        let value = serde_json::to_value(Place::from_venue(Some("Cafe"), 1.0, 2.0))
            .expect("serialize place");

        assert_eq!(value["name"], "Cafe");
        assert_eq!(value["lat"], 1.0);
        assert_eq!(value["lon"], 2.0);
        assert!(value["link"].as_str().is_some_and(|link| link.contains("mlat=1")));
    }
}
