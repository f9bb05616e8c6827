use serde::{Deserialize, Serialize};

/// A resolved geographic point with the locality name shown to the user.
///
/// The wire shape is `{lat, lon, name}`, which is also how it is stored in
/// session memory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
    #[serde(rename = "name")]
    pub display_name: String,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64, display_name: impl Into<String>) -> Self {
        Self { latitude, longitude, display_name: display_name.into() }
    }

    /// Builds a location from a geocoder label such as
    /// `"Paris, Ile-de-France, Metropolitan France, France"`, keeping only the
    /// locality before the first comma.
    pub fn from_geocoder_label(latitude: f64, longitude: f64, label: &str) -> Self {
        Self::new(latitude, longitude, locality_name(label))
    }

    pub fn has_valid_coordinates(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

pub fn locality_name(label: &str) -> String {
    label.split(',').next().unwrap_or_default().trim().to_string()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    New,
    Remembered,
    Default,
}

impl LocationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Remembered => "remembered",
            Self::Default => "default",
        }
    }
}
