//! Nearby clinic lookup

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, ApiError};

const NEARBY_PATH: &str = "clinics/nearby/";

/// Search radius used when none is given
pub const DEFAULT_RADIUS_KM: f64 = 5.0;

/// Search around a point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
    /// Place category understood by the backend, e.g. "hospital" or "pharmacy"
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub place_type: Option<String>,
}

impl NearbyQuery {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            radius_km: DEFAULT_RADIUS_KM,
            place_type: None,
        }
    }

    #[must_use]
    pub fn with_radius_km(mut self, radius_km: f64) -> Self {
        self.radius_km = radius_km;
        self
    }

    #[must_use]
    pub fn with_place_type(mut self, place_type: impl Into<String>) -> Self {
        self.place_type = Some(place_type.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A clinic returned by the lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clinic {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    pub location: Coordinates,
    #[serde(default)]
    pub place_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    #[serde(default)]
    clinics: Vec<Clinic>,
}

#[derive(Debug, Clone)]
pub struct ClinicService {
    api: Arc<ApiClient>,
}

impl ClinicService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Clinics within `radius_km` of a point (5 km when `None`)
    pub async fn nearby(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: Option<f64>,
    ) -> Result<Vec<Clinic>, ApiError> {
        let query = NearbyQuery::new(latitude, longitude)
            .with_radius_km(radius_km.unwrap_or(DEFAULT_RADIUS_KM));
        self.search(&query).await
    }

    pub async fn search(&self, query: &NearbyQuery) -> Result<Vec<Clinic>, ApiError> {
        let response: NearbyResponse = self.api.post_json(NEARBY_PATH, query).await?;
        tracing::debug!("Found {} clinics within {} km", response.clinics.len(), query.radius_km);
        Ok(response.clinics)
    }
}
