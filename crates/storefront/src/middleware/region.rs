//! Country-code path prefix resolution.
//!
//! Every storefront page lives under `/{country_code}/...`. The prefix picks
//! the pricing region; a country no region serves is a 404.

use std::collections::HashMap;

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::error::AppError;
use crate::medusa::{MedusaError, Region};
use crate::state::AppState;

/// The region resolved from the URL's country code.
#[derive(Debug, Clone)]
pub struct CurrentRegion {
    /// Lowercase country code from the URL.
    pub country_code: String,
    /// Region serving that country.
    pub region: Region,
}

impl CurrentRegion {
    /// Prefix a path with this request's country code.
    #[must_use]
    pub fn href(&self, path: &str) -> String {
        format!("/{}{}", self.country_code, path)
    }

    /// Lowercase ISO codes of the countries in this region.
    #[must_use]
    pub fn country_codes(&self) -> Vec<String> {
        self.region
            .countries
            .iter()
            .map(|c| c.iso_2.to_ascii_lowercase())
            .collect()
    }
}

impl FromRequestParts<AppState> for CurrentRegion {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let country_code = params
            .get("country_code")
            .map(|c| c.to_ascii_lowercase())
            .ok_or_else(|| AppError::NotFound("country code".to_string()))?;

        match state.medusa().region_for_country(&country_code).await {
            Ok(region) => Ok(Self {
                country_code,
                region,
            }),
            Err(MedusaError::NotFound(_)) => {
                Err(AppError::NotFound(format!("country {country_code}")))
            }
            Err(e) => Err(e.into()),
        }
    }
}
