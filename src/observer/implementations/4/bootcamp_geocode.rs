// Ring 4: resolve a submitted address into the stored location
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::database::schema::Collection;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{EnrichmentObserver, Observer, ObserverRing};
use crate::services::geocoder::GeoLocation;
use crate::types::Operation;

#[derive(Default)]
pub struct BootcampGeocode;

/// GeoJSON point plus the address parts kept on a bootcamp
pub fn location_document(location: &GeoLocation) -> Value {
    json!({
        "type": "Point",
        "coordinates": [location.longitude, location.latitude],
        "formattedAddress": location.formatted_address,
        "street": location.street,
        "city": location.city,
        "state": location.state,
        "zipcode": location.zipcode,
        "country": location.country,
    })
}

impl Observer for BootcampGeocode {
    fn name(&self) -> &'static str {
        "BootcampGeocode"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Enrichment
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: Collection) -> bool {
        collection == Collection::Bootcamps
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(10)
    }
}

#[async_trait]
impl EnrichmentObserver for BootcampGeocode {
    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        // The raw address is never stored
        let Some(address) = ctx.record.remove("address") else {
            return Ok(());
        };
        let Some(address) = address.as_str().map(str::trim).filter(|a| !a.is_empty()) else {
            return Ok(());
        };

        let location = ctx.services.geocoder.geocode(address).await.map_err(|e| {
            tracing::warn!("Geocoding '{}' failed: {}", address, e);
            ObserverError::BusinessError(format!("Could not geocode address '{}'", address))
        })?;
        ctx.set("location", location_document(&location));
        Ok(())
    }
}
