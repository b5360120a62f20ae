//! Delivery partners and their last reported location.
//!
//! Only the latest position is kept per partner. Readers see it through
//! [`LocationView`], which hides positions older than the staleness window.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::catalog::row_id;
use super::{PasswordHash, PersonName, Phone};

row_id!(
    /// Database identifier of a delivery partner.
    PartnerId
);

/// Validation errors for reported coordinates.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GeoPointValidationError {
    #[error("latitude must be between -90 and 90, got {0}")]
    Latitude(f64),
    #[error("longitude must be between -180 and 180, got {0}")]
    Longitude(f64),
}

/// WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Validate a coordinate pair.
    ///
    /// # Examples
    /// ```
    /// use sresta_backend::domain::GeoPoint;
    ///
    /// assert!(GeoPoint::new(17.385, 78.4867).is_ok());
    /// assert!(GeoPoint::new(91.0, 0.0).is_err());
    /// ```
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoPointValidationError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoPointValidationError::Latitude(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoPointValidationError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Last position a partner reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PartnerLocation {
    pub point: GeoPoint,
    pub updated_at: DateTime<Utc>,
}

/// Location as shown to shoppers and admins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LocationView {
    /// Fresh position.
    Available {
        latitude: f64,
        longitude: f64,
        #[serde(rename = "lastUpdated")]
        last_updated: DateTime<Utc>,
    },
    /// Never reported, or older than the staleness window.
    Unavailable,
}

impl LocationView {
    /// Build the view of `location` as of `now`.
    ///
    /// A position exactly `stale_after` old is still shown.
    pub fn at(location: Option<&PartnerLocation>, now: DateTime<Utc>, stale_after: Duration) -> Self {
        match location {
            Some(location) if now.signed_duration_since(location.updated_at) <= stale_after => {
                Self::Available {
                    latitude: location.point.latitude(),
                    longitude: location.point.longitude(),
                    last_updated: location.updated_at,
                }
            }
            _ => Self::Unavailable,
        }
    }
}

/// Courier account that can be assigned orders.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DeliveryPartner {
    pub id: PartnerId,
    pub name: PersonName,
    pub phone: Phone,
    pub is_available: bool,
    pub current_location: Option<PartnerLocation>,
}

/// Partner registration once the password has been hashed.
#[derive(Debug, Clone)]
pub struct NewPartner {
    pub name: PersonName,
    pub phone: Phone,
    pub password_hash: PasswordHash,
}

/// Partner row paired with its password hash for login checks.
#[derive(Debug, Clone)]
pub struct PartnerCredentials {
    pub partner: DeliveryPartner,
    pub password_hash: PasswordHash,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn at_minute(minute: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::minutes(minute)
    }

    #[rstest]
    #[case(-90.0, 180.0)]
    #[case(90.0, -180.0)]
    #[case(0.0, 0.0)]
    fn accepts_boundary_coordinates(#[case] lat: f64, #[case] lng: f64) {
        assert!(GeoPoint::new(lat, lng).is_ok());
    }

    #[rstest]
    #[case(-90.5, 0.0, GeoPointValidationError::Latitude(-90.5))]
    #[case(0.0, 180.5, GeoPointValidationError::Longitude(180.5))]
    fn rejects_out_of_range(
        #[case] lat: f64,
        #[case] lng: f64,
        #[case] expected: GeoPointValidationError,
    ) {
        assert_eq!(GeoPoint::new(lat, lng).expect_err("invalid"), expected);
    }

    #[rstest]
    fn rejects_nan() {
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
    }

    #[rstest]
    #[case(0, true)]
    #[case(10, true)]
    #[case(11, false)]
    fn staleness_window(#[case] age_minutes: i64, #[case] fresh: bool) {
        let location = PartnerLocation {
            point: GeoPoint::new(17.44, 78.38).expect("point"),
            updated_at: at_minute(0),
        };
        let view = LocationView::at(Some(&location), at_minute(age_minutes), Duration::minutes(10));
        assert_eq!(matches!(view, LocationView::Available { .. }), fresh);
    }

    #[rstest]
    fn never_reported_is_unavailable() {
        let view = LocationView::at(None, at_minute(0), Duration::minutes(10));
        assert_eq!(view, LocationView::Unavailable);
    }

    #[rstest]
    fn serialises_status_tag() {
        let location = PartnerLocation {
            point: GeoPoint::new(17.44, 78.38).expect("point"),
            updated_at: at_minute(0),
        };
        let fresh = LocationView::at(Some(&location), at_minute(1), Duration::minutes(10));
        let value = serde_json::to_value(fresh).expect("serialise view");
        assert_eq!(value["status"], "available");
        assert_eq!(value["latitude"], 17.44);
        assert!(value.get("lastUpdated").is_some());

        let stale = serde_json::to_value(LocationView::Unavailable).expect("serialise view");
        assert_eq!(stale, serde_json::json!({ "status": "unavailable" }));
    }
}
