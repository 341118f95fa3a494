//! Units of measure

use serde::{Deserialize, Serialize};

/// A unit of measure (kilograms, liters, units...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Unit {
    #[serde(rename = "idUnidadMedida")]
    pub id: i64,
    #[serde(rename = "denominacion")]
    pub name: String,
}

/// Payload for creating or updating a unit of measure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnitRequest {
    #[serde(rename = "denominacion")]
    pub name: String,
}
