//! Static registry of inspectable vehicles and their parts.
//!
//! The catalog is loaded once (built-in data or a JSON file) and is read-only
//! afterwards. Sessions share vehicles and part lists through `Arc` handles so a
//! running session never owns catalog data.

mod builtin;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{AppError, Result, SessionError};

pub use builtin::standard_parts;

/// Identifier of a part, unique within one vehicle's part list.
pub type PartId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineClass {
    V6,
    V7,
    V8,
}

impl EngineClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineClass::V6 => "V6",
            EngineClass::V7 => "V7",
            EngineClass::V8 => "V8",
        }
    }
}

impl fmt::Display for EngineClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartName {
    Engine,
    Transmission,
    Suspension,
    Brakes,
    Exhaust,
    Wheels,
}

impl PartName {
    pub const ALL: [PartName; 6] = [
        PartName::Engine,
        PartName::Transmission,
        PartName::Suspension,
        PartName::Brakes,
        PartName::Exhaust,
        PartName::Wheels,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PartName::Engine => "Engine",
            PartName::Transmission => "Transmission",
            PartName::Suspension => "Suspension",
            PartName::Brakes => "Brakes",
            PartName::Exhaust => "Exhaust",
            PartName::Wheels => "Wheels",
        }
    }

    /// Case-insensitive lookup by display name.
    pub fn parse(s: &str) -> Option<PartName> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for PartName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Operational status shown next to each part.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartStatus {
    #[default]
    Operational,
    Degraded,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: String,
    pub name: String,
    pub model_year: u16,
    pub engine: EngineClass,
    pub top_speed_mph: u16,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub id: PartId,
    pub name: PartName,
    pub description: String,
    #[serde(default)]
    pub status: PartStatus,
    pub default_question: String,
}

/// One vehicle together with its ordered part list.
#[derive(Clone, Debug)]
pub struct CatalogEntry {
    pub vehicle: Arc<Vehicle>,
    pub parts: Arc<[Part]>,
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

#[derive(Deserialize)]
struct CatalogFile {
    vehicles: Vec<VehicleFile>,
}

#[derive(Deserialize)]
struct VehicleFile {
    #[serde(flatten)]
    vehicle: Vehicle,
    #[serde(default)]
    parts: Option<Vec<Part>>,
}

impl Catalog {
    /// An empty catalog, for building one up with [`Catalog::with_vehicle`].
    pub fn empty() -> Self {
        Self::default()
    }

    /// The three showroom cars with the standard six parts each.
    pub fn builtin() -> Self {
        let entries = builtin::vehicles()
            .into_iter()
            .map(|vehicle| {
                let parts = standard_parts(vehicle.engine);
                CatalogEntry {
                    vehicle: Arc::new(vehicle),
                    parts: parts.into(),
                }
            })
            .collect();
        Self { entries }
    }

    /// Add a vehicle. Vehicle ids and part ids within the vehicle must be unique.
    pub fn with_vehicle(mut self, vehicle: Vehicle, parts: Vec<Part>) -> Result<Self> {
        self.insert(vehicle, parts)?;
        Ok(self)
    }

    fn insert(&mut self, vehicle: Vehicle, parts: Vec<Part>) -> Result<()> {
        if self.entries.iter().any(|e| e.vehicle.id == vehicle.id) {
            return Err(AppError::Catalog(format!(
                "duplicate vehicle id '{}'",
                vehicle.id
            )));
        }

        let mut seen = HashSet::new();
        for part in &parts {
            if !seen.insert(part.id) {
                return Err(AppError::Catalog(format!(
                    "duplicate part id {} in vehicle '{}'",
                    part.id, vehicle.id
                )));
            }
        }

        self.entries.push(CatalogEntry {
            vehicle: Arc::new(vehicle),
            parts: parts.into(),
        });
        Ok(())
    }

    /// Parse a JSON catalog. Vehicles without a `parts` list get the standard six.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let mut catalog = Self::empty();
        for entry in file.vehicles {
            let parts = entry
                .parts
                .unwrap_or_else(|| standard_parts(entry.vehicle.engine));
            catalog.insert(entry.vehicle, parts)?;
        }
        Ok(catalog)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_json_str(&content)
    }

    pub fn get_vehicle(&self, id: &str) -> std::result::Result<&Vehicle, SessionError> {
        self.entry(id).map(|e| e.vehicle.as_ref())
    }

    pub fn get_parts(&self, vehicle_id: &str) -> std::result::Result<&[Part], SessionError> {
        self.entry(vehicle_id).map(|e| e.parts.as_ref())
    }

    pub fn entry(&self, id: &str) -> std::result::Result<&CatalogEntry, SessionError> {
        self.entries
            .iter()
            .find(|e| e.vehicle.id == id)
            .ok_or_else(|| SessionError::UnknownVehicle(id.to_string()))
    }

    /// Vehicles in insertion order.
    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.entries.iter().map(|e| e.vehicle.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
