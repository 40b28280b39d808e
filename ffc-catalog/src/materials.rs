use serde::{Deserialize, Serialize};
use std::fmt;

/// Filament the shop prints with
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Material {
    #[serde(rename = "PLA")]
    Pla,
    #[serde(rename = "PLA+")]
    PlaPlus,
    #[serde(rename = "PETG")]
    Petg,
}

impl Material {
    pub fn as_str(&self) -> &'static str {
        match self {
            Material::Pla => "PLA",
            Material::PlaPlus => "PLA+",
            Material::Petg => "PETG",
        }
    }

    /// Spelling the print vendor's API expects in quote requests.
    pub fn vendor_code(&self) -> &'static str {
        match self {
            Material::Pla | Material::PlaPlus => "pla",
            Material::Petg => "petg",
        }
    }

    /// Parse the stored wire spelling back into the enum.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "PLA" => Some(Material::Pla),
            "PLA+" => Some(Material::PlaPlus),
            "PETG" => Some(Material::Petg),
            _ => None,
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Organizer footprint classes the quoting tables are keyed on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SizeClass {
    #[serde(rename = "small")]
    Small,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "full drawer")]
    FullDrawer,
}

impl SizeClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeClass::Small => "small",
            SizeClass::Medium => "medium",
            SizeClass::FullDrawer => "full drawer",
        }
    }

    /// Parse the stored wire spelling back into the enum.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "small" => Some(SizeClass::Small),
            "medium" => Some(SizeClass::Medium),
            "full drawer" => Some(SizeClass::FullDrawer),
            _ => None,
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who prints the order: the shop itself or the cloud print vendor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FulfillmentMode {
    #[serde(rename = "SELF")]
    SelfPrint,
    #[serde(rename = "CLOUD")]
    Cloud,
}

impl FulfillmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentMode::SelfPrint => "SELF",
            FulfillmentMode::Cloud => "CLOUD",
        }
    }

    /// Parse an operator- or store-supplied mode string. Case-insensitive.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SELF" => Some(FulfillmentMode::SelfPrint),
            "CLOUD" => Some(FulfillmentMode::Cloud),
            _ => None,
        }
    }
}

impl fmt::Display for FulfillmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
