//! Listing categories and their property ID namespaces

use common::property_id::PropertyPrefix;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::Error;

/// Kind of listing; each kind owns one property ID prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ListingCategory {
    CommercialRentPlot,
    CommercialSalePlot,
    ResidentialRentApartment,
    ResidentialSaleApartment,
    ResidentialPg,
}

/// Initial layout of the `media` section of a new document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaLayout {
    /// Photo buckets per room kind, documents and a video tour
    Apartment,
    /// Flat photo and video lists
    Flat,
}

impl ListingCategory {
    pub const ALL: [ListingCategory; 5] = [
        ListingCategory::CommercialRentPlot,
        ListingCategory::CommercialSalePlot,
        ListingCategory::ResidentialRentApartment,
        ListingCategory::ResidentialSaleApartment,
        ListingCategory::ResidentialPg,
    ];

    /// Path segment used in routes and stored with each record
    pub fn slug(&self) -> &'static str {
        match self {
            ListingCategory::CommercialRentPlot => "commercial-rent-plot",
            ListingCategory::CommercialSalePlot => "commercial-sale-plot",
            ListingCategory::ResidentialRentApartment => "residential-rent-apartment",
            ListingCategory::ResidentialSaleApartment => "residential-sale-apartment",
            ListingCategory::ResidentialPg => "residential-pg",
        }
    }

    fn prefix_str(&self) -> &'static str {
        match self {
            ListingCategory::CommercialRentPlot => "RA-COMREPL",
            ListingCategory::CommercialSalePlot => "RA-COMSEPL",
            ListingCategory::ResidentialRentApartment => "RA-RESREAP",
            ListingCategory::ResidentialSaleApartment => "RA-RESSEAP",
            ListingCategory::ResidentialPg => "RA-RESPGMN",
        }
    }

    /// Property ID prefix for this category
    pub fn prefix(&self) -> Result<PropertyPrefix, Error> {
        PropertyPrefix::new(self.prefix_str()).map_err(|reason| Error::Internal {
            message: format!("invalid prefix for {self}: {reason}"),
        })
    }

    /// Commercial listings must name their creator
    pub fn requires_creator(&self) -> bool {
        matches!(
            self,
            ListingCategory::CommercialRentPlot | ListingCategory::CommercialSalePlot
        )
    }

    pub fn media_layout(&self) -> MediaLayout {
        match self {
            ListingCategory::ResidentialRentApartment
            | ListingCategory::ResidentialSaleApartment => MediaLayout::Apartment,
            _ => MediaLayout::Flat,
        }
    }

    /// Human label used in response messages
    pub fn label(&self) -> &'static str {
        match self {
            ListingCategory::CommercialRentPlot => "Commercial rent plot",
            ListingCategory::CommercialSalePlot => "Commercial sale plot",
            ListingCategory::ResidentialRentApartment => "Rent apartment",
            ListingCategory::ResidentialSaleApartment => "Sale apartment",
            ListingCategory::ResidentialPg => "PG",
        }
    }
}

impl fmt::Display for ListingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ListingCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.slug() == s)
            .ok_or_else(|| Error::not_found(format!("listing category {s}")))
    }
}
