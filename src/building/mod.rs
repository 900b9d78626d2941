//! Nearby-building aggregation
//!
//! Finds the shops around a point and groups them into buildings:
//!
//! 1. Reverse-geocode the point to a locality ("서울특별시 강남구 역삼동").
//!    Failure here ends the request with [`Error::NotFound`].
//! 2. Search "{locality} {category}" for every category concurrently. A
//!    failed search counts as an empty result for that category.
//! 3. Normalize each item (strip markup, prefer the road address, unscale
//!    map coordinates) and keep those within [`NEARBY_RADIUS_METERS`].
//! 4. Group by address in first-seen order.

use crate::constants::search::{CATEGORIES, MAP_COORDINATE_SCALE, NEARBY_RADIUS_METERS};
use crate::error::{Error, Result};
use crate::geo::distance::haversine_distance;
use crate::geo::Coordinates;
use crate::provider::markup::strip_markup;
use crate::provider::{PlaceSearch, ReverseGeocoder, SearchItem};
use futures::future::join_all;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A search result resolved to a position near the query point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub category: String,
    pub address: String,
    pub location: Coordinates,
    /// Meters from the query point, rounded to 2 decimals
    pub distance: f64,
}

/// A store inside a building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub name: String,
    pub category: String,
    pub distance: f64,
}

/// Places sharing one address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub address: String,
    /// Location of the first place seen at this address
    pub location: Coordinates,
    pub stores: Vec<Store>,
}

/// Response of a nearby-buildings lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyBuildings {
    pub count: usize,
    pub radius: f64,
    pub buildings: Vec<Building>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn parse_scaled(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v / MAP_COORDINATE_SCALE)
}

/// Turn a raw search item into a [`Place`]
///
/// Returns `None` when the map coordinates cannot be parsed.
pub fn to_place(item: &SearchItem, origin: Coordinates) -> Option<Place> {
    let (Some(lon), Some(lat)) = (parse_scaled(&item.mapx), parse_scaled(&item.mapy)) else {
        warn!(
            title = %item.title,
            mapx = %item.mapx,
            mapy = %item.mapy,
            "Dropping search item with unparseable coordinates"
        );
        return None;
    };

    let location = Coordinates::new(lat, lon);
    let address = if item.road_address.trim().is_empty() {
        item.address.clone()
    } else {
        item.road_address.clone()
    };

    Some(Place {
        name: strip_markup(&item.title),
        category: item.category.clone(),
        address,
        location,
        distance: round2(haversine_distance(origin, location)),
    })
}

/// Group places by address, preserving first-seen order
///
/// Every place becomes a store of its building; duplicates are kept.
pub fn group_by_address(places: impl IntoIterator<Item = Place>) -> Vec<Building> {
    let mut buildings: IndexMap<String, Building> = IndexMap::new();

    for place in places {
        let building = buildings
            .entry(place.address.clone())
            .or_insert_with(|| Building {
                address: place.address.clone(),
                location: place.location,
                stores: Vec::new(),
            });
        building.stores.push(Store {
            name: place.name,
            category: place.category,
            distance: place.distance,
        });
    }

    buildings.into_values().collect()
}

/// Filter raw search results to the radius and group them into buildings
pub fn aggregate<'a>(
    items: impl IntoIterator<Item = &'a SearchItem>,
    origin: Coordinates,
    radius_meters: f64,
) -> NearbyBuildings {
    let places = items
        .into_iter()
        .filter_map(|item| to_place(item, origin))
        // compare the exact distance; `Place::distance` is already rounded
        .filter(|place| haversine_distance(origin, place.location) <= radius_meters);

    let buildings = group_by_address(places);
    NearbyBuildings {
        count: buildings.len(),
        radius: radius_meters,
        buildings,
    }
}

/// Runs the reverse-geocode / search / group pipeline
#[derive(Clone)]
pub struct NearbyBuildingFinder {
    reverse: Arc<dyn ReverseGeocoder>,
    search: Arc<dyn PlaceSearch>,
    radius_meters: f64,
}

impl NearbyBuildingFinder {
    /// Create a finder with the standard radius
    pub fn new(reverse: Arc<dyn ReverseGeocoder>, search: Arc<dyn PlaceSearch>) -> Self {
        Self {
            reverse,
            search,
            radius_meters: NEARBY_RADIUS_METERS,
        }
    }

    /// Search every category around `locality` concurrently
    ///
    /// Results come back in category order; failed categories are empty.
    async fn search_categories(&self, locality: &str) -> Vec<Vec<SearchItem>> {
        let searches = CATEGORIES.iter().map(|category| {
            let query = format!("{} {}", locality, category);
            async move {
                match self.search.search(&query).await {
                    Ok(items) => {
                        debug!(query = %query, results = items.len(), "Category search finished");
                        items
                    }
                    Err(e) => {
                        warn!(query = %query, error = %e, "Category search failed, treating as empty");
                        Vec::new()
                    }
                }
            }
        });

        join_all(searches).await
    }

    /// Find buildings within the radius of `origin`
    pub async fn find(&self, origin: Coordinates) -> Result<NearbyBuildings> {
        let locality = self.reverse.locality(origin).await.map_err(|e| {
            warn!(lat = origin.lat, lon = origin.lon, error = %e, "Reverse geocoding failed");
            Error::NotFound(format!("Could not resolve locality for ({}, {}): {}", origin.lat, origin.lon, e))
        })?;

        let results = self.search_categories(&locality).await;
        let response = aggregate(results.iter().flatten(), origin, self.radius_meters);

        info!(
            locality = %locality,
            candidates = results.iter().map(Vec::len).sum::<usize>(),
            buildings = response.count,
            "Nearby building lookup finished"
        );

        Ok(response)
    }
}
