//! Place discovery glue: keyword parsing, search fan-out, deduplication.
//!
//! Thin list processing around the place collaborator; none of this feeds
//! back into the optimization pipeline beyond producing the stop list.

use std::collections::HashSet;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::traits::{PlaceProvider, Stop, TransportError};

/// A discovered point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub place_id: String,
    pub name: String,
    pub address: String,
    /// Location coordinates (lat, lng).
    pub location: (f64, f64),
}

impl Stop for Place {
    type Id = String;

    fn id(&self) -> &String {
        &self.place_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn location(&self) -> (f64, f64) {
        self.location
    }
}

/// Splits a comma-separated keyword list, trimming whitespace and dropping
/// empty entries.
pub fn parse_keywords(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_string)
        .collect()
}

/// Runs one nearby search per keyword and returns the combined candidates,
/// deduplicated by place id.
///
/// Searches fan out concurrently; any search failing at the transport level
/// fails the whole discovery. The first occurrence of a place id wins and
/// keyword order is preserved in the output.
pub fn discover<P>(
    provider: &P,
    center: (f64, f64),
    keywords: &[String],
    radius_meters: u32,
) -> Result<Vec<Place>, TransportError>
where
    P: PlaceProvider + Sync,
{
    let batches = keywords
        .par_iter()
        .map(|keyword| provider.nearby(center, keyword, radius_meters))
        .collect::<Result<Vec<_>, TransportError>>()?;

    let unique = dedupe_places(batches.into_iter().flatten().collect());
    debug!(
        keywords = keywords.len(),
        unique = unique.len(),
        "place discovery complete"
    );

    Ok(unique)
}

/// Keeps only places whose display name matches one of `names` exactly,
/// ignoring ASCII case.
pub fn filter_exact_names(places: Vec<Place>, names: &[String]) -> Vec<Place> {
    places
        .into_iter()
        .filter(|place| {
            names
                .iter()
                .any(|name| place.name.eq_ignore_ascii_case(name))
        })
        .collect()
}

fn dedupe_places(places: Vec<Place>) -> Vec<Place> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(places.len());
    for place in places {
        if seen.insert(place.place_id.clone()) {
            unique.push(place);
        }
    }
    unique
}
