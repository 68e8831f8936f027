use std::collections::HashSet;

/// Locations accepted when no allow-list is configured.
pub const DEFAULT_LOCATIONS: &[&str] = &[
    "Albuquerque, New Mexico",
    "Carlsbad, California",
    "Chula Vista, California",
    "Colorado Springs, Colorado",
    "Denver, Colorado",
    "El Cajon, California",
    "El Paso, Texas",
    "Escondido, California",
    "Fresno, California",
    "La Mesa, California",
    "Las Vegas, Nevada",
    "Los Angeles, California",
    "Oceanside, California",
    "Phoenix, Arizona",
    "Sacramento, California",
    "Salt Lake City, Utah",
    "Salt Lake City, Utah",
    "San Diego, California",
    "Tucson, Arizona",
];

/// Closed set of location strings, fixed once the service starts.
#[derive(Clone, Debug, PartialEq)]
pub struct LocationAllowList {
    locations: HashSet<String>,
}

impl LocationAllowList {
    pub fn new<I, S>(locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LocationAllowList {
            locations: locations.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact, case-sensitive membership.
    pub fn contains(&self, location: &str) -> bool {
        self.locations.contains(location)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl Default for LocationAllowList {
    fn default() -> Self {
        LocationAllowList::new(DEFAULT_LOCATIONS.iter().copied())
    }
}
