//! Location parsing and cache-key normalization.
//!
//! Raw user input like "Cleveland, GA" or "Paris, France" is parsed into
//! city/region/country components for geocoder result filtering, and
//! normalized into a cache key that keeps differently-qualified inputs
//! from colliding (two cities sharing a name in different countries must
//! never share an entry).

/// U.S. state abbreviations and their full names.
const US_STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
    ("DC", "District of Columbia"),
];

/// Common country-name variations, normalized to the names the geocoding
/// provider reports.
const COUNTRY_VARIATIONS: &[(&str, &str)] = &[
    ("us", "United States"),
    ("usa", "United States"),
    ("u.s.", "United States"),
    ("u.s.a.", "United States"),
    ("united states of america", "United States"),
    ("uk", "United Kingdom"),
    ("u.k.", "United Kingdom"),
    ("gb", "United Kingdom"),
    ("uae", "United Arab Emirates"),
    ("u.a.e.", "United Arab Emirates"),
    ("ca", "Canada"),
    ("can", "Canada"),
];

fn state_name_for_abbr(abbr: &str) -> Option<&'static str> {
    let upper = abbr.to_uppercase();
    US_STATES
        .iter()
        .find(|(a, _)| *a == upper)
        .map(|(_, name)| *name)
}

fn state_abbr_for_name(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    US_STATES
        .iter()
        .find(|(_, n)| n.to_lowercase() == lower)
        .map(|(a, _)| *a)
}

fn normalize_country(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    COUNTRY_VARIATIONS
        .iter()
        .find(|(variant, _)| *variant == lower)
        .map(|(_, canonical)| *canonical)
}

/// Parsed form of a raw location input.
///
/// `region` carries a U.S. state abbreviation when one was recognized;
/// `country` is normalized through [`COUNTRY_VARIATIONS`]. Either may be
/// absent for bare city names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuery {
    pub city: String,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl LocationQuery {
    /// Parse a raw input into city, region, and country components.
    ///
    /// Recognized formats: "City", "City, Country", "City, State" (U.S.
    /// state abbreviation or full name, implying country "United
    /// States"), and "City, State, Country". Anything after a third
    /// comma is folded into the country.
    pub fn parse(raw: &str) -> Self {
        let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
        let city = parts[0].to_string();

        match parts.len() {
            0 | 1 => Self {
                city,
                region: None,
                country: None,
            },
            2 => {
                let second = parts[1];
                if state_name_for_abbr(second).is_some() {
                    Self {
                        city,
                        region: Some(second.to_uppercase()),
                        country: Some("United States".to_string()),
                    }
                } else if let Some(abbr) = state_abbr_for_name(second) {
                    Self {
                        city,
                        region: Some(abbr.to_string()),
                        country: Some("United States".to_string()),
                    }
                } else if let Some(canonical) = normalize_country(second) {
                    Self {
                        city,
                        region: None,
                        country: Some(canonical.to_string()),
                    }
                } else {
                    Self {
                        city,
                        region: None,
                        country: Some(second.to_string()),
                    }
                }
            }
            _ => {
                let region = state_abbr_for_name(parts[1])
                    .map(str::to_string)
                    .unwrap_or_else(|| parts[1].to_string());
                let country = if parts.len() > 3 {
                    parts[2..].join(", ")
                } else {
                    normalize_country(parts[2])
                        .map(str::to_string)
                        .unwrap_or_else(|| parts[2].to_string())
                };
                Self {
                    city,
                    region: Some(region),
                    country: Some(country),
                }
            }
        }
    }

    /// Whether the caller explicitly qualified the city with a region or
    /// country.
    pub fn is_qualified(&self) -> bool {
        self.region.is_some() || self.country.is_some()
    }

    /// Whether the query targets the United States.
    pub fn is_us(&self) -> bool {
        self.country
            .as_deref()
            .is_some_and(|c| c.to_lowercase().contains("united states"))
    }

    /// Full state name for the region qualifier, when it is a known
    /// U.S. state.
    pub fn region_full_name(&self) -> Option<&'static str> {
        self.region.as_deref().and_then(state_name_for_abbr)
    }
}

/// Normalize a raw location input into a cache key.
///
/// Trims, lowercases, and replaces every run of commas and whitespace
/// with a single underscore: "Vancouver, Canada" → "vancouver_canada".
/// Diacritics are kept as-is — ASCII folding would collide
/// visually-distinct names (e.g. "Málaga" vs "Malaga" resolve the same
/// only if the provider says so, not because we flattened the key).
pub fn cache_key(raw: &str) -> String {
    let mut key = String::with_capacity(raw.len());
    let mut pending_separator = false;
    for c in raw.trim().to_lowercase().chars() {
        if c == ',' || c.is_whitespace() {
            pending_separator = !key.is_empty();
        } else {
            if pending_separator {
                key.push('_');
                pending_separator = false;
            }
            key.push(c);
        }
    }
    key
}
