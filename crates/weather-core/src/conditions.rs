//! WMO condition-code vocabulary and the wind compass.

/// WMO weather interpretation codes and their plain-English descriptions.
///
/// Codes outside this table are reported as `Unknown (<code>)` rather
/// than failing the call.
const WEATHER_CODES: &[(u16, &str)] = &[
    (0, "Clear sky"),
    (1, "Mainly clear"),
    (2, "Partly cloudy"),
    (3, "Overcast"),
    (45, "Foggy"),
    (48, "Depositing rime fog"),
    (51, "Light drizzle"),
    (53, "Moderate drizzle"),
    (55, "Dense drizzle"),
    (61, "Slight rain"),
    (63, "Moderate rain"),
    (65, "Heavy rain"),
    (71, "Slight snow"),
    (73, "Moderate snow"),
    (75, "Heavy snow"),
    (77, "Snow grains"),
    (80, "Slight rain showers"),
    (81, "Moderate rain showers"),
    (82, "Violent rain showers"),
    (85, "Slight snow showers"),
    (86, "Heavy snow showers"),
    (95, "Thunderstorm"),
    (96, "Thunderstorm with slight hail"),
    (99, "Thunderstorm with heavy hail"),
];

/// Cardinal direction labels, clockwise from north in 22.5° steps.
const WIND_DIRECTIONS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Translate a WMO weather code into a human-readable description.
pub fn describe_weather_code(code: u16) -> String {
    WEATHER_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, desc)| (*desc).to_string())
        .unwrap_or_else(|| format!("Unknown ({code})"))
}

/// Convert a wind bearing in degrees to one of 16 cardinal labels.
///
/// The circle is split into 16 sectors of 22.5° centered on the labels,
/// so N covers 348.75°–11.25°. A bearing exactly on a sector boundary
/// rounds up into the clockwise sector (11.25° is NNE). Bearings outside
/// 0–360 are labeled "Unknown".
pub fn wind_direction(degrees: f64) -> &'static str {
    if !(0.0..=360.0).contains(&degrees) {
        return "Unknown";
    }
    let idx = ((degrees + 11.25) / 22.5) as usize % 16;
    WIND_DIRECTIONS[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_translate() {
        assert_eq!(describe_weather_code(0), "Clear sky");
        assert_eq!(describe_weather_code(2), "Partly cloudy");
        assert_eq!(describe_weather_code(95), "Thunderstorm");
        assert_eq!(describe_weather_code(99), "Thunderstorm with heavy hail");
    }

    #[test]
    fn unknown_codes_fall_back_without_failing() {
        assert_eq!(describe_weather_code(42), "Unknown (42)");
        assert_eq!(describe_weather_code(100), "Unknown (100)");
    }

    #[test]
    fn sector_centers_map_to_their_labels() {
        let centers = [
            (0.0, "N"),
            (22.5, "NNE"),
            (45.0, "NE"),
            (67.5, "ENE"),
            (90.0, "E"),
            (112.5, "ESE"),
            (135.0, "SE"),
            (157.5, "SSE"),
            (180.0, "S"),
            (202.5, "SSW"),
            (225.0, "SW"),
            (247.5, "WSW"),
            (270.0, "W"),
            (292.5, "WNW"),
            (315.0, "NW"),
            (337.5, "NNW"),
        ];
        for (degrees, expected) in centers {
            assert_eq!(wind_direction(degrees), expected, "at {degrees}°");
        }
    }

    #[test]
    fn boundaries_round_up_clockwise() {
        // 11.25° is the N/NNE boundary and belongs to NNE.
        assert_eq!(wind_direction(11.25), "NNE");
        assert_eq!(wind_direction(11.24), "N");
        // The top of the circle wraps back to N.
        assert_eq!(wind_direction(348.75), "N");
        assert_eq!(wind_direction(360.0), "N");
    }

    #[test]
    fn out_of_range_bearings_are_unknown() {
        assert_eq!(wind_direction(-1.0), "Unknown");
        assert_eq!(wind_direction(360.5), "Unknown");
    }
}
