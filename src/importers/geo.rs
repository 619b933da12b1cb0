/// Station position parsed from the combined `Latlong` column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Map search link for this point, used when no map reference exists for a date
    pub fn maps_url(&self) -> String {
        format!(
            "https://www.google.com/maps?q={},{}",
            self.latitude, self.longitude
        )
    }
}

/// Parse `"lat,long"` text; extra comma-separated parts are ignored
pub fn parse_latlong(text: &str) -> Option<GeoPoint> {
    let mut parts = text.split(',');
    let latitude = parse_coordinate(parts.next()?)?;
    let longitude = parse_coordinate(parts.next()?)?;
    Some(GeoPoint {
        latitude,
        longitude,
    })
}

fn parse_coordinate(part: &str) -> Option<f64> {
    part.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_latlong_valid() {
        assert_eq!(
            parse_latlong("-0.5,117.1"),
            Some(GeoPoint {
                latitude: -0.5,
                longitude: 117.1
            })
        );
        assert_eq!(
            parse_latlong(" 0.1 , 117.2 "),
            Some(GeoPoint {
                latitude: 0.1,
                longitude: 117.2
            })
        );
    }

    #[test]
    fn test_parse_latlong_ignores_extra_parts() {
        let point = parse_latlong("-0.5,117.1,25").unwrap();
        assert_eq!(point.latitude, -0.5);
        assert_eq!(point.longitude, 117.1);
    }

    #[test]
    fn test_parse_latlong_invalid() {
        assert_eq!(parse_latlong(""), None);
        assert_eq!(parse_latlong("abc"), None);
        assert_eq!(parse_latlong("-0.5"), None);
        assert_eq!(parse_latlong("-0.5,"), None);
        assert_eq!(parse_latlong("north,117.1"), None);
    }

    #[test]
    fn test_maps_url() {
        let point = GeoPoint {
            latitude: 0.1,
            longitude: 117.2,
        };
        assert_eq!(point.maps_url(), "https://www.google.com/maps?q=0.1,117.2");
    }
}
