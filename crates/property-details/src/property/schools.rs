use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::domain::{Coordinates, School};
use super::geo::{distance_km, round_to};
use super::tags::OsmTags;
use super::upstream::{endpoint, fetch_json, UpstreamError, UpstreamService};
use crate::config::UpstreamConfig;

/// Tags consulted, in priority order, to describe what kind of school a
/// feature is.
const SCHOOL_TYPE_KEYS: [&str; 7] = [
    "amenity:school:type",
    "school:type",
    "school_type",
    "school_level",
    "school_category",
    "education",
    "education:type",
];

/// Finds named schools around a coordinate.
#[async_trait]
pub trait SchoolsFinder: Send + Sync {
    async fn nearby_schools(&self, origin: Coordinates) -> Result<Vec<School>, UpstreamError>;
}

#[derive(Debug, Default, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct Point {
    lat: f64,
    lon: f64,
}

/// A node, way, or relation returned by an `out center;` query.
#[derive(Debug, Deserialize)]
pub struct OverpassElement {
    #[serde(rename = "type", default)]
    kind: String,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<Point>,
    #[serde(default)]
    tags: OsmTags,
}

impl OverpassElement {
    /// Nodes carry their own position; ways and relations only a center.
    fn position(&self) -> Option<Coordinates> {
        if self.kind == "node" {
            return Some(Coordinates::new(self.lat?, self.lon?));
        }
        self.center.map(|point| Coordinates::new(point.lat, point.lon))
    }
}

/// Human-readable school type derived from OSM tags.
pub fn school_type(tags: &OsmTags) -> String {
    if tags.get("amenity").as_deref() != Some("school") {
        return "Unknown".to_string();
    }

    match tags.first_of(&SCHOOL_TYPE_KEYS) {
        Some(raw) => title_case(&raw.replace('_', " ")),
        None => "General School".to_string(),
    }
}

/// Upper-case the first letter of every word and lower-case the rest. Any
/// character other than a letter, digit, or apostrophe starts a new word, so
/// multi-valued tags like `primary;secondary` capitalise each value.
fn title_case(value: &str) -> String {
    let mut titled = String::with_capacity(value.len());
    let mut word_start = true;

    for c in value.chars() {
        if c.is_alphanumeric() {
            if word_start {
                titled.extend(c.to_uppercase());
            } else {
                titled.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            titled.push(c);
            if c != '\'' {
                word_start = true;
            }
        }
    }

    titled
}

/// Placeholder rating in `[3.0, 5.0]` derived from the school name. Not real
/// data; the same name always maps to the same rating.
pub fn mock_school_rating(name: &str) -> f64 {
    let hash = name
        .chars()
        .fold(0u32, |hash, c| hash.wrapping_mul(31).wrapping_add(c as u32));
    round_to(3.0 + f64::from(hash % 20) / 10.0, 1)
}

/// Turn raw Overpass elements into schools, keeping upstream order.
pub fn schools_from_elements(origin: Coordinates, elements: &[OverpassElement]) -> Vec<School> {
    elements
        .iter()
        .filter_map(|element| {
            let name = element.tags.get("name")?;

            let Some(position) = element.position() else {
                debug!(school = %name, "skipping school without coordinates");
                return None;
            };

            if !position.is_valid() {
                debug!(
                    school = %name,
                    lat = position.lat,
                    lon = position.lon,
                    "skipping school with invalid coordinates"
                );
                return None;
            }

            Some(School {
                distance_km: distance_km(origin, position),
                rating: mock_school_rating(&name),
                kind: school_type(&element.tags),
                name,
            })
        })
        .collect()
}

/// Overpass QL for named schools within `radius_m` metres of `origin`.
pub fn school_query(origin: Coordinates, radius_m: u32) -> String {
    let around = format!("(around:{radius_m},{:.6},{:.6})", origin.lat, origin.lon);
    format!(
        "[out:json][timeout:25];\n(\n  way[\"amenity\"=\"school\"][\"name\"]{around};\n  relation[\"amenity\"=\"school\"][\"name\"]{around};\n  node[\"amenity\"=\"school\"][\"name\"]{around};\n);\nout center;"
    )
}

/// [`SchoolsFinder`] backed by the Overpass interpreter endpoint.
#[derive(Debug, Clone)]
pub struct OverpassSchoolsFinder {
    client: reqwest::Client,
    interpreter_url: String,
    radius_m: u32,
}

impl OverpassSchoolsFinder {
    pub fn new(client: reqwest::Client, config: &UpstreamConfig) -> Self {
        Self {
            client,
            interpreter_url: endpoint(&config.overpass_url, "/api/interpreter"),
            radius_m: config.school_radius_m,
        }
    }
}

#[async_trait]
impl SchoolsFinder for OverpassSchoolsFinder {
    async fn nearby_schools(&self, origin: Coordinates) -> Result<Vec<School>, UpstreamError> {
        let request = self
            .client
            .post(&self.interpreter_url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(school_query(origin, self.radius_m));

        let response: OverpassResponse = fetch_json(UpstreamService::Overpass, request).await?;
        let schools = schools_from_elements(origin, &response.elements);
        debug!(
            elements = response.elements.len(),
            schools = schools.len(),
            "resolved nearby schools"
        );
        Ok(schools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ORIGIN: Coordinates = Coordinates::new(37.7749, -122.4194);

    fn tags<const N: usize>(pairs: [(&str, &str); N]) -> OsmTags {
        pairs.into_iter().collect()
    }

    #[test]
    fn explicit_school_type_is_title_cased() {
        let school = tags([("amenity", "school"), ("school_type", "elementary")]);
        assert_eq!(school_type(&school), "Elementary");
    }

    #[test]
    fn school_level_used_when_type_missing() {
        let school = tags([("amenity", "school"), ("school_level", "secondary")]);
        assert_eq!(school_type(&school), "Secondary");
    }

    #[test]
    fn education_type_underscores_become_spaces() {
        let school = tags([("amenity", "school"), ("education:type", "high_school")]);
        assert_eq!(school_type(&school), "High School");
    }

    #[test]
    fn type_tag_outranks_education_tags() {
        let school = tags([
            ("amenity", "school"),
            ("education", "primary"),
            ("amenity:school:type", "MIDDLE_school"),
        ]);
        assert_eq!(school_type(&school), "Middle School");
    }

    #[test]
    fn multi_valued_tags_capitalise_each_value() {
        let school = tags([("amenity", "school"), ("school_level", "primary;secondary")]);
        assert_eq!(school_type(&school), "Primary;Secondary");

        let school = tags([("amenity", "school"), ("education", "pre-school/KINDERGARTEN")]);
        assert_eq!(school_type(&school), "Pre-School/Kindergarten");

        let school = tags([("amenity", "school"), ("school:type", "children's_centre")]);
        assert_eq!(school_type(&school), "Children's Centre");
    }

    #[test]
    fn school_without_detail_is_general() {
        assert_eq!(school_type(&tags([("amenity", "school")])), "General School");
    }

    #[test]
    fn non_school_is_unknown() {
        assert_eq!(school_type(&tags([("amenity", "not_school")])), "Unknown");
        assert_eq!(school_type(&OsmTags::default()), "Unknown");
    }

    #[test]
    fn rating_stays_in_range_and_is_stable() {
        for name in ["Test School", "", "Lincoln High School", "École Jules Verne"] {
            let rating = mock_school_rating(name);
            assert!((3.0..=5.0).contains(&rating), "{name}: {rating}");
            assert_eq!(rating, mock_school_rating(name));
        }
    }

    #[test]
    fn rating_follows_name_hash() {
        // "A" = 65, 65 % 20 = 5
        assert_eq!(mock_school_rating("A"), 3.5);
        assert_eq!(mock_school_rating(""), 3.0);
    }

    #[test]
    fn rating_hashes_code_points_not_bytes() {
        // 'É' is U+00C9 = 201, 201 % 20 = 1; its UTF-8 bytes would give 3.2
        assert_eq!(mock_school_rating("É"), 3.1);
        // ('É' * 31 + 'c') = 201 * 31 + 99 = 6330, 6330 % 20 = 10
        assert_eq!(mock_school_rating("Éc"), 4.0);
    }

    #[test]
    fn elements_become_schools_in_upstream_order() {
        let response: OverpassResponse = serde_json::from_value(json!({
            "elements": [
                {
                    "type": "way",
                    "center": { "lat": 37.78, "lon": -122.41 },
                    "tags": { "name": "Way School", "amenity": "school" }
                },
                {
                    "type": "node",
                    "lat": 37.7749,
                    "lon": -122.4194,
                    "tags": { "name": "Node School", "amenity": "school", "school_type": "elementary" }
                },
                {
                    "type": "node",
                    "lat": 37.7,
                    "lon": -122.4,
                    "tags": { "amenity": "school" }
                },
                {
                    "type": "relation",
                    "tags": { "name": "Centerless", "amenity": "school" }
                },
                {
                    "type": "node",
                    "lat": 0.0,
                    "lon": 0.0,
                    "tags": { "name": "Null Island Academy", "amenity": "school" }
                }
            ]
        }))
        .expect("overpass payload decodes");

        let schools = schools_from_elements(ORIGIN, &response.elements);
        let names: Vec<&str> = schools.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Way School", "Node School"]);

        assert!(schools[0].distance_km > 0.0);
        assert_eq!(schools[0].kind, "General School");
        assert_eq!(schools[1].distance_km, 0.0);
        assert_eq!(schools[1].kind, "Elementary");
        assert_eq!(schools[1].rating, mock_school_rating("Node School"));
    }

    #[test]
    fn missing_elements_decode_as_empty() {
        let response: OverpassResponse = serde_json::from_str("{}").expect("decodes");
        assert!(response.elements.is_empty());
    }

    #[test]
    fn query_targets_all_feature_kinds_within_radius() {
        let query = school_query(ORIGIN, 2000);
        assert!(query.starts_with("[out:json][timeout:25];"));
        assert!(query.contains(
            "node[\"amenity\"=\"school\"][\"name\"](around:2000,37.774900,-122.419400);"
        ));
        assert!(query.contains("way["));
        assert!(query.contains("relation["));
        assert!(query.ends_with("out center;"));
    }
}
