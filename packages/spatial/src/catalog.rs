//! Named region polygons loaded from `GeoJSON`.

use energy_map_geography::match_state_name;
use energy_map_geography_models::states::state_names;
use energy_map_geography_models::{CONTROL_AREAS, RegionKind};
use geo::{BoundingRect as _, MultiPolygon, Rect};
use geojson::{Feature, GeoJson};

use crate::SpatialError;

/// The usable geometry of a region, or why there is none.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionShape {
    /// One or more polygons and their bounding rectangle.
    Polygons {
        /// The region's polygons.
        polygons: MultiPolygon<f64>,
        /// Bounding rectangle of all polygons.
        bbox: Rect<f64>,
    },
    /// The feature's geometry was missing or malformed.
    Invalid {
        /// What was wrong with it.
        reason: String,
    },
}

impl RegionShape {
    fn from_polygons(polygons: MultiPolygon<f64>) -> Self {
        match polygons.bounding_rect() {
            Some(bbox) => Self::Polygons { polygons, bbox },
            None => Self::invalid("empty geometry"),
        }
    }

    fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}

/// A named boundary polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Display name. A region drawn as several features has one entry per
    /// feature, all sharing this name.
    pub name: String,
    /// Geometry used for containment tests.
    pub shape: RegionShape,
}

impl Region {
    /// Creates a region from polygons. An empty `MultiPolygon` yields an
    /// invalid shape.
    #[must_use]
    pub fn from_polygons(name: impl Into<String>, polygons: MultiPolygon<f64>) -> Self {
        Self {
            name: name.into(),
            shape: RegionShape::from_polygons(polygons),
        }
    }

    /// Creates a region without usable geometry.
    #[must_use]
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: RegionShape::invalid(reason),
        }
    }

    /// Whether the region can take part in containment tests.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self.shape, RegionShape::Polygons { .. })
    }

    /// Bounding rectangle, for valid regions.
    #[must_use]
    pub const fn bbox(&self) -> Option<&Rect<f64>> {
        match &self.shape {
            RegionShape::Polygons { bbox, .. } => Some(bbox),
            RegionShape::Invalid { .. } => None,
        }
    }
}

/// An ordered set of regions of one kind.
///
/// Entries keep the order of the source document, one per feature, and
/// that order decides which region wins when polygons overlap. Features
/// sharing a name are separate entries of the same region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionCatalog {
    kind: RegionKind,
    regions: Vec<Region>,
}

impl RegionCatalog {
    /// Builds a catalog from entries in test order.
    #[must_use]
    pub const fn new(kind: RegionKind, regions: Vec<Region>) -> Self {
        Self { kind, regions }
    }

    /// Parses a `GeoJSON` `FeatureCollection`.
    ///
    /// Each feature's name is read from the first of `name_properties` that
    /// holds a non-empty string (or number). Unnamed features are skipped;
    /// features with missing or malformed geometry are kept with an
    /// [`RegionShape::Invalid`] shape.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::GeoJson`] if the text is not `GeoJSON`, or
    /// [`SpatialError::InvalidCollection`] if it is not a feature
    /// collection.
    pub fn from_geojson_str(
        kind: RegionKind,
        text: &str,
        name_properties: &[String],
    ) -> Result<Self, SpatialError> {
        let geojson: GeoJson = text.parse()?;
        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(SpatialError::InvalidCollection {
                message: "expected a FeatureCollection".to_string(),
            });
        };

        let mut regions = Vec::with_capacity(collection.features.len());

        for (index, feature) in collection.features.into_iter().enumerate() {
            let Some(name) = feature_name(&feature, name_properties) else {
                log::warn!("Skipping feature {index}: no name in {name_properties:?}");
                continue;
            };

            let shape = shape_from_geometry(feature.geometry);
            if let RegionShape::Invalid { reason } = &shape {
                log::warn!("Region '{name}' has no usable geometry: {reason}");
            }

            regions.push(Region { name, shape });
        }

        Ok(Self::new(kind, regions))
    }

    /// Which boundary set this catalog holds.
    #[must_use]
    pub const fn kind(&self) -> RegionKind {
        self.kind
    }

    /// Entries in test order. A name repeats when its region was drawn as
    /// several features.
    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Distinct region names, in order of first appearance.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regions
            .iter()
            .enumerate()
            .filter(|(i, region)| !self.regions[..*i].iter().any(|r| r.name == region.name))
            .map(|(_, region)| region.name.as_str())
    }

    /// Number of distinct regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Exact name lookup. Returns the first entry of a region drawn as
    /// several features.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// Official names of this catalog's kind that no region here answers
    /// to, in official order.
    ///
    /// Control areas must match exactly. States go through
    /// [`Self::resolve_name`], so an unaccented or abbreviated polygon name
    /// still counts.
    #[must_use]
    pub fn missing_official_names(&self) -> Vec<&'static str> {
        match self.kind {
            RegionKind::ControlArea => CONTROL_AREAS
                .iter()
                .copied()
                .filter(|name| self.by_name(name).is_none())
                .collect(),
            RegionKind::State => state_names()
                .filter(|name| self.resolve_name(name).is_none())
                .collect(),
        }
    }

    /// Looks up a region by a user-supplied name.
    ///
    /// Control areas match exactly (after trimming). States go through the
    /// state name cascade, so `"09 Ciudad de México"` finds
    /// `"Ciudad de Mexico"`.
    #[must_use]
    pub fn resolve_name(&self, name: &str) -> Option<&Region> {
        match self.kind {
            RegionKind::ControlArea => self.by_name(name.trim()),
            RegionKind::State => {
                let found = match_state_name(name, self.names())?;
                self.by_name(found.name)
            }
        }
    }
}

fn feature_name(feature: &Feature, name_properties: &[String]) -> Option<String> {
    name_properties.iter().find_map(|key| {
        let value = feature.property(key)?;
        let name = value
            .as_str()
            .map(|s| s.trim().to_string())
            .or_else(|| value.as_i64().map(|n| n.to_string()))?;
        (!name.is_empty()).then_some(name)
    })
}

fn shape_from_geometry(geometry: Option<geojson::Geometry>) -> RegionShape {
    let Some(geometry) = geometry else {
        return RegionShape::invalid("missing geometry");
    };

    if let Err(reason) = check_polygonal(&geometry.value) {
        return RegionShape::invalid(reason);
    }

    let converted: Result<geo::Geometry<f64>, _> = geometry.try_into();
    match converted {
        Ok(geo::Geometry::Polygon(polygon)) => {
            RegionShape::from_polygons(MultiPolygon(vec![polygon]))
        }
        Ok(geo::Geometry::MultiPolygon(polygons)) => RegionShape::from_polygons(polygons),
        Ok(_) => RegionShape::invalid("unsupported geometry"),
        Err(e) => RegionShape::invalid(format!("conversion failed: {e}")),
    }
}

fn check_polygonal(value: &geojson::Value) -> Result<(), String> {
    match value {
        geojson::Value::Polygon(rings) => check_rings(rings),
        geojson::Value::MultiPolygon(polygons) => {
            if polygons.is_empty() {
                return Err("empty MultiPolygon".to_string());
            }
            polygons.iter().try_for_each(|rings| check_rings(rings))
        }
        other => Err(format!(
            "unsupported geometry type {}",
            geometry_type(other)
        )),
    }
}

fn check_rings(rings: &[geojson::LineStringType]) -> Result<(), String> {
    if rings.is_empty() {
        return Err("polygon without rings".to_string());
    }

    for ring in rings {
        if ring.len() < 4 {
            return Err(format!(
                "ring with {} positions (at least 4 required)",
                ring.len()
            ));
        }
        if ring
            .iter()
            .any(|position| position.len() < 2 || position.iter().any(|c| !c.is_finite()))
        {
            return Err("incomplete or non-finite position".to_string());
        }
    }

    Ok(())
}

const fn geometry_type(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(name: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> String {
        format!(
            r#"{{"type":"Feature","properties":{{"name":"{name}"}},"geometry":{{"type":"Polygon","coordinates":[[[{x0},{y0}],[{x1},{y0}],[{x1},{y1}],[{x0},{y1}],[{x0},{y0}]]]}}}}"#
        )
    }

    fn collection(features: &[String]) -> String {
        format!(
            r#"{{"type":"FeatureCollection","features":[{}]}}"#,
            features.join(",")
        )
    }

    fn names() -> Vec<String> {
        vec!["name".to_string()]
    }

    #[test]
    fn loads_named_polygons_in_document_order() {
        let text = collection(&[
            square("Norte", -110.0, 25.0, -100.0, 32.0),
            square("Central", -100.0, 18.0, -97.0, 21.0),
        ]);
        let catalog = RegionCatalog::from_geojson_str(RegionKind::ControlArea, &text, &names())
            .unwrap();

        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["Norte", "Central"]);
        assert!(catalog.regions().iter().all(Region::is_valid));
        let bbox = catalog.by_name("Central").unwrap().bbox().unwrap();
        assert!((bbox.min().x - -100.0).abs() < f64::EPSILON);
        assert!((bbox.max().y - 21.0).abs() < f64::EPSILON);
    }

    #[test]
    fn skips_unnamed_and_keeps_malformed_features() {
        let text = collection(&[
            r#"{"type":"Feature","properties":{},"geometry":null}"#.to_string(),
            r#"{"type":"Feature","properties":{"name":"Linea"},"geometry":{"type":"LineString","coordinates":[[0,0],[1,1]]}}"#.to_string(),
            r#"{"type":"Feature","properties":{"name":"Corto"},"geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[0,0]]]}}"#.to_string(),
            r#"{"type":"Feature","properties":{"name":"Vacio"},"geometry":null}"#.to_string(),
            square("Central", 0.0, 0.0, 1.0, 1.0),
        ]);
        let catalog = RegionCatalog::from_geojson_str(RegionKind::ControlArea, &text, &names())
            .unwrap();

        assert_eq!(catalog.len(), 4);
        assert!(!catalog.by_name("Linea").unwrap().is_valid());
        assert!(!catalog.by_name("Corto").unwrap().is_valid());
        assert!(!catalog.by_name("Vacio").unwrap().is_valid());
        assert!(catalog.by_name("Central").unwrap().is_valid());
    }

    #[test]
    fn reads_first_present_name_property() {
        let text = collection(&[
            r#"{"type":"Feature","properties":{"NOMGEO":"Jalisco"},"geometry":null}"#.to_string(),
        ]);
        let props = vec!["name".to_string(), "NOMGEO".to_string()];
        let catalog = RegionCatalog::from_geojson_str(RegionKind::State, &text, &props).unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["Jalisco"]);
    }

    #[test]
    fn keeps_repeated_names_in_document_order() {
        let text = collection(&[
            square("Baja California", -117.0, 30.0, -114.0, 32.7),
            square("Central", -100.0, 18.0, -97.0, 21.0),
            square("Baja California", -115.0, 22.0, -109.0, 28.0),
        ]);
        let catalog = RegionCatalog::from_geojson_str(RegionKind::ControlArea, &text, &names())
            .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.names().collect::<Vec<_>>(),
            vec!["Baja California", "Central"]
        );
        let entries: Vec<&str> = catalog.regions().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(entries, vec!["Baja California", "Central", "Baja California"]);
        let first = catalog.by_name("Baja California").unwrap().bbox().unwrap();
        assert!((first.min().y - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_non_collections() {
        let text = square("Central", 0.0, 0.0, 1.0, 1.0);
        assert!(matches!(
            RegionCatalog::from_geojson_str(RegionKind::ControlArea, &text, &names()),
            Err(SpatialError::InvalidCollection { .. })
        ));
        assert!(matches!(
            RegionCatalog::from_geojson_str(RegionKind::ControlArea, "not json", &names()),
            Err(SpatialError::GeoJson(_))
        ));
    }

    #[test]
    fn resolves_state_names_through_cascade() {
        let text = collection(&[
            square("Jalisco", -105.0, 19.0, -101.0, 22.0),
            square("Ciudad de Mexico", -99.4, 19.0, -98.9, 19.6),
            square("Veracruz de Ignacio de la Llave", -98.0, 17.0, -94.0, 22.0),
        ]);
        let catalog =
            RegionCatalog::from_geojson_str(RegionKind::State, &text, &names()).unwrap();

        assert_eq!(
            catalog.resolve_name("09 Ciudad de México").unwrap().name,
            "Ciudad de Mexico"
        );
        assert_eq!(
            catalog.resolve_name("Veracruz").unwrap().name,
            "Veracruz de Ignacio de la Llave"
        );
        assert!(catalog.resolve_name("Oaxaca").is_none());
    }

    #[test]
    fn reports_missing_control_areas() {
        let text = collection(&[
            square("Central", 0.0, 0.0, 1.0, 1.0),
            square("Noreste", 1.0, 0.0, 2.0, 1.0),
            square("Golfo", 2.0, 0.0, 3.0, 1.0),
        ]);
        let catalog = RegionCatalog::from_geojson_str(RegionKind::ControlArea, &text, &names())
            .unwrap();
        assert_eq!(
            catalog.missing_official_names(),
            vec!["Baja California", "Noroeste", "Norte", "Occidental", "Oriental", "Peninsular"]
        );

        let complete: Vec<String> = CONTROL_AREAS
            .iter()
            .map(|name| square(name, 0.0, 0.0, 1.0, 1.0))
            .collect();
        let catalog = RegionCatalog::from_geojson_str(
            RegionKind::ControlArea,
            &collection(&complete),
            &names(),
        )
        .unwrap();
        assert!(catalog.missing_official_names().is_empty());
    }

    #[test]
    fn reports_missing_states_through_cascade() {
        let text = collection(&[
            square("Jalisco", -105.0, 19.0, -101.0, 22.0),
            square("Veracruz", -98.0, 17.0, -94.0, 22.0),
        ]);
        let catalog =
            RegionCatalog::from_geojson_str(RegionKind::State, &text, &names()).unwrap();

        let missing = catalog.missing_official_names();
        assert_eq!(missing.len(), 30);
        assert!(!missing.contains(&"Veracruz de Ignacio de la Llave"));
        assert!(!missing.contains(&"Jalisco"));
        assert!(missing.contains(&"Oaxaca"));
    }

    #[test]
    fn control_areas_resolve_exactly() {
        let text = collection(&[square("Central", 0.0, 0.0, 1.0, 1.0)]);
        let catalog = RegionCatalog::from_geojson_str(RegionKind::ControlArea, &text, &names())
            .unwrap();
        assert!(catalog.resolve_name(" Central ").is_some());
        assert!(catalog.resolve_name("central").is_none());
    }
}
