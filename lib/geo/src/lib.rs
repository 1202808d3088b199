//! In-memory parcel sketch.
//!
//! A sketch holds **at most one** polygon at a time: loading or setting a
//! new shape replaces the previous one, deleting resets area to zero, and
//! every create/edit/delete notifies a registered change callback with
//! (geometry, area, centroid).
//!
//! Area is geodesic (spherical excess, Chamberlain–Duquette) in m²; the
//! centroid is the bounding-box center, which is what the backend stores
//! in `centroid_lat`/`centroid_lng`. Geometry is never persisted here — it
//! lives in memory until the caller embeds it in a particella payload.

use geo::{BoundingRect, ChamberlainDuquetteArea, Polygon, Rect};
use geojson::GeoJson;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum GeomError {
    #[error("GeoJSON non valido: {0}")]
    Parse(String),

    /// Drawing was restricted to polygon/rectangle tools; everything else
    /// is refused on load too.
    #[error("geometria non supportata: {0} (solo poligoni)")]
    Unsupported(String),
}

/// Bounding-box center of the current shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    pub lat: f64,
    pub lng: f64,
}

/// Invoked after every geometry change: `(shape, area_mq, centroid)`.
/// Deletion reports `(None, 0.0, None)`.
pub type ChangeCallback = Box<dyn FnMut(Option<&Polygon<f64>>, f64, Option<Centroid>)>;

#[derive(Default)]
pub struct ParcelSketch {
    shape: Option<Polygon<f64>>,
    area_mq: f64,
    viewport: Option<Rect<f64>>,
    on_change: Option<ChangeCallback>,
}

impl ParcelSketch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the change-notification callback. Replaces any previous one.
    pub fn on_change<F>(&mut self, callback: F)
    where
        F: FnMut(Option<&Polygon<f64>>, f64, Option<Centroid>) + 'static,
    {
        self.on_change = Some(Box::new(callback));
    }

    /// Set the drawn shape, replacing any previous geometry (at most one
    /// shape is retained). Recomputes area and centroid, then fires the
    /// callback.
    pub fn set_shape(&mut self, polygon: Polygon<f64>) {
        self.area_mq = polygon.chamberlain_duquette_unsigned_area();
        self.shape = Some(polygon);
        debug!(area_mq = self.area_mq, "geometria aggiornata");
        self.notify();
    }

    /// Delete the current shape: geometry to none, area to zero, callback
    /// fired with those values.
    pub fn clear(&mut self) {
        self.shape = None;
        self.area_mq = 0.0;
        self.notify();
    }

    /// Load a polygon from a serialized GeoJSON string. With `zoom_to`,
    /// the viewport is fitted to the shape's bounds.
    pub fn load_geometry_str(&mut self, geojson: &str, zoom_to: bool) -> Result<(), GeomError> {
        let parsed: GeoJson = geojson
            .parse()
            .map_err(|e: geojson::Error| GeomError::Parse(e.to_string()))?;
        self.load_parsed(parsed, zoom_to)
    }

    /// Load a polygon from an already-parsed JSON value. Produces the same
    /// area and centroid as the string path.
    pub fn load_geometry_value(&mut self, geojson: &Value, zoom_to: bool) -> Result<(), GeomError> {
        let parsed = GeoJson::from_json_value(geojson.clone())
            .map_err(|e| GeomError::Parse(e.to_string()))?;
        self.load_parsed(parsed, zoom_to)
    }

    fn load_parsed(&mut self, parsed: GeoJson, zoom_to: bool) -> Result<(), GeomError> {
        let polygon = polygon_of(parsed)?;
        // Loading replaces the shape silently: only create/edit/delete
        // notify the callback.
        self.area_mq = polygon.chamberlain_duquette_unsigned_area();
        if zoom_to {
            self.viewport = polygon.bounding_rect();
        }
        self.shape = Some(polygon);
        Ok(())
    }

    pub fn geometry(&self) -> Option<&Polygon<f64>> {
        self.shape.as_ref()
    }

    /// Serialize the current shape for a particella payload.
    pub fn geometry_geojson(&self) -> Option<String> {
        self.shape.as_ref().map(|polygon| {
            geojson::Geometry::new(geojson::Value::from(polygon)).to_string()
        })
    }

    /// Geodesic area of the current shape in m²; 0 when empty.
    pub fn area_mq(&self) -> f64 {
        self.area_mq
    }

    /// Bounding-box center of the current shape.
    pub fn centroid(&self) -> Option<Centroid> {
        let rect = self.shape.as_ref()?.bounding_rect()?;
        let center = rect.center();
        Some(Centroid {
            lat: center.y,
            lng: center.x,
        })
    }

    /// Viewport rectangle, set when a geometry was loaded with `zoom_to`.
    pub fn viewport(&self) -> Option<Rect<f64>> {
        self.viewport
    }

    fn notify(&mut self) {
        // Computed before borrowing the callback: both borrow self.
        let centroid = self.centroid();
        let area = self.area_mq;
        if let Some(callback) = self.on_change.as_mut() {
            callback(self.shape.as_ref(), area, centroid);
        }
    }
}

/// Extract the single polygon out of any GeoJSON wrapper. Features and
/// feature collections are unwrapped (first feature); anything that isn't
/// a polygon is refused.
fn polygon_of(parsed: GeoJson) -> Result<Polygon<f64>, GeomError> {
    let geometry = match parsed {
        GeoJson::Geometry(g) => g,
        GeoJson::Feature(f) => f
            .geometry
            .ok_or_else(|| GeomError::Parse("feature senza geometria".to_string()))?,
        GeoJson::FeatureCollection(fc) => fc
            .features
            .into_iter()
            .next()
            .and_then(|f| f.geometry)
            .ok_or_else(|| GeomError::Parse("feature collection vuota".to_string()))?,
    };

    match geometry.value {
        value @ geojson::Value::Polygon(_) => Polygon::try_from(value)
            .map_err(|e| GeomError::Parse(e.to_string())),
        other => Err(GeomError::Unsupported(other.type_name().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    // Roughly one hectare block north-east of Venice.
    const SQUARE: &str = r#"{
        "type": "Polygon",
        "coordinates": [[
            [12.30, 45.44],
            [12.31, 45.44],
            [12.31, 45.45],
            [12.30, 45.45],
            [12.30, 45.44]
        ]]
    }"#;

    fn square_polygon() -> Polygon<f64> {
        let mut sketch = ParcelSketch::new();
        sketch.load_geometry_str(SQUARE, false).unwrap();
        sketch.geometry().unwrap().clone()
    }

    #[test]
    fn test_load_computes_area_and_centroid() {
        let mut sketch = ParcelSketch::new();
        sketch.load_geometry_str(SQUARE, true).unwrap();

        // ~0.01° x 0.01° at 45°N: about 780m x 1110m.
        let area = sketch.area_mq();
        assert!(area > 8.0e5 && area < 9.5e5, "area fuori range: {}", area);

        let centroid = sketch.centroid().unwrap();
        assert!((centroid.lat - 45.445).abs() < 1e-9);
        assert!((centroid.lng - 12.305).abs() < 1e-9);

        // zoom_to fitted the viewport to the shape's bounds.
        let viewport = sketch.viewport().unwrap();
        assert_eq!(viewport.min().x, 12.30);
        assert_eq!(viewport.max().y, 45.45);
    }

    #[test]
    fn test_string_and_value_inputs_agree() {
        let mut from_str = ParcelSketch::new();
        from_str.load_geometry_str(SQUARE, false).unwrap();

        let value: Value = serde_json::from_str(SQUARE).unwrap();
        let mut from_value = ParcelSketch::new();
        from_value.load_geometry_value(&value, false).unwrap();

        assert_eq!(from_str.area_mq(), from_value.area_mq());
        assert_eq!(from_str.centroid(), from_value.centroid());
    }

    #[test]
    fn test_second_shape_replaces_first() {
        let mut sketch = ParcelSketch::new();
        sketch.set_shape(square_polygon());
        let first_area = sketch.area_mq();

        let shifted: &str = r#"{
            "type": "Polygon",
            "coordinates": [[
                [12.40, 45.44], [12.42, 45.44], [12.42, 45.46],
                [12.40, 45.46], [12.40, 45.44]
            ]]
        }"#;
        sketch.load_geometry_str(shifted, false).unwrap();

        // Exactly one geometry retained, the new one.
        assert!(sketch.geometry().is_some());
        assert!(sketch.area_mq() > first_area);
    }

    #[test]
    fn test_clear_resets_and_notifies() {
        let seen: Rc<RefCell<Vec<(bool, f64)>>> = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();

        let mut sketch = ParcelSketch::new();
        sketch.on_change(move |shape, area, _| {
            log.borrow_mut().push((shape.is_some(), area));
        });

        sketch.set_shape(square_polygon());
        sketch.clear();

        assert!(sketch.geometry().is_none());
        assert_eq!(sketch.area_mq(), 0.0);
        assert!(sketch.centroid().is_none());

        let events = seen.borrow();
        assert_eq!(events.len(), 2);
        assert!(events[0].0 && events[0].1 > 0.0);
        assert_eq!(events[1], (false, 0.0));
    }

    #[test]
    fn test_set_shape_fires_callback_with_centroid() {
        let seen: Rc<RefCell<Option<Centroid>>> = Rc::new(RefCell::new(None));
        let log = seen.clone();

        let mut sketch = ParcelSketch::new();
        sketch.on_change(move |_, _, centroid| {
            *log.borrow_mut() = centroid;
        });
        sketch.set_shape(square_polygon());

        let centroid = seen.borrow().unwrap();
        assert!((centroid.lng - 12.305).abs() < 1e-9);
    }

    #[test]
    fn test_feature_wrapper_accepted() {
        let feature = format!(
            r#"{{ "type": "Feature", "properties": {{}}, "geometry": {} }}"#,
            SQUARE
        );
        let mut sketch = ParcelSketch::new();
        sketch.load_geometry_str(&feature, false).unwrap();
        assert!(sketch.area_mq() > 0.0);
    }

    #[test]
    fn test_non_polygon_refused() {
        let point = r#"{ "type": "Point", "coordinates": [12.3, 45.4] }"#;
        let mut sketch = ParcelSketch::new();
        assert!(matches!(
            sketch.load_geometry_str(point, false),
            Err(GeomError::Unsupported(_))
        ));

        let garbage = "{ not geojson";
        assert!(matches!(
            sketch.load_geometry_str(garbage, false),
            Err(GeomError::Parse(_))
        ));
    }

    #[test]
    fn test_geojson_roundtrip_preserves_area() {
        let mut sketch = ParcelSketch::new();
        sketch.load_geometry_str(SQUARE, false).unwrap();
        let serialized = sketch.geometry_geojson().unwrap();

        let mut back = ParcelSketch::new();
        back.load_geometry_str(&serialized, false).unwrap();
        assert_eq!(back.area_mq(), sketch.area_mq());
    }
}
