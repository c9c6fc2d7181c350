use crate::core::types::GeoPoint;
use geo_types::{Coord, LineString, Point, Polygon};

/// Anything that can report a WGS84 latitude and longitude.
///
/// Tuples are read as `(lat, lon)`, the order used by task and building
/// records. `geo_types` values follow the GIS convention of `x = lon, y = lat`.
pub trait LatLon {
    fn lat(&self) -> f64;
    fn lon(&self) -> f64;

    fn to_geo_point(&self) -> GeoPoint {
        GeoPoint::new(self.lat(), self.lon())
    }
}

impl LatLon for GeoPoint {
    fn lat(&self) -> f64 { self.lat }
    fn lon(&self) -> f64 { self.lon }
}

impl LatLon for (f64, f64) {
    fn lat(&self) -> f64 { self.0 }
    fn lon(&self) -> f64 { self.1 }
}

impl LatLon for Point<f64> {
    fn lat(&self) -> f64 { self.y() }
    fn lon(&self) -> f64 { self.x() }
}

impl LatLon for Coord<f64> {
    fn lat(&self) -> f64 { self.y }
    fn lon(&self) -> f64 { self.x }
}

impl From<GeoPoint> for Coord<f64> {
    fn from(p: GeoPoint) -> Self {
        Coord { x: p.lon, y: p.lat }
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(p: GeoPoint) -> Self {
        Point::new(p.lon, p.lat)
    }
}

/// Builds a WGS84 polygon (`x = lon, y = lat`) from an ordered vertex list.
///
/// `geo_types` closes the ring if the last vertex differs from the first.
pub fn vertices_to_polygon<C: LatLon>(vertices: &[C]) -> Polygon<f64> {
    let coords: Vec<Coord<f64>> = vertices
        .iter()
        .map(|v| Coord {
            x: v.lon(),
            y: v.lat(),
        })
        .collect();
    Polygon::new(LineString::from(coords), vec![])
}

/// Reads the exterior ring of a WGS84 polygon back into `GeoPoint`s.
pub fn polygon_to_vertices(polygon: &Polygon<f64>) -> Vec<GeoPoint> {
    polygon
        .exterior()
        .coords()
        .map(|c| c.to_geo_point())
        .collect()
}
