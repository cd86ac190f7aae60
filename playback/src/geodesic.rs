use geom::LonLat;

/// Treats lon/lat as a flat plane. Only meant for placing a marker between two nearby-ish points,
/// not for navigation. `pct` is clamped to [0, 1], and the endpoints are returned exactly.
pub fn lerp(a: LonLat, b: LonLat, pct: f64) -> LonLat {
    if !(pct > 0.0) {
        return a;
    }
    if pct >= 1.0 {
        return b;
    }
    LonLat::new(a.x() + (b.x() - a.x()) * pct, a.y() + (b.y() - a.y()) * pct)
}
