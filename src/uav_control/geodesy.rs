use super::telemetry::Position;

/// Mean earth radius in meters used for all spherical computations.
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Computes the GPS destination lying `range` meters from `origin` along `bearing`.
///
/// The horizontal part follows the great-circle forward formula on a spherical earth.
/// The altitude is not derived from the formula: it is always `desired_height`.
///
/// # Arguments
/// - `origin`: The current position.
/// - `desired_height`: Altitude of the resulting destination.
/// - `range`: Distance to travel in meters.
/// - `bearing`: Direction in radians, `0` pointing along the first axis of the local frame.
///
/// # Returns
/// - The destination. A zero or non-finite `range` or `bearing` yields `origin` at
///   `desired_height`.
#[allow(clippy::float_cmp)]
pub fn gps_from_rb(origin: Position, desired_height: f64, range: f64, bearing: f64) -> Position {
    if range == 0.0 || !range.is_finite() || !bearing.is_finite() {
        return origin.with_altitude(desired_height);
    }
    let lat = origin.latitude.to_radians();
    let lon = origin.longitude.to_radians();
    let ang = range / EARTH_RADIUS;

    let sin_lat_out = (lat.sin() * ang.cos() + lat.cos() * ang.sin() * bearing.cos()).clamp(-1.0, 1.0);
    let lat_out = sin_lat_out.asin();
    let lon_out = lon
        + (bearing.sin() * ang.sin() * lat.cos()).atan2(ang.cos() - lat.sin() * sin_lat_out);

    Position::new(
        lat_out.to_degrees().clamp(-90.0, 90.0),
        wrap_longitude(lon_out.to_degrees()),
        desired_height,
    )
}

/// Haversine distance in meters between the horizontal components of two positions.
pub fn great_circle_distance(from: Position, to: Position) -> f64 {
    let lat_a = from.latitude.to_radians();
    let lat_b = to.latitude.to_radians();
    let d_lat = lat_b - lat_a;
    let d_lon = (to.longitude - from.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS * h.sqrt().min(1.0).asin()
}

/// Converts a local 2D displacement in meters into a `(range, bearing)` pair.
pub fn range_bearing(dx: f64, dy: f64) -> (f64, f64) { (dx.hypot(dy), dy.atan2(dx)) }

fn wrap_longitude(lon_deg: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon_deg) {
        lon_deg
    } else {
        (lon_deg + 180.0).rem_euclid(360.0) - 180.0
    }
}
