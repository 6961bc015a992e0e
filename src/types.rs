use num_traits::Float;
use std::f64::consts::PI;

/// A point in projected coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Xy {
    pub x: f64,
    pub y: f64,
}

impl Xy {
    pub fn new(x: f64, y: f64) -> Self {
        Xy { x, y }
    }

    pub fn distance(&self, other: &Xy) -> f64 {
        self.distance_squared(other).sqrt()
    }

    pub fn distance_squared(&self, other: &Xy) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl From<(f64, f64)> for Xy {
    fn from((x, y): (f64, f64)) -> Self {
        Xy { x, y }
    }
}

/// A geographic point in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geo {
    pub lambda: f64,
    pub phi: f64,
}

impl Geo {
    pub fn new(lambda: f64, phi: f64) -> Self {
        Geo { lambda, phi }
    }

    pub fn to_degrees(&self) -> GeoDegrees {
        GeoDegrees::new(rad2deg(self.lambda), rad2deg(self.phi))
    }
}

/// Interpreted as `(lambda, phi)` in radians.
impl From<(f64, f64)> for Geo {
    fn from((lambda, phi): (f64, f64)) -> Self {
        Geo { lambda, phi }
    }
}

impl From<GeoDegrees> for Geo {
    fn from(degrees: GeoDegrees) -> Self {
        degrees.to_radians()
    }
}

/// A geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoDegrees {
    pub lon: f64,
    pub lat: f64,
}

impl GeoDegrees {
    pub fn new(lon: f64, lat: f64) -> Self {
        GeoDegrees { lon, lat }
    }

    pub fn to_radians(&self) -> Geo {
        Geo::new(deg2rad(self.lon), deg2rad(self.lat))
    }
}

pub fn deg2rad(deg: f64) -> f64 {
    PI / 180.0 * deg
}

pub fn rad2deg(rad: f64) -> f64 {
    180.0 / PI * rad
}

/// Modulo with the sign of the divisor, so that the result lies in `[0, b)` for `b > 0`
/// even when `a` is negative. Only meaningful for positive `b`.
///
/// ```
/// use projwrapper::modulo;
///
/// assert_eq!(modulo(-10.0, 7.0), 4.0);
/// assert_eq!(modulo(10.0, 7.0), 3.0);
/// ```
pub fn modulo<T: Float>(a: T, b: T) -> T {
    let y = a % b;
    if y < T::zero() { y + b } else { y }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_distance() {
        let p = Xy::new(1.0, 2.0);
        let q = Xy::new(4.0, 6.0);
        assert_eq!(p.distance_squared(&q), 25.0);
        assert_eq!(q.distance_squared(&p), 25.0);
        assert_eq!(p.distance(&q), 5.0);
        assert_eq!(p.distance(&q), p.distance_squared(&q).sqrt());
        assert_eq!(p.distance_squared(&p), 0.0);
    }

    #[test]
    fn test_distance_squared_zero_iff_equal() {
        let points = [
            Xy::new(0.0, 0.0),
            Xy::new(-3.5, 1e6),
            Xy::new(1e-9, 0.0),
            Xy::new(0.0, -1e-9),
        ];
        for p in &points {
            for q in &points {
                assert_eq!(p.distance_squared(q) == 0.0, p == q);
                assert_eq!(p.distance_squared(q), q.distance_squared(p));
            }
        }
    }

    #[test]
    fn test_degree_conversion() {
        assert_relative_eq!(deg2rad(180.0), PI, epsilon = 1e-15);
        assert_relative_eq!(rad2deg(PI), 180.0, epsilon = 1e-12);
        assert_eq!(deg2rad(0.0), 0.0);
        assert_relative_eq!(rad2deg(deg2rad(47.25)), 47.25, epsilon = 1e-12);

        let geo = GeoDegrees::new(90.0, -45.0).to_radians();
        assert_relative_eq!(geo.lambda, PI / 2.0, epsilon = 1e-15);
        assert_relative_eq!(geo.phi, -PI / 4.0, epsilon = 1e-15);
        assert_eq!(Geo::from(GeoDegrees::new(90.0, -45.0)), geo);

        let back = geo.to_degrees();
        assert_relative_eq!(back.lon, 90.0, epsilon = 1e-12);
        assert_relative_eq!(back.lat, -45.0, epsilon = 1e-12);
    }

    #[test]
    fn test_modulo() {
        assert_eq!(modulo(-10.0, 7.0), 4.0);
        assert_eq!(modulo(10.0, 7.0), 3.0);
        assert_eq!(modulo(14.0, 7.0), 0.0);
        assert_eq!(modulo(-14.0, 7.0), 0.0);
        assert_eq!(modulo(-1.0f32, 360.0), 359.0);
        for a in [-725.5, -360.0, -0.25, 0.0, 0.25, 359.9, 1080.0] {
            let m = modulo(a, 360.0);
            assert!((0.0..360.0).contains(&m), "{a} mod 360 = {m}");
        }
    }
}
