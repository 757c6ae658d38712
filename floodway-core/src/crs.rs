//! Coordinate reference systems understood by the road network.
//!
//! Points are `geo::Point` with `x = longitude / easting` and
//! `y = latitude / northing`.

use std::f64::consts::FRAC_PI_4;
use std::fmt;
use std::str::FromStr;

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::Error;

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// Supported coordinate reference systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Crs {
    /// EPSG:4326, geographic degrees
    #[default]
    Wgs84,
    /// EPSG:3857, spherical Web Mercator in meters
    WebMercator,
    /// EPSG:3414, Singapore SVY21 Transverse Mercator grid in meters
    Svy21,
}

impl Crs {
    pub fn epsg(self) -> u32 {
        match self {
            Crs::Wgs84 => 4326,
            Crs::WebMercator => 3857,
            Crs::Svy21 => 3414,
        }
    }

    pub fn is_projected(self) -> bool {
        !matches!(self, Crs::Wgs84)
    }

    /// Transform a WGS84 (lon, lat) point into this CRS
    pub fn from_wgs84(self, point: Point<f64>) -> Point<f64> {
        match self {
            Crs::Wgs84 => point,
            Crs::WebMercator => {
                let x = WGS84_A * point.x().to_radians();
                let y = WGS84_A * (FRAC_PI_4 + point.y().to_radians() / 2.0).tan().ln();
                Point::new(x, y)
            }
            Crs::Svy21 => SVY21.forward(point),
        }
    }

    /// Transform a point in this CRS back to WGS84 (lon, lat)
    pub fn to_wgs84(self, point: Point<f64>) -> Point<f64> {
        match self {
            Crs::Wgs84 => point,
            Crs::WebMercator => {
                let lon = (point.x() / WGS84_A).to_degrees();
                let lat = (2.0 * (point.y() / WGS84_A).exp().atan() - 2.0 * FRAC_PI_4).to_degrees();
                Point::new(lon, lat)
            }
            Crs::Svy21 => SVY21.inverse(point),
        }
    }
}

/// Reproject a point between two reference systems, going through WGS84
pub fn reproject(point: Point<f64>, from: Crs, to: Crs) -> Point<f64> {
    if from == to {
        return point;
    }
    to.from_wgs84(from.to_wgs84(point))
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

impl FromStr for Crs {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let code = trimmed
            .strip_prefix("EPSG:")
            .or_else(|| trimmed.strip_prefix("epsg:"))
            .unwrap_or(trimmed);

        match code {
            "4326" => Ok(Crs::Wgs84),
            "3857" | "900913" => Ok(Crs::WebMercator),
            "3414" => Ok(Crs::Svy21),
            _ => Err(Error::InvalidData(format!("Unsupported CRS: {s}"))),
        }
    }
}

impl TryFrom<String> for Crs {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Crs> for String {
    fn from(crs: Crs) -> Self {
        crs.to_string()
    }
}

/// Transverse Mercator projection on the WGS84 ellipsoid
struct TransverseMercator {
    origin_lat: f64,
    origin_lon: f64,
    scale: f64,
    false_easting: f64,
    false_northing: f64,
}

const SVY21: TransverseMercator = TransverseMercator {
    origin_lat: 1.0 + 22.0 / 60.0,
    origin_lon: 103.0 + 50.0 / 60.0,
    scale: 1.0,
    false_easting: 28_001.642,
    false_northing: 38_744.572,
};

impl TransverseMercator {
    fn e2() -> f64 {
        2.0 * WGS84_F - WGS84_F * WGS84_F
    }

    /// Meridian arc length from the equator
    fn meridian_arc(lat: f64) -> f64 {
        let e2 = Self::e2();
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        WGS84_A
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * lat).sin())
    }

    fn forward(&self, point: Point<f64>) -> Point<f64> {
        let e2 = Self::e2();
        let ep2 = e2 / (1.0 - e2);
        let lat = point.y().to_radians();
        let dlon = (point.x() - self.origin_lon).to_radians();

        let (sin, cos) = lat.sin_cos();
        let n = WGS84_A / (1.0 - e2 * sin * sin).sqrt();
        let t = lat.tan().powi(2);
        let c = ep2 * cos * cos;
        let a = dlon * cos;

        let m = Self::meridian_arc(lat);
        let m0 = Self::meridian_arc(self.origin_lat.to_radians());

        let x = self.scale
            * n
            * (a + (1.0 - t + c) * a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0);
        let y = self.scale
            * (m - m0
                + n * lat.tan()
                    * (a * a / 2.0
                        + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                        + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6)
                            / 720.0));

        Point::new(self.false_easting + x, self.false_northing + y)
    }

    fn inverse(&self, point: Point<f64>) -> Point<f64> {
        let e2 = Self::e2();
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let ep2 = e2 / (1.0 - e2);

        let m0 = Self::meridian_arc(self.origin_lat.to_radians());
        let m = m0 + (point.y() - self.false_northing) / self.scale;
        let mu = m / (WGS84_A * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));

        let root = (1.0 - e2).sqrt();
        let e1 = (1.0 - root) / (1.0 + root);
        let lat1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let (sin1, cos1) = lat1.sin_cos();
        let c1 = ep2 * cos1 * cos1;
        let t1 = lat1.tan().powi(2);
        let w = 1.0 - e2 * sin1 * sin1;
        let n1 = WGS84_A / w.sqrt();
        let r1 = WGS84_A * (1.0 - e2) / w.powf(1.5);
        let d = (point.x() - self.false_easting) / (n1 * self.scale);

        let lat = lat1
            - (n1 * lat1.tan() / r1)
                * (d * d / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                        - 252.0 * ep2
                        - 3.0 * c1 * c1)
                        * d.powi(6)
                        / 720.0);
        let lon = self.origin_lon.to_radians()
            + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1)
                    * d.powi(5)
                    / 120.0)
                / cos1;

        Point::new(lon.to_degrees(), lat.to_degrees())
    }
}
