//! Low-precision planetary ephemeris.
//!
//! Positions use the mean orbital elements published by Paul Schlyter ("How to compute
//! planetary positions"), counted in days from 2000 Jan 0.0 UT. Accuracy is on the order
//! of a few arc-minutes for the Sun and planets, which is far below what an altitude
//! expressed as a fraction of 90° can show.

use crate::domain::model::Planet;
use crate::utils::error::{DashError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const ELEMENTS_EPOCH_JD: f64 = 2_451_543.5;
const J2000_JD: f64 = 2_451_545.0;
const MS_PER_DAY: f64 = 86_400_000.0;

/// 恆星時每日增加的度數
const SIDEREAL_RATE: f64 = 360.985_647_366_29;

const KEPLER_MAX_ITERATIONS: usize = 50;
const KEPLER_TOLERANCE: f64 = 1e-12;
const TRANSIT_MAX_ITERATIONS: usize = 12;
const TRANSIT_TOLERANCE_DAYS: f64 = 1e-7;
const ONE_SECOND_DAYS: f64 = 1.0 / 86_400.0;

/// 觀測者位置，經度東正西負，單位為度
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Observer {
    pub latitude: f64,
    pub longitude: f64,
}

/// 地心赤道座標，角度為弧度；月球距離以地球半徑計，其餘以 AU 計
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Equatorial {
    pub right_ascension: f64,
    pub declination: f64,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy)]
struct OrbitalElements {
    node: f64,
    inclination: f64,
    perihelion: f64,
    semi_major_axis: f64,
    eccentricity: f64,
    mean_anomaly: f64,
}

#[derive(Debug, Clone, Copy)]
struct Rect {
    x: f64,
    y: f64,
    z: f64,
}

impl Rect {
    fn from_spherical(longitude: f64, latitude: f64, distance: f64) -> Self {
        Self {
            x: distance * latitude.cos() * longitude.cos(),
            y: distance * latitude.cos() * longitude.sin(),
            z: distance * latitude.sin(),
        }
    }

    fn longitude(&self) -> f64 {
        self.y.atan2(self.x)
    }

    fn latitude(&self) -> f64 {
        self.z.atan2(self.x.hypot(self.y))
    }

    fn distance(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    fn add(self, other: Rect) -> Rect {
        Rect {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

fn rev(degrees: f64) -> f64 {
    degrees.rem_euclid(360.0)
}

fn sind(degrees: f64) -> f64 {
    degrees.to_radians().sin()
}

fn cosd(degrees: f64) -> f64 {
    degrees.to_radians().cos()
}

pub fn julian_day(at: DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64 / MS_PER_DAY + UNIX_EPOCH_JD
}

pub fn from_julian_day(jd: f64) -> Option<DateTime<Utc>> {
    if !jd.is_finite() {
        return None;
    }
    let millis = ((jd - UNIX_EPOCH_JD) * MS_PER_DAY).round() as i64;
    DateTime::<Utc>::from_timestamp_millis(millis)
}

/// 格林威治平恆星時（度）
pub fn greenwich_sidereal_degrees(jd: f64) -> f64 {
    rev(280.460_618_37 + SIDEREAL_RATE * (jd - J2000_JD))
}

fn obliquity(d: f64) -> f64 {
    23.4393 - 3.563e-7 * d
}

fn elements(planet: Planet, d: f64) -> OrbitalElements {
    let (node, inclination, perihelion, semi_major_axis, eccentricity, mean_anomaly) = match planet {
        Planet::Sun => (
            0.0,
            0.0,
            282.9404 + 4.70935e-5 * d,
            1.0,
            0.016709 - 1.151e-9 * d,
            356.0470 + 0.985_600_258_5 * d,
        ),
        Planet::Moon => (
            125.1228 - 0.052_953_808_3 * d,
            5.1454,
            318.0634 + 0.164_357_322_3 * d,
            60.2666,
            0.054900,
            115.3654 + 13.064_992_950_9 * d,
        ),
        Planet::Mercury => (
            48.3313 + 3.24587e-5 * d,
            7.0047 + 5.00e-8 * d,
            29.1241 + 1.01444e-5 * d,
            0.387098,
            0.205635 + 5.59e-10 * d,
            168.6562 + 4.092_334_436_8 * d,
        ),
        Planet::Venus => (
            76.6799 + 2.46590e-5 * d,
            3.3946 + 2.75e-8 * d,
            54.8910 + 1.38374e-5 * d,
            0.723330,
            0.006773 - 1.302e-9 * d,
            48.0052 + 1.602_130_224_4 * d,
        ),
        Planet::Mars => (
            49.5574 + 2.11081e-5 * d,
            1.8497 - 1.78e-8 * d,
            286.5016 + 2.92961e-5 * d,
            1.523688,
            0.093405 + 2.516e-9 * d,
            18.6021 + 0.524_020_776_6 * d,
        ),
        Planet::Jupiter => (
            100.4542 + 2.76854e-5 * d,
            1.3030 - 1.557e-7 * d,
            273.8777 + 1.64505e-5 * d,
            5.20256,
            0.048498 + 4.469e-9 * d,
            19.8950 + 0.083_085_300_1 * d,
        ),
        Planet::Saturn => (
            113.6634 + 2.38980e-5 * d,
            2.4886 - 1.081e-7 * d,
            339.3939 + 2.97661e-5 * d,
            9.55475,
            0.055546 - 9.499e-9 * d,
            316.9670 + 0.033_444_228_2 * d,
        ),
        Planet::Uranus => (
            74.0005 + 1.3978e-5 * d,
            0.7733 + 1.9e-8 * d,
            96.6612 + 3.0565e-5 * d,
            19.18171 - 1.55e-8 * d,
            0.047318 + 7.45e-9 * d,
            142.5905 + 0.011_725_806 * d,
        ),
        // 冥王星的位置由 pluto_heliocentric 計算，不會用到這組元素
        Planet::Neptune | Planet::Pluto => (
            131.7806 + 3.0173e-5 * d,
            1.7700 - 2.55e-7 * d,
            272.8461 - 6.027e-6 * d,
            30.05826 + 3.313e-8 * d,
            0.008606 + 2.15e-9 * d,
            260.2471 + 0.005_995_147 * d,
        ),
    };

    OrbitalElements {
        node,
        inclination,
        perihelion,
        semi_major_axis,
        eccentricity,
        mean_anomaly,
    }
}

/// 以牛頓法解克卜勒方程式，回傳偏近點角（弧度）
fn eccentric_anomaly(mean_anomaly: f64, eccentricity: f64) -> Option<f64> {
    let m = rev(mean_anomaly).to_radians();
    let mut e_anomaly = m + eccentricity * m.sin() * (1.0 + eccentricity * m.cos());

    for _ in 0..KEPLER_MAX_ITERATIONS {
        let delta = (e_anomaly - eccentricity * e_anomaly.sin() - m)
            / (1.0 - eccentricity * e_anomaly.cos());
        e_anomaly -= delta;
        if delta.abs() < KEPLER_TOLERANCE {
            return Some(e_anomaly);
        }
    }
    None
}

/// 軌道元素轉為黃道直角座標（以軌道中心為原點）
fn orbit_position(el: &OrbitalElements) -> Option<Rect> {
    let e_anomaly = eccentric_anomaly(el.mean_anomaly, el.eccentricity)?;
    let xv = el.semi_major_axis * (e_anomaly.cos() - el.eccentricity);
    let yv = el.semi_major_axis
        * (1.0 - el.eccentricity * el.eccentricity).sqrt()
        * e_anomaly.sin();

    let true_anomaly = yv.atan2(xv);
    let r = xv.hypot(yv);

    let node = el.node.to_radians();
    let incl = el.inclination.to_radians();
    let arg = true_anomaly + el.perihelion.to_radians();

    Some(Rect {
        x: r * (node.cos() * arg.cos() - node.sin() * arg.sin() * incl.cos()),
        y: r * (node.sin() * arg.cos() + node.cos() * arg.sin() * incl.cos()),
        z: r * arg.sin() * incl.sin(),
    })
}

fn sun_geocentric(d: f64) -> Option<Rect> {
    orbit_position(&elements(Planet::Sun, d))
}

/// 月球地心座標，加上主要的經緯度與距離攝動
fn moon_geocentric(d: f64) -> Option<Rect> {
    let moon = elements(Planet::Moon, d);
    let sun = elements(Planet::Sun, d);
    let raw = orbit_position(&moon)?;

    let ms = sun.mean_anomaly;
    let mm = moon.mean_anomaly;
    let ls = ms + sun.perihelion;
    let lm = mm + moon.perihelion + moon.node;
    let elong = lm - ls;
    let arg_lat = lm - moon.node;

    let dlon = -1.274 * sind(mm - 2.0 * elong)
        + 0.658 * sind(2.0 * elong)
        - 0.186 * sind(ms)
        - 0.059 * sind(2.0 * mm - 2.0 * elong)
        - 0.057 * sind(mm - 2.0 * elong + ms)
        + 0.053 * sind(mm + 2.0 * elong)
        + 0.046 * sind(2.0 * elong - ms)
        + 0.041 * sind(mm - ms)
        - 0.035 * sind(elong)
        - 0.031 * sind(mm + ms)
        - 0.015 * sind(2.0 * arg_lat - 2.0 * elong)
        + 0.011 * sind(mm - 4.0 * elong);
    let dlat = -0.173 * sind(arg_lat - 2.0 * elong)
        - 0.055 * sind(mm - arg_lat - 2.0 * elong)
        - 0.046 * sind(mm + arg_lat - 2.0 * elong)
        + 0.033 * sind(arg_lat + 2.0 * elong)
        + 0.017 * sind(2.0 * mm + arg_lat);
    let ddist = -0.58 * cosd(mm - 2.0 * elong) - 0.46 * cosd(2.0 * elong);

    Some(Rect::from_spherical(
        raw.longitude() + dlon.to_radians(),
        raw.latitude() + dlat.to_radians(),
        raw.distance() + ddist,
    ))
}

/// 冥王星日心座標（週期項級數，1885 至 2099 年有效）
fn pluto_heliocentric(d: f64) -> Rect {
    let s = 50.03 + 0.033_459_652 * d;
    let p = 238.95 + 0.003_968_789 * d;

    let longitude = 238.9508 + 0.004_007_03 * d - 19.799 * sind(p) + 19.848 * cosd(p)
        + 0.897 * sind(2.0 * p)
        - 4.956 * cosd(2.0 * p)
        + 0.610 * sind(3.0 * p)
        + 1.211 * cosd(3.0 * p)
        - 0.341 * sind(4.0 * p)
        - 0.190 * cosd(4.0 * p)
        + 0.128 * sind(5.0 * p)
        - 0.034 * cosd(5.0 * p)
        - 0.038 * sind(6.0 * p)
        + 0.031 * cosd(6.0 * p)
        + 0.020 * sind(s - p)
        - 0.010 * cosd(s - p);
    let latitude = -3.9082 - 5.453 * sind(p) - 14.975 * cosd(p) + 3.527 * sind(2.0 * p)
        + 1.673 * cosd(2.0 * p)
        - 1.051 * sind(3.0 * p)
        + 0.328 * cosd(3.0 * p)
        + 0.179 * sind(4.0 * p)
        - 0.292 * cosd(4.0 * p)
        + 0.019 * sind(5.0 * p)
        + 0.100 * cosd(5.0 * p)
        - 0.031 * sind(6.0 * p)
        - 0.026 * cosd(6.0 * p)
        + 0.011 * cosd(s - p);
    let distance = 40.72 + 6.68 * sind(p) + 6.90 * cosd(p) - 1.18 * sind(2.0 * p)
        - 0.03 * cosd(2.0 * p)
        + 0.15 * sind(3.0 * p)
        - 0.14 * cosd(3.0 * p);

    Rect::from_spherical(longitude.to_radians(), latitude.to_radians(), distance)
}

fn geocentric_ecliptic(planet: Planet, d: f64) -> Option<Rect> {
    match planet {
        Planet::Sun => sun_geocentric(d),
        Planet::Moon => moon_geocentric(d),
        Planet::Pluto => Some(pluto_heliocentric(d).add(sun_geocentric(d)?)),
        other => Some(orbit_position(&elements(other, d))?.add(sun_geocentric(d)?)),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Ephemeris {
    observer: Observer,
}

impl Ephemeris {
    pub fn new(observer: Observer) -> Self {
        Self { observer }
    }

    pub fn equatorial(&self, planet: Planet, at: DateTime<Utc>) -> Result<Equatorial> {
        self.equatorial_at(planet, julian_day(at))
    }

    fn equatorial_at(&self, planet: Planet, jd: f64) -> Result<Equatorial> {
        let d = jd - ELEMENTS_EPOCH_JD;
        let ecl = geocentric_ecliptic(planet, d)
            .filter(Rect::is_finite)
            .ok_or_else(|| ephemeris_error(planet, "orbit did not converge"))?;

        let eps = obliquity(d).to_radians();
        let eq = Rect {
            x: ecl.x,
            y: ecl.y * eps.cos() - ecl.z * eps.sin(),
            z: ecl.y * eps.sin() + ecl.z * eps.cos(),
        };

        Ok(Equatorial {
            right_ascension: eq.longitude().rem_euclid(std::f64::consts::TAU),
            declination: eq.latitude(),
            distance: eq.distance(),
        })
    }

    /// 本地時角（度，0 至 360）
    fn hour_angle_at(&self, planet: Planet, jd: f64) -> Result<f64> {
        let position = self.equatorial_at(planet, jd)?;
        Ok(rev(
            greenwich_sidereal_degrees(jd) + self.observer.longitude
                - position.right_ascension.to_degrees(),
        ))
    }

    /// 地平高度（弧度）；月球另外扣除視差
    pub fn altitude(&self, planet: Planet, at: DateTime<Utc>) -> Result<f64> {
        let jd = julian_day(at);
        let position = self.equatorial_at(planet, jd)?;
        let hour_angle = (greenwich_sidereal_degrees(jd) + self.observer.longitude).to_radians()
            - position.right_ascension;
        let lat = self.observer.latitude.to_radians();

        let sin_alt = lat.sin() * position.declination.sin()
            + lat.cos() * position.declination.cos() * hour_angle.cos();
        let mut altitude = sin_alt.clamp(-1.0, 1.0).asin();

        if planet == Planet::Moon && position.distance > 1.0 {
            let parallax = (1.0 / position.distance).asin();
            altitude -= parallax * altitude.cos();
        }

        if altitude.is_finite() {
            Ok(altitude)
        } else {
            Err(ephemeris_error(planet, "altitude is not finite"))
        }
    }

    /// 從猜測值反覆修正，直到時角為零
    fn refine_transit(&self, planet: Planet, guess: f64) -> Result<f64> {
        let mut jd = guess;
        for _ in 0..TRANSIT_MAX_ITERATIONS {
            let mut hour_angle = self.hour_angle_at(planet, jd)?;
            if hour_angle > 180.0 {
                hour_angle -= 360.0;
            }
            let step = hour_angle / SIDEREAL_RATE;
            jd -= step;
            if step.abs() < TRANSIT_TOLERANCE_DAYS {
                break;
            }
        }
        Ok(jd)
    }

    pub fn next_transit(&self, planet: Planet, at: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let jd0 = julian_day(at);
        let hour_angle = self.hour_angle_at(planet, jd0)?;
        let mut transit = self.refine_transit(planet, jd0 + (360.0 - hour_angle) / SIDEREAL_RATE)?;
        if transit <= jd0 + ONE_SECOND_DAYS {
            transit = self.refine_transit(planet, transit + 1.0)?;
        }
        from_julian_day(transit).ok_or_else(|| ephemeris_error(planet, "transit out of range"))
    }

    pub fn previous_transit(&self, planet: Planet, at: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let jd0 = julian_day(at);
        let hour_angle = self.hour_angle_at(planet, jd0)?;
        let mut transit = self.refine_transit(planet, jd0 - hour_angle / SIDEREAL_RATE)?;
        if transit >= jd0 - ONE_SECOND_DAYS {
            transit = self.refine_transit(planet, transit - 1.0)?;
        }
        from_julian_day(transit).ok_or_else(|| ephemeris_error(planet, "transit out of range"))
    }
}

fn ephemeris_error(planet: Planet, message: &str) -> DashError {
    DashError::EphemerisError {
        body: planet.name().to_string(),
        message: message.to_string(),
    }
}
