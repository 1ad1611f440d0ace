use crate::astro::ephemeris::{Ephemeris, Observer};
use crate::domain::model::{Planet, PlanetReading};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use lru::LruCache;
use std::f64::consts::FRAC_PI_2;
use std::num::NonZeroUsize;
use std::sync::Mutex;

pub const STRENGTH_CACHE_SIZE: usize = 512;

/// 行星強度 = 地平高度 / 90°，範圍 -1 到 1
///
/// 同一次掃描內所有商品共用同一個時間點，因此以 (行星, 毫秒時間戳) 做快取，
/// 一次掃描最多只需要計算十次星曆。
pub struct StrengthCalculator {
    ephemeris: Ephemeris,
    cache: Mutex<LruCache<(Planet, i64), PlanetReading>>,
}

impl StrengthCalculator {
    pub fn new(observer: Observer) -> Self {
        Self::with_capacity(observer, STRENGTH_CACHE_SIZE)
    }

    pub fn with_capacity(observer: Observer, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            ephemeris: Ephemeris::new(observer),
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn reading(&self, planet: Planet, at: DateTime<Utc>) -> PlanetReading {
        let key = (planet, at.timestamp_millis());
        if let Some(hit) = self.cache.lock().ok().and_then(|mut c| c.get(&key).copied()) {
            return hit;
        }

        let reading = match self.compute(planet, at) {
            Ok(reading) => reading,
            Err(e) => {
                tracing::warn!("⚠️ Planet calc error for {}: {}", planet, e);
                PlanetReading::neutral()
            }
        };

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, reading);
        }
        reading
    }

    fn compute(&self, planet: Planet, at: DateTime<Utc>) -> Result<PlanetReading> {
        let altitude = self.ephemeris.altitude(planet, at)?;
        Ok(PlanetReading {
            strength: altitude / FRAC_PI_2,
            next_transit: Some(self.ephemeris.next_transit(planet, at)?),
            prev_transit: Some(self.ephemeris.previous_transit(planet, at)?),
        })
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl Default for StrengthCalculator {
    fn default() -> Self {
        Self::new(Observer::default())
    }
}
