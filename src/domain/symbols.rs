use crate::domain::model::SymbolGroup;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const BUILTIN_SYMBOLS: &str = include_str!("../../data/symbols.toml");

/// 自訂清單未指定時，取全部商品的前幾筆
pub const DEFAULT_CUSTOM_SIZE: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolOverrides {
    pub futures: Option<Vec<String>>,
    pub watchlist: Option<Vec<String>>,
    pub eye: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolUniverse {
    pub futures: Vec<String>,
    pub watchlist: Vec<String>,
    pub eye: Vec<String>,
}

impl SymbolUniverse {
    pub fn builtin() -> Result<Self> {
        Ok(toml::from_str(BUILTIN_SYMBOLS)?)
    }

    pub fn with_overrides(mut self, overrides: &SymbolOverrides) -> Self {
        if let Some(futures) = &overrides.futures {
            self.futures = futures.clone();
        }
        if let Some(watchlist) = &overrides.watchlist {
            self.watchlist = watchlist.clone();
        }
        if let Some(eye) = &overrides.eye {
            self.eye = eye.clone();
        }
        self
    }

    /// 三個清單的聯集，去重後依字母排序
    pub fn all(&self) -> Vec<String> {
        self.futures
            .iter()
            .chain(&self.watchlist)
            .chain(&self.eye)
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn default_custom(&self) -> Vec<String> {
        self.all().into_iter().take(DEFAULT_CUSTOM_SIZE).collect()
    }

    pub fn group(&self, group: SymbolGroup, custom: &[String]) -> Vec<String> {
        match group {
            SymbolGroup::AllSymbols => self.all(),
            SymbolGroup::Futures => self.futures.clone(),
            SymbolGroup::Watchlist => self.watchlist.clone(),
            SymbolGroup::EyeSymbols => self.eye.clone(),
            SymbolGroup::Custom if custom.is_empty() => self.default_custom(),
            SymbolGroup::Custom => custom
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}
