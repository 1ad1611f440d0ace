use crate::adapters::quotes::{YahooQuoteSource, DEFAULT_QUOTE_BASE_URL, MAX_QUOTE_TTL};
use crate::astro::{Observer, StrengthCalculator};
use crate::core::engine::{
    ScanPlan, DEFAULT_REFRESH_SECONDS, MAX_REFRESH_SECONDS, MIN_REFRESH_SECONDS,
};
use crate::core::scanner::{Scanner, DEFAULT_MAX_WORKERS};
use crate::domain::board::{BoardFilters, CONFIDENCE_STEP, DEFAULT_MIN_CONFIDENCE};
use crate::domain::model::{Signal, SymbolGroup};
use crate::domain::symbols::{SymbolOverrides, SymbolUniverse};
use crate::utils::error::{DashError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_step, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "astro-dash.toml";
pub const DEFAULT_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8501;
pub const DEFAULT_OUTPUT_PATH: &str = "./output";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub server: ServerConfig,
    pub market: MarketConfig,
    pub scan: ScanConfig,
    pub observer: Observer,
    pub filters: FiltersConfig,
    pub live: LiveConfig,
    pub export: ExportConfig,
    pub monitoring: MonitoringConfig,
    pub symbols: SymbolOverrides,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub quote_base_url: String,
    pub timeout_seconds: u64,
    pub cache_ttl_seconds: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            quote_base_url: DEFAULT_QUOTE_BASE_URL.to_string(),
            timeout_seconds: 5,
            cache_ttl_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub max_workers: usize,
    pub group: SymbolGroup,
    pub custom_symbols: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            group: SymbolGroup::default(),
            custom_symbols: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiltersConfig {
    pub min_confidence: u8,
    pub signals: Vec<String>,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            signals: Signal::DEFAULT_FILTER
                .iter()
                .map(|s| s.code().to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    pub enabled: bool,
    pub refresh_seconds: u64,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            refresh_seconds: DEFAULT_REFRESH_SECONDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_path: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl DashboardConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content)?;
        Ok(toml::from_str(&processed)?)
    }

    /// 指定路徑必須存在；未指定時讀取工作目錄下的預設檔，沒有就用內建預設值
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                tracing::info!("📁 Loading configuration from {}", DEFAULT_CONFIG_FILE);
                Self::from_file(DEFAULT_CONFIG_FILE)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn signals(&self) -> Result<Vec<Signal>> {
        self.filters.signals.iter().map(|s| s.parse()).collect()
    }

    pub fn board_filters(&self) -> Result<BoardFilters> {
        Ok(BoardFilters {
            min_confidence: self.filters.min_confidence,
            signals: self.signals()?,
        })
    }

    pub fn universe(&self) -> Result<SymbolUniverse> {
        Ok(SymbolUniverse::builtin()?.with_overrides(&self.symbols))
    }

    /// 依群組選出商品並帶上篩選條件
    pub fn scan_plan(&self) -> Result<ScanPlan> {
        let universe = self.universe()?;
        Ok(ScanPlan {
            symbols: universe.group(self.scan.group, &self.scan.custom_symbols),
            filters: self.board_filters()?,
        })
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.live.refresh_seconds)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.server.address.parse().map_err(|_| {
            DashError::invalid_value(
                "server.address",
                &self.server.address,
                "expected an IPv4 or IPv6 address",
            )
        })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    pub fn quote_source(&self) -> Result<YahooQuoteSource> {
        YahooQuoteSource::new(
            &self.market.quote_base_url,
            Duration::from_secs(self.market.timeout_seconds),
            Duration::from_secs(self.market.cache_ttl_seconds),
        )
    }

    pub fn scanner(&self) -> Result<Scanner> {
        Ok(Scanner::new(
            Arc::new(self.quote_source()?),
            Arc::new(StrengthCalculator::new(self.observer)),
            self.scan.max_workers,
        ))
    }
}

/// 替換環境變數 (例如 ${QUOTE_URL})；未設定的變數保持原樣
pub fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DashError::ConfigError {
        message: format!("invalid substitution pattern: {}", e),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let name = &caps[1];
        std::env::var(name).unwrap_or_else(|_| format!("${{{}}}", name))
    });
    Ok(result.into_owned())
}

impl Validate for DashboardConfig {
    fn validate(&self) -> Result<()> {
        validate_url("market.quote_base_url", &self.market.quote_base_url)?;
        validate_positive_number("market.timeout_seconds", self.market.timeout_seconds as usize, 1)?;
        validate_range(
            "market.cache_ttl_seconds",
            self.market.cache_ttl_seconds,
            0,
            MAX_QUOTE_TTL.as_secs(),
        )?;
        validate_positive_number("scan.max_workers", self.scan.max_workers, 1)?;

        validate_range("filters.min_confidence", self.filters.min_confidence, 0, 100)?;
        validate_step("filters.min_confidence", self.filters.min_confidence, CONFIDENCE_STEP)?;
        self.signals()?;

        validate_range(
            "live.refresh_seconds",
            self.live.refresh_seconds,
            MIN_REFRESH_SECONDS,
            MAX_REFRESH_SECONDS,
        )?;
        validate_range("observer.latitude", self.observer.latitude, -90.0, 90.0)?;
        validate_range("observer.longitude", self.observer.longitude, -180.0, 180.0)?;

        validate_path("export.output_path", &self.export.output_path)?;
        validate_non_empty_string("server.address", &self.server.address)?;
        self.socket_addr()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_dashboard_controls() {
        let config = DashboardConfig::default();
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.server.address, "0.0.0.0");
        assert_eq!(config.filters.min_confidence, 30);
        assert_eq!(config.signals().unwrap(), Signal::DEFAULT_FILTER.to_vec());
        assert!(config.live.enabled);
        assert_eq!(config.refresh_interval(), Duration::from_secs(60));
        assert_eq!(config.scan.max_workers, 16);
        assert_eq!(config.scan.group, SymbolGroup::AllSymbols);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = DashboardConfig::from_toml_str(
            r#"
[server]
port = 9000

[scan]
group = "eye_symbols"
max_workers = 4

[observer]
latitude = 19.07
longitude = 72.88

[filters]
min_confidence = 55
signals = ["strong buy", "SELL"]

[symbols]
eye = ["MCX:GOLD1!"]
"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.address, DEFAULT_ADDRESS);
        assert_eq!(config.scan.group, SymbolGroup::EyeSymbols);
        assert_eq!(config.observer.latitude, 19.07);
        assert_eq!(
            config.board_filters().unwrap(),
            BoardFilters {
                min_confidence: 55,
                signals: vec![Signal::StrongBuy, Signal::Sell],
            }
        );
        assert_eq!(config.universe().unwrap().eye, vec!["MCX:GOLD1!"]);
        assert_eq!(config.scan_plan().unwrap().symbols, vec!["MCX:GOLD1!"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("ASTRO_DASH_TEST_QUOTES", "http://127.0.0.1:9999");
        let config = DashboardConfig::from_toml_str(
            r#"
[market]
quote_base_url = "${ASTRO_DASH_TEST_QUOTES}"
"#,
        )
        .unwrap();
        assert_eq!(config.market.quote_base_url, "http://127.0.0.1:9999");

        let untouched = substitute_env_vars("x = \"${ASTRO_DASH_TEST_UNSET_VAR}\"").unwrap();
        assert_eq!(untouched, "x = \"${ASTRO_DASH_TEST_UNSET_VAR}\"");
    }

    #[test]
    fn test_validation_rejects_out_of_range_values() {
        let mut config = DashboardConfig::default();
        config.filters.min_confidence = 33;
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.live.refresh_seconds = 5;
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.scan.max_workers = 0;
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.observer.latitude = 91.0;
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.filters.signals = vec!["MOON".to_string()];
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.market.quote_base_url = "ftp://quotes".to_string();
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.server.address = "localhost".to_string();
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.server.address = "   ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cache_ttl_must_fit_quote_cache() {
        let config = DashboardConfig::from_toml_str(
            r#"
[market]
cache_ttl_seconds = 40000000000
"#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("market.cache_ttl_seconds"));

        let mut config = DashboardConfig::default();
        config.market.cache_ttl_seconds = 86_400;
        assert!(config.validate().is_ok());
        assert!(config.scanner().is_ok());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[live]\nenabled = false\nrefresh_seconds = 120").unwrap();

        let config = DashboardConfig::from_file(file.path()).unwrap();
        assert!(!config.live.enabled);
        assert_eq!(config.live.refresh_seconds, 120);

        assert!(DashboardConfig::discover(Some(Path::new("/nonexistent/astro.toml"))).is_err());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = DashboardConfig::from_toml_str("[server\nport = 1").unwrap_err();
        assert!(matches!(err, DashError::TomlError(_)));
    }
}
