use serde::{Deserialize, Serialize};
use thiserror::Error;

// ===== ERRORS =====

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid site config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unsupported site config version {0}")]
    UnsupportedVersion(String),
}

// ===== CONFIG TYPES =====

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    pub meta: MetaSection,
    pub scroll: ScrollSection,
    pub reveal: RevealSection,
    pub navigation: NavigationSection,
    pub document: DocumentSection,
    pub diagnostics: DiagnosticsSection,
}

impl SiteConfig {
    /// Parse a (possibly partial) TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig = toml::from_str(source)?;
        if !config.meta.is_current_version() {
            return Err(ConfigError::UnsupportedVersion(config.meta.version));
        }
        Ok(config)
    }
}

// MetaSection carries the config format version so old inline configs can be detected
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MetaSection {
    pub version: String,
}

impl MetaSection {
    /// Current configuration format version
    pub const CURRENT_VERSION: &'static str = "1.0.0";

    pub fn is_current_version(&self) -> bool {
        self.version == Self::CURRENT_VERSION
    }
}

impl Default for MetaSection {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ScrollSection {
    /// Added to the scroll offset before looking up the current section.
    pub section_offset_px: f64,
    /// The navbar gets its shadow strictly above this offset.
    pub shadow_threshold_px: f64,
    pub debounce_wait_ms: u32,
    pub debounce_immediate: bool,
    /// Re-evaluate once when a debounced burst ends on a position that was
    /// never evaluated.
    pub settle_after_burst: bool,
}

impl Default for ScrollSection {
    fn default() -> Self {
        Self {
            section_offset_px: 100.0,
            shadow_threshold_px: 50.0,
            debounce_wait_ms: 10,
            debounce_immediate: true,
            settle_after_burst: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RevealSection {
    pub threshold: f64,
    /// Stop observing an element once it has been revealed.
    pub unobserve_revealed: bool,
    pub hero_delay_ms: u32,
}

impl Default for RevealSection {
    fn default() -> Self {
        Self {
            threshold: 0.15,
            unobserve_revealed: false,
            hero_delay_ms: 100,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct NavigationSection {
    /// Element id of the collapsible mobile menu.
    pub collapse_id: String,
    pub accordion_breakpoint_px: f64,
    pub accordion_delay_ms: u32,
    pub accordion_margin_px: f64,
}

impl Default for NavigationSection {
    fn default() -> Self {
        Self {
            collapse_id: "navbarNav".to_string(),
            accordion_breakpoint_px: 768.0,
            accordion_delay_ms: 350,
            accordion_margin_px: 20.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DocumentSection {
    pub external_link_rel: String,
    pub preconnect_origin: Option<String>,
    pub responsive_tables: bool,
}

impl Default for DocumentSection {
    fn default() -> Self {
        Self {
            external_link_rel: "noopener noreferrer".to_string(),
            preconnect_origin: Some("https://cdn.jsdelivr.net".to_string()),
            responsive_tables: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DiagnosticsSection {
    pub log_level: String,
    pub banner: bool,
    pub brand_title: String,
    pub brand_tagline: String,
    pub brand_signature: String,
    pub title_style: String,
    pub body_style: String,
    pub track_cta_clicks: bool,
    pub report_load_time: bool,
    /// Case-insensitive user agent fragments that identify a mobile browser.
    pub mobile_user_agents: Vec<String>,
}

impl Default for DiagnosticsSection {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            banner: true,
            brand_title: "👨‍💻 L'Ingé Patrimoine".to_string(),
            brand_tagline: "La finance enfin logique.".to_string(),
            brand_signature: "Développé avec rigueur et passion.".to_string(),
            title_style: "color: #00D9FF; font-size: 20px; font-weight: bold;".to_string(),
            body_style: "color: #0A2540; font-size: 14px;".to_string(),
            track_cta_clicks: true,
            report_load_time: true,
            mobile_user_agents: [
                "Android",
                "webOS",
                "iPhone",
                "iPad",
                "iPod",
                "BlackBerry",
                "IEMobile",
                "Opera Mini",
            ]
            .iter()
            .map(|agent| agent.to_string())
            .collect(),
        }
    }
}

// ===== HELPERS =====

/// Case-insensitive match of a user agent against the configured mobile fragments.
pub fn is_mobile_user_agent(user_agent: &str, fragments: &[String]) -> bool {
    let user_agent = user_agent.to_lowercase();
    fragments
        .iter()
        .any(|fragment| user_agent.contains(&fragment.to_lowercase()))
}
