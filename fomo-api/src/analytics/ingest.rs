//! Request-time classification of analytics events
//!
//! User agents and referrers are classified once when an event is tracked;
//! aggregation only ever reads the stored labels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Search engines recognised in referrer URLs
pub const SEARCH_ENGINES: [&str; 6] = ["google", "bing", "yahoo", "duckduckgo", "yandex", "baidu"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Desktop,
    Mobile,
    Tablet,
}

impl DeviceType {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceType::Desktop => "desktop",
            DeviceType::Mobile => "mobile",
            DeviceType::Tablet => "tablet",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "desktop" => Ok(DeviceType::Desktop),
            "mobile" => Ok(DeviceType::Mobile),
            "tablet" => Ok(DeviceType::Tablet),
            other => Err(format!("Unknown device type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficSource {
    Direct,
    Referral,
    Search,
}

impl TrafficSource {
    pub fn as_str(self) -> &'static str {
        match self {
            TrafficSource::Direct => "direct",
            TrafficSource::Referral => "referral",
            TrafficSource::Search => "search",
        }
    }
}

impl fmt::Display for TrafficSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrafficSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(TrafficSource::Direct),
            "referral" => Ok(TrafficSource::Referral),
            "search" => Ok(TrafficSource::Search),
            other => Err(format!("Unknown traffic source: {}", other)),
        }
    }
}

/// Device, browser and OS derived from a user-agent string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub device_type: DeviceType,
    pub browser: String,
    pub os: String,
}

/// Classify a user-agent string
///
/// Unrecognised agents (including the empty string) count as desktop with
/// browser and OS "Unknown".
pub fn parse_user_agent(user_agent: &str) -> ClientInfo {
    let ua = user_agent.to_ascii_lowercase();

    ClientInfo {
        device_type: device_type(&ua),
        browser: browser_family(&ua).to_string(),
        os: os_family(&ua).to_string(),
    }
}

fn device_type(ua: &str) -> DeviceType {
    // Android tablets omit "mobile"; iPads may also say "mobile"
    let tablet = ua.contains("ipad")
        || ua.contains("tablet")
        || ua.contains("kindle")
        || ua.contains("silk/")
        || (ua.contains("android") && !ua.contains("mobile"));
    if tablet {
        return DeviceType::Tablet;
    }

    let mobile = ua.contains("mobi")
        || ua.contains("iphone")
        || ua.contains("ipod")
        || ua.contains("windows phone")
        || ua.contains("blackberry")
        || ua.contains("opera mini");
    if mobile {
        DeviceType::Mobile
    } else {
        DeviceType::Desktop
    }
}

fn browser_family(ua: &str) -> &'static str {
    // Order matters: most agents also claim to be Safari/Chrome/Mozilla
    if ua.contains("edg/") || ua.contains("edga/") || ua.contains("edgios/") {
        "Edge"
    } else if ua.contains("opr/") || ua.contains("opera") {
        "Opera"
    } else if ua.contains("yabrowser/") {
        "Yandex Browser"
    } else if ua.contains("samsungbrowser/") {
        "Samsung Internet"
    } else if ua.contains("firefox/") || ua.contains("fxios/") {
        "Firefox"
    } else if ua.contains("crios/") {
        "Chrome Mobile iOS"
    } else if ua.contains("chrome/") || ua.contains("chromium/") {
        if ua.contains("mobile") {
            "Chrome Mobile"
        } else {
            "Chrome"
        }
    } else if ua.contains("safari/") {
        if ua.contains("mobile") {
            "Mobile Safari"
        } else {
            "Safari"
        }
    } else if ua.contains("bot") || ua.contains("spider") || ua.contains("crawler") {
        "Bot"
    } else {
        "Unknown"
    }
}

fn os_family(ua: &str) -> &'static str {
    if ua.contains("windows phone") {
        "Windows Phone"
    } else if ua.contains("windows") {
        "Windows"
    } else if ua.contains("iphone") || ua.contains("ipad") || ua.contains("ipod") {
        "iOS"
    } else if ua.contains("mac os x") || ua.contains("macintosh") {
        "Mac OS X"
    } else if ua.contains("android") {
        "Android"
    } else if ua.contains("; cros ") {
        "Chrome OS"
    } else if ua.contains("linux") {
        "Linux"
    } else {
        "Unknown"
    }
}

/// Traffic source with its breakdown label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    pub source: TrafficSource,
    /// "Direct", a capitalised search engine name, or the referring host
    pub detail: String,
}

/// Classify an HTTP referrer
pub fn classify_referrer(referrer: Option<&str>) -> SourceInfo {
    let Some(referrer) = referrer.map(str::trim).filter(|r| !r.is_empty()) else {
        return SourceInfo {
            source: TrafficSource::Direct,
            detail: "Direct".to_string(),
        };
    };

    let lower = referrer.to_ascii_lowercase();
    if let Some(engine) = SEARCH_ENGINES.iter().find(|e| lower.contains(*e)) {
        return SourceInfo {
            source: TrafficSource::Search,
            detail: capitalize(engine),
        };
    }

    // Unparseable referrers (no scheme) are kept verbatim
    let detail = Url::parse(referrer)
        .ok()
        .and_then(|url| {
            url.host_str().map(|host| match url.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            })
        })
        .unwrap_or_else(|| referrer.to_string());

    SourceInfo {
        source: TrafficSource::Referral,
        detail,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
