//! Localized text for the fixed locale set served by the landing page
//!
//! Content documents carry every user-visible string in both Russian and
//! English. Instead of `title_ru`/`title_en` field pairs, a document holds a
//! single `title: {"en": ..., "ru": ...}` object. Legacy payloads using the
//! suffixed form are collapsed with [`collapse_suffixed_fields`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Supported content locales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Ru,
}

impl Locale {
    /// All locales, in fallback priority order
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Ru];

    /// Locale used when a translation is missing
    pub const DEFAULT: Locale = Locale::En;

    /// Two-letter code, also used as the legacy field suffix
    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ru => "ru",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = crate::Error;

    /// Accepts bare codes and region-qualified tags (`en`, `RU`, `en-US`, `ru_RU`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let primary = s
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match primary.as_str() {
            "en" => Ok(Locale::En),
            "ru" => Ok(Locale::Ru),
            _ => Err(crate::Error::InvalidInput(format!("Unsupported locale: {}", s))),
        }
    }
}

/// A string translated into every [`Locale`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default)]
    pub en: String,
    #[serde(default)]
    pub ru: String,
}

impl LocalizedText {
    pub fn new(en: impl Into<String>, ru: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            ru: ru.into(),
        }
    }

    /// Same text for every locale (URLs, brand names)
    pub fn uniform(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            en: text.clone(),
            ru: text,
        }
    }

    /// Raw translation for `locale`, possibly empty
    pub fn raw(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.en,
            Locale::Ru => &self.ru,
        }
    }

    /// Translation for `locale`, falling back to the default locale when empty
    pub fn get(&self, locale: Locale) -> &str {
        let text = self.raw(locale);
        if text.is_empty() {
            self.raw(Locale::DEFAULT)
        } else {
            text
        }
    }

    pub fn set(&mut self, locale: Locale, text: impl Into<String>) {
        match locale {
            Locale::En => self.en = text.into(),
            Locale::Ru => self.ru = text.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Locale::ALL.iter().all(|l| self.raw(*l).is_empty())
    }
}

/// Collapse legacy `<field>_<locale>` pairs into `<field>: {<locale>: ...}` objects
///
/// Only string values are collapsed. A null suffixed value means "not provided"
/// and is dropped without touching the base field. A suffixed key is left alone
/// when its base field already exists with a non-object value.
pub fn collapse_suffixed_fields(doc: &mut Map<String, Value>) {
    let suffixed: Vec<(String, String, Locale)> = doc
        .keys()
        .filter_map(|key| {
            Locale::ALL.iter().find_map(|locale| {
                let suffix = format!("_{}", locale.code());
                key.strip_suffix(&suffix)
                    .filter(|base| !base.is_empty())
                    .map(|base| (key.clone(), base.to_string(), *locale))
            })
        })
        .collect();

    for (key, base, locale) in suffixed {
        let text = match doc.get(&key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) => {
                doc.remove(&key);
                continue;
            }
            _ => continue,
        };

        let target = doc
            .entry(base)
            .or_insert_with(|| Value::Object(Map::new()));

        if let Value::Object(obj) = target {
            obj.insert(locale.code().to_string(), Value::String(text));
            doc.remove(&key);
        }
    }
}
