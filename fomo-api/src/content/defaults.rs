//! Default documents for the singleton settings
//!
//! A settings document is created from these on its first read. Text shown
//! on the landing page is a [`LocalizedText`]; URLs and brand names are plain.

use fomo_common::{LocalizedText, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use fomo_common::db::Document;

fn text(en: &str, ru: &str) -> LocalizedText {
    LocalizedText::new(en, ru)
}

/// Serialize a defaults struct into a document body
pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(fomo_common::Error::Internal(format!(
            "Default settings must be an object, got {}",
            other
        ))),
    }
}

// ========================================
// Hero
// ========================================

#[derive(Debug, Clone, Serialize)]
pub struct HeroActionButton {
    pub text: LocalizedText,
    pub link: String,
    pub primary: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeroStat {
    pub value: String,
    pub label: LocalizedText,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeroSettings {
    pub badge: LocalizedText,
    pub title_line1: LocalizedText,
    pub title_line2: LocalizedText,
    pub subtitle: LocalizedText,
    pub action_buttons: Vec<HeroActionButton>,
    pub stats: Vec<HeroStat>,
}

impl Default for HeroSettings {
    fn default() -> Self {
        Self {
            badge: text("Now in Beta v1.1", "Бета-версия v1.1"),
            title_line1: text("The Future of", "Будущее"),
            title_line2: text("Crypto Analytics", "крипто-аналитики"),
            subtitle: text(
                "Discover a comprehensive platform combining social engagement, data analytics, and seamless access to crypto projects, NFTs, and more.",
                "Платформа, объединяющая сообщество, аналитику данных и удобный доступ к крипто-проектам, NFT и многому другому.",
            ),
            action_buttons: vec![
                HeroActionButton {
                    text: text("Launch App", "Открыть приложение"),
                    link: "#".to_string(),
                    primary: true,
                },
                HeroActionButton {
                    text: text("Learn More", "Подробнее"),
                    link: "#about".to_string(),
                    primary: false,
                },
            ],
            stats: vec![
                HeroStat {
                    value: "45K+".to_string(),
                    label: text("Community Members", "Участников сообщества"),
                },
                HeroStat {
                    value: "16K+".to_string(),
                    label: text("Tracked Projects", "Отслеживаемых проектов"),
                },
            ],
        }
    }
}

// ========================================
// About
// ========================================

#[derive(Debug, Clone, Serialize)]
pub struct AboutFeature {
    pub icon: String,
    pub title: LocalizedText,
    pub description: LocalizedText,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AboutSettings {
    pub badge: LocalizedText,
    pub title: LocalizedText,
    pub title_highlight: LocalizedText,
    pub subtitle: LocalizedText,
    pub description: LocalizedText,
    pub features: Vec<AboutFeature>,
    pub whitepaper_button_text: LocalizedText,
    pub whitepaper_button_link: String,
}

impl Default for AboutSettings {
    fn default() -> Self {
        let feature = |icon: &str, title: LocalizedText, description: LocalizedText, color: &str| AboutFeature {
            icon: icon.to_string(),
            title,
            description,
            color: color.to_string(),
        };

        Self {
            badge: text("About Us", "О нас"),
            title: text("What is", "Что такое"),
            title_highlight: LocalizedText::uniform("FOMO"),
            subtitle: text(
                "A cutting-edge platform reshaping how users interact with the crypto world",
                "Платформа, меняющая то, как пользователи взаимодействуют с криптомиром",
            ),
            description: text(
                "FOMO brings social engagement, data analytics and seamless access to crypto projects, NFTs and funds into one ecosystem.",
                "FOMO объединяет сообщество, аналитику данных и удобный доступ к крипто-проектам, NFT и фондам в одной экосистеме.",
            ),
            features: vec![
                feature(
                    "diamond",
                    text("Community-Driven", "Решает сообщество"),
                    text(
                        "Every user influences the project through voting and social engagement.",
                        "Каждый пользователь влияет на проект через голосования и активность.",
                    ),
                    "emerald",
                ),
                feature(
                    "clock",
                    text("24/7 Support", "Поддержка 24/7"),
                    text(
                        "Our support never stops. We are here offering guidance every step.",
                        "Наша поддержка работает без перерывов и помогает на каждом шаге.",
                    ),
                    "teal",
                ),
                feature(
                    "lightning",
                    text("Fast & Efficient", "Быстро и эффективно"),
                    text(
                        "Launch your project quickly with FOMO tools and support.",
                        "Запускайте проект быстро с инструментами и поддержкой FOMO.",
                    ),
                    "cyan",
                ),
                feature(
                    "shield",
                    text("Secure & Reliable", "Надёжно и безопасно"),
                    text(
                        "All transactions via secure smart contracts for max protection.",
                        "Все операции проходят через защищённые смарт-контракты.",
                    ),
                    "violet",
                ),
            ],
            whitepaper_button_text: text("Whitepaper", "Whitepaper"),
            whitepaper_button_link: "#".to_string(),
        }
    }
}

// ========================================
// Footer
// ========================================

#[derive(Debug, Clone, Serialize)]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FooterLink {
    pub name: LocalizedText,
    pub url: String,
    pub order: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FooterSection {
    pub title: LocalizedText,
    pub links: Vec<FooterLink>,
    pub order: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FooterSettings {
    pub company_name: String,
    pub company_description: LocalizedText,
    pub company_address: String,
    pub company_phone: String,
    pub company_email: String,
    pub social_media: Vec<SocialLink>,
    pub navigation_sections: Vec<FooterSection>,
    pub copyright: LocalizedText,
    pub legal_disclaimer: LocalizedText,
}

impl Default for FooterSettings {
    fn default() -> Self {
        let link = |en: &str, ru: &str, url: &str, order: i64| FooterLink {
            name: text(en, ru),
            url: url.to_string(),
            order,
        };

        Self {
            company_name: "FOMO".to_string(),
            company_description: text(
                "Leading cryptocurrency analytics platform",
                "Ведущая платформа крипто-аналитики",
            ),
            company_address: "4 World Trade Center\n150 Greenwich St Floor 45\nNew York, NY 10007".to_string(),
            company_phone: "(646) 845-0036".to_string(),
            company_email: "info@fomo.io".to_string(),
            social_media: ["github", "linkedin", "youtube"]
                .into_iter()
                .map(|platform| SocialLink {
                    platform: platform.to_string(),
                    url: format!("https://{}.com", platform),
                })
                .collect(),
            navigation_sections: vec![
                FooterSection {
                    title: text("COMPANY", "КОМПАНИЯ"),
                    links: vec![
                        link("About", "О нас", "#about", 1),
                        link("Team", "Команда", "#team", 2),
                    ],
                    order: 1,
                },
                FooterSection {
                    title: text("PLATFORM", "ПЛАТФОРМА"),
                    links: vec![
                        link("Projects", "Проекты", "#projects", 1),
                        link("Roadmap", "Дорожная карта", "#roadmap", 2),
                        link("Partners", "Партнёры", "#partners", 3),
                    ],
                    order: 2,
                },
            ],
            copyright: text("© FOMO. All rights reserved.", "© FOMO. Все права защищены."),
            legal_disclaimer: text(
                "Products and services are offered by FOMO as a crypto analytics platform. All trading and investment decisions are the sole responsibility of the user.",
                "Продукты и услуги FOMO предоставляются как платформа крипто-аналитики. Все торговые и инвестиционные решения пользователь принимает самостоятельно.",
            ),
        }
    }
}

// ========================================
// Community
// ========================================

#[derive(Debug, Clone, Serialize)]
pub struct CommunitySocial {
    pub platform: String,
    pub url: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommunitySettings {
    pub title: LocalizedText,
    pub description: LocalizedText,
    pub socials: Vec<CommunitySocial>,
    pub subscribe_enabled: bool,
    pub subscribe_title: LocalizedText,
}

impl Default for CommunitySettings {
    fn default() -> Self {
        Self {
            title: text("Join the Community", "Присоединяйтесь к сообществу"),
            description: text(
                "Connect with web3 founders, developers, and crypto enthusiasts from around the world.",
                "Общайтесь с основателями web3-проектов, разработчиками и энтузиастами со всего мира.",
            ),
            socials: [
                ("twitter", "https://twitter.com"),
                ("telegram", "https://t.me"),
                ("discord", "https://discord.com"),
            ]
            .into_iter()
            .map(|(platform, url)| CommunitySocial {
                platform: platform.to_string(),
                url: url.to_string(),
                enabled: true,
            })
            .collect(),
            subscribe_enabled: true,
            subscribe_title: text("Stay Updated", "Будьте в курсе"),
        }
    }
}

// ========================================
// Platform
// ========================================

/// Sparkline shown under a stat card
pub fn default_trend() -> Vec<u32> {
    vec![50, 55, 52, 60, 58, 65, 62, 70, 68, 75, 72, 80]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformStat {
    pub value: String,
    pub label: LocalizedText,
    pub change: String,
    #[serde(default = "default_trend")]
    pub trend: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceModule {
    pub icon: String,
    pub name: LocalizedText,
    pub count: String,
    pub label: LocalizedText,
    pub color: String,
}

/// Numbered entry of the services column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceItem {
    pub num: String,
    pub title: LocalizedText,
    pub description: LocalizedText,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BottomStat {
    pub value: String,
    pub label: LocalizedText,
    pub description: LocalizedText,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformSettings {
    pub community: PlatformStat,
    pub visits: PlatformStat,
    pub projects: PlatformStat,
    pub alerts: PlatformStat,
    pub service_modules: Vec<ServiceModule>,
    pub services_list: Vec<ServiceItem>,
    pub bottom_stats: Vec<BottomStat>,
    pub section_badge: LocalizedText,
    pub section_title: LocalizedText,
    pub section_intro: LocalizedText,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        let stat = |value: &str, en: &str, ru: &str, change: &str| PlatformStat {
            value: value.to_string(),
            label: text(en, ru),
            change: change.to_string(),
            trend: default_trend(),
        };
        let module = |icon: &str, name: LocalizedText, count: &str, label: LocalizedText, color: &str| ServiceModule {
            icon: icon.to_string(),
            name,
            count: count.to_string(),
            label,
            color: color.to_string(),
        };

        Self {
            community: stat("45,658", "Community Members", "Участников сообщества", "+12%"),
            visits: stat("1.2M", "Monthly Visits", "Посещений в месяц", "+18%"),
            projects: stat("16,670", "Tracked Projects", "Отслеживаемых проектов", "+8%"),
            alerts: stat("892", "Red Flag Alerts", "Красных флагов", "-15%"),
            service_modules: vec![
                module("📊", text("Dashboard", "Дашборд"), "2,847", text("active users", "активных пользователей"), "emerald"),
                module("💱", text("OTC Market", "OTC маркет"), "$50M+", text("volume", "объём"), "blue"),
                module("🔄", text("P2P Exchange", "P2P обмен"), "1,245", text("trades/day", "сделок/день"), "purple"),
                module("🎯", text("Predictions", "Прогнозы"), "78%", text("accuracy", "точность"), "orange"),
                module("🚀", LocalizedText::uniform("EarlyLand"), "340+", text("projects", "проектов"), "green"),
            ],
            services_list: vec![
                ServiceItem {
                    num: "01".to_string(),
                    title: text("OTC & P2P MARKETS", "OTC & P2P РЫНКИ"),
                    description: text(
                        "Secure over-the-counter trading and peer-to-peer exchange for crypto assets with escrow protection and verified counterparties.",
                        "Безопасная внебиржевая торговля и P2P-обмен криптоактивами с защитой эскроу и верифицированными контрагентами.",
                    ),
                },
                ServiceItem {
                    num: "02".to_string(),
                    title: text("EARLY LAND ACCESS", "РАННИЙ ДОСТУП"),
                    description: text(
                        "Get early access to promising projects, participate in airdrops, and maximize your earning potential before public launches.",
                        "Получите ранний доступ к перспективным проектам, участвуйте в airdrop'ах и максимизируйте свой заработок до публичных запусков.",
                    ),
                },
                ServiceItem {
                    num: "03".to_string(),
                    title: text("ANALYTICS & SENTIMENT", "АНАЛИТИКА И СЕНТИМЕНТ"),
                    description: text(
                        "Advanced parsing, sentiment analysis, and red flag detection to identify scams and make informed investment decisions.",
                        "Продвинутый парсинг, анализ настроений и обнаружение красных флагов для выявления скамов и принятия обоснованных инвестиционных решений.",
                    ),
                },
            ],
            bottom_stats: vec![
                BottomStat {
                    value: "70%".to_string(),
                    label: text("ANALYSIS AUTOMATED", "АВТОМАТИЗАЦИЯ АНАЛИЗА"),
                    description: text("AI-powered insights in seconds", "AI-инсайты за секунды"),
                },
                BottomStat {
                    value: "24/7".to_string(),
                    label: text("MARKET COVERAGE", "ОХВАТ РЫНКА"),
                    description: text("Real-time monitoring", "Мониторинг в реальном времени"),
                },
                BottomStat {
                    value: "$50M+".to_string(),
                    label: text("TRADING VOLUME", "ОБЪЁМ ТОРГОВ"),
                    description: text("Across all markets", "На всех рынках"),
                },
            ],
            section_badge: text("INSIDE THE PLATFORM", "ВНУТРИ ПЛАТФОРМЫ"),
            section_title: text(
                "A command center for your crypto journey",
                "Командный центр для вашего крипто-путешествия",
            ),
            section_intro: text(
                "See every market move, track projects, manage your portfolio, and access exclusive opportunities in one place.",
                "Следите за рынком, отслеживайте проекты, управляйте портфелем и получайте доступ к эксклюзивным возможностям в одном месте.",
            ),
        }
    }
}

// ========================================
// Roadmap section
// ========================================

#[derive(Debug, Clone, Serialize)]
pub struct RoadmapSettings {
    pub section_badge: LocalizedText,
    pub section_title: LocalizedText,
    pub section_subtitle: LocalizedText,
}

impl Default for RoadmapSettings {
    fn default() -> Self {
        Self {
            section_badge: text("Our Progress", "Наш прогресс"),
            section_title: text("Project Roadmap", "Дорожная карта проекта"),
            section_subtitle: text(
                "Track our development progress in real-time",
                "Следите за ходом разработки в реальном времени",
            ),
        }
    }
}

// ========================================
// Utilities section
// ========================================

#[derive(Debug, Clone, Serialize)]
pub struct UtilitiesSectionSettings {
    pub badge: LocalizedText,
    pub title: LocalizedText,
    pub title_highlight: LocalizedText,
    pub subtitle: LocalizedText,
    pub click_hint: LocalizedText,
    pub click_back_hint: LocalizedText,
    pub features_title: LocalizedText,
    pub details_label: LocalizedText,
}

impl Default for UtilitiesSectionSettings {
    fn default() -> Self {
        Self {
            badge: text("Our Utilities", "Наши утилиты"),
            title: text("Powerful", "Мощные"),
            title_highlight: text("Crypto Trading Tools", "инструменты для крипто-трейдинга"),
            subtitle: text(
                "Comprehensive ecosystem of tools for earning in crypto industry",
                "Полная экосистема инструментов для заработка в криптоиндустрии",
            ),
            click_hint: text("Click for details", "Нажмите для подробностей"),
            click_back_hint: text("Click to go back", "Нажмите, чтобы вернуться"),
            features_title: text("Features:", "Возможности:"),
            details_label: text("Details", "Подробнее"),
        }
    }
}

// ========================================
// Cookie consent
// ========================================

#[derive(Debug, Clone, Serialize)]
pub struct CookieConsentSettings {
    pub enabled: bool,
    pub privacy_policy_url: String,
    pub terms_url: String,
    pub cookie_policy_url: String,
    pub title: LocalizedText,
    pub description: LocalizedText,
}

impl Default for CookieConsentSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            privacy_policy_url: "/privacy".to_string(),
            terms_url: "/terms".to_string(),
            cookie_policy_url: "/cookies".to_string(),
            title: text("Cookie & Privacy Settings", "Настройки cookie и конфиденциальности"),
            description: text(
                "We value your privacy. Please accept our cookies and privacy policy to continue exploring the FOMO platform.",
                "Мы ценим вашу конфиденциальность. Примите cookie и политику конфиденциальности, чтобы продолжить работу с платформой FOMO.",
            ),
        }
    }
}

pub fn hero() -> Result<Document> {
    to_document(&HeroSettings::default())
}

pub fn about() -> Result<Document> {
    to_document(&AboutSettings::default())
}

pub fn footer() -> Result<Document> {
    to_document(&FooterSettings::default())
}

pub fn community() -> Result<Document> {
    to_document(&CommunitySettings::default())
}

pub fn platform() -> Result<Document> {
    to_document(&PlatformSettings::default())
}

pub fn roadmap() -> Result<Document> {
    to_document(&RoadmapSettings::default())
}

pub fn utilities_section() -> Result<Document> {
    to_document(&UtilitiesSectionSettings::default())
}

pub fn cookie_consent() -> Result<Document> {
    to_document(&CookieConsentSettings::default())
}
