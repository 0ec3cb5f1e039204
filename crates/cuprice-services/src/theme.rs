//! Theme resolution
//!
//! Each visual token is taken from the new-style `themeSettings`, then the
//! legacy `theme`, then a built-in default. The first *present* value wins
//! even if it turns out to be invalid, in which case the default is used.

use cuprice_core::models::{LegacyTheme, Project, ThemeSettings};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::constants::MAX_BORDER_RADIUS;
use crate::css::scope_custom_css;

pub const DEFAULT_FONT_FAMILY: &str = "Inter";
pub const DEFAULT_PRIMARY_COLOR: &str = "#298558";
pub const DEFAULT_HOVER_COLOR: &str = "#1A5A3A";
pub const DEFAULT_BUTTON_TEXT_COLOR: &str = "#FAFAFA";
pub const DEFAULT_CUSTOM_PLAN_BUTTON_COLOR: &str = "#298558";
pub const DEFAULT_CUSTOM_PLAN_BUTTON_TEXT_COLOR: &str = "#FAFAFA";
pub const DEFAULT_POPULAR_BADGE_COLOR: &str = "#22C55E";
pub const DEFAULT_POPULAR_BADGE_BORDER_COLOR: &str = "#16A34A";
pub const DEFAULT_POPULAR_BADGE_TEXT_COLOR: &str = "#FFFFFF";
pub const DEFAULT_BORDER_RADIUS: &str = "10px";
pub const DEFAULT_CARD_BACKGROUND: &str = "#FFFFFF";
pub const DEFAULT_BORDER_COLOR: &str = "#E5E5E5";
pub const DEFAULT_PAGE_BACKGROUND: &str = "#FFFFFF";
pub const DEFAULT_HEADER_TEXT_COLOR: &str = "#737373";
pub const DEFAULT_DESCRIPTION_COLOR: &str = "#0A0A0A";
pub const DEFAULT_PRICE_COLOR: &str = "#0A0A0A";
pub const DEFAULT_TEXT_COLOR: &str = "#0A0A0A";

/// Foreground on primary surfaces; not configurable
const PRIMARY_FOREGROUND: &str = "#FAFAFA";

const FONT_FALLBACK: &str =
    "var(--font-sans, Inter, -apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, \"Helvetica Neue\", Arial, sans-serif)";

static HEX6: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("hex colour pattern is valid"));

static HEX_ANY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#(?:[0-9A-Fa-f]{3}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$")
        .expect("hex colour pattern is valid")
});

static FUNCTIONAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i:rgba?|hsla?)\(\s*[0-9.%+\-]+(?:\s*[,/ ]\s*[0-9.%+\-]+){2,3}\s*\)$")
        .expect("functional colour pattern is valid")
});

/// Accept `#RRGGBB` only, upper-cased; anything else yields `fallback`
pub fn normalize_hex(candidate: Option<&str>, fallback: &str) -> String {
    match candidate.map(str::trim) {
        Some(value) if HEX6.is_match(value) => value.to_uppercase(),
        _ => fallback.to_string(),
    }
}

/// Accept hex (`#RGB`, `#RRGGBB`, `#RRGGBBAA`) or `rgb()/rgba()/hsl()/hsla()`
pub fn normalize_color(candidate: Option<&str>, fallback: &str) -> String {
    match candidate.map(str::trim) {
        Some(value) if HEX_ANY.is_match(value) => value.to_uppercase(),
        Some(value) if FUNCTIONAL.is_match(value) => value.to_string(),
        _ => fallback.to_string(),
    }
}

/// Leading integer of a string, like a lenient `parseInt`
fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let end = trimmed
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+'))))
        .map_or(trimmed.len(), |(i, _)| i);

    trimmed[..end].parse().ok()
}

/// `N px` for an integer setting in 0..=50, else the default radius
pub fn resolve_border_radius(setting: Option<&str>) -> String {
    setting
        .and_then(leading_integer)
        .filter(|r| (0..=MAX_BORDER_RADIUS).contains(r))
        .map_or_else(|| DEFAULT_BORDER_RADIUS.to_string(), |r| format!("{}px", r))
}

/// CSS font stack with the chosen family first
pub fn font_stack(font_family: &str) -> String {
    format!("'{}', {}", font_family.replace('\'', "\\'"), FONT_FALLBACK)
}

/// One field of an optional theme payload
fn pick<'a, T>(source: Option<&'a T>, field: fn(&T) -> Option<&String>) -> Option<&'a str> {
    source.and_then(field).map(String::as_str)
}

/// First present candidate
fn first<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates.iter().copied().flatten().next()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Resolved visual tokens
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTheme {
    pub font_family: String,
    pub font_stack: String,
    pub primary_color: String,
    pub hover_color: String,
    pub button_text_color: String,
    pub custom_plan_button_color: String,
    pub custom_plan_button_text_color: String,
    pub popular_badge_color: String,
    pub popular_badge_border_color: String,
    pub popular_badge_text_color: String,
    pub border_radius: String,
    pub card_background: String,
    pub border_color: String,
    pub page_background: String,
    pub header_text_color: String,
    pub description_color: String,
    pub price_color: String,
    pub text_color: String,
    pub show_project_name: bool,
    pub show_pricing_header: bool,
    /// Seller CSS after scoping, if any
    pub custom_css: Option<String>,
}

impl Default for ResolvedTheme {
    fn default() -> Self {
        resolve_theme(None, None)
    }
}

impl ResolvedTheme {
    /// CSS custom properties set on the widget root
    pub fn css_variables(&self) -> Vec<(&'static str, String)> {
        vec![
            ("--base-primary", self.primary_color.clone()),
            ("--base-primary-hover", self.hover_color.clone()),
            ("--base-primary-foreground", PRIMARY_FOREGROUND.to_string()),
            ("--pricing-button-text", self.button_text_color.clone()),
            ("--custom-plan-button-bg", self.custom_plan_button_color.clone()),
            ("--custom-plan-button-text", self.custom_plan_button_text_color.clone()),
            ("--popular-badge-border", self.popular_badge_border_color.clone()),
            ("--popular-badge-bg", self.popular_badge_color.clone()),
            ("--popular-badge-text", self.popular_badge_text_color.clone()),
            ("--pricing-border-radius", self.border_radius.clone()),
            ("--base-card", self.card_background.clone()),
            ("--pricing-card-background", self.card_background.clone()),
            ("--pricing-border-color", self.border_color.clone()),
            ("--pricing-page-background", self.page_background.clone()),
            ("--pricing-header-text-color", self.header_text_color.clone()),
            ("--pricing-description-color", self.description_color.clone()),
            ("--pricing-price-color", self.price_color.clone()),
            ("--pricing-text-color", self.text_color.clone()),
            ("--base-foreground", self.text_color.clone()),
        ]
    }

    /// Inline style declaration for the widget root
    pub fn root_style(&self) -> String {
        let mut style = format!("font-family: {}; background: {};", self.font_stack, self.page_background);
        for (name, value) in self.css_variables() {
            style.push_str(&format!(" {}: {};", name, value));
        }
        style
    }
}

/// Resolve every token from the two theme payloads
pub fn resolve_theme(settings: Option<&ThemeSettings>, legacy: Option<&LegacyTheme>) -> ResolvedTheme {
    let font_family = non_blank(pick(settings, |s| s.font_family.as_ref()))
        .or_else(|| non_blank(pick(legacy, |l| l.font_family.as_ref())))
        .unwrap_or(DEFAULT_FONT_FAMILY)
        .to_string();

    ResolvedTheme {
        font_stack: font_stack(&font_family),
        font_family,
        primary_color: normalize_color(
            first(&[pick(settings, |s| s.primary_color.as_ref()), pick(legacy, |l| l.primary_color.as_ref())]),
            DEFAULT_PRIMARY_COLOR,
        ),
        hover_color: normalize_color(pick(settings, |s| s.hover_color.as_ref()), DEFAULT_HOVER_COLOR),
        button_text_color: normalize_hex(
            first(&[
                pick(settings, |s| s.button_text_color.as_ref()),
                pick(settings, |s| s.font_color.as_ref()),
                pick(legacy, |l| l.button_text_color.as_ref()),
                pick(legacy, |l| l.font_color.as_ref()),
            ]),
            DEFAULT_BUTTON_TEXT_COLOR,
        ),
        custom_plan_button_color: normalize_hex(
            first(&[
                pick(settings, |s| s.custom_plan_button_color.as_ref()),
                pick(legacy, |l| l.custom_plan_button_color.as_ref()),
            ]),
            DEFAULT_CUSTOM_PLAN_BUTTON_COLOR,
        ),
        custom_plan_button_text_color: normalize_hex(
            first(&[
                pick(settings, |s| s.custom_plan_button_text_color.as_ref()),
                pick(legacy, |l| l.custom_plan_button_text_color.as_ref()),
            ]),
            DEFAULT_CUSTOM_PLAN_BUTTON_TEXT_COLOR,
        ),
        popular_badge_color: normalize_color(
            first(&[
                pick(settings, |s| s.popular_badge_color.as_ref()),
                pick(legacy, |l| l.popular_badge_color.as_ref()),
            ]),
            DEFAULT_POPULAR_BADGE_COLOR,
        ),
        popular_badge_border_color: normalize_color(
            first(&[
                pick(settings, |s| s.popular_badge_border_color.as_ref()),
                pick(legacy, |l| l.popular_badge_border_color.as_ref()),
            ]),
            DEFAULT_POPULAR_BADGE_BORDER_COLOR,
        ),
        popular_badge_text_color: normalize_hex(
            first(&[
                pick(settings, |s| s.popular_badge_text_color.as_ref()),
                pick(legacy, |l| l.popular_badge_text_color.as_ref()),
            ]),
            DEFAULT_POPULAR_BADGE_TEXT_COLOR,
        ),
        border_radius: resolve_border_radius(pick(settings, |s| s.border_radius.as_ref())),
        card_background: normalize_color(
            pick(settings, |s| s.pricing_background_color.as_ref()),
            DEFAULT_CARD_BACKGROUND,
        ),
        border_color: normalize_color(pick(settings, |s| s.pricing_border_color.as_ref()), DEFAULT_BORDER_COLOR),
        page_background: normalize_color(
            pick(settings, |s| s.pricing_header_background_color.as_ref()),
            DEFAULT_PAGE_BACKGROUND,
        ),
        header_text_color: normalize_color(
            pick(settings, |s| s.pricing_header_text_color.as_ref()),
            DEFAULT_HEADER_TEXT_COLOR,
        ),
        description_color: normalize_color(
            pick(settings, |s| s.pricing_description_color.as_ref()),
            DEFAULT_DESCRIPTION_COLOR,
        ),
        price_color: normalize_color(pick(settings, |s| s.pricing_price_color.as_ref()), DEFAULT_PRICE_COLOR),
        text_color: normalize_color(pick(settings, |s| s.pricing_text_color.as_ref()), DEFAULT_TEXT_COLOR),
        show_project_name: settings.and_then(|s| s.show_project_name).unwrap_or(true),
        show_pricing_header: settings.and_then(|s| s.show_pricing_header).unwrap_or(true),
        custom_css: settings
            .and_then(|s| s.custom_css.as_deref())
            .map(scope_custom_css)
            .filter(|css| !css.is_empty()),
    }
}

/// Resolve the theme of a loaded project
pub fn resolve_project_theme(project: &Project) -> ResolvedTheme {
    let legacy = project.legacy_theme();
    resolve_theme(project.theme_settings.as_ref(), legacy.as_ref())
}
