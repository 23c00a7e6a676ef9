//! Fallback Badge Placeholders
//!
//! The provider table is the single source of placeholder styling. Lookups
//! are exact-match on the provider name; anything else gets the default.

use serde::Serialize;

/// Background, text color, and short label for one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProviderStyle {
    pub background: &'static str,
    pub text: &'static str,
    pub label: &'static str,
}

pub const DEFAULT_STYLE: ProviderStyle = ProviderStyle {
    background: "#4A90E2",
    text: "white",
    label: "CERT",
};

pub static PROVIDER_STYLES: &[(&str, ProviderStyle)] = &[
    (
        "Amazon Web Services",
        ProviderStyle { background: "#232f3e", text: "#ff9900", label: "AWS" },
    ),
    (
        "Google Cloud",
        ProviderStyle { background: "#4285f4", text: "white", label: "GCP" },
    ),
    (
        "Coursera",
        ProviderStyle { background: "#0056d2", text: "white", label: "Coursera" },
    ),
    (
        "Linux Foundation",
        ProviderStyle { background: "#003366", text: "#ffffff", label: "LF" },
    ),
    (
        "HashiCorp",
        ProviderStyle { background: "#7B42BC", text: "white", label: "HC" },
    ),
];

pub fn style_for(provider: &str) -> ProviderStyle {
    PROVIDER_STYLES
        .iter()
        .find(|(name, _)| *name == provider)
        .map(|(_, style)| *style)
        .unwrap_or(DEFAULT_STYLE)
}

/// URL-encoded SVG data URI, 140x140 with a centred label.
pub fn fallback_svg(provider: &str) -> String {
    let style = style_for(provider);
    format!(
        "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='140' height='140'%3E\
         %3Crect fill='{bg}' width='140' height='140' rx='10'/%3E\
         %3Ctext x='70' y='75' font-family='Arial' font-size='16' fill='{fg}' text-anchor='middle'%3E\
         {label}%3C/text%3E%3C/svg%3E",
        bg = style.background,
        fg = style.text,
        label = style.label,
    )
}
