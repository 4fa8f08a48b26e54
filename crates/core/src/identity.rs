// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tiered window class identification.
//!
//! Matching an observed window against a configured name runs three
//! tiers in order: exact (case-sensitive), instance (case-insensitive
//! against the WM_CLASS instance field), normalized (reverse-domain
//! prefix stripped, lowercased). Registry aliases re-run the tiers with
//! an `alias_` prefixed match kind.

use serde::{Deserialize, Serialize};
use std::fmt;

const REVERSE_DOMAIN_PREFIXES: &[&str] = &["com", "org", "io", "net", "dev", "app", "de"];

/// How a class matched, tier by tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Instance,
    Normalized,
    AliasExact,
    AliasInstance,
    AliasNormalized,
}

impl MatchKind {
    fn aliased(self) -> Self {
        match self {
            MatchKind::Exact => MatchKind::AliasExact,
            MatchKind::Instance => MatchKind::AliasInstance,
            MatchKind::Normalized => MatchKind::AliasNormalized,
            other => other,
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchKind::Exact => "exact",
            MatchKind::Instance => "instance",
            MatchKind::Normalized => "normalized",
            MatchKind::AliasExact => "alias_exact",
            MatchKind::AliasInstance => "alias_instance",
            MatchKind::AliasNormalized => "alias_normalized",
        };
        write!(f, "{s}")
    }
}

/// Strip one recognized reverse-domain prefix and lowercase.
///
/// `com.mitchellh.ghostty` → `ghostty`, `org.kde.dolphin` → `dolphin`,
/// `firefox` → `firefox`. Empty input normalizes to `unknown`.
pub fn normalize_class(class_name: &str) -> String {
    if class_name.is_empty() {
        return "unknown".to_string();
    }

    let mut name = class_name;
    if let Some((first, _)) = class_name.split_once('.') {
        if REVERSE_DOMAIN_PREFIXES.contains(&first.to_lowercase().as_str()) {
            if let Some((_, last)) = class_name.rsplit_once('.') {
                name = last;
            }
        }
    }

    name.to_lowercase()
}

fn match_single(expected: &str, actual_class: &str, actual_instance: &str) -> Option<MatchKind> {
    if expected == actual_class {
        return Some(MatchKind::Exact);
    }
    if !actual_instance.is_empty() && expected.eq_ignore_ascii_case(actual_instance) {
        return Some(MatchKind::Instance);
    }
    if normalize_class(expected) == normalize_class(actual_class) {
        return Some(MatchKind::Normalized);
    }
    None
}

/// Match a window against an expected class with tiered fallback and
/// alias support.
pub fn match_window_class(
    expected: &str,
    actual_class: &str,
    actual_instance: &str,
    aliases: &[String],
) -> Option<MatchKind> {
    if let Some(kind) = match_single(expected, actual_class, actual_instance) {
        return Some(kind);
    }
    for alias in aliases {
        if let Some(kind) = match_single(alias, actual_class, actual_instance) {
            return Some(kind.aliased());
        }
    }
    None
}

/// Which PWA runtime owns a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PwaType {
    Firefox,
    Chrome,
}

/// Full identity bundle for a window, including PWA detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowIdentity {
    pub original_class: String,
    pub original_instance: String,
    pub normalized_class: String,
    pub normalized_instance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub is_pwa: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pwa_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pwa_type: Option<PwaType>,
}

impl WindowIdentity {
    /// Inspect a window's WM_CLASS fields.
    ///
    /// Firefox PWAs carry a unique `FFPWA-*` class; Chrome PWAs reuse the
    /// generic `Google-chrome` class and are identified by instance.
    pub fn inspect(actual_class: &str, actual_instance: &str, title: Option<&str>) -> Self {
        let mut identity = Self {
            original_class: actual_class.to_string(),
            original_instance: actual_instance.to_string(),
            normalized_class: normalize_class(actual_class),
            normalized_instance: if actual_instance.is_empty() {
                String::new()
            } else {
                normalize_class(actual_instance)
            },
            title: title.map(str::to_string),
            is_pwa: false,
            pwa_id: None,
            pwa_type: None,
        };

        if actual_class.starts_with("FFPWA-") {
            identity.is_pwa = true;
            identity.pwa_id = Some(actual_class.to_string());
            identity.pwa_type = Some(PwaType::Firefox);
        } else if actual_class == "Google-chrome"
            && !actual_instance.is_empty()
            && actual_instance != "google-chrome"
        {
            identity.is_pwa = true;
            identity.pwa_id = Some(actual_instance.to_string());
            identity.pwa_type = Some(PwaType::Chrome);
        }

        identity
    }
}

/// Match a PWA id: Firefox by class, Chrome by instance.
pub fn match_pwa_instance(expected_id: &str, actual_class: &str, actual_instance: &str) -> bool {
    if actual_class.starts_with("FFPWA-") {
        return expected_id == actual_class;
    }
    if actual_class == "Google-chrome" && !actual_instance.is_empty() {
        return expected_id == actual_instance;
    }
    false
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod identity_tests;
