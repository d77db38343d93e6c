//! URL extraction and suspicion heuristics.
//!
//! No `url` crate dependency: the teacher never reaches for one either,
//! preferring hand-rolled `regex`-based parsing throughout
//! `common/src/parsers` — this follows the same posture, generalized from
//! log-line parsing to free-text scanning.

use std::sync::OnceLock;

use regex::Regex;
use threat_common::SuspiciousUrl;

const SHORTENERS: &[&str] = &["bit.ly", "tinyurl.com", "goo.gl", "t.co", "ow.ly", "is.gd"];
const HIGH_RISK_TLDS: &[&str] = &["zip", "top", "xyz", "click", "country", "gq", "tk"];
const BRAND_LIST: &[&str] = &["paypal", "microsoft", "google", "apple", "amazon", "docusign"];

fn url_regex() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    CELL.get_or_init(|| Regex::new(r"https?://[^\s<>\)\]\"']+").expect("static url regex"))
}

fn ipv4_regex() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    CELL.get_or_init(|| Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$").expect("static ipv4 regex"))
}

fn host_and_path(url: &str) -> (String, String) {
    let without_scheme = url.splitn(2, "://").nth(1).unwrap_or(url);
    let mut parts = without_scheme.splitn(2, '/');
    let host_port = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("");
    let host = host_port.split(':').next().unwrap_or(host_port);
    (host.to_lowercase(), format!("/{path}").to_lowercase())
}

fn closest_brand_distance(host: &str) -> Option<(&'static str, usize)> {
    BRAND_LIST
        .iter()
        .map(|brand| (*brand, strsim::levenshtein(host, brand)))
        .min_by_key(|(_, dist)| *dist)
}

/// Extract every URL in `content` and classify it.
pub fn extract(content: &str) -> Vec<SuspiciousUrl> {
    url_regex()
        .find_iter(content)
        .map(|m| classify(m.as_str()))
        .collect()
}

fn classify(url: &str) -> SuspiciousUrl {
    let (host, path) = host_and_path(url);

    if ipv4_regex().is_match(&host) {
        return SuspiciousUrl {
            url: url.to_string(),
            is_suspicious: true,
            reason: "host is a raw IP address".to_string(),
        };
    }

    if SHORTENERS.iter().any(|s| host == *s || path.contains(s)) {
        return SuspiciousUrl {
            url: url.to_string(),
            is_suspicious: true,
            reason: "known URL shortener".to_string(),
        };
    }

    if let Some(tld) = host.rsplit('.').next() {
        if HIGH_RISK_TLDS.contains(&tld) {
            return SuspiciousUrl {
                url: url.to_string(),
                is_suspicious: true,
                reason: format!("high-risk top-level domain .{tld}"),
            };
        }
    }

    let labels: Vec<&str> = host.split('.').collect();
    let candidate = if labels.len() >= 2 { labels[labels.len() - 2] } else { host.as_str() };
    if let Some((brand, distance)) = closest_brand_distance(candidate) {
        if distance > 0 && distance <= 2 {
            return SuspiciousUrl {
                url: url.to_string(),
                is_suspicious: true,
                reason: format!("domain resembles brand \"{brand}\" (edit distance {distance})"),
            };
        }
    }

    SuspiciousUrl {
        url: url.to_string(),
        is_suspicious: false,
        reason: "no suspicious markers".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_ip_host_is_suspicious() {
        let urls = extract("Click here: http://192.168.1.1/fake-login.php");
        assert_eq!(urls.len(), 1);
        assert!(urls[0].is_suspicious);
        assert!(urls[0].reason.contains("IP"));
    }

    #[test]
    fn known_shortener_is_suspicious() {
        let urls = extract("See https://bit.ly/abc123 for details");
        assert!(urls[0].is_suspicious);
    }

    #[test]
    fn lookalike_brand_domain_is_suspicious() {
        let urls = extract("Sign in at http://paypa1.com/login");
        assert!(urls[0].is_suspicious);
        assert!(urls[0].reason.contains("paypal"));
    }

    #[test]
    fn ordinary_domain_is_not_suspicious() {
        let urls = extract("See our report at https://example.com/report");
        assert!(!urls[0].is_suspicious);
    }
}
