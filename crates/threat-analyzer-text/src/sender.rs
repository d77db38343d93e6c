//! Sender domain heuristics. Continuous `[0, 1]` reputation, generalized
//! from the teacher's discrete risk-level derivation
//! (`risk_level: if count >= 3 { "high" } else { "low" }` in
//! `api/src/main.rs`) into a smooth score the scorer can weight directly.

use std::sync::OnceLock;

use regex::Regex;
use threat_common::SenderAnalysis;

const FREE_MAIL_DOMAINS: &[&str] = &["gmail.com", "yahoo.com", "outlook.com", "hotmail.com", "aol.com"];

fn domain_syntax_regex() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    CELL.get_or_init(|| Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?)+$").expect("static domain regex"))
}

pub fn analyze(sender: &str, claims_corporate: bool) -> SenderAnalysis {
    let (local, domain) = match sender.split_once('@') {
        Some((l, d)) => (l, d),
        None => {
            return SenderAnalysis {
                is_valid_domain: false,
                reputation: 0.1,
            }
        }
    };

    let is_valid_domain = domain_syntax_regex().is_match(domain);
    if !is_valid_domain {
        return SenderAnalysis {
            is_valid_domain: false,
            reputation: 0.1,
        };
    }

    let mut risk: f32 = 0.0;
    if claims_corporate && FREE_MAIL_DOMAINS.contains(&domain.to_lowercase().as_str()) {
        risk += 0.4;
    }
    let digit_count = local.chars().filter(|c| c.is_ascii_digit()).count();
    if local.len() > 0 && digit_count * 2 > local.len() {
        risk += 0.3;
    }

    SenderAnalysis {
        is_valid_domain,
        reputation: (1.0 - risk).clamp(0.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinary_corporate_sender_has_high_reputation() {
        let analysis = analyze("colleague@company.com", false);
        assert!(analysis.is_valid_domain);
        assert!(analysis.reputation > 0.8);
    }

    #[test]
    fn malformed_domain_is_invalid() {
        let analysis = analyze("a@b..", false);
        assert!(!analysis.is_valid_domain);
    }

    #[test]
    fn numeric_heavy_local_part_lowers_reputation() {
        let analysis = analyze("a1b2c3d4@company.com", false);
        assert!(analysis.reputation < 1.0);
    }

    #[test]
    fn missing_at_sign_is_invalid() {
        let analysis = analyze("not-an-email", false);
        assert!(!analysis.is_valid_domain);
    }
}
