//! Filter list compiler.
//!
//! Renders an ordered record set into one target syntax: a comment header
//! built from [`FilterListMetadata`] followed by one line per rule.

mod format;

pub use format::Format;

use crate::metadata::FilterListMetadata;
use crate::rule::StoredRule;

/// Render a single rule.
///
/// Rules with a domain are rendered in the target syntax; rules without one
/// (cosmetic, regex, ...) are emitted verbatim for every format.
pub fn render_rule(rule: &StoredRule, format: Format) -> String {
    rule.domain
        .as_deref()
        .filter(|domain| !domain.is_empty())
        .and_then(|domain| format.render_domain(domain))
        .unwrap_or_else(|| rule.raw.clone())
}

/// Build the comment header for `format`.
pub fn header(meta: &FilterListMetadata, format: Format) -> String {
    let c = format.comment_prefix();
    let mut lines = vec![
        format!("{} Title: {}", c, meta.title),
        format!("{} Description: {}", c, meta.description),
        format!("{} Homepage: {}", c, meta.homepage),
        format!("{} Version: {}", c, meta.version),
        format!("{} Last updated: {}", c, meta.last_updated),
    ];

    let optional = [
        ("Website", &meta.website),
        ("Made by", &meta.madeby),
        ("Expires", &meta.expires),
        ("License", &meta.license),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            lines.push(format!("{} {}: {}", c, label, value));
        }
    }

    if let Some(stats) = &meta.stats {
        lines.push(format!("{} Total rules: {}", c, stats.total_rules));
        lines.push(format!("{} Blocking rules: {}", c, stats.blocking_rules));
        lines.push(format!("{} Unblocking rules: {}", c, stats.unblocking_rules));
    }

    if format == Format::Unbound {
        lines.push("server:".to_string());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Compile `rules` into a complete document for `format`.
pub fn compile(rules: &[StoredRule], meta: &FilterListMetadata, format: Format) -> String {
    let mut out = header(meta, format);
    out.push('\n');
    for rule in rules {
        out.push_str(&render_rule(rule, format));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::metadata::ListStats;
    use crate::source::{FilterSource, RawSource};
    use chrono::Utc;

    fn rules(lines: &[&str]) -> Vec<StoredRule> {
        let src = FilterSource::resolve(&RawSource::new("a", "https://a.example/l", "privacy"))
            .unwrap();
        lines
            .iter()
            .map(|l| StoredRule::candidate(classify(l, &src).unwrap(), &src, Utc::now()))
            .collect()
    }

    fn meta() -> FilterListMetadata {
        let mut meta = FilterListMetadata::new(
            "Test List",
            "Rules for tests",
            "https://example.org",
            "2.0.0",
        );
        meta.last_updated = "2026-10-16T00:00:00Z".to_string();
        meta
    }

    #[test]
    fn test_hosts_and_dnsmasq_rendering() {
        let rules = rules(&["||ads.example.com^"]);
        assert_eq!(render_rule(&rules[0], Format::Hosts), "0.0.0.0 ads.example.com");
        assert_eq!(render_rule(&rules[0], Format::Dnsmasq), "address=/ads.example.com/");
        assert_eq!(render_rule(&rules[0], Format::Adguard), "||ads.example.com^");
    }

    #[test]
    fn test_rules_without_domain_are_verbatim() {
        let rules = rules(&["example.com##.banner", r"/^https?:\/\/track\./"]);
        for format in Format::ALL {
            assert_eq!(render_rule(&rules[0], format), "example.com##.banner");
            assert_eq!(render_rule(&rules[1], format), r"/^https?:\/\/track\./");
        }
    }

    #[test]
    fn test_anchor_without_host_is_verbatim() {
        let rules = rules(&["||^$third-party", "@@||^$document"]);
        for format in Format::ALL {
            assert_eq!(render_rule(&rules[0], format), "||^$third-party");
            assert_eq!(render_rule(&rules[1], format), "@@||^$document");
        }
    }

    #[test]
    fn test_empty_stored_domain_is_verbatim() {
        let mut rule = rules(&["||ads.example.com^"]).remove(0);
        rule.domain = Some(String::new());
        assert_eq!(render_rule(&rule, Format::Hosts), "||ads.example.com^");
        assert_eq!(render_rule(&rule, Format::Dnsmasq), "||ads.example.com^");
    }

    #[test]
    fn test_hosts_header() {
        let header = header(&meta(), Format::Hosts);
        assert_eq!(
            header,
            "# Title: Test List\n\
             # Description: Rules for tests\n\
             # Homepage: https://example.org\n\
             # Version: 2.0.0\n\
             # Last updated: 2026-10-16T00:00:00Z\n"
        );
    }

    #[test]
    fn test_header_comment_styles() {
        assert!(header(&meta(), Format::Adguard).starts_with("! Title: Test List"));
        assert!(header(&meta(), Format::Abp).starts_with("! Title: Test List"));
        assert!(header(&meta(), Format::Bind).starts_with("// Title: Test List"));
        assert!(header(&meta(), Format::Privoxy).starts_with("# Title: Test List"));
        assert!(header(&meta(), Format::Unbound).ends_with("server:\n"));
    }

    #[test]
    fn test_header_optional_fields() {
        let mut meta = meta();
        meta.license = Some("MIT".into());
        meta.stats = Some(ListStats {
            total_rules: 3,
            blocking_rules: 2,
            unblocking_rules: 1,
        });
        let header = header(&meta, Format::Adguard);
        assert!(header.contains("! License: MIT\n"));
        assert!(header.contains("! Total rules: 3\n"));
        assert!(header.contains("! Unblocking rules: 1\n"));
        assert!(!header.contains("Expires"));
    }

    #[test]
    fn test_compile_document() {
        let rules = rules(&["||a.example.com^", "example.com##.ad"]);
        let doc = compile(&rules, &meta(), Format::Unbound);
        let lines: Vec<_> = doc.lines().collect();

        assert_eq!(lines[5], "server:");
        assert_eq!(lines[6], "");
        assert_eq!(lines[7], "local-zone: \"a.example.com\" static");
        assert_eq!(lines[8], "example.com##.ad");
        assert!(doc.ends_with('\n'));
    }
}
