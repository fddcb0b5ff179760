//! Export format identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Target filtering engine syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Hosts,
    Dnsmasq,
    Unbound,
    Bind,
    Privoxy,
    Shadowrocket,
    Adguard,
    Abp,
}

impl Format {
    /// Every concrete format.
    pub const ALL: [Format; 8] = [
        Format::Hosts,
        Format::Dnsmasq,
        Format::Unbound,
        Format::Bind,
        Format::Privoxy,
        Format::Shadowrocket,
        Format::Adguard,
        Format::Abp,
    ];

    /// Parse a single format identifier (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "hosts" => Some(Format::Hosts),
            "dnsmasq" => Some(Format::Dnsmasq),
            "unbound" => Some(Format::Unbound),
            "bind" => Some(Format::Bind),
            "privoxy" => Some(Format::Privoxy),
            "shadowrocket" => Some(Format::Shadowrocket),
            "adguard" => Some(Format::Adguard),
            "abp" => Some(Format::Abp),
            _ => None,
        }
    }

    /// Parse an identifier that may be `all`.
    pub fn expand(s: &str) -> crate::Result<Vec<Self>> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::ALL.to_vec())
        } else {
            s.parse().map(|f| vec![f])
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Hosts => "hosts",
            Format::Dnsmasq => "dnsmasq",
            Format::Unbound => "unbound",
            Format::Bind => "bind",
            Format::Privoxy => "privoxy",
            Format::Shadowrocket => "shadowrocket",
            Format::Adguard => "adguard",
            Format::Abp => "abp",
        }
    }

    /// Output file name, `blocklist.<format>`.
    pub fn file_name(&self) -> String {
        format!("blocklist.{}", self.as_str())
    }

    /// Line comment marker of the target syntax.
    pub fn comment_prefix(&self) -> &'static str {
        match self {
            Format::Bind => "//",
            Format::Adguard | Format::Abp => "!",
            _ => "#",
        }
    }

    /// Render one host for this format; `None` means "emit the raw rule".
    pub fn render_domain(&self, domain: &str) -> Option<String> {
        match self {
            Format::Hosts => Some(format!("0.0.0.0 {}", domain)),
            Format::Dnsmasq => Some(format!("address=/{}/", domain)),
            Format::Unbound => Some(format!("local-zone: \"{}\" static", domain)),
            Format::Bind => Some(format!(
                "zone \"{}\" {{ type master; file \"null.zone.file\"; }};",
                domain
            )),
            Format::Privoxy => Some(format!("{{ +block {{ {} }} }}", domain)),
            Format::Shadowrocket => Some(format!("DOMAIN-SUFFIX,{},REJECT", domain)),
            Format::Adguard | Format::Abp => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Format {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| crate::Error::UnsupportedFormat(s.to_string()))
    }
}
