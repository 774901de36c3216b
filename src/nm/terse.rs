//! Parsing of `nmcli --terse` output.
//!
//! Terse mode separates fields with `:` and escapes literal `:` and `\` inside
//! values with a backslash.

use crate::error::SourceError;
use crate::state::{ActiveConnection, ActiveDevice, ConnectionCategory, ProfileKey};

/// Splits one terse line into unescaped fields.
#[must_use]
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            ':' => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// A row of `nmcli -t -f NAME,UUID,TYPE,AUTOCONNECT connection show`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRow {
    pub name: String,
    pub uuid: String,
    pub category: ConnectionCategory,
    pub autoconnect: bool,
}

fn fields_exact<const N: usize>(
    line: &str,
    what: &'static str,
) -> Result<[String; N], SourceError> {
    split_fields(line)
        .try_into()
        .map_err(|_| SourceError::Malformed {
            what,
            line: line.to_string(),
        })
}

fn non_empty_lines(output: &str) -> impl Iterator<Item = &str> {
    output.lines().filter(|l| !l.trim().is_empty())
}

pub fn parse_connections(output: &str) -> Result<Vec<ConnectionRow>, SourceError> {
    non_empty_lines(output)
        .map(|line| {
            let [name, uuid, kind, autoconnect] = fields_exact::<4>(line, "connection")?;
            Ok(ConnectionRow {
                name,
                uuid,
                category: ConnectionCategory::from_tag(&kind),
                autoconnect: autoconnect.eq_ignore_ascii_case("yes"),
            })
        })
        .collect()
}

/// Rows of `nmcli -t -f DEVICE,TYPE device status`.
pub fn parse_devices(output: &str) -> Result<Vec<ActiveDevice>, SourceError> {
    non_empty_lines(output)
        .map(|line| {
            let [interface_name, kind] = fields_exact::<2>(line, "device")?;
            Ok(ActiveDevice {
                interface_name,
                category: ConnectionCategory::from_tag(&kind),
            })
        })
        .collect()
}

/// Rows of `nmcli -t -f NAME,UUID,DEVICE connection show --active`.
pub fn parse_active(output: &str) -> Result<Vec<ActiveConnection>, SourceError> {
    non_empty_lines(output)
        .map(|line| {
            let [id, uuid, device] = fields_exact::<3>(line, "active connection")?;
            Ok(ActiveConnection {
                profile: ProfileKey::new(uuid),
                id,
                device,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_fields_plain() {
        assert_eq!(split_fields("a:b:c"), vec!["a", "b", "c"]);
        assert_eq!(split_fields("a::c"), vec!["a", "", "c"]);
    }

    #[test]
    fn test_split_fields_escapes() {
        assert_eq!(split_fields(r"office\:vpn:x"), vec!["office:vpn", "x"]);
        assert_eq!(split_fields(r"back\\slash:y"), vec![r"back\slash", "y"]);
    }

    #[test]
    fn test_parse_connections() {
        let output = "\
home:0b6f7c1e-1111-4e0b-9a43-0123456789ab:wireguard:yes
Wired connection 1:7d2c4a55-2222-4a8e-8c77-0123456789ab:802-3-ethernet:yes
work\\:eu:4f3d9b2a-3333-4c11-b1e2-0123456789ab:wireguard:no
";
        let rows = parse_connections(output).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].category, ConnectionCategory::WireGuard);
        assert!(rows[0].autoconnect);
        assert_eq!(
            rows[1].category,
            ConnectionCategory::Other("802-3-ethernet".to_string())
        );
        assert_eq!(rows[2].name, "work:eu");
        assert!(!rows[2].autoconnect);
    }

    #[test]
    fn test_parse_connections_rejects_short_line() {
        let err = parse_connections("home:uuid\n").unwrap_err();
        assert!(matches!(err, SourceError::Malformed { what: "connection", .. }));
    }

    #[test]
    fn test_parse_devices() {
        let devices = parse_devices("wlp3s0:wifi\nwg0:wireguard\nlo:loopback\n\n").unwrap();
        assert_eq!(devices.len(), 3);
        assert_eq!(devices[1].interface_name, "wg0");
        assert_eq!(devices[1].category, ConnectionCategory::WireGuard);
    }

    #[test]
    fn test_parse_active() {
        let active = parse_active("home:uuid-1:wg0\nhome:uuid-1:\n").unwrap();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].profile, ProfileKey::new("uuid-1"));
        assert_eq!(active[1].device, "");
    }
}
