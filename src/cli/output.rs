//! Output formatting for the CLI.

use crate::core::db::ConnectionRecord;
use crate::core::error::Result;

/// Format the list output as a fixed-width table.
///
/// The hostname column reads from the parameter map; connections without a
/// hostname parameter show `N/A`.
pub fn format_table(records: &[ConnectionRecord]) {
    println!(
        "{:<5} {:<30} {:<10} {:<20}",
        "ID", "Name", "Protocol", "Hostname"
    );
    println!("{}", "-".repeat(70));

    for record in records {
        let hostname = record
            .parameters
            .get("hostname")
            .map_or("N/A", String::as_str);

        println!(
            "{:<5} {:<30} {:<10} {:<20}",
            record.id, record.name, record.protocol, hostname
        );
    }
}

/// Format the list output as pretty-printed JSON.
pub fn format_json(records: &[ConnectionRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record(id: i32, name: &str, protocol: &str, hostname: Option<&str>) -> ConnectionRecord {
        let mut parameters = BTreeMap::new();
        if let Some(h) = hostname {
            parameters.insert("hostname".to_string(), h.to_string());
        }
        ConnectionRecord {
            id,
            name: name.to_string(),
            protocol: protocol.to_string(),
            parameters,
        }
    }

    #[test]
    fn test_json_entries_carry_all_fields() {
        let records = vec![
            record(1, "web", "rdp", Some("10.0.0.1")),
            record(2, "bare", "vnc", None),
        ];

        let json = format_json(&records).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        for entry in entries {
            assert!(entry.get("id").is_some());
            assert!(entry.get("name").is_some());
            assert!(entry.get("protocol").is_some());
            assert!(entry.get("parameters").is_some());
        }
        assert_eq!(entries[0]["parameters"]["hostname"], "10.0.0.1");
        assert!(entries[1]["parameters"].as_object().unwrap().is_empty());
    }
}
