//! Connection-string normalisation shared by the XML and JSON dialects.

use regex::Regex;
use slnmeta_core::model::ConnectionStringSetting;
use std::sync::OnceLock;

/// Normalise `value` into a [`ConnectionStringSetting`] named `name`.
///
/// A structured `key=value;...` string fills the record. Otherwise, for
/// settings whose name mentions `redis`, the `host[:port][,password=...]`
/// form is tried. Anything else keeps only the name.
pub fn parse_connection_string(name: &str, value: &str) -> ConnectionStringSetting {
    let mut setting = ConnectionStringSetting::named(name);
    if apply_structured(&mut setting, value) {
        return setting;
    }
    if name.to_ascii_lowercase().contains("redis") {
        apply_cache_endpoint(&mut setting, value);
    }
    setting
}

/// Fill `setting` from `key=value;...` pairs. Returns false when `value` is
/// not a structured string: a segment has no `=` or no known key appears.
fn apply_structured(setting: &mut ConnectionStringSetting, value: &str) -> bool {
    let mut pairs = Vec::new();
    for segment in value.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((key, val)) = segment.split_once('=') else {
            return false;
        };
        pairs.push((key.trim().to_ascii_lowercase(), val.trim()));
    }

    let mut recognised = false;
    for (key, val) in pairs {
        let val = (!val.is_empty()).then(|| val.to_string());
        match key.as_str() {
            "server" | "data source" | "address" | "addr" | "host" => setting.server = val,
            "port" => setting.port = val.and_then(|p| p.parse().ok()),
            "database" | "initial catalog" => setting.database = val,
            "user id" | "uid" | "user" | "username" => setting.user_id = val,
            "password" | "pwd" => setting.password = val,
            "application name" | "app" => setting.application_name = val,
            _ => continue,
        }
        recognised = true;
    }
    recognised
}

fn apply_cache_endpoint(setting: &mut ConnectionStringSetting, value: &str) {
    static ENDPOINT_RE: OnceLock<Regex> = OnceLock::new();
    let endpoint_re = ENDPOINT_RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*([^:,;=\s]+)(?::(\d+))?(?:,.*?password=([^,]+))?").unwrap()
    });

    let Some(caps) = endpoint_re.captures(value) else {
        return;
    };
    setting.server = caps.get(1).map(|m| m.as_str().to_string());
    setting.port = caps.get(2).and_then(|m| m.as_str().parse().ok());
    setting.password = caps.get(3).map(|m| m.as_str().trim().to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_server_string() {
        let setting = parse_connection_string(
            "Orders",
            "Data Source=sql01;Initial Catalog=Orders;User ID=svc_orders;Password=p@ss;Application Name=Orders.Api;Integrated Security=False",
        );
        assert_eq!(setting.name, "Orders");
        assert_eq!(setting.server.as_deref(), Some("sql01"));
        assert_eq!(setting.database.as_deref(), Some("Orders"));
        assert_eq!(setting.user_id.as_deref(), Some("svc_orders"));
        assert_eq!(setting.password.as_deref(), Some("p@ss"));
        assert_eq!(setting.application_name.as_deref(), Some("Orders.Api"));
        assert!(setting.port.is_none());
    }

    #[test]
    fn test_host_and_port_keys() {
        let setting =
            parse_connection_string("Reporting", "Host=pg01;Port=5432;Database=reports;Username=ro");
        assert_eq!(setting.server.as_deref(), Some("pg01"));
        assert_eq!(setting.port, Some(5432));
        assert_eq!(setting.user_id.as_deref(), Some("ro"));
    }

    #[test]
    fn test_redis_fallback() {
        let setting =
            parse_connection_string("RedisCache", "cache01.local:6380,password=s3cret,ssl=True");
        assert_eq!(setting.server.as_deref(), Some("cache01.local"));
        assert_eq!(setting.port, Some(6380));
        assert_eq!(setting.password.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_fallback_is_name_specific() {
        let setting = parse_connection_string("SessionStore", "cache01.local:6380,password=s3cret");
        assert_eq!(setting.name, "SessionStore");
        assert!(setting.server.is_none());
        assert!(setting.password.is_none());
    }

    #[test]
    fn test_unstructured_keeps_name_only() {
        let setting = parse_connection_string("Blob", "https://store.example/container");
        assert_eq!(setting, ConnectionStringSetting::named("Blob"));
    }
}
