use std::time::Duration;

use pretty_assertions::assert_eq;
use rstest::rstest;
use wayfinder_primitives::Coordinate;
use wayfinder_services::{IpProviderKind, PathEncoding};

use super::*;

#[test]
fn empty_file_yields_defaults() {
	let config = Config::parse("").unwrap();
	assert_eq!(config, Config::default());
	assert_eq!(config.network.retries, 2);
	assert_eq!(config.network.route_timeout(), Duration::from_secs(15));
	assert_eq!(config.input.debounce(), Duration::from_millis(500));
	assert_eq!(config.input.coalesce(), Duration::from_millis(100));
	assert_eq!(config.location.default_origin, Coordinate::new(52.3759, 10.5268).unwrap());
	assert_eq!(config.services.ip_providers.len(), 2);
	assert_eq!(config.services.ip_providers[0].kind, IpProviderKind::IpapiCo);
}

#[test]
fn partial_sections_overlay_defaults() {
	let config = Config::parse(
		r#"
[services]
contact_email = "maps@example.org"
route_geometry = "polyline"

[network]
retries = 4
ip_timeout_ms = 2500

[location]
fixed_position = [48.137, 11.575]
"#,
	)
	.unwrap();

	assert_eq!(config.services.contact_email, "maps@example.org");
	assert_eq!(config.services.route_geometry, PathEncoding::Polyline);
	assert_eq!(config.services.routing_profile, "driving");
	assert_eq!(config.network.retries, 4);
	assert_eq!(config.network.backoff(), Duration::from_millis(600));
	assert_eq!(config.network.ip_timeout(), Duration::from_millis(2500));
	assert_eq!(config.location.fixed_position, Some(Coordinate::new(48.137, 11.575).unwrap()));
	assert_eq!(config.map, MapConfig::default());
}

#[test]
fn custom_ip_providers_replace_defaults() {
	let config = Config::parse(
		r#"
[[services.ip_providers]]
kind = "ip_api_com"
url = "http://ip-api.internal/json/"
"#,
	)
	.unwrap();

	assert_eq!(config.services.ip_providers.len(), 1);
	assert_eq!(config.services.ip_providers[0].kind, IpProviderKind::IpApiCom);
}

#[test]
fn unknown_keys_are_rejected() {
	let err = Config::parse("[network]\nretry = 3\n").unwrap_err();
	assert!(matches!(err, ConfigError::Toml(_)), "{err}");
}

#[test]
fn out_of_range_origin_is_rejected() {
	let err = Config::parse("[location]\ndefault_origin = [95.0, 10.0]\n").unwrap_err();
	assert!(matches!(err, ConfigError::Toml(_)), "{err}");
}

#[rstest]
#[case("[services]\ngeocoding_url = \"ftp://geo.example/search\"\n", "services.geocoding_url")]
#[case(
	"[[services.ip_providers]]\nkind = \"ipapi_co\"\nurl = \"file:///tmp/ip.json\"\n",
	"services.ip_providers[0].url"
)]
fn non_http_urls_are_rejected(#[case] input: &str, #[case] expected: &str) {
	match Config::parse(input) {
		Err(ConfigError::InvalidUrl { field, .. }) => assert_eq!(field, expected),
		other => panic!("expected InvalidUrl, got {other:?}"),
	}
}

#[rstest]
#[case("[network]\ntimeout_ms = 0\n", "network.timeout_ms")]
#[case("[network]\nroute_timeout_ms = 0\n", "network.route_timeout_ms")]
#[case("[location]\nnative_timeout_ms = 0\n", "location.native_timeout_ms")]
#[case("[network]\njitter = 1.5\n", "network.jitter")]
#[case("[map]\nmin_zoom = 12.0\nmax_zoom = 4.0\n", "map.min_zoom")]
#[case("[map]\ninitial_zoom = 25.0\n", "map.initial_zoom")]
#[case("[map]\nviewport_width = 0\n", "map.viewport_width")]
#[case("[services]\nrouting_profile = \" \"\n", "services.routing_profile")]
fn invalid_values_name_their_field(#[case] input: &str, #[case] expected: &str) {
	match Config::parse(input) {
		Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, expected),
		other => panic!("expected InvalidValue, got {other:?}"),
	}
}

#[test]
fn load_reads_file() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("config.toml");
	std::fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();

	let config = Config::load(&path).unwrap();
	assert_eq!(config.logging.level, "debug");
}

#[test]
fn missing_user_file_falls_back_to_defaults() {
	let dir = tempfile::tempdir().unwrap();
	let source = ConfigSource::UserDir(dir.path().join("wayfinder").join("config.toml"));

	assert_eq!(Config::load_from(Some(&source)).unwrap(), Config::default());
	assert_eq!(Config::load_from(None).unwrap(), Config::default());
}

#[test]
fn missing_explicit_file_is_an_error() {
	let dir = tempfile::tempdir().unwrap();
	let source = ConfigSource::Flag(dir.path().join("nope.toml"));

	assert!(matches!(Config::load_from(Some(&source)), Err(ConfigError::Io { .. })));
}

#[test]
fn resolve_prefers_flag_then_env_then_user_dir() {
	let flag = PathBuf::from("/etc/wayfinder.toml");
	let env = Some(OsString::from("/tmp/env.toml"));
	let dir = Some(PathBuf::from("/home/u/.config"));

	assert_eq!(
		ConfigSource::resolve(Some(&flag), env.clone(), dir.clone()),
		Some(ConfigSource::Flag(flag.clone()))
	);
	assert_eq!(
		ConfigSource::resolve(None, env, dir.clone()),
		Some(ConfigSource::Env(PathBuf::from("/tmp/env.toml")))
	);
	assert_eq!(
		ConfigSource::resolve(None, Some(OsString::new()), dir),
		Some(ConfigSource::UserDir(PathBuf::from("/home/u/.config/wayfinder/config.toml")))
	);
	assert_eq!(ConfigSource::resolve(None, None, None), None);
}
