use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
            base_url = "https://shop.example"
            history_mode = "push"
            request_timeout_secs = 15
        "#,
    )
    .expect("valid file");

    assert_eq!(settings.base_url, "https://shop.example");
    assert_eq!(settings.search_path, PRODUCT_SEARCH_PATH);
    assert_eq!(settings.history_mode, HistoryMode::Push);
    assert_eq!(settings.request_timeout(), Some(Duration::from_secs(15)));
}

#[test]
fn rejects_unknown_keys_and_bad_history_mode() {
    let mut settings = Settings::default();
    assert!(apply_file(&mut settings, "bind_addr = \"0.0.0.0:1\"").is_err());
    assert!(apply_file(&mut settings, "history_mode = \"sometimes\"").is_err());
    assert_eq!(settings, Settings::default());
}

#[test]
fn app_prefixed_env_wins_over_legacy_name() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        env_from(&[
            ("STOREFRONT_URL", "http://legacy.test"),
            ("APP__BASE_URL", "http://app.test"),
            ("APP__SEARCH_PATH", "/api/v2/products/search/"),
            ("APP__HISTORY_MODE", "PUSH"),
        ]),
    );
    assert_eq!(settings.base_url, "http://app.test");
    assert_eq!(settings.search_path, "/api/v2/products/search/");
    assert_eq!(settings.history_mode, HistoryMode::Push);
}

#[test]
fn invalid_env_values_are_ignored() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        env_from(&[
            ("APP__HISTORY_MODE", "sideways"),
            ("APP__REQUEST_TIMEOUT_SECS", "soon"),
        ]),
    );
    assert_eq!(settings, Settings::default());
}

#[test]
fn zero_timeout_means_client_default() {
    let settings = Settings {
        request_timeout_secs: Some(0),
        ..Settings::default()
    };
    assert_eq!(settings.request_timeout(), None);
}

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("search_cli_missing_{suffix}.toml"));

    let settings = load_settings(&path).expect("defaults");
    assert_eq!(settings.search_path, PRODUCT_SEARCH_PATH);
}

#[test]
fn reads_config_file_from_disk() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("search_cli_config_{suffix}.toml"));
    fs::write(&path, "search_path = \"/shop/search/\"\n").expect("write config");

    let settings = load_settings(&path).expect("load");
    assert_eq!(settings.search_path, "/shop/search/");

    fs::remove_file(path).expect("cleanup");
}
