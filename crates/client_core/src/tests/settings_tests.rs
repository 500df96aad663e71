use super::*;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = Settings::load(&dir.path().join("absent.toml")).expect("defaults");
    assert_eq!(settings.settings.line_fit_tolerance, "0.1");
    assert_eq!(settings.settings.min_area_px, "50");
    assert_eq!(settings.settings.max_colors, "36");
    assert_eq!(settings.mode(), Mode::Preview);
    assert_eq!(settings.output_format(), OutputFormat::Png);
    assert_eq!(settings.endpoint(), DEFAULT_ENDPOINT);
}

#[test]
fn saved_settings_load_back() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("vectorizer.toml");

    let mut settings = Settings::default();
    settings.api.api_key = "key-123".to_string();
    settings.api.api_secret = "secret-456".to_string();
    settings.settings.output_folder = "/srv/out".to_string();
    settings.settings.mode = "production".to_string();
    settings.settings.output_file_format = "svg".to_string();
    settings.save(&path).expect("save");

    let raw = std::fs::read_to_string(&path).expect("read");
    assert!(raw.contains("[api]"), "{raw}");
    assert!(raw.contains("[settings]"), "{raw}");

    let loaded = Settings::load(&path).expect("load");
    assert_eq!(loaded.credentials(), Credentials::new("key-123", "secret-456"));
    assert_eq!(loaded.mode(), Mode::Production);
    assert_eq!(loaded.output_format(), OutputFormat::Svg);
    assert_eq!(loaded.settings.output_folder, "/srv/out");
}

#[test]
fn partial_file_keeps_other_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("vectorizer.toml");
    std::fs::write(&path, "[settings]\nmin_area_px = \"60\"\nmode = \"test\"\n").expect("write");

    let settings = Settings::load(&path).expect("load");
    assert_eq!(settings.settings.min_area_px, "60");
    assert_eq!(settings.settings.input_dpi, "96");
    // Legacy mode names fall back to preview.
    assert_eq!(settings.mode(), Mode::Preview);
}

#[test]
fn broken_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("vectorizer.toml");
    std::fs::write(&path, "[settings\nmin_area_px = ").expect("write");
    let err = Settings::load(&path).expect_err("parse failure");
    assert!(err.to_string().contains("failed to parse"), "{err}");
}

#[test]
fn draft_round_trips_editable_defaults() {
    let mut settings = Settings::default();
    let mut draft = settings.draft();
    assert_eq!(draft.min_area_px, "50");
    assert!(draft.image_path.is_empty());

    draft.min_area_px = "75".to_string();
    draft.anti_aliasing_mode = AntiAliasingMode::Aliased;
    draft.palette = "#ffffff".to_string();
    settings.absorb_draft(&draft);

    assert_eq!(settings.settings.min_area_px, "75");
    assert_eq!(settings.settings.anti_aliasing_mode, "aliased");
    assert_eq!(settings.draft().palette, "#ffffff");
}

#[test]
fn explicit_settings_path_wins() {
    let path = resolve_settings_path(Some(PathBuf::from("/etc/vectorizer/custom.toml")));
    assert_eq!(path, PathBuf::from("/etc/vectorizer/custom.toml"));
}

#[test]
fn log_file_sits_next_to_settings() {
    assert_eq!(
        log_file_path(Path::new("/etc/vectorizer/custom.toml")),
        PathBuf::from("/etc/vectorizer/vectorizer_app.log")
    );
    assert_eq!(
        log_file_path(Path::new(DEFAULT_SETTINGS_FILE)),
        PathBuf::from(LOG_FILE_NAME)
    );
}
