use super::*;

use shared::{error::ErrorKind, protocol::field};

fn draft_for(image: &Path, output_folder: &Path) -> RequestDraft {
    RequestDraft {
        image_path: image.to_string_lossy().into_owned(),
        output_format: OutputFormat::Png,
        mode: Mode::Preview,
        width_cm: "21.17".to_string(),
        height_cm: "12.5".to_string(),
        input_dpi: "96".to_string(),
        output_dpi: "300".to_string(),
        line_fit_tolerance: "0.1".to_string(),
        anti_aliasing_mode: AntiAliasingMode::AntiAliased,
        min_area_px: "50".to_string(),
        max_colors: "36".to_string(),
        palette: String::new(),
        gpl_file_path: String::new(),
        batch_id: String::new(),
        output_folder: output_folder.to_string_lossy().into_owned(),
    }
}

fn workspace() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let image = dir.path().join("poster.jpg");
    std::fs::write(&image, b"not really a jpeg").expect("write image");
    (dir, image)
}

#[test]
fn rejects_min_area_outside_range() {
    let (dir, image) = workspace();
    for value in ["44.9", "100.5", "0", "-50", "1000"] {
        let mut draft = draft_for(&image, dir.path());
        draft.min_area_px = value.to_string();
        let err = draft.build().expect_err("out of range");
        assert_eq!(err.kind(), ErrorKind::Validation, "value {value}");
    }
}

#[test]
fn accepts_min_area_bounds() {
    let (dir, image) = workspace();
    for value in ["45", "100", "72.5"] {
        let mut draft = draft_for(&image, dir.path());
        draft.min_area_px = value.to_string();
        draft.build().expect("in range");
    }
}

#[test]
fn non_numeric_size_is_a_validation_error() {
    let (dir, image) = workspace();
    let mut draft = draft_for(&image, dir.path());
    draft.width_cm = "12,5".to_string();
    let err = draft.build().expect_err("comma decimal");
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("width"), "{err}");

    let mut draft = draft_for(&image, dir.path());
    draft.output_dpi = String::new();
    assert_eq!(
        draft.build().expect_err("empty dpi").kind(),
        ErrorKind::Validation
    );
}

#[test]
fn validation_runs_before_image_lookup() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut draft = draft_for(&dir.path().join("missing.png"), dir.path());
    draft.min_area_px = "20".to_string();
    assert_eq!(
        draft.build().expect_err("invalid").kind(),
        ErrorKind::Validation
    );
}

#[test]
fn missing_image_is_a_filesystem_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let draft = draft_for(&dir.path().join("missing.png"), dir.path());
    assert_eq!(
        draft.build().expect_err("missing").kind(),
        ErrorKind::Filesystem
    );
}

#[test]
fn preview_forces_png_even_when_svg_selected() {
    let (dir, image) = workspace();
    let mut draft = draft_for(&image, dir.path());
    draft.output_format = OutputFormat::Svg;
    let request = draft.build().expect("request");
    assert_eq!(request.output_format, OutputFormat::Png);
    let form = request.form_fields();
    assert_eq!(field(&form, fields::OUTPUT_FILE_FORMAT), Some("png"));
    assert_eq!(field(&form, fields::MODE), Some("preview"));
    assert!(request.output_path.ends_with("poster_vectorized.png"));
}

#[test]
fn production_svg_omits_anti_aliasing() {
    let (dir, image) = workspace();
    let mut draft = draft_for(&image, dir.path());
    draft.mode = Mode::Production;
    draft.output_format = OutputFormat::Svg;
    let form = draft.build().expect("request").form_fields();
    assert_eq!(field(&form, fields::OUTPUT_FILE_FORMAT), Some("svg"));
    assert_eq!(field(&form, fields::ANTI_ALIASING_MODE), None);
}

#[test]
fn always_sends_fixed_flags_and_sizes() {
    let (dir, image) = workspace();
    let form = draft_for(&image, dir.path())
        .build()
        .expect("request")
        .form_fields();
    assert_eq!(field(&form, fields::STRICT_PALETTE), Some("true"));
    assert_eq!(field(&form, fields::SIZE_UNIT), Some("cm"));
    assert_eq!(field(&form, fields::SIZE_WIDTH), Some("21.17"));
    assert_eq!(field(&form, fields::SIZE_HEIGHT), Some("12.5"));
    assert_eq!(field(&form, fields::SIZE_INPUT_DPI), Some("96.0"));
    assert_eq!(field(&form, fields::SIZE_OUTPUT_DPI), Some("300.0"));
    assert_eq!(field(&form, fields::LINE_FIT_TOLERANCE), Some("0.1"));
    assert_eq!(field(&form, fields::ALLOW_QUADRATIC_BEZIER), Some("false"));
    assert_eq!(field(&form, fields::ALLOW_CUBIC_BEZIER), Some("false"));
    assert_eq!(field(&form, fields::MIN_AREA_PX), Some("50.0"));
    assert_eq!(
        field(&form, fields::ANTI_ALIASING_MODE),
        Some("anti_aliased")
    );
    assert_eq!(field(&form, fields::MAX_COLORS), Some("36"));
    assert_eq!(field(&form, fields::PALETTE), None);
}

#[test]
fn empty_max_colors_is_omitted() {
    let (dir, image) = workspace();
    let mut draft = draft_for(&image, dir.path());
    draft.max_colors = "  ".to_string();
    let form = draft.build().expect("request").form_fields();
    assert_eq!(field(&form, fields::MAX_COLORS), None);

    draft.max_colors = "zero".to_string();
    assert_eq!(
        draft.build().expect_err("not a count").kind(),
        ErrorKind::Validation
    );
}

#[test]
fn typed_palette_wins_over_palette_file() {
    let (dir, image) = workspace();
    let gpl = dir.path().join("shop.gpl");
    std::fs::write(&gpl, "GIMP Palette\n0 0 255 Blue\n").expect("write gpl");

    let mut draft = draft_for(&image, dir.path());
    draft.palette = "#ff0000;#00ff00".to_string();
    draft.gpl_file_path = gpl.to_string_lossy().into_owned();
    let request = draft.build().expect("request");
    assert_eq!(request.palette.as_deref(), Some("#ff0000;#00ff00"));
    assert_eq!(request.palette_colors, 2);

    draft.palette.clear();
    let request = draft.build().expect("request");
    assert_eq!(request.palette.as_deref(), Some("#0000ff"));
    assert_eq!(request.palette_colors, 1);
    let form = request.form_fields();
    assert_eq!(field(&form, fields::PALETTE), Some("#0000ff"));
}

#[test]
fn palette_file_without_colors_sends_no_palette() {
    let (dir, image) = workspace();
    let gpl = dir.path().join("empty.gpl");
    std::fs::write(&gpl, "GIMP Palette\nName: Empty\n").expect("write gpl");
    let mut draft = draft_for(&image, dir.path());
    draft.gpl_file_path = gpl.to_string_lossy().into_owned();
    let request = draft.build().expect("request");
    assert_eq!(request.palette, None);
    assert_eq!(request.palette_warning, None);
}

#[test]
fn unreadable_palette_file_is_reported_but_not_fatal() {
    let (dir, image) = workspace();
    let mut draft = draft_for(&image, dir.path());
    draft.gpl_file_path = dir.path().join("gone.gpl").to_string_lossy().into_owned();
    let request = draft.build().expect("request");
    assert_eq!(request.palette, None);
    assert!(request.palette_warning.is_some());
}

#[test]
fn batch_id_names_the_output_file() {
    let (dir, image) = workspace();
    let mut draft = draft_for(&image, dir.path());
    draft.batch_id = " 302-1234567 ".to_string();
    draft.mode = Mode::Production;
    draft.output_format = OutputFormat::Svg;
    let request = draft.build().expect("request");
    assert_eq!(request.output_path, dir.path().join("302-1234567.svg"));
}

#[test]
fn formats_numbers_like_decimal_literals() {
    assert_eq!(format_number(50.0), "50.0");
    assert_eq!(format_number(12.5), "12.5");
    assert_eq!(format_number(0.1), "0.1");
}
