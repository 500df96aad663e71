//! Turns raw form values into a validated request and its form payload.

use std::path::{Path, PathBuf};

use shared::{
    domain::{AntiAliasingMode, Mode, OutputFormat, MIN_AREA_PX_MAX, MIN_AREA_PX_MIN},
    error::VectorizeError,
    protocol::{fields, FormFields},
};
use tracing::{debug, error};

use crate::palette::{count_palette_entries, join_palette, load_gpl_file};

/// Form values exactly as the user typed them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestDraft {
    pub image_path: String,
    pub output_format: OutputFormat,
    pub mode: Mode,
    pub width_cm: String,
    pub height_cm: String,
    pub input_dpi: String,
    pub output_dpi: String,
    pub line_fit_tolerance: String,
    pub anti_aliasing_mode: AntiAliasingMode,
    pub min_area_px: String,
    pub max_colors: String,
    pub palette: String,
    pub gpl_file_path: String,
    /// Order/batch identifier; names the output file when set.
    pub batch_id: String,
    pub output_folder: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorizationRequest {
    pub image_path: PathBuf,
    /// Format sent to and expected from the service; png in preview mode.
    pub output_format: OutputFormat,
    pub mode: Mode,
    pub width_cm: f64,
    pub height_cm: f64,
    pub input_dpi: f64,
    pub output_dpi: f64,
    pub line_fit_tolerance: String,
    pub anti_aliasing_mode: AntiAliasingMode,
    pub min_area_px: f64,
    pub max_colors: Option<u32>,
    pub palette: Option<String>,
    pub palette_colors: usize,
    /// Set when a configured palette file could not be read; the request goes out without it.
    pub palette_warning: Option<String>,
    pub output_folder: PathBuf,
    pub output_path: PathBuf,
}

impl RequestDraft {
    pub fn build(&self) -> Result<VectorizationRequest, VectorizeError> {
        let width_cm = parse_number("width (cm)", &self.width_cm)?;
        let height_cm = parse_number("height (cm)", &self.height_cm)?;
        let input_dpi = parse_number("input DPI", &self.input_dpi)?;
        let output_dpi = parse_number("output DPI", &self.output_dpi)?;
        let min_area_px = parse_number("minimum area (px)", &self.min_area_px)?;
        if !(MIN_AREA_PX_MIN..=MIN_AREA_PX_MAX).contains(&min_area_px) {
            return Err(VectorizeError::validation(format!(
                "minimum area must be between {MIN_AREA_PX_MIN} and {MIN_AREA_PX_MAX} px, got {min_area_px}"
            )));
        }
        let max_colors = parse_max_colors(&self.max_colors)?;

        let image_path = self.image_path.trim();
        if image_path.is_empty() {
            return Err(VectorizeError::filesystem("no image selected", None));
        }
        let image_path = PathBuf::from(image_path);
        if !image_path.is_file() {
            return Err(VectorizeError::filesystem(
                format!("image file {} does not exist", image_path.display()),
                Some(image_path),
            ));
        }

        let output_format = self.mode.effective_format(self.output_format);
        let output_folder = PathBuf::from(self.output_folder.trim());
        let output_path = output_folder.join(output_filename(
            &image_path,
            self.batch_id.trim(),
            output_format,
        ));
        let (palette, palette_warning) = self.resolve_palette();
        let palette_colors = palette.as_deref().map(count_palette_entries).unwrap_or(0);

        Ok(VectorizationRequest {
            image_path,
            output_format,
            mode: self.mode,
            width_cm,
            height_cm,
            input_dpi,
            output_dpi,
            line_fit_tolerance: self.line_fit_tolerance.trim().to_string(),
            anti_aliasing_mode: self.anti_aliasing_mode,
            min_area_px,
            max_colors,
            palette,
            palette_colors,
            palette_warning,
            output_folder,
            output_path,
        })
    }

    /// The typed palette wins; the palette file is only read when nothing was typed.
    fn resolve_palette(&self) -> (Option<String>, Option<String>) {
        let typed = self.palette.trim();
        if !typed.is_empty() {
            return (Some(typed.to_string()), None);
        }

        let gpl_path = self.gpl_file_path.trim();
        if gpl_path.is_empty() {
            return (None, None);
        }
        match load_gpl_file(Path::new(gpl_path)) {
            Ok(colors) => {
                debug!(path = gpl_path, colors = colors.len(), "loaded palette file");
                (join_palette(&colors), None)
            }
            Err(err) => {
                error!(path = gpl_path, "palette file ignored: {err}");
                (None, Some(err.to_string()))
            }
        }
    }
}

impl VectorizationRequest {
    pub fn form_fields(&self) -> FormFields {
        let mut form: FormFields = vec![
            (fields::OUTPUT_FILE_FORMAT, self.output_format.to_string()),
            (fields::MODE, self.mode.to_string()),
            (fields::STRICT_PALETTE, "true".to_string()),
            (fields::SIZE_WIDTH, format_number(self.width_cm)),
            (fields::SIZE_HEIGHT, format_number(self.height_cm)),
            (fields::SIZE_UNIT, "cm".to_string()),
            (fields::SIZE_INPUT_DPI, format_number(self.input_dpi)),
            (fields::SIZE_OUTPUT_DPI, format_number(self.output_dpi)),
            (fields::LINE_FIT_TOLERANCE, self.line_fit_tolerance.clone()),
            (fields::ALLOW_QUADRATIC_BEZIER, "false".to_string()),
            (fields::ALLOW_CUBIC_BEZIER, "false".to_string()),
            (fields::MIN_AREA_PX, format_number(self.min_area_px)),
        ];

        if self.output_format == OutputFormat::Png {
            form.push((
                fields::ANTI_ALIASING_MODE,
                self.anti_aliasing_mode.to_string(),
            ));
        }
        if let Some(max_colors) = self.max_colors {
            form.push((fields::MAX_COLORS, max_colors.to_string()));
        }
        if let Some(palette) = &self.palette {
            form.push((fields::PALETTE, palette.clone()));
        }
        form
    }
}

/// `<batch_id>.<ext>` when a batch identifier is set, `<stem>_vectorized.<ext>` otherwise.
pub fn output_filename(image_path: &Path, batch_id: &str, format: OutputFormat) -> String {
    if !batch_id.is_empty() {
        return format!("{batch_id}.{}", format.extension());
    }
    let stem = image_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{stem}_vectorized.{}", format.extension())
}

fn parse_number(label: &str, raw: &str) -> Result<f64, VectorizeError> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(VectorizeError::validation(format!(
            "{label} must be a number, got '{}'",
            raw.trim()
        ))),
    }
}

fn parse_max_colors(raw: &str) -> Result<Option<u32>, VectorizeError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<u32>() {
        Ok(value) if value > 0 => Ok(Some(value)),
        _ => Err(VectorizeError::validation(format!(
            "maximum colors must be a positive whole number, got '{raw}'"
        ))),
    }
}

/// Decimal rendering used on the wire: whole numbers keep one decimal (`50.0`).
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
#[path = "tests/request_tests.rs"]
mod tests;
