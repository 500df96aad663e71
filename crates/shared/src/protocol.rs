//! Wire vocabulary of the remote vectorization endpoint.

pub const DEFAULT_ENDPOINT: &str = "https://de.vectorizer.ai/api/v1/vectorize";

/// Multipart part carrying the source image.
pub const IMAGE_PART: &str = "image";

/// Written into the output folder when a successful response cannot be used.
pub const DIAGNOSTIC_DUMP_FILENAME: &str = "error_response.txt";

pub mod fields {
    pub const OUTPUT_FILE_FORMAT: &str = "output.file_format";
    pub const MODE: &str = "mode";
    pub const STRICT_PALETTE: &str = "processing.strict_palette";
    pub const SIZE_WIDTH: &str = "output.size.width";
    pub const SIZE_HEIGHT: &str = "output.size.height";
    pub const SIZE_UNIT: &str = "output.size.unit";
    pub const SIZE_INPUT_DPI: &str = "output.size.input_dpi";
    pub const SIZE_OUTPUT_DPI: &str = "output.size.output_dpi";
    pub const LINE_FIT_TOLERANCE: &str = "output.curves.line_fit_tolerance";
    pub const ALLOW_QUADRATIC_BEZIER: &str = "output.curves.allowed.quadratic_bezier";
    pub const ALLOW_CUBIC_BEZIER: &str = "output.curves.allowed.cubic_bezier";
    pub const MIN_AREA_PX: &str = "processing.shapes.min_area_px";
    pub const ANTI_ALIASING_MODE: &str = "output.bitmap.anti_aliasing_mode";
    pub const MAX_COLORS: &str = "processing.max_colors";
    pub const PALETTE: &str = "processing.palette";
}

/// Ordered `key=value` form fields sent next to the image part.
pub type FormFields = Vec<(&'static str, String)>;

pub fn field<'a>(fields: &'a FormFields, key: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, value)| value.as_str())
}
