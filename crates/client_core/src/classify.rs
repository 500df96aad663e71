//! Decision table for a finished HTTP exchange.

use shared::domain::{Mode, OutputFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// Non-success status; nothing is written.
    ApiError { status: u16 },
    /// An svg was expected but the payload does not declare one.
    MalformedResponse,
    SvgResult,
    PngResult,
    UnexpectedContentType,
}

impl ResponseOutcome {
    pub fn is_result(self) -> bool {
        matches!(self, Self::SvgResult | Self::PngResult)
    }

    /// Outcomes whose body is kept as a diagnostic dump.
    pub fn dumps_body(self) -> bool {
        matches!(self, Self::MalformedResponse | Self::UnexpectedContentType)
    }
}

pub fn classify(
    status: u16,
    content_type: &str,
    requested_format: OutputFormat,
    mode: Mode,
) -> ResponseOutcome {
    if !(200..300).contains(&status) {
        return ResponseOutcome::ApiError { status };
    }

    let expected = mode.effective_format(requested_format);
    let content_type = content_type.to_ascii_lowercase();

    if expected == OutputFormat::Svg && !content_type.contains("svg") {
        ResponseOutcome::MalformedResponse
    } else if content_type.contains("image/svg+xml") {
        ResponseOutcome::SvgResult
    } else if content_type.contains("image/png") {
        ResponseOutcome::PngResult
    } else {
        ResponseOutcome::UnexpectedContentType
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_success_status_is_api_error() {
        for status in [400, 401, 402, 429, 500, 302] {
            assert_eq!(
                classify(status, "image/png", OutputFormat::Png, Mode::Preview),
                ResponseOutcome::ApiError { status }
            );
        }
    }

    #[test]
    fn svg_content_for_svg_request() {
        assert_eq!(
            classify(200, "image/svg+xml", OutputFormat::Svg, Mode::Production),
            ResponseOutcome::SvgResult
        );
        assert_eq!(
            classify(200, "Image/SVG+XML; charset=utf-8", OutputFormat::Svg, Mode::Production),
            ResponseOutcome::SvgResult
        );
    }

    #[test]
    fn svg_request_answered_without_svg_is_malformed() {
        assert_eq!(
            classify(200, "application/json", OutputFormat::Svg, Mode::Production),
            ResponseOutcome::MalformedResponse
        );
        assert_eq!(
            classify(200, "image/png", OutputFormat::Svg, Mode::Production),
            ResponseOutcome::MalformedResponse
        );
    }

    #[test]
    fn preview_expects_png_even_for_svg_selection() {
        assert_eq!(
            classify(200, "image/png", OutputFormat::Svg, Mode::Preview),
            ResponseOutcome::PngResult
        );
    }

    #[test]
    fn png_content_for_png_request() {
        assert_eq!(
            classify(200, "image/png", OutputFormat::Png, Mode::Production),
            ResponseOutcome::PngResult
        );
    }

    #[test]
    fn unknown_content_type() {
        let outcome = classify(200, "text/html", OutputFormat::Png, Mode::Preview);
        assert_eq!(outcome, ResponseOutcome::UnexpectedContentType);
        assert!(outcome.dumps_body());
        assert!(!outcome.is_result());
        assert_eq!(
            classify(200, "", OutputFormat::Png, Mode::Production),
            ResponseOutcome::UnexpectedContentType
        );
    }
}
