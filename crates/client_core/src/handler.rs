//! Persists a classified response and decides what the preview shows.

use std::path::{Path, PathBuf};

use serde::Serialize;
use shared::{domain::OutputFormat, error::VectorizeError, protocol::DIAGNOSTIC_DUMP_FILENAME};
use tracing::{debug, error};

use crate::classify::ResponseOutcome;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorizationResult {
    pub content_type: String,
    pub format: OutputFormat,
    /// Where the result was written; the new "current result" for the preview.
    pub path: PathBuf,
    pub bytes_written: usize,
    pub palette_colors: usize,
}

/// Everything the handler needs to know about the exchange.
#[derive(Debug, Clone, Copy)]
pub struct ResponseContext<'a> {
    pub outcome: ResponseOutcome,
    pub content_type: &'a str,
    pub body: &'a [u8],
    pub output_path: &'a Path,
    pub output_folder: &'a Path,
    pub palette_colors: usize,
}

pub async fn persist(ctx: ResponseContext<'_>) -> Result<VectorizationResult, VectorizeError> {
    match ctx.outcome {
        ResponseOutcome::ApiError { status } => {
            let body = String::from_utf8_lossy(ctx.body).into_owned();
            error!(status, body = %body, "vectorization api error");
            Err(VectorizeError::Api { status, body })
        }
        ResponseOutcome::MalformedResponse => {
            let dump_path = write_dump(ctx.output_folder, ctx.body).await?;
            error!(
                content_type = ctx.content_type,
                path = %dump_path.display(),
                "svg requested but response is not svg"
            );
            Err(VectorizeError::MalformedResponse {
                content_type: ctx.content_type.to_string(),
                dump_path,
            })
        }
        ResponseOutcome::UnexpectedContentType => {
            let dump_path = write_dump(ctx.output_folder, ctx.body).await?;
            error!(
                content_type = ctx.content_type,
                path = %dump_path.display(),
                "unexpected response content type"
            );
            Err(VectorizeError::UnexpectedContentType {
                content_type: ctx.content_type.to_string(),
                dump_path,
            })
        }
        ResponseOutcome::SvgResult => {
            write_file(ctx.output_path, ctx.body).await?;
            debug!(path = %ctx.output_path.display(), "saved svg result");
            Ok(result(&ctx, OutputFormat::Svg, ctx.output_path.to_path_buf()))
        }
        ResponseOutcome::PngResult => {
            let png_path = with_png_extension(ctx.output_path);
            write_file(&png_path, ctx.body).await?;
            debug!(path = %png_path.display(), "saved png result");
            Ok(result(&ctx, OutputFormat::Png, png_path))
        }
    }
}

/// Swaps the extension for `.png` unless it already is one.
pub fn with_png_extension(path: &Path) -> PathBuf {
    let is_png = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("png"))
        .unwrap_or(false);
    if is_png {
        path.to_path_buf()
    } else {
        path.with_extension("png")
    }
}

fn result(ctx: &ResponseContext<'_>, format: OutputFormat, path: PathBuf) -> VectorizationResult {
    VectorizationResult {
        content_type: ctx.content_type.to_string(),
        format,
        path,
        bytes_written: ctx.body.len(),
        palette_colors: ctx.palette_colors,
    }
}

async fn write_dump(output_folder: &Path, body: &[u8]) -> Result<PathBuf, VectorizeError> {
    let dump_path = output_folder.join(DIAGNOSTIC_DUMP_FILENAME);
    write_file(&dump_path, body).await?;
    Ok(dump_path)
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), VectorizeError> {
    tokio::fs::write(path, bytes).await.map_err(|err| {
        VectorizeError::filesystem(
            format!("failed to write {}: {err}", path.display()),
            Some(path.to_path_buf()),
        )
    })
}

#[cfg(test)]
mod tests {
    use shared::error::ErrorKind;

    use super::*;

    fn ctx<'a>(
        outcome: ResponseOutcome,
        content_type: &'a str,
        body: &'a [u8],
        output_path: &'a Path,
        output_folder: &'a Path,
    ) -> ResponseContext<'a> {
        ResponseContext {
            outcome,
            content_type,
            body,
            output_path,
            output_folder,
            palette_colors: 0,
        }
    }

    #[tokio::test]
    async fn svg_is_written_verbatim() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("order_vectorized.svg");
        let body = b"<svg xmlns=\"http://www.w3.org/2000/svg\"><path d=\"M0 0\"/></svg>\n";
        let result = persist(ctx(
            ResponseOutcome::SvgResult,
            "image/svg+xml",
            body,
            &out,
            dir.path(),
        ))
        .await
        .expect("persist");
        assert_eq!(result.path, out);
        assert_eq!(result.format, OutputFormat::Svg);
        assert_eq!(std::fs::read(&out).expect("read"), body.to_vec());
    }

    #[tokio::test]
    async fn png_corrects_svg_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("1234.svg");
        let result = persist(ctx(
            ResponseOutcome::PngResult,
            "image/png",
            b"\x89PNG",
            &out,
            dir.path(),
        ))
        .await
        .expect("persist");
        assert_eq!(result.path, dir.path().join("1234.png"));
        assert!(result.path.exists());
        assert!(!out.exists());
    }

    #[test]
    fn png_keeps_png_extension_in_any_case() {
        assert_eq!(
            with_png_extension(Path::new("out/a.PNG")),
            PathBuf::from("out/a.PNG")
        );
        assert_eq!(
            with_png_extension(Path::new("out/a_vectorized")),
            PathBuf::from("out/a_vectorized.png")
        );
    }

    #[tokio::test]
    async fn api_error_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("a_vectorized.png");
        let err = persist(ctx(
            ResponseOutcome::ApiError { status: 401 },
            "application/json",
            b"{\"error\":\"unauthorized\"}",
            &out,
            dir.path(),
        ))
        .await
        .expect_err("api error");
        assert_eq!(err.kind(), ErrorKind::Api);
        assert!(err.to_string().contains("unauthorized"));
        assert!(!out.exists());
        assert!(!dir.path().join(DIAGNOSTIC_DUMP_FILENAME).exists());
    }

    #[tokio::test]
    async fn malformed_and_unexpected_bodies_are_dumped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("a_vectorized.svg");
        for outcome in [
            ResponseOutcome::MalformedResponse,
            ResponseOutcome::UnexpectedContentType,
        ] {
            let err = persist(ctx(outcome, "text/html", b"<html>oops</html>", &out, dir.path()))
                .await
                .expect_err("dumped");
            assert!(matches!(
                err.kind(),
                ErrorKind::MalformedResponse | ErrorKind::UnexpectedContentType
            ));
            let dump = dir.path().join(DIAGNOSTIC_DUMP_FILENAME);
            assert_eq!(std::fs::read(&dump).expect("dump"), b"<html>oops</html>");
            assert!(!out.exists());
        }
    }

    #[tokio::test]
    async fn unwritable_output_folder_is_a_filesystem_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("missing").join("a.svg");
        let err = persist(ctx(
            ResponseOutcome::SvgResult,
            "image/svg+xml",
            b"<svg/>",
            &out,
            dir.path(),
        ))
        .await
        .expect_err("no parent dir");
        assert_eq!(err.kind(), ErrorKind::Filesystem);
    }
}
