//! GIMP-style palette files and typed palette strings.

use std::path::Path;

use shared::{domain::PaletteColor, error::VectorizeError};
use tracing::warn;

const SKIPPED_HEADER_PREFIXES: [&str; 3] = ["GIMP Palette", "Name:", "Columns:"];

/// Parses palette text into colors, in file order.
///
/// Lines whose first three tokens are not channel values in `0..=255` are
/// skipped with a warning; they never abort the parse.
pub fn parse_gpl(text: &str) -> Vec<PaletteColor> {
    let mut colors = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if SKIPPED_HEADER_PREFIXES
            .iter()
            .any(|prefix| line.starts_with(prefix))
        {
            continue;
        }

        // Only the channel tokens matter; anything after them is the color name.
        let tokens: Vec<&str> = line.split_whitespace().take(3).collect();
        if tokens.len() < 3 {
            warn!(line, "skipping palette line without color data");
            continue;
        }

        match (
            tokens[0].parse::<u8>(),
            tokens[1].parse::<u8>(),
            tokens[2].parse::<u8>(),
        ) {
            (Ok(r), Ok(g), Ok(b)) => colors.push(PaletteColor::from_rgb(r, g, b)),
            _ => warn!(line, "skipping palette line without valid color data"),
        }
    }
    colors
}

pub fn load_gpl_file(path: &Path) -> Result<Vec<PaletteColor>, VectorizeError> {
    let text = std::fs::read_to_string(path).map_err(|err| {
        VectorizeError::filesystem(
            format!("failed to read palette file {}: {err}", path.display()),
            Some(path.to_path_buf()),
        )
    })?;
    Ok(parse_gpl(&text))
}

/// Value of the `processing.palette` field for parsed colors.
pub fn join_palette(colors: &[PaletteColor]) -> Option<String> {
    if colors.is_empty() {
        return None;
    }
    Some(
        colors
            .iter()
            .map(PaletteColor::as_str)
            .collect::<Vec<_>>()
            .join("; "),
    )
}

/// Number of colors in a semicolon-delimited palette string.
pub fn count_palette_entries(palette: &str) -> usize {
    palette
        .split(';')
        .filter(|entry| !entry.trim().is_empty())
        .count()
}
