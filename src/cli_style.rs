/*!
 * filedrop CLI style helpers
 *
 * Themed text, the file listing table and transfer progress bars.
 */

use chrono::Local;
use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use console::{style, StyledObject};
use filedrop_core::FileMetadata;
use indicatif::{ProgressBar, ProgressStyle};

/// Brand colors for consistent styling
pub struct Theme;

impl Theme {
    pub fn primary<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).cyan()
    }

    pub fn success<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).green()
    }

    pub fn warning<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).yellow()
    }

    pub fn error<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).red()
    }

    pub fn muted<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).dim()
    }
}

/// Unicode icons for visual feedback
pub struct Icons;

impl Icons {
    pub const SUCCESS: &'static str = "✓";
    pub const ERROR: &'static str = "✗";
    pub const WARNING: &'static str = "⚠";
    pub const INFO: &'static str = "ℹ";
    pub const ARROW_RIGHT: &'static str = "→";
}

/// Create a styled data table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Table of files as shown by `filedrop list`
pub fn file_table(files: &[FileMetadata]) -> Table {
    let mut table = create_table();
    table.set_header(
        ["ID", "Name", "Size", "Uploaded"]
            .into_iter()
            .map(|title| {
                Cell::new(title)
                    .fg(Color::Cyan)
                    .add_attribute(Attribute::Bold)
            })
            .collect::<Vec<_>>(),
    );

    for file in files {
        table.add_row(vec![
            Cell::new(&file.file_id).fg(Color::DarkGrey),
            Cell::new(&file.filename)
                .fg(Color::White)
                .add_attribute(Attribute::Bold),
            Cell::new(format_bytes(file.size)),
            Cell::new(
                file.uploaded_at
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
            ),
        ]);
    }

    table
}

/// Progress bar for a transfer of `total` bytes
pub fn transfer_bar(total: u64, label: &str) -> ProgressBar {
    let bar = ProgressBar::new(total);
    // Template is a compile-time constant, so a parse failure falls back to the default bar
    if let Ok(progress_style) = ProgressStyle::default_bar().template(
        "{prefix} {spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
    ) {
        bar.set_style(progress_style.progress_chars("#>-"));
    }
    bar.set_prefix(label.to_string());
    bar
}

/// One-line description of a file, used by interactive selection
pub fn file_label(file: &FileMetadata) -> String {
    format!(
        "{} ({}) {}",
        file.filename,
        format_bytes(file.size),
        Theme::muted(&file.file_id)
    )
}

/// Format bytes into human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let bytes_f = bytes as f64;
    let base = 1024.0_f64;
    let exp = (bytes_f.ln() / base.ln()).floor() as usize;
    let exp = exp.min(UNITS.len() - 1);

    let value = bytes_f / base.powi(exp as i32);

    if exp == 0 {
        format!("{} {}", bytes, UNITS[exp])
    } else {
        format!("{:.2} {}", value, UNITS[exp])
    }
}

/// Print a styled error message with an optional hint
pub fn print_error(message: &str, suggestion: Option<&str>) {
    eprintln!(
        "{} {}",
        Theme::error(format!("{} Error:", Icons::ERROR)),
        message
    );

    if let Some(hint) = suggestion {
        eprintln!(
            "  {} {}",
            Theme::muted(Icons::ARROW_RIGHT),
            Theme::muted(hint)
        );
    }
}

pub fn print_warning(message: &str) {
    eprintln!(
        "{} {}",
        Theme::warning(Icons::WARNING.to_string()),
        Theme::warning(message)
    );
}

pub fn print_success(message: &str) {
    println!(
        "{} {}",
        Theme::success(Icons::SUCCESS.to_string()),
        Theme::success(message)
    );
}

pub fn print_info(message: &str) {
    println!("{} {}", Theme::primary(Icons::INFO.to_string()), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn file(id: &str, name: &str, size: u64) -> FileMetadata {
        FileMetadata {
            file_id: id.to_string(),
            filename: name.to_string(),
            size,
            content_type: "text/plain".to_string(),
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_file_table_rows() {
        console::set_colors_enabled(false);
        let table = file_table(&[file("aaaa", "notes.txt", 2048), file("bbbb", "b.bin", 3)]);
        let rendered = table.to_string();

        for expected in ["ID", "Name", "Size", "Uploaded", "notes.txt", "2.00 KB", "3 B"] {
            assert!(rendered.contains(expected), "missing {expected} in\n{rendered}");
        }
        assert_eq!(table.row_iter().count(), 2);
    }
}
