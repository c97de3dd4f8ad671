//! Excel workbook export: one combined sheet plus one sheet per product.

use crate::coupang::{ProductReviewSet, Review};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::borrow::Cow;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the sheet holding every product's reviews.
pub const ALL_REVIEWS_SHEET: &str = "All Reviews";

/// Column headers, in the order fields are written.
pub const COLUMNS: [&str; 9] = [
    "productId",
    "productName",
    "reviewId",
    "options",
    "userName",
    "rating",
    "date",
    "title",
    "content",
];

const FILE_PREFIX: &str = "coupang_reviews";
const MAX_SHEET_NAME_LEN: usize = 31;
/// Excel's per-cell character limit.
const MAX_CELL_CHARS: usize = 32_767;

/// A sheet to be written: its final name and the rows it holds.
#[derive(Debug)]
pub struct SheetPlan<'a> {
    pub name: String,
    pub rows: Vec<&'a Review>,
}

/// Lays out the workbook: the combined sheet first, then one sheet per set in input order.
///
/// Every set gets a sheet, empty or not. Names are made valid and unique.
pub fn plan_sheets(sets: &[ProductReviewSet]) -> Vec<SheetPlan<'_>> {
    let mut used = HashSet::new();
    let mut sheets = Vec::with_capacity(sets.len() + 1);

    sheets.push(SheetPlan {
        name: unique_sheet_name(ALL_REVIEWS_SHEET, &mut used),
        rows: sets.iter().flat_map(|s| s.reviews.iter()).collect(),
    });

    for set in sets {
        sheets.push(SheetPlan {
            name: unique_sheet_name(&format!("Product {}", set.product_id), &mut used),
            rows: set.reviews.iter().collect(),
        });
    }

    sheets
}

/// Replaces characters Excel forbids in sheet names and trims to the length limit.
fn sanitize_sheet_name(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\') { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches('\'');

    let name: String = cleaned.chars().take(MAX_SHEET_NAME_LEN).collect();
    if name.trim().is_empty() {
        "Sheet".to_string()
    } else {
        name
    }
}

// Excel compares sheet names case-insensitively.
fn unique_sheet_name(raw: &str, used: &mut HashSet<String>) -> String {
    let base = sanitize_sheet_name(raw);
    let mut candidate = base.clone();
    let mut n = 2;

    while used.contains(&candidate.to_lowercase()) {
        let suffix = format!(" ({})", n);
        let keep = MAX_SHEET_NAME_LEN - suffix.chars().count();
        candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
        n += 1;
    }

    used.insert(candidate.to_lowercase());
    candidate
}

/// Output file name for a run started at `now`, e.g. `coupang_reviews_2024-02-29T12-00-00.xlsx`.
pub fn workbook_file_name(now: DateTime<Utc>) -> String {
    format!("{}_{}.xlsx", FILE_PREFIX, now.format("%Y-%m-%dT%H-%M-%S"))
}

/// Writes collected reviews to a workbook in an output directory.
pub struct WorkbookExporter {
    output_dir: PathBuf,
}

impl WorkbookExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into() }
    }

    /// Writes the workbook stamped with the current time and returns its path.
    pub fn export(&self, sets: &[ProductReviewSet]) -> Result<PathBuf> {
        self.export_at(sets, Utc::now())
    }

    /// Writes the workbook stamped with `now` and returns its path.
    pub fn export_at(&self, sets: &[ProductReviewSet], now: DateTime<Utc>) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create output directory: {}", self.output_dir.display())
        })?;

        let path = self.output_dir.join(workbook_file_name(now));
        write_workbook(&plan_sheets(sets), &path)
            .with_context(|| format!("Failed to write workbook: {}", path.display()))?;

        info!("Excel file created: {}", path.display());
        Ok(path)
    }
}

fn write_workbook(sheets: &[SheetPlan<'_>], path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    for sheet in sheets {
        debug!("Writing sheet '{}' with {} rows", sheet.name, sheet.rows.len());
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;
        write_rows(worksheet, &sheet.rows, &header)?;
    }

    workbook.save(path)
}

/// Cuts `text` to the cell limit at a character boundary.
fn fit_cell(text: &str) -> Cow<'_, str> {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => Cow::Owned(text[..end].to_string()),
        None => Cow::Borrowed(text),
    }
}

fn write_rows(worksheet: &mut Worksheet, rows: &[&Review], header: &Format) -> Result<(), XlsxError> {
    for (col, title) in (0u16..).zip(COLUMNS) {
        worksheet.write_string_with_format(0, col, title, header)?;
    }

    for (row, review) in (1u32..).zip(rows) {
        let text_cells = [
            (0, review.product_id.as_str()),
            (1, review.product_name.as_str()),
            (2, review.review_id.as_str()),
            (3, review.options.as_str()),
            (4, review.user_name.as_str()),
            (6, review.date.as_str()),
            (7, review.title.as_str()),
            (8, review.content.as_str()),
        ];
        for (col, text) in text_cells {
            let cell = fit_cell(text);
            if let Cow::Owned(_) = cell {
                warn!(
                    "Truncated {} of review {} to {} characters",
                    COLUMNS[col as usize], review.review_id, MAX_CELL_CHARS
                );
            }
            worksheet.write_string(row, col, cell.as_ref())?;
        }
        worksheet.write_number(row, 5, review.rating as f64)?;
    }

    Ok(())
}
