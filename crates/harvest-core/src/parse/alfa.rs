use chrono::Utc;
use scraper::{Html, Selector};

use crate::error::AppError;
use crate::pool::Pooled;
use crate::traits::HtmlParser;
use crate::vacancy::{draft_pool, VacancyDraft};

const COMPANY_SELECTOR: &str = "div.row.align-items-center.gx-1 a.text-reset";

/// Extracts vacancy details from alfa-source pages.
///
/// The source does not expose description or location in a stable place, so
/// those fields carry placeholders; downstream field requirements are still
/// satisfied by the defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlfaParser;

impl AlfaParser {
    pub fn new() -> Self {
        Self
    }
}

impl HtmlParser for AlfaParser {
    fn parse(&self, html: &str) -> Result<Pooled<VacancyDraft>, AppError> {
        let document = Html::parse_document(html);

        let title = first_text(&document, "title")?.unwrap_or_else(|| "Unknown Title".into());
        let company =
            first_text(&document, COMPANY_SELECTOR)?.unwrap_or_else(|| "Unknown Company".into());

        let mut draft = draft_pool().get();
        draft.title.push_str(&title);
        draft.company.push_str(&company);
        draft.description.push('-');
        draft.location.push('-');
        draft.posted_at = Some(Utc::now());
        Ok(draft)
    }
}

/// Trimmed text of the first element matching the selector, `None` when the
/// element is missing or empty.
pub(crate) fn first_text(document: &Html, selector: &str) -> Result<Option<String>, AppError> {
    let selector = Selector::parse(selector)
        .map_err(|e| AppError::ParseError(format!("selector {selector}: {e}")))?;

    Ok(document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty()))
}
