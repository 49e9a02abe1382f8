use chrono::Utc;
use scraper::{ElementRef, Html, Selector};

use crate::error::AppError;
use crate::parse::alfa::first_text;
use crate::pool::Pooled;
use crate::traits::HtmlParser;
use crate::vacancy::{draft_pool, VacancyDraft};

const COMPANY_SELECTOR: &str = "p.MuiTypography-root.MuiTypography-h3";
const LOCATION_LABEL: &str = "Operating mode";

/// Extracts vacancy details from beta-source pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct BetaParser;

impl BetaParser {
    pub fn new() -> Self {
        Self
    }
}

impl HtmlParser for BetaParser {
    fn parse(&self, html: &str) -> Result<Pooled<VacancyDraft>, AppError> {
        let document = Html::parse_document(html);

        let title = first_text(&document, "title")?.unwrap_or_else(|| "Unknown Title".into());
        let company =
            first_text(&document, COMPANY_SELECTOR)?.unwrap_or_else(|| "Unknown Company".into());
        let description = extract_description(&document)?;
        let location =
            extract_location(&document)?.unwrap_or_else(|| "Unknown Location".into());

        let mut draft = draft_pool().get();
        draft.title.push_str(&title);
        draft.company.push_str(&company);
        draft.description.push_str(&description);
        draft.location.push_str(&location);
        draft.posted_at = Some(Utc::now());
        Ok(draft)
    }
}

/// The description lives in a content block with exactly two child `<div>`s:
/// a heading holding an `<h3>` and a body holding a `<p>`. The body's inner
/// HTML is the description.
fn extract_description(document: &Html) -> Result<String, AppError> {
    let boxes = Selector::parse("div.MuiBox-root")
        .map_err(|e| AppError::ParseError(format!("selector div.MuiBox-root: {e}")))?;

    for element in document.select(&boxes) {
        let children: Vec<ElementRef> = element
            .child_elements()
            .filter(|child| child.value().name() == "div")
            .collect();
        if children.len() != 2 {
            continue;
        }

        let heading = children[0]
            .child_elements()
            .any(|child| child.value().name() == "h3");
        let body = children[1]
            .child_elements()
            .any(|child| child.value().name() == "p");
        if heading && body {
            return Ok(children[1].inner_html());
        }
    }

    Ok(String::new())
}

/// The location sits in a two-column row labelled "Operating mode".
fn extract_location(document: &Html) -> Result<Option<String>, AppError> {
    let divs = Selector::parse("div")
        .map_err(|e| AppError::ParseError(format!("selector div: {e}")))?;

    for element in document.select(&divs) {
        let children: Vec<ElementRef> = element.child_elements().collect();
        if children.len() != 2 {
            continue;
        }

        let label = children[0].text().collect::<String>();
        if label.trim().trim_end_matches(':') != LOCATION_LABEL {
            continue;
        }

        let value = children[1].text().collect::<String>().trim().to_string();
        if !value.is_empty() {
            return Ok(Some(value));
        }
    }

    Ok(None)
}
