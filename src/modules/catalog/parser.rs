//! Results-page parser
//!
//! Turns the catalog's tabular "simple view" HTML into `CatalogRecord`s.
//! Column layout of every data row:
//! 0 id | 1 authors | 2 title | 3 publisher | 4 year | 5 pages | 6 language |
//! 7 size | 8 extension | 9.. mirror links

use scraper::{ElementRef, Html, Selector};

use crate::domain::{AcquisitionError, CatalogRecord, NO_LINK};

const RESULTS_TABLE: &str = r#"table[width="100%"][cellspacing="1"][cellpadding="1"][rules="rows"][class="c"][align="center"]"#;
const EXPECTED_CELLS: usize = 10;

fn selector(css: &str) -> Result<Selector, AcquisitionError> {
    Selector::parse(css)
        .map_err(|e| AcquisitionError::MalformedResponse(format!("Bad selector '{}': {:?}", css, e)))
}

/// Parse a results page into records, preserving row order and skipping the header row
pub fn parse_results(markup: &str) -> Result<Vec<CatalogRecord>, AcquisitionError> {
    let document = Html::parse_document(markup);
    let table_sel = selector(RESULTS_TABLE)?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("td")?;
    let anchor_sel = selector("a")?;

    let mut tables = document.select(&table_sel);
    let table = tables.next().ok_or_else(|| {
        AcquisitionError::MalformedResponse("Results table not found in search page".to_string())
    })?;
    if tables.next().is_some() {
        tracing::warn!("More than one results table found, using the first");
    }

    let mut records = Vec::new();
    for (index, row) in table.select(&row_sel).enumerate().skip(1) {
        let cells: Vec<ElementRef> = row.select(&cell_sel).collect();
        if cells.len() < EXPECTED_CELLS {
            tracing::warn!(
                "Row {} skipped: {} of {} expected cells",
                index,
                cells.len(),
                EXPECTED_CELLS
            );
            continue;
        }

        let authors = cells[1]
            .select(&anchor_sel)
            .map(cell_text)
            .filter(|a| !a.is_empty())
            .collect();

        let source_link = cells[9]
            .select(&anchor_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(|href| href.trim().to_string())
            .unwrap_or_else(|| NO_LINK.to_string());

        records.push(CatalogRecord {
            id: cell_text(cells[0]),
            authors,
            title: title_text(cells[2], &anchor_sel),
            publisher: cell_text(cells[3]),
            year: cell_text(cells[4]),
            pages: cell_text(cells[5]),
            language: cell_text(cells[6]),
            size: cell_text(cells[7]),
            format: cell_text(cells[8]),
            source_link,
        });
    }

    tracing::debug!("Parsed {} records from results page", records.len());
    Ok(records)
}

fn cell_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The title cell may hold a series anchor before the book anchor, and the book
/// anchor nests ISBN/edition markup after a `<br>`. Prefer the anchor carrying an
/// `id` and keep only its direct text.
fn title_text(cell: ElementRef, anchor_sel: &Selector) -> String {
    let anchors: Vec<ElementRef> = cell.select(anchor_sel).collect();
    let anchor = anchors
        .iter()
        .find(|a| a.value().attr("id").is_some())
        .or_else(|| anchors.first());

    let Some(anchor) = anchor else {
        return cell_text(cell);
    };

    let own: Vec<&str> = anchor
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();

    if own.is_empty() {
        cell_text(*anchor)
    } else {
        own.join(" ")
    }
}
