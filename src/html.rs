// 🔎 Structured Document Accessor
//
// Thin layer over `scraper`: lookup by selector, text, attributes.
// PARLINFO is an ASP.NET site, so every element we need has a stable id.

use scraper::{ElementRef, Html, Selector};

use crate::dates::tidy;
use crate::error::ScrapeError;

pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(text: &str) -> Self {
        Document {
            html: Html::parse_document(text),
        }
    }

    /// All elements matching a CSS selector, in document order
    pub fn select(&self, css: &str) -> Result<Vec<ElementRef<'_>>, ScrapeError> {
        let selector = selector(css)?;
        Ok(self.html.select(&selector).collect())
    }

    /// Tidied text of the first match, or "" when nothing matches
    pub fn text(&self, css: &str) -> Result<String, ScrapeError> {
        Ok(self
            .select(css)?
            .first()
            .map(|el| element_text(*el))
            .unwrap_or_default())
    }

    /// Attribute of the first match
    pub fn attr(&self, css: &str, name: &str) -> Result<Option<String>, ScrapeError> {
        Ok(self
            .select(css)?
            .first()
            .and_then(|el| el.value().attr(name))
            .map(|v| v.to_string()))
    }
}

pub fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Selector(format!("{}: {:?}", css, e)))
}

/// Tidied text content of an element
pub fn element_text(el: ElementRef<'_>) -> String {
    tidy(&el.text().collect::<String>())
}

/// Direct `td` children of a table row
pub fn cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "td")
        .collect()
}

/// Rows of the table with the given id that contain data cells (header rows skipped)
pub fn data_rows<'a>(root: ElementRef<'a>, table_id: &str) -> Result<Vec<ElementRef<'a>>, ScrapeError> {
    let sel = selector(&format!("table#{} tr", table_id))?;
    Ok(root.select(&sel).filter(|tr| !cells(*tr).is_empty()).collect())
}

/// Text of the first `span` in `cell` whose id contains "Label".
///
/// Grid cells carry both an edit control and a display label; only the label
/// holds the value.
pub fn labelled_text(cell: ElementRef<'_>) -> Option<String> {
    let spans = Selector::parse("span").ok()?;
    cell.select(&spans)
        .find(|s| s.value().attr("id").map_or(false, |id| id.contains("Label")))
        .map(element_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <span id="title"> Smith ,
             John </span>
          <img id="pic" src="/img/p.jpg">
          <table id="grid">
            <tr><th>Riding</th><th>Result</th></tr>
            <tr>
              <td><span id="x_HyperLink">ignored</span><span id="x_Label">Halifax</span></td>
              <td>Elected</td>
            </tr>
          </table>
        </body></html>
    "#;

    #[test]
    fn test_text_and_attr() {
        let doc = Document::parse(PAGE);
        assert_eq!(doc.text("#title").unwrap(), "Smith , John");
        assert_eq!(doc.attr("#pic", "src").unwrap().as_deref(), Some("/img/p.jpg"));
        assert_eq!(doc.text("#missing").unwrap(), "");
        assert_eq!(doc.attr("#missing", "src").unwrap(), None);
    }

    #[test]
    fn test_data_rows_skip_headers() {
        let doc = Document::parse(PAGE);
        let root = doc.select("body").unwrap()[0];
        let rows = data_rows(root, "grid").unwrap();
        assert_eq!(rows.len(), 1);

        let tds = cells(rows[0]);
        assert_eq!(tds.len(), 2);
        assert_eq!(labelled_text(tds[0]).as_deref(), Some("Halifax"));
        assert_eq!(labelled_text(tds[1]), None);
        assert_eq!(element_text(tds[1]), "Elected");
    }

    #[test]
    fn test_bad_selector() {
        let doc = Document::parse(PAGE);
        assert!(matches!(doc.select("td[["), Err(ScrapeError::Selector(_))));
    }
}
