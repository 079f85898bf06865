//! HTML pages for the account book.
//!
//! Templates are built once at startup and only read afterwards, so a single
//! instance can be shared between requests without locking. Pages are
//! rendered into a `String` buffer; nothing reaches the client until the
//! whole document has been produced.

use std::fmt::Write;

use crate::db::{Entry, Summary};
use crate::error::RenderError;

const LAYOUT_SOURCE: &str = include_str!("../templates/layout.html");
const TITLE_PLACEHOLDER: &str = "{{title}}";
const CONTENT_PLACEHOLDER: &str = "{{content}}";

pub const PAGE_TITLE: &str = "Account Book";
pub const NO_DATA: &str = "There is no data.";

/// Document shell split around the `{{content}}` placeholder.
#[derive(Debug, Clone)]
pub struct Layout {
    head: String,
    tail: String,
}

impl Layout {
    pub fn parse(source: &str, title: &str) -> Result<Self, RenderError> {
        let (head, tail) = source
            .split_once(CONTENT_PLACEHOLDER)
            .ok_or(RenderError::MissingPlaceholder(CONTENT_PLACEHOLDER))?;

        let title = escape_html(title);
        Ok(Self {
            head: head.replace(TITLE_PLACEHOLDER, &title),
            tail: tail.replace(TITLE_PLACEHOLDER, &title),
        })
    }

    fn render<F>(&self, body: F) -> Result<String, RenderError>
    where
        F: FnOnce(&mut String) -> std::fmt::Result,
    {
        let mut out = String::with_capacity(self.head.len() + self.tail.len() + 512);
        out.push_str(&self.head);
        body(&mut out)?;
        out.push_str(&self.tail);
        Ok(out)
    }
}

/// Page listing the most recent entries plus the add-entry form.
#[derive(Debug, Clone)]
pub struct ListTemplate {
    layout: Layout,
}

impl ListTemplate {
    pub fn new() -> Result<Self, RenderError> {
        Ok(Self {
            layout: Layout::parse(LAYOUT_SOURCE, PAGE_TITLE)?,
        })
    }

    pub fn render(&self, entries: &[Entry]) -> Result<String, RenderError> {
        self.layout.render(|out| {
            writeln!(out, "\t\t<h2>Latest {} entries</h2>", entries.len())?;

            if entries.is_empty() {
                writeln!(out, "\t\t<p>{}</p>", NO_DATA)?;
            } else {
                writeln!(out, "\t\t<table border=\"1\">")?;
                writeln!(out, "\t\t\t<tr><th>Category</th><th>Price</th></tr>")?;
                for entry in entries {
                    writeln!(
                        out,
                        "\t\t\t<tr><td>{}</td><td>{} yen</td></tr>",
                        escape_html(&entry.category),
                        entry.price
                    )?;
                }
                writeln!(out, "\t\t</table>")?;
            }

            writeln!(out, "\t\t<form method=\"post\" action=\"/save\">")?;
            writeln!(out, "\t\t\t<label>Category <input name=\"category\" required></label>")?;
            writeln!(
                out,
                "\t\t\t<label>Price <input name=\"price\" type=\"number\" required></label>"
            )?;
            writeln!(out, "\t\t\t<input type=\"submit\" value=\"Save\">")?;
            writeln!(out, "\t\t</form>")
        })
    }
}

/// Page with per-category count, total and average.
#[derive(Debug, Clone)]
pub struct SummaryTemplate {
    layout: Layout,
}

impl SummaryTemplate {
    pub fn new() -> Result<Self, RenderError> {
        Ok(Self {
            layout: Layout::parse(LAYOUT_SOURCE, PAGE_TITLE)?,
        })
    }

    pub fn render(&self, summaries: &[Summary]) -> Result<String, RenderError> {
        self.layout.render(|out| {
            writeln!(out, "\t\t<h2>Summary by category</h2>")?;

            if summaries.is_empty() {
                return writeln!(out, "\t\t<p>{}</p>", NO_DATA);
            }

            writeln!(out, "\t\t<table border=\"1\">")?;
            writeln!(
                out,
                "\t\t\t<tr><th>Category</th><th>Count</th><th>Total</th><th>Average</th></tr>"
            )?;
            for summary in summaries {
                writeln!(
                    out,
                    "\t\t\t<tr><td>{}</td><td>{}</td><td>{} yen</td><td>{:.2} yen</td></tr>",
                    escape_html(&summary.category),
                    summary.count,
                    summary.sum,
                    summary.average()
                )?;
            }
            writeln!(out, "\t\t</table>")
        })
    }
}

/// Escape text for use inside element content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
