//! Fragment assembly: one `<article>` per error entry.
//!
//! Output depends only on the entry's content, so identical entries always
//! produce byte-identical fragments and can be cached by fingerprint.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{
    entries::{ErrorEntry, format_long_date, parse_entry_date},
    error::DomainError,
    markup::render_entry_fields,
};

/// HTML markup rendered from exactly one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderedFragment(String);

impl RenderedFragment {
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RenderedFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn render_fragment(entry: &ErrorEntry) -> Result<RenderedFragment, DomainError> {
    let entry = render_entry_fields(entry);
    let tags = entry.joined_tags();
    let date_line = render_date_line(&entry.date, entry.revision_date())?;

    let html = format!(
        r#"
    <article class="error-entry">
        <h2>{title}</h2>
        <p>{context}</p>
        <div class="solution">
            <h3>Explanation:</h3>
            <p>{explanation}</p>
            <h3>Solution:</h3>
            <p>{solution}</p>
        </div>
        <p>{tags}</p>
        {date_line}
    </article>
    "#,
        title = entry.title,
        context = entry.context,
        explanation = entry.explanation,
        solution = entry.solution,
    );

    Ok(RenderedFragment(html))
}

/// `Created: …` with an optional `; Updated: …` clause, both in long form.
fn render_date_line(date: &str, updated: Option<&str>) -> Result<String, DomainError> {
    let mut line = String::from("<p class='error-date'>");
    line.push_str("Created: ");
    line.push_str(&render_time_element("date", date)?);

    if let Some(updated) = updated {
        line.push_str("; Updated: ");
        line.push_str(&render_time_element("updated", updated)?);
    }

    line.push_str("</p>");
    Ok(line)
}

fn render_time_element(field: &'static str, raw: &str) -> Result<String, DomainError> {
    let long = format_long_date(parse_entry_date(field, raw)?)?;
    Ok(format!("<time datetime='{raw}'>{long}</time>"))
}
