use thiserror::Error;

pub const ENTRIES_START_MARKER: &str = "<!-- ERROR_ENTRIES_START -->";
pub const ENTRIES_END_MARKER: &str = "<!-- ERROR_ENTRIES_END -->";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template is missing marker `{marker}`")]
    MissingMarker { marker: &'static str },
    #[error("template contains marker `{marker}` more than once")]
    DuplicateMarker { marker: &'static str },
    #[error("start marker must appear before end marker")]
    MarkersOutOfOrder,
}

/// HTML document with a marked region that receives the rendered entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDocument {
    source: String,
    /// Byte offset just past the start marker.
    region_start: usize,
    /// Byte offset of the end marker.
    region_end: usize,
}

impl TemplateDocument {
    pub fn parse(source: impl Into<String>) -> Result<Self, TemplateError> {
        let source = source.into();
        let start = locate_once(&source, ENTRIES_START_MARKER)?;
        let end = locate_once(&source, ENTRIES_END_MARKER)?;

        let region_start = start + ENTRIES_START_MARKER.len();
        if region_start > end {
            return Err(TemplateError::MarkersOutOfOrder);
        }

        Ok(Self {
            source,
            region_start,
            region_end: end,
        })
    }

    /// Text currently between the markers.
    pub fn region(&self) -> &str {
        &self.source[self.region_start..self.region_end]
    }

    /// New document with the marked region replaced by `body`, framed by newlines.
    pub fn splice(&self, body: &str) -> String {
        let head = &self.source[..self.region_start];
        let tail = &self.source[self.region_end..];

        let mut document = String::with_capacity(head.len() + body.len() + tail.len() + 2);
        document.push_str(head);
        document.push('\n');
        document.push_str(body);
        document.push('\n');
        document.push_str(tail);
        document
    }
}

fn locate_once(source: &str, marker: &'static str) -> Result<usize, TemplateError> {
    let index = source
        .find(marker)
        .ok_or(TemplateError::MissingMarker { marker })?;
    if source[index + marker.len()..].contains(marker) {
        return Err(TemplateError::DuplicateMarker { marker });
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str =
        "<html><!-- ERROR_ENTRIES_START -->stale<!-- ERROR_ENTRIES_END --></html>";

    #[test]
    fn splice_replaces_region_between_markers() {
        let template = TemplateDocument::parse(TEMPLATE).expect("valid template");
        assert_eq!(template.region(), "stale");

        let spliced = template.splice("<p>fresh</p>");
        assert_eq!(
            spliced,
            "<html><!-- ERROR_ENTRIES_START -->\n<p>fresh</p>\n<!-- ERROR_ENTRIES_END --></html>"
        );
    }

    #[test]
    fn splice_with_empty_body_keeps_markers() {
        let template = TemplateDocument::parse(
            "<!-- ERROR_ENTRIES_START --><!-- ERROR_ENTRIES_END -->",
        )
        .expect("valid template");
        assert_eq!(
            template.splice(""),
            "<!-- ERROR_ENTRIES_START -->\n\n<!-- ERROR_ENTRIES_END -->"
        );
    }

    #[test]
    fn missing_end_marker_is_rejected() {
        let err = TemplateDocument::parse("<html><!-- ERROR_ENTRIES_START --></html>")
            .expect_err("end marker missing");
        assert_eq!(
            err,
            TemplateError::MissingMarker {
                marker: ENTRIES_END_MARKER
            }
        );
    }

    #[test]
    fn missing_start_marker_is_rejected() {
        let err = TemplateDocument::parse("<!-- ERROR_ENTRIES_END -->").expect_err("no start");
        assert_eq!(
            err,
            TemplateError::MissingMarker {
                marker: ENTRIES_START_MARKER
            }
        );
    }

    #[test]
    fn end_before_start_is_rejected() {
        let err =
            TemplateDocument::parse("<!-- ERROR_ENTRIES_END --><!-- ERROR_ENTRIES_START -->")
                .expect_err("out of order");
        assert_eq!(err, TemplateError::MarkersOutOfOrder);
    }

    #[test]
    fn repeated_marker_is_rejected() {
        let err = TemplateDocument::parse(
            "<!-- ERROR_ENTRIES_START --><!-- ERROR_ENTRIES_START --><!-- ERROR_ENTRIES_END -->",
        )
        .expect_err("duplicate start");
        assert_eq!(
            err,
            TemplateError::DuplicateMarker {
                marker: ENTRIES_START_MARKER
            }
        );
    }
}
