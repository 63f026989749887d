//! Descriptor rendering
//!
//! The renderer is a pure assembler: it asks the descriptor's grouping for
//! groups, emits a header per group and one formatter line per entry.

use crate::descriptor::ViewDescriptor;
use crate::format::{AgendaFormatter, EntryFormatter};
use crate::surface::DisplayText;
use sidebar_group::GroupContext;
use std::sync::Arc;

/// Assembles descriptors into tagged text
#[derive(Debug, Clone)]
pub struct Renderer {
    formatter: Arc<dyn EntryFormatter>,
    context: GroupContext,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Arc::new(AgendaFormatter::default()))
    }
}

impl Renderer {
    /// Create renderer around a formatter
    #[must_use]
    pub fn new(formatter: Arc<dyn EntryFormatter>) -> Self {
        Self {
            formatter,
            context: GroupContext::default(),
        }
    }

    /// Builder: set the grouping context
    #[must_use]
    pub fn with_context(mut self, context: GroupContext) -> Self {
        self.context = context;
        self
    }

    /// Entry formatter
    #[inline]
    #[must_use]
    pub fn formatter(&self) -> &Arc<dyn EntryFormatter> {
        &self.formatter
    }

    /// Render `descriptor`
    ///
    /// Grouped: a header line per group followed by its entries, with a
    /// blank line between groups. Ungrouped: one line per entry.
    #[must_use]
    pub fn render(&self, descriptor: &ViewDescriptor) -> DisplayText {
        let mut out = DisplayText::new();
        match descriptor.grouping().apply(descriptor.entries(), &self.context) {
            Some(groups) => {
                for (i, group) in groups.iter().enumerate() {
                    if i > 0 {
                        out.push_plain("");
                    }
                    out.push_plain(format!(" {}", group.display_name()));
                    for entry in &group.entries {
                        out.push(self.formatter.format(entry));
                    }
                }
            }
            None => {
                for entry in descriptor.entries() {
                    out.push(self.formatter.format(entry));
                }
            }
        }
        tracing::debug!(
            view = descriptor.name(),
            entries = descriptor.entries().len(),
            lines = out.line_count(),
            "rendered view"
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sidebar_doc::{Document, EntryRef};
    use sidebar_group::{GroupBy, SuperGroupRule, Selector};

    fn entries(text: &str) -> Vec<EntryRef> {
        let doc = Document::org("r.org", text).unwrap();
        let outline = doc.outline();
        outline
            .headings
            .iter()
            .map(|h| EntryRef::new(&doc, &outline, h).unwrap())
            .collect()
    }

    fn lines(text: &DisplayText) -> Vec<String> {
        text.as_str().lines().map(|l| l.trim().to_string()).collect()
    }

    #[test]
    fn ungrouped_one_line_per_entry() {
        let d = ViewDescriptor::new("All", entries("* TODO A\n* TODO B\n"));
        let text = Renderer::default().render(&d);
        assert_eq!(lines(&text), vec!["r:           TODO A", "r:           TODO B"]);
        assert!(text.entry_at_line(0).is_some());
    }

    #[test]
    fn grouped_headers_and_separators() {
        let d = ViewDescriptor::builder("By todo")
            .entries(entries("* TODO A\n* NEXT B\n* TODO C\n"))
            .group_by(Arc::new(GroupBy::Todo))
            .build()
            .unwrap();
        let text = Renderer::default().render(&d);
        assert_eq!(
            lines(&text),
            vec![
                "TODO",
                "r:           TODO A",
                "r:           TODO C",
                "",
                "NEXT",
                "r:           NEXT B",
            ]
        );
        assert!(text.entry_at_line(0).is_none());
        assert!(text.entry_at_line(3).is_none());
        assert_eq!(text.entry_at_line(5).unwrap().entry.snapshot().title, "B");
    }

    #[test]
    fn rules_emit_catch_all_last() {
        let d = ViewDescriptor::builder("Rules")
            .entries(entries("* TODO [#A] A\n* TODO B\n"))
            .super_groups(vec![SuperGroupRule::new("Important", Selector::Priority(vec!['A']))])
            .build()
            .unwrap();
        let text = Renderer::default().render(&d);
        let headers: Vec<String> = text
            .lines()
            .filter(|(l, tag)| tag.is_none() && !l.is_empty())
            .map(|(l, _)| l.trim().to_string())
            .collect();
        assert_eq!(headers, vec!["Important", "Other items"]);
    }
}
