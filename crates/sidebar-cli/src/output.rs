//! Text and JSON rendering of surfaces and views

use anyhow::Result;
use serde::Serialize;
use sidebar_doc::DocumentView;
use sidebar_view::{LineKind, Surface};
use std::fmt::Write as _;

#[derive(Debug, Serialize)]
pub(crate) struct SurfaceReport {
    id: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    lines: Vec<LineReport>,
}

#[derive(Debug, Serialize)]
struct LineReport {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    entry: Option<EntryReport>,
}

#[derive(Debug, Serialize)]
struct EntryReport {
    kind: LineKind,
    document: String,
    heading: String,
}

impl From<&Surface> for SurfaceReport {
    fn from(surface: &Surface) -> Self {
        let lines = surface
            .content()
            .lines()
            .map(|(text, tag)| LineReport {
                text: text.to_string(),
                entry: tag.map(|t| {
                    let s = t.entry.snapshot();
                    EntryReport {
                        kind: t.kind,
                        document: s.document.clone(),
                        heading: s.path.to_string(),
                    }
                }),
            })
            .collect();
        Self {
            id: surface.id().to_string(),
            name: surface.name().to_string(),
            description: surface.description().map(String::from),
            lines,
        }
    }
}

/// Surfaces as plain text, one titled block each
pub(crate) fn surfaces_text(surfaces: &[Surface]) -> String {
    let mut out = String::new();
    for (i, surface) in surfaces.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "== {} ==", surface.name());
        for (line, _) in surface.content().lines() {
            let _ = writeln!(out, "{line}");
        }
    }
    out
}

/// Surfaces as a pretty JSON array
pub(crate) fn surfaces_json(surfaces: &[Surface]) -> Result<String> {
    let reports: Vec<SurfaceReport> = surfaces.iter().map(SurfaceReport::from).collect();
    Ok(serde_json::to_string_pretty(&reports)?)
}

/// Folded view with its name as a title
pub(crate) fn view_text(view: &DocumentView) -> String {
    format!("== {} ==\n{}", view.name(), view.render())
}
