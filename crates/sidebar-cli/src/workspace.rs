//! Loaded documents plus the sidebar and tree state built over them

use crate::output;
use anyhow::{bail, Context, Result};
use sidebar_doc::{ContentHash, Depth, Document, DocumentView, HeadingPath, SourceFormat};
use sidebar_group::GroupBy;
use sidebar_query::parse_sort_keys;
use sidebar_tree::TreeManager;
use sidebar_view::{QuerySidebarArgs, Sidebar, SidebarConfig, Surface, SurfaceId};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Options of the `query` subcommand
#[derive(Debug, Clone, Default)]
pub(crate) struct QueryRequest {
    pub(crate) query: String,
    pub(crate) narrow: Option<HeadingPath>,
    pub(crate) group_by: Option<GroupBy>,
    pub(crate) sort: Vec<String>,
    pub(crate) title: Option<String>,
}

#[derive(Debug)]
struct Loaded {
    path: PathBuf,
    document: Document,
}

/// Files on disk and the views composed over them
#[derive(Debug)]
pub(crate) struct Workspace {
    sidebar: Sidebar,
    tree: TreeManager,
    loaded: Vec<Loaded>,
}

fn read_document(path: &Path) -> Result<Document> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    Document::parse(name, SourceFormat::detect(path), text)
        .with_context(|| format!("failed to parse {}", path.display()))
}

impl Workspace {
    /// Load every file in `paths`
    pub(crate) fn open(config: SidebarConfig, paths: &[PathBuf]) -> Result<Self> {
        let tree = TreeManager::new(config.tree.clone());
        let mut loaded = Vec::with_capacity(paths.len());
        for path in paths {
            loaded.push(Loaded {
                path: path.clone(),
                document: read_document(path)?,
            });
        }
        info!(files = loaded.len(), "loaded outline files");
        Ok(Self {
            sidebar: Sidebar::new(config),
            tree,
            loaded,
        })
    }

    /// Replace the sidebar, e.g. to pin its date
    #[cfg(test)]
    #[must_use]
    pub(crate) fn with_sidebar(mut self, sidebar: Sidebar) -> Self {
        self.sidebar = sidebar;
        self
    }

    fn views(&self) -> Vec<DocumentView> {
        self.loaded
            .iter()
            .map(|l| DocumentView::new(l.document.clone()))
            .collect()
    }

    fn first(&self) -> Result<&Document> {
        self.loaded
            .first()
            .map(|l| &l.document)
            .context("no file given")
    }

    fn surfaces(&self, ids: &[SurfaceId]) -> Vec<Surface> {
        ids.iter().filter_map(|&id| self.sidebar.surface(id)).collect()
    }

    /// Print `ids` as text or JSON
    pub(crate) fn render(&self, ids: &[SurfaceId], json: bool) -> Result<String> {
        let surfaces = self.surfaces(ids);
        if json {
            output::surfaces_json(&surfaces)
        } else {
            Ok(output::surfaces_text(&surfaces))
        }
    }

    /// Compose the default sidebar
    pub(crate) fn show_default(&self) -> Result<Vec<SurfaceId>> {
        Ok(self.sidebar.show_default(self.views())?)
    }

    /// Compose a query sidebar
    pub(crate) fn show_query(&self, request: QueryRequest) -> Result<Vec<SurfaceId>> {
        let sort = parse_sort_keys(request.sort.as_slice())?;
        let mut args = QuerySidebarArgs::new(request.query).with_sort(sort);
        if let Some(group_by) = request.group_by {
            args = args.with_group_by(group_by);
        }
        if let Some(title) = request.title {
            args = args.with_title(title);
        }

        let views = match &request.narrow {
            Some(path) => {
                args = args.with_narrow(true);
                self.narrowed_views(path)?
            }
            None => self.views(),
        };
        Ok(self.sidebar.show_query(views, args)?)
    }

    /// Views of the documents containing `path`, narrowed below that heading
    fn narrowed_views(&self, path: &HeadingPath) -> Result<Vec<DocumentView>> {
        let mut views = Vec::new();
        for loaded in &self.loaded {
            let outline = loaded.document.outline();
            let Some(heading) = outline.find_path(path) else {
                continue;
            };
            let mut view = DocumentView::new(loaded.document.clone());
            view.narrow(heading.contents_begin..heading.subtree_end)?;
            views.push(view);
        }
        if views.is_empty() {
            bail!("no heading at path '{path}'");
        }
        Ok(views)
    }

    fn offset_of_line(view: &DocumentView, line: usize) -> Result<usize> {
        view.line_offset(line)
            .with_context(|| format!("line {line} is outside {}", view.name()))
    }

    /// Open the tree mirror of the first file, expanded at `line`
    pub(crate) fn tree(&self, line: Option<usize>) -> Result<String> {
        let mut source = DocumentView::new(self.first()?.clone());
        if let Some(line) = line {
            let offset = Self::offset_of_line(&source, line)?;
            source.set_point(offset);
        }
        let mirror = self.tree.open(&source)?;
        let view = self
            .tree
            .view(mirror.name())
            .context("mirror disappeared after opening")?;
        Ok(output::view_text(&view))
    }

    /// Open the subtree view of the heading on `line` of the first file
    pub(crate) fn jump(&self, line: usize, depth: Option<Depth>) -> Result<String> {
        let source = DocumentView::new(self.first()?.clone());
        let offset = Self::offset_of_line(&source, line)?;
        let mirror = self.tree.open(&source)?;
        let subtree = self.tree.jump(mirror.name(), offset, depth)?;
        debug!(view = subtree.name(), depth = %subtree.depth(), "jumped");
        Ok(output::view_text(subtree.view()))
    }

    /// Re-read changed files into their documents
    ///
    /// Returns whether anything changed.
    pub(crate) fn reload(&mut self) -> Result<bool> {
        let mut changed = false;
        for loaded in &mut self.loaded {
            let text = fs::read_to_string(&loaded.path)
                .with_context(|| format!("failed to read {}", loaded.path.display()))?;
            let revision = ContentHash::of_text(&text);
            if revision != loaded.document.revision() {
                loaded.document.replace_text(text)?;
                info!(
                    file = %loaded.path.display(),
                    revision = %revision.short(),
                    "reloaded changed file"
                );
                changed = true;
            }
        }
        Ok(changed)
    }

    /// Rebuild the session shown in `ids`, composing afresh if nothing was shown
    pub(crate) fn refresh(&self, ids: &[SurfaceId]) -> Result<Vec<SurfaceId>> {
        match ids.first() {
            Some(&first) => Ok(self.sidebar.refresh(first)?),
            None => self.show_default(),
        }
    }
}
