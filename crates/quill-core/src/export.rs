//! Markdown export for notes.
//!
//! Renders a note's structured content to Markdown, with an optional
//! frontmatter block (tags and timestamps) and asset references rewritten
//! to embeds pointing at their storage paths.

use serde_json::Value as JsonValue;

use crate::defaults::EXPORT_FILE_NAME_MAX_CHARS;
use crate::error::Result;
use crate::models::{Asset, Note, Tag};
use crate::tags::strip_hashtags;

/// A rendered export: generated file name plus Markdown body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedNote {
    pub file_name: String,
    pub markdown: String,
}

/// Renders notes to Markdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownExporter;

impl MarkdownExporter {
    pub fn new() -> Self {
        Self
    }

    /// Render one note to Markdown.
    ///
    /// When the note carries tags, a frontmatter block listing tags and
    /// timestamps is prepended. Every image reference to one of `assets`
    /// (by file name) is rewritten to point at the asset's storage path.
    pub fn export(&self, note: &Note, tags: &[Tag], assets: &[Asset]) -> Result<String> {
        let mut out = String::new();

        if !tags.is_empty() {
            let mut names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
            names.sort_unstable();
            out.push_str("---\n");
            out.push_str(&format!("tags: [{}]\n", names.join(", ")));
            out.push_str(&format!("created: {}\n", note.created_at.to_rfc3339()));
            out.push_str(&format!("updated: {}\n", note.updated_at.to_rfc3339()));
            out.push_str("---\n\n");
        }

        let mut body = String::new();
        render_node(note.content.as_json(), assets, &mut body);

        // Rewrite markdown-style references typed directly into text runs.
        for asset in assets {
            body = body.replace(
                &format!("]({})", asset.file_name),
                &format!("]({})", asset.file_path),
            );
        }

        out.push_str(body.trim_end());
        out.push('\n');
        Ok(out)
    }

    /// Per-note export applied independently, in input order.
    ///
    /// All-or-nothing: if any single note's export fails the whole batch
    /// fails. Multi-note export is sequential single-file export; there is
    /// no archive/ZIP contract.
    pub fn export_multiple(
        &self,
        items: &[(Note, Vec<Tag>, Vec<Asset>)],
    ) -> Result<Vec<ExportedNote>> {
        let mut exports = Vec::with_capacity(items.len());
        for (note, tags, assets) in items {
            exports.push(ExportedNote {
                file_name: self.export_file_name(note),
                markdown: self.export(note, tags, assets)?,
            });
        }
        Ok(exports)
    }

    /// Derive a file name for a single-note export.
    ///
    /// Preference order: first heading line; else the first non-empty,
    /// tag-stripped content line truncated to 50 characters; else the
    /// formatted creation timestamp. A derived stem that sanitizes to
    /// nothing (reserved characters only) also falls back to the
    /// timestamp, so the name is never a bare `.md`.
    pub fn export_file_name(&self, note: &Note) -> String {
        let derived = first_heading_text(note.content.as_json()).or_else(|| {
            note.content
                .to_plain_text()
                .lines()
                .map(strip_hashtags)
                .find(|line| !line.is_empty())
                .map(|line| line.chars().take(EXPORT_FILE_NAME_MAX_CHARS).collect())
        });

        let stem = derived
            .map(|raw: String| sanitize_file_name(&raw))
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| note.created_at.format("%Y-%m-%d_%H-%M-%S").to_string());

        format!("{stem}.md")
    }
}

/// Replace filesystem-reserved characters with `_` and collapse internal
/// whitespace to underscores.
pub fn sanitize_file_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();
    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join("_");
    collapsed.trim_matches(['_', '.']).to_string()
}

fn render_node(node: &JsonValue, assets: &[Asset], out: &mut String) {
    let node_type = node.get("type").and_then(|t| t.as_str()).unwrap_or("");

    match node_type {
        "text" => {
            if let Some(text) = node.get("text").and_then(|t| t.as_str()) {
                out.push_str(text);
            }
        }
        "heading" => {
            let level = node
                .get("attrs")
                .and_then(|a| a.get("level"))
                .and_then(|l| l.as_u64())
                .unwrap_or(1)
                .clamp(1, 6) as usize;
            out.push_str(&"#".repeat(level));
            out.push(' ');
            out.push_str(&inline_text(node));
            out.push_str("\n\n");
        }
        "paragraph" => {
            render_children(node, assets, out);
            out.push_str("\n\n");
        }
        "image" => {
            let src = node
                .get("attrs")
                .and_then(|a| a.get("src"))
                .and_then(|s| s.as_str())
                .unwrap_or("");
            let alt = node
                .get("attrs")
                .and_then(|a| a.get("alt"))
                .and_then(|s| s.as_str())
                .unwrap_or(src);
            let path = assets
                .iter()
                .find(|asset| asset.file_name == src)
                .map(|asset| asset.file_path.as_str())
                .unwrap_or(src);
            out.push_str(&format!("![{alt}]({path})"));
        }
        _ => {
            render_children(node, assets, out);
        }
    }
}

fn render_children(node: &JsonValue, assets: &[Asset], out: &mut String) {
    if let Some(children) = node.get("content").and_then(|c| c.as_array()) {
        for child in children {
            render_node(child, assets, out);
        }
    }
}

fn inline_text(node: &JsonValue) -> String {
    let mut text = String::new();
    collect_inline(node, &mut text);
    text
}

fn collect_inline(node: &JsonValue, out: &mut String) {
    if let Some(text) = node.get("text").and_then(|t| t.as_str()) {
        out.push_str(text);
    }
    if let Some(children) = node.get("content").and_then(|c| c.as_array()) {
        for child in children {
            collect_inline(child, out);
        }
    }
}

fn first_heading_text(node: &JsonValue) -> Option<String> {
    if node.get("type").and_then(|t| t.as_str()) == Some("heading") {
        let text = inline_text(node);
        if !text.trim().is_empty() {
            return Some(text.trim().to_string());
        }
    }
    node.get("content")
        .and_then(|c| c.as_array())?
        .iter()
        .find_map(first_heading_text)
}
