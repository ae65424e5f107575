//! Document block composition and extraction.
//!
//! A pushed document always has the same shape: a heading with a
//! per-language icon and the file name, a metadata paragraph, a divider,
//! then one code block per content chunk (with part headings once the
//! content is split). Pull reads only the code blocks back, so the
//! decorative blocks never affect round-tripping.

use crate::remote::ContentBlock;
use crate::sync::chunk;

/// Icon shown in a document heading, by syntax tag.
const LANGUAGE_ICONS: &[(&str, &str)] = &[
    ("c#", "🔷"),
    ("python", "🐍"),
    ("javascript", "📜"),
    ("typescript", "📘"),
    ("java", "☕"),
    ("c++", "⚡"),
    ("c", "🔧"),
    ("go", "🔷"),
    ("rust", "🦀"),
    ("php", "🐘"),
    ("ruby", "💎"),
    ("swift", "🕊️"),
    ("kotlin", "🎯"),
];

/// Heading icon for a language; a generic document icon when unknown.
#[must_use]
pub fn icon_for_language(language: &str) -> &'static str {
    LANGUAGE_ICONS
        .iter()
        .find(|(lang, _)| *lang == language)
        .map_or("📄", |(_, icon)| icon)
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compose the full block list for one file's document.
///
/// `rel_path` is the display path for the metadata paragraph, `file_name`
/// the bare name for the heading. Empty content produces the decorative
/// blocks and no code blocks.
#[must_use]
pub fn compose_blocks(
    rel_path: &str,
    file_name: &str,
    language: &str,
    content: &str,
    max_chunk_chars: usize,
) -> Vec<ContentBlock> {
    let pieces = chunk::chunk(content, max_chunk_chars);
    let split = pieces.len() > 1;

    let mut blocks = Vec::with_capacity(3 + pieces.len() * 2);
    blocks.push(ContentBlock::Heading(format!(
        "{} {file_name}",
        icon_for_language(language)
    )));
    blocks.push(ContentBlock::Paragraph(format!(
        "📁 Path: {rel_path}\n🔤 Language: {}\n📏 Size: {} characters",
        title_case(language),
        content.chars().count()
    )));
    blocks.push(ContentBlock::Divider);

    let last = pieces.len();
    for (i, piece) in pieces.into_iter().enumerate() {
        if split {
            let part = i + 1;
            let label = if part == last {
                format!("📋 Code (Part {part}, Complete)")
            } else {
                format!("📋 Code (Part {part})")
            };
            blocks.push(ContentBlock::Heading(label));
        }
        blocks.push(ContentBlock::Code { text: piece, language: language.to_string() });
    }

    blocks
}

const PATH_PREFIX: &str = "📁 Path: ";

/// Read the display path back out of a document's metadata paragraph.
///
/// Returns `None` for documents not produced by this tool (no metadata
/// paragraph, or one without the path line). The duplicate sweep uses this
/// to tell same-name files in different directories apart.
#[must_use]
pub fn metadata_path(blocks: &[ContentBlock]) -> Option<String> {
    blocks.iter().find_map(|b| match b {
        ContentBlock::Paragraph(text) => text.lines().find_map(|line| {
            line.strip_prefix(PATH_PREFIX)
                .map(|path| path.trim().to_string())
        }),
        _ => None,
    })
}

/// Reassemble file content from a document's blocks.
///
/// Only code blocks carry content; headings, paragraphs, and dividers are
/// presentation and are ignored.
#[must_use]
pub fn extract_content(blocks: &[ContentBlock]) -> String {
    let texts: Vec<String> = blocks
        .iter()
        .filter_map(|b| match b {
            ContentBlock::Code { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect();
    chunk::reassemble(&texts)
}
