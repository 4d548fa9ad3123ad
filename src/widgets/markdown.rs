//! Markdown and source code rendering for detail pages.

use markdown::{mdast, to_mdast, ParseOptions};
use once_cell::sync::Lazy;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

use crate::core::component::Component;
use crate::core::style;
use crate::core::text::wrap_text;

const CODE_THEME: &str = "base16-ocean.dark";
const CODE_INDENT: &str = "  ";

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

/// Highlights `code` as `language` (a name or file extension).
///
/// Falls back to the plain lines when colors are disabled, the language is
/// unknown, or highlighting fails.
pub fn highlight_code(code: &str, language: Option<&str>) -> Vec<String> {
    let plain = || code.lines().map(str::to_string).collect::<Vec<_>>();
    if !style::color_enabled() {
        return plain();
    }
    let Some(language) = language.filter(|language| !language.is_empty()) else {
        return plain();
    };
    let Some(syntax) = SYNTAX_SET
        .find_syntax_by_token(language)
        .or_else(|| SYNTAX_SET.find_syntax_by_extension(language))
    else {
        return plain();
    };
    let Some(theme) = THEME_SET.themes.get(CODE_THEME) else {
        return plain();
    };

    let mut highlighter = HighlightLines::new(syntax, theme);
    let mut lines = Vec::new();
    for line in LinesWithEndings::from(code) {
        let Ok(ranges) = highlighter.highlight_line(line, &SYNTAX_SET) else {
            return plain();
        };
        let escaped = as_24_bit_terminal_escaped(&ranges, false);
        lines.push(format!(
            "{}\x1b[0m",
            escaped.trim_end_matches(['\n', '\r'])
        ));
    }
    lines
}

/// Markdown document rendered to styled, wrapped lines.
pub struct Markdown {
    text: String,
    cached: Option<(usize, Vec<String>)>,
}

impl Markdown {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cached: None,
        }
    }

    fn render_document(&self, width: usize) -> Vec<String> {
        let Ok(root) = to_mdast(&self.text, &ParseOptions::gfm()) else {
            return wrap_text(&self.text, width);
        };
        let children = match &root {
            mdast::Node::Root(root) => root.children.as_slice(),
            _ => return wrap_text(&self.text, width),
        };

        let mut lines = Vec::new();
        for (index, node) in children.iter().enumerate() {
            if index > 0 {
                lines.push(String::new());
            }
            lines.extend(render_block(node, width));
        }
        lines
    }
}

impl Component for Markdown {
    fn render(&mut self, width: usize) -> Vec<String> {
        if let Some((cached_width, lines)) = self.cached.as_ref() {
            if *cached_width == width {
                return lines.clone();
            }
        }
        let lines = self.render_document(width.max(1));
        self.cached = Some((width, lines.clone()));
        lines
    }
}

fn render_block(node: &mdast::Node, width: usize) -> Vec<String> {
    match node {
        mdast::Node::Heading(heading) => {
            let text = render_inline(&heading.children);
            let text = match heading.depth {
                1 => style::bold(&style::underline(&text)),
                2 => style::bold(&text),
                depth => style::bold(&format!("{} {text}", "#".repeat(depth as usize))),
            };
            wrap_text(&style::cyan(&text), width)
        }
        mdast::Node::Paragraph(paragraph) => wrap_text(&render_inline(&paragraph.children), width),
        mdast::Node::Code(code) => {
            let mut lines = vec![style::dim(&format!(
                "```{}",
                code.lang.clone().unwrap_or_default()
            ))];
            lines.extend(
                highlight_code(&code.value, code.lang.as_deref())
                    .into_iter()
                    .map(|line| format!("{CODE_INDENT}{line}")),
            );
            lines.push(style::dim("```"));
            lines
        }
        mdast::Node::List(list) => render_list(list, width, 0),
        mdast::Node::Blockquote(quote) => {
            let inner_width = width.saturating_sub(2).max(1);
            let mut lines = Vec::new();
            for child in &quote.children {
                lines.extend(render_block(child, inner_width));
            }
            lines
                .into_iter()
                .map(|line| format!("{} {}", style::dim("│"), style::italic(&line)))
                .collect()
        }
        mdast::Node::ThematicBreak(_) => vec![style::dim(&"─".repeat(width.min(80)))],
        mdast::Node::Table(table) => render_table(table, width),
        mdast::Node::Html(html) => wrap_text(html.value.trim(), width),
        other => {
            let text = render_inline(std::slice::from_ref(other));
            if text.is_empty() {
                Vec::new()
            } else {
                wrap_text(&text, width)
            }
        }
    }
}

fn render_list(list: &mdast::List, width: usize, depth: usize) -> Vec<String> {
    let indent = "  ".repeat(depth);
    let mut lines = Vec::new();
    for (index, child) in list.children.iter().enumerate() {
        let mdast::Node::ListItem(item) = child else {
            continue;
        };
        let bullet = if list.ordered {
            format!("{}.", list.start.unwrap_or(1) as usize + index)
        } else {
            "-".to_string()
        };
        let bullet = match item.checked {
            Some(true) => format!("{bullet} [x]"),
            Some(false) => format!("{bullet} [ ]"),
            None => bullet,
        };
        let prefix_width = indent.len() + bullet.chars().count() + 1;
        let text_width = width.saturating_sub(prefix_width).max(1);

        let mut first = true;
        for block in &item.children {
            if let mdast::Node::List(nested) = block {
                lines.extend(render_list(nested, width, depth + 1));
                continue;
            }
            for line in render_block(block, text_width) {
                if first {
                    lines.push(format!("{indent}{} {line}", style::cyan(&bullet)));
                    first = false;
                } else {
                    lines.push(format!("{}{line}", " ".repeat(prefix_width)));
                }
            }
        }
    }
    lines
}

fn render_table(table: &mdast::Table, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for (index, row) in table.children.iter().enumerate() {
        let mdast::Node::TableRow(row) = row else {
            continue;
        };
        let cells: Vec<String> = row
            .children
            .iter()
            .map(|cell| match cell {
                mdast::Node::TableCell(cell) => render_inline(&cell.children),
                _ => String::new(),
            })
            .collect();
        let line = cells.join(&style::dim(" │ "));
        let line = if index == 0 { style::bold(&line) } else { line };
        lines.extend(wrap_text(&line, width));
    }
    lines
}

fn render_inline(nodes: &[mdast::Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            mdast::Node::Text(text) => out.push_str(&text.value),
            mdast::Node::Strong(strong) => out.push_str(&style::bold(&render_inline(&strong.children))),
            mdast::Node::Emphasis(emphasis) => {
                out.push_str(&style::italic(&render_inline(&emphasis.children)))
            }
            mdast::Node::Delete(delete) => out.push_str(&style::dim(&render_inline(&delete.children))),
            mdast::Node::InlineCode(code) => out.push_str(&style::yellow(&code.value)),
            mdast::Node::Link(link) => {
                let text = render_inline(&link.children);
                out.push_str(&style::blue(&style::underline(&text)));
                if text != link.url {
                    out.push_str(&style::dim(&format!(" ({})", link.url)));
                }
            }
            mdast::Node::Image(image) => {
                out.push_str(if image.alt.is_empty() { &image.url } else { &image.alt })
            }
            mdast::Node::Break(_) => out.push('\n'),
            mdast::Node::Html(html) => out.push_str(&html.value),
            mdast::Node::Paragraph(paragraph) => out.push_str(&render_inline(&paragraph.children)),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{highlight_code, Markdown};
    use crate::core::component::Component;
    use crate::core::text::strip_ansi;

    fn plain(markdown: &str, width: usize) -> Vec<String> {
        Markdown::new(markdown)
            .render(width)
            .iter()
            .map(|line| strip_ansi(line))
            .collect()
    }

    #[test]
    fn headings_and_paragraphs_are_separated() {
        assert_eq!(plain("# Title\n\nBody text", 40), vec!["Title", "", "Body text"]);
    }

    #[test]
    fn lists_get_bullets() {
        assert_eq!(plain("- one\n- two", 40), vec!["- one", "- two"]);
        assert_eq!(plain("1. one\n2. two", 40), vec!["1. one", "2. two"]);
    }

    #[test]
    fn code_blocks_are_fenced_and_indented() {
        let lines = plain("```\nlet x = 1;\n```", 40);
        assert_eq!(lines, vec!["```", "  let x = 1;", "```"]);
    }

    #[test]
    fn paragraphs_wrap_to_width() {
        assert_eq!(plain("aaa bbb ccc", 7), vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn unknown_language_is_left_plain() {
        assert_eq!(highlight_code("a\nb", Some("not-a-language")), vec!["a", "b"]);
    }

    #[test]
    fn known_language_keeps_text() {
        let lines = highlight_code("fn main() {}\n", Some("rust"));
        assert_eq!(lines.len(), 1);
        assert_eq!(strip_ansi(&lines[0]), "fn main() {}");
    }
}
