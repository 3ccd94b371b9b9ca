//! Syntax highlighting for fenced code blocks.
//!
//! The assembler only sees [`SyntaxHighlighter`]; [`SyntectHighlighter`] is
//! the bundled implementation built on syntect with the extended two-face
//! syntax and theme sets.

use folio_core::{Palette, Rgba};
use std::sync::OnceLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Theme};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Global cached syntax set with extended syntaxes (including TypeScript/TSX).
static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();

static DARK_THEME: OnceLock<Theme> = OnceLock::new();
static LIGHT_THEME: OnceLock<Theme> = OnceLock::new();

/// A colored piece of highlighted code. Newlines are kept, so concatenating
/// every span's text reproduces the input.
#[derive(Clone, Debug, PartialEq)]
pub struct HighlightedSpan {
    pub text: String,
    pub color: Rgba,
    pub bold: bool,
    pub italic: bool,
}

pub trait SyntaxHighlighter {
    /// Tokenize `code` as `language`. `None` means the language is not
    /// recognized and the caller should render the code uncolored.
    fn highlight(&self, code: &str, language: &str) -> Option<Vec<HighlightedSpan>>;
}

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(two_face::syntax::extra_newlines)
}

fn theme(dark: bool) -> &'static Theme {
    if dark {
        DARK_THEME.get_or_init(|| {
            two_face::theme::extra()
                .get(two_face::theme::EmbeddedThemeName::Dracula)
                .clone()
        })
    } else {
        LIGHT_THEME.get_or_init(|| {
            two_face::theme::extra()
                .get(two_face::theme::EmbeddedThemeName::InspiredGithub)
                .clone()
        })
    }
}

/// Map a fence info string to a syntax extension for better coverage.
pub fn map_language_to_syntax(language: &str) -> Option<&'static str> {
    match language.trim().to_lowercase().as_str() {
        // TypeScript/JavaScript variants
        "ts" | "typescript" | "mts" | "cts" => Some("ts"),
        "tsx" => Some("tsx"),
        "jsx" => Some("tsx"),
        "js" | "javascript" | "mjs" | "cjs" | "node" => Some("js"),
        "vue" | "svelte" => Some("html"),
        // Config files
        "yml" | "yaml" => Some("yaml"),
        "json" | "jsonc" | "json5" => Some("json"),
        "toml" => Some("toml"),
        "ini" | "cfg" | "conf" => Some("ini"),
        // Shell scripts
        "sh" | "bash" | "zsh" | "fish" | "shell" | "console" => Some("sh"),
        "ps1" | "powershell" | "pwsh" => Some("ps1"),
        // Web
        "html" | "htm" | "xhtml" => Some("html"),
        "css" | "scss" | "sass" | "less" => Some("css"),
        "xml" | "svg" | "xsl" | "xslt" => Some("xml"),
        // Common languages
        "py" | "python" | "python3" => Some("py"),
        "rb" | "ruby" => Some("rb"),
        "rs" | "rust" => Some("rs"),
        "go" | "golang" => Some("go"),
        "c" | "h" => Some("c"),
        "cpp" | "c++" | "cc" | "cxx" | "hpp" => Some("cpp"),
        "java" => Some("java"),
        "kt" | "kotlin" => Some("kt"),
        "swift" => Some("swift"),
        "cs" | "csharp" | "c#" => Some("cs"),
        "php" => Some("php"),
        "pl" | "perl" => Some("pl"),
        "lua" => Some("lua"),
        "sql" => Some("sql"),
        "md" | "markdown" => Some("md"),
        "tex" | "latex" => Some("tex"),
        "diff" | "patch" => Some("diff"),
        "dockerfile" | "docker" => Some("dockerfile"),
        _ => None,
    }
}

/// Highlighter backed by syntect.
pub struct SyntectHighlighter {
    syntax_set: &'static SyntaxSet,
    theme: &'static Theme,
}

impl SyntectHighlighter {
    pub fn new(dark: bool) -> Self {
        Self {
            syntax_set: syntax_set(),
            theme: theme(dark),
        }
    }

    /// Pick the dark or light theme to match the document palette.
    pub fn for_palette(palette: &Palette) -> Self {
        Self::new(palette.is_dark())
    }

    fn find_syntax(&self, language: &str) -> Option<&'static SyntaxReference> {
        let language = language.trim();
        if language.is_empty() {
            return None;
        }
        map_language_to_syntax(language)
            .and_then(|ext| self.syntax_set.find_syntax_by_extension(ext))
            .or_else(|| self.syntax_set.find_syntax_by_token(language))
    }

    /// Whether `language` resolves to a known syntax.
    pub fn supports(&self, language: &str) -> bool {
        self.find_syntax(language).is_some()
    }
}

fn to_rgba(color: syntect::highlighting::Color) -> Rgba {
    Rgba(
        ((color.r as u32) << 24) | ((color.g as u32) << 16) | ((color.b as u32) << 8) | color.a as u32,
    )
}

impl SyntaxHighlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, language: &str) -> Option<Vec<HighlightedSpan>> {
        let Some(syntax) = self.find_syntax(language) else {
            log::debug!("No syntax for code block language {:?}", language);
            return None;
        };
        let mut highlighter = HighlightLines::new(syntax, self.theme);
        let mut spans = Vec::new();

        for line in LinesWithEndings::from(code) {
            match highlighter.highlight_line(line, self.syntax_set) {
                Ok(ranges) => {
                    for (style, text) in ranges {
                        if text.is_empty() {
                            continue;
                        }
                        spans.push(HighlightedSpan {
                            text: text.to_string(),
                            color: to_rgba(style.foreground),
                            bold: style.font_style.contains(FontStyle::BOLD),
                            italic: style.font_style.contains(FontStyle::ITALIC),
                        });
                    }
                }
                Err(e) => {
                    log::warn!("Highlighting {} code failed: {}", syntax.name, e);
                    return None;
                }
            }
        }

        Some(spans)
    }
}
