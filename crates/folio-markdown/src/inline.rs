//! Inline content -> styled runs.
//!
//! Precedence, strongest first:
//! - code spans always use the monospace face, dropping bold/italic;
//! - links override the foreground with the link color and add an underline;
//! - bold and italic are independent traits unioned onto the base font;
//! - strikethrough layers on top of any of the above.

use folio_core::{Inline, Rgba};

use crate::buffer::{StyledBuffer, TextStyle, LINE_SEPARATOR};
use crate::fonts::FontSpec;
use crate::math::{MathImage, MathStyle, MathTypesetter};

/// Code spans are set slightly smaller than the surrounding text.
pub const CODE_SIZE_RATIO: f32 = 0.9;
/// Opacity of literal math source shown when typesetting fails.
pub const MATH_FALLBACK_ALPHA: f32 = 0.5;

/// Base attributes a conversion starts from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InlineStyle {
    pub base_font: FontSpec,
    pub base_color: Rgba,
    pub link_color: Rgba,
    /// Background behind inline code spans.
    pub code_background: Option<Rgba>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RunContent {
    Text(String),
    Image(MathImage),
}

/// One uniformly styled piece of converted inline content.
#[derive(Clone, Debug, PartialEq)]
pub struct StyledRun {
    pub content: RunContent,
    pub font: FontSpec,
    pub foreground: Rgba,
    pub background: Option<Rgba>,
    pub underline: bool,
    pub strikethrough: bool,
    pub link: Option<String>,
}

impl StyledRun {
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            RunContent::Text(t) => Some(t),
            RunContent::Image(_) => None,
        }
    }

    /// Append this run to `buffer`.
    pub fn append_to(&self, buffer: &mut StyledBuffer) {
        let link = self.link.as_deref().map(|url| buffer.add_link(url));
        let style = TextStyle {
            font: self.font,
            foreground: self.foreground,
            background: self.background,
            underline: self.underline,
            strikethrough: self.strikethrough,
            link,
        };
        match &self.content {
            RunContent::Text(text) => {
                buffer.push_str(text, &style);
            }
            RunContent::Image(image) => {
                buffer.push_inline_image(image.clone(), &style);
            }
        }
    }
}

/// Formatting traits accumulated while descending the inline tree.
#[derive(Clone, Copy, Default)]
struct Traits<'t> {
    bold: bool,
    italic: bool,
    strikethrough: bool,
    link: Option<&'t str>,
}

/// Converts inline trees into styled runs.
#[derive(Clone, Copy, Default)]
pub struct InlineConverter<'a> {
    math: Option<&'a dyn MathTypesetter>,
}

impl<'a> InlineConverter<'a> {
    pub fn new(math: Option<&'a dyn MathTypesetter>) -> Self {
        Self { math }
    }

    pub fn convert(&self, inlines: &[Inline], style: &InlineStyle) -> Vec<StyledRun> {
        let mut runs = Vec::new();
        self.walk(inlines, style, Traits::default(), &mut runs);
        runs
    }

    fn walk<'t>(
        &self,
        inlines: &'t [Inline],
        style: &InlineStyle,
        traits: Traits<'t>,
        runs: &mut Vec<StyledRun>,
    ) {
        for inline in inlines {
            match inline {
                Inline::Text(text) => {
                    if !text.is_empty() {
                        runs.push(self.text_run(text, style, traits, false));
                    }
                }
                Inline::Code(code) => {
                    if !code.is_empty() {
                        runs.push(self.text_run(code, style, traits, true));
                    }
                }
                Inline::LineBreak => {
                    runs.push(self.text_run(&LINE_SEPARATOR.to_string(), style, traits, false));
                }
                Inline::Bold(children) => {
                    self.walk(children, style, Traits { bold: true, ..traits }, runs);
                }
                Inline::Italic(children) => {
                    self.walk(children, style, Traits { italic: true, ..traits }, runs);
                }
                Inline::Strikethrough(children) => {
                    let traits = Traits {
                        strikethrough: true,
                        ..traits
                    };
                    self.walk(children, style, traits, runs);
                }
                Inline::Link { url, children } => {
                    let traits = Traits {
                        link: Some(url.as_str()),
                        ..traits
                    };
                    self.walk(children, style, traits, runs);
                }
                Inline::Math(source) => {
                    let mut run = self.math_run(source, style, MathStyle::Inline);
                    run.strikethrough |= traits.strikethrough;
                    runs.push(run);
                }
            }
        }
    }

    fn text_run(&self, text: &str, style: &InlineStyle, traits: Traits<'_>, code: bool) -> StyledRun {
        let font = if code {
            FontSpec::monospace(style.base_font.size * CODE_SIZE_RATIO)
        } else {
            FontSpec {
                bold: style.base_font.bold || traits.bold,
                italic: style.base_font.italic || traits.italic,
                ..style.base_font
            }
        };
        let foreground = if traits.link.is_some() {
            style.link_color
        } else {
            style.base_color
        };
        StyledRun {
            content: RunContent::Text(text.to_string()),
            font,
            foreground,
            background: if code { style.code_background } else { None },
            underline: traits.link.is_some(),
            strikethrough: traits.strikethrough,
            link: traits.link.map(str::to_string),
        }
    }

    /// Typeset `source`, falling back to dimmed monospace literal text.
    pub fn math_run(&self, source: &str, style: &InlineStyle, math_style: MathStyle) -> StyledRun {
        let image = self.math.and_then(|typesetter| {
            typesetter.typeset(source, style.base_font.size, style.base_color, math_style)
        });
        match image {
            Some(image) => StyledRun {
                content: RunContent::Image(image),
                font: style.base_font,
                foreground: style.base_color,
                background: None,
                underline: false,
                strikethrough: false,
                link: None,
            },
            None => {
                if self.math.is_some() {
                    log::warn!("Math typesetting failed, showing source: {:?}", source);
                }
                StyledRun {
                    content: RunContent::Text(source.to_string()),
                    font: FontSpec::monospace(style.base_font.size * CODE_SIZE_RATIO),
                    foreground: style.base_color.with_alpha(MATH_FALLBACK_ALPHA),
                    background: None,
                    underline: false,
                    strikethrough: false,
                    link: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const FG: Rgba = Rgba(0xccccccff);
    const LINK: Rgba = Rgba(0x3b8eeaff);

    fn style() -> InlineStyle {
        InlineStyle {
            base_font: FontSpec::proportional(14.0),
            base_color: FG,
            link_color: LINK,
            code_background: Some(Rgba(0x252526ff)),
        }
    }

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    struct FailingTypesetter;

    impl MathTypesetter for FailingTypesetter {
        fn typeset(&self, _: &str, _: f32, _: Rgba, _: MathStyle) -> Option<MathImage> {
            None
        }
    }

    struct BoxTypesetter;

    impl MathTypesetter for BoxTypesetter {
        fn typeset(&self, latex: &str, font_size: f32, _: Rgba, _: MathStyle) -> Option<MathImage> {
            Some(MathImage {
                width: latex.len() as f32 * font_size,
                height: font_size,
                baseline_offset: 2.0,
                data: Arc::from(vec![1u8, 2, 3]),
            })
        }
    }

    #[test]
    fn plain_text_uses_base_attributes() {
        let runs = InlineConverter::default().convert(&[text("hello")], &style());
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text(), Some("hello"));
        assert_eq!(runs[0].font, FontSpec::proportional(14.0));
        assert_eq!(runs[0].foreground, FG);
        assert!(!runs[0].underline && !runs[0].strikethrough);
    }

    #[test]
    fn bold_and_italic_are_unioned() {
        let inlines = [Inline::Bold(vec![text("b"), Inline::Italic(vec![text("bi")])])];
        let runs = InlineConverter::default().convert(&inlines, &style());
        assert!(runs[0].font.bold && !runs[0].font.italic);
        assert!(runs[1].font.bold && runs[1].font.italic);
    }

    #[test]
    fn code_ignores_bold_and_italic() {
        let inlines = [Inline::Bold(vec![Inline::Italic(vec![Inline::Code("x".into())])])];
        let runs = InlineConverter::default().convert(&inlines, &style());
        assert!(runs[0].font.is_monospace());
        assert!(!runs[0].font.bold && !runs[0].font.italic);
        assert_eq!(runs[0].background, Some(Rgba(0x252526ff)));
    }

    #[test]
    fn link_overrides_color_and_underlines() {
        let inlines = [Inline::Link {
            url: "https://example.com".into(),
            children: vec![Inline::Bold(vec![text("go")]), Inline::Code("now".into())],
        }];
        let runs = InlineConverter::default().convert(&inlines, &style());
        for run in &runs {
            assert_eq!(run.foreground, LINK);
            assert!(run.underline);
            assert_eq!(run.link.as_deref(), Some("https://example.com"));
        }
        assert!(runs[0].font.bold);
        assert!(runs[1].font.is_monospace());
    }

    #[test]
    fn strikethrough_layers_on_everything() {
        let inlines = [Inline::Strikethrough(vec![
            text("a"),
            Inline::Code("b".into()),
            Inline::Link {
                url: "u".into(),
                children: vec![text("c")],
            },
        ])];
        let runs = InlineConverter::default().convert(&inlines, &style());
        assert_eq!(runs.len(), 3);
        assert!(runs.iter().all(|r| r.strikethrough));
        assert!(runs[2].underline);
    }

    #[test]
    fn line_break_stays_inside_paragraph() {
        let runs = InlineConverter::default().convert(&[text("a"), Inline::LineBreak, text("b")], &style());
        assert_eq!(runs[1].text(), Some("\u{2028}"));
    }

    #[test]
    fn failed_math_falls_back_to_dim_monospace_source() {
        let typesetter = FailingTypesetter;
        let converter = InlineConverter::new(Some(&typesetter));
        let runs = converter.convert(&[Inline::Math(r"\frac{1}{".into())], &style());
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text(), Some(r"\frac{1}{"));
        assert!(runs[0].font.is_monospace());
        assert!(runs[0].foreground.alpha() < 1.0);
        assert_eq!(runs[0].foreground.rgb(), FG.rgb());
    }

    #[test]
    fn missing_typesetter_also_falls_back() {
        let runs = InlineConverter::default().convert(&[Inline::Math("x^2".into())], &style());
        assert_eq!(runs[0].text(), Some("x^2"));
        assert!(runs[0].foreground.alpha() < 1.0);
    }

    #[test]
    fn typeset_math_becomes_image_run() {
        let typesetter = BoxTypesetter;
        let converter = InlineConverter::new(Some(&typesetter));
        let runs = converter.convert(&[text("area "), Inline::Math("r^2".into())], &style());
        match &runs[1].content {
            RunContent::Image(image) => {
                assert_eq!(image.height, 14.0);
                assert_eq!(image.baseline_offset, 2.0);
            }
            other => panic!("expected image, got {:?}", other),
        }
    }

    #[test]
    fn runs_append_to_buffer_with_links() {
        let inlines = [
            text("see "),
            Inline::Link {
                url: "https://example.com".into(),
                children: vec![text("docs")],
            },
        ];
        let runs = InlineConverter::default().convert(&inlines, &style());
        let mut buffer = StyledBuffer::new();
        for run in &runs {
            run.append_to(&mut buffer);
        }
        assert_eq!(buffer.text(), "see docs");
        assert!(buffer.links().get(2).is_none());
        let id = *buffer.links().get(5).unwrap();
        assert_eq!(buffer.link_url(id), Some("https://example.com"));
        assert_eq!(buffer.foregrounds().get(5), Some(&LINK));
    }
}
