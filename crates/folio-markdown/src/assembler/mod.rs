//! Block IR -> flat styled buffer.
//!
//! [`DocumentAssembler::assemble`] walks the blocks in order and hands each
//! one to a kind-specific appender. Appenders write into one shared
//! [`StyledBuffer`] and record side structures for the regions that still
//! need structure after flattening: attachment placeholders and table
//! overlays.

mod blocks;
mod code;
mod nested;
mod table;

use folio_core::{Block, BlockId, IndexedBlock, Inline, Rgba};
use std::ops::Range;
use std::sync::Arc;

use crate::attachments::{AttachmentRecord, AttachmentRegistry};
use crate::buffer::{BlockTag, ParagraphStyle, StyledBuffer, TextStyle, LINE_SEPARATOR};
use crate::config::{spacing, AssemblyConfig};
use crate::fonts::{FontMetrics, FontSpec};
use crate::highlight::SyntaxHighlighter;
use crate::inline::{InlineConverter, InlineStyle};
use crate::math::MathTypesetter;
use crate::table::TableCellMap;

/// A table whose visible grid is painted over its invisible shadow text.
#[derive(Clone, Debug)]
pub struct TableOverlay {
    /// Position of the owning top-level block.
    pub block_index: usize,
    pub block: Block,
    /// Tag stamped over the table's text and terminator.
    pub tag: BlockTag,
    /// Buffer range of the shadow text, without the terminator.
    pub range: Range<usize>,
    pub cell_map: Arc<TableCellMap>,
}

/// Everything one assembly run produces.
#[derive(Clone, Debug, Default)]
pub struct AssembledDocument {
    pub buffer: StyledBuffer,
    pub attachments: Vec<AttachmentRecord>,
    pub table_overlays: Vec<TableOverlay>,
}

impl AssembledDocument {
    /// The overlay whose shadow text contains `offset`.
    pub fn overlay_at(&self, offset: usize) -> Option<&TableOverlay> {
        self.table_overlays
            .iter()
            .find(|o| o.range.start <= offset && offset < o.range.end)
    }
}

/// Converts block IR into an [`AssembledDocument`].
///
/// Assembly is synchronous and total: unknown languages, failed math and
/// degenerate tables all degrade locally instead of producing an error.
pub struct DocumentAssembler<'a> {
    config: &'a AssemblyConfig,
    metrics: &'a dyn FontMetrics,
    highlighter: Option<&'a dyn SyntaxHighlighter>,
    math: Option<&'a dyn MathTypesetter>,
}

/// Accumulated output of the current run.
struct Output {
    buffer: StyledBuffer,
    attachments: AttachmentRegistry,
    table_overlays: Vec<TableOverlay>,
}

/// The top-level block being appended.
struct BlockContext {
    index: usize,
    id: BlockId,
    next_ordinal: u32,
}

impl BlockContext {
    fn new(indexed: &IndexedBlock) -> Self {
        Self {
            index: indexed.position,
            id: indexed.id(),
            next_ordinal: 0,
        }
    }

    /// The block's own id for the first tagged region, child ids after that.
    fn next_tag(&mut self) -> BlockTag {
        let id = match self.next_ordinal {
            0 => self.id,
            n => self.id.child(n),
        };
        self.next_ordinal += 1;
        id.into()
    }
}

/// Indentation and color state for blocks nested in lists and quotes.
#[derive(Clone, Copy, Debug, Default)]
struct Frame {
    /// Indent of plain blocks in this frame.
    indent: f32,
    /// Indent the outermost list of the current list chain starts from.
    list_base: f32,
    list_depth: usize,
    /// Indent the outermost quote of the current quote chain starts from.
    quote_base: f32,
    quote_depth: usize,
    /// Container levels entered so far, checked against the nesting cap.
    nesting: usize,
    /// Text color override (blockquotes).
    color: Option<u32>,
}

impl<'a> DocumentAssembler<'a> {
    pub fn new(config: &'a AssemblyConfig, metrics: &'a dyn FontMetrics) -> Self {
        Self {
            config,
            metrics,
            highlighter: None,
            math: None,
        }
    }

    pub fn with_highlighter(mut self, highlighter: &'a dyn SyntaxHighlighter) -> Self {
        self.highlighter = Some(highlighter);
        self
    }

    pub fn with_math(mut self, math: &'a dyn MathTypesetter) -> Self {
        self.math = Some(math);
        self
    }

    pub fn assemble(&self, blocks: &[IndexedBlock]) -> AssembledDocument {
        let mut out = Output {
            buffer: StyledBuffer::new(),
            attachments: AttachmentRegistry::new(),
            table_overlays: Vec::new(),
        };

        for indexed in blocks {
            let mut ctx = BlockContext::new(indexed);
            self.append_block(&mut out, &mut ctx, &indexed.block, Frame::default());
        }
        out.buffer.reset_leading_space();

        log::debug!(
            "Assembled {} blocks: {} chars, {} paragraphs, {} attachments, {} tables",
            blocks.len(),
            out.buffer.len(),
            out.buffer.terminators().len(),
            out.attachments.len(),
            out.table_overlays.len()
        );

        AssembledDocument {
            buffer: out.buffer,
            attachments: out.attachments.into_records(),
            table_overlays: out.table_overlays,
        }
    }

    fn append_block(&self, out: &mut Output, ctx: &mut BlockContext, block: &Block, frame: Frame) {
        match block {
            Block::Heading { level, content } => self.append_heading(out, *level, content, frame),
            Block::Paragraph { content } => {
                let style = self.paragraph_style(frame.indent, spacing::PARAGRAPH_SPACE_BEFORE);
                self.append_paragraph(out, content, style, frame);
            }
            Block::CodeBlock { language, code } => {
                self.append_code(out, ctx, language.as_deref(), code, frame)
            }
            Block::HtmlBlock { raw } => self.append_html(out, raw, frame),
            Block::Blockquote { blocks } => self.append_blockquote(out, ctx, block, blocks, frame),
            Block::OrderedList { items } => self.append_list(out, ctx, block, items, true, frame),
            Block::UnorderedList { items } => self.append_list(out, ctx, block, items, false, frame),
            Block::Table { columns, rows } => self.append_table(out, ctx, block, columns, rows, frame),
            Block::MathBlock { code } => self.append_math(out, ctx, block, code, frame),
            Block::ThematicBreak | Block::Image { .. } | Block::DiagramBlock { .. } => {
                self.append_placeholder(out, ctx, block, frame)
            }
        }
    }

    /// Paragraph style at `indent` with unscaled `space_before`.
    fn paragraph_style(&self, indent: f32, space_before: f32) -> ParagraphStyle {
        ParagraphStyle::indented(indent).with_space_before(self.config.scaled(space_before))
    }

    fn text_color(&self, frame: Frame) -> u32 {
        frame.color.unwrap_or(self.config.palette.foreground)
    }

    fn inline_style(&self, font: FontSpec, color: u32) -> InlineStyle {
        self.config.inline_style(font, color)
    }

    fn converter(&self) -> InlineConverter<'a> {
        InlineConverter::new(self.math)
    }

    /// Append converted inline content and close the paragraph.
    fn append_inlines(
        &self,
        out: &mut Output,
        inlines: &[Inline],
        style: &InlineStyle,
        paragraph: ParagraphStyle,
    ) {
        let start = out.buffer.len();
        for run in self.converter().convert(inlines, style) {
            run.append_to(&mut out.buffer);
        }
        self.finish_paragraph(out, start, style.base_font, style.base_color, paragraph);
    }

    /// Terminate the text appended since `start` and apply `paragraph` to it.
    /// Nothing is written when no text was appended.
    fn finish_paragraph(
        &self,
        out: &mut Output,
        start: usize,
        font: FontSpec,
        color: Rgba,
        paragraph: ParagraphStyle,
    ) -> Option<Range<usize>> {
        if out.buffer.len() == start {
            return None;
        }
        out.buffer.ensure_terminator(&TextStyle::new(font, color));
        let range = start..out.buffer.len();
        out.buffer.set_paragraph_style(range.clone(), paragraph);
        Some(range)
    }

    /// Plain text of `block` as a single paragraph. Line breaks become
    /// intra-paragraph separators.
    fn append_flattened(&self, out: &mut Output, block: &Block, frame: Frame) {
        let text = flatten_text(&block.plain_text());
        if text.is_empty() {
            return;
        }
        let font = self.config.body_font();
        let color = Rgba::opaque(self.text_color(frame));
        let start = out.buffer.len();
        out.buffer.push_str(&text, &TextStyle::new(font, color));
        let style = self.paragraph_style(frame.indent, spacing::PARAGRAPH_SPACE_BEFORE);
        self.finish_paragraph(out, start, font, color, style);
    }
}

fn flatten_text(text: &str) -> String {
    text.trim()
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join(&LINE_SEPARATOR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{BLOCK_TERMINATOR, OBJECT_REPLACEMENT};
    use crate::config::TableRendering;
    use crate::fonts::MonospaceMetrics;
    use crate::highlight::HighlightedSpan;
    use crate::math::{MathImage, MathStyle};
    use crate::table::CellPosition;
    use folio_core::theme::{DARK_PALETTE, LIGHT_PALETTE};
    use folio_core::{Alignment, Checkbox, DisplayMode, Item, TableColumn};

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn text(s: &str) -> Vec<Inline> {
        vec![Inline::Text(s.to_string())]
    }

    fn paragraph(s: &str) -> Block {
        Block::Paragraph { content: text(s) }
    }

    fn item(blocks: Vec<Block>) -> Item {
        Item {
            blocks,
            checkbox: None,
        }
    }

    fn people_table() -> Block {
        Block::Table {
            columns: ["Name", "Age"]
                .iter()
                .map(|h| TableColumn {
                    header: text(h),
                    alignment: Alignment::Left,
                })
                .collect(),
            rows: vec![vec![text("Alice"), text("30")], vec![text("Bob"), text("25")]],
        }
    }

    fn assemble_with(config: &AssemblyConfig, blocks: Vec<Block>) -> AssembledDocument {
        init_logging();
        let metrics = MonospaceMetrics::default();
        DocumentAssembler::new(config, &metrics).assemble(&IndexedBlock::enumerate(blocks))
    }

    fn assemble(blocks: Vec<Block>) -> AssembledDocument {
        assemble_with(&AssemblyConfig::default(), blocks)
    }

    fn mixed_document() -> Vec<Block> {
        vec![
            Block::Heading {
                level: 1,
                content: text("Title"),
            },
            paragraph("Intro text."),
            Block::CodeBlock {
                language: Some("rust".into()),
                code: "fn main() {\n    println!(\"hi\");\n}\n".into(),
            },
            Block::ThematicBreak,
            people_table(),
            Block::HtmlBlock {
                raw: "<div>\n  raw\n</div>".into(),
            },
            Block::MathBlock {
                code: "e^{i\\pi} + 1 = 0".into(),
            },
            Block::DiagramBlock {
                code: "graph TD; A-->B".into(),
            },
            Block::Image {
                source: "cat.png".into(),
                alt: "a cat".into(),
            },
        ]
    }

    #[test]
    fn one_terminator_per_block() {
        let blocks = mixed_document();
        let count = blocks.len();
        let doc = assemble(blocks);
        let terminators = doc.buffer.terminators();
        assert_eq!(terminators.len(), count);
        for pair in terminators.windows(2) {
            assert!(pair[1] > pair[0] + 1, "adjacent terminators at {:?}", pair);
        }
        assert_eq!(doc.buffer.text().chars().last(), Some(BLOCK_TERMINATOR));
    }

    #[test]
    fn print_mode_keeps_one_terminator_per_block() {
        let blocks = mixed_document();
        let count = blocks.len();
        let config = AssemblyConfig::default().display_mode(DisplayMode::Print);
        let doc = assemble_with(&config, blocks);
        assert_eq!(doc.buffer.terminators().len(), count);
    }

    #[test]
    fn empty_paragraph_leaves_no_blank_line() {
        let doc = assemble(vec![
            paragraph("a"),
            Block::Paragraph { content: vec![] },
            paragraph("b"),
        ]);
        assert_eq!(doc.buffer.text(), "a\nb\n");
    }

    #[test]
    fn first_paragraph_has_no_space_before() {
        let doc = assemble(vec![
            Block::Heading {
                level: 1,
                content: text("Title"),
            },
            paragraph("Body"),
        ]);
        assert_eq!(doc.buffer.paragraph_style_at(0).unwrap().space_before, 0.0);
        let body = doc.buffer.terminators()[0] + 1;
        assert!(doc.buffer.paragraph_style_at(body).unwrap().space_before > 0.0);
    }

    #[test]
    fn block_ids_do_not_depend_on_palette() {
        let blocks = mixed_document();
        let dark = assemble_with(&AssemblyConfig::new(DARK_PALETTE), blocks.clone());
        let light = assemble_with(&AssemblyConfig::new(LIGHT_PALETTE), blocks);
        let tags = |doc: &AssembledDocument| -> Vec<BlockTag> {
            doc.buffer.block_tags().iter().map(|(_, t)| *t).collect()
        };
        assert!(!tags(&dark).is_empty());
        assert_eq!(tags(&dark), tags(&light));
        assert_eq!(dark.table_overlays[0].tag, light.table_overlays[0].tag);
    }

    #[test]
    fn code_block_tag_covers_label_body_and_terminator() {
        let doc = assemble(vec![
            paragraph("before"),
            Block::CodeBlock {
                language: Some("python".into()),
                code: "x = 1\ny = 2\n".into(),
            },
            paragraph("after"),
        ]);
        let tag: BlockTag = IndexedBlock::new(
            1,
            Block::CodeBlock {
                language: Some("python".into()),
                code: "x = 1\ny = 2\n".into(),
            },
        )
        .id()
        .into();
        let ranges = doc.buffer.ranges_for_tag(tag);
        assert_eq!(ranges.len(), 1);
        let code_text = doc.buffer.slice(ranges[0].clone());
        assert_eq!(code_text, "python\u{2028}x = 1\u{2028}y = 2\n");
        assert_eq!(doc.buffer.terminators()[1], ranges[0].end - 1);
    }

    #[test]
    fn code_block_without_language_has_no_label() {
        let doc = assemble(vec![Block::CodeBlock {
            language: None,
            code: "\tindented\n".into(),
        }]);
        assert_eq!(doc.buffer.text(), "    indented\n");
        assert!(doc.buffer.fonts().get(0).unwrap().is_monospace());
        assert_eq!(
            doc.buffer.foregrounds().get(0),
            Some(&Rgba::opaque(DARK_PALETTE.code_foreground))
        );
    }

    struct KeywordHighlighter;

    impl SyntaxHighlighter for KeywordHighlighter {
        fn highlight(&self, code: &str, language: &str) -> Option<Vec<HighlightedSpan>> {
            (language == "toy").then(|| {
                code.split_inclusive(' ')
                    .map(|word| HighlightedSpan {
                        text: word.to_string(),
                        color: if word.trim() == "let" {
                            Rgba(0xff0000ff)
                        } else {
                            Rgba(0x00ff00ff)
                        },
                        bold: word.trim() == "let",
                        italic: false,
                    })
                    .collect()
            })
        }
    }

    #[test]
    fn highlighter_colors_known_languages_only() {
        init_logging();
        let config = AssemblyConfig::default();
        let metrics = MonospaceMetrics::default();
        let highlighter = KeywordHighlighter;
        let assembler = DocumentAssembler::new(&config, &metrics).with_highlighter(&highlighter);
        let blocks = IndexedBlock::enumerate(vec![
            Block::CodeBlock {
                language: Some("toy".into()),
                code: "let x".into(),
            },
            Block::CodeBlock {
                language: Some("other".into()),
                code: "let x".into(),
            },
        ]);
        let doc = assembler.assemble(&blocks);
        // "toy\u{2028}let x\n" then "other\u{2028}let x\n"
        assert_eq!(doc.buffer.foregrounds().get(4), Some(&Rgba(0xff0000ff)));
        assert!(doc.buffer.fonts().get(4).unwrap().bold);
        assert_eq!(doc.buffer.foregrounds().get(8), Some(&Rgba(0x00ff00ff)));
        let second = doc.buffer.terminators()[0] + 1 + "other\u{2028}".chars().count();
        assert_eq!(
            doc.buffer.foregrounds().get(second),
            Some(&Rgba::opaque(DARK_PALETTE.code_foreground))
        );
    }

    #[test]
    fn table_produces_overlay_and_invisible_text() {
        let doc = assemble(vec![paragraph("Intro"), people_table()]);
        assert_eq!(doc.table_overlays.len(), 1);
        let overlay = &doc.table_overlays[0];
        assert_eq!(overlay.block_index, 1);
        assert_eq!(
            doc.buffer.slice(overlay.range.clone()),
            "Name\tAge\nAlice\t30\nBob\t25"
        );
        let fg = doc.buffer.foregrounds().get(overlay.range.start).unwrap();
        assert!(fg.is_transparent());
        assert!(doc.buffer.fonts().get(overlay.range.start).unwrap().bold);
        assert!(!doc.buffer.fonts().get(overlay.range.start + 9).unwrap().bold);

        let (range, map) = doc.buffer.table_at(overlay.range.start + 10).unwrap();
        assert_eq!(range, overlay.range);
        assert!(Arc::ptr_eq(map, &overlay.cell_map));
        assert_eq!(map.cell_at(10), Some(CellPosition::new(0, 0)));
        assert_eq!(doc.overlay_at(overlay.range.start).map(|o| o.block_index), Some(1));

        let rows = doc.buffer.paragraph_style_at(overlay.range.start + 9).unwrap();
        assert_eq!(rows.min_line_height, Some(map.row_heights[1]));
        assert_eq!(rows.tab_stops.len(), 1);
    }

    #[test]
    fn print_tables_are_visible() {
        let config = AssemblyConfig::default().display_mode(DisplayMode::Print);
        let doc = assemble_with(&config, vec![people_table()]);
        let overlay = &doc.table_overlays[0];
        let fg = doc.buffer.foregrounds().get(overlay.range.start + 10).unwrap();
        assert!(!fg.is_transparent());
    }

    #[test]
    fn image_mode_tables_become_attachments() {
        let config = AssemblyConfig::default().table_rendering(TableRendering::Image);
        let doc = assemble_with(&config, vec![people_table()]);
        assert!(doc.table_overlays.is_empty());
        assert_eq!(doc.attachments.len(), 1);
        assert_eq!(doc.buffer.text(), "\u{FFFC}\n");
        let metrics = MonospaceMetrics::default();
        let Block::Table { columns, rows } = people_table() else {
            unreachable!()
        };
        let (_, map) = TableCellMap::build(
            &columns,
            &rows,
            &metrics,
            &config.body_font(),
            config.container_width,
        );
        assert_eq!(doc.attachments[0].reserved_height, map.total_height());
    }

    #[test]
    fn zero_column_table_is_a_no_op() {
        let doc = assemble(vec![
            paragraph("a"),
            Block::Table {
                columns: vec![],
                rows: vec![vec![text("orphan")]],
            },
        ]);
        assert_eq!(doc.buffer.text(), "a\n");
        assert!(doc.table_overlays.is_empty());
        assert!(doc.attachments.is_empty());
    }

    #[test]
    fn header_only_table_still_has_a_cell_map() {
        let doc = assemble(vec![Block::Table {
            columns: vec![TableColumn {
                header: text("Only"),
                alignment: Alignment::Right,
            }],
            rows: vec![],
        }]);
        let map = &doc.table_overlays[0].cell_map;
        assert_eq!(map.row_count, 0);
        assert_eq!(map.content(CellPosition::new(-1, 0)), Some("Only"));
    }

    #[test]
    fn table_without_any_text_keeps_its_overlay() {
        let doc = assemble(vec![
            Block::Table {
                columns: vec![TableColumn {
                    header: vec![],
                    alignment: Alignment::Left,
                }],
                rows: vec![],
            },
            paragraph("after"),
        ]);
        assert_eq!(doc.buffer.text(), " \nafter\n");
        assert_eq!(doc.buffer.terminators().len(), 2);
        assert_eq!(doc.table_overlays.len(), 1);

        let overlay = &doc.table_overlays[0];
        assert_eq!(overlay.range, 0..1);
        assert_eq!(overlay.cell_map.row_count, 0);
        assert_eq!(overlay.cell_map.cells.len(), 1);
        assert!(doc.buffer.foregrounds().get(0).unwrap().is_transparent());
        assert_eq!(doc.buffer.table_at(0).map(|(range, _)| range), Some(0..1));
        assert_eq!(doc.buffer.block_tags().get(1), Some(&overlay.tag));
    }

    #[test]
    fn placeholders_reserve_height_on_the_anchor_line() {
        let doc = assemble(vec![
            paragraph("a"),
            Block::ThematicBreak,
            Block::DiagramBlock {
                code: "graph TD; A-->B".into(),
            },
        ]);
        assert_eq!(doc.attachments.len(), 2);
        for record in &doc.attachments {
            let anchor = record.anchor_offset;
            assert_eq!(doc.buffer.slice(anchor..anchor + 1), OBJECT_REPLACEMENT.to_string());
            assert_eq!(doc.buffer.attachments().get(anchor), Some(&record.handle));
            let style = doc.buffer.paragraph_style_at(anchor).unwrap();
            assert_eq!(style.min_line_height, Some(record.reserved_height));
        }
        assert_eq!(doc.attachments[0].block_index, 1);
        assert_eq!(doc.attachments[1].block_index, 2);
    }

    #[test]
    fn screen_math_is_a_placeholder_and_print_math_is_centered() {
        let math = Block::MathBlock {
            code: "x^2".into(),
        };
        let screen = assemble(vec![math.clone()]);
        assert_eq!(screen.attachments.len(), 1);

        let config = AssemblyConfig::default().display_mode(DisplayMode::Print);
        let print = assemble_with(&config, vec![math]);
        assert!(print.attachments.is_empty());
        assert_eq!(print.buffer.text(), "x^2\n");
        let style = print.buffer.paragraph_style_at(0).unwrap();
        assert_eq!(style.alignment, Alignment::Center);
    }

    struct FailingTypesetter;

    impl MathTypesetter for FailingTypesetter {
        fn typeset(&self, _: &str, _: f32, _: Rgba, _: MathStyle) -> Option<MathImage> {
            None
        }
    }

    #[test]
    fn failed_inline_math_falls_back_without_breaking_the_paragraph() {
        init_logging();
        let config = AssemblyConfig::default();
        let metrics = MonospaceMetrics::default();
        let typesetter = FailingTypesetter;
        let assembler = DocumentAssembler::new(&config, &metrics).with_math(&typesetter);
        let blocks = IndexedBlock::enumerate(vec![Block::Paragraph {
            content: vec![
                Inline::Text("value ".into()),
                Inline::Math("\\frac{".into()),
                Inline::Text(" end".into()),
            ],
        }]);
        let doc = assembler.assemble(&blocks);
        assert_eq!(doc.buffer.text(), "value \\frac{ end\n");
        assert!(doc.buffer.fonts().get(6).unwrap().is_monospace());
        assert!(doc.buffer.foregrounds().get(6).unwrap().alpha() < 1.0);
    }

    #[test]
    fn list_items_get_prefixes_and_hanging_indent() {
        let doc = assemble(vec![Block::UnorderedList {
            items: vec![
                item(vec![paragraph("one")]),
                item(vec![
                    paragraph("two"),
                    Block::UnorderedList {
                        items: vec![item(vec![paragraph("nested")])],
                    },
                ]),
            ],
        }]);
        assert_eq!(doc.buffer.text(), "•\tone\n•\ttwo\n◦\tnested\n");

        let first = doc.buffer.paragraph_style_at(0).unwrap().clone();
        assert!(first.head_indent > first.first_line_head_indent);
        assert_eq!(first.tab_stops, vec![first.head_indent]);

        let nested_start = doc.buffer.terminators()[1] + 1;
        let nested = doc.buffer.paragraph_style_at(nested_start).unwrap();
        assert_eq!(nested.first_line_head_indent, first.head_indent);
    }

    #[test]
    fn ordered_and_checkbox_prefixes() {
        let doc = assemble(vec![
            Block::OrderedList {
                items: vec![item(vec![paragraph("a")]), item(vec![paragraph("b")])],
            },
            Block::UnorderedList {
                items: vec![
                    Item {
                        blocks: vec![paragraph("todo")],
                        checkbox: Some(Checkbox::Unchecked),
                    },
                    Item {
                        blocks: vec![paragraph("done")],
                        checkbox: Some(Checkbox::Checked),
                    },
                ],
            },
        ]);
        assert_eq!(doc.buffer.text(), "1.\ta\n2.\tb\n☐\ttodo\n☑\tdone\n");
    }

    #[test]
    fn later_item_children_are_indented_without_prefix() {
        let doc = assemble(vec![Block::OrderedList {
            items: vec![item(vec![paragraph("first"), paragraph("second")])],
        }]);
        assert_eq!(doc.buffer.text(), "1.\tfirst\nsecond\n");
        let first = doc.buffer.paragraph_style_at(0).unwrap().clone();
        let second_start = doc.buffer.terminators()[0] + 1;
        let second = doc.buffer.paragraph_style_at(second_start).unwrap();
        assert_eq!(second.first_line_head_indent, first.head_indent);
    }

    #[test]
    fn non_paragraph_first_child_gets_a_prefix_line() {
        let doc = assemble(vec![Block::UnorderedList {
            items: vec![item(vec![Block::CodeBlock {
                language: None,
                code: "x".into(),
            }])],
        }]);
        assert_eq!(doc.buffer.text(), "•\nx\n");
    }

    #[test]
    fn blockquote_indents_by_depth_and_flattens_other_children() {
        let doc = assemble(vec![Block::Blockquote {
            blocks: vec![
                paragraph("quoted"),
                Block::Blockquote {
                    blocks: vec![paragraph("deeper")],
                },
                Block::CodeBlock {
                    language: None,
                    code: "let x = 1;\nlet y = 2;".into(),
                },
            ],
        }]);
        assert_eq!(
            doc.buffer.text(),
            "quoted\ndeeper\nlet x = 1;\u{2028}let y = 2;\n"
        );
        let outer = doc.buffer.paragraph_style_at(0).unwrap().head_indent;
        let inner = doc.buffer.paragraph_style_at(7).unwrap().head_indent;
        assert!(outer > 0.0);
        assert_eq!(inner, outer * 2.0);
        assert_eq!(
            doc.buffer.foregrounds().get(0),
            Some(&Rgba::opaque(DARK_PALETTE.quote))
        );
        assert!(!doc.buffer.fonts().get(14).unwrap().is_monospace());
    }

    #[test]
    fn nesting_beyond_the_cap_is_flattened() {
        let mut block = paragraph("bottom");
        for _ in 0..5 {
            block = Block::Blockquote {
                blocks: vec![block],
            };
        }
        let config = AssemblyConfig::default().max_nesting_depth(2);
        let doc = assemble_with(&config, vec![block]);
        assert_eq!(doc.buffer.text(), "bottom\n");
        assert_eq!(doc.buffer.terminators().len(), 1);
    }

    #[test]
    fn deep_lists_do_not_overflow() {
        let mut block = paragraph("leaf");
        for _ in 0..200 {
            block = Block::UnorderedList {
                items: vec![item(vec![block])],
            };
        }
        let doc = assemble(vec![block]);
        assert!(doc.buffer.text().contains("leaf"));
    }

    #[test]
    fn links_resolve_through_the_buffer() {
        let doc = assemble(vec![Block::Paragraph {
            content: vec![Inline::Link {
                url: "https://example.com".into(),
                children: text("site"),
            }],
        }]);
        let id = *doc.buffer.links().get(0).unwrap();
        assert_eq!(doc.buffer.link_url(id), Some("https://example.com"));
        assert_eq!(
            doc.buffer.foregrounds().get(0),
            Some(&Rgba::opaque(DARK_PALETTE.link))
        );
    }

    #[test]
    fn html_is_literal_monospace_with_tint() {
        let doc = assemble(vec![Block::HtmlBlock {
            raw: "<b>x</b>\n".into(),
        }]);
        assert_eq!(doc.buffer.text(), "<b>x</b>\n");
        assert!(doc.buffer.fonts().get(0).unwrap().is_monospace());
        assert_eq!(
            doc.buffer.backgrounds().get(0),
            Some(&Rgba::opaque(DARK_PALETTE.html_background))
        );
    }
}
