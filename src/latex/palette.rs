//! One conversion session.
//!
//! [`ConverterPalette`] owns every piece of mutable state a conversion needs
//! (style memo caches, export names, postponed notes, labels and index marks,
//! the bibliography, image artifacts). The traversal methods live next to the
//! constructs they convert (`block`, `inline`, `list`, `table`, ...) as
//! `impl ConverterPalette` blocks.

use super::bib::BibDatabase;
use super::config::{LatexConfig, PageFormatting};
use super::context::Context;
use super::draw::DrawState;
use super::field::FieldState;
use super::i18n::I18n;
use super::image::ImageConverter;
use super::index::IndexState;
use super::list::ListState;
use super::math::MathConverter;
use super::note::NoteState;
use super::output::{BIBTEX_MIME, ConverterResult, LATEX_MIME, OutputFile};
use super::pacman::Pacman;
use super::portion::{DocumentPortion, PackageRequest};
use super::style::{CharStyleConverter, ParStyleConverter, geometry_options, header_footer_position};
use crate::odf::document::OdfDocument;
use crate::odf::element::{ElementBase, Node};
use crate::odf::node::NodeKind;
use crate::odf::style::StyleRegistry;

const FANCY_POSITIONS: [&str; 3] = ["L", "C", "R"];

pub struct ConverterPalette<'a> {
    pub(crate) doc: &'a OdfDocument,
    pub(crate) registry: &'a StyleRegistry,
    pub(crate) config: &'a LatexConfig,
    pub(crate) math: &'a dyn MathConverter,
    pub(crate) images: &'a dyn ImageConverter,
    /// Base name of the output artifacts
    pub(crate) base_name: String,
    pub(crate) i18n: I18n,
    pub(crate) chars: CharStyleConverter<'a>,
    pub(crate) pars: ParStyleConverter<'a>,
    pub(crate) fields: FieldState<'a>,
    pub(crate) notes: NoteState<'a>,
    pub(crate) index: IndexState,
    pub(crate) bib: BibDatabase,
    pub(crate) lists: ListState,
    pub(crate) draw: DrawState,
}

impl<'a> ConverterPalette<'a> {
    pub fn new(
        doc: &'a OdfDocument,
        config: &'a LatexConfig,
        math: &'a dyn MathConverter,
        images: &'a dyn ImageConverter,
        base_name: &str,
    ) -> Self {
        let registry = doc.registry();
        Self {
            doc,
            registry,
            config,
            math,
            images,
            base_name: base_name.to_string(),
            i18n: I18n::new(config),
            chars: CharStyleConverter::new(registry, config),
            pars: ParStyleConverter::new(registry, config),
            fields: FieldState::new(),
            notes: NoteState::new(),
            index: IndexState::new(),
            bib: BibDatabase::new(),
            lists: ListState::new(),
            draw: DrawState::new(),
        }
    }

    /// Base name of the `.bib` artifact
    pub(crate) fn bibliography_base(&self) -> &str {
        if self.base_name.is_empty() {
            &self.config.bibliography_name
        } else {
            &self.base_name
        }
    }

    /// Write postponed notes, labels and index marks, in that order.
    pub(crate) fn flush_queues(&mut self, out: &mut DocumentPortion, ctx: &Context) {
        self.flush_notes(out, ctx);
        self.flush_labels(out, ctx);
        self.flush_index_marks(out, ctx);
    }

    /// Number of postponed notes, labels and index marks
    fn pending_items(&self) -> usize {
        self.notes.len() + self.fields.pending_len() + self.index.len()
    }

    /// Flush until every queue is empty or a round makes no progress.
    fn drain_queues(&mut self, out: &mut DocumentPortion, ctx: &Context) {
        let mut pending = self.pending_items();
        while pending > 0 {
            self.flush_queues(out, ctx);
            let left = self.pending_items();
            if left >= pending {
                log::warn!("{} postponed items could not be written", left);
                break;
            }
            pending = left;
        }
    }

    /// Convert the whole document.
    pub fn convert(mut self) -> ConverterResult {
        let doc = self.doc;
        let config = self.config;
        let ctx = Context::root(self.registry);
        match ctx.lang().or(doc.metadata().language.as_deref()) {
            Some(lang) => self.i18n.set_default_language(lang),
            None => log::debug!("Document declares no language"),
        }

        let mut body = DocumentPortion::new();
        let empty: &[Node] = &[];
        let nodes = match doc.body() {
            Some(root) => root.children(),
            None => {
                log::warn!("Document has no text body");
                empty
            },
        };
        self.traverse_block_nodes(nodes, &mut body, &ctx);
        self.drain_queues(&mut body, &ctx);

        // header and footer text registers languages and packages too
        let header_footer = self.header_footer(&ctx);
        let mut packages = body.take_packages();
        let header_footer = header_footer.map(|mut portion| {
            packages.extend(portion.take_packages());
            portion
        });

        let mut document = self.preamble(packages, header_footer);
        document.ensure_newline();
        document.append("\\begin{document}").newline();
        if config.metadata && doc.metadata().title.is_some() {
            document.append("\\maketitle").newline();
        }
        document.ensure_blank_line();
        document.append_portion(body);
        if self.notes.endnotes_used() {
            document.ensure_blank_line();
            document.append("\\theendnotes");
        }
        document.ensure_newline();
        document.append("\\end{document}").newline();

        let text = document.serialize(config.wrap_lines_after, config.newline.as_str());
        let mut result = ConverterResult::new();
        result.push(OutputFile::new(
            &format!("{}.tex", self.base_name),
            LATEX_MIME,
            text.into_bytes(),
        ));
        for image in self.draw.take_outputs() {
            result.push(image);
        }
        if !self.bib.is_empty() {
            result.push(OutputFile::new(
                &format!("{}.bib", self.bibliography_base()),
                BIBTEX_MIME,
                self.bib.to_bibtex().into_bytes(),
            ));
        }
        log::debug!("Converted '{}' into {} artifacts", self.base_name, result.len());
        result
    }

    /// fancyhdr commands for the header and footer of the first master page.
    fn header_footer(&mut self, ctx: &Context) -> Option<DocumentPortion> {
        if self.config.page_formatting != PageFormatting::ConvertAll {
            return None;
        }
        let registry = self.registry;
        let master = registry.first_master_page()?.content()?;
        let inner = ctx
            .with_in_header_footer(true)
            .with_no_line_breaks(true)
            .with_no_footnotes(true);

        let mut out = DocumentPortion::new();
        let mut commands = Vec::new();
        for (tag, command) in [("style:header", "fancyhead"), ("style:footer", "fancyfoot")] {
            let Some(part) = master.first_child_by_tag(tag) else {
                continue;
            };
            if part.get_bool_attribute("style:display") == Some(false) {
                continue;
            }
            let mut slots: [Vec<String>; 3] = Default::default();
            for paragraph in part.child_elements().filter(|e| e.kind() == NodeKind::Paragraph) {
                let mut content = DocumentPortion::new();
                self.traverse_inline_nodes(paragraph.children(), &mut content, &inner);
                let text = content.into_text(&mut out);
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                let position = header_footer_position(registry, paragraph.get_attribute("text:style-name"));
                if let Some(slot) = FANCY_POSITIONS.iter().position(|p| *p == position) {
                    slots[slot].push(text.to_string());
                }
            }
            for (position, texts) in FANCY_POSITIONS.iter().zip(slots.iter()) {
                if !texts.is_empty() {
                    commands.push(format!("\\{}[{}]{{{}}}", command, position, texts.join(" ")));
                }
            }
        }
        if commands.is_empty() {
            return None;
        }
        out.append("\\pagestyle{fancy}").newline();
        out.append("\\fancyhf{}").newline();
        for command in commands {
            out.append(&command).newline();
        }
        Some(out)
    }

    fn preamble(&mut self, packages: Vec<PackageRequest>, header_footer: Option<DocumentPortion>) -> DocumentPortion {
        let config = self.config;
        let doc = self.doc;
        let mut pacman = Pacman::new();

        // escape before the encoding packages are chosen
        let mut title_block = Vec::new();
        if config.metadata {
            let metadata = doc.metadata();
            if let Some(title) = &metadata.title {
                title_block.push(format!("\\title{{{}}}", self.i18n.escape(title)));
                if let Some(author) = &metadata.author {
                    title_block.push(format!("\\author{{{}}}", self.i18n.escape(author)));
                }
                let date = metadata.date_only().unwrap_or("");
                title_block.push(format!("\\date{{{}}}", self.i18n.escape(date)));
            }
        }

        let options = if config.global_options.trim().is_empty() {
            String::new()
        } else {
            format!("[{}]", config.global_options.trim())
        };
        pacman
            .append(&format!("\\documentclass{}{{{}}}", options, config.document_class))
            .newline();

        self.i18n.write_preamble(&mut pacman);
        if let Some(geometry) = geometry_options(self.registry, config) {
            pacman.use_package_with("geometry", &geometry);
        }
        pacman.use_requests(self.chars.packages());
        // hyperref has to come after everything else
        let (hyperref, others): (Vec<PackageRequest>, Vec<PackageRequest>) =
            packages.into_iter().partition(|r| r.name == "hyperref");
        pacman.use_requests(&others);
        if self.index.uses_makeidx() {
            pacman.use_package("makeidx");
        }
        if header_footer.is_some() {
            pacman.use_package("fancyhdr");
        }
        pacman.use_requests(&hyperref);

        if self.index.uses_makeidx() {
            pacman.append("\\makeindex").newline();
        }
        if let Some(portion) = header_footer {
            pacman.append_portion(portion);
            pacman.newline();
        }
        for definition in self.chars.definitions().iter().chain(self.pars.definitions()) {
            pacman.append(definition).newline();
        }
        for declaration in self.fields.counter_declarations() {
            pacman.append(&declaration).newline();
        }
        if let Some(depth) = self.secnumdepth() {
            pacman.append(&format!("\\setcounter{{secnumdepth}}{{{}}}", depth)).newline();
        }
        if !config.custom_preamble.trim().is_empty() {
            for line in config.custom_preamble.lines() {
                pacman.append(line).newline();
            }
        }

        for line in title_block {
            pacman.append(&line).newline();
        }
        pacman.into_portion()
    }
}
