//! Node kinds of the ODF text document vocabulary.
//!
//! Converters dispatch on [`NodeKind`] with exhaustive `match` expressions
//! instead of comparing tag names.

use phf::{Map, phf_map};

/// The kind of an element, derived once from its qualified tag name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Character data (only reported by [`super::element::Node::kind`])
    Text,

    // Document structure
    DocumentContent,
    Body,
    OfficeText,
    AutomaticStyles,
    Styles,
    MasterStyles,
    FontFaceDecls,
    Meta,
    OfficeMeta,

    // Block content
    Paragraph,
    Heading,
    List,
    ListItem,
    ListHeader,
    Section,
    Table,
    SequenceDecls,
    VariableDecls,
    UserFieldDecls,
    TrackedChanges,
    SoftPageBreak,
    TableOfContent,
    IllustrationIndex,
    TableIndex,
    AlphabeticalIndex,
    UserIndex,
    ObjectIndex,
    Bibliography,
    IndexBody,
    IndexTitle,

    // Table structure
    TableColumn,
    TableColumns,
    TableHeaderColumns,
    TableRow,
    TableRows,
    TableHeaderRows,
    TableRowGroup,
    TableCell,
    CoveredTableCell,

    // Inline content
    Span,
    Space,
    Tab,
    LineBreak,
    Link,
    Note,
    NoteCitation,
    NoteBody,
    NoteRef,
    Sequence,
    SequenceRef,
    ReferenceMark,
    ReferenceMarkStart,
    ReferenceMarkEnd,
    ReferenceRef,
    Bookmark,
    BookmarkStart,
    BookmarkEnd,
    BookmarkRef,
    BibliographyMark,
    AlphabeticalIndexMark,
    AlphabeticalIndexMarkStart,
    AlphabeticalIndexMarkEnd,
    TocMark,
    PageNumber,
    PageCount,
    Chapter,
    Date,
    Time,
    Title,
    Subject,
    AuthorName,
    InitialCreator,
    FileName,
    VariableGet,
    VariableSet,
    UserFieldGet,
    Annotation,
    ChangeMark,

    // Drawings
    Frame,
    Image,
    TextBox,
    Object,
    ObjectOle,
    CustomShape,
    EnhancedGeometry,
    Equation,
    SvgTitle,
    SvgDesc,
    BinaryData,
    Math,

    /// Anything the converter has no use for
    Unknown,
}

static TAGS: Map<&'static str, NodeKind> = phf_map! {
    "office:document-content" => NodeKind::DocumentContent,
    "office:document-styles" => NodeKind::DocumentContent,
    "office:document" => NodeKind::DocumentContent,
    "office:body" => NodeKind::Body,
    "office:text" => NodeKind::OfficeText,
    "office:automatic-styles" => NodeKind::AutomaticStyles,
    "office:styles" => NodeKind::Styles,
    "office:master-styles" => NodeKind::MasterStyles,
    "office:font-face-decls" => NodeKind::FontFaceDecls,
    "office:meta" => NodeKind::OfficeMeta,
    "office:annotation" => NodeKind::Annotation,
    "office:binary-data" => NodeKind::BinaryData,

    "text:p" => NodeKind::Paragraph,
    "text:h" => NodeKind::Heading,
    "text:list" => NodeKind::List,
    "text:list-item" => NodeKind::ListItem,
    "text:list-header" => NodeKind::ListHeader,
    "text:section" => NodeKind::Section,
    "text:sequence-decls" => NodeKind::SequenceDecls,
    "text:variable-decls" => NodeKind::VariableDecls,
    "text:user-field-decls" => NodeKind::UserFieldDecls,
    "text:tracked-changes" => NodeKind::TrackedChanges,
    "text:soft-page-break" => NodeKind::SoftPageBreak,
    "text:table-of-content" => NodeKind::TableOfContent,
    "text:illustration-index" => NodeKind::IllustrationIndex,
    "text:table-index" => NodeKind::TableIndex,
    "text:alphabetical-index" => NodeKind::AlphabeticalIndex,
    "text:user-index" => NodeKind::UserIndex,
    "text:object-index" => NodeKind::ObjectIndex,
    "text:bibliography" => NodeKind::Bibliography,
    "text:index-body" => NodeKind::IndexBody,
    "text:index-title" => NodeKind::IndexTitle,

    "table:table" => NodeKind::Table,
    "table:table-column" => NodeKind::TableColumn,
    "table:table-columns" => NodeKind::TableColumns,
    "table:table-header-columns" => NodeKind::TableHeaderColumns,
    "table:table-row" => NodeKind::TableRow,
    "table:table-rows" => NodeKind::TableRows,
    "table:table-header-rows" => NodeKind::TableHeaderRows,
    "table:table-row-group" => NodeKind::TableRowGroup,
    "table:table-cell" => NodeKind::TableCell,
    "table:covered-table-cell" => NodeKind::CoveredTableCell,

    "text:span" => NodeKind::Span,
    "text:meta" => NodeKind::Meta,
    "text:s" => NodeKind::Space,
    "text:tab" => NodeKind::Tab,
    "text:line-break" => NodeKind::LineBreak,
    "text:a" => NodeKind::Link,
    "text:note" => NodeKind::Note,
    "text:note-citation" => NodeKind::NoteCitation,
    "text:note-body" => NodeKind::NoteBody,
    "text:note-ref" => NodeKind::NoteRef,
    "text:sequence" => NodeKind::Sequence,
    "text:sequence-ref" => NodeKind::SequenceRef,
    "text:reference-mark" => NodeKind::ReferenceMark,
    "text:reference-mark-start" => NodeKind::ReferenceMarkStart,
    "text:reference-mark-end" => NodeKind::ReferenceMarkEnd,
    "text:reference-ref" => NodeKind::ReferenceRef,
    "text:bookmark" => NodeKind::Bookmark,
    "text:bookmark-start" => NodeKind::BookmarkStart,
    "text:bookmark-end" => NodeKind::BookmarkEnd,
    "text:bookmark-ref" => NodeKind::BookmarkRef,
    "text:bibliography-mark" => NodeKind::BibliographyMark,
    "text:alphabetical-index-mark" => NodeKind::AlphabeticalIndexMark,
    "text:alphabetical-index-mark-start" => NodeKind::AlphabeticalIndexMarkStart,
    "text:alphabetical-index-mark-end" => NodeKind::AlphabeticalIndexMarkEnd,
    "text:toc-mark" => NodeKind::TocMark,
    "text:toc-mark-start" => NodeKind::TocMark,
    "text:toc-mark-end" => NodeKind::TocMark,
    "text:page-number" => NodeKind::PageNumber,
    "text:page-count" => NodeKind::PageCount,
    "text:chapter" => NodeKind::Chapter,
    "text:date" => NodeKind::Date,
    "text:time" => NodeKind::Time,
    "text:title" => NodeKind::Title,
    "text:subject" => NodeKind::Subject,
    "text:author-name" => NodeKind::AuthorName,
    "text:initial-creator" => NodeKind::InitialCreator,
    "text:file-name" => NodeKind::FileName,
    "text:variable-get" => NodeKind::VariableGet,
    "text:variable-set" => NodeKind::VariableSet,
    "text:user-field-get" => NodeKind::UserFieldGet,
    "text:change" => NodeKind::ChangeMark,
    "text:change-start" => NodeKind::ChangeMark,
    "text:change-end" => NodeKind::ChangeMark,

    "draw:frame" => NodeKind::Frame,
    "draw:image" => NodeKind::Image,
    "draw:text-box" => NodeKind::TextBox,
    "draw:object" => NodeKind::Object,
    "draw:object-ole" => NodeKind::ObjectOle,
    "draw:custom-shape" => NodeKind::CustomShape,
    "draw:enhanced-geometry" => NodeKind::EnhancedGeometry,
    "draw:equation" => NodeKind::Equation,
    "svg:title" => NodeKind::SvgTitle,
    "svg:desc" => NodeKind::SvgDesc,
    "math:math" => NodeKind::Math,
    "math" => NodeKind::Math,
};

impl NodeKind {
    /// Classify a qualified tag name.
    #[inline]
    pub fn from_tag(tag: &str) -> Self {
        TAGS.get(tag).copied().unwrap_or(NodeKind::Unknown)
    }

    /// Kinds that may appear as block-level content.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            NodeKind::Paragraph
                | NodeKind::Heading
                | NodeKind::List
                | NodeKind::Section
                | NodeKind::Table
                | NodeKind::TableOfContent
                | NodeKind::IllustrationIndex
                | NodeKind::TableIndex
                | NodeKind::AlphabeticalIndex
                | NodeKind::UserIndex
                | NodeKind::ObjectIndex
                | NodeKind::Bibliography
                | NodeKind::Frame
                | NodeKind::CustomShape
        )
    }

    /// Index kinds whose generated body must not be traversed.
    pub fn is_index(&self) -> bool {
        matches!(
            self,
            NodeKind::TableOfContent
                | NodeKind::IllustrationIndex
                | NodeKind::TableIndex
                | NodeKind::AlphabeticalIndex
                | NodeKind::UserIndex
                | NodeKind::ObjectIndex
                | NodeKind::Bibliography
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag() {
        assert_eq!(NodeKind::from_tag("text:p"), NodeKind::Paragraph);
        assert_eq!(NodeKind::from_tag("table:covered-table-cell"), NodeKind::CoveredTableCell);
        assert_eq!(NodeKind::from_tag("text:toc-mark-start"), NodeKind::TocMark);
        assert_eq!(NodeKind::from_tag("foo:bar"), NodeKind::Unknown);
    }

    #[test]
    fn test_block_classification() {
        assert!(NodeKind::Table.is_block());
        assert!(!NodeKind::Span.is_block());
        assert!(NodeKind::Bibliography.is_index());
    }
}
