//! Lists.
//!
//! Numbered levels become `enumerate`, everything else `itemize`. LaTeX has
//! four enumerate counters, so deeper lists and lists holding headings are
//! flattened into plain block content.

use super::context::Context;
use super::field::{CounterOp, clamp_counter, counter_display};
use super::palette::ConverterPalette;
use super::portion::DocumentPortion;
use crate::odf::element::{Element, ElementBase, Node};
use crate::odf::node::NodeKind;
use crate::odf::style::{ListLevel, StyleFamily};
use std::collections::HashMap;

/// Deepest list level LaTeX's standard environments support
pub const MAX_LIST_LEVEL: u8 = 4;

const ENUM_COUNTERS: [&str; 4] = ["enumi", "enumii", "enumiii", "enumiv"];

/// Enumerate counter for a 1-based level
pub fn enum_counter(level: u8) -> &'static str {
    ENUM_COUNTERS[usize::from(level.clamp(1, MAX_LIST_LEVEL)) - 1]
}

/// `\renewcommand` for a numbered level whose label differs from LaTeX's
/// default `1.` form.
pub fn label_definition(level: &ListLevel, prefix: &str, suffix: &str) -> Option<String> {
    if level.num_format == "1" && level.num_prefix.is_empty() && level.num_suffix == "." {
        return None;
    }
    let counter = enum_counter(level.level);
    Some(format!(
        "\\renewcommand\\label{}{{{}{}{}}}",
        counter,
        prefix,
        counter_display(Some(&level.num_format), counter),
        suffix
    ))
}

/// Last number shown per list style and level, for continued numbering
#[derive(Debug, Default)]
pub struct ListState {
    last_numbers: HashMap<(String, u8), i64>,
}

impl ListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_number(&self, style: &str, level: u8) -> Option<i64> {
        self.last_numbers.get(&(style.to_string(), level)).copied()
    }

    fn record(&mut self, style: &str, level: u8, number: i64) {
        self.last_numbers.insert((style.to_string(), level), number);
    }
}

impl<'a> ConverterPalette<'a> {
    /// `text:list`
    pub(crate) fn handle_list(&mut self, node: &'a Element, out: &mut DocumentPortion, ctx: &Context) {
        if node.has_descendant(NodeKind::Heading) {
            self.flatten_list(node, out, ctx);
            return;
        }
        let level = ctx.list_level().saturating_add(1);
        if level > MAX_LIST_LEVEL {
            log::warn!("List nested deeper than {} levels converted as plain text", MAX_LIST_LEVEL);
            self.flatten_list(node, out, ctx);
            return;
        }
        let style_name = node
            .get_attribute("text:style-name")
            .or_else(|| ctx.list_style_name())
            .map(str::to_string);
        let inner = ctx.deeper().with_list(style_name.as_deref());
        let registry = self.registry;
        let list_level = style_name
            .as_deref()
            .and_then(|n| registry.list_style(n))
            .and_then(|s| s.list_level(level));
        let display = style_name
            .as_deref()
            .map(|n| registry.display_name(n, StyleFamily::List));
        let config = self.config;
        let maps = &config.style_maps;
        let list_map = display.as_deref().and_then(|d| maps.list.get(d));
        let item_map = display.as_deref().and_then(|d| maps.list_item.get(d));

        let numbered = list_map.is_none() && list_level.is_some_and(ListLevel::is_numbered);
        let counter = enum_counter(level);
        let key = style_name.clone().unwrap_or_default();

        out.ensure_newline();
        match list_map {
            Some(entry) => {
                out.append(&entry.before);
            },
            None if numbered => {
                out.append("\\begin{enumerate}");
            },
            None => {
                out.append("\\begin{itemize}");
            },
        }
        out.newline();

        let mut number = 0;
        if numbered && let Some(def) = list_level {
            let prefix = self.i18n.escape(&def.num_prefix);
            let suffix = self.i18n.escape(&def.num_suffix);
            if let Some(command) = label_definition(def, &prefix, &suffix) {
                out.append(&command).newline();
            }
            let continued = node.get_bool_attribute("text:continue-numbering") == Some(true);
            let start = match self.lists.last_number(&key, level) {
                Some(last) if continued => clamp_counter(last.saturating_add(1)),
                _ => clamp_counter(i64::from(def.start_value)),
            };
            if start != 1 {
                out.append(&CounterOp::Set(start).preset(counter)).newline();
            }
            number = start - 1;
        }

        for child in node.child_elements() {
            match child.kind() {
                NodeKind::ListItem => {
                    out.ensure_newline();
                    if numbered && let Some(value) = child.get_int_attribute("text:start-value") {
                        let value = clamp_counter(value);
                        out.append(&CounterOp::Set(value).preset(counter)).newline();
                        number = value - 1;
                    }
                    number = clamp_counter(number.saturating_add(1));
                    match item_map {
                        Some(entry) => out.append(&entry.before),
                        None => out.append("\\item "),
                    };
                    self.traverse_block_nodes(child.children(), out, &inner);
                    if let Some(entry) = item_map {
                        out.append(&entry.after);
                    }
                },
                NodeKind::ListHeader => {
                    out.ensure_newline();
                    out.append("\\item[] ");
                    self.traverse_block_nodes(child.children(), out, &inner);
                },
                NodeKind::SoftPageBreak => {},
                _ => log::debug!("Skipping '{}' in list", child.tag_name()),
            }
        }

        if numbered {
            self.lists.record(&key, level, number);
        }
        out.ensure_newline();
        match list_map {
            Some(entry) => {
                out.append(&entry.after);
            },
            None if numbered => {
                out.append("\\end{enumerate}");
            },
            None => {
                out.append("\\end{itemize}");
            },
        }
        out.ensure_blank_line();
    }

    /// Emit the content of a list as plain blocks, nested lists included.
    fn flatten_list(&mut self, node: &'a Element, out: &mut DocumentPortion, ctx: &Context) {
        let inner = ctx.deeper();
        for item in node.child_elements() {
            if !matches!(item.kind(), NodeKind::ListItem | NodeKind::ListHeader) {
                continue;
            }
            let children = item.children();
            let mut start = 0;
            for (i, child) in children.iter().enumerate() {
                if let Node::Element(e) = child
                    && e.kind() == NodeKind::List
                {
                    self.traverse_block_nodes(&children[start..i], out, &inner);
                    self.flatten_list(e, out, &inner);
                    start = i + 1;
                }
            }
            self.traverse_block_nodes(&children[start..], out, &inner);
        }
    }
}
