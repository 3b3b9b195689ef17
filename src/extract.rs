use html5ever::tendril::TendrilSink;
use html5ever::{LocalName, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Turns an HTML document into readable text, dropping page chrome
/// (navigation, header, footer) and non-content elements.
#[derive(Debug, Default)]
pub struct HtmlTextExtractor;

impl HtmlTextExtractor {
    pub fn get_dom(html: &str) -> Option<RcDom> {
        parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut std::io::Cursor::new(html))
            .ok()
    }

    pub fn is_skipped(local: &LocalName) -> bool {
        matches!(
            &**local,
            "head" | "nav" | "header" | "footer" | "script" | "style" | "noscript" | "template"
        )
    }

    pub fn is_block_like(local: &LocalName) -> bool {
        matches!(
            &**local,
            "p" | "div"
                | "section"
                | "article"
                | "main"
                | "li"
                | "ul"
                | "ol"
                | "br"
                | "tr"
                | "table"
                | "h1"
                | "h2"
                | "h3"
                | "h4"
                | "h5"
                | "h6"
        )
    }

    fn walk_html(handle: &Handle, out: &mut String) {
        match &handle.data {
            NodeData::Text { contents } => {
                // whitespace is kept as-is and collapsed by the caller
                out.push_str(&contents.borrow());
            }
            NodeData::Element { name, .. } => {
                let local = &name.local;
                if Self::is_skipped(local) {
                    return;
                }

                let block = Self::is_block_like(local);
                if block && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                for child in handle.children.borrow().iter() {
                    Self::walk_html(child, out);
                }
                if block && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            NodeData::Comment { .. } | NodeData::ProcessingInstruction { .. } => {}
            _ => {
                for child in handle.children.borrow().iter() {
                    Self::walk_html(child, out);
                }
            }
        }
    }

    pub fn extract(&self, html: &str) -> String {
        let Some(dom) = Self::get_dom(html) else {
            return String::new();
        };
        let mut out = String::new();
        Self::walk_html(&dom.document, &mut out);
        out
    }
}

/// Collapses every whitespace run into a single space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cuts `text` to at most `max` characters, respecting char boundaries.
pub fn clip(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
