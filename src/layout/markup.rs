//! Minimal HTML writer used by the page fragments

use super::AssetResolver;
use crate::catalog::AssetRef;

pub(crate) fn escape_text(input: &str, out: &mut String) {
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

pub(crate) fn escape_attr(input: &str, out: &mut String) {
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
}

/// Append-only HTML buffer
pub struct Markup<'a> {
    buf: String,
    resolver: &'a AssetResolver,
}

impl<'a> Markup<'a> {
    pub fn new(resolver: &'a AssetResolver) -> Self {
        Self {
            buf: String::with_capacity(16 * 1024),
            resolver,
        }
    }

    /// Trusted markup, written as is
    pub fn raw(&mut self, html: &str) -> &mut Self {
        self.buf.push_str(html);
        self
    }

    pub fn text(&mut self, text: &str) -> &mut Self {
        escape_text(text, &mut self.buf);
        self
    }

    pub fn open(&mut self, tag: &str, class: &str) -> &mut Self {
        self.open_with(tag, class, &[])
    }

    pub fn open_with(&mut self, tag: &str, class: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.buf.push('<');
        self.buf.push_str(tag);
        if !class.is_empty() {
            self.buf.push_str(" class=\"");
            escape_attr(class, &mut self.buf);
            self.buf.push('"');
        }
        for (name, value) in attrs {
            self.buf.push(' ');
            self.buf.push_str(name);
            self.buf.push_str("=\"");
            escape_attr(value, &mut self.buf);
            self.buf.push('"');
        }
        self.buf.push('>');
        self
    }

    pub fn close(&mut self, tag: &str) -> &mut Self {
        self.buf.push_str("</");
        self.buf.push_str(tag);
        self.buf.push('>');
        self
    }

    /// `<tag class="...">text</tag>`
    pub fn element(&mut self, tag: &str, class: &str, text: &str) -> &mut Self {
        self.open(tag, class).text(text).close(tag)
    }

    /// An empty `div`, e.g. a write-in box
    pub fn empty(&mut self, class: &str) -> &mut Self {
        self.open("div", class).close("div")
    }

    /// Images become `<img>`, glyphs inline text, missing assets an empty
    /// placeholder box.
    pub fn asset(&mut self, asset: &AssetRef, class: &str) -> &mut Self {
        match asset {
            AssetRef::Image(path) => {
                let src = self.resolver.resolve(path);
                let class = join_class(class, "asset");
                self.open_with("img", &class, &[("src", &src), ("alt", "")])
            }
            AssetRef::Glyph(glyph) => {
                let class = join_class(class, "asset glyph");
                self.element("span", &class, glyph)
            }
            AssetRef::Missing => self.empty(&join_class(class, "asset placeholder")),
        }
    }

    /// `asset` repeated `count` times
    pub fn assets(&mut self, asset: &AssetRef, count: u32, class: &str) -> &mut Self {
        for _ in 0..count {
            self.asset(asset, class);
        }
        self
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

fn join_class(a: &str, b: &str) -> String {
    if a.is_empty() {
        b.to_string()
    } else {
        format!("{a} {b}")
    }
}
