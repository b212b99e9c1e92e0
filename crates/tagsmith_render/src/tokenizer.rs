//! Streaming markup tokenizer.
//!
//! Scans template source into tag, text and reference events in document
//! order. The scanner is quote-aware inside tags and otherwise lenient:
//! anything that does not open valid markup is text.

use crate::attributes::Attributes;

/// One markup event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StartTag { name: String, attrs: Attributes },
    EndTag { name: String },
    StartEndTag { name: String, attrs: Attributes },
    Text(String),
    /// `<!...>` body, e.g. `DOCTYPE html`.
    Declaration(String),
    /// Numeric reference body, e.g. `169` or `x7b`.
    CharRef(String),
    /// Named reference, e.g. `amp`.
    EntityRef(String),
    Comment(String),
}

/// Elements whose content is raw text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Iterator over the [`Token`]s of a template source.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    raw_text_end: Option<String>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            raw_text_end: None,
        }
    }

    fn next_raw_text(&mut self, element: String) -> Option<Token> {
        if self.pos >= self.input.len() {
            return None;
        }
        let closing = format!("</{}", element);
        match find_ignore_ascii_case(&self.input[self.pos..], &closing) {
            Some(0) => None,
            Some(offset) => {
                let text = &self.input[self.pos..self.pos + offset];
                self.pos += offset;
                Some(Token::Text(text.to_string()))
            }
            None => {
                let text = &self.input[self.pos..];
                self.pos = self.input.len();
                Some(Token::Text(text.to_string()))
            }
        }
    }

    /// Parse markup or a reference starting at byte `i`.
    fn token_at(&self, i: usize) -> Option<(Token, usize)> {
        match self.input.as_bytes()[i] {
            b'<' => parse_markup(self.input, i),
            b'&' => parse_reference(self.input, i),
            _ => None,
        }
    }

    /// Text from `start` up to the next position where markup parses.
    fn text_from(&self, start: usize) -> (Token, usize) {
        let bytes = self.input.as_bytes();
        let mut i = start + 1;
        while i < bytes.len() {
            if (bytes[i] == b'<' || bytes[i] == b'&') && self.token_at(i).is_some() {
                break;
            }
            i += 1;
        }
        (Token::Text(self.input[start..i].to_string()), i)
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if let Some(element) = self.raw_text_end.take() {
            if let Some(token) = self.next_raw_text(element) {
                return Some(token);
            }
        }
        if self.pos >= self.input.len() {
            return None;
        }

        let (token, end) = self
            .token_at(self.pos)
            .unwrap_or_else(|| self.text_from(self.pos));
        self.pos = end;

        if let Token::StartTag { name, .. } = &token {
            if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                self.raw_text_end = Some(name.clone());
            }
        }
        Some(token)
    }
}

#[inline]
fn is_ws(b: u8) -> bool {
    b == b' ' || b == b'\t' || b == b'\n' || b == b'\r' || b == b'\x0c'
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let (h, n) = (haystack.as_bytes(), needle.as_bytes());
    if n.len() > h.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

/// Find the `>` closing a tag that starts at `i`, skipping quoted values.
fn find_tag_end(s: &[u8], mut i: usize) -> Option<usize> {
    let n = s.len();
    i += 1;
    let mut quote: u8 = 0;
    while i < n {
        let b = s[i];
        if quote != 0 {
            if b == quote {
                quote = 0;
            }
        } else if b == b'"' || b == b'\'' {
            quote = b;
        } else if b == b'>' {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn parse_markup(input: &str, i: usize) -> Option<(Token, usize)> {
    let bytes = input.as_bytes();
    let rest = &input[i..];

    if rest.starts_with("<!--") {
        return Some(match input[i + 4..].find("-->") {
            Some(offset) => (
                Token::Comment(input[i + 4..i + 4 + offset].to_string()),
                i + 4 + offset + 3,
            ),
            None => (Token::Comment(input[i + 4..].to_string()), input.len()),
        });
    }

    let next = *bytes.get(i + 1)?;
    match next {
        b'!' => {
            let end = i + rest.find('>')?;
            Some((Token::Declaration(input[i + 2..end].to_string()), end + 1))
        }
        b'?' => {
            let end = i + rest.find('>')?;
            Some((Token::Comment(input[i + 2..end].to_string()), end + 1))
        }
        b'/' => {
            if !bytes.get(i + 2)?.is_ascii_alphabetic() {
                return None;
            }
            let end = find_tag_end(bytes, i)?;
            let inner = &input[i + 2..end];
            let name_len = inner
                .find(|c: char| c.is_ascii_whitespace() || c == '/')
                .unwrap_or(inner.len());
            let name = inner[..name_len].to_ascii_lowercase();
            Some((Token::EndTag { name }, end + 1))
        }
        b if b.is_ascii_alphabetic() => {
            let end = find_tag_end(bytes, i)?;
            let mut inner = input[i + 1..end].trim_end();
            let self_closing = inner.ends_with('/');
            if self_closing {
                inner = &inner[..inner.len() - 1];
            }
            let name_len = inner
                .find(|c: char| c.is_ascii_whitespace() || c == '/')
                .unwrap_or(inner.len());
            let name = inner[..name_len].to_ascii_lowercase();
            let attrs = parse_attributes(&inner[name_len..]);
            let token = if self_closing {
                Token::StartEndTag { name, attrs }
            } else {
                Token::StartTag { name, attrs }
            };
            Some((token, end + 1))
        }
        _ => None,
    }
}

/// Parse `name`, `name=value`, `name="value"` and `name='value'` items.
fn parse_attributes(s: &str) -> Attributes {
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut attrs = Attributes::new();
    let mut i = 0usize;

    while i < len {
        while i < len && (is_ws(bytes[i]) || bytes[i] == b'/') {
            i += 1;
        }
        if i >= len {
            break;
        }

        let name_start = i;
        while i < len && !is_ws(bytes[i]) && bytes[i] != b'=' && bytes[i] != b'/' {
            i += 1;
        }
        if i == name_start {
            // A stray '=' with no name.
            i += 1;
            continue;
        }
        let name = s[name_start..i].to_ascii_lowercase();

        let mut j = i;
        while j < len && is_ws(bytes[j]) {
            j += 1;
        }
        if j >= len || bytes[j] != b'=' {
            attrs.insert_flag(name);
            continue;
        }

        i = j + 1;
        while i < len && is_ws(bytes[i]) {
            i += 1;
        }
        if i >= len {
            attrs.insert(name, "");
            break;
        }

        if bytes[i] == b'"' || bytes[i] == b'\'' {
            let quote = bytes[i];
            let value_start = i + 1;
            i = value_start;
            while i < len && bytes[i] != quote {
                i += 1;
            }
            attrs.insert(name, &s[value_start..i]);
            i += 1;
        } else {
            let value_start = i;
            while i < len && !is_ws(bytes[i]) {
                i += 1;
            }
            attrs.insert(name, &s[value_start..i]);
        }
    }
    attrs
}

fn parse_reference(input: &str, i: usize) -> Option<(Token, usize)> {
    let rest = &input[i + 1..];
    let semi = rest.find(';')?;
    let body = &rest[..semi];
    let valid = if let Some(digits) = body.strip_prefix('#') {
        match digits.strip_prefix(['x', 'X']) {
            Some(hex) => !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()),
            None => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        }
    } else {
        body.bytes().next().is_some_and(|b| b.is_ascii_alphabetic())
            && body.bytes().all(|b| b.is_ascii_alphanumeric())
    };
    if !valid {
        return None;
    }

    let end = i + 1 + semi + 1;
    let token = match body.strip_prefix('#') {
        Some(numeric) => Token::CharRef(numeric.to_string()),
        None => Token::EntityRef(body.to_string()),
    };
    Some((token, end))
}
