//! Entry and pattern parsing.

use indexmap::IndexMap;

use ftl_lex::TokenKind;
use ftl_util::{Result, TokenRange};

use crate::ast::{Attribute, Entry, PatternElement, TextElement};
use crate::Parser;

impl<'t> Parser<'t> {
    /// Parses a whole file: entries interleaved with comments and blank
    /// lines.
    pub fn parse_file(&mut self) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        loop {
            match self.peek_kind() {
                None => break,
                Some(TokenKind::Newline) | Some(TokenKind::Comment) => {
                    self.advance();
                }
                Some(TokenKind::Minus) => entries.push(self.parse_entry(true)?),
                Some(TokenKind::Ident) => entries.push(self.parse_entry(false)?),
                Some(kind) => {
                    return Err(self.error_here(format!("expected an entry, found {kind}")))
                }
            }
        }
        Ok(entries)
    }

    fn parse_entry(&mut self, is_term: bool) -> Result<Entry> {
        let start = self.mark();
        if is_term {
            self.expect(TokenKind::Minus, "before term name")?;
        }
        let name = self.expect(TokenKind::Ident, "as entry name")?.text.clone();

        let elements = if self.eat(TokenKind::Equals) {
            self.parse_pattern()?
        } else {
            // Relaxed grammar: a bare identifier declares the name only.
            match self.peek_kind() {
                None => Vec::new(),
                Some(TokenKind::Newline) => {
                    self.advance();
                    Vec::new()
                }
                Some(kind) => {
                    return Err(self.error_here(format!(
                        "expected '=' or end of line after entry name, found {kind}"
                    )))
                }
            }
        };

        let mut attributes = IndexMap::new();
        while self.check(TokenKind::Dot) {
            let attribute = self.parse_attribute(&name)?;
            let index = attribute.range.start;
            if attributes
                .insert(attribute.name.clone(), attribute)
                .is_some()
            {
                return Err(self.error_at(index, format!("duplicate attribute on {name}")));
            }
        }

        Ok(Entry {
            name,
            is_term,
            elements,
            attributes,
            range: self.range_from(start),
        })
    }

    fn parse_attribute(&mut self, entry_name: &str) -> Result<Attribute> {
        let start = self.mark();
        self.expect(TokenKind::Dot, "before attribute name")?;
        let name = self
            .expect(TokenKind::Ident, "as attribute name")?
            .text
            .clone();
        self.expect(TokenKind::Equals, "after attribute name")?;
        let elements = self.parse_pattern()?;
        Ok(Attribute {
            entry_name: entry_name.to_string(),
            name,
            elements,
            range: self.range_from(start),
        })
    }

    /// Parses pattern elements up to and including the terminating newline.
    ///
    /// Text and blank-inline tokens merge into [`TextElement`] runs with the
    /// leading blanks of every line trimmed. A continuation newline (one
    /// followed by a blank-inline token) starts a new line whose first
    /// element is wrapped in [`PatternElement::Block`]; when the pattern
    /// itself begins on a continuation line the first wrapper is elided so
    /// the value does not start with a newline.
    pub(crate) fn parse_pattern(&mut self) -> Result<Vec<PatternElement>> {
        let mut elements: Vec<PatternElement> = Vec::new();
        let mut text = String::new();
        let mut text_start = self.mark();
        // Next completed element is the first of a continuation line.
        let mut pending_block = false;
        // Leading blanks of the current line are still being trimmed.
        let mut line_start = true;

        fn push(elements: &mut Vec<PatternElement>, pending_block: &mut bool, element: PatternElement) {
            if *pending_block {
                elements.push(PatternElement::Block(Box::new(element)));
                *pending_block = false;
            } else {
                elements.push(element);
            }
        }

        loop {
            match self.peek_kind() {
                Some(TokenKind::Text) => {
                    if text.is_empty() {
                        text_start = self.mark();
                    }
                    text.push_str(&self.advance().unwrap().text);
                    line_start = false;
                }
                Some(TokenKind::BlankInline) => {
                    if !line_start && text.is_empty() {
                        text_start = self.mark();
                    }
                    let token = self.advance().unwrap();
                    if !line_start {
                        text.push_str(&token.text);
                    }
                }
                Some(TokenKind::BraceOpen) => {
                    if !text.is_empty() {
                        let value = std::mem::take(&mut text);
                        let range = TokenRange::new(text_start, self.mark());
                        push(
                            &mut elements,
                            &mut pending_block,
                            PatternElement::Text(TextElement { value, range }),
                        );
                    }
                    self.advance();
                    let expression = self.parse_placeable()?;
                    push(
                        &mut elements,
                        &mut pending_block,
                        PatternElement::Placeable(expression),
                    );
                    line_start = false;
                }
                Some(TokenKind::Newline) => {
                    let continues = self.nth_kind(1) == Some(TokenKind::BlankInline);
                    let newline_index = self.mark();
                    self.advance();
                    if !text.is_empty() {
                        let value = std::mem::take(&mut text);
                        let range = TokenRange::new(text_start, newline_index);
                        push(
                            &mut elements,
                            &mut pending_block,
                            PatternElement::Text(TextElement { value, range }),
                        );
                    }
                    if !continues {
                        break;
                    }
                    if pending_block {
                        // The previous continuation line was blank; it still
                        // contributes its newline.
                        elements.push(PatternElement::Block(Box::new(PatternElement::Text(
                            TextElement {
                                value: String::new(),
                                range: TokenRange::point(newline_index),
                            },
                        ))));
                    }
                    // A pattern that starts on the next line does not start
                    // with a newline.
                    pending_block = !elements.is_empty();
                    line_start = true;
                }
                None => break,
                Some(kind) => {
                    return Err(self.error_here(format!("unexpected {kind} in pattern")))
                }
            }
        }

        if !text.is_empty() {
            let range = TokenRange::new(text_start, self.mark());
            push(
                &mut elements,
                &mut pending_block,
                PatternElement::Text(TextElement { value: text, range }),
            );
        }
        Ok(elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expression;
    use crate::parse_entries;
    use ftl_lex::tokenize;

    fn entries(source: &str) -> Vec<Entry> {
        parse_entries(&tokenize(source)).expect("source should parse")
    }

    fn single(source: &str) -> Entry {
        let mut parsed = entries(source);
        assert_eq!(parsed.len(), 1, "expected exactly one entry");
        parsed.remove(0)
    }

    /// Flattens a pattern back to text, rendering blocks as newlines, for
    /// assertions on literal-only patterns.
    fn flatten(elements: &[PatternElement]) -> String {
        elements.iter().map(flatten_one).collect()
    }

    fn flatten_one(element: &PatternElement) -> String {
        match element {
            PatternElement::Text(t) => t.value.clone(),
            PatternElement::Block(inner) => format!("\n{}", flatten_one(inner)),
            PatternElement::Placeable(_) => "\u{fffd}".to_string(),
        }
    }

    #[test]
    fn test_empty_file() {
        assert!(entries("").is_empty());
        assert!(entries("\n\n").is_empty());
    }

    #[test]
    fn test_comments_are_skipped() {
        let parsed = entries("# comment\n## section\nm = x\n");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "m");
    }

    #[test]
    fn test_simple_message() {
        let entry = single("greeting = Hello, world!\n");
        assert_eq!(entry.name, "greeting");
        assert!(!entry.is_term);
        assert_eq!(flatten(&entry.elements), "Hello, world!");
    }

    #[test]
    fn test_term_sigil_not_part_of_name() {
        let entry = single("-brand = Acme\n");
        assert!(entry.is_term);
        assert_eq!(entry.name, "brand");
    }

    #[test]
    fn test_declaration_only_entry() {
        let entry = single("placeholder\n");
        assert_eq!(entry.name, "placeholder");
        assert!(entry.elements.is_empty());
        assert!(entry.attributes.is_empty());
    }

    #[test]
    fn test_declaration_without_trailing_newline() {
        let entry = single("placeholder");
        assert!(entry.elements.is_empty());
    }

    #[test]
    fn test_multiline_pattern_blocks() {
        let entry = single("m = one\n    two\n    three\n");
        assert_eq!(flatten(&entry.elements), "one\ntwo\nthree");
    }

    #[test]
    fn test_pattern_starting_on_next_line() {
        let entry = single("m =\n    value\n");
        assert_eq!(flatten(&entry.elements), "value");
    }

    #[test]
    fn test_interior_blank_line() {
        let entry = single("m = one\n    \n    two\n");
        assert_eq!(flatten(&entry.elements), "one\n\ntwo");
    }

    #[test]
    fn test_leading_blanks_trimmed_interior_kept() {
        let entry = single("m =   padded   text\n");
        assert_eq!(flatten(&entry.elements), "padded   text");
    }

    #[test]
    fn test_attributes_in_order() {
        let entry = single("m = v\n    .b = one\n    .a = two\n");
        let names: Vec<_> = entry.attributes.keys().cloned().collect();
        assert_eq!(names, vec!["b", "a"]);
        let attribute = entry.attribute("a").unwrap();
        assert_eq!(attribute.entry_name, "m");
        assert_eq!(flatten(&attribute.elements), "two");
    }

    #[test]
    fn test_attribute_on_valueless_entry() {
        let entry = single("m\n    .title = hi\n");
        assert!(entry.elements.is_empty());
        assert!(entry.attribute("title").is_some());
    }

    #[test]
    fn test_duplicate_attribute_rejected() {
        let result = parse_entries(&tokenize("m = v\n    .a = x\n    .a = y\n"));
        assert!(matches!(result, Err(ftl_util::Error::Parser { .. })));
    }

    #[test]
    fn test_placeable_in_pattern() {
        let entry = single("m = Hello {$name}!\n");
        assert_eq!(entry.elements.len(), 3);
        assert!(matches!(
            &entry.elements[1],
            PatternElement::Placeable(Expression::Reference(_))
        ));
    }

    #[test]
    fn test_error_token_is_parse_error() {
        let result = parse_entries(&tokenize("@ = x\n"));
        assert!(matches!(result, Err(ftl_util::Error::Parser { .. })));
    }

    #[test]
    fn test_parse_error_carries_position() {
        let err = parse_entries(&tokenize("m = x\n@\n")).unwrap_err();
        match err {
            ftl_util::Error::Parser { range, .. } => {
                assert_eq!(range.start.line, 2);
                assert_eq!(range.start.column, 1);
            }
            other => panic!("expected parser error, got {other:?}"),
        }
    }
}
