//! Expression parsing: placeables, inline expressions, selects and call
//! arguments.

use indexmap::IndexMap;

use ftl_lex::TokenKind;
use ftl_util::{Result, TokenRange};

use crate::ast::{
    CallArgument, Expression, FunctionReference, NumberLiteral, NumberValue, Reference,
    ReferenceKind, SelectExpression, StringLiteral, TermReference, Variant,
};
use crate::Parser;

impl<'t> Parser<'t> {
    /// Parses the body of a placeable. The opening `{` has been consumed;
    /// this consumes everything up to and including the matching `}`.
    pub(crate) fn parse_placeable(&mut self) -> Result<Expression> {
        self.skip_newlines();
        let start = self.mark();
        let expression = self.parse_inline_expression()?;
        if self.eat(TokenKind::Arrow) {
            let select = self.parse_select(expression, start)?;
            self.expect(TokenKind::BraceClose, "to close the placeable")?;
            Ok(Expression::Select(select))
        } else {
            self.skip_newlines();
            self.expect(TokenKind::BraceClose, "to close the placeable")?;
            Ok(expression)
        }
    }

    /// Parses the variant list of a select expression; the selector and the
    /// `->` have been consumed.
    fn parse_select(&mut self, selector: Expression, start: usize) -> Result<SelectExpression> {
        let mut variants = Vec::new();
        self.skip_newlines();
        while matches!(
            self.peek_kind(),
            Some(TokenKind::Asterisk | TokenKind::BracketOpen)
        ) {
            variants.push(self.parse_variant()?);
            self.skip_newlines();
        }
        if variants.is_empty() {
            return Err(self.error_at(start, "select expression has no variants"));
        }
        let defaults = variants.iter().filter(|v| v.default).count();
        if defaults == 0 {
            return Err(self.error_at(start, "select expression has no default variant"));
        }
        if defaults > 1 {
            return Err(self.error_at(start, "select expression has more than one default variant"));
        }
        Ok(SelectExpression {
            selector: Box::new(selector),
            variants,
            range: self.range_from(start),
        })
    }

    fn parse_variant(&mut self) -> Result<Variant> {
        let start = self.mark();
        let default = self.eat(TokenKind::Asterisk);
        self.expect(TokenKind::BracketOpen, "to open the variant key")?;
        let key = self.parse_variant_key()?;
        self.expect(TokenKind::BracketClose, "to close the variant key")?;
        let elements = self.parse_pattern()?;
        Ok(Variant {
            key,
            elements,
            default,
            range: self.range_from(start),
        })
    }

    /// A variant key is an identifier or a number literal; either way it is
    /// matched by comparing its evaluated string form to the selector.
    fn parse_variant_key(&mut self) -> Result<Expression> {
        match self.peek_kind() {
            Some(TokenKind::Ident) => {
                let index = self.mark();
                let token = self.advance().unwrap();
                Ok(Expression::String(StringLiteral {
                    value: token.text.clone(),
                    range: TokenRange::point(index),
                }))
            }
            Some(TokenKind::Number) | Some(TokenKind::Minus) => self.parse_number_literal(),
            _ => Err(self.error_here("expected a variant key")),
        }
    }

    pub(crate) fn parse_inline_expression(&mut self) -> Result<Expression> {
        match self.peek_kind() {
            Some(TokenKind::Quote) => self.parse_string_literal(),
            Some(TokenKind::Number) => self.parse_number_literal(),
            Some(TokenKind::Minus) => {
                if self.nth_kind(1) == Some(TokenKind::Number) {
                    self.parse_number_literal()
                } else {
                    self.parse_term_reference()
                }
            }
            Some(TokenKind::Dollar) => {
                let start = self.mark();
                self.advance();
                let name = self
                    .expect(TokenKind::Ident, "as variable name")?
                    .text
                    .clone();
                Ok(Expression::Reference(Reference {
                    kind: ReferenceKind::Variable,
                    name,
                    attribute: None,
                    range: self.range_from(start),
                }))
            }
            Some(TokenKind::Ident) => {
                if self.nth_kind(1) == Some(TokenKind::ParenOpen) {
                    self.parse_function_reference()
                } else {
                    self.parse_message_reference()
                }
            }
            _ => Err(self.error_here("expected an expression")),
        }
    }

    fn parse_string_literal(&mut self) -> Result<Expression> {
        let start = self.mark();
        self.expect(TokenKind::Quote, "to open the string literal")?;
        let mut value = String::new();
        loop {
            match self.peek_kind() {
                Some(TokenKind::StringText) => {
                    value.push_str(&self.advance().unwrap().text);
                }
                Some(TokenKind::StringEscape) => {
                    let token = self.advance().unwrap();
                    value.push(match token.text.as_bytes()[1] {
                        b'n' => '\n',
                        b'r' => '\r',
                        b't' => '\t',
                        b'"' => '"',
                        _ => '\\',
                    });
                }
                Some(TokenKind::StringUnicode) => {
                    let index = self.mark();
                    let token = self.advance().unwrap();
                    let code = u32::from_str_radix(&token.text[2..], 16)
                        .map_err(|_| self.error_at(index, "invalid unicode escape"))?;
                    match char::from_u32(code) {
                        Some(c) => value.push(c),
                        None => {
                            return Err(self.error_at(
                                index,
                                format!("\\u{code:04X} is not a unicode scalar value"),
                            ))
                        }
                    }
                }
                Some(TokenKind::Quote) => {
                    self.advance();
                    break;
                }
                _ => return Err(self.error_here("unterminated string literal")),
            }
        }
        Ok(Expression::String(StringLiteral {
            value,
            range: self.range_from(start),
        }))
    }

    fn parse_number_literal(&mut self) -> Result<Expression> {
        let start = self.mark();
        let negative = self.eat(TokenKind::Minus);
        let token = self.expect(TokenKind::Number, "as number literal")?;
        let mut raw = token.text.clone();
        if negative {
            raw.insert(0, '-');
        }
        let value = if raw.contains('.') {
            NumberValue::Float(
                raw.parse::<f64>()
                    .map_err(|_| self.error_at(start, format!("invalid number literal {raw}")))?,
            )
        } else {
            NumberValue::Int(
                raw.parse::<i64>()
                    .map_err(|_| self.error_at(start, format!("invalid number literal {raw}")))?,
            )
        };
        Ok(Expression::Number(NumberLiteral {
            value,
            range: self.range_from(start),
        }))
    }

    /// Parses `-name`, `-name.attr`, `-name(arg: value, …)`. Term calls
    /// accept named arguments only.
    fn parse_term_reference(&mut self) -> Result<Expression> {
        let start = self.mark();
        self.expect(TokenKind::Minus, "before term name")?;
        let name = self.expect(TokenKind::Ident, "as term name")?.text.clone();
        let attribute = if self.eat(TokenKind::Dot) {
            Some(
                self.expect(TokenKind::Ident, "as attribute name")?
                    .text
                    .clone(),
            )
        } else {
            None
        };
        let mut arguments = IndexMap::new();
        if self.eat(TokenKind::ParenOpen) {
            if !self.check(TokenKind::ParenClose) {
                loop {
                    if self.check(TokenKind::Ident) && self.nth_kind(1) == Some(TokenKind::Colon) {
                        let argument_name = self.advance().unwrap().text.clone();
                        self.advance();
                        let value = self.parse_inline_expression()?;
                        arguments.insert(argument_name, value);
                    } else {
                        return Err(self.error_here(format!(
                            "term -{name} only accepts named arguments"
                        )));
                    }
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::ParenClose, "to close the argument list")?;
        }
        Ok(Expression::TermReference(TermReference {
            name,
            attribute,
            arguments,
            range: self.range_from(start),
        }))
    }

    /// Parses `NAME(arg, name: arg, …)`. Named arguments accept any inline
    /// expression.
    fn parse_function_reference(&mut self) -> Result<Expression> {
        let start = self.mark();
        let name = self
            .expect(TokenKind::Ident, "as function name")?
            .text
            .clone();
        self.expect(TokenKind::ParenOpen, "to open the argument list")?;
        let mut arguments = Vec::new();
        if !self.check(TokenKind::ParenClose) {
            loop {
                if self.check(TokenKind::Ident) && self.nth_kind(1) == Some(TokenKind::Colon) {
                    let argument_name = self.advance().unwrap().text.clone();
                    self.advance();
                    let value = self.parse_inline_expression()?;
                    arguments.push(CallArgument {
                        name: Some(argument_name),
                        value,
                    });
                } else {
                    arguments.push(CallArgument {
                        name: None,
                        value: self.parse_inline_expression()?,
                    });
                }
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::ParenClose, "to close the argument list")?;
        Ok(Expression::FunctionReference(FunctionReference {
            name,
            arguments,
            range: self.range_from(start),
        }))
    }

    /// Parses `name` or `name.attr`.
    fn parse_message_reference(&mut self) -> Result<Expression> {
        let start = self.mark();
        let name = self
            .expect(TokenKind::Ident, "as message name")?
            .text
            .clone();
        let reference = if self.eat(TokenKind::Dot) {
            let attribute = self
                .expect(TokenKind::Ident, "as attribute name")?
                .text
                .clone();
            Reference {
                kind: ReferenceKind::Attribute,
                name,
                attribute: Some(attribute),
                range: self.range_from(start),
            }
        } else {
            Reference {
                kind: ReferenceKind::Message,
                name,
                attribute: None,
                range: self.range_from(start),
            }
        };
        Ok(Expression::Reference(reference))
    }
}
