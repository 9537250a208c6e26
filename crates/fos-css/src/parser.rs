//! Selector Parser
//!
//! Turns selector text such as `ul > li.item:nth-child(2n+1), #main a[href^="http"]`
//! into a [`SelectorList`].

use crate::selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    NthExpression, PseudoClass, SelectorComponent, SelectorList,
};
use crate::CssError;

/// Parse a comma-separated selector group
pub fn parse_selector_list(input: &str) -> Result<SelectorList, CssError> {
    SelectorParser::new(input).parse()
}

/// Recursive-descent selector parser
pub struct SelectorParser<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> SelectorParser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    /// Parse the whole input as a selector list
    pub fn parse(mut self) -> Result<SelectorList, CssError> {
        self.skip_whitespace();
        if self.at_end() {
            return Err(self.error("empty selector"));
        }

        let mut list = Vec::new();
        loop {
            list.push(self.parse_complex()?);
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some(',') => {
                    self.pos += 1;
                    self.skip_whitespace();
                }
                Some(c) => return Err(self.error(&format!("unexpected '{}'", c))),
            }
        }

        tracing::trace!(selector = self.input, count = list.len(), "parsed selector list");
        Ok(SelectorList(list))
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, CssError> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') | Some(')') => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(_) if had_space => Combinator::Descendant,
                Some(c) => return Err(self.error(&format!("unexpected '{}'", c))),
            };
            if combinator != Combinator::Descendant {
                self.pos += 1;
                self.skip_whitespace();
            }
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }

        Ok(ComplexSelector { compounds, combinators })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, CssError> {
        let mut compound = Vec::new();

        match self.peek() {
            Some('*') => {
                self.pos += 1;
                compound.push(SelectorComponent::Universal);
            }
            Some(c) if is_ident_start(c) => {
                let tag = self.parse_ident()?;
                compound.push(SelectorComponent::Type(tag.to_ascii_lowercase()));
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.push(SelectorComponent::Id(self.parse_ident()?));
                }
                Some('.') => {
                    self.pos += 1;
                    compound.push(SelectorComponent::Class(self.parse_ident()?));
                }
                Some('[') => {
                    self.pos += 1;
                    compound.push(SelectorComponent::Attribute(self.parse_attribute()?));
                }
                Some(':') => {
                    self.pos += 1;
                    if self.peek() == Some(':') {
                        return Err(self.error("pseudo-elements never match elements"));
                    }
                    compound.push(SelectorComponent::PseudoClass(self.parse_pseudo_class()?));
                }
                _ => break,
            }
        }

        if compound.is_empty() {
            return Err(match self.peek() {
                Some(c) => self.error(&format!("expected selector, found '{}'", c)),
                None => self.error("expected selector"),
            });
        }
        Ok(compound)
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector, CssError> {
        self.skip_whitespace();
        let name = self.parse_ident()?;
        self.skip_whitespace();

        let op = match self.peek() {
            Some(']') => {
                self.pos += 1;
                return Ok(AttributeSelector { name, matcher: None, case_insensitive: false });
            }
            Some('=') => {
                self.pos += 1;
                '='
            }
            Some(c @ ('~' | '|' | '^' | '$' | '*')) if self.peek_at(1) == Some('=') => {
                self.pos += 2;
                c
            }
            _ => return Err(self.error("malformed attribute selector")),
        };

        self.skip_whitespace();
        let value = match self.peek() {
            Some(q @ ('"' | '\'')) => self.parse_string(q)?,
            _ => self.parse_ident()?,
        };
        self.skip_whitespace();

        let mut case_insensitive = false;
        if let Some('i' | 'I') = self.peek() {
            self.pos += 1;
            case_insensitive = true;
            self.skip_whitespace();
        } else if let Some('s' | 'S') = self.peek() {
            self.pos += 1;
            self.skip_whitespace();
        }

        if self.peek() != Some(']') {
            return Err(self.error("expected ']'"));
        }
        self.pos += 1;

        let matcher = match op {
            '=' => AttributeMatcher::Exact(value),
            '~' => AttributeMatcher::Contains(value),
            '|' => AttributeMatcher::DashMatch(value),
            '^' => AttributeMatcher::Prefix(value),
            '$' => AttributeMatcher::Suffix(value),
            _ => AttributeMatcher::Substring(value),
        };
        Ok(AttributeSelector { name, matcher: Some(matcher), case_insensitive })
    }

    fn parse_pseudo_class(&mut self) -> Result<PseudoClass, CssError> {
        let name = self.parse_ident()?.to_ascii_lowercase();

        if self.peek() != Some('(') {
            return PseudoClass::from_name(&name)
                .ok_or_else(|| self.error(&format!("unknown pseudo-class ':{}'", name)));
        }
        self.pos += 1;

        let pseudo = match name.as_str() {
            "not" | "is" | "where" => {
                let list = self.parse_compound_list()?;
                match name.as_str() {
                    "not" => PseudoClass::Not(list),
                    "is" => PseudoClass::Is(list),
                    _ => PseudoClass::Where(list),
                }
            }
            "nth-child" | "nth-last-child" | "nth-of-type" | "nth-last-of-type" => {
                let arg = self.take_until_close_paren()?;
                let expr = NthExpression::parse(&arg)
                    .ok_or_else(|| self.error(&format!("invalid nth expression '{}'", arg)))?;
                match name.as_str() {
                    "nth-child" => PseudoClass::NthChild(expr),
                    "nth-last-child" => PseudoClass::NthLastChild(expr),
                    "nth-of-type" => PseudoClass::NthOfType(expr),
                    _ => PseudoClass::NthLastOfType(expr),
                }
            }
            _ => return Err(self.error(&format!("unknown functional pseudo-class ':{}()'", name))),
        };

        self.skip_whitespace();
        if self.peek() != Some(')') {
            return Err(self.error("expected ')'"));
        }
        self.pos += 1;
        Ok(pseudo)
    }

    fn parse_compound_list(&mut self) -> Result<Vec<CompoundSelector>, CssError> {
        let mut list = Vec::new();
        loop {
            self.skip_whitespace();
            list.push(self.parse_compound()?);
            self.skip_whitespace();
            if self.peek() == Some(',') {
                self.pos += 1;
            } else {
                return Ok(list);
            }
        }
    }

    fn take_until_close_paren(&mut self) -> Result<String, CssError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == ')' {
                return Ok(self.chars[start..self.pos].iter().collect());
            }
            self.pos += 1;
        }
        Err(self.error("unterminated '('"))
    }

    fn parse_ident(&mut self) -> Result<String, CssError> {
        let mut ident = String::new();

        if self.peek() == Some('-') {
            ident.push('-');
            self.pos += 1;
        }

        while let Some(c) = self.peek() {
            if c == '\\' {
                let escaped = self.peek_at(1).ok_or_else(|| self.error("dangling escape"))?;
                ident.push(escaped);
                self.pos += 2;
            } else if is_ident_char(c) {
                ident.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }

        if ident.is_empty() || ident == "-" {
            return Err(self.error("expected identifier"));
        }
        Ok(ident)
    }

    fn parse_string(&mut self, quote: char) -> Result<String, CssError> {
        self.pos += 1;
        let mut value = String::new();
        while let Some(c) = self.peek() {
            self.pos += 1;
            match c {
                '\\' => {
                    if let Some(escaped) = self.peek() {
                        value.push(escaped);
                        self.pos += 1;
                    }
                }
                c if c == quote => return Ok(value),
                c => value.push(c),
            }
        }
        Err(self.error("unterminated string"))
    }

    /// Skip whitespace, returning whether any was consumed
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos != start
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn error(&self, message: &str) -> CssError {
        CssError::InvalidSelector {
            selector: self.input.to_string(),
            position: self.pos,
            message: message.to_string(),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || c == '\\' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}
