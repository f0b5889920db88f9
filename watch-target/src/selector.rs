//! Selector parsing and matching
//!
//! Supports the subset of CSS selectors a DOM-like container needs for
//! existence checks:
//!
//! - type selectors (`div`) and the universal selector (`*`)
//! - `#id`, `.class`, `[attr]`, `[attr=value]`, `[attr="value"]`
//! - descendant (`a b`) and child (`a > b`) combinators
//! - selector lists (`a, b`)
//!
//! Type and attribute names match case-insensitively.

use std::str::FromStr;

use crate::document::Element;
use crate::error::SelectorError;

/// A parsed, comma-separated list of selectors
///
/// An element matches the list when it matches any of its selectors.
///
/// # Example
///
/// ```rust
/// use watch_target::{Element, SelectorList};
///
/// let list = SelectorList::parse("ul > li.item, #footer").unwrap();
/// let ul = Element::new("ul");
/// let li = Element::new("li").with_class("item");
///
/// assert!(list.matches(&li, &[&ul]));
/// assert!(!list.matches(&li, &[]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ComplexSelector {
    /// Compound selectors from outermost to the subject
    compounds: Vec<CompoundSelector>,

    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CompoundSelector {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeSelector>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttributeSelector {
    Exists(String),
    Equals(String, String),
}

impl SelectorList {
    /// Parse a selector list
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let selectors = Parser::new(input).parse_list()?;
        Ok(Self { selectors })
    }

    /// Number of comma-separated selectors in the list
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// A parsed list always holds at least one selector
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Check `element` against the list
    ///
    /// `ancestors` runs from the outermost ancestor down to the element's parent.
    pub fn matches(&self, element: &Element, ancestors: &[&Element]) -> bool {
        self.selectors
            .iter()
            .any(|selector| selector.matches(element, ancestors))
    }

    /// Collect every element under `roots` that matches, in document order
    ///
    /// `scope` holds the ancestors of `roots` (empty for a document).
    pub fn select<'a>(&self, roots: &'a [Element], scope: &[&'a Element]) -> Vec<Element> {
        let mut ancestors: Vec<&'a Element> = scope.to_vec();
        let mut matched = Vec::new();
        self.collect(roots, &mut ancestors, &mut matched);
        matched
    }

    fn collect<'a>(
        &self,
        elements: &'a [Element],
        ancestors: &mut Vec<&'a Element>,
        matched: &mut Vec<Element>,
    ) {
        for element in elements {
            if self.matches(element, ancestors) {
                matched.push(element.clone());
            }
            ancestors.push(element);
            self.collect(element.children(), ancestors, matched);
            ancestors.pop();
        }
    }
}

impl FromStr for SelectorList {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl ComplexSelector {
    fn matches(&self, element: &Element, ancestors: &[&Element]) -> bool {
        let subject = self.compounds.len() - 1;
        self.compounds[subject].matches(element) && self.matches_ancestors(subject, ancestors)
    }

    /// Match `compounds[..index]` against the ancestor chain
    fn matches_ancestors(&self, index: usize, ancestors: &[&Element]) -> bool {
        if index == 0 {
            return true;
        }

        let compound = &self.compounds[index - 1];
        match self.combinators[index - 1] {
            Combinator::Child => match ancestors.split_last() {
                Some((parent, rest)) => {
                    compound.matches(parent) && self.matches_ancestors(index - 1, rest)
                }
                None => false,
            },
            Combinator::Descendant => (0..ancestors.len()).rev().any(|i| {
                compound.matches(ancestors[i]) && self.matches_ancestors(index - 1, &ancestors[..i])
            }),
        }
    }
}

impl CompoundSelector {
    fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if !element.tag().eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        self.ids.iter().all(|id| element.id() == Some(id.as_str()))
            && self.classes.iter().all(|class| element.has_class(class))
            && self.attributes.iter().all(|attr| attr.matches(element))
    }
}

impl AttributeSelector {
    fn matches(&self, element: &Element) -> bool {
        match self {
            AttributeSelector::Exists(name) => element.attribute(name).is_some(),
            AttributeSelector::Equals(name, value) => {
                element.attribute(name).as_deref() == Some(value.as_str())
            }
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Returns whether any whitespace was consumed
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(ch) => SelectorError::UnexpectedChar {
                ch,
                position: self.pos,
            },
            None => SelectorError::UnexpectedEnd,
        }
    }

    fn expect_close_bracket(&mut self) -> Result<(), SelectorError> {
        match self.bump() {
            Some(']') => Ok(()),
            Some(ch) => Err(SelectorError::UnexpectedChar {
                ch,
                position: self.pos - 1,
            }),
            None => Err(SelectorError::UnexpectedEnd),
        }
    }

    fn parse_list(&mut self) -> Result<Vec<ComplexSelector>, SelectorError> {
        let mut selectors = Vec::new();
        loop {
            self.skip_whitespace();
            if matches!(self.peek(), None | Some(',')) {
                return Err(SelectorError::Empty);
            }

            selectors.push(self.parse_complex()?);

            match self.bump() {
                None => return Ok(selectors),
                Some(',') => continue,
                Some(ch) => {
                    return Err(SelectorError::UnexpectedChar {
                        ch,
                        position: self.pos - 1,
                    })
                }
            }
        }
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    Combinator::Child
                }
                Some(_) if had_space => Combinator::Descendant,
                Some(_) => return Err(self.unexpected()),
            };
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }

        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let start = self.pos;
        let mut compound = CompoundSelector::default();

        match self.peek() {
            Some('*') => self.pos += 1,
            Some(c) if is_ident_char(c) => {
                compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.ids.push(self.parse_ident()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.parse_ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attributes.push(self.parse_attribute()?);
                }
                _ => break,
            }
        }

        if self.pos == start {
            return Err(self.unexpected());
        }
        Ok(compound)
    }

    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_ident_char(c)) {
            self.pos += 1;
        }

        if self.pos == start {
            return Err(match self.peek() {
                None => SelectorError::UnexpectedEnd,
                Some(_) => SelectorError::ExpectedIdent { position: start },
            });
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        match self.bump() {
            Some(']') => return Ok(AttributeSelector::Exists(name)),
            Some('=') => {}
            Some(ch) => {
                return Err(SelectorError::UnexpectedChar {
                    ch,
                    position: self.pos - 1,
                })
            }
            None => return Err(SelectorError::UnexpectedEnd),
        }

        self.skip_whitespace();
        let value = self.parse_attribute_value()?;
        self.skip_whitespace();
        self.expect_close_bracket()?;
        Ok(AttributeSelector::Equals(name, value))
    }

    fn parse_attribute_value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let start = self.pos;
                loop {
                    match self.bump() {
                        Some(c) if c == quote => {
                            return Ok(self.chars[start..self.pos - 1].iter().collect())
                        }
                        Some(_) => {}
                        None => return Err(SelectorError::UnexpectedEnd),
                    }
                }
            }
            _ => self.parse_ident(),
        }
    }
}
