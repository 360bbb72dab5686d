//! Selector subset understood by the headless shim.
//!
//! Supported: type selectors, `*`, `#id`, `.class`, `[attr]`, `[attr=value]`
//! (quoted or bare), the descendant and `>` combinators, and comma
//! separated lists. Identifiers accept CSS escapes, hex escapes included.
//! Anything else is a syntax error.

use super::NodeRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorList(Vec<Complex>);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
	parts: Vec<Compound>,
	// combinators[i] joins parts[i] and parts[i + 1]
	combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
	tag: Option<String>,
	id: Option<String>,
	classes: Vec<String>,
	attributes: Vec<AttributeTest>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeTest {
	name: String,
	value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
	Descendant,
	Child,
}

impl SelectorList {
	pub(crate) fn parse(input: &str) -> Result<Self, String> {
		let mut parser = Parser {
			chars: input.chars().collect(),
			pos: 0,
		};
		let mut selectors = Vec::new();
		loop {
			parser.skip_whitespace();
			selectors.push(parser.complex()?);
			parser.skip_whitespace();
			match parser.peek() {
				None => break,
				Some(',') => parser.pos += 1,
				Some(c) => return Err(format!("unexpected `{}`", c)),
			}
		}
		Ok(Self(selectors))
	}

	pub(crate) fn matches(&self, node: &NodeRef) -> bool {
		node.is_element() && self.0.iter().any(|complex| complex.matches(node))
	}
}

impl Complex {
	fn matches(&self, node: &NodeRef) -> bool {
		self.matches_from(self.parts.len() - 1, node)
	}

	fn matches_from(&self, index: usize, node: &NodeRef) -> bool {
		if !self.parts[index].matches(node) {
			return false;
		}
		if index == 0 {
			return true;
		}
		match self.combinators[index - 1] {
			Combinator::Child => node
				.parent_element()
				.is_some_and(|parent| self.matches_from(index - 1, &parent)),
			Combinator::Descendant => {
				let mut ancestor = node.parent_element();
				while let Some(candidate) = ancestor {
					if self.matches_from(index - 1, &candidate) {
						return true;
					}
					ancestor = candidate.parent_element();
				}
				false
			}
		}
	}
}

impl Compound {
	fn matches(&self, node: &NodeRef) -> bool {
		let Some(tag) = node.tag() else {
			return false;
		};
		if let Some(expected) = &self.tag
			&& !expected.eq_ignore_ascii_case(&tag)
		{
			return false;
		}
		if let Some(id) = &self.id
			&& node.attribute("id").as_deref() != Some(id.as_str())
		{
			return false;
		}
		if !self.classes.is_empty() {
			let classes = node.classes();
			if !self.classes.iter().all(|class| classes.contains(class)) {
				return false;
			}
		}
		self.attributes
			.iter()
			.all(|test| match (&test.value, node.attribute(&test.name)) {
				(_, None) => false,
				(None, Some(_)) => true,
				(Some(expected), Some(actual)) => *expected == actual,
			})
	}
}

struct Parser {
	chars: Vec<char>,
	pos: usize,
}

impl Parser {
	fn peek(&self) -> Option<char> {
		self.chars.get(self.pos).copied()
	}

	fn skip_whitespace(&mut self) -> bool {
		let start = self.pos;
		while self.peek().is_some_and(char::is_whitespace) {
			self.pos += 1;
		}
		self.pos > start
	}

	fn complex(&mut self) -> Result<Complex, String> {
		let mut parts = vec![self.compound()?];
		let mut combinators = Vec::new();
		loop {
			let spaced = self.skip_whitespace();
			match self.peek() {
				None | Some(',') => break,
				Some('>') => {
					self.pos += 1;
					self.skip_whitespace();
					combinators.push(Combinator::Child);
				}
				Some(_) if spaced => combinators.push(Combinator::Descendant),
				Some(c) => return Err(format!("unexpected `{}`", c)),
			}
			parts.push(self.compound()?);
		}
		Ok(Complex { parts, combinators })
	}

	fn compound(&mut self) -> Result<Compound, String> {
		let mut compound = Compound::default();
		let mut empty = true;
		match self.peek() {
			Some('*') => {
				self.pos += 1;
				empty = false;
			}
			Some(c) if is_identifier_start(c) => {
				compound.tag = Some(self.identifier()?);
				empty = false;
			}
			_ => {}
		}
		loop {
			match self.peek() {
				Some('#') => {
					self.pos += 1;
					compound.id = Some(self.identifier()?);
				}
				Some('.') => {
					self.pos += 1;
					compound.classes.push(self.identifier()?);
				}
				Some('[') => {
					self.pos += 1;
					compound.attributes.push(self.attribute()?);
				}
				_ => break,
			}
			empty = false;
		}
		if empty {
			return Err(match self.peek() {
				Some(c) => format!("unexpected `{}`", c),
				None => "expected a selector".to_string(),
			});
		}
		Ok(compound)
	}

	fn identifier(&mut self) -> Result<String, String> {
		let mut out = String::new();
		while let Some(c) = self.peek() {
			if c == '\\' {
				self.pos += 1;
				out.push(self.escape()?);
			} else if c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
				out.push(c);
				self.pos += 1;
			} else {
				break;
			}
		}
		if out.is_empty() {
			return Err("expected an identifier".to_string());
		}
		Ok(out)
	}

	fn escape(&mut self) -> Result<char, String> {
		let mut hex = String::new();
		while hex.len() < 6 {
			match self.peek() {
				Some(c) if c.is_ascii_hexdigit() => {
					hex.push(c);
					self.pos += 1;
				}
				_ => break,
			}
		}
		if hex.is_empty() {
			let c = self.peek().ok_or_else(|| "unterminated escape".to_string())?;
			self.pos += 1;
			return Ok(c);
		}
		if self.peek().is_some_and(char::is_whitespace) {
			self.pos += 1;
		}
		let code = u32::from_str_radix(&hex, 16).map_err(|e| e.to_string())?;
		Ok(char::from_u32(code)
			.filter(|&c| c != '\0')
			.unwrap_or('\u{FFFD}'))
	}

	fn attribute(&mut self) -> Result<AttributeTest, String> {
		self.skip_whitespace();
		let name = self.identifier()?.to_ascii_lowercase();
		self.skip_whitespace();
		let value = match self.peek() {
			Some(']') => None,
			Some('=') => {
				self.pos += 1;
				self.skip_whitespace();
				Some(self.attribute_value()?)
			}
			Some(c) => return Err(format!("unsupported attribute operator `{}`", c)),
			None => return Err("unterminated attribute selector".to_string()),
		};
		self.skip_whitespace();
		if self.peek() != Some(']') {
			return Err("unterminated attribute selector".to_string());
		}
		self.pos += 1;
		Ok(AttributeTest { name, value })
	}

	fn attribute_value(&mut self) -> Result<String, String> {
		let Some(quote @ ('"' | '\'')) = self.peek() else {
			return self.identifier();
		};
		self.pos += 1;
		let mut out = String::new();
		loop {
			match self.peek() {
				None => return Err("unterminated string".to_string()),
				Some(c) if c == quote => {
					self.pos += 1;
					return Ok(out);
				}
				Some('\\') => {
					self.pos += 1;
					out.push(self.escape()?);
				}
				Some(c) => {
					out.push(c);
					self.pos += 1;
				}
			}
		}
	}
}

fn is_identifier_start(c: char) -> bool {
	c.is_alphabetic() || c == '_' || c == '-' || c == '\\' || !c.is_ascii()
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn sample() -> (NodeRef, NodeRef, NodeRef) {
		let list = NodeRef::element("ul");
		list.set_attribute("id", "menu");
		let item = NodeRef::element("li");
		item.set_attribute("class", "item selected");
		item.set_attribute("data-key", "1st");
		let link = NodeRef::element("a");
		list.append(&item);
		item.append(&link);
		(list, item, link)
	}

	#[rstest]
	#[case("li", true)]
	#[case("LI", true)]
	#[case("*", true)]
	#[case(".item", true)]
	#[case(".item.selected", true)]
	#[case(".item.missing", false)]
	#[case("#menu > li", true)]
	#[case("ul li", true)]
	#[case("ol li", false)]
	#[case("[data-key]", true)]
	#[case("[data-key='1st']", true)]
	#[case("[data-key=\"2nd\"]", false)]
	#[case("[data-key=\\31 st]", true)]
	#[case("p, li.item", true)]
	fn test_matches_item(#[case] selector: &str, #[case] expected: bool) {
		let (_list, item, _link) = sample();
		let parsed = SelectorList::parse(selector).unwrap();
		assert_eq!(parsed.matches(&item), expected);
	}

	#[rstest]
	fn test_descendant_combinator_skips_levels() {
		let (_list, _item, link) = sample();
		assert!(SelectorList::parse("#menu a").unwrap().matches(&link));
		assert!(!SelectorList::parse("#menu > a").unwrap().matches(&link));
	}

	#[rstest]
	fn test_escaped_identifiers() {
		let node = NodeRef::element("div");
		node.set_attribute("id", "user.name");
		node.set_attribute("class", "1st");
		assert!(SelectorList::parse("#user\\.name").unwrap().matches(&node));
		assert!(SelectorList::parse(".\\31 st").unwrap().matches(&node));
	}

	#[rstest]
	fn test_text_nodes_never_match() {
		assert!(!SelectorList::parse("*").unwrap().matches(&NodeRef::text("x")));
	}

	#[rstest]
	#[case("")]
	#[case("   ")]
	#[case("div >")]
	#[case("div,")]
	#[case("a:hover")]
	#[case("[data-key")]
	#[case("[data-key~=x]")]
	#[case("[data-key='x]")]
	#[case("#")]
	fn test_rejects_invalid(#[case] selector: &str) {
		assert!(SelectorList::parse(selector).is_err());
	}
}
