//! CSS identifier escaping for the selector-based lookups.

/// Escapes `input` so it can be used as an identifier in a CSS selector.
///
/// `getElementById` and `getElementsByClassName` are answered with
/// `querySelector("#id")` / `querySelectorAll(".a.b")`, so ids and class
/// names must not leak selector syntax.
pub(crate) fn escape_identifier(input: &str) -> String {
	if input.is_empty() {
		return String::new();
	}

	let mut result = String::with_capacity(input.len() * 2);
	let chars: Vec<char> = input.chars().collect();

	for (i, &ch) in chars.iter().enumerate() {
		match ch {
			'\0' => result.push('\u{FFFD}'),
			'\u{0001}'..='\u{001F}' | '\u{007F}' => {
				result.push_str(&format!("\\{:x} ", ch as u32));
			}
			'0'..='9' if i == 0 => {
				result.push_str(&format!("\\{:x} ", ch as u32));
			}
			'0'..='9' if i == 1 && chars[0] == '-' => {
				result.push_str(&format!("\\{:x} ", ch as u32));
			}
			'-' if i == 0 && chars.len() == 1 => {
				result.push('\\');
				result.push(ch);
			}
			' ' | '!' | '"' | '#' | '$' | '%' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | '.'
			| '/' | ':' | ';' | '<' | '=' | '>' | '?' | '@' | '[' | '\\' | ']' | '^' | '`'
			| '{' | '|' | '}' | '~' => {
				result.push('\\');
				result.push(ch);
			}
			_ => result.push(ch),
		}
	}
	result
}

/// Builds a compound class selector (`.a.b`) from a whitespace separated list.
///
/// Returns `None` when the list holds no class names.
pub(crate) fn class_selector(names: &str) -> Option<String> {
	let selector: String = names
		.split_whitespace()
		.map(|name| format!(".{}", escape_identifier(name)))
		.collect();
	(!selector.is_empty()).then_some(selector)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("main", "main")]
	#[case("user.name", "user\\.name")]
	#[case("1st", "\\31 st")]
	#[case("-", "\\-")]
	#[case("-2x", "-\\32 x")]
	#[case("a b", "a\\ b")]
	#[case("", "")]
	fn test_escape_identifier(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(escape_identifier(input), expected);
	}

	#[rstest]
	#[case("card", Some(".card"))]
	#[case("  card   selected ", Some(".card.selected"))]
	#[case("a:b", Some(".a\\:b"))]
	#[case("   ", None)]
	fn test_class_selector(#[case] input: &str, #[case] expected: Option<&str>) {
		assert_eq!(class_selector(input).as_deref(), expected);
	}
}
