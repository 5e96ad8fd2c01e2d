use regex::Regex;

/// Maximum number of characters kept after cleaning.
///
/// Longer corpora are truncated; training time grows linearly with
/// corpus length and quality gains flatten out well before this point.
pub const MAX_CORPUS_LEN: usize = 500_000;

/// Normalizes a raw corpus into the character set the model trains on.
///
/// # Behavior
/// - Collapses whitespace runs into single spaces
/// - Strips markup tags (`<...>`)
/// - Drops every character outside `[a-zA-Z0-9.,!?'"- ]`
/// - Lowercases the result
/// - Truncates to `MAX_CORPUS_LEN` characters
///
/// The output is deterministic for a given input and safe to feed
/// directly to `Vocabulary::build`.
pub fn clean(text: &str) -> String {
	// Fixed patterns. Should not panic.
	let whitespace = Regex::new(r"\s+").unwrap();
	let tags = Regex::new(r"<[^>]*>").unwrap();

	let text = whitespace.replace_all(text, " ");
	let text = tags.replace_all(&text, "");

	let cleaned: String = text
		.chars()
		.filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | ',' | '!' | '?' | '\'' | '"' | '-' | ' '))
		.flat_map(char::to_lowercase)
		.collect();

	if cleaned.chars().count() > MAX_CORPUS_LEN {
		cleaned.chars().take(MAX_CORPUS_LEN).collect()
	} else {
		cleaned
	}
}
