// File: src/core/tokenizer.rs

/// Splits ingredient text into lowercase alphabetic tokens.
///
/// Anything that isn't a letter is a separator, so quantities, units in
/// parentheses and punctuation all drop out: `"2 cups Wild-Rice"` yields
/// `cups`, `wild`, `rice`.
pub fn ingredient_tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}
