//! Splitting C identifiers into words and re-casing them.

use itertools::Itertools;

/// Iterates over words of an identifier.
///
/// Words are separated by underscores and by case changes. A run of
/// capital letters is one word (`WGPUTexture` is `WGPU`, `Texture`),
/// and digits stick to the word they follow (`Vector2D` is `Vector2`, `D`).
pub struct WordIterator<'a> {
    string: &'a str,
    index: usize,
}

impl<'a> WordIterator<'a> {
    pub fn new(string: &'a str) -> WordIterator<'a> {
        WordIterator { string, index: 0 }
    }
}

impl<'a> Iterator for WordIterator<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let bytes = self.string.as_bytes();
        while self.index < bytes.len() && bytes[self.index] == b'_' {
            self.index += 1;
        }
        if self.index >= bytes.len() {
            return None;
        }
        let start = self.index;
        let mut i = start + 1;
        while i < bytes.len() {
            let previous = bytes[i - 1];
            let current = bytes[i];
            if current == b'_' {
                break;
            }
            if current.is_ascii_uppercase() {
                if previous.is_ascii_lowercase() || previous.is_ascii_digit() {
                    break;
                }
                // "WGPUTexture": the last capital of a run starts the next word
                if previous.is_ascii_uppercase()
                    && i + 1 < bytes.len()
                    && bytes[i + 1].is_ascii_lowercase()
                {
                    break;
                }
            }
            i += 1;
        }
        self.index = i;
        Some(&self.string[start..i])
    }
}

/// Returns `word` with its first character in upper case.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Returns true if `s` contains letters and none of them is lower case.
pub fn is_screaming(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_alphabetic()) && !s.chars().any(|c| c.is_ascii_lowercase())
}

pub trait CaseOperations {
    /// `LIB_Color` -> `LIB_COLOR`, `WGPUTextureFormat` -> `WGPU_TEXTURE_FORMAT`
    fn to_screaming_snake_case(self) -> String;
}

impl<'a> CaseOperations for &'a str {
    fn to_screaming_snake_case(self) -> String {
        WordIterator::new(self).map(|x| x.to_uppercase()).join("_")
    }
}
