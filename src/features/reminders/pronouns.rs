//! Rewrites first-person possessives so reminders are spoken back to the user:
//! "take my medicine" becomes "take your medicine".

use regex::Regex;

use crate::core::Vocabulary;

#[derive(Debug, Clone)]
pub struct PronounNormalizer {
    patterns: Vec<Regex>,
    replacement: String,
}

impl PronounNormalizer {
    pub fn new(vocabulary: &Vocabulary) -> Result<Self, regex::Error> {
        let patterns = vocabulary
            .possessives
            .iter()
            .map(|word| Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word))))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            patterns,
            replacement: vocabulary.your.clone(),
        })
    }

    pub fn normalize(&self, text: &str) -> String {
        self.patterns
            .iter()
            .fold(text.to_string(), |acc, re| {
                re.replace_all(&acc, self.replacement.as_str()).into_owned()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_my_and_our_become_your() {
        let n = PronounNormalizer::new(&Vocabulary::english()).unwrap();
        assert_eq!(n.normalize("take my medicine"), "take your medicine");
        assert_eq!(n.normalize("feed our cat and my dog"), "feed your cat and your dog");
        assert_eq!(n.normalize("My dentist appointment"), "your dentist appointment");
    }

    #[test]
    fn test_only_whole_words() {
        let n = PronounNormalizer::new(&Vocabulary::english()).unwrap();
        assert_eq!(n.normalize("call myra about the tour"), "call myra about the tour");
    }

    #[test]
    fn test_arabic_vocabulary() {
        let n = PronounNormalizer::new(&Vocabulary::arabic()).unwrap();
        assert_eq!(n.normalize("موعد لي"), "موعد لك");
    }
}
