//! Sentence analyzer
//!
//! Wires the tokenizer, the segmenter and the seeding chart together. The
//! rule dictionary and lexicon are shared; every call gets its own chart
//! storage, so one analyzer may serve many threads.

use std::sync::Arc;

use log::{debug, info};
use sarf_core::{
    LocatedString, Lexicon, MemoryLexicon, MergeRules, RuleDictionary, SeedingChart,
    Segmentation, Segmenter, Token, TokenChart,
};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::AnalyzerConfig;
use crate::error::{EngineError, Result};
use crate::output::{SentenceAnalysis, TokenAnalysis};
use crate::tokenizer::Tokenizer;

/// Morphological analyzer over shared resources
pub struct Analyzer {
    config: AnalyzerConfig,
    rules: Arc<RuleDictionary>,
    lexicon: Arc<dyn Lexicon>,
    merge_rules: MergeRules,
    tokenizer: Tokenizer,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("config", &self.config)
            .field("rules", &self.rules.len())
            .finish_non_exhaustive()
    }
}

impl Analyzer {
    /// Load the configured rule and lexicon files
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        let rules_path = config.resources.rules.clone().ok_or_else(|| {
            EngineError::ConfigError("no rule dictionary file configured".to_string())
        })?;
        let lexicon_path = config.resources.lexicon.clone().ok_or_else(|| {
            EngineError::ConfigError("no lexicon file configured".to_string())
        })?;

        let rules = RuleDictionary::from_file(&rules_path, &config.capacities)?;
        info!("loaded {} rules from {}", rules.len(), rules_path.display());
        let lexicon = MemoryLexicon::from_file(&lexicon_path)?;
        info!(
            "loaded {} lexicon entries ({} keys) from {}",
            lexicon.len(),
            lexicon.key_count(),
            lexicon_path.display()
        );

        Self::from_parts(Arc::new(rules), Arc::new(lexicon), config)
    }

    /// Build from resources already in memory
    pub fn from_parts(
        rules: Arc<RuleDictionary>,
        lexicon: Arc<dyn Lexicon>,
        config: AnalyzerConfig,
    ) -> Result<Self> {
        config.validate()?;
        let merge_rules = MergeRules::from_patterns(&config.merge)?;
        let tokenizer = Tokenizer::new(config.analysis.split_punctuation);
        Ok(Self {
            config,
            rules,
            lexicon,
            merge_rules,
            tokenizer,
        })
    }

    /// The configuration in use
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// The shared rule dictionary
    pub fn rules(&self) -> &RuleDictionary {
        &self.rules
    }

    /// The shared lexicon
    pub fn lexicon(&self) -> &dyn Lexicon {
        self.lexicon.as_ref()
    }

    /// Token spans of `text`, in characters
    pub fn tokenize(&self, text: &str) -> Vec<(usize, usize)> {
        self.tokenizer.tokenize(text)
    }

    /// Segment one word into candidate analyses
    pub fn analyze_word(&self, word: &str) -> Result<Segmentation> {
        let segmenter = Segmenter::new(&self.rules, self.lexicon.as_ref(), self.config.capacities);
        Ok(segmenter.analyze(word, self.config.analysis.max_results)?)
    }

    /// Run the seeding chart over a token whose analyses are already known
    pub fn analyze_token(&self, token: &Token, sentence: &LocatedString) -> Result<TokenChart> {
        let chart = SeedingChart::new(self.lexicon.as_ref(), &self.merge_rules, self.config.capacities);
        Ok(chart.process(token, sentence)?)
    }

    /// Tokenize, segment and align one sentence
    ///
    /// `base_offset` is the document offset of the sentence's first character.
    pub fn analyze_sentence(&self, text: &str, base_offset: usize) -> Result<SentenceAnalysis> {
        let sentence = LocatedString::with_base(text, base_offset);
        let spans = self.tokenize(text);
        debug!("sentence at {base_offset}: {} tokens", spans.len());

        let mut tokens = Vec::with_capacity(spans.len());
        for (start, end) in spans {
            let word = sentence.substring(start, end);
            let segmentation = self.analyze_word(&word)?;
            let token = Token::new(start, end, segmentation.entries);
            let chart = self.analyze_token(&token, &sentence)?;
            tokens.push(TokenAnalysis::from_chart(chart, segmentation.warnings));
        }

        Ok(SentenceAnalysis {
            text: text.to_string(),
            start: base_offset,
            end: base_offset + sentence.len(),
            tokens,
        })
    }

    /// Analyze independent sentences, each starting at offset 0
    pub fn analyze_batch(&self, sentences: &[&str]) -> Result<Vec<SentenceAnalysis>> {
        let items: Vec<(&str, usize)> = sentences.iter().map(|s| (*s, 0)).collect();
        self.run_all(&items)
    }

    /// Analyze a document, one sentence per line, with document offsets
    ///
    /// Blank lines are skipped; offsets count characters including newlines.
    pub fn analyze_document(&self, text: &str) -> Result<Vec<SentenceAnalysis>> {
        let mut items = Vec::new();
        let mut offset = 0;
        for line in text.split('\n') {
            let len = line.chars().count();
            let line = line.strip_suffix('\r').unwrap_or(line);
            if !line.trim().is_empty() {
                items.push((line, offset));
            }
            offset += len + 1;
        }
        self.run_all(&items)
    }

    #[cfg(feature = "parallel")]
    fn run_all(&self, items: &[(&str, usize)]) -> Result<Vec<SentenceAnalysis>> {
        items
            .par_iter()
            .map(|(text, base)| self.analyze_sentence(text, *base))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn run_all(&self, items: &[(&str, usize)]) -> Result<Vec<SentenceAnalysis>> {
        items
            .iter()
            .map(|(text, base)| self.analyze_sentence(text, *base))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sarf_core::buckwalter::to_arabic;
    use sarf_core::EntrySpec;

    fn analyzer() -> Analyzer {
        let lexicon = MemoryLexicon::new();
        for (key, cat, pos) in [("w", "Pref-Wa", "CONJ"), ("ktb", "PV", "VERB"), ("h", "Suff-h", "PRON_3MS")] {
            lexicon
                .insert(EntrySpec::new(&to_arabic(key)).category(cat).pos(pos))
                .unwrap();
        }
        let rules = RuleDictionary::parse(
            "6 A Pref-Wa B PV  A Pref-Wa C -NONE-  B PV C -NONE-  A -NONE- B PV  A -NONE- C Suff-h  B PV C Suff-h",
            &Default::default(),
        )
        .unwrap();
        Analyzer::from_parts(Arc::new(rules), Arc::new(lexicon), AnalyzerConfig::default()).unwrap()
    }

    #[test]
    fn test_analyze_word() {
        let seg = analyzer().analyze_word(&to_arabic("wktb")).unwrap();
        assert_eq!(seg.entries.len(), 1);
        assert!(seg.warnings.is_empty());
    }

    #[test]
    fn test_analyze_sentence_offsets() {
        let text = format!("{} {}", to_arabic("wktb"), to_arabic("ktbh"));
        let result = analyzer().analyze_sentence(&text, 10).unwrap();

        assert_eq!((result.start, result.end), (10, 19));
        assert_eq!(result.tokens.len(), 2);

        let first = &result.tokens[0];
        assert_eq!((first.start, first.end), (10, 14));
        let spans: Vec<(usize, usize)> = first.segments.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(spans, vec![(10, 11), (11, 14)]);

        // the pronoun suffix merges into the verb
        let second = &result.tokens[1];
        assert_eq!(second.segments.len(), 1);
        assert_eq!(second.segments[0].buckwalter, "ktbh");
        assert_eq!((second.segments[0].start, second.segments[0].end), (15, 19));
    }

    #[test]
    fn test_document_offsets_skip_blank_lines() {
        let text = format!("{}\n\n{}\n", to_arabic("ktb"), to_arabic("wktb"));
        let results = analyzer().analyze_document(&text).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].start, 0);
        assert_eq!(results[1].start, 5);
    }

    #[test]
    fn test_batch_matches_sequential() {
        let a = analyzer();
        let words = [to_arabic("wktb"), to_arabic("ktbh"), "2024".to_string()];
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();
        let batch = a.analyze_batch(&refs).unwrap();
        for (result, word) in batch.iter().zip(&refs) {
            let single = a.analyze_sentence(word, 0).unwrap();
            assert_eq!(result.segment_count(), single.segment_count());
        }
    }

    #[test]
    fn test_new_requires_resources() {
        let err = Analyzer::new(AnalyzerConfig::default()).unwrap_err();
        assert!(err.to_string().contains("rule dictionary"));
    }
}
