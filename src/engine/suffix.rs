//! Naive suffix-stripping analyzer.
//!
//! Walks a word from the end, removing suffixes by rule without checking
//! part of speech or lemma. Good enough as a backup analyzer for
//! out-of-vocabulary words; the tags it produces are rendered in the same
//! HFST-style notation as the primary analyzer's output.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::consts::DEFAULT_MAX_STRIPS;
use crate::engine::{Engine, TextAnalysis};

const VERSION: &str = "0.4.0-naive";

/// One surface form of a suffix, expanded from a rule's form list.
#[derive(Debug, Clone)]
struct Affix {
    surface: String,
    tag: String,
    repeatable: bool,
    order: i32,
}

/// A rule as written in the JSON rule file: several surface forms sharing
/// one tag.
#[derive(Debug, Clone, Deserialize)]
pub struct AffixRule {
    pub forms: Vec<String>,
    pub tag: String,
    #[serde(default)]
    pub repeatable: bool,
    #[serde(default = "default_order")]
    pub order: i32,
}

fn default_order() -> i32 {
    100
}

#[derive(Debug, Deserialize)]
pub struct RuleSet {
    pub rules: Vec<AffixRule>,
    pub max_strips: Option<usize>,
}

/// A single naive reading: remaining stem, collected tags, and the
/// suffixes removed to get there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub stem: String,
    pub tags: Vec<String>,
    pub removed: Vec<String>,
}

impl Analysis {
    /// Render in HFST-style notation so output resembles the primary
    /// analyzer: nominal lemma assumed, nominative when no case affix.
    pub fn to_hfst(&self) -> String {
        let mut features = vec!["N".to_string()];

        let mut plural = false;
        let mut possessive = None;
        let mut case = None;
        let mut particle_da = false;

        for tag in &self.tags {
            if tag == "Number=Plur" {
                plural = true;
            } else if let Some(rendered) = possessive_feature(tag) {
                possessive = Some(rendered);
            } else if let Some(rendered) = case_feature(tag) {
                case = Some(rendered);
            } else if tag == "Part=DA" {
                particle_da = true;
            }
        }

        features.push(if plural { "PL(ЛАр)" } else { "Sg" }.to_string());
        if let Some(poss) = possessive {
            features.push(poss.to_string());
        }
        features.push(case.unwrap_or("Nom").to_string());
        if particle_da {
            features.push("PART(ДА)".to_string());
        }

        format!("{}+{}", self.stem, features.join("+"))
    }
}

fn case_feature(tag: &str) -> Option<&'static str> {
    match tag {
        "Case=Dat" => Some("DIR(ГА)"),
        "Case=Loc" => Some("LOC(ДА)"),
        "Case=Abl" => Some("ABL(ДАн)"),
        "Case=Gen" => Some("GEN(нЫң)"),
        "Case=Acc" => Some("ACC(нЫ)"),
        _ => None,
    }
}

fn possessive_feature(tag: &str) -> Option<&'static str> {
    match tag {
        "Poss=1Sg" => Some("POSS_1SG(Ым)"),
        "Poss=2Sg" => Some("POSS_2SG(Ың)"),
        "Poss=3Sg" => Some("POSS_3(СЫ)"),
        "Poss=1Pl" => Some("POSS_1PL(ЫбЫз)"),
        "Poss=2Pl" => Some("POSS_2PL(ЫгЫз)"),
        _ => None,
    }
}

struct SearchState {
    word: String,
    tags: Vec<String>,
    removed: Vec<String>,
    used_tags: HashMap<String, usize>,
    strips: usize,
}

/// Rule-driven suffix stripper with a backtracking search.
pub struct SuffixAnalyzer {
    affixes: Vec<Affix>,
    max_strips: usize,
}

impl SuffixAnalyzer {
    /// Built-in rule set: basic cases, plural, the -да/-дә particle, a few
    /// possessives and verbal suffixes.
    pub fn default_tatar(max_strips: usize) -> Self {
        const ORD_VERB: i32 = 5;
        const ORD_CASE: i32 = 10;
        const ORD_NUM: i32 = 20;
        const ORD_POSS: i32 = 30;
        const ORD_PART: i32 = 40;

        let rules = vec![
            rule(&["ган", "кән", "гән", "кан"], "VForm=PartPast", false, ORD_VERB),
            rule(&["ды", "де", "ты", "те"], "Tense=Past", false, ORD_VERB),
            rule(&["гач", "гәч", "кач", "кәч"], "Converb=After", false, ORD_VERB),
            rule(&["са", "сә"], "Mood=Cnd", false, ORD_VERB),
            rule(
                &["ганчы", "гәнче", "канчы", "кәнче"],
                "Converb=Until",
                false,
                ORD_VERB,
            ),
            rule(&["чы", "че"], "Converb=While", false, ORD_VERB),
            rule(&["чы", "че"], "Mood=PoliteReq", false, ORD_VERB),
            rule(&["ачак", "әчәк", "чак", "чәк"], "Tense=Fut", false, ORD_VERB),
            rule(&["ыр", "ер", "р"], "Tense=FutSimple", false, ORD_VERB),
            rule(&["магае", "мәгәе"], "Mood=NegWish", false, ORD_VERB),
            rule(&["сын", "сен"], "Mood=Imp3", false, ORD_VERB),
            rule(&["гере", "гыры"], "Mood=Necess", false, ORD_VERB),
            rule(&["га", "кә", "ка", "гә"], "Case=Dat", false, ORD_CASE),
            rule(&["да", "дә"], "Case=Loc", false, ORD_CASE),
            rule(&["дан", "дән", "тан", "тән"], "Case=Abl", false, ORD_CASE),
            rule(&["ның", "нең"], "Case=Gen", false, ORD_CASE),
            rule(&["ны", "не"], "Case=Acc", false, ORD_CASE),
            rule(&["лар", "ләр"], "Number=Plur", false, ORD_NUM),
            rule(&["ым", "ем"], "Poss=1Sg", false, ORD_POSS),
            rule(&["ың", "ең"], "Poss=2Sg", false, ORD_POSS),
            rule(&["ы", "е", "сы", "се"], "Poss=3Sg", false, ORD_POSS),
            rule(&["ыбыз", "ебез", "сыбыз", "себез"], "Poss=1Pl", false, ORD_POSS),
            rule(&["ыгыз", "егез", "сигез", "сегез"], "Poss=2Pl", false, ORD_POSS),
            // Particle -да/-дә is a homonym of LOC and may attach after a
            // case suffix, so it is the one repeatable rule.
            rule(&["да", "дә"], "Part=DA", true, ORD_PART),
        ];

        Self::from_rules(rules, max_strips)
    }

    /// Build from explicit rules. Empty rule lists fall back to the
    /// built-in set.
    pub fn from_rules(rules: Vec<AffixRule>, max_strips: usize) -> Self {
        if rules.is_empty() {
            return Self::default_tatar(max_strips);
        }
        let mut affixes: Vec<Affix> = rules
            .into_iter()
            .flat_map(|r| {
                let AffixRule {
                    forms,
                    tag,
                    repeatable,
                    order,
                } = r;
                forms.into_iter().map(move |surface| Affix {
                    surface,
                    tag: tag.clone(),
                    repeatable,
                    order,
                })
            })
            .collect();
        // Lower order strips first; within an order, longer surfaces win.
        affixes.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then(b.surface.chars().count().cmp(&a.surface.chars().count()))
        });
        Self { affixes, max_strips }
    }

    pub fn from_json(json: &str, default_max_strips: usize) -> Result<Self> {
        let rule_set: RuleSet =
            serde_json::from_str(json).context("failed to parse suffix rule set")?;
        let max_strips = rule_set.max_strips.unwrap_or(default_max_strips);
        Ok(Self::from_rules(rule_set.rules, max_strips))
    }

    pub fn from_file(path: &Path, default_max_strips: usize) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read rule file {}", path.display()))?;
        Self::from_json(&json, default_max_strips)
    }

    /// All naive readings of a token, deduplicated by stem and tag chain.
    pub fn analyze(&self, token: &str) -> Vec<Analysis> {
        let word = normalize(token);
        if word.is_empty() {
            return vec![Analysis {
                stem: token.to_string(),
                tags: Vec::new(),
                removed: Vec::new(),
            }];
        }

        let mut results = Vec::new();
        let mut stack = vec![SearchState {
            word,
            tags: Vec::new(),
            removed: Vec::new(),
            used_tags: HashMap::new(),
            strips: 0,
        }];

        while let Some(state) = stack.pop() {
            let mut stripped = false;

            for affix in &self.affixes {
                if state.strips >= self.max_strips {
                    break;
                }
                let word_len = state.word.chars().count();
                let affix_len = affix.surface.chars().count();
                if word_len <= affix_len {
                    continue;
                }
                let Some(stem) = state.word.strip_suffix(&affix.surface) else {
                    continue;
                };
                let used = state.used_tags.get(&affix.tag).copied().unwrap_or(0);
                if !affix.repeatable && used > 0 {
                    continue;
                }
                // Do not strip a word down to a single letter.
                if stem.chars().count() < 2 {
                    continue;
                }

                let mut tags = state.tags.clone();
                tags.push(affix.tag.clone());
                let mut removed = state.removed.clone();
                removed.push(affix.surface.clone());
                let mut used_tags = state.used_tags.clone();
                used_tags.insert(affix.tag.clone(), used + 1);

                stack.push(SearchState {
                    word: stem.to_string(),
                    tags,
                    removed,
                    used_tags,
                    strips: state.strips + 1,
                });
                stripped = true;
            }

            if !stripped {
                results.push(Analysis {
                    stem: state.word,
                    tags: state.tags,
                    removed: state.removed,
                });
            }
        }

        dedup(results)
    }
}

fn dedup(analyses: Vec<Analysis>) -> Vec<Analysis> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for analysis in analyses {
        let key = format!("{}|{}", analysis.stem, analysis.tags.join("+"));
        if !seen.contains(&key) {
            seen.push(key);
            out.push(analysis);
        }
    }
    out
}

fn rule(forms: &[&str], tag: &str, repeatable: bool, order: i32) -> AffixRule {
    AffixRule {
        forms: forms.iter().map(|f| (*f).to_string()).collect(),
        tag: tag.to_string(),
        repeatable,
        order,
    }
}

/// Lowercase, fold ё to е, and trim non-letters from both ends.
fn normalize(word: &str) -> String {
    let lowered = word.to_lowercase().replace('ё', "е");
    lowered
        .trim()
        .trim_matches(|c: char| !c.is_alphabetic())
        .to_string()
}

/// The naive analyzer as a bridge engine. The token tag is the first
/// reading in HFST notation; text is segmented on whitespace and
/// sentence-final punctuation.
pub struct SuffixEngine {
    analyzer: SuffixAnalyzer,
}

impl SuffixEngine {
    pub fn new(analyzer: SuffixAnalyzer) -> Result<Self> {
        crate::engine::validate_entry_points()?;
        Ok(Self { analyzer })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(SuffixAnalyzer::default_tatar(DEFAULT_MAX_STRIPS))
    }

    fn tag_for(&self, token: &str) -> String {
        self.analyzer
            .analyze(token)
            .first()
            .map(Analysis::to_hfst)
            .unwrap_or_else(|| format!("{token}+N+Sg+Nom"))
    }
}

#[async_trait::async_trait]
impl Engine for SuffixEngine {
    fn version(&self) -> &str {
        VERSION
    }

    async fn analyse(&self, token: &str) -> Result<Value> {
        Ok(Value::String(self.tag_for(token)))
    }

    async fn analyse_text(&self, text: &str) -> Result<TextAnalysis> {
        let mut sentences: Vec<Value> = Vec::new();
        let mut current: Vec<Value> = Vec::new();
        let mut tokens_count = 0;
        let mut unique: Vec<String> = Vec::new();

        for word in text.split_whitespace() {
            tokens_count += 1;
            let lowered = word.to_lowercase();
            if !unique.contains(&lowered) {
                unique.push(lowered);
            }
            current.push(json!([word, self.tag_for(word)]));
            if word.ends_with(['.', '!', '?', '…']) {
                sentences.push(Value::Array(std::mem::take(&mut current)));
            }
        }
        if !current.is_empty() {
            sentences.push(Value::Array(current));
        }

        Ok(TextAnalysis {
            tokens_count,
            unique_tokens_count: unique.len(),
            sentences_count: sentences.len(),
            sentences,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::ensure_getargspec;

    fn analyzer() -> SuffixAnalyzer {
        SuffixAnalyzer::default_tatar(DEFAULT_MAX_STRIPS)
    }

    fn has_reading(readings: &[Analysis], stem: &str, tags: &[&str]) -> bool {
        readings
            .iter()
            .any(|a| a.stem == stem && a.tags == tags)
    }

    #[test]
    fn dative_is_stripped() {
        let readings = analyzer().analyze("татарчага");
        assert!(has_reading(&readings, "татарча", &["Case=Dat"]));
    }

    #[test]
    fn plural_ablative_chain() {
        let readings = analyzer().analyze("китаплардан");
        assert!(has_reading(
            &readings,
            "китап",
            &["Case=Abl", "Number=Plur"]
        ));
    }

    #[test]
    fn plural_locative_chain() {
        let readings = analyzer().analyze("мәктәпләрдә");
        assert!(has_reading(
            &readings,
            "мәктәп",
            &["Case=Loc", "Number=Plur"]
        ));
    }

    #[test]
    fn locative_particle_homonymy() {
        // казандада: locative plus the clitic -да.
        let readings = analyzer().analyze("казандада");
        assert!(readings.iter().any(|a| a.tags.contains(&"Part=DA".to_string())));
    }

    #[test]
    fn non_repeatable_tag_applies_once() {
        for analysis in analyzer().analyze("казандада") {
            let loc_count = analysis.tags.iter().filter(|t| *t == "Case=Loc").count();
            assert!(loc_count <= 1);
        }
    }

    #[test]
    fn stems_are_never_single_letters() {
        for analysis in analyzer().analyze("алардан") {
            assert!(analysis.stem.chars().count() >= 2);
        }
    }

    #[test]
    fn strip_count_is_bounded() {
        let bounded = SuffixAnalyzer::default_tatar(1);
        for analysis in bounded.analyze("китаплардан") {
            assert!(analysis.removed.len() <= 1);
        }
    }

    #[test]
    fn normalize_lowercases_and_trims_punctuation() {
        assert_eq!(normalize("Казанда,"), "казанда");
        assert_eq!(normalize("«сүз»"), "сүз");
        assert_eq!(normalize("123"), "");
    }

    #[test]
    fn empty_token_yields_identity_reading() {
        let readings = analyzer().analyze("!!");
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].stem, "!!");
        assert!(readings[0].tags.is_empty());
    }

    #[test]
    fn hfst_rendering() {
        let analysis = Analysis {
            stem: "китап".to_string(),
            tags: vec!["Case=Abl".to_string(), "Number=Plur".to_string()],
            removed: vec!["дан".to_string(), "лар".to_string()],
        };
        assert_eq!(analysis.to_hfst(), "китап+N+PL(ЛАр)+ABL(ДАн)");
    }

    #[test]
    fn hfst_defaults_to_nominative_singular() {
        let analysis = Analysis {
            stem: "сүз".to_string(),
            tags: Vec::new(),
            removed: Vec::new(),
        };
        assert_eq!(analysis.to_hfst(), "сүз+N+Sg+Nom");
    }

    #[test]
    fn rule_set_parses_from_json() {
        let analyzer = SuffixAnalyzer::from_json(
            r#"{"rules":[{"forms":["да","дә"],"tag":"Case=Loc"}],"max_strips":2}"#,
            DEFAULT_MAX_STRIPS,
        )
        .unwrap();
        let readings = analyzer.analyze("казанда");
        assert!(has_reading(&readings, "казан", &["Case=Loc"]));
    }

    #[test]
    fn empty_rule_set_falls_back_to_builtin() {
        let analyzer = SuffixAnalyzer::from_json(r#"{"rules":[]}"#, DEFAULT_MAX_STRIPS).unwrap();
        let readings = analyzer.analyze("татарчага");
        assert!(has_reading(&readings, "татарча", &["Case=Dat"]));
    }

    #[tokio::test]
    async fn suffix_engine_tags_and_segments() {
        ensure_getargspec();
        let engine = SuffixEngine::with_defaults().unwrap();
        let tag = engine.analyse("китаплардан").await.unwrap();
        assert!(tag.as_str().unwrap().starts_with("китап"));

        let analysis = engine
            .analyse_text("Мин китап укыйм. Син дә укы!")
            .await
            .unwrap();
        assert_eq!(analysis.tokens_count, 6);
        assert_eq!(analysis.sentences_count, 2);
        assert_eq!(analysis.sentences.len(), 2);
    }
}
