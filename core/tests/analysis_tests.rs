use dms_core::summarize::candidate_sentences;
use dms_core::tokenizer::is_stopword;
use dms_core::{rank_all, rank_document, AnalysisConfig, Analyzer, Document, FileType};

const ARTICLE: &str = include_str!("fixtures/article.txt");

fn doc(title: &str, content: &str, summary: &str, keywords: &str) -> Document {
    let mut d = Document::new(title, FileType::Txt, "tester");
    d.content = content.into();
    d.summary = summary.into();
    d.keywords = keywords.into();
    d
}

#[test]
fn article_summary_skips_header_and_keeps_order() {
    let summary = Analyzer::default().summarize(ARTICLE);
    assert!(summary.len() < ARTICLE.len());
    assert!(!summary.contains("Journal of Applied"));
    assert!(!summary.contains("Author:"));
    assert_eq!(summary.matches('.').count(), 4, "{summary}");

    let positions: Vec<usize> = summary
        .split_inclusive('.')
        .map(|s| ARTICLE.find(s.trim()).expect("sentence comes from the article"))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
}

#[test]
fn two_sentences_are_not_lengthened() {
    let content = "The first sentence is long enough here. The second sentence is also long enough.";
    let summary = Analyzer::default().summarize(content);
    assert!(summary.len() <= content.len());
    assert_eq!(summary, content);
}

#[test]
fn single_sentence_gets_terminal_period() {
    let summary = Analyzer::default().summarize("  A single statement without any final stop  ");
    assert_eq!(summary, "A single statement without any final stop.");
}

#[test]
fn blank_input_yields_sentinel_for_both() {
    let analyzer = Analyzer::default();
    for input in ["", "   ", "\n\t\r\n"] {
        assert_eq!(analyzer.summarize(input), "İçerik bulunamadı.");
        assert_eq!(analyzer.extract_keywords(input), "İçerik bulunamadı.");
    }
}

#[test]
fn metadata_only_content_falls_back_to_original() {
    let content = "Author: this line is long enough to be a sentence.\nAuthor: and so is this second line of text.";
    let cfg = AnalysisConfig::default();
    let sentences = candidate_sentences(content, cfg.min_sentence_chars);
    assert_eq!(sentences.len(), 2);
    assert!(Analyzer::default().summarize(content).contains("Author: this line"));
}

#[test]
fn keywords_are_bounded_and_clean() {
    let keywords = Analyzer::default().extract_keywords(ARTICLE);
    let list: Vec<&str> = keywords.split(", ").collect();
    assert!(!list.is_empty());
    assert!(list.len() <= 10);
    for kw in &list {
        assert!(kw.to_lowercase().chars().count() > 3, "{kw}");
        assert!(!is_stopword(kw), "{kw}");
    }
    assert!(list.contains(&"sentences"));
}

#[test]
fn empty_query_leaves_document_untouched() {
    let d = doc("AI Document", "Some intelligence here.", "", "");
    let r = rank_document(&d, "");
    assert_eq!(r.relevance_score, 0.0);
    assert!(r.matched_terms.is_empty());
    assert_eq!(r.highlighted_content, d.content);
}

#[test]
fn content_only_hit_scores_five() {
    let d = doc("AI Document", "This paper is about machine intelligence and its uses.", "", "");
    let r = rank_document(&d, "intelligence");
    assert_eq!(r.relevance_score, 5.0);
    assert_eq!(r.matched_terms, vec!["intelligence"]);
    assert_eq!(r.highlighted_content, "This paper is about machine <mark>intelligence</mark> and its uses.");
}

#[test]
fn matched_terms_follow_query_order() {
    let d = doc("Artificial minds", "A survey of intelligence in machines.", "", "");
    let r = rank_document(&d, "artificial intelligence artificial");
    assert_eq!(r.matched_terms, vec!["artificial", "intelligence"]);
    let r = rank_document(&d, "intelligence Artificial");
    assert_eq!(r.matched_terms, vec!["intelligence", "Artificial"]);
}

#[test]
fn rank_all_sorts_descending_and_is_stable() {
    let docs = vec![
        doc("low", "rust", "", ""),            // 5
        doc("rust high", "rust", "", "rust"),  // 27
        doc("mid rust", "", "", ""),           // 10
        doc("other", "rust", "", ""),          // 5
    ];
    let results = rank_all(&docs, "rust");
    let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["rust high", "mid rust", "low", "other"]);
    let scores: Vec<f64> = results.iter().map(|r| r.relevance_score).collect();
    assert_eq!(scores, vec![27.0, 10.0, 5.0, 5.0]);
}
