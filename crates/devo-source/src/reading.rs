//! Reading text cleanup and liturgical proclamation formatting.

use std::sync::OnceLock;

use regex_lite::Regex;
use tracing::{debug, warn};

const GENERIC_OPENING: &str = "Proclamação do Evangelho de Jesus Cristo. Glória a vós, Senhor!";
const CLOSING: &str = "Palavra da Salvação. Glória a vós, Senhor!";
const GOSPELS: [&str; 4] = ["Mateus", "Marcos", "Lucas", "João"];

/// Abbreviation to full book name.
const BOOKS: &[(&str, &str)] = &[
    ("Mt", "Mateus"),
    ("Mc", "Marcos"),
    ("Lc", "Lucas"),
    ("Jo", "João"),
    ("Gen", "Gênesis"),
    ("Gn", "Gênesis"),
    ("Ex", "Êxodo"),
    ("Lv", "Levítico"),
    ("Nm", "Números"),
    ("Dt", "Deuteronômio"),
    ("Sl", "Salmos"),
    ("Is", "Isaías"),
    ("Jr", "Jeremias"),
    ("Ez", "Ezequiel"),
    ("Dn", "Daniel"),
    ("Os", "Oséias"),
    ("Jl", "Joel"),
    ("Am", "Amós"),
    ("Ob", "Abdias"),
    ("Jn", "Jonas"),
    ("Mq", "Miquéias"),
    ("Na", "Naum"),
    ("Hc", "Habacuque"),
    ("Sf", "Sofonias"),
    ("Ag", "Ageu"),
    ("Zc", "Zacarias"),
    ("Ml", "Malaquias"),
    ("At", "Atos dos Apóstolos"),
    ("Rm", "Romanos"),
    ("1 Cor", "Primeira Coríntios"),
    ("2 Cor", "Segunda Coríntios"),
    ("Gl", "Gálatas"),
    ("Ef", "Efésios"),
    ("Fp", "Filipenses"),
    ("Cl", "Colossenses"),
    ("1 Ts", "Primeira Tessalonicenses"),
    ("2 Ts", "Segunda Tessalonicenses"),
    ("1 Tm", "Primeira Timóteo"),
    ("2 Tm", "Segunda Timóteo"),
    ("Tt", "Tito"),
    ("Fm", "Filemom"),
    ("Hb", "Hebreus"),
    ("Tg", "Tiago"),
    ("1 Pe", "Primeira Pedro"),
    ("2 Pe", "Segunda Pedro"),
    ("1 Jo", "Primeira João"),
    ("2 Jo", "Segunda João"),
    ("3 Jo", "Terceira João"),
    ("Jd", "Judas"),
    ("Ap", "Apocalipse"),
    ("1Rs", "Primeiro Reis"),
    ("2Rs", "Segundo Reis"),
];

struct CleanupPatterns {
    line_breaks: Regex,
    glued_verse: Regex,
    spaced_verse: Regex,
    dotted_verse: Regex,
    spaces: Regex,
}

fn cleanup_patterns() -> &'static CleanupPatterns {
    static PATTERNS: OnceLock<CleanupPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| CleanupPatterns {
        line_breaks: Regex::new(r"[\r\n]+").expect("valid regex"),
        glued_verse: Regex::new(r"\b\d{1,3}([A-Za-zÁ-Úá-ú])").expect("valid regex"),
        spaced_verse: Regex::new(r#"\b\d{1,3}\s+(["'A-Za-zÁ-Úá-ú])"#).expect("valid regex"),
        dotted_verse: Regex::new(r"\b\d{1,3}\.\s+").expect("valid regex"),
        spaces: Regex::new(r"\s{2,}").expect("valid regex"),
    })
}

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([1-3]?\s?[A-Za-zÁ-Úá-ú.]+)\s+(\d{1,3})\s*[,:]\s*([0-9\-–\s,]+)")
            .expect("valid regex")
    })
}

/// Strip verse numbers and line breaks from a reading.
///
/// Removes 1-3 digit numbers glued to a word (`12Jesus`), standalone before a
/// word or quote (`5 quando`), or followed by a dot (`1. Naquele`).
pub fn clean_reading_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let p = cleanup_patterns();

    let clean = p.line_breaks.replace_all(text, " ");
    let clean = clean.trim();
    let clean = p.glued_verse.replace_all(clean, "$1");
    let clean = p.spaced_verse.replace_all(&clean, "$1");
    let clean = p.dotted_verse.replace_all(&clean, "");
    let clean = p.spaces.replace_all(&clean, " ");

    clean.trim().to_string()
}

/// A parsed bible reference such as `Mt 5, 1-12`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingReference {
    /// Full book name, abbreviations expanded
    pub book: String,
    pub chapter: String,
    /// Verse range in spoken form, e.g. `1 a 12`
    pub verses: String,
}

impl ReadingReference {
    pub fn parse(reference: &str) -> Option<Self> {
        let caps = reference_pattern().captures(reference.trim())?;

        let raw_book = caps.get(1)?.as_str().trim();
        let chapter = caps.get(2)?.as_str().trim().to_string();
        let verses = caps
            .get(3)?
            .as_str()
            .trim()
            .replace(['-', '–'], " a ");

        Some(Self {
            book: expand_book(raw_book),
            chapter,
            verses,
        })
    }

    pub fn is_gospel(&self) -> bool {
        GOSPELS.contains(&self.book.as_str())
    }

    /// Spoken opening of the proclamation.
    pub fn opening(&self) -> String {
        let prefix = if self.is_gospel() { "São " } else { "" };
        format!(
            "Proclamação do Evangelho de Jesus Cristo, segundo {}{}, Capítulo {}, versículos {}. Glória a vós, Senhor!",
            prefix, self.book, self.chapter, self.verses
        )
    }
}

fn expand_book(raw: &str) -> String {
    let normalized = raw.replace('.', "");
    BOOKS
        .iter()
        .find(|(abbr, _)| *abbr == normalized || *abbr == raw)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Build the spoken reading block: proclamation opening, cleaned body and the
/// closing acclamation. Empty input yields an empty string.
pub fn format_liturgical_reading(text: &str, reference: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let body = clean_reading_text(text);
    let opening = match ReadingReference::parse(reference) {
        Some(parsed) => {
            debug!(book = %parsed.book, chapter = %parsed.chapter, "Parsed reading reference");
            parsed.opening()
        }
        None => {
            warn!(reference = %reference, "Could not parse reading reference, using generic opening");
            GENERIC_OPENING.to_string()
        }
    };

    format!("{} {} {}", opening, body, CLOSING)
}
