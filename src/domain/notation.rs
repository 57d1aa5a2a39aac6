//! Compact role-and-seniority notation for titles.
//!
//! A title held in period `p` is written as a seniority prefix followed by the
//! role token, where the prefix encodes `age = current_period - p`:
//! `FORM` (age 0), `GFORM` (1), `BFORM` (2), `OFORM` (3), `TOFORM` (4),
//! `T²OFORM` (5), `KFORM` (-1), `K³FORM` (-3).

use crate::domain::model::Title;
use crate::utils::error::{AdmError, Result};
use regex::Regex;
use std::sync::OnceLock;

const SUPERSCRIPT_DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];

const PREFIXES: [&str; 5] = ["", "G", "B", "O", "TO"];

/// Fixed role vocabulary. FU/EFU roles additionally carry a two-letter name
/// suffix and are matched by shape rather than listed here.
const ROLES: [&str; 8] = ["FORM", "NF", "INKA", "KASS", "SEKR", "CERM", "VC", "PR"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTitle {
    pub title: String,
    pub period: i32,
}

pub fn superscript(n: u32) -> String {
    n.to_string()
        .chars()
        .map(|c| SUPERSCRIPT_DIGITS[(c as u8 - b'0') as usize])
        .collect()
}

/// Seniority prefix for a title of the given age.
pub fn prefix(age: i32) -> String {
    if age < 0 {
        format!("K{}", superscript(age.unsigned_abs()))
    } else if (age as usize) < PREFIXES.len() {
        PREFIXES[age as usize].to_string()
    } else {
        format!("T{}O", superscript((age - 3) as u32))
    }
}

/// Formats a (role, period) pair as notation relative to `current_period`.
pub fn format(title: &str, period: i32, current_period: i32) -> String {
    format!("{}{}", prefix(current_period - period), title)
}

pub fn format_title(title: &Title, current_period: i32) -> String {
    format(&title.title, title.period, current_period)
}

fn grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    GRAMMAR.get_or_init(|| {
        let roles = ROLES.join("|");
        Regex::new(&format!(
            r"^(?P<prefix>(?:[KGBOT](?:[0-9]+|[⁰¹²³⁴⁵⁶⁷⁸⁹]+)?)*)(?P<role>E?FU[A-ZÆØÅ]{{2}}|{roles})$"
        ))
        .unwrap()
    })
}

fn term() -> &'static Regex {
    static TERM: OnceLock<Regex> = OnceLock::new();
    TERM.get_or_init(|| Regex::new(r"([KGBOT])([0-9]+|[⁰¹²³⁴⁵⁶⁷⁸⁹]+)?").unwrap())
}

fn parse_multiplier(s: &str) -> Result<i32> {
    let ascii: String = s
        .chars()
        .map(|c| match SUPERSCRIPT_DIGITS.iter().position(|&d| d == c) {
            Some(i) => (b'0' + i as u8) as char,
            None => c,
        })
        .collect();
    ascii
        .parse()
        .map_err(|_| AdmError::validation(format!("bad prefix multiplier {s:?}")))
}

/// Parses a notation string back into a (role, period) pair.
///
/// Prefix terms are drawn from {K, G, B, O, T} with weights -1, +1, +2, +3,
/// +1; each term may carry an integer multiplier in ASCII or superscript
/// digits. The weighted sum is the age, and `period = current_period - age`.
pub fn parse(input: &str, current_period: i32) -> Result<ParsedTitle> {
    let trimmed = input.trim();
    let caps = grammar()
        .captures(trimmed)
        .ok_or_else(|| AdmError::validation(format!("unrecognized title notation {input:?}")))?;

    let out_of_range = || AdmError::validation(format!("title prefix out of range {input:?}"));
    let mut age = 0i32;
    for t in term().captures_iter(&caps["prefix"]) {
        let weight: i32 = match &t[1] {
            "K" => -1,
            "G" => 1,
            "B" => 2,
            "O" => 3,
            "T" => 1,
            _ => unreachable!("term regex only matches KGBOT"),
        };
        let mult = match t.get(2) {
            Some(m) => parse_multiplier(m.as_str())?,
            None => 1,
        };
        age = weight
            .checked_mul(mult)
            .and_then(|term_age| age.checked_add(term_age))
            .ok_or_else(|| out_of_range())?;
    }
    let period = current_period
        .checked_sub(age)
        .ok_or_else(out_of_range)?;

    Ok(ParsedTitle {
        title: caps["role"].to_string(),
        period,
    })
}

/// Sort key for person listings.
///
/// Persons holding at least one title sort before persons without; titled
/// persons order by most-recent period first, then EFU roles, then FU roles,
/// then plain roles alphabetically. Untitled persons order by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum PersonOrderKey {
    Titled {
        /// Negated most-recent period, so ascending order is newest-first.
        period_rank: i32,
        class: u8,
        role: String,
    },
    Untitled {
        name: String,
    },
}

fn role_class(role: &str) -> u8 {
    if role.starts_with("EFU") {
        0
    } else if role.starts_with("FU") {
        1
    } else {
        2
    }
}

pub fn title_order_key(name: &str, titles: &[Title]) -> PersonOrderKey {
    let mut best: Option<(i32, u8, String)> = None;
    for t in titles {
        let cand = (-t.period, role_class(&t.title), t.title.clone());
        if best.as_ref().map_or(true, |b| cand < *b) {
            best = Some(cand);
        }
    }
    match best {
        Some((period_rank, class, role)) => PersonOrderKey::Titled {
            period_rank,
            class,
            role,
        },
        None => PersonOrderKey::Untitled {
            name: name.to_string(),
        },
    }
}
