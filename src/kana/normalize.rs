//! Kana folding for chain-link comparison.
//!
//! Words are stored and displayed exactly as submitted; only the
//! connectivity and terminal-sound checks look at the folded form.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// ー (U+30FC), folds to the vowel of the preceding kana.
pub const PROLONGED_SOUND_MARK: char = 'ー';

/// Ending a word on this sound eliminates the player.
pub const FORBIDDEN_TERMINAL: char = 'ん';

/// Small kana → full-size counterpart.
static SMALL_TO_FULL: Lazy<HashMap<char, char>> = Lazy::new(|| {
    [
        ('ぁ', 'あ'),
        ('ぃ', 'い'),
        ('ぅ', 'う'),
        ('ぇ', 'え'),
        ('ぉ', 'お'),
        ('っ', 'つ'),
        ('ゃ', 'や'),
        ('ゅ', 'ゆ'),
        ('ょ', 'よ'),
        ('ゎ', 'わ'),
        ('ゕ', 'か'),
        ('ゖ', 'け'),
    ]
    .into_iter()
    .collect()
});

/// Digraphs typical of loanword transcriptions. Speech recognition tends to
/// emit runs of these when it mishears background noise, so words dominated
/// by them are rejected upstream in the acceptability check. Matched after
/// katakana folding, before small-kana folding.
pub static FOREIGN_DIGRAPHS: Lazy<Vec<[char; 2]>> = Lazy::new(|| {
    [
        "ふぁ", "ふぃ", "ふぇ", "ふぉ", "てぃ", "でぃ", "うぃ", "うぇ", "うぉ", "つぁ",
        "つぃ", "つぇ", "つぉ", "ちぇ", "しぇ", "じぇ", "ゔぁ", "ゔぃ", "ゔぇ", "ゔぉ",
    ]
    .iter()
    .map(|s| {
        let mut chars = s.chars();
        [
            chars.next().expect("digraph table entry"),
            chars.next().expect("digraph table entry"),
        ]
    })
    .collect()
});

/// True for the characters a submitted word may contain: hiragana,
/// katakana, and the prolonged sound mark.
pub fn is_kana(c: char) -> bool {
    matches!(c, 'ぁ'..='ゖ' | 'ァ'..='ヶ' | PROLONGED_SOUND_MARK)
}

/// Map katakana onto the corresponding hiragana; other chars pass through.
pub fn fold_katakana(c: char) -> char {
    if ('ァ'..='ヶ').contains(&c) {
        char::from_u32(c as u32 - 0x60).unwrap_or(c)
    } else {
        c
    }
}

fn fold_small(c: char) -> char {
    SMALL_TO_FULL.get(&c).copied().unwrap_or(c)
}

/// Vowel row of a full-size hiragana, used to resolve ー.
fn vowel_of(c: char) -> Option<char> {
    match c {
        'あ' | 'か' | 'が' | 'さ' | 'ざ' | 'た' | 'だ' | 'な' | 'は' | 'ば' | 'ぱ' | 'ま'
        | 'や' | 'ら' | 'わ' => Some('あ'),
        'い' | 'き' | 'ぎ' | 'し' | 'じ' | 'ち' | 'ぢ' | 'に' | 'ひ' | 'び' | 'ぴ' | 'み'
        | 'り' | 'ゐ' => Some('い'),
        'う' | 'く' | 'ぐ' | 'す' | 'ず' | 'つ' | 'づ' | 'ぬ' | 'ふ' | 'ぶ' | 'ぷ' | 'む'
        | 'ゆ' | 'る' | 'ゔ' => Some('う'),
        'え' | 'け' | 'げ' | 'せ' | 'ぜ' | 'て' | 'で' | 'ね' | 'へ' | 'べ' | 'ぺ' | 'め'
        | 'れ' | 'ゑ' => Some('え'),
        'お' | 'こ' | 'ご' | 'そ' | 'ぞ' | 'と' | 'ど' | 'の' | 'ほ' | 'ぼ' | 'ぽ' | 'も'
        | 'よ' | 'ろ' | 'を' => Some('お'),
        _ => None,
    }
}

/// Comparison form of a word: trimmed, katakana folded to hiragana, small
/// kana folded to full size, ー folded to the preceding vowel (a mark with
/// no vowel context folds away).
pub fn normalize(word: &str) -> String {
    let mut out = String::new();
    for raw in word.trim().chars() {
        let c = fold_small(fold_katakana(raw));
        if c == PROLONGED_SOUND_MARK {
            if let Some(v) = out.chars().last().and_then(vowel_of) {
                out.push(v);
            }
            continue;
        }
        out.push(c);
    }
    out
}

/// First char of the comparison form.
pub fn first_char(word: &str) -> Option<char> {
    normalize(word).chars().next()
}

/// Last char of the comparison form.
pub fn last_char(word: &str) -> Option<char> {
    normalize(word).chars().last()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn katakana_folds_to_hiragana() {
        assert_eq!(normalize("サカナ"), "さかな");
        assert_eq!(normalize("ゴリラ"), "ごりら");
    }

    #[test]
    fn small_kana_fold_to_full_size() {
        assert_eq!(normalize("でんしゃ"), "でんしや");
        assert_eq!(normalize("きっぷ"), "きつぷ");
        assert_eq!(normalize("ちょこ"), "ちよこ");
    }

    #[test]
    fn prolonged_mark_folds_to_preceding_vowel() {
        assert_eq!(normalize("ミキサー"), "みきさあ");
        assert_eq!(normalize("こーひー"), "こおひい");
        assert_eq!(normalize("スキー"), "すきい");
    }

    #[test]
    fn prolonged_mark_without_vowel_context_is_dropped() {
        assert_eq!(normalize("ー"), "");
        assert_eq!(normalize("ーす"), "す");
        assert_eq!(normalize("んー"), "ん");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(normalize("  さかな "), "さかな");
    }

    #[test]
    fn first_and_last_use_the_folded_form() {
        assert_eq!(last_char("でんしゃ"), Some('や'));
        assert_eq!(last_char("ミキサー"), Some('あ'));
        assert_eq!(first_char("っぱ"), Some('つ'));
        assert_eq!(last_char(""), None);
    }

    #[test]
    fn kana_range_check() {
        assert!(is_kana('あ'));
        assert!(is_kana('ヶ'));
        assert!(is_kana(PROLONGED_SOUND_MARK));
        assert!(!is_kana('a'));
        assert!(!is_kana('7'));
        assert!(!is_kana('犬'));
        assert!(!is_kana('\n'));
    }
}
