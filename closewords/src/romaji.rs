//! Kana -> romaji (Hepburn).
//!
//! Katakana is folded onto hiragana first, so both scripts read the same.
//! Two-kana combinations (`きゃ`, `しゅ`, `ふぁ`, ...) are matched before
//! single kana. `っ` doubles the following consonant (`tch` before `ch`),
//! `ん` becomes `n'` before a vowel or `y`, and the long-vowel mark `ー` is
//! kept as `-`. Anything that is not kana passes through unchanged.

use closewords_core::Romanizer;
use phf::phf_map;

static MONOGRAPHS: phf::Map<char, &'static str> = phf_map! {
    'あ' => "a", 'い' => "i", 'う' => "u", 'え' => "e", 'お' => "o",
    'か' => "ka", 'き' => "ki", 'く' => "ku", 'け' => "ke", 'こ' => "ko",
    'が' => "ga", 'ぎ' => "gi", 'ぐ' => "gu", 'げ' => "ge", 'ご' => "go",
    'さ' => "sa", 'し' => "shi", 'す' => "su", 'せ' => "se", 'そ' => "so",
    'ざ' => "za", 'じ' => "ji", 'ず' => "zu", 'ぜ' => "ze", 'ぞ' => "zo",
    'た' => "ta", 'ち' => "chi", 'つ' => "tsu", 'て' => "te", 'と' => "to",
    'だ' => "da", 'ぢ' => "ji", 'づ' => "zu", 'で' => "de", 'ど' => "do",
    'な' => "na", 'に' => "ni", 'ぬ' => "nu", 'ね' => "ne", 'の' => "no",
    'は' => "ha", 'ひ' => "hi", 'ふ' => "fu", 'へ' => "he", 'ほ' => "ho",
    'ば' => "ba", 'び' => "bi", 'ぶ' => "bu", 'べ' => "be", 'ぼ' => "bo",
    'ぱ' => "pa", 'ぴ' => "pi", 'ぷ' => "pu", 'ぺ' => "pe", 'ぽ' => "po",
    'ま' => "ma", 'み' => "mi", 'む' => "mu", 'め' => "me", 'も' => "mo",
    'や' => "ya", 'ゆ' => "yu", 'よ' => "yo",
    'ら' => "ra", 'り' => "ri", 'る' => "ru", 'れ' => "re", 'ろ' => "ro",
    'わ' => "wa", 'ゐ' => "wi", 'ゑ' => "we", 'を' => "wo", 'ん' => "n",
    'ゔ' => "vu",
    'ぁ' => "a", 'ぃ' => "i", 'ぅ' => "u", 'ぇ' => "e", 'ぉ' => "o",
    'ゃ' => "ya", 'ゅ' => "yu", 'ょ' => "yo", 'ゎ' => "wa",
    'ゕ' => "ka", 'ゖ' => "ke",
    'ー' => "-",
};

static DIGRAPHS: phf::Map<&'static str, &'static str> = phf_map! {
    "きゃ" => "kya", "きゅ" => "kyu", "きぇ" => "kye", "きょ" => "kyo",
    "ぎゃ" => "gya", "ぎゅ" => "gyu", "ぎぇ" => "gye", "ぎょ" => "gyo",
    "しゃ" => "sha", "しゅ" => "shu", "しぇ" => "she", "しょ" => "sho",
    "じゃ" => "ja", "じゅ" => "ju", "じぇ" => "je", "じょ" => "jo",
    "ちゃ" => "cha", "ちゅ" => "chu", "ちぇ" => "che", "ちょ" => "cho",
    "ぢゃ" => "ja", "ぢゅ" => "ju", "ぢぇ" => "je", "ぢょ" => "jo",
    "にゃ" => "nya", "にゅ" => "nyu", "にぇ" => "nye", "にょ" => "nyo",
    "ひゃ" => "hya", "ひゅ" => "hyu", "ひぇ" => "hye", "ひょ" => "hyo",
    "びゃ" => "bya", "びゅ" => "byu", "びぇ" => "bye", "びょ" => "byo",
    "ぴゃ" => "pya", "ぴゅ" => "pyu", "ぴぇ" => "pye", "ぴょ" => "pyo",
    "みゃ" => "mya", "みゅ" => "myu", "みぇ" => "mye", "みょ" => "myo",
    "りゃ" => "rya", "りゅ" => "ryu", "りぇ" => "rye", "りょ" => "ryo",
    "ふぁ" => "fa", "ふぃ" => "fi", "ふぇ" => "fe", "ふぉ" => "fo", "ふゅ" => "fyu",
    "てぃ" => "ti", "でぃ" => "di", "とぅ" => "tu", "どぅ" => "du",
    "でゅ" => "dyu", "てゅ" => "tyu",
    "つぁ" => "tsa", "つぃ" => "tsi", "つぇ" => "tse", "つぉ" => "tso",
    "うぃ" => "wi", "うぇ" => "we", "うぉ" => "wo",
    "ゔぁ" => "va", "ゔぃ" => "vi", "ゔぇ" => "ve", "ゔぉ" => "vo", "ゔゅ" => "vyu",
    "くぁ" => "kwa", "ぐぁ" => "gwa",
    "いぇ" => "ye",
    "すぃ" => "si", "ずぃ" => "zi",
};

const KATAKANA_OFFSET: u32 = 0x60;

/// Hepburn romanization as used for reading comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct Romaji;

impl Romaji {
    pub fn new() -> Self {
        Self
    }

    /// Romanize `text`. Non-kana characters are copied as-is.
    pub fn convert(&self, text: &str) -> String {
        let chars: Vec<char> = text.chars().map(to_hiragana).collect();
        let mut out = String::with_capacity(text.len());
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                'っ' => {
                    // doubled consonant; nothing to double at the end or before a vowel
                    if let Some((next, _)) = unit_at(&chars, i + 1) {
                        if next.starts_with("ch") {
                            out.push('t');
                        } else if let Some(c) = next.chars().next().filter(|c| is_consonant(*c)) {
                            out.push(c);
                        }
                    }
                    i += 1;
                }
                'ん' => {
                    out.push('n');
                    if let Some((next, _)) = unit_at(&chars, i + 1) {
                        if next.starts_with(|c: char| is_vowel(c) || c == 'y') {
                            out.push('\'');
                        }
                    }
                    i += 1;
                }
                c => match unit_at(&chars, i) {
                    Some((romaji, width)) => {
                        out.push_str(romaji);
                        i += width;
                    }
                    None => {
                        out.push(c);
                        i += 1;
                    }
                },
            }
        }
        out
    }
}

impl Romanizer for Romaji {
    fn to_phonetic_latin(&self, text: &str) -> String {
        self.convert(text)
    }
}

/// Romaji for the kana unit starting at `i` and how many chars it spans.
fn unit_at(chars: &[char], i: usize) -> Option<(&'static str, usize)> {
    let first = *chars.get(i)?;
    if let Some(&second) = chars.get(i + 1) {
        let mut pair = String::with_capacity(6);
        pair.push(first);
        pair.push(second);
        if let Some(romaji) = DIGRAPHS.get(pair.as_str()) {
            return Some((*romaji, 2));
        }
    }
    MONOGRAPHS.get(&first).map(|romaji| (*romaji, 1))
}

fn to_hiragana(c: char) -> char {
    match c {
        'ァ'..='ヶ' => char::from_u32(c as u32 - KATAKANA_OFFSET).unwrap_or(c),
        _ => c,
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'i' | 'u' | 'e' | 'o')
}

fn is_consonant(c: char) -> bool {
    c.is_ascii_lowercase() && !is_vowel(c) && c != 'n'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(text: &str) -> String {
        Romaji.convert(text)
    }

    #[test]
    fn plain_syllables() {
        assert_eq!(r("ねこ"), "neko");
        assert_eq!(r("いぬ"), "inu");
        assert_eq!(r("しちつふ"), "shichitsufu");
    }

    #[test]
    fn katakana_reads_like_hiragana() {
        assert_eq!(r("トウキョウ"), "toukyou");
        assert_eq!(r("ネコ"), r("ねこ"));
        assert_eq!(r("ヴァイオリン"), "vaiorin");
    }

    #[test]
    fn digraphs_and_extended_kana() {
        assert_eq!(r("きょう"), "kyou");
        assert_eq!(r("しゃしん"), "shashin");
        assert_eq!(r("じゅう"), "juu");
        assert_eq!(r("ファイル"), "fairu");
        assert_eq!(r("パーティー"), "pa-ti-");
    }

    #[test]
    fn sokuon_doubles_the_next_consonant() {
        assert_eq!(r("がっこう"), "gakkou");
        assert_eq!(r("まっちゃ"), "matcha");
        assert_eq!(r("ざっし"), "zasshi");
        assert_eq!(r("あっ"), "a");
    }

    #[test]
    fn syllabic_n() {
        assert_eq!(r("こんにちは"), "konnichiha");
        assert_eq!(r("きんようび"), "kin'youbi");
        assert_eq!(r("れんあい"), "ren'ai");
        assert_eq!(r("ほん"), "hon");
    }

    #[test]
    fn long_vowel_mark_and_passthrough() {
        assert_eq!(r("ラーメン"), "ra-men");
        assert_eq!(r("cat"), "cat");
        assert_eq!(r("東京"), "東京");
        assert_eq!(r(""), "");
    }
}
