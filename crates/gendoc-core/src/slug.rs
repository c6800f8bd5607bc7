//! Turns heading names into identifiers that are safe both as an `id`
//! attribute and inside a URL fragment.

/// Slugifies `text`: entities are decoded, quotes and URL punctuation are
/// dropped, accented Latin letters are folded to ASCII and every remaining
/// run of other characters collapses into a single `_`.
///
/// The result only ever contains `[a-z0-9_]` and never starts or ends with `_`.
pub fn slug(text: &str) -> String {
    let decoded = html_escape::decode_html_entities(text.trim());
    let mut out = String::with_capacity(decoded.len());
    let mut separator = false;
    for ch in decoded.chars() {
        let ch = ch.to_ascii_lowercase();
        if matches!(ch, '\r' | '"' | '\'' | '#' | '?' | '/' | '&' | ';') {
            continue;
        }
        let folded = if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            None
        } else {
            match transliterate(ch) {
                Some(ascii) => Some(ascii),
                None => {
                    separator = true;
                    continue;
                }
            }
        };
        if separator && !out.is_empty() {
            out.push('_');
        }
        separator = false;
        match folded {
            Some(ascii) => out.push_str(ascii),
            None => out.push(ch),
        }
    }
    out
}

fn transliterate(ch: char) -> Option<&'static str> {
    let ascii = match ch {
        'À' | 'à' | 'Á' | 'á' | 'Â' | 'â' | 'Ã' | 'ã' | 'Ä' | 'ä' | 'Å' | 'å' | 'Ā' | 'ā'
        | 'Ă' | 'ă' | 'Ą' | 'ą' | 'Ǎ' | 'ǎ' | 'Ǟ' | 'ǟ' | 'Ǡ' | 'ǡ' | 'Ǻ' | 'ǻ' | 'Ȁ' | 'ȁ'
        | 'Ȃ' | 'ȃ' | 'Ȧ' | 'ȧ' | 'Ⱥ' | 'ⱥ' => "a",
        'Æ' | 'æ' | 'Ǣ' | 'ǣ' | 'Ǽ' | 'ǽ' => "ae",
        'Ɓ' | 'ɓ' | 'Ƃ' | 'ƃ' | 'Ƅ' | 'ƅ' | 'Ƀ' | 'ƀ' => "b",
        'Ç' | 'ç' | 'Ć' | 'ć' | 'Ĉ' | 'ĉ' | 'Ċ' | 'ċ' | 'Č' | 'č' | 'Ɔ' | 'ɔ' | 'Ƈ' | 'ƈ'
        | 'Ȼ' | 'ȼ' => "c",
        'Œ' | 'œ' => "ce",
        'Ð' | 'ð' | 'Ď' | 'ď' | 'Đ' | 'đ' | 'Ɖ' | 'ɖ' | 'Ɗ' | 'ɗ' | 'Ƌ' | 'ƌ' => "d",
        'Ǆ' | 'ǆ' | 'ǅ' | 'Ǳ' | 'ǳ' | 'ǲ' => "dz",
        'È' | 'è' | 'É' | 'é' | 'Ê' | 'ê' | 'Ë' | 'ë' | 'Ē' | 'ē' | 'Ĕ' | 'ĕ' | 'Ė' | 'ė'
        | 'Ę' | 'ę' | 'Ě' | 'ě' | 'Ǝ' | 'ǝ' | 'Ə' | 'ə' | 'Ɛ' | 'ɛ' | 'Ȅ' | 'ȅ' | 'Ȇ' | 'ȇ'
        | 'Ȩ' | 'ȩ' | 'Ɇ' | 'ɇ' => "e",
        'Ƒ' | 'ƒ' => "f",
        'Ĝ' | 'ĝ' | 'Ğ' | 'ğ' | 'Ġ' | 'ġ' | 'Ģ' | 'ģ' | 'Ɠ' | 'ɠ' | 'Ǥ' | 'ǥ' | 'Ǧ' | 'ǧ'
        | 'Ǵ' | 'ǵ' => "g",
        'Ĥ' | 'ĥ' | 'Ħ' | 'ħ' | 'Ȟ' | 'ȟ' => "h",
        'Ƕ' | 'ƕ' => "hj",
        'Ì' | 'ì' | 'Í' | 'í' | 'Î' | 'î' | 'Ï' | 'ï' | 'Ĩ' | 'ĩ' | 'Ī' | 'ī' | 'Ĭ' | 'ĭ'
        | 'Į' | 'į' | 'İ' | 'Ɨ' | 'ɨ' | 'Ǐ' | 'ǐ' | 'Ȉ' | 'ȉ' | 'Ȋ' | 'ȋ' => "i",
        'Ĳ' | 'ĳ' => "ij",
        'Ĵ' | 'ĵ' | 'Ɉ' | 'ɉ' => "j",
        'Ķ' | 'ķ' | 'Ƙ' | 'ƙ' | 'Ǩ' | 'ǩ' => "k",
        'Ĺ' | 'ĺ' | 'Ļ' | 'ļ' | 'Ľ' | 'ľ' | 'Ŀ' | 'ŀ' | 'Ł' | 'ł' | 'Ɩ' | 'ɩ' | 'Ƚ' | 'ƚ' => "l",
        'Ǉ' | 'ǉ' | 'ǈ' => "lj",
        'Ñ' | 'ñ' | 'Ń' | 'ń' | 'Ņ' | 'ņ' | 'Ň' | 'ň' | 'Ŋ' | 'ŋ' | 'Ɲ' | 'ɲ' | 'Ǹ' | 'ǹ'
        | 'Ƞ' | 'ƞ' => "n",
        'Ǌ' | 'ǌ' | 'ǋ' => "nj",
        'Ò' | 'ò' | 'Ó' | 'ó' | 'Ô' | 'ô' | 'Õ' | 'õ' | 'Ö' | 'ö' | 'Ø' | 'ø' | 'Ō' | 'ō'
        | 'Ŏ' | 'ŏ' | 'Ő' | 'ő' | 'Ɵ' | 'ɵ' | 'Ơ' | 'ơ' | 'Ǒ' | 'ǒ' | 'Ǫ' | 'ǫ' | 'Ǭ' | 'ǭ'
        | 'Ǿ' | 'ǿ' | 'Ȍ' | 'ȍ' | 'Ȏ' | 'ȏ' | 'Ȣ' | 'ȣ' | 'Ȫ' | 'ȫ' | 'Ȭ' | 'ȭ' | 'Ȯ' | 'ȯ'
        | 'Ȱ' | 'ȱ' => "o",
        'Ƣ' | 'ƣ' => "oj",
        'Þ' | 'þ' | 'Ƥ' | 'ƥ' | 'Ƿ' | 'ƿ' => "p",
        'Ɋ' | 'ɋ' => "q",
        'Ŕ' | 'ŕ' | 'Ŗ' | 'ŗ' | 'Ř' | 'ř' | 'Ʀ' | 'ʀ' | 'Ȑ' | 'ȑ' | 'Ȓ' | 'ȓ' | 'Ɍ' | 'ɍ' => "r",
        'Ś' | 'ś' | 'Ŝ' | 'ŝ' | 'Ş' | 'ş' | 'Š' | 'š' | 'Ƨ' | 'ƨ' | 'Ʃ' | 'ʃ' | 'Ș' | 'ș' => "s",
        'Ţ' | 'ţ' | 'Ť' | 'ť' | 'Ŧ' | 'ŧ' | 'Ƭ' | 'ƭ' | 'Ʈ' | 'ʈ' | 'Ț' | 'ț' | 'Ⱦ' | 'ⱦ' => "t",
        'Ù' | 'ù' | 'Ú' | 'ú' | 'Û' | 'û' | 'Ü' | 'ü' | 'Ũ' | 'ũ' | 'Ū' | 'ū' | 'Ŭ' | 'ŭ'
        | 'Ů' | 'ů' | 'Ű' | 'ű' | 'Ų' | 'ų' | 'Ư' | 'ư' | 'Ʊ' | 'ʊ' | 'Ʋ' | 'ʋ' | 'Ǔ' | 'ǔ'
        | 'Ǖ' | 'ǖ' | 'Ǘ' | 'ǘ' | 'Ǚ' | 'ǚ' | 'Ǜ' | 'ǜ' | 'Ȕ' | 'ȕ' | 'Ȗ' | 'ȗ' | 'Ʉ' | 'ʉ' => "u",
        'Ŵ' | 'ŵ' | 'Ɯ' | 'ɯ' => "w",
        'Ý' | 'ý' | 'Ŷ' | 'ŷ' | 'Ÿ' | 'ÿ' | 'Ɣ' | 'ɣ' | 'Ƴ' | 'ƴ' | 'Ȳ' | 'ȳ' | 'Ɏ' | 'ɏ' => "y",
        'Ź' | 'ź' | 'Ż' | 'ż' | 'Ž' | 'ž' | 'Ƶ' | 'ƶ' | 'Ʒ' | 'ʒ' | 'Ƹ' | 'ƹ' | 'Ƽ' | 'ƽ'
        | 'Ǯ' | 'ǯ' | 'Ȝ' | 'ȝ' | 'Ȥ' | 'ȥ' => "z",
        _ => return None,
    };
    Some(ascii)
}
