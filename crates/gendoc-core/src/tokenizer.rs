//! Best-effort lexical classification of code listings. This is not a lexer
//! for any real language: rule families are tried in a fixed priority order
//! and whatever is left over becomes a value token.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::rules::RuleSet;

static HIGHLIGHT_MARKER: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"\A</?h[lm]>")
        .case_insensitive(true)
        .build()
        .expect("valid highlight marker regex")
});

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Plain,
    Comment,
    Pseudo,
    Operator,
    Number,
    String,
    Type,
    Keyword,
    Value,
    Function,
}

impl TokenKind {
    /// Suffix of the `hl_` CSS class, `None` for unstyled text.
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            TokenKind::Plain => None,
            TokenKind::Comment => Some("c"),
            TokenKind::Pseudo => Some("p"),
            TokenKind::Operator => Some("o"),
            TokenKind::Number => Some("n"),
            TokenKind::String => Some("s"),
            TokenKind::Type => Some("t"),
            TokenKind::Keyword => Some("k"),
            TokenKind::Value => Some("v"),
            TokenKind::Function => Some("f"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    fn new(kind: TokenKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
        }
    }
}

#[derive(Default)]
struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    fn last_kind(&self) -> Option<TokenKind> {
        self.tokens.last().map(|t| t.kind)
    }

    /// Extends the last token when it has the same kind, otherwise starts a new one.
    fn append(&mut self, kind: TokenKind, text: &str) {
        match self.tokens.last_mut() {
            Some(last) if last.kind == kind => last.text.push_str(text),
            _ => self.tokens.push(Token::new(kind, text)),
        }
    }

    fn push(&mut self, kind: TokenKind, text: &str) {
        self.tokens.push(Token::new(kind, text));
    }
}

/// Splits `text` into classified tokens. Concatenating the token texts
/// always gives back `text`.
pub fn tokenize(text: &str, rules: &RuleSet) -> Vec<Token> {
    let mut list = TokenList::default();
    let mut pos = 0;
    if text.starts_with("#!") {
        let end = text.find(['\r', '\n']).unwrap_or(text.len());
        list.push(TokenKind::Comment, &text[..end]);
        pos = end;
    }
    while let Some(ch) = text[pos..].chars().next() {
        let rest = &text[pos..];
        if let Some(marker) = HIGHLIGHT_MARKER.find(rest) {
            list.append(TokenKind::Plain, marker.as_str());
            pos += marker.end();
            continue;
        }
        if ch == '(' {
            list.push(TokenKind::Plain, "(");
            pos += 1;
            continue;
        }
        if matches!(ch, ')' | ' ' | '\t' | '\r' | '\n') || rules.is_bracket(ch) {
            list.append(TokenKind::Plain, &rest[..ch.len_utf8()]);
            pos += ch.len_utf8();
            continue;
        }
        if let Some((kind, len)) = match_rule(rest, rules, list.last_kind()) {
            list.append(kind, &rest[..len]);
            pos += len;
            continue;
        }
        if let Some(len) = match_string(rest, rules) {
            list.push(TokenKind::String, &rest[..len]);
            pos += len;
            continue;
        }
        list.append(TokenKind::Value, &rest[..ch.len_utf8()]);
        pos += ch.len_utf8();
    }
    let mut tokens = list.tokens;
    classify(&mut tokens, rules);
    merge_signs(tokens)
}

fn match_rule(rest: &str, rules: &RuleSet, last: Option<TokenKind>) -> Option<(TokenKind, usize)> {
    let families = [
        (TokenKind::Comment, &rules.comments),
        (TokenKind::Pseudo, &rules.pseudo),
        (TokenKind::Operator, &rules.operators),
        (TokenKind::Number, &rules.numbers),
    ];
    for (kind, patterns) in families {
        // digits inside an identifier stay part of it
        if kind == TokenKind::Number && last == Some(TokenKind::Value) {
            continue;
        }
        for pattern in patterns {
            if let Some(m) = pattern.find(rest) {
                if m.end() > 0 {
                    return Some((kind, m.end()));
                }
            }
        }
    }
    None
}

/// Length of the string literal starting at `rest`, delimiters included.
/// A backslash escapes the next character and a doubled closing delimiter
/// is an escaped one. Unterminated literals run to the end of the text.
fn match_string(rest: &str, rules: &RuleSet) -> Option<usize> {
    let open = rules.strings.iter().find(|d| rest.starts_with(d.as_str()))?;
    let close = open.chars().last()?;
    let mut chars = rest[open.len()..].char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if ch == '\\' {
            chars.next();
        } else if ch == close {
            if chars.peek().map(|(_, next)| *next) == Some(close) {
                chars.next();
            } else {
                return Some(open.len() + idx + ch.len_utf8());
            }
        }
    }
    Some(rest.len())
}

fn classify(tokens: &mut [Token], rules: &RuleSet) {
    for idx in 0..tokens.len() {
        if tokens[idx].kind != TokenKind::Value {
            continue;
        }
        let word = tokens[idx].text.to_lowercase();
        let starts_call = |t: Option<&Token>| t.is_some_and(|t| t.text.starts_with('('));
        tokens[idx].kind = if rules.is_type(&word) {
            TokenKind::Type
        } else if rules.is_keyword(&word) {
            TokenKind::Keyword
        } else if starts_call(tokens.get(idx + 1))
            || (tokens.get(idx + 1).is_some_and(|t| t.kind == TokenKind::Plain)
                && starts_call(tokens.get(idx + 2)))
        {
            TokenKind::Function
        } else {
            TokenKind::Value
        };
    }
}

fn merge_signs(tokens: Vec<Token>) -> Vec<Token> {
    let mut merged: Vec<Token> = Vec::with_capacity(tokens.len());
    for mut token in tokens {
        if token.kind == TokenKind::Number {
            if let Some(prev) = merged.last() {
                if prev.kind == TokenKind::Operator && (prev.text == "-" || prev.text == ".") {
                    let sign = merged.pop().map(|t| t.text).unwrap_or_default();
                    token.text.insert_str(0, &sign);
                }
            }
        }
        merged.push(token);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(text: &str) -> Vec<(TokenKind, String)> {
        tokenize(text, RuleSet::generic())
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    fn tok(kind: TokenKind, text: &str) -> (TokenKind, String) {
        (kind, text.to_string())
    }

    #[test]
    fn classifies_simple_statement() {
        use TokenKind::*;
        assert_eq!(
            kinds("if (x) { return 1; }"),
            vec![
                tok(Keyword, "if"),
                tok(Plain, " "),
                tok(Plain, "("),
                tok(Value, "x"),
                tok(Plain, ") { "),
                tok(Keyword, "return"),
                tok(Plain, " "),
                tok(Number, "1"),
                tok(Plain, "; }"),
            ]
        );
    }

    #[test]
    fn detects_function_calls_across_one_separator() {
        use TokenKind::*;
        let tokens = kinds("printf (\"%d\", n);");
        assert_eq!(tokens[0], tok(Function, "printf"));
        assert_eq!(tokens[3], tok(String, "\"%d\""));
        assert_eq!(kinds("foo(x)")[0], tok(Function, "foo"));
    }

    #[test]
    fn digits_inside_identifiers_are_not_numbers() {
        use TokenKind::*;
        assert_eq!(
            kinds("x1 = 2"),
            vec![
                tok(Value, "x1"),
                tok(Plain, " "),
                tok(Operator, "="),
                tok(Plain, " "),
                tok(Number, "2"),
            ]
        );
    }

    #[test]
    fn negative_numbers_absorb_the_sign() {
        use TokenKind::*;
        let tokens = kinds("a = -5");
        assert_eq!(tokens.last(), Some(&tok(Number, "-5")));
        assert_eq!(tokens[2], tok(Operator, "="));
        // operators glued together stay one token
        assert_eq!(kinds("a=-5")[1], tok(Operator, "=-"));
    }

    #[test]
    fn strings_honor_escapes_and_doubled_delimiters() {
        use TokenKind::*;
        assert_eq!(kinds(r#""a\"b" x"#)[0], tok(String, r#""a\"b""#));
        assert_eq!(kinds("'it''s' y")[0], tok(String, "'it''s'"));
        assert_eq!(kinds("\"open"), vec![tok(String, "\"open")]);
    }

    #[test]
    fn shebang_and_comments() {
        use TokenKind::*;
        let tokens = kinds("#!/bin/sh\necho // done");
        assert_eq!(tokens[0], tok(Comment, "#!/bin/sh"));
        assert_eq!(tokens.last(), Some(&tok(Comment, "// done")));
    }

    #[test]
    fn highlight_markers_stay_plain() {
        use TokenKind::*;
        let tokens = kinds("<hl>int</hl> a;");
        assert_eq!(tokens[0], tok(Plain, "<hl>"));
        assert_eq!(tokens[1], tok(Type, "int"));
        assert_eq!(tokens[2], tok(Plain, "</hl> "));
    }

    #[test]
    fn round_trip_is_lossless() {
        for text in [
            "if (x) { return 1; }",
            "#!/usr/bin/env python\ndef f(a, b):\n    return a - .5 # half\n",
            "s = \"unterminated",
            "/* multi\nline */ int x = 0x1F;\r\n",
            "ünïcödé → λ(x) 'ä'",
            "",
        ] {
            let joined: String = tokenize(text, RuleSet::generic())
                .into_iter()
                .map(|t| t.text)
                .collect();
            assert_eq!(joined, text);
        }
    }
}
