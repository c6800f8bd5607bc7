use std::fs;
use std::path::Path;

use gendoc_core::{
    Event, EventWriter, GendocError, RuleRegistry, RuleSet, Session, TokenKind, W_RULES_MISSING,
    tokenize,
};
use pretty_assertions::assert_eq;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn bundled() -> Result<RuleRegistry, gendoc_core::GendocError> {
    RuleRegistry::load_dir(Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../../rules")))
}

fn kinds(lang: &str, registry: &RuleRegistry, text: &str) -> Vec<(TokenKind, String)> {
    let rules = match registry.get(lang) {
        Some(rules) => rules,
        None => panic!("no rules for {lang}"),
    };
    tokenize(text, rules)
        .into_iter()
        .map(|token| (token.kind, token.text))
        .collect()
}

#[test]
fn bundled_rules_load() -> TestResult {
    let registry = bundled()?;
    let mut languages: Vec<&str> = registry.languages().collect();
    languages.sort_unstable();
    assert_eq!(languages, ["c", "python", "rust", "sh"]);
    Ok(())
}

#[test]
fn python_rules_classify_words() -> TestResult {
    let registry = bundled()?;
    assert_eq!(
        kinds("python", &registry, "x = None  # done"),
        vec![
            (TokenKind::Value, "x".to_string()),
            (TokenKind::Plain, " ".to_string()),
            (TokenKind::Operator, "=".to_string()),
            (TokenKind::Plain, " ".to_string()),
            (TokenKind::Type, "None".to_string()),
            (TokenKind::Plain, "  ".to_string()),
            (TokenKind::Comment, "# done".to_string()),
        ]
    );
    Ok(())
}

#[test]
fn rust_rules_know_macros_and_chars() -> TestResult {
    let registry = bundled()?;
    assert_eq!(
        kinds("rust", &registry, "println!(\"{}\", 'a');"),
        vec![
            (TokenKind::Pseudo, "println!".to_string()),
            (TokenKind::Plain, "(".to_string()),
            (TokenKind::String, "\"{}\"".to_string()),
            (TokenKind::Plain, ", ".to_string()),
            (TokenKind::Pseudo, "'a'".to_string()),
            (TokenKind::Plain, ");".to_string()),
        ]
    );
    Ok(())
}

#[test]
fn broken_rule_files_are_skipped() -> TestResult {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("hl_bad.json"), "[[")?;
    fs::write(dir.path().join("hl_regex.json"), "[[\"(\"]]")?;
    fs::write(dir.path().join("hl_ok.json"), "/* ok */ [[], [], [\"\\+\"]]")?;
    fs::write(dir.path().join("notes.json"), "[]")?;

    let registry = RuleRegistry::load_dir(dir.path())?;
    let languages: Vec<&str> = registry.languages().collect();
    assert_eq!(languages, ["ok"]);
    let tokens = kinds("ok", &registry, "a+b");
    assert_eq!(tokens[1], (TokenKind::Operator, "+".to_string()));
    Ok(())
}

#[test]
fn rule_file_errors_name_the_file() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("hl_bad.json");
    fs::write(&path, "[[\"(\"]]")?;
    match RuleSet::load(&path) {
        Err(GendocError::RuleSet { path: reported, message }) => {
            assert_eq!(reported, path);
            assert!(message.starts_with("invalid highlight pattern"));
        }
        other => panic!("expected a rule set error, got {other:?}"),
    }
    assert!(matches!(
        RuleSet::load(&dir.path().join("hl_none.json")),
        Err(GendocError::Io { .. })
    ));
    Ok(())
}

#[test]
fn missing_rule_directory_is_an_error() {
    assert!(RuleRegistry::load_dir(Path::new("/nonexistent/gendoc/rules")).is_err());
}

#[test]
fn session_uses_registered_rules() -> TestResult {
    let mut session = Session::new(EventWriter::new()).with_rules(bundled()?);
    session.parse("<code python>def f():\n    pass</code><code lua>x</code>");
    let langs: Vec<Option<&str>> = session
        .writer()
        .events()
        .iter()
        .filter_map(|event| match event {
            Event::SourceCode { lang, .. } => Some(lang.as_deref()),
            _ => None,
        })
        .collect();
    assert_eq!(langs, [Some("python"), Some("lua")]);
    let missing: Vec<&str> = session
        .diagnostics()
        .iter()
        .filter(|d| d.code == W_RULES_MISSING)
        .map(|d| d.message.as_str())
        .collect();
    assert_eq!(missing, ["no highlight rules for 'lua' using generics"]);
    Ok(())
}
