//! Replay tests over the sample scripts in `samples/scripts/`

use richedit::config::EditorConfig;
use richedit::replay::{run, Script};

fn replay(source: &str) -> richedit::replay::ReplayReport {
    let script = Script::from_yaml(source).unwrap();
    run(&script, EditorConfig::default())
}

#[test]
fn test_code_block_exit_script() {
    let report = replay(include_str!("../samples/scripts/code_block_exit.yaml"));
    assert_eq!(report.text, "let x = 1;\ndone");
    assert!(report
        .html
        .starts_with("<pre><code>let x = 1;\n</code></pre><p>done"));
    assert!(report.prevented >= 2);
    assert_eq!(report.selection, Some((15, 15)));
}

#[test]
fn test_bold_caret_script_on_gecko() {
    let report = replay(include_str!("../samples/scripts/bold_caret.yaml"));
    assert_eq!(report.text, "abcXY");
    assert!(report.html.contains("<b>XY</b>"), "{}", report.html);
    assert!(!report.html.contains('\u{200b}'));
}

#[test]
fn test_word_paste_script() {
    let report = replay(include_str!("../samples/scripts/word_paste.yaml"));
    assert_eq!(report.html, "<p>a<span>hi</span>b</p>");
    assert!(report.changes >= 1);
}

#[test]
fn test_config_engine_used_without_script_override() {
    let script = Script::from_yaml("html: \"<p>x</p>\"\nsteps: []\n").unwrap();
    let config = EditorConfig {
        engine: richedit::EngineFamily::Trident,
        ..EditorConfig::default()
    };
    let report = run(&script, config);
    assert_eq!(report.html, "<p>x</p>");
    assert_eq!(report.selection, Some((1, 1)));
}
