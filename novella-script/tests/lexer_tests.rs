use novella_script::lexer::{self, Lexer, Terminator, Tok};

#[test]
fn classifies_each_line_kind() {
    let src = r#"
// comment
*start
@choice
@if $gold > 3
@endif
@else
@end_choice
@bg room 500@ease-in
[Alice] "Hello"
Plain narration
"#;
    let lines = Lexer::new(src).run();
    let toks: Vec<&Tok> = lines.iter().map(|l| &l.tok).collect();
    assert_eq!(toks[0], &Tok::Blank);
    assert_eq!(toks[1], &Tok::Comment);
    assert_eq!(toks[2], &Tok::Label("start".to_string()));
    assert_eq!(toks[3], &Tok::ChoiceOpen);
    assert_eq!(
        toks[4],
        &Tok::IfOpen { token: "@if".into(), params: vec!["$gold".into(), ">".into(), "3".into()] }
    );
    assert_eq!(toks[5], &Tok::Terminator(Terminator::EndIf));
    assert_eq!(toks[6], &Tok::Terminator(Terminator::Else));
    assert_eq!(toks[7], &Tok::Terminator(Terminator::EndChoice));
    assert_eq!(
        toks[8],
        &Tok::Directive { token: "@bg".into(), params: vec!["room".into(), "500@ease-in".into()] }
    );
    assert_eq!(toks[9], &Tok::Text { speaker: "Alice".into(), text: "Hello".into() });
    assert_eq!(toks[10], &Tok::Text { speaker: String::new(), text: "Plain narration".into() });
}

#[test]
fn line_numbers_are_one_based_and_raw_is_trimmed() {
    let lines = Lexer::new("  @wait 100  \n\n").run();
    assert_eq!(lines[0].number, 1);
    assert_eq!(lines[0].raw, "@wait 100");
    assert_eq!(lines[1].number, 2);
}

#[test]
fn terminators_match_by_prefix() {
    assert_eq!(lexer::terminator("@endif // done"), Some(Terminator::EndIf));
    assert_eq!(lexer::terminator("@else_where"), Some(Terminator::Else));
    assert_eq!(lexer::terminator("@end"), None);
}

#[test]
fn split_command_collapses_whitespace() {
    let (cmd, params) = lexer::split_command("@move   alice\t100  200");
    assert_eq!(cmd, "@move");
    assert_eq!(params, vec!["alice", "100", "200"]);

    let (cmd, params) = lexer::split_command("@stop_bgm");
    assert_eq!(cmd, "@stop_bgm");
    assert!(params.is_empty());
}

#[test]
fn split_command_ignores_quotes() {
    let (_, params) = lexer::split_command(r#"@script "two words""#);
    assert_eq!(params, vec![r#""two"#, r#"words""#]);
}

#[test]
fn dialogue_without_closing_bracket_is_narration() {
    assert_eq!(lexer::split_dialogue("[Bob hi"), (String::new(), "[Bob hi".to_string()));
    assert_eq!(lexer::split_dialogue("[Bob]   \"hi\""), ("Bob".to_string(), "hi".to_string()));
    assert_eq!(lexer::split_dialogue("[Bob] hi"), ("Bob".to_string(), "hi".to_string()));
}

#[test]
fn choice_arm_splits_at_first_arrow() {
    let option = lexer::split_choice_arm(r#""Go >> left" >> *left"#).unwrap();
    assert_eq!(option.text, "\"Go");
    assert_eq!(option.target, r#"left" >> *left"#);

    let option = lexer::split_choice_arm(r#""Stay" >> *stay"#).unwrap();
    assert_eq!(option.text, "Stay");
    assert_eq!(option.target, "*stay");

    assert!(lexer::split_choice_arm("no arrow here").is_none());
}

#[test]
fn strip_quotes_needs_a_pair() {
    assert_eq!(lexer::strip_quotes("\""), "\"");
    assert_eq!(lexer::strip_quotes("\"\""), "");
    assert_eq!(lexer::strip_quotes("\"a"), "\"a");
}
