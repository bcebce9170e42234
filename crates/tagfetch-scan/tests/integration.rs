use tagfetch_scan::{split_conditional, Token, TagKind, Tokenizer};

fn kinds(input: &str) -> Vec<TagKind> {
    Tokenizer::new(input)
        .filter_map(|t| match t {
            Token::Tag(tag) => Some(tag.kind),
            _ => None,
        })
        .collect()
}

#[test]
fn test_default_layout_lines() {
    assert_eq!(
        kinds("${auto}OS: $<os.name> $<system.arch>"),
        vec![TagKind::Color, TagKind::Information, TagKind::Information]
    );
    assert_eq!(
        kinds("${u#5522dd}$[$(date +%H),12,Good ${yellow}morning,Good ${#ff8800}afternoon]"),
        vec![TagKind::Color, TagKind::Conditional]
    );
    assert_eq!(
        kinds("RAM: $%$<ram.used>,$<ram.total>%"),
        vec![TagKind::Percentage]
    );
}

#[test]
fn test_text_between_tags_is_preserved() {
    let rebuilt: String = Tokenizer::new("a ${red}b$<c>d $5")
        .map(|t| match t {
            Token::Text(s) => s.to_string(),
            Token::Tag(tag) => tag.source.to_string(),
            Token::Escaped(c) => c.to_string(),
            Token::Unterminated { text, .. } => text.to_string(),
        })
        .collect();
    assert_eq!(rebuilt, "a ${red}b$<c>d $5");
}

#[test]
fn test_conditional_with_nested_tags() {
    let input = "$[$<os.name.id>,arch,${green}I use arch btw,${red}Non-arch user]";
    let tag = match Tokenizer::new(input).next() {
        Some(Token::Tag(tag)) => tag,
        other => panic!("expected tag, got {:?}", other),
    };
    let [a, b, t, f] = split_conditional(tag.payload).unwrap();
    assert_eq!(a, "$<os.name.id>");
    assert_eq!(b, "arch");
    assert_eq!(t, "${green}I use arch btw");
    assert_eq!(f, "${red}Non-arch user");
}

#[test]
fn test_unterminated_does_not_swallow_line() {
    let tokens: Vec<_> = Tokenizer::new("$<os.name").collect();
    assert_eq!(tokens.len(), 2);
    assert!(matches!(tokens[0], Token::Unterminated { text: "$<", .. }));
    assert_eq!(tokens[1], Token::Text("os.name"));
}
