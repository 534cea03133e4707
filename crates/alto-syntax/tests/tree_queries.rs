use alto_core::TextSize;
use alto_syntax::SyntaxKind;
use alto_test_utils::parse;
use pretty_assertions::assert_eq;

const TEXT: &str = r#"codeunit 50100 Calc
{
    procedure Run(a: Integer)
    var
        x: Integer;
    begin
        x := a + 1;
        if x > 2 then
            Message('%1', x);
    end;
}
"#;

fn offset_of(needle: &str) -> TextSize {
    TextSize::from(TEXT.find(needle).unwrap() as u32)
}

#[test]
fn find_node_prefers_the_innermost_match() {
    let tree = parse(TEXT, 1).unwrap();
    let at = offset_of("a + 1");

    let leaf = tree.find_node(at, None).unwrap();
    assert_eq!((leaf.kind(), leaf.text()), (SyntaxKind::IdentifierName, "a"));

    let statement = tree
        .find_node(at, Some(&[SyntaxKind::AssignmentStatement]))
        .unwrap();
    assert_eq!(statement.text(), "x := a + 1;");

    let method = tree
        .find_node(at, Some(&[SyntaxKind::MethodDeclaration]))
        .unwrap();
    assert_eq!(method.name(), Some("Run"));
}

#[test]
fn ending_at_picks_the_node_that_closes_there() {
    let tree = parse(TEXT, 1).unwrap();
    let end = offset_of("a + 1") + TextSize::of("a + 1");
    let node = tree.find_node_ending_at(end, None).unwrap();
    assert_eq!(node.text(), "1");
    assert_eq!(node.parent().unwrap().kind(), SyntaxKind::LiteralExpression);
}

#[test]
fn paths_and_common_ancestors() {
    let tree = parse(TEXT, 1).unwrap();
    let block = tree
        .root()
        .descendants()
        .find(|n| n.kind() == SyntaxKind::Block)
        .unwrap();
    let a = tree.find_node(offset_of("a + 1"), None).unwrap();
    let message = tree
        .find_node(offset_of("Message"), Some(&[SyntaxKind::InvocationExpression]))
        .unwrap();

    assert_eq!(tree.path_to(block.id(), a.id()), Some(vec![0, 1, 0]));
    assert_eq!(tree.path_to(block.id(), message.id()), Some(vec![1, 1]));
    assert_eq!(tree.path_to(message.id(), a.id()), None);

    let common = tree.common_ancestor(a.id(), message.id()).unwrap();
    assert_eq!(common, block);
    assert!(block.is_ancestor_of(a));
}

#[test]
fn full_range_includes_leading_trivia() {
    let text = "codeunit 1 A\n{\n    trigger OnRun()\n    begin\n        // note\n        Foo;\n    end;\n}\n";
    let tree = parse(text, 1).unwrap();
    let call = tree
        .root()
        .descendants()
        .find(|n| n.kind() == SyntaxKind::InvocationExpression)
        .unwrap();
    assert_eq!(call.text(), "Foo;");
    assert!(text[call.full_range()].contains("// note"));
}
