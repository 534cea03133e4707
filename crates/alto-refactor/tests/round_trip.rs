use alto_core::LineEnding;
use alto_refactor::synthesize::render_procedure;
use alto_refactor::{create_handler_procedure, ExtractProcedure, Procedure};
use alto_syntax::{SyntaxKind, SyntaxNodeRef};
use alto_test_utils::{extract_range, parse, Fixture};
use pretty_assertions::assert_eq;

#[derive(Debug, PartialEq, Eq)]
struct Shape {
    kind: SyntaxKind,
    parameters: Vec<(String, String, bool)>,
    return_type: Option<String>,
}

fn shape_of(procedure: &Procedure) -> Shape {
    Shape {
        kind: SyntaxKind::MethodDeclaration,
        parameters: procedure
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.type_name.clone(), p.is_var))
            .collect(),
        return_type: procedure.return_type.clone(),
    }
}

fn shape_of_node(method: SyntaxNodeRef<'_>) -> Shape {
    Shape {
        kind: method.kind(),
        parameters: method
            .first_child_of_kind(SyntaxKind::ParameterList)
            .map(|list| {
                list.children()
                    .map(|p| {
                        (
                            p.name().unwrap().to_string(),
                            p.data_type().unwrap().to_string(),
                            p.text().starts_with("var "),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default(),
        return_type: method
            .first_child_of_kind(SyntaxKind::ReturnValue)
            .and_then(|r| r.data_type())
            .map(str::to_string),
    }
}

fn reparse(procedure: &Procedure) -> Shape {
    let text = format!(
        "codeunit 50100 Wrapper\n{{\n{}\n}}\n",
        render_procedure(procedure, "    ", LineEnding::Lf, false)
    );
    let tree = parse(&text, 1).expect("rendered procedure parses");
    let method = tree
        .root()
        .descendants()
        .find(|n| n.kind() == SyntaxKind::MethodDeclaration)
        .expect("one method");
    shape_of_node(method)
}

#[test]
fn handlers_survive_a_round_trip() {
    for (kind, name) in [
        ("ConfirmHandler", "ConfirmYes"),
        ("StrMenuHandler", "PickFirst"),
        ("SendNotificationHandler", "OnNotify"),
        ("FilterPageHandler", "FilterPage"),
    ] {
        let procedure = create_handler_procedure(kind, name).unwrap();
        assert_eq!(reparse(&procedure), shape_of(&procedure), "{kind}");
    }
}

#[tokio::test]
async fn extracted_procedure_survives_a_round_trip() {
    let fixture = r#"codeunit 50100 Calc
{
    procedure Total(Qty: Integer; Price: Decimal): Decimal
    var
        Discount: Decimal;
    begin
        Discount := 0;
        exit(/*start*/Qty * Price/*end*/ - Discount);
    end;
}
"#;
    let (source, selection) = extract_range(fixture);
    let fixture = Fixture::new(&source);
    let outcome = ExtractProcedure::new(selection)
        .apply(&fixture.context())
        .await
        .unwrap();

    assert_eq!(outcome.procedure.return_type.as_deref(), Some("Decimal"));
    assert_eq!(reparse(&outcome.procedure), shape_of(&outcome.procedure));
}
