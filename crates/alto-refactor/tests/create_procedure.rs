use alto_refactor::{
    create_procedure_code_actions, extract_procedure_code_actions, AccessModifier, CodeActionKind,
    CreateProcedure, CreateProcedureKind, NotApplicableReason, RefactorError,
};
use alto_test_utils::{extract_offset, parse, Fixture};
use pretty_assertions::assert_eq;

fn fixture(text: &str) -> (Fixture, alto_refactor::TextRange) {
    let (source, offset) = extract_offset(text);
    (Fixture::new(&source), alto_refactor::TextRange::empty(offset))
}

#[tokio::test]
async fn creates_local_procedure_from_call() {
    let (fixture, at) = fixture(
        r#"codeunit 50100 Calc
{
    procedure Run()
    var
        Qty: Integer;
        Total: Decimal;
    begin
        Total := $0CalcTotal(Qty, 5);
    end;
}
"#,
    );

    let outcome = CreateProcedure::new(at.start())
        .apply(&fixture.context())
        .await
        .unwrap();
    let expected = r#"codeunit 50100 Calc
{
    procedure Run()
    var
        Qty: Integer;
        Total: Decimal;
    begin
        Total := CalcTotal(Qty, 5);
    end;

    local procedure CalcTotal(Qty: Integer; arg: Integer): Decimal
    begin
        Error('Procedure not implemented.');
    end;
}
"#;
    let actual = fixture.apply(&outcome.edit);
    assert_eq!(actual, expected);
    parse(&actual, 2).expect("created code parses");
}

#[tokio::test]
async fn same_named_members_are_numbered() {
    let (source, offset) = extract_offset(
        r#"codeunit 50100 Sync
{
    procedure Run(Cust: Record Customer; Vend: Record Vendor)
    begin
        $0Compare(Cust.No, Vend.No);
    end;
}
"#,
    );
    let fixture = Fixture::new(&source);
    let oracle = fixture
        .oracle()
        .with_member("Customer", "No", "Code[20]")
        .with_member("Vendor", "No", "Code[20]");
    let procedure = CreateProcedure::new(offset)
        .build(&fixture.context_with(oracle))
        .await
        .unwrap();

    let names: Vec<_> = procedure.parameters.iter().map(|p| p.declaration()).collect();
    assert_eq!(names, vec!["No1: Code[20]", "No2: Code[20]"]);
}

#[tokio::test]
async fn records_and_var_arguments_are_passed_by_reference() {
    let (source, offset) = extract_offset(
        r#"codeunit 50100 Sync
{
    procedure Run(var Counter: Integer; Cust: Record Customer temporary)
    begin
        $0Touch(Counter, Cust);
    end;
}
"#,
    );
    let fixture = Fixture::new(&source);
    let procedure = CreateProcedure::new(offset)
        .build(&fixture.context())
        .await
        .unwrap();

    let declarations: Vec<_> = procedure.parameters.iter().map(|p| p.declaration()).collect();
    assert_eq!(
        declarations,
        vec!["var Counter: Integer", "var Cust: Record Customer temporary"]
    );
}

#[tokio::test]
async fn argument_types_follow_callee_signature() {
    let (source, offset) = extract_offset(
        r#"codeunit 50100 Calc
{
    procedure Run()
    begin
        Add($0Lookup());
    end;

    procedure Add(Amount: Decimal)
    begin
    end;
}
"#,
    );
    let fixture = Fixture::new(&source);
    let procedure = CreateProcedure::new(offset)
        .build(&fixture.context())
        .await
        .unwrap();
    assert_eq!(procedure.return_type.as_deref(), Some("Decimal"));
    assert!(procedure.parameters.is_empty());
}

#[tokio::test]
async fn existing_procedure_is_not_recreated() {
    let (source, offset) = extract_offset(
        r#"codeunit 50100 Calc
{
    procedure Run()
    begin
        $0Helper();
    end;

    local procedure Helper()
    begin
    end;
}
"#,
    );
    let fixture = Fixture::new(&source);
    let err = CreateProcedure::new(offset)
        .build(&fixture.context())
        .await
        .unwrap_err();
    assert!(
        matches!(err, RefactorError::NotApplicable(NotApplicableReason::AlreadyDefined(ref name)) if name == "Helper"),
        "{err:?}"
    );
}

#[tokio::test]
async fn interface_receives_public_declaration() {
    let (source, offset) = extract_offset(
        r#"interface ICalc
{
    procedure Total(): Decimal;
}

codeunit 50100 User
{
    procedure Run(Calc: Interface ICalc)
    begin
        Calc.$0Compute(5);
    end;
}
"#,
    );
    let fixture = Fixture::new(&source);
    let outcome = CreateProcedure::new(offset)
        .apply(&fixture.context())
        .await
        .unwrap();
    assert_eq!(outcome.procedure.access_modifier, AccessModifier::Public);

    let expected = r#"interface ICalc
{
    procedure Total(): Decimal;

    procedure Compute(arg: Integer);
}

codeunit 50100 User
{
    procedure Run(Calc: Interface ICalc)
    begin
        Calc.Compute(5);
    end;
}
"#;
    assert_eq!(fixture.apply(&outcome.edit), expected);
}

#[tokio::test]
async fn other_objects_get_configured_access() {
    let (source, offset) = extract_offset(
        r#"codeunit 50101 Helper
{
}

codeunit 50100 User
{
    procedure Run(Help: Codeunit Helper)
    begin
        Help.$0DoWork();
    end;
}
"#,
    );
    let fixture = Fixture::new(&source);
    let outcome = CreateProcedure::new(offset)
        .apply(&fixture.context())
        .await
        .unwrap();
    assert_eq!(outcome.procedure.access_modifier, AccessModifier::Internal);
    let actual = fixture.apply(&outcome.edit);
    assert!(
        actual.starts_with("codeunit 50101 Helper\n{\n\n    internal procedure DoWork()\n"),
        "{actual}"
    );
}

#[tokio::test]
async fn enums_cannot_contain_procedures() {
    let (source, offset) = extract_offset(
        r#"enum 50100 Color
{
}

codeunit 50100 User
{
    procedure Run(C: Enum Color)
    begin
        C.$0Paint();
    end;
}
"#,
    );
    let fixture = Fixture::new(&source);
    let err = CreateProcedure::new(offset)
        .build(&fixture.context())
        .await
        .unwrap_err();
    assert!(
        matches!(err, RefactorError::NotApplicable(NotApplicableReason::CannotContainProcedures(_))),
        "{err:?}"
    );
}

#[tokio::test]
async fn unavailable_oracle_falls_back_to_variant() {
    let (source, offset) = extract_offset(
        r#"codeunit 50100 Calc
{
    procedure Run()
    var
        Qty: Integer;
        Total: Decimal;
    begin
        Total := $0CalcTotal(Qty, 5);
    end;
}
"#,
    );
    let fixture = Fixture::new(&source);
    let procedure = CreateProcedure::new(offset)
        .build(&fixture.context_with(fixture.oracle().unavailable()))
        .await
        .unwrap();
    let declarations: Vec<_> = procedure.parameters.iter().map(|p| p.declaration()).collect();
    assert_eq!(declarations, vec!["Qty: Variant", "arg: Integer"]);
    assert_eq!(procedure.return_type.as_deref(), Some("Variant"));
}

#[tokio::test]
async fn event_actions_are_offered_for_on_names() {
    let (source, offset) = extract_offset(
        r#"codeunit 50100 Poster
{
    procedure Post(Amount: Decimal)
    begin
        $0OnBeforePost(Amount);
    end;
}
"#,
    );
    let fixture = Fixture::new(&source);
    let actions = create_procedure_code_actions(&fixture.context(), offset)
        .await
        .unwrap();

    let titles: Vec<_> = actions.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Create procedure OnBeforePost",
            "Create integration event OnBeforePost",
            "Create business event OnBeforePost",
        ]
    );
    assert!(actions.iter().all(|a| a.kind == CodeActionKind::QuickFix));

    let expected = r#"codeunit 50100 Poster
{
    procedure Post(Amount: Decimal)
    begin
        OnBeforePost(Amount);
    end;

    [IntegrationEvent(false, false)]
    local procedure OnBeforePost(Amount: Decimal)
    begin
    end;
}
"#;
    assert_eq!(fixture.apply(&actions[1].edit), expected);
}

#[tokio::test]
async fn plain_names_only_offer_a_procedure() {
    let (source, offset) = extract_offset(
        r#"codeunit 50100 Poster
{
    procedure Post()
    begin
        $0Recalculate();
    end;
}
"#,
    );
    let fixture = Fixture::new(&source);
    let actions = create_procedure_code_actions(&fixture.context(), offset)
        .await
        .unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].title, "Create procedure Recalculate");
}

#[tokio::test]
async fn inapplicable_positions_yield_no_actions() {
    let (source, offset) = extract_offset(
        r#"codeunit 50100 Poster
{
    procedure Post()
    var
        $0x: Integer;
    begin
        x := 1;
    end;
}
"#,
    );
    let fixture = Fixture::new(&source);
    let ctx = fixture.context();
    assert!(create_procedure_code_actions(&ctx, offset).await.unwrap().is_empty());
    assert!(
        extract_procedure_code_actions(&ctx, alto_refactor::TextRange::empty(offset))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn event_kinds_drop_return_types() {
    let (source, offset) = extract_offset(
        r#"codeunit 50100 Poster
{
    procedure Post()
    var
        Handled: Boolean;
    begin
        Handled := $0OnCheck();
    end;
}
"#,
    );
    let fixture = Fixture::new(&source);
    let outcome = CreateProcedure::new(offset)
        .with_kind(CreateProcedureKind::BusinessEvent)
        .apply(&fixture.context())
        .await
        .unwrap();
    assert_eq!(outcome.procedure.return_type, None);
    assert_eq!(outcome.procedure.attributes, vec!["BusinessEvent(false)"]);
    assert!(outcome.procedure.body.is_empty());
}
