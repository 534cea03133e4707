use serde_repr::{Deserialize_repr, Serialize_repr};

/// Node kinds of the AL concrete syntax tree.
///
/// The set is closed: the external parser maps every production it emits onto
/// one of these kinds. Tokens are not represented; trivia is folded into the
/// `full_range` of the node it precedes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize_repr, Deserialize_repr,
)]
#[repr(u16)]
pub enum SyntaxKind {
    CompilationUnit,

    // --- Application objects ---
    CodeunitObject,
    TableObject,
    TableExtensionObject,
    PageObject,
    PageExtensionObject,
    PageCustomizationObject,
    ReportObject,
    ReportExtensionObject,
    QueryObject,
    XmlPortObject,
    EnumType,
    EnumExtensionType,
    Interface,
    ControlAddInObject,
    PermissionSet,
    PermissionSetExtension,
    ProfileObject,
    DotNetPackage,
    ObjectId,

    // --- Object members ---
    PropertyList,
    Property,
    FieldList,
    Field,
    GlobalVarSection,
    VarSection,
    VariableDeclaration,
    VariableListDeclaration,
    VariableDeclarationName,
    MethodDeclaration,
    TriggerDeclaration,
    EventDeclaration,
    MemberAttribute,
    AccessModifier,
    ParameterList,
    Parameter,
    ReturnValue,

    // --- Type references ---
    SimpleTypeReference,
    RecordTypeReference,
    SubtypedDataType,
    LengthDataType,
    LabelDataType,
    ArrayDataType,
    DotNetTypeReference,

    // --- Statements ---
    Block,
    AssignmentStatement,
    CompoundAssignmentStatement,
    IfStatement,
    CaseStatement,
    CaseLine,
    CaseElse,
    WithStatement,
    RepeatStatement,
    WhileStatement,
    ForStatement,
    ForEachStatement,
    ExitStatement,
    BreakStatement,
    EmptyStatement,

    // --- Expressions ---
    IdentifierName,
    MemberAccessExpression,
    InvocationExpression,
    ArgumentList,
    ElementAccessExpression,
    BracketedArgumentList,
    OptionAccessExpression,
    ParenthesizedExpression,
    UnaryPlusExpression,
    UnaryMinusExpression,
    UnaryNotExpression,
    AddExpression,
    SubtractExpression,
    MultiplyExpression,
    DivideExpression,
    IntegerDivideExpression,
    ModuloExpression,
    LogicalAndExpression,
    LogicalOrExpression,
    LogicalXorExpression,
    EqualsExpression,
    NotEqualsExpression,
    LessThanExpression,
    LessThanOrEqualExpression,
    GreaterThanExpression,
    GreaterThanOrEqualExpression,
    InExpression,
    InList,
    RangeExpression,
    LiteralExpression,

    // --- Literal values (children of `LiteralExpression`) ---
    BooleanLiteralValue,
    StringLiteralValue,
    Int32SignedLiteralValue,
    Int64SignedLiteralValue,
    DecimalSignedLiteralValue,
    DateLiteralValue,
    TimeLiteralValue,
    DateTimeLiteralValue,
}

impl SyntaxKind {
    pub fn is_object(self) -> bool {
        matches!(
            self,
            SyntaxKind::CodeunitObject
                | SyntaxKind::TableObject
                | SyntaxKind::TableExtensionObject
                | SyntaxKind::PageObject
                | SyntaxKind::PageExtensionObject
                | SyntaxKind::PageCustomizationObject
                | SyntaxKind::ReportObject
                | SyntaxKind::ReportExtensionObject
                | SyntaxKind::QueryObject
                | SyntaxKind::XmlPortObject
                | SyntaxKind::EnumType
                | SyntaxKind::EnumExtensionType
                | SyntaxKind::Interface
                | SyntaxKind::ControlAddInObject
                | SyntaxKind::PermissionSet
                | SyntaxKind::PermissionSetExtension
                | SyntaxKind::ProfileObject
                | SyntaxKind::DotNetPackage
        )
    }

    /// Objects whose body may declare procedures.
    ///
    /// Interfaces count: they hold procedure declarations without bodies.
    pub fn can_contain_procedures(self) -> bool {
        matches!(
            self,
            SyntaxKind::CodeunitObject
                | SyntaxKind::TableObject
                | SyntaxKind::TableExtensionObject
                | SyntaxKind::PageObject
                | SyntaxKind::PageExtensionObject
                | SyntaxKind::ReportObject
                | SyntaxKind::ReportExtensionObject
                | SyntaxKind::QueryObject
                | SyntaxKind::XmlPortObject
                | SyntaxKind::Interface
        )
    }

    /// Declarations that own a `begin .. end` body.
    pub fn is_method_like(self) -> bool {
        matches!(
            self,
            SyntaxKind::MethodDeclaration | SyntaxKind::TriggerDeclaration
        )
    }

    pub fn is_statement(self) -> bool {
        matches!(
            self,
            SyntaxKind::Block
                | SyntaxKind::AssignmentStatement
                | SyntaxKind::CompoundAssignmentStatement
                | SyntaxKind::IfStatement
                | SyntaxKind::CaseStatement
                | SyntaxKind::WithStatement
                | SyntaxKind::RepeatStatement
                | SyntaxKind::WhileStatement
                | SyntaxKind::ForStatement
                | SyntaxKind::ForEachStatement
                | SyntaxKind::ExitStatement
                | SyntaxKind::BreakStatement
                | SyntaxKind::EmptyStatement
        )
    }

    /// Nodes whose children are a sequence of statements.
    ///
    /// `RepeatStatement` qualifies as well: its trailing `until` condition is
    /// the only non-statement child.
    pub fn is_statement_list(self) -> bool {
        matches!(
            self,
            SyntaxKind::Block | SyntaxKind::RepeatStatement | SyntaxKind::CaseElse
        )
    }

    pub fn is_unary_expression(self) -> bool {
        matches!(
            self,
            SyntaxKind::UnaryPlusExpression
                | SyntaxKind::UnaryMinusExpression
                | SyntaxKind::UnaryNotExpression
        )
    }

    pub fn is_arithmetic_expression(self) -> bool {
        matches!(
            self,
            SyntaxKind::AddExpression
                | SyntaxKind::SubtractExpression
                | SyntaxKind::MultiplyExpression
                | SyntaxKind::DivideExpression
                | SyntaxKind::IntegerDivideExpression
                | SyntaxKind::ModuloExpression
        )
    }

    pub fn is_logical_expression(self) -> bool {
        matches!(
            self,
            SyntaxKind::LogicalAndExpression
                | SyntaxKind::LogicalOrExpression
                | SyntaxKind::LogicalXorExpression
        )
    }

    pub fn is_comparison_expression(self) -> bool {
        matches!(
            self,
            SyntaxKind::EqualsExpression
                | SyntaxKind::NotEqualsExpression
                | SyntaxKind::LessThanExpression
                | SyntaxKind::LessThanOrEqualExpression
                | SyntaxKind::GreaterThanExpression
                | SyntaxKind::GreaterThanOrEqualExpression
        )
    }

    pub fn is_binary_expression(self) -> bool {
        self.is_arithmetic_expression()
            || self.is_logical_expression()
            || self.is_comparison_expression()
            || self == SyntaxKind::InExpression
    }

    pub fn is_expression(self) -> bool {
        self.is_binary_expression()
            || self.is_unary_expression()
            || matches!(
                self,
                SyntaxKind::IdentifierName
                    | SyntaxKind::MemberAccessExpression
                    | SyntaxKind::InvocationExpression
                    | SyntaxKind::ElementAccessExpression
                    | SyntaxKind::OptionAccessExpression
                    | SyntaxKind::ParenthesizedExpression
                    | SyntaxKind::InList
                    | SyntaxKind::RangeExpression
                    | SyntaxKind::LiteralExpression
            )
    }

    pub fn is_literal_value(self) -> bool {
        matches!(
            self,
            SyntaxKind::BooleanLiteralValue
                | SyntaxKind::StringLiteralValue
                | SyntaxKind::Int32SignedLiteralValue
                | SyntaxKind::Int64SignedLiteralValue
                | SyntaxKind::DecimalSignedLiteralValue
                | SyntaxKind::DateLiteralValue
                | SyntaxKind::TimeLiteralValue
                | SyntaxKind::DateTimeLiteralValue
        )
    }

    /// Keyword used to declare an object of this kind (`codeunit`, `table`, ...).
    pub fn object_keyword(self) -> Option<&'static str> {
        let kw = match self {
            SyntaxKind::CodeunitObject => "codeunit",
            SyntaxKind::TableObject => "table",
            SyntaxKind::TableExtensionObject => "tableextension",
            SyntaxKind::PageObject => "page",
            SyntaxKind::PageExtensionObject => "pageextension",
            SyntaxKind::PageCustomizationObject => "pagecustomization",
            SyntaxKind::ReportObject => "report",
            SyntaxKind::ReportExtensionObject => "reportextension",
            SyntaxKind::QueryObject => "query",
            SyntaxKind::XmlPortObject => "xmlport",
            SyntaxKind::EnumType => "enum",
            SyntaxKind::EnumExtensionType => "enumextension",
            SyntaxKind::Interface => "interface",
            SyntaxKind::ControlAddInObject => "controladdin",
            SyntaxKind::PermissionSet => "permissionset",
            SyntaxKind::PermissionSetExtension => "permissionsetextension",
            SyntaxKind::ProfileObject => "profile",
            SyntaxKind::DotNetPackage => "dotnet",
            _ => return None,
        };
        Some(kw)
    }

    pub fn from_object_keyword(keyword: &str) -> Option<SyntaxKind> {
        const OBJECTS: [SyntaxKind; 18] = [
            SyntaxKind::CodeunitObject,
            SyntaxKind::TableObject,
            SyntaxKind::TableExtensionObject,
            SyntaxKind::PageObject,
            SyntaxKind::PageExtensionObject,
            SyntaxKind::PageCustomizationObject,
            SyntaxKind::ReportObject,
            SyntaxKind::ReportExtensionObject,
            SyntaxKind::QueryObject,
            SyntaxKind::XmlPortObject,
            SyntaxKind::EnumType,
            SyntaxKind::EnumExtensionType,
            SyntaxKind::Interface,
            SyntaxKind::ControlAddInObject,
            SyntaxKind::PermissionSet,
            SyntaxKind::PermissionSetExtension,
            SyntaxKind::ProfileObject,
            SyntaxKind::DotNetPackage,
        ];
        OBJECTS.into_iter().find(|kind| {
            kind.object_keyword()
                .is_some_and(|kw| kw.eq_ignore_ascii_case(keyword))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_keywords_round_trip() {
        assert_eq!(
            SyntaxKind::from_object_keyword("Codeunit"),
            Some(SyntaxKind::CodeunitObject)
        );
        assert_eq!(
            SyntaxKind::from_object_keyword("tableextension"),
            Some(SyntaxKind::TableExtensionObject)
        );
        assert_eq!(SyntaxKind::from_object_keyword("procedure"), None);
    }

    #[test]
    fn enums_cannot_hold_procedures() {
        assert!(SyntaxKind::EnumType.is_object());
        assert!(!SyntaxKind::EnumType.can_contain_procedures());
        assert!(SyntaxKind::Interface.can_contain_procedures());
    }

    #[test]
    fn in_expression_is_binary() {
        assert!(SyntaxKind::InExpression.is_binary_expression());
        assert!(!SyntaxKind::InList.is_binary_expression());
    }
}
