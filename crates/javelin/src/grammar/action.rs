use serde::Deserialize;
use serde::de::IntoDeserializer;
use serde::de::value::{Error as ValueError, StrDeserializer};

/// Semantic action bound to a production.
///
/// Named actions are written `=> snake_case_name` in the grammar. [`RuleAction::Pass`]
/// and [`RuleAction::Nop`] cannot be named: the loader infers them for productions
/// without an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    /// The single valued right-hand symbol becomes the left-hand value.
    #[serde(skip_deserializing)]
    Pass,
    /// Nothing on the right-hand side carries a value and neither does the left.
    #[serde(skip_deserializing)]
    Nop,

    // Generic list plumbing
    Concat,
    EmptyList,

    // Goals
    AcceptCompilationUnit,
    AcceptHeaders,
    AcceptBody,
    AcceptStatements,
    AcceptExpression,

    // Recovery headers
    RecoveredHeader,
    RecoveredInitializer,
    RecoveredOpenBrace,
    RecoveredCloseBrace,
    RecoveredSemicolon,

    // Literals and types
    KeywordLiteral,
    PrimitiveType,
    ClassOrInterface,
    QualifiedClassOrInterface,
    GenericType,
    EnclosedGenericType,
    DoublyEnclosedGenericType,
    ArrayType,
    NameArrayType,
    QualifiedGenericArrayType,
    DimsOne,
    DimsMore,
    DimsNone,
    TypeArgument,
    Wildcard,
    WildcardExtends,
    WildcardSuper,
    TypeParameter,
    TypeParameterBound,
    TypeParameterBounds,

    // Compilation units
    CompilationUnit,
    DeclarationEnd,
    PackageDeclaration,
    AnnotatedPackageDeclaration,
    SingleTypeImport,
    OnDemandImport,
    SingleStaticImport,
    StaticOnDemandImport,

    // Modifiers and annotations
    KeywordModifier,
    AnnotationModifier,
    MarkerAnnotation,
    SingleMemberAnnotation,
    NormalAnnotation,
    ElementValuePair,
    EmptyArrayInitializer,
    ArrayInitializer,

    // Type declarations
    TypeDeclaration,
    ClassHeader,
    ClassHeaderName,
    InterfaceHeader,
    InterfaceHeaderName,
    EnumHeader,
    EnumHeaderName,
    EnumConstant,
    EnumConstantBody,
    EnterAnonymousClassBody,

    // Members
    FieldDeclaration,
    Declarator,
    DeclaratorInitializer,
    MethodDeclaration,
    AbstractMethodDeclaration,
    MethodHeader,
    MethodHeaderName,
    GenericMethodHeaderName,
    VoidMethodHeaderName,
    GenericVoidMethodHeaderName,
    FormalParameter,
    VariableArityParameter,
    MethodBody,
    NestedMethod,
    ConstructorDeclaration,
    ConstructorHeader,
    ConstructorHeaderName,
    GenericConstructorHeaderName,
    ConstructorBody,
    ExplicitConstructorCall,
    QualifiedExplicitConstructorCall,
    NameQualifiedExplicitConstructorCall,
    Initializer,
    StaticInitializer,

    // Modules
    ModuleDeclaration,
    ModuleHeader,
    OpenModuleHeader,
    RequiresStatement,
    RequiresStatementWithModifiers,
    RequiresModifier,
    MergeRequiresModifiers,
    ExportsHeader,
    OpensHeader,
    QualifiedPackageDirective,
    ModuleName,
    AppendModuleName,
    UsesStatement,
    ProvidesStatement,

    // Statements
    Block,
    LocalType,
    LocalVariableStatement,
    LocalVariableDeclaration,
    ModifiedLocalVariableDeclaration,
    EmptyStatement,
    LabeledStatement,
    ExpressionStatement,
    ExpressionStatements,
    IfStatement,
    IfElseStatement,
    SwitchStatement,
    TrailingSwitchLabels,
    SwitchBlockWithTrailingLabels,
    SwitchGroup,
    CaseLabel,
    DefaultLabel,
    WhileStatement,
    DoStatement,
    ForStatement,
    EnhancedForStatement,
    ForEachVariable,
    ModifiedForEachVariable,
    BreakStatement,
    LabeledBreakStatement,
    ContinueStatement,
    LabeledContinueStatement,
    ReturnStatement,
    ThrowStatement,
    SynchronizedStatement,
    AssertStatement,
    AssertWithMessageStatement,
    TryStatement,
    TryFinallyStatement,
    TryCatchFinallyStatement,
    TryWithResourcesStatement,
    TryWithResourcesCatchStatement,
    TryWithResourcesFinallyStatement,
    TryWithResourcesCatchFinallyStatement,
    Resource,
    ModifiedResource,
    CatchClause,
    CatchParameter,

    // Expressions
    ThisExpression,
    QualifiedThis,
    Parenthesized,
    NameClassLiteral,
    NameArrayClassLiteral,
    TypeClassLiteral,
    ArrayTypeClassLiteral,
    VoidClassLiteral,
    InstanceCreation,
    AnonymousInstanceCreation,
    QualifiedInstanceCreation,
    QualifiedAnonymousInstanceCreation,
    NameQualifiedInstanceCreation,
    NameQualifiedAnonymousInstanceCreation,
    ArrayCreation,
    InitializedArrayCreation,
    FieldAccess,
    SuperFieldAccess,
    QualifiedSuperFieldAccess,
    NameMethodInvocation,
    MethodInvocation,
    SuperMethodInvocation,
    QualifiedSuperMethodInvocation,
    NameArrayAccess,
    ArrayAccess,
    NameExpression,
    Postfix,
    Prefix,
    PrimitiveCast,
    NameCast,
    ArrayCast,
    Binary,
    Instanceof,
    Conditional,
    Assignment,
    AssignmentOperator,
}

impl RuleAction {
    /// Looks up an action by its grammar spelling.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let deserializer: StrDeserializer<'_, ValueError> = name.into_deserializer();
        Self::deserialize(deserializer).ok()
    }

    /// Whether reducing with this action feeds the recovery tree rather than the
    /// value stacks.
    #[must_use]
    pub const fn is_recovery(self) -> bool {
        matches!(
            self,
            Self::RecoveredHeader
                | Self::RecoveredInitializer
                | Self::RecoveredOpenBrace
                | Self::RecoveredCloseBrace
                | Self::RecoveredSemicolon
        )
    }

    #[must_use]
    pub const fn is_accept(self) -> bool {
        matches!(
            self,
            Self::AcceptCompilationUnit
                | Self::AcceptHeaders
                | Self::AcceptBody
                | Self::AcceptStatements
                | Self::AcceptExpression
        )
    }
}
