use super::{Grammar, SymbolId};
use crate::error::GrammarError;

macro_rules! known_symbols {
    ($($field:ident => $name:literal,)*) => {
        /// Symbols the driver and the recovery snapshot look for by identity.
        ///
        /// Resolved once when the tables are built, so a renamed nonterminal fails the
        /// load instead of silently disabling recovery.
        #[derive(Debug, Clone)]
        pub struct KnownSymbols {
            $(pub $field: SymbolId,)*
        }

        impl KnownSymbols {
            pub fn resolve(grammar: &Grammar) -> Result<Self, GrammarError> {
                Ok(Self {
                    $($field: grammar
                        .symbol_id($name)
                        .ok_or_else(|| GrammarError::MissingSymbol($name.to_string()))?,)*
                })
            }
        }
    };
}

known_symbols! {
    lbrace => "'{'",
    rparen => "')'",
    modifiers => "Modifiers",
    modifiers_opt => "Modifiersopt",
    ty => "Type",
    declarator_id => "VariableDeclaratorId",
    declarator => "VariableDeclarator",
    declarators => "VariableDeclarators",
    formal_parameter => "FormalParameter",
    class_extends => "ClassHeaderExtendsopt",
    class_implements => "ClassHeaderImplementsopt",
    interface_extends => "InterfaceHeaderExtendsopt",
    nested_method => "NestedMethod",
    open_block => "OpenBlock",
    enter_anonymous => "EnterAnonymousClassBody",
    class_header_name => "ClassHeaderName",
    class_header => "ClassHeader",
    interface_header_name => "InterfaceHeaderName",
    interface_header => "InterfaceHeader",
    enum_header_name => "EnumHeaderName",
    enum_header => "EnumHeader",
    method_header_name => "MethodHeaderName",
    method_header => "MethodHeader",
    constructor_header_name => "ConstructorHeaderName",
    constructor_header => "ConstructorHeader",
    module_header => "ModuleHeader",
    exports_header => "ExportsHeader",
    opens_header => "OpensHeader",
    enum_constant_header => "EnumConstantHeader",
    package_name => "PackageDeclarationName",
    import_name => "ImportDeclarationName",
    headers => "Headers",
}

impl KnownSymbols {
    /// Whether a stack entry of this symbol holds a declaration that is still waiting
    /// for its body or terminator.
    #[must_use]
    pub fn is_incomplete_header(&self, symbol: SymbolId) -> bool {
        [
            self.class_header_name,
            self.class_header,
            self.interface_header_name,
            self.interface_header,
            self.enum_header_name,
            self.enum_header,
            self.method_header_name,
            self.method_header,
            self.constructor_header_name,
            self.constructor_header,
            self.module_header,
            self.exports_header,
            self.opens_header,
            self.enum_constant_header,
            self.package_name,
            self.import_name,
        ]
        .contains(&symbol)
    }

    /// Whether a `{` shifted right after this symbol opens a body that recovery tracks.
    #[must_use]
    pub fn opens_tracked_body(&self, previous: SymbolId) -> bool {
        [
            self.class_header,
            self.interface_header,
            self.enum_header,
            self.module_header,
            self.nested_method,
            self.open_block,
            self.enter_anonymous,
            self.rparen,
        ]
        .contains(&previous)
    }
}
