//! Blocks and statements.

use super::with_dims;
use crate::ast::{
    Block, CatchClause, CatchParameter, LocalVariable, Modifiers, Statement, StatementKind,
    SwitchGroup, SwitchLabel,
};
use crate::error::Abort;
use crate::parser::driver::Session;
use crate::parser::node::AstNode;

impl Session<'_> {
    /// `OpenBlock '{' BlockStatementsopt '}'`
    pub(super) fn block(&mut self) -> Result<(), Abort> {
        let statements = self.pop_statements()?;
        let range = self.lhs();
        self.push_statement(StatementKind::Block(Block { statements, range }));
        Ok(())
    }

    pub(super) fn local_type(&mut self) -> Result<(), Abort> {
        let ty = self.pop_node()?.into_type()?;
        self.push_statement(StatementKind::LocalType(ty));
        Ok(())
    }

    /// Widens every declarator statement to include the `;`.
    pub(super) fn local_variable_statement(&mut self) -> Result<(), Abort> {
        let range = self.lhs();
        let mut statements = self.pop_statements()?;
        for statement in &mut statements {
            statement.range = range;
        }
        self.values
            .ast
            .push_unit(statements.into_iter().map(AstNode::Statement));
        Ok(())
    }

    /// `[Modifiers] Type VariableDeclarators`, one statement per declarator.
    pub(super) fn local_variable_declaration(&mut self, modified: bool) -> Result<(), Abort> {
        let declarators = self.pop_nodes_as(AstNode::into_declarator)?;
        let ty = self.pop_type()?;
        let modifiers = if modified {
            self.pop_modifiers()?
        } else {
            Modifiers::default()
        };
        let range = self.lhs();
        let statements = declarators.into_iter().map(|declarator| {
            let variable = LocalVariable {
                modifiers: modifiers.clone(),
                ty: with_dims(&ty, declarator.dims),
                name: declarator.name,
                initializer: declarator.initializer,
                range: declarator.range,
            };
            AstNode::Statement(Statement::new(StatementKind::LocalVariable(variable), range))
        });
        self.values.ast.push_unit(statements);
        Ok(())
    }

    pub(super) fn labeled_statement(&mut self) -> Result<(), Abort> {
        let body = self.pop_statement()?;
        let label = self.pop_ident()?;
        self.push_statement(StatementKind::Labeled {
            label,
            body: Box::new(body),
        });
        Ok(())
    }

    pub(super) fn expression_statement(&mut self) -> Result<(), Abort> {
        let expr = self.pop_expr()?;
        self.push_statement(StatementKind::Expression(expr));
        Ok(())
    }

    /// A for-init list of statement expressions.
    pub(super) fn expression_statements(&mut self) -> Result<(), Abort> {
        let exprs = self.pop_exprs()?;
        let statements = exprs.into_iter().map(|expr| {
            let range = expr.range;
            AstNode::Statement(Statement::new(StatementKind::Expression(expr), range))
        });
        self.values.ast.push_unit(statements);
        Ok(())
    }

    pub(super) fn if_statement(&mut self, with_else: bool) -> Result<(), Abort> {
        let else_branch = if with_else {
            Some(Box::new(self.pop_statement()?))
        } else {
            None
        };
        let then_branch = Box::new(self.pop_statement()?);
        let condition = self.pop_expr()?;
        self.push_statement(StatementKind::If {
            condition,
            then_branch,
            else_branch,
        });
        Ok(())
    }

    pub(super) fn switch_statement(&mut self) -> Result<(), Abort> {
        let groups = self.pop_nodes_as(AstNode::into_switch_group)?;
        let selector = self.pop_expr()?;
        self.push_statement(StatementKind::Switch { selector, groups });
        Ok(())
    }

    /// Labels right before the closing brace form a group without statements. With
    /// `after_groups` they follow the groups of `SwitchBlockStatements`.
    pub(super) fn trailing_switch_labels(&mut self, after_groups: bool) -> Result<(), Abort> {
        let labels = self.pop_nodes_as(AstNode::into_switch_label)?;
        let range = self.rhs(if after_groups { 2 } else { 1 });
        let group = AstNode::SwitchGroup(SwitchGroup {
            labels,
            statements: Vec::new(),
            range,
        });
        if after_groups {
            self.values.ast.append(group)?;
        } else {
            self.values.ast.push_unit([group]);
        }
        Ok(())
    }

    pub(super) fn switch_group(&mut self) -> Result<(), Abort> {
        let statements = self.pop_statements()?;
        let labels = self.pop_nodes_as(AstNode::into_switch_label)?;
        self.push_node(AstNode::SwitchGroup(SwitchGroup {
            labels,
            statements,
            range: self.lhs(),
        }));
        Ok(())
    }

    /// `case value:` or `default:`
    pub(super) fn switch_label(&mut self, case: bool) -> Result<(), Abort> {
        let value = if case { Some(self.pop_expr()?) } else { None };
        self.push_node(AstNode::SwitchLabel(SwitchLabel {
            value,
            range: self.lhs(),
        }));
        Ok(())
    }

    pub(super) fn while_statement(&mut self) -> Result<(), Abort> {
        let body = Box::new(self.pop_statement()?);
        let condition = self.pop_expr()?;
        self.push_statement(StatementKind::While { condition, body });
        Ok(())
    }

    pub(super) fn do_statement(&mut self) -> Result<(), Abort> {
        let condition = self.pop_expr()?;
        let body = Box::new(self.pop_statement()?);
        self.push_statement(StatementKind::Do { body, condition });
        Ok(())
    }

    /// `for (ForInitopt; Expressionopt; ForUpdateopt) Statement`
    pub(super) fn for_statement(&mut self) -> Result<(), Abort> {
        let body = Box::new(self.pop_statement()?);
        let update = self.pop_exprs()?;
        let condition = self.values.expr.pop_optional()?;
        let init = self.pop_statements()?;
        self.push_statement(StatementKind::For {
            init,
            condition,
            update,
            body,
        });
        Ok(())
    }

    pub(super) fn enhanced_for_statement(&mut self) -> Result<(), Abort> {
        let body = Box::new(self.pop_statement()?);
        let iterable = self.pop_expr()?;
        let variable = self.pop_node()?.into_variable()?;
        self.push_statement(StatementKind::ForEach {
            variable,
            iterable,
            body,
        });
        Ok(())
    }

    /// `[Modifiers] Type Identifier`
    pub(super) fn for_each_variable(&mut self, modified: bool) -> Result<(), Abort> {
        let name = self.pop_ident()?;
        let ty = self.pop_type()?;
        let modifiers = if modified {
            self.pop_modifiers()?
        } else {
            Modifiers::default()
        };
        self.push_node(AstNode::Variable(LocalVariable {
            modifiers,
            ty,
            name,
            initializer: None,
            range: self.lhs(),
        }));
        Ok(())
    }

    /// `break` and `continue`, optionally labeled.
    pub(super) fn jump_statement(&mut self, is_break: bool, labeled: bool) -> Result<(), Abort> {
        let label = if labeled { Some(self.pop_ident()?) } else { None };
        self.push_statement(if is_break {
            StatementKind::Break(label)
        } else {
            StatementKind::Continue(label)
        });
        Ok(())
    }

    pub(super) fn return_statement(&mut self) -> Result<(), Abort> {
        let value = self.values.expr.pop_optional()?;
        self.push_statement(StatementKind::Return(value));
        Ok(())
    }

    pub(super) fn throw_statement(&mut self) -> Result<(), Abort> {
        let value = self.pop_expr()?;
        self.push_statement(StatementKind::Throw(value));
        Ok(())
    }

    pub(super) fn synchronized_statement(&mut self) -> Result<(), Abort> {
        let body = self.pop_block()?;
        let lock = self.pop_expr()?;
        self.push_statement(StatementKind::Synchronized { lock, body });
        Ok(())
    }

    pub(super) fn assert_statement(&mut self, with_message: bool) -> Result<(), Abort> {
        let message = if with_message {
            Some(self.pop_expr()?)
        } else {
            None
        };
        let condition = self.pop_expr()?;
        self.push_statement(StatementKind::Assert { condition, message });
        Ok(())
    }

    /// `try [resources] Block [Catches] [Finally]`, popped right to left.
    pub(super) fn try_statement(
        &mut self,
        resources: bool,
        catches: bool,
        finally: bool,
    ) -> Result<(), Abort> {
        let finally = if finally {
            Some(self.pop_block()?)
        } else {
            None
        };
        let catches = if catches {
            self.pop_nodes_as(AstNode::into_catch_clause)?
        } else {
            Vec::new()
        };
        let body = self.pop_block()?;
        let resources = if resources {
            self.pop_nodes_as(AstNode::into_variable)?
        } else {
            Vec::new()
        };
        self.push_statement(StatementKind::Try {
            resources,
            body,
            catches,
            finally,
        });
        Ok(())
    }

    /// `[Modifiers] Type VariableDeclaratorId '=' Expression`
    pub(super) fn resource(&mut self, modified: bool) -> Result<(), Abort> {
        let initializer = self.pop_expr()?;
        let declarator = self.pop_declarator()?;
        let ty = self.pop_type()?;
        let modifiers = if modified {
            self.pop_modifiers()?
        } else {
            Modifiers::default()
        };
        self.push_node(AstNode::Variable(LocalVariable {
            modifiers,
            ty: with_dims(&ty, declarator.dims),
            name: declarator.name,
            initializer: Some(initializer),
            range: self.lhs(),
        }));
        Ok(())
    }

    pub(super) fn catch_clause(&mut self) -> Result<(), Abort> {
        let body = self.pop_block()?;
        let parameter = self.pop_node()?.into_catch_parameter()?;
        self.push_node(AstNode::CatchClause(CatchClause {
            parameter,
            body,
            range: self.lhs(),
        }));
        Ok(())
    }

    /// `Modifiersopt CatchType VariableDeclaratorId`
    pub(super) fn catch_parameter(&mut self) -> Result<(), Abort> {
        let declarator = self.pop_declarator()?;
        let types = self.pop_types()?;
        let modifiers = self.pop_modifiers()?;
        self.push_node(AstNode::CatchParameter(CatchParameter {
            modifiers,
            types,
            name: declarator.name,
            range: self.lhs(),
        }));
        Ok(())
    }
}
