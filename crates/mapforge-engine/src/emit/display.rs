//! Text rendering of the IR as C#.

use super::ir::{BinaryOp, Expr, Pattern, Stmt, SwitchArm};
use std::fmt;

/// Signature line of a generated method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodSignature {
    /// `public partial`, `private`
    pub modifiers: String,
    pub name: String,
    pub return_type: String,
    /// `(type, name)` pairs.
    pub parameters: Vec<(String, String)>,
}

pub struct CodePrinter {
    output: String,
    indent_level: u32,
    indent_str: &'static str,
}

impl Default for CodePrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodePrinter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
            indent_str: "    ",
        }
    }

    pub fn with_indent(indent_str: &'static str) -> Self {
        Self {
            indent_str,
            ..Self::new()
        }
    }

    pub fn finish(self) -> String {
        self.output
    }

    // =========================================================================
    // Output helpers
    // =========================================================================

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn write_line(&mut self) {
        self.output.push('\n');
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str(self.indent_str);
        }
    }

    fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    fn decrease_indent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    fn write_comma_separated(&mut self, items: &[Expr]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print_expr(item);
        }
    }

    fn write_initializers(&mut self, initializers: &[(String, Expr)]) {
        self.write("{ ");
        for (i, (name, value)) in initializers.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(name);
            self.write(" = ");
            self.print_expr(value);
        }
        self.write(" }");
    }

    // =========================================================================
    // Methods
    // =========================================================================

    pub fn print_class(&mut self, name: &str, members: impl FnOnce(&mut Self)) {
        self.write_indent();
        self.write("public partial class ");
        self.write(name);
        self.write_line();
        self.write_indent();
        self.write("{");
        self.write_line();
        self.increase_indent();
        members(self);
        self.decrease_indent();
        self.write_indent();
        self.write("}");
        self.write_line();
    }

    pub fn print_blank_line(&mut self) {
        self.write_line();
    }

    pub fn print_method(&mut self, signature: &MethodSignature, body: &[Stmt]) {
        self.write_indent();
        self.write(&signature.modifiers);
        self.write(" ");
        self.write(&signature.return_type);
        self.write(" ");
        self.write(&signature.name);
        self.write("(");
        for (i, (type_name, name)) in signature.parameters.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(type_name);
            self.write(" ");
            self.write(name);
        }
        self.write(")");
        self.write_line();
        self.print_block(body);
        self.write_line();
    }

    fn print_block(&mut self, body: &[Stmt]) {
        self.write_indent();
        self.write("{");
        self.write_line();
        self.increase_indent();
        for stmt in body {
            self.print_stmt(stmt);
        }
        self.decrease_indent();
        self.write_indent();
        self.write("}");
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub fn print_stmt(&mut self, stmt: &Stmt) {
        self.write_indent();
        match stmt {
            Stmt::Local { name, value } => {
                self.write("var ");
                self.write(name);
                self.write(" = ");
                self.print_expr(value);
                self.write(";");
            }
            Stmt::Assign { target, value } => {
                self.print_expr(target);
                self.write(" = ");
                self.print_expr(value);
                self.write(";");
            }
            Stmt::Expr(expr) => {
                self.print_expr(expr);
                self.write(";");
            }
            Stmt::If {
                condition,
                then,
                otherwise,
            } => {
                self.write("if (");
                self.print_expr(condition);
                self.write(")");
                self.write_line();
                self.print_block(then);
                if !otherwise.is_empty() {
                    self.write_line();
                    self.write_indent();
                    self.write("else");
                    self.write_line();
                    self.print_block(otherwise);
                }
            }
            Stmt::ForEach { item, source, body } => {
                self.write("foreach (var ");
                self.write(item);
                self.write(" in ");
                self.print_expr(source);
                self.write(")");
                self.write_line();
                self.print_block(body);
            }
            Stmt::For {
                index,
                length,
                body,
            } => {
                self.write("for (var ");
                self.write(index);
                self.write(" = 0; ");
                self.write(index);
                self.write(" < ");
                self.print_expr(length);
                self.write("; ");
                self.write(index);
                self.write("++)");
                self.write_line();
                self.print_block(body);
            }
            Stmt::Return(value) => {
                self.write("return");
                if let Some(value) = value {
                    self.write(" ");
                    self.print_expr(value);
                }
                self.write(";");
            }
            Stmt::Throw { type_name, args } => {
                self.write("throw new ");
                self.write(type_name);
                self.write("(");
                self.write_comma_separated(args);
                self.write(");");
            }
        }
        self.write_line();
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub fn print_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(name) | Expr::Literal(name) => self.write(name),
            Expr::Null => self.write("null"),
            Expr::Default => self.write("default"),
            Expr::Base => self.write("base"),
            Expr::TypeOf(type_name) => {
                self.write("typeof(");
                self.write(type_name);
                self.write(")");
            }
            Expr::Member { target, name } => {
                self.print_primary(target);
                self.write(".");
                self.write(name);
            }
            Expr::ConditionalAccess { target, name } => {
                self.print_primary(target);
                self.write("?.");
                self.write(name);
            }
            Expr::Index { target, index } => {
                self.print_primary(target);
                self.write("[");
                self.print_expr(index);
                self.write("]");
            }
            Expr::Range { start, end } => {
                if let Some(start) = start {
                    self.print_primary(start);
                }
                self.write("..");
                if let Some(end) = end {
                    self.print_primary(end);
                }
            }
            Expr::Call {
                receiver,
                method,
                args,
            } => {
                if let Some(receiver) = receiver {
                    self.print_primary(receiver);
                    self.write(".");
                }
                self.write(method);
                self.write("(");
                self.write_comma_separated(args);
                self.write(")");
            }
            Expr::New {
                type_name,
                args,
                initializers,
            } => {
                self.write("new ");
                match (type_name.strip_suffix("[]"), args.as_slice()) {
                    (Some(element), [length]) => {
                        self.write(element);
                        self.write("[");
                        self.print_expr(length);
                        self.write("]");
                    }
                    _ => {
                        self.write(type_name);
                        self.write("(");
                        self.write_comma_separated(args);
                        self.write(")");
                        if !initializers.is_empty() {
                            self.write(" ");
                            self.write_initializers(initializers);
                        }
                    }
                }
            }
            Expr::CollectionExpr(items) => {
                self.write("[");
                self.write_comma_separated(items);
                self.write("]");
            }
            Expr::Tuple(items) => {
                self.write("(");
                for (i, (name, value)) in items.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    if let Some(name) = name {
                        self.write(name);
                        self.write(": ");
                    }
                    self.print_expr(value);
                }
                self.write(")");
            }
            Expr::With {
                target,
                initializers,
            } => {
                self.print_primary(target);
                self.write(" with ");
                self.write_initializers(initializers);
            }
            Expr::Cast { type_name, expr } => {
                self.write("(");
                self.write(type_name);
                self.write(")");
                self.print_primary(expr);
            }
            Expr::Binary { op, left, right } => {
                self.print_operand(*op, left);
                self.write(" ");
                self.write(op.token());
                self.write(" ");
                self.print_operand(*op, right);
            }
            Expr::Conditional {
                condition,
                when_true,
                when_false,
            } => {
                self.print_wrapped(condition, matches!(**condition, Expr::Conditional { .. }));
                self.write(" ? ");
                self.print_expr(when_true);
                self.write(" : ");
                self.print_expr(when_false);
            }
            Expr::Is { expr, pattern } => {
                self.print_primary(expr);
                self.write(" is ");
                self.print_pattern(pattern);
            }
            Expr::NameOf(expr) => {
                self.write("nameof(");
                self.print_expr(expr);
                self.write(")");
            }
            Expr::Lambda { param, body } => {
                self.write(param);
                self.write(" => ");
                self.print_expr(body);
            }
            Expr::Switch { subject, arms } => self.print_switch(subject, arms),
            Expr::Throw { type_name, args } => {
                self.write("throw new ");
                self.write(type_name);
                self.write("(");
                self.write_comma_separated(args);
                self.write(")");
            }
        }
    }

    fn print_switch(&mut self, subject: &Expr, arms: &[SwitchArm]) {
        self.print_primary(subject);
        self.write(" switch");
        self.write_line();
        self.write_indent();
        self.write("{");
        self.write_line();
        self.increase_indent();
        for arm in arms {
            self.write_indent();
            self.print_pattern(&arm.pattern);
            if let Some(guard) = &arm.guard {
                self.write(" when ");
                self.print_expr(guard);
            }
            self.write(" => ");
            self.print_expr(&arm.value);
            self.write(",");
            self.write_line();
        }
        self.decrease_indent();
        self.write_indent();
        self.write("}");
    }

    fn print_pattern(&mut self, pattern: &Pattern) {
        match pattern {
            Pattern::Constant(expr) => self.print_expr(expr),
            Pattern::Type { type_name, binding } => {
                self.write(type_name);
                if let Some(binding) = binding {
                    self.write(" ");
                    self.write(binding);
                }
            }
            Pattern::Null => self.write("null"),
            Pattern::Discard => self.write("_"),
        }
    }

    /// Receiver position: anything but a primary expression is parenthesized.
    fn print_primary(&mut self, expr: &Expr) {
        self.print_wrapped(expr, !is_primary(expr));
    }

    fn print_operand(&mut self, op: BinaryOp, operand: &Expr) {
        let wrap = match operand {
            Expr::Binary { op: inner, .. } => *inner != op,
            Expr::Is { .. } => !matches!(op, BinaryOp::And | BinaryOp::Or),
            Expr::Conditional { .. } | Expr::Lambda { .. } | Expr::Switch { .. } | Expr::With { .. } => true,
            _ => false,
        };
        self.print_wrapped(operand, wrap);
    }

    fn print_wrapped(&mut self, expr: &Expr, wrap: bool) {
        if wrap {
            self.write("(");
        }
        self.print_expr(expr);
        if wrap {
            self.write(")");
        }
    }
}

fn is_primary(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Ident(_)
            | Expr::Literal(_)
            | Expr::Null
            | Expr::Default
            | Expr::Base
            | Expr::TypeOf(_)
            | Expr::Member { .. }
            | Expr::ConditionalAccess { .. }
            | Expr::Index { .. }
            | Expr::Call { .. }
            | Expr::CollectionExpr(_)
            | Expr::Tuple(_)
            | Expr::NameOf(_)
    )
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printer = CodePrinter::new();
        printer.print_expr(self);
        f.write_str(&printer.finish())
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printer = CodePrinter::new();
        printer.print_stmt(self);
        f.write_str(printer.finish().trim_end())
    }
}
