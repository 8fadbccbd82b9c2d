//! Neutral IR for generated mapping code.
//!
//! Mappings describe *what* to do; `MappingBuilder` lowers them into this
//! tree of C#-shaped expressions and statements, and `CodePrinter` renders
//! the tree as text. Hosts that generate code themselves consume the tree
//! directly.
//!
//! The IR is also the representation of user implemented method bodies that
//! may be inlined into projections, see [`Expr::forbidden_construct`].

use serde::Serialize;
use std::convert::Infallible;

/// Binary operators used by generated code.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `??`
    Coalesce,
    /// `+`
    Add,
}

impl BinaryOp {
    pub const fn token(self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::And => "&&",
            Self::Or => "||",
            Self::Coalesce => "??",
            Self::Add => "+",
        }
    }
}

/// Expression node
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Expr {
    // =========================================================================
    // Leaves
    // =========================================================================
    /// Identifier: `source`, `x`
    Ident(String),

    /// Literal as written: `42`, `"text"`, `Color.Red`
    Literal(String),

    /// `null`
    Null,

    /// `default`
    Default,

    /// `base`
    Base,

    /// `typeof(T)`
    TypeOf(String),

    // =========================================================================
    // Access
    // =========================================================================
    /// Member access: `target.name`
    Member { target: Box<Self>, name: String },

    /// Null-conditional access: `target?.name`
    ConditionalAccess { target: Box<Self>, name: String },

    /// Element access: `target[index]`
    Index { target: Box<Self>, index: Box<Self> },

    /// Range: `start..end`
    Range {
        start: Option<Box<Self>>,
        end: Option<Box<Self>>,
    },

    // =========================================================================
    // Calls and construction
    // =========================================================================
    /// Call: `receiver.method(args)` or `method(args)`
    Call {
        receiver: Option<Box<Self>>,
        method: String,
        args: Vec<Self>,
    },

    /// Object creation: `new T(args) { Name = value }`, or
    /// `new T[length]` when `type_name` ends in `[]`
    New {
        type_name: String,
        args: Vec<Self>,
        initializers: Vec<(String, Self)>,
    },

    /// `new[] { a, b }` style collection literal: `[a, b]`
    CollectionExpr(Vec<Self>),

    /// Tuple literal: `(Id: a, b)`
    Tuple(Vec<(Option<String>, Self)>),

    /// `target with { Name = value }`
    With {
        target: Box<Self>,
        initializers: Vec<(String, Self)>,
    },

    // =========================================================================
    // Operators
    // =========================================================================
    /// Cast: `(T)expr`
    Cast { type_name: String, expr: Box<Self> },

    /// Binary expression: `left op right`
    Binary {
        op: BinaryOp,
        left: Box<Self>,
        right: Box<Self>,
    },

    /// Conditional: `condition ? when_true : when_false`
    Conditional {
        condition: Box<Self>,
        when_true: Box<Self>,
        when_false: Box<Self>,
    },

    /// Type test: `expr is pattern`
    Is { expr: Box<Self>, pattern: Box<Pattern> },

    /// `nameof(expr)`
    NameOf(Box<Self>),

    /// Lambda with a single parameter: `x => body`
    Lambda { param: String, body: Box<Self> },

    /// Switch expression: `subject switch { arms }`
    Switch {
        subject: Box<Self>,
        arms: Vec<SwitchArm>,
    },

    /// Throw expression: `throw new T(args)`
    Throw { type_name: String, args: Vec<Self> },
}

/// One arm of a switch expression: `pattern when guard => value`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SwitchArm {
    pub pattern: Pattern,
    pub guard: Option<Expr>,
    pub value: Expr,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Pattern {
    /// Constant pattern: `Color.Red`, `"Red"`
    Constant(Expr),
    /// Declaration pattern: `Car x`, or a plain type pattern without binding
    Type {
        type_name: String,
        binding: Option<String>,
    },
    /// `null`
    Null,
    /// `_`
    Discard,
}

/// Statement node
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Stmt {
    /// `var name = value;`
    Local { name: String, value: Expr },
    /// `target = value;`
    Assign { target: Expr, value: Expr },
    /// `expr;`
    Expr(Expr),
    /// `if (condition) { then } else { otherwise }`
    If {
        condition: Expr,
        then: Vec<Stmt>,
        otherwise: Vec<Stmt>,
    },
    /// `foreach (var item in source) { body }`
    ForEach {
        item: String,
        source: Expr,
        body: Vec<Stmt>,
    },
    /// `for (var index = 0; index < length; index++) { body }`
    For {
        index: String,
        length: Expr,
        body: Vec<Stmt>,
    },
    Return(Option<Expr>),
    /// `throw new T(args);`
    Throw { type_name: String, args: Vec<Expr> },
}

/// Constructs that cannot appear in an expression tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ForbiddenConstruct {
    ConditionalAccess,
    With,
    Base,
    Range,
    Tuple,
    Switch,
    Throw,
    CollectionExpression,
}

// =============================================================================
// Constructors
// =============================================================================

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident(name.into())
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// C# string literal with escapes.
    pub fn string(text: &str) -> Self {
        let mut out = String::with_capacity(text.len() + 2);
        out.push('"');
        for ch in text.chars() {
            match ch {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                _ => out.push(ch),
            }
        }
        out.push('"');
        Self::Literal(out)
    }

    pub fn member(self, name: impl Into<String>) -> Self {
        Self::Member {
            target: Box::new(self),
            name: name.into(),
        }
    }

    pub fn call(self, method: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Call {
            receiver: Some(Box::new(self)),
            method: method.into(),
            args,
        }
    }

    pub fn static_call(method: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Call {
            receiver: None,
            method: method.into(),
            args,
        }
    }

    pub fn new_object(type_name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::New {
            type_name: type_name.into(),
            args,
            initializers: Vec::new(),
        }
    }

    pub fn cast(type_name: impl Into<String>, expr: Self) -> Self {
        Self::Cast {
            type_name: type_name.into(),
            expr: Box::new(expr),
        }
    }

    pub fn binary(op: BinaryOp, left: Self, right: Self) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn is_null(self) -> Self {
        Self::binary(BinaryOp::Equal, self, Self::Null)
    }

    pub fn is_not_null(self) -> Self {
        Self::binary(BinaryOp::NotEqual, self, Self::Null)
    }

    pub fn conditional(condition: Self, when_true: Self, when_false: Self) -> Self {
        Self::Conditional {
            condition: Box::new(condition),
            when_true: Box::new(when_true),
            when_false: Box::new(when_false),
        }
    }

    pub fn lambda(param: impl Into<String>, body: Self) -> Self {
        Self::Lambda {
            param: param.into(),
            body: Box::new(body),
        }
    }

    pub fn throw(type_name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Throw {
            type_name: type_name.into(),
            args,
        }
    }

    pub fn name_of(self) -> Self {
        Self::NameOf(Box::new(self))
    }
}

// =============================================================================
// Traversal
// =============================================================================

impl Expr {
    /// Rebuild this node with every direct child replaced by `f(child)`.
    pub fn try_map_children<E>(&self, f: &mut dyn FnMut(&Self) -> Result<Self, E>) -> Result<Self, E> {
        fn boxed<E>(e: &Expr, f: &mut dyn FnMut(&Expr) -> Result<Expr, E>) -> Result<Box<Expr>, E> {
            f(e).map(Box::new)
        }
        Ok(match self {
            Self::Ident(_)
            | Self::Literal(_)
            | Self::Null
            | Self::Default
            | Self::Base
            | Self::TypeOf(_) => self.clone(),
            Self::Member { target, name } => Self::Member {
                target: boxed(target, f)?,
                name: name.clone(),
            },
            Self::ConditionalAccess { target, name } => Self::ConditionalAccess {
                target: boxed(target, f)?,
                name: name.clone(),
            },
            Self::Index { target, index } => Self::Index {
                target: boxed(target, f)?,
                index: boxed(index, f)?,
            },
            Self::Range { start, end } => Self::Range {
                start: start.as_deref().map(|e| boxed(e, f)).transpose()?,
                end: end.as_deref().map(|e| boxed(e, f)).transpose()?,
            },
            Self::Call {
                receiver,
                method,
                args,
            } => Self::Call {
                receiver: receiver.as_deref().map(|e| boxed(e, f)).transpose()?,
                method: method.clone(),
                args: args.iter().map(&mut *f).collect::<Result<_, _>>()?,
            },
            Self::New {
                type_name,
                args,
                initializers,
            } => Self::New {
                type_name: type_name.clone(),
                args: args.iter().map(&mut *f).collect::<Result<_, _>>()?,
                initializers: initializers
                    .iter()
                    .map(|(name, value)| f(value).map(|v| (name.clone(), v)))
                    .collect::<Result<_, _>>()?,
            },
            Self::CollectionExpr(items) => {
                Self::CollectionExpr(items.iter().map(&mut *f).collect::<Result<_, _>>()?)
            }
            Self::Tuple(items) => Self::Tuple(
                items
                    .iter()
                    .map(|(name, value)| f(value).map(|v| (name.clone(), v)))
                    .collect::<Result<_, _>>()?,
            ),
            Self::With {
                target,
                initializers,
            } => Self::With {
                target: boxed(target, f)?,
                initializers: initializers
                    .iter()
                    .map(|(name, value)| f(value).map(|v| (name.clone(), v)))
                    .collect::<Result<_, _>>()?,
            },
            Self::Cast { type_name, expr } => Self::Cast {
                type_name: type_name.clone(),
                expr: boxed(expr, f)?,
            },
            Self::Binary { op, left, right } => Self::Binary {
                op: *op,
                left: boxed(left, f)?,
                right: boxed(right, f)?,
            },
            Self::Conditional {
                condition,
                when_true,
                when_false,
            } => Self::Conditional {
                condition: boxed(condition, f)?,
                when_true: boxed(when_true, f)?,
                when_false: boxed(when_false, f)?,
            },
            Self::Is { expr, pattern } => Self::Is {
                expr: boxed(expr, f)?,
                pattern: pattern.clone(),
            },
            Self::NameOf(expr) => Self::NameOf(boxed(expr, f)?),
            Self::Lambda { param, body } => Self::Lambda {
                param: param.clone(),
                body: boxed(body, f)?,
            },
            Self::Switch { subject, arms } => Self::Switch {
                subject: boxed(subject, f)?,
                arms: arms
                    .iter()
                    .map(|arm| {
                        Ok(SwitchArm {
                            pattern: arm.pattern.clone(),
                            guard: arm.guard.as_ref().map(&mut *f).transpose()?,
                            value: f(&arm.value)?,
                        })
                    })
                    .collect::<Result<_, E>>()?,
            },
            Self::Throw { type_name, args } => Self::Throw {
                type_name: type_name.clone(),
                args: args.iter().map(&mut *f).collect::<Result<_, _>>()?,
            },
        })
    }

    /// Replace every free occurrence of the identifier `name`.
    pub fn substitute(&self, name: &str, replacement: &Self) -> Self {
        let result: Result<Self, Infallible> = match self {
            Self::Ident(ident) if ident == name => Ok(replacement.clone()),
            Self::Lambda { param, .. } if param == name => Ok(self.clone()),
            _ => self.try_map_children(&mut |child| Ok(child.substitute(name, replacement))),
        };
        match result {
            Ok(expr) => expr,
            Err(never) => match never {},
        }
    }

    /// First construct found that an expression tree cannot contain.
    pub fn forbidden_construct(&self) -> Option<ForbiddenConstruct> {
        let own = match self {
            Self::ConditionalAccess { .. } => Some(ForbiddenConstruct::ConditionalAccess),
            Self::With { .. } => Some(ForbiddenConstruct::With),
            Self::Base => Some(ForbiddenConstruct::Base),
            Self::Range { .. } => Some(ForbiddenConstruct::Range),
            Self::Tuple(_) => Some(ForbiddenConstruct::Tuple),
            Self::Switch { .. } => Some(ForbiddenConstruct::Switch),
            Self::Throw { .. } => Some(ForbiddenConstruct::Throw),
            Self::CollectionExpr(_) => Some(ForbiddenConstruct::CollectionExpression),
            _ => None,
        };
        if own.is_some() {
            return own;
        }
        let mut found = None;
        let _ = self.try_map_children(&mut |child| match child.forbidden_construct() {
            Some(construct) => {
                found = Some(construct);
                Err(())
            }
            None => Ok(child.clone()),
        });
        found
    }

    pub fn is_expression_tree_safe(&self) -> bool {
        self.forbidden_construct().is_none()
    }
}
