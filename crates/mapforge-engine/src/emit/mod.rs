//! Code generation: lowering built mappings into IR and printing it.

pub mod build;
pub mod display;
pub mod ir;

pub use build::MappingBuilder;
pub use display::{CodePrinter, MethodSignature};
pub use ir::{BinaryOp, Expr, ForbiddenConstruct, Pattern, Stmt, SwitchArm};
