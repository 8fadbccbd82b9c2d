//! Human readable type names for diagnostics and IR previews.

use crate::db::TypeDatabase;
use crate::types::{TypeData, TypeId};

pub struct TypeFormatter<'a> {
    db: &'a dyn TypeDatabase,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(db: &'a dyn TypeDatabase) -> Self {
        Self { db }
    }

    pub fn format(&self, id: TypeId) -> String {
        let Some(data) = self.db.lookup(id) else {
            return format!("<unknown #{}>", id.0);
        };
        match data {
            TypeData::Intrinsic(kind) => kind.display_name().to_string(),
            TypeData::Nullable(inner) => format!("{}?", self.format(inner)),
            TypeData::Array(element) => format!("{}[]", self.format(element)),
            TypeData::Generic { kind, args } => {
                let args: Vec<String> = args.iter().map(|arg| self.format(*arg)).collect();
                format!("{}<{}>", kind.display_name(), args.join(", "))
            }
            TypeData::Tuple(elements) => {
                let parts: Vec<String> = elements
                    .iter()
                    .map(|e| match e.name {
                        Some(name) => {
                            format!("{} {}", self.format(e.type_id), self.db.resolve_atom(name))
                        }
                        None => self.format(e.type_id),
                    })
                    .collect();
                format!("({})", parts.join(", "))
            }
            TypeData::Named(_) => self
                .db
                .definition(id)
                .map(|def| self.db.resolve_atom(def.name).to_string())
                .unwrap_or_else(|| format!("<unnamed #{}>", id.0)),
        }
    }
}
