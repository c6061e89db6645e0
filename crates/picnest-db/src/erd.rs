//! Entity-relationship diagrams rendered from a [`Schema`].
//!
//! Developer tooling only. Nothing here runs unless called, and the store
//! never calls it.

use std::fmt::Write;
use std::str::FromStr;

use crate::schema::{Column, ColumnType, Schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErdFormat {
    /// Mermaid `erDiagram`.
    Mermaid,
    /// Graphviz `digraph`.
    Dot,
}

impl FromStr for ErdFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mermaid" | "mmd" => Ok(Self::Mermaid),
            "dot" | "graphviz" => Ok(Self::Dot),
            other => Err(format!("unknown diagram format '{}'", other)),
        }
    }
}

pub fn render_erd(schema: &Schema, format: ErdFormat) -> String {
    match format {
        ErdFormat::Mermaid => render_mermaid(schema),
        ErdFormat::Dot => render_dot(schema),
    }
}

fn render_mermaid(schema: &Schema) -> String {
    let mut out = String::from("erDiagram\n");

    for table in schema.tables() {
        let _ = writeln!(out, "    {} {{", table.name);
        for column in &table.columns {
            let _ = writeln!(out, "        {}", mermaid_attribute(column));
        }
        out.push_str("    }\n");
    }

    for table in schema.tables() {
        for fk in table.foreign_keys() {
            if let Some(parent) = fk.foreign_table() {
                let _ = writeln!(out, "    {} ||--o{{ {} : \"{}\"", parent, table.name, fk.name);
            }
        }
    }

    out
}

fn mermaid_attribute(column: &Column) -> String {
    let keys = match column.ty {
        ColumnType::Id => " PK",
        ColumnType::ForeignKey(_) => " FK",
        _ if column.unique => " UK",
        _ => "",
    };

    let mut notes = Vec::new();
    if let Some(max) = column.max_len() {
        notes.push(format!("max {}", max));
    }
    if column.nullable {
        notes.push("nullable".to_string());
    }

    let ty = match column.ty {
        ColumnType::Timestamp => "DATETIME",
        other => other.sql_type(),
    };
    if notes.is_empty() {
        format!("{} {}{}", ty, column.name, keys)
    } else {
        format!("{} {}{} \"{}\"", ty, column.name, keys, notes.join(", "))
    }
}

fn render_dot(schema: &Schema) -> String {
    let mut out = String::from("digraph schema {\n    rankdir=LR;\n    node [shape=record];\n");

    for table in schema.tables() {
        let fields: Vec<String> = table
            .columns
            .iter()
            .map(|c| format!("<{}> {}", c.name, c.name))
            .collect();
        let _ = writeln!(
            out,
            "    \"{}\" [label=\"{{{}|{}}}\"];",
            table.name,
            table.name,
            fields.join("|")
        );
    }

    for table in schema.tables() {
        for fk in table.foreign_keys() {
            if let Some(parent) = fk.foreign_table() {
                let _ = writeln!(
                    out,
                    "    \"{}\":{} -> \"{}\":id;",
                    table.name, fk.name, parent
                );
            }
        }
    }

    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mermaid_lists_tables_and_edges() {
        let diagram = render_erd(&Schema::social(), ErdFormat::Mermaid);
        assert!(diagram.starts_with("erDiagram\n"));
        assert!(diagram.contains("    saved_post {"));
        assert!(diagram.contains("TEXT username UK \"max 50\""));
        assert!(diagram.contains("INTEGER id PK"));
        assert!(diagram.contains("TEXT caption \"max 2200, nullable\""));
        assert!(diagram.contains("user ||--o{ post : \"user_id\""));
        assert!(diagram.contains("user ||--o{ follower : \"follower_id\""));
        assert!(diagram.contains("post ||--o{ saved_post : \"post_id\""));
    }

    #[test]
    fn test_dot_output() {
        let diagram = render_erd(&Schema::social(), ErdFormat::Dot);
        assert!(diagram.starts_with("digraph schema {"));
        assert!(diagram.contains("\"comment\":post_id -> \"post\":id;"));
        assert!(diagram.trim_end().ends_with('}'));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("Mermaid".parse::<ErdFormat>(), Ok(ErdFormat::Mermaid));
        assert_eq!("graphviz".parse::<ErdFormat>(), Ok(ErdFormat::Dot));
        assert!("png".parse::<ErdFormat>().is_err());
    }
}
