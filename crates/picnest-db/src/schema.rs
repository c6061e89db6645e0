//! Explicit schema registry.
//!
//! A [`Schema`] is built once at startup and handed to the store. Table DDL,
//! write-time length limits, the dependents walked by deletes and the ER
//! diagram are all read from it.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Auto-generated integer primary key.
    Id,
    /// Integer reference to the `id` of the named table.
    ForeignKey(&'static str),
    Text { max_len: usize },
    /// RFC 3339 UTC text, fixed width.
    Timestamp,
}

impl ColumnType {
    pub fn sql_type(&self) -> &'static str {
        match self {
            Self::Id | Self::ForeignKey(_) => "INTEGER",
            Self::Text { .. } | Self::Timestamp => "TEXT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
    pub unique: bool,
}

impl Column {
    fn new(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            nullable: false,
            unique: false,
        }
    }

    pub fn id() -> Self {
        Self::new("id", ColumnType::Id)
    }

    pub fn references(name: &'static str, table: &'static str) -> Self {
        Self::new(name, ColumnType::ForeignKey(table))
    }

    pub fn text(name: &'static str, max_len: usize) -> Self {
        Self::new(name, ColumnType::Text { max_len })
    }

    pub fn timestamp(name: &'static str) -> Self {
        Self::new(name, ColumnType::Timestamp)
    }

    pub fn optional(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn max_len(&self) -> Option<usize> {
        match self.ty {
            ColumnType::Text { max_len } => Some(max_len),
            _ => None,
        }
    }

    pub fn foreign_table(&self) -> Option<&'static str> {
        match self.ty {
            ColumnType::ForeignKey(table) => Some(table),
            _ => None,
        }
    }

    fn ddl(&self) -> String {
        if self.ty == ColumnType::Id {
            return format!("\"{}\" INTEGER PRIMARY KEY AUTOINCREMENT", self.name);
        }

        let mut def = format!("\"{}\" {}", self.name, self.ty.sql_type());
        if !self.nullable {
            def.push_str(" NOT NULL");
        }
        if self.unique {
            def.push_str(" UNIQUE");
        }
        match self.ty {
            ColumnType::ForeignKey(table) => {
                def.push_str(&format!(" REFERENCES \"{}\"(id)", table));
            }
            ColumnType::Text { max_len } => {
                def.push_str(&format!(" CHECK (length(\"{}\") <= {})", self.name, max_len));
            }
            _ => {}
        }
        def
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: &'static str,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: &'static str, columns: Vec<Column>) -> Self {
        Self { name, columns }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.foreign_table().is_some())
    }

    fn ddl(&self) -> String {
        let columns: Vec<String> = self.columns.iter().map(|c| format!("    {}", c.ddl())).collect();
        let mut sql = format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (\n{}\n);\n",
            self.name,
            columns.join(",\n")
        );
        for fk in self.foreign_keys() {
            sql.push_str(&format!(
                "CREATE INDEX IF NOT EXISTS \"idx_{table}_{col}\" ON \"{table}\"(\"{col}\");\n",
                table = self.name,
                col = fk.name
            ));
        }
        sql
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    tables: Vec<Table>,
}

impl Schema {
    /// Tables must be listed parents-first so the DDL can run in order.
    pub fn new(tables: Vec<Table>) -> Self {
        Self { tables }
    }

    /// The social graph: users, posts, comments, follows, likes, stories,
    /// direct messages and saved posts.
    pub fn social() -> Self {
        Self::new(vec![
            Table::new(
                "user",
                vec![
                    Column::id(),
                    Column::text("username", 50).unique(),
                    Column::text("email", 100).unique(),
                    Column::text("password", 100),
                ],
            ),
            Table::new(
                "post",
                vec![
                    Column::id(),
                    Column::references("user_id", "user"),
                    Column::text("image_url", 250),
                    Column::text("caption", 2200).optional(),
                    Column::timestamp("timestamp"),
                ],
            ),
            Table::new(
                "comment",
                vec![
                    Column::id(),
                    Column::references("post_id", "post"),
                    Column::references("user_id", "user"),
                    Column::text("text", 500),
                    Column::timestamp("timestamp"),
                ],
            ),
            Table::new(
                "follower",
                vec![
                    Column::id(),
                    Column::references("user_id", "user"),
                    Column::references("follower_id", "user"),
                ],
            ),
            Table::new(
                "like",
                vec![
                    Column::id(),
                    Column::references("user_id", "user"),
                    Column::references("post_id", "post"),
                    Column::timestamp("timestamp"),
                ],
            ),
            Table::new(
                "story",
                vec![
                    Column::id(),
                    Column::references("user_id", "user"),
                    Column::text("media_url", 250),
                    Column::text("caption", 300).optional(),
                    Column::timestamp("timestamp"),
                    Column::timestamp("expires_at"),
                ],
            ),
            Table::new(
                "message",
                vec![
                    Column::id(),
                    Column::references("sender_id", "user"),
                    Column::references("receiver_id", "user"),
                    Column::text("content", 1000),
                    Column::timestamp("timestamp"),
                ],
            ),
            Table::new(
                "saved_post",
                vec![
                    Column::id(),
                    Column::references("user_id", "user"),
                    Column::references("post_id", "post"),
                    Column::timestamp("saved_at"),
                ],
            ),
        ])
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Character limit for a text column, if the column is bounded.
    pub fn max_len(&self, table: &str, column: &str) -> Option<usize> {
        self.table(table)?.column(column)?.max_len()
    }

    /// Every `(table, column)` whose foreign key points at `table`.
    pub fn dependents_of<'a>(
        &'a self,
        table: &'a str,
    ) -> impl Iterator<Item = (&'a Table, &'a Column)> + 'a {
        self.tables.iter().flat_map(move |t| {
            t.foreign_keys()
                .filter(move |c| c.foreign_table() == Some(table))
                .map(move |c| (t, c))
        })
    }

    /// `CREATE TABLE` / `CREATE INDEX` batch for the whole schema.
    pub fn ddl(&self) -> String {
        self.tables.iter().map(Table::ddl).collect::<Vec<_>>().join("\n")
    }
}
