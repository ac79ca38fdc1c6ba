// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Parser for the CREATE TABLE statements used to bootstrap catalog tables

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while},
    character::complete::{char, digit1, multispace0, multispace1, satisfy},
    combinator::{all_consuming, map, map_res, not, opt, peek, recognize, value},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    Finish, IResult,
};

use super::error::{CatalogError, CatalogResult};
use crate::storage::{Column, Schema};
use crate::types::TypeId;

/// Parsed `CREATE TABLE [database.]table (...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTableStatement {
    pub database: Option<String>,
    pub table: String,
    pub schema: Schema,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnConstraint {
    NotNull,
    PrimaryKey,
    Nullable,
}

/// Parse a single CREATE TABLE statement. Keywords are case-insensitive.
pub fn parse_create_table(ddl: &str) -> CatalogResult<CreateTableStatement> {
    let (_, statement) = all_consuming(create_table)(ddl)
        .finish()
        .map_err(|e| {
            let near: String = e.input.chars().take(24).collect();
            CatalogError::Parse(format!("invalid CREATE TABLE near '{}'", near))
        })?;
    Ok(statement)
}

/// Render a schema back into the DDL form accepted by [`parse_create_table`]
pub fn render_create_table(database: &str, table: &str, schema: &Schema) -> String {
    let columns: Vec<String> = schema
        .columns()
        .iter()
        .map(|c| {
            let mut def = format!("{} {}", c.name, c.type_id);
            if let Some(n) = c.max_length {
                def.push_str(&format!("({})", n));
            }
            if c.is_not_null() {
                def.push_str(" NOT NULL");
            }
            if c.is_primary() {
                def.push_str(" PRIMARY KEY");
            }
            def
        })
        .collect();
    format!("CREATE TABLE {}.{} ({});", database, table, columns.join(", "))
}

fn create_table(input: &str) -> IResult<&str, CreateTableStatement> {
    let (input, _) = ws(keyword("CREATE"))(input)?;
    let (input, _) = ws(keyword("TABLE"))(input)?;
    let (input, (database, table)) = ws(qualified_name)(input)?;
    let (input, columns) = delimited(
        ws(char('(')),
        separated_list1(ws(char(',')), column_definition),
        ws(char(')')),
    )(input)?;
    let (input, _) = opt(ws(char(';')))(input)?;

    Ok((
        input,
        CreateTableStatement {
            database,
            table,
            schema: Schema::new(columns),
        },
    ))
}

fn qualified_name(input: &str) -> IResult<&str, (Option<String>, String)> {
    map(
        pair(identifier, opt(preceded(char('.'), identifier))),
        |(first, second)| match second {
            Some(table) => (Some(first.to_string()), table.to_string()),
            None => (None, first.to_string()),
        },
    )(input)
}

fn column_definition(input: &str) -> IResult<&str, Column> {
    map(
        tuple((
            ws(identifier),
            ws(column_type),
            many0(ws(column_constraint)),
        )),
        |(name, (type_id, max_length), constraints)| {
            let mut column = Column::new(name, type_id);
            column.max_length = max_length;
            for constraint in constraints {
                column = match constraint {
                    ColumnConstraint::NotNull => column.not_null(),
                    ColumnConstraint::PrimaryKey => column.primary_key(),
                    ColumnConstraint::Nullable => column,
                };
            }
            column
        },
    )(input)
}

fn column_type(input: &str) -> IResult<&str, (TypeId, Option<usize>)> {
    alt((
        value((TypeId::Integer, None), keyword("INTEGER")),
        value((TypeId::Integer, None), keyword("INT")),
        value((TypeId::SmallInt, None), keyword("SMALLINT")),
        value((TypeId::BigInt, None), keyword("BIGINT")),
        value((TypeId::Boolean, None), keyword("BOOLEAN")),
        value((TypeId::Boolean, None), keyword("BOOL")),
        map(preceded(keyword("VARCHAR"), opt(type_length)), |n| {
            (TypeId::Varchar, n)
        }),
        map(preceded(keyword("VARBINARY"), opt(type_length)), |n| {
            (TypeId::Varbinary, n)
        }),
        value((TypeId::Timestamp, None), keyword("TIMESTAMP")),
    ))(input)
}

fn type_length(input: &str) -> IResult<&str, usize> {
    delimited(
        ws(char('(')),
        map_res(digit1, |digits: &str| digits.parse::<usize>()),
        ws(char(')')),
    )(input)
}

fn column_constraint(input: &str) -> IResult<&str, ColumnConstraint> {
    alt((
        value(
            ColumnConstraint::NotNull,
            tuple((keyword("NOT"), multispace1, keyword("NULL"))),
        ),
        value(
            ColumnConstraint::PrimaryKey,
            tuple((keyword("PRIMARY"), multispace1, keyword("KEY"))),
        ),
        value(ColumnConstraint::Nullable, keyword("NULL")),
    ))(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(is_identifier_char),
    ))(input)
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Case-insensitive keyword that is not the prefix of a longer word
fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag_no_case(kw), not(peek(satisfy(is_identifier_char))))
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIGGER_DDL: &str = "CREATE TABLE pg_catalog.pg_trigger (\
        oid INT NOT NULL PRIMARY KEY, \
        tgrelid INT NOT NULL, \
        tgname VARCHAR NOT NULL, \
        tgfoid VARCHAR, \
        tgtype INT NOT NULL, \
        tgargs VARCHAR, \
        tgqual VARBINARY, \
        timestamp TIMESTAMP NOT NULL);";

    #[test]
    fn test_parse_trigger_bootstrap_ddl() {
        let stmt = parse_create_table(TRIGGER_DDL).unwrap();
        assert_eq!(stmt.database.as_deref(), Some("pg_catalog"));
        assert_eq!(stmt.table, "pg_trigger");
        assert_eq!(stmt.schema.column_count(), 8);
        assert_eq!(stmt.schema.primary_key_columns(), vec![0]);
        assert_eq!(stmt.schema.column_index("tgqual"), Some(6));

        let tgqual = stmt.schema.column(6).unwrap();
        assert_eq!(tgqual.type_id, TypeId::Varbinary);
        assert!(!tgqual.is_not_null());
        assert!(stmt.schema.column(7).unwrap().is_not_null());
    }

    #[test]
    fn test_keywords_are_case_insensitive_and_lengths_parse() {
        let stmt = parse_create_table(
            "create table t (id integer primary key, name varchar(32) null, flag bool)",
        )
        .unwrap();
        assert_eq!(stmt.database, None);
        let name = stmt.schema.column(1).unwrap();
        assert_eq!(name.max_length, Some(32));
        assert!(!name.is_not_null());
        assert_eq!(stmt.schema.column(2).unwrap().type_id, TypeId::Boolean);
    }

    #[test]
    fn test_render_round_trips() {
        let stmt = parse_create_table(TRIGGER_DDL).unwrap();
        let rendered = render_create_table("pg_catalog", "pg_trigger", &stmt.schema);
        assert_eq!(parse_create_table(&rendered).unwrap(), stmt);
    }

    #[test]
    fn test_rejects_malformed_statements() {
        for ddl in [
            "CREATE TABLE t ()",
            "CREATE TABLE t (id INTEGERX)",
            "CREATE TABLE t (id INT) trailing",
            "DROP TABLE t",
        ] {
            let err = parse_create_table(ddl).unwrap_err();
            assert!(matches!(err, CatalogError::Parse(_)), "{}", ddl);
        }
    }
}
