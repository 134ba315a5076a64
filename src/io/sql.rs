use std::path::Path;

use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Connection};

use crate::column::{format_number, CellValue, Column, ColumnType};
use crate::error::{Error, Result};
use crate::table::Table;

/// Table name used by the converter
pub const CONVERTED_TABLE_NAME: &str = "converted_data";

/// Write a [`Table`] into a SQLite database as table `converted_data`
///
/// An existing table of that name is dropped first. Numeric columns are
/// declared `REAL`, text columns `TEXT`; missing cells are stored as `NULL`.
/// All statements run in one transaction.
///
/// # Example
///
/// ```no_run
/// use sportscope::io::{read_csv, write_to_sql};
///
/// let table = read_csv("players.csv").unwrap();
/// write_to_sql(&table, "players.db").unwrap();
/// ```
pub fn write_to_sql<P: AsRef<Path>>(table: &Table, db_path: P) -> Result<()> {
    write_to_sql_table(table, CONVERTED_TABLE_NAME, db_path)
}

/// Write a [`Table`] into a SQLite database, replacing `table_name`
pub fn write_to_sql_table<P: AsRef<Path>>(
    table: &Table,
    table_name: &str,
    db_path: P,
) -> Result<()> {
    if table.is_empty() {
        return Err(Error::SqlError(
            "Cannot write a table without columns".to_string(),
        ));
    }

    let mut conn = Connection::open(db_path)
        .map_err(|e| Error::SqlError(format!("Could not open database: {}", e)))?;

    let tx = conn
        .transaction()
        .map_err(|e| Error::SqlError(format!("Could not start transaction: {}", e)))?;

    tx.execute(&format!("DROP TABLE IF EXISTS {}", quote_identifier(table_name)), [])
        .map_err(|e| Error::SqlError(format!("Could not drop table: {}", e)))?;

    let column_defs: Vec<String> = table
        .columns()
        .iter()
        .map(|c| format!("{} {}", quote_identifier(c.name()), sql_type(c)))
        .collect();
    tx.execute(
        &format!(
            "CREATE TABLE {} ({})",
            quote_identifier(table_name),
            column_defs.join(", ")
        ),
        [],
    )
    .map_err(|e| Error::SqlError(format!("Could not create table: {}", e)))?;

    let column_list: Vec<String> = table
        .column_names()
        .into_iter()
        .map(quote_identifier)
        .collect();
    let placeholders = vec!["?"; column_list.len()].join(", ");
    let insert_sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(table_name),
        column_list.join(", "),
        placeholders
    );

    {
        let mut stmt = tx
            .prepare(&insert_sql)
            .map_err(|e| Error::SqlError(format!("Could not prepare insert: {}", e)))?;

        for row_idx in 0..table.row_count() {
            let values = table.columns().iter().map(|c| match c.value(row_idx) {
                CellValue::Missing => Value::Null,
                CellValue::Number(v) => Value::Real(v),
                CellValue::Text(s) => Value::Text(s.to_string()),
            });
            stmt.execute(params_from_iter(values))
                .map_err(|e| Error::SqlError(format!("Could not insert row {}: {}", row_idx, e)))?;
        }
    }

    tx.commit()
        .map_err(|e| Error::SqlError(format!("Could not commit transaction: {}", e)))?;

    log::debug!(
        "wrote {} rows into SQLite table '{}'",
        table.row_count(),
        table_name
    );
    Ok(())
}

/// Read a SQLite database produced by the converter
///
/// Reads table `converted_data` when present, otherwise the first user table.
pub fn read_sql_table<P: AsRef<Path>>(db_path: P) -> Result<Table> {
    let conn = Connection::open(db_path)
        .map_err(|e| Error::SqlError(format!("Could not open database: {}", e)))?;

    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY rowid",
    )?;
    let names: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<_, _>>()?;

    let table_name = names
        .iter()
        .find(|n| n.as_str() == CONVERTED_TABLE_NAME)
        .or_else(|| names.first())
        .ok_or_else(|| Error::SqlError("Database contains no tables".to_string()))?;

    read_sql(&format!("SELECT * FROM {}", quote_identifier(table_name)), &conn)
}

/// Run a query and collect its result set into a [`Table`]
pub fn read_sql(query: &str, conn: &Connection) -> Result<Table> {
    let mut stmt = conn
        .prepare(query)
        .map_err(|e| Error::SqlError(format!("Could not prepare query: {}", e)))?;

    let column_names: Vec<String> = stmt.column_names().iter().map(|n| n.to_string()).collect();
    let mut column_data: Vec<Vec<Option<String>>> = vec![Vec::new(); column_names.len()];

    let mut rows = stmt
        .query([])
        .map_err(|e| Error::SqlError(format!("Could not run query: {}", e)))?;

    while let Some(row) = rows.next()? {
        for (idx, cells) in column_data.iter_mut().enumerate() {
            cells.push(value_text(row.get_ref(idx)?));
        }
    }

    Table::from_columns(
        column_names
            .into_iter()
            .zip(column_data)
            .map(|(name, cells)| Column::infer(name, cells))
            .collect(),
    )
}

fn value_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(format_number(f)),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn sql_type(column: &Column) -> &'static str {
    match column.column_type() {
        ColumnType::Numeric => "REAL",
        ColumnType::Categorical => "TEXT",
    }
}

/// Quote an identifier for SQLite, doubling embedded quotes
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
