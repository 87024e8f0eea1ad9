use super::core::SqliteViolationRepository;
use crate::domain::types::ViolationStatus;
use crate::domain::violation::{ViolationRecord, TIMESTAMP_FORMAT};
use crate::repository::error::RepositoryResult;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};

const SELECT_COLUMNS: &str = r#"
    SELECT id, plate, state, vehicle, property, warning_count,
           first_seen, last_seen, status, notes, photo, officer
    FROM violations
"#;

impl SqliteViolationRepository {
    // ==========================================
    // 查询操作
    // ==========================================

    /// 最近一条记录（ID 倒序）
    pub(super) fn query_latest(
        conn: &Connection,
        plate: &str,
    ) -> RepositoryResult<Option<ViolationRecord>> {
        let sql = format!("{} WHERE plate = ? ORDER BY id DESC LIMIT 1", SELECT_COLUMNS);
        let record = conn
            .query_row(&sql, params![plate], map_row)
            .optional()?;
        Ok(record)
    }

    /// 车牌历史（last_seen 倒序,同一时间戳按 ID 倒序）
    pub(super) fn query_history(
        conn: &Connection,
        plate: &str,
    ) -> RepositoryResult<Vec<ViolationRecord>> {
        let sql = format!(
            "{} WHERE plate = ? ORDER BY last_seen DESC, id DESC",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![plate], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(records)
    }

    /// 车牌前缀检索（用于输入联想）
    pub(super) fn query_plate_prefix(
        conn: &Connection,
        prefix: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<String>> {
        let pattern = format!("{}%", escape_like(prefix));
        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT plate FROM violations
            WHERE plate LIKE ? ESCAPE '\'
            ORDER BY plate
            LIMIT ?
            "#,
        )?;
        let plates = stmt
            .query_map(params![pattern, limit as i64], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(plates)
    }

    /// 统计全部记录数
    pub fn count_all(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM violations", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// 转义 LIKE 通配符,车牌中的 % / _ 按字面匹配
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn parse_ts(idx: usize, raw: &str) -> SqliteResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn map_row(row: &Row) -> SqliteResult<ViolationRecord> {
    let first_seen_str: Option<String> = row.get(6)?;
    let last_seen_str: String = row.get(7)?;
    let status_str: String = row.get(8)?;

    let first_seen = match first_seen_str {
        Some(s) => Some(parse_ts(6, &s)?),
        None => None,
    };
    let last_seen = parse_ts(7, &last_seen_str)?;

    let status = status_str.parse::<ViolationStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            8,
            rusqlite::types::Type::Text,
            Box::<dyn std::error::Error + Send + Sync>::from(e),
        )
    })?;

    Ok(ViolationRecord {
        id: row.get(0)?,
        plate: row.get(1)?,
        state: row.get(2)?,
        vehicle: row.get(3)?,
        property: row.get(4)?,
        warning_count: row.get(5)?,
        first_seen,
        last_seen,
        status,
        notes: row.get(9)?,
        photo_ref: row.get(10)?,
        officer: row.get(11)?,
    })
}

#[cfg(test)]
mod escape_tests {
    use super::escape_like;

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("AB%"), "AB\\%");
        assert_eq!(escape_like("A_B"), "A\\_B");
        assert_eq!(escape_like("ABC"), "ABC");
    }
}
